//! Ownership guard for post mutations.

use crate::{auth::Identity, models::Post};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    Allowed,
    Denied,
}

/// Route-level gate: any authenticated identity passes.
pub fn require_authenticated(identity: &Identity) -> Decision {
    match identity {
        Identity::Authenticated(_) => Decision::Allowed,
        Identity::Anonymous => Decision::Denied,
    }
}

/// Resource-level gate: only the post's author may edit or delete it.
pub fn authorize(identity: &Identity, post: &Post) -> Decision {
    match identity {
        Identity::Authenticated(claim) if claim.user_id == post.author_id => Decision::Allowed,
        _ => Decision::Denied,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::SessionClaim;
    use uuid::Uuid;

    fn signed_in(user_id: i64) -> Identity {
        Identity::Authenticated(SessionClaim {
            user_id,
            username: format!("user{user_id}"),
            issued_at: 0,
            expires_at: 60,
            token_id: Uuid::nil(),
        })
    }

    fn post_by(author_id: i64) -> Post {
        Post {
            id: 7,
            author_id,
            ..Post::default()
        }
    }

    #[test]
    fn author_is_allowed() {
        assert_eq!(authorize(&signed_in(1), &post_by(1)), Decision::Allowed);
    }

    #[test]
    fn other_user_is_denied() {
        assert_eq!(authorize(&signed_in(2), &post_by(1)), Decision::Denied);
    }

    #[test]
    fn anonymous_is_denied_everywhere() {
        assert_eq!(authorize(&Identity::Anonymous, &post_by(1)), Decision::Denied);
        assert_eq!(require_authenticated(&Identity::Anonymous), Decision::Denied);
        assert_eq!(require_authenticated(&signed_in(3)), Decision::Allowed);
    }
}
