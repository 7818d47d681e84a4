//! Field validation shared by the registration, login and post flows.
//!
//! Rules are data (`FieldRules`) and checks run in phases so that a flow can
//! interleave its own checks (the username uniqueness lookup) between them while still
//! reporting every violation in a stable order.

/// Validation phase. Flows run the phases in this order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Presence,
    Format,
    Length,
}

/// FieldRules
///
/// Declarative constraints for one form field. Messages are derived from `label`.
#[derive(Debug, Clone, Copy)]
pub struct FieldRules {
    pub label: &'static str,
    pub min_chars: Option<usize>,
    pub max_chars: Option<usize>,
    /// Only ASCII letters and digits are accepted.
    pub alphanumeric: bool,
}

pub const USERNAME: FieldRules = FieldRules {
    label: "Username",
    min_chars: Some(3),
    max_chars: Some(10),
    alphanumeric: true,
};

pub const PASSWORD: FieldRules = FieldRules {
    label: "Password",
    min_chars: Some(8),
    max_chars: Some(70),
    alphanumeric: false,
};

pub const TITLE: FieldRules = FieldRules {
    label: "Title",
    min_chars: None,
    max_chars: None,
    alphanumeric: false,
};

pub const BODY: FieldRules = FieldRules {
    label: "Body",
    min_chars: None,
    max_chars: None,
    alphanumeric: false,
};

impl FieldRules {
    /// The violation of this field's rules for `phase`, if any.
    ///
    /// Format and length are only judged for non-empty values; an empty value is
    /// reported once, by the presence phase.
    pub fn check(&self, value: &str, phase: Phase) -> Option<String> {
        let len = value.chars().count();
        match phase {
            Phase::Presence if value.is_empty() => {
                Some(format!("You must provide a {}.", self.label.to_lowercase()))
            }
            Phase::Format
                if self.alphanumeric
                    && !value.is_empty()
                    && !value.chars().all(|c| c.is_ascii_alphanumeric()) =>
            {
                Some(format!("{} can only contain letters and numbers.", self.label))
            }
            Phase::Length if len > 0 => match (self.min_chars, self.max_chars) {
                (Some(min), _) if len < min => {
                    Some(format!("{} must be at least {min} characters.", self.label))
                }
                (_, Some(max)) if len > max => {
                    Some(format!("{} cannot exceed {max} characters.", self.label))
                }
                _ => None,
            },
            _ => None,
        }
    }
}

/// Runs one phase over every field, preserving field order.
pub fn validate(fields: &[(&FieldRules, &str)], phase: Phase) -> Vec<String> {
    fields
        .iter()
        .filter_map(|(rules, value)| rules.check(value, phase))
        .collect()
}

/// Runs every phase over every field.
pub fn validate_all(fields: &[(&FieldRules, &str)]) -> Vec<String> {
    [Phase::Presence, Phase::Format, Phase::Length]
        .into_iter()
        .flat_map(|phase| validate(fields, phase))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_value_only_fails_presence() {
        assert!(USERNAME.check("", Phase::Presence).is_some());
        assert!(USERNAME.check("", Phase::Format).is_none());
        assert!(USERNAME.check("", Phase::Length).is_none());
    }

    #[test]
    fn length_bounds_are_inclusive() {
        assert!(USERNAME.check("abc", Phase::Length).is_none());
        assert!(USERNAME.check("abcdefghij", Phase::Length).is_none());
        assert!(USERNAME.check("ab", Phase::Length).is_some());
        assert!(USERNAME.check("abcdefghijk", Phase::Length).is_some());
    }

    #[test]
    fn validate_all_orders_by_phase_then_field() {
        let errors = validate_all(&[(&USERNAME, "a!"), (&PASSWORD, "")]);
        assert_eq!(
            errors,
            vec![
                "You must provide a password.".to_string(),
                "Username can only contain letters and numbers.".to_string(),
                "Username must be at least 3 characters.".to_string(),
            ]
        );
    }
}
