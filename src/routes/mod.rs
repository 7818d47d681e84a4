/// Router Module Index
///
/// Splits the routes by access level. Access control is applied per module with axum
/// layers, so a handler cannot end up exposed by being registered in the wrong place.

/// Routes accessible to every visitor, signed in or not.
/// Handlers that care who is asking read the resolved identity via `CurrentUser`.
pub mod public;

/// Routes protected by `auth_middleware`. Ownership of individual posts is checked
/// in the handlers by the guard.
pub mod authenticated;
