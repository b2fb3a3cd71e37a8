//! Cookie/Bearer JWT authentication: token issue and verify, password hashing, request guard.

pub mod cookie;
pub mod middleware;
pub mod password;
pub mod token;

pub use cookie::{clear_token_cookie, token_cookie, TOKEN_COOKIE};
pub use middleware::require_auth;
pub use password::{hash_password, verify_password};
pub use token::{AuthKeys, Claims};
