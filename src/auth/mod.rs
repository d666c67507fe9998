//! Authentication module
//!
//! Provides bcrypt password hashing, JWT bearer tokens and the request identity
//! that ownership checks compare against.

mod jwt;
mod middleware;
mod password;

pub use jwt::{create_tokens, decode_token, refresh_claims, TokenPair, TokenType};
pub use middleware::{identity_middleware, CurrentUser};
pub use password::{hash_password, verify_password};
