//! Token-based identity resolution

pub mod jwt;
pub mod middleware;

pub use jwt::{create_token, resolve_identity, AuthError, Claims, JwtConfig};
pub use middleware::{identity_middleware, AuthState};
