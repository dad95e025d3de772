pub mod email;
pub mod jwt;
pub mod middleware;
pub mod password;

pub use jwt::{JwtManager, TokenKind};
pub use middleware::{require_auth, CurrentUser};
