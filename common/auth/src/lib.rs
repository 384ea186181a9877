pub mod claims;
pub mod config;
pub mod error;
pub mod extractors;
pub mod guards;
pub mod password;
pub mod tiers;
pub mod tokens;

pub use claims::Claims;
pub use config::{TokenConfig, DEFAULT_TOKEN_TTL_HOURS};
pub use error::{AuthError, AuthResult};
pub use extractors::{authenticate, AuthContext};
pub use guards::{ensure_tier, require_tier, GuardError, TierGate};
pub use password::{hash_password, HashScheme, PasswordVerifier, BCRYPT_COST_RANGE, DEFAULT_BCRYPT_COST};
pub use tiers::{Tier, TierPolicy, TIER_ADMIN, TIER_EMPLOYEE, TIER_MANAGER};
pub use tokens::{IssuedToken, TokenService, TokenSubject};
