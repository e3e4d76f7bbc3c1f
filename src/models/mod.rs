pub mod identity;
pub mod user;

// Re-export commonly used types
pub use identity::{Identity, IdentityMetadata, Provider, Session};
pub use user::{NewUserRecord, UserPatch, UserRecord};
