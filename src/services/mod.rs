//! Business logic
//!
//! - `reconcile`: the exactly-once synchronization of provider identities
//!   into the users table
//! - `callback`: auth callback dispatch across the OAuth-code, OTP and
//!   password-reset paths
//! - `account`: account lifecycle operations (deletion, profile picture)
pub mod account;
pub mod callback;
pub mod reconcile;

pub use account::AccountService;
pub use callback::{CallbackOutcome, CallbackParams, CallbackResult, VerificationFlow};
pub use reconcile::{ReconcileOutcome, Reconciler};
