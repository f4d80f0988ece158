pub mod pool;
pub mod state;

pub use pool::{AcquireError, CredentialPool};
pub use state::{CachedCredential, CredentialId, ProviderId};
