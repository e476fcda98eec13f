//! Startup credential validation.
//!
//! Both external services are checked the same way: one round trip that
//! proves the configured secrets are accepted. A failure aborts startup.

use async_trait::async_trait;
use tracing::{error, info};

use crate::error::CredentialError;

/// A one-shot check that a service accepts the configured credentials.
#[async_trait]
pub trait CredentialCheck: Send + Sync {
    /// Human-readable service name used in logs and errors.
    fn service(&self) -> &'static str;

    async fn validate_credentials(&self) -> Result<(), CredentialError>;
}

/// Run each check in order, stopping at the first failure.
pub async fn validate_all(checks: &[&dyn CredentialCheck]) -> Result<(), CredentialError> {
    for check in checks {
        info!(service = check.service(), "credentials_validating");

        if let Err(e) = check.validate_credentials().await {
            error!(service = check.service(), error = %e, "credentials_invalid");
            return Err(e);
        }

        info!(service = check.service(), "credentials_valid");
    }

    Ok(())
}
