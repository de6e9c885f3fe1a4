//! Settings for connecting to the backing blob account.

use serde::{Deserialize, Serialize};

use crate::errors::{StoreError, StoreResult};

/// Connection settings for one synced container
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TransferSettings {
    /// Storage account name
    pub account_name: String,

    /// Storage account key
    pub account_key: String,

    /// Container holding the synced repository
    pub container_name: String,

    /// Use https for the account endpoint
    #[serde(default = "default_https")]
    pub use_https: bool,
}

fn default_https() -> bool {
    true
}

impl TransferSettings {
    pub fn new(
        account_name: impl Into<String>,
        account_key: impl Into<String>,
        container_name: impl Into<String>,
    ) -> Self {
        Self {
            account_name: account_name.into(),
            account_key: account_key.into(),
            container_name: container_name.into(),
            use_https: true,
        }
    }

    /// Use plain http (development storage emulators)
    pub fn with_http(mut self) -> Self {
        self.use_https = false;
        self
    }

    fn protocol(&self) -> &'static str {
        if self.use_https {
            "https"
        } else {
            "http"
        }
    }

    /// Assemble the account connection string consumed by the SDK client
    pub fn connection_string(&self) -> String {
        format!(
            "DefaultEndpointsProtocol={};AccountName={};AccountKey={}",
            self.protocol(),
            self.account_name,
            self.account_key
        )
    }

    /// Validate the settings
    pub fn validate(&self) -> StoreResult<()> {
        if self.account_name.is_empty() {
            return Err(StoreError::InvalidConfiguration {
                message: "account name cannot be empty".to_string(),
            });
        }
        if self.account_key.is_empty() {
            return Err(StoreError::InvalidConfiguration {
                message: "account key cannot be empty".to_string(),
            });
        }
        if self.container_name.is_empty() {
            return Err(StoreError::InvalidConfiguration {
                message: "container name cannot be empty".to_string(),
            });
        }
        if self.container_name != self.container_name.to_lowercase() {
            return Err(StoreError::InvalidConfiguration {
                message: "container name must be lower case only".to_string(),
            });
        }
        Ok(())
    }
}
