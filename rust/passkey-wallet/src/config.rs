use passkey_common::Address;
use serde::{Deserialize, Serialize};

use crate::ConfigError;

/// The immutable configuration a wallet is constructed with.
///
/// ```json
/// {
///   "proof_verifier": "<base58 address>",
///   "dkim_registry": "<base58 address>",
///   "email_auth_implementation": "<base58 address>",
///   "require_user_verification": false
/// }
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct WalletConfig {
    /// The email proof verifier guardians are set up to trust
    pub proof_verifier: Address,

    /// The DKIM registry guardians are set up to trust
    pub dkim_registry: Address,

    /// The guardian implementation deployed behind each guardian address
    pub email_auth_implementation: Address,

    /// Whether passkey assertions must carry the user-verified flag
    #[serde(default)]
    pub require_user_verification: bool,
}

impl WalletConfig {
    /// A configuration that accepts user presence without verification.
    pub fn new(
        proof_verifier: Address,
        dkim_registry: Address,
        email_auth_implementation: Address,
    ) -> Self {
        Self {
            proof_verifier,
            dkim_registry,
            email_auth_implementation,
            require_user_verification: false,
        }
    }

    /// Load and validate a configuration from JSON.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Reject configurations that name the zero address.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let zero = Address::default();
        for (name, address) in [
            ("proof_verifier", &self.proof_verifier),
            ("dkim_registry", &self.dkim_registry),
            ("email_auth_implementation", &self.email_auth_implementation),
        ] {
            if *address == zero {
                return Err(ConfigError::ZeroAddress(name));
            }
        }
        Ok(())
    }
}
