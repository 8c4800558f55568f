use passkey_common::{Address, Word};
use passkey_email_auth::EmailAuthError;
use thiserror::Error;

/// Errors from the deterministic deployment primitive.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DeployError {
    /// The init code refers to an implementation the host does not know.
    #[error("unknown implementation {0}")]
    UnknownImplementation(Address),

    /// Code already exists at the computed address.
    #[error("already deployed at {0}")]
    AlreadyDeployed(Address),
}

/// Errors from resolving or provisioning a guardian.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ProvisionError {
    /// Deployment failed.
    #[error(transparent)]
    Deploy(#[from] DeployError),

    /// The freshly deployed guardian is not where it was derived to be.
    #[error("guardian deployed at {deployed}, expected {expected}")]
    AddressMismatch {
        /// The derived address
        expected: Address,
        /// Where the guardian was actually deployed
        deployed: Address,
    },

    /// The existing guardian is controlled by another wallet.
    #[error("guardian {guardian} is controlled by {controller}")]
    ControllerMismatch {
        /// The guardian address
        guardian: Address,
        /// The guardian's controller
        controller: Address,
    },

    /// The existing guardian trusts a different verifier or DKIM registry
    /// than the wallet is configured with.
    #[error("guardian {0} is configured with different oracles")]
    GuardianConfigMismatch(Address),

    /// The guardian does not exist and the email does not assert first use.
    #[error("guardian {0} is not deployed and the email does not assert first use")]
    FirstUseViolation(Address),

    /// No guardian exists at the address.
    #[error("no guardian at {0}")]
    NotDeployed(Address),

    /// Configuring a fresh guardian failed.
    #[error("guardian setup failed: {0}")]
    Setup(EmailAuthError),
}

/// Errors from binding a passkey.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BindingError {
    /// The message names a template other than the one requested.
    #[error("invalid template id: expected {expected}, got {found}")]
    TemplateMismatch {
        /// `template_id(template_index)`
        expected: Word,
        /// The id carried by the message
        found: Word,
    },

    /// The guardian could not be provisioned or validated.
    #[error(transparent)]
    Provision(#[from] ProvisionError),

    /// The guardian rejected the email.
    #[error("email authentication failed: {0}")]
    Authentication(#[from] EmailAuthError),

    /// The command parameters are not two 32-byte uints.
    #[error("expected two 32-byte parameters, got lengths {0:?}")]
    MalformedParameters(Vec<usize>),

    /// The parameters are not a P-256 point.
    #[error("passkey public key is not a valid P-256 point")]
    InvalidPasskey,
}

/// Errors from loading a [`WalletConfig`](crate::WalletConfig).
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The configuration is not valid JSON for the expected shape.
    #[error("invalid wallet configuration: {0}")]
    Json(#[from] serde_json::Error),

    /// A required address is all zeros.
    #[error("{0} address must not be zero")]
    ZeroAddress(&'static str),
}
