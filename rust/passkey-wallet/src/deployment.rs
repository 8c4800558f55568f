//! Deterministic deployment.
//!
//! A contract's address is a pure function of the deployer, a salt and the
//! hash of the code being deployed, so it can be computed before anything
//! exists.

use passkey_common::{Address, AddressDeriver, Word};
use passkey_email_auth::Initializer;
use serde::{Deserialize, Serialize};

const INIT_CODE_CONTEXT: &str = "passkey-wallet 2024-06 guardian proxy init code";
const DEPLOYMENT_CONTEXT: &str = "passkey-wallet 2024-06 deterministic deployment";

/// What is deployed at a guardian address: a proxy to `implementation`,
/// initialized with `initializer`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct InitCode {
    /// The guardian implementation behind the proxy.
    pub implementation: Address,
    /// The guardian's initialization arguments.
    pub initializer: Initializer,
}

impl InitCode {
    /// The content hash of this init code.
    pub fn hash(&self) -> Word {
        AddressDeriver::new(INIT_CODE_CONTEXT)
            .address(&self.implementation)
            .address(&self.initializer.owner)
            .word(&self.initializer.account_salt)
            .address(&self.initializer.controller)
            .finish_word()
    }
}

/// The address `deployer` gets when deploying code hashing to
/// `init_code_hash` under `salt`.
pub fn compute_address(deployer: &Address, salt: &Word, init_code_hash: &Word) -> Address {
    AddressDeriver::new(DEPLOYMENT_CONTEXT)
        .address(deployer)
        .word(salt)
        .word(init_code_hash)
        .finish()
}
