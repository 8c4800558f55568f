use passkey_common::{Address, Word};
use passkey_email_auth::Initializer;

use crate::{InitCode, compute_address};

/// Computes where a wallet's guardian for `(owner, salt)` lives, without
/// deploying anything.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GuardianAddressDeriver {
    wallet: Address,
    implementation: Address,
}

impl GuardianAddressDeriver {
    /// A deriver for guardians that `wallet` deploys behind `implementation`.
    pub const fn new(wallet: Address, implementation: Address) -> Self {
        Self {
            wallet,
            implementation,
        }
    }

    /// The init code deployed for `(owner, salt)`. The wallet is the
    /// guardian's controller.
    pub fn init_code(&self, owner: &Address, salt: &Word) -> InitCode {
        InitCode {
            implementation: self.implementation,
            initializer: Initializer {
                owner: *owner,
                account_salt: *salt,
                controller: self.wallet,
            },
        }
    }

    /// The guardian address for `(owner, salt)`.
    pub fn derive(&self, owner: &Address, salt: &Word) -> Address {
        compute_address(&self.wallet, salt, &self.init_code(owner, salt).hash())
    }
}
