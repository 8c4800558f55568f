use passkey_common::{Address, WORD_SIZE, Word};
use passkey_email_auth::{CommandTemplateRegistry, EmailAuthMsg};
use passkey_webauthn::PasskeyPublicKey;
use serde::{Deserialize, Serialize};

use crate::{
    BindingError, ContractHost, GuardianProvisioner, ProvisionError, Transaction, WalletConfig,
};

/// A passkey binding, as recorded in the wallet's binding log.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PasskeyBindingRecord {
    /// The guardian that authenticated the binding email.
    pub guardian: Address,
    /// The newly bound key.
    pub public_key: PasskeyPublicKey,
}

/// Validates a binding email end to end.
///
/// The controller only stages host writes in the [`Transaction`] it is
/// given and returns the record to apply; committing and updating the
/// wallet is up to the caller.
#[derive(Debug, Clone, Copy)]
pub struct BindingController<'a> {
    wallet: Address,
    config: &'a WalletConfig,
    registry: &'a CommandTemplateRegistry,
}

impl<'a> BindingController<'a> {
    /// A controller for `wallet`.
    pub fn new(
        wallet: Address,
        config: &'a WalletConfig,
        registry: &'a CommandTemplateRegistry,
    ) -> Self {
        Self {
            wallet,
            config,
            registry,
        }
    }

    /// Check `msg` as a binding command for the guardian of
    /// `(owner, msg.proof.account_salt)` and decode the key it binds.
    pub fn bind<H>(
        &self,
        tx: &mut Transaction<'_, H>,
        msg: &EmailAuthMsg,
        owner: &Address,
        template_index: u64,
    ) -> Result<PasskeyBindingRecord, BindingError>
    where
        H: ContractHost + ?Sized,
    {
        let expected = self.registry.template_id(template_index);
        if msg.template_id != expected {
            return Err(BindingError::TemplateMismatch {
                expected,
                found: msg.template_id,
            });
        }

        let guardian_address = GuardianProvisioner::new(self.wallet, self.config, self.registry)
            .ensure_deployed(tx, owner, &msg.proof.account_salt, msg.proof.is_code_exist)?;

        let host = tx.host();
        tx.guardian_mut(&guardian_address)
            .ok_or(ProvisionError::NotDeployed(guardian_address))?
            .authenticate(&self.wallet, msg, host)?;

        let public_key = decode_public_key(&msg.command_params)?;
        if public_key.verifying_key().is_err() {
            return Err(BindingError::InvalidPasskey);
        }

        Ok(PasskeyBindingRecord {
            guardian: guardian_address,
            public_key,
        })
    }
}

fn decode_public_key(params: &[Vec<u8>]) -> Result<PasskeyPublicKey, BindingError> {
    let malformed = || BindingError::MalformedParameters(params.iter().map(Vec::len).collect());

    match params {
        [x, y] if x.len() == WORD_SIZE && y.len() == WORD_SIZE => Ok(PasskeyPublicKey::new(
            Word::try_from(x.as_slice()).map_err(|_| malformed())?,
            Word::try_from(y.as_slice()).map_err(|_| malformed())?,
        )),
        _ => Err(malformed()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn it_decodes_exactly_two_words() {
        let x = Word::from(3u64);
        let y = Word::from(4u64);
        assert_eq!(
            decode_public_key(&[x.as_bytes().to_vec(), y.as_bytes().to_vec()]),
            Ok(PasskeyPublicKey::new(x, y))
        );
        assert_eq!(
            decode_public_key(&[x.as_bytes().to_vec()]),
            Err(BindingError::MalformedParameters(vec![32]))
        );
        assert_eq!(
            decode_public_key(&[x.as_bytes().to_vec(), vec![0; 31]]),
            Err(BindingError::MalformedParameters(vec![32, 31]))
        );
        assert_eq!(
            decode_public_key(&[vec![], vec![], vec![]]),
            Err(BindingError::MalformedParameters(vec![0, 0, 0]))
        );
    }
}
