use passkey_common::{Address, Word};
use passkey_email_auth::{CommandTemplateRegistry, EmailAuthMsg};
use passkey_webauthn::{PasskeyPublicKey, WebAuthnAssertion};
use tracing::instrument;

use crate::{
    BindingController, BindingError, ContractHost, GuardianAddressDeriver, PasskeyBindingRecord,
    Transaction, WalletConfig,
};

/// A wallet authorized by a passkey that is bound through email.
#[derive(Debug, Clone)]
pub struct PasskeyWallet {
    address: Address,
    config: WalletConfig,
    registry: CommandTemplateRegistry,
    passkey: PasskeyPublicKey,
    log: Vec<PasskeyBindingRecord>,
}

impl PasskeyWallet {
    /// A wallet at `address` accepting the default `Bind Pubkey` grammar,
    /// with no passkey bound.
    pub fn new(address: Address, config: WalletConfig) -> Self {
        Self::with_templates(address, config, CommandTemplateRegistry::bind_passkey())
    }

    /// A wallet whose guardians are set up with a custom grammar.
    pub fn with_templates(
        address: Address,
        config: WalletConfig,
        registry: CommandTemplateRegistry,
    ) -> Self {
        Self {
            address,
            config,
            registry,
            passkey: PasskeyPublicKey::UNSET,
            log: Vec::new(),
        }
    }

    /// The wallet's own address.
    pub fn address(&self) -> &Address {
        &self.address
    }

    /// The wallet's configuration.
    pub fn config(&self) -> &WalletConfig {
        &self.config
    }

    /// The command grammar guardians are set up with.
    pub fn templates(&self) -> &CommandTemplateRegistry {
        &self.registry
    }

    /// The bound passkey, or [`PasskeyPublicKey::UNSET`].
    pub fn passkey(&self) -> &PasskeyPublicKey {
        &self.passkey
    }

    /// Every successful binding, oldest first.
    pub fn binding_log(&self) -> &[PasskeyBindingRecord] {
        &self.log
    }

    /// Bind the passkey carried by an email-proved `msg`.
    ///
    /// The guardian for `(owner, msg.proof.account_salt)` is deployed if
    /// needed, and must accept `msg` under the template at `template_index`.
    /// Nothing is written to `host` and the passkey is unchanged unless the
    /// whole binding succeeds.
    #[instrument(skip_all, fields(wallet = %self.address.display(), owner = %owner.display()))]
    pub fn bind_passkey<H>(
        &mut self,
        host: &mut H,
        msg: &EmailAuthMsg,
        owner: &Address,
        template_index: u64,
    ) -> Result<PasskeyBindingRecord, BindingError>
    where
        H: ContractHost + ?Sized,
    {
        let controller = BindingController::new(self.address, &self.config, &self.registry);
        let mut tx = Transaction::begin(&*host);
        let record = match controller.bind(&mut tx, msg, owner, template_index) {
            Ok(record) => record,
            Err(reason) => {
                tracing::debug!(%reason, "rejecting passkey binding");
                return Err(reason);
            }
        };
        let changes = tx.into_changes();

        host.commit(changes);
        self.passkey = record.public_key;
        self.log.push(record);

        tracing::info!(guardian = %record.guardian.display(), "bound passkey");
        Ok(record)
    }

    /// Whether `assertion` is a valid passkey signature over `challenge` by
    /// the bound key. Always `false` while no key is bound.
    pub fn check_passkey_sig(&self, challenge: &[u8], assertion: &WebAuthnAssertion) -> bool {
        passkey_webauthn::verify(
            assertion,
            challenge,
            self.config.require_user_verification,
            &self.passkey.x,
            &self.passkey.y,
        )
    }

    /// [`check_passkey_sig`](Self::check_passkey_sig) for an assertion still
    /// in its wire envelope. Undecodable envelopes are rejected.
    pub fn check_passkey_envelope(&self, challenge: &[u8], envelope: &[u8]) -> bool {
        match WebAuthnAssertion::from_bytes(envelope) {
            Ok(assertion) => self.check_passkey_sig(challenge, &assertion),
            Err(reason) => {
                tracing::debug!(%reason, "rejecting passkey envelope");
                false
            }
        }
    }

    /// Where the guardian for `(owner, salt)` is or will be deployed.
    pub fn compute_email_auth_address(&self, owner: &Address, salt: &Word) -> Address {
        GuardianAddressDeriver::new(self.address, self.config.email_auth_implementation)
            .derive(owner, salt)
    }

    /// The id of the template at `index`.
    pub fn compute_template_id(&self, index: u64) -> Word {
        self.registry.template_id(index)
    }

    /// Bind `passkey` directly, skipping email authentication.
    #[cfg(any(test, feature = "helpers"))]
    pub fn set_passkey_for_test(&mut self, passkey: PasskeyPublicKey) {
        self.passkey = passkey;
    }
}
