//! Oracle doubles and message builders for tests.

use passkey_common::{Address, Word, named_address};

use crate::{
    CommandTemplate, DkimRegistry, EmailAuthMsg, EmailProof, OracleResolver, ProofVerifier,
};

/// The email domain used by [`TestEmail`].
pub const TEST_DOMAIN: &str = "gmail.com";

/// A proof verifier that answers the same way for every proof.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StaticProofVerifier {
    accept: bool,
}

impl StaticProofVerifier {
    /// Accepts every proof.
    pub const fn accepting() -> Self {
        Self { accept: true }
    }

    /// Rejects every proof.
    pub const fn rejecting() -> Self {
        Self { accept: false }
    }
}

impl ProofVerifier for StaticProofVerifier {
    fn verify_email_proof(&self, _proof: &EmailProof) -> bool {
        self.accept
    }
}

/// A DKIM registry that answers the same way for every key.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StaticDkimRegistry {
    accept: bool,
}

impl StaticDkimRegistry {
    /// Trusts every key.
    pub const fn accepting() -> Self {
        Self { accept: true }
    }

    /// Trusts no key.
    pub const fn rejecting() -> Self {
        Self { accept: false }
    }
}

impl DkimRegistry for StaticDkimRegistry {
    fn is_dkim_public_key_hash_valid(&self, _domain_name: &str, _public_key_hash: &Word) -> bool {
        self.accept
    }
}

/// One proof verifier and one DKIM registry at fixed, named addresses.
#[derive(Debug, Clone, Copy)]
pub struct StaticOracles {
    verifier: StaticProofVerifier,
    dkim: StaticDkimRegistry,
}

impl StaticOracles {
    /// Oracles that accept everything.
    pub const fn accepting() -> Self {
        Self {
            verifier: StaticProofVerifier::accepting(),
            dkim: StaticDkimRegistry::accepting(),
        }
    }

    /// Oracles whose proof verifier rejects everything.
    pub const fn rejecting_proofs() -> Self {
        Self {
            verifier: StaticProofVerifier::rejecting(),
            dkim: StaticDkimRegistry::accepting(),
        }
    }

    /// Oracles whose DKIM registry trusts no key.
    pub const fn rejecting_dkim() -> Self {
        Self {
            verifier: StaticProofVerifier::accepting(),
            dkim: StaticDkimRegistry::rejecting(),
        }
    }

    /// Where the proof verifier lives.
    pub fn verifier_address(&self) -> Address {
        named_address("test proof verifier")
    }

    /// Where the DKIM registry lives.
    pub fn dkim_address(&self) -> Address {
        named_address("test dkim registry")
    }
}

impl OracleResolver for StaticOracles {
    fn proof_verifier(&self, address: &Address) -> Option<&dyn ProofVerifier> {
        (*address == self.verifier_address()).then_some(&self.verifier as &dyn ProofVerifier)
    }

    fn dkim_registry(&self, address: &Address) -> Option<&dyn DkimRegistry> {
        (*address == self.dkim_address()).then_some(&self.dkim as &dyn DkimRegistry)
    }
}

/// Builds an [`EmailAuthMsg`] the way a relayer would after proving an
/// email.
#[derive(Debug, Clone)]
pub struct TestEmail {
    msg: EmailAuthMsg,
}

impl TestEmail {
    /// An email for `template_id` proved for `account_salt`, with no
    /// parameters, nullifier 1, no timestamp and the first-use flag set.
    pub fn new(template_id: Word, account_salt: Word) -> Self {
        Self {
            msg: EmailAuthMsg {
                template_id,
                command_params: Vec::new(),
                skipped_command_prefix: 0,
                proof: EmailProof {
                    domain_name: TEST_DOMAIN.to_owned(),
                    public_key_hash: Word::from(0xd1c0u64),
                    timestamp: 0,
                    masked_command: String::new(),
                    email_nullifier: Word::from(1u64),
                    account_salt,
                    is_code_exist: true,
                    proof: b"test proof".to_vec(),
                },
            },
        }
    }

    /// Set the parameters and the command `template` renders for them.
    ///
    /// # Panics
    ///
    /// Panics if the parameters do not fit the template; use
    /// [`TestEmail::params`] and [`TestEmail::command`] to build a
    /// mismatched email.
    pub fn rendered(mut self, template: &CommandTemplate, params: Vec<Vec<u8>>) -> Self {
        self.msg.proof.masked_command = template
            .render(&params)
            .expect("parameters fit the template");
        self.msg.command_params = params;
        self
    }

    /// Set the parameters without touching the command.
    pub fn params(mut self, params: Vec<Vec<u8>>) -> Self {
        self.msg.command_params = params;
        self
    }

    /// Set the masked command text.
    pub fn command(mut self, command: impl Into<String>) -> Self {
        self.msg.proof.masked_command = command.into();
        self
    }

    /// Prepend `prefix` to the command and declare it skipped.
    pub fn prefix(mut self, prefix: &str) -> Self {
        self.msg.proof.masked_command.insert_str(0, prefix);
        self.msg.skipped_command_prefix = prefix.len();
        self
    }

    /// Set the email nullifier.
    pub fn nullifier(mut self, nullifier: Word) -> Self {
        self.msg.proof.email_nullifier = nullifier;
        self
    }

    /// Set the email timestamp.
    pub fn timestamp(mut self, timestamp: u64) -> Self {
        self.msg.proof.timestamp = timestamp;
        self
    }

    /// Set the first-use flag.
    pub fn first_use(mut self, is_code_exist: bool) -> Self {
        self.msg.proof.is_code_exist = is_code_exist;
        self
    }

    /// Finish the message.
    pub fn build(self) -> EmailAuthMsg {
        self.msg
    }
}
