use std::collections::{BTreeMap, BTreeSet};

use passkey_common::{Address, Word};
use serde::{Deserialize, Serialize};
use tracing::instrument;

use crate::{CommandTemplate, EmailAuthError, EmailAuthMsg, OracleResolver};

/// The arguments a guardian is initialized with at deployment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Initializer {
    /// The email account owner the guardian speaks for.
    pub owner: Address,
    /// Salt binding the owner's email address to the account.
    pub account_salt: Word,
    /// The only address allowed to configure the guardian and submit
    /// messages to it.
    pub controller: Address,
}

/// An email authentication guardian.
///
/// A guardian is deployed once per `(wallet, owner, account salt)` and is
/// configured by its controller: which DKIM registry and proof verifier to
/// trust, and which command templates to accept. Each accepted email is
/// consumed: its nullifier is recorded and cannot be used again.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EmailAuth {
    owner: Address,
    account_salt: Word,
    controller: Address,
    dkim_registry: Option<Address>,
    verifier: Option<Address>,
    templates: BTreeMap<Word, CommandTemplate>,
    used_nullifiers: BTreeSet<Word>,
    last_timestamp: u64,
    timestamp_check_enabled: bool,
}

impl EmailAuth {
    /// A freshly deployed, unconfigured guardian.
    pub fn initialize(initializer: Initializer) -> Self {
        Self {
            owner: initializer.owner,
            account_salt: initializer.account_salt,
            controller: initializer.controller,
            dkim_registry: None,
            verifier: None,
            templates: BTreeMap::new(),
            used_nullifiers: BTreeSet::new(),
            last_timestamp: 0,
            timestamp_check_enabled: true,
        }
    }

    /// The email account owner.
    pub fn owner(&self) -> &Address {
        &self.owner
    }

    /// The account salt emails must be proved for.
    pub fn account_salt(&self) -> &Word {
        &self.account_salt
    }

    /// The controller address.
    pub fn controller(&self) -> &Address {
        &self.controller
    }

    /// The configured DKIM registry.
    pub fn dkim_registry(&self) -> Option<&Address> {
        self.dkim_registry.as_ref()
    }

    /// The configured proof verifier.
    pub fn verifier(&self) -> Option<&Address> {
        self.verifier.as_ref()
    }

    /// The template registered under `id`.
    pub fn command_template(&self, id: &Word) -> Option<&CommandTemplate> {
        self.templates.get(id)
    }

    /// Every registered template id, in ascending order.
    pub fn template_ids(&self) -> impl Iterator<Item = &Word> {
        self.templates.keys()
    }

    /// Whether an email with this nullifier has been accepted.
    pub fn is_nullifier_used(&self, nullifier: &Word) -> bool {
        self.used_nullifiers.contains(nullifier)
    }

    /// The timestamp of the last accepted, dated email.
    pub fn last_timestamp(&self) -> u64 {
        self.last_timestamp
    }

    /// Whether emails must carry increasing timestamps.
    pub fn timestamp_check_enabled(&self) -> bool {
        self.timestamp_check_enabled
    }

    /// Trust the DKIM registry at `dkim_registry`. Controller only.
    pub fn update_dkim_registry(
        &mut self,
        caller: &Address,
        dkim_registry: Address,
    ) -> Result<(), EmailAuthError> {
        self.only_controller(caller)?;
        self.dkim_registry = Some(dkim_registry);
        Ok(())
    }

    /// Trust the proof verifier at `verifier`. Controller only.
    pub fn update_verifier(
        &mut self,
        caller: &Address,
        verifier: Address,
    ) -> Result<(), EmailAuthError> {
        self.only_controller(caller)?;
        self.verifier = Some(verifier);
        Ok(())
    }

    /// Register a template under a new id.
    pub fn insert_command_template(
        &mut self,
        caller: &Address,
        id: Word,
        template: CommandTemplate,
    ) -> Result<(), EmailAuthError> {
        self.only_controller(caller)?;
        if self.templates.contains_key(&id) {
            return Err(EmailAuthError::TemplateAlreadyExists(id));
        }
        self.templates.insert(id, template);
        Ok(())
    }

    /// Replace the template registered under `id`.
    pub fn update_command_template(
        &mut self,
        caller: &Address,
        id: Word,
        template: CommandTemplate,
    ) -> Result<(), EmailAuthError> {
        self.only_controller(caller)?;
        let slot = self
            .templates
            .get_mut(&id)
            .ok_or(EmailAuthError::TemplateNotFound(id))?;
        *slot = template;
        Ok(())
    }

    /// Remove the template registered under `id`.
    pub fn delete_command_template(
        &mut self,
        caller: &Address,
        id: &Word,
    ) -> Result<(), EmailAuthError> {
        self.only_controller(caller)?;
        self.templates
            .remove(id)
            .map(|_| ())
            .ok_or(EmailAuthError::TemplateNotFound(*id))
    }

    /// Turn the timestamp ordering check on or off.
    pub fn set_timestamp_check_enabled(
        &mut self,
        caller: &Address,
        enabled: bool,
    ) -> Result<(), EmailAuthError> {
        self.only_controller(caller)?;
        self.timestamp_check_enabled = enabled;
        Ok(())
    }

    /// Authenticate an email command.
    ///
    /// On success the email's nullifier is consumed and its timestamp becomes
    /// the lower bound for the next email. On failure nothing changes.
    #[instrument(skip_all, fields(caller = %caller.display(), template_id = %msg.template_id))]
    pub fn authenticate<R>(
        &mut self,
        caller: &Address,
        msg: &EmailAuthMsg,
        oracles: &R,
    ) -> Result<(), EmailAuthError>
    where
        R: OracleResolver + ?Sized,
    {
        let result = self.check(caller, msg, oracles);
        match &result {
            Ok(()) => {
                self.used_nullifiers.insert(msg.proof.email_nullifier);
                if self.timestamp_check_enabled && msg.proof.timestamp != 0 {
                    self.last_timestamp = msg.proof.timestamp;
                }
            }
            Err(reason) => tracing::debug!(%reason, "rejecting email command"),
        }
        result
    }

    fn check<R>(
        &self,
        caller: &Address,
        msg: &EmailAuthMsg,
        oracles: &R,
    ) -> Result<(), EmailAuthError>
    where
        R: OracleResolver + ?Sized,
    {
        let proof = &msg.proof;
        self.only_controller(caller)?;

        let template = self
            .templates
            .get(&msg.template_id)
            .ok_or(EmailAuthError::TemplateNotFound(msg.template_id))?;

        let dkim_address = self
            .dkim_registry
            .ok_or(EmailAuthError::DkimRegistryNotSet)?;
        let dkim = oracles
            .dkim_registry(&dkim_address)
            .ok_or(EmailAuthError::OracleUnavailable(dkim_address))?;
        if !dkim.is_dkim_public_key_hash_valid(&proof.domain_name, &proof.public_key_hash) {
            return Err(EmailAuthError::InvalidDkimPublicKeyHash(
                proof.domain_name.clone(),
            ));
        }

        if self.used_nullifiers.contains(&proof.email_nullifier) {
            return Err(EmailAuthError::EmailNullifierUsed(proof.email_nullifier));
        }

        if proof.account_salt != self.account_salt {
            return Err(EmailAuthError::AccountSaltMismatch);
        }

        if self.timestamp_check_enabled
            && proof.timestamp != 0
            && proof.timestamp <= self.last_timestamp
        {
            return Err(EmailAuthError::InvalidTimestamp {
                last: self.last_timestamp,
                received: proof.timestamp,
            });
        }

        let command = proof
            .masked_command
            .get(msg.skipped_command_prefix..)
            .ok_or(EmailAuthError::InvalidSkippedPrefix(
                msg.skipped_command_prefix,
            ))?;
        if template.render(&msg.command_params)? != command {
            return Err(EmailAuthError::CommandMismatch);
        }

        let verifier_address = self.verifier.ok_or(EmailAuthError::VerifierNotSet)?;
        let verifier = oracles
            .proof_verifier(&verifier_address)
            .ok_or(EmailAuthError::OracleUnavailable(verifier_address))?;
        if !verifier.verify_email_proof(proof) {
            return Err(EmailAuthError::InvalidEmailProof);
        }

        Ok(())
    }

    fn only_controller(&self, caller: &Address) -> Result<(), EmailAuthError> {
        if caller == &self.controller {
            Ok(())
        } else {
            Err(EmailAuthError::Unauthorized(*caller))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{CommandTemplateRegistry, StaticOracles, TestEmail};
    use passkey_common::named_address;

    fn controller() -> Address {
        named_address("wallet")
    }

    fn configured() -> (EmailAuth, StaticOracles, CommandTemplateRegistry) {
        let oracles = StaticOracles::accepting();
        let registry = CommandTemplateRegistry::bind_passkey();
        let mut guardian = EmailAuth::initialize(Initializer {
            owner: named_address("owner"),
            account_salt: Word::from(77u64),
            controller: controller(),
        });
        guardian
            .update_dkim_registry(&controller(), oracles.dkim_address())
            .unwrap();
        guardian
            .update_verifier(&controller(), oracles.verifier_address())
            .unwrap();
        for (id, template) in registry.entries() {
            guardian
                .insert_command_template(&controller(), id, template.clone())
                .unwrap();
        }
        (guardian, oracles, registry)
    }

    fn bind_email(registry: &CommandTemplateRegistry) -> TestEmail {
        TestEmail::new(registry.template_id(0), Word::from(77u64)).rendered(
            &registry.templates()[0],
            vec![Word::from(1u64).as_bytes().to_vec(), Word::from(2u64).as_bytes().to_vec()],
        )
    }

    #[test]
    fn it_only_lets_the_controller_configure() {
        let (mut guardian, _, registry) = configured();
        let stranger = named_address("stranger");
        assert_eq!(
            guardian.update_verifier(&stranger, stranger),
            Err(EmailAuthError::Unauthorized(stranger))
        );
        assert_eq!(
            guardian.delete_command_template(&stranger, &registry.template_id(0)),
            Err(EmailAuthError::Unauthorized(stranger))
        );
        assert_eq!(
            guardian.set_timestamp_check_enabled(&stranger, false),
            Err(EmailAuthError::Unauthorized(stranger))
        );
    }

    #[test]
    fn it_manages_templates_by_id() {
        let (mut guardian, _, registry) = configured();
        let id = registry.template_id(0);
        let template = registry.templates()[0].clone();
        let other: CommandTemplate = "Unbind Pubkey".parse().unwrap();

        assert_eq!(
            guardian.insert_command_template(&controller(), id, template),
            Err(EmailAuthError::TemplateAlreadyExists(id))
        );
        guardian
            .update_command_template(&controller(), id, other.clone())
            .unwrap();
        assert_eq!(guardian.command_template(&id), Some(&other));

        guardian.delete_command_template(&controller(), &id).unwrap();
        assert_eq!(
            guardian.delete_command_template(&controller(), &id),
            Err(EmailAuthError::TemplateNotFound(id))
        );
        assert_eq!(
            guardian.update_command_template(&controller(), id, other),
            Err(EmailAuthError::TemplateNotFound(id))
        );
    }

    #[test]
    fn it_accepts_a_well_formed_email_once() {
        let (mut guardian, oracles, registry) = configured();
        let msg = bind_email(&registry).timestamp(100).build();

        guardian.authenticate(&controller(), &msg, &oracles).unwrap();
        assert!(guardian.is_nullifier_used(&msg.proof.email_nullifier));
        assert_eq!(guardian.last_timestamp(), 100);

        assert_eq!(
            guardian.authenticate(&controller(), &msg, &oracles),
            Err(EmailAuthError::EmailNullifierUsed(msg.proof.email_nullifier))
        );
    }

    #[test]
    fn it_rejects_a_message_from_anyone_but_the_controller() {
        let (mut guardian, oracles, registry) = configured();
        let msg = bind_email(&registry).build();
        let before = guardian.clone();

        let stranger = named_address("stranger");
        assert_eq!(
            guardian.authenticate(&stranger, &msg, &oracles),
            Err(EmailAuthError::Unauthorized(stranger))
        );
        assert_eq!(guardian, before);
    }

    #[test]
    fn it_requires_strictly_newer_timestamps_when_enabled() {
        let (mut guardian, oracles, registry) = configured();
        let first = bind_email(&registry).nullifier(Word::from(1u64)).timestamp(100).build();
        let stale = bind_email(&registry).nullifier(Word::from(2u64)).timestamp(100).build();
        let undated = bind_email(&registry).nullifier(Word::from(3u64)).timestamp(0).build();

        guardian.authenticate(&controller(), &first, &oracles).unwrap();
        assert_eq!(
            guardian.authenticate(&controller(), &stale, &oracles),
            Err(EmailAuthError::InvalidTimestamp {
                last: 100,
                received: 100
            })
        );
        guardian.authenticate(&controller(), &undated, &oracles).unwrap();

        guardian
            .set_timestamp_check_enabled(&controller(), false)
            .unwrap();
        guardian.authenticate(&controller(), &stale, &oracles).unwrap();
    }

    #[test]
    fn it_rejects_a_command_that_differs_from_the_template() {
        let (mut guardian, oracles, registry) = configured();
        let msg = bind_email(&registry).command("Bind Pubkey 1 3").build();
        assert_eq!(
            guardian.authenticate(&controller(), &msg, &oracles),
            Err(EmailAuthError::CommandMismatch)
        );
    }

    #[test]
    fn it_skips_the_declared_prefix() {
        let (mut guardian, oracles, registry) = configured();
        let msg = bind_email(&registry).prefix("Re: ").build();
        guardian.authenticate(&controller(), &msg, &oracles).unwrap();

        let mut bad = bind_email(&registry).nullifier(Word::from(9u64)).build();
        bad.skipped_command_prefix = bad.proof.masked_command.len() + 1;
        assert_eq!(
            guardian.authenticate(&controller(), &bad, &oracles),
            Err(EmailAuthError::InvalidSkippedPrefix(bad.skipped_command_prefix))
        );
    }

    #[test]
    fn it_rejects_an_email_for_another_account() {
        let (mut guardian, oracles, registry) = configured();
        let mut msg = bind_email(&registry).build();
        msg.proof.account_salt = Word::from(78u64);
        assert_eq!(
            guardian.authenticate(&controller(), &msg, &oracles),
            Err(EmailAuthError::AccountSaltMismatch)
        );
    }

    #[test]
    fn it_defers_to_the_oracles() {
        let (mut guardian, _, registry) = configured();
        let msg = bind_email(&registry).build();

        let untrusted_key = StaticOracles::rejecting_dkim();
        assert_eq!(
            guardian.authenticate(&controller(), &msg, &untrusted_key),
            Err(EmailAuthError::InvalidDkimPublicKeyHash(msg.proof.domain_name.clone()))
        );

        let bad_proof = StaticOracles::rejecting_proofs();
        assert_eq!(
            guardian.authenticate(&controller(), &msg, &bad_proof),
            Err(EmailAuthError::InvalidEmailProof)
        );
        assert!(!guardian.is_nullifier_used(&msg.proof.email_nullifier));
    }

    #[test]
    fn it_requires_configured_oracles() {
        let oracles = StaticOracles::accepting();
        let registry = CommandTemplateRegistry::bind_passkey();
        let mut guardian = EmailAuth::initialize(Initializer {
            owner: named_address("owner"),
            account_salt: Word::from(77u64),
            controller: controller(),
        });
        for (id, template) in registry.entries() {
            guardian
                .insert_command_template(&controller(), id, template.clone())
                .unwrap();
        }
        let msg = bind_email(&registry).build();

        assert_eq!(
            guardian.authenticate(&controller(), &msg, &oracles),
            Err(EmailAuthError::DkimRegistryNotSet)
        );
        guardian
            .update_dkim_registry(&controller(), oracles.dkim_address())
            .unwrap();
        assert_eq!(
            guardian.authenticate(&controller(), &msg, &oracles),
            Err(EmailAuthError::VerifierNotSet)
        );
        let nowhere = named_address("nowhere");
        guardian.update_verifier(&controller(), nowhere).unwrap();
        assert_eq!(
            guardian.authenticate(&controller(), &msg, &oracles),
            Err(EmailAuthError::OracleUnavailable(nowhere))
        );
    }
}
