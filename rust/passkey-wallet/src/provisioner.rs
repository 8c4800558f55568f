use passkey_common::{Address, Word};
use passkey_email_auth::CommandTemplateRegistry;
use tracing::instrument;

use crate::{ContractHost, GuardianAddressDeriver, ProvisionError, Transaction, WalletConfig};

/// Deploys a wallet's guardians on first use and validates them on reuse.
#[derive(Debug, Clone, Copy)]
pub struct GuardianProvisioner<'a> {
    wallet: Address,
    deriver: GuardianAddressDeriver,
    config: &'a WalletConfig,
    registry: &'a CommandTemplateRegistry,
}

impl<'a> GuardianProvisioner<'a> {
    /// A provisioner acting for `wallet`.
    pub fn new(
        wallet: Address,
        config: &'a WalletConfig,
        registry: &'a CommandTemplateRegistry,
    ) -> Self {
        Self {
            wallet,
            deriver: GuardianAddressDeriver::new(wallet, config.email_auth_implementation),
            config,
            registry,
        }
    }

    /// Make sure the guardian for `(owner, salt)` exists and belongs to this
    /// wallet, returning its address.
    ///
    /// If there is no code at the derived address, the email must assert
    /// first use (`is_code_exist`). The guardian is then deployed and
    /// configured with the wallet's DKIM registry, proof verifier and every
    /// command template. If code exists, the guardian's controller and
    /// oracles must match this wallet and its configuration; templates are
    /// left untouched.
    #[instrument(skip_all, fields(owner = %owner.display(), salt = %salt))]
    pub fn ensure_deployed<H>(
        &self,
        tx: &mut Transaction<'_, H>,
        owner: &Address,
        salt: &Word,
        is_code_exist: bool,
    ) -> Result<Address, ProvisionError>
    where
        H: ContractHost + ?Sized,
    {
        let expected = self.deriver.derive(owner, salt);

        match tx.guardian(&expected) {
            Some(guardian) => {
                if guardian.controller() != &self.wallet {
                    return Err(ProvisionError::ControllerMismatch {
                        guardian: expected,
                        controller: *guardian.controller(),
                    });
                }
                if guardian.verifier() != Some(&self.config.proof_verifier)
                    || guardian.dkim_registry() != Some(&self.config.dkim_registry)
                {
                    return Err(ProvisionError::GuardianConfigMismatch(expected));
                }
                tracing::debug!(guardian = %expected.display(), "reusing guardian");
                Ok(expected)
            }
            None => {
                if !is_code_exist {
                    return Err(ProvisionError::FirstUseViolation(expected));
                }

                let init_code = self.deriver.init_code(owner, salt);
                let deployed = tx.deploy(&self.wallet, salt, &init_code)?;
                if deployed != expected {
                    return Err(ProvisionError::AddressMismatch { expected, deployed });
                }

                let guardian = tx
                    .guardian_mut(&deployed)
                    .ok_or(ProvisionError::NotDeployed(deployed))?;
                guardian
                    .update_dkim_registry(&self.wallet, self.config.dkim_registry)
                    .map_err(ProvisionError::Setup)?;
                guardian
                    .update_verifier(&self.wallet, self.config.proof_verifier)
                    .map_err(ProvisionError::Setup)?;
                for (id, template) in self.registry.entries() {
                    guardian
                        .insert_command_template(&self.wallet, id, template.clone())
                        .map_err(ProvisionError::Setup)?;
                }

                tracing::info!(guardian = %deployed.display(), "deployed guardian");
                Ok(deployed)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::MemoryLedger;
    use passkey_common::named_address;
    use passkey_email_auth::{EmailAuth, Initializer};

    fn config() -> WalletConfig {
        WalletConfig::new(
            named_address("verifier"),
            named_address("dkim"),
            named_address("email auth"),
        )
    }

    fn ledger() -> MemoryLedger {
        let mut ledger = MemoryLedger::new();
        ledger.publish_implementation(named_address("email auth"));
        ledger.publish_implementation(named_address("other email auth"));
        ledger
    }

    #[test]
    fn it_deploys_and_configures_on_first_use() {
        let mut ledger = ledger();
        let config = config();
        let registry = CommandTemplateRegistry::bind_passkey();
        let wallet = named_address("wallet");
        let provisioner = GuardianProvisioner::new(wallet, &config, &registry);
        let owner = named_address("owner");
        let salt = Word::from(1u64);

        let mut tx = Transaction::begin(&ledger);
        let address = provisioner
            .ensure_deployed(&mut tx, &owner, &salt, true)
            .unwrap();
        let changes = tx.into_changes();
        ledger.commit(changes);

        assert_eq!(
            address,
            GuardianAddressDeriver::new(wallet, config.email_auth_implementation)
                .derive(&owner, &salt)
        );
        let guardian = ledger.guardian(&address).unwrap();
        assert_eq!(guardian.controller(), &wallet);
        assert_eq!(guardian.owner(), &owner);
        assert_eq!(guardian.account_salt(), &salt);
        assert_eq!(guardian.verifier(), Some(&config.proof_verifier));
        assert_eq!(guardian.dkim_registry(), Some(&config.dkim_registry));
        assert_eq!(
            guardian.command_template(&registry.template_id(0)),
            registry.template(0)
        );
    }

    #[test]
    fn it_requires_first_use_when_absent() {
        let ledger = ledger();
        let config = config();
        let registry = CommandTemplateRegistry::bind_passkey();
        let provisioner = GuardianProvisioner::new(named_address("wallet"), &config, &registry);

        let mut tx = Transaction::begin(&ledger);
        assert!(matches!(
            provisioner.ensure_deployed(&mut tx, &named_address("owner"), &Word::from(1u64), false),
            Err(ProvisionError::FirstUseViolation(_))
        ));
        assert!(tx.into_changes().is_empty());
    }

    #[test]
    fn it_reports_a_derivation_that_disagrees_with_deployment() {
        let ledger = ledger();
        let config = config();
        let registry = CommandTemplateRegistry::bind_passkey();
        let owner = named_address("owner");
        let salt = Word::from(1u64);
        let mut provisioner = GuardianProvisioner::new(named_address("wallet"), &config, &registry);
        // derive as if another wallet were deploying
        provisioner.deriver =
            GuardianAddressDeriver::new(named_address("elsewhere"), config.email_auth_implementation);
        let derived = provisioner.deriver.derive(&owner, &salt);

        let mut tx = Transaction::begin(&ledger);
        assert!(matches!(
            provisioner.ensure_deployed(&mut tx, &owner, &salt, true),
            Err(ProvisionError::AddressMismatch { expected, deployed })
                if expected == derived && deployed != derived
        ));
    }

    #[test]
    fn it_rejects_guardians_of_other_wallets() {
        let mut ledger = ledger();
        let config = config();
        let registry = CommandTemplateRegistry::bind_passkey();
        let wallet = named_address("wallet");
        let owner = named_address("owner");
        let salt = Word::from(1u64);
        let provisioner = GuardianProvisioner::new(wallet, &config, &registry);
        let address = GuardianAddressDeriver::new(wallet, config.email_auth_implementation)
            .derive(&owner, &salt);

        ledger.install_guardian(
            address,
            EmailAuth::initialize(Initializer {
                owner,
                account_salt: salt,
                controller: named_address("intruder"),
            }),
        );

        let mut tx = Transaction::begin(&ledger);
        assert_eq!(
            provisioner.ensure_deployed(&mut tx, &owner, &salt, false),
            Err(ProvisionError::ControllerMismatch {
                guardian: address,
                controller: named_address("intruder"),
            })
        );
    }

    #[test]
    fn it_rejects_guardians_with_stale_oracles() {
        let mut ledger = ledger();
        let config = config();
        let registry = CommandTemplateRegistry::bind_passkey();
        let wallet = named_address("wallet");
        let owner = named_address("owner");
        let salt = Word::from(1u64);
        let provisioner = GuardianProvisioner::new(wallet, &config, &registry);
        let address = GuardianAddressDeriver::new(wallet, config.email_auth_implementation)
            .derive(&owner, &salt);

        let mut guardian = EmailAuth::initialize(Initializer {
            owner,
            account_salt: salt,
            controller: wallet,
        });
        guardian
            .update_dkim_registry(&wallet, config.dkim_registry)
            .unwrap();
        guardian
            .update_verifier(&wallet, named_address("retired verifier"))
            .unwrap();
        ledger.install_guardian(address, guardian);

        let mut tx = Transaction::begin(&ledger);
        assert_eq!(
            provisioner.ensure_deployed(&mut tx, &owner, &salt, false),
            Err(ProvisionError::GuardianConfigMismatch(address))
        );
    }
}
