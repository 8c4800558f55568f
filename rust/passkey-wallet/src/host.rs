use std::collections::{BTreeMap, BTreeSet};

use passkey_common::{Address, Word};
use passkey_email_auth::{DkimRegistry, EmailAuth, OracleResolver, ProofVerifier};

use crate::{DeployError, InitCode, compute_address};

/// The environment guardians are deployed into.
///
/// Reads are through shared references; the only write is [`commit`], which
/// applies the [`Changes`] accumulated by a [`Transaction`].
///
/// [`commit`]: ContractHost::commit
pub trait ContractHost: OracleResolver {
    /// Whether `implementation` may be deployed behind a guardian proxy.
    fn is_published(&self, implementation: &Address) -> bool;

    /// The guardian at `address`, if code exists there.
    fn guardian(&self, address: &Address) -> Option<&EmailAuth>;

    /// Apply a transaction's writes.
    fn commit(&mut self, changes: Changes);
}

/// Guardian states written by a [`Transaction`], keyed by address.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Changes {
    guardians: BTreeMap<Address, EmailAuth>,
}

impl Changes {
    /// Whether the transaction wrote nothing.
    pub fn is_empty(&self) -> bool {
        self.guardians.is_empty()
    }

    /// The addresses written to.
    pub fn addresses(&self) -> impl Iterator<Item = &Address> {
        self.guardians.keys()
    }
}

impl IntoIterator for Changes {
    type Item = (Address, EmailAuth);
    type IntoIter = std::collections::btree_map::IntoIter<Address, EmailAuth>;

    fn into_iter(self) -> Self::IntoIter {
        self.guardians.into_iter()
    }
}

/// A [`Transaction`] pairs a host with an overlay of staged guardian
/// states. All writes go to the overlay. All reads first check the overlay,
/// and then fall back to the host.
///
/// Dropping a transaction discards its writes; [`Transaction::into_changes`]
/// hands them over for [`ContractHost::commit`].
pub struct Transaction<'a, H: ContractHost + ?Sized> {
    host: &'a H,
    staged: BTreeMap<Address, EmailAuth>,
}

impl<'a, H: ContractHost + ?Sized> Transaction<'a, H> {
    /// Start a transaction over `host`.
    pub fn begin(host: &'a H) -> Self {
        Self {
            host,
            staged: BTreeMap::new(),
        }
    }

    /// The underlying host, for oracle lookups.
    pub fn host(&self) -> &'a H {
        self.host
    }

    /// Whether code exists at `address`.
    pub fn has_code(&self, address: &Address) -> bool {
        self.guardian(address).is_some()
    }

    /// The guardian at `address` as this transaction sees it.
    pub fn guardian(&self, address: &Address) -> Option<&EmailAuth> {
        self.staged
            .get(address)
            .or_else(|| self.host.guardian(address))
    }

    /// The guardian at `address`, staged for writing.
    pub fn guardian_mut(&mut self, address: &Address) -> Option<&mut EmailAuth> {
        if !self.staged.contains_key(address) {
            let current = self.host.guardian(address)?.clone();
            self.staged.insert(*address, current);
        }
        self.staged.get_mut(address)
    }

    /// Deploy `init_code` from `deployer` under `salt`, returning the address
    /// the guardian now occupies.
    pub fn deploy(
        &mut self,
        deployer: &Address,
        salt: &Word,
        init_code: &InitCode,
    ) -> Result<Address, DeployError> {
        if !self.host.is_published(&init_code.implementation) {
            return Err(DeployError::UnknownImplementation(init_code.implementation));
        }

        let address = compute_address(deployer, salt, &init_code.hash());
        if self.has_code(&address) {
            return Err(DeployError::AlreadyDeployed(address));
        }

        self.staged
            .insert(address, EmailAuth::initialize(init_code.initializer));
        Ok(address)
    }

    /// Finish the transaction, yielding its writes.
    pub fn into_changes(self) -> Changes {
        Changes {
            guardians: self.staged,
        }
    }
}

/// An in-memory [`ContractHost`].
#[derive(Default)]
pub struct MemoryLedger {
    implementations: BTreeSet<Address>,
    guardians: BTreeMap<Address, EmailAuth>,
    proof_verifiers: BTreeMap<Address, Box<dyn ProofVerifier>>,
    dkim_registries: BTreeMap<Address, Box<dyn DkimRegistry>>,
}

impl MemoryLedger {
    /// An empty ledger.
    pub fn new() -> Self {
        Self::default()
    }

    /// Allow `implementation` to be deployed.
    pub fn publish_implementation(&mut self, implementation: Address) {
        self.implementations.insert(implementation);
    }

    /// Place a proof verifier at `address`, replacing any already there.
    pub fn install_proof_verifier<V>(&mut self, address: Address, verifier: V)
    where
        V: ProofVerifier + 'static,
    {
        self.proof_verifiers.insert(address, Box::new(verifier));
    }

    /// Place a DKIM registry at `address`, replacing any already there.
    pub fn install_dkim_registry<D>(&mut self, address: Address, registry: D)
    where
        D: DkimRegistry + 'static,
    {
        self.dkim_registries.insert(address, Box::new(registry));
    }

    /// Place a guardian directly, bypassing deployment.
    pub fn install_guardian(&mut self, address: Address, guardian: EmailAuth) {
        self.guardians.insert(address, guardian);
    }

    /// The number of deployed guardians.
    pub fn guardian_count(&self) -> usize {
        self.guardians.len()
    }
}

impl OracleResolver for MemoryLedger {
    fn proof_verifier(&self, address: &Address) -> Option<&dyn ProofVerifier> {
        self.proof_verifiers.get(address).map(|verifier| verifier.as_ref())
    }

    fn dkim_registry(&self, address: &Address) -> Option<&dyn DkimRegistry> {
        self.dkim_registries.get(address).map(|registry| registry.as_ref())
    }
}

impl ContractHost for MemoryLedger {
    fn is_published(&self, implementation: &Address) -> bool {
        self.implementations.contains(implementation)
    }

    fn guardian(&self, address: &Address) -> Option<&EmailAuth> {
        self.guardians.get(address)
    }

    fn commit(&mut self, changes: Changes) {
        self.guardians.extend(changes);
    }
}
