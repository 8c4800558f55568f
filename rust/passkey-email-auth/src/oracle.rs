use passkey_common::{Address, Word};

use crate::EmailProof;

/// Verifies email zero-knowledge proofs.
///
/// Implementations are trusted: an accepted proof means the public outputs in
/// the [`EmailProof`] are genuine.
pub trait ProofVerifier {
    /// Whether `proof` is valid for its public outputs.
    fn verify_email_proof(&self, proof: &EmailProof) -> bool;
}

/// Answers whether a DKIM public key is trusted for a domain.
pub trait DkimRegistry {
    /// Whether `public_key_hash` is a valid DKIM key for `domain_name`.
    fn is_dkim_public_key_hash_valid(&self, domain_name: &str, public_key_hash: &Word) -> bool;
}

/// Locates oracles by address.
pub trait OracleResolver {
    /// The proof verifier at `address`, if one exists.
    fn proof_verifier(&self, address: &Address) -> Option<&dyn ProofVerifier>;

    /// The DKIM registry at `address`, if one exists.
    fn dkim_registry(&self, address: &Address) -> Option<&dyn DkimRegistry>;
}
