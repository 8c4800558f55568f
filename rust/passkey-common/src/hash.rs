use crate::{Address, Word};

/// Incrementally derives an [`Address`] from a fixed context string and a
/// sequence of inputs.
///
/// The context string gives domain separation: the same inputs hashed under
/// two different contexts never collide. Each input is length-prefixed so the
/// boundaries between inputs are unambiguous.
///
/// ```rust
/// use passkey_common::{AddressDeriver, Word};
///
/// let first = AddressDeriver::new("example v1").word(&Word::from(1u64)).finish();
/// let again = AddressDeriver::new("example v1").word(&Word::from(1u64)).finish();
/// assert_eq!(first, again);
/// ```
pub struct AddressDeriver {
    hasher: blake3::Hasher,
}

impl AddressDeriver {
    /// Start a derivation under `context`.
    pub fn new(context: &str) -> Self {
        Self {
            hasher: blake3::Hasher::new_derive_key(context),
        }
    }

    /// Absorb a length-prefixed byte string.
    pub fn bytes(mut self, bytes: &[u8]) -> Self {
        self.hasher.update(&(bytes.len() as u64).to_be_bytes());
        self.hasher.update(bytes);
        self
    }

    /// Absorb an address.
    pub fn address(self, address: &Address) -> Self {
        self.bytes(address.as_bytes())
    }

    /// Absorb a word.
    pub fn word(self, word: &Word) -> Self {
        self.bytes(word.as_bytes())
    }

    /// Finish and produce the derived address.
    pub fn finish(self) -> Address {
        Address::from_bytes(self.hasher.finalize().into())
    }

    /// Finish and produce the digest as a word, for hashes that are inputs
    /// to a further derivation rather than locations.
    pub fn finish_word(self) -> Word {
        Word::from_be_bytes(self.hasher.finalize().into())
    }
}

/// Derive a stable address for a named service (an oracle or an
/// implementation) so that fixtures and configuration can refer to it.
pub fn named_address(name: &str) -> Address {
    AddressDeriver::new("passkey-wallet 2024-06 named address")
        .bytes(name.as_bytes())
        .finish()
}
