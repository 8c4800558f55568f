use std::{fmt, str::FromStr};

use num_bigint::BigUint;
use serde::{Deserialize, Deserializer, Serialize};

use crate::PrimitiveError;

/// The size of a [`Word`] in bytes.
pub const WORD_SIZE: usize = 32;

/// A 256-bit unsigned integer stored as 32 big-endian bytes.
///
/// Words carry curve coordinates, signature scalars, salts, nullifiers and
/// template identifiers. The textual form is canonical unsigned decimal (no
/// sign, no leading zeros, no separators), which is also how words appear
/// inside email commands.
///
/// ```rust
/// use passkey_common::Word;
///
/// let word: Word = "1024".parse().unwrap();
/// assert_eq!(word, Word::from(1024u64));
/// assert_eq!(word.to_string(), "1024");
/// ```
#[derive(Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[repr(transparent)]
pub struct Word([u8; WORD_SIZE]);

impl Word {
    /// The all-zero word.
    pub const ZERO: Word = Word([0; WORD_SIZE]);

    /// Wrap 32 big-endian bytes.
    pub const fn from_be_bytes(bytes: [u8; WORD_SIZE]) -> Self {
        Self(bytes)
    }

    /// The 32 big-endian bytes of this word.
    pub const fn to_be_bytes(self) -> [u8; WORD_SIZE] {
        self.0
    }

    /// Borrow the big-endian bytes.
    pub const fn as_bytes(&self) -> &[u8; WORD_SIZE] {
        &self.0
    }

    /// Whether every byte is zero.
    pub fn is_zero(&self) -> bool {
        self.0 == [0; WORD_SIZE]
    }

    /// Render as canonical unsigned decimal.
    pub fn to_decimal(&self) -> String {
        BigUint::from_bytes_be(&self.0).to_str_radix(10)
    }

    /// Parse canonical unsigned decimal.
    ///
    /// Only ASCII digits are accepted and leading zeros are rejected (except
    /// for `"0"` itself), so that parsing and rendering are exact inverses.
    pub fn from_decimal(text: &str) -> Result<Self, PrimitiveError> {
        let canonical = !text.is_empty()
            && text.bytes().all(|byte| byte.is_ascii_digit())
            && (text == "0" || !text.starts_with('0'));
        if !canonical {
            return Err(PrimitiveError::InvalidDecimal(text.to_owned()));
        }

        let value = BigUint::parse_bytes(text.as_bytes(), 10)
            .ok_or_else(|| PrimitiveError::InvalidDecimal(text.to_owned()))?;
        let bytes = value.to_bytes_be();
        if bytes.len() > WORD_SIZE {
            return Err(PrimitiveError::Overflow);
        }

        let mut word = [0u8; WORD_SIZE];
        word[WORD_SIZE - bytes.len()..].copy_from_slice(&bytes);
        Ok(Self(word))
    }
}

impl From<[u8; WORD_SIZE]> for Word {
    fn from(bytes: [u8; WORD_SIZE]) -> Self {
        Self(bytes)
    }
}

impl From<u64> for Word {
    fn from(value: u64) -> Self {
        let mut bytes = [0u8; WORD_SIZE];
        bytes[WORD_SIZE - 8..].copy_from_slice(&value.to_be_bytes());
        Self(bytes)
    }
}

impl TryFrom<&[u8]> for Word {
    type Error = PrimitiveError;

    fn try_from(value: &[u8]) -> Result<Self, Self::Error> {
        let bytes: [u8; WORD_SIZE] =
            value
                .try_into()
                .map_err(|_| PrimitiveError::InvalidLength {
                    expected: WORD_SIZE,
                    actual: value.len(),
                })?;
        Ok(Self(bytes))
    }
}

impl AsRef<[u8]> for Word {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}

impl fmt::Display for Word {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_decimal())
    }
}

impl fmt::Debug for Word {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Word({})", self.to_decimal())
    }
}

impl FromStr for Word {
    type Err = PrimitiveError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_decimal(s)
    }
}

impl Serialize for Word {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(&self.to_decimal())
    }
}

impl<'de> Deserialize<'de> for Word {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        struct DecimalVisitor;

        impl serde::de::Visitor<'_> for DecimalVisitor {
            type Value = Word;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("a canonical decimal string holding a 256-bit unsigned integer")
            }

            fn visit_str<E>(self, v: &str) -> Result<Self::Value, E>
            where
                E: serde::de::Error,
            {
                v.parse().map_err(E::custom)
            }
        }

        deserializer.deserialize_str(DecimalVisitor)
    }
}
