//! HMAC commitments binding a party to a secret value.

use super::{RandomError, SecureRandomSource};
use hmac::{Hmac, Mac};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use sha3::Sha3_256;
use std::fmt;
use std::str::FromStr;

type HmacSha3 = Hmac<Sha3_256>;

/// 256-bit key for a commitment
#[derive(Clone, PartialEq, Eq)]
pub struct CommitmentKey([u8; 32]);

impl CommitmentKey {
    /// Create from raw bytes
    pub fn from_bytes(bytes: [u8; 32]) -> Self {
        Self(bytes)
    }

    /// Get the underlying bytes
    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }

    /// Uppercase hex, the form published at reveal
    pub fn to_hex(&self) -> String {
        hex::encode_upper(self.0)
    }
}

impl fmt::Debug for CommitmentKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "CommitmentKey(..)")
    }
}

impl fmt::Display for CommitmentKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_hex())
    }
}

impl FromStr for CommitmentKey {
    type Err = hex::FromHexError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut bytes = [0u8; 32];
        hex::decode_to_slice(s, &mut bytes)?;
        Ok(Self(bytes))
    }
}

/// HMAC-SHA3-256 digest, published before the reveal
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct Digest([u8; 32]);

impl Digest {
    /// Create from raw bytes
    pub fn from_bytes(bytes: [u8; 32]) -> Self {
        Self(bytes)
    }

    /// Get the underlying bytes
    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }

    /// Check, in constant time, that `value` under `key` produces this digest
    pub fn matches(&self, value: u64, key: &CommitmentKey) -> bool {
        keyed_mac(value, key).verify_slice(&self.0).is_ok()
    }
}

impl fmt::Debug for Digest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Digest({})", hex::encode_upper(&self.0[..8]))
    }
}

impl fmt::Display for Digest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", hex::encode_upper(self.0))
    }
}

impl FromStr for Digest {
    type Err = hex::FromHexError;

    /// Accepts either hex case
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut bytes = [0u8; 32];
        hex::decode_to_slice(s, &mut bytes)?;
        Ok(Self(bytes))
    }
}

macro_rules! hex_serde {
    ($ty:ty) => {
        impl Serialize for $ty {
            fn serialize<S: Serializer>(&self, s: S) -> Result<S::Ok, S::Error> {
                hex::encode_upper(self.as_bytes()).serialize(s)
            }
        }

        impl<'de> Deserialize<'de> for $ty {
            fn deserialize<D: Deserializer<'de>>(d: D) -> Result<Self, D::Error> {
                let hex_str = String::deserialize(d)?;
                hex_str.parse::<$ty>().map_err(serde::de::Error::custom)
            }
        }
    };
}

hex_serde!(CommitmentKey);
hex_serde!(Digest);

fn keyed_mac(value: u64, key: &CommitmentKey) -> HmacSha3 {
    let mut mac =
        HmacSha3::new_from_slice(key.as_bytes()).expect("HMAC accepts keys of any length");
    mac.update(value.to_string().as_bytes());
    mac
}

/// Commit to `value` under `key`: HMAC-SHA3-256 over its decimal text
pub fn commit(value: u64, key: &CommitmentKey) -> Digest {
    Digest(keyed_mac(value, key).finalize().into_bytes().into())
}

/// Verify a published hex digest against a revealed value and key.
///
/// Case-insensitive; a string that is not a 32-byte hex digest never verifies.
pub fn verify(value: u64, key: &CommitmentKey, digest: &str) -> bool {
    match digest.parse::<Digest>() {
        Ok(digest) => digest.matches(value, key),
        Err(_) => false,
    }
}

/// A secret value bound by its digest, held privately by the committing party
#[derive(Clone)]
pub struct SecretCommitment {
    key: CommitmentKey,
    value: u64,
    digest: Digest,
}

impl SecretCommitment {
    /// Bind `value` under `key`
    pub fn new(value: u64, key: CommitmentKey) -> Self {
        let digest = commit(value, &key);
        Self { key, value, digest }
    }

    /// Draw a fresh key and a uniform secret in `[0, range)`
    pub fn generate<S: SecureRandomSource + ?Sized>(
        source: &mut S,
        range: u64,
    ) -> Result<Self, RandomError> {
        let key = source.generate_key()?;
        let value = source.generate_uniform(range)?;
        Ok(Self::new(value, key))
    }

    /// The public digest
    pub fn digest(&self) -> &Digest {
        &self.digest
    }

    pub fn key(&self) -> &CommitmentKey {
        &self.key
    }

    pub fn value(&self) -> u64 {
        self.value
    }

    /// Consume into the revealed `(value, key)` pair
    pub fn into_opening(self) -> (u64, CommitmentKey) {
        (self.value, self.key)
    }
}

impl fmt::Debug for SecretCommitment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SecretCommitment")
            .field("digest", &self.digest)
            .finish_non_exhaustive()
    }
}
