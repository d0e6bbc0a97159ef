use crate::crypto::{self, HmacKey};
use crate::error::*;
use std::fmt;
use std::str::FromStr;

/// The digest algorithms Hawk supports.  The set is closed: credentials naming
/// any other algorithm are rejected rather than falling back to a default.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[non_exhaustive]
pub enum DigestAlgorithm {
    Sha1,
    Sha256,
}

impl DigestAlgorithm {
    /// The name of this algorithm as it appears in credentials.
    pub fn name(&self) -> &'static str {
        match self {
            DigestAlgorithm::Sha1 => "sha1",
            DigestAlgorithm::Sha256 => "sha256",
        }
    }
}

impl FromStr for DigestAlgorithm {
    type Err = Error;
    fn from_str(s: &str) -> Result<DigestAlgorithm> {
        match s {
            "sha1" => Ok(DigestAlgorithm::Sha1),
            "sha256" => Ok(DigestAlgorithm::Sha256),
            _ => Err(Error::UnknownAlgorithm),
        }
    }
}

impl fmt::Display for DigestAlgorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Hawk key.
///
/// While any sequence of bytes can be specified as a key, note that each digest algorithm has
/// a suggested key length, and that passwords should *not* be used as keys.  Keys of incorrect
/// length are handled according to the digest's implementation.
pub struct Key {
    key: Box<dyn HmacKey>,
    algorithm: DigestAlgorithm,
}

impl Key {
    pub fn new<B>(key: B, algorithm: DigestAlgorithm) -> Result<Key>
    where
        B: AsRef<[u8]>,
    {
        Ok(Key {
            key: crypto::get_crypographer().new_key(algorithm, key.as_ref())?,
            algorithm,
        })
    }

    pub fn sign(&self, data: &[u8]) -> Result<Vec<u8>> {
        Ok(self.key.sign(data)?)
    }

    pub fn algorithm(&self) -> DigestAlgorithm {
        self.algorithm
    }
}

impl fmt::Debug for Key {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Key")
            .field("algorithm", &self.algorithm)
            .finish_non_exhaustive()
    }
}

/// Hawk credentials: an ID, a key associated with that ID, and the digest
/// algorithm used with that key.  The algorithm must be agreed between the
/// server and the client.
///
/// `data` carries whatever the application associates with the credentials
/// (a user record, scopes, ...).  It is handed back untouched on successful
/// authentication.
#[derive(Clone, PartialEq, Eq)]
pub struct Credentials<D = ()> {
    pub id: String,
    pub key: Vec<u8>,
    /// The algorithm name, `sha1` or `sha256`.
    pub algorithm: String,
    pub data: D,
}

impl Credentials<()> {
    pub fn new<I, K, A>(id: I, key: K, algorithm: A) -> Self
    where
        I: Into<String>,
        K: Into<Vec<u8>>,
        A: ToString,
    {
        Credentials {
            id: id.into(),
            key: key.into(),
            algorithm: algorithm.to_string(),
            data: (),
        }
    }
}

impl<D> Credentials<D> {
    /// Attach application data to these credentials.
    pub fn with_data<E>(self, data: E) -> Credentials<E> {
        Credentials {
            id: self.id,
            key: self.key,
            algorithm: self.algorithm,
            data,
        }
    }

    /// Check the credentials and build the key used to sign with them.
    ///
    /// An empty key or algorithm is `Error::InvalidCredentials`; an algorithm
    /// outside the supported set is `Error::UnknownAlgorithm`.
    pub fn signing_key(&self) -> Result<Key> {
        if self.key.is_empty() || self.algorithm.is_empty() {
            return Err(Error::InvalidCredentials);
        }
        let algorithm = self.algorithm.parse::<DigestAlgorithm>()?;
        Key::new(&self.key, algorithm)
    }
}

impl<D: fmt::Debug> fmt::Debug for Credentials<D> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("id", &self.id)
            .field("key", &"<redacted>")
            .field("algorithm", &self.algorithm)
            .field("data", &self.data)
            .finish()
    }
}
