//! `hawk-auth` must perform certain cryptographic operations in order to function,
//! and applications may need control over which library is used for these.
//!
//! This module can be used for that purpose. If you do not care, the `use_ring`
//! feature (on by default) installs a backend built on `ring` the first time
//! any cryptographic operation is needed.
//!
//! If you want to use your own backend, implement [`Cryptographer`] and install
//! it with [`set_cryptographer`] or [`set_boxed_cryptographer`] before doing any
//! other work with this crate.
use crate::DigestAlgorithm;
use thiserror::Error;

mod holder;
pub(crate) use holder::get_crypographer;
pub use holder::{set_boxed_cryptographer, set_cryptographer, SetCryptographerError};

#[cfg(feature = "use_ring")]
mod ring;

#[derive(Error, Debug)]
pub enum CryptoError {
    /// The configured cryptographer does not support the digest algorithm
    /// specified.
    #[error("Unknown algorithm: {0}")]
    UnsupportedDigest(DigestAlgorithm),

    /// The backend reported a failure it could not describe further.
    #[error("{0}")]
    Other(String),
}

/// A keyed MAC, as constructed by [`Cryptographer::new_key`].
pub trait HmacKey: Send + Sync + 'static {
    fn sign(&self, data: &[u8]) -> Result<Vec<u8>, CryptoError>;
}

/// An incremental digest, as constructed by [`Cryptographer::new_hasher`].
///
/// `finish` may only be called once.
pub trait Hasher: Send + Sync + 'static {
    fn update(&mut self, data: &[u8]) -> Result<(), CryptoError>;
    fn finish(&mut self) -> Result<Vec<u8>, CryptoError>;
}

pub trait Cryptographer: Send + Sync + 'static {
    fn new_key(
        &self,
        algorithm: DigestAlgorithm,
        key: &[u8],
    ) -> Result<Box<dyn HmacKey>, CryptoError>;

    fn new_hasher(&self, algorithm: DigestAlgorithm) -> Result<Box<dyn Hasher>, CryptoError>;

    /// Compare two equal-length byte strings without short-circuiting on the
    /// first difference.
    fn constant_time_compare(&self, a: &[u8], b: &[u8]) -> bool;
}

/// Compare `a` and `b` in time that depends only on their lengths.
///
/// When the lengths differ, `a` is still compared against itself in full so
/// that the work done tracks the length of the input rather than returning
/// immediately.
pub fn fixed_time_eq(a: &[u8], b: &[u8]) -> bool {
    let crypto = get_crypographer();
    if a.len() == b.len() {
        crypto.constant_time_compare(a, b)
    } else {
        let _ = crypto.constant_time_compare(a, a);
        false
    }
}
