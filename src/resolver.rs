use crate::credentials::Credentials;
use crate::error::BoxError;
use async_trait::async_trait;
use std::collections::HashMap;

/// Looks up the credentials for a Hawk id.
///
/// Return `Ok(None)` for an id that is not known; this is reported to the
/// client as "Unknown credentials".  An `Err` is a failure of the lookup
/// itself and is passed back to the caller unchanged, as the source of an
/// `AuthError` of kind `Resolver`.
#[async_trait]
pub trait CredentialsResolver: Send + Sync {
    /// Application data attached to the credentials.
    type Data: Send + Sync;

    async fn resolve(&self, id: &str) -> Result<Option<Credentials<Self::Data>>, BoxError>;
}

#[async_trait]
impl<D> CredentialsResolver for HashMap<String, Credentials<D>>
where
    D: Clone + Send + Sync,
{
    type Data = D;

    async fn resolve(&self, id: &str) -> Result<Option<Credentials<D>>, BoxError> {
        Ok(self.get(id).cloned())
    }
}

/// Rejects replayed requests.
///
/// `check` is called once the request MAC has been verified, with the key of
/// the credentials that signed the request, the nonce, and the timestamp.  It
/// must fail if the same `(key, nonce, ts)` has been seen before within the
/// timestamp skew window.  Scoping by key means that two clients with
/// different keys never collide, even if they choose the same nonce.
#[async_trait]
pub trait NonceChecker: Send + Sync {
    async fn check(&self, key: &[u8], nonce: &str, ts: u64) -> Result<(), BoxError>;
}
