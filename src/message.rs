use crate::artifacts::Artifacts;
use crate::clock::Clock;
use crate::credentials::Credentials;
use crate::error::*;
use crate::mac::{Mac, MacType};
use crate::payload::PayloadHasher;
use crate::util::random_nonce;

/// Authorization for a message exchanged outside of an HTTP request, for
/// example over a WebSocket.  The message is identified by the host and port
/// of the peer and always carries a payload hash.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MessageAuthorization {
    pub id: String,
    pub ts: u64,
    pub nonce: String,
    pub hash: String,
    pub mac: String,
}

impl MessageAuthorization {
    /// Sign `message` for `host:port`, with the current time according to
    /// `clock` and a fresh nonce.
    pub fn sign<D>(
        host: &str,
        port: u16,
        message: &[u8],
        credentials: &Credentials<D>,
        clock: &Clock,
    ) -> Result<MessageAuthorization> {
        Self::sign_full(host, port, message, credentials, clock.now_secs(), random_nonce())
    }

    /// Similar to `sign`, but allowing specification of the timestamp and nonce.
    pub fn sign_full<D, S>(
        host: &str,
        port: u16,
        message: &[u8],
        credentials: &Credentials<D>,
        ts: u64,
        nonce: S,
    ) -> Result<MessageAuthorization>
    where
        S: Into<String>,
    {
        if host.is_empty() || port == 0 {
            return Err(Error::InvalidInput("message host and port are required".to_string()));
        }
        if credentials.id.is_empty() {
            return Err(Error::InvalidCredentials);
        }
        let key = credentials.signing_key()?;

        let artifacts = Artifacts {
            host: host.to_string(),
            port,
            ts,
            nonce: nonce.into(),
            hash: Some(PayloadHasher::hash("", key.algorithm(), message)?),
            ..Default::default()
        };
        let mac = Mac::new(MacType::Message, &key, &artifacts)?;

        Ok(MessageAuthorization {
            id: credentials.id.clone(),
            ts,
            nonce: artifacts.nonce,
            hash: artifacts.hash.unwrap_or_default(),
            mac: mac.to_string(),
        })
    }
}
