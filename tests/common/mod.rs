#![allow(dead_code)]

use async_trait::async_trait;
use hawk_auth::{BoxError, Clock, Credentials, CredentialsResolver, NonceChecker, Server, ServerOptions};
use std::collections::HashSet;
use std::sync::Mutex;

pub const KEY: &str = "werxhqb98rpaxn39848xrunpaw3489ruxnpa98w4rxn";

/// Resolves any id to credentials owned by "steve", using sha1 for id "1" and
/// sha256 otherwise.
pub struct SteveResolver;

#[async_trait]
impl CredentialsResolver for SteveResolver {
    type Data = String;

    async fn resolve(&self, id: &str) -> Result<Option<Credentials<String>>, BoxError> {
        let algorithm = if id == "1" { "sha1" } else { "sha256" };
        Ok(Some(
            Credentials::new(id, KEY, algorithm).with_data("steve".to_string()),
        ))
    }
}

/// Resolves every id to the same result.
pub struct FixedResolver(pub Option<Credentials<String>>);

#[async_trait]
impl CredentialsResolver for FixedResolver {
    type Data = String;

    async fn resolve(&self, _id: &str) -> Result<Option<Credentials<String>>, BoxError> {
        Ok(self.0.clone())
    }
}

pub struct FailingResolver(pub &'static str);

#[async_trait]
impl CredentialsResolver for FailingResolver {
    type Data = String;

    async fn resolve(&self, _id: &str) -> Result<Option<Credentials<String>>, BoxError> {
        Err(self.0.into())
    }
}

/// Remembers every `(key, nonce, ts)` it has seen.
#[derive(Default)]
pub struct MemoryNonceCache {
    seen: Mutex<HashSet<(Vec<u8>, String, u64)>>,
}

#[async_trait]
impl NonceChecker for MemoryNonceCache {
    async fn check(&self, key: &[u8], nonce: &str, ts: u64) -> Result<(), BoxError> {
        let mut seen = self.seen.lock().unwrap();
        if seen.insert((key.to_vec(), nonce.to_string(), ts)) {
            Ok(())
        } else {
            Err(format!("nonce {} already used", nonce).into())
        }
    }
}

pub struct RejectingNonceChecker;

#[async_trait]
impl NonceChecker for RejectingNonceChecker {
    async fn check(&self, _key: &[u8], _nonce: &str, _ts: u64) -> Result<(), BoxError> {
        Err("kaboom".into())
    }
}

/// A server whose clock reads `now_ms`.
pub fn server_at(now_ms: u64) -> Server {
    Server::new(ServerOptions::default().with_clock(Clock::fixed(now_ms)))
}
