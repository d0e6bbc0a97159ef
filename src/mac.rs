use crate::artifacts::Artifacts;
use crate::b64;
use crate::credentials::Key;
use crate::crypto::fixed_time_eq;
use crate::error::*;
use crate::HEADER_VERSION;
use base64::Engine;
use std::fmt;
use std::io::Write;
use url::Url;

/// The kind of MAC being computed; each kind uses a different prefix in the
/// normalized string so that a MAC of one kind cannot be replayed as another.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MacType {
    Header,
    Response,
    Bewit,
    Message,
}

impl MacType {
    fn name(&self) -> &'static str {
        match self {
            MacType::Header => "header",
            MacType::Response => "response",
            MacType::Bewit => "bewit",
            MacType::Message => "message",
        }
    }
}

/// Build the normalized string covered by a MAC of the given type.
///
/// The string always has the same number of lines: optional values that are
/// absent contribute an empty line.  `app` and `dlg` are appended only when
/// `app` is non-empty.
pub fn normalized_string(mac_type: MacType, artifacts: &Artifacts) -> String {
    let mut buffer = String::new();
    buffer.push_str(&format!("hawk.{}.{}\n", HEADER_VERSION, mac_type.name()));
    buffer.push_str(&format!("{}\n", artifacts.ts));
    buffer.push_str(&format!("{}\n", artifacts.nonce));
    buffer.push_str(&format!("{}\n", artifacts.method.to_uppercase()));
    buffer.push_str(&format!("{}\n", resource_path(&artifacts.resource)));
    buffer.push_str(&format!("{}\n", artifacts.host.to_lowercase()));
    buffer.push_str(&format!("{}\n", artifacts.port));
    buffer.push_str(&format!("{}\n", artifacts.hash.as_deref().unwrap_or("")));
    if let Some(ref ext) = artifacts.ext {
        buffer.push_str(&escape_ext(ext));
    }
    buffer.push('\n');
    if let Some(ref app) = artifacts.app {
        if !app.is_empty() {
            buffer.push_str(&format!("{}\n", app));
            buffer.push_str(&format!("{}\n", artifacts.dlg.as_deref().unwrap_or("")));
        }
    }
    buffer
}

/// Reduce a full URL to its path and query; anything else is used as-is.
fn resource_path(resource: &str) -> String {
    if resource.is_empty() || resource.starts_with('/') {
        return resource.to_string();
    }
    match Url::parse(resource) {
        Ok(url) => match url.query() {
            Some(query) if !query.is_empty() => format!("{}?{}", url.path(), query),
            _ => url.path().to_string(),
        },
        Err(_) => resource.to_string(),
    }
}

fn escape_ext(ext: &str) -> String {
    ext.replace('\\', "\\\\").replace('\n', "\\n")
}

/// A Hawk MAC.
#[derive(Clone, PartialEq, Eq)]
pub struct Mac(Vec<u8>);

impl Mac {
    pub fn new(mac_type: MacType, key: &Key, artifacts: &Artifacts) -> Result<Mac> {
        let normalized = normalized_string(mac_type, artifacts);
        Ok(Mac(key.sign(normalized.as_bytes())?))
    }

    /// The MAC over a bare timestamp, used in `WWW-Authenticate` challenges so
    /// that clients can trust the server's clock.
    pub fn timestamp(key: &Key, ts: u64) -> Result<Mac> {
        let mut buffer: Vec<u8> = vec![];
        write!(buffer, "hawk.{}.ts\n{}\n", HEADER_VERSION, ts)
            .map_err(|e| Error::InvalidInput(e.to_string()))?;
        Ok(Mac(key.sign(&buffer)?))
    }

    /// Compare this MAC to a base64-encoded MAC received from a peer, in
    /// constant time.
    pub fn matches(&self, encoded: &str) -> bool {
        fixed_time_eq(self.to_string().as_bytes(), encoded.as_bytes())
    }
}

impl From<Vec<u8>> for Mac {
    fn from(original: Vec<u8>) -> Self {
        Mac(original)
    }
}

impl std::ops::Deref for Mac {
    type Target = Vec<u8>;
    fn deref(&self) -> &Vec<u8> {
        &self.0
    }
}

impl fmt::Display for Mac {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&b64::STANDARD_ENGINE.encode(&self.0))
    }
}

impl fmt::Debug for Mac {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Mac({})", self)
    }
}

/// A server timestamp together with its MAC (`tsm`), as carried by a
/// `WWW-Authenticate` challenge after a stale-timestamp rejection.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TimestampMessage {
    pub ts: u64,
    pub tsm: String,
}

impl TimestampMessage {
    pub fn new(key: &Key, ts: u64) -> Result<TimestampMessage> {
        Ok(TimestampMessage {
            ts,
            tsm: Mac::timestamp(key, ts)?.to_string(),
        })
    }

    /// Check that `tsm` was produced with `key`.
    pub fn verify(&self, key: &Key) -> Result<bool> {
        Ok(Mac::timestamp(key, self.ts)?.matches(&self.tsm))
    }
}
