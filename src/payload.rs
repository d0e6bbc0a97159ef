use crate::b64;
use crate::credentials::DigestAlgorithm;
use crate::crypto::{self, Hasher};
use crate::error::*;
use crate::HEADER_VERSION;
use base64::Engine;

/// A utility for hashing payloads. Feed your entity body to this, then pass the `finish`
/// result to a request or response.
pub struct PayloadHasher(Box<dyn Hasher>);

impl PayloadHasher {
    /// Create a new PayloadHasher. The `content_type` may be a full `Content-Type` header
    /// value: parameters are dropped and the media type is lower-cased before hashing.
    /// The algorithm must be the same as the one used with the credentials for the request.
    pub fn new<B>(content_type: B, algorithm: DigestAlgorithm) -> Result<Self>
    where
        B: AsRef<str>,
    {
        let mut hasher = PayloadHasher(crypto::get_crypographer().new_hasher(algorithm)?);
        hasher.update(format!("hawk.{}.payload\n", HEADER_VERSION))?;
        hasher.update(parse_content_type(content_type.as_ref()))?;
        hasher.update("\n")?;
        Ok(hasher)
    }

    /// Hash a single value and return it, base64-encoded.
    pub fn hash<B1, B2>(content_type: B1, algorithm: DigestAlgorithm, payload: B2) -> Result<String>
    where
        B1: AsRef<str>,
        B2: AsRef<[u8]>,
    {
        let mut hasher = PayloadHasher::new(content_type, algorithm)?;
        hasher.update(payload)?;
        hasher.finish()
    }

    /// Update the hash with new data.
    pub fn update<B>(&mut self, data: B) -> Result<()>
    where
        B: AsRef<[u8]>,
    {
        self.0.update(data.as_ref())?;
        Ok(())
    }

    /// Finish hashing and return the result, base64-encoded.
    pub fn finish(mut self) -> Result<String> {
        self.0.update(b"\n")?;
        let digest = self.0.finish()?;
        Ok(b64::STANDARD_ENGINE.encode(digest))
    }
}

/// Reduce a `Content-Type` header value to its lower-cased media type.
pub fn parse_content_type(header: &str) -> String {
    header
        .split(';')
        .next()
        .unwrap_or("")
        .trim()
        .to_lowercase()
}
