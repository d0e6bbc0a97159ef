use crate::artifacts::Artifacts;
use crate::bewit::Bewit;
use crate::clock::Clock;
use crate::credentials::Credentials;
use crate::error::*;
use crate::header::{Header, HeaderKind};
use crate::mac::{Mac, MacType};
use crate::payload::PayloadHasher;
use crate::util::random_nonce;
use log::debug;
use std::borrow::Cow;
use std::time::Duration;
use url::Url;

/// Request represents a single HTTP request, as seen by the client signing it.
///
/// The structure is created using the builder idiom.  Most uses of this library will hold
/// several of the fields in this structure fixed.  Cloning the builder with these fields
/// applied is a convenient way to avoid repeating those fields.
///
/// # Examples
///
/// ```
/// use hawk_auth::RequestBuilder;
/// let base = RequestBuilder::new("GET", "mysite.com", 443, "/");
/// let request1 = base.clone().method("POST").path("/api/user").request();
/// let request2 = base.path("/api/users").request();
/// ```
#[derive(Debug, Clone)]
pub struct Request<'a> {
    method: &'a str,
    host: Cow<'a, str>,
    port: u16,
    path: Cow<'a, str>,
    hash: Option<&'a str>,
    payload: Option<(&'a [u8], &'a str)>,
    ext: Option<&'a str>,
    app: Option<&'a str>,
    dlg: Option<&'a str>,
}

/// A signed request: the `Authorization` header value and the artifacts it
/// covers.  Keep the artifacts to validate the server's response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignedRequest {
    pub header: String,
    pub artifacts: Artifacts,
}

impl<'a> Request<'a> {
    /// Create a new Header for this request, inventing a new nonce and setting the
    /// timestamp to the current time according to `clock`.
    pub fn make_header<D>(&self, credentials: &Credentials<D>, clock: &Clock) -> Result<SignedRequest> {
        self.make_header_full(credentials, clock.now_secs(), random_nonce())
    }

    /// Similar to `make_header`, but allowing specification of the timestamp
    /// and nonce.
    pub fn make_header_full<D, S>(
        &self,
        credentials: &Credentials<D>,
        ts: u64,
        nonce: S,
    ) -> Result<SignedRequest>
    where
        S: Into<String>,
    {
        if credentials.id.is_empty() {
            return Err(Error::InvalidCredentials);
        }
        let key = credentials.signing_key()?;

        let hash = match (self.hash, self.payload) {
            (Some(hash), _) => Some(hash.to_string()),
            (None, Some((body, content_type))) => {
                Some(PayloadHasher::hash(content_type, key.algorithm(), body)?)
            }
            (None, None) => None,
        };

        let mut artifacts = Artifacts {
            method: self.method.to_string(),
            host: self.host.to_string(),
            port: self.port,
            resource: self.path.to_string(),
            ts,
            nonce: nonce.into(),
            hash,
            ext: self.ext.map(str::to_string),
            app: self.app.map(str::to_string),
            dlg: self.dlg.map(str::to_string),
            mac: None,
            id: Some(credentials.id.clone()),
        };
        let mac = Mac::new(MacType::Header, &key, &artifacts)?.to_string();
        artifacts.mac = Some(mac);

        let header = Header {
            id: artifacts.id.clone(),
            ts: Some(ts.to_string()),
            nonce: Some(artifacts.nonce.clone()),
            mac: artifacts.mac.clone(),
            ext: artifacts.ext.clone(),
            hash: artifacts.hash.clone(),
            app: artifacts.app.clone(),
            dlg: artifacts.dlg.clone(),
            ..Default::default()
        }
        .serialize(HeaderKind::Authorization)?;
        debug!("signed {} {} for {}", artifacts.method, artifacts.resource, credentials.id);

        Ok(SignedRequest { header, artifacts })
    }

    /// Make a "bewit" that can be attached to a URL to authenticate GET access.
    ///
    /// `exp` is the expiration time in seconds since the Unix epoch.  The
    /// method of this request is ignored; bewits only cover GET and HEAD.
    pub fn make_bewit<D>(&self, credentials: &Credentials<D>, exp: u64) -> Result<Bewit> {
        if credentials.id.is_empty() {
            return Err(Error::InvalidCredentials);
        }
        let key = credentials.signing_key()?;
        let artifacts = Artifacts {
            method: "GET".to_string(),
            host: self.host.to_string(),
            port: self.port,
            resource: self.path.to_string(),
            ts: exp,
            nonce: String::new(),
            ext: self.ext.map(str::to_string),
            ..Default::default()
        };
        let mac = Mac::new(MacType::Bewit, &key, &artifacts)?;
        Ok(Bewit::new(credentials.id.as_str(), exp, &mac, self.ext))
    }

    /// Make a bewit that expires `ttl` from now, according to `clock`.
    pub fn make_bewit_with_ttl<D>(
        &self,
        credentials: &Credentials<D>,
        ttl: Duration,
        clock: &Clock,
    ) -> Result<Bewit> {
        if ttl.as_secs() == 0 {
            return Err(Error::InvalidInput("bewit ttl must be at least one second".to_string()));
        }
        self.make_bewit(credentials, clock.now_secs() + ttl.as_secs())
    }
}

#[derive(Debug, Clone)]
pub struct RequestBuilder<'a>(Request<'a>);

impl<'a> RequestBuilder<'a> {
    /// Create a new request with the given method, host, port, and path.
    /// `path` includes any query.
    pub fn new(method: &'a str, host: &'a str, port: u16, path: &'a str) -> Self {
        RequestBuilder(Request {
            method,
            host: Cow::Borrowed(host),
            port,
            path: Cow::Borrowed(path),
            hash: None,
            payload: None,
            ext: None,
            app: None,
            dlg: None,
        })
    }

    /// Create a new request with the host, port, and path determined from the URL.  A URL
    /// without an explicit port uses 80 for `http` and 443 otherwise.
    pub fn from_url(method: &'a str, url: &str) -> Result<Self> {
        let url = Url::parse(url).map_err(|e| Error::InvalidUrl(e.to_string()))?;
        let host = url
            .host_str()
            .ok_or_else(|| Error::InvalidUrl(format!("url {} has no host", url)))?
            .to_string();
        let port = url
            .port()
            .unwrap_or(if url.scheme() == "http" { 80 } else { 443 });
        let path = match url.query() {
            Some(query) => format!("{}?{}", url.path(), query),
            None => url.path().to_string(),
        };
        Ok(RequestBuilder(Request {
            method,
            host: Cow::Owned(host),
            port,
            path: Cow::Owned(path),
            hash: None,
            payload: None,
            ext: None,
            app: None,
            dlg: None,
        }))
    }

    /// Set the request method. This should be a capitalized string.
    pub fn method(mut self, method: &'a str) -> Self {
        self.0.method = method;
        self
    }

    /// Set the URL path for the request.
    pub fn path(mut self, path: &'a str) -> Self {
        self.0.path = Cow::Borrowed(path);
        self
    }

    /// Set the URL hostname for the request
    pub fn host(mut self, host: &'a str) -> Self {
        self.0.host = Cow::Borrowed(host);
        self
    }

    /// Set the URL port for the request
    pub fn port(mut self, port: u16) -> Self {
        self.0.port = port;
        self
    }

    /// Set the base64 content hash for the request.  This takes precedence
    /// over `payload`.
    pub fn hash<H: Into<Option<&'a str>>>(mut self, hash: H) -> Self {
        self.0.hash = hash.into();
        self
    }

    /// Set the payload and content type of the request; the payload hash is
    /// calculated with the credentials' algorithm when the header is made.
    pub fn payload(mut self, payload: &'a [u8], content_type: &'a str) -> Self {
        self.0.payload = Some((payload, content_type));
        self
    }

    /// Set the `ext` Hawk property for the request
    pub fn ext<S: Into<Option<&'a str>>>(mut self, ext: S) -> Self {
        self.0.ext = ext.into();
        self
    }

    /// Set the `app` Hawk property for the request
    pub fn app<S: Into<Option<&'a str>>>(mut self, app: S) -> Self {
        self.0.app = app.into();
        self
    }

    /// Set the `dlg` Hawk property for the request
    pub fn dlg<S: Into<Option<&'a str>>>(mut self, dlg: S) -> Self {
        self.0.dlg = dlg.into();
        self
    }

    /// Get the request from this builder
    pub fn request(self) -> Request<'a> {
        self.0
    }
}
