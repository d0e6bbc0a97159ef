use crate::artifacts::Artifacts;
use crate::bewit::Bewit;
use crate::clock::Clock;
use crate::credentials::{Credentials, Key};
use crate::crypto::fixed_time_eq;
use crate::error::*;
use crate::header::{Header, HeaderKind};
use crate::mac::{Mac, MacType, TimestampMessage};
use crate::message::MessageAuthorization;
use crate::payload::PayloadHasher;
use crate::resolver::{CredentialsResolver, NonceChecker};
use crate::util::{parse_host, parse_timestamp, MAX_MATCH_LENGTH};
use crate::view::RequestView;
use log::{debug, warn};
use std::fmt;
use std::sync::Arc;
use std::time::Duration;

/// Configuration for a [`Server`].
#[derive(Clone)]
pub struct ServerOptions {
    /// The header carrying the request's host and port, `host` by default.  Set this to
    /// e.g. `x-forwarded-host` behind a proxy that rewrites `Host`.
    pub host_header_name: String,
    /// Override the host from the request.
    pub host: Option<String>,
    /// Override the port from the request.
    pub port: Option<u16>,
    /// Permitted difference between the request timestamp and the server clock, in either
    /// direction.
    pub timestamp_skew: Duration,
    pub clock: Clock,
    /// Replay protection; no nonce checking is done without one.
    pub nonce_checker: Option<Arc<dyn NonceChecker>>,
}

impl Default for ServerOptions {
    fn default() -> Self {
        ServerOptions {
            host_header_name: "host".to_string(),
            host: None,
            port: None,
            timestamp_skew: Duration::from_secs(60),
            clock: Clock::system(),
            nonce_checker: None,
        }
    }
}

impl ServerOptions {
    pub fn with_host_header_name<S: Into<String>>(mut self, name: S) -> Self {
        self.host_header_name = name.into();
        self
    }

    pub fn with_host<S: Into<String>>(mut self, host: S) -> Self {
        self.host = Some(host.into());
        self
    }

    pub fn with_port(mut self, port: u16) -> Self {
        self.port = Some(port);
        self
    }

    pub fn with_timestamp_skew(mut self, skew: Duration) -> Self {
        self.timestamp_skew = skew;
        self
    }

    pub fn with_clock(mut self, clock: Clock) -> Self {
        self.clock = clock;
        self
    }

    pub fn with_nonce_checker<N: NonceChecker + 'static>(mut self, checker: N) -> Self {
        self.nonce_checker = Some(Arc::new(checker));
        self
    }
}

impl fmt::Debug for ServerOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ServerOptions")
            .field("host_header_name", &self.host_header_name)
            .field("host", &self.host)
            .field("port", &self.port)
            .field("timestamp_skew", &self.timestamp_skew)
            .field("clock", &self.clock)
            .field("nonce_checker", &self.nonce_checker.is_some())
            .finish()
    }
}

/// The outcome of a successful authentication.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Authenticated<D = ()> {
    pub credentials: Credentials<D>,
    /// The values covered by the verified MAC.  Pass these to
    /// `ResponseBuilder::from_artifacts` to sign the response.
    pub artifacts: Artifacts,
    /// The bewit, when authenticated with `authenticate_bewit`.
    pub bewit: Option<Bewit>,
}

pub type AuthResult<D> = std::result::Result<Authenticated<D>, AuthError<D>>;

/// Authenticates Hawk requests, bewits and messages.
///
/// Each attempt reads the clock once, on entry, and then runs a fixed
/// sequence of checks, stopping at the first failure.  Credentials are
/// resolved and the MAC verified before the timestamp is checked, so a stale
/// request is only answered with a signed server timestamp when it was
/// signed with valid credentials.
#[derive(Debug, Clone, Default)]
pub struct Server {
    options: ServerOptions,
}

impl Server {
    pub fn new(options: ServerOptions) -> Self {
        Server { options }
    }

    pub fn options(&self) -> &ServerOptions {
        &self.options
    }

    /// Authenticate a request carrying an `Authorization: Hawk ...` header.
    ///
    /// The payload hash, if the client sent one, is covered by the MAC but not
    /// checked against the body; use `authenticate_with_payload`, or
    /// `authenticate_payload` once the body is available.
    pub async fn authenticate<R>(&self, request: &RequestView, resolver: &R) -> AuthResult<R::Data>
    where
        R: CredentialsResolver + ?Sized,
    {
        self.authenticate_request(request, resolver, None).await
    }

    /// Authenticate a request and verify that its payload hash matches `payload`.
    pub async fn authenticate_with_payload<R>(
        &self,
        request: &RequestView,
        resolver: &R,
        payload: &[u8],
    ) -> AuthResult<R::Data>
    where
        R: CredentialsResolver + ?Sized,
    {
        self.authenticate_request(request, resolver, Some(payload))
            .await
    }

    async fn authenticate_request<R>(
        &self,
        request: &RequestView,
        resolver: &R,
        payload: Option<&[u8]>,
    ) -> AuthResult<R::Data>
    where
        R: CredentialsResolver + ?Sized,
    {
        let now = self.options.clock.now_ms();
        let (host, port) = self.host_and_port::<R::Data>(request)?;

        let authorization = request.get_header("authorization").unwrap_or("");
        let attributes = Header::parse(authorization, HeaderKind::Authorization).map_err(|e| {
            debug!("rejecting request: {}", e);
            AuthError::<R::Data>::from_header(e)
        })?;

        let ts = attributes.ts.as_deref().map(parse_timestamp);
        let artifacts = Artifacts {
            method: request.method().to_string(),
            host,
            port,
            resource: request.url().to_string(),
            ts: match ts {
                Some(Some(ts)) => ts,
                _ => 0,
            },
            nonce: attributes.nonce.clone().unwrap_or_default(),
            hash: attributes.hash.clone(),
            ext: attributes.ext.clone(),
            app: attributes.app.clone(),
            dlg: attributes.dlg.clone(),
            mac: attributes.mac.clone(),
            id: attributes.id.clone(),
        };

        let (id, header_mac) = match (&attributes.id, &ts, &attributes.nonce, &attributes.mac) {
            (Some(id), Some(_), Some(_), Some(mac)) => (id.clone(), mac.clone()),
            _ => {
                debug!("rejecting request: Missing attributes");
                return Err(AuthError::bad_request("Missing attributes")
                    .with_artifacts(artifacts)
                    .with_attributes(attributes));
            }
        };
        if let Some(None) = ts {
            debug!("rejecting request from {}: Bad attribute value: ts", id);
            return Err(AuthError::bad_request("Bad attribute value: ts")
                .with_artifacts(artifacts)
                .with_attributes(attributes));
        }

        let credentials = match resolver.resolve(&id).await {
            Ok(Some(credentials)) => credentials,
            Ok(None) => {
                debug!("rejecting request from {}: Unknown credentials", id);
                return Err(AuthError::unauthorized("Unknown credentials").with_artifacts(artifacts));
            }
            Err(e) => {
                warn!("credentials lookup for {} failed: {}", id, e);
                return Err(AuthError::resolver(e).with_artifacts(artifacts));
            }
        };

        let key = match signing_key(&credentials) {
            Ok(key) => key,
            Err(err) => return Err(err.with_credentials(credentials).with_artifacts(artifacts)),
        };

        match Mac::new(MacType::Header, &key, &artifacts) {
            Ok(mac) if mac.matches(&header_mac) => {}
            Ok(_) => return Err(reject("Bad mac", credentials, artifacts)),
            Err(e) => return Err(internal(e).with_credentials(credentials).with_artifacts(artifacts)),
        }

        if let Some(payload) = payload {
            let header_hash = match attributes.hash {
                Some(ref hash) => hash,
                None => return Err(reject("Missing required payload hash", credentials, artifacts)),
            };
            let content_type = request.get_header("content-type").unwrap_or("");
            match PayloadHasher::hash(content_type, key.algorithm(), payload) {
                Ok(hash) if fixed_time_eq(hash.as_bytes(), header_hash.as_bytes()) => {}
                Ok(_) => return Err(reject("Bad payload hash", credentials, artifacts)),
                Err(e) => {
                    return Err(internal(e).with_credentials(credentials).with_artifacts(artifacts))
                }
            }
        }

        let nonce_check = self
            .check_nonce(&credentials, &artifacts.nonce, artifacts.ts)
            .await;
        if let Err(e) = nonce_check {
            return Err(reject("Invalid nonce", credentials, artifacts).with_source(e));
        }

        if let Err(err) = self.check_timestamp(&key, artifacts.ts, now) {
            debug!("rejecting request from {}: {}", credentials.id, err);
            return Err(err.with_credentials(credentials).with_artifacts(artifacts));
        }

        debug!("authenticated request from {}", credentials.id);
        Ok(Authenticated {
            credentials,
            artifacts,
            bewit: None,
        })
    }

    /// Authenticate a GET or HEAD request carrying a `bewit` query parameter.
    ///
    /// The artifacts of the result have the bewit removed from the resource.
    pub async fn authenticate_bewit<R>(&self, request: &RequestView, resolver: &R) -> AuthResult<R::Data>
    where
        R: CredentialsResolver + ?Sized,
    {
        let now = self.options.clock.now_ms();
        let (host, port) = self.host_and_port::<R::Data>(request)?;

        let url = request.url();
        if url.len() > MAX_MATCH_LENGTH {
            return Err(AuthError::bad_request("Resource path exceeds max length"));
        }
        let (token, resource) = Bewit::from_resource(url).ok_or_else(AuthError::<R::Data>::missing)?;
        if token.is_empty() {
            return Err(AuthError::unauthorized("Empty bewit"));
        }

        let method = request.method();
        if !method.eq_ignore_ascii_case("GET") && !method.eq_ignore_ascii_case("HEAD") {
            return Err(AuthError::unauthorized("Invalid method"));
        }
        if request.get_header("authorization").map_or(false, |a| !a.is_empty()) {
            return Err(AuthError::bad_request("Multiple authentications"));
        }

        let bewit = token.parse::<Bewit>().map_err(|e| {
            debug!("rejecting bewit: {}", e);
            AuthError::<R::Data>::bad_request(e.to_string())
        })?;

        if bewit.exp().saturating_mul(1000) <= now {
            debug!("rejecting bewit for {}: Access expired", bewit.id());
            return Err(AuthError::unauthorized("Access expired").with_bewit(bewit));
        }

        let credentials = match resolver.resolve(bewit.id()).await {
            Ok(Some(credentials)) => credentials,
            Ok(None) => {
                debug!("rejecting bewit for {}: Unknown credentials", bewit.id());
                return Err(AuthError::unauthorized("Unknown credentials").with_bewit(bewit));
            }
            Err(e) => {
                warn!("credentials lookup for {} failed: {}", bewit.id(), e);
                return Err(AuthError::resolver(e).with_bewit(bewit));
            }
        };

        let key = match signing_key(&credentials) {
            Ok(key) => key,
            Err(err) => return Err(err.with_credentials(credentials).with_bewit(bewit)),
        };

        let artifacts = Artifacts {
            method: "GET".to_string(),
            host,
            port,
            resource,
            ts: bewit.exp(),
            nonce: String::new(),
            ext: bewit.ext().map(str::to_string),
            mac: Some(bewit.mac().to_string()),
            id: Some(bewit.id().to_string()),
            ..Default::default()
        };

        match Mac::new(MacType::Bewit, &key, &artifacts) {
            Ok(mac) if mac.matches(bewit.mac()) => {}
            Ok(_) => return Err(reject("Bad mac", credentials, artifacts).with_bewit(bewit)),
            Err(e) => {
                return Err(internal(e)
                    .with_credentials(credentials)
                    .with_artifacts(artifacts)
                    .with_bewit(bewit))
            }
        }

        debug!("authenticated bewit for {}", credentials.id);
        Ok(Authenticated {
            credentials,
            artifacts,
            bewit: Some(bewit),
        })
    }

    /// Authenticate a message sent outside of an HTTP request, as signed with
    /// `MessageAuthorization::sign`.
    pub async fn authenticate_message<R>(
        &self,
        host: &str,
        port: u16,
        message: &[u8],
        authorization: &MessageAuthorization,
        resolver: &R,
    ) -> AuthResult<R::Data>
    where
        R: CredentialsResolver + ?Sized,
    {
        let now = self.options.clock.now_ms();

        if authorization.id.is_empty()
            || authorization.ts == 0
            || authorization.nonce.is_empty()
            || authorization.hash.is_empty()
            || authorization.mac.is_empty()
        {
            debug!("rejecting message: Invalid authorization");
            return Err(AuthError::bad_request("Invalid authorization"));
        }

        let credentials = match resolver.resolve(&authorization.id).await {
            Ok(Some(credentials)) => credentials,
            Ok(None) => {
                debug!("rejecting message from {}: Unknown credentials", authorization.id);
                return Err(AuthError::unauthorized("Unknown credentials"));
            }
            Err(e) => {
                warn!("credentials lookup for {} failed: {}", authorization.id, e);
                return Err(AuthError::resolver(e));
            }
        };

        let key = match signing_key(&credentials) {
            Ok(key) => key,
            Err(err) => return Err(err.with_credentials(credentials)),
        };

        let artifacts = Artifacts {
            host: host.to_string(),
            port,
            ts: authorization.ts,
            nonce: authorization.nonce.clone(),
            hash: Some(authorization.hash.clone()),
            mac: Some(authorization.mac.clone()),
            id: Some(authorization.id.clone()),
            ..Default::default()
        };

        match Mac::new(MacType::Message, &key, &artifacts) {
            Ok(mac) if mac.matches(&authorization.mac) => {}
            Ok(_) => return Err(reject("Bad mac", credentials, artifacts)),
            Err(e) => return Err(internal(e).with_credentials(credentials).with_artifacts(artifacts)),
        }

        match PayloadHasher::hash("", key.algorithm(), message) {
            Ok(hash) if fixed_time_eq(hash.as_bytes(), authorization.hash.as_bytes()) => {}
            Ok(_) => return Err(reject("Bad message hash", credentials, artifacts)),
            Err(e) => return Err(internal(e).with_credentials(credentials).with_artifacts(artifacts)),
        }

        let nonce_check = self
            .check_nonce(&credentials, &authorization.nonce, authorization.ts)
            .await;
        if let Err(e) = nonce_check {
            return Err(reject("Invalid nonce", credentials, artifacts).with_source(e));
        }

        if let Err(err) = self.check_timestamp(&key, authorization.ts, now) {
            debug!("rejecting message from {}: {}", credentials.id, err);
            return Err(err.with_credentials(credentials).with_artifacts(artifacts));
        }

        debug!("authenticated message from {}", credentials.id);
        Ok(Authenticated {
            credentials,
            artifacts,
            bewit: None,
        })
    }

    /// Verify a request payload against the hash in artifacts returned by
    /// `authenticate`, for when the body was not available at that time.
    pub fn authenticate_payload<D: Clone>(
        payload: &[u8],
        credentials: &Credentials<D>,
        artifacts: &Artifacts,
        content_type: &str,
    ) -> std::result::Result<(), AuthError<D>> {
        let algorithm = match credentials.algorithm.parse() {
            Ok(algorithm) => algorithm,
            Err(_) => {
                return Err(AuthError::internal("Unknown algorithm")
                    .with_credentials(credentials.clone())
                    .with_artifacts(artifacts.clone()))
            }
        };
        let calculated = PayloadHasher::hash(content_type, algorithm, payload).map_err(|e| {
            internal(e)
                .with_credentials(credentials.clone())
                .with_artifacts(artifacts.clone())
        })?;
        Self::authenticate_payload_hash(&calculated, artifacts).map_err(|e| {
            e.with_credentials(credentials.clone())
        })
    }

    /// Compare a payload hash calculated by the caller, e.g. while streaming
    /// the body through a `PayloadHasher`, to the hash in the artifacts.
    pub fn authenticate_payload_hash<D>(
        calculated: &str,
        artifacts: &Artifacts,
    ) -> std::result::Result<(), AuthError<D>> {
        let header_hash = artifacts.hash.as_deref().unwrap_or("");
        if fixed_time_eq(calculated.as_bytes(), header_hash.as_bytes()) {
            Ok(())
        } else {
            debug!("rejecting payload: Bad payload hash");
            Err(AuthError::unauthorized("Bad payload hash").with_artifacts(artifacts.clone()))
        }
    }

    /// Determine the host and port the request was addressed to.
    fn host_and_port<D>(&self, request: &RequestView) -> std::result::Result<(String, u16), AuthError<D>> {
        if let (Some(host), Some(port)) = (&self.options.host, self.options.port) {
            return Ok((host.clone(), port));
        }

        let parsed = request
            .get_header(&self.options.host_header_name)
            .and_then(parse_host);
        let (name, header_port) = match parsed {
            Some(parsed) => parsed,
            None => {
                debug!("rejecting request: Invalid Host header");
                return Err(AuthError::bad_request("Invalid Host header"));
            }
        };

        let host = self.options.host.clone().unwrap_or(name);
        let port = self
            .options
            .port
            .or(header_port)
            .unwrap_or(if request.is_tls() { 443 } else { 80 });
        Ok((host, port))
    }

    async fn check_nonce<D>(
        &self,
        credentials: &Credentials<D>,
        nonce: &str,
        ts: u64,
    ) -> std::result::Result<(), BoxError> {
        match self.options.nonce_checker {
            Some(ref checker) => checker.check(&credentials.key, nonce, ts).await,
            None => Ok(()),
        }
    }

    /// Reject `ts` if it is further than the permitted skew from `now_ms`.
    /// The rejection carries the server's own timestamp, signed with `key`.
    fn check_timestamp<D>(&self, key: &Key, ts: u64, now_ms: u64) -> std::result::Result<(), AuthError<D>> {
        let skew = self.options.timestamp_skew.as_millis() as i128;
        if (ts as i128 * 1000 - now_ms as i128).abs() <= skew {
            return Ok(());
        }
        let timestamp = TimestampMessage::new(key, now_ms / 1000).map_err(internal::<D>)?;
        Err(AuthError::unauthorized("Stale timestamp").with_timestamp(timestamp))
    }
}

/// Check that resolved credentials are usable.  Failures here are server
/// misconfiguration, not client errors.
fn signing_key<D>(credentials: &Credentials<D>) -> std::result::Result<Key, AuthError<D>> {
    credentials.signing_key().map_err(|e| {
        warn!("credentials for {} are unusable: {}", credentials.id, e);
        internal(e)
    })
}

fn internal<D>(err: Error) -> AuthError<D> {
    match err {
        Error::InvalidCredentials => AuthError::internal("Invalid credentials"),
        Error::UnknownAlgorithm => AuthError::internal("Unknown algorithm"),
        err => AuthError::internal(err.to_string()),
    }
}

fn reject<D>(message: &str, credentials: Credentials<D>, artifacts: Artifacts) -> AuthError<D> {
    debug!("rejecting request from {}: {}", credentials.id, message);
    AuthError::unauthorized(message)
        .with_credentials(credentials)
        .with_artifacts(artifacts)
}
