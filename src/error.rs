use crate::artifacts::Artifacts;
use crate::bewit::Bewit;
use crate::credentials::Credentials;
use crate::crypto::CryptoError;
use crate::header::Header;
use crate::mac::TimestampMessage;
use crate::util::escape_header_attribute;
use std::fmt;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

/// The error type returned by credential resolvers and nonce checkers.
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

#[derive(Error, Debug)]
pub enum Error {
    #[error("{0}")]
    Header(#[from] HeaderError),

    #[error("Invalid url: {0}")]
    InvalidUrl(String),

    #[error("{0}")]
    InvalidBewit(#[from] InvalidBewit),

    #[error("Invalid credentials")]
    InvalidCredentials,

    #[error("Unknown algorithm")]
    UnknownAlgorithm,

    #[error("Invalid inputs: {0}")]
    InvalidInput(String),

    #[error("Base64 Decode error: {0}")]
    Decode(#[from] base64::DecodeError),

    #[error("{0}")]
    Crypto(#[from] CryptoError),

    #[error("Invalid WWW-Authenticate header")]
    InvalidWwwAuthenticate(#[source] HeaderError),

    #[error("Invalid server timestamp hash")]
    BadServerTimestamp,

    #[error("Invalid Server-Authorization header")]
    InvalidServerAuthorization(#[source] HeaderError),

    #[error("Bad response mac")]
    BadResponseMac,

    #[error("Missing response hash attribute")]
    MissingResponseHash,

    #[error("Bad response payload mac")]
    BadResponsePayloadHash,
}

/// Failures parsing a Hawk `Authorization`, `Server-Authorization` or
/// `WWW-Authenticate` header.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum HeaderError {
    /// No header was given, or it uses a scheme other than Hawk.
    #[error("Unauthorized")]
    Missing,
    #[error("Header length too long")]
    TooLong,
    #[error("Invalid header syntax")]
    InvalidSyntax,
    #[error("Unknown attribute: {0}")]
    UnknownAttribute(String),
    #[error("Bad attribute value: {0}")]
    BadAttributeValue(String),
    #[error("Duplicate attribute: {0}")]
    DuplicateAttribute(String),
    #[error("Bad header format")]
    BadFormat,
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum InvalidBewit {
    #[error("Invalid bewit encoding")]
    Encoding,
    #[error("Invalid bewit structure")]
    Format,
    #[error("Missing bewit attributes")]
    Id,
    #[error("Missing bewit attributes")]
    Exp,
    #[error("Missing bewit attributes")]
    Mac,
}

/// The class of an authentication failure, determining how it is reported
/// to the client.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ErrorKind {
    /// The request is malformed (400).
    BadRequest,
    /// The request failed authentication (401, with a `WWW-Authenticate` challenge).
    Unauthorized,
    /// The resolved credentials are unusable; a server misconfiguration (500).
    Internal,
    /// The credentials resolver itself failed; see `source()`.
    Resolver,
}

const INTERNAL_MESSAGE: &str = "An internal server error occurred";

/// A failed server-side authentication.
///
/// Every rejection carries whatever was gathered before the failure: the
/// parsed header attributes, the request artifacts, the resolved credentials
/// and the bewit, so that callers can log context or answer a stale
/// timestamp with a `tsm`-bearing challenge.
pub struct AuthError<D = ()> {
    kind: ErrorKind,
    message: Option<String>,
    is_missing: bool,
    timestamp: Option<TimestampMessage>,
    credentials: Option<Credentials<D>>,
    artifacts: Option<Artifacts>,
    attributes: Option<Header>,
    bewit: Option<Bewit>,
    source: Option<BoxError>,
}

impl<D> AuthError<D> {
    fn new(kind: ErrorKind, message: Option<String>) -> Self {
        AuthError {
            kind,
            message,
            is_missing: false,
            timestamp: None,
            credentials: None,
            artifacts: None,
            attributes: None,
            bewit: None,
            source: None,
        }
    }

    pub(crate) fn bad_request<S: Into<String>>(message: S) -> Self {
        Self::new(ErrorKind::BadRequest, Some(message.into()))
    }

    pub(crate) fn unauthorized<S: Into<String>>(message: S) -> Self {
        Self::new(ErrorKind::Unauthorized, Some(message.into()))
    }

    /// No Hawk authentication was presented at all.
    pub(crate) fn missing() -> Self {
        let mut err = Self::new(ErrorKind::Unauthorized, None);
        err.is_missing = true;
        err
    }

    pub(crate) fn internal<S: Into<String>>(message: S) -> Self {
        Self::new(ErrorKind::Internal, Some(message.into()))
    }

    pub(crate) fn resolver(source: BoxError) -> Self {
        let mut err = Self::new(ErrorKind::Resolver, Some(source.to_string()));
        err.source = Some(source);
        err
    }

    pub(crate) fn from_header(err: HeaderError) -> Self {
        match err {
            HeaderError::Missing => Self::missing(),
            err => Self::bad_request(err.to_string()),
        }
    }

    pub(crate) fn with_credentials(mut self, credentials: Credentials<D>) -> Self {
        self.credentials = Some(credentials);
        self
    }

    pub(crate) fn with_artifacts(mut self, artifacts: Artifacts) -> Self {
        self.artifacts = Some(artifacts);
        self
    }

    pub(crate) fn with_attributes(mut self, attributes: Header) -> Self {
        self.attributes = Some(attributes);
        self
    }

    pub(crate) fn with_bewit(mut self, bewit: Bewit) -> Self {
        self.bewit = Some(bewit);
        self
    }

    pub(crate) fn with_timestamp(mut self, timestamp: TimestampMessage) -> Self {
        self.timestamp = Some(timestamp);
        self
    }

    pub(crate) fn with_source(mut self, source: BoxError) -> Self {
        self.source = Some(source);
        self
    }

    pub fn kind(&self) -> ErrorKind {
        self.kind
    }

    /// The HTTP status code this failure maps to.
    pub fn status_code(&self) -> u16 {
        match self.kind {
            ErrorKind::BadRequest => 400,
            ErrorKind::Unauthorized => 401,
            ErrorKind::Internal | ErrorKind::Resolver => 500,
        }
    }

    /// The detailed reason for the failure.  For `Internal` and `Resolver`
    /// errors this must not be sent to the client; use `public_message` instead.
    pub fn message(&self) -> Option<&str> {
        self.message.as_deref()
    }

    /// The reason suitable for the response body.
    pub fn public_message(&self) -> &str {
        match self.kind {
            ErrorKind::Internal | ErrorKind::Resolver => INTERNAL_MESSAGE,
            _ => self.message.as_deref().unwrap_or("Unauthorized"),
        }
    }

    /// True if the request carried no Hawk authentication at all, as opposed to
    /// carrying authentication that failed.
    pub fn is_missing(&self) -> bool {
        self.is_missing
    }

    /// The server timestamp and its MAC, present on "Stale timestamp" failures.
    pub fn timestamp(&self) -> Option<&TimestampMessage> {
        self.timestamp.as_ref()
    }

    pub fn credentials(&self) -> Option<&Credentials<D>> {
        self.credentials.as_ref()
    }

    pub fn artifacts(&self) -> Option<&Artifacts> {
        self.artifacts.as_ref()
    }

    /// The attributes parsed from the `Authorization` header, if it could be parsed.
    pub fn attributes(&self) -> Option<&Header> {
        self.attributes.as_ref()
    }

    pub fn bewit(&self) -> Option<&Bewit> {
        self.bewit.as_ref()
    }

    /// Take ownership of the partial credentials and artifacts.
    pub fn into_parts(self) -> (Option<Credentials<D>>, Option<Artifacts>) {
        (self.credentials, self.artifacts)
    }

    /// The `WWW-Authenticate` header value to send with a 401 response.
    pub fn www_authenticate(&self) -> Option<String> {
        if self.kind != ErrorKind::Unauthorized {
            return None;
        }
        let mut attrs = vec![];
        if let Some(ref timestamp) = self.timestamp {
            attrs.push(format!("ts=\"{}\"", timestamp.ts));
            attrs.push(format!("tsm=\"{}\"", timestamp.tsm));
        }
        if let Some(ref message) = self.message {
            if let Ok(escaped) = escape_header_attribute("error", message) {
                attrs.push(format!("error=\"{}\"", escaped));
            }
        }
        if attrs.is_empty() {
            Some("Hawk".to_string())
        } else {
            Some(format!("Hawk {}", attrs.join(", ")))
        }
    }
}

impl<D> fmt::Display for AuthError<D> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.message {
            Some(ref message) => f.write_str(message),
            None => f.write_str("Unauthorized"),
        }
    }
}

impl<D: fmt::Debug> fmt::Debug for AuthError<D> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AuthError")
            .field("kind", &self.kind)
            .field("message", &self.message)
            .field("is_missing", &self.is_missing)
            .field("timestamp", &self.timestamp)
            .field("credentials", &self.credentials)
            .field("artifacts", &self.artifacts)
            .field("bewit", &self.bewit)
            .field("source", &self.source)
            .finish()
    }
}

impl<D: fmt::Debug> std::error::Error for AuthError<D> {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        self.source
            .as_ref()
            .map(|e| e.as_ref() as &(dyn std::error::Error + 'static))
    }
}
