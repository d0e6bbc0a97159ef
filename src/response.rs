use crate::artifacts::Artifacts;
use crate::credentials::Credentials;
use crate::crypto::fixed_time_eq;
use crate::error::*;
use crate::header::{Header, HeaderKind};
use crate::mac::{Mac, MacType, TimestampMessage};
use crate::payload::PayloadHasher;
use crate::view::ResponseView;
use log::debug;

/// A Response represents a response from an HTTP server.
///
/// The structure is created from the artifacts of an authenticated request and then used to
/// create a `Server-Authorization` header for the response.
///
/// Like `Request`, Responses are built with `ResponseBuilders`.
#[derive(Debug, Clone)]
pub struct Response<'a> {
    artifacts: &'a Artifacts,
    hash: Option<&'a str>,
    payload: Option<(&'a [u8], &'a str)>,
    ext: Option<&'a str>,
}

impl<'a> Response<'a> {
    /// Create the `Server-Authorization` header value for this response.
    ///
    /// The MAC covers the request's artifacts with the response's own payload
    /// hash and `ext` in place of the request's.
    pub fn make_header<D>(&self, credentials: &Credentials<D>) -> Result<String> {
        let key = credentials.signing_key()?;

        let hash = match (self.hash, self.payload) {
            (Some(hash), _) => Some(hash.to_string()),
            (None, Some((body, content_type))) => {
                Some(PayloadHasher::hash(content_type, key.algorithm(), body)?)
            }
            (None, None) => None,
        };
        let artifacts = self
            .artifacts
            .for_response(hash, self.ext.map(str::to_string));
        let mac = Mac::new(MacType::Response, &key, &artifacts)?;

        // Server-Authorization carries only mac, hash and ext
        Header {
            mac: Some(mac.to_string()),
            hash: artifacts.hash,
            ext: artifacts.ext,
            ..Default::default()
        }
        .serialize(HeaderKind::ServerAuthorization)
    }
}

#[derive(Debug, Clone)]
pub struct ResponseBuilder<'a>(Response<'a>);

impl<'a> ResponseBuilder<'a> {
    /// Generate a new Response from the artifacts of the request being answered,
    /// as returned by a successful `Server::authenticate`.
    pub fn from_artifacts(artifacts: &'a Artifacts) -> Self {
        ResponseBuilder(Response {
            artifacts,
            hash: None,
            payload: None,
            ext: None,
        })
    }

    /// Set the base64 content hash for the response.  This takes precedence
    /// over `payload`.
    pub fn hash<H: Into<Option<&'a str>>>(mut self, hash: H) -> Self {
        self.0.hash = hash.into();
        self
    }

    /// Set the payload and content type of the response, to be hashed with
    /// the credentials' algorithm.
    pub fn payload(mut self, payload: &'a [u8], content_type: &'a str) -> Self {
        self.0.payload = Some((payload, content_type));
        self
    }

    /// Set the `ext` Hawk property for the response.
    pub fn ext<S: Into<Option<&'a str>>>(mut self, ext: S) -> Self {
        self.0.ext = ext.into();
        self
    }

    /// Get the response from this builder
    pub fn response(self) -> Response<'a> {
        self.0
    }
}

/// The Hawk headers of a validated response.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ResponseHeaders {
    pub www_authenticate: Option<Header>,
    pub server_authorization: Option<Header>,
}

/// Validate a server's response to a request signed with `credentials`.
///
/// `artifacts` are the ones returned when the request was signed.  A
/// `WWW-Authenticate` timestamp is checked against its `tsm` if present.  The
/// `Server-Authorization` header is verified if present, and must be present
/// if `required` is set.  If `payload` is given, the response must carry a
/// payload hash, and it must match the payload and the response's
/// `Content-Type`.
pub fn authenticate_response<D>(
    response: &ResponseView,
    credentials: &Credentials<D>,
    artifacts: &Artifacts,
    payload: Option<&[u8]>,
    required: bool,
) -> Result<ResponseHeaders> {
    let key = credentials.signing_key()?;
    let mut result = ResponseHeaders::default();

    if let Some(value) = response.get_header("www-authenticate") {
        let www = Header::parse(value, HeaderKind::WwwAuthenticate)
            .map_err(Error::InvalidWwwAuthenticate)?;
        if let Some(ref ts) = www.ts {
            let ts = ts.parse::<u64>().map_err(|_| Error::BadServerTimestamp)?;
            let timestamp = TimestampMessage {
                ts,
                tsm: www.tsm.clone().unwrap_or_default(),
            };
            if !timestamp.verify(&key)? {
                debug!("response for {} has a bad timestamp mac", credentials.id);
                return Err(Error::BadServerTimestamp);
            }
        }
        result.www_authenticate = Some(www);
    }

    let value = match response.get_header("server-authorization") {
        Some(value) => value,
        None if !required => return Ok(result),
        None => "",
    };
    let server_auth = Header::parse(value, HeaderKind::ServerAuthorization)
        .map_err(Error::InvalidServerAuthorization)?;

    let response_artifacts = artifacts.for_response(server_auth.hash.clone(), server_auth.ext.clone());
    let mac = Mac::new(MacType::Response, &key, &response_artifacts)?;
    match server_auth.mac {
        Some(ref header_mac) if mac.matches(header_mac) => {}
        _ => {
            debug!("response for {} has a bad mac", credentials.id);
            return Err(Error::BadResponseMac);
        }
    }

    if let Some(payload) = payload {
        let header_hash = server_auth
            .hash
            .as_deref()
            .ok_or(Error::MissingResponseHash)?;
        let content_type = response.get_header("content-type").unwrap_or("");
        let calculated = PayloadHasher::hash(content_type, key.algorithm(), payload)?;
        if !fixed_time_eq(calculated.as_bytes(), header_hash.as_bytes()) {
            return Err(Error::BadResponsePayloadHash);
        }
    }

    result.server_authorization = Some(server_auth);
    Ok(result)
}
