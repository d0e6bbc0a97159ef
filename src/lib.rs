//! The `hawk_auth` crate provides support for [Hawk](https://github.com/hapijs/hawk)
//! authentication, on both the client and the server side.  It is not tied to any HTTP
//! implementation: requests and responses are described with `RequestBuilder`,
//! `RequestView` and `ResponseView`, and the results are header values as strings.
//!
//! # Examples
//!
//! ## Hawk Client
//!
//! A client attaches an `Authorization` header to a request, and may then validate the
//! server's response with the artifacts that were signed.
//!
//! ```
//! use hawk_auth::{Clock, Credentials, RequestBuilder};
//!
//! let credentials = Credentials::new("dh37fgj492je", "werxhqb98rpaxn39848xrunpaw3489ruxnpa98w4rxn", "sha256");
//!
//! let signed = RequestBuilder::from_url("GET", "https://example.com/resource/1?b=1&a=2")
//!     .unwrap()
//!     .ext("my-ext-value")
//!     .request()
//!     .make_header(&credentials, &Clock::system())
//!     .unwrap();
//!
//! assert!(signed.header.starts_with("Hawk id=\"dh37fgj492je\""));
//! assert_eq!(signed.artifacts.port, 443);
//! ```
//!
//! ## Hawk Server
//!
//! A server resolves the credentials for the request's id, checks the MAC, the timestamp
//! and (if configured) the nonce, and signs its response with the resulting artifacts.
//!
//! ```
//! use hawk_auth::{Clock, Credentials, RequestBuilder, RequestView, ResponseBuilder};
//! use hawk_auth::{Server, ServerOptions};
//! use std::collections::HashMap;
//!
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn main() {
//! let credentials = Credentials::new("dh37fgj492je", "werxhqb98rpaxn39848xrunpaw3489ruxnpa98w4rxn", "sha256");
//! let mut resolver = HashMap::new();
//! resolver.insert(credentials.id.clone(), credentials.clone());
//!
//! let signed = RequestBuilder::new("GET", "example.com", 8000, "/resource/1")
//!     .request()
//!     .make_header(&credentials, &Clock::system())
//!     .unwrap();
//! let request = RequestView::new("GET", "/resource/1")
//!     .header("Host", "example.com:8000")
//!     .header("Authorization", &signed.header);
//!
//! let server = Server::new(ServerOptions::default());
//! let authenticated = server.authenticate(&request, &resolver).await.unwrap();
//!
//! let server_authorization = ResponseBuilder::from_artifacts(&authenticated.artifacts)
//!     .payload(b"some reply", "text/plain")
//!     .response()
//!     .make_header(&authenticated.credentials)
//!     .unwrap();
//! assert!(server_authorization.starts_with("Hawk mac="));
//! # }
//! ```
//!
//! ## Crypto backend
//!
//! HMAC and hashing are done by a [`crypto::Cryptographer`].  With the default `use_ring`
//! feature a `ring`-based implementation is installed automatically; without it, call
//! [`crypto::set_cryptographer`] before using the crate.

mod b64;

mod error;
pub use crate::error::*;

mod credentials;
pub use crate::credentials::{Credentials, DigestAlgorithm, Key};

mod clock;
pub use crate::clock::Clock;

mod artifacts;
pub use crate::artifacts::Artifacts;

mod mac;
pub use crate::mac::{normalized_string, Mac, MacType, TimestampMessage};

mod payload;
pub use crate::payload::{parse_content_type, PayloadHasher};

mod header;
pub use crate::header::{Header, HeaderKind};

mod bewit;
pub use crate::bewit::Bewit;

mod request;
pub use crate::request::{Request, RequestBuilder, SignedRequest};

mod response;
pub use crate::response::{authenticate_response, Response, ResponseBuilder, ResponseHeaders};

mod message;
pub use crate::message::MessageAuthorization;

mod resolver;
pub use crate::resolver::{CredentialsResolver, NonceChecker};

mod server;
pub use crate::server::{AuthResult, Authenticated, Server, ServerOptions};

mod view;
pub use crate::view::{RequestView, ResponseView};

mod util;

pub mod crypto;

/// The Hawk protocol version, as it appears in normalized strings.
pub(crate) const HEADER_VERSION: &str = "1";
