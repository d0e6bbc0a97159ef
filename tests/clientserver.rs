//! Requests signed by this crate's client, authenticated by its server, and
//! the server's responses validated by the client.

mod common;

use common::*;
use hawk_auth::{
    authenticate_response, Clock, Credentials, Error, ErrorKind, MessageAuthorization, PayloadHasher,
    RequestBuilder, RequestView, ResponseBuilder, ResponseView, Server, ServerOptions,
};
use pretty_assertions::assert_eq;
use std::time::Duration;

const NOW: u64 = 1357926341000;

fn credentials() -> Credentials<String> {
    Credentials::new("123456", KEY, "sha256").with_data("steve".to_string())
}

#[tokio::test]
async fn get_round_trip() {
    let credentials = credentials();
    let signed = RequestBuilder::from_url("GET", "http://example.com:8080/resource/4?filter=a")
        .unwrap()
        .ext("some-app-data")
        .request()
        .make_header(&credentials, &Clock::fixed(NOW))
        .unwrap();

    let request = RequestView::new("GET", "/resource/4?filter=a")
        .header("Host", "example.com:8080")
        .header("Authorization", &signed.header);
    let auth = server_at(NOW).authenticate(&request, &SteveResolver).await.unwrap();
    assert_eq!(auth.credentials.data, "steve");
    assert_eq!(auth.artifacts.nonce, signed.artifacts.nonce);
    assert_eq!(auth.artifacts.ext.as_deref(), Some("some-app-data"));

    let server_authorization = ResponseBuilder::from_artifacts(&auth.artifacts)
        .payload(b"some reply", "text/plain")
        .ext("response-ext")
        .response()
        .make_header(&auth.credentials)
        .unwrap();

    let response = ResponseView::new()
        .header("Content-Type", "text/plain; charset=utf-8")
        .header("Server-Authorization", &server_authorization);
    let headers = authenticate_response(
        &response,
        &credentials,
        &signed.artifacts,
        Some(&b"some reply"[..]),
        true,
    )
    .unwrap();
    let server_auth = headers.server_authorization.unwrap();
    assert_eq!(server_auth.ext.as_deref(), Some("response-ext"));
    assert!(headers.www_authenticate.is_none());

    assert!(matches!(
        authenticate_response(&response, &credentials, &signed.artifacts, Some(&b"other reply"[..]), true),
        Err(Error::BadResponsePayloadHash)
    ));
}

#[tokio::test]
async fn post_with_payload() {
    let credentials = credentials();
    let body = b"some not so random text";
    let signed = RequestBuilder::new("POST", "example.com", 8080, "/resource/4?filter=a")
        .payload(body, "text/plain")
        .ext("some-app-data")
        .request()
        .make_header_full(&credentials, NOW / 1000, "1AwuJD")
        .unwrap();

    let request = RequestView::new("POST", "/resource/4?filter=a")
        .header("Host", "example.com:8080")
        .header("Content-Type", "text/plain")
        .header("Authorization", &signed.header);
    let server = server_at(NOW);
    let auth = server
        .authenticate_with_payload(&request, &SteveResolver, body)
        .await
        .unwrap();
    assert_eq!(auth.artifacts.hash, signed.artifacts.hash);

    let err = server
        .authenticate_with_payload(&request, &SteveResolver, b"tampered")
        .await
        .unwrap_err();
    assert_eq!(err.to_string(), "Bad payload hash");

    // the body can also be checked after authentication, e.g. once streamed
    let auth = server.authenticate(&request, &SteveResolver).await.unwrap();
    Server::authenticate_payload(body, &auth.credentials, &auth.artifacts, "text/plain").unwrap();
    let mut hasher = PayloadHasher::new("text/plain", hawk_auth::DigestAlgorithm::Sha256).unwrap();
    hasher.update(&body[..10]).unwrap();
    hasher.update(&body[10..]).unwrap();
    let calculated = hasher.finish().unwrap();
    Server::authenticate_payload_hash::<()>(&calculated, &auth.artifacts).unwrap();
}

#[tokio::test]
async fn tampered_fields() {
    let credentials = credentials();
    let body: &[u8] = b"some not so random text";
    let signed = RequestBuilder::new("POST", "example.com", 8080, "/resource/4?filter=a")
        .payload(body, "text/plain")
        .ext("some-app-data")
        .request()
        .make_header_full(&credentials, NOW / 1000, "1AwuJD")
        .unwrap();
    let header = signed.header.as_str();
    let hash = signed.artifacts.hash.clone().unwrap();
    let other_hash = PayloadHasher::hash("text/plain", hawk_auth::DigestAlgorithm::Sha256, b"other").unwrap();

    let request = |method: &str, resource: &str, host: &str, authorization: &str| {
        RequestView::new(method, resource)
            .header("Host", host)
            .header("Content-Type", "text/plain")
            .header("Authorization", authorization)
    };
    let server = server_at(NOW);
    server
        .authenticate_with_payload(
            &request("POST", "/resource/4?filter=a", "example.com:8080", header),
            &SteveResolver,
            body,
        )
        .await
        .unwrap();

    let ts = format!("ts=\"{}\"", NOW / 1000);
    let tampered_ts = format!("ts=\"{}\"", NOW / 1000 + 1);
    let hash_attr = format!("hash=\"{}\"", hash);
    let tampered_hash = format!("hash=\"{}\"", other_hash);
    let cases = vec![
        ("method", request("PUT", "/resource/4?filter=a", "example.com:8080", header), body),
        ("resource", request("POST", "/resource/5?filter=a", "example.com:8080", header), body),
        ("query", request("POST", "/resource/4?filter=b", "example.com:8080", header), body),
        ("host", request("POST", "/resource/4?filter=a", "example.net:8080", header), body),
        ("port", request("POST", "/resource/4?filter=a", "example.com:8081", header), body),
        (
            "ts",
            request("POST", "/resource/4?filter=a", "example.com:8080", &header.replace(&ts, &tampered_ts)),
            body,
        ),
        (
            "nonce",
            request(
                "POST",
                "/resource/4?filter=a",
                "example.com:8080",
                &header.replace("nonce=\"1AwuJD\"", "nonce=\"1AwuJE\""),
            ),
            body,
        ),
        (
            "ext",
            request(
                "POST",
                "/resource/4?filter=a",
                "example.com:8080",
                &header.replace("ext=\"some-app-data\"", "ext=\"other-app-data\""),
            ),
            body,
        ),
        (
            "hash",
            request("POST", "/resource/4?filter=a", "example.com:8080", &header.replace(&hash_attr, &tampered_hash)),
            &b"other"[..],
        ),
    ];
    for (field, request, payload) in &cases {
        let err = server
            .authenticate_with_payload(request, &SteveResolver, payload)
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Unauthorized, "{}", field);
        assert_eq!(err.to_string(), "Bad mac", "{}", field);
    }

    let err = server
        .authenticate_with_payload(
            &request("POST", "/resource/4?filter=a", "example.com:8080", header),
            &SteveResolver,
            b"some not so random text!",
        )
        .await
        .unwrap_err();
    assert_eq!(err.to_string(), "Bad payload hash");
}

#[tokio::test]
async fn app_and_dlg() {
    let credentials = credentials();
    let signed = RequestBuilder::new("GET", "example.com", 443, "/")
        .app("some-app-id")
        .dlg("some-delegator")
        .request()
        .make_header(&credentials, &Clock::fixed(NOW))
        .unwrap();
    assert!(signed.header.contains("app=\"some-app-id\""));

    let request = RequestView::new("GET", "/")
        .header("Host", "example.com")
        .header("Authorization", &signed.header)
        .tls(true);
    let auth = server_at(NOW).authenticate(&request, &SteveResolver).await.unwrap();
    assert_eq!(auth.artifacts.app.as_deref(), Some("some-app-id"));
    assert_eq!(auth.artifacts.dlg.as_deref(), Some("some-delegator"));

    // dropping dlg from the header invalidates the mac
    let stripped = signed.header.replace(", dlg=\"some-delegator\"", "");
    let request = request.header("Authorization", &stripped);
    let err = server_at(NOW).authenticate(&request, &SteveResolver).await.unwrap_err();
    assert_eq!(err.to_string(), "Bad mac");
}

#[tokio::test]
async fn stale_timestamp_is_signed() {
    let credentials = credentials();
    let signed = RequestBuilder::new("GET", "example.com", 8080, "/resource/4?filter=a")
        .request()
        .make_header(&credentials, &Clock::fixed(NOW))
        .unwrap();
    let request = RequestView::new("GET", "/resource/4?filter=a")
        .header("Host", "example.com:8080")
        .header("Authorization", &signed.header);

    let server_now = NOW + 3_600_000;
    let err = server_at(server_now)
        .authenticate(&request, &SteveResolver)
        .await
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Unauthorized);
    assert_eq!(err.to_string(), "Stale timestamp");
    let challenge = err.www_authenticate().unwrap();
    assert!(challenge.starts_with(&format!("Hawk ts=\"{}\", tsm=\"", server_now / 1000)));
    assert!(challenge.ends_with(", error=\"Stale timestamp\""));

    // the client can trust the server's time and retry with the offset
    let response = ResponseView::new().header("WWW-Authenticate", &challenge);
    let headers = authenticate_response(&response, &credentials, &signed.artifacts, None, false).unwrap();
    let server_ts: u64 = headers.www_authenticate.unwrap().ts.unwrap().parse().unwrap();
    let offset = (server_ts * 1000) as i64 - NOW as i64;
    let retried = RequestBuilder::new("GET", "example.com", 8080, "/resource/4?filter=a")
        .request()
        .make_header(&credentials, &Clock::fixed(NOW).with_offset(offset))
        .unwrap();
    let request = request.header("Authorization", &retried.header);
    server_at(server_now)
        .authenticate(&request, &SteveResolver)
        .await
        .unwrap();

    // a timestamp signed with another key is rejected
    let other = Credentials::new("123456", "another key", "sha256");
    assert!(matches!(
        authenticate_response(&response, &other, &signed.artifacts, None, false),
        Err(Error::BadServerTimestamp)
    ));
}

#[tokio::test]
async fn replay_across_requests() {
    let credentials = credentials();
    let server = Server::new(
        ServerOptions::default()
            .with_clock(Clock::fixed(NOW))
            .with_nonce_checker(MemoryNonceCache::default()),
    );
    let sign = |nonce: &str| {
        let signed = RequestBuilder::new("GET", "example.com", 80, "/")
            .request()
            .make_header_full(&credentials, NOW / 1000, nonce)
            .unwrap();
        RequestView::new("GET", "/")
            .header("Host", "example.com")
            .header("Authorization", &signed.header)
    };

    server.authenticate(&sign("abc"), &SteveResolver).await.unwrap();
    server.authenticate(&sign("def"), &SteveResolver).await.unwrap();
    let err = server.authenticate(&sign("abc"), &SteveResolver).await.unwrap_err();
    assert_eq!(err.to_string(), "Invalid nonce");
}

#[tokio::test]
async fn skew_is_configurable() {
    let credentials = credentials();
    let signed = RequestBuilder::new("GET", "example.com", 80, "/")
        .request()
        .make_header(&credentials, &Clock::fixed(NOW))
        .unwrap();
    let request = RequestView::new("GET", "/")
        .header("Host", "example.com")
        .header("Authorization", &signed.header);

    let server = Server::new(
        ServerOptions::default()
            .with_clock(Clock::fixed(NOW + 100_000))
            .with_timestamp_skew(Duration::from_secs(500)),
    );
    server.authenticate(&request, &SteveResolver).await.unwrap();
    let err = server_at(NOW + 100_000)
        .authenticate(&request, &SteveResolver)
        .await
        .unwrap_err();
    assert_eq!(err.to_string(), "Stale timestamp");
}

#[tokio::test]
async fn message_round_trip() {
    let credentials = credentials();
    let auth = MessageAuthorization::sign("example.com", 8080, b"some message", &credentials, &Clock::fixed(NOW)).unwrap();
    let server = server_at(NOW);

    let result = server
        .authenticate_message("example.com", 8080, b"some message", &auth, &SteveResolver)
        .await
        .unwrap();
    assert_eq!(result.credentials.data, "steve");

    let err = server
        .authenticate_message("example1.com", 8080, b"some message", &auth, &SteveResolver)
        .await
        .unwrap_err();
    assert_eq!(err.to_string(), "Bad mac");

    let err = server
        .authenticate_message("example.com", 8080, b"some message1", &auth, &SteveResolver)
        .await
        .unwrap_err();
    assert_eq!(err.to_string(), "Bad message hash");

    let err = server_at(NOW + 100_000)
        .authenticate_message("example.com", 8080, b"some message", &auth, &SteveResolver)
        .await
        .unwrap_err();
    assert_eq!(err.to_string(), "Stale timestamp");
    assert!(err.timestamp().is_some());

    let server = Server::new(
        ServerOptions::default()
            .with_clock(Clock::fixed(NOW + 100_000))
            .with_timestamp_skew(Duration::from_secs(500)),
    );
    server
        .authenticate_message("example.com", 8080, b"some message", &auth, &SteveResolver)
        .await
        .unwrap();
}

#[tokio::test]
async fn message_errors() {
    let credentials = credentials();
    let auth = MessageAuthorization::sign("example.com", 8080, b"some message", &credentials, &Clock::fixed(NOW)).unwrap();
    let server = server_at(NOW);

    let incomplete = vec![
        MessageAuthorization { id: String::new(), ..auth.clone() },
        MessageAuthorization { ts: 0, ..auth.clone() },
        MessageAuthorization { nonce: String::new(), ..auth.clone() },
        MessageAuthorization { hash: String::new(), ..auth.clone() },
        MessageAuthorization { mac: String::new(), ..auth.clone() },
    ];
    for auth in &incomplete {
        let err = server
            .authenticate_message("example.com", 8080, b"some message", auth, &SteveResolver)
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::BadRequest);
        assert_eq!(err.to_string(), "Invalid authorization");
    }

    let err = server
        .authenticate_message("example.com", 8080, b"some message", &auth, &FailingResolver("kablooey"))
        .await
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Resolver);

    let err = server
        .authenticate_message("example.com", 8080, b"some message", &auth, &FixedResolver(None))
        .await
        .unwrap_err();
    assert_eq!(err.to_string(), "Unknown credentials");

    let cases = &[
        (Credentials::new("123456", "", ""), "Invalid credentials"),
        (Credentials::new("123456", "asdasd", ""), "Invalid credentials"),
        (Credentials::new("123456", "123", "456"), "Unknown algorithm"),
    ];
    for (creds, message) in cases {
        let resolver = FixedResolver(Some(creds.clone().with_data(String::new())));
        let err = server
            .authenticate_message("example.com", 8080, b"some message", &auth, &resolver)
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Internal);
        assert_eq!(err.message(), Some(*message));
    }

    let server = Server::new(
        ServerOptions::default()
            .with_clock(Clock::fixed(NOW))
            .with_nonce_checker(RejectingNonceChecker),
    );
    let err = server
        .authenticate_message("example.com", 8080, b"some message", &auth, &SteveResolver)
        .await
        .unwrap_err();
    assert_eq!(err.to_string(), "Invalid nonce");
}
