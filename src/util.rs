use crate::error::*;
use rand::distributions::Alphanumeric;
use rand::Rng;

/// Longest header value or resource path the parsers will look at.
pub(crate) const MAX_MATCH_LENGTH: usize = 4096;

const NONCE_LENGTH: usize = 6;

/// Create a random alphanumeric nonce.
pub(crate) fn random_nonce() -> String {
    rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(NONCE_LENGTH)
        .map(char::from)
        .collect()
}

/// Escape a value for use inside a quoted header attribute.  Only printable
/// ASCII is allowed; `\` and `"` are backslash-escaped.
pub(crate) fn escape_header_attribute(name: &str, value: &str) -> Result<String> {
    if !value.chars().all(|c| (' '..='~').contains(&c)) {
        return Err(HeaderError::BadAttributeValue(name.to_string()).into());
    }
    Ok(value.replace('\\', "\\\\").replace('"', "\\\""))
}

/// Parse a timestamp as it appears on the wire: ASCII digits in canonical form,
/// so that formatting the result reproduces the signed text.
pub(crate) fn parse_timestamp(value: &str) -> Option<u64> {
    if value.is_empty() || !value.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    if value.len() > 1 && value.starts_with('0') {
        return None;
    }
    value.parse().ok()
}

/// Split a `Host` header value into host name and optional port.  Bracketed
/// IPv6 literals keep their brackets.  Returns `None` if the value is not a
/// valid host.
pub(crate) fn parse_host(value: &str) -> Option<(String, Option<u16>)> {
    if value.len() > MAX_MATCH_LENGTH {
        return None;
    }
    let value = value.trim();

    let (host, rest) = if value.starts_with('[') {
        let end = value.find(']')?;
        if end == 1 {
            return None;
        }
        value.split_at(end + 1)
    } else {
        match value.find(':') {
            Some(idx) => value.split_at(idx),
            None => (value, ""),
        }
    };
    if host.is_empty() {
        return None;
    }

    if rest.is_empty() {
        return Some((host.to_string(), None));
    }
    let port = rest.strip_prefix(':')?;
    if port.is_empty() || !port.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    Some((host.to_string(), Some(port.parse().ok()?)))
}

#[cfg(test)]
mod test {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_parse_timestamp() {
        assert_eq!(parse_timestamp("1353788437"), Some(1353788437));
        assert_eq!(parse_timestamp("0"), Some(0));
        assert_eq!(parse_timestamp("+1353788437"), None);
        assert_eq!(parse_timestamp("01353788437"), None);
        assert_eq!(parse_timestamp(" 1353788437"), None);
        assert_eq!(parse_timestamp(""), None);
        assert_eq!(parse_timestamp("99999999999999999999999"), None);
    }

    #[test]
    fn test_random_nonce() {
        let nonce = random_nonce();
        assert_eq!(nonce.len(), 6);
        assert!(nonce.chars().all(|c| c.is_ascii_alphanumeric()));
    }

    #[test]
    fn test_escape() {
        assert_eq!(
            escape_header_attribute("ext", "plain text").unwrap(),
            "plain text"
        );
        assert_eq!(
            escape_header_attribute("ext", "a \"quoted\" \\ value").unwrap(),
            "a \\\"quoted\\\" \\\\ value"
        );
    }

    #[test]
    fn test_escape_rejects_non_printable() {
        for value in &["line\nbreak", "tab\there", "caf\u{e9}"] {
            match escape_header_attribute("ext", value) {
                Err(Error::Header(HeaderError::BadAttributeValue(name))) => assert_eq!(name, "ext"),
                other => panic!("unexpected {:?}", other),
            }
        }
    }

    #[test]
    fn test_parse_host() {
        assert_eq!(
            parse_host("example.com:8080"),
            Some(("example.com".to_string(), Some(8080)))
        );
        assert_eq!(parse_host("example.com"), Some(("example.com".to_string(), None)));
        assert_eq!(
            parse_host("  example.com:8080 "),
            Some(("example.com".to_string(), Some(8080)))
        );
        assert_eq!(
            parse_host("[123:123:123]:8000"),
            Some(("[123:123:123]".to_string(), Some(8000)))
        );
        assert_eq!(
            parse_host("[::1]"),
            Some(("[::1]".to_string(), None))
        );
    }

    #[test]
    fn test_parse_host_invalid() {
        assert_eq!(parse_host(":8080"), None);
        assert_eq!(parse_host("example.com:8080/path"), None);
        assert_eq!(parse_host("example.com:port"), None);
        assert_eq!(parse_host("example.com:"), None);
        assert_eq!(parse_host("[]:80"), None);
        assert_eq!(parse_host(""), None);
        assert_eq!(parse_host(&format!("{}.com", "x".repeat(5000))), None);
    }
}
