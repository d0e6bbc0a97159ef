use crate::error::*;
use crate::util::{escape_header_attribute, MAX_MATCH_LENGTH};
use std::str::FromStr;

/// The header a set of Hawk attributes appears in.  Each header permits a
/// different set of attributes.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum HeaderKind {
    /// `Authorization`, sent by the client.
    Authorization,
    /// `Server-Authorization`, sent by the server with a response.
    ServerAuthorization,
    /// `WWW-Authenticate`, sent by the server with a 401 response.
    WwwAuthenticate,
}

impl HeaderKind {
    /// The permitted attributes, in the order they are serialized.
    pub fn allowed_attributes(&self) -> &'static [&'static str] {
        match self {
            HeaderKind::Authorization => &["id", "ts", "nonce", "hash", "ext", "mac", "app", "dlg"],
            HeaderKind::ServerAuthorization => &["mac", "hash", "ext"],
            HeaderKind::WwwAuthenticate => &["ts", "tsm", "error"],
        }
    }
}

/// Representation of the attributes of a Hawk header value.
///
/// All attributes are optional at this level; which ones are required depends
/// on what the header is used for, and is checked by the caller.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Header {
    pub id: Option<String>,
    pub ts: Option<String>,
    pub nonce: Option<String>,
    pub mac: Option<String>,
    pub ext: Option<String>,
    pub hash: Option<String>,
    pub app: Option<String>,
    pub dlg: Option<String>,
    pub tsm: Option<String>,
    pub error: Option<String>,
}

impl Header {
    fn slot(&mut self, name: &str) -> Option<&mut Option<String>> {
        match name {
            "id" => Some(&mut self.id),
            "ts" => Some(&mut self.ts),
            "nonce" => Some(&mut self.nonce),
            "mac" => Some(&mut self.mac),
            "ext" => Some(&mut self.ext),
            "hash" => Some(&mut self.hash),
            "app" => Some(&mut self.app),
            "dlg" => Some(&mut self.dlg),
            "tsm" => Some(&mut self.tsm),
            "error" => Some(&mut self.error),
            _ => None,
        }
    }

    fn get(&self, name: &str) -> Option<&str> {
        match name {
            "id" => self.id.as_deref(),
            "ts" => self.ts.as_deref(),
            "nonce" => self.nonce.as_deref(),
            "mac" => self.mac.as_deref(),
            "ext" => self.ext.as_deref(),
            "hash" => self.hash.as_deref(),
            "app" => self.app.as_deref(),
            "dlg" => self.dlg.as_deref(),
            "tsm" => self.tsm.as_deref(),
            "error" => self.error.as_deref(),
            _ => None,
        }
    }

    /// Parse a full header value such as `Hawk id="abc", ts="123", ...`.
    ///
    /// A missing value or a scheme other than Hawk is `HeaderError::Missing`.
    /// When several attributes are invalid, the error for the last of them is
    /// returned.
    pub fn parse(value: &str, kind: HeaderKind) -> std::result::Result<Header, HeaderError> {
        if value.is_empty() {
            return Err(HeaderError::Missing);
        }
        if value.len() > MAX_MATCH_LENGTH {
            return Err(HeaderError::TooLong);
        }

        let (scheme, attributes) = split_scheme(value).ok_or(HeaderError::InvalidSyntax)?;
        if !scheme.eq_ignore_ascii_case("hawk") {
            return Err(HeaderError::Missing);
        }
        if attributes.is_empty() {
            return Err(HeaderError::InvalidSyntax);
        }

        let allowed = kind.allowed_attributes();
        let mut header = Header::default();
        let mut error = None;
        let mut leftover = false;
        let mut pos = 0;
        while pos < attributes.len() {
            let Some((name, value, end)) = match_attribute(attributes, pos) else {
                leftover = true;
                pos += attributes[pos..].chars().next().map_or(1, char::len_utf8);
                continue;
            };
            pos = end;

            if !allowed.contains(&name) {
                error = Some(HeaderError::UnknownAttribute(name.to_string()));
            } else if value.is_empty() || !value.chars().all(is_attribute_char) {
                error = Some(HeaderError::BadAttributeValue(name.to_string()));
            } else if let Some(slot) = header.slot(name) {
                if slot.is_some() {
                    error = Some(HeaderError::DuplicateAttribute(name.to_string()));
                } else {
                    *slot = Some(value.to_string());
                }
            }
        }

        match error {
            Some(err) => Err(err),
            None if leftover => Err(HeaderError::BadFormat),
            None => Ok(header),
        }
    }

    /// Serialize these attributes as a header value of the given kind,
    /// including the `Hawk` scheme.  Attributes not permitted in that header
    /// are ignored, as are an empty `ext` and a `dlg` without an `app`.
    pub fn serialize(&self, kind: HeaderKind) -> Result<String> {
        let mut parts = vec![];
        for name in kind.allowed_attributes() {
            let value = match self.get(name) {
                Some(value) => value,
                None => continue,
            };
            if *name == "ext" && value.is_empty() {
                continue;
            }
            if *name == "dlg" && self.app.is_none() {
                continue;
            }
            parts.push(format!("{}=\"{}\"", name, escape_header_attribute(name, value)?));
        }
        if parts.is_empty() {
            return Ok("Hawk".to_string());
        }
        Ok(format!("Hawk {}", parts.join(", ")))
    }
}

impl FromStr for Header {
    type Err = Error;

    /// Parse an `Authorization` header value.
    fn from_str(s: &str) -> Result<Header> {
        Ok(Header::parse(s, HeaderKind::Authorization)?)
    }
}

fn is_word_byte(b: u8) -> bool {
    b.is_ascii_alphanumeric() || b == b'_'
}

fn is_attribute_char(c: char) -> bool {
    // printable ASCII, less `"` and `\`
    (' '..='~').contains(&c) && c != '"' && c != '\\'
}

fn is_line_terminator(c: char) -> bool {
    matches!(c, '\n' | '\r' | '\u{2028}' | '\u{2029}')
}

/// Split `value` into a scheme token and the (possibly empty) remainder,
/// separated by whitespace.  The remainder must fit on one line.
fn split_scheme(value: &str) -> Option<(&str, &str)> {
    let scheme_end = value
        .bytes()
        .position(|b| !is_word_byte(b))
        .unwrap_or(value.len());
    if scheme_end == 0 {
        return None;
    }
    let (scheme, rest) = value.split_at(scheme_end);
    if rest.is_empty() {
        return Some((scheme, ""));
    }
    if !rest.starts_with(char::is_whitespace) {
        return None;
    }
    let attributes = rest.trim_start();
    if attributes.contains(is_line_terminator) {
        return None;
    }
    Some((scheme, attributes))
}

/// Try to match `name="value"` at byte offset `start`, followed by optional
/// whitespace and either a comma (plus whitespace) or the end of input.
/// Returns the name, value and the offset just past the match.
fn match_attribute(s: &str, start: usize) -> Option<(&str, &str, usize)> {
    let bytes = s.as_bytes();

    let mut pos = start;
    while pos < bytes.len() && is_word_byte(bytes[pos]) {
        pos += 1;
    }
    if pos == start {
        return None;
    }
    let name = &s[start..pos];

    if !s[pos..].starts_with("=\"") {
        return None;
    }
    pos += 2;
    let value_start = pos;
    while pos < bytes.len() && bytes[pos] != b'"' && bytes[pos] != b'\\' {
        pos += 1;
    }
    if pos >= bytes.len() || bytes[pos] != b'"' {
        return None;
    }
    let value = &s[value_start..pos];
    pos += 1;

    let rest = &s[pos..];
    let trimmed = rest.trim_start();
    pos += rest.len() - trimmed.len();
    if let Some(after_comma) = trimmed.strip_prefix(',') {
        pos += 1 + after_comma.len() - after_comma.trim_start().len();
    } else if !trimmed.is_empty() {
        return None;
    }

    Some((name, value, pos))
}
