use crate::b64;
use crate::error::*;
use crate::mac::Mac;
use crate::util::parse_timestamp;
use base64::Engine;
use std::str;
use std::str::FromStr;
use std::time::{Duration, SystemTime, UNIX_EPOCH};

const PREFIX: &str = "bewit=";
const BACKSLASH: u8 = b'\\';

/// A Bewit is a piece of data attached to a GET request that functions in place of a Hawk
/// Authentication header.  It contains an id, an expiration time, a MAC, and an optional `ext`
/// value.  These are available using accessor functions.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Bewit {
    id: String,
    exp: u64,
    mac: String,
    ext: String,
}

impl Bewit {
    /// Create a new Bewit with the given values.  `exp` is in seconds since
    /// the Unix epoch.
    ///
    /// See `Request::make_bewit` for an easier way to make a Bewit.
    pub fn new<S: Into<String>>(id: S, exp: u64, mac: &Mac, ext: Option<S>) -> Bewit {
        Bewit {
            id: id.into(),
            exp,
            mac: mac.to_string(),
            ext: ext.map(Into::into).unwrap_or_default(),
        }
    }

    /// Find the `bewit` query parameter in a resource (path and query).
    ///
    /// Returns the raw, still-encoded bewit and the resource with the
    /// parameter removed, or `None` if the resource carries no bewit.  If the
    /// parameter appears more than once, the last occurrence is used.
    pub fn from_resource(resource: &str) -> Option<(&str, String)> {
        if !resource.starts_with('/') {
            return None;
        }
        let bytes = resource.as_bytes();
        let candidates = resource
            .match_indices(PREFIX)
            .map(|(idx, _)| idx)
            .filter(|&idx| idx >= 2 && (bytes[idx - 1] == b'?' || bytes[idx - 1] == b'&'))
            .collect::<Vec<_>>();

        for &idx in candidates.iter().rev() {
            let sep = idx - 1;
            let path = &resource[..sep];
            if path.contains(is_line_terminator) {
                continue;
            }
            let token_start = idx + PREFIX.len();
            let token_end = resource[token_start..]
                .find(|c| c == '&' || c == '$')
                .map_or(resource.len(), |i| token_start + i);
            let token = &resource[token_start..token_end];
            if token_end == resource.len() {
                return Some((token, path.to_string()));
            }
            if bytes[token_end] == b'$' {
                continue;
            }
            let rest = &resource[token_end + 1..];
            if rest.is_empty() || rest.contains(is_line_terminator) {
                continue;
            }
            return Some((token, format!("{}{}{}", path, &resource[sep..idx], rest)));
        }
        None
    }

    /// Generate the fully-encoded string for this Bewit
    pub fn to_str(&self) -> String {
        let raw = format!("{}\\{}\\{}\\{}", self.id, self.exp, self.mac, self.ext);
        b64::BEWIT_ENGINE.encode(raw)
    }

    /// Get the Bewit's client identifier
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Get the expiration time of the bewit, in seconds since the Unix epoch
    pub fn exp(&self) -> u64 {
        self.exp
    }

    pub fn exp_time(&self) -> SystemTime {
        UNIX_EPOCH + Duration::from_secs(self.exp)
    }

    /// Get the base64-encoded MAC included in the Bewit
    pub fn mac(&self) -> &str {
        &self.mac
    }

    /// Get the Bewit's `ext` field, if not empty.
    pub fn ext(&self) -> Option<&str> {
        if self.ext.is_empty() {
            None
        } else {
            Some(&self.ext)
        }
    }
}

fn is_line_terminator(c: char) -> bool {
    matches!(c, '\n' | '\r' | '\u{2028}' | '\u{2029}')
}

impl FromStr for Bewit {
    type Err = Error;
    fn from_str(bewit: &str) -> Result<Bewit> {
        let bewit = b64::BEWIT_ENGINE
            .decode(bewit)
            .map_err(|_| InvalidBewit::Encoding)?;
        let bewit = String::from_utf8_lossy(&bewit);

        let parts: Vec<&str> = bewit.split(BACKSLASH as char).collect();
        if parts.len() != 4 {
            return Err(InvalidBewit::Format.into());
        }

        let id = parts[0];
        if id.is_empty() {
            return Err(InvalidBewit::Id.into());
        }

        let exp = parse_timestamp(parts[1]).ok_or(InvalidBewit::Exp)?;
        if exp == 0 {
            return Err(InvalidBewit::Exp.into());
        }

        let mac = parts[2];
        if mac.is_empty() {
            return Err(InvalidBewit::Mac.into());
        }

        Ok(Bewit {
            id: id.to_string(),
            exp,
            mac: mac.to_string(),
            ext: parts[3].to_string(),
        })
    }
}
