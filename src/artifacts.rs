/// The full set of values covered by a Hawk MAC.
///
/// Artifacts are produced when a client signs a request and when a server
/// authenticates one; the same artifacts are then needed to build or verify
/// the `Server-Authorization` header for the response.  They are plain values:
/// each stage works on its own copy, so a response can never inherit the
/// request's `mac`, `hash` or `ext` by accident.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Artifacts {
    pub method: String,
    pub host: String,
    pub port: u16,
    /// The path and query of the request, without scheme or authority.
    pub resource: String,
    /// Seconds since the Unix epoch.
    pub ts: u64,
    pub nonce: String,
    /// Base64 payload hash.
    pub hash: Option<String>,
    pub ext: Option<String>,
    pub app: Option<String>,
    pub dlg: Option<String>,
    /// Base64 MAC, as sent by the client.
    pub mac: Option<String>,
    pub id: Option<String>,
}

impl Artifacts {
    /// Copy these request artifacts for use in a response, replacing the
    /// payload hash and `ext` with the response's own and dropping the
    /// request's MAC.
    pub fn for_response(&self, hash: Option<String>, ext: Option<String>) -> Artifacts {
        Artifacts {
            hash,
            ext,
            mac: None,
            ..self.clone()
        }
    }
}
