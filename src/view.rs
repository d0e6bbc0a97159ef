/// Header fields of an HTTP message, looked up case-insensitively.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
struct Headers(Vec<(String, String)>);

impl Headers {
    fn insert(&mut self, name: &str, value: &str) {
        self.0.retain(|(n, _)| !n.eq_ignore_ascii_case(name));
        self.0.push((name.to_string(), value.to_string()));
    }

    fn get(&self, name: &str) -> Option<&str> {
        self.0
            .iter()
            .find(|(n, _)| n.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }
}

/// The parts of an incoming HTTP request that Hawk authentication needs.
///
/// The HTTP server integration builds one of these for each request; the
/// authenticator never looks at the transport's own request type.
///
/// # Examples
///
/// ```
/// use hawk_auth::RequestView;
/// let request = RequestView::new("GET", "/resource/1?b=1&a=2")
///     .header("Host", "example.com:8000")
///     .header("Authorization", "Hawk id=\"dh37fgj492je\", ...");
/// assert_eq!(request.get_header("host"), Some("example.com:8000"));
/// ```
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct RequestView {
    method: String,
    url: String,
    headers: Headers,
    tls: bool,
}

impl RequestView {
    /// `url` is the request target: path and query, as sent on the request line.
    pub fn new<M, U>(method: M, url: U) -> Self
    where
        M: Into<String>,
        U: Into<String>,
    {
        RequestView {
            method: method.into(),
            url: url.into(),
            headers: Headers::default(),
            tls: false,
        }
    }

    /// Set a header, replacing any existing value with the same name.
    pub fn header(mut self, name: &str, value: &str) -> Self {
        self.headers.insert(name, value);
        self
    }

    /// Mark the request as received over TLS; this changes the default port.
    pub fn tls(mut self, tls: bool) -> Self {
        self.tls = tls;
        self
    }

    pub fn method(&self) -> &str {
        &self.method
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    pub fn get_header(&self, name: &str) -> Option<&str> {
        self.headers.get(name)
    }

    pub fn is_tls(&self) -> bool {
        self.tls
    }
}

/// The parts of an HTTP response that the client needs to validate it.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ResponseView {
    headers: Headers,
}

impl ResponseView {
    pub fn new() -> Self {
        ResponseView::default()
    }

    pub fn header(mut self, name: &str, value: &str) -> Self {
        self.headers.insert(name, value);
        self
    }

    pub fn get_header(&self, name: &str) -> Option<&str> {
        self.headers.get(name)
    }
}
