//! Request-derived routing context.
//!
//! Carries what URL generation needs from the current request: the base path
//! the application is mounted under, and the scheme, host and ports used when
//! building absolute URLs.

use serde::Serialize;

/// Default port for `http`.
pub const DEFAULT_HTTP_PORT: u16 = 80;
/// Default port for `https`.
pub const DEFAULT_HTTPS_PORT: u16 = 443;

/// Error building a [`RequestContext`] from a URI.
#[derive(Debug, thiserror::Error)]
pub enum RequestContextError {
    /// URI could not be parsed.
    #[error("Invalid URI {uri:?}: {source}")]
    InvalidUri {
        uri: String,
        #[source]
        source: url::ParseError,
    },
    /// URI parsed but has no host.
    #[error("URI {0:?} has no host")]
    MissingHost(String),
}

/// Routing information for URL generation.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct RequestContext {
    /// Path prefix without trailing slash (e.g. `""`, `"/app"`).
    pub base_url: String,
    /// Host name; empty when unknown.
    pub host: String,
    /// `"http"` or `"https"`.
    pub scheme: String,
    pub http_port: u16,
    pub https_port: u16,
}

impl Default for RequestContext {
    fn default() -> Self {
        Self {
            base_url: String::new(),
            host: String::new(),
            scheme: "http".to_owned(),
            http_port: DEFAULT_HTTP_PORT,
            https_port: DEFAULT_HTTPS_PORT,
        }
    }
}

impl RequestContext {
    /// Create an empty context (no host, no base path, plain http).
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    #[must_use]
    pub fn with_host(mut self, host: impl Into<String>) -> Self {
        self.host = host.into();
        self
    }

    #[must_use]
    pub fn with_scheme(mut self, scheme: impl Into<String>) -> Self {
        self.scheme = scheme.into();
        self
    }

    #[must_use]
    pub fn with_http_port(mut self, port: u16) -> Self {
        self.http_port = port;
        self
    }

    #[must_use]
    pub fn with_https_port(mut self, port: u16) -> Self {
        self.https_port = port;
        self
    }

    /// Build a context from an absolute URI such as `https://example.com:8443/app`.
    ///
    /// The URI path becomes the base URL (trailing slash stripped). The
    /// explicit port, if any, is assigned to the port of the URI's scheme.
    pub fn from_uri(uri: &str) -> Result<Self, RequestContextError> {
        let parsed = url::Url::parse(uri).map_err(|source| RequestContextError::InvalidUri {
            uri: uri.to_owned(),
            source,
        })?;
        let host = parsed
            .host_str()
            .ok_or_else(|| RequestContextError::MissingHost(uri.to_owned()))?;

        let mut context = Self::new()
            .with_scheme(parsed.scheme())
            .with_host(host)
            .with_base_url(parsed.path().trim_end_matches('/'));

        if let Some(port) = parsed.port() {
            match parsed.scheme() {
                "https" => context.https_port = port,
                _ => context.http_port = port,
            }
        }

        Ok(context)
    }

    /// Port suffix for absolute URLs (`""` or `":8080"`).
    ///
    /// Only `http` and `https` carry a port, and only when it differs from
    /// the scheme's default.
    pub fn port_suffix(&self) -> String {
        match self.scheme.as_str() {
            "http" if self.http_port != DEFAULT_HTTP_PORT => format!(":{}", self.http_port),
            "https" if self.https_port != DEFAULT_HTTPS_PORT => format!(":{}", self.https_port),
            _ => String::new(),
        }
    }

    /// `scheme://host[:port]`, or `None` when the host is unknown.
    pub fn origin(&self) -> Option<String> {
        if self.host.is_empty() {
            return None;
        }
        Some(format!("{}://{}{}", self.scheme, self.host, self.port_suffix()))
    }
}
