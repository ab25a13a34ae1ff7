//! Resource identifier parsing.

use ig_core::BrowserError;
use ig_core::BrowserResult;
use ig_core::codes;

/// Transport schemes a resource identifier may name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Scheme {
    Http,
    Https,
    File,
    Data,
}

impl Scheme {
    pub fn from_token(token: &str) -> Option<Self> {
        match token {
            "http" => Some(Self::Http),
            "https" => Some(Self::Https),
            "file" => Some(Self::File),
            "data" => Some(Self::Data),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Http => "http",
            Self::Https => "https",
            Self::File => "file",
            Self::Data => "data",
        }
    }

    pub fn is_secure(self) -> bool {
        matches!(self, Self::Https)
    }

    pub fn is_network(self) -> bool {
        matches!(self, Self::Http | Self::Https)
    }

    fn default_port(self) -> &'static str {
        match self {
            Self::Http => "80",
            Self::Https => "443",
            Self::File | Self::Data => "",
        }
    }
}

/// Parsed resource identifier. Immutable once built.
///
/// `port` is always populated for `http`/`https`; `host` and `port` are empty
/// for `file` and `data`. For `data` the literal payload lives in `path`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResourceDescriptor {
    scheme: Scheme,
    host: String,
    port: String,
    path: String,
    media_type: String,
}

impl ResourceDescriptor {
    /// Parses `http://host[:port][/path]`, `https://...`, `file:path`,
    /// `file://path` or `data:mediatype,literal`.
    pub fn parse(input: &str) -> BrowserResult<Self> {
        if let Some(rest) = input.strip_prefix("data:") {
            let (media_type, payload) = rest.split_once(',').unwrap_or(("", rest));
            return Ok(Self::local(Scheme::Data, payload, media_type));
        }

        let (token, rest) = match input.split_once("://") {
            Some(parts) => parts,
            None => match input.split_once(':') {
                Some(("file", path)) => return Ok(Self::local(Scheme::File, path, "")),
                _ => return Err(invalid_protocol(input)),
            },
        };

        let scheme = Scheme::from_token(token).ok_or_else(|| invalid_protocol(token))?;
        if scheme.is_network() {
            Ok(Self::network(scheme, rest))
        } else {
            Ok(Self::local(scheme, rest, ""))
        }
    }

    fn local(scheme: Scheme, path: &str, media_type: &str) -> Self {
        Self {
            scheme,
            host: String::new(),
            port: String::new(),
            path: path.to_owned(),
            media_type: media_type.to_owned(),
        }
    }

    fn network(scheme: Scheme, rest: &str) -> Self {
        let (authority, path) = rest.split_once('/').unwrap_or((rest, ""));
        let (host, port) = authority.split_once(':').unwrap_or((authority, ""));
        let port = if port.is_empty() {
            scheme.default_port()
        } else {
            port
        };

        Self {
            scheme,
            host: host.to_owned(),
            port: port.to_owned(),
            path: format!("/{path}"),
            media_type: String::new(),
        }
    }

    pub fn scheme(&self) -> Scheme {
        self.scheme
    }

    pub fn host(&self) -> &str {
        &self.host
    }

    pub fn port(&self) -> &str {
        &self.port
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    /// Media type of a `data:` identifier, empty otherwise.
    pub fn media_type(&self) -> &str {
        &self.media_type
    }

    pub fn is_secure(&self) -> bool {
        self.scheme.is_secure()
    }

    /// Host, plus the port when it differs from the scheme default.
    pub fn authority(&self) -> String {
        if self.port.is_empty() || self.port == self.scheme.default_port() {
            self.host.clone()
        } else {
            format!("{}:{}", self.host, self.port)
        }
    }

    pub fn origin(&self) -> String {
        format!("{}://{}", self.scheme.as_str(), self.authority())
    }
}

fn invalid_protocol(token: &str) -> BrowserError {
    BrowserError::new(
        codes::INVALID_PROTOCOL,
        format!("unsupported scheme in `{token}`"),
    )
}
