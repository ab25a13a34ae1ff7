//! Resource resolution and transports: URI parsing, HTTP/1.1, TLS, file and data.

pub mod client;
pub mod http;
pub mod local;
pub mod replay;
pub mod resolver;
pub mod tls;
pub mod tls_backend;
pub mod transport;
pub mod url;
pub mod view_source;

use ig_core::BrowserResult;
use std::time::Duration;
use tls::TlsPolicy;
use transport::TcpConnector;

pub use http::Headers;
pub use replay::ReplayConnector;
pub use resolver::Resolver;
pub use tls::TrustStoreMode;
pub use transport::Connector;
pub use transport::Transport;
pub use url::ResourceDescriptor;
pub use url::Scheme;

/// Network configuration for the default TCP/TLS connector.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NetConfig {
    pub tls: TlsPolicy,
    /// `None` keeps dials blocking with no deadline.
    pub connect_timeout: Option<Duration>,
}

impl NetConfig {
    pub fn with_tls(mut self, tls: TlsPolicy) -> Self {
        self.tls = tls;
        self
    }

    pub fn with_connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout = Some(timeout);
        self
    }

    pub fn connector(&self) -> BrowserResult<TcpConnector> {
        Ok(TcpConnector::new(self.tls.clone())?.with_connect_timeout(self.connect_timeout))
    }

    /// Resolver whose network transports dial over real sockets.
    pub fn resolver(&self) -> BrowserResult<Resolver> {
        Ok(Resolver::with_connector(self.connector()?))
    }
}

#[cfg(test)]
mod tests {
    use super::NetConfig;
    use crate::tls::TlsPolicy;
    use crate::tls::TlsVersion;
    use std::time::Duration;

    #[test]
    fn default_config_builds_resolver() {
        let config = NetConfig::default();
        assert_eq!(config.connect_timeout, None);
        assert!(!config.tls.allow_invalid_certificates);
        assert!(config.resolver().is_ok());
    }

    #[test]
    fn invalid_tls_policy_is_rejected() {
        let config = NetConfig::default()
            .with_connect_timeout(Duration::from_secs(5))
            .with_tls(TlsPolicy {
                minimum_version: TlsVersion::V1_3,
                maximum_version: TlsVersion::V1_2,
                ..TlsPolicy::default()
            });
        assert_eq!(config.connect_timeout, Some(Duration::from_secs(5)));
        assert!(config.connector().is_err());
    }
}
