//! TLS policy for HTTPS dials.

use ig_core::BrowserError;
use ig_core::BrowserResult;

/// Supported TLS protocol versions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum TlsVersion {
    V1_2,
    V1_3,
}

impl TlsVersion {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::V1_2 => "TLS1.2",
            Self::V1_3 => "TLS1.3",
        }
    }
}

/// Controls which trust anchors are used for server certificate verification.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TrustStoreMode {
    /// Use only the embedded Mozilla/WebPKI roots.
    WebPkiOnly,
    /// Use WebPKI roots and merge operating-system roots (enterprise/local CAs).
    WebPkiAndOs,
}

/// Per-connection handshake parameters derived from a [`TlsPolicy`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TlsHandshakeConfig {
    pub server_name: String,
    pub minimum_version: TlsVersion,
    pub maximum_version: TlsVersion,
    pub alpn_protocols: Vec<String>,
    pub verify_certificates: bool,
}

/// How HTTPS connections are negotiated and verified.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TlsPolicy {
    pub minimum_version: TlsVersion,
    pub maximum_version: TlsVersion,
    pub trust_store_mode: TrustStoreMode,
    /// Skips certificate verification entirely. Never enable outside local testing.
    pub allow_invalid_certificates: bool,
}

impl Default for TlsPolicy {
    fn default() -> Self {
        Self {
            minimum_version: TlsVersion::V1_2,
            maximum_version: TlsVersion::V1_3,
            trust_store_mode: TrustStoreMode::WebPkiOnly,
            allow_invalid_certificates: false,
        }
    }
}

impl TlsPolicy {
    /// Policy that accepts any server certificate.
    pub fn insecure() -> Self {
        Self {
            allow_invalid_certificates: true,
            ..Self::default()
        }
    }

    pub fn with_trust_store_mode(mut self, mode: TrustStoreMode) -> Self {
        self.trust_store_mode = mode;
        self
    }

    pub fn with_invalid_certificates_allowed(mut self, allowed: bool) -> Self {
        self.allow_invalid_certificates = allowed;
        self
    }

    pub fn validate(&self) -> BrowserResult<()> {
        if self.minimum_version > self.maximum_version {
            return Err(BrowserError::new(
                "net.tls.invalid_version_range",
                "minimum TLS version cannot be greater than maximum version",
            ));
        }

        Ok(())
    }

    pub fn handshake_config_for(&self, host: &str) -> BrowserResult<TlsHandshakeConfig> {
        self.validate()?;

        if host.is_empty() {
            return Err(BrowserError::new(
                "net.tls.server_name_missing",
                "HTTPS requires a host to use as the TLS server name",
            ));
        }

        Ok(TlsHandshakeConfig {
            server_name: host.to_owned(),
            minimum_version: self.minimum_version,
            maximum_version: self.maximum_version,
            alpn_protocols: vec!["http/1.1".to_owned()],
            verify_certificates: !self.allow_invalid_certificates,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::TlsPolicy;
    use super::TlsVersion;
    use super::TrustStoreMode;

    #[test]
    fn validates_version_range() {
        let policy = TlsPolicy {
            minimum_version: TlsVersion::V1_3,
            maximum_version: TlsVersion::V1_2,
            ..TlsPolicy::default()
        };

        assert!(policy.validate().is_err());
        assert!(policy.handshake_config_for("example.org").is_err());
    }

    #[test]
    fn default_policy_verifies_certificates() {
        let handshake = match TlsPolicy::default().handshake_config_for("example.org") {
            Ok(value) => value,
            Err(error) => panic!("{error}"),
        };

        assert!(handshake.verify_certificates);
        assert_eq!(handshake.server_name, "example.org");
        assert_eq!(handshake.alpn_protocols, vec!["http/1.1".to_owned()]);
    }

    #[test]
    fn insecure_policy_skips_verification() {
        let handshake = match TlsPolicy::insecure().handshake_config_for("127.0.0.1") {
            Ok(value) => value,
            Err(error) => panic!("{error}"),
        };
        assert!(!handshake.verify_certificates);
    }

    #[test]
    fn empty_host_has_no_server_name() {
        assert!(TlsPolicy::default().handshake_config_for("").is_err());
    }

    #[test]
    fn trust_store_mode_can_be_overridden() {
        let policy = TlsPolicy::default().with_trust_store_mode(TrustStoreMode::WebPkiAndOs);
        assert_eq!(policy.trust_store_mode, TrustStoreMode::WebPkiAndOs);
        assert_eq!(TlsPolicy::default().trust_store_mode, TrustStoreMode::WebPkiOnly);
    }
}
