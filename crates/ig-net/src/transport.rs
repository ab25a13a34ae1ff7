//! Transport capability set, connection seam and the default TCP connector.

use crate::http::Headers;
use crate::tls::TlsPolicy;
use crate::tls_backend::RustlsTlsAdapter;
use crate::tls_backend::TlsBackendAdapter;
use crate::url::ResourceDescriptor;
use ig_core::BrowserError;
use ig_core::BrowserResult;
use ig_core::codes;
use std::io::Read;
use std::io::Write;
use std::net::SocketAddr;
use std::net::TcpStream;
use std::net::ToSocketAddrs;
use std::time::Duration;

/// One scheme's way of turning a descriptor into a response body.
///
/// A transport is used for a single request; redirects get a fresh instance.
pub trait Transport {
    /// Performs the exchange and returns the (decoded) body.
    fn request(&mut self) -> BrowserResult<String>;

    /// Status code of the last exchange, empty before [`Transport::request`].
    fn status_code(&self) -> &str;

    fn response_headers(&self) -> &Headers;

    fn request_headers(&self) -> &Headers;

    /// Replaces every request header, used to carry headers across redirects.
    fn set_request_headers(&mut self, headers: Headers);

    fn set_header(&mut self, name: &str, value: &str) -> BrowserResult<()>;

    fn descriptor(&self) -> &ResourceDescriptor;

    fn protocol(&self) -> String {
        self.descriptor().scheme().as_str().to_owned()
    }

    fn host(&self) -> &str {
        self.descriptor().host()
    }

    fn path(&self) -> &str {
        self.descriptor().path()
    }
}

impl<T> Transport for Box<T>
where
    T: Transport + ?Sized,
{
    fn request(&mut self) -> BrowserResult<String> {
        (**self).request()
    }

    fn status_code(&self) -> &str {
        (**self).status_code()
    }

    fn response_headers(&self) -> &Headers {
        (**self).response_headers()
    }

    fn request_headers(&self) -> &Headers {
        (**self).request_headers()
    }

    fn set_request_headers(&mut self, headers: Headers) {
        (**self).set_request_headers(headers);
    }

    fn set_header(&mut self, name: &str, value: &str) -> BrowserResult<()> {
        (**self).set_header(name, value)
    }

    fn descriptor(&self) -> &ResourceDescriptor {
        (**self).descriptor()
    }

    fn protocol(&self) -> String {
        (**self).protocol()
    }
}

/// Trait-object-safe stream returned by connectors.
pub trait IoStream: Read + Write {}
impl<T> IoStream for T where T: Read + Write {}

pub type BoxedIoStream = Box<dyn IoStream>;

/// Address an HTTP transport dials.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Endpoint {
    pub host: String,
    pub port: String,
    pub secure: bool,
}

impl Endpoint {
    pub fn for_descriptor(descriptor: &ResourceDescriptor) -> Self {
        Self {
            host: descriptor.host().to_owned(),
            port: descriptor.port().to_owned(),
            secure: descriptor.is_secure(),
        }
    }
}

/// Opens a byte stream to an endpoint, TLS-wrapped when `secure` is set.
pub trait Connector {
    fn connect(&self, endpoint: &Endpoint) -> BrowserResult<BoxedIoStream>;
}

/// Name resolution abstraction.
pub trait DnsResolver {
    fn resolve(&self, host: &str, port: u16) -> BrowserResult<Vec<SocketAddr>>;
}

/// Uses the operating system resolver.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemDnsResolver;

impl DnsResolver for SystemDnsResolver {
    fn resolve(&self, host: &str, port: u16) -> BrowserResult<Vec<SocketAddr>> {
        let addresses: Vec<SocketAddr> = (host, port)
            .to_socket_addrs()
            .map_err(|error| {
                BrowserError::io(
                    codes::DNS_RESOLVE_FAILED,
                    format!("failed to resolve `{host}:{port}`"),
                    &error,
                )
            })?
            .collect();

        if addresses.is_empty() {
            return Err(BrowserError::new(
                codes::DNS_NO_RESULTS,
                format!("resolver returned no addresses for `{host}:{port}`"),
            ));
        }

        Ok(addresses)
    }
}

/// Plain TCP connector with a pluggable resolver and TLS backend.
///
/// Dials block; without a `connect_timeout` a dead peer blocks forever.
#[derive(Debug, Clone)]
pub struct TcpConnector<R = SystemDnsResolver, A = RustlsTlsAdapter>
where
    R: DnsResolver,
    A: TlsBackendAdapter,
{
    dns: R,
    tls_adapter: A,
    tls_policy: TlsPolicy,
    connect_timeout: Option<Duration>,
}

impl TcpConnector {
    pub fn new(tls_policy: TlsPolicy) -> BrowserResult<Self> {
        Self::with_parts(SystemDnsResolver, RustlsTlsAdapter, tls_policy)
    }
}

impl<R, A> TcpConnector<R, A>
where
    R: DnsResolver,
    A: TlsBackendAdapter,
{
    pub fn with_parts(dns: R, tls_adapter: A, tls_policy: TlsPolicy) -> BrowserResult<Self> {
        tls_policy.validate()?;
        Ok(Self {
            dns,
            tls_adapter,
            tls_policy,
            connect_timeout: None,
        })
    }

    pub fn with_connect_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.connect_timeout = timeout;
        self
    }
}

impl<R, A> Connector for TcpConnector<R, A>
where
    R: DnsResolver,
    A: TlsBackendAdapter,
{
    fn connect(&self, endpoint: &Endpoint) -> BrowserResult<BoxedIoStream> {
        let port = endpoint.port.parse::<u16>().map_err(|error| {
            BrowserError::new(
                codes::PORT_INVALID,
                format!("invalid port `{}`: {error}", endpoint.port),
            )
        })?;
        let addresses = self.dns.resolve(&endpoint.host, port)?;
        let stream = connect_first_available(&addresses, self.connect_timeout)?;
        log::debug!(
            "connected to {}:{} (tls: {})",
            endpoint.host,
            endpoint.port,
            endpoint.secure
        );

        if !endpoint.secure {
            return Ok(Box::new(stream));
        }

        let handshake = self.tls_policy.handshake_config_for(&endpoint.host)?;
        self.tls_adapter
            .connect_tls(stream, &handshake, &self.tls_policy)
    }
}

fn connect_first_available(
    addresses: &[SocketAddr],
    timeout: Option<Duration>,
) -> BrowserResult<TcpStream> {
    let mut last_error: Option<BrowserError> = None;

    for address in addresses {
        let attempt = match timeout {
            Some(timeout) => TcpStream::connect_timeout(address, timeout),
            None => TcpStream::connect(address),
        };

        match attempt {
            Ok(stream) => return Ok(stream),
            Err(error) => {
                last_error = Some(BrowserError::io(
                    codes::CONNECT_FAILED,
                    format!("failed to connect to `{address}`"),
                    &error,
                ));
            }
        }
    }

    match last_error {
        Some(error) => Err(error),
        None => Err(BrowserError::new(
            codes::CONNECT_FAILED,
            "no addresses available to open a connection",
        )),
    }
}
