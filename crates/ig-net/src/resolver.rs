//! Turns raw resource identifiers into ready-to-use transports.

use crate::client::HttpTransport;
use crate::local::DataTransport;
use crate::local::FileTransport;
use crate::transport::Connector;
use crate::transport::Transport;
use crate::url::ResourceDescriptor;
use crate::url::Scheme;
use crate::view_source::VIEW_SOURCE_PREFIX;
use crate::view_source::ViewSource;
use ig_core::BrowserResult;
use std::rc::Rc;

/// Scheme resolver. Network transports it builds share one connector.
#[derive(Clone)]
pub struct Resolver {
    connector: Rc<dyn Connector>,
}

impl Resolver {
    pub fn new(connector: Rc<dyn Connector>) -> Self {
        Self { connector }
    }

    pub fn with_connector<C>(connector: C) -> Self
    where
        C: Connector + 'static,
    {
        Self::new(Rc::new(connector))
    }

    /// Parses `raw` and returns the transport for its scheme.
    ///
    /// A `view-source:` prefix wraps whatever the remainder resolves to.
    pub fn resolve(&self, raw: &str) -> BrowserResult<Box<dyn Transport>> {
        let (view_source, remainder) = match raw.strip_prefix(VIEW_SOURCE_PREFIX) {
            Some(rest) => (true, rest),
            None => (false, raw),
        };

        let descriptor = ResourceDescriptor::parse(remainder)?;
        let transport = self.transport_for(descriptor);

        if view_source {
            Ok(Box::new(ViewSource::new(transport)))
        } else {
            Ok(transport)
        }
    }

    pub fn transport_for(&self, descriptor: ResourceDescriptor) -> Box<dyn Transport> {
        match descriptor.scheme() {
            Scheme::Http | Scheme::Https => Box::new(HttpTransport::new(
                descriptor,
                Rc::clone(&self.connector),
            )),
            Scheme::File => Box::new(FileTransport::new(descriptor)),
            Scheme::Data => Box::new(DataTransport::new(descriptor)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::Resolver;
    use crate::replay::ReplayConnector;
    use ig_core::codes;

    fn resolver(replay: &ReplayConnector) -> Resolver {
        Resolver::with_connector(replay.clone())
    }

    #[test]
    fn resolves_each_scheme() {
        let resolver = resolver(&ReplayConnector::new());
        let cases = [
            ("http://example.org/a", "http", "example.org", "/a"),
            ("https://example.org", "https", "example.org", "/"),
            ("file:///tmp/page.html", "file", "", "/tmp/page.html"),
            ("data:text/plain,hi", "data", "", "hi"),
            ("view-source:https://example.org/", "view-source:https", "example.org", "/"),
        ];

        for (raw, protocol, host, path) in cases {
            let transport = match resolver.resolve(raw) {
                Ok(value) => value,
                Err(error) => panic!("{raw}: {error}"),
            };
            assert_eq!(transport.protocol(), protocol);
            assert_eq!(transport.host(), host);
            assert_eq!(transport.path(), path);
        }
    }

    #[test]
    fn rejects_unknown_schemes() {
        let resolver = resolver(&ReplayConnector::new());
        for raw in ["gopher://example.org/", "view-source:ftp://example.org/", "mailto:a@b"] {
            let result = resolver.resolve(raw);
            assert!(result.is_err());
            if let Err(error) = result {
                assert_eq!(error.code, codes::INVALID_PROTOCOL);
            }
        }
    }

    #[test]
    fn data_request_does_no_io() {
        let replay = ReplayConnector::new();
        let mut transport = match resolver(&replay).resolve("data:text/html,Hello, World!") {
            Ok(value) => value,
            Err(error) => panic!("{error}"),
        };
        assert_eq!(transport.request(), Ok("Hello, World!".to_owned()));
        assert!(replay.exchanges().is_empty());
    }

    #[test]
    fn view_source_escapes_network_body() {
        let replay = ReplayConnector::new().with_response("HTTP/1.1 200 OK\r\n\r\n<h1>Title</h1>");
        let mut transport = match resolver(&replay).resolve("view-source:http://example.org/") {
            Ok(value) => value,
            Err(error) => panic!("{error}"),
        };
        assert_eq!(
            transport.request(),
            Ok("&lt;h1&gt;Title&lt;/h1&gt;".to_owned())
        );
        assert_eq!(transport.status_code(), "200");
    }
}
