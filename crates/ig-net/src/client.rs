//! HTTP and HTTPS transport.

use crate::http::Headers;
use crate::http::body_text;
use crate::http::decode_body;
use crate::http::negotiate_encoding;
use crate::http::parse_response;
use crate::http::read_until_close;
use crate::http::write_request;
use crate::transport::Connector;
use crate::transport::Endpoint;
use crate::transport::Transport;
use crate::url::ResourceDescriptor;
use ig_core::BrowserResult;
use std::rc::Rc;

/// Issues one `GET` over a fresh connection and reads until the peer closes.
pub struct HttpTransport {
    descriptor: ResourceDescriptor,
    connector: Rc<dyn Connector>,
    status_code: String,
    request_headers: Headers,
    response_headers: Headers,
}

impl HttpTransport {
    pub fn new(descriptor: ResourceDescriptor, connector: Rc<dyn Connector>) -> Self {
        Self {
            descriptor,
            connector,
            status_code: String::new(),
            request_headers: Headers::new(),
            response_headers: Headers::new(),
        }
    }
}

impl Transport for HttpTransport {
    fn request(&mut self) -> BrowserResult<String> {
        let endpoint = Endpoint::for_descriptor(&self.descriptor);
        let raw = {
            let mut stream = self.connector.connect(&endpoint)?;
            log::debug!(
                "GET {}://{}{}",
                self.descriptor.scheme().as_str(),
                self.descriptor.authority(),
                self.descriptor.path()
            );
            write_request(
                &mut *stream,
                self.descriptor.path(),
                self.descriptor.host(),
                &self.request_headers,
            )?;
            read_until_close(&mut *stream)?
        };

        let response = parse_response(&raw)?;
        log::debug!(
            "{} {} {}",
            response.version,
            response.status_code,
            response.reason
        );
        self.status_code = response.status_code;
        self.response_headers = response.headers;

        let body = match negotiate_encoding(&self.request_headers, &self.response_headers)? {
            Some(encoding) => decode_body(&encoding, &response.body)?,
            None => response.body,
        };

        Ok(body_text(body))
    }

    fn status_code(&self) -> &str {
        &self.status_code
    }

    fn response_headers(&self) -> &Headers {
        &self.response_headers
    }

    fn request_headers(&self) -> &Headers {
        &self.request_headers
    }

    fn set_request_headers(&mut self, headers: Headers) {
        self.request_headers = headers;
    }

    fn set_header(&mut self, name: &str, value: &str) -> BrowserResult<()> {
        self.request_headers.insert(name, value)
    }

    fn descriptor(&self) -> &ResourceDescriptor {
        &self.descriptor
    }
}

#[cfg(test)]
mod tests {
    use super::HttpTransport;
    use crate::replay::ReplayConnector;
    use crate::transport::Transport;
    use crate::url::ResourceDescriptor;
    use flate2::Compression;
    use flate2::write::GzEncoder;
    use ig_core::codes;
    use std::io::Write;
    use std::rc::Rc;

    fn transport(raw: &str, replay: &ReplayConnector) -> HttpTransport {
        let descriptor = match ResourceDescriptor::parse(raw) {
            Ok(value) => value,
            Err(error) => panic!("{error}"),
        };
        HttpTransport::new(descriptor, Rc::new(replay.clone()))
    }

    fn gzip(data: &[u8]) -> Vec<u8> {
        let mut encoded = Vec::new();
        {
            let mut encoder = GzEncoder::new(&mut encoded, Compression::default());
            let wrote = encoder.write_all(data);
            assert!(wrote.is_ok());
            let finish = encoder.finish();
            assert!(finish.is_ok());
        }
        encoded
    }

    #[test]
    fn request_records_status_headers_and_body() {
        let replay = ReplayConnector::new();
        replay.push_response(
            "HTTP/1.1 200 OK\r\nContent-Type: text/html\r\nCache-Control: max-age=60\r\n\r\n<b>hi</b>",
        );

        let mut http = transport("http://example.org/index.html", &replay);
        assert_eq!(http.status_code(), "");

        let body = http.request();
        assert_eq!(body, Ok("<b>hi</b>".to_owned()));
        assert_eq!(http.status_code(), "200");
        assert_eq!(http.response_headers().get("cache-control"), Some("max-age=60"));

        let exchanges = replay.exchanges();
        assert_eq!(exchanges.len(), 1);
        assert_eq!(exchanges[0].endpoint.host, "example.org");
        assert_eq!(exchanges[0].endpoint.port, "80");
        assert!(!exchanges[0].endpoint.secure);
        assert_eq!(
            exchanges[0].request_text(),
            "GET /index.html HTTP/1.1\r\nConnection: close\r\nHost: example.org\r\nUser-Agent: Ignis/SimpleBrowser\r\n\r\n"
        );
    }

    #[test]
    fn https_dials_secure_endpoint() {
        let replay = ReplayConnector::new();
        replay.push_response("HTTP/1.1 200 OK\r\n\r\nsecure");

        let mut https = transport("https://example.org", &replay);
        assert_eq!(https.request(), Ok("secure".to_owned()));

        let exchanges = replay.exchanges();
        assert!(exchanges[0].endpoint.secure);
        assert_eq!(exchanges[0].endpoint.port, "443");
        assert!(exchanges[0].request_text().starts_with("GET / HTTP/1.1\r\n"));
    }

    #[test]
    fn caller_headers_are_sent_first() {
        let replay = ReplayConnector::new();
        replay.push_response("HTTP/1.1 200 OK\r\n\r\n");

        let mut http = transport("http://example.org/", &replay);
        assert!(http.set_header("Accept-Encoding", "gzip").is_ok());
        assert!(http.request().is_ok());

        assert_eq!(
            replay.exchanges()[0].request_text(),
            "GET / HTTP/1.1\r\naccept-encoding: gzip\r\nConnection: close\r\nHost: example.org\r\nUser-Agent: Ignis/SimpleBrowser\r\n\r\n"
        );
    }

    #[test]
    fn gzip_body_needs_accept_encoding() {
        let mut response = b"HTTP/1.1 200 OK\r\nContent-Encoding: gzip\r\n\r\n".to_vec();
        response.extend_from_slice(&gzip(b"<p>compressed</p>"));

        let replay = ReplayConnector::new();
        replay.push_response(response.clone());
        let mut refused = transport("http://example.org/", &replay);
        let result = refused.request();
        assert!(result.is_err());
        if let Err(error) = result {
            assert_eq!(error.code, codes::UNSUPPORTED_ENCODING);
        }

        replay.push_response(response);
        let mut accepted = transport("http://example.org/", &replay);
        assert!(accepted.set_header("Accept-Encoding", "gzip").is_ok());
        assert_eq!(accepted.request(), Ok("<p>compressed</p>".to_owned()));
    }

    #[test]
    fn malformed_status_line_fails() {
        let replay = ReplayConnector::new();
        replay.push_response("HTTP/1.1\r\n\r\n");

        let result = transport("http://example.org/", &replay).request();
        assert!(result.is_err());
        if let Err(error) = result {
            assert_eq!(error.code, codes::MALFORMED_RESPONSE);
        }
    }

    #[test]
    fn connector_errors_propagate() {
        let replay = ReplayConnector::new();
        let result = transport("http://example.org/", &replay).request();
        assert!(result.is_err());
        if let Err(error) = result {
            assert_eq!(error.code, codes::REPLAY_EXHAUSTED);
        }
    }
}
