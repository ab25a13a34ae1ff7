//! Transports that never touch the network: `file` and `data`.

use crate::http::Headers;
use crate::http::body_text;
use crate::transport::Transport;
use crate::url::ResourceDescriptor;
use ig_core::BrowserError;
use ig_core::BrowserResult;
use ig_core::codes;
use std::fs;

/// Status reported by local transports once they have produced a body.
const LOCAL_OK: &str = "200";

/// Reads `path` from the local filesystem.
#[derive(Debug, Clone)]
pub struct FileTransport {
    descriptor: ResourceDescriptor,
    status_code: &'static str,
    request_headers: Headers,
    response_headers: Headers,
}

impl FileTransport {
    pub fn new(descriptor: ResourceDescriptor) -> Self {
        Self {
            descriptor,
            status_code: "",
            request_headers: Headers::new(),
            response_headers: Headers::new(),
        }
    }
}

impl Transport for FileTransport {
    fn request(&mut self) -> BrowserResult<String> {
        let path = self.descriptor.path();
        let bytes = fs::read(path).map_err(|error| {
            BrowserError::io(
                codes::FILE_READ_FAILED,
                format!("failed to read `{path}`"),
                &error,
            )
        })?;
        self.status_code = LOCAL_OK;
        Ok(body_text(bytes))
    }

    fn status_code(&self) -> &str {
        self.status_code
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

/// Returns the literal payload of a `data:` identifier.
#[derive(Debug, Clone)]
pub struct DataTransport {
    descriptor: ResourceDescriptor,
    status_code: &'static str,
    request_headers: Headers,
    response_headers: Headers,
}

impl DataTransport {
    pub fn new(descriptor: ResourceDescriptor) -> Self {
        Self {
            descriptor,
            status_code: "",
            request_headers: Headers::new(),
            response_headers: Headers::new(),
        }
    }
}

impl Transport for DataTransport {
    fn request(&mut self) -> BrowserResult<String> {
        self.status_code = LOCAL_OK;
        Ok(self.descriptor.path().to_owned())
    }

    fn status_code(&self) -> &str {
        self.status_code
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
