//! `view-source:` decorator.

use crate::http::Headers;
use crate::transport::Transport;
use crate::url::ResourceDescriptor;
use ig_core::BrowserResult;

pub const VIEW_SOURCE_PREFIX: &str = "view-source:";

/// Wraps another transport and escapes its markup so it displays literally.
///
/// Always reports status `200` and no response headers, so the loader treats
/// the result as terminal: never redirected, never cached.
pub struct ViewSource<T: Transport> {
    inner: T,
    response_headers: Headers,
}

impl<T: Transport> ViewSource<T> {
    pub fn new(inner: T) -> Self {
        Self {
            inner,
            response_headers: Headers::new(),
        }
    }
}

impl<T: Transport> Transport for ViewSource<T> {
    fn request(&mut self) -> BrowserResult<String> {
        let body = self.inner.request()?;
        Ok(escape_markup(&body))
    }

    fn status_code(&self) -> &str {
        "200"
    }

    fn response_headers(&self) -> &Headers {
        &self.response_headers
    }

    fn request_headers(&self) -> &Headers {
        self.inner.request_headers()
    }

    fn set_request_headers(&mut self, headers: Headers) {
        self.inner.set_request_headers(headers);
    }

    fn set_header(&mut self, name: &str, value: &str) -> BrowserResult<()> {
        self.inner.set_header(name, value)
    }

    fn descriptor(&self) -> &ResourceDescriptor {
        self.inner.descriptor()
    }

    fn protocol(&self) -> String {
        format!("{VIEW_SOURCE_PREFIX}{}", self.inner.protocol())
    }
}

/// Replaces `<` with `&lt;` and `>` with `&gt;`.
pub fn escape_markup(body: &str) -> String {
    body.replace('<', "&lt;").replace('>', "&gt;")
}
