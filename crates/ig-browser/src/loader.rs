//! Redirect and cache policy around transport requests.

use ig_core::BrowserError;
use ig_core::BrowserResult;
use ig_core::codes;
use ig_html::DisplayText;
use ig_html::TextLexer;
use ig_net::Resolver;
use ig_net::Transport;
use ig_storage::ResponseCache;
use ig_storage::parse_max_age;

/// The only status the loader follows.
pub const MOVED_PERMANENTLY: &str = "301";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LoaderConfig {
    /// Requests allowed per load, redirects included.
    pub max_hops: usize,
}

impl Default for LoaderConfig {
    fn default() -> Self {
        Self { max_hops: 10 }
    }
}

impl LoaderConfig {
    pub fn with_max_hops(mut self, max_hops: usize) -> Self {
        self.max_hops = max_hops;
        self
    }
}

/// Drives one transport chain to display text.
#[derive(Clone)]
pub struct Loader {
    resolver: Resolver,
    lexer: TextLexer,
    config: LoaderConfig,
}

impl Loader {
    pub fn new(resolver: Resolver) -> Self {
        Self {
            resolver,
            lexer: TextLexer,
            config: LoaderConfig::default(),
        }
    }

    pub fn with_config(mut self, config: LoaderConfig) -> Self {
        self.config = config;
        self
    }

    pub fn config(&self) -> &LoaderConfig {
        &self.config
    }

    pub fn resolver(&self) -> &Resolver {
        &self.resolver
    }

    /// Requests `transport`, following `301`s through fresh transports.
    ///
    /// Request headers carry over to every hop. A terminal response with a
    /// cacheable `cache-control` is recorded in `cache` before lexing. Nothing
    /// is read back from `cache`.
    pub fn load(
        &self,
        transport: Box<dyn Transport>,
        cache: &mut ResponseCache,
    ) -> BrowserResult<DisplayText> {
        let origin = transport.protocol();
        let mut current = transport;

        for hop in 0..self.config.max_hops {
            let body = current.request()?;

            if current.status_code() == MOVED_PERMANENTLY {
                if hop + 1 == self.config.max_hops {
                    break;
                }

                let target = redirect_target(current.as_ref())?;
                log::debug!("hop {}: redirected to {target}", hop + 1);

                let mut next = self.resolve_redirect(&target)?;
                next.set_request_headers(current.request_headers().clone());
                current = next;
                continue;
            }

            store_if_cacheable(current.as_ref(), &body, cache)?;
            return Ok(self.lexer.lex(&body));
        }

        Err(BrowserError::new(
            codes::TOO_MANY_REDIRECTS,
            format!(
                "{origin} load did not settle within {} requests",
                self.config.max_hops
            ),
        ))
    }

    /// Redirects may only lead to plain `http`/`https` resources.
    fn resolve_redirect(&self, target: &str) -> BrowserResult<Box<dyn Transport>> {
        let next = self.resolver.resolve(target)?;
        let scheme = next.descriptor().scheme();
        if !scheme.is_network() || next.protocol() != scheme.as_str() {
            return Err(BrowserError::new(
                codes::REDIRECT_SCHEME_INVALID,
                format!("refusing to follow redirect to `{target}`"),
            ));
        }
        Ok(next)
    }

    pub fn load_url(&self, raw: &str, cache: &mut ResponseCache) -> BrowserResult<DisplayText> {
        let transport = self.resolver.resolve(raw)?;
        self.load(transport, cache)
    }
}

/// Absolute target of a redirect; a `/`-rooted location stays on the current origin.
fn redirect_target(transport: &dyn Transport) -> BrowserResult<String> {
    let location = transport
        .response_headers()
        .get("location")
        .map(str::trim)
        .filter(|location| !location.is_empty())
        .ok_or_else(|| {
            BrowserError::new(
                codes::MISSING_LOCATION,
                format!(
                    "{MOVED_PERMANENTLY} from {}{} has no location",
                    transport.descriptor().authority(),
                    transport.path()
                ),
            )
        })?;

    if location.starts_with('/') {
        Ok(format!(
            "{}://{}{location}",
            transport.protocol(),
            transport.descriptor().authority()
        ))
    } else {
        Ok(location.to_owned())
    }
}

fn store_if_cacheable(
    transport: &dyn Transport,
    body: &str,
    cache: &mut ResponseCache,
) -> BrowserResult<()> {
    let Some(cache_control) = transport.response_headers().get("cache-control") else {
        return Ok(());
    };

    if let Some(max_age) = parse_max_age(cache_control)? {
        cache.set(transport.host(), transport.path(), body, max_age);
    }
    Ok(())
}
