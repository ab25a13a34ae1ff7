//! Browser core: resolves a URI, loads it and keeps the response cache.

pub mod loader;

use ig_core::BrowserResult;
use ig_html::DisplayText;
use ig_net::NetConfig;
use ig_net::Resolver;
use ig_net::Transport;
use ig_storage::ResponseCache;

pub use loader::Loader;
pub use loader::LoaderConfig;

/// Top-level object the rendering shell drives.
///
/// Owns the cache for as long as the browser lives.
pub struct Browser {
    loader: Loader,
    cache: ResponseCache,
}

impl Browser {
    /// Browser dialing real sockets under `config`.
    pub fn new(config: &NetConfig) -> BrowserResult<Self> {
        Ok(Self::with_resolver(config.resolver()?))
    }

    pub fn with_resolver(resolver: Resolver) -> Self {
        Self {
            loader: Loader::new(resolver),
            cache: ResponseCache::new(),
        }
    }

    pub fn with_loader_config(mut self, config: LoaderConfig) -> Self {
        self.loader = self.loader.with_config(config);
        self
    }

    /// Resolves `raw` without issuing any request, so callers can set headers first.
    pub fn open(&self, raw: &str) -> BrowserResult<Box<dyn Transport>> {
        self.loader.resolver().resolve(raw)
    }

    pub fn load(&mut self, transport: Box<dyn Transport>) -> BrowserResult<DisplayText> {
        self.loader.load(transport, &mut self.cache)
    }

    pub fn navigate(&mut self, raw: &str) -> BrowserResult<DisplayText> {
        let transport = self.open(raw)?;
        self.load(transport)
    }

    pub fn cache(&self) -> &ResponseCache {
        &self.cache
    }

    pub fn cache_mut(&mut self) -> &mut ResponseCache {
        &mut self.cache
    }
}
