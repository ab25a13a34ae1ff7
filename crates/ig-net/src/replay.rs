//! Offline connector that replays canned responses.
//!
//! Each `connect` consumes the next queued response and records the bytes the
//! transport writes, which makes wire-level behaviour observable without sockets.

use crate::transport::BoxedIoStream;
use crate::transport::Connector;
use crate::transport::Endpoint;
use ig_core::BrowserError;
use ig_core::BrowserResult;
use ig_core::codes;
use std::cell::RefCell;
use std::collections::VecDeque;
use std::io::Cursor;
use std::io::Read;
use std::io::Write;
use std::rc::Rc;

/// One connection served by a [`ReplayConnector`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Exchange {
    pub endpoint: Endpoint,
    pub request: Vec<u8>,
}

impl Exchange {
    pub fn request_text(&self) -> String {
        String::from_utf8_lossy(&self.request).into_owned()
    }
}

/// Cloning shares the queue and the exchange log.
#[derive(Debug, Clone, Default)]
pub struct ReplayConnector {
    responses: Rc<RefCell<VecDeque<Vec<u8>>>>,
    exchanges: Rc<RefCell<Vec<Exchange>>>,
}

impl ReplayConnector {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_response(self, response: impl Into<Vec<u8>>) -> Self {
        self.push_response(response);
        self
    }

    pub fn push_response(&self, response: impl Into<Vec<u8>>) {
        self.responses.borrow_mut().push_back(response.into());
    }

    pub fn remaining(&self) -> usize {
        self.responses.borrow().len()
    }

    pub fn exchanges(&self) -> Vec<Exchange> {
        self.exchanges.borrow().clone()
    }
}

impl Connector for ReplayConnector {
    fn connect(&self, endpoint: &Endpoint) -> BrowserResult<BoxedIoStream> {
        let response = self.responses.borrow_mut().pop_front().ok_or_else(|| {
            BrowserError::new(
                codes::REPLAY_EXHAUSTED,
                format!(
                    "no replay response left for `{}:{}`",
                    endpoint.host, endpoint.port
                ),
            )
        })?;

        let mut exchanges = self.exchanges.borrow_mut();
        exchanges.push(Exchange {
            endpoint: endpoint.clone(),
            request: Vec::new(),
        });

        Ok(Box::new(ReplayStream {
            response: Cursor::new(response),
            exchanges: Rc::clone(&self.exchanges),
            index: exchanges.len() - 1,
        }))
    }
}

struct ReplayStream {
    response: Cursor<Vec<u8>>,
    exchanges: Rc<RefCell<Vec<Exchange>>>,
    index: usize,
}

impl Read for ReplayStream {
    fn read(&mut self, buf: &mut [u8]) -> std::io::Result<usize> {
        self.response.read(buf)
    }
}

impl Write for ReplayStream {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        if let Some(exchange) = self.exchanges.borrow_mut().get_mut(self.index) {
            exchange.request.extend_from_slice(buf);
        }
        Ok(buf.len())
    }

    fn flush(&mut self) -> std::io::Result<()> {
        Ok(())
    }
}
