//! Scriptable in-memory transport for tests

use std::collections::VecDeque;
use std::fmt;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use bytes::Bytes;

use super::{CardTransport, TransportError};

type Handler = Arc<dyn Fn(&[u8]) -> Result<Bytes, TransportError> + Send + Sync>;

/// Mock transport answering from a response queue or a handler function
///
/// Queued responses are served first, in order. Once the queue is empty the
/// handler (if any) answers; without one the transmit fails with
/// [`TransportError::Transmission`].
#[derive(Clone)]
pub struct MockTransport {
    /// Mock responses to return
    pub responses: VecDeque<Bytes>,
    /// Commands that were sent
    pub commands: Vec<Bytes>,
    /// Whether the transport is connected
    pub connected: bool,
    /// Make every power on fail with this error
    pub power_on_error: Option<TransportError>,
    handler: Option<Handler>,
    power_ons: Arc<AtomicUsize>,
}

impl fmt::Debug for MockTransport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MockTransport")
            .field("responses", &self.responses.len())
            .field("commands", &self.commands.len())
            .field("connected", &self.connected)
            .field("has_handler", &self.handler.is_some())
            .finish()
    }
}

impl MockTransport {
    /// Create a new mock transport with the given responses
    pub fn new(responses: impl IntoIterator<Item = Bytes>) -> Self {
        Self {
            responses: responses.into_iter().collect(),
            commands: Vec::new(),
            connected: true,
            power_on_error: None,
            handler: None,
            power_ons: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// Create a mock transport answering every command through `handler`
    pub fn with_handler<F>(handler: F) -> Self
    where
        F: Fn(&[u8]) -> Result<Bytes, TransportError> + Send + Sync + 'static,
    {
        let mut transport = Self::new([]);
        transport.handler = Some(Arc::new(handler));
        transport
    }

    /// Make every power on fail with `error`
    pub fn failing_power_on(mut self, error: TransportError) -> Self {
        self.power_on_error = Some(error);
        self
    }

    /// Shared counter of power on attempts, readable after the transport moved
    pub fn power_on_counter(&self) -> Arc<AtomicUsize> {
        Arc::clone(&self.power_ons)
    }

    /// Number of power on attempts so far
    pub fn power_on_count(&self) -> usize {
        self.power_ons.load(Ordering::SeqCst)
    }
}

impl CardTransport for MockTransport {
    fn do_transmit_raw(&mut self, command: &[u8]) -> Result<Bytes, TransportError> {
        if !self.connected {
            return Err(TransportError::Connection);
        }

        self.commands.push(Bytes::copy_from_slice(command));

        if let Some(response) = self.responses.pop_front() {
            return Ok(response);
        }

        match &self.handler {
            Some(handler) => handler(command),
            None => Err(TransportError::Transmission),
        }
    }

    fn power_on(&mut self) -> Result<(), TransportError> {
        self.power_ons.fetch_add(1, Ordering::SeqCst);
        if let Some(error) = &self.power_on_error {
            return Err(error.clone());
        }
        self.connected = true;
        Ok(())
    }

    fn is_connected(&self) -> bool {
        self.connected
    }

    fn close(&mut self) {
        self.connected = false;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mock_queue_then_handler() {
        let mut transport = MockTransport::with_handler(|_| Ok(Bytes::from_static(&[0x6A, 0x82])));
        transport.responses.push_back(Bytes::from_static(&[0x90, 0x00]));

        assert_eq!(transport.transmit_raw(&[0x00]).unwrap().as_ref(), &[0x90, 0x00]);
        assert_eq!(transport.transmit_raw(&[0x01]).unwrap().as_ref(), &[0x6A, 0x82]);
        assert_eq!(transport.commands.len(), 2);
    }

    #[test]
    fn test_mock_power_on_counter() {
        let mut transport = MockTransport::new([]).failing_power_on(TransportError::NoCard);
        let counter = transport.power_on_counter();

        assert_eq!(transport.power_on(), Err(TransportError::NoCard));
        assert_eq!(transport.power_on(), Err(TransportError::NoCard));
        assert_eq!(counter.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn test_mock_closed_transport_rejects() {
        let mut transport = MockTransport::new([Bytes::from_static(&[0x90, 0x00])]);
        transport.close();
        assert_eq!(transport.transmit_raw(&[0x00]), Err(TransportError::Connection));
        assert!(transport.commands.is_empty());
    }
}
