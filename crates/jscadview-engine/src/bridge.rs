//! Asynchronous message channel to the rendering surface
//!
//! The bridge owns the transport of one surface. Outbound messages are
//! encoded and queued without blocking; inbound messages are pumped by a
//! background task that decodes each one and hands it to the registered
//! handler. Both directions keep FIFO order.

use jscadview_core::protocol::{HostMessage, InboundDecoder, ProtocolError, SurfaceMessage};
use parking_lot::Mutex;
use thiserror::Error;
use tokio::runtime::Handle;
use tokio::sync::mpsc::{UnboundedReceiver, UnboundedSender};
use tokio::task::JoinHandle;

/// Errors raised when sending to the surface
#[derive(Error, Debug)]
pub enum BridgeError {
    /// The message could not be encoded
    #[error(transparent)]
    Protocol(#[from] ProtocolError),

    /// The surface side of the channel is gone
    #[error("Preview surface is no longer connected")]
    Closed,
}

/// Something the surface did, as seen by the inbound handler
#[derive(Debug)]
pub enum BridgeEvent {
    /// A well-formed message with a registered command
    Message(SurfaceMessage),
    /// A message that broke the protocol (unknown command, bad payload)
    Violation(ProtocolError),
    /// The surface closed its end of the channel
    Closed,
}

/// Typed channel to one rendering surface
pub struct SurfaceBridge {
    outbound: UnboundedSender<String>,
    decoder: InboundDecoder,
    pump: Mutex<Option<JoinHandle<()>>>,
}

impl SurfaceBridge {
    /// Create a bridge over the outbound half of a surface connection
    pub fn new(outbound: UnboundedSender<String>, decoder: InboundDecoder) -> Self {
        Self {
            outbound,
            decoder,
            pump: Mutex::new(None),
        }
    }

    /// Queue a message for the surface; never waits for delivery
    pub fn send(&self, message: &HostMessage) -> Result<(), BridgeError> {
        let encoded = message.encode()?;
        tracing::debug!("-> surface: {}", message.command());
        self.outbound.send(encoded).map_err(|_| BridgeError::Closed)
    }

    /// Start delivering inbound messages to `handler`
    ///
    /// The handler runs on `runtime` for every message in arrival order and
    /// receives a final [`BridgeEvent::Closed`] when the surface hangs up.
    /// Calling this again replaces the previous listener.
    pub fn listen<H>(&self, runtime: &Handle, mut inbound: UnboundedReceiver<String>, mut handler: H)
    where
        H: FnMut(BridgeEvent) + Send + 'static,
    {
        let decoder = self.decoder.clone();
        let task = runtime.spawn(async move {
            while let Some(raw) = inbound.recv().await {
                let event = match decoder.decode(&raw) {
                    Ok(message) => {
                        tracing::debug!("<- surface: {}", message.command());
                        BridgeEvent::Message(message)
                    }
                    Err(e) => BridgeEvent::Violation(e),
                };
                handler(event);
            }
            handler(BridgeEvent::Closed);
        });

        if let Some(previous) = self.pump.lock().replace(task) {
            previous.abort();
        }
    }

    /// Stop delivering inbound messages
    pub fn close(&self) {
        if let Some(task) = self.pump.lock().take() {
            task.abort();
        }
    }

    /// Whether the surface side still accepts messages
    pub fn is_connected(&self) -> bool {
        !self.outbound.is_closed()
    }
}

impl Drop for SurfaceBridge {
    fn drop(&mut self) {
        self.close();
    }
}
