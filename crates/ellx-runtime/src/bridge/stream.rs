use super::slot::OutputSlot;
use crate::{Error, Result};
use ellx_types::Value;
use futures::FutureExt;
use futures::stream::{FusedStream, Stream, StreamExt};
use std::pin::Pin;
use std::rc::Rc;
use std::task::{Context, Poll};

/// Pull side of a bridge: the component's value, then every later change.
///
/// The first item is the bridge's current value. Each later item is the
/// latest emitted value; if several emissions happen between two pulls only
/// the last one is observed. The stream ends when the bridge is disposed,
/// including while a pull is suspended.
///
/// Dropping the stream releases the bridge's single consumer seat, after
/// which `Bridge::output` can hand out a fresh stream.
pub struct OutputStream {
    slot: Rc<OutputSlot>,
    seen: Option<u64>,
    ended: bool,
}

impl OutputStream {
    pub(crate) fn new(slot: Rc<OutputSlot>) -> Self {
        Self {
            slot,
            seen: None,
            ended: false,
        }
    }

    /// Next value, or `StalledConsumer` once the bridge is gone.
    pub async fn recv(&mut self) -> Result<Value> {
        match self.next().await {
            Some(value) => Ok(value),
            None => Err(Error::StalledConsumer {
                bridge: self.slot.bridge(),
            }),
        }
    }

    /// Poll for the next value without waiting.
    ///
    /// Returns `None` if nothing new is available right now or the stream
    /// has ended.
    pub fn try_next(&mut self) -> Option<Value> {
        self.next().now_or_never().flatten()
    }
}

impl Stream for OutputStream {
    type Item = Value;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        if self.ended {
            return Poll::Ready(None);
        }
        let this = &mut *self;
        let polled = this.slot.poll_value(&mut this.seen, cx);
        if let Poll::Ready(None) = polled {
            this.ended = true;
        }
        polled
    }
}

impl FusedStream for OutputStream {
    fn is_terminated(&self) -> bool {
        self.ended
    }
}

impl Drop for OutputStream {
    fn drop(&mut self) {
        self.slot.detach_consumer();
    }
}

impl std::fmt::Debug for OutputStream {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OutputStream")
            .field("bridge", &self.slot.bridge().short())
            .field("seen", &self.seen)
            .field("ended", &self.ended)
            .finish()
    }
}
