use crate::{Error, Result};
use ellx_types::{BridgeId, Value};
use std::cell::RefCell;
use std::task::{Context, Poll, Waker};

struct SlotState {
    current: Value,
    /// Number of emissions so far. Consumers compare against the count they
    /// last yielded to decide whether something new arrived.
    emissions: u64,
    waiter: Option<Waker>,
    consumer_attached: bool,
    closed: bool,
}

/// One-slot rendezvous between the emit handler and the output consumer.
///
/// Holds only the latest value: an emission overwrites `current` and wakes
/// the waiting consumer if there is one. Nothing is queued.
pub(crate) struct OutputSlot {
    bridge: BridgeId,
    state: RefCell<SlotState>,
}

impl OutputSlot {
    pub(crate) fn new(bridge: BridgeId, initial: Value) -> Self {
        Self {
            bridge,
            state: RefCell::new(SlotState {
                current: initial,
                emissions: 0,
                waiter: None,
                consumer_attached: false,
                closed: false,
            }),
        }
    }

    pub(crate) fn bridge(&self) -> BridgeId {
        self.bridge
    }

    pub(crate) fn current(&self) -> Value {
        self.state.borrow().current.clone()
    }

    pub(crate) fn emissions(&self) -> u64 {
        self.state.borrow().emissions
    }

    #[cfg(test)]
    pub(crate) fn has_waiter(&self) -> bool {
        self.state.borrow().waiter.is_some()
    }

    /// Replace the current value without counting it as an emission.
    pub(crate) fn resync(&self, value: Value) {
        self.state.borrow_mut().current = value;
    }

    /// Store `value` as current, then resume the waiting consumer.
    pub(crate) fn emit(&self, value: Value) -> Result<()> {
        let waiter = {
            let mut state = self.state.borrow_mut();
            if state.closed {
                return Err(Error::UseAfterDispose {
                    bridge: self.bridge,
                    operation: "emit",
                });
            }
            state.current = value;
            state.emissions += 1;
            state.waiter.take()
        };
        if let Some(waker) = waiter {
            waker.wake();
        }
        Ok(())
    }

    /// End the sequence. Returns whether a consumer was suspended on it.
    pub(crate) fn close(&self) -> bool {
        let waiter = {
            let mut state = self.state.borrow_mut();
            state.closed = true;
            state.waiter.take()
        };
        match waiter {
            Some(waker) => {
                waker.wake();
                true
            }
            None => false,
        }
    }

    pub(crate) fn attach_consumer(&self) -> Result<()> {
        let mut state = self.state.borrow_mut();
        if state.closed {
            return Err(Error::UseAfterDispose {
                bridge: self.bridge,
                operation: "output",
            });
        }
        if state.consumer_attached {
            return Err(Error::OutputBusy {
                bridge: self.bridge,
            });
        }
        state.consumer_attached = true;
        Ok(())
    }

    pub(crate) fn detach_consumer(&self) {
        let mut state = self.state.borrow_mut();
        state.consumer_attached = false;
        state.waiter = None;
    }

    /// Pull protocol. `seen` is the emission count at the consumer's last
    /// yield, `None` before the first pull.
    pub(crate) fn poll_value(&self, seen: &mut Option<u64>, cx: &mut Context<'_>) -> Poll<Option<Value>> {
        let mut state = self.state.borrow_mut();
        if state.closed {
            return Poll::Ready(None);
        }

        let fresh = match *seen {
            None => true,
            Some(count) => state.emissions > count,
        };
        if fresh {
            *seen = Some(state.emissions);
            return Poll::Ready(Some(state.current.clone()));
        }

        state.waiter = Some(cx.waker().clone());
        Poll::Pending
    }
}
