//! One-shot clock event state machine.
//!
//! ```text
//!              set_next_event                match irq
//!  Shutdown ─────────────────► Armed ─────────────────► Fired
//!     ▲  │                      ▲ │ ▲                    │
//!     │  └─ resume (if it was   │ │ └── set_next_event ──┘
//!     │     running) ───────────┘ │
//!     └──────── shutdown ─────────┘ (from any state)
//! ```
//!
//! [`CounterHandle`] is what the tick framework and the interrupt layer
//! hold for a counter. It carries the owning block, so no lookup from a
//! framework object back to the counter is needed.

use alloc::sync::Arc;

use super::verify::{Verify, WriteStatus};
use super::{BlockState, CounterId, TimerBlock, TimerError, TimerId, regs};
use crate::hal::mmio::{Delay, RegisterIo};
use crate::hal::timer::ClockEventDevice;
use common::sync::IrqControl;

/// Event state of a counter.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum EventState {
    /// Stopped by the framework, or never armed.
    Shutdown,
    /// Counting towards a programmed deadline.
    Armed,
    /// Deadline reached, or stopped; counter disabled.
    Fired,
}

/// Counter whose deadline expired.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct EventSource {
    pub timer: TimerId,
    pub counter: CounterId,
}

/// Event delivery callback.
///
/// Runs in interrupt context with the block lock released, so it may
/// program the next deadline on the same counter.
pub type EventHandler = fn(EventSource);

impl<B: RegisterIo + Delay, I: IrqControl + 'static> BlockState<B, I> {
    pub(super) fn set_next_event(&mut self, cid: CounterId, delta: u32) -> Result<(), TimerError> {
        let n = cid.index();
        let timeout = delta.wrapping_sub(1);
        let mut status = WriteStatus::default();

        if self.counter_running(cid) {
            status.record(self.counter_disable(cid));
        }

        status.record(self.write_verified(
            regs::tn_mm(n, 0),
            timeout,
            u32::MAX,
            Verify::ExpectSet,
            None,
        ));

        status.record(self.write_verified(
            regs::ier(n),
            regs::MATCH0,
            regs::MATCH0,
            Verify::ExpectSet,
            None,
        ));

        status.record(self.counter_enable(cid));

        self.counter_mut(cid).timeout = timeout;
        status.finish()
    }

    pub(super) fn shutdown(&mut self, cid: CounterId) -> Result<(), TimerError> {
        let was_running = self.counter(cid).state == EventState::Armed;
        self.counter_mut(cid).resume_enabled = was_running;

        let result = self.counter_disable(cid);
        self.counter_mut(cid).state = EventState::Shutdown;
        result
    }

    pub(super) fn resume(&mut self, cid: CounterId) -> Result<(), TimerError> {
        if self.counter(cid).resume_enabled {
            self.counter_enable(cid)
        } else {
            Ok(())
        }
    }
}

impl<B: RegisterIo + Delay, I: IrqControl + 'static> TimerBlock<B, I> {
    /// Fire counter `cid` once, `delta` ticks from now.
    ///
    /// `delta` must be within [`super::MIN_DELTA`]..=[`super::MAX_DELTA`];
    /// this is not checked here.
    pub fn set_next_event(&self, cid: CounterId, delta: u32) -> Result<(), TimerError> {
        self.state.lock().set_next_event(cid, delta)
    }

    /// Stop counter `cid`, remembering whether it was running.
    pub fn shutdown(&self, cid: CounterId) -> Result<(), TimerError> {
        self.state.lock().shutdown(cid)
    }

    /// Restart counter `cid` if it was running at the last shutdown.
    ///
    /// The deadline is not reprogrammed.
    pub fn resume(&self, cid: CounterId) -> Result<(), TimerError> {
        self.state.lock().resume(cid)
    }

    /// Last programmed match value of counter `cid` (`delta - 1`).
    pub fn timeout(&self, cid: CounterId) -> u32 {
        self.state.lock().counter(cid).timeout
    }
}

/// A counter set up as a clock event device.
pub struct CounterHandle<B, I: IrqControl + 'static> {
    block: Arc<TimerBlock<B, I>>,
    counter: CounterId,
}

impl<B, I: IrqControl + 'static> CounterHandle<B, I> {
    pub(super) fn new(block: Arc<TimerBlock<B, I>>, counter: CounterId) -> Self {
        Self { block, counter }
    }

    pub fn block(&self) -> &Arc<TimerBlock<B, I>> {
        &self.block
    }

    pub fn counter(&self) -> CounterId {
        self.counter
    }

    pub fn source(&self) -> EventSource {
        EventSource {
            timer: self.block.id(),
            counter: self.counter,
        }
    }

    pub fn state(&self) -> EventState {
        self.block.event_state(self.counter)
    }
}

impl<B, I: IrqControl + 'static> Clone for CounterHandle<B, I> {
    fn clone(&self) -> Self {
        Self {
            block: Arc::clone(&self.block),
            counter: self.counter,
        }
    }
}

impl<B: RegisterIo + Delay, I: IrqControl + 'static> ClockEventDevice for CounterHandle<B, I> {
    type Error = TimerError;

    fn set_next_event(&self, delta: u32) -> Result<(), Self::Error> {
        self.block.set_next_event(self.counter, delta)
    }

    fn set_state_shutdown(&self) -> Result<(), Self::Error> {
        self.block.shutdown(self.counter)
    }

    fn tick_resume(&self) -> Result<(), Self::Error> {
        self.block.resume(self.counter)
    }
}
