//! Registry of brought-up timer blocks.
//!
//! Owned by whoever initializes the timers and passed to bring-up by
//! reference. There is at most one block per physical timer id.

use alloc::sync::Arc;

use super::verify::{WRITE_FAILURES, WriteFailureLog};
use super::{HwInfo, MAX_TIMERS, TimerBlock, TimerError, TimerId};
use crate::hal::mmio::{Delay, RegisterIo};
use common::arch::LocalIrq;
use common::sync::IrqControl;

pub struct TimerRegistry<B, I: IrqControl + 'static> {
    blocks: [Option<Arc<TimerBlock<B, I>>>; MAX_TIMERS],
    failures: &'static WriteFailureLog<I>,
}

impl<B> TimerRegistry<B, LocalIrq> {
    /// Create an empty registry whose blocks log to [`WRITE_FAILURES`].
    pub fn new() -> Self {
        Self::with_failure_log(&WRITE_FAILURES)
    }
}

impl<B, I: IrqControl + 'static> TimerRegistry<B, I> {
    /// Create an empty registry whose blocks log to `failures`.
    pub const fn with_failure_log(failures: &'static WriteFailureLog<I>) -> Self {
        Self {
            blocks: [const { None }; MAX_TIMERS],
            failures,
        }
    }

    /// Failure log handed to blocks brought up through this registry.
    pub fn failure_log(&self) -> &'static WriteFailureLog<I> {
        self.failures
    }

    pub fn register(&mut self, block: Arc<TimerBlock<B, I>>) -> Result<(), TimerError> {
        let id = block.id();
        let slot = self
            .blocks
            .get_mut(id)
            .ok_or(TimerError::InvalidTimerId(id))?;

        if slot.is_some() {
            return Err(TimerError::DuplicateTimer(id));
        }

        *slot = Some(block);
        Ok(())
    }

    pub fn get(&self, id: TimerId) -> Option<&Arc<TimerBlock<B, I>>> {
        self.blocks.get(id)?.as_ref()
    }

    pub fn contains(&self, id: TimerId) -> bool {
        self.get(id).is_some()
    }

    /// Registered blocks in id order.
    pub fn iter(&self) -> impl Iterator<Item = &Arc<TimerBlock<B, I>>> {
        self.blocks.iter().flatten()
    }
}

impl<B: RegisterIo + Delay, I: IrqControl + 'static> TimerRegistry<B, I> {
    /// Dump the primary counter of block `id`.
    pub fn dump_hwinfo(&self, id: TimerId) -> Option<HwInfo> {
        self.get(id)?.dump_hwinfo()
    }
}

impl<B> Default for TimerRegistry<B, LocalIrq> {
    fn default() -> Self {
        Self::new()
    }
}
