//! SpacemiT K1x Timer Block Driver
//!
//! A K1x timer block has three match counters sharing one register window.
//! Each counter runs from either the block's fast clock or the 32.768 kHz
//! low-power clock, and is used here as a one-shot clock event device.
//!
//! The hardware does not reliably latch register writes, in particular
//! around clock domain changes. Every state-changing write after bring-up
//! goes through [`verify`], which reads the register back and retries
//! until it took effect.
//!
//! # Layers
//!
//! - [`verify`]: verified register writes and the write failure log
//! - [`clock`]: per-counter clock domain selection
//! - [`counter`]: counter enable/disable
//! - [`event`]: the one-shot event state machine and [`CounterHandle`]
//! - [`irq`]: the match interrupt handler
//! - [`init`]: block bring-up and counter setup
//! - [`diag`]: register dumps for fault diagnosis
//! - [`registry`]: one block per physical timer id
//!
//! # Locking
//!
//! Each [`TimerBlock`] owns a single [`IrqSpinLock`]. The register window
//! lives inside it, so nothing can reach the hardware without holding the
//! lock with local interrupts masked. The clock select register is shared,
//! so operations on different counters of one block are serialized too.

pub mod clock;
pub mod counter;
pub mod diag;
pub mod error;
pub mod event;
pub mod init;
pub mod irq;
pub mod registry;
pub mod verify;

mod regs;

#[cfg(test)]
mod sim;

pub use clock::ClockSelect;
pub use diag::HwInfo;
pub use error::TimerError;
pub use event::{CounterHandle, EventHandler, EventSource, EventState};
pub use init::{CounterConfig, TimerConfig, bring_up_block, settle_loop_count, setup_counter};
pub use registry::TimerRegistry;
pub use verify::{Verify, WRITE_FAILURES, WriteFailure, WriteFailureLog};

use crate::hal::interrupt::IrqNumber;
use crate::hal::timer::CpuAffinity;
use common::sync::{IrqControl, IrqSpinLock};

/// Number of timer blocks on the SoC.
pub const MAX_TIMERS: usize = 3;
/// Number of counters in one timer block.
pub const MAX_COUNTERS: usize = 3;

/// Frequency of the low-power clock domain.
pub const CLOCK_32KHZ: u32 = 32_768;

/// Smallest programmable one-shot delta, in ticks.
pub const MIN_DELTA: u32 = 5;
/// Largest programmable one-shot delta, in ticks.
pub const MAX_DELTA: u32 = 0xffff_fffe;

/// Physical timer block index.
pub type TimerId = usize;

/// Index of a counter within its timer block.
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct CounterId(u8);

impl CounterId {
    /// Counter 0, the one reported by block diagnostics.
    pub const PRIMARY: Self = Self(0);

    /// Validate a counter index.
    pub const fn new(index: usize) -> Result<Self, TimerError> {
        if index < MAX_COUNTERS {
            Ok(Self(index as u8))
        } else {
            Err(TimerError::InvalidCounter(index))
        }
    }

    pub const fn index(self) -> usize {
        self.0 as usize
    }

    /// This counter's bit in CER and CMR.
    pub const fn bit(self) -> u32 {
        1 << self.0
    }

    /// Every counter of a block, in index order.
    pub fn all() -> impl Iterator<Item = Self> {
        (0..MAX_COUNTERS as u8).map(Self)
    }
}

/// Software state of one counter slot.
#[derive(Debug, Clone, Copy)]
struct CounterState {
    /// Set up as a clock event device.
    configured: bool,
    /// Working frequency.
    freq: u32,
    irq: IrqNumber,
    affinity: CpuAffinity,
    /// Was running when last shut down.
    resume_enabled: bool,
    /// Last programmed match value (`delta - 1`).
    timeout: u32,
    state: EventState,
    handler: Option<EventHandler>,
}

impl CounterState {
    const fn new(freq: u32) -> Self {
        Self {
            configured: false,
            freq,
            irq: 0,
            affinity: CpuAffinity::Broadcast,
            resume_enabled: false,
            timeout: 0,
            state: EventState::Shutdown,
            handler: None,
        }
    }
}

/// Everything the block lock protects.
struct BlockState<B, I: IrqControl + 'static> {
    bus: B,
    fast_hz: u32,
    failures: &'static WriteFailureLog<I>,
    counters: [CounterState; MAX_COUNTERS],
}

impl<B, I: IrqControl + 'static> BlockState<B, I> {
    fn counter(&self, cid: CounterId) -> &CounterState {
        &self.counters[cid.index()]
    }

    fn counter_mut(&mut self, cid: CounterId) -> &mut CounterState {
        &mut self.counters[cid.index()]
    }
}

/// One K1x timer block.
///
/// Created by [`bring_up_block`] and shared through [`TimerRegistry`] and
/// the [`CounterHandle`]s of its counters.
pub struct TimerBlock<B, I: IrqControl + 'static> {
    id: TimerId,
    base: usize,
    fast_hz: u32,
    working_hz: u32,
    /// Register accesses needed to cover two fast clock cycles.
    loop_delay: u32,
    state: IrqSpinLock<BlockState<B, I>, I>,
}

impl<B, I: IrqControl + 'static> TimerBlock<B, I> {
    fn new(
        config: &TimerConfig,
        bus: B,
        loop_delay: u32,
        failures: &'static WriteFailureLog<I>,
    ) -> Self {
        Self {
            id: config.id,
            base: config.base,
            fast_hz: config.fast_clock_hz,
            working_hz: config.working_hz,
            loop_delay,
            state: IrqSpinLock::new(BlockState {
                bus,
                fast_hz: config.fast_clock_hz,
                failures,
                counters: [CounterState::new(config.working_hz); MAX_COUNTERS],
            }),
        }
    }

    pub fn id(&self) -> TimerId {
        self.id
    }

    /// Physical base address of the register window.
    pub fn base(&self) -> usize {
        self.base
    }

    /// Fast clock frequency in Hz.
    pub fn fast_clock_hz(&self) -> u32 {
        self.fast_hz
    }

    /// Working frequency given to counters at setup, in Hz.
    pub fn working_hz(&self) -> u32 {
        self.working_hz
    }

    /// Settle loop count computed at bring-up.
    pub fn loop_delay(&self) -> u32 {
        self.loop_delay
    }

    /// Current event state of a counter.
    pub fn event_state(&self, cid: CounterId) -> EventState {
        self.state.lock().counter(cid).state
    }

    /// Whether a counter has been set up as a clock event device.
    pub fn is_configured(&self, cid: CounterId) -> bool {
        self.state.lock().counter(cid).configured
    }
}
