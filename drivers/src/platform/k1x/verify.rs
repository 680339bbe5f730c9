//! Verified register writes.
//!
//! A write to the timer block may be silently dropped by the hardware. A
//! verified write reads the register back and compares it under a mask,
//! polling a few times before writing again:
//!
//! ```text
//! attempt ─► write ─► [resync clock] ─► read ─┬─ match ──────────► done
//!    ▲                                        └─ mismatch: wait 30us, re-read (x3)
//!    └──────────── log failure ◄──────────────── still mismatched
//! ```
//!
//! Each exhausted attempt is appended to a [`WriteFailureLog`]. After
//! [`WRITE_ATTEMPTS`] attempts the write is reported as
//! [`TimerError::HardwareWedged`].

use alloc::vec::Vec;

use super::{BlockState, CounterId, TimerError};
use crate::hal::mmio::{Delay, RegisterIo};
use common::arch::LocalIrq;
use common::sync::{IrqControl, IrqSpinLock};

/// Read-backs after the first one before an attempt is given up.
pub const VERIFY_READS: u32 = 3;
/// Write attempts before a register is considered wedged.
pub const WRITE_ATTEMPTS: u32 = 100;
/// Wait between read-backs. Shorter polling worsens bus contention.
pub const POLL_DELAY_US: u32 = 30;

/// Number of failures kept by a [`WriteFailureLog`].
pub const WRITE_FAILURE_SLOTS: usize = 10;

/// How a read-back confirms a write.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Verify {
    /// The masked register reads back as the written value.
    ExpectSet,
    /// The masked register reads back as zero.
    ///
    /// For write-1-to-clear registers.
    ExpectCleared,
}

impl Verify {
    /// Value the register must read back as.
    pub fn expected(self, value: u32) -> u32 {
        match self {
            Verify::ExpectSet => value,
            Verify::ExpectCleared => 0,
        }
    }
}

/// One failed verification attempt.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct WriteFailure {
    /// Register offset.
    pub reg: usize,
    pub expected: u32,
    pub observed: u32,
    pub mask: u32,
}

impl WriteFailure {
    const EMPTY: Self = Self {
        reg: 0,
        expected: 0,
        observed: 0,
        mask: 0,
    };
}

struct Ring {
    entries: [WriteFailure; WRITE_FAILURE_SLOTS],
    next: usize,
    total: u64,
}

/// Circular record of the most recent write failures.
///
/// Only read for diagnosis. Appended from any block, so it carries its own
/// lock rather than relying on a block lock. The lock masks local
/// interrupts like a block lock does, since the match interrupt handler
/// appends to it.
pub struct WriteFailureLog<I: IrqControl = LocalIrq> {
    ring: IrqSpinLock<Ring, I>,
}

/// Failure log used by blocks unless their registry was given another.
pub static WRITE_FAILURES: WriteFailureLog = WriteFailureLog::new();

impl<I: IrqControl + 'static> WriteFailureLog<I> {
    pub const fn new() -> Self {
        Self {
            ring: IrqSpinLock::new(Ring {
                entries: [WriteFailure::EMPTY; WRITE_FAILURE_SLOTS],
                next: 0,
                total: 0,
            }),
        }
    }

    /// Append a failure, overwriting the oldest once full.
    pub fn record(&self, failure: WriteFailure) {
        let mut ring = self.ring.lock();
        let slot = ring.next;
        ring.entries[slot] = failure;
        ring.next = (slot + 1) % WRITE_FAILURE_SLOTS;
        ring.total += 1;
        drop(ring);

        log::warn!(
            "timer write fail: register = 0x{:x}: (0x{:x}, 0x{:x}, 0x{:x})",
            failure.reg,
            failure.expected,
            failure.observed,
            failure.mask
        );
    }

    /// Failures recorded since creation, including overwritten ones.
    pub fn total(&self) -> u64 {
        self.ring.lock().total
    }

    /// Retained failures, oldest first.
    pub fn snapshot(&self) -> Vec<WriteFailure> {
        let ring = self.ring.lock();
        let kept = ring.total.min(WRITE_FAILURE_SLOTS as u64) as usize;
        let start = (ring.next + WRITE_FAILURE_SLOTS - kept) % WRITE_FAILURE_SLOTS;
        (0..kept)
            .map(|i| ring.entries[(start + i) % WRITE_FAILURE_SLOTS])
            .collect()
    }
}

impl<I: IrqControl + 'static> Default for WriteFailureLog<I> {
    fn default() -> Self {
        Self::new()
    }
}

/// Result of a sequence of verified writes.
///
/// A wedged register does not stop the sequence: the remaining writes are
/// still issued and the first wedge is reported at the end.
#[derive(Debug, Default)]
#[must_use]
pub(super) struct WriteStatus(Option<TimerError>);

impl WriteStatus {
    pub(super) fn record(&mut self, result: Result<(), TimerError>) {
        if let Err(e) = result {
            self.0.get_or_insert(e);
        }
    }

    pub(super) fn finish(self) -> Result<(), TimerError> {
        match self.0 {
            Some(e) => Err(e),
            None => Ok(()),
        }
    }
}

impl<B: RegisterIo + Delay, I: IrqControl + 'static> BlockState<B, I> {
    /// Write `value` to `reg` and make sure it took effect under `mask`.
    ///
    /// With `resync` set, the counter's clock domain is switched back to the
    /// fast clock after every write. Some writes, disabling a counter on the
    /// 32 kHz clock in particular, only latch across a clock transition.
    pub(super) fn write_verified(
        &mut self,
        reg: usize,
        value: u32,
        mask: u32,
        verify: Verify,
        resync: Option<CounterId>,
    ) -> Result<(), TimerError> {
        let expected = verify.expected(value);

        for _ in 0..WRITE_ATTEMPTS {
            self.bus.write(reg, value);

            if let Some(cid) = resync {
                let fast_hz = self.fast_hz;
                if let Err(e) = self.switch_clock(cid, fast_hz) {
                    log::warn!("Counter {}: cannot resync to fast clock: {}", cid.index(), e);
                }
            }

            let mut observed = self.bus.read(reg);
            for _ in 0..VERIFY_READS {
                if observed & mask == expected & mask {
                    break;
                }
                self.bus.delay_us(POLL_DELAY_US);
                observed = self.bus.read(reg);
            }

            if observed & mask == expected & mask {
                return Ok(());
            }

            self.failures.record(WriteFailure {
                reg,
                expected,
                observed,
                mask,
            });
        }

        log::error!(
            "timer register 0x{:x} wedged after {} attempts",
            reg,
            WRITE_ATTEMPTS
        );
        Err(TimerError::HardwareWedged { reg })
    }
}
