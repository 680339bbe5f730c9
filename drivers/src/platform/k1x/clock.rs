//! Counter clock domain selection.
//!
//! CCR holds a 2-bit clock select field per counter: 0 selects the block's
//! fast clock, 1 selects the 32.768 kHz clock. The register is shared, so a
//! switch is a read-modify-write that leaves the other fields alone.

use super::verify::Verify;
use super::{BlockState, CLOCK_32KHZ, CounterId, TimerBlock, TimerError, regs};
use crate::hal::mmio::{Delay, RegisterIo};
use common::sync::IrqControl;

/// Clock domain of a counter.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
#[repr(u32)]
pub enum ClockSelect {
    /// The block's fast clock.
    Fast = 0,
    /// The 32.768 kHz low-power clock.
    Slow32k = 1,
}

impl ClockSelect {
    /// Clock domain running at `freq` for a block whose fast clock is `fast_hz`.
    pub fn for_freq(freq: u32, fast_hz: u32) -> Result<Self, TimerError> {
        if freq == fast_hz {
            Ok(ClockSelect::Fast)
        } else if freq == CLOCK_32KHZ {
            Ok(ClockSelect::Slow32k)
        } else {
            Err(TimerError::InvalidFrequency(freq))
        }
    }

    /// Decode a raw CCR field. Values 2 and 3 are reserved.
    pub fn from_field(field: u32) -> Option<Self> {
        match field {
            0 => Some(ClockSelect::Fast),
            1 => Some(ClockSelect::Slow32k),
            _ => None,
        }
    }
}

impl<B: RegisterIo + Delay, I: IrqControl + 'static> BlockState<B, I> {
    pub(super) fn switch_clock(&mut self, cid: CounterId, freq: u32) -> Result<(), TimerError> {
        let n = cid.index();
        let mask = regs::ccr_cs_mask(n);

        let select = ClockSelect::for_freq(freq, self.fast_hz).inspect_err(|_| {
            log::error!("Counter {}: invalid clock rate {}", n, freq);
        })?;

        let ccr = (self.bus.read(regs::CCR) & !mask) | regs::ccr_cs(n, select as u32);

        self.write_verified(regs::CCR, ccr, mask, Verify::ExpectSet, None)
    }

    pub(super) fn clock_select(&mut self, cid: CounterId) -> Option<ClockSelect> {
        let n = cid.index();
        let field = (self.bus.read(regs::CCR) >> regs::ccr_cs_shift(n)) & regs::CCR_CS_WIDTH;
        ClockSelect::from_field(field)
    }
}

impl<B: RegisterIo + Delay, I: IrqControl + 'static> TimerBlock<B, I> {
    /// Run counter `cid` from the clock domain of frequency `freq`.
    ///
    /// `freq` must be the block's fast clock or [`CLOCK_32KHZ`].
    pub fn switch_clock(&self, cid: CounterId, freq: u32) -> Result<(), TimerError> {
        self.state.lock().switch_clock(cid, freq)
    }

    /// Clock domain counter `cid` currently runs from, as read from CCR.
    pub fn clock_select(&self, cid: CounterId) -> Option<ClockSelect> {
        self.state.lock().clock_select(cid)
    }
}
