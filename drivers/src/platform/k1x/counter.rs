//! Counter enable/disable.
//!
//! A counter on the 32 kHz clock takes several slow clock cycles to stop.
//! Disabling it therefore forces the counter back to the fast clock as part
//! of the verified write, and enabling it switches it back to its working
//! clock first.

use super::verify::{Verify, WriteStatus};
use super::{BlockState, CounterId, EventState, TimerBlock, TimerError, regs};
use crate::hal::mmio::{Delay, RegisterIo};
use common::sync::IrqControl;

impl<B: RegisterIo + Delay, I: IrqControl + 'static> BlockState<B, I> {
    pub(super) fn counter_enable(&mut self, cid: CounterId) -> Result<(), TimerError> {
        let freq = self.counter(cid).freq;
        let mut status = WriteStatus::default();

        if freq != self.fast_hz {
            status.record(self.switch_clock(cid, freq));
        }

        let cer = self.bus.read(regs::CER);
        status.record(self.write_verified(
            regs::CER,
            cer | cid.bit(),
            cid.bit(),
            Verify::ExpectSet,
            None,
        ));

        self.counter_mut(cid).state = EventState::Armed;
        status.finish()
    }

    pub(super) fn counter_disable(&mut self, cid: CounterId) -> Result<(), TimerError> {
        let resync = (self.counter(cid).freq != self.fast_hz).then_some(cid);

        let cer = self.bus.read(regs::CER);
        let result = self.write_verified(
            regs::CER,
            cer & !cid.bit(),
            cid.bit(),
            Verify::ExpectSet,
            resync,
        );

        self.counter_mut(cid).state = EventState::Fired;
        result
    }

    /// Enable bit of the counter as the hardware reports it.
    pub(super) fn counter_running(&mut self, cid: CounterId) -> bool {
        self.bus.read(regs::CER) & cid.bit() != 0
    }
}

impl<B: RegisterIo + Delay, I: IrqControl + 'static> TimerBlock<B, I> {
    /// Start counter `cid` on its working clock.
    pub fn enable(&self, cid: CounterId) -> Result<(), TimerError> {
        self.state.lock().counter_enable(cid)
    }

    /// Stop counter `cid`.
    pub fn disable(&self, cid: CounterId) -> Result<(), TimerError> {
        self.state.lock().counter_disable(cid)
    }

    /// Whether counter `cid`'s enable bit is set.
    pub fn is_running(&self, cid: CounterId) -> bool {
        self.state.lock().counter_running(cid)
    }
}
