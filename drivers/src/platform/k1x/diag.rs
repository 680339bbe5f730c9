//! Register dumps for fault diagnosis.

use core::fmt;

use super::{CounterId, EventState, TimerBlock, TimerId, regs};
use crate::hal::interrupt::IrqNumber;
use crate::hal::mmio::{Delay, RegisterIo};
use crate::hal::timer::CpuAffinity;
use common::sync::IrqControl;

/// Snapshot of one counter's software state and raw registers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HwInfo {
    pub timer: TimerId,
    pub counter: CounterId,
    /// Interrupt line given at setup, 0 if never set up.
    pub irq: IrqNumber,
    pub affinity: CpuAffinity,
    /// Armed and not yet fired.
    pub enabled: bool,
    /// Last programmed match value, in ticks.
    pub timeout: u32,
    pub cer: u32,
    pub cmr: u32,
    pub ccr: u32,
    pub mr: u32,
    pub ier: u32,
    pub sr: u32,
    pub cr: u32,
}

impl fmt::Display for HwInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "timer {}:{} irq {} ({:?}) enable: {}. timeout: {} cycles.",
            self.timer,
            self.counter.index(),
            self.irq,
            self.affinity,
            self.enabled as u8,
            self.timeout
        )?;
        write!(
            f,
            "cer/cmr/ccr/mr/ier/sr/cr: (0x{:x} 0x{:x} 0x{:x} 0x{:x} 0x{:x} 0x{:x} 0x{:x})",
            self.cer, self.cmr, self.ccr, self.mr, self.ier, self.sr, self.cr
        )
    }
}

impl<B: RegisterIo + Delay, I: IrqControl + 'static> TimerBlock<B, I> {
    /// Dump the primary counter. See [`TimerBlock::dump_counter`].
    pub fn dump_hwinfo(&self) -> Option<HwInfo> {
        self.dump_counter(CounterId::PRIMARY)
    }

    /// Read and log counter `cid`'s registers.
    ///
    /// Meant for fault paths, so it gives up instead of spinning when the
    /// block lock is held elsewhere.
    pub fn dump_counter(&self, cid: CounterId) -> Option<HwInfo> {
        let n = cid.index();
        let Some(mut state) = self.state.try_lock() else {
            log::warn!("Timer {}: busy, no register dump", self.id);
            return None;
        };

        let counter = *state.counter(cid);
        let info = HwInfo {
            timer: self.id,
            counter: cid,
            irq: counter.irq,
            affinity: counter.affinity,
            enabled: counter.state == EventState::Armed,
            timeout: counter.timeout,
            cer: state.bus.read(regs::CER),
            cmr: state.bus.read(regs::CMR),
            ccr: state.bus.read(regs::CCR),
            mr: state.bus.read(regs::tn_mm(n, 0)),
            ier: state.bus.read(regs::ier(n)),
            sr: state.bus.read(regs::sr(n)),
            cr: state.bus.read(regs::cr(n)),
        };
        drop(state);

        log::error!("{}", info);
        Some(info)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::platform::k1x::sim;
    use alloc::string::ToString;

    #[test]
    fn dump_reports_armed_counter() {
        let (block, bus) = sim::block(26_000_000, 26_000_000);
        block.set_next_event(CounterId::PRIMARY, 1000).unwrap();
        bus.set_reg(regs::cr(0), 321);

        let info = block.dump_hwinfo().unwrap();

        assert_eq!(
            info,
            HwInfo {
                timer: sim::TIMER_ID,
                counter: CounterId::PRIMARY,
                irq: 0,
                affinity: CpuAffinity::Broadcast,
                enabled: true,
                timeout: 999,
                cer: 0b001,
                cmr: 0,
                ccr: 0,
                mr: 999,
                ier: 1,
                sr: 0,
                cr: 321,
            }
        );
        assert_eq!(
            info.to_string(),
            "timer 1:0 irq 0 (Broadcast) enable: 1. timeout: 999 cycles.\n\
             cer/cmr/ccr/mr/ier/sr/cr: (0x1 0x0 0x0 0x3e7 0x1 0x0 0x141)"
        );
    }

    #[test]
    fn dump_after_fire_reports_disabled() {
        let (block, bus) = sim::block(26_000_000, 26_000_000);
        let cid = CounterId::new(2).unwrap();
        block.set_next_event(cid, 50).unwrap();
        bus.raise_match(cid);
        block.handle_irq(cid);

        let info = block.dump_counter(cid).unwrap();
        assert!(!info.enabled);
        assert_eq!(info.timeout, 49);
        assert_eq!(info.ier, 0);
    }

    #[test]
    fn dump_gives_up_while_the_lock_is_held() {
        let (block, bus) = sim::block(26_000_000, 26_000_000);
        let reads = bus.reads();

        let guard = block.state.lock();
        assert!(block.dump_hwinfo().is_none());
        drop(guard);

        assert_eq!(bus.reads(), reads);
        assert!(block.dump_hwinfo().is_some());
    }
}
