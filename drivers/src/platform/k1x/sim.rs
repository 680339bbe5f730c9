//! Simulated timer block and collaborators for unit tests.
//!
//! [`SimBus`] models the register window as a plain register file with two
//! hardware quirks that can be switched on per register: writes that are
//! silently dropped and writes that only show up after a number of reads.
//! ICR(n) is write-1-to-clear on SR(n) and reads back as SR(n).

use alloc::boxed::Box;
use alloc::collections::BTreeMap;
use alloc::sync::Arc;
use alloc::vec::Vec;
use core::cell::Cell;
use spin::Mutex;

use super::{
    CounterHandle, CounterId, EventHandler, MAX_COUNTERS, TimerBlock, TimerConfig, TimerId,
    WriteFailureLog, init, regs,
};
use crate::hal::clock::{ClockGate, ResetLine};
use crate::hal::interrupt::{CpuId, IrqFlags, IrqNumber, IrqRouter};
use crate::hal::mmio::{Delay, RegisterIo};
use crate::hal::timer::{ClockEventConfig, ClockEventDevice, ClockEventRegistrar};
use common::sync::IrqControl;

/// Id of blocks built by [`block`].
pub const TIMER_ID: TimerId = 1;
/// Register bus clock of blocks built by [`block`].
pub const BUS_HZ: u32 = 52_000_000;

#[derive(Default)]
struct Registers {
    values: BTreeMap<usize, u32>,
    /// Written value and the stale reads left before it shows.
    pending: BTreeMap<usize, (u32, u32)>,
    lag: BTreeMap<usize, u32>,
    drops: BTreeMap<usize, u32>,
    writes: Vec<(usize, u32)>,
    reads: usize,
    slept_us: u64,
}

impl Registers {
    fn value(&self, reg: usize) -> u32 {
        self.values.get(&reg).copied().unwrap_or(0)
    }

    /// Counter whose ICR sits at `reg`.
    fn icr_counter(reg: usize) -> Option<usize> {
        (0..MAX_COUNTERS).find(|&n| regs::icr(n) == reg)
    }
}

/// Shared handle to a simulated register window.
#[derive(Clone, Default)]
pub struct SimBus(Arc<Mutex<Registers>>);

impl SimBus {
    pub fn new() -> Self {
        Self::default()
    }

    /// Current register value, without counting as a read.
    pub fn reg(&self, reg: usize) -> u32 {
        self.0.lock().value(reg)
    }

    /// Force a register value, discarding any pending write.
    pub fn set_reg(&self, reg: usize, value: u32) {
        let mut r = self.0.lock();
        r.pending.remove(&reg);
        r.values.insert(reg, value);
    }

    /// Every write issued, dropped ones included, in order.
    pub fn writes(&self) -> Vec<(usize, u32)> {
        self.0.lock().writes.clone()
    }

    pub fn writes_to(&self, reg: usize) -> usize {
        self.0.lock().writes.iter().filter(|&&(r, _)| r == reg).count()
    }

    pub fn reads(&self) -> usize {
        self.0.lock().reads
    }

    /// Total time spent in [`Delay::delay_us`].
    pub fn slept_us(&self) -> u64 {
        self.0.lock().slept_us
    }

    /// Ignore the next `count` writes to `reg`. `u32::MAX` drops them all.
    pub fn drop_next_writes(&self, reg: usize, count: u32) {
        self.0.lock().drops.insert(reg, count);
    }

    /// From now on, a write to `reg` reads back stale `reads` times first.
    pub fn latch_after_reads(&self, reg: usize, reads: u32) {
        self.0.lock().lag.insert(reg, reads);
    }

    /// Set counter `cid`'s match 0 status bit.
    pub fn raise_match(&self, cid: CounterId) {
        let mut r = self.0.lock();
        let sr = regs::sr(cid.index());
        let value = r.value(sr) | regs::MATCH0;
        r.values.insert(sr, value);
    }
}

impl RegisterIo for SimBus {
    fn read(&mut self, reg: usize) -> u32 {
        let mut r = self.0.lock();
        r.reads += 1;

        if let Some(n) = Registers::icr_counter(reg) {
            return r.value(regs::sr(n));
        }

        match r.pending.get(&reg).copied() {
            Some((value, 0)) => {
                r.pending.remove(&reg);
                r.values.insert(reg, value);
                value
            }
            Some((value, left)) => {
                r.pending.insert(reg, (value, left - 1));
                r.value(reg)
            }
            None => r.value(reg),
        }
    }

    fn write(&mut self, reg: usize, value: u32) {
        let mut r = self.0.lock();
        r.writes.push((reg, value));

        if let Some(left) = r.drops.get_mut(&reg) {
            if *left > 0 {
                if *left != u32::MAX {
                    *left -= 1;
                }
                return;
            }
        }

        if let Some(n) = Registers::icr_counter(reg) {
            let sr = regs::sr(n);
            let status = r.value(sr) & !value;
            r.values.insert(sr, status);
            return;
        }

        match r.lag.get(&reg).copied() {
            Some(reads) if reads > 0 => {
                r.pending.insert(reg, (value, reads));
            }
            _ => {
                r.values.insert(reg, value);
            }
        }
    }
}

impl Delay for SimBus {
    fn delay_us(&mut self, us: u32) {
        self.0.lock().slept_us += u64::from(us);
    }
}

std::thread_local! {
    static MASKED: Cell<bool> = const { Cell::new(false) };
}

/// Interrupt masking that only tracks state, per test thread.
pub struct TestIrq;

impl IrqControl for TestIrq {
    type State = bool;

    fn disable() -> bool {
        MASKED.with(|m| m.replace(true))
    }

    fn restore(state: bool) {
        MASKED.with(|m| m.set(state));
    }
}

/// Whether a [`TestIrq`] lock is held on this thread.
pub fn irqs_masked() -> bool {
    MASKED.with(Cell::get)
}

/// A fresh failure log that lives for the rest of the test run.
pub fn failure_log() -> &'static WriteFailureLog<TestIrq> {
    Box::leak(Box::new(WriteFailureLog::new()))
}

/// A block straight out of reset, logging to a private failure log.
pub fn block(fast_hz: u32, working_hz: u32) -> (Arc<TimerBlock<SimBus, TestIrq>>, SimBus) {
    let bus = SimBus::new();
    let config = TimerConfig {
        id: TIMER_ID,
        base: 0,
        fast_clock_hz: fast_hz,
        bus_clock_hz: BUS_HZ,
        working_hz,
    };
    let loop_delay = init::settle_loop_count(BUS_HZ, fast_hz);

    let block = TimerBlock::new(&config, bus.clone(), loop_delay, failure_log());
    (Arc::new(block), bus)
}

/// Counter `n` of a fresh block, configured to deliver to `handler`.
pub fn handle_with(
    fast_hz: u32,
    working_hz: u32,
    n: usize,
    handler: EventHandler,
) -> (CounterHandle<SimBus, TestIrq>, SimBus) {
    let (block, bus) = block(fast_hz, working_hz);
    let cid = CounterId::new(n).unwrap();
    {
        let mut state = block.state.lock();
        let counter = state.counter_mut(cid);
        counter.configured = true;
        counter.handler = Some(handler);
    }
    (CounterHandle::new(block, cid), bus)
}

#[derive(Debug, Default)]
pub struct FakeClock {
    pub enabled: bool,
    pub rate: Option<u32>,
    pub fail_rate: bool,
}

impl ClockGate for FakeClock {
    type Error = ();

    fn prepare_enable(&mut self) -> Result<(), ()> {
        self.enabled = true;
        Ok(())
    }

    fn disable_unprepare(&mut self) {
        self.enabled = false;
    }

    fn set_rate(&mut self, hz: u32) -> Result<(), ()> {
        if self.fail_rate {
            return Err(());
        }
        self.rate = Some(hz);
        Ok(())
    }
}

#[derive(Debug, Default)]
pub struct FakeReset {
    pub deasserted: bool,
    pub fail: bool,
}

impl ResetLine for FakeReset {
    type Error = ();

    fn deassert(&mut self) -> Result<(), ()> {
        if self.fail {
            return Err(());
        }
        self.deasserted = true;
        Ok(())
    }
}

/// Interrupt router that records every call.
#[derive(Debug)]
pub struct RecordingRouter {
    pub possible: u32,
    pub current: CpuId,
    pub requested: Vec<(IrqNumber, IrqFlags, &'static str)>,
    pub disabled: Vec<IrqNumber>,
    pub hints: Vec<(IrqNumber, CpuId)>,
    /// Line that `request_irq` refuses.
    pub refuse: Option<IrqNumber>,
}

impl RecordingRouter {
    pub fn new(possible: u32, current: CpuId) -> Self {
        Self {
            possible,
            current,
            requested: Vec::new(),
            disabled: Vec::new(),
            hints: Vec::new(),
            refuse: None,
        }
    }
}

impl IrqRouter for RecordingRouter {
    type Error = ();

    fn request_irq(
        &mut self,
        irq: IrqNumber,
        flags: IrqFlags,
        name: &'static str,
    ) -> Result<(), ()> {
        if self.refuse == Some(irq) {
            return Err(());
        }
        self.requested.push((irq, flags, name));
        Ok(())
    }

    fn disable_irq(&mut self, irq: IrqNumber) {
        self.disabled.push(irq);
    }

    fn set_affinity_hint(&mut self, irq: IrqNumber, cpu: CpuId) {
        self.hints.push((irq, cpu));
    }

    fn possible_cpus(&self) -> u32 {
        self.possible
    }

    fn current_cpu(&self) -> CpuId {
        self.current
    }
}

/// Tick framework stand-in that keeps every registered device.
pub struct RecordingRegistrar<D> {
    pub devices: Vec<(ClockEventConfig, D)>,
}

impl<D> Default for RecordingRegistrar<D> {
    fn default() -> Self {
        Self {
            devices: Vec::new(),
        }
    }
}

impl<D: ClockEventDevice> ClockEventRegistrar<D> for RecordingRegistrar<D> {
    fn register(&mut self, config: ClockEventConfig, device: D) {
        self.devices.push((config, device));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lagging_register_reads_stale_first() {
        let mut bus = SimBus::new();
        bus.latch_after_reads(regs::CER, 2);

        bus.write(regs::CER, 0b101);
        assert_eq!(bus.read(regs::CER), 0);
        assert_eq!(bus.read(regs::CER), 0);
        assert_eq!(bus.read(regs::CER), 0b101);
        assert_eq!(bus.reads(), 3);
    }

    #[test]
    fn icr_clears_status() {
        let mut bus = SimBus::new();
        bus.raise_match(CounterId::PRIMARY);
        assert_eq!(bus.read(regs::icr(0)), regs::MATCH0);

        bus.write(regs::icr(0), regs::MATCH0);
        assert_eq!(bus.reg(regs::sr(0)), 0);
    }

    #[test]
    fn dropped_writes_are_still_recorded() {
        let mut bus = SimBus::new();
        bus.drop_next_writes(regs::CMR, 1);

        bus.write(regs::CMR, 1);
        bus.write(regs::CMR, 2);

        assert_eq!(bus.reg(regs::CMR), 2);
        assert_eq!(bus.writes_to(regs::CMR), 2);
    }
}
