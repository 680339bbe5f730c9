//! Timer block bring-up and counter setup.
//!
//! Bring-up takes a block from reset to an idle baseline: all counters on
//! the fast clock and stopped, all match interrupts masked, all status
//! cleared. Until that baseline is reached nothing can be verified, so the
//! idle writes are raw and repeated long enough for the hardware to settle.
//!
//! Counter setup then primes each declared counter as a free-running
//! counter on its working clock and hands it to the tick framework.

use alloc::sync::Arc;

use super::event::{CounterHandle, EventHandler};
use super::{
    BlockState, CounterId, EventState, MAX_DELTA, MAX_TIMERS, MIN_DELTA, TimerBlock, TimerError,
    TimerId, TimerRegistry, regs,
};
use crate::hal::clock::{ClockGate, ResetLine};
use crate::hal::interrupt::{IrqFlags, IrqNumber, IrqRouter};
use crate::hal::mmio::{Delay, RegisterIo};
use crate::hal::timer::{ClockEventConfig, ClockEventFeatures, ClockEventRegistrar, CpuAffinity};
use common::sync::IrqControl;

/// Clock event device name reported to the tick framework.
pub const CLOCK_EVENT_NAME: &str = "timer-k1x";
/// Clock event rating reported to the tick framework.
pub const CLOCK_EVENT_RATING: u32 = 200;

/// Validated description of one timer block.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimerConfig {
    pub id: TimerId,
    /// Physical base address of the register window.
    pub base: usize,
    /// Fast clock frequency in Hz.
    pub fast_clock_hz: u32,
    /// Register bus (APB) frequency in Hz. Only used to size settle loops.
    pub bus_clock_hz: u32,
    /// Frequency the counters run at, in Hz.
    pub working_hz: u32,
}

impl TimerConfig {
    pub fn validate(&self) -> Result<(), TimerError> {
        if self.id >= MAX_TIMERS {
            return Err(TimerError::InvalidTimerId(self.id));
        }
        if self.fast_clock_hz == 0 || self.bus_clock_hz == 0 || self.working_hz == 0 {
            return Err(TimerError::ZeroFrequency);
        }
        Ok(())
    }
}

/// Description of one counter to set up as a clock event device.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CounterConfig {
    pub counter: usize,
    pub irq: IrqNumber,
    pub affinity: CpuAffinity,
}

/// Register accesses needed to wait out two fast clock cycles.
///
/// Two fast clock cycles are `bus_hz * 2 / fast_hz` bus cycles. A register
/// access takes 8 bus cycles, plus one access of margin.
pub fn settle_loop_count(bus_hz: u32, fast_hz: u32) -> u32 {
    ((u64::from(bus_hz) * 2 / u64::from(fast_hz)) / 8 + 1) as u32
}

/// Bring a timer block to its idle baseline and register it.
///
/// Nothing is registered if any step fails. The clock is gated again if
/// it had already been enabled.
pub fn bring_up_block<B, I, C, R>(
    registry: &mut TimerRegistry<B, I>,
    config: &TimerConfig,
    bus: B,
    clock: &mut C,
    reset: &mut R,
) -> Result<Arc<TimerBlock<B, I>>, TimerError>
where
    B: RegisterIo + Delay,
    I: IrqControl + 'static,
    C: ClockGate,
    R: ResetLine,
{
    config.validate().inspect_err(|e| {
        log::error!("Timer {}: bad configuration: {}", config.id, e);
    })?;

    if registry.contains(config.id) {
        log::error!("Timer {}: already initialized", config.id);
        return Err(TimerError::DuplicateTimer(config.id));
    }

    if let Err(e) = clock.prepare_enable() {
        log::error!("Timer {}: fail to enable clock: {:?}", config.id, e);
        return Err(TimerError::ClockUnavailable);
    }

    if let Err(e) = clock.set_rate(config.fast_clock_hz) {
        log::error!(
            "Timer {}: fail to set clock rate to {}Hz: {:?}",
            config.id,
            config.fast_clock_hz,
            e
        );
        clock.disable_unprepare();
        return Err(TimerError::ClockUnavailable);
    }

    if let Err(e) = reset.deassert() {
        log::error!("Timer {}: fail to deassert reset: {:?}", config.id, e);
        clock.disable_unprepare();
        return Err(TimerError::ResetUnavailable);
    }

    let loop_delay = settle_loop_count(config.bus_clock_hz, config.fast_clock_hz);
    log::info!("Timer {}: loop_delay_fastclk is {}", config.id, loop_delay);

    let block = Arc::new(TimerBlock::new(
        config,
        bus,
        loop_delay,
        registry.failure_log(),
    ));
    block.state.lock().enter_idle(loop_delay);

    registry.register(Arc::clone(&block))?;
    Ok(block)
}

/// Set up one counter of `block` as a one-shot clock event device.
///
/// Failure only affects this counter; the block and its other counters
/// stay usable.
pub fn setup_counter<B, I, R, F>(
    block: &Arc<TimerBlock<B, I>>,
    config: &CounterConfig,
    router: &mut R,
    registrar: &mut F,
    handler: EventHandler,
) -> Result<CounterHandle<B, I>, TimerError>
where
    B: RegisterIo + Delay,
    I: IrqControl + 'static,
    R: IrqRouter,
    F: ClockEventRegistrar<CounterHandle<B, I>>,
{
    let tid = block.id();
    let cid = CounterId::new(config.counter).inspect_err(|_| {
        log::error!("Timer {}: fail to get counter id 0x{:x}", tid, config.counter);
    })?;

    if let CpuAffinity::Cpu(cpu) = config.affinity {
        if cpu >= router.possible_cpus() {
            log::error!("Timer {}:{}: invalid cpu {}", tid, config.counter, cpu);
            return Err(TimerError::InvalidCpu(cpu));
        }
    }

    {
        let mut state = block.state.lock();
        if state.counter(cid).configured {
            return Err(TimerError::CounterInUse(config.counter));
        }

        let freq = block.working_hz;
        state
            .prime_free_running(cid, freq, block.loop_delay)
            .inspect_err(|e| {
                log::error!("Timer {}:{}: fail to create clkevt: {}", tid, config.counter, e);
            })?;

        let counter = state.counter_mut(cid);
        counter.configured = true;
        counter.freq = freq;
        counter.irq = config.irq;
        counter.affinity = config.affinity;
        counter.handler = Some(handler);
    }

    let handle = CounterHandle::new(Arc::clone(block), cid);
    let event = ClockEventConfig {
        name: CLOCK_EVENT_NAME,
        features: ClockEventFeatures::ONESHOT,
        rating: CLOCK_EVENT_RATING,
        irq: config.irq,
        affinity: config.affinity,
        freq_hz: block.working_hz,
        min_delta: MIN_DELTA,
        max_delta: MAX_DELTA,
    };

    match config.affinity {
        CpuAffinity::Broadcast => {
            request_irq(
                block,
                cid,
                router,
                config.irq,
                IrqFlags::TIMER | IrqFlags::IRQPOLL | IrqFlags::ONESHOT,
                "broadcast-timer",
            )?;
            registrar.register(event, handle.clone());
        }
        CpuAffinity::Cpu(cpu) => {
            request_irq(
                block,
                cid,
                router,
                config.irq,
                IrqFlags::TIMER | IrqFlags::IRQPOLL | IrqFlags::PERCPU,
                "local-timer",
            )?;
            if cpu == router.current_cpu() {
                registrar.register(event, handle.clone());
                router.set_affinity_hint(config.irq, cpu);
            } else {
                // Its CPU is not online yet; keep the line quiet until it is.
                router.disable_irq(config.irq);
            }
        }
    }

    log::debug!(
        "Timer {}:{}: clock event on irq {} ({:?})",
        tid,
        config.counter,
        config.irq,
        config.affinity
    );
    Ok(handle)
}

fn request_irq<B, I, R>(
    block: &TimerBlock<B, I>,
    cid: CounterId,
    router: &mut R,
    irq: IrqNumber,
    flags: IrqFlags,
    name: &'static str,
) -> Result<(), TimerError>
where
    I: IrqControl + 'static,
    R: IrqRouter,
{
    if let Err(e) = router.request_irq(irq, flags, name) {
        log::error!("Timer {}:{}: fail to request irq {}: {:?}", block.id(), cid.index(), irq, e);
        block.state.lock().counter_mut(cid).configured = false;
        return Err(TimerError::IrqUnavailable(irq));
    }
    Ok(())
}

impl<B: RegisterIo + Delay, I: IrqControl + 'static> BlockState<B, I> {
    /// Raw idle sequence, run once right after reset.
    fn enter_idle(&mut self, loop_delay: u32) {
        let fast_hz = self.fast_hz;
        for cid in CounterId::all() {
            if let Err(e) = self.switch_clock(cid, fast_hz) {
                log::error!("Counter {}: cannot select fast clock: {}", cid.index(), e);
            }
        }

        let cer = self.bus.read(regs::CER) & !regs::ALL_COUNTERS;
        self.bus.write(regs::CER, cer);

        for cid in CounterId::all() {
            self.bus.write(regs::ier(cid.index()), 0);
        }

        for _ in 0..loop_delay {
            for cid in CounterId::all() {
                self.bus.write(regs::icr(cid.index()), regs::MATCH0);
            }
            self.bus.write(regs::CER, cer);
        }
    }

    /// Start counter `cid` free-running on the `freq` clock.
    ///
    /// The enable write is repeated for as many working clock cycles as the
    /// settle loop covers fast clock cycles. The counter is left running, so
    /// a shutdown before the first deadline resumes it.
    fn prime_free_running(
        &mut self,
        cid: CounterId,
        freq: u32,
        loop_delay: u32,
    ) -> Result<(), TimerError> {
        let n = cid.index();

        self.switch_clock(cid, freq)?;

        let ratio = self.fast_hz / freq;
        let delay = loop_delay.saturating_mul(ratio);

        let cmr = self.bus.read(regs::CMR) | cid.bit();
        self.bus.write(regs::CMR, cmr);

        self.bus.write(regs::plcr(n), 0);
        self.bus.write(regs::icr(n), regs::ALL_MATCHES);

        let cer = self.bus.read(regs::CER) | cid.bit();
        self.bus.write(regs::CER, cer);
        for _ in 0..delay {
            self.bus.write(regs::CER, cer);
        }

        self.counter_mut(cid).state = EventState::Armed;
        Ok(())
    }
}
