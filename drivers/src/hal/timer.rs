//! Clock Event Hardware Abstraction Layer.
//!
//! A clock event device is a hardware timer the OS tick code programs with
//! "interrupt me after N ticks". This module defines the capability a timer
//! driver provides to the tick framework, and the interface it uses to
//! register with it.

use bitflags::bitflags;

use super::interrupt::{CpuId, IrqNumber};

bitflags! {
    /// Capabilities of a clock event device.
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct ClockEventFeatures: u32 {
        /// Fires periodically once started.
        const PERIODIC = 1 << 0;
        /// Fires once per programmed deadline.
        const ONESHOT = 1 << 1;
    }
}

/// Which CPUs a clock event device can serve.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum CpuAffinity {
    /// The device may wake any CPU (broadcast timer).
    Broadcast,
    /// The device is private to one CPU.
    Cpu(CpuId),
}

/// Registration record handed to the tick framework.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ClockEventConfig {
    pub name: &'static str,
    pub features: ClockEventFeatures,
    /// Higher rated devices are preferred.
    pub rating: u32,
    pub irq: IrqNumber,
    pub affinity: CpuAffinity,
    /// Tick rate in Hz.
    pub freq_hz: u32,
    /// Smallest delta the device can be programmed with, in ticks.
    pub min_delta: u32,
    /// Largest delta the device can be programmed with, in ticks.
    pub max_delta: u32,
}

/// One-shot clock event device.
///
/// Implemented by timer drivers and called by the tick framework, possibly
/// from any CPU and with interrupts disabled.
pub trait ClockEventDevice {
    /// Error type for clock event operations.
    type Error: core::fmt::Debug;

    /// Program the device to fire once, `delta` ticks from now.
    ///
    /// The framework keeps `delta` within the registered bounds.
    fn set_next_event(&self, delta: u32) -> Result<(), Self::Error>;

    /// Stop the device. Any pending deadline is dropped.
    fn set_state_shutdown(&self) -> Result<(), Self::Error>;

    /// Bring the device back after a shutdown.
    fn tick_resume(&self) -> Result<(), Self::Error>;
}

/// The tick framework's registration entry point.
pub trait ClockEventRegistrar<D: ClockEventDevice> {
    /// Make `device` available to the framework.
    fn register(&mut self, config: ClockEventConfig, device: D);
}
