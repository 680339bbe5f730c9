//! SpacemiT K1x Timer Driver
//!
//! Drives the K1x multi-counter timer blocks as one-shot clock event
//! devices for an OS tick framework.
//!
//! # Module Organization
//!
//! - [`hal`]: Traits for the hardware and OS services the driver needs
//! - [`platform`]: SoC-specific timer drivers
//!
//! # Usage Example
//!
//! ```no_run
//! use common::arch::LocalIrq;
//! use k1x_timer::hal::mmio::MmioRegion;
//! use k1x_timer::platform::k1x::{self, CounterConfig, TimerConfig, TimerRegistry};
//! # fn demo<C, R, Q, F>(clock: &mut C, reset: &mut R, router: &mut Q, framework: &mut F)
//! # where
//! #     C: k1x_timer::hal::clock::ClockGate,
//! #     R: k1x_timer::hal::clock::ResetLine,
//! #     Q: k1x_timer::hal::interrupt::IrqRouter,
//! #     F: k1x_timer::hal::timer::ClockEventRegistrar<
//! #         k1x::CounterHandle<MmioRegion, LocalIrq>,
//! #     >,
//! # {
//! # fn delay(_: u32) {}
//! # fn tick(_: k1x::EventSource) {}
//! let mut registry: TimerRegistry<MmioRegion, LocalIrq> = TimerRegistry::new();
//! let config = TimerConfig {
//!     id: 0,
//!     base: 0xd401_4000,
//!     fast_clock_hz: 12_800_000,
//!     bus_clock_hz: 102_400_000,
//!     working_hz: 12_800_000,
//! };
//! let window = unsafe { MmioRegion::new(config.base, delay) };
//!
//! let block = k1x::bring_up_block(&mut registry, &config, window, clock, reset).unwrap();
//! let counter = CounterConfig {
//!     counter: 0,
//!     irq: 39,
//!     affinity: k1x_timer::hal::timer::CpuAffinity::Broadcast,
//! };
//! k1x::setup_counter(&block, &counter, router, framework, tick).unwrap();
//! # }
//! ```

#![cfg_attr(not(test), no_std)]

extern crate alloc;

pub mod hal;
pub mod platform;

// Re-export commonly used types
pub use hal::interrupt::{IrqFlags, IrqReturn};
pub use hal::timer::{ClockEventConfig, ClockEventDevice, ClockEventRegistrar, CpuAffinity};
pub use platform::k1x::{CounterHandle, TimerBlock, TimerError, TimerRegistry};
