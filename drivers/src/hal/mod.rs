//! Hardware Abstraction Layer (HAL) - Platform-Independent Traits
//!
//! This module defines the traits the timer drivers are written against.
//! Platform code implements the collaborator traits (register windows,
//! clocks, interrupt routing, the tick framework); drivers implement
//! [`timer::ClockEventDevice`].
//!
//! # Available Interfaces
//!
//! - [`mmio`]: Register window access and busy-wait delays
//! - [`clock`]: Peripheral clock gates and reset lines
//! - [`interrupt`]: Interrupt line routing
//! - [`timer`]: Clock event devices and their registration

pub mod clock;
pub mod interrupt;
pub mod mmio;
pub mod timer;
