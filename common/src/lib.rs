//! Architecture and synchronization primitives shared by the driver crates.

#![cfg_attr(not(test), no_std)]

pub mod arch;
pub mod sync;
