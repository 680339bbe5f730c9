//! Register Window Hardware Abstraction Layer.
//!
//! Drivers never touch a raw pointer directly. They go through
//! [`RegisterIo`], so the same driver code can run against a real
//! memory-mapped window or a simulated one.

use core::ptr::{read_volatile, write_volatile};

/// 32-bit register access within one peripheral's register window.
///
/// Offsets are byte offsets from the start of the window.
pub trait RegisterIo {
    /// Read the register at `offset`.
    fn read(&mut self, offset: usize) -> u32;

    /// Write `value` to the register at `offset`.
    ///
    /// A write is a request, not a guarantee: some peripherals drop writes
    /// that race with an internal clock transition.
    fn write(&mut self, offset: usize, value: u32);
}

/// Short calibrated busy-wait.
pub trait Delay {
    /// Spin for at least `us` microseconds.
    fn delay_us(&mut self, us: u32);
}

/// A memory-mapped register window.
pub struct MmioRegion {
    base: usize,
    delay: fn(u32),
}

impl MmioRegion {
    /// Create a register window at `base`.
    ///
    /// `delay` is the platform's microsecond busy-wait, used by drivers that
    /// need to poll the hardware.
    ///
    /// # Safety
    ///
    /// - `base` must be the start of a mapped device-memory region large
    ///   enough for every offset the driver uses
    /// - Only one `MmioRegion` should exist per peripheral instance
    pub const unsafe fn new(base: usize, delay: fn(u32)) -> Self {
        Self { base, delay }
    }

    /// Base address of the window.
    pub fn base(&self) -> usize {
        self.base
    }
}

impl RegisterIo for MmioRegion {
    #[inline]
    fn read(&mut self, offset: usize) -> u32 {
        unsafe { read_volatile((self.base + offset) as *const u32) }
    }

    #[inline]
    fn write(&mut self, offset: usize, value: u32) {
        unsafe { write_volatile((self.base + offset) as *mut u32, value) }
    }
}

impl Delay for MmioRegion {
    fn delay_us(&mut self, us: u32) {
        (self.delay)(us);
    }
}
