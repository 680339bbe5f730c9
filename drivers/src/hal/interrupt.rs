//! Interrupt Routing Hardware Abstraction Layer.
//!
//! This module defines the interface a driver uses to claim interrupt
//! lines from the platform, and the value an interrupt handler reports
//! back to the dispatcher.

use bitflags::bitflags;

/// Interrupt number type.
pub type IrqNumber = u32;

/// Logical CPU index.
pub type CpuId = u32;

/// Result of running an interrupt handler.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum IrqReturn {
    /// The interrupt was not raised by this device.
    ///
    /// The line may be shared, so the dispatcher should try other handlers.
    None,
    /// The interrupt was raised by this device and has been serviced.
    Handled,
}

bitflags! {
    /// Flags attached to an interrupt line request.
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct IrqFlags: u32 {
        /// Line drives a system timer; must not be threaded or balanced.
        const TIMER = 1 << 0;
        /// Handler may be polled when the line is suspected stuck.
        const IRQPOLL = 1 << 1;
        /// Line stays masked until the handler finishes.
        const ONESHOT = 1 << 2;
        /// Line is private to one CPU.
        const PERCPU = 1 << 3;
    }
}

/// Platform interrupt routing used by drivers during setup.
pub trait IrqRouter {
    /// Error type for routing operations.
    type Error: core::fmt::Debug;

    /// Claim `irq` for a driver.
    ///
    /// The platform calls back into the driver whenever the line signals.
    fn request_irq(
        &mut self,
        irq: IrqNumber,
        flags: IrqFlags,
        name: &'static str,
    ) -> Result<(), Self::Error>;

    /// Mask `irq` at the controller.
    fn disable_irq(&mut self, irq: IrqNumber);

    /// Suggest that `irq` be routed to `cpu`.
    fn set_affinity_hint(&mut self, irq: IrqNumber, cpu: CpuId);

    /// Number of logical CPUs that may ever come online.
    fn possible_cpus(&self) -> u32;

    /// CPU executing the caller.
    fn current_cpu(&self) -> CpuId;
}
