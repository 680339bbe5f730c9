//! Clock and Reset Hardware Abstraction Layer.
//!
//! Peripheral input clocks and reset lines are owned by the SoC's clock
//! controller. Drivers only gate, rate-set and release them.

/// A gateable, rate-settable peripheral input clock.
pub trait ClockGate {
    /// Error type for clock operations.
    type Error: core::fmt::Debug;

    /// Prepare and ungate the clock.
    fn prepare_enable(&mut self) -> Result<(), Self::Error>;

    /// Gate and unprepare the clock.
    fn disable_unprepare(&mut self);

    /// Set the clock rate in Hz.
    fn set_rate(&mut self, hz: u32) -> Result<(), Self::Error>;
}

/// A peripheral reset line.
pub trait ResetLine {
    /// Error type for reset operations.
    type Error: core::fmt::Debug;

    /// Take the peripheral out of reset.
    fn deassert(&mut self) -> Result<(), Self::Error>;
}
