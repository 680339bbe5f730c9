use core::fmt;

use crate::hal::interrupt::{CpuId, IrqNumber};

/// Timer block errors.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum TimerError {
    /// Block id is not below [`super::MAX_TIMERS`].
    InvalidTimerId(usize),
    /// A block with this id is already registered.
    DuplicateTimer(usize),
    /// A configured clock frequency is zero.
    ZeroFrequency,
    /// Frequency matches neither the fast clock nor the 32 kHz clock.
    InvalidFrequency(u32),
    /// Counter index is not below [`super::MAX_COUNTERS`].
    InvalidCounter(usize),
    /// Counter was already set up as a clock event device.
    CounterInUse(usize),
    /// CPU index is not a possible CPU.
    InvalidCpu(CpuId),
    /// The interrupt line could not be claimed.
    IrqUnavailable(IrqNumber),
    /// The block's input clock could not be enabled or rate-set.
    ClockUnavailable,
    /// The block's reset line could not be released.
    ResetUnavailable,
    /// A register write never read back as written.
    ///
    /// The operation went ahead without the write taking effect.
    HardwareWedged { reg: usize },
}

impl fmt::Display for TimerError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self {
            TimerError::InvalidTimerId(id) => write!(f, "invalid timer id {}", id),
            TimerError::DuplicateTimer(id) => write!(f, "timer {} already registered", id),
            TimerError::ZeroFrequency => f.write_str("zero clock frequency"),
            TimerError::InvalidFrequency(hz) => write!(f, "invalid clock rate {}Hz", hz),
            TimerError::InvalidCounter(n) => write!(f, "invalid counter id {}", n),
            TimerError::CounterInUse(n) => write!(f, "counter {} already in use", n),
            TimerError::InvalidCpu(cpu) => write!(f, "invalid cpu {}", cpu),
            TimerError::IrqUnavailable(irq) => write!(f, "cannot request irq {}", irq),
            TimerError::ClockUnavailable => f.write_str("cannot enable clock"),
            TimerError::ResetUnavailable => f.write_str("cannot deassert reset"),
            TimerError::HardwareWedged { reg } => {
                write!(f, "register 0x{:x} does not take writes", reg)
            }
        }
    }
}
