use core::fmt::Debug;

/// Architecture-specific interrupt masking interface.
///
/// Implemented once per architecture in [`crate::arch`]. Anything that
/// must be shared between an interrupt handler and normal context takes
/// an implementation of this trait as a type parameter.
pub trait IrqControl {
    /// Saved interrupt state
    type State: Copy + Debug;

    /// Disable local interrupts and return the previous state.
    fn disable() -> Self::State;

    /// Restore local interrupts to a previous state.
    fn restore(state: Self::State);
}
