use crate::sync::irq::IrqControl;

/// Interrupt control for hosted builds.
///
/// There are no interrupts to mask when running as a normal process, so
/// both operations are no-ops. Lock exclusion still comes from the spin
/// lock itself.
#[derive(Debug, Clone, Copy)]
pub struct HostIrq;

impl IrqControl for HostIrq {
    type State = ();

    #[inline(always)]
    fn disable() {}

    #[inline(always)]
    fn restore(_state: ()) {}
}
