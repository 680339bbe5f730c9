use crate::sync::irq::IrqControl;

/// Supervisor interrupt enable bit in `sstatus`.
const SSTATUS_SIE: usize = 1 << 1;

pub struct RiscvIrq;

/// Interrupt control for RISC-V supervisor mode.
///
/// `disable()` atomically clears `sstatus.SIE` with `csrrci` and reports
/// whether it was set before. `restore()` sets it again only if it was.
///
/// The timer block ISR and the clock event callbacks both run in S-mode on
/// the same hart, so masking SIE is enough to keep them from deadlocking on
/// a block lock.
impl IrqControl for RiscvIrq {
    type State = bool;

    #[inline(always)]
    fn disable() -> bool {
        let sstatus: usize;
        unsafe {
            core::arch::asm!(
                "csrrci {0}, sstatus, 2",
                out(reg) sstatus,
                options(nomem, nostack)
            );
        }
        sstatus & SSTATUS_SIE != 0
    }

    #[inline(always)]
    fn restore(prev_enabled: bool) {
        if prev_enabled {
            unsafe {
                core::arch::asm!("csrsi sstatus, 2", options(nomem, nostack));
            }
        }
    }
}
