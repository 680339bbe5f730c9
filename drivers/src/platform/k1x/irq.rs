//! Match interrupt handler.
//!
//! The interrupt line may be shared, so the handler first checks the
//! counter's match status and reports [`IrqReturn::None`] when it is clear.

use super::verify::{Verify, WriteStatus};
use super::{CounterHandle, CounterId, EventSource, TimerBlock, regs};
use crate::hal::interrupt::IrqReturn;
use crate::hal::mmio::{Delay, RegisterIo};
use common::sync::IrqControl;

impl<B: RegisterIo + Delay, I: IrqControl + 'static> TimerBlock<B, I> {
    /// Service counter `cid`'s interrupt line.
    ///
    /// On a match the counter is stopped, its interrupt masked and the
    /// status cleared. The event handler is then called with the block lock
    /// released.
    pub fn handle_irq(&self, cid: CounterId) -> IrqReturn {
        let n = cid.index();
        let mut state = self.state.lock();

        // Only match 0 is used.
        if state.bus.read(regs::sr(n)) & regs::MATCH0 == 0 {
            return IrqReturn::None;
        }

        let mut status = WriteStatus::default();
        status.record(state.counter_disable(cid));
        status.record(state.write_verified(
            regs::ier(n),
            0,
            regs::ALL_MATCHES,
            Verify::ExpectSet,
            None,
        ));
        status.record(state.write_verified(
            regs::icr(n),
            regs::MATCH0,
            regs::ALL_MATCHES,
            Verify::ExpectCleared,
            None,
        ));

        let handler = state.counter(cid).handler;
        drop(state);

        if let Err(e) = status.finish() {
            log::error!("Timer {}:{}: {}", self.id, n, e);
        }

        if let Some(handler) = handler {
            handler(EventSource {
                timer: self.id,
                counter: cid,
            });
        }

        IrqReturn::Handled
    }
}

impl<B: RegisterIo + Delay, I: IrqControl + 'static> CounterHandle<B, I> {
    /// Entry point for the interrupt layer when this counter's line fires.
    pub fn handle_irq(&self) -> IrqReturn {
        self.block().handle_irq(self.counter())
    }
}
