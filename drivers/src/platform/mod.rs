//! Platform Timer Drivers
//!
//! Each supported SoC family gets its own module, selected with a Cargo
//! feature. [`CurrentTimerBlock`] is the selected SoC's timer block wired
//! to a real register window and the local CPU's interrupt masking.

use crate::hal::mmio::MmioRegion;
use common::arch::LocalIrq;

// Platform selection based on Cargo features
cfg_if::cfg_if! {
    if #[cfg(feature = "k1x")] {
        pub mod k1x;
        pub type CurrentTimerBlock = k1x::TimerBlock<MmioRegion, LocalIrq>;
        pub type CurrentCounterHandle = k1x::CounterHandle<MmioRegion, LocalIrq>;
    } else {
        compile_error!(
            "No platform selected!\n\
            Use: cargo build --features k1x"
        );
    }
}
