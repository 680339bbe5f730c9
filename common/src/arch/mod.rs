//! Architecture-specific primitives.
//!
//! [`LocalIrq`] is the interrupt masking implementation for the CPU the
//! crate is being built for. Hosted builds (unit tests, tooling) get a
//! no-op implementation.

cfg_if::cfg_if! {
    if #[cfg(all(target_arch = "riscv64", target_os = "none"))] {
        pub mod riscv;
        pub use riscv::irq::RiscvIrq as LocalIrq;
    } else {
        pub mod host;
        pub use host::HostIrq as LocalIrq;
    }
}
