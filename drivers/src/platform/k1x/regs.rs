//! K1x timer block register map.
//!
//! Every counter has its own bank of match/status/control registers. The
//! enable (CER), mode (CMR) and clock select (CCR) registers are shared by
//! all counters of a block, one bit or field per counter.

/// Counter enable register. Bit `n` runs counter `n`.
pub const CER: usize = 0x0000;
/// Counter mode register. Bit `n` set puts counter `n` in free-running mode.
pub const CMR: usize = 0x0004;
/// Clock control register. Holds the clock select field of every counter.
pub const CCR: usize = 0x000c;

/// Match register `m` of counter `n`.
pub const fn tn_mm(n: usize, m: usize) -> usize {
    0x0010 + (n << 4) + (m << 2)
}

/// Preload control register of counter `n`. Zero means free-running.
pub const fn plcr(n: usize) -> usize {
    0x0050 + (n << 2)
}

/// Interrupt enable register of counter `n`. Bit `m` enables match `m`.
pub const fn ier(n: usize) -> usize {
    0x0060 + (n << 2)
}

/// Interrupt clear register of counter `n`. Write 1 to clear.
pub const fn icr(n: usize) -> usize {
    0x0070 + (n << 2)
}

/// Status register of counter `n`. Bit `m` is set when match `m` hit.
pub const fn sr(n: usize) -> usize {
    0x0080 + (n << 2)
}

/// Current count of counter `n`.
pub const fn cr(n: usize) -> usize {
    0x0090 + (n << 2)
}

/// Enable bits of every counter in CER/CMR.
pub const ALL_COUNTERS: u32 = 0b111;

/// Match 0 bit in IER, SR and ICR. Only match 0 is used.
pub const MATCH0: u32 = 1 << 0;
/// All three match bits in IER, SR and ICR.
pub const ALL_MATCHES: u32 = 0b111;

/// Width mask of one CCR clock select field.
pub const CCR_CS_WIDTH: u32 = 0b11;

/// Bit position of counter `n`'s clock select field in CCR.
///
/// The fields are not evenly spaced: bit 4 is reserved.
pub const fn ccr_cs_shift(n: usize) -> u32 {
    match n {
        0 => 0,
        1 => 2,
        _ => 5,
    }
}

/// CCR mask covering counter `n`'s clock select field.
pub const fn ccr_cs_mask(n: usize) -> u32 {
    CCR_CS_WIDTH << ccr_cs_shift(n)
}

/// `select` placed in counter `n`'s clock select field.
pub const fn ccr_cs(n: usize, select: u32) -> u32 {
    (select & CCR_CS_WIDTH) << ccr_cs_shift(n)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn per_counter_banks_do_not_collide() {
        assert_eq!(tn_mm(0, 0), 0x10);
        assert_eq!(tn_mm(2, 0), 0x30);
        assert_eq!(ier(1), 0x64);
        assert_eq!(icr(2), 0x78);
        assert_eq!(sr(0), 0x80);
        assert_eq!(cr(2), 0x98);
    }

    #[test]
    fn clock_select_fields_are_disjoint() {
        assert_eq!(ccr_cs_mask(0), 0b000_0011);
        assert_eq!(ccr_cs_mask(1), 0b000_1100);
        assert_eq!(ccr_cs_mask(2), 0b110_0000);

        assert_eq!(ccr_cs_mask(0) & ccr_cs_mask(1), 0);
        assert_eq!(ccr_cs_mask(1) & ccr_cs_mask(2), 0);
        assert_eq!(ccr_cs_mask(0) & ccr_cs_mask(2), 0);
    }
}
