//! Shared alignment helpers

/// Round `value` up to the next multiple of `align` (a power of two).
pub(crate) const fn align_up(value: u64, align: u64) -> u64 {
    debug_assert!(align.is_power_of_two());
    (value + align - 1) & !(align - 1)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn align_up_rounds_to_boundary() {
        assert_eq!(align_up(0, 0x800), 0);
        assert_eq!(align_up(1, 0x800), 0x800);
        assert_eq!(align_up(0x800, 0x800), 0x800);
        assert_eq!(align_up(0x801, 0x800), 0x1000);
        assert_eq!(align_up(17, 0x10), 32);
        assert_eq!(align_up(32, 0x10), 32);
    }
}
