use fixed::types::I32F32;

/// Q32.32 fixed-point: 32 integer bits, 32 fractional bits. Used wherever a
/// value feeds the score or a random draw, so results do not depend on
/// platform float rounding.
pub type Fixed64 = I32F32;

/// Ticks are the atomic unit of simulation time.
pub type Ticks = u64;

/// Convert an f64 to Fixed64. Use only for initialization and config.
#[inline]
pub fn f64_to_fixed64(v: f64) -> Fixed64 {
    Fixed64::from_num(v)
}

/// Convert Fixed64 to f64. Use only for display.
#[inline]
pub fn fixed64_to_f64(v: Fixed64) -> f64 {
    v.to_num::<f64>()
}

/// Exact ratio of two integers, or `None` when the denominator is zero.
#[inline]
pub fn ratio(numerator: i64, denominator: i64) -> Option<Fixed64> {
    Fixed64::checked_from_num(numerator)?.checked_div(Fixed64::checked_from_num(denominator)?)
}

/// Clamp into `[lo, hi]`.
#[inline]
pub fn clamp(v: Fixed64, lo: Fixed64, hi: Fixed64) -> Fixed64 {
    v.max(lo).min(hi)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fixed64_basic_arithmetic() {
        let a = f64_to_fixed64(1.5);
        let b = f64_to_fixed64(2.0);
        assert_eq!(fixed64_to_f64(a + b), 3.5);
        assert_eq!(fixed64_to_f64(a * b), 3.0);
    }

    #[test]
    fn ratio_divides_and_rejects_zero() {
        assert_eq!(ratio(3, 4), Some(f64_to_fixed64(0.75)));
        assert_eq!(ratio(-5, 2), Some(f64_to_fixed64(-2.5)));
        assert_eq!(ratio(1, 0), None);
    }

    #[test]
    fn clamp_bounds() {
        let lo = f64_to_fixed64(-0.5);
        let hi = f64_to_fixed64(0.75);
        assert_eq!(clamp(f64_to_fixed64(3.0), lo, hi), hi);
        assert_eq!(clamp(f64_to_fixed64(-1.0), lo, hi), lo);
        assert_eq!(clamp(f64_to_fixed64(0.25), lo, hi), f64_to_fixed64(0.25));
    }

    #[test]
    fn fixed64_determinism() {
        let a = f64_to_fixed64(1.0 / 3.0);
        let b = f64_to_fixed64(1.0 / 3.0);
        assert_eq!(a * f64_to_fixed64(3.0), b * f64_to_fixed64(3.0));
    }
}
