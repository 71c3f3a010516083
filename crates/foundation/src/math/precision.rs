//! Deterministic float handling.
//!
//! Interval search and clamping compare `f64` seconds; NaN and `-0.0` must not
//! make those comparisons order-dependent.

use core::cmp::Ordering;

/// Canonicalize a floating-point value for deterministic ordering.
///
/// Rules:
/// - `-0.0` becomes `0.0`
/// - all NaNs become a single canonical NaN
pub fn canonical_f64(v: f64) -> f64 {
    if v == 0.0 {
        0.0
    } else if v.is_nan() {
        f64::NAN
    } else {
        v
    }
}

/// Deterministic total ordering for floats. NaN sorts after every number.
pub fn stable_total_cmp_f64(a: f64, b: f64) -> Ordering {
    canonical_f64(a).total_cmp(&canonical_f64(b))
}

/// Clamp an opacity-like value into `[0, 1]`; NaN becomes `0`.
pub fn unit_interval_f32(v: f32) -> f32 {
    if v.is_nan() { 0.0 } else { v.clamp(0.0, 1.0) }
}

#[cfg(test)]
mod tests {
    use super::{canonical_f64, stable_total_cmp_f64, unit_interval_f32};
    use core::cmp::Ordering;

    #[test]
    fn canonicalizes_negative_zero() {
        assert_eq!(canonical_f64(-0.0).to_bits(), 0.0f64.to_bits());
        assert_eq!(stable_total_cmp_f64(-0.0, 0.0), Ordering::Equal);
    }

    #[test]
    fn nan_sorts_last() {
        assert_eq!(stable_total_cmp_f64(1.0, 2.0), Ordering::Less);
        assert_eq!(stable_total_cmp_f64(f64::NAN, f64::NAN), Ordering::Equal);
        assert_eq!(stable_total_cmp_f64(f64::NAN, f64::INFINITY), Ordering::Greater);
    }

    #[test]
    fn unit_interval_clamps() {
        assert_eq!(unit_interval_f32(1.5), 1.0);
        assert_eq!(unit_interval_f32(-0.2), 0.0);
        assert_eq!(unit_interval_f32(f32::NAN), 0.0);
        assert_eq!(unit_interval_f32(0.6), 0.6);
    }
}
