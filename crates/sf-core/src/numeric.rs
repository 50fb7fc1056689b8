use crate::CoreError;

/// Floating point type used for all diagram coordinates.
pub type Real = f64;

pub fn ensure_finite(v: Real, what: &'static str) -> Result<Real, CoreError> {
    if v.is_finite() {
        Ok(v)
    } else {
        Err(CoreError::NonFinite { what, value: v })
    }
}

/// Round `v` to the nearest multiple of `step`.
///
/// A non-positive or non-finite step is rejected rather than silently
/// returning `v`.
pub fn snap(v: Real, step: Real) -> Result<Real, CoreError> {
    if !step.is_finite() || step <= 0.0 {
        return Err(CoreError::InvalidArg {
            what: "snap step must be positive and finite",
        });
    }
    Ok((v / step).round() * step)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ensure_finite_detects_nan() {
        let err = ensure_finite(Real::NAN, "test").unwrap_err();
        let msg = format!("{err}");
        assert!(msg.contains("Non-finite"));
    }

    #[test]
    fn snap_rounds_to_grid() {
        assert_eq!(snap(14.0, 10.0).unwrap(), 10.0);
        assert_eq!(snap(15.0, 10.0).unwrap(), 20.0);
        assert_eq!(snap(-26.0, 10.0).unwrap(), -30.0);
    }

    #[test]
    fn snap_rejects_zero_step() {
        assert!(snap(1.0, 0.0).is_err());
        assert!(snap(1.0, Real::NAN).is_err());
    }
}
