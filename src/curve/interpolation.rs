//! Rate interpolation between two curve anchors.
//!
//! Anchor and target positions are business days from the curve's reference
//! date, so every convention sees the same time axis.

use crate::core::daycount::{BUSINESS_DAYS_PER_YEAR, DAYS_PER_YEAR_360};
use crate::core::error::{CurveError, CurveResult};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Convention used to fill a rate between two known anchors.
///
/// Serialized by name; parsing is case-insensitive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum InterpolationMethod {
    /// Exponential ACT/252 carry, flat forward between anchors.
    FlatForward,
    /// Simple ACT/360 carry, flat forward between anchors.
    FlatForwardLinearConvention,
    /// Exponential ACT/360 carry, flat forward between anchors.
    Interpolation360,
    /// Market default: the anchor carries are blended geometrically, each
    /// compounded over the distance to the *other* anchor, and re-annualised
    /// over the anchor span. Not an arithmetic blend of the rates.
    #[default]
    Linear,
}

impl InterpolationMethod {
    pub const ALL: [InterpolationMethod; 4] = [
        InterpolationMethod::FlatForward,
        InterpolationMethod::FlatForwardLinearConvention,
        InterpolationMethod::Interpolation360,
        InterpolationMethod::Linear,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            Self::FlatForward => "FlatForward",
            Self::FlatForwardLinearConvention => "FlatForwardLinearConvention",
            Self::Interpolation360 => "Interpolation360",
            Self::Linear => "Linear",
        }
    }

    /// Rate at `target_bd`, given anchors at `prev_bd < next_bd`.
    ///
    /// `target_bd` must lie in `[prev_bd, next_bd]`; the endpoints return the
    /// anchor rates exactly.
    pub fn interpolate(
        &self,
        prev_rate: f64,
        next_rate: f64,
        prev_bd: i64,
        next_bd: i64,
        target_bd: i64,
    ) -> CurveResult<f64> {
        if prev_bd < 0 || next_bd <= prev_bd {
            return Err(CurveError::domain(format!(
                "anchors must satisfy 0 <= prev < next, got {prev_bd} and {next_bd}"
            )));
        }
        if target_bd < prev_bd || target_bd > next_bd {
            return Err(CurveError::domain(format!(
                "target {target_bd} lies outside anchors [{prev_bd}, {next_bd}]"
            )));
        }
        if target_bd == prev_bd {
            return Ok(prev_rate);
        }
        if target_bd == next_bd {
            return Ok(next_rate);
        }

        let (t0, t1, t) = (prev_bd as f64, next_bd as f64, target_bd as f64);
        let weight = (t - t0) / (t1 - t0);

        let rate = match self {
            Self::FlatForward => {
                let prev_carry = (1.0 + prev_rate).powf(t0 / BUSINESS_DAYS_PER_YEAR);
                let next_carry = (1.0 + next_rate).powf(t1 / BUSINESS_DAYS_PER_YEAR);
                let carry = prev_carry * (next_carry / prev_carry).powf(weight);
                carry.powf(BUSINESS_DAYS_PER_YEAR / t) - 1.0
            }
            Self::FlatForwardLinearConvention => {
                let prev_carry = 1.0 + prev_rate * t0 / DAYS_PER_YEAR_360;
                let next_carry = 1.0 + next_rate * t1 / DAYS_PER_YEAR_360;
                let carry = prev_carry * (next_carry / prev_carry).powf(weight);
                (carry - 1.0) * DAYS_PER_YEAR_360 / t
            }
            Self::Interpolation360 => {
                let prev_carry = (1.0 + prev_rate).powf(t0 / DAYS_PER_YEAR_360);
                let next_carry = (1.0 + next_rate).powf(t1 / DAYS_PER_YEAR_360);
                let carry = prev_carry * (next_carry / prev_carry).powf(weight);
                carry.powf(DAYS_PER_YEAR_360 / t) - 1.0
            }
            Self::Linear => {
                let since_prev = t - t0;
                let until_next = t1 - t;
                let prev_carry = (1.0 + prev_rate).powf(until_next / BUSINESS_DAYS_PER_YEAR);
                let next_carry = (1.0 + next_rate).powf(since_prev / BUSINESS_DAYS_PER_YEAR);
                (prev_carry * next_carry).powf(BUSINESS_DAYS_PER_YEAR / (t1 - t0)) - 1.0
            }
        };
        Ok(rate)
    }
}

/// Interpolate with a convention selected by name.
pub fn interpolate(
    prev_rate: f64,
    next_rate: f64,
    prev_bd: i64,
    next_bd: i64,
    target_bd: i64,
    convention: &str,
) -> CurveResult<f64> {
    convention
        .parse::<InterpolationMethod>()?
        .interpolate(prev_rate, next_rate, prev_bd, next_bd, target_bd)
}

impl fmt::Display for InterpolationMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for InterpolationMethod {
    type Err = CurveError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|m| m.name().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| CurveError::UnsupportedInterpolation {
                name: s.to_string(),
            })
    }
}

impl TryFrom<String> for InterpolationMethod {
    type Error = CurveError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<InterpolationMethod> for String {
    fn from(method: InterpolationMethod) -> Self {
        method.name().to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_endpoints_return_anchor_rates() {
        for method in InterpolationMethod::ALL {
            assert_eq!(method.interpolate(0.10, 0.12, 20, 80, 20).unwrap(), 0.10);
            assert_eq!(method.interpolate(0.10, 0.12, 20, 80, 80).unwrap(), 0.12);
        }
    }

    #[test]
    fn test_endpoint_limits_are_continuous() {
        for method in InterpolationMethod::ALL {
            let near_prev = method.interpolate(0.10, 0.12, 200, 2000, 201).unwrap();
            let near_next = method.interpolate(0.10, 0.12, 200, 2000, 1999).unwrap();
            assert!((near_prev - 0.10).abs() < 2e-3, "{method}: {near_prev}");
            assert!((near_next - 0.12).abs() < 2e-3, "{method}: {near_next}");
        }
    }

    #[test]
    fn test_linear_midpoint_is_geometric_mean() {
        let rate = InterpolationMethod::Linear
            .interpolate(0.10, 0.12, 0, 100, 50)
            .unwrap();
        assert_relative_eq!(rate, (1.10f64 * 1.12).sqrt() - 1.0, max_relative = 1e-12);
    }

    #[test]
    fn test_linear_depends_only_on_distances() {
        let a = InterpolationMethod::Linear
            .interpolate(0.10, 0.12, 0, 60, 15)
            .unwrap();
        let b = InterpolationMethod::Linear
            .interpolate(0.10, 0.12, 300, 360, 315)
            .unwrap();
        assert_relative_eq!(a, b, max_relative = 1e-12);
    }

    #[test]
    fn test_flat_forward_from_origin_is_flat() {
        // With the previous anchor at the origin the whole carry comes from
        // the next anchor.
        let rate = InterpolationMethod::FlatForward
            .interpolate(0.10, 0.12, 0, 100, 37)
            .unwrap();
        assert_relative_eq!(rate, 0.12, max_relative = 1e-12);

        let rate = InterpolationMethod::Interpolation360
            .interpolate(0.10, 0.12, 0, 100, 37)
            .unwrap();
        assert_relative_eq!(rate, 0.12, max_relative = 1e-12);
    }

    #[test]
    fn test_flat_forward_preserves_forward_rate() {
        let method = InterpolationMethod::FlatForward;
        let (r0, r1, t0, t1) = (0.10, 0.115, 60, 180);
        let forward = |t: i64, r: f64| (1.0 + r).powf(t as f64 / 252.0);
        let seg = (forward(t1, r1) / forward(t0, r0)).powf(252.0 / (t1 - t0) as f64);

        let mid = method.interpolate(r0, r1, t0, t1, 120).unwrap();
        let partial = (forward(120, mid) / forward(t0, r0)).powf(252.0 / 60.0);
        assert_relative_eq!(partial, seg, max_relative = 1e-10);
    }

    #[test]
    fn test_values_between_anchors() {
        for method in InterpolationMethod::ALL {
            let rate = method.interpolate(0.10, 0.12, 126, 252, 189).unwrap();
            assert!(rate > 0.10 && rate < 0.13, "{method}: {rate}");
        }
    }

    #[test]
    fn test_invalid_positions() {
        let m = InterpolationMethod::Linear;
        assert!(matches!(
            m.interpolate(0.1, 0.1, 50, 50, 50),
            Err(CurveError::DomainError { .. })
        ));
        assert!(matches!(
            m.interpolate(0.1, 0.1, 10, 50, 60),
            Err(CurveError::DomainError { .. })
        ));
        assert!(m.interpolate(0.1, 0.1, -1, 50, 20).is_err());
    }

    #[test]
    fn test_parse_by_name() {
        assert_eq!(
            "FlatForward".parse::<InterpolationMethod>().unwrap(),
            InterpolationMethod::FlatForward
        );
        assert_eq!(
            "linear".parse::<InterpolationMethod>().unwrap(),
            InterpolationMethod::Linear
        );
        assert!(matches!(
            "CubicSpline".parse::<InterpolationMethod>(),
            Err(CurveError::UnsupportedInterpolation { .. })
        ));
        assert!(matches!(
            interpolate(0.1, 0.12, 0, 10, 5, "Nelson"),
            Err(CurveError::UnsupportedInterpolation { .. })
        ));
    }

    #[test]
    fn test_serde_by_name() {
        let method: InterpolationMethod = serde_json::from_str(r#""flatforward""#).unwrap();
        assert_eq!(method, InterpolationMethod::FlatForward);
        assert_eq!(
            serde_json::to_string(&InterpolationMethod::Interpolation360).unwrap(),
            r#""Interpolation360""#
        );
        assert!(serde_json::from_str::<InterpolationMethod>(r#""CubicSpline""#).is_err());
    }

    #[test]
    fn test_default_is_linear() {
        assert_eq!(InterpolationMethod::default(), InterpolationMethod::Linear);
    }
}
