//! Odometer distance calculation
//!
//! Converts a pair of odometer readings into a trip distance. A reading that
//! goes backwards is either a meter rollover (when the meter's maximum is
//! configured) or an input error.

use serde::{Deserialize, Serialize};

use crate::types::{LogbookError, Result};

/// How to treat an end reading lower than the start reading
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, Default)]
pub enum OdometerPolicy {
    /// Backwards readings are input errors
    #[default]
    Strict,
    /// The meter wraps to 0 after `max` km
    Rollover { max: f64 },
}

impl OdometerPolicy {
    /// Policy from an optional configured meter maximum
    pub fn from_rollover_max(max: Option<f64>) -> Self {
        match max {
            Some(max) if max > 0.0 => Self::Rollover { max },
            _ => Self::Strict,
        }
    }
}

/// Trip distance in km, or `None` when not computable.
///
/// Not computable covers absent readings, negative readings, and a backwards
/// pair that the policy cannot explain. The result is never negative.
pub fn distance(start: Option<f64>, end: Option<f64>, policy: OdometerPolicy) -> Option<f64> {
    let (start, end) = (start?, end?);
    if !start.is_finite() || !end.is_finite() || start < 0.0 || end < 0.0 {
        return None;
    }

    if end >= start {
        return Some(end - start);
    }

    match policy {
        OdometerPolicy::Rollover { max } if start <= max && end <= max => Some((max - start) + end),
        _ => {
            tracing::warn!(start, end, "odometer reading went backwards; distance not computable");
            None
        }
    }
}

/// Validate a pair of readings before they are stored.
///
/// Absent readings are fine; negative readings and backwards pairs the policy
/// cannot explain are rejected.
pub fn validate(start: Option<f64>, end: Option<f64>, policy: OdometerPolicy) -> Result<()> {
    for (label, value) in [("start", start), ("end", end)] {
        if let Some(v) = value {
            if !v.is_finite() || v < 0.0 {
                return Err(LogbookError::validation(format!(
                    "{} odometer must be a non-negative number, got {}",
                    label, v
                )));
            }
            if let OdometerPolicy::Rollover { max } = policy {
                if v > max {
                    return Err(LogbookError::validation(format!(
                        "{} odometer {} exceeds meter maximum {}",
                        label, v, max
                    )));
                }
            }
        }
    }

    if let (Some(s), Some(e)) = (start, end) {
        if e < s && policy == OdometerPolicy::Strict {
            return Err(LogbookError::validation(format!(
                "end odometer {} is lower than start odometer {}",
                e, s
            )));
        }
    }

    Ok(())
}
