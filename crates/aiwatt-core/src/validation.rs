//! Input checks shared by the calculation stages.

use crate::errors::{CalcResult, ImpactError};
use crate::FloatValue;

/// Checks that `value` is finite and strictly positive.
pub(crate) fn require_positive(field: &str, value: FloatValue) -> CalcResult<FloatValue> {
    if value.is_finite() && value > 0.0 {
        Ok(value)
    } else {
        Err(ImpactError::InvalidInput {
            field: field.to_string(),
            value,
        })
    }
}

/// Like [`require_positive`], but an absent value is allowed.
///
/// Only omission means "not supplied": an explicit zero is still rejected.
pub(crate) fn require_positive_opt(
    field: &str,
    value: Option<FloatValue>,
) -> CalcResult<Option<FloatValue>> {
    value.map(|v| require_positive(field, v)).transpose()
}

pub(crate) fn clamp(value: FloatValue, (lower, upper): (FloatValue, FloatValue)) -> FloatValue {
    value.max(lower).min(upper)
}
