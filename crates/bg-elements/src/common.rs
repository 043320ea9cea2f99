//! Common helpers for element parameters.

use crate::error::{ElementError, ElementResult};
use crate::traits::Parameter;
use bg_core::numeric::{Real, ensure_finite, ensure_positive};
use bg_symbolic::Symbol;

/// Build the parameter symbol `<prefix>_<element>`.
pub fn parameter_symbol(prefix: &str, element: &str) -> Symbol {
    Symbol::new(format!("{prefix}_{element}"))
}

/// A strictly positive physical constant (resistance, capacitance, ratio...).
pub fn positive_parameter(
    prefix: &str,
    element: &str,
    value: Real,
    what: &'static str,
) -> ElementResult<Parameter> {
    let value = ensure_positive(value, what).map_err(|e| ElementError::InvalidParameter {
        element: element.to_string(),
        what: e.to_string(),
    })?;
    Ok(Parameter {
        symbol: parameter_symbol(prefix, element),
        value,
    })
}

/// A finite physical constant of either sign (thresholds, offsets).
pub fn finite_parameter(
    prefix: &str,
    element: &str,
    value: Real,
    what: &'static str,
) -> ElementResult<Parameter> {
    let value = ensure_finite(value, what).map_err(|e| ElementError::InvalidParameter {
        element: element.to_string(),
        what: e.to_string(),
    })?;
    Ok(Parameter {
        symbol: parameter_symbol(prefix, element),
        value,
    })
}
