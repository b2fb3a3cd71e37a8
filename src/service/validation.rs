//! Request validation against the resource descriptor.

use crate::config::{FieldKind, ResolvedResource};
use crate::error::AppError;
use crate::service::normalize::Values;
use serde_json::Value;

pub struct RequestValidator;

impl RequestValidator {
    /// The required field must be a non-blank string; text fields must fit their column and
    /// decimals must fit their declared precision.
    pub fn validate(resource: &ResolvedResource, values: &Values) -> Result<(), AppError> {
        let required = values.get(&resource.required);
        let present = matches!(required, Some(Value::String(s)) if !s.trim().is_empty());
        if !present {
            return Err(AppError::Validation(format!("missing required field: {}", resource.required)));
        }
        for f in &resource.fields {
            if let (Some(max), Some(Value::String(s))) = (f.max_length, values.get(&f.name)) {
                if s.chars().count() > max as usize {
                    return Err(AppError::Validation(format!(
                        "{} must be at most {} characters",
                        f.name, max
                    )));
                }
            }
            if let (FieldKind::Decimal, Some((precision, scale))) = (f.kind, f.precision) {
                let Some(n) = values.get(&f.name).and_then(Value::as_f64) else { continue };
                if !fits_numeric(n, precision, scale) {
                    return Err(AppError::Validation(format!(
                        "{} must have at most {} digits before the decimal point",
                        f.name,
                        precision.saturating_sub(scale)
                    )));
                }
            }
        }
        Ok(())
    }
}

/// Whether `n`, rounded to `scale` places, fits `numeric(precision, scale)`.
fn fits_numeric(n: f64, precision: u32, scale: u32) -> bool {
    let int_digits = precision.saturating_sub(scale) as i32;
    let factor = 10f64.powi(scale as i32);
    let rounded = (n * factor).round() / factor;
    rounded.abs() < 10f64.powi(int_digits)
}
