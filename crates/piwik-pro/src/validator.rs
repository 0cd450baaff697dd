//! Input checks run before any call crosses into the native layer.

use crate::error::ValidationError;
use crate::types::{CommonEventOptions, EcommerceProduct, EventOptions, IdMap, ProfileAttribute};
use regex::Regex;
use std::sync::OnceLock;

/// Pattern a visitor ID must match.
pub const VISITOR_ID_PATTERN: &str = "^[0-9a-f]{16}$";

/// Maximum number of custom dimensions on a single ecommerce product.
pub const MAX_PRODUCT_CUSTOM_DIMENSIONS: usize = 20;

fn visitor_id_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(VISITOR_ID_PATTERN).expect("visitor id pattern is valid"))
}

/// Largest custom ID whose decimal form survives a round trip through a
/// double, 2^53 - 1.
pub const MAX_CUSTOM_ID: i64 = (1 << 53) - 1;

/// Exclusive magnitude bound of `i64`, as a double (2^63).
const I64_BOUND: f64 = 9_223_372_036_854_775_808.0;

/// Check that `value` is a whole number and return it.
///
/// NaN, the infinities and whole numbers outside the `i64` range are
/// rejected.
pub fn validate_int(value: f64) -> Result<i64, ValidationError> {
    if !value.is_finite() || value.fract() != 0.0 {
        return Err(ValidationError::NotAnInteger);
    }
    if value >= I64_BOUND || value < -I64_BOUND {
        return Err(ValidationError::NotAnInteger);
    }
    Ok(value as i64)
}

/// Leading-integer parse: optional leading whitespace, optional sign, then
/// decimal digits up to the first non-digit. `None` when no digit follows.
fn parse_leading_int(s: &str) -> Option<i64> {
    let s = s.trim_start();
    let (negative, rest) = match s.as_bytes().first() {
        Some(b'-') => (true, &s[1..]),
        Some(b'+') => (false, &s[1..]),
        _ => (false, s),
    };

    let digits_end = rest
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(rest.len());
    if digits_end == 0 {
        return None;
    }

    let magnitude: i64 = rest[..digits_end].parse().ok()?;
    Some(if negative { -magnitude } else { magnitude })
}

/// A key is canonical when parsing it and formatting the result back gives
/// the same string. Keys beyond [`MAX_CUSTOM_ID`] in magnitude never are,
/// since a double cannot hold them exactly.
fn canonical_id(key: &str) -> Option<i64> {
    parse_leading_int(key)
        .filter(|id| id.abs() <= MAX_CUSTOM_ID)
        .filter(|id| id.to_string() == key)
}

/// Check that every key of a dimension/variable map is a positive integer in
/// canonical decimal form. An absent map passes.
///
/// All keys are checked for integer form before any is checked for range, so
/// a map holding both a float key and a zero key reports the float.
pub fn validate_custom_key_value<V>(mapping: Option<&IdMap<V>>) -> Result<(), ValidationError> {
    let Some(mapping) = mapping else {
        return Ok(());
    };

    let mut ids = Vec::with_capacity(mapping.len());
    for key in mapping.keys() {
        ids.push(canonical_id(key).ok_or(ValidationError::KeyNotAnInteger)?);
    }

    if ids.into_iter().any(|id| id < 1) {
        return Err(ValidationError::KeyNotPositive);
    }

    Ok(())
}

/// Check the custom dimensions of every product.
pub fn validate_ecommerce_product_custom_key_value(
    products: &[EcommerceProduct],
) -> Result<(), ValidationError> {
    for product in products {
        let dimensions = product.custom_dimensions.as_ref();
        if dimensions.map_or(0, IdMap::len) > MAX_PRODUCT_CUSTOM_DIMENSIONS {
            return Err(ValidationError::TooManyProductDimensions);
        }
        validate_custom_key_value(dimensions)?;
    }
    Ok(())
}

/// Check that `id` is exactly 16 lowercase hex characters.
pub fn validate_visitor_id(id: &str) -> Result<(), ValidationError> {
    if visitor_id_regex().is_match(id) {
        Ok(())
    } else {
        Err(ValidationError::InvalidVisitorId(id.to_string()))
    }
}

/// Reject an empty list of profile attributes.
pub fn validate_profile_attributes(attributes: &[ProfileAttribute]) -> Result<(), ValidationError> {
    if attributes.is_empty() {
        return Err(ValidationError::EmptyProfileAttributes);
    }
    Ok(())
}

/// Check the dimension and variable maps shared by every option bag.
pub fn validate_common_options(options: &CommonEventOptions) -> Result<(), ValidationError> {
    validate_custom_key_value(options.custom_dimensions.as_ref())?;
    validate_custom_key_value(options.visit_custom_variables.as_ref())
}

/// [`validate_common_options`] on an optional bag.
pub(crate) fn validate_options<O: EventOptions>(options: Option<&O>) -> Result<(), ValidationError> {
    match options {
        Some(options) => validate_common_options(options.common()),
        None => Ok(()),
    }
}
