//! Flattening of option bags into the shapes native trackers consume.

use crate::error::NativeError;
use crate::types::{CommonEventOptions, CustomDimensions, CustomVariables, EcommerceProduct};
use serde::Serialize;
use serde_json::Value;

/// One call into a native tracker with its positional arguments.
#[derive(Debug, Clone, PartialEq)]
pub struct NativeInvocation {
    /// Method name as exposed by the native module (camelCase).
    pub method: &'static str,
    /// Positional arguments. An absent option bag is `null`.
    pub args: Vec<Value>,
}

impl NativeInvocation {
    pub fn new(method: &'static str, args: Vec<Value>) -> Self {
        Self { method, args }
    }
}

/// Serialize one positional argument.
pub fn to_arg<T: Serialize + ?Sized>(value: &T) -> Result<Value, NativeError> {
    serde_json::to_value(value).map_err(|e| NativeError::InvalidArgument(e.to_string()))
}

/// Custom dimension as passed to the tracker.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Dimension {
    pub id: u64,
    pub value: String,
}

/// Custom variable as passed to the tracker.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Variable {
    pub id: u64,
    pub name: String,
    pub value: String,
}

/// Product line as passed to the tracker.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProductLine {
    pub sku: String,
    pub name: Option<String>,
    pub category: Vec<String>,
    pub price: Option<String>,
    pub quantity: Option<i64>,
    pub brand: Option<String>,
    pub variant: Option<String>,
    pub dimensions: Vec<Dimension>,
}

fn parse_id(key: &str) -> Result<u64, NativeError> {
    key.parse()
        .map_err(|_| NativeError::InvalidArgument(format!("custom ID {key} is not an integer")))
}

/// Dimensions ordered by ID.
pub fn dimensions(mapping: Option<&CustomDimensions>) -> Result<Vec<Dimension>, NativeError> {
    let Some(mapping) = mapping else {
        return Ok(Vec::new());
    };

    let mut out = mapping
        .iter()
        .map(|(key, value)| {
            Ok(Dimension {
                id: parse_id(key)?,
                value: value.clone(),
            })
        })
        .collect::<Result<Vec<_>, NativeError>>()?;
    out.sort_by_key(|d| d.id);
    Ok(out)
}

/// Variables ordered by ID.
pub fn variables(mapping: Option<&CustomVariables>) -> Result<Vec<Variable>, NativeError> {
    let Some(mapping) = mapping else {
        return Ok(Vec::new());
    };

    let mut out = mapping
        .iter()
        .map(|(key, var)| {
            Ok(Variable {
                id: parse_id(key)?,
                name: var.name.clone(),
                value: var.value.clone(),
            })
        })
        .collect::<Result<Vec<_>, NativeError>>()?;
    out.sort_by_key(|v| v.id);
    Ok(out)
}

/// Dimensions and visit variables of a common option bag.
pub fn common(
    options: Option<&CommonEventOptions>,
) -> Result<(Vec<Dimension>, Vec<Variable>), NativeError> {
    let dims = dimensions(options.and_then(|o| o.custom_dimensions.as_ref()))?;
    let vars = variables(options.and_then(|o| o.visit_custom_variables.as_ref()))?;
    Ok((dims, vars))
}

pub fn products(products: &[EcommerceProduct]) -> Result<Vec<ProductLine>, NativeError> {
    products
        .iter()
        .map(|p| {
            Ok(ProductLine {
                sku: p.sku.clone(),
                name: p.name.clone(),
                category: p.category.clone().unwrap_or_default(),
                price: p.price.clone(),
                quantity: p.quantity,
                brand: p.brand.clone(),
                variant: p.variant.clone(),
                dimensions: dimensions(p.custom_dimensions.as_ref())?,
            })
        })
        .collect()
}
