//! Option bags and value types passed through the bridge.
//!
//! Every type serializes with the camelCase keys the native modules read.

use crate::error::ValidationError;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::collections::{BTreeMap, HashMap};
use std::fmt;

/// Mapping keyed by custom dimension / variable ID.
///
/// Keys are kept in the string form the embedding runtime supplies them in,
/// so that malformed IDs (`"1.2"`, `"0"`, `"01"`) can be rejected by
/// [`validate_custom_key_value`](crate::validate_custom_key_value) instead of
/// being silently coerced.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct IdMap<V>(BTreeMap<String, V>);

/// Custom dimension ID to value.
pub type CustomDimensions = IdMap<String>;

/// Custom variable ID to name/value pair.
pub type CustomVariables = IdMap<CustomVariable>;

impl<V> Default for IdMap<V> {
    fn default() -> Self {
        Self(BTreeMap::new())
    }
}

impl<V> IdMap<V> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert an entry. The ID is stored in its `Display` form.
    pub fn insert(&mut self, id: impl ToString, value: impl Into<V>) -> Option<V> {
        self.0.insert(id.to_string(), value.into())
    }

    pub fn get(&self, id: &str) -> Option<&V> {
        self.0.get(id)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &V)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v))
    }
}

impl<K: ToString, V, T: Into<V>> FromIterator<(K, T)> for IdMap<V> {
    fn from_iter<I: IntoIterator<Item = (K, T)>>(iter: I) -> Self {
        Self(
            iter.into_iter()
                .map(|(k, v)| (k.to_string(), v.into()))
                .collect(),
        )
    }
}

/// Named custom variable.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CustomVariable {
    pub name: String,
    pub value: String,
}

impl CustomVariable {
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
        }
    }
}

impl<N: Into<String>, V: Into<String>> From<(N, V)> for CustomVariable {
    fn from((name, value): (N, V)) -> Self {
        Self::new(name, value)
    }
}

/// Options every tracking call accepts.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CommonEventOptions {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub custom_dimensions: Option<CustomDimensions>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub visit_custom_variables: Option<CustomVariables>,
}

/// Access to the common part of an option bag, with fluent setters.
pub trait EventOptions: Sized {
    fn common(&self) -> &CommonEventOptions;

    fn common_mut(&mut self) -> &mut CommonEventOptions;

    /// Add a custom dimension.
    fn custom_dimension(mut self, id: impl ToString, value: impl Into<String>) -> Self {
        self.common_mut()
            .custom_dimensions
            .get_or_insert_with(IdMap::new)
            .insert(id, value);
        self
    }

    /// Add a visit-scoped custom variable.
    fn visit_custom_variable(
        mut self,
        id: impl ToString,
        name: impl Into<String>,
        value: impl Into<String>,
    ) -> Self {
        self.common_mut()
            .visit_custom_variables
            .get_or_insert_with(IdMap::new)
            .insert(id, CustomVariable::new(name, value));
        self
    }
}

impl EventOptions for CommonEventOptions {
    fn common(&self) -> &CommonEventOptions {
        self
    }

    fn common_mut(&mut self) -> &mut CommonEventOptions {
        self
    }
}

macro_rules! impl_event_options {
    ($($ty:ty),* $(,)?) => {
        $(
            impl EventOptions for $ty {
                fn common(&self) -> &CommonEventOptions {
                    &self.common
                }

                fn common_mut(&mut self) -> &mut CommonEventOptions {
                    &mut self.common
                }
            }
        )*
    };
}

impl_event_options!(
    TrackScreenOptions,
    TrackCustomEventOptions,
    TrackSocialInteractionOptions,
    TrackSearchOptions,
    TrackImpressionOptions,
    TrackInteractionOptions,
    TrackGoalOptions,
    EcommerceOptions,
    TrackEcommerceOptions,
    TrackEcommerceOrderOptions,
);

/// Screen view options.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TrackScreenOptions {
    #[serde(flatten)]
    pub common: CommonEventOptions,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub screen_custom_variables: Option<CustomVariables>,
}

impl TrackScreenOptions {
    pub fn title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    /// Add a screen-scoped custom variable.
    pub fn screen_custom_variable(
        mut self,
        id: impl ToString,
        name: impl Into<String>,
        value: impl Into<String>,
    ) -> Self {
        self.screen_custom_variables
            .get_or_insert_with(IdMap::new)
            .insert(id, CustomVariable::new(name, value));
        self
    }
}

/// Custom event options.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TrackCustomEventOptions {
    #[serde(flatten)]
    pub common: CommonEventOptions,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,
}

impl TrackCustomEventOptions {
    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn value(mut self, value: f64) -> Self {
        self.value = Some(value);
        self
    }

    pub fn path(mut self, path: impl Into<String>) -> Self {
        self.path = Some(path.into());
        self
    }
}

/// Social interaction options.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TrackSocialInteractionOptions {
    #[serde(flatten)]
    pub common: CommonEventOptions,
}

/// Search options.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TrackSearchOptions {
    #[serde(flatten)]
    pub common: CommonEventOptions,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub count: Option<i64>,
}

/// Content impression options.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TrackImpressionOptions {
    #[serde(flatten)]
    pub common: CommonEventOptions,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub piece: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target: Option<String>,
}

/// Content interaction options.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TrackInteractionOptions {
    #[serde(flatten)]
    pub common: CommonEventOptions,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub piece: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target: Option<String>,
}

/// Goal conversion options.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TrackGoalOptions {
    #[serde(flatten)]
    pub common: CommonEventOptions,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub revenue: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub currency_code: Option<String>,
}

impl TrackGoalOptions {
    pub fn revenue(mut self, revenue: f64) -> Self {
        self.revenue = Some(revenue);
        self
    }

    pub fn currency_code(mut self, code: impl Into<String>) -> Self {
        self.currency_code = Some(code.into());
        self
    }
}

/// Options for product detail view and cart events.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EcommerceOptions {
    #[serde(flatten)]
    pub common: CommonEventOptions,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub currency_code: Option<String>,
}

/// Line item of a legacy ecommerce transaction. Prices are in cents.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EcommerceItem {
    pub sku: String,
    pub name: String,
    pub category: String,
    pub price: i64,
    pub quantity: i64,
}

/// Legacy ecommerce transaction options. Amounts are in cents.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TrackEcommerceOptions {
    #[serde(flatten)]
    pub common: CommonEventOptions,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sub_total: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tax: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub shipping: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub discount: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub items: Option<Vec<EcommerceItem>>,
}

/// Product in an ecommerce event.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EcommerceProduct {
    pub sku: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Category path, most general first.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<Vec<String>>,
    /// Decimal string, e.g. `"1001.25"`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub price: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub quantity: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub brand: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub variant: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub custom_dimensions: Option<CustomDimensions>,
}

impl EcommerceProduct {
    pub fn new(sku: impl Into<String>) -> Self {
        Self {
            sku: sku.into(),
            ..Default::default()
        }
    }

    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn category<I, S>(mut self, path: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.category = Some(path.into_iter().map(Into::into).collect());
        self
    }

    pub fn price(mut self, price: impl Into<String>) -> Self {
        self.price = Some(price.into());
        self
    }

    pub fn quantity(mut self, quantity: i64) -> Self {
        self.quantity = Some(quantity);
        self
    }

    pub fn brand(mut self, brand: impl Into<String>) -> Self {
        self.brand = Some(brand.into());
        self
    }

    pub fn variant(mut self, variant: impl Into<String>) -> Self {
        self.variant = Some(variant.into());
        self
    }

    pub fn custom_dimension(mut self, id: impl ToString, value: impl Into<String>) -> Self {
        self.custom_dimensions
            .get_or_insert_with(IdMap::new)
            .insert(id, value);
        self
    }
}

/// Ecommerce order options. Amounts are decimal strings.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TrackEcommerceOrderOptions {
    #[serde(flatten)]
    pub common: CommonEventOptions,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sub_total: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tax: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub shipping: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub discount: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub currency_code: Option<String>,
}

/// Profile attributes returned by the audience manager.
pub type ProfileAttributes = HashMap<String, String>;

/// Single profile attribute.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProfileAttribute {
    pub name: String,
    pub value: String,
}

impl ProfileAttribute {
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
        }
    }
}

/// One profile attribute or an ordered list of them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum TrackProfileAttributes {
    Single(ProfileAttribute),
    Many(Vec<ProfileAttribute>),
}

impl TrackProfileAttributes {
    /// Normalize to a list; a single attribute becomes a one-element list.
    pub fn into_vec(self) -> Vec<ProfileAttribute> {
        match self {
            TrackProfileAttributes::Single(attr) => vec![attr],
            TrackProfileAttributes::Many(attrs) => attrs,
        }
    }
}

impl From<ProfileAttribute> for TrackProfileAttributes {
    fn from(attr: ProfileAttribute) -> Self {
        TrackProfileAttributes::Single(attr)
    }
}

impl From<Vec<ProfileAttribute>> for TrackProfileAttributes {
    fn from(attrs: Vec<ProfileAttribute>) -> Self {
        TrackProfileAttributes::Many(attrs)
    }
}

/// Whether the session hash parameter is sent with requests.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum SessionHash {
    Disabled = 0,
    Enabled = 1,
    #[default]
    NotSet = 2,
}

impl SessionHash {
    pub fn as_u8(self) -> u8 {
        self as u8
    }
}

impl TryFrom<u8> for SessionHash {
    type Error = u8;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(SessionHash::Disabled),
            1 => Ok(SessionHash::Enabled),
            2 => Ok(SessionHash::NotSet),
            other => Err(other),
        }
    }
}

impl Serialize for SessionHash {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u8(self.as_u8())
    }
}

impl<'de> Deserialize<'de> for SessionHash {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = u8::deserialize(deserializer)?;
        SessionHash::try_from(raw)
            .map_err(|v| serde::de::Error::custom(format!("invalid session hash value {v}")))
    }
}

/// Whole-second duration argument.
///
/// Integers pass through when they fit in `i64`; floats must have no
/// fractional part.
pub trait Seconds {
    fn into_seconds(self) -> Result<i64, ValidationError>;
}

impl Seconds for f64 {
    fn into_seconds(self) -> Result<i64, ValidationError> {
        crate::validator::validate_int(self)
    }
}

impl Seconds for f32 {
    fn into_seconds(self) -> Result<i64, ValidationError> {
        crate::validator::validate_int(f64::from(self))
    }
}

macro_rules! impl_integer_seconds {
    ($($ty:ty),* $(,)?) => {
        $(
            impl Seconds for $ty {
                fn into_seconds(self) -> Result<i64, ValidationError> {
                    i64::try_from(self).map_err(|_| ValidationError::NotAnInteger)
                }
            }
        )*
    };
}

impl_integer_seconds!(i8, i16, i32, i64, isize, u8, u16, u32, u64, usize);

/// Validated visitor ID: 16 lowercase hex characters.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct VisitorId(String);

impl VisitorId {
    pub fn parse(id: impl Into<String>) -> Result<Self, ValidationError> {
        let id = id.into();
        crate::validator::validate_visitor_id(&id)?;
        Ok(Self(id))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for VisitorId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<VisitorId> for String {
    fn from(id: VisitorId) -> String {
        id.0
    }
}
