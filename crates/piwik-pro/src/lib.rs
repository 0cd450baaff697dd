//! Typed async bridge to the Piwik PRO native tracking SDK.
//!
//! [`PiwikPro`] exposes one async method per tracker capability. Each method
//! checks its input locally (custom dimension and variable IDs, visitor IDs,
//! whole-second intervals) and then forwards the call, unchanged, to a
//! [`NativeTracker`] binding. Nothing is retried or batched here; the native
//! tracker owns its event queue and dispatch.
//!
//! [`InMemoryTracker`] is a native binding that keeps all state in process,
//! for tests and for hosts without the vendor SDK.
//!
//! # Example
//!
//! ```rust,ignore
//! use piwik_pro::{EcommerceProduct, InMemoryTracker, PiwikPro, ProfileAttribute};
//! use std::sync::Arc;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), piwik_pro::Error> {
//!     let piwik = PiwikPro::new(Arc::new(InMemoryTracker::new()));
//!
//!     let config = PiwikPro::builder("https://example.piwik.pro", "site-id")
//!         .dispatch_interval(30)
//!         .build()?;
//!     piwik.configure(&config).await?;
//!
//!     piwik.track_custom_event("video", "play", None).await?;
//!     piwik
//!         .track_ecommerce_add_to_cart(
//!             vec![EcommerceProduct::new("craft-311").price("49.90").quantity(1)],
//!             None,
//!         )
//!         .await?;
//!     piwik
//!         .track_profile_attributes(ProfileAttribute::new("food", "pizza"))
//!         .await?;
//!
//!     piwik.dispatch().await?;
//!     Ok(())
//! }
//! ```

mod client;
mod config;
mod error;
mod marshal;
mod memory;
mod native;
pub mod types;
mod validator;

pub use client::PiwikPro;
pub use config::{TrackerConfig, TrackerConfigBuilder};
pub use error::{Error, NativeError, Result, ValidationError};
pub use marshal::{Dimension, NativeInvocation, ProductLine, Variable};
pub use memory::{Hit, InMemoryTracker, DEFAULT_DISPATCH_INTERVAL, DEFAULT_SESSION_TIMEOUT};
pub use native::{NativeResult, NativeTracker};
pub use types::{
    CommonEventOptions, CustomDimensions, CustomVariable, CustomVariables, EcommerceItem,
    EcommerceOptions, EcommerceProduct, EventOptions, IdMap, ProfileAttribute, ProfileAttributes,
    Seconds, SessionHash, TrackCustomEventOptions, TrackEcommerceOptions, TrackEcommerceOrderOptions,
    TrackGoalOptions, TrackImpressionOptions, TrackInteractionOptions, TrackProfileAttributes,
    TrackScreenOptions, TrackSearchOptions, TrackSocialInteractionOptions, VisitorId,
};
pub use validator::{
    validate_common_options, validate_custom_key_value,
    validate_ecommerce_product_custom_key_value, validate_int, validate_profile_attributes,
    validate_visitor_id, MAX_CUSTOM_ID, MAX_PRODUCT_CUSTOM_DIMENSIONS, VISITOR_ID_PATTERN,
};
