//! Seam to the vendor tracker.
//!
//! A platform binding implements [`NativeTracker`] by forwarding each method
//! to the vendor SDK's tracker object. Implementations own all tracker state
//! (configuration, event queue, initialization) and report failures through
//! [`NativeError`]; the [`PiwikPro`](crate::PiwikPro) facade passes those
//! errors on unchanged.

use crate::error::NativeError;
use crate::types::{
    CommonEventOptions, EcommerceOptions, EcommerceProduct, ProfileAttribute, ProfileAttributes,
    SessionHash, TrackCustomEventOptions, TrackEcommerceOptions, TrackEcommerceOrderOptions,
    TrackGoalOptions, TrackImpressionOptions, TrackInteractionOptions, TrackScreenOptions,
    TrackSearchOptions, TrackSocialInteractionOptions,
};

/// Result type for native tracker calls.
pub type NativeResult<T> = std::result::Result<T, NativeError>;

/// Positional interface of the native tracker module.
///
/// Durations are whole seconds.
#[async_trait::async_trait]
pub trait NativeTracker: Send + Sync {
    /// Create the tracker. Fails with [`NativeError::AlreadyInitialized`] on
    /// a second call.
    async fn init(&self, api_url: String, site_id: String) -> NativeResult<()>;

    // ============================================
    // TRACKING
    // ============================================

    async fn track_screen(
        &self,
        path: String,
        options: Option<TrackScreenOptions>,
    ) -> NativeResult<()>;

    async fn track_custom_event(
        &self,
        category: String,
        action: String,
        options: Option<TrackCustomEventOptions>,
    ) -> NativeResult<()>;

    async fn track_exception(
        &self,
        description: String,
        options: Option<CommonEventOptions>,
    ) -> NativeResult<()>;

    async fn track_social_interaction(
        &self,
        interaction: String,
        network: String,
        options: Option<TrackSocialInteractionOptions>,
    ) -> NativeResult<()>;

    async fn track_download(
        &self,
        url: String,
        options: Option<CommonEventOptions>,
    ) -> NativeResult<()>;

    async fn track_application_install(&self) -> NativeResult<()>;

    async fn track_application_update(&self) -> NativeResult<()>;

    async fn track_outlink(
        &self,
        url: String,
        options: Option<CommonEventOptions>,
    ) -> NativeResult<()>;

    async fn track_search(
        &self,
        keyword: String,
        options: Option<TrackSearchOptions>,
    ) -> NativeResult<()>;

    async fn track_impression(
        &self,
        content_name: String,
        options: Option<TrackImpressionOptions>,
    ) -> NativeResult<()>;

    async fn track_interaction(
        &self,
        content_name: String,
        interaction: String,
        options: Option<TrackInteractionOptions>,
    ) -> NativeResult<()>;

    async fn track_goal(&self, goal: String, options: Option<TrackGoalOptions>)
        -> NativeResult<()>;

    async fn track_campaign(&self, url: String) -> NativeResult<()>;

    // ============================================
    // ECOMMERCE
    // ============================================

    /// Legacy transaction. `grand_total` is in cents.
    async fn track_ecommerce(
        &self,
        order_id: String,
        grand_total: i64,
        options: Option<TrackEcommerceOptions>,
    ) -> NativeResult<()>;

    async fn track_ecommerce_product_detail_view(
        &self,
        products: Vec<EcommerceProduct>,
        options: Option<EcommerceOptions>,
    ) -> NativeResult<()>;

    async fn track_ecommerce_cart_update(
        &self,
        products: Vec<EcommerceProduct>,
        grand_total: String,
        options: Option<EcommerceOptions>,
    ) -> NativeResult<()>;

    async fn track_ecommerce_add_to_cart(
        &self,
        products: Vec<EcommerceProduct>,
        options: Option<EcommerceOptions>,
    ) -> NativeResult<()>;

    async fn track_ecommerce_remove_from_cart(
        &self,
        products: Vec<EcommerceProduct>,
        options: Option<EcommerceOptions>,
    ) -> NativeResult<()>;

    async fn track_ecommerce_order(
        &self,
        order_id: String,
        grand_total: String,
        products: Vec<EcommerceProduct>,
        options: Option<TrackEcommerceOrderOptions>,
    ) -> NativeResult<()>;

    // ============================================
    // AUDIENCE MANAGER
    // ============================================

    async fn track_profile_attributes(&self, attributes: Vec<ProfileAttribute>)
        -> NativeResult<()>;

    async fn get_profile_attributes(&self) -> NativeResult<ProfileAttributes>;

    async fn check_audience_membership(&self, audience_id: String) -> NativeResult<bool>;

    // ============================================
    // IDENTITY AND SESSION
    // ============================================

    async fn set_user_id(&self, user_id: String) -> NativeResult<()>;

    async fn get_user_id(&self) -> NativeResult<String>;

    async fn set_user_email(&self, email: String) -> NativeResult<()>;

    async fn get_user_email(&self) -> NativeResult<String>;

    async fn set_visitor_id(&self, visitor_id: String) -> NativeResult<()>;

    async fn get_visitor_id(&self) -> NativeResult<String>;

    async fn set_visitor_id_lifetime(&self, lifetime: i64) -> NativeResult<()>;

    /// Read the `pk_vid` query parameter of `deep_link` and adopt it as the
    /// visitor ID. Returns whether a visitor ID was found.
    async fn set_visitor_id_from_deep_link(&self, deep_link: String) -> NativeResult<bool>;

    async fn set_session_timeout(&self, timeout: i64) -> NativeResult<()>;

    async fn get_session_timeout(&self) -> NativeResult<i64>;

    async fn start_new_session(&self) -> NativeResult<()>;

    async fn set_session_hash(&self, session_hash: SessionHash) -> NativeResult<()>;

    async fn get_session_hash(&self) -> NativeResult<SessionHash>;

    async fn get_user_agent(&self) -> NativeResult<String>;

    // ============================================
    // DISPATCH AND PRIVACY
    // ============================================

    async fn dispatch(&self) -> NativeResult<()>;

    /// Zero dispatches immediately, a negative value disables automatic
    /// dispatch.
    async fn set_dispatch_interval(&self, interval: i64) -> NativeResult<()>;

    async fn get_dispatch_interval(&self) -> NativeResult<i64>;

    async fn set_include_default_custom_variables(&self, include: bool) -> NativeResult<()>;

    async fn get_include_default_custom_variables(&self) -> NativeResult<bool>;

    async fn set_anonymization_state(&self, enabled: bool) -> NativeResult<()>;

    async fn is_anonymization_on(&self) -> NativeResult<bool>;

    async fn set_opt_out(&self, opt_out: bool) -> NativeResult<()>;

    async fn get_opt_out(&self) -> NativeResult<bool>;

    async fn set_dry_run(&self, dry_run: bool) -> NativeResult<()>;

    async fn get_dry_run(&self) -> NativeResult<bool>;

    async fn set_prefixing(&self, enabled: bool) -> NativeResult<()>;

    async fn is_prefixing_on(&self) -> NativeResult<bool>;
}
