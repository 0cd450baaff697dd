//! Piwik PRO bridge facade.

use crate::config::{TrackerConfig, TrackerConfigBuilder};
use crate::error::{Error, Result, ValidationError};
use crate::native::NativeTracker;
use crate::types::{
    CommonEventOptions, EcommerceOptions, EcommerceProduct, ProfileAttributes, Seconds,
    SessionHash, TrackCustomEventOptions, TrackEcommerceOptions, TrackEcommerceOrderOptions, TrackGoalOptions,
    TrackImpressionOptions, TrackInteractionOptions, TrackProfileAttributes, TrackScreenOptions,
    TrackSearchOptions, TrackSocialInteractionOptions,
};
use crate::validator::{
    validate_custom_key_value, validate_ecommerce_product_custom_key_value, validate_options,
    validate_profile_attributes, validate_visitor_id,
};
use std::sync::Arc;
use tracing::{debug, info, instrument, warn};

/// Log and convert a local validation failure.
fn check<T>(result: std::result::Result<T, ValidationError>) -> Result<T> {
    result.map_err(|e| {
        warn!(error = %e, "rejected before native call");
        Error::Validation(e)
    })
}

/// Typed async facade over a [`NativeTracker`].
///
/// Each method validates its input, then forwards it to the native tracker
/// exactly once. Native rejections are returned unchanged as
/// [`Error::Native`]; local validation failures as [`Error::Validation`], in
/// which case the native tracker is not called at all.
///
/// # Example
///
/// ```rust,no_run
/// use piwik_pro::{EventOptions, InMemoryTracker, PiwikPro, TrackScreenOptions};
/// use std::sync::Arc;
///
/// # async fn example() -> Result<(), piwik_pro::Error> {
/// let piwik = PiwikPro::new(Arc::new(InMemoryTracker::new()));
/// piwik.init("https://example.piwik.pro", "site-id").await?;
///
/// piwik
///     .track_screen(
///         "main/settings",
///         Some(TrackScreenOptions::default().title("Settings").custom_dimension(1, "dark")),
///     )
///     .await?;
/// piwik.set_dispatch_interval(10).await?;
/// piwik.dispatch().await?;
/// # Ok(())
/// # }
/// ```
#[derive(Clone)]
pub struct PiwikPro {
    native: Arc<dyn NativeTracker>,
}

impl std::fmt::Debug for PiwikPro {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PiwikPro").finish_non_exhaustive()
    }
}

impl PiwikPro {
    /// Wrap a native tracker binding.
    pub fn new(native: Arc<dyn NativeTracker>) -> Self {
        Self { native }
    }

    /// Create a configuration builder for the given server and site.
    pub fn builder(api_url: impl Into<String>, site_id: impl Into<String>) -> TrackerConfigBuilder {
        TrackerConfigBuilder::new(api_url, site_id)
    }

    /// Get the underlying native tracker.
    pub fn native(&self) -> &Arc<dyn NativeTracker> {
        &self.native
    }

    // ============================================
    // LIFECYCLE
    // ============================================

    /// Initialize the native tracker.
    ///
    /// Call once per process. A second call is rejected by the native tracker.
    #[instrument(skip_all)]
    pub async fn init(&self, api_url: impl Into<String>, site_id: impl Into<String>) -> Result<()> {
        let api_url = api_url.into();
        let site_id = site_id.into();
        info!(api_url = %api_url, site_id = %site_id, "initializing tracker");
        Ok(self.native.init(api_url, site_id).await?)
    }

    /// Initialize the tracker and apply every setting present in `config`.
    ///
    /// Settings are applied in a fixed order; the first failure stops the
    /// sequence and is returned.
    #[instrument(skip_all)]
    pub async fn configure(&self, config: &TrackerConfig) -> Result<()> {
        self.init(config.api_url(), config.site_id()).await?;

        if let Some(hash) = config.session_hash() {
            self.set_session_hash(hash).await?;
        }
        if let Some(interval) = config.dispatch_interval() {
            self.set_dispatch_interval(interval).await?;
        }
        if let Some(timeout) = config.session_timeout() {
            self.set_session_timeout(timeout).await?;
        }
        if let Some(lifetime) = config.visitor_id_lifetime() {
            self.set_visitor_id_lifetime(lifetime).await?;
        }
        if let Some(include) = config.include_default_custom_variables() {
            self.set_include_default_custom_variables(include).await?;
        }
        if let Some(enabled) = config.anonymization() {
            self.set_anonymization_state(enabled).await?;
        }
        if let Some(opt_out) = config.opt_out() {
            self.set_opt_out(opt_out).await?;
        }
        if let Some(dry_run) = config.dry_run() {
            self.set_dry_run(dry_run).await?;
        }
        if let Some(enabled) = config.prefixing() {
            self.set_prefixing(enabled).await?;
        }

        info!("tracker configured");
        Ok(())
    }

    // ============================================
    // TRACKING
    // ============================================

    /// Track a screen view.
    #[instrument(skip_all)]
    pub async fn track_screen(
        &self,
        path: impl Into<String>,
        options: Option<TrackScreenOptions>,
    ) -> Result<()> {
        check(validate_options(options.as_ref()))?;
        check(validate_custom_key_value(
            options
                .as_ref()
                .and_then(|o| o.screen_custom_variables.as_ref()),
        ))?;

        let path = path.into();
        debug!(path = %path, "tracking screen");
        Ok(self.native.track_screen(path, options).await?)
    }

    /// Track a custom event.
    #[instrument(skip_all)]
    pub async fn track_custom_event(
        &self,
        category: impl Into<String>,
        action: impl Into<String>,
        options: Option<TrackCustomEventOptions>,
    ) -> Result<()> {
        check(validate_options(options.as_ref()))?;

        let category = category.into();
        let action = action.into();
        debug!(category = %category, action = %action, "tracking custom event");
        Ok(self
            .native
            .track_custom_event(category, action, options)
            .await?)
    }

    /// Track an exception.
    #[instrument(skip_all)]
    pub async fn track_exception(
        &self,
        description: impl Into<String>,
        options: Option<CommonEventOptions>,
    ) -> Result<()> {
        check(validate_options(options.as_ref()))?;

        debug!("tracking exception");
        Ok(self
            .native
            .track_exception(description.into(), options)
            .await?)
    }

    /// Track a social interaction.
    #[instrument(skip_all)]
    pub async fn track_social_interaction(
        &self,
        interaction: impl Into<String>,
        network: impl Into<String>,
        options: Option<TrackSocialInteractionOptions>,
    ) -> Result<()> {
        check(validate_options(options.as_ref()))?;

        let interaction = interaction.into();
        let network = network.into();
        debug!(interaction = %interaction, network = %network, "tracking social interaction");
        Ok(self
            .native
            .track_social_interaction(interaction, network, options)
            .await?)
    }

    /// Track a download.
    #[instrument(skip_all)]
    pub async fn track_download(
        &self,
        url: impl Into<String>,
        options: Option<CommonEventOptions>,
    ) -> Result<()> {
        check(validate_options(options.as_ref()))?;

        let url = url.into();
        debug!(url = %url, "tracking download");
        Ok(self.native.track_download(url, options).await?)
    }

    /// Track the application install. Sent once per installation.
    #[instrument(skip_all)]
    pub async fn track_application_install(&self) -> Result<()> {
        debug!("tracking application install");
        Ok(self.native.track_application_install().await?)
    }

    /// Track an application update. Sent once per app version.
    #[instrument(skip_all)]
    pub async fn track_application_update(&self) -> Result<()> {
        debug!("tracking application update");
        Ok(self.native.track_application_update().await?)
    }

    /// Track an outlink.
    #[instrument(skip_all)]
    pub async fn track_outlink(
        &self,
        url: impl Into<String>,
        options: Option<CommonEventOptions>,
    ) -> Result<()> {
        check(validate_options(options.as_ref()))?;

        let url = url.into();
        debug!(url = %url, "tracking outlink");
        Ok(self.native.track_outlink(url, options).await?)
    }

    /// Track a search.
    #[instrument(skip_all)]
    pub async fn track_search(
        &self,
        keyword: impl Into<String>,
        options: Option<TrackSearchOptions>,
    ) -> Result<()> {
        check(validate_options(options.as_ref()))?;

        let keyword = keyword.into();
        debug!(keyword = %keyword, "tracking search");
        Ok(self.native.track_search(keyword, options).await?)
    }

    /// Track a content impression.
    #[instrument(skip_all)]
    pub async fn track_impression(
        &self,
        content_name: impl Into<String>,
        options: Option<TrackImpressionOptions>,
    ) -> Result<()> {
        check(validate_options(options.as_ref()))?;

        let content_name = content_name.into();
        debug!(content_name = %content_name, "tracking impression");
        Ok(self
            .native
            .track_impression(content_name, options)
            .await?)
    }

    /// Track a content interaction.
    #[instrument(skip_all)]
    pub async fn track_interaction(
        &self,
        content_name: impl Into<String>,
        interaction: impl Into<String>,
        options: Option<TrackInteractionOptions>,
    ) -> Result<()> {
        check(validate_options(options.as_ref()))?;

        let content_name = content_name.into();
        let interaction = interaction.into();
        debug!(content_name = %content_name, interaction = %interaction, "tracking interaction");
        Ok(self
            .native
            .track_interaction(content_name, interaction, options)
            .await?)
    }

    /// Track a goal conversion.
    #[instrument(skip_all)]
    pub async fn track_goal(
        &self,
        goal: impl Into<String>,
        options: Option<TrackGoalOptions>,
    ) -> Result<()> {
        check(validate_options(options.as_ref()))?;

        let goal = goal.into();
        debug!(goal = %goal, "tracking goal");
        Ok(self.native.track_goal(goal, options).await?)
    }

    /// Track a campaign URL.
    #[instrument(skip_all)]
    pub async fn track_campaign(&self, url: impl Into<String>) -> Result<()> {
        let url = url.into();
        debug!(url = %url, "tracking campaign");
        Ok(self.native.track_campaign(url).await?)
    }

    // ============================================
    // ECOMMERCE
    // ============================================

    /// Track a legacy ecommerce transaction. `grand_total` is in cents.
    #[instrument(skip_all)]
    pub async fn track_ecommerce(
        &self,
        order_id: impl Into<String>,
        grand_total: i64,
        options: Option<TrackEcommerceOptions>,
    ) -> Result<()> {
        check(validate_options(options.as_ref()))?;

        let order_id = order_id.into();
        debug!(order_id = %order_id, grand_total, "tracking ecommerce transaction");
        Ok(self
            .native
            .track_ecommerce(order_id, grand_total, options)
            .await?)
    }

    /// Track a product detail page view.
    #[instrument(skip_all)]
    pub async fn track_ecommerce_product_detail_view(
        &self,
        products: Vec<EcommerceProduct>,
        options: Option<EcommerceOptions>,
    ) -> Result<()> {
        check(validate_ecommerce_product_custom_key_value(&products))?;
        check(validate_options(options.as_ref()))?;

        debug!(product_count = products.len(), "tracking product detail view");
        Ok(self
            .native
            .track_ecommerce_product_detail_view(products, options)
            .await?)
    }

    /// Track the current state of the cart.
    #[instrument(skip_all)]
    pub async fn track_ecommerce_cart_update(
        &self,
        products: Vec<EcommerceProduct>,
        grand_total: impl Into<String>,
        options: Option<EcommerceOptions>,
    ) -> Result<()> {
        check(validate_ecommerce_product_custom_key_value(&products))?;
        check(validate_options(options.as_ref()))?;

        let grand_total = grand_total.into();
        debug!(product_count = products.len(), grand_total = %grand_total, "tracking cart update");
        Ok(self
            .native
            .track_ecommerce_cart_update(products, grand_total, options)
            .await?)
    }

    /// Track products added to the cart.
    #[instrument(skip_all)]
    pub async fn track_ecommerce_add_to_cart(
        &self,
        products: Vec<EcommerceProduct>,
        options: Option<EcommerceOptions>,
    ) -> Result<()> {
        check(validate_ecommerce_product_custom_key_value(&products))?;
        check(validate_options(options.as_ref()))?;

        debug!(product_count = products.len(), "tracking add to cart");
        Ok(self
            .native
            .track_ecommerce_add_to_cart(products, options)
            .await?)
    }

    /// Track products removed from the cart.
    #[instrument(skip_all)]
    pub async fn track_ecommerce_remove_from_cart(
        &self,
        products: Vec<EcommerceProduct>,
        options: Option<EcommerceOptions>,
    ) -> Result<()> {
        check(validate_ecommerce_product_custom_key_value(&products))?;
        check(validate_options(options.as_ref()))?;

        debug!(product_count = products.len(), "tracking remove from cart");
        Ok(self
            .native
            .track_ecommerce_remove_from_cart(products, options)
            .await?)
    }

    /// Track a completed order.
    #[instrument(skip_all)]
    pub async fn track_ecommerce_order(
        &self,
        order_id: impl Into<String>,
        grand_total: impl Into<String>,
        products: Vec<EcommerceProduct>,
        options: Option<TrackEcommerceOrderOptions>,
    ) -> Result<()> {
        check(validate_ecommerce_product_custom_key_value(&products))?;
        check(validate_options(options.as_ref()))?;

        let order_id = order_id.into();
        let grand_total = grand_total.into();
        debug!(
            order_id = %order_id,
            grand_total = %grand_total,
            product_count = products.len(),
            "tracking order"
        );
        Ok(self
            .native
            .track_ecommerce_order(order_id, grand_total, products, options)
            .await?)
    }

    // ============================================
    // AUDIENCE MANAGER
    // ============================================

    /// Track one or more profile attributes.
    ///
    /// A single attribute is forwarded as a one-element list. An empty list
    /// is rejected.
    #[instrument(skip_all)]
    pub async fn track_profile_attributes(
        &self,
        attributes: impl Into<TrackProfileAttributes>,
    ) -> Result<()> {
        let attributes = attributes.into().into_vec();
        check(validate_profile_attributes(&attributes))?;

        debug!(attribute_count = attributes.len(), "tracking profile attributes");
        Ok(self.native.track_profile_attributes(attributes).await?)
    }

    /// Get the visitor's profile attributes.
    #[instrument(skip_all)]
    pub async fn get_profile_attributes(&self) -> Result<ProfileAttributes> {
        Ok(self.native.get_profile_attributes().await?)
    }

    /// Check whether the visitor belongs to an audience.
    #[instrument(skip_all)]
    pub async fn check_audience_membership(&self, audience_id: impl Into<String>) -> Result<bool> {
        let audience_id = audience_id.into();
        debug!(audience_id = %audience_id, "checking audience membership");
        Ok(self.native.check_audience_membership(audience_id).await?)
    }

    // ============================================
    // IDENTITY AND SESSION
    // ============================================

    #[instrument(skip_all)]
    pub async fn set_user_id(&self, user_id: impl Into<String>) -> Result<()> {
        Ok(self.native.set_user_id(user_id.into()).await?)
    }

    #[instrument(skip_all)]
    pub async fn get_user_id(&self) -> Result<String> {
        Ok(self.native.get_user_id().await?)
    }

    #[instrument(skip_all)]
    pub async fn set_user_email(&self, email: impl Into<String>) -> Result<()> {
        Ok(self.native.set_user_email(email.into()).await?)
    }

    #[instrument(skip_all)]
    pub async fn get_user_email(&self) -> Result<String> {
        Ok(self.native.get_user_email().await?)
    }

    /// Set the visitor ID. Must be 16 lowercase hex characters.
    #[instrument(skip_all)]
    pub async fn set_visitor_id(&self, visitor_id: impl Into<String>) -> Result<()> {
        let visitor_id = visitor_id.into();
        check(validate_visitor_id(&visitor_id))?;

        debug!(visitor_id = %visitor_id, "setting visitor id");
        Ok(self.native.set_visitor_id(visitor_id).await?)
    }

    #[instrument(skip_all)]
    pub async fn get_visitor_id(&self) -> Result<String> {
        Ok(self.native.get_visitor_id().await?)
    }

    /// Set how long, in seconds, a visitor ID stays valid. Zero or less
    /// disables expiry.
    #[instrument(skip_all)]
    pub async fn set_visitor_id_lifetime(&self, lifetime: impl Seconds) -> Result<()> {
        let lifetime = check(lifetime.into_seconds())?;
        Ok(self.native.set_visitor_id_lifetime(lifetime).await?)
    }

    /// Adopt the visitor ID carried in a deep link's `pk_vid` parameter.
    ///
    /// Returns `false` when the link carries no visitor ID.
    #[instrument(skip_all)]
    pub async fn set_visitor_id_from_deep_link(&self, deep_link: impl Into<String>) -> Result<bool> {
        Ok(self
            .native
            .set_visitor_id_from_deep_link(deep_link.into())
            .await?)
    }

    /// Set the session timeout in seconds.
    #[instrument(skip_all)]
    pub async fn set_session_timeout(&self, timeout: impl Seconds) -> Result<()> {
        let timeout = check(timeout.into_seconds())?;
        Ok(self.native.set_session_timeout(timeout).await?)
    }

    /// Get the session timeout in seconds.
    #[instrument(skip_all)]
    pub async fn get_session_timeout(&self) -> Result<i64> {
        Ok(self.native.get_session_timeout().await?)
    }

    #[instrument(skip_all)]
    pub async fn start_new_session(&self) -> Result<()> {
        Ok(self.native.start_new_session().await?)
    }

    #[instrument(skip_all)]
    pub async fn set_session_hash(&self, session_hash: SessionHash) -> Result<()> {
        debug!(session_hash = session_hash.as_u8(), "setting session hash");
        Ok(self.native.set_session_hash(session_hash).await?)
    }

    #[instrument(skip_all)]
    pub async fn get_session_hash(&self) -> Result<SessionHash> {
        Ok(self.native.get_session_hash().await?)
    }

    /// Get the user agent the native tracker sends.
    #[instrument(skip_all)]
    pub async fn get_user_agent(&self) -> Result<String> {
        Ok(self.native.get_user_agent().await?)
    }

    // ============================================
    // DISPATCH AND PRIVACY
    // ============================================

    /// Dispatch queued events now.
    #[instrument(skip_all)]
    pub async fn dispatch(&self) -> Result<()> {
        Ok(self.native.dispatch().await?)
    }

    /// Set the dispatch interval in seconds.
    ///
    /// Zero dispatches immediately; a negative value disables automatic
    /// dispatch.
    #[instrument(skip_all)]
    pub async fn set_dispatch_interval(&self, interval: impl Seconds) -> Result<()> {
        let interval = check(interval.into_seconds())?;
        debug!(interval, "setting dispatch interval");
        Ok(self.native.set_dispatch_interval(interval).await?)
    }

    /// Get the dispatch interval in seconds; negative when automatic dispatch
    /// is disabled.
    #[instrument(skip_all)]
    pub async fn get_dispatch_interval(&self) -> Result<i64> {
        Ok(self.native.get_dispatch_interval().await?)
    }

    #[instrument(skip_all)]
    pub async fn set_include_default_custom_variables(&self, include: bool) -> Result<()> {
        Ok(self
            .native
            .set_include_default_custom_variables(include)
            .await?)
    }

    #[instrument(skip_all)]
    pub async fn get_include_default_custom_variables(&self) -> Result<bool> {
        Ok(self.native.get_include_default_custom_variables().await?)
    }

    #[instrument(skip_all)]
    pub async fn set_anonymization_state(&self, enabled: bool) -> Result<()> {
        Ok(self.native.set_anonymization_state(enabled).await?)
    }

    #[instrument(skip_all)]
    pub async fn is_anonymization_on(&self) -> Result<bool> {
        Ok(self.native.is_anonymization_on().await?)
    }

    #[instrument(skip_all)]
    pub async fn set_opt_out(&self, opt_out: bool) -> Result<()> {
        Ok(self.native.set_opt_out(opt_out).await?)
    }

    #[instrument(skip_all)]
    pub async fn get_opt_out(&self) -> Result<bool> {
        Ok(self.native.get_opt_out().await?)
    }

    #[instrument(skip_all)]
    pub async fn set_dry_run(&self, dry_run: bool) -> Result<()> {
        Ok(self.native.set_dry_run(dry_run).await?)
    }

    #[instrument(skip_all)]
    pub async fn get_dry_run(&self) -> Result<bool> {
        Ok(self.native.get_dry_run().await?)
    }

    #[instrument(skip_all)]
    pub async fn set_prefixing(&self, enabled: bool) -> Result<()> {
        Ok(self.native.set_prefixing(enabled).await?)
    }

    #[instrument(skip_all)]
    pub async fn is_prefixing_on(&self) -> Result<bool> {
        Ok(self.native.is_prefixing_on().await?)
    }
}
