//! In-process [`NativeTracker`] that models the vendor tracker's observable
//! behavior without a device.
//!
//! Useful for tests and for hosts that have no native SDK. Every call is
//! recorded as a [`NativeInvocation`]; tracking calls queue a [`Hit`] until
//! [`dispatch`](NativeTracker::dispatch) is called.

use crate::error::NativeError;
use crate::marshal::{self, to_arg, Dimension, NativeInvocation, ProductLine, Variable};
use crate::native::{NativeResult, NativeTracker};
use crate::types::{
    CommonEventOptions, CustomVariables, EcommerceOptions, EcommerceProduct, ProfileAttribute,
    ProfileAttributes, SessionHash, TrackCustomEventOptions, TrackEcommerceOptions,
    TrackEcommerceOrderOptions, TrackGoalOptions, TrackImpressionOptions, TrackInteractionOptions,
    TrackScreenOptions, TrackSearchOptions, TrackSocialInteractionOptions, VisitorId,
};
use serde_json::Value;
use std::collections::HashSet;
use tokio::sync::{Mutex, MutexGuard};
use tracing::debug;
use url::Url;
use uuid::Uuid;

/// Dispatch interval of a fresh tracker, in seconds.
pub const DEFAULT_DISPATCH_INTERVAL: i64 = 30;

/// Session timeout of a fresh tracker, in seconds.
pub const DEFAULT_SESSION_TIMEOUT: i64 = 1800;

/// A tracked hit waiting for, or past, dispatch.
#[derive(Debug, Clone, PartialEq)]
pub struct Hit {
    /// Hit type, e.g. `"screen"` or `"event"`.
    pub kind: &'static str,
    /// Required positional values of the tracking call.
    pub subject: Vec<String>,
    /// Optional scalar values that were provided.
    pub params: Vec<(&'static str, String)>,
    pub dimensions: Vec<Dimension>,
    pub visit_variables: Vec<Variable>,
    pub screen_variables: Vec<Variable>,
    pub products: Vec<ProductLine>,
    pub user_id: Option<String>,
    pub visitor_id: String,
}

impl Hit {
    fn new<I, S>(kind: &'static str, subject: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            kind,
            subject: subject.into_iter().map(Into::into).collect(),
            params: Vec::new(),
            dimensions: Vec::new(),
            visit_variables: Vec::new(),
            screen_variables: Vec::new(),
            products: Vec::new(),
            user_id: None,
            visitor_id: String::new(),
        }
    }

    fn param(mut self, key: &'static str, value: Option<impl ToString>) -> Self {
        if let Some(value) = value {
            self.params.push((key, value.to_string()));
        }
        self
    }

    fn common(mut self, options: Option<&CommonEventOptions>) -> NativeResult<Self> {
        let (dimensions, visit_variables) = marshal::common(options)?;
        self.dimensions = dimensions;
        self.visit_variables = visit_variables;
        Ok(self)
    }

    fn screen_variables(mut self, variables: Option<&CustomVariables>) -> NativeResult<Self> {
        self.screen_variables = marshal::variables(variables)?;
        Ok(self)
    }

    fn products(mut self, products: &[EcommerceProduct]) -> NativeResult<Self> {
        self.products = marshal::products(products)?;
        Ok(self)
    }

    /// Look up an optional value by key.
    pub fn param_value(&self, key: &str) -> Option<&str> {
        self.params
            .iter()
            .find(|(k, _)| *k == key)
            .map(|(_, v)| v.as_str())
    }
}

#[derive(Debug)]
struct Session {
    api_url: String,
    site_id: String,
    user_id: Option<String>,
    user_email: Option<String>,
    visitor_id: String,
    visitor_id_lifetime: i64,
    session_timeout: i64,
    session_count: u32,
    dispatch_interval: i64,
    include_default_custom_variables: bool,
    anonymization: bool,
    opt_out: bool,
    dry_run: bool,
    prefixing: bool,
    install_tracked: bool,
    update_tracked: bool,
    pending: Vec<Hit>,
    dispatched: Vec<Hit>,
}

impl Session {
    fn new(api_url: String, site_id: String) -> Self {
        Self {
            api_url,
            site_id,
            user_id: None,
            user_email: None,
            visitor_id: generate_visitor_id(),
            visitor_id_lifetime: 0,
            session_timeout: DEFAULT_SESSION_TIMEOUT,
            session_count: 1,
            dispatch_interval: DEFAULT_DISPATCH_INTERVAL,
            include_default_custom_variables: true,
            anonymization: true,
            opt_out: false,
            dry_run: false,
            prefixing: true,
            install_tracked: false,
            update_tracked: false,
            pending: Vec::new(),
            dispatched: Vec::new(),
        }
    }

    fn record(&mut self, mut hit: Hit) {
        if self.opt_out {
            debug!(kind = hit.kind, "opted out, dropping hit");
            return;
        }
        hit.user_id = self.user_id.clone();
        hit.visitor_id = self.visitor_id.clone();
        self.pending.push(hit);
    }

    fn dispatch(&mut self) {
        let hits = std::mem::take(&mut self.pending);
        if hits.is_empty() {
            return;
        }
        if self.dry_run {
            debug!(hit_count = hits.len(), "dry run, discarding hits");
            return;
        }
        debug!(
            api_url = %self.api_url,
            site_id = %self.site_id,
            hit_count = hits.len(),
            "dispatching hits"
        );
        self.dispatched.extend(hits);
    }
}

#[derive(Debug, Default)]
struct Inner {
    session: Option<Session>,
    session_hash: SessionHash,
    user_agent: String,
    audiences: HashSet<String>,
    profile_attributes: ProfileAttributes,
    calls: Vec<NativeInvocation>,
    reject_next: Option<NativeError>,
}

impl Inner {
    fn session(&mut self) -> NativeResult<&mut Session> {
        self.session.as_mut().ok_or(NativeError::NotInitialized)
    }
}

/// Random visitor ID: the first 16 hex digits of a v4 UUID.
fn generate_visitor_id() -> String {
    let mut id = Uuid::new_v4().to_string().replace('-', "");
    id.truncate(16);
    id
}

/// In-memory tracker.
///
/// Starts uninitialized; `init` moves it to initialized exactly once. The
/// session hash lives outside the tracker state and can be read or written
/// at any time.
#[derive(Debug, Default)]
pub struct InMemoryTracker {
    inner: Mutex<Inner>,
}

impl InMemoryTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the user agent reported by `get_user_agent`.
    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.inner.get_mut().user_agent = user_agent.into();
        self
    }

    /// Make the visitor a member of `audience_id`.
    pub fn with_audience(mut self, audience_id: impl Into<String>) -> Self {
        self.inner.get_mut().audiences.insert(audience_id.into());
        self
    }

    /// Seed a profile attribute, as if already known to the audience manager.
    pub fn with_profile_attribute(
        mut self,
        name: impl Into<String>,
        value: impl Into<String>,
    ) -> Self {
        self.inner
            .get_mut()
            .profile_attributes
            .insert(name.into(), value.into());
        self
    }

    /// Fail the next call, of any method, with `error`.
    pub async fn reject_next(&self, error: NativeError) {
        self.inner.lock().await.reject_next = Some(error);
    }

    /// Every call received so far, in order.
    pub async fn calls(&self) -> Vec<NativeInvocation> {
        self.inner.lock().await.calls.clone()
    }

    /// Calls received for one method.
    pub async fn calls_to(&self, method: &str) -> Vec<NativeInvocation> {
        self.inner
            .lock()
            .await
            .calls
            .iter()
            .filter(|c| c.method == method)
            .cloned()
            .collect()
    }

    pub async fn is_initialized(&self) -> bool {
        self.inner.lock().await.session.is_some()
    }

    /// Hits queued since the last dispatch.
    pub async fn pending_hits(&self) -> Vec<Hit> {
        self.inner
            .lock()
            .await
            .session
            .as_ref()
            .map(|s| s.pending.clone())
            .unwrap_or_default()
    }

    /// Hits handed off by `dispatch`.
    pub async fn dispatched_hits(&self) -> Vec<Hit> {
        self.inner
            .lock()
            .await
            .session
            .as_ref()
            .map(|s| s.dispatched.clone())
            .unwrap_or_default()
    }

    /// Remove and return the call log.
    pub async fn take_calls(&self) -> Vec<NativeInvocation> {
        std::mem::take(&mut self.inner.lock().await.calls)
    }

    /// Remove and return the hits handed off by `dispatch`.
    pub async fn take_dispatched_hits(&self) -> Vec<Hit> {
        self.inner
            .lock()
            .await
            .session
            .as_mut()
            .map(|s| std::mem::take(&mut s.dispatched))
            .unwrap_or_default()
    }

    /// Visitor ID lifetime in seconds; zero or less means no expiry.
    pub async fn visitor_id_lifetime(&self) -> i64 {
        self.inner
            .lock()
            .await
            .session
            .as_ref()
            .map_or(0, |s| s.visitor_id_lifetime)
    }

    /// Number of sessions started, including the one opened by `init`.
    pub async fn session_count(&self) -> u32 {
        self.inner
            .lock()
            .await
            .session
            .as_ref()
            .map_or(0, |s| s.session_count)
    }

    /// Record the call and consume a pending rejection.
    async fn begin(
        &self,
        method: &'static str,
        args: Vec<Value>,
    ) -> NativeResult<MutexGuard<'_, Inner>> {
        let mut inner = self.inner.lock().await;
        inner.calls.push(NativeInvocation::new(method, args));
        if let Some(error) = inner.reject_next.take() {
            return Err(error);
        }
        Ok(inner)
    }

    /// Record a tracking call, then build its hit under the lock. Hits are
    /// only built once the call is logged and the tracker is initialized.
    async fn track(
        &self,
        method: &'static str,
        args: Vec<Value>,
        build: impl FnOnce() -> NativeResult<Hit> + Send,
    ) -> NativeResult<()> {
        let mut inner = self.begin(method, args).await?;
        let session = inner.session()?;
        session.record(build()?);
        Ok(())
    }

    async fn set_flag(
        &self,
        method: &'static str,
        value: bool,
        apply: impl FnOnce(&mut Session, bool) + Send,
    ) -> NativeResult<()> {
        let mut inner = self.begin(method, vec![Value::Bool(value)]).await?;
        apply(inner.session()?, value);
        Ok(())
    }

    async fn get<T>(
        &self,
        method: &'static str,
        read: impl FnOnce(&Session) -> T + Send,
    ) -> NativeResult<T> {
        let mut inner = self.begin(method, Vec::new()).await?;
        Ok(read(inner.session()?))
    }
}

#[async_trait::async_trait]
impl NativeTracker for InMemoryTracker {
    async fn init(&self, api_url: String, site_id: String) -> NativeResult<()> {
        let mut inner = self
            .begin("init", vec![to_arg(&api_url)?, to_arg(&site_id)?])
            .await?;
        if inner.session.is_some() {
            return Err(NativeError::AlreadyInitialized);
        }
        Url::parse(&api_url)
            .map_err(|e| NativeError::InvalidArgument(format!("invalid API URL {api_url}: {e}")))?;

        inner.session = Some(Session::new(api_url, site_id));
        Ok(())
    }

    async fn track_screen(
        &self,
        path: String,
        options: Option<TrackScreenOptions>,
    ) -> NativeResult<()> {
        let args = vec![to_arg(&path)?, to_arg(&options)?];
        self.track("trackScreen", args, move || {
            Hit::new("screen", [path])
                .param("title", options.as_ref().and_then(|o| o.title.as_ref()))
                .common(options.as_ref().map(|o| &o.common))?
                .screen_variables(options.as_ref().and_then(|o| o.screen_custom_variables.as_ref()))
        })
        .await
    }

    async fn track_custom_event(
        &self,
        category: String,
        action: String,
        options: Option<TrackCustomEventOptions>,
    ) -> NativeResult<()> {
        let args = vec![to_arg(&category)?, to_arg(&action)?, to_arg(&options)?];
        self.track("trackCustomEvent", args, move || {
            Hit::new("event", [category, action])
                .param("name", options.as_ref().and_then(|o| o.name.as_ref()))
                .param("value", options.as_ref().and_then(|o| o.value))
                .param("path", options.as_ref().and_then(|o| o.path.as_ref()))
                .common(options.as_ref().map(|o| &o.common))
        })
        .await
    }

    async fn track_exception(
        &self,
        description: String,
        options: Option<CommonEventOptions>,
    ) -> NativeResult<()> {
        let args = vec![to_arg(&description)?, to_arg(&options)?];
        self.track("trackException", args, move || {
            Hit::new("exception", [description]).common(options.as_ref())
        })
        .await
    }

    async fn track_social_interaction(
        &self,
        interaction: String,
        network: String,
        options: Option<TrackSocialInteractionOptions>,
    ) -> NativeResult<()> {
        let args = vec![to_arg(&interaction)?, to_arg(&network)?, to_arg(&options)?];
        self.track("trackSocialInteraction", args, move || {
            Hit::new("social", [interaction, network]).common(options.as_ref().map(|o| &o.common))
        })
        .await
    }

    async fn track_download(
        &self,
        url: String,
        options: Option<CommonEventOptions>,
    ) -> NativeResult<()> {
        let args = vec![to_arg(&url)?, to_arg(&options)?];
        self.track("trackDownload", args, move || {
            Hit::new("download", [url]).common(options.as_ref())
        })
        .await
    }

    async fn track_application_install(&self) -> NativeResult<()> {
        let mut inner = self.begin("trackApplicationInstall", Vec::new()).await?;
        let session = inner.session()?;
        if session.install_tracked {
            debug!("application install already tracked");
            return Ok(());
        }
        session.install_tracked = true;
        session.record(Hit::new("install", Vec::<String>::new()));
        Ok(())
    }

    async fn track_application_update(&self) -> NativeResult<()> {
        let mut inner = self.begin("trackApplicationUpdate", Vec::new()).await?;
        let session = inner.session()?;
        if session.update_tracked {
            debug!("application update already tracked");
            return Ok(());
        }
        session.update_tracked = true;
        session.record(Hit::new("update", Vec::<String>::new()));
        Ok(())
    }

    async fn track_outlink(
        &self,
        url: String,
        options: Option<CommonEventOptions>,
    ) -> NativeResult<()> {
        let args = vec![to_arg(&url)?, to_arg(&options)?];
        self.track("trackOutlink", args, move || {
            Hit::new("outlink", [url]).common(options.as_ref())
        })
        .await
    }

    async fn track_search(
        &self,
        keyword: String,
        options: Option<TrackSearchOptions>,
    ) -> NativeResult<()> {
        let args = vec![to_arg(&keyword)?, to_arg(&options)?];
        self.track("trackSearch", args, move || {
            Hit::new("search", [keyword])
                .param("category", options.as_ref().and_then(|o| o.category.as_ref()))
                .param("count", options.as_ref().and_then(|o| o.count))
                .common(options.as_ref().map(|o| &o.common))
        })
        .await
    }

    async fn track_impression(
        &self,
        content_name: String,
        options: Option<TrackImpressionOptions>,
    ) -> NativeResult<()> {
        let args = vec![to_arg(&content_name)?, to_arg(&options)?];
        self.track("trackImpression", args, move || {
            Hit::new("impression", [content_name])
                .param("piece", options.as_ref().and_then(|o| o.piece.as_ref()))
                .param("target", options.as_ref().and_then(|o| o.target.as_ref()))
                .common(options.as_ref().map(|o| &o.common))
        })
        .await
    }

    async fn track_interaction(
        &self,
        content_name: String,
        interaction: String,
        options: Option<TrackInteractionOptions>,
    ) -> NativeResult<()> {
        let args = vec![to_arg(&content_name)?, to_arg(&interaction)?, to_arg(&options)?];
        self.track("trackInteraction", args, move || {
            Hit::new("interaction", [content_name, interaction])
                .param("piece", options.as_ref().and_then(|o| o.piece.as_ref()))
                .param("target", options.as_ref().and_then(|o| o.target.as_ref()))
                .common(options.as_ref().map(|o| &o.common))
        })
        .await
    }

    async fn track_goal(
        &self,
        goal: String,
        options: Option<TrackGoalOptions>,
    ) -> NativeResult<()> {
        let args = vec![to_arg(&goal)?, to_arg(&options)?];
        self.track("trackGoal", args, move || {
            Hit::new("goal", [goal])
                .param("revenue", options.as_ref().and_then(|o| o.revenue))
                .param("currencyCode", options.as_ref().and_then(|o| o.currency_code.as_ref()))
                .common(options.as_ref().map(|o| &o.common))
        })
        .await
    }

    async fn track_campaign(&self, url: String) -> NativeResult<()> {
        let args = vec![to_arg(&url)?];
        self.track("trackCampaign", args, move || Ok(Hit::new("campaign", [url])))
            .await
    }

    async fn track_ecommerce(
        &self,
        order_id: String,
        grand_total: i64,
        options: Option<TrackEcommerceOptions>,
    ) -> NativeResult<()> {
        let args = vec![to_arg(&order_id)?, to_arg(&grand_total)?, to_arg(&options)?];
        self.track("trackEcommerce", args, move || {
            let items: Vec<ProductLine> = options
                .as_ref()
                .and_then(|o| o.items.as_ref())
                .map(|items| {
                    items
                        .iter()
                        .map(|item| ProductLine {
                            sku: item.sku.clone(),
                            name: Some(item.name.clone()),
                            category: vec![item.category.clone()],
                            price: Some(item.price.to_string()),
                            quantity: Some(item.quantity),
                            brand: None,
                            variant: None,
                            dimensions: Vec::new(),
                        })
                        .collect()
                })
                .unwrap_or_default();
            let mut hit = Hit::new("ecommerce", [order_id, grand_total.to_string()])
                .param("subTotal", options.as_ref().and_then(|o| o.sub_total))
                .param("tax", options.as_ref().and_then(|o| o.tax))
                .param("shipping", options.as_ref().and_then(|o| o.shipping))
                .param("discount", options.as_ref().and_then(|o| o.discount))
                .common(options.as_ref().map(|o| &o.common))?;
            hit.products = items;
            Ok(hit)
        })
        .await
    }

    async fn track_ecommerce_product_detail_view(
        &self,
        products: Vec<EcommerceProduct>,
        options: Option<EcommerceOptions>,
    ) -> NativeResult<()> {
        let args = vec![to_arg(&products)?, to_arg(&options)?];
        self.track("trackEcommerceProductDetailView", args, move || {
            Hit::new("product_detail_view", Vec::<String>::new())
                .param("currencyCode", options.as_ref().and_then(|o| o.currency_code.as_ref()))
                .products(&products)?
                .common(options.as_ref().map(|o| &o.common))
        })
        .await
    }

    async fn track_ecommerce_cart_update(
        &self,
        products: Vec<EcommerceProduct>,
        grand_total: String,
        options: Option<EcommerceOptions>,
    ) -> NativeResult<()> {
        let args = vec![to_arg(&products)?, to_arg(&grand_total)?, to_arg(&options)?];
        self.track("trackEcommerceCartUpdate", args, move || {
            Hit::new("cart_update", [grand_total])
                .param("currencyCode", options.as_ref().and_then(|o| o.currency_code.as_ref()))
                .products(&products)?
                .common(options.as_ref().map(|o| &o.common))
        })
        .await
    }

    async fn track_ecommerce_add_to_cart(
        &self,
        products: Vec<EcommerceProduct>,
        options: Option<EcommerceOptions>,
    ) -> NativeResult<()> {
        let args = vec![to_arg(&products)?, to_arg(&options)?];
        self.track("trackEcommerceAddToCart", args, move || {
            Hit::new("add_to_cart", Vec::<String>::new())
                .param("currencyCode", options.as_ref().and_then(|o| o.currency_code.as_ref()))
                .products(&products)?
                .common(options.as_ref().map(|o| &o.common))
        })
        .await
    }

    async fn track_ecommerce_remove_from_cart(
        &self,
        products: Vec<EcommerceProduct>,
        options: Option<EcommerceOptions>,
    ) -> NativeResult<()> {
        let args = vec![to_arg(&products)?, to_arg(&options)?];
        self.track("trackEcommerceRemoveFromCart", args, move || {
            Hit::new("remove_from_cart", Vec::<String>::new())
                .param("currencyCode", options.as_ref().and_then(|o| o.currency_code.as_ref()))
                .products(&products)?
                .common(options.as_ref().map(|o| &o.common))
        })
        .await
    }

    async fn track_ecommerce_order(
        &self,
        order_id: String,
        grand_total: String,
        products: Vec<EcommerceProduct>,
        options: Option<TrackEcommerceOrderOptions>,
    ) -> NativeResult<()> {
        let args = vec![
            to_arg(&order_id)?,
            to_arg(&grand_total)?,
            to_arg(&products)?,
            to_arg(&options)?,
        ];
        self.track("trackEcommerceOrder", args, move || {
            Hit::new("order", [order_id, grand_total])
                .param("subTotal", options.as_ref().and_then(|o| o.sub_total.as_ref()))
                .param("tax", options.as_ref().and_then(|o| o.tax.as_ref()))
                .param("shipping", options.as_ref().and_then(|o| o.shipping.as_ref()))
                .param("discount", options.as_ref().and_then(|o| o.discount.as_ref()))
                .param("currencyCode", options.as_ref().and_then(|o| o.currency_code.as_ref()))
                .products(&products)?
                .common(options.as_ref().map(|o| &o.common))
        })
        .await
    }

    async fn track_profile_attributes(
        &self,
        attributes: Vec<ProfileAttribute>,
    ) -> NativeResult<()> {
        let mut inner = self
            .begin("trackProfileAttributes", vec![to_arg(&attributes)?])
            .await?;
        inner.session()?;
        for attr in attributes {
            inner.profile_attributes.insert(attr.name, attr.value);
        }
        Ok(())
    }

    async fn get_profile_attributes(&self) -> NativeResult<ProfileAttributes> {
        let mut inner = self.begin("getProfileAttributes", Vec::new()).await?;
        inner.session()?;
        Ok(inner.profile_attributes.clone())
    }

    async fn check_audience_membership(&self, audience_id: String) -> NativeResult<bool> {
        let mut inner = self
            .begin("checkAudienceMembership", vec![to_arg(&audience_id)?])
            .await?;
        inner.session()?;
        Ok(inner.audiences.contains(&audience_id))
    }

    async fn set_user_id(&self, user_id: String) -> NativeResult<()> {
        let mut inner = self.begin("setUserId", vec![to_arg(&user_id)?]).await?;
        inner.session()?.user_id = Some(user_id);
        Ok(())
    }

    async fn get_user_id(&self) -> NativeResult<String> {
        self.get("getUserId", |s| s.user_id.clone().unwrap_or_default())
            .await
    }

    async fn set_user_email(&self, email: String) -> NativeResult<()> {
        let mut inner = self.begin("setUserEmail", vec![to_arg(&email)?]).await?;
        inner.session()?.user_email = Some(email);
        Ok(())
    }

    async fn get_user_email(&self) -> NativeResult<String> {
        self.get("getUserEmail", |s| s.user_email.clone().unwrap_or_default())
            .await
    }

    async fn set_visitor_id(&self, visitor_id: String) -> NativeResult<()> {
        let mut inner = self
            .begin("setVisitorId", vec![to_arg(&visitor_id)?])
            .await?;
        let session = inner.session()?;
        let visitor_id =
            VisitorId::parse(visitor_id).map_err(|e| NativeError::InvalidArgument(e.to_string()))?;
        session.visitor_id = visitor_id.into();
        Ok(())
    }

    async fn get_visitor_id(&self) -> NativeResult<String> {
        self.get("getVisitorId", |s| s.visitor_id.clone()).await
    }

    async fn set_visitor_id_lifetime(&self, lifetime: i64) -> NativeResult<()> {
        let mut inner = self
            .begin("setVisitorIDLifetime", vec![to_arg(&lifetime)?])
            .await?;
        inner.session()?.visitor_id_lifetime = lifetime;
        Ok(())
    }

    async fn set_visitor_id_from_deep_link(&self, deep_link: String) -> NativeResult<bool> {
        let mut inner = self
            .begin("setVisitorIdFromDeepLink", vec![to_arg(&deep_link)?])
            .await?;
        let session = inner.session()?;

        let url = Url::parse(&deep_link).map_err(|e| {
            NativeError::InvalidArgument(format!("invalid deep link {deep_link}: {e}"))
        })?;
        let Some(raw) = url
            .query_pairs()
            .find(|(key, _)| key == "pk_vid")
            .map(|(_, value)| value.into_owned())
        else {
            return Ok(false);
        };

        let visitor_id =
            VisitorId::parse(raw).map_err(|e| NativeError::InvalidArgument(e.to_string()))?;
        session.visitor_id = visitor_id.into();
        Ok(true)
    }

    async fn set_session_timeout(&self, timeout: i64) -> NativeResult<()> {
        let mut inner = self
            .begin("setSessionTimeout", vec![to_arg(&timeout)?])
            .await?;
        inner.session()?.session_timeout = timeout;
        Ok(())
    }

    async fn get_session_timeout(&self) -> NativeResult<i64> {
        self.get("getSessionTimeout", |s| s.session_timeout).await
    }

    async fn start_new_session(&self) -> NativeResult<()> {
        let mut inner = self.begin("startNewSession", Vec::new()).await?;
        inner.session()?.session_count += 1;
        Ok(())
    }

    async fn set_session_hash(&self, session_hash: SessionHash) -> NativeResult<()> {
        let mut inner = self
            .begin("setSessionHash", vec![to_arg(&session_hash)?])
            .await?;
        inner.session_hash = session_hash;
        Ok(())
    }

    async fn get_session_hash(&self) -> NativeResult<SessionHash> {
        let inner = self.begin("getSessionHash", Vec::new()).await?;
        Ok(inner.session_hash)
    }

    async fn get_user_agent(&self) -> NativeResult<String> {
        let inner = self.begin("getUserAgent", Vec::new()).await?;
        Ok(inner.user_agent.clone())
    }

    async fn dispatch(&self) -> NativeResult<()> {
        let mut inner = self.begin("dispatch", Vec::new()).await?;
        inner.session()?.dispatch();
        Ok(())
    }

    async fn set_dispatch_interval(&self, interval: i64) -> NativeResult<()> {
        let mut inner = self
            .begin("setDispatchInterval", vec![to_arg(&interval)?])
            .await?;
        inner.session()?.dispatch_interval = interval;
        Ok(())
    }

    async fn get_dispatch_interval(&self) -> NativeResult<i64> {
        self.get("getDispatchInterval", |s| s.dispatch_interval)
            .await
    }

    async fn set_include_default_custom_variables(&self, include: bool) -> NativeResult<()> {
        self.set_flag("setIncludeDefaultCustomVariables", include, |s, v| {
            s.include_default_custom_variables = v
        })
        .await
    }

    async fn get_include_default_custom_variables(&self) -> NativeResult<bool> {
        self.get("getIncludeDefaultCustomVariables", |s| {
            s.include_default_custom_variables
        })
        .await
    }

    async fn set_anonymization_state(&self, enabled: bool) -> NativeResult<()> {
        self.set_flag("setAnonymizationState", enabled, |s, v| s.anonymization = v)
            .await
    }

    async fn is_anonymization_on(&self) -> NativeResult<bool> {
        self.get("isAnonymizationOn", |s| s.anonymization).await
    }

    async fn set_opt_out(&self, opt_out: bool) -> NativeResult<()> {
        self.set_flag("setOptOut", opt_out, |s, v| s.opt_out = v)
            .await
    }

    async fn get_opt_out(&self) -> NativeResult<bool> {
        self.get("getOptOut", |s| s.opt_out).await
    }

    async fn set_dry_run(&self, dry_run: bool) -> NativeResult<()> {
        self.set_flag("setDryRun", dry_run, |s, v| s.dry_run = v)
            .await
    }

    async fn get_dry_run(&self) -> NativeResult<bool> {
        self.get("getDryRun", |s| s.dry_run).await
    }

    async fn set_prefixing(&self, enabled: bool) -> NativeResult<()> {
        self.set_flag("setPrefixing", enabled, |s, v| s.prefixing = v)
            .await
    }

    async fn is_prefixing_on(&self) -> NativeResult<bool> {
        self.get("isPrefixingOn", |s| s.prefixing).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::EventOptions;
    use serde_json::json;

    async fn initialized() -> InMemoryTracker {
        let tracker = InMemoryTracker::new();
        tracker
            .init("https://example.com".into(), "site-1".into())
            .await
            .unwrap();
        tracker
    }

    #[tokio::test]
    async fn test_second_init_rejected() {
        let tracker = initialized().await;

        let result = tracker
            .init("https://example.com".into(), "site-1".into())
            .await;

        assert_eq!(result, Err(NativeError::AlreadyInitialized));
        assert!(tracker.is_initialized().await);
    }

    #[tokio::test]
    async fn test_calls_before_init_rejected() {
        let tracker = InMemoryTracker::new();

        let result = tracker.track_screen("home".into(), None).await;

        assert_eq!(result, Err(NativeError::NotInitialized));
        assert_eq!(tracker.calls_to("trackScreen").await.len(), 1);
    }

    #[tokio::test]
    async fn test_init_rejects_malformed_url() {
        let tracker = InMemoryTracker::new();

        let result = tracker.init("not a url".into(), "site-1".into()).await;

        assert!(matches!(result, Err(NativeError::InvalidArgument(_))));
        assert!(!tracker.is_initialized().await);
    }

    #[tokio::test]
    async fn test_session_hash_available_before_init() {
        let tracker = InMemoryTracker::new();
        assert_eq!(tracker.get_session_hash().await, Ok(SessionHash::NotSet));

        tracker.set_session_hash(SessionHash::Enabled).await.unwrap();
        tracker
            .init("https://example.com".into(), "site-1".into())
            .await
            .unwrap();

        assert_eq!(tracker.get_session_hash().await, Ok(SessionHash::Enabled));
    }

    #[tokio::test]
    async fn test_screen_hit_flattened() {
        let tracker = initialized().await;
        let options = TrackScreenOptions::default()
            .title("Home")
            .custom_dimension(2, "b")
            .custom_dimension(1, "a")
            .screen_custom_variable(5, "food", "pizza");

        tracker
            .track_screen("example/path".into(), Some(options))
            .await
            .unwrap();

        let hits = tracker.pending_hits().await;
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].kind, "screen");
        assert_eq!(hits[0].subject, vec!["example/path"]);
        assert_eq!(hits[0].param_value("title"), Some("Home"));
        assert_eq!(hits[0].dimensions[0].id, 1);
        assert_eq!(hits[0].screen_variables[0].id, 5);
    }

    #[tokio::test]
    async fn test_invocation_args_positional() {
        let tracker = initialized().await;

        tracker
            .track_custom_event("cat".into(), "act".into(), None)
            .await
            .unwrap();

        let calls = tracker.calls_to("trackCustomEvent").await;
        assert_eq!(calls[0].args, vec![json!("cat"), json!("act"), Value::Null]);
    }

    #[tokio::test]
    async fn test_dispatch_moves_pending_hits() {
        let tracker = initialized().await;
        tracker.track_campaign("https://x.test".into()).await.unwrap();

        tracker.dispatch().await.unwrap();

        assert!(tracker.pending_hits().await.is_empty());
        assert_eq!(tracker.dispatched_hits().await.len(), 1);
    }

    #[tokio::test]
    async fn test_dry_run_discards_on_dispatch() {
        let tracker = initialized().await;
        tracker.set_dry_run(true).await.unwrap();
        tracker.track_download("https://x.test/a.zip".into(), None).await.unwrap();

        tracker.dispatch().await.unwrap();

        assert!(tracker.pending_hits().await.is_empty());
        assert!(tracker.dispatched_hits().await.is_empty());
    }

    #[tokio::test]
    async fn test_opt_out_drops_hits() {
        let tracker = initialized().await;
        tracker.set_opt_out(true).await.unwrap();

        tracker.track_exception("boom".into(), None).await.unwrap();

        assert!(tracker.pending_hits().await.is_empty());
    }

    #[tokio::test]
    async fn test_install_tracked_once() {
        let tracker = initialized().await;

        tracker.track_application_install().await.unwrap();
        tracker.track_application_install().await.unwrap();

        assert_eq!(tracker.pending_hits().await.len(), 1);
    }

    #[tokio::test]
    async fn test_hits_stamped_with_identity() {
        let tracker = initialized().await;
        tracker.set_user_id("user-1".into()).await.unwrap();
        tracker
            .set_visitor_id("41c90f410ed00000".into())
            .await
            .unwrap();

        tracker.track_search("shoes".into(), None).await.unwrap();

        let hit = &tracker.pending_hits().await[0];
        assert_eq!(hit.user_id.as_deref(), Some("user-1"));
        assert_eq!(hit.visitor_id, "41c90f410ed00000");
    }

    #[tokio::test]
    async fn test_generated_visitor_id_is_valid() {
        let tracker = initialized().await;

        let id = tracker.get_visitor_id().await.unwrap();

        assert!(VisitorId::parse(id).is_ok());
    }

    #[tokio::test]
    async fn test_deep_link_visitor_id() {
        let tracker = initialized().await;

        let found = tracker
            .set_visitor_id_from_deep_link("https://example.com?pk_vid=41c90f410ed00000".into())
            .await
            .unwrap();
        assert!(found);
        assert_eq!(tracker.get_visitor_id().await.unwrap(), "41c90f410ed00000");

        let found = tracker
            .set_visitor_id_from_deep_link("https://example.com".into())
            .await
            .unwrap();
        assert!(!found);

        let result = tracker
            .set_visitor_id_from_deep_link("https://example.com?pk_vid=123456789".into())
            .await;
        assert!(matches!(result, Err(NativeError::InvalidArgument(_))));
    }

    #[tokio::test]
    async fn test_reject_next_fails_once() {
        let tracker = initialized().await;
        tracker
            .reject_next(NativeError::Failed("Failed to get user agent".into()))
            .await;

        assert_eq!(
            tracker.get_user_agent().await,
            Err(NativeError::Failed("Failed to get user agent".into()))
        );
        assert_eq!(tracker.get_user_agent().await, Ok(String::new()));
    }

    #[tokio::test]
    async fn test_defaults() {
        let tracker = initialized().await;

        assert_eq!(tracker.get_dispatch_interval().await, Ok(DEFAULT_DISPATCH_INTERVAL));
        assert_eq!(tracker.get_session_timeout().await, Ok(DEFAULT_SESSION_TIMEOUT));
        assert_eq!(tracker.get_include_default_custom_variables().await, Ok(true));
        assert_eq!(tracker.get_opt_out().await, Ok(false));
        assert_eq!(tracker.get_user_id().await, Ok(String::new()));
        assert_eq!(tracker.session_count().await, 1);
    }

    #[tokio::test]
    async fn test_audience_and_profile_attributes() {
        let tracker = InMemoryTracker::new()
            .with_audience("a83d4aac-faa6-4746-96eb-4ef2bd1a4f8b")
            .with_profile_attribute("device_type", "desktop");
        tracker
            .init("https://example.com".into(), "site-1".into())
            .await
            .unwrap();

        tracker
            .track_profile_attributes(vec![ProfileAttribute::new("food", "pizza")])
            .await
            .unwrap();

        let attrs = tracker.get_profile_attributes().await.unwrap();
        assert_eq!(attrs.get("device_type").map(String::as_str), Some("desktop"));
        assert_eq!(attrs.get("food").map(String::as_str), Some("pizza"));
        assert!(tracker
            .check_audience_membership("a83d4aac-faa6-4746-96eb-4ef2bd1a4f8b".into())
            .await
            .unwrap());
        assert!(!tracker
            .check_audience_membership("other".into())
            .await
            .unwrap());
    }

    fn unmarshallable_screen() -> Option<TrackScreenOptions> {
        Some(TrackScreenOptions::default().custom_dimension("abc", "x"))
    }

    #[tokio::test]
    async fn test_unmarshallable_call_still_logged() {
        let tracker = initialized().await;

        let result = tracker.track_screen("x".into(), unmarshallable_screen()).await;

        assert!(matches!(result, Err(NativeError::InvalidArgument(_))));
        assert_eq!(tracker.calls_to("trackScreen").await.len(), 1);
        assert!(tracker.pending_hits().await.is_empty());
    }

    #[tokio::test]
    async fn test_rejection_consumed_by_unmarshallable_call() {
        let tracker = initialized().await;
        tracker
            .reject_next(NativeError::Failed("armed".into()))
            .await;

        let result = tracker.track_screen("x".into(), unmarshallable_screen()).await;

        assert_eq!(result, Err(NativeError::Failed("armed".into())));
        assert_eq!(tracker.get_user_agent().await, Ok(String::new()));
    }

    #[tokio::test]
    async fn test_not_initialized_reported_before_marshalling() {
        let tracker = InMemoryTracker::new();

        let result = tracker
            .track_ecommerce_add_to_cart(
                vec![EcommerceProduct::new("sku").custom_dimension("abc", "x")],
                None,
            )
            .await;

        assert_eq!(result, Err(NativeError::NotInitialized));
        assert_eq!(tracker.calls_to("trackEcommerceAddToCart").await.len(), 1);
    }

    #[tokio::test]
    async fn test_take_calls_drains_log() {
        let tracker = initialized().await;
        tracker.track_campaign("https://x.test".into()).await.unwrap();

        let calls = tracker.take_calls().await;

        assert_eq!(calls.len(), 2);
        assert_eq!(calls[0].method, "init");
        assert!(tracker.calls().await.is_empty());
    }

    #[tokio::test]
    async fn test_take_dispatched_hits_drains() {
        let tracker = initialized().await;
        tracker.track_campaign("https://x.test".into()).await.unwrap();
        tracker.dispatch().await.unwrap();

        assert_eq!(tracker.take_dispatched_hits().await.len(), 1);
        assert!(tracker.dispatched_hits().await.is_empty());
        assert!(InMemoryTracker::new().take_dispatched_hits().await.is_empty());
    }

    #[test]
    fn test_generated_visitor_ids_are_random() {
        let a = generate_visitor_id();
        let b = generate_visitor_id();

        assert!(VisitorId::parse(a.clone()).is_ok());
        assert_ne!(a, b);
    }
}
