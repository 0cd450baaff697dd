//! Tracker configuration.

use crate::types::SessionHash;
use url::Url;

/// Settings applied by [`PiwikPro::configure`](crate::PiwikPro::configure).
///
/// Only `api_url` and `site_id` are required; every other setting is left to
/// the native tracker's default unless set.
#[derive(Debug, Clone, PartialEq)]
pub struct TrackerConfig {
    pub(crate) api_url: String,
    pub(crate) site_id: String,
    pub(crate) dispatch_interval: Option<i64>,
    pub(crate) session_timeout: Option<i64>,
    pub(crate) visitor_id_lifetime: Option<i64>,
    pub(crate) include_default_custom_variables: Option<bool>,
    pub(crate) anonymization: Option<bool>,
    pub(crate) opt_out: Option<bool>,
    pub(crate) dry_run: Option<bool>,
    pub(crate) prefixing: Option<bool>,
    pub(crate) session_hash: Option<SessionHash>,
}

impl TrackerConfig {
    /// Get the Piwik PRO server URL.
    pub fn api_url(&self) -> &str {
        &self.api_url
    }

    /// Get the site (app) ID.
    pub fn site_id(&self) -> &str {
        &self.site_id
    }

    /// Get the dispatch interval in seconds.
    pub fn dispatch_interval(&self) -> Option<i64> {
        self.dispatch_interval
    }

    /// Get the session timeout in seconds.
    pub fn session_timeout(&self) -> Option<i64> {
        self.session_timeout
    }

    pub fn visitor_id_lifetime(&self) -> Option<i64> {
        self.visitor_id_lifetime
    }

    pub fn include_default_custom_variables(&self) -> Option<bool> {
        self.include_default_custom_variables
    }

    pub fn anonymization(&self) -> Option<bool> {
        self.anonymization
    }

    pub fn opt_out(&self) -> Option<bool> {
        self.opt_out
    }

    pub fn dry_run(&self) -> Option<bool> {
        self.dry_run
    }

    pub fn prefixing(&self) -> Option<bool> {
        self.prefixing
    }

    pub fn session_hash(&self) -> Option<SessionHash> {
        self.session_hash
    }
}

/// Builder for [`TrackerConfig`].
#[derive(Debug)]
pub struct TrackerConfigBuilder {
    config: TrackerConfig,
}

impl TrackerConfigBuilder {
    /// Create a new builder for the given server and site.
    pub fn new(api_url: impl Into<String>, site_id: impl Into<String>) -> Self {
        Self {
            config: TrackerConfig {
                api_url: api_url.into(),
                site_id: site_id.into(),
                dispatch_interval: None,
                session_timeout: None,
                visitor_id_lifetime: None,
                include_default_custom_variables: None,
                anonymization: None,
                opt_out: None,
                dry_run: None,
                prefixing: None,
                session_hash: None,
            },
        }
    }

    /// Set the dispatch interval in seconds. Negative disables automatic dispatch.
    pub fn dispatch_interval(mut self, seconds: i64) -> Self {
        self.config.dispatch_interval = Some(seconds);
        self
    }

    /// Set the session timeout in seconds.
    pub fn session_timeout(mut self, seconds: i64) -> Self {
        self.config.session_timeout = Some(seconds);
        self
    }

    /// Set the visitor ID lifetime in seconds.
    pub fn visitor_id_lifetime(mut self, seconds: i64) -> Self {
        self.config.visitor_id_lifetime = Some(seconds);
        self
    }

    pub fn include_default_custom_variables(mut self, include: bool) -> Self {
        self.config.include_default_custom_variables = Some(include);
        self
    }

    pub fn anonymization(mut self, enabled: bool) -> Self {
        self.config.anonymization = Some(enabled);
        self
    }

    pub fn opt_out(mut self, opt_out: bool) -> Self {
        self.config.opt_out = Some(opt_out);
        self
    }

    pub fn dry_run(mut self, dry_run: bool) -> Self {
        self.config.dry_run = Some(dry_run);
        self
    }

    pub fn prefixing(mut self, enabled: bool) -> Self {
        self.config.prefixing = Some(enabled);
        self
    }

    pub fn session_hash(mut self, session_hash: SessionHash) -> Self {
        self.config.session_hash = Some(session_hash);
        self
    }

    /// Build the configuration.
    pub fn build(self) -> Result<TrackerConfig, crate::Error> {
        let config = self.config;

        if config.api_url.is_empty() {
            return Err(crate::Error::Config("api_url cannot be empty".into()));
        }
        if config.site_id.is_empty() {
            return Err(crate::Error::Config("site_id cannot be empty".into()));
        }
        Url::parse(&config.api_url)
            .map_err(|e| crate::Error::Config(format!("api_url is not a valid URL: {e}")))?;

        Ok(config)
    }
}
