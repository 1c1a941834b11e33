//! Minimal application lifecycle the rehydration hooks plug into.
//!
//! Registration functions return [`Providers`]; an [`App`] built from them
//! runs every app-initializer and then every bootstrap listener, in that
//! order, when it bootstraps on a given [`Platform`].

use std::sync::Arc;

use async_trait::async_trait;
use rehydrate_core::{Platform, RehydrationRootConfig, DEFAULT_APP_ID};

use crate::error::Result;
use crate::logger::RehydrationLogger;
use crate::store::Store;
use crate::transport::TransferHandle;

/// Runs while the application bootstraps, after the store is constructed.
#[async_trait]
pub trait AppInitializer: Send + Sync {
    async fn initialize(&self, ctx: &AppContext);
}

/// Runs once bootstrap has completed, before the page payload is finalized.
#[async_trait]
pub trait BootstrapListener: Send + Sync {
    async fn on_bootstrap(&self, ctx: &AppContext);
}

/// Everything a hook can look up while the application bootstraps.
#[derive(Clone)]
pub struct AppContext {
    pub platform: Platform,
    pub store: Arc<dyn Store>,
    pub transfer: TransferHandle,
    pub logger: RehydrationLogger,
    config: Arc<RehydrationRootConfig>,
    transfer_slices: Arc<[String]>,
}

impl AppContext {
    /// The resolved rehydration configuration.
    ///
    /// Defaults apply when no root registration provided one.
    pub fn config(&self) -> &RehydrationRootConfig {
        &self.config
    }

    /// Slices registered for transfer beyond the root configuration's
    /// `stores`, in registration order.
    pub fn transfer_slices(&self) -> &[String] {
        &self.transfer_slices
    }
}

/// A set of registrations that can be combined before building an [`App`].
#[derive(Default, Clone)]
pub struct Providers {
    config: Option<Arc<RehydrationRootConfig>>,
    transfer_slices: Vec<String>,
    initializers: Vec<Arc<dyn AppInitializer>>,
    bootstrap_listeners: Vec<Arc<dyn BootstrapListener>>,
}

impl Providers {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(mut self, config: Arc<RehydrationRootConfig>) -> Self {
        self.config = Some(config);
        self
    }

    /// Register extra slices the server should transfer.
    pub fn with_transfer_slices<I, S>(mut self, slices: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.transfer_slices.extend(slices.into_iter().map(Into::into));
        self
    }

    pub fn with_initializer(mut self, initializer: impl AppInitializer + 'static) -> Self {
        self.initializers.push(Arc::new(initializer));
        self
    }

    pub fn with_bootstrap_listener(mut self, listener: impl BootstrapListener + 'static) -> Self {
        self.bootstrap_listeners.push(Arc::new(listener));
        self
    }

    /// Append `other`'s registrations. A config in `other` replaces this one.
    pub fn extend(mut self, other: Providers) -> Self {
        if other.config.is_some() {
            self.config = other.config;
        }
        self.transfer_slices.extend(other.transfer_slices);
        self.initializers.extend(other.initializers);
        self.bootstrap_listeners.extend(other.bootstrap_listeners);
        self
    }

    pub fn config(&self) -> Option<&RehydrationRootConfig> {
        self.config.as_deref()
    }

    pub fn transfer_slices(&self) -> &[String] {
        &self.transfer_slices
    }

    pub fn initializer_count(&self) -> usize {
        self.initializers.len()
    }

    pub fn bootstrap_listener_count(&self) -> usize {
        self.bootstrap_listeners.len()
    }
}

/// An application assembled from [`Providers`].
pub struct App {
    providers: Providers,
    logger: RehydrationLogger,
    app_id: String,
}

impl App {
    pub fn new(providers: Providers) -> Self {
        Self {
            providers,
            logger: RehydrationLogger::new(),
            app_id: DEFAULT_APP_ID.to_string(),
        }
    }

    pub fn with_app_id(mut self, app_id: impl Into<String>) -> Self {
        self.app_id = app_id.into();
        self
    }

    pub fn with_logger(mut self, logger: RehydrationLogger) -> Self {
        self.logger = logger;
        self
    }

    pub fn app_id(&self) -> &str {
        &self.app_id
    }

    pub fn logger(&self) -> &RehydrationLogger {
        &self.logger
    }

    /// Bootstrap on `platform`: run every initializer, then every bootstrap
    /// listener. Hooks never fail the bootstrap.
    pub async fn bootstrap(
        &self,
        platform: Platform,
        store: Arc<dyn Store>,
        transfer: TransferHandle,
    ) -> AppContext {
        let ctx = AppContext {
            platform,
            store,
            transfer,
            logger: self.logger.clone(),
            config: self.providers.config.clone().unwrap_or_default(),
            transfer_slices: self.providers.transfer_slices.clone().into(),
        };

        tracing::debug!(
            %platform,
            initializers = self.providers.initializers.len(),
            listeners = self.providers.bootstrap_listeners.len(),
            "Bootstrapping application"
        );

        for initializer in &self.providers.initializers {
            initializer.initialize(&ctx).await;
        }

        for listener in &self.providers.bootstrap_listeners {
            listener.on_bootstrap(&ctx).await;
        }

        ctx
    }

    /// Encode the transfer record of a finished server render as the
    /// `<script>` element to embed in the page.
    pub async fn render_payload(&self, ctx: &AppContext) -> Result<String> {
        let script = ctx.transfer.to_script(&self.app_id).await?;
        tracing::debug!(app_id = %self.app_id, bytes = script.len(), "Transfer payload rendered");
        Ok(script)
    }

    /// Decode the transfer record from a server-rendered page.
    pub fn transfer_from_page(&self, html: &str) -> TransferHandle {
        TransferHandle::from_html(html, &self.app_id)
    }
}
