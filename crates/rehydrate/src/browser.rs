//! Browser-side rehydration registrations.

use std::sync::Arc;

use async_trait::async_trait;
use rehydrate_core::{
    select_state_to_transfer, transfer_state_key, MergeStrategy, PartialRehydrationConfig,
    RehydrateAction, RehydrationRootConfig,
};

use crate::app::{AppContext, AppInitializer, Providers};
use crate::logger::RehydrationEvent;

/// Provides store rehydration for the browser.
///
/// Resolves `config` against the defaults, registers the result for lookup,
/// and registers an initializer that, on the browser only:
/// - folds the transferred state of the configured slices into the store
///   using the configured merge strategy, and
/// - dispatches [`RehydrateAction::AddSlice`] for the configured slices.
///
/// # Example
///
/// ```
/// use rehydrate::{provide_rehydrate_browser, MergeStrategy, PartialRehydrationConfig};
///
/// let providers = provide_rehydrate_browser(
///     PartialRehydrationConfig::default()
///         .with_stores(["auth", "user", "settings"])
///         .with_merge_strategy(MergeStrategy::Overwrite),
/// );
/// assert_eq!(providers.config().unwrap().stores.len(), 3);
/// ```
pub fn provide_rehydrate_browser(config: PartialRehydrationConfig) -> Providers {
    let config = Arc::new(RehydrationRootConfig::resolve(config));

    tracing::debug!(
        stores = ?config.stores,
        merge_strategy = %config.merge_strategy,
        "Rehydration config resolved"
    );

    Providers::new()
        .with_config(Arc::clone(&config))
        .with_initializer(RootRehydrateInitializer { config })
}

/// Provides additional store slices for rehydration.
///
/// Use this for lazily-loaded parts of the application. The merge strategy
/// comes from the root configuration, if one was registered. The slices are
/// also registered for transfer, so the server includes them in the page.
pub fn provide_rehydrate_feature<I, S>(stores: I) -> Providers
where
    I: IntoIterator<Item = S>,
    S: Into<String>,
{
    let stores: Vec<String> = stores.into_iter().map(Into::into).collect();

    Providers::new()
        .with_transfer_slices(stores.clone())
        .with_initializer(FeatureRehydrateInitializer { stores })
}

struct RootRehydrateInitializer {
    config: Arc<RehydrationRootConfig>,
}

#[async_trait]
impl AppInitializer for RootRehydrateInitializer {
    async fn initialize(&self, ctx: &AppContext) {
        if !ctx.platform.is_browser() {
            return;
        }

        rehydrate_slices(ctx, &self.config.stores, &self.config.merge_strategy).await;
        add_slices(ctx, &self.config.stores);
    }
}

struct FeatureRehydrateInitializer {
    stores: Vec<String>,
}

#[async_trait]
impl AppInitializer for FeatureRehydrateInitializer {
    async fn initialize(&self, ctx: &AppContext) {
        if !ctx.platform.is_browser() {
            return;
        }

        rehydrate_slices(ctx, &self.stores, &ctx.config().merge_strategy).await;
        add_slices(ctx, &self.stores);
    }
}

/// Dispatch the transferred state of `slices`, if the server sent any.
async fn rehydrate_slices(ctx: &AppContext, slices: &[String], strategy: &MergeStrategy) {
    if slices.is_empty() {
        return;
    }

    let Some(transferred) = ctx.transfer.get(&transfer_state_key()).await else {
        tracing::debug!(?slices, "No transferred state, skipping rehydration");
        return;
    };

    let state = select_state_to_transfer(&transferred, slices);
    if state.as_object().is_some_and(|projection| projection.is_empty()) {
        return;
    }

    ctx.store.dispatch(RehydrateAction::Rehydrate {
        state,
        merge_strategy: strategy.clone(),
    });
}

fn add_slices(ctx: &AppContext, slices: &[String]) {
    if slices.is_empty() {
        return;
    }

    ctx.store.dispatch(RehydrateAction::AddSlice {
        slices: slices.to_vec(),
    });
    ctx.logger.record(RehydrationEvent::SlicesAdded {
        slices: slices.to_vec(),
    });
}
