//! Fluent builder for constructing a [`Dispatcher`].

use std::sync::Mutex;

use rank_core::{CodeGenerator, DispatchConfig};
use rank_graph::PathFinder;
use rank_store::EntityStore;

use crate::{DispatchResult, Dispatcher};

/// Fluent builder for [`Dispatcher<S, P>`].
///
/// # Required inputs
///
/// - `S: EntityStore`: where documents live (e.g. [`rank_store::MemoryStore`])
/// - `P: PathFinder`: the path search (e.g. [`rank_graph::BfsPathFinder`])
///
/// # Optional inputs (have defaults)
///
/// | Method        | Default                      |
/// |---------------|------------------------------|
/// | `.config(c)`  | `DispatchConfig::default()`  |
///
/// # Example
///
/// ```rust,ignore
/// let dispatcher = DispatcherBuilder::new(MemoryStore::new(), BfsPathFinder)
///     .config(DispatchConfig { auto_reverse_routes: true, ..Default::default() })
///     .build()?;
/// let trip = dispatcher.create_trip(origin, destination)?;
/// ```
pub struct DispatcherBuilder<S: EntityStore, P: PathFinder> {
    store:  S,
    finder: P,
    config: Option<DispatchConfig>,
}

impl<S: EntityStore, P: PathFinder> DispatcherBuilder<S, P> {
    pub fn new(store: S, finder: P) -> Self {
        Self { store, finder, config: None }
    }

    pub fn config(mut self, config: DispatchConfig) -> Self {
        self.config = Some(config);
        self
    }

    /// Validate the configuration and return a ready [`Dispatcher`].
    pub fn build(self) -> DispatchResult<Dispatcher<S, P>> {
        let config = self.config.unwrap_or_default();
        config.validate()?;

        tracing::debug!(
            allow_empty_trips = config.allow_empty_trips,
            auto_reverse_routes = config.auto_reverse_routes,
            reject_parallel_routes = config.reject_parallel_routes,
            parallel_route_policy = config.parallel_route_policy.as_str(),
            seeded = config.code_seed.is_some(),
            "dispatcher configured"
        );

        Ok(Dispatcher {
            codes:  Mutex::new(CodeGenerator::new(config.code_seed)),
            store:  self.store,
            finder: self.finder,
            config,
        })
    }
}
