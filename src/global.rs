//! Process-wide container.
//!
//! The container is built lazily on first use from the configured plans and binding sources,
//! or explicitly with [`build`]. Resolution works on a snapshot of the current container:
//! a [`reset`] or rebuild never affects a resolution already in progress.
//!
//! Binding sources and plans are called while the global state is locked,
//! so they must not use this module themselves.

use std::sync::Arc;

use parking_lot::{const_rwlock, RwLock};
use tracing::{debug, error, info_span};

use crate::{
    any::Instance,
    binding::Binding,
    config::Config,
    container::Container,
    errors::{RegisterErrorKind, ResolveErrorKind},
    plan::{PlanProvider, Plans},
    source::BindingSource,
};

struct GlobalState {
    container: Option<Container>,
    config: Option<Config>,
    plans: Option<Arc<dyn PlanProvider>>,
    binds: Option<Arc<dyn BindingSource>>,
    routes: Option<Arc<dyn BindingSource>>,
}

static STATE: RwLock<GlobalState> = const_rwlock(GlobalState {
    container: None,
    config: None,
    plans: None,
    binds: None,
    routes: None,
});

impl GlobalState {
    fn new_container(&self) -> Result<Container, RegisterErrorKind> {
        let config = self.config.unwrap_or_else(Config::from_env);
        let plans = match &self.plans {
            Some(plans) => plans.clone(),
            None => Arc::new(Plans::new()),
        };
        let container = Container::from_shared(config, plans);

        if let Some(binds) = &self.binds {
            container.load(&**binds)?;
        }
        if let Some(routes) = &self.routes {
            container.load(&**routes)?;
        }
        Ok(container)
    }
}

/// Config of containers built from now on. Defaults to [`Config::from_env`].
pub fn set_config(config: Config) {
    STATE.write().config = Some(config);
}

pub fn set_plans(plans: impl PlanProvider + 'static) {
    STATE.write().plans = Some(Arc::new(plans));
}

pub fn set_binds_source(source: impl BindingSource + 'static) {
    STATE.write().binds = Some(Arc::new(source));
}

pub fn set_routes_source(source: impl BindingSource + 'static) {
    STATE.write().routes = Some(Arc::new(source));
}

/// Drops config, plans and binding sources. The current container is kept.
pub fn clear_settings() {
    let mut state = STATE.write();
    state.config = None;
    state.plans = None;
    state.binds = None;
    state.routes = None;
}

/// Builds the process-wide container.
///
/// If a container is already built and `bindings` is empty, this does nothing.
/// Otherwise a new container is created, filled with the binds source, then the routes source,
/// then `bindings` in order, and replaces the current one.
///
/// # Errors
/// Returns the first registration error. The current container is kept in that case.
pub fn build(bindings: Vec<Binding>) -> Result<(), RegisterErrorKind> {
    let span = info_span!("build", bindings = bindings.len());
    let _guard = span.enter();

    let mut state = STATE.write();
    if state.container.is_some() && bindings.is_empty() {
        debug!("Container already built");
        return Ok(());
    }

    let container = state.new_container().and_then(|container| {
        container.extend(bindings)?;
        Ok(container)
    });
    match container {
        Ok(container) => {
            state.container = Some(container);
            debug!("Container built");
            Ok(())
        }
        Err(err) => {
            error!("{}", err);
            Err(err)
        }
    }
}

/// Discards the process-wide container with its registry and singleton cache.
/// The next use builds a new one.
pub fn reset() {
    if STATE.write().container.take().is_some() {
        debug!("Container reset");
    }
}

#[must_use]
pub fn is_built() -> bool {
    STATE.read().container.is_some()
}

/// Current container, built with no extra bindings if there is none
///
/// # Errors
/// Returns [`ResolveErrorKind::Build`] if the container can't be built
pub fn container() -> Result<Container, ResolveErrorKind> {
    if let Some(container) = STATE.read().container.clone() {
        return Ok(container);
    }

    let mut state = STATE.write();
    if let Some(container) = state.container.clone() {
        return Ok(container);
    }
    let container = state.new_container().map_err(|err| {
        error!("{}", err);
        err
    })?;
    state.container = Some(container.clone());
    Ok(container)
}

/// # Errors
/// See [`container`] and [`Container::get`]
#[inline]
pub fn get<T: ?Sized + Send + Sync + 'static>(key: &str) -> Result<Arc<T>, ResolveErrorKind> {
    container()?.get(key)
}

/// # Errors
/// See [`container`] and [`Container::get_instance`]
#[inline]
pub fn get_instance(key: &str) -> Result<Instance, ResolveErrorKind> {
    container()?.get_instance(key)
}

/// # Errors
/// See [`container`] and [`Container::get_route`]
#[inline]
pub fn get_route<T: ?Sized + Send + Sync + 'static>(key: &str) -> Result<Arc<T>, ResolveErrorKind> {
    container()?.get_route(key)
}

/// # Errors
/// See [`container`] and [`Container::resolve`]
#[inline]
pub fn resolve<T: ?Sized + Send + Sync + 'static>() -> Result<Arc<T>, ResolveErrorKind> {
    container()?.resolve()
}
