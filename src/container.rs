use std::sync::Arc;

use tracing::{debug, debug_span, error, info_span};

use crate::{
    any::{downcast, Instance},
    binding::{BindValue, Binding, Factory},
    cache::Cache,
    config::Config,
    errors::{RegisterErrorKind, ResolveErrorKind},
    key::{key_of, BindKey},
    plan::PlanProvider,
    registry::Registry,
    scope::Scope,
    source::BindingSource,
};

/// Bind registry, singleton cache and the plans used to build constructible types.
///
/// Cloning is cheap, clones share registry and cache.
#[derive(Clone)]
pub struct Container {
    pub(crate) inner: Arc<ContainerInner>,
}

impl Container {
    #[inline]
    #[must_use]
    pub fn new(config: Config, plans: impl PlanProvider + 'static) -> Self {
        Self::from_shared(config, Arc::new(plans))
    }

    #[must_use]
    pub fn from_shared(config: Config, plans: Arc<dyn PlanProvider>) -> Self {
        debug!(test_mode = config.test_mode, "New container");
        Self {
            inner: Arc::new(ContainerInner {
                registry: Registry::new(config.test_mode),
                cache: Cache::new(),
                plans,
                config,
            }),
        }
    }

    /// # Errors
    /// See [`Registry::register`]
    #[inline]
    pub fn register(&self, binding: Binding) -> Result<(), RegisterErrorKind> {
        self.inner.registry.register(binding)
    }

    /// Registers bindings in order, stopping at the first failure
    ///
    /// # Errors
    /// See [`Registry::register`]
    pub fn extend<I>(&self, bindings: I) -> Result<(), RegisterErrorKind>
    where
        I: IntoIterator<Item = Binding>,
    {
        for binding in bindings {
            self.register(binding)?;
        }
        Ok(())
    }

    /// # Errors
    /// See [`Registry::register`]
    #[inline]
    pub fn load<S: BindingSource + ?Sized>(&self, source: &S) -> Result<(), RegisterErrorKind> {
        self.extend(source.bindings())
    }

    /// Resolves any non-route bind as `T`
    ///
    /// # Errors
    /// - [`ResolveErrorKind::IncorrectType`] if the bind doesn't hold a `T`
    /// - see [`Self::get_instance`]
    pub fn get<T: ?Sized + Send + Sync + 'static>(&self, key: &str) -> Result<Arc<T>, ResolveErrorKind> {
        downcast(key, self.get_instance(key)?)
    }

    /// Resolves the bind named after `T`'s type
    ///
    /// # Errors
    /// See [`Self::get`]
    #[inline]
    pub fn resolve<T: ?Sized + Send + Sync + 'static>(&self) -> Result<Arc<T>, ResolveErrorKind> {
        self.get(key_of::<T>())
    }

    /// # Errors
    /// - [`ResolveErrorKind::IncorrectType`] if the route isn't a `T`
    /// - see [`Self::get_route_instance`]
    pub fn get_route<T: ?Sized + Send + Sync + 'static>(&self, key: &str) -> Result<Arc<T>, ResolveErrorKind> {
        downcast(key, self.get_route_instance(key)?)
    }

    /// Resolves any non-route bind.
    ///
    /// Mock and provides binds are created on every call, singletons are created once and cached,
    /// transients are created on every call.
    ///
    /// # Errors
    /// - [`ResolveErrorKind::NoBinding`] if nothing is bound to `key`
    /// - [`ResolveErrorKind::WrongGetter`] if `key` is bound as a route
    /// - [`ResolveErrorKind::CyclicResolution`] if a singleton requires itself
    /// - errors of the dependencies, plans, constructors, factories and hooks, unchanged
    pub fn get_instance(&self, key: &str) -> Result<Instance, ResolveErrorKind> {
        let span = info_span!("get", key);
        let _guard = span.enter();

        let binding = self.lookup(key)?;
        match binding.scope() {
            Scope::Route => {
                let err = ResolveErrorKind::WrongGetter { key: key.to_owned() };
                error!("{}", err);
                Err(err)
            }
            Scope::Singleton => self.inner.cache.get_or_construct(binding.key(), key, || self.create(&binding)),
            Scope::Transient | Scope::Provides | Scope::Mock => self.create(&binding),
        }
    }

    /// Resolves a route bind, always as a new instance
    ///
    /// # Errors
    /// - [`ResolveErrorKind::NoBinding`] if nothing is bound to `key`
    /// - [`ResolveErrorKind::NotARoute`] if `key` isn't bound as a route
    /// - errors of the dependencies, plans, constructors and hooks, unchanged
    pub fn get_route_instance(&self, key: &str) -> Result<Instance, ResolveErrorKind> {
        let span = info_span!("get_route", key);
        let _guard = span.enter();

        let binding = self.lookup(key)?;
        if binding.scope() != Scope::Route {
            let err = ResolveErrorKind::NotARoute { key: key.to_owned() };
            error!("{}", err);
            return Err(err);
        }
        self.create(&binding)
    }

    #[inline]
    #[must_use]
    pub fn config(&self) -> Config {
        self.inner.config
    }

    #[inline]
    #[must_use]
    pub fn registry(&self) -> &Registry {
        &self.inner.registry
    }

    /// Whether the singleton bound to `key` is constructed
    #[inline]
    #[must_use]
    pub fn is_cached(&self, key: &str) -> bool {
        self.inner.cache.get(&BindKey::new(key)).is_some()
    }

    /// Count of constructed singletons
    #[inline]
    #[must_use]
    pub fn cached_len(&self) -> usize {
        self.inner.cache.len()
    }
}

impl Container {
    fn lookup(&self, key: &str) -> Result<Arc<Binding>, ResolveErrorKind> {
        self.inner.registry.lookup(key).map_err(|err| {
            error!("{}", err);
            err
        })
    }

    fn create(&self, binding: &Binding) -> Result<Instance, ResolveErrorKind> {
        match binding.value() {
            BindValue::Literal(value) => {
                debug!("Literal returned");
                Ok(value.clone())
            }
            BindValue::Factory(factory) => Self::call_factory(factory),
            BindValue::Constructible { type_key, upcast } => {
                let instance = self.construct(type_key).and_then(|instance| match upcast {
                    Some(upcast) => upcast.apply(instance),
                    None => Ok(instance),
                });
                instance.map_err(|err| {
                    error!("{}", err);
                    err
                })
            }
        }
    }

    fn call_factory(factory: &Factory) -> Result<Instance, ResolveErrorKind> {
        match factory.call() {
            Ok(instance) => {
                debug!("Factory called");
                Ok(instance)
            }
            Err(err) => {
                error!("{}", err);
                Err(err.into())
            }
        }
    }

    fn construct(&self, type_key: &str) -> Result<Instance, ResolveErrorKind> {
        let span = debug_span!("construct", type_key);
        let _guard = span.enter();

        let Some(plan) = self.inner.plans.plan(&BindKey::new(type_key)) else {
            return Err(ResolveErrorKind::NoInjectionPlan {
                type_key: type_key.to_owned(),
            });
        };

        let mut args = Vec::with_capacity(plan.params().len());
        for param in plan.params() {
            args.push((*param, self.get_instance(param)?));
        }

        let mut instance = plan.construct(args)?;
        plan.after_construction(&mut instance)?;

        for field in plan.fields() {
            let value = self.get_instance(field.key())?;
            field.inject(&mut instance, value)?;
            debug!(field = field.name(), "Field injected");
        }

        plan.before_return(&mut instance)?;
        debug!("Instance wired");

        plan.share(instance)
    }
}

pub(crate) struct ContainerInner {
    pub(crate) registry: Registry,
    pub(crate) cache: Cache,
    pub(crate) plans: Arc<dyn PlanProvider>,
    pub(crate) config: Config,
}
