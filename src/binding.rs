use core::fmt::{self, Debug, Formatter};
use std::sync::Arc;

use crate::{
    any::{downcast, instance, shared, Instance},
    errors::{InstantiateErrorKind, ResolveErrorKind},
    key::{key_of, BindKey},
    scope::Scope,
    service::{service_fn, BoxCloneService, Service as _},
};

pub(crate) type BoxedCloneFactory = BoxCloneService<(), Instance, InstantiateErrorKind>;

/// Zero-argument callable producing a value for a binding
#[derive(Clone)]
pub struct Factory(BoxedCloneFactory);

impl Factory {
    /// Takes `Fn`: the factory is cloned before each call, so state changed through
    /// `FnMut` captures wouldn't survive between calls. Use shared state (atomics, locks) instead.
    #[must_use]
    pub fn new<F, T>(factory: F) -> Self
    where
        F: Fn() -> Result<T, InstantiateErrorKind> + Clone + Send + Sync + 'static,
        T: Send + Sync + 'static,
    {
        Self(BoxCloneService(Box::new(service_fn(move |()| factory().map(instance)))))
    }

    /// Factory of already shared values, e.g. trait objects
    #[must_use]
    pub fn shared<F, T>(factory: F) -> Self
    where
        F: Fn() -> Result<Arc<T>, InstantiateErrorKind> + Clone + Send + Sync + 'static,
        T: ?Sized + Send + Sync + 'static,
    {
        Self(BoxCloneService(Box::new(service_fn(move |()| factory().map(shared)))))
    }

    #[inline]
    pub(crate) fn call(&self) -> Result<Instance, InstantiateErrorKind> {
        self.0.clone().call(())
    }
}

/// Conversion applied to a constructed instance, e.g. `Arc<Impl>` to `Arc<dyn Trait>`
#[derive(Clone)]
pub struct Upcast(Arc<dyn Fn(Instance) -> Result<Instance, ResolveErrorKind> + Send + Sync>);

impl Upcast {
    #[must_use]
    pub fn new<Impl, Target, F>(cast: F) -> Self
    where
        Impl: Send + Sync + 'static,
        Target: ?Sized + Send + Sync + 'static,
        F: Fn(Arc<Impl>) -> Arc<Target> + Send + Sync + 'static,
    {
        Self(Arc::new(move |value: Instance| -> Result<Instance, ResolveErrorKind> {
            Ok(shared(cast(downcast::<Impl>(key_of::<Impl>(), value)?)))
        }))
    }

    #[inline]
    pub(crate) fn apply(&self, value: Instance) -> Result<Instance, ResolveErrorKind> {
        (self.0)(value)
    }
}

/// Construction strategy of a binding
#[derive(Clone)]
pub enum BindValue {
    /// Value built outside the container, returned as is
    Literal(Instance),
    /// Called to produce the value
    Factory(Factory),
    /// Type identifier, built through its [`crate::InjectionPlan`] and optionally upcast
    Constructible { type_key: String, upcast: Option<Upcast> },
}

impl BindValue {
    #[inline]
    #[must_use]
    pub fn literal<T: Send + Sync + 'static>(value: T) -> Self {
        Self::Literal(instance(value))
    }

    #[inline]
    #[must_use]
    pub fn shared<T: ?Sized + Send + Sync + 'static>(value: Arc<T>) -> Self {
        Self::Literal(shared(value))
    }

    #[inline]
    #[must_use]
    pub fn factory<F, T>(factory: F) -> Self
    where
        F: Fn() -> Result<T, InstantiateErrorKind> + Clone + Send + Sync + 'static,
        T: Send + Sync + 'static,
    {
        Self::Factory(Factory::new(factory))
    }

    #[inline]
    #[must_use]
    pub fn constructible<T: ?Sized + 'static>() -> Self {
        Self::Constructible {
            type_key: key_of::<T>().to_owned(),
            upcast: None,
        }
    }

    /// `Impl` built through its plan, resolved as `Arc<Target>`
    #[inline]
    #[must_use]
    pub fn constructible_as<Target, Impl, F>(cast: F) -> Self
    where
        Target: ?Sized + Send + Sync + 'static,
        Impl: Send + Sync + 'static,
        F: Fn(Arc<Impl>) -> Arc<Target> + Send + Sync + 'static,
    {
        Self::Constructible {
            type_key: key_of::<Impl>().to_owned(),
            upcast: Some(Upcast::new(cast)),
        }
    }

    #[inline]
    #[must_use]
    pub const fn kind(&self) -> &'static str {
        match self {
            BindValue::Literal(_) => "literal",
            BindValue::Factory(_) => "factory",
            BindValue::Constructible { .. } => "constructible",
        }
    }
}

impl Debug for BindValue {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            BindValue::Constructible { type_key, upcast } => f
                .debug_struct("Constructible")
                .field("type_key", type_key)
                .field("upcast", &upcast.is_some())
                .finish(),
            other => f.write_str(other.kind()),
        }
    }
}

/// Rule mapping a symbolic name to a scope and a construction strategy
#[derive(Clone, Debug)]
pub struct Binding {
    scope: Scope,
    binds: String,
    value: BindValue,
}

impl Binding {
    #[inline]
    #[must_use]
    pub fn new(scope: Scope, binds: impl Into<String>, value: BindValue) -> Self {
        Self {
            scope,
            binds: binds.into(),
            value,
        }
    }

    /// New `T` on every resolution of `binds`
    #[inline]
    #[must_use]
    pub fn transient<T: ?Sized + 'static>(binds: impl Into<String>) -> Self {
        Self::new(Scope::Transient, binds, BindValue::constructible::<T>())
    }

    /// Single `T` shared by all resolutions of `binds`
    #[inline]
    #[must_use]
    pub fn singleton<T: ?Sized + 'static>(binds: impl Into<String>) -> Self {
        Self::new(Scope::Singleton, binds, BindValue::constructible::<T>())
    }

    #[inline]
    #[must_use]
    pub fn route<T: ?Sized + 'static>(binds: impl Into<String>) -> Self {
        Self::new(Scope::Route, binds, BindValue::constructible::<T>())
    }

    /// New `Impl` on every resolution of `binds`, resolved as `Arc<Target>`
    #[inline]
    #[must_use]
    pub fn transient_as<Target, Impl, F>(binds: impl Into<String>, cast: F) -> Self
    where
        Target: ?Sized + Send + Sync + 'static,
        Impl: Send + Sync + 'static,
        F: Fn(Arc<Impl>) -> Arc<Target> + Send + Sync + 'static,
    {
        Self::new(Scope::Transient, binds, BindValue::constructible_as(cast))
    }

    #[inline]
    #[must_use]
    pub fn singleton_as<Target, Impl, F>(binds: impl Into<String>, cast: F) -> Self
    where
        Target: ?Sized + Send + Sync + 'static,
        Impl: Send + Sync + 'static,
        F: Fn(Arc<Impl>) -> Arc<Target> + Send + Sync + 'static,
    {
        Self::new(Scope::Singleton, binds, BindValue::constructible_as(cast))
    }

    #[inline]
    #[must_use]
    pub fn route_as<Target, Impl, F>(binds: impl Into<String>, cast: F) -> Self
    where
        Target: ?Sized + Send + Sync + 'static,
        Impl: Send + Sync + 'static,
        F: Fn(Arc<Impl>) -> Arc<Target> + Send + Sync + 'static,
    {
        Self::new(Scope::Route, binds, BindValue::constructible_as(cast))
    }

    /// `factory` is called on every resolution of `binds`
    #[inline]
    #[must_use]
    pub fn provides<F, T>(binds: impl Into<String>, factory: F) -> Self
    where
        F: Fn() -> Result<T, InstantiateErrorKind> + Clone + Send + Sync + 'static,
        T: Send + Sync + 'static,
    {
        Self::new(Scope::Provides, binds, BindValue::factory(factory))
    }

    /// `factory` is called once, on the first resolution of `binds`
    #[inline]
    #[must_use]
    pub fn provides_singleton<F, T>(binds: impl Into<String>, factory: F) -> Self
    where
        F: Fn() -> Result<T, InstantiateErrorKind> + Clone + Send + Sync + 'static,
        T: Send + Sync + 'static,
    {
        Self::new(Scope::Singleton, binds, BindValue::factory(factory))
    }

    #[inline]
    #[must_use]
    pub fn mock<T: Send + Sync + 'static>(binds: impl Into<String>, value: T) -> Self {
        Self::new(Scope::Mock, binds, BindValue::literal(value))
    }

    /// Test double shared as `Arc<T>`, e.g. a fake behind `dyn Trait`
    #[inline]
    #[must_use]
    pub fn mock_shared<T: ?Sized + Send + Sync + 'static>(binds: impl Into<String>, value: Arc<T>) -> Self {
        Self::new(Scope::Mock, binds, BindValue::shared(value))
    }

    #[inline]
    #[must_use]
    pub const fn scope(&self) -> Scope {
        self.scope
    }

    #[inline]
    #[must_use]
    pub fn binds(&self) -> &str {
        &self.binds
    }

    #[inline]
    #[must_use]
    pub const fn value(&self) -> &BindValue {
        &self.value
    }

    #[inline]
    #[must_use]
    pub fn key(&self) -> BindKey {
        BindKey::new(&self.binds)
    }
}
