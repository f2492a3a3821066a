use core::{
    any::{type_name, Any},
    marker::PhantomData,
};
use std::{collections::BTreeMap, sync::Arc};

use crate::{
    any::{downcast, shared, BoxedInstance, Instance},
    dependency_resolver::{Arguments, DependencyResolver},
    errors::{InstantiateErrorKind, InstantiatorErrorKind, ResolveErrorKind},
    instantiator::{boxed_constructor, BoxedCloneConstructor, Instantiator},
    key::{key_of, BindKey},
    lifecycle::Lifecycle,
    service::Service as _,
};

type Setter = Arc<dyn Fn(&mut (dyn Any + Send + Sync), Instance) -> Result<(), ResolveErrorKind> + Send + Sync>;
type Hook = Arc<dyn Fn(&mut (dyn Any + Send + Sync)) -> Result<(), ResolveErrorKind> + Send + Sync>;
type Seal = fn(BoxedInstance) -> Result<Instance, ResolveErrorKind>;

/// Field assigned after construction, regardless of its visibility:
/// the setter closure is written next to the type and may touch private fields.
#[derive(Clone)]
pub struct FieldDescriptor {
    name: &'static str,
    key: &'static str,
    setter: Setter,
}

impl FieldDescriptor {
    #[inline]
    #[must_use]
    pub const fn name(&self) -> &'static str {
        self.name
    }

    #[inline]
    #[must_use]
    pub const fn key(&self) -> &'static str {
        self.key
    }

    #[inline]
    pub(crate) fn inject(&self, instance: &mut BoxedInstance, value: Instance) -> Result<(), ResolveErrorKind> {
        (self.setter)(instance.as_mut(), value)
    }
}

#[derive(Clone)]
struct Hooks {
    after_construction: Hook,
    before_return: Hook,
}

/// How to build a constructible type: ordered constructor parameter keys, the constructor,
/// fields to inject and optional [`Lifecycle`] hooks.
#[derive(Clone)]
pub struct InjectionPlan {
    type_key: &'static str,
    params: Vec<&'static str>,
    constructor: BoxedCloneConstructor,
    fields: Vec<FieldDescriptor>,
    hooks: Option<Hooks>,
    seal: Seal,
}

impl InjectionPlan {
    /// Starts a plan for the type returned by `constructor`.
    /// Parameter keys come from the constructor's [`DependencyResolver`] arguments.
    #[allow(clippy::new_ret_no_self)]
    #[must_use]
    pub fn new<Inst, Deps>(constructor: Inst) -> PlanBuilder<Inst::Provides>
    where
        Inst: Instantiator<Deps, Error = InstantiateErrorKind> + Send + Sync,
        Inst::Provides: Send + Sync,
        Deps: DependencyResolver,
    {
        PlanBuilder {
            plan: Self {
                type_key: key_of::<Inst::Provides>(),
                params: Deps::param_keys(),
                constructor: boxed_constructor(constructor),
                fields: Vec::new(),
                hooks: None,
                seal: seal::<Inst::Provides>,
            },
            _provides: PhantomData,
        }
    }

    #[inline]
    #[must_use]
    pub const fn type_key(&self) -> &'static str {
        self.type_key
    }

    #[inline]
    #[must_use]
    pub fn params(&self) -> &[&'static str] {
        &self.params
    }

    #[inline]
    #[must_use]
    pub fn fields(&self) -> &[FieldDescriptor] {
        &self.fields
    }

    #[inline]
    #[must_use]
    pub const fn has_lifecycle(&self) -> bool {
        self.hooks.is_some()
    }

    pub(crate) fn construct(&self, args: Vec<(&'static str, Instance)>) -> Result<BoxedInstance, ResolveErrorKind> {
        match self.constructor.clone().call(Arguments::new(args)) {
            Ok(instance) => Ok(instance),
            Err(InstantiatorErrorKind::Deps(err)) => Err(err),
            Err(InstantiatorErrorKind::Factory(err)) => Err(err.into()),
        }
    }

    pub(crate) fn after_construction(&self, instance: &mut BoxedInstance) -> Result<(), ResolveErrorKind> {
        match &self.hooks {
            Some(hooks) => (hooks.after_construction)(instance.as_mut()),
            None => Ok(()),
        }
    }

    pub(crate) fn before_return(&self, instance: &mut BoxedInstance) -> Result<(), ResolveErrorKind> {
        match &self.hooks {
            Some(hooks) => (hooks.before_return)(instance.as_mut()),
            None => Ok(()),
        }
    }

    /// Shares a finished instance, resolvable as `Arc` of the planned type
    #[inline]
    pub(crate) fn share(&self, instance: BoxedInstance) -> Result<Instance, ResolveErrorKind> {
        (self.seal)(instance)
    }
}

pub struct PlanBuilder<T> {
    plan: InjectionPlan,
    _provides: PhantomData<fn() -> T>,
}

impl<T: Send + Sync + 'static> PlanBuilder<T> {
    /// Resolves the constructor parameter at `index` from the bind named `key`
    /// instead of the one named after the parameter's type.
    /// Indices past the constructor's parameters are ignored.
    #[must_use]
    pub fn param(mut self, index: usize, key: &'static str) -> Self {
        if let Some(param) = self.plan.params.get_mut(index) {
            *param = key;
        }
        self
    }

    /// Injects the bind named after `Dep`'s type through `setter` after construction
    #[inline]
    #[must_use]
    pub fn field<Dep, S>(self, name: &'static str, setter: S) -> Self
    where
        Dep: ?Sized + Send + Sync + 'static,
        S: Fn(&mut T, Arc<Dep>) + Send + Sync + 'static,
    {
        self.field_keyed(name, key_of::<Dep>(), setter)
    }

    /// Injects the bind named `key` through `setter` after construction
    #[must_use]
    pub fn field_keyed<Dep, S>(mut self, name: &'static str, key: &'static str, setter: S) -> Self
    where
        Dep: ?Sized + Send + Sync + 'static,
        S: Fn(&mut T, Arc<Dep>) + Send + Sync + 'static,
    {
        self.plan.fields.push(FieldDescriptor {
            name,
            key,
            setter: Arc::new(
                move |instance: &mut (dyn Any + Send + Sync), value: Instance| -> Result<(), ResolveErrorKind> {
                    setter(as_provided::<T>(instance)?, downcast::<Dep>(key, value)?);
                    Ok(())
                },
            ),
        });
        self
    }

    /// Calls [`Lifecycle`] hooks of `T` around field injection
    #[must_use]
    pub fn lifecycle(mut self) -> Self
    where
        T: Lifecycle,
    {
        self.plan.hooks = Some(Hooks {
            after_construction: Arc::new(|instance: &mut (dyn Any + Send + Sync)| -> Result<(), ResolveErrorKind> {
                as_provided::<T>(instance)?.after_construction().map_err(Into::into)
            }),
            before_return: Arc::new(|instance: &mut (dyn Any + Send + Sync)| -> Result<(), ResolveErrorKind> {
                as_provided::<T>(instance)?.before_return().map_err(Into::into)
            }),
        });
        self
    }

    #[inline]
    #[must_use]
    pub fn build(self) -> InjectionPlan {
        self.plan
    }
}

impl<T> From<PlanBuilder<T>> for InjectionPlan {
    #[inline]
    fn from(builder: PlanBuilder<T>) -> Self {
        builder.plan
    }
}

fn seal<T: Send + Sync + 'static>(instance: BoxedInstance) -> Result<Instance, ResolveErrorKind> {
    match instance.downcast::<T>() {
        Ok(value) => Ok(shared::<T>(Arc::from(value))),
        Err(_) => Err(ResolveErrorKind::IncorrectType {
            key: key_of::<T>().to_owned(),
            expected: type_name::<T>(),
        }),
    }
}

fn as_provided<T: 'static>(instance: &mut (dyn Any + Send + Sync)) -> Result<&mut T, ResolveErrorKind> {
    instance.downcast_mut::<T>().ok_or_else(|| ResolveErrorKind::IncorrectType {
        key: key_of::<T>().to_owned(),
        expected: type_name::<T>(),
    })
}

/// Source of [`InjectionPlan`]s by type identifier.
///
/// Plan lookup must not resolve anything from a container.
pub trait PlanProvider: Send + Sync {
    fn plan(&self, type_key: &BindKey) -> Option<Arc<InjectionPlan>>;
}

impl<P: PlanProvider + ?Sized> PlanProvider for Arc<P> {
    #[inline]
    fn plan(&self, type_key: &BindKey) -> Option<Arc<InjectionPlan>> {
        (**self).plan(type_key)
    }
}

/// Statically registered plans
#[derive(Clone, Default)]
pub struct Plans {
    plans: BTreeMap<BindKey, Arc<InjectionPlan>>,
}

impl Plans {
    #[inline]
    #[must_use]
    pub const fn new() -> Self {
        Self { plans: BTreeMap::new() }
    }

    #[inline]
    #[must_use]
    pub fn provide(mut self, plan: impl Into<InjectionPlan>) -> Self {
        self.add(plan);
        self
    }

    /// Adds a plan, returning the replaced plan of the same type if any
    pub fn add(&mut self, plan: impl Into<InjectionPlan>) -> Option<Arc<InjectionPlan>> {
        let plan = plan.into();
        self.plans.insert(BindKey::new(plan.type_key), Arc::new(plan))
    }

    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.plans.len()
    }

    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.plans.is_empty()
    }
}

impl PlanProvider for Plans {
    #[inline]
    fn plan(&self, type_key: &BindKey) -> Option<Arc<InjectionPlan>> {
        self.plans.get(type_key).cloned()
    }
}
