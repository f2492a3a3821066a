use core::any::type_name;
use std::sync::Arc;

use crate::{
    any::downcast,
    dependency_resolver::{Arguments, DependencyResolver},
    errors::ResolveErrorKind,
    key::key_of,
};

/// Constructor parameter resolved from the bind named after `Dep`'s type,
/// or from the key set with [`crate::PlanBuilder::param`].
///
/// `Dep` may be a trait object bound with [`crate::Binding::transient_as`] and alike.
pub struct Inject<Dep: ?Sized>(pub Arc<Dep>);

impl<Dep: ?Sized + Send + Sync + 'static> DependencyResolver for Inject<Dep> {
    #[inline]
    fn keys(keys: &mut Vec<&'static str>) {
        keys.push(key_of::<Dep>());
    }

    fn resolve(args: &mut Arguments) -> Result<Self, ResolveErrorKind> {
        match args.next_arg() {
            Some((key, instance)) => downcast::<Dep>(key, instance).map(Self),
            None => Err(ResolveErrorKind::NoBinding {
                key: type_name::<Dep>().to_owned(),
            }),
        }
    }
}
