use core::any::{type_name, Any};
use std::sync::Arc;

use crate::errors::ResolveErrorKind;

/// Type-erased resolved value holding an `Arc<T>`, where `T` may be a trait object.
/// Shared instances compare by [`Arc::ptr_eq`] on the resolved `Arc<T>`.
pub type Instance = Arc<dyn Any + Send + Sync>;

/// Instance under construction, before it's shared
pub(crate) type BoxedInstance = Box<dyn Any + Send + Sync>;

/// Erases `value`, resolvable as `Arc<T>`
#[inline]
#[must_use]
pub fn instance<T: Send + Sync + 'static>(value: T) -> Instance {
    shared(Arc::new(value))
}

/// Erases an already shared value, resolvable as `Arc<T>`.
/// `T` can be unsized, e.g. `shared::<dyn Trait>(Arc::new(Impl))`.
#[inline]
#[must_use]
pub fn shared<T: ?Sized + Send + Sync + 'static>(value: Arc<T>) -> Instance {
    Arc::new(value)
}

pub(crate) fn downcast<T: ?Sized + Send + Sync + 'static>(key: &str, instance: Instance) -> Result<Arc<T>, ResolveErrorKind> {
    match instance.downcast_ref::<Arc<T>>() {
        Some(value) => Ok(value.clone()),
        None => Err(ResolveErrorKind::IncorrectType {
            key: key.to_owned(),
            expected: type_name::<T>(),
        }),
    }
}
