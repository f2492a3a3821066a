use std::sync::Arc;

use crate::binding::Binding;

/// Declarative bindings loaded when a container is built
pub trait BindingSource: Send + Sync {
    fn bindings(&self) -> Vec<Binding>;
}

impl BindingSource for Vec<Binding> {
    #[inline]
    fn bindings(&self) -> Vec<Binding> {
        self.clone()
    }
}

impl<S: BindingSource + ?Sized> BindingSource for Arc<S> {
    #[inline]
    fn bindings(&self) -> Vec<Binding> {
        (**self).bindings()
    }
}

/// Binding source calling `f` on every load
#[inline]
#[must_use]
pub const fn source_fn<F>(f: F) -> SourceFn<F>
where
    F: Fn() -> Vec<Binding> + Send + Sync,
{
    SourceFn { f }
}

#[derive(Clone)]
pub struct SourceFn<F> {
    f: F,
}

impl<F> BindingSource for SourceFn<F>
where
    F: Fn() -> Vec<Binding> + Send + Sync,
{
    #[inline]
    fn bindings(&self) -> Vec<Binding> {
        (self.f)()
    }
}
