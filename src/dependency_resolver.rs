use std::vec;

use crate::{any::Instance, errors::ResolveErrorKind};

/// Resolved constructor arguments, in the order of the plan's parameter keys
pub struct Arguments {
    inner: vec::IntoIter<(&'static str, Instance)>,
}

impl Arguments {
    #[inline]
    #[must_use]
    pub(crate) fn new(args: Vec<(&'static str, Instance)>) -> Self {
        Self { inner: args.into_iter() }
    }

    #[inline]
    pub(crate) fn next_arg(&mut self) -> Option<(&'static str, Instance)> {
        self.inner.next()
    }
}

/// Constructor parameter that knows which bind keys it needs
/// and how to take its value from the resolved arguments.
pub trait DependencyResolver: Sized {
    fn keys(keys: &mut Vec<&'static str>);

    #[allow(clippy::missing_errors_doc)]
    fn resolve(args: &mut Arguments) -> Result<Self, ResolveErrorKind>;

    #[must_use]
    fn param_keys() -> Vec<&'static str> {
        let mut keys = Vec::new();
        Self::keys(&mut keys);
        keys
    }
}

macro_rules! impl_dependency_resolver {
    (
        [$($ty:ident),*]
    ) => {
        #[allow(non_snake_case, unused_mut)]
        impl<$($ty,)*> DependencyResolver for ($($ty,)*)
        where
            $( $ty: DependencyResolver, )*
        {
            #[inline]
            #[allow(unused_variables)]
            fn keys(keys: &mut Vec<&'static str>) {
                $( $ty::keys(keys); )*
            }

            #[inline]
            #[allow(unused_variables)]
            fn resolve(args: &mut Arguments) -> Result<Self, ResolveErrorKind> {
                Ok(($($ty::resolve(args)?,)*))
            }
        }
    };
}

all_the_tuples!(impl_dependency_resolver);
