use tracing::debug;

use crate::{
    any::BoxedInstance,
    dependency_resolver::{Arguments, DependencyResolver},
    errors::{InstantiateErrorKind, InstantiatorErrorKind, ResolveErrorKind},
    service::{service_fn, BoxCloneService},
};

/// Constructor of a constructible type.
///
/// Implemented for closures whose parameters are [`DependencyResolver`]s, e.g.
/// `|Inject(repo): Inject<Repo>| Ok(Service::new(repo))`.
pub trait Instantiator<Deps>: Clone + 'static
where
    Deps: DependencyResolver,
{
    type Provides: 'static;
    type Error: Into<InstantiateErrorKind>;

    #[allow(clippy::missing_errors_doc)]
    fn instantiate(&mut self, dependencies: Deps) -> Result<Self::Provides, Self::Error>;
}

pub(crate) type BoxedCloneConstructor =
    BoxCloneService<Arguments, BoxedInstance, InstantiatorErrorKind<ResolveErrorKind, InstantiateErrorKind>>;

#[must_use]
pub(crate) fn boxed_constructor<Inst, Deps>(instantiator: Inst) -> BoxedCloneConstructor
where
    Inst: Instantiator<Deps> + Send + Sync,
    Inst::Provides: Send + Sync,
    Deps: DependencyResolver,
{
    BoxCloneService(Box::new(service_fn(move |mut args: Arguments| {
        let dependencies = match Deps::resolve(&mut args) {
            Ok(dependencies) => dependencies,
            Err(err) => return Err(InstantiatorErrorKind::Deps(err)),
        };
        let dependency = match instantiator.clone().instantiate(dependencies) {
            Ok(dependency) => dependency,
            Err(err) => return Err(InstantiatorErrorKind::Factory(err.into())),
        };

        debug!("Constructed");

        Ok(Box::new(dependency) as BoxedInstance)
    })))
}

macro_rules! impl_instantiator {
    (
        [$($ty:ident),*]
    ) => {
        #[allow(non_snake_case)]
        impl<F, Response, Err, $($ty,)*> Instantiator<($($ty,)*)> for F
        where
            F: FnMut($($ty,)*) -> Result<Response, Err> + Clone + 'static,
            Response: 'static,
            Err: Into<InstantiateErrorKind>,
            $( $ty: DependencyResolver, )*
        {
            type Provides = Response;
            type Error = Err;

            fn instantiate(&mut self, ($($ty,)*): ($($ty,)*)) -> Result<Self::Provides, Self::Error> {
                self($($ty,)*)
            }
        }
    };
}

all_the_tuples!(impl_instantiator);
