#[macro_use]
pub(crate) mod macros;

pub(crate) mod any;
pub(crate) mod binding;
pub(crate) mod cache;
pub(crate) mod config;
pub(crate) mod container;
pub(crate) mod dependency_resolver;
pub(crate) mod errors;
pub(crate) mod inject;
pub(crate) mod instantiator;
pub(crate) mod key;
pub(crate) mod lifecycle;
pub(crate) mod plan;
pub(crate) mod registry;
pub(crate) mod scope;
pub(crate) mod service;
pub(crate) mod source;

pub mod global;

pub use any::{instance, shared, Instance};
pub use binding::{BindValue, Binding, Factory, Upcast};
pub use config::{Config, TEST_MODE_ENV};
pub use container::Container;
pub use dependency_resolver::{Arguments, DependencyResolver};
pub use errors::{InstantiateErrorKind, InstantiatorErrorKind, RegisterErrorKind, ResolveErrorKind};
pub use inject::Inject;
pub use instantiator::Instantiator;
pub use key::{key_of, BindKey};
pub use lifecycle::Lifecycle;
pub use plan::{FieldDescriptor, InjectionPlan, PlanBuilder, PlanProvider, Plans};
pub use registry::Registry;
pub use scope::Scope;
pub use source::{source_fn, BindingSource, SourceFn};
