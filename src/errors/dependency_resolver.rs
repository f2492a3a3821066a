use super::{instantiate::InstantiateErrorKind, registry::RegisterErrorKind};

#[derive(thiserror::Error, Debug)]
pub enum ResolveErrorKind {
    #[error("Cannot get bind '{key}' because it doesn't exist in registry")]
    NoBinding { key: String },
    #[error("Bind '{key}' is a route and can't be resolved with `get`, use `get_route`")]
    WrongGetter { key: String },
    #[error("Bind '{key}' is not a route")]
    NotARoute { key: String },
    #[error("Cyclic resolution detected: singleton '{key}' is requested while it's being constructed")]
    CyclicResolution { key: String },
    #[error("Injection plan not found for '{type_key}'")]
    NoInjectionPlan { type_key: String },
    #[error("Incorrect type of bind '{key}'. Expected: {expected}")]
    IncorrectType { key: String, expected: &'static str },
    #[error(transparent)]
    Instantiate(#[from] InstantiateErrorKind),
    #[error(transparent)]
    Build(#[from] RegisterErrorKind),
}
