/// Failure raised by a user constructor, factory, field setter or lifecycle hook
#[derive(thiserror::Error, Debug)]
pub enum InstantiateErrorKind {
    #[error(transparent)]
    Custom(#[from] anyhow::Error),
}

impl InstantiateErrorKind {
    #[inline]
    #[must_use]
    pub fn msg<M>(message: M) -> Self
    where
        M: core::fmt::Display + core::fmt::Debug + Send + Sync + 'static,
    {
        Self::Custom(anyhow::Error::msg(message))
    }
}
