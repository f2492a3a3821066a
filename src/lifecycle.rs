use crate::errors::InstantiateErrorKind;

/// Hooks called by the container while it builds a constructible instance.
///
/// 1. `after_construction`: right after the constructor, only constructor dependencies are set
/// 2. field injection
/// 3. `before_return`: constructor and field dependencies are set
///
/// Enabled per type with [`crate::PlanBuilder::lifecycle`].
/// An error from a hook aborts the resolution, the instance is dropped.
pub trait Lifecycle {
    #[allow(clippy::missing_errors_doc)]
    fn after_construction(&mut self) -> Result<(), InstantiateErrorKind> {
        Ok(())
    }

    #[allow(clippy::missing_errors_doc)]
    fn before_return(&mut self) -> Result<(), InstantiateErrorKind> {
        Ok(())
    }
}
