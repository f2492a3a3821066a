use core::fmt::{self, Display, Formatter};

/// Resolution policy of a binding.
///
/// A "provides singleton" is a [`Scope::Singleton`] binding whose value is a factory:
/// the factory is called once and its result is cached.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[repr(u8)]
pub enum Scope {
    /// New instance on every resolution
    Transient,
    /// At most one instance per container lifetime
    Singleton,
    /// Factory called (or literal returned) on every resolution, never cached
    Provides,
    /// Like [`Scope::Transient`], but only reachable through `get_route`
    Route,
    /// Test double overriding any other binding for the same key.
    /// Registration requires test mode.
    Mock,
}

impl Scope {
    #[inline]
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Scope::Transient => "transient",
            Scope::Singleton => "singleton",
            Scope::Provides => "provides",
            Scope::Route => "route",
            Scope::Mock => "mock",
        }
    }

    /// Whether a binding with this scope may replace an already registered one
    #[inline]
    #[must_use]
    pub const fn overrides(&self) -> bool {
        matches!(self, Scope::Mock)
    }

    #[inline]
    #[must_use]
    pub const fn is_cached(&self) -> bool {
        matches!(self, Scope::Singleton)
    }
}

impl Display for Scope {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[cfg(test)]
mod tests {
    use super::Scope::*;

    #[test]
    fn test_only_mock_overrides() {
        assert!(Mock.overrides());
        for scope in [Transient, Singleton, Provides, Route] {
            assert!(!scope.overrides(), "{scope} shouldn't override");
        }
    }

    #[test]
    fn test_only_singleton_cached() {
        assert!(Singleton.is_cached());
        assert!(!Provides.is_cached());
        assert!(!Route.is_cached());
    }
}
