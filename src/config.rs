/// Environment variable enabling test mode in [`Config::from_env`]. Any value counts.
pub const TEST_MODE_ENV: &str = "BINDERY_TEST";

/// Config for a container
/// ## Fields
/// - `test_mode`:
///   If `true`, [`crate::Scope::Mock`] bindings can be registered and override other bindings.
///
///   Outside test mode a mock registration fails with [`crate::RegisterErrorKind::MockOutsideTest`].
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Config {
    pub test_mode: bool,
}

impl Config {
    #[inline]
    #[must_use]
    pub const fn test() -> Self {
        Self { test_mode: true }
    }

    #[must_use]
    pub fn from_env() -> Self {
        Self {
            test_mode: std::env::var_os(TEST_MODE_ENV).is_some(),
        }
    }
}
