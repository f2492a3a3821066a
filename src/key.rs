use ahash::RandomState;
use core::{
    any::type_name,
    fmt::{self, Display, Formatter},
};

// Fixed seeds keep keys stable for the whole process, unlike `RandomState::new`
const SEEDS: [u64; 4] = [0x243f_6a88_85a3_08d3, 0x1319_8a2e_0370_7344, 0xa409_3822_299f_31d0, 0x082e_fa98_ec4e_6c89];

const TRIMMED: &[char] = &[' ', '\t', '\n', '\r', '\0', '\x0B', '\\'];

/// Symbolic name of `T` as used for type-keyed bindings and [`crate::Inject`] parameters
#[inline]
#[must_use]
pub fn key_of<T: ?Sized + 'static>() -> &'static str {
    type_name::<T>()
}

/// Normalized, content-addressed key of a binding name.
///
/// Names are trimmed of whitespace, NUL, vertical tab and `\`, lowercased (ASCII)
/// and hashed to a fixed-width value.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct BindKey(u64);

impl BindKey {
    #[must_use]
    pub fn new(name: &str) -> Self {
        let normalized = normalize(name);
        Self(RandomState::with_seeds(SEEDS[0], SEEDS[1], SEEDS[2], SEEDS[3]).hash_one(normalized.as_str()))
    }

    #[inline]
    #[must_use]
    pub fn of<T: ?Sized + 'static>() -> Self {
        Self::new(key_of::<T>())
    }

    #[inline]
    #[must_use]
    pub const fn as_u64(&self) -> u64 {
        self.0
    }
}

impl Display for BindKey {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{:016x}", self.0)
    }
}

impl From<&str> for BindKey {
    fn from(name: &str) -> Self {
        Self::new(name)
    }
}

#[must_use]
pub(crate) fn normalize(name: &str) -> String {
    name.trim_matches(TRIMMED).to_ascii_lowercase()
}
