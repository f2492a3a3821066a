use std::{collections::BTreeMap, sync::Arc};

use parking_lot::RwLock;
use tracing::{debug, error};

use crate::{
    binding::Binding,
    errors::{RegisterErrorKind, ResolveErrorKind},
    key::BindKey,
};

/// Normalized key to [`Binding`] map.
///
/// Each key holds at most one binding; only [`crate::Scope::Mock`] bindings replace an existing one.
pub struct Registry {
    binds: RwLock<BTreeMap<BindKey, Arc<Binding>>>,
    test_mode: bool,
}

impl Registry {
    #[inline]
    #[must_use]
    pub const fn new(test_mode: bool) -> Self {
        Self {
            binds: RwLock::new(BTreeMap::new()),
            test_mode,
        }
    }

    /// Registers a binding
    ///
    /// # Errors
    /// - Returns [`RegisterErrorKind::MockOutsideTest`] for a mock binding when test mode is off
    /// - Returns [`RegisterErrorKind::DuplicateBinding`] if the key is already bound by a non-mock binding.
    ///   The first registration stays active.
    pub fn register(&self, binding: Binding) -> Result<(), RegisterErrorKind> {
        let key = binding.key();

        if binding.scope().overrides() {
            if !self.test_mode {
                let err = RegisterErrorKind::MockOutsideTest {
                    key: binding.binds().to_owned(),
                };
                error!("{}", err);
                return Err(err);
            }
            debug!(binds = binding.binds(), "Mock bind put in registry");
            self.binds.write().insert(key, Arc::new(binding));
            return Ok(());
        }

        let mut binds = self.binds.write();
        if binds.contains_key(&key) {
            let err = RegisterErrorKind::DuplicateBinding {
                key: binding.binds().to_owned(),
            };
            error!("{}", err);
            return Err(err);
        }
        debug!(binds = binding.binds(), scope = %binding.scope(), "Bind put in registry");
        binds.insert(key, Arc::new(binding));
        Ok(())
    }

    /// Looks up a binding by its (not normalized) name
    ///
    /// # Errors
    /// Returns [`ResolveErrorKind::NoBinding`] if nothing is bound to the name
    pub fn lookup(&self, name: &str) -> Result<Arc<Binding>, ResolveErrorKind> {
        match self.binds.read().get(&BindKey::new(name)) {
            Some(binding) => Ok(binding.clone()),
            None => Err(ResolveErrorKind::NoBinding { key: name.to_owned() }),
        }
    }

    #[inline]
    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.binds.read().contains_key(&BindKey::new(name))
    }

    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.binds.read().len()
    }

    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.binds.read().is_empty()
    }

    #[inline]
    #[must_use]
    pub const fn test_mode(&self) -> bool {
        self.test_mode
    }
}
