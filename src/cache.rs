use std::{
    collections::{BTreeMap, HashMap},
    mem,
    thread::{self, ThreadId},
};

use parking_lot::{Condvar, Mutex};
use tracing::{debug, error};

use crate::{any::Instance, errors::ResolveErrorKind, key::BindKey};

enum Slot {
    Constructing(ThreadId),
    Constructed(Instance),
}

#[derive(Default)]
struct CacheState {
    slots: BTreeMap<BindKey, Slot>,
    // Thread to the key it's blocked on
    waiting: HashMap<ThreadId, BindKey>,
}

impl CacheState {
    /// Whether waiting for `owner` would (transitively) wait for `current`
    fn leads_to(&self, mut owner: ThreadId, current: ThreadId) -> bool {
        for _ in 0..=self.waiting.len() {
            if owner == current {
                return true;
            }
            let Some(key) = self.waiting.get(&owner) else {
                return false;
            };
            match self.slots.get(key) {
                Some(Slot::Constructing(next)) => owner = *next,
                _ => return false,
            }
        }
        false
    }
}

/// Singleton instances by key.
///
/// A key goes `absent -> Constructing(thread) -> Constructed(instance)`.
/// Only the claiming thread constructs; other threads wait for the result.
/// A failed construction returns the key to `absent`.
#[derive(Default)]
pub(crate) struct Cache {
    state: Mutex<CacheState>,
    constructed: Condvar,
}

impl Cache {
    #[inline]
    #[must_use]
    pub(crate) fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub(crate) fn get(&self, key: &BindKey) -> Option<Instance> {
        match self.state.lock().slots.get(key) {
            Some(Slot::Constructed(instance)) => Some(instance.clone()),
            _ => None,
        }
    }

    #[must_use]
    pub(crate) fn len(&self) -> usize {
        self.state
            .lock()
            .slots
            .values()
            .filter(|slot| matches!(slot, Slot::Constructed(_)))
            .count()
    }

    /// Returns the cached instance for `key` or constructs, caches and returns it.
    ///
    /// `construct` runs without the cache lock held, so it may resolve other singletons.
    ///
    /// # Errors
    /// - Returns [`ResolveErrorKind::CyclicResolution`] if `key` is being constructed by the current thread,
    ///   or by a thread that is waiting for the current one
    /// - Returns the error of `construct`, nothing is cached in this case
    pub(crate) fn get_or_construct<F>(&self, key: BindKey, name: &str, construct: F) -> Result<Instance, ResolveErrorKind>
    where
        F: FnOnce() -> Result<Instance, ResolveErrorKind>,
    {
        let current = thread::current().id();

        let mut state = self.state.lock();
        loop {
            match state.slots.get(&key) {
                Some(Slot::Constructed(instance)) => {
                    debug!("Found in cache");
                    return Ok(instance.clone());
                }
                Some(Slot::Constructing(owner)) => {
                    if state.leads_to(*owner, current) {
                        let err = ResolveErrorKind::CyclicResolution { key: name.to_owned() };
                        error!("{}", err);
                        return Err(err);
                    }
                    debug!("Constructing in another thread, waiting");
                    state.waiting.insert(current, key);
                    self.constructed.wait(&mut state);
                    state.waiting.remove(&current);
                }
                None => break,
            }
        }
        state.slots.insert(key, Slot::Constructing(current));
        drop(state);
        debug!("Not found in cache");

        let claim = Claim { cache: self, key };
        let instance = construct()?;
        claim.complete(instance.clone());
        debug!("Cached");

        Ok(instance)
    }
}

/// Construction claim on a key. Dropping it without [`Claim::complete`] releases the key.
struct Claim<'a> {
    cache: &'a Cache,
    key: BindKey,
}

impl Claim<'_> {
    fn complete(self, instance: Instance) {
        self.cache.state.lock().slots.insert(self.key, Slot::Constructed(instance));
        self.cache.constructed.notify_all();
        mem::forget(self);
    }
}

impl Drop for Claim<'_> {
    fn drop(&mut self) {
        self.cache.state.lock().slots.remove(&self.key);
        self.cache.constructed.notify_all();
        debug!("Construction claim released");
    }
}

#[cfg(test)]
mod tests {
    use super::Cache;
    use crate::{
        any::Instance,
        errors::{InstantiateErrorKind, ResolveErrorKind},
        key::BindKey,
    };

    use std::{
        sync::{
            atomic::{AtomicU8, Ordering},
            Arc, Barrier,
        },
        thread,
        time::Duration,
    };
    use tracing_test::traced_test;

    #[test]
    #[traced_test]
    fn test_constructed_once() {
        let cache = Cache::new();
        let key = BindKey::new("singleton");
        let calls = AtomicU8::new(0);

        let construct = || {
            calls.fetch_add(1, Ordering::SeqCst);
            Ok(Arc::new(1u8) as Instance)
        };
        let first = cache.get_or_construct(key, "singleton", construct).unwrap();
        let second = cache.get_or_construct(key, "singleton", construct).unwrap();

        assert!(Arc::ptr_eq(&first, &second));
        assert!(Arc::ptr_eq(&first, &cache.get(&key).unwrap()));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert_eq!(cache.len(), 1);
    }

    #[test]
    #[traced_test]
    fn test_failure_not_cached() {
        let cache = Cache::new();
        let key = BindKey::new("singleton");

        let result = cache.get_or_construct(key, "singleton", || {
            Err(ResolveErrorKind::Instantiate(InstantiateErrorKind::msg("boom")))
        });

        assert!(matches!(result, Err(ResolveErrorKind::Instantiate(_))));
        assert!(cache.get(&key).is_none());
        assert!(cache.get_or_construct(key, "singleton", || Ok(Arc::new(()) as Instance)).is_ok());
    }

    #[test]
    #[traced_test]
    fn test_reentry_is_cyclic() {
        let cache = Cache::new();
        let key = BindKey::new("singleton");

        let result = cache.get_or_construct(key, "singleton", || {
            cache.get_or_construct(key, "singleton", || Ok(Arc::new(()) as Instance))
        });

        assert!(matches!(result, Err(ResolveErrorKind::CyclicResolution { key }) if key == "singleton"));
        assert_eq!(cache.len(), 0);
    }

    #[test]
    fn test_concurrent_first_access() {
        let cache = Cache::new();
        let key = BindKey::new("singleton");
        let calls = AtomicU8::new(0);
        let barrier = Barrier::new(8);

        let instances: Vec<Instance> = thread::scope(|s| {
            let handles: Vec<_> = (0..8)
                .map(|_| {
                    s.spawn(|| {
                        barrier.wait();
                        cache
                            .get_or_construct(key, "singleton", || {
                                calls.fetch_add(1, Ordering::SeqCst);
                                thread::sleep(Duration::from_millis(20));
                                Ok(Arc::new(()) as Instance)
                            })
                            .unwrap()
                    })
                })
                .collect();
            handles.into_iter().map(|handle| handle.join().unwrap()).collect()
        });

        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert!(instances.iter().all(|instance| Arc::ptr_eq(instance, &instances[0])));
    }

    #[test]
    fn test_cross_thread_cycle_doesnt_deadlock() {
        let cache = Cache::new();
        let barrier = Barrier::new(2);
        let (first, second) = (BindKey::new("first"), BindKey::new("second"));

        let run = |own: BindKey, other: BindKey| {
            cache.get_or_construct(own, "own", || {
                barrier.wait();
                cache.get_or_construct(other, "other", || Ok(Arc::new(0u8) as Instance))?;
                Ok(Arc::new(1u8) as Instance)
            })
        };

        let (a, b) = thread::scope(|s| {
            let a = s.spawn(|| run(first, second));
            let b = s.spawn(|| run(second, first));
            (a.join().unwrap(), b.join().unwrap())
        });

        let cyclic = [&a, &b]
            .into_iter()
            .filter(|result| matches!(result, Err(ResolveErrorKind::CyclicResolution { .. })))
            .count();
        assert_eq!(cyclic, 1);
        assert!(a.is_ok() || b.is_ok());
    }
}
