//! Compiled library cache
//!
//! Entries are keyed by `VersionedIdentifier` and shared as `Arc<T>`. A compile for
//! a missing key runs under a per-key guard, so concurrent callers asking for the
//! same library wait for the first compile instead of repeating it. Compilation
//! never runs while a map shard is locked. Failed compiles are not cached.
//!
//! Every `remove` and `clear` advances a generation counter. A compile that
//! overlapped one of them may have read content that has since changed, so its
//! result goes back to the caller but is not stored.

use dashmap::DashMap;
use log::{debug, info};
use octofhir_cqf_model::VersionedIdentifier;
use parking_lot::{Mutex, RwLock};
use std::sync::Arc;

pub struct CompiledLibraryCache<T> {
    entries: DashMap<VersionedIdentifier, Arc<T>>,
    in_flight: DashMap<VersionedIdentifier, Arc<Mutex<()>>>,
    generation: RwLock<u64>,
}

impl<T> Default for CompiledLibraryCache<T> {
    fn default() -> Self {
        Self {
            entries: DashMap::new(),
            in_flight: DashMap::new(),
            generation: RwLock::new(0),
        }
    }
}

impl<T> CompiledLibraryCache<T> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Return the cached entry for `key`, compiling it with `compile` on a miss
    pub fn get_or_compile<E, F>(&self, key: &VersionedIdentifier, compile: F) -> Result<Arc<T>, E>
    where
        F: FnOnce() -> Result<T, E>,
    {
        if let Some(hit) = self.get(key) {
            debug!("Library {key} found in compiled cache");
            return Ok(hit);
        }

        let guard = Arc::clone(self.in_flight.entry(key.clone()).or_default().value());
        let _compiling = guard.lock();

        // compiled by whoever held the guard before us
        if let Some(hit) = self.get(key) {
            debug!("Library {key} compiled by a concurrent caller");
            return Ok(hit);
        }

        let started = *self.generation.read();
        debug!("Compiling library {key}");
        let compiled = match compile() {
            Ok(compiled) => Arc::new(compiled),
            Err(err) => {
                self.in_flight.remove(key);
                return Err(err);
            }
        };

        // read guard spans the insert; remove and clear take the write side
        let generation = self.generation.read();
        let stored = if *generation == started {
            Arc::clone(self.entries.entry(key.clone()).or_insert(compiled).value())
        } else {
            debug!("Library {key} was invalidated while compiling, not caching the result");
            compiled
        };
        drop(generation);
        self.in_flight.remove(key);
        Ok(stored)
    }

    pub fn get(&self, key: &VersionedIdentifier) -> Option<Arc<T>> {
        self.entries.get(key).map(|entry| Arc::clone(entry.value()))
    }

    /// Store a compiled library directly, replacing any previous entry
    pub fn insert(&self, key: VersionedIdentifier, compiled: T) -> Arc<T> {
        let compiled = Arc::new(compiled);
        self.entries.insert(key, Arc::clone(&compiled));
        compiled
    }

    /// Drop the entry for `key`. A compile of any key still running is not cached.
    pub fn remove(&self, key: &VersionedIdentifier) -> Option<Arc<T>> {
        let mut generation = self.generation.write();
        *generation += 1;
        self.entries.remove(key).map(|(_, compiled)| compiled)
    }

    pub fn clear(&self) {
        let mut generation = self.generation.write();
        *generation += 1;
        let dropped = self.entries.len();
        self.entries.clear();
        drop(generation);
        info!("Cleared compiled library cache ({dropped} entries)");
    }

    pub fn contains(&self, key: &VersionedIdentifier) -> bool {
        self.entries.contains_key(key)
    }

    pub fn keys(&self) -> Vec<VersionedIdentifier> {
        self.entries.iter().map(|entry| entry.key().clone()).collect()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::LibraryError;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Barrier;
    use std::thread;

    fn key(version: &str) -> VersionedIdentifier {
        VersionedIdentifier::with_version("Lib", version)
    }

    #[test]
    fn test_compiles_once_per_key() {
        let cache = CompiledLibraryCache::new();
        let compiles = AtomicUsize::new(0);
        let compile = || {
            compiles.fetch_add(1, Ordering::SeqCst);
            Ok::<_, LibraryError>("elm".to_string())
        };

        let first = cache.get_or_compile(&key("1.0.0"), compile).unwrap();
        let second = cache.get_or_compile(&key("1.0.0"), compile).unwrap();

        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(compiles.load(Ordering::SeqCst), 1);
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn test_failed_compile_is_not_cached() {
        let cache: CompiledLibraryCache<String> = CompiledLibraryCache::new();
        let failed = cache.get_or_compile(&key("1.0.0"), || {
            Err(LibraryError::compile(&key("1.0.0"), "syntax error"))
        });
        assert!(failed.is_err());
        assert!(cache.is_empty());
        assert!(cache.in_flight.is_empty());

        let recovered = cache
            .get_or_compile(&key("1.0.0"), || Ok::<_, LibraryError>("elm".to_string()))
            .unwrap();
        assert_eq!(recovered.as_str(), "elm");
    }

    #[test]
    fn test_failed_compiles_leave_no_guards() {
        let cache: CompiledLibraryCache<String> = CompiledLibraryCache::new();
        for minor in 0..100 {
            let key = key(&format!("1.{minor}.0"));
            let failed = cache.get_or_compile(&key, || Err(LibraryError::compile(&key, "syntax error")));
            assert!(failed.is_err());
        }
        assert!(cache.in_flight.is_empty());
        assert!(cache.is_empty());
    }

    #[test]
    fn test_remove_during_compile_discards_result() {
        let cache: CompiledLibraryCache<String> = CompiledLibraryCache::new();
        let compiled = cache
            .get_or_compile(&key("1.0.0"), || {
                cache.remove(&key("1.0.0"));
                Ok::<_, LibraryError>("elm from old content".to_string())
            })
            .unwrap();

        assert_eq!(compiled.as_str(), "elm from old content");
        assert!(cache.get(&key("1.0.0")).is_none());
        assert!(cache.in_flight.is_empty());

        let fresh = cache
            .get_or_compile(&key("1.0.0"), || Ok::<_, LibraryError>("elm from new content".to_string()))
            .unwrap();
        assert_eq!(fresh.as_str(), "elm from new content");
        assert_eq!(cache.get(&key("1.0.0")).as_deref().map(String::as_str), Some("elm from new content"));
    }

    #[test]
    fn test_clear_during_compile_discards_result() {
        let cache: CompiledLibraryCache<i32> = CompiledLibraryCache::new();
        let compiled = cache
            .get_or_compile(&key("1.0.0"), || {
                cache.clear();
                Ok::<_, LibraryError>(1)
            })
            .unwrap();

        assert_eq!(*compiled, 1);
        assert!(cache.is_empty());
    }

    #[test]
    fn test_remove_and_clear() {
        let cache = CompiledLibraryCache::new();
        cache.insert(key("1.0.0"), 1);
        cache.insert(key("2.0.0"), 2);

        assert_eq!(cache.remove(&key("1.0.0")).as_deref(), Some(&1));
        assert!(cache.remove(&key("1.0.0")).is_none());
        assert!(cache.contains(&key("2.0.0")));

        cache.clear();
        assert!(cache.is_empty());
    }

    #[test]
    fn test_concurrent_callers_share_one_compile() {
        let cache = Arc::new(CompiledLibraryCache::new());
        let compiles = Arc::new(AtomicUsize::new(0));
        let barrier = Arc::new(Barrier::new(8));

        let handles: Vec<_> = (0..8)
            .map(|_| {
                let cache = Arc::clone(&cache);
                let compiles = Arc::clone(&compiles);
                let barrier = Arc::clone(&barrier);
                thread::spawn(move || {
                    barrier.wait();
                    cache
                        .get_or_compile(&key("1.0.0"), || {
                            compiles.fetch_add(1, Ordering::SeqCst);
                            thread::sleep(std::time::Duration::from_millis(20));
                            Ok::<_, LibraryError>(42)
                        })
                        .unwrap()
                })
            })
            .collect();

        let results: Vec<Arc<i32>> = handles.into_iter().map(|h| h.join().unwrap()).collect();
        assert!(results.iter().all(|r| Arc::ptr_eq(r, &results[0])));
        assert_eq!(compiles.load(Ordering::SeqCst), 1);
    }
}
