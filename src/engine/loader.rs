//! Get-or-create access to the one shared analysis engine.
//!
//! [`EngineLoader`] owns a single slot holding the *in-flight* construction,
//! not the finished engine.  The first caller of [`EngineLoader::get`] starts
//! construction and parks a shared future in the slot; every later caller,
//! whether it arrives mid-construction or long after, awaits a clone of that
//! same future.  So at most one construction runs at a time and everybody
//! observes the same [`EngineHandle`].
//!
//! ```text
//! get() ──▶ slot empty? ──yes──▶ spawn_blocking(factory) ─▶ Shared ─▶ slot
//!               │                                             │
//!               └──no──────────────── clone ◀─────────────────┘
//!                                       │
//!                                     .await ──▶ Ok(handle)  (slot kept)
//!                                           └──▶ Err(e)      (slot cleared, every waiter gets e)
//! ```
//!
//! A failed construction is handed to every waiter and then dropped from the
//! slot, so the next call starts a fresh attempt.

use std::sync::{Arc, Mutex, PoisonError};

use futures::future::{BoxFuture, FutureExt, Shared};
use thiserror::Error;

use crate::config::{EngineBackend, EngineConfig};
use crate::engine::analysis::AnalysisEngine;
use crate::engine::fixed::FixedEngine;
use crate::engine::native::NativeEngine;
use crate::engine::resources::ResourceLocator;

// ---------------------------------------------------------------------------
// EngineInitError
// ---------------------------------------------------------------------------

/// Why the shared engine could not be constructed.
///
/// `Clone` so one failed construction can be delivered to every waiter.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum EngineInitError {
    /// A required resource file (or the library itself) is missing.
    #[error("engine resource not found: {0}")]
    ResourceMissing(String),

    /// The native library could not be opened or lacks a symbol.
    #[error("failed to load engine library: {0}")]
    Library(String),

    /// The engine's own initialisation failed.
    #[error("engine initialisation failed: {0}")]
    Init(String),

    /// The blocking construction task panicked or was cancelled.
    #[error("engine construction task failed: {0}")]
    Join(String),
}

// ---------------------------------------------------------------------------
// Types
// ---------------------------------------------------------------------------

/// Shared, read-only reference to the constructed engine.
pub type EngineHandle = Arc<dyn AnalysisEngine>;

/// Builds an engine.  Runs on a blocking thread, at most once at a time.
pub type EngineFactory =
    Arc<dyn Fn(&ResourceLocator) -> Result<EngineHandle, EngineInitError> + Send + Sync>;

type Construction = Shared<BoxFuture<'static, Result<EngineHandle, EngineInitError>>>;

// ---------------------------------------------------------------------------
// EngineLoader
// ---------------------------------------------------------------------------

/// Lifecycle owner of the shared [`EngineHandle`].
///
/// There is no teardown: once constructed, the engine lives as long as the
/// loader (normally the process).
pub struct EngineLoader {
    locator: ResourceLocator,
    factory: EngineFactory,
    slot: Mutex<Option<Construction>>,
}

impl std::fmt::Debug for EngineLoader {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EngineLoader")
            .field("locator", &self.locator)
            .field("constructed", &self.current().is_some())
            .finish_non_exhaustive()
    }
}

impl EngineLoader {
    /// Create a loader that builds its engine with `factory`.
    pub fn new(locator: ResourceLocator, factory: EngineFactory) -> Self {
        Self {
            locator,
            factory,
            slot: Mutex::new(None),
        }
    }

    /// Create a loader for the backend selected in `config`.
    ///
    /// Nothing is constructed until the first [`get`](Self::get).
    pub fn from_config(config: &EngineConfig) -> Self {
        let locator = ResourceLocator::new(config.resolved_resource_dir());

        let factory: EngineFactory = match config.backend {
            EngineBackend::Native => {
                let library_name = config.library_name.clone();
                let required = config.required_resources.clone();
                Arc::new(
                    move |locator: &ResourceLocator| -> Result<EngineHandle, EngineInitError> {
                        locator.verify(required.as_slice())?;
                        let engine = NativeEngine::load(locator, &library_name)?;
                        Ok(Arc::new(engine) as EngineHandle)
                    },
                )
            }
            EngineBackend::Fixed => Arc::new(
                |_: &ResourceLocator| -> Result<EngineHandle, EngineInitError> {
                    Ok(Arc::new(FixedEngine::default()) as EngineHandle)
                },
            ),
        };

        Self::new(locator, factory)
    }

    pub fn locator(&self) -> &ResourceLocator {
        &self.locator
    }

    /// Return the shared engine, constructing it on first use.
    ///
    /// Concurrent callers share one construction.  If it fails, all of them
    /// receive the error and the next call tries again.
    ///
    /// # Errors
    ///
    /// The [`EngineInitError`] of the construction this call awaited.
    pub async fn get(&self) -> Result<EngineHandle, EngineInitError> {
        let construction = {
            let mut slot = self.slot.lock().unwrap_or_else(PoisonError::into_inner);
            match slot.as_ref() {
                Some(existing) => existing.clone(),
                None => {
                    let started = self.begin_construction();
                    *slot = Some(started.clone());
                    started
                }
            }
        };

        let result = construction.clone().await;

        if let Err(e) = &result {
            let mut slot = self.slot.lock().unwrap_or_else(PoisonError::into_inner);
            // Only clear the attempt we awaited; a newer one may already be running.
            if slot.as_ref().is_some_and(|current| current.ptr_eq(&construction)) {
                log::warn!("engine: construction failed, will retry on next request: {e}");
                *slot = None;
            }
        }

        result
    }

    /// The constructed engine, without triggering construction.
    ///
    /// `None` while nothing has been constructed, while construction is still
    /// running, or after it failed.
    pub fn current(&self) -> Option<EngineHandle> {
        let slot = self.slot.lock().unwrap_or_else(PoisonError::into_inner);
        slot.as_ref()
            .and_then(|construction| construction.peek())
            .and_then(|result| result.as_ref().ok())
            .cloned()
    }

    fn begin_construction(&self) -> Construction {
        let factory = Arc::clone(&self.factory);
        let locator = self.locator.clone();

        log::info!(
            "engine: constructing analysis engine (resources: {})",
            locator.base_dir().display()
        );

        async move {
            let started = std::time::Instant::now();
            let handle = tokio::task::spawn_blocking(move || factory(&locator))
                .await
                .map_err(|e| EngineInitError::Join(e.to_string()))??;
            log::info!(
                "engine: analysis engine ready in {} ms",
                started.elapsed().as_millis()
            );
            Ok::<_, EngineInitError>(handle)
        }
        .boxed()
        .shared()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    use tempfile::tempdir;

    use crate::engine::analysis::{EngineError, NativeCue};

    /// Counts constructions; sleeps so concurrent callers overlap with it.
    fn counting_factory(count: Arc<AtomicUsize>) -> EngineFactory {
        Arc::new(move |_: &ResourceLocator| -> Result<EngineHandle, EngineInitError> {
            count.fetch_add(1, Ordering::SeqCst);
            std::thread::sleep(Duration::from_millis(50));
            Ok(Arc::new(FixedEngine::default()) as EngineHandle)
        })
    }

    /// Fails the first `failures` constructions, then succeeds.
    fn flaky_factory(count: Arc<AtomicUsize>, failures: usize) -> EngineFactory {
        Arc::new(move |_: &ResourceLocator| -> Result<EngineHandle, EngineInitError> {
            let attempt = count.fetch_add(1, Ordering::SeqCst);
            std::thread::sleep(Duration::from_millis(20));
            if attempt < failures {
                Err(EngineInitError::Init(format!("attempt {attempt} failed")))
            } else {
                Ok(Arc::new(FixedEngine::default()) as EngineHandle)
            }
        })
    }

    fn loader_with(factory: EngineFactory) -> EngineLoader {
        EngineLoader::new(ResourceLocator::new("/unused"), factory)
    }

    #[tokio::test]
    async fn concurrent_first_calls_share_one_construction() {
        let count = Arc::new(AtomicUsize::new(0));
        let loader = loader_with(counting_factory(count.clone()));

        let (a, b, c) = tokio::join!(loader.get(), loader.get(), loader.get());
        let (a, b, c) = (a.unwrap(), b.unwrap(), c.unwrap());

        assert_eq!(count.load(Ordering::SeqCst), 1);
        assert!(Arc::ptr_eq(&a, &b));
        assert!(Arc::ptr_eq(&b, &c));
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn concurrent_calls_from_spawned_tasks_share_one_construction() {
        let count = Arc::new(AtomicUsize::new(0));
        let loader = Arc::new(loader_with(counting_factory(count.clone())));

        let tasks: Vec<_> = (0..8)
            .map(|_| {
                let loader = Arc::clone(&loader);
                tokio::spawn(async move { loader.get().await })
            })
            .collect();

        let mut handles = Vec::new();
        for task in tasks {
            handles.push(task.await.unwrap().unwrap());
        }

        assert_eq!(count.load(Ordering::SeqCst), 1);
        assert!(handles.windows(2).all(|w| Arc::ptr_eq(&w[0], &w[1])));
    }

    #[tokio::test]
    async fn later_calls_reuse_completed_engine() {
        let count = Arc::new(AtomicUsize::new(0));
        let loader = loader_with(counting_factory(count.clone()));

        let first = loader.get().await.unwrap();
        let second = loader.get().await.unwrap();

        assert_eq!(count.load(Ordering::SeqCst), 1);
        assert!(Arc::ptr_eq(&first, &second));
    }

    #[tokio::test]
    async fn failure_reaches_every_waiter_and_is_retried() {
        let count = Arc::new(AtomicUsize::new(0));
        let loader = loader_with(flaky_factory(count.clone(), 1));

        let (a, b) = tokio::join!(loader.get(), loader.get());
        let expected = EngineInitError::Init("attempt 0 failed".into());
        assert_eq!(a.map(|_| ()), Err(expected.clone()));
        assert_eq!(b.map(|_| ()), Err(expected));
        assert_eq!(count.load(Ordering::SeqCst), 1);
        assert!(loader.current().is_none());

        let handle = loader.get().await.expect("second attempt succeeds");
        assert_eq!(count.load(Ordering::SeqCst), 2);
        assert!(Arc::ptr_eq(&handle, &loader.current().unwrap()));
    }

    #[tokio::test]
    async fn current_is_none_before_first_get() {
        let loader = loader_with(counting_factory(Arc::new(AtomicUsize::new(0))));
        assert!(loader.current().is_none());
        loader.get().await.unwrap();
        assert!(loader.current().is_some());
    }

    #[tokio::test]
    async fn panicking_factory_is_reported_as_join_error() {
        let loader = loader_with(Arc::new(|_: &ResourceLocator| -> Result<EngineHandle, EngineInitError> {
            panic!("engine exploded")
        }));
        assert!(matches!(
            loader.get().await,
            Err(EngineInitError::Join(_))
        ));
    }

    #[tokio::test]
    async fn fixed_backend_from_config_analyzes() {
        let config = EngineConfig {
            backend: EngineBackend::Fixed,
            ..EngineConfig::default()
        };
        let loader = EngineLoader::from_config(&config);
        let engine = loader.get().await.unwrap();

        let cues = engine.analyze(&[0; 320], 16_000, "").unwrap();
        assert_eq!(cues[0], NativeCue::new(0.0, 0.2, "X"));
        assert!(matches!(
            engine.analyze(&[], 16_000, ""),
            Err(EngineError::InvalidAudio(_))
        ));
    }

    #[tokio::test]
    async fn native_backend_reports_missing_resources() {
        let dir = tempdir().expect("temp dir");
        let config = EngineConfig {
            backend: EngineBackend::Native,
            resource_dir: Some(dir.path().to_path_buf()),
            ..EngineConfig::default()
        };
        let loader = EngineLoader::from_config(&config);

        match loader.get().await {
            Err(EngineInitError::ResourceMissing(path)) => {
                assert!(path.ends_with("acoustic-model.data"), "got {path}")
            }
            other => panic!("expected ResourceMissing, got {:?}", other.map(|_| ())),
        }
    }

    #[tokio::test]
    async fn abandoned_wait_does_not_restart_construction() {
        let count = Arc::new(AtomicUsize::new(0));
        let loader = loader_with(counting_factory(count.clone()));

        let abandoned = tokio::time::timeout(Duration::from_millis(5), loader.get()).await;
        assert!(abandoned.is_err(), "construction should still be running");

        let first = loader.get().await.unwrap();
        let second = loader.get().await.unwrap();

        assert_eq!(count.load(Ordering::SeqCst), 1);
        assert!(Arc::ptr_eq(&first, &second));
    }

    #[tokio::test]
    async fn native_backend_reaches_library_check_once_resources_exist() {
        let dir = tempdir().expect("temp dir");
        let config = EngineConfig {
            backend: EngineBackend::Native,
            resource_dir: Some(dir.path().to_path_buf()),
            required_resources: vec!["model.data".into()],
            ..EngineConfig::default()
        };
        std::fs::write(dir.path().join("model.data"), b"x").unwrap();

        let loader = EngineLoader::from_config(&config);
        let library = libloading::library_filename("rhubarb");

        match loader.get().await {
            Err(EngineInitError::ResourceMissing(path)) => {
                assert!(path.ends_with(&*library.to_string_lossy()), "got {path}")
            }
            other => panic!("expected ResourceMissing, got {:?}", other.map(|_| ())),
        }
    }
}
