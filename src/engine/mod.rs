//! Analysis engine module.
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────┐
//! │                 AnalysisEngine (trait)                    │
//! │                                                          │
//! │   ┌────────────────┐     ┌──────────────┐                │
//! │   │ResourceLocator │     │ NativeEngine │  (libloading)  │
//! │   │ - locate       │────▶│ FixedEngine  │  (stand-in)    │
//! │   │ - verify       │     └──────┬───────┘                │
//! │   └────────────────┘            │                        │
//! │                                 ▼                        │
//! │                    ┌──────────────────────┐              │
//! │                    │ EngineLoader::get()   │              │
//! │                    │ one shared handle     │              │
//! │                    └──────────────────────┘              │
//! └──────────────────────────────────────────────────────────┘
//! ```
//!
//! # Quick start
//!
//! ```rust,no_run
//! use lip_sync::config::{EngineBackend, EngineConfig};
//! use lip_sync::engine::EngineLoader;
//!
//! # async fn example() {
//! let config = EngineConfig { backend: EngineBackend::Fixed, ..EngineConfig::default() };
//! let loader = EngineLoader::from_config(&config);
//!
//! let engine = loader.get().await.unwrap();
//! let cues = engine.analyze(&vec![0i16; 16_000], 16_000, "").unwrap();
//! # }
//! ```

pub mod analysis;
pub mod fixed;
pub mod loader;
pub mod native;
pub mod resources;

// ── Public re-exports ──────────────────────────────────────────────────────

pub use analysis::{AnalysisEngine, EngineError, NativeCue};
pub use fixed::FixedEngine;
pub use loader::{EngineFactory, EngineHandle, EngineInitError, EngineLoader};
pub use native::NativeEngine;
pub use resources::{ResourceLocator, RESOURCE_EXTENSIONS};
