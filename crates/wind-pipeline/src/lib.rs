//! Adaptive-resolution wind acquisition pipeline.
//!
//! Turns a sparse, rate-limited point-forecast API into a dense, cacheable
//! (u, v) vector field: cache-first retrieval, bounded retry with grid
//! degradation on provider pushback, and deterministic field assembly.

pub mod builder;
pub mod client;
pub mod orchestrator;
pub mod provider;
pub mod state;

pub use builder::build_wind_field;
pub use client::OpenMeteoClient;
pub use orchestrator::{Acquired, AcquireConfig, FieldOrigin, Orchestrator};
pub use provider::{LocationSeries, PointSeries, ProviderError, WindProvider};
pub use state::{Degradation, FetchEvent, FetchState, ResponseClass};
