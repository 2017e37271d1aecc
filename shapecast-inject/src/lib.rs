//! Process-wide dependency resolution registry for Shapecast.
//!
//! Fields marked as injected are not parsed from input; their values are
//! resolved here by token. The registry holds an ordered provider table
//! (token → static value or factory) plus an optional fallback resolver,
//! and is independent of the metadata registry.
//!
//! Resolution never caches: a factory-backed token is invoked fresh on
//! every [`resolve`] call, so repeated resolutions may yield distinct
//! results. State persists until explicitly reconfigured; tests isolate
//! themselves with [`reset`].

mod error;
mod provider;
mod registry;

pub use error::{InjectError, InjectResult};
pub use provider::{FallbackResolver, FallbackUpdate, Provider, ProvideFactory, Resolution};
pub use registry::{configure, reset, resolve, ConfigureOptions};
