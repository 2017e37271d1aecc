//! Core type definitions for Shapecast.
//!
//! This crate defines the fundamental, engine-agnostic types used
//! throughout the marshaling core:
//! - [`Problem`] — a single path-addressed error record
//! - [`Severity`] — the two error tiers (hard = structural, soft = semantic)
//! - [`ValidationError`] — an aggregate, thrown failure carrying one or
//!   more problems
//! - [`path`] — deterministic error-path construction helpers
//!
//! All declaration and engine types belong in their respective crates,
//! not here.

pub mod path;
mod problem;

pub use problem::{Problem, Severity, ValidationError};
