//! Core types and configuration for xtci.
//!
//! This crate defines the `xtci.toml` schema ([`XtciConfig`]), the tag
//! matrix that drives image builds ([`TagMatrix`]), the module registry
//! ([`ModuleRegistry`]), the per-run settings assembled from the CI
//! environment ([`RunSettings`]), and shared error types.

pub mod config;
pub mod error;
pub mod image;
pub mod matrix;
pub mod module;
pub mod settings;

pub use config::{ModulesConfig, RegistryConfig, XtciConfig};
pub use error::{Error, Result};
pub use image::ImageRef;
pub use matrix::{CompilerPair, MatrixEntry, TagMatrix};
pub use module::{CI_FILES, CiFile, Module, ModuleMeta, ModuleRegistry};
pub use settings::{EnvSnapshot, RunSettings};
