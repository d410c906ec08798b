//! Command-line tool for packaging resource bundles into CDC-engine tiger
//! archives
//!
//! The `tigerpack` binary drives [`tigerpack_formats`]: it reads a section
//! manifest, resolves the catalog from payload files on disk, composes the
//! DRM bundle, and splices it into the master archive. This library crate
//! carries the command implementations so integration tests can call them
//! directly.

#![allow(clippy::uninlined_format_args)]

pub mod commands;
mod config;

pub use config::BuildConfig;
