//! core
//!
//! Domain types, message drafting, and configuration.
//!
//! # Modules
//!
//! - [`types`] - Tracks, now-playing state, staging plans
//! - [`vibes`] - The vibe catalog and custom vibe loading
//! - [`draft`] - Commit message assembly
//! - [`config`] - Configuration schema and loading
//! - [`paths`] - Per-user storage locations

pub mod config;
pub mod draft;
pub mod paths;
pub mod types;
pub mod vibes;
