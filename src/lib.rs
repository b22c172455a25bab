//! Commit Vibes - add your mood and your music to git commits
//!
//! Commit Vibes wraps `git commit` in a short dialogue: pick what to stage,
//! write a message, choose a vibe, and optionally append the song playing
//! on Spotify. Demo and preview modes run the same dialogue without
//! changing anything.
//!
//! # Architecture
//!
//! - [`cli`] - Command-line interface layer (parses args, dispatches to handlers)
//! - [`engine`] - The commit dialogue: Stage → Message → Vibe → Music → Commit
//! - [`core`] - Domain types, vibes, message drafting, configuration, paths
//! - [`git`] - Single interface for all Git operations
//! - [`music`] - Music service abstraction (Spotify, demo data)
//! - [`auth`] - Spotify OAuth and token refresh
//! - [`secrets`] - Token file storage
//! - [`ui`] - Output and interactive prompts
//!
//! # Invariants
//!
//! 1. Every prompt is answered before anything is staged or committed
//! 2. Demo and preview runs never stage or commit
//! 3. A rejected access token is refreshed at most once per run
//! 4. Token values never appear in output or logs

pub mod auth;
pub mod cli;
pub mod core;
pub mod engine;
pub mod git;
pub mod music;
pub mod secrets;
pub mod ui;
