//! Wallpaper Agent - rotates the desktop wallpaper and lock screen.
//!
//! The agent watches a directory of images and periodically applies a
//! randomly chosen one, biased towards recently added files. Lock-screen
//! updates follow the session lock state.

pub mod agent;
pub mod cache;
pub mod cli;
pub mod config;
pub mod constants;
pub mod error;
pub mod platform;
pub mod schema;
pub mod wallpaper;
