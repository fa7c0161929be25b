//! Terminal dashboard of 2024 homicide statistics for Colombian municipalities.
//!
//! The core (`data`, `stats`, `dashboard`) is pure and terminal-agnostic; `map`,
//! `braille` and `ui` draw it with ratatui.

pub mod app;
pub mod braille;
pub mod config;
pub mod dashboard;
pub mod data;
pub mod error;
pub mod map;
pub mod stats;
pub mod ui;
