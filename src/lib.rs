//! Maze-chase simulation engine library crate.
#![cfg_attr(coverage_nightly, feature(coverage_attribute))]

#[cfg_attr(coverage_nightly, coverage(off))]
pub mod app;
#[cfg_attr(coverage_nightly, coverage(off))]
pub mod error;
#[cfg_attr(coverage_nightly, coverage(off))]
pub mod events;
#[cfg_attr(coverage_nightly, coverage(off))]
pub mod logging;

pub mod config;
pub mod constants;
pub mod game;
pub mod level;
pub mod map;
pub mod render;
pub mod systems;
