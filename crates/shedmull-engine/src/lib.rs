//! # shedmull-engine
//!
//! Drives a whole run: workflow → tool references → package targets →
//! image name → download or build, one tool at a time.

#![cfg_attr(test, allow(clippy::expect_used, clippy::unwrap_used))]

pub mod engine;
pub mod report;
