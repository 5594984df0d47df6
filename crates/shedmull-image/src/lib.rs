//! # shedmull-image
//!
//! Container image handling for shedmull.
//!
//! Handles:
//! - **Naming**: Mulled v1/v2 image identifiers from package targets.
//! - **Storage**: The local image directory.
//! - **Depot**: Downloading pre-built images over HTTP.
//! - **Build**: Driving the external `mulled-build` tool.
//! - **Acquire**: Download-then-build state machine per tool.

#![cfg_attr(test, allow(clippy::expect_used, clippy::unwrap_used))]

pub mod acquire;
pub mod build;
pub mod depot;
pub mod naming;
pub mod storage;
