//! # shedmull-workflow
//!
//! Galaxy workflow handling for shedmull.
//!
//! Handles:
//! - **Document**: Loading native `.ga` JSON and gxformat2 YAML workflows.
//! - **Steps**: Walking steps (including subworkflows) in order.
//! - **Parser**: One tool reference per tool step.
//! - **Install list**: Repositories grouped with their revision sets.
//! - **Galaxy**: Asking a Galaxy server to install those repositories.

#![cfg_attr(test, allow(clippy::expect_used, clippy::unwrap_used))]

pub mod document;
pub mod galaxy;
pub mod install_list;
pub mod parser;
pub mod steps;
