//! DRD: Data Resource Directory generator
//!
//! Turns a CSV registry of entities, each tagged with one or more
//! comma-separated type labels, into categorized listings rendered as wiki
//! markup or HTML.
//!
//! The pipeline is [`crate::core::loader`] → [`crate::core::normalize`] →
//! [`crate::core::category`] → [`crate::render`].

pub mod cli;
pub mod core;
pub mod render;
