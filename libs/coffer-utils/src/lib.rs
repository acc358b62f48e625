#![cfg_attr(coverage_nightly, feature(coverage_attribute))]
//! Shared helpers that do not belong to any particular module.

pub mod humantime_serde;
