//! Time-series utilities used by the pipeline.
//!
//! Modules include:
//! - `timestamp`: parse history API timestamps, truncate to minute/hour
//! - `resample`: turn irregular raw samples into a uniform series
//! - `subtract`: timestamp-aligned subtraction of sibling series
//! - `join`: left-join regressor series onto a training series
/// Left-join helpers for regressor alignment.
pub mod join;
/// Resampling and counter accumulation.
pub mod resample;
/// Timestamp-aligned subtraction.
pub mod subtract;
/// Timestamp parsing and truncation.
pub mod timestamp;
