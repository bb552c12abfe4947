//!
//! Traits Module
//!
//! Core traits used throughout the marker system for extensibility.
//!
//! - [`comparator`]: Defines the trait for comparing a student output with its reference.

pub mod comparator;
