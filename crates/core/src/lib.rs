//! Core library: scanning, scheduling, media probing, frame sampling,
//! classification, and tagging.

pub mod classifier;
pub mod config;
pub mod enrich;
pub mod frames;
pub mod pipeline;
pub mod probe;
pub mod scanner;
pub mod scheduler;
