//! Data generation helpers.

pub mod sample;

pub use sample::{SampleConfig, generate_sample, write_sample_csv};
