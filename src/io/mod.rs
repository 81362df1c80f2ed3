//! Input/output helpers.
//!
//! - input locations and readers (`source`)
//! - CSV ingest + row validation (`ingest`)
//! - view exports (CSV/JSON) (`export`)

pub mod export;
pub mod ingest;
pub mod source;

pub use export::*;
pub use ingest::*;
pub use source::*;
