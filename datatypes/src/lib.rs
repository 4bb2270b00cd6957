pub mod error;
pub mod metrics;
pub mod operations;
pub mod plots;
pub mod primitives;
pub mod util;
