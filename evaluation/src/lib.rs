pub mod engine;
pub mod error;
pub mod metrics;
pub mod mock;
pub mod util;
