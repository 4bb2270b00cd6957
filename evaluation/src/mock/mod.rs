mod mock_strategy;

pub use mock_strategy::MockStrategy;
