pub mod limiter;

pub use limiter::{LimitDimension, RateLimitError, RateLimiter, ResetLoopsHandle};
