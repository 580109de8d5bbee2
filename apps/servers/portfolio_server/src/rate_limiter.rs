pub mod per_client;
pub mod token_bucket;

pub use per_client::{rate_limit_middleware, ClientRateLimiter};
pub use token_bucket::TokenBucketRateLimiter;
