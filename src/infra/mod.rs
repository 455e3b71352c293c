pub mod http_client;
pub mod rate_limiter;
pub mod response_cache;
