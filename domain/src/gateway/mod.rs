//! Gateway value objects: the response type every call resolves to and the
//! deterministic cache key.

pub mod cache_key;
pub mod response;

pub use cache_key::CacheKey;
pub use response::{GatewayResponse, ResponseMetadata, TokenUsage};
