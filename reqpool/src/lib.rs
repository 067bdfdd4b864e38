mod backend;
mod config;
mod macros;
mod memory_backend;
mod pool;
mod request;
mod utils;

// Re-export
pub use config::RedisPoolConfig;
pub use memory_backend::{memory_pool, MemoryBackend};
pub use pool::Pool;
pub use request::*;
pub use utils::proof_key_to_hack_request_key;
