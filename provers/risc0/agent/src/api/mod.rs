pub mod boundless_agent_api;
pub mod handlers;
pub mod types;

pub use boundless_agent_api::*;
pub use handlers::*;
pub use types::*;