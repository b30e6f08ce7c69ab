mod buffer_pool;
mod doq_client;
pub mod liveness;
mod session_manager;

pub use buffer_pool::{BufferPool, PoolStats, PooledBuffer};
pub use doq_client::DoqClient;
pub use session_manager::SessionManager;
