//! Ferrous DoQ Application Layer
pub mod ports;
pub mod services;

pub use services::{BufferPool, DoqClient, PoolStats, PooledBuffer, SessionManager};
