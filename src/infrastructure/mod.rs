//! Infrastructure layer - External concerns
//! 
//! This layer contains:
//! - Config: Configuration loading
//! - Adapters: I/O module implementations (loopback, stdio)

pub mod config;
pub mod adapters;
