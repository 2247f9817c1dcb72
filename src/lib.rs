pub mod authz;
pub mod config;
pub mod error;
pub mod logs;
pub mod server;
pub mod types;
