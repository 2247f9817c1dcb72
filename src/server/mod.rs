pub mod config;
pub mod factory;
pub mod handler;
pub mod response;
pub mod restful;
