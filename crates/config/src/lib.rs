//! Configuration loading for the wayfare client.

pub mod schema;

pub use schema::Config;
