//! Credential store implementations for the wayfare client.

pub mod file;
pub mod memory;

pub use file::FileCredentialStore;
pub use memory::InMemoryCredentialStore;
