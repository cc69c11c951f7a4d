// Adapters layer: concrete implementations of the domain ports.

pub mod credentials;
pub mod email;
pub mod portal;
pub mod storage;
