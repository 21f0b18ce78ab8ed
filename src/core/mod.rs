pub mod codec;
pub mod config;
pub mod ids;
pub mod integrity;
pub mod store;
pub mod summary;
