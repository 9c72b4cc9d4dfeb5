pub mod backend;
pub mod memory;
pub mod json;
pub mod caching;
pub mod proxy;
