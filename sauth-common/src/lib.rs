#![doc = include_str!("../README.md")]
pub mod http_client;
pub mod kv;
pub mod store;
pub mod types;

pub use http_client::HttpClient;
pub use types::Did;
