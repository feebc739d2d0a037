#![doc = include_str!("../README.md")]
mod algorithm;
mod dpop_key;
pub mod error;
pub mod verify;

pub use algorithm::Algorithm;
pub use dpop_key::DpopKey;
pub use elliptic_curve::JwkEcKey;
pub use error::{Error, Result};
