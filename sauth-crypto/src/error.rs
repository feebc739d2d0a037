use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("unsupported algorithm: {0}")]
    UnsupportedAlgorithm(String),
    #[error("unsupported curve: {0}")]
    UnsupportedCurve(String),
    #[error("key has no private material")]
    PublicKey,
    #[error("invalid key: {0}")]
    InvalidKey(elliptic_curve::Error),
    #[error(transparent)]
    Signature(#[from] ecdsa::signature::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
