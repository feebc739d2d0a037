#![doc = include_str!("../README.md")]
pub mod config;
pub mod context;
pub mod cookie;
mod error;
pub mod handlers;
pub mod http_client;
pub mod keyset;
pub mod metadata;
pub mod oauth;
pub mod seal;
pub mod session;
pub mod store;
mod utils;

pub use context::{get_session_context, SessionContext};
pub use error::{Error, Result};
pub use handlers::AuthHandlers;
pub use oauth::{
    create_dpop_key, AuthorizeOptions, CallbackParams, CallbackResult, OAuthClient,
};
pub use session::{
    create_session, delete_session, inspect_session, read_session, Session, SessionLookup,
};
pub use utils::{generate_nonce, is_local_dev, root_url};
