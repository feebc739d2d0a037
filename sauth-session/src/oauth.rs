//! The boundary to the OAuth client that runs the authorization flow.
use sauth_common::types::Did;
use sauth_crypto::DpopKey;
use serde::Deserialize;
use std::future::Future;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AuthorizeOptions {
    pub redirect_uri: Option<String>,
    pub scope: Option<String>,
    pub state: Option<String>,
}

/// Query parameters of the authorization server's redirect back to the client.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct CallbackParams {
    pub code: String,
    pub state: Option<String>,
    pub iss: Option<String>,
}

#[derive(Debug, Clone)]
pub struct CallbackResult<S> {
    pub session: S,
    pub did: Did,
}

/// An OAuth client that persists its state and sessions in the stores of this crate.
#[cfg_attr(not(target_arch = "wasm32"), trait_variant::make(Send))]
pub trait OAuthClient {
    /// A restored, authenticated session with the subject's PDS.
    type Session: Send;
    type Error: std::error::Error + Send + Sync + 'static;

    /// Starts authorization for `input` (a handle, DID or PDS URL) and returns the URL to
    /// redirect the user to.
    fn authorize(
        &self,
        input: &str,
        options: AuthorizeOptions,
    ) -> impl Future<Output = Result<String, Self::Error>>;
    fn callback(
        &self,
        params: CallbackParams,
    ) -> impl Future<Output = Result<CallbackResult<Self::Session>, Self::Error>>;
    /// Restores the stored session of `did`, or `None` if there is none.
    fn restore(
        &self,
        did: &Did,
    ) -> impl Future<Output = Result<Option<Self::Session>, Self::Error>>;
}

/// Creates the DPoP key for a new authorization, given the algorithms the authorization
/// server accepts. The key is extractable so the state and session stores can persist it.
pub fn create_dpop_key<S: AsRef<str>>(algs: &[S]) -> sauth_crypto::Result<DpopKey> {
    DpopKey::generate_for(algs).ok_or_else(|| {
        let algs = algs.iter().map(AsRef::as_ref).collect::<Vec<_>>();
        sauth_crypto::Error::UnsupportedAlgorithm(algs.join(", "))
    })
}
