use crate::oauth::OAuthClient;
use crate::session::{read_session, Session};
use http::Request;

/// What a request is authenticated as.
#[derive(Debug, Clone)]
pub struct SessionContext<S> {
    pub session: Option<Session>,
    pub oauth_session: Option<S>,
}

impl<S> SessionContext<S> {
    /// Whether the request carries a session whose OAuth session could be restored.
    pub fn is_authenticated(&self) -> bool {
        self.session.is_some() && self.oauth_session.is_some()
    }
}

/// Reads the session cookie of `request` and restores the matching OAuth session.
pub async fn get_session_context<B, C>(
    request: &Request<B>,
    secret: &str,
    client: &C,
) -> Result<SessionContext<C::Session>, C::Error>
where
    C: OAuthClient,
{
    let session = read_session(request, secret);
    let oauth_session = match &session {
        Some(session) => {
            let restored = client.restore(&session.did).await?;
            if restored.is_none() {
                tracing::debug!(did = %session.did, "no stored OAuth session for cookie");
            }
            restored
        }
        None => None,
    };
    Ok(SessionContext { session, oauth_session })
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::oauth::{create_dpop_key, AuthorizeOptions, CallbackParams, CallbackResult};
    use crate::seal::seal;
    use crate::store::keyed;
    use crate::store::kv;
    use crate::store::session::{
        session_store, OAuthTokenType, SessionEntry, SessionStore, TokenSet,
    };
    use crate::store::state::{state_store, StateEntry, StateStore};
    use crate::store::Store;
    use http::header::COOKIE;
    use sauth_common::kv::memory::MemoryNamespace;
    use sauth_common::types::Did;
    use std::convert::Infallible;
    use thiserror::Error;

    pub(crate) const SECRET: &str = "0123456789abcdef0123456789abcdef";
    pub(crate) const DID: &str = "did:plc:abc";

    #[derive(Error, Debug)]
    pub(crate) enum FakeError {
        #[error("cannot resolve {0}")]
        Resolve(String),
        #[error("unknown state")]
        UnknownState,
        #[error(transparent)]
        Key(#[from] sauth_crypto::Error),
        #[error(transparent)]
        Store(#[from] keyed::Error<kv::Error<Infallible>>),
    }

    /// An OAuth client that completes every flow for [`DID`] without any network.
    #[derive(Clone, Default)]
    pub(crate) struct FakeClient {
        pub(crate) states: MemoryNamespace,
        pub(crate) sessions: MemoryNamespace,
    }

    impl FakeClient {
        fn state_store(&self) -> StateStore<MemoryNamespace> {
            state_store(self.states.clone())
        }
        fn session_store(&self) -> SessionStore<MemoryNamespace> {
            session_store(self.sessions.clone())
        }
    }

    impl OAuthClient for FakeClient {
        type Session = SessionEntry;
        type Error = FakeError;

        async fn authorize(
            &self,
            input: &str,
            options: AuthorizeOptions,
        ) -> Result<String, Self::Error> {
            if input.ends_with(".invalid") {
                return Err(FakeError::Resolve(input.into()));
            }
            let state = options.state.unwrap_or_default();
            let entry = StateEntry {
                iss: String::from("https://bsky.social"),
                dpop_key: create_dpop_key(&["ES256"])?,
                verifier: String::from("verifier"),
                app_state: None,
            };
            self.state_store().set(state.clone(), entry).await?;
            Ok(format!("https://bsky.social/oauth/authorize?login_hint={input}&state={state}"))
        }
        async fn callback(
            &self,
            params: CallbackParams,
        ) -> Result<CallbackResult<Self::Session>, Self::Error> {
            let state = params.state.ok_or(FakeError::UnknownState)?;
            let entry = self.state_store().get(&state).await?.ok_or(FakeError::UnknownState)?;
            self.state_store().del(&state).await?;

            let did = DID.parse::<Did>().map_err(|_| FakeError::UnknownState)?;
            let session = SessionEntry {
                dpop_key: entry.dpop_key,
                token_set: TokenSet {
                    iss: entry.iss,
                    sub: did.to_string(),
                    aud: String::from("https://pds.example.com"),
                    scope: None,
                    refresh_token: None,
                    access_token: params.code,
                    token_type: OAuthTokenType::DPoP,
                    expires_at: None,
                },
            };
            self.session_store().set(did.clone(), session.clone()).await?;
            Ok(CallbackResult { session, did })
        }
        async fn restore(&self, did: &Did) -> Result<Option<Self::Session>, Self::Error> {
            Ok(self.session_store().get(did).await?)
        }
    }

    fn request(did: Option<&str>) -> Request<()> {
        let mut builder = Request::get("https://app.example.com/api/user");
        if let Some(did) = did {
            let session = Session { did: did.parse().expect("valid DID") };
            let sealed = seal(&session, SECRET, 60).expect("sealing should succeed");
            builder = builder.header(COOKIE, format!("sauth={sealed}"));
        }
        builder.body(()).expect("request should build")
    }

    #[tokio::test]
    async fn anonymous() {
        let context = get_session_context(&request(None), SECRET, &FakeClient::default())
            .await
            .expect("context should load");
        assert!(context.session.is_none());
        assert!(context.oauth_session.is_none());
        assert!(!context.is_authenticated());
    }

    #[tokio::test]
    async fn session_without_stored_oauth_session() {
        let context = get_session_context(&request(Some(DID)), SECRET, &FakeClient::default())
            .await
            .expect("context should load");
        assert!(context.session.is_some());
        assert!(!context.is_authenticated());
    }

    #[tokio::test]
    async fn authenticated() {
        let client = FakeClient::default();
        let url = client
            .authorize("alice.bsky.social", AuthorizeOptions {
                state: Some(String::from("flow-1")),
                ..Default::default()
            })
            .await
            .expect("authorize should succeed");
        assert!(url.contains("state=flow-1"));
        let result = client
            .callback(CallbackParams {
                code: String::from("code"),
                state: Some(String::from("flow-1")),
                iss: None,
            })
            .await
            .expect("callback should succeed");
        assert!(client.states.is_empty());

        let context = get_session_context(&request(Some(DID)), SECRET, &client)
            .await
            .expect("context should load");
        assert!(context.is_authenticated());
        assert_eq!(context.oauth_session, Some(result.session));
    }
}
