//! Request handling for the `/auth/*` endpoints, independent of any router.
use crate::config::Config;
use crate::context::{get_session_context, SessionContext};
use crate::error::{Error, Result};
use crate::metadata::client_metadata;
use crate::oauth::{AuthorizeOptions, CallbackParams, OAuthClient};
use crate::session::{create_session, delete_session, Session};
use crate::utils::{generate_nonce, root_url};
use http::header::{CONTENT_TYPE, LOCATION};
use http::{Request, Response, StatusCode};
use serde::{Deserialize, Serialize};

const CALLBACK_FAILURE: &str = "Something went wrong :-(";

/// Error codes passed back to the front page as `?error=<code>`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCode {
    BadHandle,
}

impl ErrorCode {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::BadHandle => "bad_handle",
        }
    }
}

#[derive(Deserialize)]
struct LoginForm {
    handle: Option<String>,
}

#[derive(Serialize)]
struct SettingsCheck {
    error: Option<&'static str>,
}

pub struct AuthHandlers<C> {
    client: C,
    config: Config,
}

impl<C> AuthHandlers<C>
where
    C: OAuthClient,
{
    pub fn new(client: C, config: Config) -> Self {
        Self { client, config }
    }
    pub fn client(&self) -> &C {
        &self.client
    }
    pub fn config(&self) -> &Config {
        &self.config
    }
    /// `POST /auth/login` with a `handle` form field.
    pub async fn login(&self, request: &Request<Vec<u8>>) -> Result<Response<Vec<u8>>> {
        let form = serde_html_form::from_bytes::<LoginForm>(request.body()).ok();
        let Some(mut handle) = form.and_then(|form| form.handle).filter(|h| !h.is_empty()) else {
            return redirect_with_error(request, "/", ErrorCode::BadHandle);
        };
        if !handle.contains('.') {
            handle.push_str(".bsky.social");
        }
        let options = AuthorizeOptions { state: Some(generate_nonce()), ..Default::default() };
        match self.client.authorize(&handle, options).await {
            Ok(url) => redirect(&url, Vec::new()),
            Err(e) => {
                tracing::warn!(handle = %handle, error = %e, "authorization failed");
                redirect_with_error(request, "/", ErrorCode::BadHandle)
            }
        }
    }
    /// `GET /auth/callback`: completes the flow and sets the session cookie.
    pub async fn callback<B>(&self, request: &Request<B>) -> Result<Response<Vec<u8>>> {
        let query = request.uri().query().unwrap_or_default();
        let params = match serde_html_form::from_str::<CallbackParams>(query) {
            Ok(params) => params,
            Err(e) => {
                tracing::warn!(error = %e, "invalid callback parameters");
                return callback_failure();
            }
        };
        let result = match self.client.callback(params).await {
            Ok(result) => result,
            Err(e) => {
                tracing::error!(error = %e, "callback failed");
                return callback_failure();
            }
        };
        let mut response = redirect("/", Vec::new())?;
        let session = Session { did: result.did };
        create_session(&mut response, &session, &self.config.secret, self.config.session_max_age)?;
        tracing::info!(did = %session.did, "session created");
        Ok(response)
    }
    /// `POST /auth/logout`: drops the session cookie.
    pub async fn logout<B>(&self, request: &Request<B>) -> Result<Response<Vec<u8>>> {
        let mut response = redirect("/", b"LoggedOut".to_vec())?;
        delete_session(request, &mut response)?;
        Ok(response)
    }
    /// `GET /auth/client-metadata.json`.
    pub async fn client_metadata<B>(&self, request: &Request<B>) -> Result<Response<Vec<u8>>> {
        let root_url = root_url(request).ok_or(Error::UnknownOrigin)?;
        let keyset = self.config.keyset()?;
        let metadata = client_metadata(&root_url, &self.config, keyset.as_ref())?;
        json_response(StatusCode::OK, &metadata)
    }
    /// `GET /api/settings-check`: `{"error": null}`, or the code of the first problem found.
    pub async fn settings_check<B>(&self, request: &Request<B>) -> Result<Response<Vec<u8>>> {
        let root_url = root_url(request).ok_or(Error::UnknownOrigin)?;
        match self.config.check(&root_url) {
            Ok(()) => json_response(StatusCode::OK, &SettingsCheck { error: None }),
            Err(e) => json_response(
                StatusCode::INTERNAL_SERVER_ERROR,
                &SettingsCheck { error: Some(e.code()) },
            ),
        }
    }
    /// The session and restored OAuth session of `request`.
    pub async fn context<B>(
        &self,
        request: &Request<B>,
    ) -> core::result::Result<SessionContext<C::Session>, C::Error> {
        get_session_context(request, &self.config.secret, &self.client).await
    }
}

fn redirect(location: &str, body: Vec<u8>) -> Result<Response<Vec<u8>>> {
    Ok(Response::builder().status(StatusCode::FOUND).header(LOCATION, location).body(body)?)
}

fn redirect_with_error<B>(
    request: &Request<B>,
    path: &str,
    code: ErrorCode,
) -> Result<Response<Vec<u8>>> {
    let root_url = root_url(request).unwrap_or_default();
    redirect(&format!("{root_url}{path}?error={}", code.as_str()), Vec::new())
}

fn callback_failure() -> Result<Response<Vec<u8>>> {
    Ok(Response::builder()
        .status(StatusCode::INTERNAL_SERVER_ERROR)
        .body(CALLBACK_FAILURE.as_bytes().to_vec())?)
}

fn json_response<T: Serialize>(status: StatusCode, value: &T) -> Result<Response<Vec<u8>>> {
    Ok(Response::builder()
        .status(status)
        .header(CONTENT_TYPE, "application/json")
        .body(serde_json::to_vec(value)?)?)
}
