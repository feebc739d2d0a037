//! OAuth client metadata, as served at `/auth/client-metadata.json`.
use crate::config::Config;
use crate::keyset::{JwkSet, Keyset};
use crate::utils::is_local_dev;
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("`jwks` is required for production clients")]
    EmptyJwks,
    #[error(transparent)]
    Keyset(#[from] crate::keyset::Error),
    #[error(transparent)]
    SerdeHtmlForm(#[from] serde_html_form::ser::Error),
}

pub type Result<T> = core::result::Result<T, Error>;

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum AuthMethod {
    None,
    PrivateKeyJwt,
}

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum GrantType {
    AuthorizationCode,
    RefreshToken,
}

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ApplicationType {
    Web,
    Native,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct OAuthClientMetadata {
    pub client_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub client_name: Option<String>,
    pub redirect_uris: Vec<String>,
    pub scope: String,
    pub grant_types: Vec<GrantType>,
    pub response_types: Vec<String>,
    pub application_type: ApplicationType,
    pub token_endpoint_auth_method: AuthMethod,
    // https://datatracker.ietf.org/doc/html/rfc9449#section-5.2
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dpop_bound_access_tokens: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub jwks: Option<JwkSet>,
}

#[derive(Serialize)]
struct LoopbackClientId<'a> {
    redirect_uri: &'a str,
    scope: &'a str,
}

/// The metadata describing this client when served from `root_url`.
///
/// Local development uses a loopback client, which needs no published metadata or keys.
pub fn client_metadata(
    root_url: &str,
    config: &Config,
    keyset: Option<&Keyset>,
) -> Result<OAuthClientMetadata> {
    let (client_id, redirect_uri, dpop_bound_access_tokens, jwks) = if is_local_dev(root_url) {
        // loopback redirect URIs must use an IP address
        let redirect_uri =
            format!("{root_url}/auth/callback").replacen("localhost", "127.0.0.1", 1);
        let query = serde_html_form::to_string(LoopbackClientId {
            redirect_uri: &redirect_uri,
            scope: &config.scope,
        })?;
        (format!("http://localhost?{query}"), redirect_uri, None, None)
    } else {
        let jwks = keyset.ok_or(Error::EmptyJwks)?.public_jwks()?;
        (
            format!("{root_url}/auth/client-metadata.json"),
            format!("{root_url}/auth/callback"),
            Some(true),
            Some(jwks),
        )
    };
    Ok(OAuthClientMetadata {
        client_id,
        client_name: config.client_name.clone(),
        redirect_uris: vec![redirect_uri],
        scope: config.scope.clone(),
        grant_types: vec![GrantType::AuthorizationCode, GrantType::RefreshToken],
        response_types: vec![String::from("code")],
        application_type: ApplicationType::Web,
        token_endpoint_auth_method: AuthMethod::None,
        dpop_bound_access_tokens,
        jwks,
    })
}
