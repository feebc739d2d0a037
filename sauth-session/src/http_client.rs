//! HTTP clients handed to the OAuth client, with an explicit redirect policy.
use http::{header::LOCATION, Request, Response, StatusCode};
use sauth_common::HttpClient;
use thiserror::Error;

/// What a client does when a server answers with a 3xx status.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum RedirectPolicy {
    #[default]
    Follow,
    /// Do not follow, and fail with [`Error::Redirected`].
    Error,
}

#[derive(Error, Debug)]
pub enum Error {
    #[error("unexpected redirect ({status}) to {location:?}")]
    Redirected { status: StatusCode, location: Option<String> },
}

/// Fails with [`Error::Redirected`] if `response` is a redirect.
pub fn check_redirect<B>(response: &Response<B>) -> Result<(), Error> {
    let status = response.status();
    if !status.is_redirection() {
        return Ok(());
    }
    let location =
        response.headers().get(LOCATION).and_then(|v| v.to_str().ok()).map(String::from);
    tracing::debug!(%status, ?location, "rejecting redirect");
    Err(Error::Redirected { status, location })
}

/// Wraps an [`HttpClient`] so that any redirect response becomes an error.
pub struct RedirectGuard<T> {
    inner: T,
}

impl<T> RedirectGuard<T> {
    pub fn new(inner: T) -> Self {
        Self { inner }
    }
    pub fn into_inner(self) -> T {
        self.inner
    }
}

impl<T> HttpClient for RedirectGuard<T>
where
    T: HttpClient + Sync,
{
    async fn send_http(
        &self,
        request: Request<Vec<u8>>,
    ) -> core::result::Result<Response<Vec<u8>>, Box<dyn std::error::Error + Send + Sync + 'static>>
    {
        let response = self.inner.send_http(request).await?;
        check_redirect(&response)?;
        Ok(response)
    }
}

#[cfg(feature = "default-client")]
pub use self::reqwest_client::ReqwestClient;

#[cfg(feature = "default-client")]
mod reqwest_client {
    use super::{check_redirect, RedirectPolicy};
    use http::{Request, Response};
    use reqwest::{redirect, Client};
    use sauth_common::HttpClient;

    /// An [`HttpClient`] backed by [`reqwest`].
    #[derive(Clone)]
    pub struct ReqwestClient {
        client: Client,
        policy: RedirectPolicy,
    }

    impl ReqwestClient {
        pub fn new(policy: RedirectPolicy) -> reqwest::Result<Self> {
            let redirect = match policy {
                RedirectPolicy::Follow => redirect::Policy::default(),
                RedirectPolicy::Error => redirect::Policy::none(),
            };
            Ok(Self { client: Client::builder().redirect(redirect).build()?, policy })
        }
        pub fn policy(&self) -> RedirectPolicy {
            self.policy
        }
    }

    impl HttpClient for ReqwestClient {
        async fn send_http(
            &self,
            request: Request<Vec<u8>>,
        ) -> core::result::Result<
            Response<Vec<u8>>,
            Box<dyn std::error::Error + Send + Sync + 'static>,
        > {
            let response = self.client.execute(request.try_into()?).await?;
            let mut builder = Response::builder().status(response.status());
            for (k, v) in response.headers() {
                builder = builder.header(k, v);
            }
            let response = builder.body(response.bytes().await?.to_vec())?;
            if self.policy == RedirectPolicy::Error {
                check_redirect(&response)?;
            }
            Ok(response)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Fixed(StatusCode);

    impl HttpClient for Fixed {
        async fn send_http(
            &self,
            _: Request<Vec<u8>>,
        ) -> core::result::Result<
            Response<Vec<u8>>,
            Box<dyn std::error::Error + Send + Sync + 'static>,
        > {
            Ok(Response::builder()
                .status(self.0)
                .header(LOCATION, "https://elsewhere.example.com/")
                .body(Vec::new())?)
        }
    }

    fn request(uri: &str) -> Request<Vec<u8>> {
        Request::get(uri).body(Vec::new()).expect("request should build")
    }

    #[test]
    fn check() {
        let response = Response::builder().status(200).body(()).expect("response should build");
        assert!(check_redirect(&response).is_ok());

        let response = Response::builder()
            .status(307)
            .header(LOCATION, "/next")
            .body(())
            .expect("response should build");
        let Err(Error::Redirected { status, location }) = check_redirect(&response) else {
            panic!("redirect should be rejected");
        };
        assert_eq!(status, StatusCode::TEMPORARY_REDIRECT);
        assert_eq!(location.as_deref(), Some("/next"));
    }

    #[tokio::test]
    async fn guard() {
        let client = RedirectGuard::new(Fixed(StatusCode::OK));
        let response = client.send_http(request("https://a.example.com/")).await;
        assert_eq!(response.expect("response should pass").status(), StatusCode::OK);

        let client = RedirectGuard::new(Fixed(StatusCode::FOUND));
        let err = client
            .send_http(request("https://a.example.com/"))
            .await
            .expect_err("redirect should fail");
        assert!(matches!(
            err.downcast_ref::<Error>(),
            Some(Error::Redirected { status, .. }) if *status == StatusCode::FOUND
        ));
    }

    #[cfg(feature = "default-client")]
    mod reqwest_client {
        use super::*;

        async fn server() -> mockito::ServerGuard {
            let mut server = mockito::Server::new_async().await;
            server
                .mock("GET", "/old")
                .with_status(302)
                .with_header("location", "/new")
                .create_async()
                .await;
            server.mock("GET", "/new").with_status(200).with_body("moved").create_async().await;
            server
        }

        #[tokio::test]
        async fn follow() {
            let server = server().await;
            let client = ReqwestClient::new(RedirectPolicy::Follow).expect("client should build");
            let response = client
                .send_http(request(&format!("{}/old", server.url())))
                .await
                .expect("redirect should be followed");
            assert_eq!(response.status(), StatusCode::OK);
            assert_eq!(response.body(), b"moved");
        }

        #[tokio::test]
        async fn error() {
            let server = server().await;
            let client = ReqwestClient::new(RedirectPolicy::Error).expect("client should build");
            assert_eq!(client.policy(), RedirectPolicy::Error);
            let err = client
                .send_http(request(&format!("{}/old", server.url())))
                .await
                .expect_err("redirect should fail");
            let Some(Error::Redirected { status, location }) = err.downcast_ref::<Error>() else {
                panic!("unexpected error: {err}");
            };
            assert_eq!(*status, StatusCode::FOUND);
            assert_eq!(location.as_deref(), Some("/new"));

            let response = client
                .send_http(request(&format!("{}/new", server.url())))
                .await
                .expect("plain response should pass");
            assert_eq!(response.status(), StatusCode::OK);
        }
    }
}
