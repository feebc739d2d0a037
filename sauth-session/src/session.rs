//! The cookie-resident session.
use crate::cookie::{find_cookie, SetCookie};
use crate::error::Result;
use crate::seal::{self, seal, unseal_at};
use chrono::{DateTime, Utc};
use http::header::SET_COOKIE;
use http::{Request, Response};
use sauth_common::types::Did;
use serde::{Deserialize, Serialize};

pub const SESSION_COOKIE_NAME: &str = "sauth";

/// Default cookie lifetime: 30 days.
pub const DEFAULT_MAX_AGE: u64 = 60 * 60 * 24 * 30;

/// The claims kept in the session cookie.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    pub did: Did,
}

/// The classified outcome of reading the session cookie.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionLookup {
    /// No session cookie was sent.
    Anonymous,
    Active(Session),
    /// The cookie is authentic but past its expiry.
    Expired,
    /// The cookie is malformed, was sealed with another secret, or was modified.
    Invalid,
}

impl SessionLookup {
    pub fn into_session(self) -> Option<Session> {
        match self {
            Self::Active(session) => Some(session),
            _ => None,
        }
    }
}

/// Seals `session` and appends it to `response` as the session cookie.
///
/// Existing `Set-Cookie` headers are kept.
pub fn create_session<B>(
    response: &mut Response<B>,
    session: &Session,
    secret: &str,
    max_age: u64,
) -> Result<()> {
    let value = seal(session, secret, max_age)?;
    let cookie = SetCookie::persistent(SESSION_COOKIE_NAME, value, max_age);
    response.headers_mut().append(SET_COOKIE, cookie.to_header_value()?);
    Ok(())
}

/// Returns the session carried by `request`, if any.
///
/// A missing, invalid or expired cookie all read as no session.
pub fn read_session<B>(request: &Request<B>, secret: &str) -> Option<Session> {
    inspect_session(request, secret).into_session()
}

pub fn inspect_session<B>(request: &Request<B>, secret: &str) -> SessionLookup {
    inspect_session_at(request, secret, Utc::now())
}

pub fn inspect_session_at<B>(
    request: &Request<B>,
    secret: &str,
    now: DateTime<Utc>,
) -> SessionLookup {
    let Some(value) = find_cookie(request.headers(), SESSION_COOKIE_NAME) else {
        return SessionLookup::Anonymous;
    };
    match unseal_at(&value, secret, now) {
        Ok(session) => SessionLookup::Active(session),
        Err(seal::Error::Expired) => {
            tracing::debug!("session cookie has expired");
            SessionLookup::Expired
        }
        Err(e) => {
            tracing::debug!(error = %e, "ignoring unreadable session cookie");
            SessionLookup::Invalid
        }
    }
}

/// Tells the client to drop the session cookie, if `request` carries one.
pub fn delete_session<B, C>(request: &Request<B>, response: &mut Response<C>) -> Result<()> {
    if let Some(value) = find_cookie(request.headers(), SESSION_COOKIE_NAME) {
        let cookie = SetCookie::expired(SESSION_COOKIE_NAME, value);
        response.headers_mut().append(SET_COOKIE, cookie.to_header_value()?);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeDelta;
    use http::header::COOKIE;
    use http::HeaderValue;

    const SECRET: &str = "s3cr3t-secret-32-bytes-min!!";

    fn session() -> Session {
        Session { did: "did:plc:abc".parse().expect("valid DID") }
    }

    fn request_with(cookie: Option<&str>) -> Request<()> {
        let mut builder = Request::get("https://app.example.com/");
        if let Some(cookie) = cookie {
            builder = builder.header(COOKIE, cookie);
        }
        builder.body(()).expect("request should build")
    }

    /// A client that keeps cookies and honors their expiry.
    #[derive(Default)]
    struct CookieJar {
        cookies: Vec<(SetCookie, DateTime<Utc>)>,
    }

    impl CookieJar {
        fn receive<B>(&mut self, response: &Response<B>, now: DateTime<Utc>) {
            for value in response.headers().get_all(SET_COOKIE) {
                let cookie = value
                    .to_str()
                    .expect("header should be ascii")
                    .parse::<SetCookie>()
                    .expect("Set-Cookie should parse");
                self.cookies.retain(|(c, _)| c.name != cookie.name);
                self.cookies.push((cookie, now));
            }
        }
        fn request(&self, now: DateTime<Utc>) -> Request<()> {
            let header = self
                .cookies
                .iter()
                .filter(|(cookie, received_at)| !cookie.is_expired_at(*received_at, now))
                .map(|(cookie, _)| format!("{}={}", cookie.name, cookie.value))
                .collect::<Vec<_>>()
                .join("; ");
            request_with(Some(&header).filter(|h| !h.is_empty()).map(String::as_str))
        }
    }

    #[test]
    fn create_then_read() {
        let mut response = Response::new(());
        create_session(&mut response, &session(), SECRET, 86400)
            .expect("session should be created");

        let set_cookie = response.headers()[SET_COOKIE].to_str().expect("header should be ascii");
        assert!(set_cookie.starts_with("sauth=sa1*"));
        assert!(set_cookie.ends_with("; Path=/; Max-Age=86400; Secure; HttpOnly"));

        let mut jar = CookieJar::default();
        jar.receive(&response, Utc::now());
        assert_eq!(read_session(&jar.request(Utc::now()), SECRET), Some(session()));
    }

    #[test]
    fn no_cookie_is_no_session() {
        let request = request_with(None);
        assert_eq!(read_session(&request, SECRET), None);
        assert_eq!(inspect_session(&request, SECRET), SessionLookup::Anonymous);

        let request = request_with(Some("theme=dark"));
        assert_eq!(read_session(&request, SECRET), None);
    }

    #[test]
    fn delete_then_read() {
        let now = Utc::now();
        let mut jar = CookieJar::default();
        let mut response = Response::new(());
        create_session(&mut response, &session(), SECRET, DEFAULT_MAX_AGE)
            .expect("session should be created");
        jar.receive(&response, now);
        let stale = jar.request(now);

        let mut response = Response::new(());
        delete_session(&stale, &mut response).expect("session should be deleted");
        let set_cookie = response.headers()[SET_COOKIE].to_str().expect("header should be ascii");
        assert!(set_cookie.contains("; Expires=Thu, 01 Jan 1970 00:00:00 GMT"));
        assert!(set_cookie.ends_with("; SameSite=Lax"));
        jar.receive(&response, now);

        let request = jar.request(now + TimeDelta::seconds(1));
        assert!(request.headers().get(COOKIE).is_none());
        assert_eq!(read_session(&request, SECRET), None);
    }

    #[test]
    fn delete_without_cookie_is_noop() {
        let mut response = Response::new(());
        delete_session(&request_with(None), &mut response).expect("delete should succeed");
        assert!(response.headers().get(SET_COOKIE).is_none());
    }

    #[test]
    fn headers_are_appended() {
        let mut response = Response::new(());
        response.headers_mut().append(SET_COOKIE, HeaderValue::from_static("theme=dark"));
        create_session(&mut response, &session(), SECRET, 60).expect("session should be created");
        assert_eq!(response.headers().get_all(SET_COOKIE).iter().count(), 2);
    }

    #[test]
    fn failures_are_classified() {
        let now = Utc::now();
        let sealed = seal::seal_at(&session(), SECRET, 60, now).expect("sealing should succeed");
        let request = request_with(Some(&format!("sauth={sealed}")));
        assert_eq!(inspect_session_at(&request, SECRET, now), SessionLookup::Active(session()));
        assert_eq!(
            inspect_session_at(&request, SECRET, now + TimeDelta::seconds(61)),
            SessionLookup::Expired
        );
        assert_eq!(
            inspect_session_at(&request, "another-secret-that-is-32-bytes!", now),
            SessionLookup::Invalid
        );
        let request = request_with(Some("sauth=garbage"));
        assert_eq!(inspect_session(&request, SECRET), SessionLookup::Invalid);
        assert_eq!(read_session(&request, SECRET), None);
    }
}
