//! `Set-Cookie` framing and `Cookie` header parsing.
use chrono::{DateTime, NaiveDateTime, Utc};
use http::header::{HeaderMap, HeaderValue, InvalidHeaderValue, COOKIE};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

const EXPIRES_FORMAT: &str = "%a, %d %b %Y %H:%M:%S GMT";

#[derive(Error, Debug, PartialEq, Eq)]
pub enum ParseError {
    #[error("missing cookie name/value pair")]
    MissingPair,
    #[error("invalid Max-Age: {0}")]
    MaxAge(String),
    #[error("invalid Expires: {0}")]
    Expires(String),
    #[error("invalid SameSite: {0}")]
    SameSite(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SameSite {
    Strict,
    Lax,
    None,
}

impl SameSite {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Strict => "Strict",
            Self::Lax => "Lax",
            Self::None => "None",
        }
    }
}

impl FromStr for SameSite {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "strict" => Ok(Self::Strict),
            "lax" => Ok(Self::Lax),
            "none" => Ok(Self::None),
            _ => Err(ParseError::SameSite(s.into())),
        }
    }
}

/// A cookie as sent in a `Set-Cookie` response header.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SetCookie {
    pub name: String,
    pub value: String,
    pub path: Option<String>,
    pub max_age: Option<i64>,
    pub expires: Option<DateTime<Utc>>,
    pub secure: bool,
    pub http_only: bool,
    pub same_site: Option<SameSite>,
}

impl SetCookie {
    /// A cookie scoped to the whole site, kept by the client for `max_age` seconds.
    pub fn persistent(name: impl Into<String>, value: impl Into<String>, max_age: u64) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
            path: Some(String::from("/")),
            max_age: Some(i64::try_from(max_age).unwrap_or(i64::MAX)),
            expires: None,
            secure: true,
            http_only: true,
            same_site: None,
        }
    }
    /// A cookie whose `Expires` lies in the past, which makes clients drop it.
    pub fn expired(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
            path: Some(String::from("/")),
            max_age: None,
            expires: Some(DateTime::<Utc>::UNIX_EPOCH),
            secure: true,
            http_only: true,
            same_site: Some(SameSite::Lax),
        }
    }
    /// Whether a client that received this cookie at `received_at` must have discarded it by `now`.
    pub fn is_expired_at(&self, received_at: DateTime<Utc>, now: DateTime<Utc>) -> bool {
        // Max-Age takes precedence over Expires
        if let Some(max_age) = self.max_age {
            return max_age <= 0 || (now - received_at).num_seconds() >= max_age;
        }
        self.expires.is_some_and(|expires| expires <= now)
    }
    pub fn to_header_value(&self) -> Result<HeaderValue, InvalidHeaderValue> {
        HeaderValue::from_str(&self.to_string())
    }
}

impl fmt::Display for SetCookie {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}={}", self.name, self.value)?;
        if let Some(path) = &self.path {
            write!(f, "; Path={path}")?;
        }
        if let Some(max_age) = self.max_age {
            write!(f, "; Max-Age={max_age}")?;
        }
        if let Some(expires) = self.expires {
            write!(f, "; Expires={}", expires.format(EXPIRES_FORMAT))?;
        }
        if self.secure {
            f.write_str("; Secure")?;
        }
        if self.http_only {
            f.write_str("; HttpOnly")?;
        }
        if let Some(same_site) = self.same_site {
            write!(f, "; SameSite={}", same_site.as_str())?;
        }
        Ok(())
    }
}

impl FromStr for SetCookie {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut attributes = s.split(';');
        let (name, value) = attributes
            .next()
            .and_then(|pair| pair.split_once('='))
            .map(|(name, value)| (name.trim(), value.trim()))
            .filter(|(name, _)| !name.is_empty())
            .ok_or(ParseError::MissingPair)?;
        let mut cookie = Self {
            name: name.into(),
            value: value.into(),
            path: None,
            max_age: None,
            expires: None,
            secure: false,
            http_only: false,
            same_site: None,
        };
        for attribute in attributes {
            let (key, value) = match attribute.split_once('=') {
                Some((key, value)) => (key.trim(), Some(value.trim())),
                None => (attribute.trim(), None),
            };
            match (key.to_ascii_lowercase().as_str(), value) {
                ("path", Some(path)) => cookie.path = Some(path.into()),
                ("max-age", Some(max_age)) => {
                    cookie.max_age = Some(
                        max_age.parse().map_err(|_| ParseError::MaxAge(max_age.into()))?,
                    )
                }
                ("expires", Some(expires)) => cookie.expires = Some(parse_expires(expires)?),
                ("secure", _) => cookie.secure = true,
                ("httponly", _) => cookie.http_only = true,
                ("samesite", Some(same_site)) => cookie.same_site = Some(same_site.parse()?),
                _ => {}
            }
        }
        Ok(cookie)
    }
}

fn parse_expires(s: &str) -> Result<DateTime<Utc>, ParseError> {
    // some emitters write `UTC` where HTTP dates require `GMT`
    let normalized = s.strip_suffix(" UTC").map_or_else(|| s.to_string(), |s| format!("{s} GMT"));
    NaiveDateTime::parse_from_str(&normalized, EXPIRES_FORMAT)
        .map(|naive| naive.and_utc())
        .map_err(|_| ParseError::Expires(s.into()))
}

/// Finds the value of cookie `name` across all `Cookie` headers.
pub fn find_cookie(headers: &HeaderMap, name: &str) -> Option<String> {
    headers
        .get_all(COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .flat_map(|value| value.split(';'))
        .filter_map(|pair| pair.split_once('='))
        .find(|(key, _)| key.trim() == name)
        .map(|(_, value)| {
            let value = value.trim();
            value
                .strip_prefix('"')
                .and_then(|v| v.strip_suffix('"'))
                .unwrap_or(value)
                .to_string()
        })
}
