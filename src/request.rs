use std::fmt;
use std::time::Duration;

use reqwest::header::{HeaderMap, HeaderName, HeaderValue, AUTHORIZATION};
use reqwest::Method;
use url::Url;

use crate::{MistyError, Result};

/// HTTP Basic credentials.
///
/// The default value is an empty username and password, which still
/// produces a `Basic` header on the wire.
#[derive(Clone, Default, PartialEq, Eq)]
pub struct Credentials {
    pub username: String,
    pub password: String,
}

impl Credentials {
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            password: password.into(),
        }
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .finish()
    }
}

/// A logical call ready to be dispatched.
///
/// Built by [`crate::MistyClient::new_request`]. The body is kept encoded so a
/// fresh transport request can be produced for every attempt.
#[derive(Clone, Debug)]
pub struct CallRequest {
    method: Method,
    url: Url,
    headers: HeaderMap,
    body: Option<Vec<u8>>,
    basic_auth: Option<Credentials>,
}

impl CallRequest {
    pub(crate) fn new(
        method: Method,
        url: Url,
        headers: HeaderMap,
        body: Option<Vec<u8>>,
    ) -> Self {
        Self {
            method,
            url,
            headers,
            body,
            basic_auth: None,
        }
    }

    /// Sets explicit Basic credentials; client credentials are then ignored.
    pub fn with_basic_auth(
        mut self,
        username: impl Into<String>,
        password: impl Into<String>,
    ) -> Self {
        self.basic_auth = Some(Credentials::new(username, password));
        self
    }

    /// Sets or replaces a header.
    pub fn with_header(mut self, name: HeaderName, value: HeaderValue) -> Self {
        self.headers.insert(name, value);
        self
    }

    pub fn method(&self) -> &Method {
        &self.method
    }

    pub fn url(&self) -> &Url {
        &self.url
    }

    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    pub fn body(&self) -> Option<&[u8]> {
        self.body.as_deref()
    }

    pub fn basic_auth(&self) -> Option<&Credentials> {
        self.basic_auth.as_ref()
    }

    /// Whether the caller already chose how this request authenticates.
    pub fn has_explicit_auth(&self) -> bool {
        self.basic_auth.is_some() || self.headers.contains_key(AUTHORIZATION)
    }

    /// Produces a fresh transport request for one attempt.
    ///
    /// `fallback` credentials apply only when the caller set none.
    pub(crate) fn to_transport(
        &self,
        http: &reqwest::Client,
        fallback: &Credentials,
        timeout: Duration,
    ) -> Result<reqwest::Request> {
        let mut builder = http
            .request(self.method.clone(), self.url.clone())
            .headers(self.headers.clone())
            .timeout(timeout);

        if !self.headers.contains_key(AUTHORIZATION) {
            let credentials = self.basic_auth.as_ref().unwrap_or(fallback);
            builder = builder.basic_auth(&credentials.username, Some(&credentials.password));
        }
        if let Some(body) = &self.body {
            builder = builder.body(body.clone());
        }

        builder.build().map_err(MistyError::Build)
    }
}
