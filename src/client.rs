use std::fmt;
use std::sync::Arc;

use reqwest::header::{self, HeaderMap, HeaderValue};
use reqwest::Method;
use serde::Serialize;
use tokio::sync::OnceCell;
use url::Url;

use crate::{
    deadline::ensure_deadline,
    display::DisplayService,
    options::DEFAULT_CONNECT_TIMEOUT,
    version::{APPLICATION_NAME, CLIENT_VERSION},
    CallContext, CallRequest, ClientOptions, Credentials, MistyError, RateLimiter, Result,
};

/// Normalizes a device address into a base URL.
///
/// Example: `"10.0.1.5"` → `"http://10.0.1.5/"`
pub fn addr_to_base_url(addr: &str) -> String {
    let trimmed = addr.trim();
    let mut url = if trimmed.contains("://") {
        trimmed.to_owned()
    } else {
        format!("http://{trimmed}")
    };
    if !url.ends_with('/') {
        url.push('/');
    }
    url
}

#[derive(Clone)]
/// HTTP client for a Misty robot REST API.
///
/// Every call is rate limited, bounded by a deadline, and retried on
/// transport failures. Clones share the transport and the rate limiter.
pub struct MistyClient {
    http: reqwest::Client,
    base_url: Url,
    user_agent: String,
    credentials: Credentials,
    options: ClientOptions,
    limiter: Arc<OnceCell<RateLimiter>>,
}

impl fmt::Debug for MistyClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MistyClient")
            .field("base_url", &self.base_url.as_str())
            .field("user_agent", &self.user_agent)
            .field("credentials", &self.credentials)
            .field("options", &self.options)
            .finish()
    }
}

impl MistyClient {
    /// Creates a client for an absolute base URL.
    ///
    /// The URL is used as given. Requests fail with
    /// [`MistyError::InvalidBaseUrl`] unless its path ends in `/`; see
    /// [`MistyClient::from_addr`] for a normalizing constructor.
    pub fn new(base_url: impl AsRef<str>) -> Result<Self> {
        let raw = base_url.as_ref();
        let base_url = Url::parse(raw)
            .map_err(|err| MistyError::InvalidBaseUrl(format!("{raw:?}: {err}")))?;
        let http = reqwest::Client::builder()
            .connect_timeout(DEFAULT_CONNECT_TIMEOUT)
            .build()
            .map_err(MistyError::Build)?;

        Ok(Self {
            http,
            base_url,
            user_agent: APPLICATION_NAME.to_owned(),
            credentials: Credentials::default(),
            options: ClientOptions::default(),
            limiter: Arc::new(OnceCell::new()),
        })
    }

    /// Creates a client from a bare device address such as `10.0.1.5`.
    ///
    /// Adds an `http://` scheme when missing and a trailing slash.
    pub fn from_addr(addr: impl AsRef<str>) -> Result<Self> {
        Self::new(addr_to_base_url(addr.as_ref()))
    }

    /// Applies retry, rate limit and timeout options.
    ///
    /// The rate limiter is rebuilt from the new options on first use.
    pub fn with_options(mut self, opts: ClientOptions) -> Self {
        self.options = opts;
        self.limiter = Arc::new(OnceCell::new());
        self
    }

    /// Uses a caller-provided transport instead of the default one.
    pub fn with_http_client(mut self, http: reqwest::Client) -> Self {
        self.http = http;
        self
    }

    /// Sets the Basic credentials sent with requests that carry none.
    ///
    /// Without this call an empty `Basic` header is sent.
    pub fn with_basic_auth(
        mut self,
        username: impl Into<String>,
        password: impl Into<String>,
    ) -> Self {
        self.credentials = Credentials::new(username, password);
        self
    }

    /// Sets the identity sent as `User-Agent: <identity>/<version>`.
    pub fn with_user_agent(mut self, identity: impl Into<String>) -> Self {
        self.user_agent = identity.into();
        self
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    pub fn options(&self) -> &ClientOptions {
        &self.options
    }

    /// LED and display commands.
    pub fn display(&self) -> DisplayService<'_> {
        DisplayService::new(self)
    }

    /// Builds a request for `target`, resolved against the base URL.
    ///
    /// A present `body` is encoded as compact JSON and marks the request as
    /// `application/json`.
    pub fn new_request<T>(
        &self,
        method: Method,
        target: &str,
        body: Option<&T>,
    ) -> Result<CallRequest>
    where
        T: Serialize + ?Sized,
    {
        if !self.base_url.path().ends_with('/') {
            return Err(MistyError::InvalidBaseUrl(format!(
                "base url must have a trailing slash, but {:?} does not",
                self.base_url.as_str()
            )));
        }
        let url = self
            .base_url
            .join(target)
            .map_err(|source| MistyError::InvalidTarget {
                target: target.to_owned(),
                source,
            })?;

        let body = body
            .map(serde_json::to_vec)
            .transpose()
            .map_err(MistyError::Encoding)?;

        let mut headers = HeaderMap::new();
        headers.insert(header::USER_AGENT, self.user_agent_header()?);
        headers.insert(header::ACCEPT, HeaderValue::from_static("application/json"));
        if body.is_some() {
            headers.insert(
                header::CONTENT_TYPE,
                HeaderValue::from_static("application/json"),
            );
        }

        Ok(CallRequest::new(method, url, headers, body))
    }

    /// Sends `request`, retrying transport failures.
    ///
    /// Any HTTP response is returned as is, whatever its status. Waits for
    /// the rate limiter, the retry delay and the response all stop as soon
    /// as `ctx` is cancelled or its deadline passes. Without a caller
    /// deadline the call is bounded by
    /// [`crate::deadline::synthesized_timeout`].
    pub async fn send(
        &self,
        ctx: &CallContext,
        request: &CallRequest,
    ) -> Result<reqwest::Response> {
        let ctx = ensure_deadline(ctx, &self.options);
        let limiter = self.limiter().await?;
        let attempts = self.options.attempts();

        let mut attempt = 1usize;
        loop {
            limiter.acquire(&ctx).await?;
            let transport = request.to_transport(
                &self.http,
                &self.credentials,
                self.options.request_timeout,
            )?;

            let err = match ctx.run(self.http.execute(transport)).await? {
                Ok(response) => return Ok(response),
                Err(err) => err,
            };
            if attempt >= attempts {
                return Err(MistyError::Transport(err));
            }

            #[cfg(feature = "tracing")]
            tracing::debug!(
                attempt,
                attempts,
                delay_ms = self.options.retry_delay.as_millis() as u64,
                error = %err,
                "retrying {} {}",
                request.method(),
                request.url()
            );

            ctx.sleep(self.options.retry_delay).await?;
            attempt += 1;
        }
    }

    /// Performs a `GET` on `target`.
    pub async fn get(&self, ctx: &CallContext, target: &str) -> Result<reqwest::Response> {
        let request = self.new_request::<()>(Method::GET, target, None)?;
        self.send(ctx, &request).await
    }

    /// Performs a `POST` on `target` with a JSON body.
    pub async fn post<T>(
        &self,
        ctx: &CallContext,
        target: &str,
        body: &T,
    ) -> Result<reqwest::Response>
    where
        T: Serialize + ?Sized,
    {
        let request = self.new_request(Method::POST, target, Some(body))?;
        self.send(ctx, &request).await
    }

    async fn limiter(&self) -> Result<&RateLimiter> {
        self.limiter
            .get_or_try_init(|| async {
                RateLimiter::new(self.options.request_rate, self.options.request_burst)
            })
            .await
    }

    fn user_agent_header(&self) -> Result<HeaderValue> {
        HeaderValue::from_str(&format!("{}/{}", self.user_agent, CLIENT_VERSION)).map_err(|_| {
            MistyError::InvalidOptions(format!(
                "user agent {:?} is not a valid header value",
                self.user_agent
            ))
        })
    }
}
