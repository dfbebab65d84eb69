use std::time::Duration;

/// Connect timeout of the default transport built by [`crate::MistyClient::new`].
pub const DEFAULT_CONNECT_TIMEOUT: Duration = Duration::from_millis(1_000);

/// Configures retry, rate limit and timeout behavior.
#[derive(Clone, Debug, PartialEq)]
pub struct ClientOptions {
    /// Total number of send attempts per call, including the first one.
    pub retries: usize,
    /// Flat delay between two attempts.
    pub retry_delay: Duration,
    /// Sustained request rate, in requests per second.
    pub request_rate: f64,
    /// Number of requests that may start back to back before the rate applies.
    pub request_burst: u32,
    /// Timeout of a single send attempt.
    pub request_timeout: Duration,
}

impl Default for ClientOptions {
    fn default() -> Self {
        Self {
            retries: 3,
            retry_delay: Duration::from_secs(3),
            request_rate: 100.0,
            request_burst: 15,
            request_timeout: Duration::from_secs(5),
        }
    }
}

impl ClientOptions {
    /// Number of attempts actually made; a zero retry count still sends once.
    pub(crate) fn attempts(&self) -> usize {
        self.retries.max(1)
    }
}

#[cfg(test)]
mod tests {
    use super::ClientOptions;

    #[test]
    fn zero_retries_still_attempts_once() {
        let options = ClientOptions {
            retries: 0,
            ..ClientOptions::default()
        };
        assert_eq!(options.attempts(), 1);
        assert_eq!(ClientOptions::default().attempts(), 3);
    }
}
