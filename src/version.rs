use std::fmt;

/// Name used in the `User-Agent` header and the CLI banner.
pub const APPLICATION_NAME: &str = "misty";
/// One-line description shown by the CLI.
pub const APPLICATION_DESC: &str = "misty interacts with a misty robot";
/// Version of this crate, sent as the `User-Agent` version.
pub const CLIENT_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Build metadata, filled from `MISTY_*` environment variables at compile time.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct VersionInfo {
    pub application_name: &'static str,
    pub build_number: &'static str,
    pub commit_hash: &'static str,
    pub build_date: &'static str,
    pub build_target: String,
}

impl VersionInfo {
    pub fn current() -> Self {
        Self {
            application_name: APPLICATION_NAME,
            build_number: option_env!("MISTY_BUILD_NUMBER").unwrap_or("v0-dev"),
            commit_hash: option_env!("MISTY_COMMIT_HASH").unwrap_or("unknown"),
            build_date: option_env!("MISTY_BUILD_DATE").unwrap_or("unknown"),
            build_target: format!("{}/{}", std::env::consts::OS, std::env::consts::ARCH),
        }
    }
}

impl fmt::Display for VersionInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {} ({}) {} - BuildDate: {}",
            self.application_name,
            self.build_number,
            self.commit_hash,
            self.build_target,
            self.build_date
        )
    }
}
