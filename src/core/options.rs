//! Comparison and link-check settings

use serde::Serialize;
use std::time::Duration;

/// Switches for behaviours that are preserved by default for compatibility.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct CompareOptions {
    /// Flag pages whose line counts differ. Off: lines past the shorter page are ignored.
    pub strict_line_count: bool,
    /// Also report metadata keys present only in the right document.
    pub symmetric_metadata: bool,
    /// Treat two documents that both lack an outline as equal.
    pub absent_outlines_equal: bool,
}

impl CompareOptions {
    /// Every compatibility quirk turned off.
    pub fn strict() -> Self {
        Self {
            strict_line_count: true,
            symmetric_metadata: true,
            absent_outlines_equal: true,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LinkCheckOptions {
    /// Upper bound on concurrent requests.
    pub workers: usize,
    pub connect_timeout: Duration,
    /// Whole-request bound, covering connect and response.
    pub request_timeout: Duration,
    pub user_agent: String,
    /// Honour `HTTP_PROXY` / `HTTPS_PROXY` from the environment.
    pub use_system_proxy: bool,
}

impl Default for LinkCheckOptions {
    fn default() -> Self {
        Self {
            workers: 8,
            connect_timeout: Duration::from_secs(5),
            request_timeout: Duration::from_secs(10),
            user_agent: concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION")).to_string(),
            use_system_proxy: true,
        }
    }
}
