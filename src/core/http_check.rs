//! HEAD requests for link reachability

use hyper::ext::ReasonPhrase;
use reqwest::blocking::Client;
use std::error::Error as StdError;
use thiserror::Error;
use url::Url;

use super::options::LinkCheckOptions;

/// Status line of a HEAD response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HeadResponse {
    pub status: u16,
    pub reason: Option<String>,
}

/// Why a request got no response at all.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RequestError {
    #[error("host not found: {0}")]
    HostNotFound(String),

    #[error("transport error: {0}")]
    Transport(String),
}

/// Issues one reachability check. Implementations must bound every call in time.
pub trait UrlChecker: Send + Sync {
    fn head(&self, url: &Url) -> Result<HeadResponse, RequestError>;
}

/// HEAD requests over a blocking reqwest client.
pub struct HttpChecker {
    client: Client,
}

impl HttpChecker {
    pub fn new(options: &LinkCheckOptions) -> Result<Self, reqwest::Error> {
        let mut builder = Client::builder()
            .connect_timeout(options.connect_timeout)
            .timeout(options.request_timeout)
            .user_agent(options.user_agent.clone());
        if !options.use_system_proxy {
            builder = builder.no_proxy();
        }
        Ok(Self {
            client: builder.build()?,
        })
    }
}

impl UrlChecker for HttpChecker {
    fn head(&self, url: &Url) -> Result<HeadResponse, RequestError> {
        let response = self
            .client
            .head(url.as_str())
            .send()
            .map_err(|e| classify_transport_error(&e))?;
        let status = response.status();
        // hyper keeps the server's phrase only when it is not the canonical one
        let reason = response
            .extensions()
            .get::<ReasonPhrase>()
            .map(|phrase| String::from_utf8_lossy(phrase.as_bytes()).into_owned())
            .or_else(|| status.canonical_reason().map(str::to_string));
        Ok(HeadResponse {
            status: status.as_u16(),
            reason,
        })
    }
}

fn classify_transport_error(err: &reqwest::Error) -> RequestError {
    let mut cause: Option<&(dyn StdError + 'static)> = Some(err);
    while let Some(current) = cause {
        if is_host_resolution_failure(&current.to_string()) {
            return RequestError::HostNotFound(error_chain(err));
        }
        cause = current.source();
    }
    RequestError::Transport(error_chain(err))
}

/// Resolver failures as reported by hyper's connector and the system resolvers.
fn is_host_resolution_failure(message: &str) -> bool {
    let message = message.to_ascii_lowercase();
    [
        "dns error",
        "failed to lookup address",
        "name or service not known",
        "no such host",
        "nodename nor servname",
        "temporary failure in name resolution",
    ]
    .iter()
    .any(|needle| message.contains(needle))
}

fn error_chain(err: &reqwest::Error) -> String {
    let mut text = err.to_string();
    let mut cause = err.source();
    while let Some(current) = cause {
        text.push_str(": ");
        text.push_str(&current.to_string());
        cause = current.source();
    }
    text
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolution_failures_are_recognized() {
        assert!(is_host_resolution_failure("dns error: failed to lookup address information: Name or service not known"));
        assert!(is_host_resolution_failure("No such host is known. (os error 11001)"));
        assert!(is_host_resolution_failure(
            "nodename nor servname provided, or not known"
        ));
    }

    #[test]
    fn test_other_failures_are_transport() {
        assert!(!is_host_resolution_failure("connection refused (os error 111)"));
        assert!(!is_host_resolution_failure("operation timed out"));
    }

    #[test]
    fn test_default_client_builds() {
        assert!(HttpChecker::new(&LinkCheckOptions::default()).is_ok());
    }
}
