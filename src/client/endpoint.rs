// file: src/client/endpoint.rs
// description: turns user-supplied service addresses into canonical base urls
// reference: https://docs.rs/url

use crate::config::DEFAULT_ENDPOINT;
use crate::error::{ClientError, Result};
use lazy_static::lazy_static;
use regex::Regex;
use std::fmt;
use url::Url;

lazy_static! {
    // host token glued to its port, e.g. `localhost8000` or `http://svc8080/api`
    static ref MISSING_PORT_COLON: Regex = Regex::new(
        r"^(?P<scheme>[A-Za-z][A-Za-z0-9+.-]*://)?(?P<host>[A-Za-z0-9.-]*[A-Za-z])(?P<port>\d{2,5})(?P<rest>[/?#].*)?$"
    ).expect("MISSING_PORT_COLON regex is valid");

    static ref REPEATED_SLASHES: Regex = Regex::new(r"/{2,}")
        .expect("REPEATED_SLASHES regex is valid");
}

/// Canonical base URL of the embedding service, without a trailing slash.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Endpoint {
    base: String,
}

impl Endpoint {
    /// Resolves a possibly malformed address. Empty input selects the default
    /// endpoint. Idempotent on its own output.
    pub fn resolve(raw: &str) -> Result<Self> {
        let trimmed = raw.trim();
        let input = if trimmed.is_empty() {
            DEFAULT_ENDPOINT
        } else {
            trimmed
        };

        let normalized =
            normalize(input).map_err(|reason| ClientError::invalid_endpoint(raw, reason))?;

        // An explicit scheme is never re-prefixed: `ftp://host` has no host
        // token left to recover, so only http and https pass below.
        let mut candidates = vec![normalized.clone()];
        if !normalized.contains("://") {
            candidates.push(format!("http://{}", normalized));
        }

        let mut last_reason = String::from("no usable host");
        for candidate in &candidates {
            match Url::parse(candidate) {
                Ok(url) if is_http(&url) => {
                    if url.host_str().is_none_or(str::is_empty) {
                        last_reason = "missing host".to_string();
                        continue;
                    }
                    let base = url.as_str();
                    let base = base.strip_suffix('/').unwrap_or(base).to_string();
                    return Ok(Self { base });
                }
                Ok(url) => {
                    last_reason = format!("unsupported scheme '{}'", url.scheme());
                }
                Err(e) => {
                    last_reason = e.to_string();
                }
            }
        }

        Err(ClientError::invalid_endpoint(raw, last_reason))
    }

    pub fn as_str(&self) -> &str {
        &self.base
    }

    /// Absolute URL for a service path such as `/search`.
    pub fn url_for(&self, path: &str) -> String {
        format!("{}/{}", self.base, path.trim_start_matches('/'))
    }
}

impl fmt::Display for Endpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.base)
    }
}

fn is_http(url: &Url) -> bool {
    matches!(url.scheme(), "http" | "https")
}

/// Inserts a missing port colon and collapses repeated slashes. A glued port
/// outside the u16 range is an error: leaving it glued would make the host
/// token change meaning on the next pass.
fn normalize(input: &str) -> std::result::Result<String, String> {
    let with_colon = match MISSING_PORT_COLON.captures(input) {
        Some(caps) => {
            let port = &caps["port"];
            if port.parse::<u16>().is_err() {
                return Err(format!("port {} is out of range", port));
            }
            format!(
                "{}{}:{}{}",
                caps.name("scheme").map_or("", |m| m.as_str()),
                &caps["host"],
                port,
                caps.name("rest").map_or("", |m| m.as_str())
            )
        }
        None => input.to_string(),
    };

    let collapsed = match with_colon.split_once("://") {
        Some((scheme, rest)) => {
            format!("{}://{}", scheme, REPEATED_SLASHES.replace_all(rest, "/"))
        }
        None => REPEATED_SLASHES.replace_all(&with_colon, "/").into_owned(),
    };
    Ok(collapsed)
}
