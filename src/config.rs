//! Command-line / environment settings for the fetcher.

use std::time::Duration;

use clap::Args;

use crate::fetch::{FetchOptions, DEFAULT_BASE_URL, DEFAULT_USER_AGENT};

#[derive(Debug, Clone, Args)]
pub struct Settings {
    /// Base URL the normalized code is appended to
    #[arg(long, env = "OPS_BASE_URL", default_value = DEFAULT_BASE_URL, global = true)]
    pub base_url: String,

    /// User-Agent header sent with every request
    #[arg(long, env = "OPS_USER_AGENT", default_value = DEFAULT_USER_AGENT, global = true)]
    pub user_agent: String,

    /// Request timeout in seconds
    #[arg(long, env = "OPS_TIMEOUT_SECS", default_value_t = 20, global = true)]
    pub timeout: u64,

    /// Extra request header as NAME:VALUE (repeatable)
    #[arg(long = "header", value_name = "NAME:VALUE", value_parser = parse_header, global = true)]
    pub headers: Vec<(String, String)>,
}

impl Settings {
    pub fn fetch_options(&self) -> FetchOptions {
        FetchOptions {
            base_url: self.base_url.clone(),
            user_agent: self.user_agent.clone(),
            headers: self.headers.clone(),
            timeout: Duration::from_secs(self.timeout),
        }
    }
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            user_agent: DEFAULT_USER_AGENT.to_string(),
            timeout: 20,
            headers: vec![],
        }
    }
}

fn parse_header(raw: &str) -> Result<(String, String), String> {
    let (name, value) = raw
        .split_once(':')
        .ok_or_else(|| format!("expected NAME:VALUE, got {:?}", raw))?;
    let name = name.trim();
    if name.is_empty() {
        return Err(format!("empty header name in {:?}", raw));
    }
    Ok((name.to_string(), value.trim().to_string()))
}
