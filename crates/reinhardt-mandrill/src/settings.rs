//! Mandrill transport settings

use serde::{Deserialize, Serialize};
use std::env;

use crate::client::{DEFAULT_BASE_URL, DEFAULT_TIMEOUT_SECS};
use crate::{MandrillError, MandrillResult};

const ENV_PREFIX: &str = "MANDRILL_";

/// Settings for [`MandrillTransport`](crate::MandrillTransport).
///
/// # Examples
///
/// ```
/// use reinhardt_mandrill::MandrillSettings;
///
/// let settings: MandrillSettings = serde_json::from_str(r#"{"api_key": "key"}"#).unwrap();
/// assert_eq!(settings.api_key.as_deref(), Some("key"));
/// assert_eq!(settings.base_url, "https://mandrillapp.com/api/1.0");
/// assert_eq!(settings.timeout, 30);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MandrillSettings {
	/// API key; sends fail with a configuration error while unset
	#[serde(default)]
	pub api_key: Option<String>,

	/// Ask Mandrill to accept messages asynchronously
	#[serde(default)]
	pub async_mode: Option<bool>,

	/// Sub-account attached to every message
	#[serde(default)]
	pub sub_account: Option<String>,

	#[serde(default = "default_base_url")]
	pub base_url: String,

	/// HTTP timeout in seconds
	#[serde(default = "default_timeout")]
	pub timeout: u64,
}

fn default_base_url() -> String {
	DEFAULT_BASE_URL.to_string()
}

fn default_timeout() -> u64 {
	DEFAULT_TIMEOUT_SECS
}

impl Default for MandrillSettings {
	fn default() -> Self {
		Self {
			api_key: None,
			async_mode: None,
			sub_account: None,
			base_url: default_base_url(),
			timeout: default_timeout(),
		}
	}
}

impl MandrillSettings {
	/// Load settings from `MANDRILL_*` environment variables.
	///
	/// Reads `MANDRILL_API_KEY`, `MANDRILL_ASYNC`, `MANDRILL_SUBACCOUNT`,
	/// `MANDRILL_BASE_URL` and `MANDRILL_TIMEOUT`. Unset variables keep their
	/// defaults.
	pub fn from_env() -> MandrillResult<Self> {
		Self::from_lookup(|key| env::var(format!("{}{}", ENV_PREFIX, key)).ok())
	}

	/// Load settings through an arbitrary key lookup (keys without prefix).
	pub fn from_lookup<F>(lookup: F) -> MandrillResult<Self>
	where
		F: Fn(&str) -> Option<String>,
	{
		let mut settings = Self::default();

		settings.api_key = lookup("API_KEY").filter(|v| !v.is_empty());
		settings.sub_account = lookup("SUBACCOUNT").filter(|v| !v.is_empty());

		if let Some(raw) = lookup("ASYNC") {
			settings.async_mode = Some(parse_bool(&raw).ok_or_else(|| {
				MandrillError::Configuration(format!("{}ASYNC: invalid boolean {:?}", ENV_PREFIX, raw))
			})?);
		}

		if let Some(url) = lookup("BASE_URL").filter(|v| !v.is_empty()) {
			settings.base_url = url;
		}

		if let Some(raw) = lookup("TIMEOUT") {
			settings.timeout = raw
				.trim()
				.parse()
				.ok()
				.filter(|seconds: &u64| *seconds > 0)
				.ok_or_else(|| {
					MandrillError::Configuration(format!(
						"{}TIMEOUT: expected a positive number of seconds, got {:?}",
						ENV_PREFIX, raw
					))
				})?;
		}

		Ok(settings)
	}
}

fn parse_bool(value: &str) -> Option<bool> {
	match value.trim().to_ascii_lowercase().as_str() {
		"true" | "1" | "yes" | "on" => Some(true),
		"false" | "0" | "no" | "off" => Some(false),
		_ => None,
	}
}
