//! Mandrill API clients
//!
//! [`MandrillClient`] is the seam between the transport and the network.
//! [`HttpMandrillClient`] talks to the real API; [`MemoryMandrillClient`]
//! records requests in memory for tests and development.

use async_trait::async_trait;
use parking_lot::RwLock;
use reqwest::Client;
use std::sync::Arc;
use std::time::Duration;

use crate::payload::{ApiErrorBody, DeliveryStatus, RecipientStatus, SendRequest};
use crate::{MandrillError, MandrillResult};

/// Default Mandrill API endpoint.
pub const DEFAULT_BASE_URL: &str = "https://mandrillapp.com/api/1.0";

/// Default HTTP timeout in seconds.
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Client for the `messages/send` API operation.
#[async_trait]
pub trait MandrillClient: Send + Sync {
	/// Submit a message and return one status per recipient.
	async fn send(&self, request: &SendRequest) -> MandrillResult<Vec<RecipientStatus>>;
}

/// HTTP client for the Mandrill JSON API.
///
/// # Examples
///
/// ```no_run
/// use reinhardt_mandrill::HttpMandrillClient;
///
/// let client = HttpMandrillClient::new().unwrap();
/// assert_eq!(client.base_url(), "https://mandrillapp.com/api/1.0");
/// ```
#[derive(Debug, Clone)]
pub struct HttpMandrillClient {
	client: Client,
	base_url: String,
}

impl HttpMandrillClient {
	/// Create a client for the public Mandrill endpoint.
	pub fn new() -> MandrillResult<Self> {
		Self::with_timeout(DEFAULT_BASE_URL, Duration::from_secs(DEFAULT_TIMEOUT_SECS))
	}

	/// Create a client for a custom endpoint (e.g. a proxy or a test server).
	pub fn with_timeout(base_url: impl Into<String>, timeout: Duration) -> MandrillResult<Self> {
		let client = Client::builder().timeout(timeout).build()?;
		Ok(Self::with_client(base_url, client))
	}

	/// Create a client around an existing reqwest client.
	pub fn with_client(base_url: impl Into<String>, client: Client) -> Self {
		Self {
			client,
			base_url: base_url.into().trim_end_matches('/').to_string(),
		}
	}

	pub fn base_url(&self) -> &str {
		&self.base_url
	}

	fn send_url(&self) -> String {
		format!("{}/messages/send.json", self.base_url)
	}
}

#[async_trait]
impl MandrillClient for HttpMandrillClient {
	async fn send(&self, request: &SendRequest) -> MandrillResult<Vec<RecipientStatus>> {
		let response = self
			.client
			.post(self.send_url())
			.header("Content-Type", "application/json")
			.json(request)
			.send()
			.await?;

		let status = response.status();
		let body = response.text().await?;

		if !status.is_success() {
			return Err(match serde_json::from_str::<ApiErrorBody>(&body) {
				Ok(error) => MandrillError::Api {
					code: error.code,
					name: error.name,
					message: error.message,
				},
				Err(_) => MandrillError::Api {
					code: Some(i64::from(status.as_u16())),
					name: "HttpError".to_string(),
					message: body,
				},
			});
		}

		Ok(serde_json::from_str(&body)?)
	}
}

/// In-memory client that records every request.
///
/// By default every recipient of a request is reported as `sent`. A canned
/// response or a failure can be configured for the following calls.
///
/// # Examples
///
/// ```
/// use reinhardt_mandrill::{MemoryMandrillClient, DeliveryStatus, RecipientStatus};
///
/// let client = MemoryMandrillClient::new();
/// client.respond_with(vec![RecipientStatus::new("a@example.com", DeliveryStatus::Queued)]);
/// assert_eq!(client.count(), 0);
/// ```
#[derive(Clone, Default)]
pub struct MemoryMandrillClient {
	requests: Arc<RwLock<Vec<SendRequest>>>,
	response: Arc<RwLock<Option<Vec<RecipientStatus>>>>,
	failure: Arc<RwLock<Option<String>>>,
}

impl MemoryMandrillClient {
	pub fn new() -> Self {
		Self::default()
	}

	/// Answer subsequent calls with the given statuses.
	pub fn respond_with(&self, statuses: Vec<RecipientStatus>) {
		*self.response.write() = Some(statuses);
	}

	/// Fail subsequent calls with an API error carrying `message`.
	pub fn fail_with(&self, message: impl Into<String>) {
		*self.failure.write() = Some(message.into());
	}

	/// All requests received so far.
	pub fn requests(&self) -> Vec<SendRequest> {
		self.requests.read().clone()
	}

	pub fn count(&self) -> usize {
		self.requests.read().len()
	}

	pub fn clear(&self) {
		self.requests.write().clear();
	}
}

#[async_trait]
impl MandrillClient for MemoryMandrillClient {
	async fn send(&self, request: &SendRequest) -> MandrillResult<Vec<RecipientStatus>> {
		self.requests.write().push(request.clone());

		if let Some(message) = self.failure.read().clone() {
			return Err(MandrillError::Api {
				code: None,
				name: "MemoryClientError".to_string(),
				message,
			});
		}

		if let Some(statuses) = self.response.read().clone() {
			return Ok(statuses);
		}

		Ok(request
			.message
			.recipients
			.iter()
			.map(|recipient| RecipientStatus::new(recipient.email.clone(), DeliveryStatus::Sent))
			.collect())
	}
}
