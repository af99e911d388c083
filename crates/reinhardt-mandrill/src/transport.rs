//! Mandrill send orchestration
//!
//! [`MandrillTransport`] drives one send: listeners are notified, the message is
//! translated, the API client is called once, and the per-recipient statuses
//! are folded into a [`SendReport`].

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use crate::client::{HttpMandrillClient, MandrillClient};
use crate::events::{SendEvent, SendListener, SendOutcome};
use crate::message::MimeMessage;
use crate::payload::{MandrillMessage, RecipientStatus, SendRequest};
use crate::settings::MandrillSettings;
use crate::translator::Translator;
use crate::{MandrillError, MandrillResult};

/// Outcome of [`MandrillTransport::send`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SendReport {
	/// Recipients reported as `sent` or `queued`
	pub accepted: usize,
	/// Recipients with any other status, in API order
	pub failed_recipients: Vec<String>,
}

impl SendReport {
	fn cancelled() -> Self {
		Self::default()
	}
}

/// Transport delivering [`MimeMessage`]s through Mandrill.
///
/// # Examples
///
/// ```
/// # #[tokio::main]
/// # async fn main() -> Result<(), Box<dyn std::error::Error>> {
/// use reinhardt_mandrill::{MandrillTransport, MemoryMandrillClient, MimeMessage};
///
/// let client = MemoryMandrillClient::new();
/// let mut transport = MandrillTransport::new(client.clone()).with_api_key("test-key");
///
/// let message = MimeMessage::builder()
///     .from("sender@example.com")
///     .to("user@example.com")
///     .subject("Hello")
///     .plain("Hi there")
///     .build()?;
///
/// let report = transport.send(&message).await?;
/// assert_eq!(report.accepted, 1);
/// assert_eq!(client.count(), 1);
/// # Ok(())
/// # }
/// ```
pub struct MandrillTransport {
	client: Arc<dyn MandrillClient>,
	api_key: Option<String>,
	async_mode: Option<bool>,
	sub_account: Option<String>,
	listeners: Vec<Arc<dyn SendListener>>,
	last_result: Option<Vec<RecipientStatus>>,
}

impl MandrillTransport {
	/// Create a transport around an API client. No API key is set.
	pub fn new<C>(client: C) -> Self
	where
		C: MandrillClient + 'static,
	{
		Self::with_shared_client(Arc::new(client))
	}

	pub fn with_shared_client(client: Arc<dyn MandrillClient>) -> Self {
		Self {
			client,
			api_key: None,
			async_mode: None,
			sub_account: None,
			listeners: Vec::new(),
			last_result: None,
		}
	}

	/// Create a transport backed by [`HttpMandrillClient`].
	pub fn from_settings(settings: &MandrillSettings) -> MandrillResult<Self> {
		if settings.timeout == 0 {
			return Err(MandrillError::Configuration(
				"Mandrill timeout must be at least one second".to_string(),
			));
		}

		let client = HttpMandrillClient::with_timeout(
			settings.base_url.clone(),
			Duration::from_secs(settings.timeout),
		)?;

		let mut transport = Self::new(client);
		transport.api_key = settings.api_key.clone();
		transport.async_mode = settings.async_mode;
		transport.sub_account = settings.sub_account.clone();
		Ok(transport)
	}

	pub fn with_api_key(mut self, api_key: impl Into<String>) -> Self {
		self.api_key = Some(api_key.into());
		self
	}

	pub fn with_async(mut self, async_mode: bool) -> Self {
		self.async_mode = Some(async_mode);
		self
	}

	pub fn with_sub_account(mut self, sub_account: impl Into<String>) -> Self {
		self.sub_account = Some(sub_account.into());
		self
	}

	pub fn set_api_key(&mut self, api_key: impl Into<String>) -> &mut Self {
		self.api_key = Some(api_key.into());
		self
	}

	pub fn set_async(&mut self, async_mode: Option<bool>) -> &mut Self {
		self.async_mode = async_mode;
		self
	}

	pub fn set_sub_account(&mut self, sub_account: Option<String>) -> &mut Self {
		self.sub_account = sub_account;
		self
	}

	pub fn api_key(&self) -> Option<&str> {
		self.api_key.as_deref()
	}

	pub fn async_mode(&self) -> Option<bool> {
		self.async_mode
	}

	pub fn sub_account(&self) -> Option<&str> {
		self.sub_account.as_deref()
	}

	/// Register a listener. Listeners run in registration order.
	pub fn register_listener<L>(&mut self, listener: L) -> &mut Self
	where
		L: SendListener + 'static,
	{
		self.listeners.push(Arc::new(listener));
		self
	}

	/// Raw statuses returned by the most recent send, if it reached the API.
	pub fn last_result(&self) -> Option<&[RecipientStatus]> {
		self.last_result.as_deref()
	}

	/// Translate a message with this transport's sub-account.
	pub fn mandrill_message(&self, message: &MimeMessage) -> MandrillResult<MandrillMessage> {
		Translator::new()
			.with_optional_subaccount(self.sub_account.as_deref())
			.translate(message)
	}

	/// Send a message.
	///
	/// Returns a report with `accepted == 0` and no API call when a listener
	/// cancels the send. Listener, configuration, translation and client errors
	/// are returned unchanged; `send_performed` is only fired once the API has
	/// answered.
	pub async fn send(&mut self, message: &MimeMessage) -> MandrillResult<SendReport> {
		self.last_result = None;

		let mut event = SendEvent::new(message);
		for listener in &self.listeners {
			listener.before_send_performed(&mut event)?;
		}

		if event.is_cancelled() {
			tracing::debug!(
				recipients = message.to().len() + message.cc().len() + message.bcc().len(),
				"Mandrill send cancelled by listener"
			);
			return Ok(SendReport::cancelled());
		}

		let key = self
			.api_key
			.clone()
			.filter(|key| !key.is_empty())
			.ok_or_else(|| MandrillError::Configuration("Mandrill API key is not set".to_string()))?;

		let request = SendRequest {
			key,
			message: self.mandrill_message(message)?,
			async_mode: self.async_mode,
		};

		tracing::debug!(
			recipients = request.message.recipients.len(),
			async_mode = ?self.async_mode,
			"Sending message through Mandrill"
		);

		let statuses = self.client.send(&request).await?;

		let mut report = SendReport::default();
		for status in &statuses {
			if status.status.is_accepted() {
				report.accepted += 1;
			} else {
				report.failed_recipients.push(status.email.clone());
			}
		}
		self.last_result = Some(statuses);

		tracing::debug!(
			accepted = report.accepted,
			failed = report.failed_recipients.len(),
			"Mandrill send completed"
		);

		let outcome = if report.accepted > 0 {
			SendOutcome::Success
		} else {
			SendOutcome::Failed
		};
		event.complete(outcome, report.failed_recipients.clone());
		for listener in &self.listeners {
			listener.send_performed(&event)?;
		}

		Ok(report)
	}
}

impl fmt::Debug for MandrillTransport {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("MandrillTransport")
			.field("api_key", &self.api_key.as_ref().map(|_| "***"))
			.field("async_mode", &self.async_mode)
			.field("sub_account", &self.sub_account)
			.field("listeners", &self.listeners.len())
			.field("last_result", &self.last_result)
			.finish()
	}
}
