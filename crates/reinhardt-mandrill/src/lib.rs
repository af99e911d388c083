//! # Reinhardt Mandrill
//!
//! Mandrill transactional email transport for Reinhardt.
//!
//! ## Features
//!
//! - **MimeMessage**: library-agnostic message model with a validating builder
//! - **Translator**: pure translation of a message into the Mandrill
//!   `messages/send` payload (recipients, html/text bodies, attachments,
//!   inline images, custom headers, tags, merge vars, tracking options)
//! - **MandrillTransport**: send orchestration with cancelable lifecycle
//!   listeners and per-recipient result accounting
//! - **Clients**: an HTTP client for the Mandrill JSON API and an in-memory
//!   client for tests
//! - **Settings**: configuration from serde sources or `MANDRILL_*`
//!   environment variables
//!
//! ## Recognized headers
//!
//! | Header | Payload field |
//! |---|---|
//! | `X-MC-GlobalMergeVars` | `global_merge_vars` |
//! | `X-MC-MergeVars` | `merge_vars` |
//! | `List-Unsubscribe` | `headers` |
//! | `X-MC-InlineCSS` | `inline_css` |
//! | `X-MC-Tags` | `tags` |
//! | `X-MC-Autotext` | `auto_text` |
//! | `X-MC-GoogleAnalytics` | `google_analytics_domains` |
//! | `X-MC-GoogleAnalyticsCampaign` | `google_analytics_campaign` |
//! | `X-MC-TrackingDomain` | `tracking_domain` |
//!
//! Any other `X-` header is forwarded in `headers`; everything else is dropped.
//!
//! ## Example
//!
//! ```rust,no_run
//! # #[tokio::main]
//! # async fn main() -> Result<(), Box<dyn std::error::Error>> {
//! use reinhardt_mandrill::{ChildPart, MandrillSettings, MandrillTransport, MimeMessage};
//!
//! let settings = MandrillSettings::from_env()?;
//! let mut transport = MandrillTransport::from_settings(&settings)?;
//!
//! let message = MimeMessage::builder()
//!     .from_named("orders@example.com", "Example Shop")
//!     .to_named("customer@example.com", "Customer")
//!     .subject("Your order")
//!     .html("<h1>Thanks!</h1>")
//!     .child(ChildPart::attachment("invoice.pdf", b"%PDF".to_vec()))
//!     .header("X-MC-Tags", "orders,invoice")
//!     .build()?;
//!
//! let report = transport.send(&message).await?;
//! println!("accepted {} / rejected {:?}", report.accepted, report.failed_recipients);
//! # Ok(())
//! # }
//! ```

pub mod client;
pub mod events;
pub mod headers;
pub mod message;
pub mod payload;
pub mod settings;
pub mod translator;
pub mod transport;

use thiserror::Error;

pub use client::{HttpMandrillClient, MandrillClient, MemoryMandrillClient};
pub use events::{SendEvent, SendListener, SendOutcome};
pub use message::{
	AddressMap, ChildPart, Header, HeaderKind, HeaderValue, MimeMessage, MimeMessageBuilder,
};
pub use payload::{
	DeliveryStatus, MandrillAttachment, MandrillMessage, Recipient, RecipientStatus,
	RecipientType, SendRequest,
};
pub use settings::MandrillSettings;
pub use translator::{Translator, translate};
pub use transport::{MandrillTransport, SendReport};

#[derive(Debug, Error)]
pub enum MandrillError {
	#[error("Configuration error: {0}")]
	Configuration(String),

	#[error("Malformed message: {0}")]
	MalformedMessage(String),

	#[error("Missing required field: {0}")]
	MissingField(String),

	#[error("Invalid header: {0}")]
	InvalidHeader(String),

	#[error("HTTP error: {0}")]
	Http(#[from] reqwest::Error),

	#[error("Mandrill API error {name}: {message}")]
	Api {
		code: Option<i64>,
		name: String,
		message: String,
	},

	#[error("Serialization error: {0}")]
	Serialization(#[from] serde_json::Error),

	/// Raised by a [`SendListener`]; the listener's own error is kept as source
	#[error("Listener error: {0}")]
	Listener(#[source] Box<dyn std::error::Error + Send + Sync>),
}

impl MandrillError {
	/// Wrap an error (or a message) raised by a listener.
	///
	/// # Examples
	///
	/// ```
	/// use reinhardt_mandrill::MandrillError;
	///
	/// let error = MandrillError::listener("quota exceeded");
	/// assert_eq!(error.to_string(), "Listener error: quota exceeded");
	/// ```
	pub fn listener(error: impl Into<Box<dyn std::error::Error + Send + Sync>>) -> Self {
		MandrillError::Listener(error.into())
	}

	/// Whether the error was raised while talking to the API.
	pub fn is_transport(&self) -> bool {
		matches!(
			self,
			MandrillError::Http(_) | MandrillError::Api { .. } | MandrillError::Serialization(_)
		)
	}
}

pub type MandrillResult<T> = std::result::Result<T, MandrillError>;

#[cfg(test)]
mod tests {
	use super::*;
	use rstest::rstest;
	use std::error::Error as _;

	#[rstest]
	fn test_listener_error_keeps_source() {
		// Arrange
		let cause = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "audit log locked");

		// Act
		let error = MandrillError::listener(cause);

		// Assert
		assert_eq!(error.to_string(), "Listener error: audit log locked");
		let source = error.source().unwrap();
		assert_eq!(source.to_string(), "audit log locked");
		assert!(source.downcast_ref::<std::io::Error>().is_some());
		assert!(!error.is_transport());
	}
}
