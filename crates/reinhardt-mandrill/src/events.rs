//! Send lifecycle events
//!
//! Listeners are registered on a [`MandrillTransport`](crate::MandrillTransport)
//! and called in registration order, once before the API call and once after
//! the result has been accounted. An error returned by a listener aborts the
//! send and is returned to the caller unchanged.

use std::fmt;

use crate::MandrillResult;
use crate::message::MimeMessage;

/// Verdict attached to a [`SendEvent`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SendOutcome {
	/// The send has not completed yet
	#[default]
	Pending,
	/// At least one recipient was accepted
	Success,
	/// No recipient was accepted
	Failed,
}

/// Event passed to [`SendListener`]s.
pub struct SendEvent<'a> {
	message: &'a MimeMessage,
	cancelled: bool,
	outcome: SendOutcome,
	failed_recipients: Vec<String>,
}

impl<'a> SendEvent<'a> {
	pub(crate) fn new(message: &'a MimeMessage) -> Self {
		Self {
			message,
			cancelled: false,
			outcome: SendOutcome::Pending,
			failed_recipients: Vec::new(),
		}
	}

	pub fn message(&self) -> &MimeMessage {
		self.message
	}

	/// Cancel the send. Only effective from
	/// [`SendListener::before_send_performed`].
	pub fn cancel(&mut self) {
		self.cancelled = true;
	}

	pub fn is_cancelled(&self) -> bool {
		self.cancelled
	}

	pub fn outcome(&self) -> SendOutcome {
		self.outcome
	}

	/// Recipients Mandrill did not accept. Empty before the send completes.
	pub fn failed_recipients(&self) -> &[String] {
		&self.failed_recipients
	}

	pub(crate) fn complete(&mut self, outcome: SendOutcome, failed_recipients: Vec<String>) {
		self.outcome = outcome;
		self.failed_recipients = failed_recipients;
	}
}

impl fmt::Debug for SendEvent<'_> {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("SendEvent")
			.field("subject", &self.message.subject())
			.field("cancelled", &self.cancelled)
			.field("outcome", &self.outcome)
			.field("failed_recipients", &self.failed_recipients)
			.finish()
	}
}

/// Hooks invoked around each send.
///
/// Both methods default to doing nothing, so listeners only implement the
/// hook they care about.
///
/// # Examples
///
/// ```
/// use reinhardt_mandrill::{MandrillResult, SendEvent, SendListener};
///
/// struct BlockInternal;
///
/// impl SendListener for BlockInternal {
///     fn before_send_performed(&self, event: &mut SendEvent<'_>) -> MandrillResult<()> {
///         if event.message().to().keys().any(|email| email.ends_with("@internal.test")) {
///             event.cancel();
///         }
///         Ok(())
///     }
/// }
/// ```
pub trait SendListener: Send + Sync {
	/// Called before the message is translated and sent.
	fn before_send_performed(&self, _event: &mut SendEvent<'_>) -> MandrillResult<()> {
		Ok(())
	}

	/// Called after the API result has been accounted.
	fn send_performed(&self, _event: &SendEvent<'_>) -> MandrillResult<()> {
		Ok(())
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use rstest::rstest;

	#[rstest]
	fn test_event_starts_pending_and_uncancelled() {
		let message = MimeMessage::builder()
			.from("a@example.com")
			.build()
			.unwrap();

		let event = SendEvent::new(&message);

		assert!(!event.is_cancelled());
		assert_eq!(event.outcome(), SendOutcome::Pending);
		assert!(event.failed_recipients().is_empty());
	}

	#[rstest]
	fn test_complete_records_outcome() {
		let message = MimeMessage::builder()
			.from("a@example.com")
			.build()
			.unwrap();
		let mut event = SendEvent::new(&message);

		event.complete(SendOutcome::Failed, vec!["x@example.com".to_string()]);

		assert_eq!(event.outcome(), SendOutcome::Failed);
		assert_eq!(event.failed_recipients(), ["x@example.com".to_string()]);
	}
}
