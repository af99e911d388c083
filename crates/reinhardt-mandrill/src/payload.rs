//! Mandrill `messages/send` wire types
//!
//! Field names and the omit-when-absent rules follow the Mandrill API
//! documentation for `POST /messages/send.json`.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// Role of a recipient within the message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RecipientType {
	To,
	Cc,
	Bcc,
}

/// A flattened recipient entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Recipient {
	pub email: String,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub name: Option<String>,
	#[serde(rename = "type")]
	pub kind: RecipientType,
}

/// Base64-encoded attachment or inline image.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MandrillAttachment {
	#[serde(rename = "type")]
	pub content_type: String,
	pub name: String,
	pub content: String,
}

/// The `message` document of a send request.
///
/// Optional fields are omitted from the JSON entirely when unset. In particular
/// `attachments` and `images` are never sent as empty lists.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MandrillMessage {
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub html: Option<String>,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub text: Option<String>,
	pub subject: String,
	pub from_email: String,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub from_name: Option<String>,
	/// to, cc and bcc recipients, in that order
	#[serde(rename = "to")]
	pub recipients: Vec<Recipient>,
	#[serde(default)]
	pub headers: IndexMap<String, String>,
	#[serde(default)]
	pub tags: Vec<String>,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub inline_css: Option<String>,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub global_merge_vars: Option<serde_json::Value>,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub merge_vars: Option<serde_json::Value>,
	#[serde(default, skip_serializing_if = "Vec::is_empty")]
	pub attachments: Vec<MandrillAttachment>,
	#[serde(default, skip_serializing_if = "Vec::is_empty")]
	pub images: Vec<MandrillAttachment>,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub auto_text: Option<bool>,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub google_analytics_domains: Option<Vec<String>>,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub google_analytics_campaign: Option<String>,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub tracking_domain: Option<String>,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub subaccount: Option<String>,
}

/// Full request body for `messages/send.json`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SendRequest {
	pub key: String,
	pub message: MandrillMessage,
	#[serde(rename = "async", skip_serializing_if = "Option::is_none")]
	pub async_mode: Option<bool>,
}

/// Delivery status reported for a single recipient.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DeliveryStatus {
	Sent,
	Queued,
	Scheduled,
	Rejected,
	Invalid,
	#[serde(other)]
	Unknown,
}

impl DeliveryStatus {
	/// Whether the recipient counts as accepted for delivery.
	///
	/// Only `sent` and `queued` are accepted; `scheduled` is not.
	pub fn is_accepted(self) -> bool {
		matches!(self, DeliveryStatus::Sent | DeliveryStatus::Queued)
	}
}

/// One entry of the array returned by `messages/send.json`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecipientStatus {
	pub email: String,
	pub status: DeliveryStatus,
	#[serde(rename = "_id", default, skip_serializing_if = "Option::is_none")]
	pub id: Option<String>,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub reject_reason: Option<String>,
}

impl RecipientStatus {
	pub fn new(email: impl Into<String>, status: DeliveryStatus) -> Self {
		Self {
			email: email.into(),
			status,
			id: None,
			reject_reason: None,
		}
	}
}

/// Error document returned by Mandrill on non-2xx responses.
#[derive(Debug, Clone, Deserialize)]
pub(crate) struct ApiErrorBody {
	#[serde(default)]
	pub code: Option<i64>,
	pub name: String,
	pub message: String,
}

#[cfg(test)]
mod tests {
	use super::*;
	use rstest::rstest;
	use serde_json::json;

	#[rstest]
	fn test_minimal_message_omits_optional_keys() {
		// Arrange
		let message = MandrillMessage {
			text: Some("hi".to_string()),
			subject: "s".to_string(),
			from_email: "from@example.com".to_string(),
			..Default::default()
		};

		// Act
		let value = serde_json::to_value(&message).unwrap();

		// Assert
		assert_eq!(
			value,
			json!({
				"text": "hi",
				"subject": "s",
				"from_email": "from@example.com",
				"to": [],
				"headers": {},
				"tags": [],
			})
		);
	}

	#[rstest]
	fn test_recipient_serializes_type_tag() {
		let recipient = Recipient {
			email: "a@example.com".to_string(),
			name: Some("A".to_string()),
			kind: RecipientType::Bcc,
		};

		assert_eq!(
			serde_json::to_value(&recipient).unwrap(),
			json!({"email": "a@example.com", "name": "A", "type": "bcc"})
		);
	}

	#[rstest]
	fn test_send_request_async_flag() {
		let request = SendRequest {
			key: "k".to_string(),
			message: MandrillMessage::default(),
			async_mode: Some(true),
		};

		let value = serde_json::to_value(&request).unwrap();

		assert_eq!(value["key"], "k");
		assert_eq!(value["async"], true);

		let request = SendRequest {
			async_mode: None,
			..request
		};
		let value = serde_json::to_value(&request).unwrap();
		assert!(value.get("async").is_none());
	}

	#[rstest]
	fn test_recipient_status_parses_unknown_status() {
		// Arrange
		let raw = json!([
			{"email": "a@example.com", "status": "sent", "_id": "abc", "reject_reason": null},
			{"email": "b@example.com", "status": "soft-bounced"},
			{"email": "c@example.com", "status": "rejected", "reject_reason": "hard-bounce"},
		]);

		// Act
		let statuses: Vec<RecipientStatus> = serde_json::from_value(raw).unwrap();

		// Assert
		assert_eq!(statuses[0].status, DeliveryStatus::Sent);
		assert_eq!(statuses[0].id.as_deref(), Some("abc"));
		assert_eq!(statuses[1].status, DeliveryStatus::Unknown);
		assert_eq!(statuses[2].reject_reason.as_deref(), Some("hard-bounce"));
	}

	#[rstest]
	#[case(DeliveryStatus::Sent, true)]
	#[case(DeliveryStatus::Queued, true)]
	#[case(DeliveryStatus::Scheduled, false)]
	#[case(DeliveryStatus::Rejected, false)]
	#[case(DeliveryStatus::Invalid, false)]
	#[case(DeliveryStatus::Unknown, false)]
	fn test_accepted_statuses(#[case] status: DeliveryStatus, #[case] accepted: bool) {
		assert_eq!(status.is_accepted(), accepted);
	}
}
