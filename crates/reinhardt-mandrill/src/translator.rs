//! MIME message to Mandrill payload translation
//!
//! Translation is pure: the same message always produces the same payload and
//! nothing outside the returned [`MandrillMessage`] is touched.

use base64::Engine;
use base64::engine::general_purpose::STANDARD;

use crate::headers::{self, McHeader};
use crate::message::{AddressMap, ChildPart, MimeMessage, TEXT_HTML, TEXT_PLAIN};
use crate::payload::{MandrillAttachment, MandrillMessage, Recipient, RecipientType};
use crate::{MandrillError, MandrillResult};

/// Builds Mandrill payloads from [`MimeMessage`]s.
///
/// # Examples
///
/// ```
/// use reinhardt_mandrill::{MimeMessage, Translator};
///
/// let message = MimeMessage::builder()
///     .from_named("noreply@example.com", "Example")
///     .to("user@example.com")
///     .subject("Welcome")
///     .html("<h1>Welcome</h1>")
///     .build()
///     .unwrap();
///
/// let payload = Translator::new()
///     .with_subaccount("marketing")
///     .translate(&message)
///     .unwrap();
///
/// assert_eq!(payload.html.as_deref(), Some("<h1>Welcome</h1>"));
/// assert_eq!(payload.text, None);
/// assert_eq!(payload.subaccount.as_deref(), Some("marketing"));
/// ```
#[derive(Debug, Clone, Default)]
pub struct Translator {
	subaccount: Option<String>,
}

impl Translator {
	pub fn new() -> Self {
		Self::default()
	}

	pub fn with_subaccount(mut self, subaccount: impl Into<String>) -> Self {
		self.subaccount = Some(subaccount.into());
		self
	}

	pub(crate) fn with_optional_subaccount(mut self, subaccount: Option<&str>) -> Self {
		self.subaccount = subaccount.map(str::to_string);
		self
	}

	pub fn subaccount(&self) -> Option<&str> {
		self.subaccount.as_deref()
	}

	/// Translate a message into a `messages/send` payload.
	///
	/// Fails with [`MandrillError::MalformedMessage`] when no content type can
	/// be resolved for the main body.
	pub fn translate(&self, message: &MimeMessage) -> MandrillResult<MandrillMessage> {
		let content_type = primary_content_type(message)?;

		let (from_email, from_name) = message
			.sender()
			.ok_or_else(|| MandrillError::MissingField("from".to_string()))?;

		let mut payload = MandrillMessage {
			subject: message.subject().to_string(),
			from_email: from_email.to_string(),
			from_name: from_name.map(str::to_string),
			..Default::default()
		};

		push_recipients(&mut payload.recipients, message.to(), RecipientType::To);
		push_recipients(&mut payload.recipients, message.cc(), RecipientType::Cc);
		push_recipients(&mut payload.recipients, message.bcc(), RecipientType::Bcc);

		// Last entry wins, Reply-To holds a single value here
		for (email, name) in message.reply_to() {
			let value = match name {
				Some(name) if !name.is_empty() => format!("{} <{}>", name, email),
				_ => email.clone(),
			};
			payload.headers.insert("Reply-To".to_string(), value);
		}

		match content_type {
			TEXT_PLAIN => payload.text = Some(message.body().to_string()),
			_ => payload.html = Some(message.body().to_string()),
		}

		partition_children(&mut payload, message.children());
		apply_headers(&mut payload, message);

		if let Some(subaccount) = self.subaccount.as_deref().filter(|s| !s.is_empty()) {
			payload.subaccount = Some(subaccount.to_string());
		}

		Ok(payload)
	}
}

/// Translate a message without a sub-account.
pub fn translate(message: &MimeMessage) -> MandrillResult<MandrillMessage> {
	Translator::new().translate(message)
}

fn is_supported(content_type: &str) -> bool {
	content_type == TEXT_PLAIN || content_type == TEXT_HTML
}

/// Resolve the content type of the main body.
///
/// Messages with child parts expose a multipart type, which says nothing about
/// the body itself. In that case the declared single-part type is used.
fn primary_content_type(message: &MimeMessage) -> MandrillResult<&str> {
	let exposed = message.content_type();
	if is_supported(exposed) {
		return Ok(exposed);
	}

	let resolved = message.declared_content_type().unwrap_or(exposed);
	if resolved.is_empty() {
		return Err(MandrillError::MalformedMessage(
			"message has no content type".to_string(),
		));
	}
	Ok(resolved)
}

fn push_recipients(recipients: &mut Vec<Recipient>, addresses: &AddressMap, kind: RecipientType) {
	recipients.extend(addresses.iter().map(|(email, name)| Recipient {
		email: email.clone(),
		name: name.clone(),
		kind,
	}));
}

fn encode(content_type: &str, name: &str, content: &[u8]) -> MandrillAttachment {
	MandrillAttachment {
		content_type: content_type.to_string(),
		name: name.to_string(),
		content: STANDARD.encode(content),
	}
}

fn partition_children(payload: &mut MandrillMessage, children: &[ChildPart]) {
	for child in children {
		match child {
			ChildPart::Image {
				content_type,
				content_id,
				content,
			} => payload
				.images
				.push(encode(content_type, content_id, content)),
			ChildPart::Attachment {
				content_type,
				filename,
				content,
			} => payload
				.attachments
				.push(encode(content_type, filename, content)),
			ChildPart::Text { content_type, body } => match content_type.as_str() {
				TEXT_HTML => payload.html = Some(body.clone()),
				TEXT_PLAIN => payload.text = Some(body.clone()),
				_ => {}
			},
		}
	}
}

fn apply_headers(payload: &mut MandrillMessage, message: &MimeMessage) {
	for header in message.headers().iter().filter(|h| h.is_text()) {
		let value = header.value();
		let Some(recognized) = McHeader::from_name(header.name()) else {
			if headers::is_passthrough(header.name()) {
				payload
					.headers
					.insert(header.name().to_string(), value.to_text());
			}
			continue;
		};

		match recognized {
			McHeader::GlobalMergeVars => payload.global_merge_vars = Some(value.to_json()),
			McHeader::MergeVars => payload.merge_vars = Some(value.to_json()),
			McHeader::ListUnsubscribe => {
				payload
					.headers
					.insert(recognized.name().to_string(), value.to_text());
			}
			McHeader::InlineCss => payload.inline_css = Some(value.to_text()),
			McHeader::Tags => payload.tags = headers::split_list(value),
			McHeader::Autotext => {
				if let Some(flag) = headers::parse_autotext(value) {
					payload.auto_text = Some(flag);
				}
			}
			McHeader::GoogleAnalytics => {
				payload.google_analytics_domains = Some(
					value
						.to_text()
						.split(',')
						.map(str::to_string)
						.collect(),
				);
			}
			McHeader::GoogleAnalyticsCampaign => {
				payload.google_analytics_campaign = Some(value.to_text());
			}
			McHeader::TrackingDomain => payload.tracking_domain = Some(value.to_text()),
		}
	}
}
