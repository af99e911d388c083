//! Library-agnostic MIME message model
//!
//! [`MimeMessage`] is what callers hand to the transport. It knows nothing about
//! Mandrill; the [`translator`](crate::translator) module decides how each part
//! maps onto the API payload.

use indexmap::IndexMap;

/// MIME type of plain text bodies.
pub const TEXT_PLAIN: &str = "text/plain";
/// MIME type of HTML bodies.
pub const TEXT_HTML: &str = "text/html";

const MULTIPART_MIXED: &str = "multipart/mixed";
const MULTIPART_RELATED: &str = "multipart/related";
const MULTIPART_ALTERNATIVE: &str = "multipart/alternative";

/// Ordered mapping of email address to optional display name.
///
/// Re-inserting an address replaces its display name but keeps its position.
pub type AddressMap = IndexMap<String, Option<String>>;

/// Structural kind of a header, mirroring the classic MIME header families.
///
/// Only [`HeaderKind::Text`] headers are considered for custom header mapping.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HeaderKind {
	/// Unstructured text header
	Text,
	/// Header with `; key=value` parameters (e.g. Content-Type)
	Parameterized,
	/// Header holding mailbox lists (e.g. From, To)
	Mailbox,
	/// Date header
	Date,
	/// Message-ID style header
	Id,
	/// Return-Path style header
	Path,
}

/// Value carried by a custom header.
///
/// Most headers are plain text. Structured variants let callers pass merge
/// variables as JSON, tags as a pre-split list, or a boolean flag.
#[derive(Debug, Clone, PartialEq)]
pub enum HeaderValue {
	Text(String),
	List(Vec<String>),
	Bool(bool),
	Json(serde_json::Value),
}

impl HeaderValue {
	/// Render the value as header text.
	///
	/// # Examples
	///
	/// ```
	/// use reinhardt_mandrill::HeaderValue;
	///
	/// let value = HeaderValue::List(vec!["a".to_string(), "b".to_string()]);
	/// assert_eq!(value.to_text(), "a,b");
	/// assert_eq!(HeaderValue::Bool(true).to_text(), "true");
	/// ```
	pub fn to_text(&self) -> String {
		match self {
			HeaderValue::Text(text) => text.clone(),
			HeaderValue::List(items) => items.join(","),
			HeaderValue::Bool(flag) => flag.to_string(),
			HeaderValue::Json(serde_json::Value::String(text)) => text.clone(),
			HeaderValue::Json(value) => value.to_string(),
		}
	}

	/// Convert the value into JSON without reinterpreting it.
	pub fn to_json(&self) -> serde_json::Value {
		match self {
			HeaderValue::Text(text) => serde_json::Value::String(text.clone()),
			HeaderValue::List(items) => serde_json::Value::from(items.clone()),
			HeaderValue::Bool(flag) => serde_json::Value::Bool(*flag),
			HeaderValue::Json(value) => value.clone(),
		}
	}
}

impl From<&str> for HeaderValue {
	fn from(value: &str) -> Self {
		HeaderValue::Text(value.to_string())
	}
}

impl From<String> for HeaderValue {
	fn from(value: String) -> Self {
		HeaderValue::Text(value)
	}
}

impl From<Vec<String>> for HeaderValue {
	fn from(value: Vec<String>) -> Self {
		HeaderValue::List(value)
	}
}

impl From<bool> for HeaderValue {
	fn from(value: bool) -> Self {
		HeaderValue::Bool(value)
	}
}

impl From<serde_json::Value> for HeaderValue {
	fn from(value: serde_json::Value) -> Self {
		HeaderValue::Json(value)
	}
}

/// A custom message header.
#[derive(Debug, Clone, PartialEq)]
pub struct Header {
	name: String,
	kind: HeaderKind,
	value: HeaderValue,
}

impl Header {
	/// Create an unstructured text header.
	///
	/// # Examples
	///
	/// ```
	/// use reinhardt_mandrill::{Header, HeaderKind};
	///
	/// let header = Header::text("X-MC-Tags", "welcome,onboarding");
	/// assert_eq!(header.name(), "X-MC-Tags");
	/// assert_eq!(header.kind(), HeaderKind::Text);
	/// ```
	pub fn text(name: impl Into<String>, value: impl Into<HeaderValue>) -> Self {
		Self::new(name, HeaderKind::Text, value)
	}

	/// Create a header of an explicit kind.
	pub fn new(name: impl Into<String>, kind: HeaderKind, value: impl Into<HeaderValue>) -> Self {
		Self {
			name: name.into(),
			kind,
			value: value.into(),
		}
	}

	pub fn name(&self) -> &str {
		&self.name
	}

	pub fn kind(&self) -> HeaderKind {
		self.kind
	}

	pub fn value(&self) -> &HeaderValue {
		&self.value
	}

	pub fn is_text(&self) -> bool {
		self.kind == HeaderKind::Text
	}
}

/// A child part of a multipart message.
///
/// Images and attachments are distinct variants, so an inline image can never
/// be mistaken for a regular attachment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChildPart {
	/// Inline image referenced from HTML through its content id
	Image {
		content_type: String,
		content_id: String,
		content: Vec<u8>,
	},
	/// File attachment
	Attachment {
		content_type: String,
		filename: String,
		content: Vec<u8>,
	},
	/// Textual alternative body
	Text { content_type: String, body: String },
}

impl ChildPart {
	/// Create an inline image part.
	///
	/// # Examples
	///
	/// ```
	/// use reinhardt_mandrill::ChildPart;
	///
	/// let logo = ChildPart::image("logo-cid", "image/png", b"\x89PNG".to_vec());
	/// assert_eq!(logo.content_type(), "image/png");
	/// ```
	pub fn image(
		content_id: impl Into<String>,
		content_type: impl Into<String>,
		content: Vec<u8>,
	) -> Self {
		ChildPart::Image {
			content_type: content_type.into(),
			content_id: content_id.into(),
			content,
		}
	}

	/// Create an attachment, detecting the MIME type from the filename.
	///
	/// # Examples
	///
	/// ```
	/// use reinhardt_mandrill::ChildPart;
	///
	/// let report = ChildPart::attachment("report.pdf", b"%PDF".to_vec());
	/// assert_eq!(report.content_type(), "application/pdf");
	/// ```
	pub fn attachment(filename: impl Into<String>, content: Vec<u8>) -> Self {
		let filename = filename.into();
		let content_type = detect_mime_type(&filename);
		ChildPart::Attachment {
			content_type,
			filename,
			content,
		}
	}

	/// Create an attachment with an explicit MIME type.
	pub fn attachment_with_type(
		filename: impl Into<String>,
		content_type: impl Into<String>,
		content: Vec<u8>,
	) -> Self {
		ChildPart::Attachment {
			content_type: content_type.into(),
			filename: filename.into(),
			content,
		}
	}

	/// Create a textual part of any content type.
	pub fn text(content_type: impl Into<String>, body: impl Into<String>) -> Self {
		ChildPart::Text {
			content_type: content_type.into(),
			body: body.into(),
		}
	}

	/// Create a `text/html` part.
	pub fn html(body: impl Into<String>) -> Self {
		Self::text(TEXT_HTML, body)
	}

	/// Create a `text/plain` part.
	pub fn plain(body: impl Into<String>) -> Self {
		Self::text(TEXT_PLAIN, body)
	}

	pub fn content_type(&self) -> &str {
		match self {
			ChildPart::Image { content_type, .. }
			| ChildPart::Attachment { content_type, .. }
			| ChildPart::Text { content_type, .. } => content_type,
		}
	}
}

fn detect_mime_type(filename: &str) -> String {
	mime_guess::from_path(filename)
		.first()
		.map(|mime| mime.to_string())
		.unwrap_or_else(|| "application/octet-stream".to_string())
}

/// An email message ready to be handed to a transport.
///
/// Fields are private so the builder's validation cannot be bypassed.
#[derive(Debug, Clone, PartialEq)]
pub struct MimeMessage {
	subject: String,
	body: String,
	declared_content_type: Option<String>,
	content_type_override: Option<String>,
	from: AddressMap,
	to: AddressMap,
	cc: AddressMap,
	bcc: AddressMap,
	reply_to: AddressMap,
	children: Vec<ChildPart>,
	headers: Vec<Header>,
}

impl MimeMessage {
	/// Create a new builder for constructing a `MimeMessage`.
	pub fn builder() -> MimeMessageBuilder {
		MimeMessageBuilder::default()
	}

	/// Content type the message currently exposes.
	///
	/// Once child parts are attached this is the enclosing multipart type, not
	/// the type the body was declared with. See
	/// [`declared_content_type`](Self::declared_content_type).
	///
	/// # Examples
	///
	/// ```
	/// use reinhardt_mandrill::{ChildPart, MimeMessage};
	///
	/// let message = MimeMessage::builder()
	///     .from("sender@example.com")
	///     .html("<p>Hi</p>")
	///     .child(ChildPart::attachment("a.txt", b"a".to_vec()))
	///     .build()
	///     .unwrap();
	///
	/// assert_eq!(message.content_type(), "multipart/mixed");
	/// assert_eq!(message.declared_content_type(), Some("text/html"));
	/// ```
	pub fn content_type(&self) -> &str {
		if let Some(content_type) = self.content_type_override.as_deref() {
			return content_type;
		}

		if self.children.is_empty() {
			return self.declared_content_type.as_deref().unwrap_or(TEXT_PLAIN);
		}

		let children = self.children.iter();
		if children
			.clone()
			.any(|c| matches!(c, ChildPart::Attachment { .. }))
		{
			MULTIPART_MIXED
		} else if children
			.clone()
			.any(|c| matches!(c, ChildPart::Image { .. }))
		{
			MULTIPART_RELATED
		} else {
			MULTIPART_ALTERNATIVE
		}
	}

	/// The single-part content type originally requested for the body.
	///
	/// Defaults to `text/plain` when nothing was declared. `None` only when the
	/// exposed type was overridden without declaring a body type.
	pub fn declared_content_type(&self) -> Option<&str> {
		self.declared_content_type.as_deref()
	}

	pub fn subject(&self) -> &str {
		&self.subject
	}

	pub fn body(&self) -> &str {
		&self.body
	}

	pub fn from(&self) -> &AddressMap {
		&self.from
	}

	/// The authoritative sender: the first from address.
	pub fn sender(&self) -> Option<(&str, Option<&str>)> {
		self.from
			.first()
			.map(|(email, name)| (email.as_str(), name.as_deref()))
	}

	pub fn to(&self) -> &AddressMap {
		&self.to
	}

	pub fn cc(&self) -> &AddressMap {
		&self.cc
	}

	pub fn bcc(&self) -> &AddressMap {
		&self.bcc
	}

	pub fn reply_to(&self) -> &AddressMap {
		&self.reply_to
	}

	pub fn children(&self) -> &[ChildPart] {
		&self.children
	}

	pub fn headers(&self) -> &[Header] {
		&self.headers
	}
}

#[derive(Default)]
pub struct MimeMessageBuilder {
	subject: String,
	body: String,
	declared_content_type: Option<String>,
	content_type_override: Option<String>,
	from: AddressMap,
	to: AddressMap,
	cc: AddressMap,
	bcc: AddressMap,
	reply_to: AddressMap,
	children: Vec<ChildPart>,
	headers: Vec<Header>,
}

impl MimeMessageBuilder {
	pub fn subject(mut self, subject: impl Into<String>) -> Self {
		self.subject = subject.into();
		self
	}

	pub fn body(mut self, body: impl Into<String>) -> Self {
		self.body = body.into();
		self
	}

	/// Set the body and declare it as `text/html`.
	pub fn html(self, body: impl Into<String>) -> Self {
		self.body(body).content_type(TEXT_HTML)
	}

	/// Set the body and declare it as `text/plain`.
	pub fn plain(self, body: impl Into<String>) -> Self {
		self.body(body).content_type(TEXT_PLAIN)
	}

	/// Declare the content type of the main body.
	pub fn content_type(mut self, content_type: impl Into<String>) -> Self {
		self.declared_content_type = Some(content_type.into());
		self
	}

	/// Force the exposed content type, regardless of attached parts.
	pub fn override_content_type(mut self, content_type: impl Into<String>) -> Self {
		self.content_type_override = Some(content_type.into());
		self
	}

	pub fn from(mut self, email: impl Into<String>) -> Self {
		self.from.insert(email.into(), None);
		self
	}

	pub fn from_named(mut self, email: impl Into<String>, name: impl Into<String>) -> Self {
		self.from.insert(email.into(), Some(name.into()));
		self
	}

	pub fn to(mut self, email: impl Into<String>) -> Self {
		self.to.insert(email.into(), None);
		self
	}

	pub fn to_named(mut self, email: impl Into<String>, name: impl Into<String>) -> Self {
		self.to.insert(email.into(), Some(name.into()));
		self
	}

	pub fn cc(mut self, email: impl Into<String>) -> Self {
		self.cc.insert(email.into(), None);
		self
	}

	pub fn cc_named(mut self, email: impl Into<String>, name: impl Into<String>) -> Self {
		self.cc.insert(email.into(), Some(name.into()));
		self
	}

	pub fn bcc(mut self, email: impl Into<String>) -> Self {
		self.bcc.insert(email.into(), None);
		self
	}

	pub fn bcc_named(mut self, email: impl Into<String>, name: impl Into<String>) -> Self {
		self.bcc.insert(email.into(), Some(name.into()));
		self
	}

	pub fn reply_to(mut self, email: impl Into<String>) -> Self {
		self.reply_to.insert(email.into(), None);
		self
	}

	pub fn reply_to_named(mut self, email: impl Into<String>, name: impl Into<String>) -> Self {
		self.reply_to.insert(email.into(), Some(name.into()));
		self
	}

	pub fn child(mut self, part: ChildPart) -> Self {
		self.children.push(part);
		self
	}

	/// Add a plain-text custom header.
	pub fn header(mut self, name: impl Into<String>, value: impl Into<HeaderValue>) -> Self {
		self.headers.push(Header::text(name, value));
		self
	}

	/// Add a header of any kind.
	pub fn raw_header(mut self, header: Header) -> Self {
		self.headers.push(header);
		self
	}

	/// Build the message.
	///
	/// Requires at least one from address, rejects header names that are not
	/// RFC 5322 field names, and rejects CR/LF in text values.
	pub fn build(self) -> crate::MandrillResult<MimeMessage> {
		if self.from.is_empty() {
			return Err(crate::MandrillError::MissingField("from".to_string()));
		}

		check_header_injection(&self.subject)?;

		for header in &self.headers {
			validate_header_name(header.name())?;
			match header.value() {
				HeaderValue::Text(text) => check_header_injection(text)?,
				HeaderValue::List(items) => {
					for item in items {
						check_header_injection(item)?;
					}
				}
				HeaderValue::Bool(_) | HeaderValue::Json(_) => {}
			}
		}

		// An undeclared body is plain text unless the exposed type was forced
		let declared_content_type = match (self.declared_content_type, &self.content_type_override) {
			(Some(declared), _) => Some(declared),
			(None, None) => Some(TEXT_PLAIN.to_string()),
			(None, Some(_)) => None,
		};

		Ok(MimeMessage {
			subject: self.subject,
			body: self.body,
			declared_content_type,
			content_type_override: self.content_type_override,
			from: self.from,
			to: self.to,
			cc: self.cc,
			bcc: self.bcc,
			reply_to: self.reply_to,
			children: self.children,
			headers: self.headers,
		})
	}
}

fn validate_header_name(name: &str) -> crate::MandrillResult<()> {
	// RFC 5322 field-name: printable US-ASCII except colon
	let valid = !name.is_empty() && name.bytes().all(|b| (33..=126).contains(&b) && b != b':');
	if valid {
		Ok(())
	} else {
		Err(crate::MandrillError::InvalidHeader(format!(
			"invalid header name: {:?}",
			name
		)))
	}
}

fn check_header_injection(value: &str) -> crate::MandrillResult<()> {
	if value.contains(['\r', '\n']) {
		return Err(crate::MandrillError::InvalidHeader(format!(
			"line break in header value: {:?}",
			value
		)));
	}
	Ok(())
}
