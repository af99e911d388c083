//! Payload translation integration tests
//!
//! These assert the JSON document sent to `messages/send.json`, not just the
//! Rust structs, so key names and omitted fields are checked as well.

use reinhardt_mandrill::{ChildPart, Header, HeaderKind, MimeMessage, Translator, translate};
use rstest::rstest;
use serde_json::{Value, json};

fn to_json(message: &MimeMessage) -> Value {
	serde_json::to_value(translate(message).unwrap()).unwrap()
}

#[rstest]
fn test_minimal_message_document() {
	// Arrange
	let message = MimeMessage::builder()
		.from("a@example.com")
		.to("b@example.com")
		.subject("Hi")
		.plain("Hello")
		.build()
		.unwrap();

	// Act
	let document = to_json(&message);

	// Assert
	assert_eq!(
		document,
		json!({
			"text": "Hello",
			"subject": "Hi",
			"from_email": "a@example.com",
			"to": [{"email": "b@example.com", "type": "to"}],
			"headers": {},
			"tags": [],
		})
	);
}

#[rstest]
fn test_recipients_keep_kind_and_order() {
	// Arrange
	let message = MimeMessage::builder()
		.from("sender@example.com")
		.to_named("a@example.com", "A")
		.cc_named("b@example.com", "B")
		.bcc("c@example.com")
		.plain("x")
		.build()
		.unwrap();

	// Act
	let document = to_json(&message);

	// Assert
	assert_eq!(
		document["to"],
		json!([
			{"email": "a@example.com", "name": "A", "type": "to"},
			{"email": "b@example.com", "name": "B", "type": "cc"},
			{"email": "c@example.com", "type": "bcc"},
		])
	);
}

#[rstest]
#[case(Header::text("X-MC-Tags", "a,b,c"))]
#[case(Header::text("X-MC-Tags", vec!["a".to_string(), "b".to_string(), "c".to_string()]))]
fn test_tags_from_text_or_list(#[case] header: Header) {
	let message = MimeMessage::builder()
		.from("sender@example.com")
		.to("user@example.com")
		.plain("x")
		.raw_header(header)
		.build()
		.unwrap();

	let document = to_json(&message);

	assert_eq!(document["tags"], json!(["a", "b", "c"]));
}

#[rstest]
fn test_inline_image_only() {
	// Arrange
	let message = MimeMessage::builder()
		.from("sender@example.com")
		.to("user@example.com")
		.html("<img src=\"cid:logo\">")
		.child(ChildPart::image("logo", "image/png", b"png".to_vec()))
		.build()
		.unwrap();

	// Act
	let document = to_json(&message);

	// Assert
	assert_eq!(message.content_type(), "multipart/related");
	assert_eq!(document["html"], json!("<img src=\"cid:logo\">"));
	assert_eq!(
		document["images"],
		json!([{"type": "image/png", "name": "logo", "content": "cG5n"}])
	);
	assert!(document.get("attachments").is_none());
}

#[rstest]
fn test_alternative_parts_fill_both_bodies() {
	// Arrange
	let message = MimeMessage::builder()
		.from("sender@example.com")
		.to("user@example.com")
		.plain("plain body")
		.child(ChildPart::html("<p>html body</p>"))
		.build()
		.unwrap();

	// Act
	let payload = translate(&message).unwrap();

	// Assert
	assert_eq!(message.content_type(), "multipart/alternative");
	assert_eq!(payload.text.as_deref(), Some("plain body"));
	assert_eq!(payload.html.as_deref(), Some("<p>html body</p>"));
	assert!(payload.attachments.is_empty());
}

#[rstest]
fn test_attachment_is_base64_encoded() {
	let message = MimeMessage::builder()
		.from("sender@example.com")
		.to("user@example.com")
		.html("<p>see attached</p>")
		.child(ChildPart::attachment_with_type(
			"notes.txt",
			"text/plain",
			b"hello".to_vec(),
		))
		.build()
		.unwrap();

	let document = to_json(&message);

	assert_eq!(message.content_type(), "multipart/mixed");
	assert_eq!(
		document["attachments"],
		json!([{"type": "text/plain", "name": "notes.txt", "content": "aGVsbG8="}])
	);
	assert!(document.get("images").is_none());
}

#[rstest]
fn test_tracking_and_passthrough_headers() {
	// Arrange
	let message = MimeMessage::builder()
		.from("sender@example.com")
		.to("user@example.com")
		.html("<p>x</p>")
		.reply_to_named("support@example.com", "Support")
		.header("X-MC-InlineCSS", "true")
		.header("X-MC-Autotext", "yes")
		.header("X-MC-GoogleAnalytics", "example.com,example.org")
		.header("X-MC-GoogleAnalyticsCampaign", "spring")
		.header("X-MC-TrackingDomain", "track.example.com")
		.header("X-MC-GlobalMergeVars", json!([{"name": "FNAME", "content": "Ada"}]))
		.header("List-Unsubscribe", "<mailto:unsubscribe@example.com>")
		.header("X-Campaign-Id", "42")
		.header("Precedence", "bulk")
		.raw_header(Header::new(
			"X-Mailer-Date",
			HeaderKind::Date,
			"Mon, 01 Jan 2024 00:00:00 +0000",
		))
		.build()
		.unwrap();

	// Act
	let document = to_json(&message);

	// Assert
	assert_eq!(document["inline_css"], json!("true"));
	assert_eq!(document["auto_text"], json!(true));
	assert_eq!(
		document["google_analytics_domains"],
		json!(["example.com", "example.org"])
	);
	assert_eq!(document["google_analytics_campaign"], json!("spring"));
	assert_eq!(document["tracking_domain"], json!("track.example.com"));
	assert_eq!(
		document["global_merge_vars"],
		json!([{"name": "FNAME", "content": "Ada"}])
	);
	assert!(document.get("merge_vars").is_none());
	assert_eq!(
		document["headers"],
		json!({
			"Reply-To": "Support <support@example.com>",
			"List-Unsubscribe": "<mailto:unsubscribe@example.com>",
			"X-Campaign-Id": "42",
		})
	);
}

#[rstest]
fn test_subaccount_only_when_configured() {
	let message = MimeMessage::builder()
		.from("sender@example.com")
		.to("user@example.com")
		.plain("x")
		.build()
		.unwrap();

	let with = Translator::new().with_subaccount("ops").translate(&message).unwrap();
	let empty = Translator::new().with_subaccount("").translate(&message).unwrap();
	let without = serde_json::to_value(translate(&message).unwrap()).unwrap();

	assert_eq!(with.subaccount.as_deref(), Some("ops"));
	assert_eq!(empty.subaccount, None);
	assert!(without.get("subaccount").is_none());
}

#[rstest]
fn test_translation_is_repeatable() {
	// Arrange
	let message = MimeMessage::builder()
		.from_named("sender@example.com", "Sender")
		.to("user@example.com")
		.subject("Again")
		.html("<p>x</p>")
		.child(ChildPart::attachment("data.csv", b"a,b".to_vec()))
		.header("X-MC-Tags", "one,two")
		.build()
		.unwrap();
	let translator = Translator::new().with_subaccount("team");

	// Act
	let first = translator.translate(&message).unwrap();
	let second = translator.translate(&message).unwrap();

	// Assert
	assert_eq!(first, second);
}
