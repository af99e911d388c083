//! Recognized custom headers
//!
//! Mandrill reads several message options from `X-MC-*` headers when mail is
//! relayed over SMTP. The API has dedicated payload fields for them instead, so
//! the translator lifts these headers out of the generic header map.

use crate::message::HeaderValue;

/// Header names with special meaning for the Mandrill payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum McHeader {
	GlobalMergeVars,
	MergeVars,
	ListUnsubscribe,
	InlineCss,
	Tags,
	Autotext,
	GoogleAnalytics,
	GoogleAnalyticsCampaign,
	TrackingDomain,
}

impl McHeader {
	pub const ALL: [McHeader; 9] = [
		McHeader::GlobalMergeVars,
		McHeader::MergeVars,
		McHeader::ListUnsubscribe,
		McHeader::InlineCss,
		McHeader::Tags,
		McHeader::Autotext,
		McHeader::GoogleAnalytics,
		McHeader::GoogleAnalyticsCampaign,
		McHeader::TrackingDomain,
	];

	/// Match a header name exactly (case-sensitive).
	///
	/// # Examples
	///
	/// ```
	/// use reinhardt_mandrill::headers::McHeader;
	///
	/// assert_eq!(McHeader::from_name("X-MC-Tags"), Some(McHeader::Tags));
	/// assert_eq!(McHeader::from_name("x-mc-tags"), None);
	/// ```
	pub fn from_name(name: &str) -> Option<Self> {
		Self::ALL.into_iter().find(|header| header.name() == name)
	}

	pub fn name(self) -> &'static str {
		match self {
			McHeader::GlobalMergeVars => "X-MC-GlobalMergeVars",
			McHeader::MergeVars => "X-MC-MergeVars",
			McHeader::ListUnsubscribe => "List-Unsubscribe",
			McHeader::InlineCss => "X-MC-InlineCSS",
			McHeader::Tags => "X-MC-Tags",
			McHeader::Autotext => "X-MC-Autotext",
			McHeader::GoogleAnalytics => "X-MC-GoogleAnalytics",
			McHeader::GoogleAnalyticsCampaign => "X-MC-GoogleAnalyticsCampaign",
			McHeader::TrackingDomain => "X-MC-TrackingDomain",
		}
	}
}

/// Whether an unrecognized header is forwarded to the payload's `headers` map.
pub fn is_passthrough(name: &str) -> bool {
	name.starts_with("X-")
}

/// Split a comma separated value. Lists are returned as they are.
///
/// Items are not trimmed: `"a, b"` yields `["a", " b"]`.
pub fn split_list(value: &HeaderValue) -> Vec<String> {
	match value {
		HeaderValue::List(items) => items.clone(),
		HeaderValue::Json(serde_json::Value::Array(items)) => items
			.iter()
			.map(|item| match item {
				serde_json::Value::String(text) => text.clone(),
				other => other.to_string(),
			})
			.collect(),
		other => other.to_text().split(',').map(str::to_string).collect(),
	}
}

/// Interpret an `X-MC-Autotext` value.
///
/// Returns `None` for values that are neither truthy nor falsy, leaving the
/// payload field unset.
pub fn parse_autotext(value: &HeaderValue) -> Option<bool> {
	match value {
		HeaderValue::Bool(flag) | HeaderValue::Json(serde_json::Value::Bool(flag)) => Some(*flag),
		HeaderValue::Text(text) | HeaderValue::Json(serde_json::Value::String(text)) => {
			match text.as_str() {
				"true" | "on" | "yes" | "y" => Some(true),
				"false" | "off" | "no" | "n" => Some(false),
				_ => None,
			}
		}
		HeaderValue::List(_) | HeaderValue::Json(_) => None,
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use rstest::rstest;

	#[rstest]
	fn test_every_name_round_trips() {
		for header in McHeader::ALL {
			assert_eq!(McHeader::from_name(header.name()), Some(header));
		}
	}

	#[rstest]
	#[case("X-Custom", true)]
	#[case("X-MC-Unknown", true)]
	#[case("x-lowercase", false)]
	#[case("Precedence", false)]
	fn test_passthrough(#[case] name: &str, #[case] expected: bool) {
		assert_eq!(is_passthrough(name), expected);
	}

	#[rstest]
	fn test_split_list_keeps_lists_unchanged() {
		let value = HeaderValue::List(vec!["a,b".to_string(), "c".to_string()]);

		assert_eq!(split_list(&value), vec!["a,b", "c"]);
	}

	#[rstest]
	fn test_split_list_splits_text_without_trimming() {
		let value = HeaderValue::from("a, b,c");

		assert_eq!(split_list(&value), vec!["a", " b", "c"]);
	}

	#[rstest]
	#[case(HeaderValue::from("true"), Some(true))]
	#[case(HeaderValue::from("on"), Some(true))]
	#[case(HeaderValue::from("yes"), Some(true))]
	#[case(HeaderValue::from("y"), Some(true))]
	#[case(HeaderValue::Bool(true), Some(true))]
	#[case(HeaderValue::from("false"), Some(false))]
	#[case(HeaderValue::from("off"), Some(false))]
	#[case(HeaderValue::from("no"), Some(false))]
	#[case(HeaderValue::from("n"), Some(false))]
	#[case(HeaderValue::Bool(false), Some(false))]
	#[case(HeaderValue::from("TRUE"), None)]
	#[case(HeaderValue::from("1"), None)]
	#[case(HeaderValue::from(""), None)]
	fn test_parse_autotext(#[case] value: HeaderValue, #[case] expected: Option<bool>) {
		assert_eq!(parse_autotext(&value), expected);
	}
}
