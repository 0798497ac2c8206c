// SPDX-License-Identifier: GPL-3.0-only
// Copyright (C) 2025 Brian Hetro <whee@smaertness.net>

//! JSON parsing for ChatGPT conversation exports.
//!
//! This module handles deserialization of the JSON format produced when a
//! ChatGPT conversation is exported. The format is a single top-level
//! mapping from opaque message ids to entries, each wrapping one message.
//!
//! # Format Overview
//!
//! A conversation export looks like:
//!
//! ```json
//! {
//!     "<message-id>": {
//!         "message": {
//!             "author": { "role": "user" },
//!             "content": { "parts": ["Hello"] },
//!             "create_time": 1733356800.0
//!         }
//!     }
//! }
//! ```
//!
//! The order in which keys appear in the source mapping is significant: it
//! determines the order messages are rendered in every backend. Entries that
//! do not match the expected shape are collected on
//! [`Conversation::skipped`] with a reason instead of failing the parse, so
//! a single bad record never discards the rest of the conversation.
//!
//! # Example
//!
//! ```
//! use chat2doc::parser::parse_conversation;
//!
//! let json = r#"{
//!     "msg-1": {
//!         "message": {
//!             "author": { "role": "user" },
//!             "content": { "parts": ["Hello"] },
//!             "create_time": 1733356800.0
//!         }
//!     }
//! }"#;
//!
//! let conversation = parse_conversation(json).unwrap();
//! assert_eq!(conversation.entries.len(), 1);
//! assert!(conversation.entries[0].message.is_user());
//! ```

use serde::Deserialize;
use serde_json::Value;
use snafu::prelude::*;

/// Error type for JSON parsing failures.
#[derive(Debug, Snafu)]
pub enum ParseError {
    /// Failed to parse JSON content.
    #[snafu(display("failed to parse JSON: {source}"))]
    Json {
        /// The underlying JSON parsing error.
        source: serde_json::Error,
    },
}

/// Reason a conversation entry was rejected during validation.
///
/// Each variant names the first problem found with the entry; validation
/// stops there and the entry is skipped.
#[derive(Debug, Snafu)]
pub enum EntryError {
    /// The entry does not match the export shape at all.
    #[snafu(display("entry does not match the export shape: {source}"))]
    Shape {
        /// The underlying deserialization error.
        source: serde_json::Error,
    },

    /// The entry carries no `message` object.
    #[snafu(display("missing message object"))]
    MissingMessage,

    /// The message carries no `content.parts` array.
    #[snafu(display("missing content.parts array"))]
    MissingParts,

    /// A content part is not a string.
    #[snafu(display("content part {index} is not a string"))]
    NonStringPart {
        /// Position of the offending part.
        index: usize,
    },
}

/// A parsed conversation export.
///
/// Entries appear in the order their keys appear in the source mapping;
/// that order is preserved end to end and determines output order.
#[derive(Debug, Default)]
pub struct Conversation {
    /// The well-formed entries, in source order.
    pub entries: Vec<Entry>,

    /// Entries rejected during validation, with the reason for each.
    pub skipped: Vec<SkippedEntry>,
}

/// One record of the conversation: the source key and its message.
#[derive(Debug, Clone, PartialEq)]
pub struct Entry {
    /// The message id the entry was keyed by in the export.
    pub id: String,

    /// The validated message.
    pub message: Message,
}

/// A rejected conversation entry and why it was skipped.
#[derive(Debug)]
pub struct SkippedEntry {
    /// The message id the entry was keyed by in the export.
    pub id: String,

    /// What made the entry malformed.
    pub reason: EntryError,
}

/// A single chat message.
#[derive(Debug, Clone, PartialEq)]
pub struct Message {
    /// The author role as recorded in the export (`"user"`, `"assistant"`).
    ///
    /// Older exports omit the author; an absent role renders with the
    /// non-user styling.
    pub role: Option<String>,

    /// The ordered content parts of the message. May be empty.
    pub parts: Vec<String>,

    /// Unix timestamp in seconds when the message was created, if recorded.
    pub create_time: Option<f64>,
}

impl Message {
    /// Joins the content parts with a newline between each, no trailing
    /// separator.
    #[must_use]
    pub fn joined_content(&self) -> String {
        self.parts.join("\n")
    }

    /// Returns `true` if the message was authored by the user.
    #[must_use]
    pub fn is_user(&self) -> bool {
        self.role.as_deref() == Some("user")
    }

    /// Returns `true` if any content part carries a fenced-code marker.
    ///
    /// The newline join separator can never complete a fence across two
    /// parts, so this is equivalent to checking the joined content.
    #[must_use]
    pub fn contains_code(&self) -> bool {
        self.parts.iter().any(|part| part.contains("```"))
    }
}

/// The raw entry shape as it appears in the export, prior to validation.
#[derive(Debug, Deserialize)]
struct RawEntry {
    message: Option<RawMessage>,
}

#[derive(Debug, Deserialize)]
struct RawMessage {
    author: Option<RawAuthor>,
    content: Option<RawContent>,
    create_time: Option<f64>,
}

#[derive(Debug, Deserialize)]
struct RawAuthor {
    role: Option<String>,
}

#[derive(Debug, Deserialize)]
struct RawContent {
    parts: Option<Vec<Value>>,
}

/// Validates one entry value into a [`Message`].
fn validate_entry(value: Value) -> Result<Message, EntryError> {
    let raw: RawEntry = serde_json::from_value(value).context(ShapeSnafu)?;
    let message = raw.message.context(MissingMessageSnafu)?;

    let part_values = message
        .content
        .and_then(|content| content.parts)
        .context(MissingPartsSnafu)?;

    let mut parts = Vec::with_capacity(part_values.len());
    for (index, part) in part_values.into_iter().enumerate() {
        match part {
            Value::String(text) => parts.push(text),
            _ => return NonStringPartSnafu { index }.fail(),
        }
    }

    Ok(Message {
        role: message.author.and_then(|author| author.role),
        parts,
        create_time: message.create_time,
    })
}

impl<'de> Deserialize<'de> for Conversation {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        struct ConversationVisitor;

        impl<'de> serde::de::Visitor<'de> for ConversationVisitor {
            type Value = Conversation;

            fn expecting(&self, formatter: &mut std::fmt::Formatter) -> std::fmt::Result {
                formatter.write_str("a map of message ids to message entries")
            }

            fn visit_map<A>(self, mut access: A) -> Result<Self::Value, A::Error>
            where
                A: serde::de::MapAccess<'de>,
            {
                let mut entries = Vec::new();
                let mut skipped = Vec::new();

                // Keys are visited in source order; collecting into
                // serde_json's map type would re-sort them.
                while let Some((id, value)) = access.next_entry::<String, Value>()? {
                    match validate_entry(value) {
                        Ok(message) => entries.push(Entry { id, message }),
                        Err(reason) => skipped.push(SkippedEntry { id, reason }),
                    }
                }

                Ok(Conversation { entries, skipped })
            }
        }

        deserializer.deserialize_map(ConversationVisitor)
    }
}

/// Parses a JSON string into a [`Conversation`].
///
/// This is the main entry point for parsing conversation exports. Entries
/// that fail validation end up on [`Conversation::skipped`] rather than
/// aborting the parse.
///
/// # Errors
///
/// Returns an error if the input is not valid JSON or its top-level value
/// is not a mapping of message ids to entries.
///
/// # Example
///
/// ```
/// use chat2doc::parser::parse_conversation;
///
/// let conversation = parse_conversation("{}").unwrap();
/// assert!(conversation.entries.is_empty());
/// ```
pub fn parse_conversation(json_str: &str) -> Result<Conversation, ParseError> {
    serde_json::from_str(json_str).context(JsonSnafu)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn single_entry_json(id: &str, message_json: &str) -> String {
        format!(r#"{{ "{id}": {{ "message": {message_json} }} }}"#)
    }

    fn user_message_json(text: &str) -> String {
        format!(
            r#"{{
                "author": {{ "role": "user" }},
                "content": {{ "parts": ["{text}"] }},
                "create_time": 1733356800.0
            }}"#
        )
    }

    #[test]
    fn parses_minimal_conversation() {
        let json = single_entry_json("msg-1", &user_message_json("Hello"));
        let conversation = parse_conversation(&json).unwrap();

        assert_eq!(conversation.entries.len(), 1);
        assert!(conversation.skipped.is_empty());

        let entry = &conversation.entries[0];
        assert_eq!(entry.id, "msg-1");
        assert_eq!(entry.message.role.as_deref(), Some("user"));
        assert_eq!(entry.message.parts, vec!["Hello"]);
        assert_eq!(entry.message.create_time, Some(1733356800.0));
    }

    #[test]
    fn preserves_source_key_order() {
        // Keys deliberately out of lexical order: a sorted map would
        // reorder them.
        let json = format!(
            r#"{{
                "zz-first": {{ "message": {} }},
                "aa-second": {{ "message": {} }},
                "mm-third": {{ "message": {} }}
            }}"#,
            user_message_json("1"),
            user_message_json("2"),
            user_message_json("3"),
        );
        let conversation = parse_conversation(&json).unwrap();

        let ids: Vec<&str> = conversation
            .entries
            .iter()
            .map(|entry| entry.id.as_str())
            .collect();
        assert_eq!(ids, ["zz-first", "aa-second", "mm-third"]);
    }

    #[test]
    fn missing_author_defaults_to_non_user() {
        let json = single_entry_json("msg-1", r#"{ "content": { "parts": ["hi"] } }"#);
        let conversation = parse_conversation(&json).unwrap();

        let message = &conversation.entries[0].message;
        assert!(message.role.is_none());
        assert!(!message.is_user());
    }

    #[test]
    fn assistant_role_is_not_user() {
        let json = single_entry_json(
            "msg-1",
            r#"{ "author": { "role": "assistant" }, "content": { "parts": ["hi"] } }"#,
        );
        let conversation = parse_conversation(&json).unwrap();

        assert!(!conversation.entries[0].message.is_user());
    }

    #[test]
    fn missing_create_time_is_none() {
        let json = single_entry_json("msg-1", r#"{ "content": { "parts": ["hi"] } }"#);
        let conversation = parse_conversation(&json).unwrap();

        assert!(conversation.entries[0].message.create_time.is_none());
    }

    #[test]
    fn integer_create_time_parses() {
        let json = single_entry_json(
            "msg-1",
            r#"{ "content": { "parts": ["hi"] }, "create_time": 1733356800 }"#,
        );
        let conversation = parse_conversation(&json).unwrap();

        assert_eq!(
            conversation.entries[0].message.create_time,
            Some(1733356800.0)
        );
    }

    #[test]
    fn skips_entry_without_message() {
        let json = format!(
            r#"{{
                "bad": {{}},
                "good": {{ "message": {} }}
            }}"#,
            user_message_json("hi"),
        );
        let conversation = parse_conversation(&json).unwrap();

        assert_eq!(conversation.entries.len(), 1);
        assert_eq!(conversation.entries[0].id, "good");
        assert_eq!(conversation.skipped.len(), 1);
        assert_eq!(conversation.skipped[0].id, "bad");
        assert!(matches!(
            conversation.skipped[0].reason,
            EntryError::MissingMessage
        ));
    }

    #[test]
    fn skips_entry_with_null_parts() {
        let json = single_entry_json("msg-1", r#"{ "content": { "parts": null } }"#);
        let conversation = parse_conversation(&json).unwrap();

        assert!(conversation.entries.is_empty());
        assert!(matches!(
            conversation.skipped[0].reason,
            EntryError::MissingParts
        ));
    }

    #[test]
    fn skips_entry_without_content() {
        let json = single_entry_json("msg-1", r#"{ "author": { "role": "user" } }"#);
        let conversation = parse_conversation(&json).unwrap();

        assert!(conversation.entries.is_empty());
        assert!(matches!(
            conversation.skipped[0].reason,
            EntryError::MissingParts
        ));
    }

    #[test]
    fn skips_entry_with_non_string_part() {
        let json = single_entry_json("msg-1", r#"{ "content": { "parts": ["ok", 5] } }"#);
        let conversation = parse_conversation(&json).unwrap();

        assert!(conversation.entries.is_empty());
        assert!(matches!(
            conversation.skipped[0].reason,
            EntryError::NonStringPart { index: 1 }
        ));
    }

    #[test]
    fn skips_entry_with_foreign_shape() {
        let json = r#"{ "msg-1": { "message": 5 } }"#;
        let conversation = parse_conversation(json).unwrap();

        assert!(conversation.entries.is_empty());
        assert!(matches!(
            conversation.skipped[0].reason,
            EntryError::Shape { .. }
        ));
    }

    #[test]
    fn parses_empty_conversation() {
        let conversation = parse_conversation("{}").unwrap();

        assert!(conversation.entries.is_empty());
        assert!(conversation.skipped.is_empty());
    }

    #[test]
    fn returns_error_for_invalid_json() {
        let result = parse_conversation("not valid json");
        assert!(result.is_err());
    }

    #[test]
    fn returns_error_for_non_mapping_top_level() {
        let result = parse_conversation(r"[1, 2, 3]");
        assert!(result.is_err());
    }

    #[test]
    fn joins_parts_with_newlines() {
        let message = Message {
            role: None,
            parts: vec!["a".into(), "b".into(), "c".into()],
            create_time: None,
        };

        assert_eq!(message.joined_content(), "a\nb\nc");
    }

    #[test]
    fn joins_empty_parts_to_empty_string() {
        let message = Message {
            role: None,
            parts: vec![],
            create_time: None,
        };

        assert_eq!(message.joined_content(), "");
    }

    #[test]
    fn detects_fenced_code_marker() {
        let message = Message {
            role: None,
            parts: vec!["here:\n```js\nx=1\n```".into()],
            create_time: None,
        };

        assert!(message.contains_code());
    }

    #[test]
    fn fence_marker_cannot_span_parts() {
        // "``" + "`" joined with a newline never forms "```".
        let message = Message {
            role: None,
            parts: vec!["``".into(), "`".into()],
            create_time: None,
        };

        assert!(!message.contains_code());
    }
}
