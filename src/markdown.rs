// SPDX-License-Identifier: GPL-3.0-only
// Copyright (C) 2025 Brian Hetro <whee@smaertness.net>

//! Markdown rendering for parsed conversation exports.
//!
//! This module transforms a [`Conversation`] into a plain-text Markdown
//! document. Rendering is a pure function of the conversation value: the
//! same input always yields a byte-identical string.
//!
//! # Output Format
//!
//! Each message becomes one block:
//!
//! ```text
//! ## Question -
//!
//! <content>
//!
//! ```
//!
//! with `Question` for user messages and `Answer` for everything else.
//! Content parts are joined with newlines and emitted verbatim, so fenced
//! code blocks survive exactly as exported.
//!
//! # Example
//!
//! ```
//! use chat2doc::markdown::{RenderOptions, render_conversation};
//! use chat2doc::parser::{Conversation, Entry, Message};
//!
//! let conversation = Conversation {
//!     entries: vec![Entry {
//!         id: "msg-1".into(),
//!         message: Message {
//!             role: Some("user".into()),
//!             parts: vec!["Hello".into()],
//!             create_time: None,
//!         },
//!     }],
//!     skipped: vec![],
//! };
//!
//! let markdown = render_conversation(&conversation, &RenderOptions::default());
//! assert_eq!(markdown, "## Question - \n\nHello\n\n");
//! ```

use crate::parser::{Conversation, Entry};
use chrono::DateTime;
use std::fmt::Write;

/// Configuration options for Markdown rendering.
///
/// Controls which optional elements are included in the rendered output.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderOptions {
    /// Whether to append each message's creation time to its block header.
    ///
    /// Timestamps are formatted in UTC so rendering stays deterministic.
    /// Messages without a recorded creation time render without one either
    /// way.
    pub show_timestamps: bool,

    /// Number of heading levels to shift (0-5).
    ///
    /// A value of 0 produces H2 message headings (default). A value of 1
    /// produces H3 headings, useful for embedding the output in a larger
    /// document.
    pub heading_offset: u8,
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self {
            show_timestamps: false,
            heading_offset: 0,
        }
    }
}

/// Returns a markdown heading prefix with the given level and offset.
///
/// The heading level is clamped to a maximum of 6 (H6).
fn heading(level: u8, offset: u8) -> String {
    let actual = (level + offset).min(6);
    "#".repeat(actual as usize)
}

/// Formats a Unix timestamp in seconds as a UTC date and time.
///
/// Returns `None` for timestamps outside the representable range.
#[allow(clippy::cast_possible_truncation)]
fn format_timestamp(seconds: f64) -> Option<String> {
    DateTime::from_timestamp(seconds as i64, 0)
        .map(|timestamp| timestamp.format("%Y-%m-%d %H:%M UTC").to_string())
}

/// Renders a parsed conversation as Markdown.
///
/// This is the main entry point for the plain-text backend. It processes
/// all entries in conversation order and produces one accumulated document
/// string; the caller persists it.
///
/// # Arguments
///
/// * `conversation` - The parsed conversation to render
/// * `opts` - Configuration options controlling the output format
#[must_use]
pub fn render_conversation(conversation: &Conversation, opts: &RenderOptions) -> String {
    let mut out = String::new();

    for entry in &conversation.entries {
        render_entry(&mut out, entry, opts);
    }

    out
}

fn render_entry(out: &mut String, entry: &Entry, opts: &RenderOptions) {
    let message = &entry.message;
    let label = if message.is_user() { "Question" } else { "Answer" };

    let timestamp = if opts.show_timestamps {
        message.create_time.and_then(format_timestamp)
    } else {
        None
    };

    match timestamp {
        Some(stamp) => writeln!(
            out,
            "{} {label} - {stamp}\n",
            heading(2, opts.heading_offset)
        )
        .unwrap(),
        None => writeln!(out, "{} {label} - \n", heading(2, opts.heading_offset)).unwrap(),
    }

    // Parts are emitted verbatim, fenced code blocks included.
    writeln!(out, "{}\n", message.joined_content()).unwrap();
}
