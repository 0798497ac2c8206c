// SPDX-License-Identifier: GPL-3.0-only
// Copyright (C) 2025 Brian Hetro <whee@smaertness.net>

//! Paginated PDF rendering for parsed conversation exports.
//!
//! This module transforms a [`Conversation`] into a finished PDF byte
//! stream. Page layout is delegated to `printpdf`; this module only decides
//! the per-message styling and the vertical flow:
//!
//! - fill color by author role (user vs everything else),
//! - one of two builtin font faces for the whole message, chosen by the
//!   presence of a fenced-code marker anywhere in it,
//! - a fixed line height, with a page break when the bottom margin is
//!   reached and half a line of extra space between messages.
//!
//! Finalization is a single blocking operation: [`render_document`] returns
//! either the complete byte stream or an error. The caller persists the
//! bytes; nothing can be appended afterwards.
//!
//! # Example
//!
//! ```
//! use chat2doc::parser::parse_conversation;
//! use chat2doc::pdf::{DocumentOptions, render_document};
//!
//! let conversation = parse_conversation("{}").unwrap();
//! let bytes = render_document(&conversation, &DocumentOptions::default()).unwrap();
//! assert!(bytes.starts_with(b"%PDF"));
//! ```

use crate::parser::{Conversation, Message};
use printpdf::{BuiltinFont, Color, Mm, PdfDocument, Rgb};
use snafu::prelude::*;
use std::io::BufWriter;

// A4 page dimensions and text layout, in millimeters.
const PAGE_WIDTH: f32 = 210.0;
const PAGE_HEIGHT: f32 = 297.0;
const MARGIN: f32 = 20.0;
const LINE_HEIGHT: f32 = 5.5;
const FONT_SIZE: f32 = 11.0;

/// Error type for PDF rendering failures.
#[derive(Debug, Snafu)]
pub enum DocumentError {
    /// Failed to build the PDF document structure.
    #[snafu(display("failed to build PDF document: {source}"))]
    Build {
        /// The underlying PDF library error.
        source: printpdf::Error,
    },

    /// Failed to assemble the finished byte stream.
    #[snafu(display("failed to assemble PDF bytes: {source}"))]
    Assemble {
        /// The underlying I/O error.
        source: std::io::Error,
    },
}

/// Configuration options for the paginated backend.
///
/// The defaults reproduce the reference styling: blue for user messages,
/// black for everything else, Helvetica for prose and Courier for messages
/// carrying code.
#[derive(Debug, Clone)]
pub struct DocumentOptions {
    /// Fill color for messages authored by the user.
    pub user_color: Color,

    /// Fill color for all other messages.
    pub assistant_color: Color,

    /// Font face for messages without a fenced-code marker.
    pub prose_font: BuiltinFont,

    /// Font face for messages carrying a fenced-code marker.
    pub code_font: BuiltinFont,
}

impl Default for DocumentOptions {
    fn default() -> Self {
        Self {
            user_color: Color::Rgb(Rgb::new(0.0, 0.0, 1.0, None)),
            assistant_color: Color::Rgb(Rgb::new(0.0, 0.0, 0.0, None)),
            prose_font: BuiltinFont::Helvetica,
            code_font: BuiltinFont::Courier,
        }
    }
}

/// Returns the fill color the paginated backend uses for a message.
#[must_use]
pub fn message_color(message: &Message, opts: &DocumentOptions) -> Color {
    if message.is_user() {
        opts.user_color.clone()
    } else {
        opts.assistant_color.clone()
    }
}

/// Returns the font face the paginated backend uses for a message.
///
/// The choice applies to the whole message: a message mixing prose and code
/// renders entirely in the code face.
#[must_use]
pub fn message_font(message: &Message, opts: &DocumentOptions) -> BuiltinFont {
    if message.contains_code() {
        opts.code_font
    } else {
        opts.prose_font
    }
}

/// Renders a parsed conversation as a finished PDF byte stream.
///
/// Messages are emitted in conversation order, each starting a fresh
/// left-aligned text flow. The returned bytes are the complete document;
/// writing them to disk is the caller's job.
///
/// # Errors
///
/// Returns an error if the PDF document cannot be built or its byte stream
/// cannot be assembled. Either way the affected output is abandoned whole;
/// there is no partial document.
pub fn render_document(
    conversation: &Conversation,
    opts: &DocumentOptions,
) -> Result<Vec<u8>, DocumentError> {
    let (doc, first_page, first_layer) = PdfDocument::new(
        "Chat Conversation",
        Mm(PAGE_WIDTH),
        Mm(PAGE_HEIGHT),
        "text",
    );
    let prose = doc.add_builtin_font(opts.prose_font).context(BuildSnafu)?;
    let code = doc.add_builtin_font(opts.code_font).context(BuildSnafu)?;

    let mut layer = doc.get_page(first_page).get_layer(first_layer);
    let mut y = PAGE_HEIGHT - MARGIN;

    for entry in &conversation.entries {
        let message = &entry.message;
        let color = message_color(message, opts);
        let font = if message.contains_code() { &code } else { &prose };

        layer.set_fill_color(color.clone());
        for line in message.joined_content().lines() {
            if y < MARGIN {
                let (page, page_layer) = doc.add_page(Mm(PAGE_WIDTH), Mm(PAGE_HEIGHT), "text");
                layer = doc.get_page(page).get_layer(page_layer);
                // Fill color is content-stream state and does not carry
                // over to the new page.
                layer.set_fill_color(color.clone());
                y = PAGE_HEIGHT - MARGIN;
            }
            layer.use_text(line, FONT_SIZE, Mm(MARGIN), Mm(y), font);
            y -= LINE_HEIGHT;
        }

        // Half a line of extra space before the next message.
        y -= LINE_HEIGHT / 2.0;
    }

    let mut writer = BufWriter::new(Vec::new());
    doc.save(&mut writer).context(BuildSnafu)?;
    writer
        .into_inner()
        .map_err(std::io::IntoInnerError::into_error)
        .context(AssembleSnafu)
}
