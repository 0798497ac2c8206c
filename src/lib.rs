// SPDX-License-Identifier: GPL-3.0-only
// Copyright (C) 2025 Brian Hetro <whee@smaertness.net>

//! Convert ChatGPT conversation exports to Markdown and PDF.
//!
//! This crate provides parsing and rendering functionality for transforming
//! the JSON mapping a ChatGPT conversation export produces into readable
//! documents.
//!
//! # Overview
//!
//! A conversation export is a single JSON mapping from message ids to
//! message entries. This crate:
//!
//! 1. Parses the mapping into typed Rust representations, preserving the
//!    source order and skipping malformed entries with a reason
//! 2. Renders the conversation through one of two backends sharing the same
//!    per-message decisions: plain Markdown, or a paginated PDF
//!
//! # Example
//!
//! ```no_run
//! use chat2doc::{markdown, parser, pdf};
//!
//! let json = std::fs::read_to_string("conversation.json").unwrap();
//! let conversation = parser::parse_conversation(&json).unwrap();
//!
//! let text = markdown::render_conversation(&conversation, &markdown::RenderOptions::default());
//! std::fs::write("conversation.md", text).unwrap();
//!
//! let bytes = pdf::render_document(&conversation, &pdf::DocumentOptions::default()).unwrap();
//! std::fs::write("conversation.pdf", bytes).unwrap();
//! ```
//!
//! # Modules
//!
//! - [`parser`]: JSON parsing and type definitions for conversation exports
//! - [`markdown`]: plain-text Markdown generation with configurable output
//! - [`pdf`]: paginated PDF generation with configurable styling

#![deny(missing_docs)]

pub mod markdown;
pub mod parser;
pub mod pdf;
