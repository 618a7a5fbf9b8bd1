//! Shared utility functions.
//!
//! This module contains helpers used by the transport layer to read response
//! metadata.
//!
//! # Overview
//!
//! - [`content_length`] - Total size extraction from response headers
//!
//! # Examples
//!
//! ```rust
//! use haul::utils::parse_content_range_span;
//!
//! // Extract the span length from a Content-Range header
//! let header_value = "bytes 0-1023/2048";
//! if let Some(span) = parse_content_range_span(header_value) {
//!     println!("Partial body: {} bytes", span);
//! }
//! ```

pub mod content_length;

pub use content_length::{parse_content_range_span, total_from_headers};
