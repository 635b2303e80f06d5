//! Redline - tracked-change-aware text editing for Word (OOXML) documents
//!
//! This library edits the textual content of a WordprocessingML document
//! that has been unpacked to a directory, optionally recording every edit as
//! a reviewer-visible tracked change instead of mutating content in place.
//!
//! # Features
//!
//! - **Find and replace**: per-run text replacement, plain or tracked
//! - **Insert after**: single-shot insertion after an anchor phrase
//! - **Delete**: span removal, rendered as a tracked deletion when requested
//! - **Change-ID allocation**: new tracked changes always receive unique,
//!   strictly increasing identifiers
//! - **Structure preservation**: run/paragraph nesting, sibling order, and
//!   whitespace-preservation flags survive every edit
//! - **Packaging**: extract a `.docx` archive to a directory and recreate it
//!
//! # Example - Replacing text with tracked changes
//!
//! ```no_run
//! use redline::docx::{DocxEditor, EditOptions, package};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! // Unpack the archive, edit, repack.
//! package::unpack("report.docx", "unpacked/")?;
//!
//! let editor = DocxEditor::open("unpacked/")?;
//! let options = EditOptions::new()
//!     .with_track_changes(true)
//!     .with_author("Jane Reviewer");
//! let count = editor.replace("$100", "$200", &options)?;
//! println!("made {} replacement(s)", count);
//!
//! package::pack("unpacked/", "report-edited.docx")?;
//! # Ok(())
//! # }
//! ```
//!
//! # Example - Plain edits
//!
//! ```no_run
//! use redline::docx::{DocxEditor, EditOptions};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let editor = DocxEditor::open("unpacked/")?;
//! let options = EditOptions::new();
//!
//! editor.replace("draft", "final", &options)?;
//! editor.insert_after("Revenue: $100", " (unaudited)", &options)?;
//! editor.delete("CONFIDENTIAL", &options)?;
//! # Ok(())
//! # }
//! ```
//!
//! # Matching model
//!
//! Text is matched per run (the smallest span of uniformly formatted text):
//! a search term that crosses a run boundary is not detected, and only the
//! leftmost occurrence inside a run is edited per call. See
//! [`docx::DocxEditor`] for the full contract.

/// Word (.docx) document editing
pub mod docx;

/// Error types
pub mod error;

/// Namespace-qualified XML tree support
pub mod xml;

pub use docx::{DocxEditor, EditOptions};
pub use error::{DocxError, Result};
