//! Word (.docx) document editing.
//!
//! The entry point for editing is [`editor::DocxEditor`], which operates on
//! a document unpacked to a directory (see [`package`] for moving between
//! the `.docx` archive and that directory layout).

pub mod document;
pub mod editor;
pub mod markup;
pub mod package;
pub mod settings;

pub use document::UnpackedDocument;
pub use editor::{DocxEditor, EditOptions};
pub use markup::{Markup, RunFormatting};
