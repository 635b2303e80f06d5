//! Namespace-qualified XML tree support for OOXML parts.
//!
//! This module provides the owned, mutable element tree that the document
//! accessor and edit engine operate on, together with explicit namespace
//! resolution (no process-wide registration step).

pub mod element;
pub mod namespace;

pub use element::Element;
pub use namespace::NamespaceMap;
