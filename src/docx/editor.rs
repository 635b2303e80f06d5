//! Span editor for text in an unpacked Word document.
//!
//! The engine locates text inside the paragraph/run tree, splits the owning
//! run around the match, and splices in either plain replacement runs or a
//! synthesized tracked deletion/insertion pair, preserving sibling order and
//! re-persisting the part.
//!
//! Matching is performed per run: a search term that spans a run boundary is
//! not detected. This is part of the API contract, not an oversight — the
//! split/splice algorithm operates on one run at a time and callers should
//! search for spans that live inside a single run.
//!
//! # Examples
//!
//! ```rust,no_run
//! use redline::docx::{DocxEditor, EditOptions};
//!
//! let editor = DocxEditor::open("unpacked/")?;
//!
//! // Plain in-place edit
//! let count = editor.replace("$100", "$200", &EditOptions::new())?;
//! println!("made {} replacement(s)", count);
//!
//! // Reviewer-visible tracked edit
//! let options = EditOptions::new().with_track_changes(true).with_author("A. Reviewer");
//! editor.replace("draft", "final", &options)?;
//! # Ok::<(), redline::DocxError>(())
//! ```

use crate::docx::document::{self, UnpackedDocument};
use crate::docx::markup::{Markup, RunFormatting, next_change_id};
use crate::docx::settings;
use crate::error::{DocxError, Result};
use crate::xml::element::Element;
use crate::xml::namespace::{NamespaceMap, WORDML_NS};
use memchr::memmem;
use std::path::Path;

/// Default author recorded on tracked changes when none is given.
pub const DEFAULT_AUTHOR: &str = "Document Editor";

/// Options for an edit operation.
///
/// # Examples
///
/// ```rust
/// use redline::docx::EditOptions;
///
/// let options = EditOptions::new()
///     .with_track_changes(true)
///     .with_author("Jane Reviewer");
/// assert!(options.track_changes());
/// ```
#[derive(Debug, Clone)]
pub struct EditOptions {
    track_changes: bool,
    author: String,
}

impl EditOptions {
    /// Untracked edits attributed to the default author.
    pub fn new() -> Self {
        Self {
            track_changes: false,
            author: DEFAULT_AUTHOR.to_string(),
        }
    }

    /// Record edits as tracked changes instead of mutating content in place.
    pub fn with_track_changes(mut self, track_changes: bool) -> Self {
        self.track_changes = track_changes;
        self
    }

    /// Author recorded on synthesized tracked changes.
    pub fn with_author(mut self, author: &str) -> Self {
        self.author = author.to_string();
        self
    }

    /// Whether edits are recorded as tracked changes.
    #[inline]
    pub fn track_changes(&self) -> bool {
        self.track_changes
    }

    /// Author recorded on tracked changes.
    #[inline]
    pub fn author(&self) -> &str {
        &self.author
    }
}

impl Default for EditOptions {
    fn default() -> Self {
        Self::new()
    }
}

/// Editor for a Word document unpacked to a directory.
///
/// Each operation loads the whole document part, mutates the tree, and
/// writes it back before returning; the tree is exclusively owned by the
/// call. Callers must serialize operations against the same directory.
pub struct DocxEditor {
    part: UnpackedDocument,
}

impl DocxEditor {
    /// Open an unpacked .docx directory for editing.
    ///
    /// Fails with [`DocxError::PartNotFound`] when `word/document.xml` is
    /// absent.
    pub fn open<P: AsRef<Path>>(dir: P) -> Result<Self> {
        let part = UnpackedDocument::new(dir);
        if !part.document_path().exists() {
            return Err(DocxError::PartNotFound(format!(
                "word/document.xml not found in {}",
                part.dir().display()
            )));
        }
        Ok(Self { part })
    }

    /// Access the underlying document part.
    #[inline]
    pub fn part(&self) -> &UnpackedDocument {
        &self.part
    }

    /// Find and replace text.
    ///
    /// For every run whose own text contains `find`, the leftmost occurrence
    /// is replaced. Untracked, the run's text is rewritten in place with its
    /// formatting untouched. Tracked, the run is removed and
    /// `[before?, deletion, insertion, after?]` is spliced in at its
    /// position, each record consuming the next change ID (deletion
    /// immediately before insertion); revision tracking is switched on in
    /// the settings part as a side effect. An empty `replacement` produces a
    /// pure deletion record with no insertion.
    ///
    /// Further occurrences of `find` inside the same run are left untouched,
    /// and the spliced-in segments are not rescanned. Returns the number of
    /// runs edited; `0` when nothing matched is a normal outcome.
    pub fn replace(&self, find: &str, replacement: &str, options: &EditOptions) -> Result<usize> {
        let mut root = self.part.load()?;
        let ns = NamespaceMap::from_root(&root);
        let markup = Markup::from_namespaces(&ns)?;

        let mut ctx = EditContext {
            ns: &ns,
            markup: &markup,
            options,
            next_id: 0,
        };
        if options.track_changes() {
            ctx.next_id = next_change_id(&root, &ns);
            settings::enable_track_changes(&self.part)?;
        }

        let mut count = 0;
        for_each_paragraph(&mut root, &ns, &mut |paragraph| {
            if find_in(&document::text_of(paragraph, &ns), find).is_some() {
                count += replace_in_children(paragraph, &mut ctx, find, replacement);
            }
        });

        self.part.save(&root)?;
        Ok(count)
    }

    /// Insert text after the first occurrence of `anchor`.
    ///
    /// Scans paragraphs, then runs, in document order; the first run whose
    /// text contains `anchor` wins. That run is split into `before + anchor`
    /// and `after`, with the new text spliced between them as a plain run
    /// or a tracked insertion. At most one insertion is made per call.
    ///
    /// Returns `true` after persisting the edit, or `false` — without
    /// rewriting the document part — when no run contains `anchor`.
    pub fn insert_after(&self, anchor: &str, new_text: &str, options: &EditOptions) -> Result<bool> {
        let mut root = self.part.load()?;
        let ns = NamespaceMap::from_root(&root);
        let markup = Markup::from_namespaces(&ns)?;

        let mut ctx = EditContext {
            ns: &ns,
            markup: &markup,
            options,
            next_id: 0,
        };
        if options.track_changes() {
            ctx.next_id = next_change_id(&root, &ns);
            settings::enable_track_changes(&self.part)?;
        }

        let mut inserted = false;
        for_each_paragraph(&mut root, &ns, &mut |paragraph| {
            if inserted {
                return;
            }
            if find_in(&document::text_of(paragraph, &ns), anchor).is_none() {
                return;
            }
            inserted = insert_after_in_children(paragraph, &mut ctx, anchor, new_text);
        });

        if inserted {
            self.part.save(&root)?;
        }
        Ok(inserted)
    }

    /// Delete text.
    ///
    /// Equivalent to replacing `target` with the empty string: tracked mode
    /// records a pure deletion, untracked mode drops the matched span.
    /// Returns the number of deletions made.
    pub fn delete(&self, target: &str, options: &EditOptions) -> Result<usize> {
        self.replace(target, "", options)
    }
}

/// Shared state for one edit pass over the tree.
struct EditContext<'a> {
    ns: &'a NamespaceMap,
    markup: &'a Markup,
    options: &'a EditOptions,
    next_id: u32,
}

impl EditContext<'_> {
    /// Consume the next change ID.
    fn take_id(&mut self) -> u32 {
        let id = self.next_id;
        self.next_id += 1;
        id
    }

    fn is_run(&self, element: &Element) -> bool {
        self.ns.element_is(element.tag(), WORDML_NS, "r")
    }
}

/// Leftmost byte offset of `needle` in `haystack`. Both are valid UTF-8, so
/// a byte-level match always falls on character boundaries.
fn find_in(haystack: &str, needle: &str) -> Option<usize> {
    memmem::find(haystack.as_bytes(), needle.as_bytes())
}

/// Visit every paragraph under `element` in document order. Paragraphs do
/// not nest, so traversal stops at each match.
fn for_each_paragraph<F: FnMut(&mut Element)>(element: &mut Element, ns: &NamespaceMap, f: &mut F) {
    if ns.element_is(element.tag(), WORDML_NS, "p") {
        f(element);
        return;
    }
    for child in element.children_mut() {
        for_each_paragraph(child, ns, f);
    }
}

/// Replace the leftmost occurrence of `find` in each matching run that is a
/// direct child of `parent`, recursing into wrapper elements (hyperlinks,
/// existing tracked changes) so their runs are reached too. Nodes spliced in
/// by an edit are skipped, not rescanned.
fn replace_in_children(
    parent: &mut Element,
    ctx: &mut EditContext<'_>,
    find: &str,
    replacement: &str,
) -> usize {
    let mut count = 0;
    let mut i = 0;
    while i < parent.children().len() {
        let child = &parent.children()[i];
        let match_pos = if ctx.is_run(child) {
            find_in(&document::text_of(child, ctx.ns), find)
        } else {
            None
        };

        match match_pos {
            Some(pos) => {
                i += apply_replacement(parent, i, pos, ctx, find, replacement);
                count += 1;
            },
            None => {
                let child = &mut parent.children_mut()[i];
                if !ctx.ns.element_is(child.tag(), WORDML_NS, "r") {
                    count += replace_in_children(child, ctx, find, replacement);
                }
                i += 1;
            },
        }
    }
    count
}

/// Perform one replacement on the run at `parent.children()[index]`, whose
/// text contains `find` at byte offset `pos`. Returns how many sibling slots
/// the edit now occupies, so the caller can skip past them.
fn apply_replacement(
    parent: &mut Element,
    index: usize,
    pos: usize,
    ctx: &mut EditContext<'_>,
    find: &str,
    replacement: &str,
) -> usize {
    if !ctx.options.track_changes() {
        let run = &mut parent.children_mut()[index];
        let run_text = document::text_of(run, ctx.ns);
        let mut new_text = String::with_capacity(run_text.len() + replacement.len());
        new_text.push_str(&run_text[..pos]);
        new_text.push_str(replacement);
        new_text.push_str(&run_text[pos + find.len()..]);
        rewrite_run_text(run, ctx.ns, &new_text);
        return 1;
    }

    let run = parent.remove_child(index);
    let run_text = document::text_of(&run, ctx.ns);
    let before = &run_text[..pos];
    let after = &run_text[pos + find.len()..];

    let mut at = index;
    if !before.is_empty() {
        parent.insert_child(at, ctx.markup.run(before, &RunFormatting::none()));
        at += 1;
    }
    let author = ctx.options.author().to_string();
    let deletion_id = ctx.take_id();
    parent.insert_child(at, ctx.markup.deletion(find, &author, deletion_id));
    at += 1;
    if !replacement.is_empty() {
        let insertion_id = ctx.take_id();
        parent.insert_child(
            at,
            ctx.markup
                .insertion(replacement, &author, insertion_id, &RunFormatting::none()),
        );
        at += 1;
    }
    if !after.is_empty() {
        parent.insert_child(at, ctx.markup.run(after, &RunFormatting::none()));
        at += 1;
    }
    at - index
}

/// Single-shot splice for `insert_after`: finds the first run under `parent`
/// containing `anchor` and inserts the new content right after the anchor
/// text. Returns `true` once the splice is done.
fn insert_after_in_children(
    parent: &mut Element,
    ctx: &mut EditContext<'_>,
    anchor: &str,
    new_text: &str,
) -> bool {
    let mut i = 0;
    while i < parent.children().len() {
        let child = &parent.children()[i];
        let match_pos = if ctx.is_run(child) {
            find_in(&document::text_of(child, ctx.ns), anchor)
        } else {
            None
        };

        if let Some(pos) = match_pos {
            let run = parent.remove_child(i);
            let run_text = document::text_of(&run, ctx.ns);
            let lead = &run_text[..pos + anchor.len()];
            let after = &run_text[pos + anchor.len()..];

            let mut at = i;
            parent.insert_child(at, ctx.markup.run(lead, &RunFormatting::none()));
            at += 1;
            if ctx.options.track_changes() {
                let author = ctx.options.author().to_string();
                let insertion_id = ctx.take_id();
                parent.insert_child(
                    at,
                    ctx.markup
                        .insertion(new_text, &author, insertion_id, &RunFormatting::none()),
                );
            } else {
                parent.insert_child(at, ctx.markup.run(new_text, &RunFormatting::none()));
            }
            at += 1;
            if !after.is_empty() {
                parent.insert_child(at, ctx.markup.run(after, &RunFormatting::none()));
            }
            return true;
        }

        let child = &mut parent.children_mut()[i];
        if !ctx.ns.element_is(child.tag(), WORDML_NS, "r")
            && insert_after_in_children(child, ctx, anchor, new_text)
        {
            return true;
        }
        i += 1;
    }
    false
}

/// Rewrite a run's logical text in place: the first live text leaf receives
/// the whole new text (with the whitespace-preservation flag updated), any
/// further leaves are emptied so the run's concatenated text stays equal to
/// its logical content.
fn rewrite_run_text(run: &mut Element, ns: &NamespaceMap, new_text: &str) {
    let mut wrote = false;
    rewrite_text_leaves(run, ns, new_text, &mut wrote);
}

fn rewrite_text_leaves(element: &mut Element, ns: &NamespaceMap, new_text: &str, wrote: &mut bool) {
    if ns.element_is(element.tag(), WORDML_NS, "t") {
        if *wrote {
            element.set_text("");
            element.remove_attribute("xml:space");
        } else {
            element.set_text(new_text);
            if new_text.starts_with(' ') || new_text.ends_with(' ') {
                element.set_attribute("xml:space", "preserve");
            } else {
                element.remove_attribute("xml:space");
            }
            *wrote = true;
        }
        return;
    }
    for child in element.children_mut() {
        rewrite_text_leaves(child, ns, new_text, wrote);
    }
}
