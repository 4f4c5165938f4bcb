//! Note use cases and markdown helpers.
//!
//! # Responsibility
//! - Provide note create/edit/delete APIs over the note binding.
//! - Derive card previews (`preview_text`, `preview_image`) from markdown.
//! - Toggle task-list checkboxes by line index.
//!
//! # Invariants
//! - Editing a note always writes the title+content pair.
//! - Checkbox toggles rewrite exactly one line and keep every other byte.

use crate::binding::{BindingError, BindingResult, CollectionBinding, Notifier, Operation};
use crate::model::note::{Note, NoteBody};
use crate::model::record::{OwnerId, RecordError, RecordId};
use crate::store::DocumentStore;
use once_cell::sync::Lazy;
use regex::Regex;

const PREVIEW_MAX_CHARS: usize = 100;

static MARKDOWN_IMAGE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"!\[[^\]]*]\(([^)]+)\)").expect("valid image regex"));
static MARKDOWN_LINK_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\[([^\]]+)\]\(([^)]+)\)").expect("valid link regex"));
static MARKDOWN_SYMBOL_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#"[\*_`#>~\-\[\]\(\)!]+"#).expect("valid markdown symbol regex"));
static WHITESPACE_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").expect("valid ws regex"));
static CHECKBOX_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(\s*[-*+]\s+\[)([ xX])(\].*)$").expect("valid checkbox regex")
});

/// Markdown-derived card projection for one note.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NotePreview {
    pub id: RecordId,
    pub title: String,
    /// Sanitized summary text.
    pub preview_text: Option<String>,
    /// First markdown image path.
    pub preview_image: Option<String>,
}

/// Markdown-derived preview fields.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MarkdownPreview {
    pub preview_text: Option<String>,
    pub preview_image: Option<String>,
}

pub struct NoteService<S: DocumentStore, N: Notifier> {
    binding: CollectionBinding<Note, S, N>,
}

impl<S: DocumentStore, N: Notifier> NoteService<S, N> {
    pub fn new(store: S, notifier: N) -> Self {
        Self {
            binding: CollectionBinding::new(store, notifier),
        }
    }

    pub fn binding(&self) -> &CollectionBinding<Note, S, N> {
        &self.binding
    }

    pub fn notes(&mut self, owner: Option<&OwnerId>) -> BindingResult<Vec<Note>> {
        self.binding.list(owner)
    }

    /// Card previews in note order.
    pub fn previews(&mut self, owner: Option<&OwnerId>) -> BindingResult<Vec<NotePreview>> {
        let notes = self.binding.list(owner)?;
        Ok(notes
            .into_iter()
            .map(|note| {
                let preview = derive_markdown_preview(&note.content);
                NotePreview {
                    id: note.id,
                    title: note.title,
                    preview_text: preview.preview_text,
                    preview_image: preview.preview_image,
                }
            })
            .collect())
    }

    pub fn add_note(
        &mut self,
        owner: Option<&OwnerId>,
        title: impl Into<String>,
        content: impl Into<String>,
    ) -> BindingResult<RecordId> {
        let body = NoteBody {
            title: title.into(),
            content: content.into(),
        };
        self.binding.create(owner, &body)
    }

    /// Replaces title and content of an existing note.
    pub fn update_note(
        &mut self,
        owner: Option<&OwnerId>,
        id: &RecordId,
        title: impl Into<String>,
        content: impl Into<String>,
    ) -> BindingResult<()> {
        let body = NoteBody {
            title: title.into(),
            content: content.into(),
        };
        self.binding.update(owner, id, &body)
    }

    pub fn delete_note(&mut self, owner: Option<&OwnerId>, id: &RecordId) -> BindingResult<()> {
        self.binding.delete(owner, id)
    }

    /// Flips the checkbox on `line` of `note` and saves the note.
    ///
    /// # Errors
    /// - `AuthenticationRequired` when `owner` is `None`.
    /// - `InvalidInput` when the line is missing or is not a checkbox.
    ///
    /// Both are refused before any store call and emit one failure
    /// notification.
    pub fn toggle_checkbox(
        &mut self,
        owner: Option<&OwnerId>,
        note: &Note,
        line: usize,
    ) -> BindingResult<String> {
        if owner.is_none() {
            return self
                .binding
                .reject(Operation::Update, BindingError::AuthenticationRequired);
        }
        let Some(content) = toggle_markdown_checkbox(&note.content, line) else {
            return self.binding.reject(
                Operation::Update,
                BindingError::InvalidInput(RecordError::NotACheckbox { line }),
            );
        };
        self.update_note(owner, &note.id, note.title.clone(), content.clone())?;
        Ok(content)
    }
}

/// Derives note preview fields from markdown content.
///
/// Rules:
/// - `preview_image`: first markdown image path matched by regex.
/// - `preview_text`: markdown symbols removed, whitespace normalized, first
///   100 chars retained.
pub fn derive_markdown_preview(content: &str) -> MarkdownPreview {
    let preview_image = MARKDOWN_IMAGE_RE
        .captures(content)
        .and_then(|caps| caps.get(1).map(|m| m.as_str().trim().to_string()))
        .filter(|value| !value.is_empty());

    let without_images = MARKDOWN_IMAGE_RE.replace_all(content, " ");
    let without_links = MARKDOWN_LINK_RE.replace_all(&without_images, "$1");
    let without_symbols = MARKDOWN_SYMBOL_RE.replace_all(&without_links, " ");
    let normalized = WHITESPACE_RE.replace_all(&without_symbols, " ");
    let trimmed = normalized.trim();
    let preview_text = if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.chars().take(PREVIEW_MAX_CHARS).collect())
    };

    MarkdownPreview {
        preview_text,
        preview_image,
    }
}

/// Returns `content` with the checkbox on zero-based `line` flipped.
///
/// Returns `None` when `line` is out of range or not a `- [ ]`/`- [x]` item.
pub fn toggle_markdown_checkbox(content: &str, line: usize) -> Option<String> {
    let mut lines: Vec<String> = content.split('\n').map(str::to_string).collect();
    let target = lines.get_mut(line)?;
    let caps = CHECKBOX_RE.captures(target.as_str())?;
    let mark = if &caps[2] == " " { "x" } else { " " };
    let toggled = format!("{}{mark}{}", &caps[1], &caps[3]);
    *target = toggled;
    Some(lines.join("\n"))
}

#[cfg(test)]
mod tests {
    use super::{derive_markdown_preview, toggle_markdown_checkbox};

    #[test]
    fn preview_extracts_first_image_path() {
        let preview = derive_markdown_preview("x ![a](one.png) y ![b](two.png)");
        assert_eq!(preview.preview_image.as_deref(), Some("one.png"));
    }

    #[test]
    fn preview_strips_markdown_symbols_and_limits_length() {
        let source = "# title\n\n- [link](https://example.com)\n**bold** `code`";
        let preview = derive_markdown_preview(source);
        let text = preview.preview_text.expect("preview_text should exist");
        assert!(!text.contains('#'));
        assert!(!text.contains('*'));
        assert!(text.chars().count() <= 100);
    }

    #[test]
    fn checkbox_toggle_flips_only_the_target_line() {
        let source = "# Groceries\n- [ ] milk\n- [x] eggs\r\n  * [ ] bread";
        let checked = toggle_markdown_checkbox(source, 1).unwrap();
        assert_eq!(checked, "# Groceries\n- [x] milk\n- [x] eggs\r\n  * [ ] bread");

        let unchecked = toggle_markdown_checkbox(&checked, 2).unwrap();
        assert_eq!(unchecked, "# Groceries\n- [x] milk\n- [ ] eggs\r\n  * [ ] bread");

        let nested = toggle_markdown_checkbox(source, 3).unwrap();
        assert!(nested.ends_with("  * [x] bread"));
    }

    #[test]
    fn checkbox_toggle_rejects_plain_lines_and_out_of_range() {
        assert!(toggle_markdown_checkbox("# Title\nplain", 0).is_none());
        assert!(toggle_markdown_checkbox("- [ ] one", 5).is_none());
    }
}
