//! Heading-based section extraction.
//!
//! A Markdown document is flat, but its headings form an implicit outline: a
//! heading owns everything up to the next heading of the same or a higher
//! rank. Extracting a section returns that owned block.

use crate::heading::{scan_headings, Heading};

/// Selects a section by id (explicit `{#id}` or GitHub slug) and/or class.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SectionSelector<'a> {
    /// Wanted id, compared case-insensitively against explicit ids and slugs.
    pub id: Option<&'a str>,
    /// Wanted class, consulted only when no heading matches the id.
    pub class: Option<&'a str>,
}

impl<'a> SectionSelector<'a> {
    /// Creates a selector, treating empty strings as absent.
    pub fn new(id: Option<&'a str>, class: Option<&'a str>) -> Self {
        Self {
            id: id.filter(|s| !s.is_empty()),
            class: class.filter(|s| !s.is_empty()),
        }
    }

    /// Returns `true` if neither an id nor a class is requested.
    pub fn is_empty(&self) -> bool {
        self.id.is_none() && self.class.is_none()
    }

    /// Finds the first heading addressed by this selector.
    ///
    /// Id matches take precedence over class matches across the whole document.
    fn find<'h>(&self, headings: &'h [Heading]) -> Option<(usize, &'h Heading)> {
        let by_id = self.id.and_then(|id| {
            headings
                .iter()
                .enumerate()
                .find(|(_, heading)| heading.is_addressed_by(id))
        });

        by_id.or_else(|| {
            self.class.and_then(|class| {
                headings
                    .iter()
                    .enumerate()
                    .find(|(_, heading)| heading.has_class(class))
            })
        })
    }
}

/// Extracts the section owned by the first heading matching `selector`.
///
/// The block starts at the matched heading and ends right before the next
/// heading whose level is less than or equal to the matched one, or at the end
/// of the document. Deeper headings belong to the section.
///
/// Returns `None` if no heading matches or the selector is empty.
///
/// # Example
///
/// ```
/// use mdpanel_core::section::{extract_section, SectionSelector};
///
/// let text = "# A\n## B {#b}\n### C\n## D\n";
/// let section = extract_section(text, SectionSelector::new(Some("b"), None));
/// assert_eq!(section, Some("## B {#b}\n### C\n"));
/// ```
pub fn extract_section<'t>(text: &'t str, selector: SectionSelector<'_>) -> Option<&'t str> {
    if selector.is_empty() {
        return None;
    }

    let headings = scan_headings(text);
    let (index, start) = selector.find(&headings)?;

    let end = headings[index + 1..]
        .iter()
        .find(|heading| heading.level <= start.level)
        .map_or(text.len(), |heading| heading.start_offset);

    Some(&text[start.start_offset..end])
}
