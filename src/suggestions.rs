//! Dropdown state and keyboard focus.

use crate::types::RawPlaceRecord;

/// Text shown by the sentinel entry when a search returned nothing.
pub const NO_RESULTS_LABEL: &str = "Pas de résultat à afficher.";

/// Display label of a suggestion, split for emphasis.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SuggestionLabel {
    /// Text before the first comma, rendered prominently
    pub main: String,
    /// Everything after the first comma, if there is one
    pub detail: Option<String>,
}

impl SuggestionLabel {
    /// Split a display name at its first comma.
    pub fn from_place_name(place_name: &str) -> Self {
        match place_name.split_once(',') {
            Some((main, detail)) => Self {
                main: main.to_string(),
                detail: Some(detail.to_string()),
            },
            None => Self {
                main: place_name.to_string(),
                detail: None,
            },
        }
    }
}

/// One rendered row of the dropdown.
#[derive(Debug, Clone, PartialEq)]
pub enum SuggestionEntry {
    /// A selectable provider record
    Place {
        /// Label derived from the display name
        label: SuggestionLabel,
        /// Record to normalize on commit
        record: RawPlaceRecord,
    },
    /// Placeholder shown when a search returned no records
    NoResults,
}

impl SuggestionEntry {
    /// Wrap a provider record.
    pub fn place(record: RawPlaceRecord) -> Self {
        Self::Place {
            label: SuggestionLabel::from_place_name(&record.place_name),
            record,
        }
    }

    /// Label to render.
    pub fn label(&self) -> SuggestionLabel {
        match self {
            Self::Place { label, .. } => label.clone(),
            Self::NoResults => SuggestionLabel {
                main: NO_RESULTS_LABEL.to_string(),
                detail: None,
            },
        }
    }

    /// Record behind the entry, `None` for the sentinel.
    pub fn record(&self) -> Option<&RawPlaceRecord> {
        match self {
            Self::Place { record, .. } => Some(record),
            Self::NoResults => None,
        }
    }

    /// Whether committing this entry does anything.
    pub fn is_selectable(&self) -> bool {
        matches!(self, Self::Place { .. })
    }
}

/// Rendered entries, focused row and visibility of one dropdown.
///
/// The focused index is only meaningful while the dropdown is visible and
/// has entries.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DropdownState {
    entries: Vec<SuggestionEntry>,
    focused: usize,
    visible: bool,
}

impl DropdownState {
    /// Rendered entries.
    pub fn entries(&self) -> &[SuggestionEntry] {
        &self.entries
    }

    /// Raw focused index, valid or not.
    pub fn focused_index(&self) -> usize {
        self.focused
    }

    /// Whether the dropdown is shown.
    pub fn is_visible(&self) -> bool {
        self.visible
    }

    /// Number of rendered entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether nothing has been rendered yet.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Owns the [`DropdownState`] of one widget.
#[derive(Debug, Default)]
pub struct SuggestionListController {
    state: DropdownState,
}

impl SuggestionListController {
    /// Create a hidden, empty dropdown.
    pub fn new() -> Self {
        Self::default()
    }

    /// Current state.
    pub fn state(&self) -> &DropdownState {
        &self.state
    }

    /// Replace the entries with `records`, focus the first one and show.
    ///
    /// An empty result renders the single [`SuggestionEntry::NoResults`].
    pub fn show(&mut self, records: Vec<RawPlaceRecord>) {
        self.state.entries = if records.is_empty() {
            vec![SuggestionEntry::NoResults]
        } else {
            records.into_iter().map(SuggestionEntry::place).collect()
        };
        self.state.focused = 0;
        self.state.visible = true;
    }

    /// Show the last rendered entries again, keeping focus.
    pub fn reveal(&mut self) {
        self.state.visible = true;
    }

    /// Hide the dropdown. Focus is kept but ignored until the next show.
    pub fn hide(&mut self) {
        self.state.visible = false;
    }

    /// Move focus down, wrapping from the last entry to the first.
    pub fn focus_next(&mut self) {
        let len = self.state.entries.len();
        if len == 0 {
            return;
        }
        self.state.focused = if self.state.focused >= len - 1 {
            0
        } else {
            self.state.focused + 1
        };
    }

    /// Move focus up, wrapping from the first entry to the last.
    pub fn focus_previous(&mut self) {
        let len = self.state.entries.len();
        if len == 0 {
            return;
        }
        self.state.focused = if self.state.focused == 0 || self.state.focused >= len {
            len - 1
        } else {
            self.state.focused - 1
        };
    }

    /// Focus the entry at `index`. Out-of-range indexes are ignored.
    pub fn focus(&mut self, index: usize) -> bool {
        if index < self.state.entries.len() {
            self.state.focused = index;
            true
        } else {
            false
        }
    }

    /// Entry under focus, `None` while hidden or empty.
    pub fn focused_entry(&self) -> Option<&SuggestionEntry> {
        if !self.state.visible {
            return None;
        }
        self.state.entries.get(self.state.focused)
    }

    /// Entry at `index` regardless of focus.
    pub fn entry(&self, index: usize) -> Option<&SuggestionEntry> {
        self.state.entries.get(index)
    }
}

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;

    use super::*;
    use crate::test_support::record;

    fn three_records() -> Vec<RawPlaceRecord> {
        vec![
            record("place", "Paris, France"),
            record("place", "Lyon, France"),
            record("place", "Lille, France"),
        ]
    }

    #[test]
    fn test_show_resets_focus_and_shows() {
        let mut list = SuggestionListController::new();
        list.show(three_records());
        list.focus_next();
        list.hide();

        list.show(three_records());
        assert!(list.state().is_visible());
        assert_eq!(list.state().focused_index(), 0);
        assert_eq!(list.state().len(), 3);
    }

    #[test]
    fn test_empty_results_show_one_sentinel() {
        let mut list = SuggestionListController::new();
        list.show(Vec::new());

        assert_eq!(list.state().entries(), &[SuggestionEntry::NoResults]);
        let focused = list.focused_entry().expect("sentinel is focused");
        assert!(!focused.is_selectable());
        assert_eq!(focused.record(), None);
        assert_eq!(focused.label().main, "Pas de résultat à afficher.");
    }

    #[test]
    fn test_focus_next_wraps() {
        let mut list = SuggestionListController::new();
        list.show(three_records());

        list.focus_next();
        list.focus_next();
        assert_eq!(list.state().focused_index(), 2);
        list.focus_next();
        assert_eq!(list.state().focused_index(), 0);
    }

    #[test]
    fn test_focus_previous_wraps() {
        let mut list = SuggestionListController::new();
        list.show(three_records());

        list.focus_previous();
        assert_eq!(list.state().focused_index(), 2);
        list.focus_previous();
        assert_eq!(list.state().focused_index(), 1);
    }

    #[test]
    fn test_full_cycle_returns_to_start() {
        for count in 1..=5 {
            let records = (0..count)
                .map(|i| record("place", &format!("Ville {i}, France")))
                .collect::<Vec<_>>();
            let mut list = SuggestionListController::new();
            list.show(records);

            for start in 0..count {
                assert!(list.focus(start));
                for _ in 0..count {
                    list.focus_next();
                }
                assert_eq!(list.state().focused_index(), start);
                for _ in 0..count {
                    list.focus_previous();
                }
                assert_eq!(list.state().focused_index(), start);
            }
        }
    }

    #[test]
    fn test_navigation_without_entries_is_noop() {
        let mut list = SuggestionListController::new();
        list.focus_next();
        list.focus_previous();
        assert_eq!(list.state().focused_index(), 0);
        assert_eq!(list.focused_entry(), None);
    }

    #[test]
    fn test_hidden_dropdown_has_no_focused_entry() {
        let mut list = SuggestionListController::new();
        list.show(three_records());
        list.focus_next();
        list.hide();

        assert_eq!(list.focused_entry(), None);
        assert_eq!(list.state().focused_index(), 1);

        list.reveal();
        assert_matches!(
            list.focused_entry(),
            Some(SuggestionEntry::Place { label, .. }) if label.main == "Lyon"
        );
    }

    #[test]
    fn test_focus_ignores_out_of_range() {
        let mut list = SuggestionListController::new();
        list.show(three_records());
        assert!(list.focus(2));
        assert!(!list.focus(3));
        assert_eq!(list.state().focused_index(), 2);
    }

    #[test]
    fn test_label_split() {
        assert_eq!(
            SuggestionLabel::from_place_name("10 Rue de Paris, 75001 Paris, France"),
            SuggestionLabel {
                main: "10 Rue de Paris".to_string(),
                detail: Some(" 75001 Paris, France".to_string()),
            }
        );
        assert_eq!(
            SuggestionLabel::from_place_name("France"),
            SuggestionLabel {
                main: "France".to_string(),
                detail: None,
            }
        );
    }
}
