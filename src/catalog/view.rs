//! Pure view state for the scheme catalog page.
//!
//! `ViewState` owns the loaded collection plus every user-controlled input
//! (search text, category filter, sort mode). All derived output (the table,
//! the highlight cards, the detail modal) is computed from it by plain
//! functions, so the page can be exercised without a DOM.

use std::cmp::Ordering;

use serde::{Deserialize, Serialize};
use unicode_normalization::char::is_combining_mark;
use unicode_normalization::UnicodeNormalization;

use super::format::{format_return, format_text};
use super::Scheme;

pub const FILTER_ALL: &str = "all";
pub const DEFAULT_HIGHLIGHTS: usize = 6;
pub const EMPTY_MESSAGE: &str = "No schemes found";
pub const DETAIL_PLACEHOLDER: &str = "This is a placeholder for full scheme details.";
pub const TABLE_HEADER: [&str; 6] = [
    "Scheme",
    "Provider",
    "Category",
    "1Y Return",
    "3Y Return",
    "Min Investment",
];

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortMode {
    #[default]
    Returns,
    Name,
}

impl SortMode {
    /// Anything other than `"name"` falls back to the returns ordering.
    pub fn parse(raw: &str) -> Self {
        if raw.trim().eq_ignore_ascii_case("name") {
            SortMode::Name
        } else {
            SortMode::Returns
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            SortMode::Returns => "returns",
            SortMode::Name => "name",
        }
    }
}

/// Base letters only: decomposed, marks stripped, case folded.
fn base_letters(s: &str) -> String {
    s.nfd()
        .filter(|c| !is_combining_mark(*c))
        .collect::<String>()
        .to_lowercase()
}

fn accented_letters(s: &str) -> String {
    s.nfd().collect::<String>().to_lowercase()
}

fn case_marks(s: &str) -> Vec<bool> {
    s.nfd()
        .filter(|c| !is_combining_mark(*c))
        .map(char::is_uppercase)
        .collect()
}

/// Collation in three levels: base letters, then accents ("e" before "é"),
/// then case with lowercase first. Raw code points break any remaining tie.
pub fn locale_compare(a: &str, b: &str) -> Ordering {
    base_letters(a)
        .cmp(&base_letters(b))
        .then_with(|| accented_letters(a).cmp(&accented_letters(b)))
        .then_with(|| case_marks(a).cmp(&case_marks(b)))
        .then_with(|| a.cmp(b))
}

fn by_return_desc(a: &Scheme, b: &Scheme) -> Ordering {
    b.return_key().total_cmp(&a.return_key())
}

fn by_name_asc(a: &Scheme, b: &Scheme) -> Ordering {
    locale_compare(a.name_or_empty(), b.name_or_empty())
}

// =============================================================================
// Filter controls
// =============================================================================

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilterControl {
    pub label: String,
    pub active: bool,
}

impl FilterControl {
    pub fn key(&self) -> String {
        self.label.to_lowercase()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilterBar {
    controls: Vec<FilterControl>,
}

impl Default for FilterBar {
    fn default() -> Self {
        Self::new(["All"])
    }
}

impl FilterBar {
    /// The first control starts active.
    pub fn new<I, S>(labels: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let controls = labels
            .into_iter()
            .enumerate()
            .map(|(i, label)| FilterControl {
                label: label.into(),
                active: i == 0,
            })
            .collect();
        Self { controls }
    }

    /// "All" followed by each distinct category in first-appearance order.
    pub fn from_schemes(schemes: &[Scheme]) -> Self {
        let mut labels: Vec<String> = vec!["All".to_string()];
        for s in schemes {
            let Some(cat) = s.category.as_deref().filter(|c| !c.trim().is_empty()) else {
                continue;
            };
            let key = cat.to_lowercase();
            if !labels.iter().any(|l| l.to_lowercase() == key) {
                labels.push(cat.to_string());
            }
        }
        Self::new(labels)
    }

    pub fn controls(&self) -> &[FilterControl] {
        &self.controls
    }

    pub fn active(&self) -> Option<&FilterControl> {
        self.controls.iter().find(|c| c.active)
    }

    /// Clears every control, then marks the one whose label matches `key`.
    /// Returns false when no control carries that category.
    pub fn activate(&mut self, key: &str) -> bool {
        let mut found = false;
        for c in self.controls.iter_mut() {
            c.active = !found && c.key() == key;
            found |= c.active;
        }
        found
    }
}

// =============================================================================
// Rendered output
// =============================================================================

#[derive(Debug, Clone, PartialEq)]
pub struct TableRow {
    /// Position of the scheme in the loaded collection.
    pub index: usize,
    pub cells: [String; 6],
}

#[derive(Debug, Clone, PartialEq)]
pub enum TableBody {
    Rows(Vec<TableRow>),
    Empty { message: &'static str, colspan: usize },
}

#[derive(Debug, Clone, PartialEq)]
pub struct TableView {
    pub header: [&'static str; 6],
    pub body: TableBody,
}

impl TableView {
    /// Rendered row count; the empty placeholder counts as one row.
    pub fn row_count(&self) -> usize {
        match &self.body {
            TableBody::Rows(rows) => rows.len(),
            TableBody::Empty { .. } => 1,
        }
    }

    pub fn is_empty(&self) -> bool {
        matches!(self.body, TableBody::Empty { .. })
    }

    /// Collection indices in render order.
    pub fn indices(&self) -> Vec<usize> {
        match &self.body {
            TableBody::Rows(rows) => rows.iter().map(|r| r.index).collect(),
            TableBody::Empty { .. } => Vec::new(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct HighlightCard {
    pub index: usize,
    pub title: String,
    pub provider: String,
    pub one_year: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct DetailModal {
    pub open: bool,
    pub title: String,
    pub provider: String,
    pub body: String,
}

// =============================================================================
// View state
// =============================================================================

#[derive(Debug, Clone)]
pub struct ViewState {
    schemes: Vec<Scheme>,
    active_filter: String,
    active_sort: SortMode,
    query: String,
    filter_bar: FilterBar,
    custom_filters: bool,
    highlight_count: usize,
    highlights: Vec<HighlightCard>,
    modal: DetailModal,
}

impl Default for ViewState {
    fn default() -> Self {
        Self::new(DEFAULT_HIGHLIGHTS)
    }
}

impl ViewState {
    /// The panel never holds more than `DEFAULT_HIGHLIGHTS` cards.
    pub fn new(highlight_count: usize) -> Self {
        let highlight_count = highlight_count.min(DEFAULT_HIGHLIGHTS);
        Self {
            schemes: Vec::new(),
            active_filter: FILTER_ALL.to_string(),
            active_sort: SortMode::default(),
            query: String::new(),
            filter_bar: FilterBar::default(),
            custom_filters: false,
            highlight_count,
            highlights: Vec::new(),
            modal: DetailModal::default(),
        }
    }

    /// Installs a freshly loaded collection and recomputes the highlight
    /// panel. Filter controls are rebuilt from the loaded categories unless
    /// the caller installed its own via `with_filter_labels`.
    pub fn install(&mut self, schemes: Vec<Scheme>) {
        self.schemes = schemes;
        if !self.custom_filters {
            self.filter_bar = FilterBar::from_schemes(&self.schemes);
            self.filter_bar.activate(&self.active_filter);
        }
        self.highlights = self.render_highlights();
    }

    pub fn with_filter_labels<I, S>(mut self, labels: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.filter_bar = FilterBar::new(labels);
        self.custom_filters = true;
        self
    }

    pub fn schemes(&self) -> &[Scheme] {
        &self.schemes
    }

    pub fn active_filter(&self) -> &str {
        &self.active_filter
    }

    pub fn active_sort(&self) -> SortMode {
        self.active_sort
    }

    pub fn query(&self) -> &str {
        &self.query
    }

    pub fn filter_bar(&self) -> &FilterBar {
        &self.filter_bar
    }

    pub fn modal(&self) -> &DetailModal {
        &self.modal
    }

    /// The panel computed at install time. Search, filter and sort changes
    /// never touch it.
    pub fn highlights(&self) -> &[HighlightCard] {
        &self.highlights
    }

    // -------------------------------------------------------------------------
    // User inputs
    // -------------------------------------------------------------------------

    pub fn set_query(&mut self, text: &str) -> TableView {
        self.query = text.to_string();
        self.render_table()
    }

    pub fn set_filter(&mut self, category: &str) -> TableView {
        self.active_filter = category.to_lowercase();
        self.filter_bar.activate(&self.active_filter);
        self.render_table()
    }

    pub fn set_sort(&mut self, mode: SortMode) -> TableView {
        self.active_sort = mode;
        self.render_table()
    }

    pub fn open_detail(&mut self, name: &str, provider: &str) -> &DetailModal {
        self.modal = DetailModal {
            open: true,
            title: name.to_string(),
            provider: provider.to_string(),
            body: DETAIL_PLACEHOLDER.to_string(),
        };
        &self.modal
    }

    /// Opens the modal for a rendered row or card by collection index.
    pub fn open_detail_at(&mut self, index: usize) -> Option<&DetailModal> {
        let scheme = self.schemes.get(index)?;
        let title = format_text(scheme.name.as_deref());
        let provider = scheme.provider.clone();
        Some(self.open_detail(&title, &provider))
    }

    pub fn close_detail(&mut self) {
        self.modal.open = false;
    }

    // -------------------------------------------------------------------------
    // Derivations
    // -------------------------------------------------------------------------

    fn matches(&self, scheme: &Scheme, query: &str) -> bool {
        let matches_search = scheme.name_or_empty().to_lowercase().contains(query)
            || scheme.provider.to_lowercase().contains(query);
        let matches_category = self.active_filter == FILTER_ALL
            || scheme.category_or_empty().to_lowercase() == self.active_filter;
        matches_search && matches_category
    }

    /// Filtered and sorted collection indices.
    pub fn visible(&self) -> Vec<usize> {
        let query = self.query.to_lowercase();
        let mut indices: Vec<usize> = self
            .schemes
            .iter()
            .enumerate()
            .filter(|(_, s)| self.matches(s, &query))
            .map(|(i, _)| i)
            .collect();

        let cmp: fn(&Scheme, &Scheme) -> Ordering = match self.active_sort {
            SortMode::Name => by_name_asc,
            SortMode::Returns => by_return_desc,
        };
        // sort_by is stable: equal keys keep collection order
        indices.sort_by(|&a, &b| cmp(&self.schemes[a], &self.schemes[b]));
        indices
    }

    pub fn render_table(&self) -> TableView {
        let indices = self.visible();
        let body = if indices.is_empty() {
            TableBody::Empty {
                message: EMPTY_MESSAGE,
                colspan: TABLE_HEADER.len(),
            }
        } else {
            TableBody::Rows(
                indices
                    .into_iter()
                    .map(|index| {
                        let s = &self.schemes[index];
                        TableRow {
                            index,
                            cells: [
                                format_text(s.name.as_deref()),
                                s.provider.clone(),
                                format_text(s.category.as_deref()),
                                format_return(s.one_year_return),
                                format_return(s.three_year_return),
                                format_text(s.min_inv.as_deref()),
                            ],
                        }
                    })
                    .collect(),
            )
        };
        TableView {
            header: TABLE_HEADER,
            body,
        }
    }

    pub fn render_highlights(&self) -> Vec<HighlightCard> {
        let mut indices: Vec<usize> = (0..self.schemes.len()).collect();
        indices.sort_by(|&a, &b| by_return_desc(&self.schemes[a], &self.schemes[b]));
        indices
            .into_iter()
            .take(self.highlight_count)
            .map(|index| {
                let s = &self.schemes[index];
                HighlightCard {
                    index,
                    title: format_text(s.name.as_deref()),
                    provider: s.provider.clone(),
                    one_year: format_return(s.one_year_return),
                }
            })
            .collect()
    }
}
