//! The catalog page controller: loads the scheme list once and drives the
//! view state in response to user input.

use crate::catalog::view::{DetailModal, HighlightCard, SortMode, TableView, ViewState};
use crate::feed::{CatalogError, CatalogSource};
use crate::logging::{log_catalog_failed, log_catalog_loaded, log_render, ProfileScope};

/// Result of `CatalogViewer::load`. A failed load leaves the view empty and
/// hands the error back so the caller can offer a retry.
#[derive(Debug)]
pub enum LoadOutcome {
    Loaded { schemes: usize, skipped: usize },
    Failed(CatalogError),
}

impl LoadOutcome {
    pub fn is_loaded(&self) -> bool {
        matches!(self, LoadOutcome::Loaded { .. })
    }
}

/// First render after a load: the highlight panel and the table.
#[derive(Debug, Clone)]
pub struct InitialRender {
    pub highlights: Vec<HighlightCard>,
    pub table: TableView,
}

pub struct CatalogViewer {
    state: ViewState,
}

impl Default for CatalogViewer {
    fn default() -> Self {
        Self::new(ViewState::default())
    }
}

impl CatalogViewer {
    pub fn new(state: ViewState) -> Self {
        Self { state }
    }

    pub fn state(&self) -> &ViewState {
        &self.state
    }

    pub async fn load<S>(&mut self, source: &S) -> (LoadOutcome, InitialRender)
    where
        S: CatalogSource + ?Sized,
    {
        let outcome = {
            let _scope = ProfileScope::new("catalog_load");
            match source.fetch().await {
                Ok(doc) => {
                    log_catalog_loaded(&source.describe(), doc.schemes.len(), doc.skipped, &doc.digest);
                    let outcome = LoadOutcome::Loaded {
                        schemes: doc.schemes.len(),
                        skipped: doc.skipped,
                    };
                    self.state.install(doc.schemes);
                    outcome
                }
                Err(err) => {
                    log_catalog_failed(&source.describe(), &err.to_string());
                    self.state.install(Vec::new());
                    LoadOutcome::Failed(err)
                }
            }
        };
        let render = InitialRender {
            highlights: self.render_highlights(),
            table: self.render_table(),
        };
        (outcome, render)
    }

    pub fn render_highlights(&self) -> Vec<HighlightCard> {
        let cards = self.state.highlights().to_vec();
        log_render("highlights", cards.len(), "", "returns", "");
        cards
    }

    pub fn render_table(&self) -> TableView {
        let table = self.state.render_table();
        self.log_table(&table);
        table
    }

    pub fn search(&mut self, text: &str) -> TableView {
        let table = self.state.set_query(text);
        self.log_table(&table);
        table
    }

    pub fn set_filter(&mut self, category: &str) -> TableView {
        let table = self.state.set_filter(category);
        self.log_table(&table);
        table
    }

    pub fn set_sort(&mut self, mode: SortMode) -> TableView {
        let table = self.state.set_sort(mode);
        self.log_table(&table);
        table
    }

    pub fn open_detail(&mut self, name: &str, provider: &str) -> &DetailModal {
        self.state.open_detail(name, provider)
    }

    pub fn open_detail_at(&mut self, index: usize) -> Option<&DetailModal> {
        self.state.open_detail_at(index)
    }

    pub fn close_detail(&mut self) {
        self.state.close_detail();
    }

    fn log_table(&self, table: &TableView) {
        log_render(
            "table",
            table.row_count(),
            self.state.active_filter(),
            self.state.active_sort().as_str(),
            self.state.query(),
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::feed::{FileCatalog, StaticCatalog};

    #[tokio::test]
    async fn load_installs_and_renders_once() {
        let src = StaticCatalog::new(
            r#"{"schemes":[{"name":"Alpha","provider":"P1","one_year_return":12},
                           {"name":"Beta","provider":"P2","one_year_return":18}]}"#,
        );
        let mut viewer = CatalogViewer::default();
        let (outcome, render) = viewer.load(&src).await;
        assert!(outcome.is_loaded());
        assert_eq!(render.highlights.len(), 2);
        assert_eq!(render.table.indices(), vec![1, 0]);
    }

    #[tokio::test]
    async fn failed_load_is_typed_and_renders_placeholder() {
        let mut viewer = CatalogViewer::default();
        let (outcome, render) = viewer.load(&FileCatalog::new("/missing.json")).await;
        assert!(matches!(outcome, LoadOutcome::Failed(CatalogError::File { .. })));
        assert!(render.highlights.is_empty());
        assert!(render.table.is_empty());
        assert_eq!(render.table.row_count(), 1);
    }
}
