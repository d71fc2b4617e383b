// Explorer session: catalog selection -> query -> render -> surface

use crate::catalog::{Catalog, UseCase};
use crate::config::VisualizationDescriptor;
use crate::data::ResultSet;
use crate::details::{UseCaseDetails, NO_VISUALIZATION_MESSAGE};
use crate::error::VizError;
use crate::query::QueryService;
use crate::runtime::{render, RenderOutcome};
use crate::surface::{ChartSurface, LoadTicket};
use crate::tooltip::SharedTooltip;
use crate::RenderOptions;

pub const NOT_FOUND_MESSAGE: &str = "Error: use case not found.";

/// A started load waiting for its query result
#[derive(Debug, Clone)]
pub struct PendingLoad {
    pub ticket: LoadTicket,
    pub query: String,
    pub visualization: VisualizationDescriptor,
    pub title: String,
}

pub struct Explorer<Q> {
    catalog: Catalog,
    query: Q,
    surface: ChartSurface,
    options: RenderOptions,
    active: Option<String>,
}

impl<Q: QueryService> Explorer<Q> {
    pub fn new(catalog: Catalog, query: Q, options: RenderOptions, tooltip: SharedTooltip) -> Self {
        Self {
            catalog,
            query,
            surface: ChartSurface::new(tooltip),
            options,
            active: None,
        }
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    pub fn surface(&self) -> &ChartSurface {
        &self.surface
    }

    pub fn surface_mut(&mut self) -> &mut ChartSurface {
        &mut self.surface
    }

    pub fn options(&self) -> &RenderOptions {
        &self.options
    }

    /// Id of the highlighted navigation entry
    pub fn active_id(&self) -> Option<&str> {
        self.active.as_deref()
    }

    pub fn active(&self) -> Option<&UseCase> {
        self.active.as_deref().and_then(|id| self.catalog.get(id))
    }

    pub fn details(&self) -> Option<UseCaseDetails> {
        self.active().map(|uc| UseCaseDetails::new(&uc.id, &uc.descriptor))
    }

    /// Select `id` and prepare its surface.
    ///
    /// Returns the query to run, or `None` when the surface already shows the
    /// final state (unknown id, no visualization configured).
    pub fn begin_load(&mut self, id: &str) -> Option<PendingLoad> {
        let ticket = self.surface.begin(id);

        let Some(use_case) = self.catalog.get(id) else {
            tracing::warn!(id, "use case not found");
            self.surface.present_error(&ticket, NOT_FOUND_MESSAGE);
            return None;
        };
        self.active = Some(id.to_string());

        let Some(visualization) = use_case.descriptor.visualization.clone() else {
            self.surface.present_placeholder(&ticket, NO_VISUALIZATION_MESSAGE);
            return None;
        };

        Some(PendingLoad {
            ticket,
            query: use_case.descriptor.query.clone(),
            visualization,
            title: use_case.descriptor.name.clone(),
        })
    }

    /// Render a query result for `pending`. Returns false when a newer
    /// selection has superseded it and nothing was drawn.
    pub fn complete_load(&mut self, pending: PendingLoad, result: Result<ResultSet, VizError>) -> bool {
        if !self.surface.is_current(&pending.ticket) {
            tracing::debug!(use_case = pending.ticket.use_case(), "completion superseded");
            return false;
        }
        let outcome = match result {
            Ok(rows) => render(&pending.visualization, &rows, &self.options, &pending.title),
            Err(err) => RenderOutcome::Failed(err),
        };
        self.surface.present(&pending.ticket, outcome)
    }

    /// Begin and complete a load synchronously
    pub fn load(&mut self, id: &str) {
        if let Some(pending) = self.begin_load(id) {
            let result = self.query.execute(&pending.query);
            self.complete_load(pending, result);
        }
    }

    /// Load the first use case of the first category. Returns its id.
    pub fn select_default(&mut self) -> Option<String> {
        let id = self.catalog.default_use_case()?.id.clone();
        self.load(&id);
        Some(id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::UseCase;
    use crate::config::parse;
    use crate::query::{HttpQueryService, StaticQueryService};
    use crate::surface::SurfaceState;
    use crate::tooltip::TooltipOverlay;
    use parking_lot::Mutex;
    use serde_json::json;
    use std::sync::Arc;

    fn use_case(id: &str, raw: serde_json::Value) -> UseCase {
        UseCase { id: id.to_string(), descriptor: parse(&raw.to_string()).unwrap() }
    }

    fn catalog() -> Catalog {
        Catalog::new(vec![
            use_case(
                "spend.json",
                json!({
                    "name": "Spend drop",
                    "description": "d",
                    "category": "Retention",
                    "query": "SELECT range, count FROM spend",
                    "visualization": {"type": "bar", "x_axis": "range", "y_axis": "count"}
                }),
            ),
            use_case(
                "ages.json",
                json!({
                    "name": "Ages",
                    "description": "d",
                    "category": "Growth",
                    "query": "SELECT age, spend FROM orders",
                    "visualization": {"type": "scatter", "x_axis": "age", "y_axis": "spend"}
                }),
            ),
            use_case(
                "notes.json",
                json!({"name": "Notes", "description": "d", "category": "Growth", "query": "SELECT 1"}),
            ),
        ])
    }

    fn queries() -> StaticQueryService {
        StaticQueryService::new()
            .with_result(
                "SELECT range, count FROM spend",
                ResultSet::from_json(&json!([
                    {"range": "0-5%", "count": 20},
                    {"range": "5-10%", "count": 45}
                ]))
                .unwrap(),
            )
            .with_result(
                "SELECT age, spend FROM orders",
                ResultSet::from_json(&json!([{"age": 25, "spend": 40.5}])).unwrap(),
            )
    }

    fn explorer<Q: QueryService>(query: Q) -> Explorer<Q> {
        Explorer::new(
            catalog(),
            query,
            RenderOptions::new(800),
            Arc::new(Mutex::new(TooltipOverlay::default())),
        )
    }

    #[test]
    fn test_default_selection_renders() {
        let mut ex = explorer(queries());
        assert_eq!(ex.select_default().as_deref(), Some("spend.json"));
        assert_eq!(ex.active_id(), Some("spend.json"));
        let scene = ex.surface().scene().unwrap();
        assert_eq!(scene.marks.len(), 2);
        assert_eq!(scene.title, "Spend drop");
    }

    #[test]
    fn test_unknown_use_case() {
        let mut ex = explorer(queries());
        ex.load("spend.json");
        ex.load("nope.json");
        assert_eq!(ex.surface().state(), &SurfaceState::Error(NOT_FOUND_MESSAGE.to_string()));
        assert_eq!(ex.active_id(), Some("spend.json"));
    }

    #[test]
    fn test_missing_visualization_skips_query() {
        // any query would fail with 500 here
        let mut ex = explorer(StaticQueryService::new());
        assert!(ex.begin_load("notes.json").is_none());
        assert_eq!(
            ex.surface().state(),
            &SurfaceState::Placeholder(NO_VISUALIZATION_MESSAGE.to_string())
        );
        assert_eq!(ex.details().map(|d| d.name), Some("Notes".to_string()));
    }

    #[test]
    fn test_stale_completion_is_discarded() {
        let mut ex = explorer(queries());
        let first = ex.begin_load("spend.json").unwrap();
        let second = ex.begin_load("ages.json").unwrap();

        let late = queries().execute(&first.query);
        assert!(!ex.complete_load(first, late));
        assert!(matches!(ex.surface().state(), SurfaceState::Loading { .. }));

        let rows = queries().execute(&second.query);
        assert!(ex.complete_load(second, rows));
        assert_eq!(ex.surface().scene().map(|s| s.title.as_str()), Some("Ages"));
    }

    #[test]
    fn test_query_failure_shows_inline_error() {
        let mut ex = explorer(StaticQueryService::new());
        ex.load("spend.json");
        let SurfaceState::Error(text) = ex.surface().state() else {
            panic!("expected inline error");
        };
        assert!(text.contains("500"));

        // the rest of the session keeps working
        let mut ex = Explorer::new(
            ex.catalog().clone(),
            queries(),
            RenderOptions::new(800),
            ex.surface().tooltip().clone(),
        );
        ex.load("ages.json");
        assert!(ex.surface().scene().is_some());
    }

    #[test]
    fn test_http_500_shows_inline_error() {
        let base = crate::test_http::serve(|_| (500, r#"{"error": "boom"}"#.to_string()));
        let query = HttpQueryService::new(&format!("{}/query-bigquery", base)).unwrap();
        let mut ex = explorer(query);
        ex.load("spend.json");
        let SurfaceState::Error(text) = ex.surface().state() else {
            panic!("expected inline error");
        };
        assert_eq!(text, "Error visualizing data: query execution failed with HTTP status 500");
        assert_eq!(ex.catalog().len(), 3);
    }

    #[test]
    fn test_empty_result() {
        let mut ex = explorer(StaticQueryService::always(ResultSet::default()));
        ex.load("ages.json");
        assert_eq!(
            ex.surface().state(),
            &SurfaceState::Placeholder(crate::runtime::EMPTY_MESSAGE.to_string())
        );
    }
}
