// Query execution service

use crate::data::ResultSet;
use crate::error::{Result, VizError};
use std::collections::HashMap;
use std::time::Duration;

pub const DEFAULT_QUERY_ENDPOINT: &str = "http://localhost:3000/query-bigquery";

/// Runs a SQL text and returns its rows.
pub trait QueryService {
    fn execute(&self, query: &str) -> Result<ResultSet>;
}

/// POSTs `{"query": ...}` to an HTTP endpoint which answers with a JSON
/// array of row objects. Queries may run long, so no client timeout is set.
pub struct HttpQueryService {
    endpoint: String,
    client: reqwest::blocking::Client,
}

impl HttpQueryService {
    pub fn new(endpoint: &str) -> Result<Self> {
        let client = reqwest::blocking::Client::builder()
            .timeout(None::<Duration>)
            .build()
            .map_err(|e| VizError::QueryUnavailable(e.to_string()))?;
        Ok(Self { endpoint: endpoint.to_string(), client })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

impl QueryService for HttpQueryService {
    fn execute(&self, query: &str) -> Result<ResultSet> {
        if query.trim().is_empty() {
            // the service would reject it with 400; skip the round trip
            return Err(VizError::QueryExecutionFailed { status: 400 });
        }

        tracing::debug!(endpoint = %self.endpoint, "executing query");
        let response = self
            .client
            .post(&self.endpoint)
            .json(&serde_json::json!({ "query": query }))
            .send()
            .map_err(|e| VizError::QueryUnavailable(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            tracing::warn!(status = status.as_u16(), "query execution failed");
            return Err(VizError::QueryExecutionFailed { status: status.as_u16() });
        }

        let body: serde_json::Value = response
            .json()
            .map_err(|e| VizError::QueryUnavailable(format!("invalid response body: {}", e)))?;
        let rows = ResultSet::from_json(&body)
            .map_err(|e| VizError::QueryUnavailable(format!("invalid response body: {:#}", e)))?;
        tracing::debug!(rows = rows.len(), "query returned");
        Ok(rows)
    }
}

/// Canned results keyed by query text, with an optional fallback.
#[derive(Debug, Clone, Default)]
pub struct StaticQueryService {
    results: HashMap<String, ResultSet>,
    fallback: Option<ResultSet>,
}

impl StaticQueryService {
    pub fn new() -> Self {
        Self::default()
    }

    /// Answer every query with `rows`
    pub fn always(rows: ResultSet) -> Self {
        Self { results: HashMap::new(), fallback: Some(rows) }
    }

    pub fn with_result(mut self, query: &str, rows: ResultSet) -> Self {
        self.results.insert(query.trim().to_string(), rows);
        self
    }
}

impl QueryService for StaticQueryService {
    fn execute(&self, query: &str) -> Result<ResultSet> {
        let query = query.trim();
        if query.is_empty() {
            return Err(VizError::QueryExecutionFailed { status: 400 });
        }
        self.results
            .get(query)
            .or(self.fallback.as_ref())
            .cloned()
            .ok_or(VizError::QueryExecutionFailed { status: 500 })
    }
}

impl<Q: QueryService + ?Sized> QueryService for &Q {
    fn execute(&self, query: &str) -> Result<ResultSet> {
        (**self).execute(query)
    }
}

impl<Q: QueryService + ?Sized> QueryService for Box<Q> {
    fn execute(&self, query: &str) -> Result<ResultSet> {
        (**self).execute(query)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_http;
    use serde_json::json;

    fn rows() -> ResultSet {
        ResultSet::from_json(&json!([{"a": 1}])).unwrap()
    }

    #[test]
    fn test_static_lookup_and_fallback() {
        let svc = StaticQueryService::new().with_result("SELECT 1", rows());
        assert_eq!(svc.execute("  SELECT 1\n").unwrap().len(), 1);
        assert_eq!(
            svc.execute("SELECT 2").unwrap_err(),
            VizError::QueryExecutionFailed { status: 500 }
        );

        let always = StaticQueryService::always(ResultSet::default());
        assert!(always.execute("anything").unwrap().is_empty());
    }

    #[test]
    fn test_empty_query_is_rejected() {
        let svc = StaticQueryService::always(rows());
        assert_eq!(svc.execute("   ").unwrap_err(), VizError::QueryExecutionFailed { status: 400 });

        let http = HttpQueryService::new(DEFAULT_QUERY_ENDPOINT).unwrap();
        assert_eq!(http.execute("").unwrap_err(), VizError::QueryExecutionFailed { status: 400 });
    }

    #[test]
    fn test_http_error_status() {
        let base = test_http::serve(|_| (500, r#"{"error": "Failed to execute query"}"#.to_string()));
        let http = HttpQueryService::new(&format!("{}/query-bigquery", base)).unwrap();
        assert_eq!(
            http.execute("SELECT 1").unwrap_err(),
            VizError::QueryExecutionFailed { status: 500 }
        );
    }

    #[test]
    fn test_http_rows() {
        let base = test_http::serve(|req| {
            let body: serde_json::Value = serde_json::from_str(&req.body).unwrap_or_default();
            if req.method == "POST" && req.path == "/query-bigquery" && body["query"] == "SELECT range, count" {
                (200, r#"[{"range": "0-5%", "count": 20}, {"range": "5-10%", "count": 45}]"#.to_string())
            } else {
                (400, "{}".to_string())
            }
        });
        let http = HttpQueryService::new(&format!("{}/query-bigquery", base)).unwrap();
        let rows = http.execute("SELECT range, count").unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows.columns(), vec!["range", "count"]);
        assert_eq!(rows.rows[1]["count"].as_f64(), Some(45.0));
    }

    #[test]
    fn test_http_body_not_rows() {
        let base = test_http::serve(|_| (200, r#"{"rows": []}"#.to_string()));
        let http = HttpQueryService::new(&base).unwrap();
        assert!(matches!(http.execute("SELECT 1"), Err(VizError::QueryUnavailable(_))));
    }

    #[test]
    fn test_unreachable_endpoint() {
        // port 9 (discard) is closed on test hosts
        let http = HttpQueryService::new("http://127.0.0.1:9/query-bigquery").unwrap();
        assert!(matches!(http.execute("SELECT 1"), Err(VizError::QueryUnavailable(_))));
    }
}
