use crate::config::UseCaseDescriptor;
use crate::parser::{parse_markup, Document};
use crate::tooltip::escape_html;

pub const NO_VISUALIZATION_MESSAGE: &str = "No visualization configuration found for this use case.";

/// Everything shown above the chart for the selected use case
#[derive(Debug, Clone, PartialEq)]
pub struct UseCaseDetails {
    pub id: String,
    pub name: String,
    pub category: String,
    pub description: String,
    pub insights: Document,
    pub query: String,
    /// Chart type when a visualization is configured
    pub chart: Option<String>,
}

impl UseCaseDetails {
    pub fn new(id: &str, descriptor: &UseCaseDescriptor) -> Self {
        Self {
            id: id.to_string(),
            name: descriptor.name.clone(),
            category: descriptor.category.clone(),
            description: descriptor.description.clone(),
            insights: parse_markup(&descriptor.insights),
            query: descriptor.query.trim().to_string(),
            chart: descriptor
                .visualization
                .as_ref()
                .and_then(|v| v.kind.as_ref())
                .map(|k| k.to_string()),
        }
    }

    pub fn to_text(&self) -> String {
        let mut out = String::new();
        out.push_str(&self.name);
        out.push('\n');
        out.push_str(&"=".repeat(self.name.chars().count()));
        out.push_str("\n\n");
        if !self.category.is_empty() {
            out.push_str(&format!("Category: {}\n", self.category));
        }
        out.push_str(&format!("Description: {}\n\n", self.description));

        let insights = self.insights.to_plain();
        if !insights.is_empty() {
            out.push_str("Insights:\n");
            out.push_str(&insights);
            out.push_str("\n\n");
        }

        out.push_str("Query:\n");
        for line in self.query.lines() {
            out.push_str("    ");
            out.push_str(line);
            out.push('\n');
        }
        out.push('\n');

        match &self.chart {
            Some(kind) => out.push_str(&format!("Visualization: {}\n", kind)),
            None => {
                out.push_str(NO_VISUALIZATION_MESSAGE);
                out.push('\n');
            }
        }
        out
    }

    /// HTML fragment; the chart itself goes into the `visualization` container
    pub fn to_html(&self) -> String {
        format!(
            "<h2>{name}</h2>\
             <p><strong>Description:</strong> {description}</p>\
             <div class=\"insights-content\"><strong>Insights:</strong> {insights}</div>\
             <h3>SQL Query:</h3>\
             <div class=\"query-container\"><pre><code class=\"language-sql\">{query}</code></pre></div>\
             <h3>Visualization:</h3>\
             <div class=\"visualization-container\" data-use-case=\"{id}\"></div>",
            name = escape_html(&self.name),
            description = escape_html(&self.description),
            insights = self.insights.to_html(),
            query = escape_html(&self.query),
            id = escape_html(&self.id),
        )
    }
}
