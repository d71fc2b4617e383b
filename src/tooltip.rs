//! Shared tooltip overlay
//!
//! There is exactly one overlay per process. It is created lazily on first
//! use, survives across renders and use cases, and is reset (hidden and
//! emptied) whenever a chart surface is torn down. Show/hide calls are not
//! ordered beyond "last call wins".

use parking_lot::Mutex;
use std::fmt;
use std::sync::{Arc, OnceLock};

/// Offset of the overlay from the pointer position, in pixels
pub const POINTER_OFFSET: (f64, f64) = (10.0, -20.0);

/// Handle to an overlay, shared between the surface and whoever draws it
pub type SharedTooltip = Arc<Mutex<TooltipOverlay>>;

static OVERLAY: OnceLock<SharedTooltip> = OnceLock::new();

/// The session-wide overlay
pub fn global() -> SharedTooltip {
    Arc::clone(OVERLAY.get_or_init(|| Arc::new(Mutex::new(TooltipOverlay::default()))))
}

/// `key: value` lines shown for one mark, in binding order.
///
/// A column bound twice (e.g. as axis and in the tooltip list) shows twice.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TooltipContent {
    lines: Vec<(String, String)>,
}

impl TooltipContent {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.lines.push((key.into(), value.into()));
    }

    pub fn lines(&self) -> &[(String, String)] {
        &self.lines
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// Value shown for `key`; the last line wins when a key repeats
    pub fn get(&self, key: &str) -> Option<&str> {
        self.lines
            .iter()
            .rev()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    pub fn to_html(&self) -> String {
        self.lines
            .iter()
            .map(|(k, v)| format!("<strong>{}:</strong> {}", escape_html(k), escape_html(v)))
            .collect::<Vec<_>>()
            .join("<br/>")
    }
}

impl fmt::Display for TooltipContent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, (k, v)) in self.lines.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{}: {}", k, v)?;
        }
        Ok(())
    }
}

/// State of the overlay element.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TooltipOverlay {
    opacity: f64,
    content: TooltipContent,
    position: (f64, f64),
}

impl TooltipOverlay {
    /// Make the overlay visible with `content`, offset from `anchor` (page coordinates)
    pub fn show(&mut self, content: TooltipContent, anchor: (f64, f64)) {
        self.opacity = 1.0;
        self.content = content;
        self.position = (anchor.0 + POINTER_OFFSET.0, anchor.1 + POINTER_OFFSET.1);
    }

    /// Hide the overlay; its content stays until the next `show`
    pub fn hide(&mut self) {
        self.opacity = 0.0;
    }

    /// Back to the initial state, used when a chart is torn down
    pub fn reset(&mut self) {
        *self = Self::default();
    }

    pub fn is_visible(&self) -> bool {
        self.opacity > 0.0
    }

    pub fn opacity(&self) -> f64 {
        self.opacity
    }

    pub fn content(&self) -> &TooltipContent {
        &self.content
    }

    pub fn position(&self) -> (f64, f64) {
        self.position
    }
}

pub(crate) fn escape_html(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}
