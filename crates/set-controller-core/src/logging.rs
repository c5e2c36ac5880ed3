//! Logging and debugging facilities for Set Controller.
//!
//! This module provides:
//! - Target and span names for filtering the `tracing` output of each subsystem
//! - A performance span guard for timing recompute cycles
//! - Shared formatting options for the tree-style debug dumps
//!
//! # Tracing Integration
//!
//! Set Controller uses the `tracing` crate for instrumentation. To see logs,
//! install a tracing subscriber in your application:
//!
//! ```ignore
//! use tracing_subscriber::EnvFilter;
//!
//! fn main() {
//!     tracing_subscriber::fmt()
//!         .with_env_filter(EnvFilter::new("set_controller=debug"))
//!         .init();
//! }
//! ```

/// Span names used throughout Set Controller for tracing.
pub mod span_names {
    /// One recompute-and-notify cycle.
    pub const RECOMPUTE: &str = "set_controller::recompute";
    /// Initial query.
    pub const QUERY: &str = "set_controller::query";
    /// Projection computation.
    pub const PROJECTION: &str = "set_controller::projection";
    /// Diff computation.
    pub const DIFF: &str = "set_controller::diff";
}

/// `tracing` targets, one per subsystem.
///
/// Filter with directives such as `set_controller::diff=trace`.
pub mod targets {
    /// Core primitives target.
    pub const CORE: &str = "set_controller_core";
    /// Signal connect, emit and disconnect.
    pub const SIGNAL: &str = "set_controller_core::signal";
    /// Attribute value changes.
    pub const PROPERTY: &str = "set_controller_core::property";
    /// Observable set target.
    pub const SET: &str = "set_controller_core::set";
    /// Controller lifecycle and recompute cycles.
    pub const CONTROLLER: &str = "set_controller::controller";
    /// Projection engine.
    pub const PROJECTION: &str = "set_controller::projection";
    /// Diff engine.
    pub const DIFF: &str = "set_controller::diff";
    /// Subscription registry.
    pub const REGISTRY: &str = "set_controller::registry";
    /// Query and recompute timing spans.
    pub const PERF: &str = "set_controller::perf";
}

/// Style options for tree visualization.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TreeStyle {
    /// `|--` and `` `-- `` connectors.
    Ascii,
    /// `├──` and `└──` connectors.
    #[default]
    Unicode,
    /// Compact single-line-per-node representation.
    Compact,
}

impl TreeStyle {
    /// Connector strings `(branch, last_branch)` for this style.
    pub fn connectors(&self) -> (&'static str, &'static str) {
        match self {
            TreeStyle::Ascii => ("+-- ", "`-- "),
            TreeStyle::Unicode => ("\u{251c}\u{2500}\u{2500} ", "\u{2514}\u{2500}\u{2500} "),
            TreeStyle::Compact => ("- ", "- "),
        }
    }

    /// Indentation `(open, closed)` under a branch that has, or lacks, a
    /// following sibling.
    pub fn continuation(&self) -> (&'static str, &'static str) {
        match self {
            TreeStyle::Ascii => ("|   ", "    "),
            TreeStyle::Unicode => ("\u{2502}   ", "    "),
            TreeStyle::Compact => ("  ", "  "),
        }
    }
}

/// Configuration for tree debug output.
#[derive(Debug, Clone)]
pub struct TreeFormatOptions {
    /// Connector style.
    pub style: TreeStyle,
    /// Whether to show item counts on inner nodes.
    pub show_counts: bool,
    /// Whether to show leaf nodes at all.
    pub show_leaves: bool,
    /// Maximum number of leaves printed per node (None for unlimited).
    pub max_leaves: Option<usize>,
}

impl Default for TreeFormatOptions {
    fn default() -> Self {
        Self {
            style: TreeStyle::default(),
            show_counts: true,
            show_leaves: true,
            max_leaves: None,
        }
    }
}

impl TreeFormatOptions {
    /// Counts and every leaf, unicode connectors.
    pub fn detailed() -> Self {
        Self::default()
    }

    /// Create options for minimal output (inner nodes only).
    pub fn minimal() -> Self {
        Self {
            show_counts: false,
            show_leaves: false,
            ..Default::default()
        }
    }

    /// Set the style.
    pub fn style(mut self, style: TreeStyle) -> Self {
        self.style = style;
        self
    }

    /// Limit the number of leaves printed per node.
    pub fn max_leaves(mut self, max: usize) -> Self {
        self.max_leaves = Some(max);
        self
    }
}

/// Keeps a `perf` span on [`targets::PERF`] entered until dropped, so a
/// subscriber with span timings can report how long a query or recompute took.
///
/// ```ignore
/// let _perf = PerfSpan::new(span_names::RECOMPUTE);
/// ```
pub struct PerfSpan {
    #[allow(dead_code)]
    span: tracing::span::EnteredSpan,
}

impl PerfSpan {
    /// Enter a debug span for `name`. It closes when the guard drops.
    pub fn new(name: &'static str) -> Self {
        let span = tracing::debug_span!(target: targets::PERF, "perf", operation = name);
        Self {
            span: span.entered(),
        }
    }
}
