//! Tree rendering of projections for diagnostics.
//!
//! ```ignore
//! use set_controller::debug::ProjectionDebug;
//!
//! let debug = ProjectionDebug::new(|friend: &Friend| friend.name.get());
//! println!("{}", debug.format(&controller.projection()));
//! ```
//!
//! produces
//!
//! ```text
//! Projection (2 sections, 3 objects)
//! ├── blue (2)
//! │   ├── Ann
//! │   └── Bob
//! └── (unnamed) (1)
//!     └── Cy
//! ```

use std::fmt;
use std::sync::Arc;

use set_controller_core::{TreeFormatOptions, TreeStyle};

use crate::projection::Projection;

type LabelFn<T> = Arc<dyn Fn(&T) -> String + Send + Sync>;

/// Renders a [`Projection`] as an indented tree.
pub struct ProjectionDebug<T> {
    options: TreeFormatOptions,
    label: LabelFn<T>,
}

impl<T> ProjectionDebug<T> {
    /// Create a renderer that labels members with `label`.
    pub fn new<F>(label: F) -> Self
    where
        F: Fn(&T) -> String + Send + Sync + 'static,
    {
        Self {
            options: TreeFormatOptions::default(),
            label: Arc::new(label),
        }
    }

    /// Use custom formatting options.
    pub fn with_options(mut self, options: TreeFormatOptions) -> Self {
        self.options = options;
        self
    }

    /// Render `projection`.
    pub fn format(&self, projection: &Projection<T>) -> String {
        Tree {
            debug: self,
            projection,
        }
        .to_string()
    }
}

impl<T> Clone for ProjectionDebug<T> {
    fn clone(&self) -> Self {
        Self {
            options: self.options.clone(),
            label: self.label.clone(),
        }
    }
}

impl<T> fmt::Debug for ProjectionDebug<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ProjectionDebug")
            .field("options", &self.options)
            .finish_non_exhaustive()
    }
}

struct Tree<'a, T> {
    debug: &'a ProjectionDebug<T>,
    projection: &'a Projection<T>,
}

impl<T> fmt::Display for Tree<'_, T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let options = &self.debug.options;
        let (branch, last_branch) = options.style.connectors();
        let (open, closed) = options.style.continuation();

        writeln!(
            f,
            "Projection ({} sections, {} objects)",
            self.projection.section_count(),
            self.projection.object_count()
        )?;
        if self.projection.section_count() == 0 {
            return writeln!(f, "  (empty)");
        }

        let sections = self.projection.sections();
        for (s, section) in sections.iter().enumerate() {
            let last_section = s + 1 == sections.len();
            let name = section.name().unwrap_or("(unnamed)");
            write!(f, "{}{}", if last_section { last_branch } else { branch }, name)?;
            if options.show_counts {
                write!(f, " ({})", section.number_of_objects())?;
            }
            writeln!(f)?;

            if !options.show_leaves {
                continue;
            }
            let indent = if last_section { closed } else { open };
            let objects = section.objects();
            let shown = options
                .max_leaves
                .map_or(objects.len(), |max| max.min(objects.len()));
            let hidden = objects.len() - shown;

            for (i, object) in objects[..shown].iter().enumerate() {
                let last_line = i + 1 == shown && hidden == 0;
                let connector = if last_line { last_branch } else { branch };
                writeln!(f, "{indent}{connector}{}", (self.debug.label)(object))?;
            }
            if hidden > 0 {
                writeln!(f, "{indent}{last_branch}... ({hidden} more)")?;
            }
        }
        Ok(())
    }
}

/// Shorthand for rendering with a given style and default options.
pub fn format_projection<T, F>(projection: &Projection<T>, style: TreeStyle, label: F) -> String
where
    F: Fn(&T) -> String + Send + Sync + 'static,
{
    ProjectionDebug::new(label)
        .with_options(TreeFormatOptions::default().style(style))
        .format(projection)
}
