//! Server-side page rendering.
//!
//! Pages are minijinja templates. The set shipped in `views/` is compiled into
//! the binary; pointing the renderer at a directory replaces them wholesale,
//! which keeps template edits a restart away instead of a rebuild away.

use minijinja::value::Value;
use minijinja::{AutoEscape, Environment, Error, ErrorKind, Output, State};
use serde::Serialize;
use std::fmt;
use std::path::{Path, PathBuf};
use tracing::{debug, error};

const EMBEDDED: &[(&str, &str)] = &[
    ("layout.html", include_str!("../views/layout.html")),
    ("index.html", include_str!("../views/index.html")),
    ("page1.html", include_str!("../views/page1.html")),
    ("page2.html", include_str!("../views/page2.html")),
    ("page3.html", include_str!("../views/page3.html")),
    ("page4.html", include_str!("../views/page4.html")),
    ("notFound.html", include_str!("../views/notFound.html")),
];

/// The pages this service knows how to render.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum View {
    Index,
    Page1,
    Page2,
    Page3,
    Page4,
    NotFound,
}

impl View {
    pub const ALL: [View; 6] = [
        View::Index,
        View::Page1,
        View::Page2,
        View::Page3,
        View::Page4,
        View::NotFound,
    ];

    #[must_use]
    pub fn template(self) -> &'static str {
        match self {
            View::Index => "index.html",
            View::Page1 => "page1.html",
            View::Page2 => "page2.html",
            View::Page3 => "page3.html",
            View::Page4 => "page4.html",
            View::NotFound => "notFound.html",
        }
    }
}

#[derive(Debug)]
pub enum ViewError {
    /// A template failed to load, parse, or render.
    Template {
        template: &'static str,
        source: minijinja::Error,
    },
    /// The configured views directory does not exist.
    MissingDirectory(PathBuf),
}

impl fmt::Display for ViewError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ViewError::Template { template, source } => {
                write!(f, "template '{template}' failed: {source}")
            }
            ViewError::MissingDirectory(dir) => {
                write!(f, "views directory '{}' does not exist", dir.display())
            }
        }
    }
}

impl std::error::Error for ViewError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ViewError::Template { source, .. } => Some(source),
            ViewError::MissingDirectory(_) => None,
        }
    }
}

/// Like minijinja's default HTML formatter, but leaves `/` alone so echoed
/// URLs stay readable.
fn html_formatter(out: &mut Output<'_>, state: &State<'_, '_>, value: &Value) -> Result<(), Error> {
    match value.as_str() {
        Some(text) if !value.is_safe() && matches!(state.auto_escape(), AutoEscape::Html) => {
            write_escaped(out, text)
                .map_err(|_| Error::new(ErrorKind::WriteFailure, "failed to write output"))
        }
        _ => minijinja::escape_formatter(out, state, value),
    }
}

fn write_escaped(out: &mut impl fmt::Write, text: &str) -> fmt::Result {
    let mut last = 0;
    for (idx, ch) in text.char_indices() {
        let entity = match ch {
            '&' => "&amp;",
            '<' => "&lt;",
            '>' => "&gt;",
            '"' => "&quot;",
            '\'' => "&#x27;",
            _ => continue,
        };
        out.write_str(&text[last..idx])?;
        out.write_str(entity)?;
        last = idx + 1;
    }
    out.write_str(&text[last..])
}

fn new_environment() -> Environment<'static> {
    let mut env = Environment::new();
    env.set_formatter(html_formatter);
    env
}

pub struct ViewRenderer {
    env: Environment<'static>,
}

impl ViewRenderer {
    /// Renderer over the templates compiled into the binary.
    pub fn embedded() -> Result<Self, ViewError> {
        let mut env = new_environment();
        for &(name, body) in EMBEDDED {
            env.add_template(name, body)
                .map_err(|source| ViewError::Template {
                    template: name,
                    source,
                })?;
        }
        Ok(Self { env })
    }

    /// Renderer loading templates from `dir`. Every [`View`] must resolve.
    pub fn from_dir(dir: impl AsRef<Path>) -> Result<Self, ViewError> {
        let dir = dir.as_ref();
        if !dir.is_dir() {
            return Err(ViewError::MissingDirectory(dir.to_path_buf()));
        }
        let mut env = new_environment();
        env.set_loader(minijinja::path_loader(dir));
        for view in View::ALL {
            env.get_template(view.template())
                .map_err(|source| ViewError::Template {
                    template: view.template(),
                    source,
                })?;
        }
        debug!(dir = %dir.display(), "Loaded views from directory");
        Ok(Self { env })
    }

    /// Render `view` with `ctx` as its template context.
    pub fn render<S: Serialize>(&self, view: View, ctx: S) -> Result<String, ViewError> {
        let template = view.template();
        self.env
            .get_template(template)
            .and_then(|tpl| tpl.render(ctx))
            .map_err(|source| {
                error!(template, error = %source, "View render failed");
                ViewError::Template { template, source }
            })
    }
}
