//! Page template cache.
//!
//! Templates are read from disk and compiled once at startup by
//! [`TemplateCache::load`]. The cache is immutable afterwards and shared
//! between handlers through [`AppState`](crate::api::AppState).

use std::fs;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Datelike, Utc};
use chunkbox_store::Chunk;
use minijinja::{Environment, ErrorKind};
use serde::Serialize;

use crate::api::chunks::ChunkForm;
use crate::error::ServerError;

/// Dynamic data handed to every page template.
#[derive(Debug, Serialize)]
pub struct TemplateData {
    pub current_year: i32,
    pub chunk: Option<Chunk>,
    pub chunks: Vec<Chunk>,
    pub form: ChunkForm,
}

impl Default for TemplateData {
    fn default() -> Self {
        Self {
            current_year: Utc::now().year(),
            chunk: None,
            chunks: Vec::new(),
            form: ChunkForm::default(),
        }
    }
}

/// Compiled page templates keyed by page file name (e.g. `home.html`).
pub struct TemplateCache {
    env: Environment<'static>,
    pages: Vec<String>,
}

impl TemplateCache {
    /// Load `base.html`, `partials/*.html` and `pages/*.html` from `dir`.
    ///
    /// Pages are registered under their file name, partials under
    /// `partials/<file name>`. Any I/O or syntax error aborts loading.
    pub fn load(dir: impl AsRef<Path>) -> Result<Self, ServerError> {
        let dir = dir.as_ref();
        let mut env = Environment::new();
        env.add_filter("human_date", human_date);

        let base = fs::read_to_string(dir.join("base.html"))?;
        env.add_template_owned("base.html", base)?;

        for (name, path) in html_files(&dir.join("partials"))? {
            env.add_template_owned(format!("partials/{name}"), fs::read_to_string(&path)?)?;
        }

        let mut pages = Vec::new();
        for (name, path) in html_files(&dir.join("pages"))? {
            env.add_template_owned(name.clone(), fs::read_to_string(&path)?)?;
            pages.push(name);
        }

        if pages.is_empty() {
            return Err(ServerError::Config(format!(
                "no page templates found in {}",
                dir.join("pages").display()
            )));
        }

        Ok(Self { env, pages })
    }

    /// Names of the loaded pages, sorted.
    pub fn pages(&self) -> &[String] {
        &self.pages
    }

    /// Render a page with the given data.
    pub fn render(&self, page: &str, data: &TemplateData) -> Result<String, ServerError> {
        if !self.pages.iter().any(|p| p == page) {
            return Err(minijinja::Error::new(
                ErrorKind::TemplateNotFound,
                format!("the template {page} does not exist"),
            )
            .into());
        }

        let template = self.env.get_template(page)?;
        Ok(template.render(data)?)
    }
}

/// `*.html` files directly inside `dir`, sorted by name. A missing directory
/// yields no files.
fn html_files(dir: &Path) -> Result<Vec<(String, PathBuf)>, ServerError> {
    if !dir.is_dir() {
        return Ok(Vec::new());
    }

    let mut files = Vec::new();
    for entry in fs::read_dir(dir)? {
        let path = entry?.path();
        if path.extension().is_some_and(|ext| ext == "html") && path.is_file() {
            if let Some(name) = path.file_name().and_then(|n| n.to_str()) {
                files.push((name.to_owned(), path.clone()));
            }
        }
    }
    files.sort();
    Ok(files)
}

/// Format an RFC 3339 timestamp as `02 Jan 2006 at 15:04` (UTC).
///
/// Values that do not parse are passed through unchanged.
#[allow(clippy::needless_pass_by_value)]
fn human_date(value: String) -> String {
    DateTime::parse_from_rfc3339(&value).map_or(value, |t| {
        t.with_timezone(&Utc).format("%d %b %Y at %H:%M").to_string()
    })
}
