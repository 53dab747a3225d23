use std::collections::BTreeMap;

use axum::Form;
use axum::extract::rejection::QueryRejection;
use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::response::{Html, IntoResponse, Redirect, Response};
use serde::{Deserialize, Serialize};

use chunkbox_store::{NewChunk, StoreError};

use super::AppState;
use crate::error::ServerError;
use crate::templates::TemplateData;

/// Maximum title length accepted from the create form, in characters.
pub const MAX_TITLE_CHARS: usize = 100;

/// Expiry choices offered by the create form, in days.
pub const PERMITTED_EXPIRES: [i64; 3] = [1, 7, 365];

/// Query string of `GET /chunkbox/view`.
#[derive(Debug, Deserialize)]
pub struct ViewParams {
    pub id: Option<String>,
}

/// Body of `POST /chunkbox/create`, and the state the create form is
/// re-rendered with when validation fails.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ChunkForm {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub content: String,
    /// Only the initial render pre-selects an expiry; a submission without
    /// one fails validation.
    #[serde(default)]
    pub expires: String,
    /// Per-field validation messages, keyed by field name.
    #[serde(default, skip_deserializing)]
    pub field_errors: BTreeMap<String, String>,
}

impl Default for ChunkForm {
    fn default() -> Self {
        Self {
            title: String::new(),
            content: String::new(),
            expires: "365".to_owned(),
            field_errors: BTreeMap::new(),
        }
    }
}

impl ChunkForm {
    /// Validate the submitted fields, recording a message per invalid field.
    ///
    /// Returns the chunk to insert when every field is valid.
    pub fn validate(&mut self) -> Option<NewChunk> {
        self.field_errors.clear();

        if self.title.trim().is_empty() {
            self.field_error("title", "This field cannot be blank");
        } else if self.title.chars().count() > MAX_TITLE_CHARS {
            self.field_error(
                "title",
                &format!("This field cannot be more than {MAX_TITLE_CHARS} characters long"),
            );
        }

        if self.content.trim().is_empty() {
            self.field_error("content", "This field cannot be blank");
        }

        let expires = self
            .expires
            .trim()
            .parse::<i64>()
            .ok()
            .filter(|days| PERMITTED_EXPIRES.contains(days));
        if expires.is_none() {
            self.field_error("expires", "This field must equal 1, 7 or 365");
        }

        match expires {
            Some(days) if self.field_errors.is_empty() => {
                Some(NewChunk::new(self.title.clone(), self.content.clone(), days))
            }
            _ => None,
        }
    }

    fn field_error(&mut self, field: &str, message: &str) {
        self.field_errors
            .entry(field.to_owned())
            .or_insert_with(|| message.to_owned());
    }
}

/// Parse a caller-supplied chunk identifier. Only integers `>= 1` are accepted.
pub fn parse_id(raw: Option<&str>) -> Option<i64> {
    raw?.parse::<i64>().ok().filter(|id| *id >= 1)
}

/// `GET /` -- the latest chunks and the create form.
pub async fn home(State(state): State<AppState>) -> Result<Html<String>, ServerError> {
    let chunks = state.store.latest().await?;
    let data = TemplateData {
        chunks,
        ..TemplateData::default()
    };
    Ok(Html(state.templates.render("home.html", &data)?))
}

/// `GET /chunkbox/view?id=N` -- a single visible chunk.
///
/// A query string that does not deserialize (e.g. a repeated `id`) is
/// treated like any other unusable id.
pub async fn view(
    State(state): State<AppState>,
    params: Result<Query<ViewParams>, QueryRejection>,
) -> Result<Html<String>, ServerError> {
    let Ok(Query(params)) = params else {
        return Err(ServerError::NotFound);
    };
    let id = parse_id(params.id.as_deref()).ok_or(ServerError::NotFound)?;
    let chunk = state.store.get(id).await?;

    let data = TemplateData {
        chunk: Some(chunk),
        ..TemplateData::default()
    };
    Ok(Html(state.templates.render("view.html", &data)?))
}

/// `POST /chunkbox/create` -- insert a chunk and redirect to it.
///
/// Invalid submissions re-render the home page with `422` and the
/// submitted values preserved.
pub async fn create(
    State(state): State<AppState>,
    Form(mut form): Form<ChunkForm>,
) -> Result<Response, ServerError> {
    let Some(new_chunk) = form.validate() else {
        return rerender_form(&state, form).await;
    };

    match state.store.insert(new_chunk).await {
        Ok(id) => Ok(Redirect::to(&format!("/chunkbox/view?id={id}")).into_response()),
        Err(StoreError::InvalidArgument(msg)) => {
            form.field_errors.insert("form".to_owned(), msg);
            rerender_form(&state, form).await
        }
        Err(e) => Err(e.into()),
    }
}

async fn rerender_form(state: &AppState, form: ChunkForm) -> Result<Response, ServerError> {
    let chunks = state.store.latest().await?;
    let data = TemplateData {
        chunks,
        form,
        ..TemplateData::default()
    };
    let html = state.templates.render("home.html", &data)?;
    Ok((StatusCode::UNPROCESSABLE_ENTITY, Html(html)).into_response())
}
