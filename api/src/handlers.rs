//! Route handlers. Each request runs exactly one render pass against the
//! caller's session.

use std::sync::Arc;

use axum::extract::{Multipart, State};
use axum::http::StatusCode;
use axum::response::Html;
use axum::{Form, Json};
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use serde::Deserialize;
use uuid::Uuid;

use crate::error::ApiError;
use crate::page::render_page;
use crate::render::{render, Interaction};
use crate::session::UploadedFile;
use crate::state::AppState;
use crate::view::PageView;

pub const SESSION_COOKIE: &str = "rag_chat_session";

#[derive(Debug, Deserialize)]
pub struct ChatForm {
    #[serde(default)]
    pub message: String,
}

async fn run_pass(app: &AppState, jar: CookieJar, interaction: Interaction) -> (CookieJar, PageView) {
    let cookie_id = jar
        .get(SESSION_COOKIE)
        .and_then(|cookie| Uuid::parse_str(cookie.value()).ok());
    let (id, session) = app.sessions.get_or_create(cookie_id);

    let view = {
        let mut state = session.lock().await;
        render(&mut state, interaction, &app.services).await
    };

    // No expiry: the cookie lives as long as the browser session.
    let jar = if cookie_id == Some(id) {
        jar
    } else {
        jar.add(
            Cookie::build((SESSION_COOKIE, id.to_string()))
                .path("/")
                .http_only(true)
                .same_site(SameSite::Lax),
        )
    };

    (jar, view)
}

async fn page(app: &AppState, jar: CookieJar, interaction: Interaction) -> (CookieJar, Html<String>) {
    let (jar, view) = run_pass(app, jar, interaction).await;
    (jar, Html(render_page(&view)))
}

pub async fn index(State(app): State<AppState>, jar: CookieJar) -> (CookieJar, Html<String>) {
    page(&app, jar, Interaction::Refresh).await
}

pub async fn upload(
    State(app): State<AppState>,
    jar: CookieJar,
    mut multipart: Multipart,
) -> Result<(CookieJar, Html<String>), ApiError> {
    let mut selected = None;

    while let Some(field) = multipart.next_field().await? {
        if field.name() != Some("file") {
            continue;
        }
        let name = field.file_name().unwrap_or_default().to_string();
        let bytes = field.bytes().await?;
        // Browsers send an empty part when no file was picked.
        if name.is_empty() && bytes.is_empty() {
            continue;
        }
        selected = Some(UploadedFile::new(name, bytes));
    }

    let file = selected.ok_or_else(|| ApiError::BadRequest("no file was uploaded".to_string()))?;
    Ok(page(&app, jar, Interaction::SelectFile(file)).await)
}

pub async fn remove(State(app): State<AppState>, jar: CookieJar) -> (CookieJar, Html<String>) {
    page(&app, jar, Interaction::RemoveFile).await
}

pub async fn initialize(State(app): State<AppState>, jar: CookieJar) -> (CookieJar, Html<String>) {
    page(&app, jar, Interaction::Initialize).await
}

pub async fn chat(
    State(app): State<AppState>,
    jar: CookieJar,
    Form(form): Form<ChatForm>,
) -> (CookieJar, Html<String>) {
    page(&app, jar, Interaction::Submit(form.message)).await
}

pub async fn session(State(app): State<AppState>, jar: CookieJar) -> (CookieJar, Json<PageView>) {
    let (jar, view) = run_pass(&app, jar, Interaction::Refresh).await;
    (jar, Json(view))
}

pub async fn health() -> Json<serde_json::Value> {
    Json(serde_json::json!({ "status": "ok" }))
}

/// Every route while the server runs without a usable configuration.
pub async fn halted(State(message): State<Arc<str>>) -> (StatusCode, Html<String>) {
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Html(render_page(&PageView::halted(message.as_ref()))),
    )
}
