//! HTTP endpoint handlers. These are thin wrappers that forward to core logic.
//! Each handler is instrumented and logs include parameters and basic result info.

use std::sync::Arc;
use axum::{
  extract::{Path, Query, State},
  http::StatusCode,
  response::{IntoResponse, Response},
  Json,
};
use tracing::{info, instrument, warn};

use crate::domain::{QuestionOptions, StoredFile, TextFormat};
use crate::logic::{self, LogicError};
use crate::protocol::*;
use crate::state::{AppState, StoreError};

/// Error wrapper mapping core errors onto HTTP statuses.
pub struct ApiError(LogicError);

impl<E: Into<LogicError>> From<E> for ApiError {
  fn from(e: E) -> Self { ApiError(e.into()) }
}

impl IntoResponse for ApiError {
  fn into_response(self) -> Response {
    let status = match &self.0 {
      LogicError::Store(StoreError::MissingOptionsRecord { .. }) => StatusCode::NOT_FOUND,
      LogicError::Store(StoreError::UnknownSaverHandle { .. }) => StatusCode::NOT_FOUND,
      LogicError::Store(StoreError::UnknownDraftArea { .. }) => StatusCode::NOT_FOUND,
      LogicError::Store(StoreError::InvalidOptions { .. }) => StatusCode::UNPROCESSABLE_ENTITY,
      LogicError::Eval(_) => StatusCode::UNPROCESSABLE_ENTITY,
      LogicError::Xml(_) => StatusCode::UNPROCESSABLE_ENTITY,
    };
    let message = self.0.to_string();
    warn!(target: "fileresponse_backend", status = %status, %message, "Request failed");
    (status, Json(serde_json::json!({ "message": message }))).into_response()
  }
}

#[instrument(level = "info")]
pub async fn http_health() -> impl IntoResponse { Json(HealthOut { ok: true }) }

#[instrument(level = "info", skip(state), fields(question_id = %id))]
pub async fn http_get_options(
  State(state): State<Arc<AppState>>,
  Path(id): Path<u64>,
) -> Result<Json<OptionsOut>, ApiError> {
  let options = state.require_options(id).await?;
  Ok(Json(OptionsOut { question_id: id, options }))
}

#[instrument(level = "info", skip(state, body), fields(question_id = %id, attachments = body.attachments))]
pub async fn http_post_options(
  State(state): State<Arc<AppState>>,
  Path(id): Path<u64>,
  Json(body): Json<OptionsIn>,
) -> Result<Json<OptionsOut>, ApiError> {
  let options = QuestionOptions {
    response_format: body.response_format,
    response_field_lines: body.response_field_lines,
    attachments: body.attachments,
    force_download: body.force_download,
    allow_picker_plugins: body.allow_picker_plugins,
    grader_info: body.grader_info,
    grader_info_format: TextFormat::Html,
    response_template: body.response_template,
    response_template_format: TextFormat::Html,
  };
  state.save_options(id, options.clone()).await?;
  info!(target: "fileresponse", question_id = id, "Options saved");
  Ok(Json(OptionsOut { question_id: id, options }))
}

#[instrument(level = "info", skip(state), fields(question_id = %id))]
pub async fn http_delete_options(
  State(state): State<Arc<AppState>>,
  Path(id): Path<u64>,
) -> impl IntoResponse {
  if state.delete_options(id).await {
    StatusCode::NO_CONTENT
  } else {
    StatusCode::NOT_FOUND
  }
}

#[instrument(level = "info", skip(state, body), fields(question_id = body.context.question_id))]
pub async fn http_post_evaluate(
  State(state): State<Arc<AppState>>,
  Json(body): Json<EvaluateIn>,
) -> Result<Json<EvaluateOut>, ApiError> {
  let out =
    logic::evaluate_submission(&state, body.context, body.answer, body.attachments).await?;
  Ok(Json(out))
}

#[instrument(level = "info", skip(state, body), fields(question_id = body.question_id))]
pub async fn http_post_same_response(
  State(state): State<Arc<AppState>>,
  Json(body): Json<SameResponseIn>,
) -> Result<Json<SameResponseOut>, ApiError> {
  let same = logic::same_response_check(
    &state,
    body.question_id,
    body.prev_answer.as_deref(),
    body.prev_has_attachments,
    body.new_answer.as_deref(),
    body.new_has_attachments,
  )
  .await?;
  Ok(Json(SameResponseOut { same }))
}

#[instrument(level = "info", skip(state, q), fields(question_id = %id))]
pub async fn http_get_render(
  State(state): State<Arc<AppState>>,
  Path(id): Path<u64>,
  Query(q): Query<RenderQuery>,
) -> Result<Json<RenderOut>, ApiError> {
  let html = logic::render_question(&state, id, q).await?;
  Ok(Json(RenderOut { html }))
}

#[instrument(level = "info", skip(state), fields(question_id = %id))]
pub async fn http_get_export(
  State(state): State<Arc<AppState>>,
  Path(id): Path<u64>,
) -> Result<Json<XmlOut>, ApiError> {
  let xml = logic::export_question(&state, id).await?;
  Ok(Json(XmlOut { xml }))
}

#[instrument(level = "info", skip(state, body), fields(question_id = body.question_id))]
pub async fn http_post_import(
  State(state): State<Arc<AppState>>,
  Json(body): Json<ImportIn>,
) -> Result<Json<OptionsOut>, ApiError> {
  logic::import_question(&state, body.question_id, &body.xml).await?;
  let options = state.require_options(body.question_id).await?;
  Ok(Json(OptionsOut { question_id: body.question_id, options }))
}

#[instrument(level = "info", skip(state), fields(question_id = %id))]
pub async fn http_get_backup(
  State(state): State<Arc<AppState>>,
  Path(id): Path<u64>,
) -> Result<Json<XmlOut>, ApiError> {
  let xml = logic::backup_question(&state, id).await?;
  Ok(Json(XmlOut { xml }))
}

#[instrument(level = "info", skip(state, body), fields(questions = body.question_ids.len()))]
pub async fn http_post_restore(
  State(state): State<Arc<AppState>>,
  Json(body): Json<RestoreIn>,
) -> Result<Json<RestoreOut>, ApiError> {
  let (restored, synthesized) =
    logic::restore_questions(&state, &body.question_ids, &body.xml).await?;
  Ok(Json(RestoreOut { restored, synthesized }))
}

#[instrument(level = "info", skip(state), fields(user_id = body.user_id))]
pub async fn http_post_draft(
  State(state): State<Arc<AppState>>,
  Json(body): Json<DraftCreateIn>,
) -> impl IntoResponse {
  let (draft_id, saver_handle) = state.create_draft_area(body.user_id).await;
  Json(DraftOut { draft_id, saver_handle })
}

#[instrument(level = "info", skip(state, body), fields(draft_id = %id, name = %body.name))]
pub async fn http_post_draft_file(
  State(state): State<Arc<AppState>>,
  Path(id): Path<String>,
  Json(body): Json<FileIn>,
) -> Result<Json<FilesOut>, ApiError> {
  let file = StoredFile { name: body.name, size: body.size, mime: body.mime };
  let count = state.attach_file(&id, file).await?;
  let files = state.list_files(&id).await;
  Ok(Json(FilesOut { count, files }))
}

#[instrument(level = "info", skip(state), fields(draft_id = %id))]
pub async fn http_get_draft_files(
  State(state): State<Arc<AppState>>,
  Path(id): Path<String>,
) -> impl IntoResponse {
  let files = state.list_files(&id).await;
  Json(FilesOut { count: files.len(), files })
}
