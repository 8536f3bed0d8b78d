//! Core behaviors shared by both HTTP and WebSocket handlers.
//!
//! This includes:
//!   - Resolving the tagged attachments reference to a draft area (once,
//!     at this boundary; nothing downstream branches on its origin)
//!   - Evaluating submission completeness and picking the progress text
//!   - The same-response check against the question's response template
//!   - Rendering, import/export and backup/restore round trips

use thiserror::Error;
use tracing::{info, instrument};

use crate::backup::{backup_document, parse_backup_document};
use crate::domain::{AttachmentsValue, Progress, ResponseSubmission, SubmissionContext};
use crate::evaluator::{self, EvalError};
use crate::protocol::{EvaluateOut, RenderQuery};
use crate::render::question_html;
use crate::state::{AppState, StoreError};
use crate::xmlio::{export_options_xml, import_options_xml, XmlError};

#[derive(Debug, Error)]
pub enum LogicError {
  #[error(transparent)]
  Store(#[from] StoreError),
  #[error(transparent)]
  Eval(#[from] EvalError),
  #[error(transparent)]
  Xml(#[from] XmlError),
}

/// Resolve the attachments reference to its draft area, exactly once.
/// `None` (no reference at all) resolves to no draft area, i.e. zero files.
async fn resolve_draft(
  state: &AppState,
  value: Option<&AttachmentsValue>,
) -> Result<Option<String>, LogicError> {
  match value {
    None => Ok(None),
    Some(AttachmentsValue::Saved { draft_id }) => Ok(Some(draft_id.clone())),
    Some(AttachmentsValue::Pending { saver_handle }) => {
      Ok(Some(state.resolve_saver(saver_handle).await?))
    }
  }
}

#[instrument(level = "info", skip(state, answer, attachments),
  fields(question_id = ctx.question_id, user_id = ctx.user_id, step_id = ctx.step_id))]
pub async fn evaluate_submission(
  state: &AppState,
  ctx: SubmissionContext,
  answer: Option<String>,
  attachments: Option<AttachmentsValue>,
) -> Result<EvaluateOut, LogicError> {
  let opts = state.require_options(ctx.question_id).await?;
  let policy = opts.policy()?;

  let draft = resolve_draft(state, attachments.as_ref()).await?;
  let attached = match &draft {
    Some(d) => state.count_files(d).await,
    None => 0,
  };

  let submission = ResponseSubmission::new(answer, attached as i64)?;
  let result = evaluator::evaluate(policy, &submission);
  info!(target: "fileresponse", question_id = ctx.question_id, complete = result.complete,
    attached, required = policy.required_count(), "Submission evaluated");

  Ok(EvaluateOut {
    complete: result.complete,
    progress: result.progress,
    progress_text: state.messages.progress_text(result.progress),
    attached_count: submission.attached_count(),
    required_count: policy.required_count(),
  })
}

/// Progress line only, for widget refreshes while the student uploads.
#[instrument(level = "info", skip(state), fields(%question_id, %draft_id))]
pub async fn progress_for(
  state: &AppState,
  question_id: u64,
  draft_id: &str,
) -> Result<(Progress, Option<String>), LogicError> {
  let opts = state.require_options(question_id).await?;
  let policy = opts.policy()?;
  let attached = state.count_files(draft_id).await;
  let progress = evaluator::progress_of(policy, attached as u32);
  Ok((progress, state.messages.progress_text(progress)))
}

/// Whether two submissions count as the same answer for this question.
#[instrument(level = "info", skip_all, fields(%question_id))]
pub async fn same_response_check(
  state: &AppState,
  question_id: u64,
  prev_answer: Option<&str>,
  prev_has_attachments: bool,
  new_answer: Option<&str>,
  new_has_attachments: bool,
) -> Result<bool, LogicError> {
  let opts = state.require_options(question_id).await?;
  Ok(evaluator::same_response(
    &opts.response_template,
    prev_answer,
    prev_has_attachments,
    new_answer,
    new_has_attachments,
  ))
}

#[instrument(level = "info", skip(state, q), fields(%question_id, readonly = q.readonly))]
pub async fn render_question(
  state: &AppState,
  question_id: u64,
  q: RenderQuery,
) -> Result<String, LogicError> {
  let opts = state.require_options(question_id).await?;
  let policy = opts.policy()?;

  let (files, attached) = match &q.draft_id {
    Some(d) => {
      let files = state.list_files(d).await;
      let n = files.len();
      (files, n)
    }
    None => (Vec::new(), 0),
  };
  let progress = evaluator::progress_of(policy, attached as u32);

  Ok(question_html(
    &opts,
    &state.messages,
    q.question_text.as_deref().unwrap_or(""),
    q.answer.as_deref(),
    &files,
    q.draft_id.as_deref(),
    q.readonly,
    progress,
  ))
}

#[instrument(level = "info", skip(state), fields(%question_id))]
pub async fn export_question(state: &AppState, question_id: u64) -> Result<String, LogicError> {
  let opts = state.require_options(question_id).await?;
  Ok(export_options_xml(&opts))
}

/// Parse an imported question document and store its options. A malformed
/// document aborts before anything is written.
#[instrument(level = "info", skip(state, xml), fields(%question_id, xml_len = xml.len()))]
pub async fn import_question(
  state: &AppState,
  question_id: u64,
  xml: &str,
) -> Result<(), LogicError> {
  let opts = import_options_xml(xml)?;
  state.save_options(question_id, opts).await?;
  info!(target: "fileresponse", %question_id, "Question imported");
  Ok(())
}

#[instrument(level = "info", skip(state), fields(%question_id))]
pub async fn backup_question(state: &AppState, question_id: u64) -> Result<String, LogicError> {
  let opts = state.require_options(question_id).await?;
  Ok(backup_document(&[(question_id, opts)]))
}

/// Restore records from a backup document, then synthesize defaults for
/// restored questions that brought no record along.
#[instrument(level = "info", skip(state, xml), fields(questions = question_ids.len(), xml_len = xml.len()))]
pub async fn restore_questions(
  state: &AppState,
  question_ids: &[u64],
  xml: &str,
) -> Result<(usize, usize), LogicError> {
  let records = parse_backup_document(xml)?;
  // Validate every record up front; a bad policy must not leave the
  // earlier records of the same document behind.
  for record in &records {
    record.options.policy()?;
  }
  let restored = records.len();
  for record in records {
    state.save_options(record.question_id, record.options).await?;
  }
  let synthesized = state.ensure_options_after_restore(question_ids).await;
  info!(target: "fileresponse", restored, synthesized, "Restore processed");
  Ok((restored, synthesized))
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::domain::StoredFile;

  fn ctx(question_id: u64) -> SubmissionContext {
    SubmissionContext { question_id, user_id: 5, step_id: 50 }
  }

  async fn upload(state: &AppState, draft_id: &str, n: usize) {
    for i in 0..n {
      state
        .attach_file(
          draft_id,
          StoredFile { name: format!("f{i}.txt"), size: 1, mime: "text/plain".into() },
        )
        .await
        .unwrap();
    }
  }

  #[tokio::test]
  async fn evaluate_counts_files_from_saved_draft() {
    let state = AppState::new();
    // Seed question 2 requires three files.
    let (draft_id, _) = state.create_draft_area(5).await;
    upload(&state, &draft_id, 2).await;

    let out = evaluate_submission(
      &state,
      ctx(2),
      None,
      Some(AttachmentsValue::Saved { draft_id }),
    )
    .await
    .unwrap();
    assert!(!out.complete);
    assert_eq!(out.attached_count, 2);
    assert_eq!(out.required_count, 3);
    assert_eq!(out.progress_text.as_deref(), Some("2 of 3 files uploaded."));
  }

  #[tokio::test]
  async fn evaluate_resolves_pending_saver_handles() {
    let state = AppState::new();
    let (draft_id, handle) = state.create_draft_area(5).await;
    upload(&state, &draft_id, 1).await;

    let out = evaluate_submission(
      &state,
      ctx(1),
      Some("see attached".into()),
      Some(AttachmentsValue::Pending { saver_handle: handle }),
    )
    .await
    .unwrap();
    assert!(out.complete);
    assert_eq!(out.progress_text.as_deref(), Some("One file uploaded, as required."));
  }

  #[tokio::test]
  async fn evaluate_rejects_unknown_saver_handle() {
    let state = AppState::new();
    let err = evaluate_submission(
      &state,
      ctx(1),
      None,
      Some(AttachmentsValue::Pending { saver_handle: "gone".into() }),
    )
    .await
    .unwrap_err();
    assert!(matches!(err, LogicError::Store(StoreError::UnknownSaverHandle { .. })));
  }

  #[tokio::test]
  async fn evaluate_without_attachments_reference_counts_zero() {
    let state = AppState::new();
    let out = evaluate_submission(&state, ctx(1), Some("text only".into()), None)
      .await
      .unwrap();
    assert!(!out.complete);
    assert_eq!(out.attached_count, 0);
  }

  #[tokio::test]
  async fn same_response_uses_question_template() {
    let state = AppState::new();
    // Seed question 3 carries the template "Once upon a time".
    assert!(same_response_check(&state, 3, None, false, Some("Once upon a time"), false)
      .await
      .unwrap());
    assert!(!same_response_check(&state, 3, None, false, Some("The end"), false)
      .await
      .unwrap());
    // Attachments on either side always differ.
    assert!(!same_response_check(&state, 3, None, true, None, false).await.unwrap());
  }

  #[tokio::test]
  async fn import_export_roundtrip_through_state() {
    let state = AppState::new();
    let xml = export_question(&state, 2).await.unwrap();
    import_question(&state, 900, &xml).await.unwrap();
    let opts = state.require_options(900).await.unwrap();
    assert_eq!(opts.attachments, 3);
  }

  #[tokio::test]
  async fn restore_inserts_records_and_defaults() {
    let state = AppState::new();
    let doc = backup_question(&state, 1).await.unwrap();
    let (restored, synthesized) =
      restore_questions(&state, &[1, 700], &doc).await.unwrap();
    assert_eq!(restored, 1);
    assert_eq!(synthesized, 1);
    assert!(state.get_options(700).await.is_some());
  }

  #[tokio::test]
  async fn restore_with_bad_record_writes_nothing() {
    let state = AppState::new();
    let doc = r#"<plugin_qtype_fileresponse_question>
      <fileresponse id="600" responseformat="plain" responsefieldlines="5" attachments="1"/>
      <fileresponse id="601" responseformat="plain" responsefieldlines="5" attachments="-5"/>
    </plugin_qtype_fileresponse_question>"#;
    let err = restore_questions(&state, &[600, 601], doc).await.unwrap_err();
    assert!(matches!(err, LogicError::Eval(EvalError::InvalidPolicy { required_count: -5 })));
    // The valid first record must not survive the failed document.
    assert!(state.get_options(600).await.is_none());
    assert!(state.get_options(601).await.is_none());
  }

  #[tokio::test]
  async fn render_reflects_upload_progress() {
    let state = AppState::new();
    let (draft_id, _) = state.create_draft_area(5).await;
    upload(&state, &draft_id, 1).await;
    let html = render_question(
      &state,
      2,
      RenderQuery {
        readonly: false,
        draft_id: Some(draft_id),
        answer: None,
        question_text: Some("Hand in three files".into()),
      },
    )
    .await
    .unwrap();
    assert!(html.contains("Hand in three files"));
    assert!(html.contains("One of 3 files uploaded."));
  }
}
