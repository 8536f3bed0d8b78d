//! Domain models: response formats, attachment policy, question options,
//! submissions and the completeness result.

use serde::{Deserialize, Serialize};

/// How the text portion of the answer is edited/displayed.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResponseFormat {
  /// Plain textarea, proportional font.
  Plain,
  /// Plain textarea, monospaced font (e.g. for code answers).
  Monospaced,
  /// Rich-text editor without the file picker.
  Editor,
  /// Rich-text editor with the file picker enabled.
  EditorFilepicker,
}
impl Default for ResponseFormat {
  fn default() -> Self { ResponseFormat::Plain }
}

impl ResponseFormat {
  pub fn as_str(&self) -> &'static str {
    match self {
      ResponseFormat::Plain => "plain",
      ResponseFormat::Monospaced => "monospaced",
      ResponseFormat::Editor => "editor",
      ResponseFormat::EditorFilepicker => "editorfilepicker",
    }
  }

  /// Parse the wire/XML name. Unknown names are `None`; callers decide the default.
  pub fn parse(s: &str) -> Option<Self> {
    match s {
      "plain" => Some(ResponseFormat::Plain),
      "monospaced" => Some(ResponseFormat::Monospaced),
      "editor" => Some(ResponseFormat::Editor),
      "editorfilepicker" => Some(ResponseFormat::EditorFilepicker),
      _ => None,
    }
  }
}

/// Text markup format carried next to rich-text fields.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TextFormat {
  Html,
  Plain,
  Markdown,
}
impl Default for TextFormat {
  fn default() -> Self { TextFormat::Html }
}

impl TextFormat {
  /// Numeric code used by backup records.
  pub fn code(&self) -> u8 {
    match self {
      TextFormat::Html => 1,
      TextFormat::Plain => 2,
      TextFormat::Markdown => 4,
    }
  }

  /// Backup records carry numeric codes; anything unknown reads as HTML.
  pub fn from_code(code: u8) -> Self {
    match code {
      2 => TextFormat::Plain,
      4 => TextFormat::Markdown,
      _ => TextFormat::Html,
    }
  }
}

/// How many files a submission must include.
/// `-1` = unlimited but at least one, `0` = none accepted, `n > 0` = exactly n.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttachmentPolicy {
  required_count: i32,
}

impl AttachmentPolicy {
  pub fn new(required_count: i32) -> Result<Self, crate::evaluator::EvalError> {
    if required_count < -1 {
      return Err(crate::evaluator::EvalError::InvalidPolicy { required_count });
    }
    Ok(Self { required_count })
  }

  pub fn required_count(&self) -> i32 { self.required_count }

  pub fn is_unlimited(&self) -> bool { self.required_count == -1 }
}

/// One student submission, as seen by a single evaluation call.
/// Not persisted; identifiers travel in [`SubmissionContext`].
#[derive(Clone, Debug)]
pub struct ResponseSubmission {
  pub text: Option<String>,
  attached_count: u32,
}

impl ResponseSubmission {
  /// Wire counts are signed; a negative count is rejected here rather than
  /// silently clamped.
  pub fn new(text: Option<String>, attached_count: i64) -> Result<Self, crate::evaluator::EvalError> {
    if attached_count < 0 {
      return Err(crate::evaluator::EvalError::InvalidSubmission { attached_count });
    }
    Ok(Self { text, attached_count: attached_count as u32 })
  }

  pub fn attached_count(&self) -> u32 { self.attached_count }
}

/// Identifiers owning a submission. Passed explicitly with every evaluation
/// request; nothing reconstructs them from store lookups.
#[derive(Clone, Copy, Debug, Serialize, Deserialize)]
pub struct SubmissionContext {
  pub question_id: u64,
  pub user_id: u64,
  pub step_id: u64,
}

/// Origin of a submission's attachments reference, tagged instead of
/// inspected at runtime. `Saved` already points at a draft area; `Pending`
/// still carries the file-saver handle and is resolved once at the boundary.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum AttachmentsValue {
  Saved { draft_id: String },
  Pending { saver_handle: String },
}

/// Metadata of one file sitting in a draft area. Contents stay with the host
/// file storage; we only ever count and list.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct StoredFile {
  pub name: String,
  pub size: u64,
  pub mime: String,
}

/// The option record persisted per question (fixed shape, see xmlio/backup).
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct QuestionOptions {
  pub response_format: ResponseFormat,
  pub response_field_lines: u32,
  /// The attachment policy count (-1 unlimited, 0 none, n exact).
  pub attachments: i32,
  pub force_download: bool,
  pub allow_picker_plugins: bool,
  pub grader_info: String,
  pub grader_info_format: TextFormat,
  pub response_template: String,
  pub response_template_format: TextFormat,
}

impl QuestionOptions {
  pub fn policy(&self) -> Result<AttachmentPolicy, crate::evaluator::EvalError> {
    AttachmentPolicy::new(self.attachments)
  }
}

/// Mutually exclusive progress states for the upload widget. Selection is
/// pure; the human-readable texts live in `config::Messages`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum Progress {
  /// Nothing worth reporting (no files against an unlimited or zero policy).
  Nothing,
  /// One file uploaded, unlimited allowed.
  OneUnlimited,
  /// N files uploaded; also covers the more-than-required anomaly.
  Uploaded { count: u32 },
  NoneOfOne,
  OneOfOne,
  NoneOfN { required: u32 },
  OneOfN { required: u32 },
  KOfN { count: u32, required: u32 },
}

/// Output of one completeness evaluation.
#[derive(Clone, Copy, Debug, Serialize)]
pub struct CompletenessResult {
  pub complete: bool,
  pub progress: Progress,
}
