//! Public protocol structs for WebSocket and HTTP endpoints (serde ready).
//! Keep this small and stable to evolve backend and frontend independently.

use serde::{Deserialize, Serialize};

use crate::domain::{
    AttachmentsValue, Progress, QuestionOptions, ResponseFormat, StoredFile, SubmissionContext,
};

/// Messages the client can send over WebSocket.
#[derive(Debug, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ClientWsMessage {
    Ping,
    Evaluate {
        context: SubmissionContext,
        #[serde(default)]
        answer: Option<String>,
        #[serde(default)]
        attachments: Option<AttachmentsValue>,
    },
    /// Ask for the progress line only, e.g. after each upload.
    Progress {
        #[serde(rename = "questionId")]
        question_id: u64,
        #[serde(rename = "draftId")]
        draft_id: String,
    },
}

/// Messages the server sends back over WebSocket.
#[derive(Debug, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ServerWsMessage {
    Pong,
    Completeness {
        complete: bool,
        progress: Progress,
        #[serde(rename = "progressText")]
        progress_text: Option<String>,
    },
    Progress {
        progress: Progress,
        #[serde(rename = "progressText")]
        progress_text: Option<String>,
    },
    Error {
        message: String,
    },
}

//
// HTTP request/response DTOs
//

#[derive(Serialize)]
pub struct HealthOut {
    pub ok: bool,
}

/// Option record as accepted on save. Field names mirror the stored record.
#[derive(Debug, Deserialize)]
pub struct OptionsIn {
    pub response_format: ResponseFormat,
    pub response_field_lines: u32,
    pub attachments: i32,
    #[serde(default)]
    pub force_download: bool,
    #[serde(default)]
    pub allow_picker_plugins: bool,
    #[serde(default)]
    pub grader_info: String,
    #[serde(default)]
    pub response_template: String,
}

#[derive(Serialize)]
pub struct OptionsOut {
    #[serde(rename = "questionId")]
    pub question_id: u64,
    #[serde(flatten)]
    pub options: QuestionOptions,
}

#[derive(Debug, Deserialize)]
pub struct EvaluateIn {
    pub context: SubmissionContext,
    #[serde(default)]
    pub answer: Option<String>,
    #[serde(default)]
    pub attachments: Option<AttachmentsValue>,
}

#[derive(Debug, Serialize)]
pub struct EvaluateOut {
    pub complete: bool,
    pub progress: Progress,
    #[serde(rename = "progressText")]
    pub progress_text: Option<String>,
    #[serde(rename = "attachedCount")]
    pub attached_count: u32,
    #[serde(rename = "requiredCount")]
    pub required_count: i32,
}

#[derive(Debug, Deserialize)]
pub struct SameResponseIn {
    #[serde(rename = "questionId")]
    pub question_id: u64,
    #[serde(default)]
    pub prev_answer: Option<String>,
    #[serde(default)]
    pub prev_has_attachments: bool,
    #[serde(default)]
    pub new_answer: Option<String>,
    #[serde(default)]
    pub new_has_attachments: bool,
}

#[derive(Serialize)]
pub struct SameResponseOut {
    pub same: bool,
}

#[derive(Debug, Deserialize)]
pub struct RenderQuery {
    #[serde(default)]
    pub readonly: bool,
    #[serde(rename = "draftId")]
    pub draft_id: Option<String>,
    #[serde(default)]
    pub answer: Option<String>,
    #[serde(rename = "questionText")]
    pub question_text: Option<String>,
}

#[derive(Serialize)]
pub struct RenderOut {
    pub html: String,
}

#[derive(Serialize)]
pub struct XmlOut {
    pub xml: String,
}

#[derive(Debug, Deserialize)]
pub struct ImportIn {
    #[serde(rename = "questionId")]
    pub question_id: u64,
    pub xml: String,
}

#[derive(Debug, Deserialize)]
pub struct RestoreIn {
    /// Ids of all fileresponse questions present in the restored set; those
    /// without a record in `xml` get default options synthesized.
    #[serde(rename = "questionIds")]
    pub question_ids: Vec<u64>,
    pub xml: String,
}

#[derive(Serialize)]
pub struct RestoreOut {
    pub restored: usize,
    pub synthesized: usize,
}

#[derive(Debug, Deserialize)]
pub struct DraftCreateIn {
    #[serde(rename = "userId")]
    pub user_id: u64,
}

#[derive(Serialize)]
pub struct DraftOut {
    #[serde(rename = "draftId")]
    pub draft_id: String,
    #[serde(rename = "saverHandle")]
    pub saver_handle: String,
}

#[derive(Debug, Deserialize)]
pub struct FileIn {
    pub name: String,
    pub size: u64,
    pub mime: String,
}

#[derive(Serialize)]
pub struct FilesOut {
    pub count: usize,
    pub files: Vec<StoredFile>,
}
