//! Loading service configuration (progress messages + optional question bank)
//! from TOML.
//!
//! See `BankConfig` and `Messages` for the expected schema.

use serde::Deserialize;
use tracing::{error, info};

use crate::domain::{Progress, QuestionOptions, ResponseFormat, TextFormat};
use crate::util::fill_template;

#[derive(Clone, Debug, Deserialize, Default)]
pub struct BankConfig {
  #[serde(default)]
  pub messages: Messages,
  #[serde(default)]
  pub questions: Vec<QuestionCfg>,
}

/// Question entry accepted in TOML configuration. Absent fields take the
/// same defaults as question-bank import.
#[derive(Clone, Debug, Deserialize)]
pub struct QuestionCfg {
  pub id: u64,
  #[serde(default)] pub response_format: Option<ResponseFormat>,
  #[serde(default)] pub response_field_lines: Option<u32>,
  #[serde(default)] pub attachments: Option<i32>,
  #[serde(default)] pub force_download: Option<bool>,
  #[serde(default)] pub allow_picker_plugins: Option<bool>,
  #[serde(default)] pub grader_info: Option<String>,
  #[serde(default)] pub response_template: Option<String>,
}

impl QuestionCfg {
  pub fn into_options(self) -> QuestionOptions {
    QuestionOptions {
      response_format: self.response_format.unwrap_or_default(),
      response_field_lines: self.response_field_lines.unwrap_or(0),
      attachments: self.attachments.unwrap_or(0),
      force_download: self.force_download.unwrap_or(false),
      allow_picker_plugins: self.allow_picker_plugins.unwrap_or(false),
      grader_info: self.grader_info.unwrap_or_default(),
      grader_info_format: TextFormat::Html,
      response_template: self.response_template.unwrap_or_default(),
      response_template_format: TextFormat::Html,
    }
  }
}

/// Texts shown next to the upload widget. Defaults are the canonical English
/// strings; override them in TOML to localize or re-word.
///
/// `{count}` is the number of uploaded files, `{required}` the policy count.
#[derive(Clone, Debug, Deserialize)]
pub struct Messages {
  // Expected-attachments line
  pub one_attachment_expected: String,
  pub n_attachments_expected: String,
  // Progress line
  pub one_uploaded_unlimited: String,
  pub n_uploaded: String,
  pub none_of_one_uploaded: String,
  pub one_of_one_uploaded: String,
  pub none_of_n_uploaded: String,
  pub one_of_n_uploaded: String,
  pub k_of_n_uploaded: String,
}

impl Default for Messages {
  fn default() -> Self {
    Self {
      one_attachment_expected: "You have to upload one file.".into(),
      n_attachments_expected: "You have to upload {required} files.".into(),
      one_uploaded_unlimited: "One file uploaded.".into(),
      n_uploaded: "{count} files uploaded.".into(),
      none_of_one_uploaded: "No file uploaded yet. One file required.".into(),
      one_of_one_uploaded: "One file uploaded, as required.".into(),
      none_of_n_uploaded: "No file uploaded yet. {required} files required.".into(),
      one_of_n_uploaded: "One of {required} files uploaded.".into(),
      k_of_n_uploaded: "{count} of {required} files uploaded.".into(),
    }
  }
}

impl Messages {
  /// Render the progress state to its display text. `None` means nothing is
  /// worth reporting for this state.
  pub fn progress_text(&self, progress: Progress) -> Option<String> {
    match progress {
      Progress::Nothing => None,
      Progress::OneUnlimited => Some(self.one_uploaded_unlimited.clone()),
      Progress::Uploaded { count } => {
        Some(fill_template(&self.n_uploaded, &[("count", &count.to_string())]))
      }
      Progress::NoneOfOne => Some(self.none_of_one_uploaded.clone()),
      Progress::OneOfOne => Some(self.one_of_one_uploaded.clone()),
      Progress::NoneOfN { required } => {
        Some(fill_template(&self.none_of_n_uploaded, &[("required", &required.to_string())]))
      }
      Progress::OneOfN { required } => {
        Some(fill_template(&self.one_of_n_uploaded, &[("required", &required.to_string())]))
      }
      Progress::KOfN { count, required } => Some(fill_template(
        &self.k_of_n_uploaded,
        &[("count", &count.to_string()), ("required", &required.to_string())],
      )),
    }
  }

  /// The "how many files this question expects" line. Unlimited policies
  /// show nothing; the widget itself communicates that uploads are open.
  pub fn expected_text(&self, required_count: i32) -> Option<String> {
    match required_count {
      -1 | 0 => None,
      1 => Some(self.one_attachment_expected.clone()),
      n => Some(fill_template(&self.n_attachments_expected, &[("required", &n.to_string())])),
    }
  }
}

/// Attempt to load `BankConfig` from BANK_CONFIG_PATH. On any parsing/IO
/// error, returns None and the built-in defaults apply.
pub fn load_bank_config_from_env() -> Option<BankConfig> {
  let path = std::env::var("BANK_CONFIG_PATH").ok()?;
  match std::fs::read_to_string(&path) {
    Ok(s) => match toml::from_str::<BankConfig>(&s) {
      Ok(cfg) => {
        info!(target: "fileresponse_backend", %path, "Loaded bank config (TOML)");
        Some(cfg)
      }
      Err(e) => {
        error!(target: "fileresponse_backend", %path, error = %e, "Failed to parse TOML config");
        None
      }
    },
    Err(e) => {
      error!(target: "fileresponse_backend", %path, error = %e, "Failed to read TOML config file");
      None
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn progress_texts_embed_the_actual_counts() {
    let m = Messages::default();
    assert_eq!(m.progress_text(Progress::Nothing), None);
    assert_eq!(
      m.progress_text(Progress::KOfN { count: 2, required: 3 }).unwrap(),
      "2 of 3 files uploaded."
    );
    assert_eq!(m.progress_text(Progress::Uploaded { count: 5 }).unwrap(), "5 files uploaded.");
    assert_eq!(
      m.progress_text(Progress::NoneOfN { required: 3 }).unwrap(),
      "No file uploaded yet. 3 files required."
    );
    assert_eq!(
      m.progress_text(Progress::NoneOfOne).unwrap(),
      "No file uploaded yet. One file required."
    );
    assert_eq!(m.progress_text(Progress::OneOfOne).unwrap(), "One file uploaded, as required.");
  }

  #[test]
  fn expected_text_only_for_precise_counts() {
    let m = Messages::default();
    assert_eq!(m.expected_text(-1), None);
    assert_eq!(m.expected_text(0), None);
    assert_eq!(m.expected_text(1).unwrap(), "You have to upload one file.");
    assert_eq!(m.expected_text(3).unwrap(), "You have to upload 3 files.");
  }

  #[test]
  fn bank_config_parses_with_overrides() {
    let cfg: BankConfig = toml::from_str(
      r#"
      [messages]
      one_attachment_expected = "Bitte eine Datei hochladen."
      n_attachments_expected = "Bitte {required} Dateien hochladen."
      one_uploaded_unlimited = "Eine Datei hochgeladen."
      n_uploaded = "{count} Dateien hochgeladen."
      none_of_one_uploaded = "Noch keine Datei hochgeladen."
      one_of_one_uploaded = "Eine Datei hochgeladen."
      none_of_n_uploaded = "Noch keine von {required} Dateien."
      one_of_n_uploaded = "Eine von {required} Dateien."
      k_of_n_uploaded = "{count} von {required} Dateien."

      [[questions]]
      id = 7
      attachments = 2
      response_field_lines = 10
      "#,
    )
    .unwrap();
    assert_eq!(cfg.questions.len(), 1);
    let opts = cfg.questions[0].clone().into_options();
    assert_eq!(opts.attachments, 2);
    assert_eq!(opts.response_field_lines, 10);
    assert_eq!(opts.response_format, ResponseFormat::Plain);
    assert_eq!(
      cfg.messages.progress_text(Progress::KOfN { count: 1, required: 2 }).unwrap(),
      "1 von 2 Dateien."
    );
  }
}
