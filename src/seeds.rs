//! Seed data and defaults for option records.

use crate::domain::{QuestionOptions, ResponseFormat, TextFormat};

/// Defaults synthesized for a question that comes out of a restore without
/// its own option record.
pub fn restore_default_options() -> QuestionOptions {
  QuestionOptions {
    response_format: ResponseFormat::Editor,
    response_field_lines: 15,
    attachments: 0,
    force_download: false,
    allow_picker_plugins: false,
    grader_info: String::new(),
    grader_info_format: TextFormat::Html,
    response_template: String::new(),
    response_template_format: TextFormat::Html,
  }
}

/// Defaults substituted for fields absent from an imported question.
/// Import historically defaults to the plain format with no input box,
/// unlike restore; both are kept as-is.
pub fn import_default_options() -> QuestionOptions {
  QuestionOptions {
    response_format: ResponseFormat::Plain,
    response_field_lines: 0,
    attachments: 0,
    force_download: false,
    allow_picker_plugins: false,
    grader_info: String::new(),
    grader_info_format: TextFormat::Html,
    response_template: String::new(),
    response_template_format: TextFormat::Html,
  }
}

/// Minimal set of built-in questions that make the service usable without
/// external config.
pub fn seed_questions() -> Vec<(u64, QuestionOptions)> {
  vec![
    // One required upload, short plain text box.
    (
      1,
      QuestionOptions {
        response_format: ResponseFormat::Plain,
        response_field_lines: 10,
        attachments: 1,
        force_download: false,
        allow_picker_plugins: false,
        grader_info: "Check the uploaded report for plagiarism first.".into(),
        grader_info_format: TextFormat::Html,
        response_template: String::new(),
        response_template_format: TextFormat::Html,
      },
    ),
    // Three uploads, no text at all.
    (
      2,
      QuestionOptions {
        response_format: ResponseFormat::Plain,
        response_field_lines: 0,
        attachments: 3,
        force_download: true,
        allow_picker_plugins: false,
        grader_info: String::new(),
        grader_info_format: TextFormat::Html,
        response_template: String::new(),
        response_template_format: TextFormat::Html,
      },
    ),
    // Unlimited uploads plus a rich-text answer.
    (
      3,
      QuestionOptions {
        response_format: ResponseFormat::EditorFilepicker,
        response_field_lines: 15,
        attachments: -1,
        force_download: false,
        allow_picker_plugins: true,
        grader_info: String::new(),
        grader_info_format: TextFormat::Html,
        response_template: "Once upon a time".into(),
        response_template_format: TextFormat::Html,
      },
    ),
  ]
}
