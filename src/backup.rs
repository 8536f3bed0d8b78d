//! Backup/restore serialization of option records.
//!
//! Backup emits one attribute-keyed `<fileresponse>` element per question,
//! nested under a `<plugin_qtype_fileresponse_question>` container:
//!
//! ```xml
//! <plugin_qtype_fileresponse_question>
//!   <fileresponse id="12" responseformat="editor" responsefieldlines="15"
//!       attachments="0" graderinfo="" graderinfoformat="1"
//!       responsetemplate="" responsetemplateformat="1"/>
//! </plugin_qtype_fileresponse_question>
//! ```
//!
//! Text formats travel as their numeric codes here, unlike import/export.
//! A record missing `responsetemplate`/`responsetemplateformat` (old backup
//! data) restores with the empty template and HTML format.

use quick_xml::escape::escape;
use quick_xml::events::Event;
use quick_xml::Reader;

use crate::domain::{QuestionOptions, ResponseFormat, TextFormat};
use crate::xmlio::XmlError;

const CONTAINER: &str = "plugin_qtype_fileresponse_question";

/// One restored (question id, option record) pair.
#[derive(Clone, Debug)]
pub struct BackupRecord {
    pub question_id: u64,
    pub options: QuestionOptions,
}

/// Serialize one question's record as its backup element.
pub fn backup_element(question_id: u64, opts: &QuestionOptions) -> String {
    format!(
        r#"<fileresponse id="{}" responseformat="{}" responsefieldlines="{}" attachments="{}" graderinfo="{}" graderinfoformat="{}" responsetemplate="{}" responsetemplateformat="{}"/>"#,
        question_id,
        opts.response_format.as_str(),
        opts.response_field_lines,
        opts.attachments,
        escape(&opts.grader_info),
        opts.grader_info_format.code(),
        escape(&opts.response_template),
        opts.response_template_format.code(),
    )
}

/// Serialize a whole set of records as one backup document.
pub fn backup_document(records: &[(u64, QuestionOptions)]) -> String {
    let mut out = String::new();
    out.push_str(&format!("<{}>\n", CONTAINER));
    for (id, opts) in records {
        out.push_str("  ");
        out.push_str(&backup_element(*id, opts));
        out.push('\n');
    }
    out.push_str(&format!("</{}>\n", CONTAINER));
    out
}

/// Parse a backup document back into records. Unknown elements are skipped;
/// malformed attribute values abort the restore.
pub fn parse_backup_document(xml: &str) -> Result<Vec<BackupRecord>, XmlError> {
    let mut reader = Reader::from_str(xml);
    reader.trim_text(true);
    let mut records = Vec::new();

    loop {
        match reader.read_event()? {
            Event::Start(e) | Event::Empty(e) => {
                if e.name().as_ref() != b"fileresponse" {
                    continue;
                }
                let mut question_id: Option<u64> = None;
                let mut opts = QuestionOptions {
                    response_format: ResponseFormat::Editor,
                    response_field_lines: 15,
                    attachments: 0,
                    force_download: false,
                    allow_picker_plugins: false,
                    grader_info: String::new(),
                    grader_info_format: TextFormat::Html,
                    response_template: String::new(),
                    response_template_format: TextFormat::Html,
                };
                for attr in e.attributes() {
                    let attr = attr.map_err(quick_xml::Error::from)?;
                    let value = attr.unescape_value()?.to_string();
                    match attr.key.as_ref() {
                        b"id" => {
                            question_id = Some(value.parse().map_err(|_| {
                                XmlError::BadField { field: "id", value: value.clone() }
                            })?);
                        }
                        b"responseformat" => {
                            opts.response_format =
                                ResponseFormat::parse(&value).ok_or(XmlError::BadField {
                                    field: "responseformat",
                                    value: value.clone(),
                                })?;
                        }
                        b"responsefieldlines" => {
                            opts.response_field_lines = value.parse().map_err(|_| {
                                XmlError::BadField {
                                    field: "responsefieldlines",
                                    value: value.clone(),
                                }
                            })?;
                        }
                        b"attachments" => {
                            opts.attachments = value.parse().map_err(|_| {
                                XmlError::BadField { field: "attachments", value: value.clone() }
                            })?;
                        }
                        b"graderinfo" => opts.grader_info = value,
                        b"graderinfoformat" => {
                            opts.grader_info_format = parse_code("graderinfoformat", &value)?;
                        }
                        b"responsetemplate" => opts.response_template = value,
                        b"responsetemplateformat" => {
                            opts.response_template_format =
                                parse_code("responsetemplateformat", &value)?;
                        }
                        _ => {}
                    }
                }
                let question_id = question_id.ok_or(XmlError::BadField {
                    field: "id",
                    value: "(missing)".to_string(),
                })?;
                records.push(BackupRecord { question_id, options: opts });
            }
            Event::Eof => break,
            _ => {}
        }
    }
    Ok(records)
}

fn parse_code(field: &'static str, value: &str) -> Result<TextFormat, XmlError> {
    value
        .parse::<u8>()
        .map(TextFormat::from_code)
        .map_err(|_| XmlError::BadField { field, value: value.to_string() })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> QuestionOptions {
        QuestionOptions {
            response_format: ResponseFormat::Monospaced,
            response_field_lines: 20,
            attachments: -1,
            force_download: false,
            allow_picker_plugins: true,
            grader_info: "Run the code & check <output>.".into(),
            grader_info_format: TextFormat::Html,
            response_template: "fn main() {}".into(),
            response_template_format: TextFormat::Plain,
        }
    }

    #[test]
    fn backup_then_restore_roundtrips_the_record() {
        let doc = backup_document(&[(12, sample())]);
        let records = parse_backup_document(&doc).unwrap();
        assert_eq!(records.len(), 1);
        let r = &records[0];
        assert_eq!(r.question_id, 12);
        assert_eq!(r.options.response_format, ResponseFormat::Monospaced);
        assert_eq!(r.options.response_field_lines, 20);
        assert_eq!(r.options.attachments, -1);
        assert_eq!(r.options.grader_info, "Run the code & check <output>.");
        assert_eq!(r.options.response_template, "fn main() {}");
        assert_eq!(r.options.response_template_format, TextFormat::Plain);
    }

    #[test]
    fn old_records_without_template_fields_get_defaults() {
        let doc = r#"<plugin_qtype_fileresponse_question>
            <fileresponse id="3" responseformat="plain" responsefieldlines="5"
                attachments="1" graderinfo="" graderinfoformat="1"/>
        </plugin_qtype_fileresponse_question>"#;
        let records = parse_backup_document(doc).unwrap();
        assert_eq!(records[0].options.response_template, "");
        assert_eq!(records[0].options.response_template_format, TextFormat::Html);
    }

    #[test]
    fn unknown_format_codes_read_as_html() {
        let doc = r#"<fileresponse id="3" graderinfoformat="9"/>"#;
        let records = parse_backup_document(doc).unwrap();
        assert_eq!(records[0].options.grader_info_format, TextFormat::Html);
    }

    #[test]
    fn record_without_id_is_rejected() {
        let doc = r#"<fileresponse responseformat="plain"/>"#;
        assert!(matches!(
            parse_backup_document(doc).unwrap_err(),
            XmlError::BadField { field: "id", .. }
        ));
    }

    #[test]
    fn foreign_elements_are_skipped() {
        let doc = r#"<backup><other x="1"/><fileresponse id="4"/></backup>"#;
        let records = parse_backup_document(doc).unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].question_id, 4);
    }
}
