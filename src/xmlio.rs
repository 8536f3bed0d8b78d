//! Question-bank XML import/export of the option record.
//!
//! The exported element is self-contained:
//!
//! ```xml
//! <question type="fileresponse">
//!   <responseformat>plain</responseformat>
//!   <responsefieldlines>10</responsefieldlines>
//!   <attachments>1</attachments>
//!   <forcedownload>0</forcedownload>
//!   <allowpickerplugins>0</allowpickerplugins>
//!   <graderinfo format="html"><text>...</text></graderinfo>
//!   <graderinfoformat>html</graderinfoformat>
//! </question>
//! ```
//!
//! Import tolerates any field being absent (the import defaults apply) but
//! rejects documents that are not a fileresponse question, and malformed
//! field values abort the import instead of being guessed at.

use quick_xml::escape::escape;
use quick_xml::events::Event;
use quick_xml::Reader;
use thiserror::Error;

use crate::domain::{QuestionOptions, ResponseFormat, TextFormat};
use crate::seeds::import_default_options;

#[derive(Debug, Error)]
pub enum XmlError {
    #[error("malformed XML: {0}")]
    Malformed(#[from] quick_xml::Error),
    #[error("not a fileresponse question (type {found:?})")]
    WrongQuestionType { found: String },
    #[error("bad value for <{field}>: {value:?}")]
    BadField { field: &'static str, value: String },
}

/// Serialize the option record for question-bank export.
pub fn export_options_xml(opts: &QuestionOptions) -> String {
    let mut out = String::new();
    out.push_str("<question type=\"fileresponse\">\n");
    out.push_str(&format!(
        "    <responseformat>{}</responseformat>\n",
        opts.response_format.as_str()
    ));
    out.push_str(&format!(
        "    <responsefieldlines>{}</responsefieldlines>\n",
        opts.response_field_lines
    ));
    out.push_str(&format!("    <attachments>{}</attachments>\n", opts.attachments));
    out.push_str(&format!(
        "    <forcedownload>{}</forcedownload>\n",
        opts.force_download as u8
    ));
    out.push_str(&format!(
        "    <allowpickerplugins>{}</allowpickerplugins>\n",
        opts.allow_picker_plugins as u8
    ));
    out.push_str(&format!(
        "    <graderinfo format=\"{}\"><text>{}</text></graderinfo>\n",
        format_name(opts.grader_info_format),
        escape(&opts.grader_info)
    ));
    out.push_str(&format!(
        "    <graderinfoformat>{}</graderinfoformat>\n",
        format_name(opts.grader_info_format)
    ));
    out.push_str("</question>\n");
    out
}

fn format_name(f: TextFormat) -> &'static str {
    match f {
        TextFormat::Html => "html",
        TextFormat::Plain => "plain",
        TextFormat::Markdown => "markdown",
    }
}

/// Accepts both the symbolic names and the numeric backup codes.
fn parse_format(s: &str) -> Option<TextFormat> {
    match s {
        "html" => Some(TextFormat::Html),
        "plain" => Some(TextFormat::Plain),
        "markdown" => Some(TextFormat::Markdown),
        _ => s.parse::<u8>().ok().map(TextFormat::from_code),
    }
}

fn parse_bool(field: &'static str, s: &str) -> Result<bool, XmlError> {
    match s.trim() {
        "0" | "false" | "" => Ok(false),
        "1" | "true" => Ok(true),
        other => Err(XmlError::BadField { field, value: other.to_string() }),
    }
}

/// Parse one exported question element back into an option record,
/// substituting the import defaults for absent fields.
pub fn import_options_xml(xml: &str) -> Result<QuestionOptions, XmlError> {
    let mut reader = Reader::from_str(xml);
    reader.trim_text(true);

    let mut opts = import_default_options();
    let mut saw_root = false;
    // Innermost open element we collect text for.
    let mut field: Option<String> = None;
    let mut in_graderinfo = false;

    loop {
        match reader.read_event()? {
            Event::Start(e) => {
                let name = String::from_utf8_lossy(e.name().as_ref()).to_string();
                if !saw_root {
                    let qtype = e
                        .attributes()
                        .flatten()
                        .find(|a| a.key.as_ref() == b"type")
                        .map(|a| a.unescape_value().map(|v| v.to_string()))
                        .transpose()?
                        .unwrap_or_default();
                    if name != "question" || qtype != "fileresponse" {
                        return Err(XmlError::WrongQuestionType { found: qtype });
                    }
                    saw_root = true;
                    continue;
                }
                if name == "graderinfo" {
                    in_graderinfo = true;
                    if let Some(attr) =
                        e.attributes().flatten().find(|a| a.key.as_ref() == b"format")
                    {
                        let v = attr.unescape_value()?.to_string();
                        opts.grader_info_format = parse_format(&v)
                            .ok_or(XmlError::BadField { field: "graderinfo", value: v })?;
                    }
                    continue;
                }
                field = Some(name);
            }
            Event::Text(t) => {
                let value = t.unescape()?.to_string();
                match field.as_deref() {
                    Some("responseformat") => {
                        opts.response_format = ResponseFormat::parse(&value).ok_or(
                            XmlError::BadField { field: "responseformat", value: value.clone() },
                        )?;
                    }
                    Some("responsefieldlines") => {
                        opts.response_field_lines = value.parse().map_err(|_| {
                            XmlError::BadField { field: "responsefieldlines", value: value.clone() }
                        })?;
                    }
                    Some("attachments") => {
                        opts.attachments = value.parse().map_err(|_| {
                            XmlError::BadField { field: "attachments", value: value.clone() }
                        })?;
                    }
                    Some("forcedownload") => {
                        opts.force_download = parse_bool("forcedownload", &value)?;
                    }
                    Some("allowpickerplugins") => {
                        opts.allow_picker_plugins = parse_bool("allowpickerplugins", &value)?;
                    }
                    Some("text") if in_graderinfo => {
                        opts.grader_info = value;
                    }
                    Some("graderinfoformat") => {
                        opts.grader_info_format = parse_format(&value).ok_or(
                            XmlError::BadField { field: "graderinfoformat", value: value.clone() },
                        )?;
                    }
                    _ => {}
                }
            }
            Event::End(e) => {
                if e.name().as_ref() == b"graderinfo" {
                    in_graderinfo = false;
                }
                field = None;
            }
            Event::Eof => break,
            _ => {}
        }
    }

    if !saw_root {
        return Err(XmlError::WrongQuestionType { found: String::new() });
    }
    Ok(opts)
}
