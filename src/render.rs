//! HTML rendering of the question: response area per configured format,
//! expected/progress lines and the upload widget.
//!
//! Each response format is one independent implementation of
//! [`FormatRenderer`]; there is deliberately no inheritance between the
//! variants (monospaced is not "plain with a twist", the filepicker editor
//! is not "editor plus"). The host page wires real editors/pickers to the
//! emitted markup.

use crate::config::Messages;
use crate::domain::{Progress, QuestionOptions, ResponseFormat, StoredFile};
use crate::util::escape_html;

/// The common contract of all response-format variants.
pub trait FormatRenderer {
    /// Specific class added to the response element.
    fn class_name(&self) -> &'static str;

    /// Render the student's response when the question is in read-only mode.
    fn render_readonly(&self, name: &str, text: &str, lines: u32) -> String;

    /// Render the editable response area. `draft_id` is only meaningful for
    /// variants that embed a file picker.
    fn render_input(&self, name: &str, text: &str, lines: u32, draft_id: Option<&str>) -> String;
}

pub fn renderer_for(format: ResponseFormat) -> &'static dyn FormatRenderer {
    match format {
        ResponseFormat::Plain => &PlainRenderer,
        ResponseFormat::Monospaced => &MonospacedRenderer,
        ResponseFormat::Editor => &EditorRenderer,
        ResponseFormat::EditorFilepicker => &EditorFilepickerRenderer,
    }
}

fn textarea(class: &str, name_attr: Option<&str>, text: &str, lines: u32, readonly: bool) -> String {
    let mut attrs = format!(r#"class="{} fileresponse_response" rows="{}" cols="60""#, class, lines);
    if let Some(name) = name_attr {
        attrs.push_str(&format!(r#" name="{}""#, escape_html(name)));
    }
    if readonly {
        attrs.push_str(r#" readonly="readonly""#);
    }
    format!("<textarea {}>{}</textarea>", attrs, escape_html(text))
}

fn hidden_input(name: &str, value: &str) -> String {
    format!(
        r#"<input type="hidden" name="{}" value="{}" />"#,
        escape_html(name),
        escape_html(value)
    )
}

/// Plain input box, proportional font.
pub struct PlainRenderer;

impl FormatRenderer for PlainRenderer {
    fn class_name(&self) -> &'static str { "fileresponse_plain" }

    fn render_readonly(&self, _name: &str, text: &str, lines: u32) -> String {
        textarea(self.class_name(), None, text, lines, true)
    }

    fn render_input(&self, name: &str, text: &str, lines: u32, _draft_id: Option<&str>) -> String {
        let mut out = textarea(self.class_name(), Some(name), text, lines, false);
        out.push_str(&hidden_input(&format!("{}format", name), "plain"));
        out
    }
}

/// Plain input box, monospaced font (e.g. for code answers).
pub struct MonospacedRenderer;

impl FormatRenderer for MonospacedRenderer {
    fn class_name(&self) -> &'static str { "fileresponse_monospaced" }

    fn render_readonly(&self, _name: &str, text: &str, lines: u32) -> String {
        textarea(self.class_name(), None, text, lines, true)
    }

    fn render_input(&self, name: &str, text: &str, lines: u32, _draft_id: Option<&str>) -> String {
        let mut out = textarea(self.class_name(), Some(name), text, lines, false);
        out.push_str(&hidden_input(&format!("{}format", name), "plain"));
        out
    }
}

/// Rich-text editor without the file picker.
pub struct EditorRenderer;

impl FormatRenderer for EditorRenderer {
    fn class_name(&self) -> &'static str { "fileresponse_editor" }

    fn render_readonly(&self, _name: &str, text: &str, _lines: u32) -> String {
        // Editor answers are stored as HTML; shown as-is inside the container.
        format!(
            r#"<div class="{} fileresponse_response readonly">{}</div>"#,
            self.class_name(),
            text
        )
    }

    fn render_input(&self, name: &str, text: &str, lines: u32, _draft_id: Option<&str>) -> String {
        let id = format!("{}_id", name);
        let mut out = format!(r#"<div class="{} fileresponse_response">"#, self.class_name());
        out.push_str(&format!(
            r#"<div><textarea id="{}" name="{}" rows="{}" cols="60">{}</textarea></div>"#,
            escape_html(&id),
            escape_html(name),
            lines,
            escape_html(text)
        ));
        out.push_str(&hidden_input(&format!("{}format", name), "html"));
        out.push_str("</div>");
        out
    }
}

/// Rich-text editor with the file picker enabled.
pub struct EditorFilepickerRenderer;

impl FormatRenderer for EditorFilepickerRenderer {
    fn class_name(&self) -> &'static str { "fileresponse_editorfilepicker" }

    fn render_readonly(&self, _name: &str, text: &str, _lines: u32) -> String {
        format!(
            r#"<div class="{} fileresponse_response readonly">{}</div>"#,
            self.class_name(),
            text
        )
    }

    fn render_input(&self, name: &str, text: &str, lines: u32, draft_id: Option<&str>) -> String {
        let id = format!("{}_id", name);
        let draft = draft_id.unwrap_or("");
        let mut out = format!(r#"<div class="{} fileresponse_response">"#, self.class_name());
        out.push_str(&format!(
            r#"<div><textarea id="{}" name="{}" rows="{}" cols="60">{}</textarea></div>"#,
            escape_html(&id),
            escape_html(name),
            lines,
            escape_html(text)
        ));
        out.push_str(&hidden_input(&format!("{}format", name), "html"));
        out.push_str(&hidden_input(&format!("{}:itemid", name), draft));
        // Non-JS fallback: the host serves a plain draft-files manager.
        out.push_str(&format!(
            r#"<noscript><div><object type="text/html" data="/draftfiles?itemid={}" height="160" width="600"></object></div></noscript>"#,
            escape_html(draft)
        ));
        out.push_str("</div>");
        out
    }
}

/// The upload control shown while the attempt is editable.
fn files_input(opts: &QuestionOptions, draft_id: &str) -> String {
    let mut attrs = format!(r#"class="filemanager" data-max-files="{}""#, opts.attachments);
    if opts.force_download {
        // Simplified manager: stored files are handed out as downloads only.
        attrs.push_str(r#" data-force-download="1""#);
    }
    if opts.allow_picker_plugins {
        attrs.push_str(r#" data-allow-picker-plugins="1""#);
    }
    format!(
        r#"<div {}></div>{}"#,
        attrs,
        hidden_input("attachments", draft_id)
    )
}

/// Attached files when the question is in read-only mode.
fn files_read_only(files: &[StoredFile]) -> String {
    files
        .iter()
        .map(|f| {
            format!(
                r#"<p><a href="/draftfile/{}">{}</a> ({}, {} bytes)</p>"#,
                escape_html(&f.name),
                escape_html(&f.name),
                escape_html(&f.mime),
                f.size
            )
        })
        .collect::<Vec<_>>()
        .join("")
}

/// Assemble the full question block: question text, response area,
/// expected/progress lines and the upload widget.
#[allow(clippy::too_many_arguments)]
pub fn question_html(
    opts: &QuestionOptions,
    messages: &Messages,
    question_text: &str,
    answer_text: Option<&str>,
    files: &[StoredFile],
    draft_id: Option<&str>,
    readonly: bool,
    progress: Progress,
) -> String {
    let renderer = renderer_for(opts.response_format);
    let text = answer_text.unwrap_or(&opts.response_template);

    let mut out = String::new();
    out.push_str(&format!(r#"<div class="qtext">{}</div>"#, escape_html(question_text)));
    out.push_str(r#"<div class="ablock">"#);

    if readonly {
        out.push_str(&format!(
            r#"<div class="qtext">{}</div>"#,
            renderer.render_readonly("answer", text, opts.response_field_lines)
        ));
    } else if opts.response_field_lines > 0 {
        out.push_str(&format!(
            r#"<div class="qtext">{}</div>"#,
            renderer.render_input("answer", text, opts.response_field_lines, draft_id)
        ));
    }

    if let Some(line) = messages.expected_text(opts.attachments) {
        out.push_str(&format!(r#"<div class="answer">{}</div>"#, escape_html(&line)));
    }
    if let Some(line) = messages.progress_text(progress) {
        out.push_str(&format!(r#"<div class="answer">{}</div>"#, escape_html(&line)));
    }

    if opts.attachments != 0 {
        let widget = if readonly {
            files_read_only(files)
        } else {
            files_input(opts, draft_id.unwrap_or(""))
        };
        out.push_str(&format!(r#"<div class="attachments">{}</div>"#, widget));
    }

    out.push_str("</div>");
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::TextFormat;

    fn opts(format: ResponseFormat, lines: u32, attachments: i32) -> QuestionOptions {
        QuestionOptions {
            response_format: format,
            response_field_lines: lines,
            attachments,
            force_download: false,
            allow_picker_plugins: false,
            grader_info: String::new(),
            grader_info_format: TextFormat::Html,
            response_template: String::new(),
            response_template_format: TextFormat::Html,
        }
    }

    #[test]
    fn plain_input_carries_name_and_format_field() {
        let html = PlainRenderer.render_input("answer", "hi", 10, None);
        assert!(html.contains(r#"name="answer""#));
        assert!(html.contains(r#"rows="10""#));
        assert!(html.contains(r#"name="answerformat" value="plain""#));
        assert!(html.contains("fileresponse_plain"));
    }

    #[test]
    fn monospaced_is_its_own_class() {
        let html = MonospacedRenderer.render_readonly("answer", "x", 5);
        assert!(html.contains("fileresponse_monospaced"));
        assert!(html.contains(r#"readonly="readonly""#));
        assert!(!html.contains(r#"name="answer""#));
    }

    #[test]
    fn editor_filepicker_embeds_draft_item_id() {
        let html =
            EditorFilepickerRenderer.render_input("answer", "", 15, Some("draft-1"));
        assert!(html.contains(r#"name="answer:itemid" value="draft-1""#));
        assert!(html.contains("noscript"));
        assert!(html.contains(r#"name="answerformat" value="html""#));
    }

    #[test]
    fn textarea_content_is_escaped() {
        let html = PlainRenderer.render_input("answer", "<b>&\"", 5, None);
        assert!(html.contains("&lt;b&gt;&amp;&quot;"));
    }

    #[test]
    fn question_html_omits_input_when_no_lines() {
        let html = question_html(
            &opts(ResponseFormat::Plain, 0, 3),
            &Messages::default(),
            "Upload your homework",
            None,
            &[],
            Some("d1"),
            false,
            Progress::NoneOfN { required: 3 },
        );
        assert!(!html.contains("<textarea"));
        assert!(html.contains("You have to upload 3 files."));
        assert!(html.contains("No file uploaded yet. 3 files required."));
        assert!(html.contains(r#"data-max-files="3""#));
        assert!(html.contains(r#"name="attachments" value="d1""#));
    }

    #[test]
    fn question_html_readonly_lists_files() {
        let files = vec![
            StoredFile { name: "a.pdf".into(), size: 10, mime: "application/pdf".into() },
            StoredFile { name: "b.png".into(), size: 20, mime: "image/png".into() },
        ];
        let html = question_html(
            &opts(ResponseFormat::Plain, 5, -1),
            &Messages::default(),
            "Q",
            Some("my answer"),
            &files,
            None,
            true,
            Progress::Uploaded { count: 2 },
        );
        assert!(html.contains("a.pdf"));
        assert!(html.contains("b.png"));
        assert!(html.contains("2 files uploaded."));
        // Unlimited policies print no expected-count line.
        assert!(!html.contains("You have to upload"));
    }

    #[test]
    fn no_attachments_block_for_text_only_questions() {
        let html = question_html(
            &opts(ResponseFormat::Editor, 15, 0),
            &Messages::default(),
            "Q",
            None,
            &[],
            None,
            false,
            Progress::Nothing,
        );
        assert!(!html.contains("attachments"));
        assert!(html.contains("fileresponse_editor"));
    }

    #[test]
    fn template_prefills_the_input() {
        let mut o = opts(ResponseFormat::Plain, 5, 1);
        o.response_template = "Once upon a time".into();
        let html = question_html(
            &o,
            &Messages::default(),
            "Q",
            None,
            &[],
            Some("d"),
            false,
            Progress::NoneOfOne,
        );
        assert!(html.contains(">Once upon a time</textarea>"));
    }
}
