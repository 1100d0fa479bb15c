//! Proposal document rendering via `printpdf`: the proposal on the first page(s), the fixed
//! personal-data consent form on its own page after it. Returns PDF bytes.

use std::io::BufWriter;
use std::path::Path;
use std::sync::Arc;

use chrono::{DateTime, TimeZone};
use printpdf::*;
use serde::Deserialize;

use crate::error::{DocumentError, ProposalError};
use crate::proposal::require;

const PAGE_W: f32 = 210.0;
const PAGE_H: f32 = 297.0;
const MARGIN_X: f32 = 20.0;
const TOP: f32 = 277.0;
const BOTTOM: f32 = 20.0;
const PT_TO_MM: f32 = 0.3528;

const CONSENT_ROWS: &[(&str, &str)] = &[
    ("수집·이용 목적", "시민제안서 접수, 검토, 처리 및 결과 통보"),
    ("수집·이용 항목", "성명, 연락처, 제안 내용"),
    ("보유·이용 기간", "제안서 접수일로부터 3년"),
    ("개인정보 제3자 제공", "제공하지 않음"),
    (
        "개인정보 처리 거부권",
        "개인정보 수집·이용에 동의하지 않을 수 있으나, 동의하지 않을 경우 제안서 접수가 제한될 수 있습니다.",
    ),
];

#[derive(Debug, Clone, Default, Deserialize)]
pub struct DocumentRequest {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub problem: String,
    #[serde(default)]
    pub solution: String,
    #[serde(default)]
    pub effect: String,
    #[serde(default)]
    pub proposer_name: String,
}

impl DocumentRequest {
    pub fn validate(&self) -> Result<(), ProposalError> {
        require("title", &self.title)?;
        require("problem", &self.problem)?;
        require("solution", &self.solution)?;
        require("effect", &self.effect)?;
        require("proposer_name", &self.proposer_name)
    }
}

/// Font used for all document text. Builtin Helvetica cannot show Hangul; configure an external
/// TTF/OTF for readable Korean output.
#[derive(Debug, Clone, Default)]
pub enum DocumentFont {
    #[default]
    Builtin,
    External(Arc<Vec<u8>>),
}

impl DocumentFont {
    /// Read the font at `path`. A missing or unreadable file falls back to the builtin font.
    pub fn load(path: Option<&Path>) -> Self {
        let Some(path) = path else {
            return DocumentFont::Builtin;
        };
        match std::fs::read(path) {
            Ok(bytes) => {
                tracing::info!(path = %path.display(), "document font loaded");
                DocumentFont::External(Arc::new(bytes))
            }
            Err(e) => {
                tracing::warn!(path = %path.display(), error = %e, "document font unreadable, using builtin");
                DocumentFont::Builtin
            }
        }
    }

    fn register(&self, doc: &PdfDocumentReference) -> Result<(IndirectFontRef, IndirectFontRef), DocumentError> {
        match self {
            DocumentFont::Builtin => {
                let regular = doc
                    .add_builtin_font(BuiltinFont::Helvetica)
                    .map_err(|e| DocumentError::Font(e.to_string()))?;
                let bold = doc
                    .add_builtin_font(BuiltinFont::HelveticaBold)
                    .map_err(|e| DocumentError::Font(e.to_string()))?;
                Ok((regular, bold))
            }
            DocumentFont::External(bytes) => {
                let font = doc
                    .add_external_font(std::io::Cursor::new(bytes.as_slice()))
                    .map_err(|e| DocumentError::Font(e.to_string()))?;
                Ok((font.clone(), font))
            }
        }
    }
}

/// `시민제안서_{proposer}_{YYYYMMDD_HHMMSS}.pdf`, with characters unsafe in file names removed.
pub fn attachment_filename<Tz: TimeZone>(proposer: &str, at: &DateTime<Tz>) -> String
where
    Tz::Offset: std::fmt::Display,
{
    let name: String = proposer
        .trim()
        .chars()
        .filter(|c| !c.is_control() && !matches!(c, '/' | '\\' | '"' | ':' | '*' | '?' | '<' | '>' | '|'))
        .collect();
    format!("시민제안서_{}_{}.pdf", name, at.format("%Y%m%d_%H%M%S"))
}

pub fn render_proposal_pdf<Tz: TimeZone>(
    req: &DocumentRequest,
    organization: &str,
    font: &DocumentFont,
    issued_at: &DateTime<Tz>,
) -> Result<Vec<u8>, DocumentError>
where
    Tz::Offset: std::fmt::Display,
{
    render(req, organization, font, issued_at).map(|(bytes, _)| bytes)
}

fn render<Tz: TimeZone>(
    req: &DocumentRequest,
    organization: &str,
    font: &DocumentFont,
    issued_at: &DateTime<Tz>,
) -> Result<(Vec<u8>, usize), DocumentError>
where
    Tz::Offset: std::fmt::Display,
{
    let (doc, page1, layer1) = PdfDocument::new("시민제안서", Mm(PAGE_W), Mm(PAGE_H), "Layer 1");
    let (regular, bold) = font.register(&doc)?;
    let date = issued_at.format("%Y년 %m월 %d일").to_string();
    let doc_number = format!("PRO-{}", issued_at.format("%Y%m%d"));
    let proposer = req.proposer_name.trim();

    let pages = {
        let mut w = PageWriter {
            doc: &doc,
            layer: doc.get_page(page1).get_layer(layer1),
            y: Mm(TOP),
            regular,
            bold,
            pages: 1,
        };

        w.text_line("시민제안서", 20.0, Mm(85.0), true);
        w.gap(6.0);

        w.heading("제안서 기본 정보");
        for (label, value) in [
            ("제안일자", date.as_str()),
            ("문서번호", doc_number.as_str()),
            ("제안자명", proposer),
            ("수신기관", organization),
            ("제안분야", "시설물 개선"),
            ("처리기한", "접수 후 30일 이내"),
        ] {
            w.paragraph(&format!("{label}: {value}"), 11.0, 5.0);
        }
        w.gap(4.0);

        w.heading("제안명");
        w.paragraph(req.title.trim(), 12.0, 5.0);
        w.gap(4.0);

        w.heading("1. 현황 및 문제점");
        w.paragraph(req.problem.trim(), 11.0, 5.0);
        w.gap(4.0);

        w.heading("2. 개선 방안");
        w.paragraph(req.solution.trim(), 11.0, 5.0);
        w.gap(4.0);

        w.heading("3. 기대 효과");
        let sentences = split_sentences(&req.effect);
        if sentences.len() > 1 {
            for (i, sentence) in sentences.iter().enumerate() {
                w.paragraph(&format!("{}. {}", i + 1, sentence), 11.0, 5.0);
            }
        } else {
            w.paragraph(req.effect.trim(), 11.0, 5.0);
        }
        w.gap(8.0);

        w.heading("제안자 서명");
        w.paragraph("위와 같이 시민제안서를 제출합니다.", 11.0, 5.0);
        w.paragraph(&format!("제안자: {proposer}    서명: ________________"), 11.0, 5.0);
        w.paragraph(&format!("제안일: {date}    연락처: ________________"), 11.0, 5.0);
        w.paragraph("주소: ________________    이메일: ________________", 11.0, 5.0);

        w.new_page();
        w.text_line("개인정보 수집 및 이용 동의서", 18.0, Mm(MARGIN_X + 35.0), true);
        w.text_line(
            "Personal Information Collection and Use Consent Form",
            10.0,
            Mm(MARGIN_X + 30.0),
            false,
        );
        w.gap(6.0);

        w.heading("개인정보 수집 및 이용 안내");
        w.paragraph(
            &format!(
                "{organization}는 시민제안서 접수 및 처리 과정에서 다음과 같이 개인정보를 수집·이용합니다."
            ),
            11.0,
            5.0,
        );
        w.gap(3.0);
        for (item, content) in CONSENT_ROWS {
            w.paragraph(&format!("■ {item}"), 11.0, 5.0);
            w.paragraph(content, 10.0, 10.0);
            w.gap(1.5);
        }
        w.gap(6.0);
        w.paragraph("□ 위와 같이 개인정보 수집 및 이용에 동의합니다.", 12.0, 5.0);
        w.gap(6.0);

        w.heading("동의자 서명");
        w.paragraph(&format!("동의자: {proposer}    서명: ________________"), 11.0, 5.0);
        w.paragraph(&format!("동의일: {date}    연락처: ________________"), 11.0, 5.0);

        w.pages
    };

    let mut buf = BufWriter::new(Vec::new());
    doc.save(&mut buf)
        .map_err(|e| DocumentError::Save(e.to_string()))?;
    let bytes = buf
        .into_inner()
        .map_err(|e| DocumentError::Save(format!("PDF buffer error: {e}")))?;
    tracing::debug!(pages, bytes = bytes.len(), "proposal document rendered");
    Ok((bytes, pages))
}

/// Cursor over the current page; starts a new page when the next line would cross the bottom margin.
struct PageWriter<'a> {
    doc: &'a PdfDocumentReference,
    layer: PdfLayerReference,
    y: Mm,
    regular: IndirectFontRef,
    bold: IndirectFontRef,
    pages: usize,
}

impl PageWriter<'_> {
    fn new_page(&mut self) {
        let (page, layer) = self.doc.add_page(Mm(PAGE_W), Mm(PAGE_H), "Layer 1");
        self.layer = self.doc.get_page(page).get_layer(layer);
        self.y = Mm(TOP);
        self.pages += 1;
    }

    fn ensure(&mut self, height: f32) {
        if self.y.0 - height < BOTTOM {
            self.new_page();
        }
    }

    fn text_line(&mut self, text: &str, size: f32, x: Mm, bold: bool) {
        let height = line_height(size);
        self.ensure(height);
        let font = if bold { &self.bold } else { &self.regular };
        self.layer.use_text(text, size, x, self.y, font);
        self.y -= Mm(height);
    }

    fn heading(&mut self, text: &str) {
        // Keep a heading together with at least its first body line.
        self.ensure(line_height(13.0) + line_height(11.0));
        self.text_line(text, 13.0, Mm(MARGIN_X), true);
        self.gap(1.0);
    }

    fn paragraph(&mut self, text: &str, size: f32, indent: f32) {
        let width = PAGE_W - 2.0 * MARGIN_X - indent;
        for line in wrap_text(text, columns_for(size, width)) {
            self.text_line(&line, size, Mm(MARGIN_X + indent), false);
        }
    }

    fn gap(&mut self, mm: f32) {
        self.y -= Mm(mm);
    }
}

fn line_height(size: f32) -> f32 {
    size * PT_TO_MM * 1.5
}

/// Line capacity in half-width columns: a Hangul glyph is about one em wide, Latin about half.
fn columns_for(size: f32, width_mm: f32) -> usize {
    ((width_mm / (size * PT_TO_MM)) * 2.0) as usize
}

fn display_width(s: &str) -> usize {
    s.chars().map(char_width).sum()
}

fn char_width(c: char) -> usize {
    if c.is_ascii() {
        1
    } else {
        2
    }
}

/// Greedy word wrap by display width; words wider than a line are split by character.
fn wrap_text(text: &str, max_cols: usize) -> Vec<String> {
    let max_cols = max_cols.max(2);
    let mut lines = Vec::new();
    let mut current = String::new();
    let mut width = 0;

    for word in text.split_whitespace() {
        let word_width = display_width(word);
        if width > 0 && width + 1 + word_width > max_cols {
            lines.push(std::mem::take(&mut current));
            width = 0;
        }
        if width > 0 {
            current.push(' ');
            width += 1;
        }
        if word_width > max_cols {
            for c in word.chars() {
                let w = char_width(c);
                if width + w > max_cols {
                    lines.push(std::mem::take(&mut current));
                    width = 0;
                }
                current.push(c);
                width += w;
            }
        } else {
            current.push_str(word);
            width += word_width;
        }
    }
    if !current.is_empty() {
        lines.push(current);
    }
    if lines.is_empty() {
        lines.push(String::new());
    }
    lines
}

/// Sentences ending in `.`/`。` followed by whitespace or the end. Decimals stay intact.
fn split_sentences(text: &str) -> Vec<String> {
    let mut out = Vec::new();
    let mut current = String::new();
    let mut chars = text.trim().chars().peekable();
    while let Some(c) = chars.next() {
        current.push(c);
        if matches!(c, '.' | '。') && chars.peek().map_or(true, |n| n.is_whitespace()) {
            let s = current.trim();
            if !s.is_empty() {
                out.push(s.to_string());
            }
            current.clear();
        }
    }
    let rest = current.trim();
    if !rest.is_empty() {
        out.push(rest.to_string());
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Local, TimeZone, Utc};

    fn request() -> DocumentRequest {
        DocumentRequest {
            title: "태산패밀리파크 휴게시설 개선 제안".into(),
            problem: "놀이터 주변 벤치가 노후화되어 불안정합니다.".into(),
            solution: "김포도시관리공사에서 노후 벤치 교체를 추진해 주실 것을 제안합니다.".into(),
            effect: "이용객의 안전이 향상됩니다. 공원 이용 만족도가 높아질 것입니다.".into(),
            proposer_name: "홍길동".into(),
        }
    }

    #[test]
    fn validation_names_first_blank_field() {
        assert!(request().validate().is_ok());
        let req = DocumentRequest {
            effect: " ".into(),
            proposer_name: String::new(),
            ..request()
        };
        assert_eq!(req.validate().unwrap_err().field(), "effect");
        let req = DocumentRequest {
            proposer_name: String::new(),
            ..request()
        };
        assert_eq!(req.validate().unwrap_err().field(), "proposer_name");
    }

    #[test]
    fn renders_pdf_bytes_with_consent_page() {
        let at = Local.with_ymd_and_hms(2025, 3, 14, 9, 30, 0).unwrap();
        let (bytes, pages) = render(&request(), "김포도시관리공사", &DocumentFont::Builtin, &at).unwrap();
        assert!(bytes.starts_with(b"%PDF"));
        assert_eq!(pages, 2);
    }

    #[test]
    fn long_sections_flow_onto_new_pages() {
        let long = "벤치가 노후화되어 이용객의 안전을 위협하고 있습니다. ".repeat(120);
        let req = DocumentRequest {
            problem: long.clone(),
            solution: long,
            ..request()
        };
        let at = Utc.with_ymd_and_hms(2025, 3, 14, 9, 30, 0).unwrap();
        let (_, pages) = render(&req, "김포도시관리공사", &DocumentFont::Builtin, &at).unwrap();
        assert!(pages > 3, "expected overflow pages, got {pages}");
    }

    #[test]
    fn missing_font_file_uses_builtin() {
        let font = DocumentFont::load(Some(Path::new("/nonexistent/NanumGothic.ttf")));
        assert!(matches!(font, DocumentFont::Builtin));
    }

    #[test]
    fn filename_carries_proposer_and_timestamp() {
        let at = Utc.with_ymd_and_hms(2025, 3, 14, 9, 5, 7).unwrap();
        assert_eq!(attachment_filename("홍길동", &at), "시민제안서_홍길동_20250314_090507.pdf");
        assert_eq!(attachment_filename(" a/b\"c ", &at), "시민제안서_abc_20250314_090507.pdf");
    }

    #[test]
    fn sentences_split_on_terminal_periods_only() {
        assert_eq!(
            split_sentences("이용률이 1.5배 늘어납니다. 만족도가 높아집니다."),
            vec!["이용률이 1.5배 늘어납니다.", "만족도가 높아집니다."]
        );
        assert_eq!(split_sentences("한 문장"), vec!["한 문장"]);
        assert!(split_sentences("   ").is_empty());
    }

    #[test]
    fn wrap_respects_display_width() {
        let lines = wrap_text("가나다 라마바 사아자", 8);
        assert_eq!(lines, vec!["가나다", "라마바", "사아자"]);
        let lines = wrap_text("abc def ghi", 7);
        assert_eq!(lines, vec!["abc def", "ghi"]);
        let lines = wrap_text("가나다라마바", 6);
        assert_eq!(lines, vec!["가나다", "라마바"]);
        assert_eq!(wrap_text("", 10), vec![String::new()]);
    }
}
