//! Plain-text extraction from uploaded resume documents and links.

use std::path::Path;

use anyhow::{anyhow, bail, Context, Result};
use once_cell::sync::Lazy;
use regex::Regex;

static RE_SCRIPT_STYLE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?is)<(script|style|noscript)\b.*?</(script|style|noscript)\s*>").unwrap()
});

static RE_BLOCK_BREAK: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)<\s*(br|/p|/div|/li|/h[1-6]|/tr)\b[^>]*>").unwrap());

static RE_TAG: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?s)<[^>]*>").unwrap());

static RE_SPACES: Lazy<Regex> = Lazy::new(|| Regex::new("[ \t\u{a0}]+").unwrap());

/// Document formats the ingestion pipeline can read.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocumentKind {
    Pdf,
    Docx,
}

impl DocumentKind {
    /// Case-insensitive match on the file extension. `.doc` is not supported.
    pub fn from_file_name(name: &str) -> Option<Self> {
        let ext = Path::new(name).extension()?.to_str()?.to_ascii_lowercase();
        match ext.as_str() {
            "pdf" => Some(DocumentKind::Pdf),
            "docx" => Some(DocumentKind::Docx),
            _ => None,
        }
    }

    pub fn extension(&self) -> &'static str {
        match self {
            DocumentKind::Pdf => "pdf",
            DocumentKind::Docx => "docx",
        }
    }
}

/// Reads and extracts text from a stored upload. Parsing runs on the
/// blocking pool; both extractors are CPU-bound.
pub async fn extract_file_text(path: &Path) -> Result<String> {
    let name = path
        .file_name()
        .and_then(|n| n.to_str())
        .unwrap_or_default();
    let kind = DocumentKind::from_file_name(name)
        .ok_or_else(|| anyhow!("Unsupported file type: {}", path.display()))?;
    let bytes = tokio::fs::read(path)
        .await
        .with_context(|| format!("Failed to read {}", path.display()))?;

    tokio::task::spawn_blocking(move || extract_bytes(kind, &bytes))
        .await
        .context("Text extraction task panicked")?
}

pub fn extract_bytes(kind: DocumentKind, bytes: &[u8]) -> Result<String> {
    match kind {
        DocumentKind::Pdf => {
            pdf_extract::extract_text_from_mem(bytes).context("PDF extraction failed")
        }
        DocumentKind::Docx => extract_docx(bytes),
    }
}

/// Joins the text runs of each top-level paragraph, one paragraph per line.
fn extract_docx(bytes: &[u8]) -> Result<String> {
    let docx = docx_rs::read_docx(bytes).map_err(|e| anyhow!("DOCX extraction failed: {e}"))?;
    let mut lines = Vec::new();
    for child in docx.document.children {
        if let docx_rs::DocumentChild::Paragraph(p) = child {
            let mut line = String::new();
            for pc in p.children {
                if let docx_rs::ParagraphChild::Run(run) = pc {
                    for rc in run.children {
                        if let docx_rs::RunChild::Text(t) = rc {
                            line.push_str(&t.text);
                        }
                    }
                }
            }
            lines.push(line);
        }
    }
    Ok(lines.join("\n"))
}

/// Fetches a resume link and reduces the page to visible text.
pub async fn fetch_link_text(client: &reqwest::Client, link: &str) -> Result<String> {
    let url = reqwest::Url::parse(link.trim()).with_context(|| format!("Invalid resume link '{link}'"))?;
    if !matches!(url.scheme(), "http" | "https") {
        bail!("Unsupported link scheme '{}'", url.scheme());
    }
    let response = client
        .get(url)
        .send()
        .await
        .context("Failed to fetch resume link")?
        .error_for_status()
        .context("Resume link returned an error status")?;
    let is_html = response
        .headers()
        .get(reqwest::header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .map_or(true, |ct| ct.contains("html"));
    let body = response.text().await.context("Failed to read resume link body")?;
    Ok(if is_html { html_to_text(&body) } else { body })
}

/// Strips scripts, styles and tags; keeps block boundaries as line breaks.
pub fn html_to_text(html: &str) -> String {
    let text = RE_SCRIPT_STYLE.replace_all(html, " ");
    let text = RE_BLOCK_BREAK.replace_all(&text, "\n");
    let text = RE_TAG.replace_all(&text, " ");
    let text = decode_entities(&text);

    text.lines()
        .map(|line| RE_SPACES.replace_all(line, " ").trim().to_string())
        .filter(|line| !line.is_empty())
        .collect::<Vec<_>>()
        .join("\n")
}

fn decode_entities(text: &str) -> String {
    text.replace("&nbsp;", " ")
        .replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&#39;", "'")
        .replace("&amp;", "&")
}

#[cfg(test)]
mod tests {
    use super::*;
    use docx_rs::{Docx, Paragraph, Run};
    use std::io::Cursor;

    fn build_docx(paragraphs: &[&str]) -> Vec<u8> {
        let mut doc = Docx::new();
        for p in paragraphs {
            doc = doc.add_paragraph(Paragraph::new().add_run(Run::new().add_text(*p)));
        }
        let mut buf = Cursor::new(Vec::new());
        doc.build().pack(&mut buf).unwrap();
        buf.into_inner()
    }

    #[test]
    fn test_kind_from_file_name() {
        assert_eq!(DocumentKind::from_file_name("cv.PDF"), Some(DocumentKind::Pdf));
        assert_eq!(DocumentKind::from_file_name("cv.final.docx"), Some(DocumentKind::Docx));
        assert_eq!(DocumentKind::from_file_name("cv.doc"), None);
        assert_eq!(DocumentKind::from_file_name("cv.txt"), None);
        assert_eq!(DocumentKind::from_file_name("README"), None);
    }

    #[test]
    fn test_docx_paragraphs_become_lines() {
        let bytes = build_docx(&["Jane Doe", "jane@example.com", "Rust, Go"]);
        let text = extract_bytes(DocumentKind::Docx, &bytes).unwrap();
        assert_eq!(text, "Jane Doe\njane@example.com\nRust, Go");
    }

    #[test]
    fn test_corrupt_docx_is_error() {
        assert!(extract_bytes(DocumentKind::Docx, b"not a zip").is_err());
    }

    #[tokio::test]
    async fn test_extract_file_text_reads_from_disk() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("resume.docx");
        std::fs::write(&path, build_docx(&["Ada Lovelace"])).unwrap();
        assert_eq!(extract_file_text(&path).await.unwrap(), "Ada Lovelace");

        let bad = dir.path().join("resume.rtf");
        std::fs::write(&bad, "{\\rtf1}").unwrap();
        assert!(extract_file_text(&bad).await.is_err());
    }

    #[test]
    fn test_html_to_text() {
        let html = r#"<html><head><style>body { color: red }</style>
            <script>var x = "<b>hidden</b>";</script></head>
            <body><h1>Jane&nbsp;Doe</h1><p>Senior   Engineer &amp; Lead</p>
            <ul><li>Rust</li><li>Go</li></ul></body></html>"#;
        let text = html_to_text(html);
        assert_eq!(text, "Jane Doe\nSenior Engineer & Lead\nRust\nGo");
        assert!(!text.contains("hidden"));
        assert!(!text.contains("color"));
    }
}
