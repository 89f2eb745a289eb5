// src/services/extraction.rs
//! Resume text extraction
//!
//! Turns a stored resume file into plain text plus any hyperlinks found in
//! it. Extraction either succeeds completely or fails loudly - no partial
//! output is ever returned, so a FAILED candidate never carries half-parsed
//! text.

use async_trait::async_trait;
use regex::Regex;
use std::collections::BTreeSet;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;

#[derive(Debug, thiserror::Error)]
pub enum ExtractionError {
    #[error("Unsupported file format: {0}")]
    UnsupportedFormat(String),

    #[error("Could not read file: {0}")]
    Unreadable(String),

    #[error("Could not extract text from file")]
    NoText,
}

/// Extraction output: plain text and the embedded hyperlinks
#[derive(Debug, Clone, PartialEq)]
pub struct ExtractedDocument {
    pub text: String,
    pub links: Vec<String>,
}

/// Boundary to the text-extraction collaborator
#[async_trait]
pub trait TextExtractor: Send + Sync {
    async fn extract(&self, path: &Path) -> Result<ExtractedDocument, ExtractionError>;
}

/// PDF extractor backed by the pdf-extract crate, with URL harvesting over
/// the extracted text
pub struct PdfTextExtractor;

#[async_trait]
impl TextExtractor for PdfTextExtractor {
    async fn extract(&self, path: &Path) -> Result<ExtractedDocument, ExtractionError> {
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_lowercase())
            .unwrap_or_default();

        if ext != "pdf" {
            return Err(ExtractionError::UnsupportedFormat(format!(
                ".{} (only .pdf is supported)",
                ext
            )));
        }

        let bytes = tokio::fs::read(path)
            .await
            .map_err(|e| ExtractionError::Unreadable(e.to_string()))?;

        // pdf-extract is synchronous and CPU-bound; keep it off the runtime
        let owned: PathBuf = path.to_path_buf();
        let text = tokio::task::spawn_blocking(move || {
            pdf_extract::extract_text_from_mem(&bytes)
                .map_err(|e| ExtractionError::Unreadable(format!("{}: {}", owned.display(), e)))
        })
        .await
        .map_err(|e| ExtractionError::Unreadable(e.to_string()))??;

        let text = text.trim().to_string();
        if text.is_empty() {
            return Err(ExtractionError::NoText);
        }

        let links = harvest_links(&text);

        Ok(ExtractedDocument { text, links })
    }
}

/// Collect URLs embedded in the text, deduplicated and normalized to
/// carry a scheme
pub fn harvest_links(text: &str) -> Vec<String> {
    static LINK_PATTERN: OnceLock<Regex> = OnceLock::new();
    let pattern = LINK_PATTERN.get_or_init(|| {
        Regex::new(
            r"(?i)\b(?:https?://)?(?:www\.)?(?:linkedin\.com|github\.com|[\w.-]+\.(?:com|org|io|dev|net))(?:/[\w\-./%#?=&]*)?",
        )
        .expect("link regex is valid")
    });

    let mut links = BTreeSet::new();
    for m in pattern.find_iter(text) {
        let raw = m.as_str().trim_end_matches(|c| matches!(c, '.' | ',' | ')'));
        // Skip bare email domains picked up by the host pattern
        if text[..m.start()].ends_with('@') {
            continue;
        }
        let url = if raw.starts_with("http://") || raw.starts_with("https://") {
            raw.to_string()
        } else {
            format!("https://{}", raw)
        };
        links.insert(url);
    }
    links.into_iter().collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_non_pdf_extension_is_rejected() {
        let extractor = PdfTextExtractor;
        let err = extractor
            .extract(Path::new("/tmp/resume.docx"))
            .await
            .unwrap_err();
        assert!(matches!(err, ExtractionError::UnsupportedFormat(_)));
    }

    #[tokio::test]
    async fn test_missing_file_is_unreadable() {
        let extractor = PdfTextExtractor;
        let err = extractor
            .extract(Path::new("/nonexistent/resume.pdf"))
            .await
            .unwrap_err();
        assert!(matches!(err, ExtractionError::Unreadable(_)));
    }

    #[tokio::test]
    async fn test_garbage_pdf_is_unreadable() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("garbage.pdf");
        tokio::fs::write(&path, b"not a real pdf").await.unwrap();

        let err = PdfTextExtractor.extract(&path).await.unwrap_err();
        assert!(matches!(err, ExtractionError::Unreadable(_)));
    }

    #[test]
    fn test_harvest_links_normalizes_and_dedupes() {
        let text = "Find me at linkedin.com/in/jane and https://github.com/jane. \
                    Also github.com/jane again.";
        let links = harvest_links(text);
        assert!(links.contains(&"https://linkedin.com/in/jane".to_string()));
        assert!(links.contains(&"https://github.com/jane".to_string()));
        assert_eq!(
            links.iter().filter(|l| l.contains("github.com/jane")).count(),
            1
        );
    }

    #[test]
    fn test_harvest_links_skips_email_domains() {
        let links = harvest_links("Contact: jane@example.com");
        assert!(links.is_empty());
    }

    #[test]
    fn test_harvest_links_stable_across_calls() {
        // The compiled pattern is shared; repeated calls must agree
        let text = "portfolio at jane.dev and code on github.com/jane";
        let first = harvest_links(text);
        let second = harvest_links(text);
        assert_eq!(first, second);
        assert!(first.contains(&"https://jane.dev".to_string()));
    }
}
