use std::path::{Path, PathBuf};

use gag::Gag;
use log::info;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum PdfError {
    #[error("failed to extract text from {path}: {source}")]
    Extract {
        path: PathBuf,
        #[source]
        source: pdf_extract::OutputError,
    },
}

/// Extract the text of every page, report per-page character counts on the
/// console, and merge the non-empty pages. An empty result is valid: it
/// means the document has no extractable text (likely a scanned PDF).
pub fn extract_text(path: &Path) -> Result<String, PdfError> {
    let pages = {
        // pdf-extract writes parser warnings straight to the console.
        let _stdout_gag = Gag::stdout().ok();
        let _stderr_gag = Gag::stderr().ok();
        pdf_extract::extract_text_by_pages(path).map_err(|source| PdfError::Extract {
            path: path.to_path_buf(),
            source,
        })?
    };

    let total = pages.len();
    for (index, page) in pages.iter().enumerate() {
        println!(
            "Page {}/{} chars={}",
            index + 1,
            total,
            page.trim().chars().count()
        );
    }

    let merged = merge_pages(&pages);
    info!(
        "extracted {} characters from {} of {} pages",
        merged.chars().count(),
        pages.iter().filter(|page| !page.trim().is_empty()).count(),
        total
    );
    Ok(merged)
}

/// Join the trimmed, non-empty page texts with a newline between pages.
pub fn merge_pages(pages: &[String]) -> String {
    pages
        .iter()
        .map(|page| page.trim())
        .filter(|page| !page.is_empty())
        .collect::<Vec<_>>()
        .join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn merges_non_empty_pages_with_newlines() {
        let pages = vec![
            "Hello world.".to_string(),
            "".to_string(),
            "Goodbye.".to_string(),
        ];
        assert_eq!(merge_pages(&pages), "Hello world.\nGoodbye.");
    }

    #[test]
    fn all_empty_pages_merge_to_the_empty_string() {
        let pages = vec!["".to_string(), "  \n ".to_string()];
        assert_eq!(merge_pages(&pages), "");
    }

    #[test]
    fn no_pages_merge_to_the_empty_string() {
        assert_eq!(merge_pages(&[]), "");
    }

    #[test]
    fn trims_page_whitespace_before_joining() {
        let pages = vec!["  uno  ".to_string(), "\tdos\n".to_string()];
        assert_eq!(merge_pages(&pages), "uno\ndos");
    }

    #[test]
    fn missing_file_is_an_extraction_error() {
        let result = extract_text(Path::new("does-not-exist.pdf"));
        assert!(matches!(result, Err(PdfError::Extract { .. })));
    }
}
