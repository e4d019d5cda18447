use std::path::Path;

use thiserror::Error;

/// A parsed upload ready to become a knowledge resource.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImportedDocument {
    pub title: String,
    pub content: String,
}

#[derive(Debug, Error)]
pub enum ImportError {
    #[error("Unsupported file type. Please upload a .txt, .md, or .pdf file.")]
    UnsupportedType,
    #[error("Failed to read file: {0}")]
    Read(#[from] std::io::Error),
    #[error("Failed to extract PDF text: {0}")]
    Pdf(String),
}

/// Read an uploaded file into text. Plain text and markdown are taken as-is;
/// PDF text is extracted page by page and concatenated. The resource title
/// is the file name without its extension.
pub fn import_file(path: &Path) -> Result<ImportedDocument, ImportError> {
    let title = path
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("Untitled")
        .to_string();

    let extension = path
        .extension()
        .and_then(|s| s.to_str())
        .map(|s| s.to_ascii_lowercase());

    let content = match extension.as_deref() {
        Some("txt") | Some("md") => std::fs::read_to_string(path)?,
        Some("pdf") => extract_pdf_text(path)?,
        _ => return Err(ImportError::UnsupportedType),
    };

    Ok(ImportedDocument { title, content })
}

fn extract_pdf_text(path: &Path) -> Result<String, ImportError> {
    let doc = lopdf::Document::load(path).map_err(|e| ImportError::Pdf(e.to_string()))?;

    let mut text = String::new();
    for (page, _) in doc.get_pages() {
        match doc.extract_text(&[page]) {
            Ok(page_text) => {
                text.push_str(&page_text);
                text.push('\n');
            }
            Err(e) => log::debug!("Skipping unextractable page {}: {}", page, e),
        }
    }
    Ok(text)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    fn temp_file(name: &str, content: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!("mortar-import-{}", uuid::Uuid::new_v4()));
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join(name);
        std::fs::write(&path, content).unwrap();
        path
    }

    #[test]
    fn imports_plain_text() {
        let path = temp_file("cold-chain-sop.txt", "Keep vaccines between 2 and 8 degrees.");
        let doc = import_file(&path).unwrap();
        assert_eq!(doc.title, "cold-chain-sop");
        assert_eq!(doc.content, "Keep vaccines between 2 and 8 degrees.");
    }

    #[test]
    fn imports_markdown() {
        let path = temp_file("opening-checklist.md", "# Opening\n- Unlock the safe\n");
        let doc = import_file(&path).unwrap();
        assert_eq!(doc.title, "opening-checklist");
        assert!(doc.content.starts_with("# Opening"));
    }

    #[test]
    fn extension_check_is_case_insensitive() {
        let path = temp_file("NOTES.TXT", "uppercase extension");
        assert!(import_file(&path).is_ok());
    }

    #[test]
    fn rejects_unsupported_types() {
        let path = temp_file("label.docx", "binary-ish");
        assert!(matches!(
            import_file(&path),
            Err(ImportError::UnsupportedType)
        ));

        let no_extension = temp_file("README", "plain");
        assert!(matches!(
            import_file(&no_extension),
            Err(ImportError::UnsupportedType)
        ));
    }

    #[test]
    fn missing_file_is_a_read_error() {
        let path = std::env::temp_dir().join("mortar-import-missing.txt");
        assert!(matches!(import_file(&path), Err(ImportError::Read(_))));
    }
}
