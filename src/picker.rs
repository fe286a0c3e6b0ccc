use std::path::PathBuf;

use log::info;

/// Open the native file dialog filtered to PDF files. Returns `None` when
/// the user cancels; cancellation is decided by the caller, not here.
pub fn pick_pdf() -> Option<PathBuf> {
    let selection = rfd::FileDialog::new()
        .set_title("Select a PDF file")
        .add_filter("PDF files", &["pdf"])
        .pick_file();

    match selection {
        Some(path) => {
            let path = path.canonicalize().unwrap_or(path);
            info!("selected {}", path.display());
            Some(path)
        }
        None => {
            info!("file dialog cancelled");
            None
        }
    }
}
