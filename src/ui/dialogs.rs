use rfd::FileDialog;
use std::path::PathBuf;

/// File dialog helper for the replay viewer
pub struct FileDialogs;

impl FileDialogs {
    /// Open a file dialog for selecting a race catalog
    pub fn open_catalog_file() -> Option<PathBuf> {
        FileDialog::new()
            .add_filter("Race Catalog", &["json"])
            .add_filter("All Files", &["*"])
            .set_title("Open Race Catalog")
            .pick_file()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // Opens a real dialog; run manually.
    #[test]
    #[ignore]
    fn test_open_catalog_dialog() {
        if let Some(path) = FileDialogs::open_catalog_file() {
            println!("Selected catalog: {:?}", path);
        }
    }
}
