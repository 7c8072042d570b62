use std::path::{Path, PathBuf};
use std::sync::OnceLock;

static EXE_DIR: OnceLock<PathBuf> = OnceLock::new();

/// Returns the directory containing the executable.
pub fn get_exe_dir() -> &'static PathBuf {
    EXE_DIR.get_or_init(|| {
        std::env::current_exe()
            .ok()
            .and_then(|p| p.parent().map(|p| p.to_path_buf()))
            .unwrap_or_else(|| PathBuf::from("."))
    })
}

/// Directory that relative `reference` paths in a catalog are resolved against.
pub fn catalog_base_dir(catalog_path: &Path) -> PathBuf {
    catalog_path
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .map(Path::to_path_buf)
        .unwrap_or_else(|| PathBuf::from("."))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_catalog_base_dir() {
        assert_eq!(catalog_base_dir(Path::new("views.json")), PathBuf::from("."));
        assert_eq!(
            catalog_base_dir(Path::new("bots/eva/views.json")),
            PathBuf::from("bots/eva")
        );
    }
}
