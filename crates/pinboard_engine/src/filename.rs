use std::path::{Path, PathBuf};

const FILE_PREFIX: &str = "Pin_";
const FILE_EXTENSION: &str = "jpg";

/// Deterministic, 1-based file name: `Pin_001.jpg`, `Pin_002.jpg`, ...
///
/// Padding is a minimum; index 1000 yields `Pin_1000.jpg`.
pub fn pin_file_name(index: usize) -> String {
    format!("{FILE_PREFIX}{index:03}.{FILE_EXTENSION}")
}

pub fn pin_file_path(dir: &Path, index: usize) -> PathBuf {
    dir.join(pin_file_name(index))
}
