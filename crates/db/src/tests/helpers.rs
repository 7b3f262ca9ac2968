use std::fs;
use std::path::Path;

pub fn count_dat_files(dir: &Path) -> usize {
    fs::read_dir(dir)
        .map(|entries| {
            entries
                .filter_map(|e| e.ok())
                .filter(|e| {
                    e.path()
                        .extension()
                        .and_then(|s| s.to_str())
                        .map(|ext| ext == "dat")
                        .unwrap_or(false)
                })
                .count()
        })
        .unwrap_or(0)
}
