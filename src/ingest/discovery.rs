//! Log file discovery
//!
//! The log directory mixes all three sources. HPC polling files are named by
//! day (`2024-03-17.csv`) and selected by filename date against the request
//! range; ENT and UPS logs span many days and are matched by filename
//! prefix. Both listings come back sorted ascending by name so downstream
//! parsing sees rows in chronological order.

use std::fs;
use std::path::{Path, PathBuf};

use chrono::NaiveDate;

use super::IngestError;

/// Per-day HPC files whose filename date lies in `[start, end]`, ascending.
/// Files that do not follow the day naming are ignored.
pub fn daily_files_in_range(
    dir: &Path,
    start: NaiveDate,
    end: NaiveDate,
) -> Result<Vec<(NaiveDate, PathBuf)>, IngestError> {
    let mut files = Vec::new();
    for path in read_dir(dir)? {
        if path.extension().and_then(|e| e.to_str()) != Some("csv") {
            continue;
        }
        let Some(stem) = path.file_stem().and_then(|s| s.to_str()) else {
            continue;
        };
        let Ok(date) = NaiveDate::parse_from_str(stem, "%Y-%m-%d") else {
            continue;
        };
        if date >= start && date <= end {
            files.push((date, path));
        }
    }
    files.sort();
    Ok(files)
}

/// ENT/UPS log files matched by filename prefix, ascending by name.
pub fn prefixed_files(dir: &Path, prefix: &str) -> Result<Vec<PathBuf>, IngestError> {
    let mut files: Vec<PathBuf> = read_dir(dir)?
        .into_iter()
        .filter(|path| {
            path.file_name()
                .and_then(|n| n.to_str())
                .is_some_and(|n| n.starts_with(prefix))
        })
        .collect();
    files.sort();
    Ok(files)
}

fn read_dir(dir: &Path) -> Result<Vec<PathBuf>, IngestError> {
    let entries = fs::read_dir(dir).map_err(|source| IngestError::Io {
        path: dir.to_path_buf(),
        source,
    })?;
    let mut paths = Vec::new();
    for entry in entries {
        let entry = entry.map_err(|source| IngestError::Io {
            path: dir.to_path_buf(),
            source,
        })?;
        if entry.path().is_file() {
            paths.push(entry.path());
        }
    }
    Ok(paths)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs::File;

    fn touch(dir: &Path, name: &str) {
        File::create(dir.join(name)).expect("create");
    }

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).expect("date")
    }

    #[test]
    fn daily_files_are_filtered_by_range_and_sorted() {
        let dir = tempfile::tempdir().expect("tempdir");
        touch(dir.path(), "2024-03-19.csv");
        touch(dir.path(), "2024-03-17.csv");
        touch(dir.path(), "2024-03-18.csv");
        touch(dir.path(), "2024-03-25.csv");
        touch(dir.path(), "UPS-trendlog.csv");
        touch(dir.path(), "notes.txt");

        let files = daily_files_in_range(dir.path(), date(2024, 3, 17), date(2024, 3, 19))
            .expect("discover");
        let names: Vec<String> = files
            .iter()
            .map(|(_, p)| p.file_name().and_then(|n| n.to_str()).unwrap_or("").to_string())
            .collect();
        assert_eq!(
            names,
            vec!["2024-03-17.csv", "2024-03-18.csv", "2024-03-19.csv"]
        );
    }

    #[test]
    fn prefixed_files_match_and_sort_by_name() {
        let dir = tempfile::tempdir().expect("tempdir");
        touch(dir.path(), "UPS-feb.csv");
        touch(dir.path(), "UPS-jan.csv");
        touch(dir.path(), "ENT-log.csv");
        touch(dir.path(), "2024-03-17.csv");

        let files = prefixed_files(dir.path(), "UPS").expect("discover");
        let names: Vec<&str> = files
            .iter()
            .filter_map(|p| p.file_name().and_then(|n| n.to_str()))
            .collect();
        assert_eq!(names, vec!["UPS-feb.csv", "UPS-jan.csv"]);
    }
}
