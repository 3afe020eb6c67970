//! Utility functions for the sales_forecast crate

use crate::error::{ForecastError, Result};
use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::ops::Range;
use std::path::{Path, PathBuf};

/// Row ranges of a chronological train/test split
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChronologicalSplit {
    pub train: Range<usize>,
    pub test: Range<usize>,
}

/// Split `len` ordered rows into a leading train block and a trailing test block.
///
/// The boundary is `floor(len * (1 - test_ratio))`; rows are never shuffled.
pub fn chronological_split(len: usize, test_ratio: f64) -> Result<ChronologicalSplit> {
    if !(test_ratio > 0.0 && test_ratio < 1.0) {
        return Err(ForecastError::InvalidParameter(format!(
            "test_ratio must be between 0 and 1, got {}",
            test_ratio
        )));
    }

    let split_index = (len as f64 * (1.0 - test_ratio)).floor() as usize;
    if split_index == 0 || split_index == len {
        return Err(ForecastError::InsufficientHistory(format!(
            "{} rows cannot be split into non-empty train and test sets",
            len
        )));
    }

    Ok(ChronologicalSplit {
        train: 0..split_index,
        test: split_index..len,
    })
}

/// Fail with `MissingArtifact` unless `path` is an existing file
pub fn require_artifact(path: &Path) -> Result<()> {
    if path.is_file() {
        Ok(())
    } else {
        Err(ForecastError::MissingArtifact {
            path: path.to_path_buf(),
        })
    }
}

/// Write a file through a sibling temp file and rename it into place.
///
/// Readers never observe a partially written artifact; the parent
/// directory is created when missing.
pub fn write_atomic<F>(path: &Path, write: F) -> Result<()>
where
    F: FnOnce(&mut BufWriter<File>) -> Result<()>,
{
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }

    let tmp = temp_path(path);
    let outcome = File::create(&tmp)
        .map_err(ForecastError::from)
        .and_then(|file| {
            let mut writer = BufWriter::new(file);
            write(&mut writer)?;
            writer.flush()?;
            Ok(())
        });

    match outcome {
        Ok(()) => {
            fs::rename(&tmp, path)?;
            Ok(())
        }
        Err(e) => {
            let _ = fs::remove_file(&tmp);
            Err(e)
        }
    }
}

fn temp_path(path: &Path) -> PathBuf {
    let mut name = path.file_name().unwrap_or_default().to_os_string();
    name.push(".tmp");
    path.with_file_name(name)
}
