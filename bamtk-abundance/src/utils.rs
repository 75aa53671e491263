use std::ffi::OsStr;
use std::fs::{self, File};
use std::io::{BufRead, BufReader, Read};
use std::path::Path;

use crate::errors::{AbundanceError, Result};

///
/// Get a reader for either a gzip'd or non-gzip'd file.
///
/// # Arguments
///
/// - path: path to the file to read
///
pub fn get_dynamic_reader(path: &Path) -> Result<BufReader<Box<dyn Read>>> {
    let is_gzipped = path.extension() == Some(OsStr::new("gz"));
    let file = File::open(path).map_err(|err| match err.kind() {
        std::io::ErrorKind::NotFound => AbundanceError::MissingInputFile(path.to_path_buf()),
        _ => AbundanceError::Io(err),
    })?;
    let file: Box<dyn Read> = match is_gzipped {
        true => Box::new(flate2::read::MultiGzDecoder::new(file)),
        false => Box::new(file),
    };

    Ok(BufReader::new(file))
}

///
/// Read the data lines of a tab separated file.
///
/// Comment lines (starting with `#`) and blank lines are dropped. Each kept line
/// comes with its 1-based line number so parse errors can point at it.
///
pub fn read_data_lines(path: &Path) -> Result<Vec<(usize, String)>> {
    let reader = get_dynamic_reader(path)?;
    let mut lines = Vec::new();
    for (index, line) in reader.lines().enumerate() {
        let line = line?;
        let trimmed = line.trim_end_matches(['\r', '\n']);
        if trimmed.is_empty() || trimmed.starts_with('#') {
            continue;
        }
        lines.push((index + 1, trimmed.to_string()));
    }
    Ok(lines)
}

///
/// Strip a (possibly multi-part) extension from a file name.
///
/// `remove_extension("S1.sorted.bam", "bam")` gives `S1.sorted`, and a name that
/// does not carry the extension is returned unchanged.
///
pub fn remove_extension(file_name: &str, extension: &str) -> String {
    let extension = extension.trim_start_matches('.');
    if extension.is_empty() {
        return file_name.to_string();
    }
    match file_name
        .strip_suffix(extension)
        .and_then(|stem| stem.strip_suffix('.'))
    {
        Some(stem) if !stem.is_empty() => stem.to_string(),
        _ => file_name.to_string(),
    }
}

/// Base name of `path` with `extension` removed.
pub fn file_stem_without(path: &str, extension: &str) -> String {
    let base = Path::new(path)
        .file_name()
        .map(|name| name.to_string_lossy().to_string())
        .unwrap_or_else(|| path.to_string());
    remove_extension(&base, extension)
}

/// Fail with [AbundanceError::MissingInputFile] for the first path that is not a file.
pub fn ensure_files_exist(paths: &[&Path]) -> Result<()> {
    for path in paths {
        if !path.is_file() {
            return Err(AbundanceError::MissingInputFile(path.to_path_buf()));
        }
    }
    Ok(())
}

/// Fail with [AbundanceError::MissingInputFile] if `path` is not a directory.
pub fn ensure_dir_exists(path: &Path) -> Result<()> {
    if !path.is_dir() {
        return Err(AbundanceError::MissingInputFile(path.to_path_buf()));
    }
    Ok(())
}

///
/// Create the output directory and refuse to clobber existing outputs.
///
/// # Arguments
/// - dir: output directory, created with its parents when missing
/// - outputs: file names that the run is about to write in `dir`
/// - force_overwrite: allow existing outputs to be replaced
///
pub fn prepare_output_dir(dir: &Path, outputs: &[&str], force_overwrite: bool) -> Result<()> {
    fs::create_dir_all(dir)?;
    if force_overwrite {
        return Ok(());
    }
    for name in outputs {
        let path = dir.join(name);
        if path.exists() {
            return Err(AbundanceError::OutputExists(path));
        }
    }
    Ok(())
}
