use std::fs::{File, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use env_logger::{Env, Target};
use log::LevelFilter;

use bamtk_abundance::consts::LOG_FILE;

///
/// Sends every log record to stderr and to the run log file.
///
/// The log file is opened once its directory exists; the directory itself is
/// never created here. Records written before that are held back and land at
/// the top of the file.
///
struct LogTee {
    dir: Option<PathBuf>,
    file: Option<File>,
    pending: Vec<u8>,
}

impl LogTee {
    fn new(dir: Option<&Path>) -> Self {
        LogTee {
            dir: dir.map(Path::to_path_buf),
            file: None,
            pending: Vec::new(),
        }
    }

    fn log_file(&mut self) -> io::Result<Option<&mut File>> {
        if self.file.is_none() {
            let Some(dir) = self.dir.as_ref().filter(|dir| dir.is_dir()) else {
                return Ok(None);
            };
            let mut file = OpenOptions::new()
                .create(true)
                .append(true)
                .open(dir.join(LOG_FILE))?;
            file.write_all(&self.pending)?;
            self.pending = Vec::new();
            self.file = Some(file);
        }
        Ok(self.file.as_mut())
    }
}

impl Write for LogTee {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        io::stderr().write_all(buf)?;
        let has_dir = self.dir.is_some();
        match self.log_file()? {
            Some(file) => file.write_all(buf)?,
            None if has_dir => self.pending.extend_from_slice(buf),
            None => {}
        }
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        io::stderr().flush()?;
        if let Some(file) = self.file.as_mut() {
            file.flush()?;
        }
        Ok(())
    }
}

///
/// Set up logging for a run.
///
/// `RUST_LOG` is honoured and defaults to `info`. With `silent` nothing is logged.
///
pub fn init_logging(log_dir: Option<&Path>, silent: bool) {
    let mut builder = env_logger::Builder::from_env(Env::default().default_filter_or("info"));
    if silent {
        builder.filter_level(LevelFilter::Off);
        builder.init();
        return;
    }

    builder
        .target(Target::Pipe(Box::new(LogTee::new(log_dir))))
        .init();
}

#[cfg(test)]
mod tests {
    use super::*;

    use std::fs;

    use pretty_assertions::assert_eq;
    use rstest::*;
    use tempfile::tempdir;

    #[rstest]
    fn test_missing_log_dir_is_not_created() {
        let dir = tempdir().unwrap();
        let features_dir = dir.path().join("featurs");
        let mut tee = LogTee::new(Some(&features_dir));

        tee.write_all(b"checking inputs\n").unwrap();
        tee.flush().unwrap();

        assert!(!features_dir.exists());
    }

    #[rstest]
    fn test_held_back_records_reach_the_log_file() {
        let dir = tempdir().unwrap();
        let output_dir = dir.path().join("out");
        let mut tee = LogTee::new(Some(&output_dir));

        tee.write_all(b"before\n").unwrap();
        fs::create_dir(&output_dir).unwrap();
        tee.write_all(b"after\n").unwrap();
        tee.flush().unwrap();

        let written = fs::read_to_string(output_dir.join(LOG_FILE)).unwrap();
        assert_eq!(written, "before\nafter\n");
    }

    #[rstest]
    fn test_no_log_dir_keeps_nothing() {
        let mut tee = LogTee::new(None);
        tee.write_all(b"stderr only\n").unwrap();
        assert!(tee.pending.is_empty());
        assert!(tee.file.is_none());
    }
}
