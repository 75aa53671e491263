use std::io::{self, BufRead, BufReader, Cursor, Read};
use std::process::{Child, Command, Stdio};

use fxhash::FxHashMap;
use log::debug;

use crate::config::AbundanceConfig;
use crate::errors::{AbundanceError, Result};

///
/// A line oriented stream of alignment records for one sample.
///
/// When the stream is backed by a child process, [RecordStream::finish] waits for
/// it and turns a non-zero exit status into [AbundanceError::ProducerFailed].
///
pub struct RecordStream {
    source_id: String,
    reader: Box<dyn BufRead>,
    child: Option<Child>,
}

impl RecordStream {
    pub fn from_reader(source_id: &str, reader: impl BufRead + 'static) -> Self {
        RecordStream {
            source_id: source_id.to_string(),
            reader: Box::new(reader),
            child: None,
        }
    }

    pub fn source_id(&self) -> &str {
        &self.source_id
    }

    pub fn finish(mut self) -> Result<()> {
        let Some(mut child) = self.child.take() else {
            return Ok(());
        };
        // drain whatever the producer still has to say so it can exit
        io::copy(&mut self.reader, &mut io::sink())?;
        let status = child.wait()?;
        if status.success() {
            Ok(())
        } else {
            Err(AbundanceError::ProducerFailed {
                source_id: self.source_id.clone(),
                message: format!("exited with {}", status),
            })
        }
    }
}

impl Drop for RecordStream {
    // a stream abandoned before `finish` must not leave the producer running
    fn drop(&mut self) {
        if let Some(mut child) = self.child.take() {
            if let Err(err) = child.kill() {
                debug!("Could not stop the producer of '{}': {}", self.source_id, err);
            }
            let _ = child.wait();
        }
    }
}

impl Read for RecordStream {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        self.reader.read(buf)
    }
}

impl BufRead for RecordStream {
    fn fill_buf(&mut self) -> io::Result<&[u8]> {
        self.reader.fill_buf()
    }

    fn consume(&mut self, amt: usize) {
        self.reader.consume(amt)
    }
}

///
/// Something that turns an alignment source identifier into a record stream.
///
pub trait RecordSource {
    fn open(&self, source_id: &str) -> Result<RecordStream>;
}

///
/// Records produced by `samtools view -@ <threads> -q <mapq> <source>`.
///
#[derive(Debug, Clone)]
pub struct SamtoolsView {
    executable: String,
    threads: usize,
    min_mapq: u8,
}

impl SamtoolsView {
    pub fn new(executable: &str, threads: usize, min_mapq: u8) -> Self {
        SamtoolsView {
            executable: executable.to_string(),
            threads,
            min_mapq,
        }
    }

    pub fn from_config(config: &AbundanceConfig) -> Self {
        SamtoolsView::new(&config.samtools, config.threads, config.map_q)
    }

    fn args(&self, source_id: &str) -> Vec<String> {
        vec![
            "view".to_string(),
            "-@".to_string(),
            self.threads.to_string(),
            "-q".to_string(),
            self.min_mapq.to_string(),
            source_id.to_string(),
        ]
    }
}

impl RecordSource for SamtoolsView {
    fn open(&self, source_id: &str) -> Result<RecordStream> {
        let args = self.args(source_id);
        debug!("Running {} {}", self.executable, args.join(" "));

        let mut child = Command::new(&self.executable)
            .args(&args)
            .stdout(Stdio::piped())
            .spawn()
            .map_err(|err| AbundanceError::ProducerFailed {
                source_id: source_id.to_string(),
                message: format!("could not run '{}': {}", self.executable, err),
            })?;

        let stdout = child
            .stdout
            .take()
            .ok_or_else(|| AbundanceError::ProducerFailed {
                source_id: source_id.to_string(),
                message: "stdout was not captured".to_string(),
            })?;

        Ok(RecordStream {
            source_id: source_id.to_string(),
            reader: Box::new(BufReader::new(stdout)),
            child: Some(child),
        })
    }
}

///
/// Records held in memory, keyed by source identifier.
///
#[derive(Debug, Clone, Default)]
pub struct InMemorySource {
    records: FxHashMap<String, String>,
}

impl InMemorySource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_records(mut self, source_id: &str, records: &str) -> Self {
        self.records
            .insert(source_id.to_string(), records.to_string());
        self
    }
}

impl RecordSource for InMemorySource {
    fn open(&self, source_id: &str) -> Result<RecordStream> {
        let records = self
            .records
            .get(source_id)
            .ok_or_else(|| AbundanceError::ProducerFailed {
                source_id: source_id.to_string(),
                message: "no records registered for this source".to_string(),
            })?;
        Ok(RecordStream::from_reader(
            source_id,
            Cursor::new(records.clone().into_bytes()),
        ))
    }
}
