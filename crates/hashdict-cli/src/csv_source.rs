//! CSV file source.
//!
//! Columns are read positionally: key columns first, then attributes, in
//! the order declared by the dictionary structure. Fields are parsed with
//! [`Value::parse_literal`], so an empty numeric field reads as zero.

use std::fs::{self, File};
use std::io::BufReader;
use std::path::{Path, PathBuf};
use std::time::SystemTime;

use hashdict_core::source::BlockStream;
use hashdict_core::{Block, Column, DictionarySource, Error, Result, Value, ValueType};

/// Rows per produced block.
pub const DEFAULT_BATCH_SIZE: usize = 4096;

/// Reads a dictionary from a delimited text file.
#[derive(Debug, Clone)]
pub struct CsvSource {
    path: PathBuf,
    types: Vec<ValueType>,
    has_headers: bool,
    delimiter: u8,
    batch_size: usize,
    loaded_at: Option<SystemTime>,
}

impl CsvSource {
    /// Creates a source for rows of the given column types.
    pub fn new(path: impl Into<PathBuf>, types: Vec<ValueType>) -> Self {
        Self {
            path: path.into(),
            types,
            has_headers: true,
            delimiter: b',',
            batch_size: DEFAULT_BATCH_SIZE,
            loaded_at: None,
        }
    }

    /// Whether the first line is a header to skip.
    pub fn with_headers(mut self, has_headers: bool) -> Self {
        self.has_headers = has_headers;
        self
    }

    /// Field delimiter.
    pub fn with_delimiter(mut self, delimiter: u8) -> Self {
        self.delimiter = delimiter;
        self
    }

    /// Rows per block.
    pub fn with_batch_size(mut self, batch_size: usize) -> Self {
        self.batch_size = batch_size.max(1);
        self
    }

    /// Path of the file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn modified_time(&self) -> Option<SystemTime> {
        fs::metadata(&self.path).and_then(|m| m.modified()).ok()
    }
}

impl DictionarySource for CsvSource {
    fn load_all(&mut self) -> Result<BlockStream> {
        let file = File::open(&self.path)?;
        self.loaded_at = self.modified_time();
        let reader = csv::ReaderBuilder::new()
            .has_headers(self.has_headers)
            .delimiter(self.delimiter)
            .flexible(true)
            .from_reader(BufReader::with_capacity(128 * 1024, file));

        tracing::debug!(path = %self.path.display(), "reading csv source");
        Ok(Box::new(CsvBlocks {
            reader,
            record: csv::StringRecord::new(),
            types: self.types.clone(),
            batch_size: self.batch_size,
            path: self.path.display().to_string(),
            done: false,
        }))
    }

    fn is_modified(&self) -> bool {
        match (self.loaded_at, self.modified_time()) {
            (Some(loaded), Some(current)) => current != loaded,
            (None, _) => true,
            (Some(_), None) => false,
        }
    }

    fn clone_box(&self) -> Box<dyn DictionarySource> {
        Box::new(self.clone())
    }

    fn describe(&self) -> String {
        format!("csv({})", self.path.display())
    }
}

/// Lazy block iterator over an open CSV reader.
struct CsvBlocks {
    reader: csv::Reader<BufReader<File>>,
    record: csv::StringRecord,
    types: Vec<ValueType>,
    batch_size: usize,
    path: String,
    done: bool,
}

impl CsvBlocks {
    fn read_batch(&mut self) -> Result<Option<Block>> {
        let mut columns: Vec<Column> = self
            .types
            .iter()
            .map(|t| Column::with_capacity(*t, self.batch_size))
            .collect();
        let mut rows = 0;

        while rows < self.batch_size {
            let more = self
                .reader
                .read_record(&mut self.record)
                .map_err(|e| Error::Source(format!("{}: {e}", self.path)))?;
            if !more {
                self.done = true;
                break;
            }
            let line = self.record.position().map_or(0, csv::Position::line);
            if self.record.len() != self.types.len() {
                return Err(Error::Source(format!(
                    "{}:{line}: expected {} fields, found {}",
                    self.path,
                    self.types.len(),
                    self.record.len()
                )));
            }
            for ((column, value_type), field) in columns.iter_mut().zip(&self.types).zip(self.record.iter()) {
                let value = Value::parse_literal(*value_type, field)
                    .map_err(|e| Error::Source(format!("{}:{line}: {e}", self.path)))?;
                column.push(value)?;
            }
            rows += 1;
        }

        if rows == 0 {
            return Ok(None);
        }
        Block::new(columns).map(Some)
    }
}

impl Iterator for CsvBlocks {
    type Item = Result<Block>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }
        match self.read_batch() {
            Ok(Some(block)) => Some(Ok(block)),
            Ok(None) => None,
            Err(err) => {
                self.done = true;
                Some(Err(err))
            }
        }
    }
}
