use std::fs::File;
use std::io::{Read, Seek, SeekFrom};
use std::path::Path;

use csv::{Reader, ReaderBuilder, StringRecord, Terminator};
use tracing::{debug, trace};

use crate::dialect::*;
use crate::encoding::{guess_encoding, Encoding, DEFAULT_ENCODINGS};
use crate::error::*;
use crate::recode::Recoder;
use crate::row::{DictRow, Key};

/// Builds a [`DictReader`], with an optional known encoding, field names, overflow handling and
/// tokenizer settings.
#[derive(Debug)]
pub struct DictReaderBuilder {
    encoding: Option<Encoding>,
    candidates: Vec<Encoding>,
    fieldnames: Option<Vec<String>>,
    rest_key: Key,
    rest_value: Option<String>,
    dialect: Dialect,
}
impl Default for DictReaderBuilder {
    fn default() -> DictReaderBuilder {
        DictReaderBuilder {
            encoding: None,
            candidates: DEFAULT_ENCODINGS.to_vec(),
            fieldnames: None,
            rest_key: Key::Unnamed,
            rest_value: None,
            dialect: Dialect::default(),
        }
    }
}
impl DictReaderBuilder {
    /// Create a new dict reader builder.
    pub fn new() -> DictReaderBuilder {
        DictReaderBuilder::default()
    }
    /// Specify the encoding of the input. When not set, the encoding is guessed by reading the
    /// whole stream.
    pub fn encoding(&mut self, encoding: Encoding) -> &mut DictReaderBuilder {
        self.encoding = Some(encoding);
        self
    }
    /// The encodings to try, in order, when guessing. Defaults to `DEFAULT_ENCODINGS`.
    pub fn candidates(&mut self, candidates: &[Encoding]) -> &mut DictReaderBuilder {
        self.candidates = candidates.to_vec();
        self
    }
    /// Specify the field names. When not set, the first record of the input is used, and is not
    /// returned as a data row.
    pub fn fieldnames<I, S>(&mut self, fieldnames: I) -> &mut DictReaderBuilder
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.fieldnames = Some(fieldnames.into_iter().map(Into::into).collect());
        self
    }
    /// The key under which values beyond the last field name are collected. Defaults to
    /// `Key::Unnamed`.
    pub fn rest_key<K: Into<Key>>(&mut self, key: K) -> &mut DictReaderBuilder {
        self.rest_key = key.into();
        self
    }
    /// The value given to field names past the end of a short record. Defaults to
    /// `Value::Missing`.
    pub fn rest_value<S: Into<String>>(&mut self, value: S) -> &mut DictReaderBuilder {
        self.rest_value = Some(value.into());
        self
    }
    /// Replace all tokenizer settings at once.
    pub fn dialect(&mut self, dialect: Dialect) -> &mut DictReaderBuilder {
        self.dialect = dialect;
        self
    }
    /// Specify the delimiter character.
    pub fn delimiter(&mut self, delimiter: u8) -> &mut DictReaderBuilder {
        self.dialect.delimiter = delimiter;
        self
    }
    /// Specify the quote character (or `Quote::None` to disable quoting).
    pub fn quote(&mut self, quote: Quote) -> &mut DictReaderBuilder {
        self.dialect.quote = quote;
        self
    }
    /// Whether two quotes in a row are interpreted as an escaped quote.
    pub fn double_quote(&mut self, yes: bool) -> &mut DictReaderBuilder {
        self.dialect.doublequote_escapes = yes;
        self
    }
    /// Specify the escape character.
    pub fn escape(&mut self, escape: Escape) -> &mut DictReaderBuilder {
        self.dialect.escape = escape;
        self
    }
    /// Specify the comment character.
    pub fn comment(&mut self, comment: Comment) -> &mut DictReaderBuilder {
        self.dialect.comment = comment;
        self
    }
    /// Specify the record terminator.
    pub fn terminator(&mut self, terminator: Terminator) -> &mut DictReaderBuilder {
        self.dialect.terminator = terminator;
        self
    }
    /// Whether records may differ in length. Defaults to `true`; when `false`, a record whose
    /// length differs from the first record's is an error.
    pub fn flexible(&mut self, yes: bool) -> &mut DictReaderBuilder {
        self.dialect.flexible = yes;
        self
    }

    pub fn from_path<P: AsRef<Path>>(&self, path: P) -> Result<DictReader<File>> {
        self.from_reader(File::open(path)?)
    }

    /// Build a dict reader over `reader`. Unless an encoding was specified, the whole stream is
    /// read to guess one; either way the stream is rewound to the start.
    pub fn from_reader<R: Read + Seek>(&self, mut reader: R) -> Result<DictReader<R>> {
        let encoding = match self.encoding {
            Some(encoding) => encoding,
            None => {
                let mut data = vec![];
                reader.read_to_end(&mut data)?;
                let encoding = guess_encoding(&data, &self.candidates)
                    .ok_or_else(|| ReaderError::EncodingNotDetected(self.candidates.clone()))?;
                debug!(%encoding, n_bytes = data.len(), "guessed encoding");
                encoding
            }
        };
        reader.seek(SeekFrom::Start(0))?;

        debug!(dialect = %self.dialect, "tokenizer settings");
        let bldr: ReaderBuilder = self.dialect.clone().into();
        Ok(DictReader {
            rdr: bldr.from_reader(Recoder::new(reader, encoding)?),
            encoding,
            fieldnames: self.fieldnames.clone(),
            rest_key: self.rest_key.clone(),
            rest_value: self.rest_value.clone(),
            record: StringRecord::new(),
            line_num: 0,
            is_done: false,
        })
    }
}

/// Reads records of a CSV stream as [`DictRow`]s keyed by the field names.
///
/// The reader is an iterator over `Result<DictRow>`. Iteration ends at the end of the stream or
/// after the first error.
pub struct DictReader<R> {
    rdr: Reader<Recoder<R>>,
    encoding: Encoding,
    fieldnames: Option<Vec<String>>,
    rest_key: Key,
    rest_value: Option<String>,
    record: StringRecord,
    line_num: u64,
    is_done: bool,
}

impl DictReader<File> {
    /// Open the file at `path` with the default settings.
    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<DictReader<File>> {
        DictReaderBuilder::new().from_path(path)
    }
}

impl<R: Read + Seek> DictReader<R> {
    /// Read `reader` with the default settings.
    pub fn from_reader(reader: R) -> Result<DictReader<R>> {
        DictReaderBuilder::new().from_reader(reader)
    }
}

impl<R: Read> DictReader<R> {
    /// The encoding the input is decoded with, given or guessed.
    pub fn encoding(&self) -> Encoding {
        self.encoding
    }

    /// Number of lines of the input consumed so far, header and blank lines included. A quoted
    /// field that spans lines counts every line it covers.
    pub fn line_num(&self) -> u64 {
        self.line_num
    }

    pub fn rest_key(&self) -> &Key {
        &self.rest_key
    }

    pub fn rest_value(&self) -> Option<&str> {
        self.rest_value.as_deref()
    }

    /// The field names. If none were given, the first record is read and its trimmed values
    /// become the field names; later calls return the same names without reading further.
    ///
    /// A CSV error while reading the header record is returned as `ReaderError::InvalidHeader`.
    pub fn fieldnames(&mut self) -> Result<&[String]> {
        if self.fieldnames.is_none() {
            let header = match self.read_fields() {
                Ok(header) => header.unwrap_or_default(),
                Err(ReaderError::Csv(err)) => return Err(ReaderError::InvalidHeader(err)),
                Err(err) => return Err(err),
            };
            let fieldnames = trim_all(header);
            debug!(?fieldnames, "read field names from header");
            self.fieldnames = Some(fieldnames);
        }
        Ok(self.fieldnames.as_deref().unwrap_or_default())
    }

    /// Replace the field names. Each name is trimmed of surrounding whitespace.
    pub fn set_fieldnames<I, S>(&mut self, fieldnames: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.fieldnames = Some(trim_all(fieldnames.into_iter().map(Into::into).collect()));
    }

    /// Read the next data row, skipping blank records. Returns `Ok(None)` once the stream is
    /// exhausted, and after any error.
    pub fn read_row(&mut self) -> Result<Option<DictRow>> {
        if self.is_done {
            return Ok(None);
        }
        let result = self.read_row_impl();
        if !matches!(result, Ok(Some(_))) {
            self.is_done = true;
        }
        result
    }

    fn read_row_impl(&mut self) -> Result<Option<DictRow>> {
        // consumes the header record when no field names were given
        self.fieldnames()?;

        let row = loop {
            match self.read_fields()? {
                None => return Ok(None),
                Some(fields) if fields.is_empty() => {
                    trace!(line_num = self.line_num, "skipping blank row");
                }
                Some(fields) => break fields,
            }
        };
        let fieldnames = self.fieldnames.as_deref().unwrap_or_default();
        Ok(Some(DictRow::align(fieldnames, row, &self.rest_key, self.rest_value.as_deref())))
    }

    fn read_fields(&mut self) -> Result<Option<Vec<String>>> {
        let result = self.rdr.read_record(&mut self.record);
        self.update_line_num();
        if !result? {
            return Ok(None);
        }
        Ok(Some(self.record.iter().map(str::to_string).collect()))
    }

    // The tokenizer counts consumed line feeds, starting at 1. A CRLF record stops at the `\r`
    // and leaves its `\n` to the next read, so a last consumed byte other than a line feed means
    // one more line was read than the tokenizer has counted.
    fn update_line_num(&mut self) {
        let pos = self.rdr.position();
        let (n_bytes, line) = (pos.byte(), pos.line());
        if n_bytes == 0 {
            self.line_num = 0;
            return;
        }
        let partial = !self.rdr.get_mut().is_newline_at(n_bytes - 1);
        self.line_num = line - 1 + u64::from(partial);
    }

    /// Unwrap the underlying stream, positioned wherever reading stopped.
    pub fn into_inner(self) -> R {
        self.rdr.into_inner().into_inner()
    }
}

impl<R: Read> Iterator for DictReader<R> {
    type Item = Result<DictRow>;

    fn next(&mut self) -> Option<Result<DictRow>> {
        self.read_row().transpose()
    }
}

fn trim_all(names: Vec<String>) -> Vec<String> {
    names.into_iter().map(|name| name.trim().to_string()).collect()
}
