use std::collections::VecDeque;
use std::io::{self, BufRead, BufReader, Read};

use encoding_rs_rw::DecodingReader;

use crate::encoding::Encoding;

/// A reader that decodes an underlying byte stream in the given encoding and yields UTF-8.
///
/// Bytes that are invalid in the encoding produce an `io::ErrorKind::InvalidData` error.
///
/// The recoder also remembers where it emitted line feeds, so that a consumer of its output can
/// ask whether the byte at a given output offset ended a line.
pub struct Recoder<R> {
    source: Source<R>,
    encoding: Encoding,
    n_emitted: u64,
    newlines: VecDeque<u64>,
}

enum Source<R> {
    // UTF-8, UTF-16 and other encoding_rs encodings
    Decoding(DecodingReader<BufReader<R>>),
    // Windows-1252, Latin-1 and ASCII, which decode byte by byte
    SingleByte { inner: BufReader<R>, output: Vec<u8>, pos: usize },
}

impl<R: Read> Recoder<R> {
    /// Wrap `inner`. The start of the stream is peeked to pick the byte order of UTF-16 input.
    pub fn new(inner: R, encoding: Encoding) -> io::Result<Recoder<R>> {
        let mut inner = BufReader::new(inner);
        let source = match encoding.stream_decoder(inner.fill_buf()?) {
            Some(decoder) => Source::Decoding(DecodingReader::new(inner, decoder)),
            None => Source::SingleByte { inner, output: vec![], pos: 0 },
        };
        Ok(Recoder { source, encoding, n_emitted: 0, newlines: VecDeque::new() })
    }

    /// Whether the byte at output `offset` is a line feed.
    ///
    /// Offsets must be asked in non-decreasing order; line feeds before `offset` are forgotten.
    pub fn is_newline_at(&mut self, offset: u64) -> bool {
        while self.newlines.front().map_or(false, |&pos| pos < offset) {
            self.newlines.pop_front();
        }
        self.newlines.front() == Some(&offset)
    }

    pub fn into_inner(self) -> R {
        match self.source {
            Source::Decoding(rdr) => rdr.take_reader().0.into_inner(),
            Source::SingleByte { inner, .. } => inner.into_inner(),
        }
    }

    // serve from the decoded output buffer, refilling it a whole input buffer at a time
    fn read_single_byte(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        let (inner, output, pos) = match self.source {
            Source::SingleByte { ref mut inner, ref mut output, ref mut pos } => (inner, output, pos),
            Source::Decoding(_) => unreachable!("single-byte read on a decoding source"),
        };
        if *pos == output.len() {
            output.clear();
            *pos = 0;
            let available = inner.fill_buf()?;
            if available.is_empty() {
                return Ok(0);
            }
            match self.encoding.decode(available) {
                Some(text) => output.extend_from_slice(text.as_bytes()),
                None => {
                    return Err(io::Error::new(
                        io::ErrorKind::InvalidData,
                        format!("stream does not contain valid {}", self.encoding),
                    ))
                }
            }
            let n_consumed = available.len();
            inner.consume(n_consumed);
        }
        let n = buf.len().min(output.len() - *pos);
        buf[..n].copy_from_slice(&output[*pos..*pos + n]);
        *pos += n;
        Ok(n)
    }
}

impl<R: Read> Read for Recoder<R> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        let n_read = match self.source {
            Source::Decoding(ref mut rdr) => rdr.read(buf)?,
            Source::SingleByte { .. } => self.read_single_byte(buf)?,
        };
        for i in memchr::memchr_iter(b'\n', &buf[..n_read]) {
            self.newlines.push_back(self.n_emitted + i as u64);
        }
        self.n_emitted += n_read as u64;
        Ok(n_read)
    }
}
