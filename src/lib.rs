/*!
Read CSV files of unknown text encoding as rows of field-name/value pairs.

The encoding is guessed from an ordered list of candidates (see [`DEFAULT_ENCODINGS`]), the
stream is transcoded to UTF-8 and tokenized by the `csv` crate, and each record is zipped
against the field names: given explicitly, or taken from the first record.

```
use std::io::Cursor;
use udr::{DictReader, Value};

let data = Cursor::new(b"name,city\r\nJos\xe9,Le\xf3n\r\n".to_vec());
let mut rdr = DictReader::from_reader(data)?;
assert_eq!(rdr.encoding().name(), "windows-1252");
assert_eq!(rdr.fieldnames()?, ["name", "city"]);

let row = rdr.next().unwrap()?;
assert_eq!(row.get("city"), Some(&Value::from("León")));
# Ok::<(), udr::error::ReaderError>(())
```
*/
pub mod dialect;
pub use dialect::{Comment, Dialect, Escape, Quote};

pub mod encoding;
pub use encoding::{guess_encoding, Encoding, DEFAULT_ENCODINGS};

pub mod error;

pub mod recode;
pub use recode::Recoder;

mod reader;
pub use reader::{DictReader, DictReaderBuilder};

pub mod row;
pub use row::{DictRow, Key, Value};
