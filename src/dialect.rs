use std::fmt;

use csv::{ReaderBuilder, Terminator};

/// Tokenizer settings passed through to the underlying CSV reader.
///
/// The default matches the usual spreadsheet export: comma-delimited, `"`-quoted with doubled
/// quotes as escapes, CRLF (or any line ending) terminated, and flexible about the number of
/// fields per record.
#[derive(Clone)]
pub struct Dialect {
    pub delimiter: u8,
    pub terminator: Terminator,
    pub quote: Quote,
    pub doublequote_escapes: bool,
    pub escape: Escape,
    pub comment: Comment,
    /// Whether records may have differing numbers of fields. When `false`, a record whose
    /// length differs from the first record's is a CSV error.
    pub flexible: bool,
}
impl Default for Dialect {
    fn default() -> Dialect {
        Dialect {
            delimiter: b',',
            terminator: Terminator::CRLF,
            quote: Quote::Some(b'"'),
            doublequote_escapes: true,
            escape: Escape::Disabled,
            comment: Comment::Disabled,
            flexible: true,
        }
    }
}
impl fmt::Debug for Dialect {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.debug_struct("Dialect")
            .field("delimiter", &char::from(self.delimiter))
            .field("terminator", &self.terminator)
            .field("quote", &self.quote)
            .field("doublequote_escapes", &self.doublequote_escapes)
            .field("escape", &self.escape)
            .field("comment", &self.comment)
            .field("flexible", &self.flexible)
            .finish()
    }
}
impl fmt::Display for Dialect {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        writeln!(f, "Dialect:")?;
        writeln!(f, "\tDelimiter: {}", char::from(self.delimiter))?;
        writeln!(f, "\tTerminator: {}", match self.terminator {
            Terminator::Any(chr) => format!("{:?}", char::from(chr)),
            _ => "CRLF".into()
        })?;
        writeln!(f, "\tQuote character: {}", match self.quote {
            Quote::Some(chr) => format!("{}", char::from(chr)),
            Quote::None => "none".into()
        })?;
        writeln!(f, "\tDouble-quote escapes?: {}", self.doublequote_escapes)?;
        writeln!(f, "\tEscape character: {}", match self.escape {
            Escape::Enabled(chr) => format!("{}", char::from(chr)),
            Escape::Disabled => "none".into(),
        })?;
        writeln!(f, "\tComment character: {}", match self.comment {
            Comment::Enabled(chr) => format!("{}", char::from(chr)),
            Comment::Disabled => "none".into()
        })?;
        writeln!(f, "\tFlexible: {}", self.flexible)
    }
}
impl From<Dialect> for ReaderBuilder {
    fn from(dialect: Dialect) -> ReaderBuilder {
        let mut bldr = ReaderBuilder::new();
        // header rows are handled by the dict reader, not the tokenizer
        bldr.delimiter(dialect.delimiter)
            .has_headers(false)
            .terminator(dialect.terminator)
            .escape(dialect.escape.into())
            .double_quote(dialect.doublequote_escapes)
            .comment(dialect.comment.into())
            .flexible(dialect.flexible);

        match dialect.quote {
            Quote::Some(character) => {
                bldr.quoting(true);
                bldr.quote(character);
            },
            Quote::None => {
                bldr.quoting(false);
            }
        }

        bldr
    }
}

/// Information about the quoting style of the CSV file.
#[derive(Clone, PartialEq)]
pub enum Quote {
    /// Quotes are not used in the CSV file.
    None,
    /// The character used as the quote character
    Some(u8)
}
impl fmt::Debug for Quote {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match *self {
            Quote::Some(ref character) => {
                f.debug_struct("Some")
                    .field("character", &char::from(*character))
                    .finish()
            },
            Quote::None => write!(f, "None")
        }
    }
}

/// The escape character (or `Disabled` if escaping is disabled)
#[derive(Clone, PartialEq)]
pub enum Escape {
    Enabled(u8),
    Disabled
}
impl From<Escape> for Option<u8> {
    fn from(escape: Escape) -> Option<u8> {
        match escape {
            Escape::Enabled(chr) => Some(chr),
            Escape::Disabled => None
        }
    }
}
impl fmt::Debug for Escape {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match *self {
            Escape::Enabled(chr) => write!(f, "Enabled({})", char::from(chr)),
            Escape::Disabled => write!(f, "Disabled")
        }
    }
}

/// The comment character (or `Disabled` if commenting doesn't exist in this dialect)
#[derive(Clone, PartialEq)]
pub enum Comment {
    Enabled(u8),
    Disabled
}
impl From<Comment> for Option<u8> {
    fn from(comment: Comment) -> Option<u8> {
        match comment {
            Comment::Enabled(chr) => Some(chr),
            Comment::Disabled => None
        }
    }
}
impl fmt::Debug for Comment {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match *self {
            Comment::Enabled(chr) => write!(f, "Enabled({})", char::from(chr)),
            Comment::Disabled => write!(f, "Disabled")
        }
    }
}
