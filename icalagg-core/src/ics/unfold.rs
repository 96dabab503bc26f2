//! Line unfolding for calendar text.

use std::io::{self, BufRead};

/// Iterator over logical lines of a calendar stream.
///
/// A physical line starting with a space continues the previous logical
/// line; the single leading space is dropped and the rest appended. Trailing
/// whitespace is stripped from every physical line before folding.
///
/// Bytes that are not valid UTF-8 are replaced rather than rejected, so a
/// stray Latin-1 byte in a property nobody reads doesn't sink the feed.
pub struct Unfolder<R> {
    reader: R,
    buf: Vec<u8>,
    pending: Option<String>,
}

impl<R: BufRead> Unfolder<R> {
    pub fn new(reader: R) -> Self {
        Unfolder {
            reader,
            buf: Vec::new(),
            pending: None,
        }
    }

    fn next_physical(&mut self) -> Option<io::Result<String>> {
        self.buf.clear();
        match self.reader.read_until(b'\n', &mut self.buf) {
            Ok(0) => None,
            Ok(_) => Some(Ok(String::from_utf8_lossy(&self.buf).trim_end().to_string())),
            Err(e) => Some(Err(e)),
        }
    }
}

impl<R: BufRead> Iterator for Unfolder<R> {
    type Item = io::Result<String>;

    fn next(&mut self) -> Option<Self::Item> {
        let first = match self.pending.take() {
            Some(line) => line,
            None => match self.next_physical()? {
                Ok(line) => line,
                Err(e) => return Some(Err(e)),
            },
        };

        // A continuation with nothing before it stands on its own
        let mut logical = match first.strip_prefix(' ') {
            Some(rest) => rest.to_string(),
            None => first,
        };

        while let Some(next) = self.next_physical() {
            let line = match next {
                Ok(line) => line,
                Err(e) => return Some(Err(e)),
            };
            match line.strip_prefix(' ') {
                Some(continuation) => logical.push_str(continuation),
                None => {
                    self.pending = Some(line);
                    break;
                }
            }
        }

        Some(Ok(logical))
    }
}
