//! Data sources for the outbound poster

use core::fmt;
use core::str;

/// Something the poster can serialize into a query string
pub trait DataSource {
    /// Write a `key=value&key=value` representation into `out`
    ///
    /// The writer truncates silently, so implementations can use `write!`
    /// and ignore the result.
    fn retrieve(&self, out: &mut QueryWriter<'_>);
}

/// Bounded writer over a caller-supplied buffer
///
/// Never writes past `min(limit, buf.len())` bytes. Text that does not fit
/// is dropped at a character boundary.
pub struct QueryWriter<'b> {
    buf: &'b mut [u8],
    limit: usize,
    len: usize,
    truncated: bool,
}

impl<'b> QueryWriter<'b> {
    /// Wrap `buf`, allowing at most `limit` bytes
    pub fn new(buf: &'b mut [u8], limit: usize) -> Self {
        let limit = limit.min(buf.len());
        Self {
            buf,
            limit,
            len: 0,
            truncated: false,
        }
    }

    /// Bytes written so far
    pub fn len(&self) -> usize {
        self.len
    }

    /// Check if nothing was written
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Maximum number of bytes this writer accepts
    pub fn limit(&self) -> usize {
        self.limit
    }

    /// Check if any write was cut short
    pub fn truncated(&self) -> bool {
        self.truncated
    }

    /// Written text
    pub fn as_str(&self) -> &str {
        // Only whole characters are ever copied in
        str::from_utf8(&self.buf[..self.len]).unwrap_or("")
    }

    /// Append `s`, dropping whatever does not fit
    ///
    /// Once a write has been cut short every later write is dropped, so the
    /// text is always a prefix of what was written.
    pub fn push_str(&mut self, s: &str) {
        if self.truncated {
            return;
        }
        let room = self.limit - self.len;
        let take = if s.len() <= room {
            s.len()
        } else {
            self.truncated = true;
            let mut end = room;
            while !s.is_char_boundary(end) {
                end -= 1;
            }
            end
        };

        self.buf[self.len..self.len + take].copy_from_slice(&s.as_bytes()[..take]);
        self.len += take;
    }
}

impl fmt::Write for QueryWriter<'_> {
    fn write_str(&mut self, s: &str) -> fmt::Result {
        self.push_str(s);
        Ok(())
    }
}
