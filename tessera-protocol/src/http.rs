//! HTTP request framing for the outbound poster
//!
//! The poster publishes each data source as a query string on a dweet.io
//! style endpoint:
//!
//! ```text
//! POST /dweet/for/{thing}?{query} HTTP/1.1\r\n\r\n
//! ```
//!
//! Connection handling is the transport's job; this module only frames the
//! bytes.

use core::fmt::{self, Write};

/// Path prefix every request is posted under
pub const DWEET_PATH: &str = "/dweet/for/";

/// Largest query a single data source may produce
pub const MAX_QUERY_SIZE: usize = 2000;

/// Largest request this module frames
///
/// Query plus request line, path and a thing name of up to 64 bytes.
pub const MAX_REQUEST_SIZE: usize = MAX_QUERY_SIZE + 128;

/// Request framing errors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum HttpError {
    /// Output buffer too small for the request
    BufferTooSmall,
}

/// Frame a POST request for `thing` carrying `query`
///
/// Returns the number of bytes written to `out`.
pub fn post_request(out: &mut [u8], thing: &str, query: &str) -> Result<usize, HttpError> {
    let mut cursor = Cursor { buf: out, len: 0 };
    write!(cursor, "POST {}{}?{} HTTP/1.1\r\n\r\n", DWEET_PATH, thing, query)
        .map_err(|_| HttpError::BufferTooSmall)?;
    Ok(cursor.len)
}

/// Fixed buffer writer that fails instead of truncating
struct Cursor<'a> {
    buf: &'a mut [u8],
    len: usize,
}

impl Write for Cursor<'_> {
    fn write_str(&mut self, s: &str) -> fmt::Result {
        let bytes = s.as_bytes();
        let end = self.len.checked_add(bytes.len()).ok_or(fmt::Error)?;
        if end > self.buf.len() {
            return Err(fmt::Error);
        }
        self.buf[self.len..end].copy_from_slice(bytes);
        self.len = end;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_post_request() {
        let mut buf = [0u8; 128];
        let len = post_request(&mut buf, "tessera", "rsrp=45&rsrq=20&carrier=VZW").unwrap();
        assert_eq!(
            &buf[..len],
            b"POST /dweet/for/tessera?rsrp=45&rsrq=20&carrier=VZW HTTP/1.1\r\n\r\n"
        );
    }

    #[test]
    fn test_post_request_too_small() {
        let mut buf = [0u8; 16];
        assert_eq!(
            post_request(&mut buf, "tessera", "a=1"),
            Err(HttpError::BufferTooSmall)
        );
    }

    #[test]
    fn test_post_request_exact_fit() {
        let expected = b"POST /dweet/for/t?a=1 HTTP/1.1\r\n\r\n";
        let mut buf = [0u8; 35];
        assert_eq!(buf.len(), expected.len());
        let len = post_request(&mut buf, "t", "a=1").unwrap();
        assert_eq!(&buf[..len], expected);
    }
}
