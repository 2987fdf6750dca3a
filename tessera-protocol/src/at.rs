//! AT command response parsing
//!
//! Only what the applets need: recognising the final result code that ends
//! a response, and pulling values out of the `+CESQ` and `+COPS` information
//! responses. Command semantics stay with the modem.

/// Final result code that terminates an AT response
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum FinalResult {
    /// `OK`
    Ok,
    /// `ERROR`
    Error,
    /// `+CME ERROR: <n>` (mobile equipment error)
    CmeError(u16),
    /// `+CMS ERROR: <n>` (message service error)
    CmsError(u16),
}

impl FinalResult {
    /// Classify a single response line
    ///
    /// Returns `None` for information lines and echoes.
    pub fn from_line(line: &str) -> Option<Self> {
        let line = line.trim();
        if line == "OK" {
            return Some(FinalResult::Ok);
        }
        if line == "ERROR" {
            return Some(FinalResult::Error);
        }
        if let Some(code) = line.strip_prefix("+CME ERROR:") {
            return Some(FinalResult::CmeError(leading_number(code).unwrap_or(0)));
        }
        if let Some(code) = line.strip_prefix("+CMS ERROR:") {
            return Some(FinalResult::CmsError(leading_number(code).unwrap_or(0)));
        }
        None
    }

    /// Returns true for `OK`
    pub fn is_ok(&self) -> bool {
        matches!(self, FinalResult::Ok)
    }
}

/// LTE signal quality from `+CESQ`
///
/// Values are the raw 3GPP indices; 255 means "not known or not detectable".
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct SignalQuality {
    /// Reference signal received quality index
    pub rsrq: u8,
    /// Reference signal received power index
    pub rsrp: u8,
}

/// Raw index reported when a measurement is unavailable
pub const NOT_DETECTABLE: u8 = 255;

/// Parse a `+CESQ: rxlev,ber,rscp,ecno,rsrq,rsrp` response
///
/// The last two comma separated fields are rsrq and rsrp. Fields that do
/// not parse as a number fall back to [`NOT_DETECTABLE`].
pub fn parse_cesq(response: &str) -> Option<SignalQuality> {
    let line = response
        .lines()
        .map(str::trim)
        .find(|line| line.starts_with("+CESQ:"))?;

    let mut fields = line["+CESQ:".len()..].rsplit(',');
    let rsrp = fields.next()?;
    let rsrq = fields.next()?;

    Some(SignalQuality {
        rsrq: leading_number(rsrq)
            .and_then(|v| u8::try_from(v).ok())
            .unwrap_or(NOT_DETECTABLE),
        rsrp: leading_number(rsrp)
            .and_then(|v| u8::try_from(v).ok())
            .unwrap_or(NOT_DETECTABLE),
    })
}

/// Extract the quoted operator from a `+COPS: mode,format,"oper",act` response
///
/// With numeric format this is the MCC/MNC string, e.g. `311480`.
pub fn parse_cops_operator(response: &str) -> Option<&str> {
    let line = response
        .lines()
        .map(str::trim)
        .find(|line| line.starts_with("+COPS:"))?;

    let mut parts = line.split('"');
    parts.next()?;
    let operator = parts.next()?;
    // A closing quote must exist, otherwise the line was truncated
    parts.next()?;

    if operator.is_empty() {
        None
    } else {
        Some(operator)
    }
}

/// Check that a response contains the expected information line
///
/// Used for readiness probes such as `AT+CFUN?` expecting `+CFUN: 1`.
pub fn response_has_line(response: &str, expected: &str) -> bool {
    response.lines().any(|line| line.trim() == expected)
}

/// Parse the decimal digits at the start of `field`, ignoring leading spaces
fn leading_number(field: &str) -> Option<u16> {
    let field = field.trim_start();
    let end = field
        .bytes()
        .position(|b| !b.is_ascii_digit())
        .unwrap_or(field.len());
    if end == 0 {
        return None;
    }
    field[..end].parse().ok()
}
