use std::error;
use std::fmt;
use std::io;
use std::result;

/// A raw status word as returned by every engine primitive.
///
/// The layout follows the libgpg-error convention: the error code occupies
/// the low 16 bits, the reporting source the bits above `SOURCE_SHIFT`, and
/// bit 15 marks codes carried over from the operating system's errno space.
pub type RawStatus = u32;

/// The code portion of a raw status word.
pub type ErrorCode = u32;

pub const CODE_MASK: RawStatus = (1 << 16) - 1;
pub const SOURCE_MASK: RawStatus = 127;
pub const SOURCE_SHIFT: u32 = 24;
pub const SYSTEM_ERROR_FLAG: ErrorCode = 1 << 15;

pub const GPG_ERR_NO_ERROR: ErrorCode = 0;
pub const GPG_ERR_GENERAL: ErrorCode = 1;
pub const GPG_ERR_BAD_SIGNATURE: ErrorCode = 8;
pub const GPG_ERR_NO_PUBKEY: ErrorCode = 9;
pub const GPG_ERR_BAD_PASSPHRASE: ErrorCode = 11;
pub const GPG_ERR_INV_ARMOR: ErrorCode = 15;
pub const GPG_ERR_NO_SECKEY: ErrorCode = 17;
pub const GPG_ERR_INV_VALUE: ErrorCode = 55;
pub const GPG_ERR_NO_DATA: ErrorCode = 58;
pub const GPG_ERR_CONFLICT: ErrorCode = 70;
pub const GPG_ERR_NOT_OPERATIONAL: ErrorCode = 176;
pub const GPG_ERR_EOF: ErrorCode = 16383;
pub const GPG_ERR_ENOENT: ErrorCode = SYSTEM_ERROR_FLAG | 2;
pub const GPG_ERR_EIO: ErrorCode = SYSTEM_ERROR_FLAG | 5;

pub const GPG_ERR_SOURCE_UNKNOWN: u32 = 0;
pub const GPG_ERR_SOURCE_ENGINE: u32 = 7;
pub const GPG_ERR_SOURCE_USER_1: u32 = 32;

/// Builds a raw status word from a source and a code.
pub fn err_make(source: u32, code: ErrorCode) -> RawStatus {
    if code == GPG_ERR_NO_ERROR {
        return 0;
    }
    ((source & SOURCE_MASK) << SOURCE_SHIFT) | (code & CODE_MASK)
}

/// Extracts the code portion of a raw status word.
pub fn err_code(err: RawStatus) -> ErrorCode {
    err & CODE_MASK
}

/// Extracts the source portion of a raw status word.
pub fn err_source(err: RawStatus) -> u32 {
    (err >> SOURCE_SHIFT) & SOURCE_MASK
}

/// An error returned by an engine primitive.
///
/// Wraps the raw status word; `code()` strips the source bits. This type is
/// the single classification point for engine statuses: no other module
/// interprets raw codes beyond testing for `GPG_ERR_EOF`.
#[derive(Clone, Copy, Eq, PartialEq, Hash)]
pub struct Error {
    err: RawStatus,
}

impl Error {
    pub const EOF: Error = Error { err: GPG_ERR_EOF };

    #[inline]
    pub fn new(err: RawStatus) -> Error {
        Error { err }
    }

    #[inline]
    pub fn from_code(code: ErrorCode) -> Error {
        Error::new(err_make(GPG_ERR_SOURCE_ENGINE, code))
    }

    #[inline]
    pub fn raw(&self) -> RawStatus {
        self.err
    }

    #[inline]
    pub fn code(&self) -> ErrorCode {
        err_code(self.err)
    }

    #[inline]
    pub fn is_eof(&self) -> bool {
        self.code() == GPG_ERR_EOF
    }

    /// Returns the name of the component the error originated from.
    pub fn source(&self) -> Option<&'static str> {
        match err_source(self.err) {
            GPG_ERR_SOURCE_UNKNOWN => None,
            GPG_ERR_SOURCE_ENGINE => Some("engine"),
            GPG_ERR_SOURCE_USER_1 => Some("user"),
            _ => Some("other"),
        }
    }

    /// Renders the error for presentation using the engine's string
    /// rendering primitive. Falls back to a generic message when no engine
    /// is registered.
    pub fn description(&self) -> String {
        match crate::installed_engine() {
            Ok(engine) => engine.strerror(self.code()),
            Err(_) => format!("error code {}", self.code()),
        }
    }
}

impl error::Error for Error {}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} (error {})", self.description(), self.code())
    }
}

impl fmt::Debug for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Error")
            .field("code", &self.code())
            .field("source", &self.source())
            .finish()
    }
}

impl From<Error> for io::Error {
    fn from(err: Error) -> io::Error {
        io::Error::new(io::ErrorKind::Other, err)
    }
}

pub type Result<T> = result::Result<T, Error>;

static_assertions::assert_impl_all!(Error: Send, Sync);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn packing_round_trip() {
        let raw = err_make(GPG_ERR_SOURCE_ENGINE, GPG_ERR_INV_VALUE);
        assert_eq!(err_code(raw), GPG_ERR_INV_VALUE);
        assert_eq!(err_source(raw), GPG_ERR_SOURCE_ENGINE);
    }

    #[test]
    fn success_has_no_source() {
        assert_eq!(err_make(GPG_ERR_SOURCE_ENGINE, GPG_ERR_NO_ERROR), 0);
    }

    #[test]
    fn eof_classification() {
        assert!(Error::from_code(GPG_ERR_EOF).is_eof());
        assert!(!Error::from_code(GPG_ERR_GENERAL).is_eof());
        assert_eq!(Error::EOF.code(), GPG_ERR_EOF);
    }

    #[test]
    fn source_names() {
        assert_eq!(Error::from_code(GPG_ERR_GENERAL).source(), Some("engine"));
        assert_eq!(Error::new(GPG_ERR_GENERAL).source(), None);
    }
}
