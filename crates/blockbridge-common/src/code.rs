//! Engine status codes
//!
//! The filesystem engine speaks plain integers across the device boundary:
//! zero or any positive value is success, any negative value is a failure
//! the engine understands. The bridge passes device codes through verbatim
//! and only ever injects [`ERR_IO`] itself, for operations issued against a
//! config with no registered device.

/// No error.
pub const OK: i32 = 0;

/// Error during device operation. Also returned for operations issued
/// against a config with no registered device.
pub const ERR_IO: i32 = -5;

/// Corrupted storage.
pub const ERR_CORRUPT: i32 = -84;

/// No directory entry.
pub const ERR_NOENT: i32 = -2;

/// Entry already exists.
pub const ERR_EXIST: i32 = -17;

/// Entry is not a directory.
pub const ERR_NOTDIR: i32 = -20;

/// Entry is a directory.
pub const ERR_ISDIR: i32 = -21;

/// Directory is not empty.
pub const ERR_NOTEMPTY: i32 = -39;

/// Bad file number.
pub const ERR_BADF: i32 = -9;

/// File too large.
pub const ERR_FBIG: i32 = -27;

/// Invalid parameter.
pub const ERR_INVAL: i32 = -22;

/// No space left on device.
pub const ERR_NOSPC: i32 = -28;

/// No more memory available.
pub const ERR_NOMEM: i32 = -12;

/// No data/attr available.
pub const ERR_NOATTR: i32 = -61;

/// File name too long.
pub const ERR_NAMETOOLONG: i32 = -36;

/// Check whether a status code signals failure.
#[must_use]
pub const fn is_err(code: i32) -> bool {
    code < 0
}

/// Check whether a status code signals success.
#[must_use]
pub const fn is_ok(code: i32) -> bool {
    code >= 0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_success_codes() {
        assert!(is_ok(OK));
        assert!(is_ok(42));
        assert!(!is_err(OK));
    }

    #[test]
    fn test_failure_codes() {
        assert!(is_err(ERR_IO));
        assert!(is_err(ERR_CORRUPT));
        assert!(!is_ok(ERR_NOSPC));
    }
}
