use std::time::{Duration, SystemTime, UNIX_EPOCH};

macro_rules! return_err {
    ($e:expr) => {
        match $e {
            0 => (),
            err => return Err($crate::Error::new(err)),
        }
    };
}

/// Converts an engine epoch timestamp into a `SystemTime`.
///
/// Zero and negative values are sentinels for "unset"/"never" and are
/// preserved as `None` rather than coerced into a real date.
pub fn epoch_to_time(timestamp: i64) -> Option<SystemTime> {
    if timestamp > 0 {
        Some(UNIX_EPOCH + Duration::from_secs(timestamp as u64))
    } else {
        None
    }
}

pub fn nonempty(s: Option<String>) -> Option<String> {
    s.filter(|s| !s.is_empty())
}
