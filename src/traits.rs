use crate::error::Result;

/// Supplies a passphrase when the engine asks for one.
///
/// `uid_hint` names the key the passphrase is for, `info` carries the
/// engine's request context, and `prev_was_bad` is set when the previous
/// attempt was rejected. Implemented for any matching `FnMut` closure.
pub trait PassphraseProvider: 'static + Send {
    fn supply(&mut self, uid_hint: &str, info: &str, prev_was_bad: bool) -> Result<Vec<u8>>;
}

impl<T> PassphraseProvider for T
where
    T: FnMut(&str, &str, bool) -> Result<Vec<u8>> + 'static + Send,
{
    fn supply(&mut self, uid_hint: &str, info: &str, prev_was_bad: bool) -> Result<Vec<u8>> {
        (*self)(uid_hint, info, prev_was_bad)
    }
}

/// Receives progress reports from long-running engine operations.
pub trait ProgressHandler: 'static + Send {
    fn report(&mut self, what: &str, typ: isize, current: isize, total: isize);
}

impl<T> ProgressHandler for T
where
    T: FnMut(&str, isize, isize, isize) + 'static + Send,
{
    fn report(&mut self, what: &str, typ: isize, current: isize, total: isize) {
        (*self)(what, typ, current, total)
    }
}
