use std::fmt;
use std::io::{self, Read, Seek, SeekFrom, Write};
use std::marker::PhantomData;
use std::path::Path;
use std::result;
use std::slice;

use libc::{c_int, c_void, off_t, ssize_t, SEEK_CUR, SEEK_END, SEEK_SET};

use crate::engine::{DataCallbacks, RawData};
use crate::error::{self, Error, Result};

/// Chunk size used by the bulk read loop.
pub(crate) const BLOCK_SIZE: usize = 4096;

/// An error wrapping the source value that could not be converted into a
/// data object, so the caller gets it back.
pub struct WrappedError<S>(Error, S);

impl<S> WrappedError<S> {
    pub fn error(&self) -> Error {
        self.0
    }

    pub fn into_inner(self) -> S {
        self.1
    }
}

impl<S> fmt::Debug for WrappedError<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(&self.0, f)
    }
}

impl<S> fmt::Display for WrappedError<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.0, f)
    }
}

impl<S> std::error::Error for WrappedError<S> {}

/// Content classification reported by [`Data::identify`].
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
#[non_exhaustive]
pub enum Type {
    Invalid,
    Unknown,
    PgpArmored,
    PgpSigned,
    PgpEncrypted,
    PgpOther,
    PgpKey,
    CmsSigned,
    CmsEncrypted,
    CmsOther,
    X509Certificate,
    Pkcs12,
}

impl Type {
    pub(crate) fn from_raw(raw: u32) -> Type {
        match raw {
            0x01 => Type::Unknown,
            0x0f => Type::PgpArmored,
            0x10 => Type::PgpSigned,
            0x11 => Type::PgpEncrypted,
            0x12 => Type::PgpOther,
            0x13 => Type::PgpKey,
            0x20 => Type::CmsSigned,
            0x21 => Type::CmsEncrypted,
            0x22 => Type::CmsOther,
            0x23 => Type::X509Certificate,
            0x24 => Type::Pkcs12,
            _ => Type::Invalid,
        }
    }
}

/// On-the-wire encoding of a data object's content.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
#[non_exhaustive]
pub enum Encoding {
    None,
    Binary,
    Base64,
    Armor,
    Url,
    UrlEsc,
    Url0,
}

impl Encoding {
    pub(crate) fn from_raw(raw: u32) -> Encoding {
        match raw {
            1 => Encoding::Binary,
            2 => Encoding::Base64,
            3 => Encoding::Armor,
            4 => Encoding::Url,
            5 => Encoding::UrlEsc,
            6 => Encoding::Url0,
            _ => Encoding::None,
        }
    }

    pub(crate) fn raw(self) -> u32 {
        match self {
            Encoding::None => 0,
            Encoding::Binary => 1,
            Encoding::Base64 => 2,
            Encoding::Armor => 3,
            Encoding::Url => 4,
            Encoding::UrlEsc => 5,
            Encoding::Url0 => 6,
        }
    }
}

/// An exchange buffer for engine operations.
///
/// A `Data` either owns its bytes (memory and eager file buffers), borrows
/// caller memory without copying (the lifetime parameter pins the borrow),
/// or streams through caller-supplied callbacks. The engine reads input
/// operands from the current position and appends output at the current
/// position, so rewind an output buffer before reading it back.
#[derive(Debug)]
pub struct Data<'buf> {
    data: RawData,
    marker: PhantomData<&'buf [u8]>,
}

impl Drop for Data<'_> {
    fn drop(&mut self) {
        if let Ok(engine) = crate::installed_engine() {
            engine.data_release(self.data);
        }
    }
}

impl<'buf> Data<'buf> {
    pub(crate) fn from_raw(data: RawData) -> Data<'buf> {
        Data {
            data,
            marker: PhantomData,
        }
    }

    pub(crate) fn as_raw(&self) -> RawData {
        self.data
    }

    /// Creates an empty, growable buffer.
    pub fn new() -> Result<Data<'static>> {
        let engine = crate::installed_engine()?;
        let mut handle = 0;
        return_err!(engine.data_new(&mut handle));
        Ok(Data::from_raw(handle))
    }

    /// Creates a buffer holding a copy of `bytes`.
    pub fn from_bytes(bytes: impl AsRef<[u8]>) -> Result<Data<'static>> {
        let engine = crate::installed_engine()?;
        let bytes = bytes.as_ref();
        let mut handle = 0;
        unsafe {
            return_err!(engine.data_new_from_mem(&mut handle, bytes.as_ptr(), bytes.len(), true));
        }
        Ok(Data::from_raw(handle))
    }

    /// Creates a buffer over `buf` without copying. The buffer must not be
    /// modified while the data object is alive; the borrow enforces it.
    pub fn from_buffer<B: AsRef<[u8]> + ?Sized>(buf: &'buf B) -> Result<Data<'buf>> {
        let engine = crate::installed_engine()?;
        let buf = buf.as_ref();
        let mut handle = 0;
        unsafe {
            return_err!(engine.data_new_from_mem(&mut handle, buf.as_ptr(), buf.len(), false));
        }
        Ok(Data::from_raw(handle))
    }

    /// Creates a buffer from the file at `path`.
    ///
    /// With `copy` the whole file is read at construction and later changes
    /// to the file are invisible. Without it the file is opened lazily and
    /// read on demand, so reads observe the file as it is then.
    pub fn from_file(path: impl AsRef<Path>, copy: bool) -> Result<Data<'static>> {
        let engine = crate::installed_engine()?;
        let mut handle = 0;
        return_err!(engine.data_new_from_file(&mut handle, path.as_ref(), copy));
        Ok(Data::from_raw(handle))
    }

    /// Eagerly loads the file at `path`. Shorthand for
    /// [`from_file`](Data::from_file) with `copy` set.
    pub fn load(path: impl AsRef<Path>) -> Result<Data<'static>> {
        Data::from_file(path, true)
    }

    pub fn from_reader<R>(r: R) -> result::Result<Data<'static>, WrappedError<R>>
    where
        R: Read + Send + 'static,
    {
        let cbs = DataCallbacks {
            read: Some(read_callback::<R>),
            write: None,
            seek: None,
            release: Some(release_callback::<R>),
        };
        unsafe { Data::from_callbacks(cbs, r) }
    }

    pub fn from_seekable_reader<R>(r: R) -> result::Result<Data<'static>, WrappedError<R>>
    where
        R: Read + Seek + Send + 'static,
    {
        let cbs = DataCallbacks {
            read: Some(read_callback::<R>),
            write: None,
            seek: Some(seek_callback::<R>),
            release: Some(release_callback::<R>),
        };
        unsafe { Data::from_callbacks(cbs, r) }
    }

    pub fn from_writer<W>(w: W) -> result::Result<Data<'static>, WrappedError<W>>
    where
        W: Write + Send + 'static,
    {
        let cbs = DataCallbacks {
            read: None,
            write: Some(write_callback::<W>),
            seek: None,
            release: Some(release_callback::<W>),
        };
        unsafe { Data::from_callbacks(cbs, w) }
    }

    pub fn from_seekable_writer<W>(w: W) -> result::Result<Data<'static>, WrappedError<W>>
    where
        W: Write + Seek + Send + 'static,
    {
        let cbs = DataCallbacks {
            read: None,
            write: Some(write_callback::<W>),
            seek: Some(seek_callback::<W>),
            release: Some(release_callback::<W>),
        };
        unsafe { Data::from_callbacks(cbs, w) }
    }

    pub fn from_stream<S>(s: S) -> result::Result<Data<'static>, WrappedError<S>>
    where
        S: Read + Write + Send + 'static,
    {
        let cbs = DataCallbacks {
            read: Some(read_callback::<S>),
            write: Some(write_callback::<S>),
            seek: None,
            release: Some(release_callback::<S>),
        };
        unsafe { Data::from_callbacks(cbs, s) }
    }

    pub fn from_seekable_stream<S>(s: S) -> result::Result<Data<'static>, WrappedError<S>>
    where
        S: Read + Write + Seek + Send + 'static,
    {
        let cbs = DataCallbacks {
            read: Some(read_callback::<S>),
            write: Some(write_callback::<S>),
            seek: Some(seek_callback::<S>),
            release: Some(release_callback::<S>),
        };
        unsafe { Data::from_callbacks(cbs, s) }
    }

    unsafe fn from_callbacks<S>(
        cbs: DataCallbacks,
        src: S,
    ) -> result::Result<Data<'static>, WrappedError<S>>
    where
        S: Send + 'static,
    {
        let engine = match crate::installed_engine() {
            Ok(engine) => engine,
            Err(err) => return Err(WrappedError(err, src)),
        };
        let hook = Box::into_raw(Box::new(CallbackWrapper { inner: src }));
        let mut handle = 0;
        match engine.data_new_from_cbs(&mut handle, cbs, hook.cast()) {
            0 => Ok(Data::from_raw(handle)),
            status => {
                let wrapper = Box::from_raw(hook);
                Err(WrappedError(Error::new(status), wrapper.inner))
            }
        }
    }

    /// Reads up to `len` bytes from the current position.
    ///
    /// A successful return is never empty; when the buffer is exhausted the
    /// end of stream is reported as an error whose code is the reserved
    /// end-of-stream sentinel.
    pub fn read_bytes(&mut self, len: usize) -> Result<Vec<u8>> {
        let engine = crate::installed_engine()?;
        let mut buf = vec![0u8; len];
        match engine.data_read(self.data, &mut buf) {
            n if n > 0 => {
                buf.truncate(n as usize);
                Ok(buf)
            }
            0 => Err(Error::EOF),
            _ => Err(Error::from_code(error::GPG_ERR_EIO)),
        }
    }

    /// Reads everything from the current position to the end of the
    /// buffer. A fault mid-stream discards the bytes read so far.
    pub fn read_all(&mut self) -> Result<Vec<u8>> {
        let engine = crate::installed_engine()?;
        let mut out = Vec::new();
        let mut chunk = [0u8; BLOCK_SIZE];
        loop {
            match engine.data_read(self.data, &mut chunk) {
                n if n > 0 => out.extend_from_slice(&chunk[..n as usize]),
                0 => return Ok(out),
                _ => return Err(Error::from_code(error::GPG_ERR_EIO)),
            }
        }
    }

    /// Asks the engine to classify the content. Leaves the read position
    /// unchanged.
    pub fn identify(&mut self) -> Result<Type> {
        let engine = crate::installed_engine()?;
        Ok(Type::from_raw(engine.data_type(self.data)))
    }

    pub fn encoding(&self) -> Result<Encoding> {
        let engine = crate::installed_engine()?;
        Ok(Encoding::from_raw(engine.data_encoding(self.data)))
    }

    pub fn set_encoding(&mut self, enc: Encoding) -> Result<()> {
        let engine = crate::installed_engine()?;
        return_err!(engine.data_set_encoding(self.data, enc.raw()));
        Ok(())
    }

    /// Releases the data object and hands back its accumulated memory.
    /// Returns `None` when the backing store is not engine-owned memory.
    pub fn into_bytes(self) -> Option<Vec<u8>> {
        let engine = crate::installed_engine().ok()?;
        let handle = self.data;
        std::mem::forget(self);
        engine.data_release_and_get_mem(handle)
    }

    /// Like [`into_bytes`](Data::into_bytes), additionally requiring the
    /// content to be valid UTF-8.
    pub fn into_string(self) -> Option<String> {
        self.into_bytes().and_then(|b| String::from_utf8(b).ok())
    }
}

impl Read for Data<'_> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        let engine = crate::installed_engine().map_err(io::Error::from)?;
        match engine.data_read(self.data, buf) {
            n if n >= 0 => Ok(n as usize),
            _ => Err(Error::from_code(error::GPG_ERR_EIO).into()),
        }
    }
}

impl Write for Data<'_> {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        let engine = crate::installed_engine().map_err(io::Error::from)?;
        match engine.data_write(self.data, buf) {
            n if n >= 0 => Ok(n as usize),
            _ => Err(Error::from_code(error::GPG_ERR_EIO).into()),
        }
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

impl Seek for Data<'_> {
    fn seek(&mut self, pos: SeekFrom) -> io::Result<u64> {
        let engine = crate::installed_engine().map_err(io::Error::from)?;
        match engine.data_seek(self.data, pos) {
            n if n >= 0 => Ok(n as u64),
            _ => Err(Error::from_code(error::GPG_ERR_EIO).into()),
        }
    }
}

struct CallbackWrapper<S> {
    inner: S,
}

unsafe fn read_callback<S: Read>(hook: *mut c_void, buf: *mut c_void, len: usize) -> ssize_t {
    let wrapper = &mut *(hook as *mut CallbackWrapper<S>);
    let slice = slice::from_raw_parts_mut(buf as *mut u8, len);
    wrapper
        .inner
        .read(slice)
        .map_or(-1, |n| n.min(ssize_t::MAX as usize) as ssize_t)
}

unsafe fn write_callback<S: Write>(hook: *mut c_void, buf: *const c_void, len: usize) -> ssize_t {
    let wrapper = &mut *(hook as *mut CallbackWrapper<S>);
    let slice = slice::from_raw_parts(buf as *const u8, len);
    wrapper
        .inner
        .write(slice)
        .map_or(-1, |n| n.min(ssize_t::MAX as usize) as ssize_t)
}

unsafe fn seek_callback<S: Seek>(hook: *mut c_void, offset: off_t, whence: c_int) -> off_t {
    let wrapper = &mut *(hook as *mut CallbackWrapper<S>);
    let pos = match whence {
        SEEK_SET => SeekFrom::Start(offset as u64),
        SEEK_CUR => SeekFrom::Current(offset as i64),
        SEEK_END => SeekFrom::End(offset as i64),
        _ => return -1,
    };
    wrapper.inner.seek(pos).map_or(-1, |n| n as off_t)
}

unsafe fn release_callback<S>(hook: *mut c_void) {
    drop(Box::from_raw(hook as *mut CallbackWrapper<S>));
}

static_assertions::assert_impl_all!(Data<'static>: Send);
