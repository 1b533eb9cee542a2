//! The boundary with the external cryptographic engine.
//!
//! Every operation in this crate is implemented as exactly one call to a
//! primitive of the [`Engine`] trait (the key-listing convenience drivers
//! use a bounded sequence of them). Primitives mirror the shape of a C
//! engine ABI: they return a raw status word and deliver newly allocated
//! handles and records through out-parameters. The session layer never
//! interprets a status itself; everything funnels through [`crate::Error`].
//!
//! Aggregate records cross the boundary as plain `Raw*` structs with
//! tri-state integer flags and epoch timestamps, exactly as the engine
//! populates them. They are marshalled into the read-only public types by
//! crate-private `from_raw` constructors; application code never sees them.

use std::fmt;
use std::io::SeekFrom;
use std::path::Path;

use libc::{c_int, c_void, off_t, ssize_t};

use crate::error::{ErrorCode, RawStatus, Result};
use crate::utils;
use crate::Protocol;

/// Opaque handle to engine-side session state.
pub type RawContext = u64;

/// Opaque handle to an engine-side data object.
pub type RawData = u64;

pub type ReadFn = unsafe fn(hook: *mut c_void, buf: *mut c_void, len: usize) -> ssize_t;
pub type WriteFn = unsafe fn(hook: *mut c_void, buf: *const c_void, len: usize) -> ssize_t;
pub type SeekFn = unsafe fn(hook: *mut c_void, offset: off_t, whence: c_int) -> off_t;
pub type ReleaseFn = unsafe fn(hook: *mut c_void);

/// Caller-supplied I/O functions backing a data object, plus the hook value
/// passed back on every invocation.
#[derive(Debug, Clone, Copy)]
pub struct DataCallbacks {
    pub read: Option<ReadFn>,
    pub write: Option<WriteFn>,
    pub seek: Option<SeekFn>,
    pub release: Option<ReleaseFn>,
}

pub type PassphraseFunc =
    Box<dyn FnMut(&str, &str, bool) -> Result<Vec<u8>> + Send>;
pub type ProgressFunc = Box<dyn FnMut(&str, isize, isize, isize) + Send>;

#[derive(Debug, Default, Clone)]
pub struct RawEngineInfo {
    pub protocol: u32,
    pub file_name: Option<String>,
    pub home_dir: Option<String>,
    pub version: Option<String>,
    pub req_version: Option<String>,
}

#[derive(Debug, Default, Clone)]
pub struct RawKey {
    pub revoked: u32,
    pub expired: u32,
    pub disabled: u32,
    pub invalid: u32,
    pub can_encrypt: u32,
    pub can_sign: u32,
    pub can_certify: u32,
    pub can_authenticate: u32,
    pub secret: u32,
    pub protocol: u32,
    pub owner_trust: u32,
    pub keylist_mode: u32,
    pub issuer_serial: Option<String>,
    pub issuer_name: Option<String>,
    pub chain_id: Option<String>,
    pub fpr: Option<String>,
    pub subkeys: Vec<RawSubkey>,
    pub uids: Vec<RawUserId>,
}

#[derive(Debug, Default, Clone)]
pub struct RawSubkey {
    pub revoked: u32,
    pub expired: u32,
    pub disabled: u32,
    pub invalid: u32,
    pub can_encrypt: u32,
    pub can_sign: u32,
    pub can_certify: u32,
    pub can_authenticate: u32,
    pub secret: u32,
    pub pubkey_algo: u32,
    pub length: u32,
    pub keyid: String,
    pub fpr: String,
    pub timestamp: i64,
    pub expires: i64,
}

#[derive(Debug, Default, Clone)]
pub struct RawUserId {
    pub revoked: u32,
    pub invalid: u32,
    pub validity: u32,
    pub uid: String,
    pub name: String,
    pub comment: String,
    pub email: String,
    pub signatures: Vec<RawKeySignature>,
}

#[derive(Debug, Default, Clone)]
pub struct RawKeySignature {
    pub revoked: u32,
    pub expired: u32,
    pub invalid: u32,
    pub exportable: u32,
    pub pubkey_algo: u32,
    pub keyid: String,
    pub timestamp: i64,
    pub expires: i64,
}

#[derive(Debug, Default, Clone)]
pub struct RawSignature {
    pub summary: u32,
    pub fpr: String,
    pub status: RawStatus,
    pub validity: u32,
    pub timestamp: i64,
    pub exp_timestamp: i64,
}

#[derive(Debug, Default, Clone)]
pub struct RawVerifyResult {
    pub signatures: Vec<RawSignature>,
}

/// The primitive call interface of the external engine.
///
/// Implementations own all engine-side state (contexts, data objects, the
/// keyring) and must be internally synchronized: the session layer holds a
/// single registered instance for the whole process and calls it from
/// whichever thread drives a `Context` or `Data` handle. Individual
/// handles are never driven from two threads at once; that contract is
/// enforced by the wrapper types, not here.
pub trait Engine: Send + Sync {
    /// Version string of the engine binding itself.
    fn version(&self) -> &str;

    /// Renders an error code for presentation. Never used for control flow.
    fn strerror(&self, code: ErrorCode) -> String {
        strerror_default(code).to_owned()
    }

    fn engine_info(&self, out: &mut Vec<RawEngineInfo>) -> RawStatus;

    fn new_context(&self, out: &mut RawContext) -> RawStatus;
    fn release_context(&self, ctx: RawContext);
    fn set_protocol(&self, ctx: RawContext, proto: u32) -> RawStatus;
    fn protocol(&self, ctx: RawContext) -> u32;
    fn set_armor(&self, ctx: RawContext, enabled: bool);
    fn armor(&self, ctx: RawContext) -> bool;
    fn set_text_mode(&self, ctx: RawContext, enabled: bool);
    fn text_mode(&self, ctx: RawContext) -> bool;
    fn set_key_list_mode(&self, ctx: RawContext, mode: u32) -> RawStatus;
    fn key_list_mode(&self, ctx: RawContext) -> u32;
    fn set_passphrase_cb(&self, ctx: RawContext, cb: Option<PassphraseFunc>);
    fn set_progress_cb(&self, ctx: RawContext, cb: Option<ProgressFunc>);

    fn data_new(&self, out: &mut RawData) -> RawStatus;
    /// # Safety
    ///
    /// When `copy` is false the engine retains `buf` for the lifetime of
    /// the data object; the caller must keep the memory valid and
    /// unmodified until the object is released.
    unsafe fn data_new_from_mem(
        &self,
        out: &mut RawData,
        buf: *const u8,
        len: usize,
        copy: bool,
    ) -> RawStatus;
    fn data_new_from_file(&self, out: &mut RawData, path: &Path, copy: bool) -> RawStatus;
    /// # Safety
    ///
    /// `hook` must remain valid for every callback invocation until the
    /// release callback has run.
    unsafe fn data_new_from_cbs(
        &self,
        out: &mut RawData,
        cbs: DataCallbacks,
        hook: *mut c_void,
    ) -> RawStatus;
    fn data_release(&self, data: RawData);
    /// Releases the data object and hands back its accumulated memory, if
    /// the backing store allows it.
    fn data_release_and_get_mem(&self, data: RawData) -> Option<Vec<u8>>;
    /// Reads up to `buf.len()` bytes from the current position. Returns the
    /// number of bytes read, `0` at end of stream, or a negative value on
    /// failure.
    fn data_read(&self, data: RawData, buf: &mut [u8]) -> isize;
    /// Writes `buf` at the current position. Returns the number of bytes
    /// written or a negative value on failure.
    fn data_write(&self, data: RawData, buf: &[u8]) -> isize;
    /// Repositions the data object. Returns the new offset from the start,
    /// or a negative value on failure.
    fn data_seek(&self, data: RawData, pos: SeekFrom) -> i64;
    fn data_type(&self, data: RawData) -> u32;
    fn data_encoding(&self, data: RawData) -> u32;
    fn data_set_encoding(&self, data: RawData, encoding: u32) -> RawStatus;

    fn keylist_start(
        &self,
        ctx: RawContext,
        pattern: Option<&str>,
        secret_only: bool,
    ) -> RawStatus;
    /// Advances the key-listing cursor. Delivers the next key through
    /// `out`, or returns the end-of-stream sentinel once the listing is
    /// exhausted, closing the cursor engine-side.
    fn keylist_next(&self, ctx: RawContext, out: &mut Option<RawKey>) -> RawStatus;
    fn keylist_end(&self, ctx: RawContext) -> RawStatus;
    fn get_key(
        &self,
        ctx: RawContext,
        fpr: &str,
        secret: bool,
        out: &mut Option<RawKey>,
    ) -> RawStatus;
    /// Generates a key pair. With both data handles absent the keys go
    /// straight to the keyring; otherwise the public and secret material is
    /// written into the supplied objects.
    fn genkey(
        &self,
        ctx: RawContext,
        params: &str,
        public: Option<RawData>,
        secret: Option<RawData>,
    ) -> RawStatus;
    fn export(&self, ctx: RawContext, pattern: Option<&str>, keydata: RawData) -> RawStatus;
    fn import(&self, ctx: RawContext, keydata: RawData) -> RawStatus;
    fn delete(&self, ctx: RawContext, fpr: &str, allow_secret: bool) -> RawStatus;
    fn decrypt(&self, ctx: RawContext, cipher: RawData, plain: RawData) -> RawStatus;
    fn verify(
        &self,
        ctx: RawContext,
        sig: RawData,
        signed: Option<RawData>,
        plain: Option<RawData>,
    ) -> RawStatus;
    /// Retrieves the result of the most recent verification on `ctx`, if
    /// one is available.
    fn verify_result(&self, ctx: RawContext) -> Option<RawVerifyResult>;
    fn signers_clear(&self, ctx: RawContext);
    fn signers_add(&self, ctx: RawContext, fpr: &str) -> RawStatus;
    fn sign(&self, ctx: RawContext, plain: RawData, sig: RawData, mode: u32) -> RawStatus;
    fn encrypt(
        &self,
        ctx: RawContext,
        recipients: &[&str],
        flags: u32,
        plain: RawData,
        cipher: RawData,
    ) -> RawStatus;
}

/// Fallback renderings for the well-known codes, used by engines that do
/// not override [`Engine::strerror`].
pub(crate) fn strerror_default(code: ErrorCode) -> &'static str {
    use crate::error::*;
    match code {
        GPG_ERR_NO_ERROR => "success",
        GPG_ERR_GENERAL => "general error",
        GPG_ERR_BAD_SIGNATURE => "bad signature",
        GPG_ERR_NO_PUBKEY => "no public key",
        GPG_ERR_BAD_PASSPHRASE => "bad passphrase",
        GPG_ERR_INV_ARMOR => "invalid armor",
        GPG_ERR_NO_SECKEY => "no secret key",
        GPG_ERR_INV_VALUE => "invalid value",
        GPG_ERR_NO_DATA => "no data",
        GPG_ERR_CONFLICT => "conflicting use",
        GPG_ERR_NOT_OPERATIONAL => "not operational",
        GPG_ERR_EOF => "end of file",
        GPG_ERR_ENOENT => "no such file or directory",
        GPG_ERR_EIO => "input/output error",
        _ => "unknown error code",
    }
}

/// Description of one configured engine backend.
///
/// Populated by the engine; read-only afterwards.
#[derive(Debug, Clone)]
pub struct EngineInfo {
    protocol: Protocol,
    file_name: Option<String>,
    home_dir: Option<String>,
    version: Option<String>,
    req_version: Option<String>,
}

impl EngineInfo {
    pub(crate) fn from_raw(raw: RawEngineInfo) -> EngineInfo {
        EngineInfo {
            protocol: Protocol::from_raw(raw.protocol),
            file_name: utils::nonempty(raw.file_name),
            home_dir: utils::nonempty(raw.home_dir),
            version: utils::nonempty(raw.version),
            req_version: utils::nonempty(raw.req_version),
        }
    }

    /// Returns the `Protocol` implemented by the engine.
    #[inline]
    pub fn protocol(&self) -> Protocol {
        self.protocol
    }

    #[inline]
    pub fn path(&self) -> Option<&str> {
        self.file_name.as_deref()
    }

    #[inline]
    pub fn home_dir(&self) -> Option<&str> {
        self.home_dir.as_deref()
    }

    #[inline]
    pub fn version(&self) -> Option<&str> {
        self.version.as_deref()
    }

    #[inline]
    pub fn required_version(&self) -> Option<&str> {
        self.req_version.as_deref()
    }
}

impl fmt::Debug for dyn Engine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Engine")
            .field("version", &self.version())
            .finish()
    }
}

static_assertions::assert_obj_safe!(Engine);
static_assertions::assert_impl_all!(EngineInfo: Send, Sync);
