use std::fmt;

use smallvec::SmallVec;

use crate::data::Data;
use crate::engine::{Engine, RawContext};
use crate::error::{self, Error, Result};
use crate::keys::Key;
use crate::results::VerificationResult;
use crate::traits::{PassphraseProvider, ProgressHandler};
use crate::{EncryptFlags, KeyListMode, Protocol, SignMode};

/// A session with the engine.
///
/// A `Context` carries per-session configuration (protocol, armor, text
/// mode, key-listing mode), the ambient signer set, registered callbacks,
/// and the cursor of an in-progress key listing. Operations block until the
/// engine returns. A single context must not be driven from two threads at
/// once; every mutating operation takes `&mut self` to enforce that.
/// Distinct contexts are fully independent.
pub struct Context {
    ctx: RawContext,
    engine: &'static dyn Engine,
    listing: bool,
}

enum ListStep {
    Item(Key),
    Done,
    Fault(Error),
}

impl Drop for Context {
    fn drop(&mut self) {
        self.engine.release_context(self.ctx);
    }
}

impl Context {
    /// Creates a context with the engine's default configuration.
    pub fn new() -> Result<Context> {
        let engine = crate::installed_engine()?;
        let mut ctx = 0;
        return_err!(engine.new_context(&mut ctx));
        Ok(Context {
            ctx,
            engine,
            listing: false,
        })
    }

    /// Creates a context preconfigured for `proto`.
    pub fn from_protocol(proto: Protocol) -> Result<Context> {
        let mut ctx = Context::new()?;
        ctx.set_protocol(proto)?;
        Ok(ctx)
    }

    #[inline]
    pub fn protocol(&self) -> Protocol {
        Protocol::from_raw(self.engine.protocol(self.ctx))
    }

    #[inline]
    pub fn set_protocol(&mut self, proto: Protocol) -> Result<()> {
        return_err!(self.engine.set_protocol(self.ctx, proto.raw()));
        Ok(())
    }

    #[inline]
    pub fn armor(&self) -> bool {
        self.engine.armor(self.ctx)
    }

    /// Switches output between binary and ASCII-armored form.
    #[inline]
    pub fn set_armor(&mut self, enabled: bool) {
        self.engine.set_armor(self.ctx, enabled);
    }

    #[inline]
    pub fn text_mode(&self) -> bool {
        self.engine.text_mode(self.ctx)
    }

    #[inline]
    pub fn set_text_mode(&mut self, enabled: bool) {
        self.engine.set_text_mode(self.ctx, enabled);
    }

    #[inline]
    pub fn key_list_mode(&self) -> KeyListMode {
        KeyListMode::from_bits_truncate(self.engine.key_list_mode(self.ctx))
    }

    /// Replaces the key-listing mode. Takes effect on the next listing.
    #[inline]
    pub fn set_key_list_mode(&mut self, mode: KeyListMode) -> Result<()> {
        return_err!(self.engine.set_key_list_mode(self.ctx, mode.bits()));
        Ok(())
    }

    /// Registers `provider` to answer the engine's passphrase requests.
    /// It is only invoked when an operation actually needs a passphrase.
    pub fn set_passphrase_provider<P>(&mut self, mut provider: P)
    where
        P: PassphraseProvider,
    {
        self.engine.set_passphrase_cb(
            self.ctx,
            Some(Box::new(move |hint, info, prev_was_bad| {
                provider.supply(hint, info, prev_was_bad)
            })),
        );
    }

    pub fn clear_passphrase_provider(&mut self) {
        self.engine.set_passphrase_cb(self.ctx, None);
    }

    pub fn set_progress_handler<H>(&mut self, mut handler: H)
    where
        H: ProgressHandler,
    {
        self.engine.set_progress_cb(
            self.ctx,
            Some(Box::new(move |what, typ, current, total| {
                handler.report(what, typ, current, total)
            })),
        );
    }

    pub fn clear_progress_handler(&mut self) {
        self.engine.set_progress_cb(self.ctx, None);
    }

    /// Opens a key listing over keys matching `pattern` (all keys when
    /// `None`), restricted to keys with secret material when
    /// `secret_only`. Fails with a conflict while a listing is already
    /// open.
    pub fn key_list_start(&mut self, pattern: Option<&str>, secret_only: bool) -> Result<()> {
        if self.listing {
            return Err(Error::from_code(error::GPG_ERR_CONFLICT));
        }
        return_err!(self.engine.keylist_start(self.ctx, pattern, secret_only));
        self.listing = true;
        Ok(())
    }

    /// Returns the next key of the open listing.
    ///
    /// Exhaustion is reported as an end-of-stream error; at that point the
    /// engine has already closed the cursor and no
    /// [`key_list_end`](Context::key_list_end) call must follow. Calling
    /// this without an open listing is an invalid-value error.
    pub fn key_list_next(&mut self) -> Result<Key> {
        if !self.listing {
            return Err(Error::from_code(error::GPG_ERR_INV_VALUE));
        }
        let mut out = None;
        match self.engine.keylist_next(self.ctx, &mut out) {
            0 => match out {
                Some(raw) => Ok(Key::from_raw(raw)),
                None => {
                    self.listing = false;
                    Err(Error::EOF)
                }
            },
            status => {
                let err = Error::new(status);
                if err.is_eof() {
                    self.listing = false;
                }
                Err(err)
            }
        }
    }

    /// Closes an open listing before exhaustion. Calling this after the
    /// listing already ended, or without one open, is an invalid-value
    /// error.
    pub fn key_list_end(&mut self) -> Result<()> {
        if !self.listing {
            return Err(Error::from_code(error::GPG_ERR_INV_VALUE));
        }
        self.listing = false;
        return_err!(self.engine.keylist_end(self.ctx));
        Ok(())
    }

    fn list_step(&mut self) -> ListStep {
        match self.key_list_next() {
            Ok(key) => ListStep::Item(key),
            Err(err) if err.is_eof() => ListStep::Done,
            Err(err) => ListStep::Fault(err),
        }
    }

    /// Runs `f` over every key matching `pattern`.
    ///
    /// The listing is closed explicitly only when it terminates early, on
    /// an engine fault or an error from `f`; normal exhaustion leaves
    /// nothing to close.
    pub fn each_key<F>(&mut self, pattern: Option<&str>, secret_only: bool, mut f: F) -> Result<()>
    where
        F: FnMut(Key) -> Result<()>,
    {
        self.key_list_start(pattern, secret_only)?;
        loop {
            match self.list_step() {
                ListStep::Item(key) => {
                    if let Err(err) = f(key) {
                        let _ = self.key_list_end();
                        return Err(err);
                    }
                }
                ListStep::Done => return Ok(()),
                ListStep::Fault(err) => {
                    let _ = self.key_list_end();
                    return Err(err);
                }
            }
        }
    }

    /// Returns an iterator over all keys in the keyring.
    #[inline]
    pub fn keys(&mut self) -> Result<Keys<'_>> {
        self.find_keys(None)
    }

    #[inline]
    pub fn secret_keys(&mut self) -> Result<Keys<'_>> {
        self.find_secret_keys(None)
    }

    pub fn find_keys(&mut self, pattern: Option<&str>) -> Result<Keys<'_>> {
        self.key_list_start(pattern, false)?;
        Ok(Keys { ctx: self })
    }

    pub fn find_secret_keys(&mut self, pattern: Option<&str>) -> Result<Keys<'_>> {
        self.key_list_start(pattern, true)?;
        Ok(Keys { ctx: self })
    }

    /// Looks up the single key identified by `fpr` (fingerprint or key
    /// id). An unknown key is reported as an end-of-stream error.
    pub fn find_key(&mut self, fpr: &str) -> Result<Key> {
        self.get_key(fpr, false)
    }

    /// Like [`find_key`](Context::find_key), restricted to keys with
    /// secret material.
    pub fn find_secret_key(&mut self, fpr: &str) -> Result<Key> {
        self.get_key(fpr, true)
    }

    fn get_key(&mut self, fpr: &str, secret: bool) -> Result<Key> {
        let mut out = None;
        return_err!(self.engine.get_key(self.ctx, fpr, secret, &mut out));
        out.map(Key::from_raw)
            .ok_or_else(|| Error::from_code(error::GPG_ERR_EOF))
    }

    /// Generates a key pair from the engine's parameter text.
    ///
    /// With `store` the keys go straight to the keyring and `None` is
    /// returned; otherwise the public and secret material come back as a
    /// pair of fresh buffers. Both buffers are allocated before the engine
    /// call, so a failure releases them and leaks nothing.
    pub fn generate_key(
        &mut self,
        params: &str,
        store: bool,
    ) -> Result<Option<(Data<'static>, Data<'static>)>> {
        if store {
            return_err!(self.engine.genkey(self.ctx, params, None, None));
            Ok(None)
        } else {
            let public = Data::new()?;
            let secret = Data::new()?;
            return_err!(self.engine.genkey(
                self.ctx,
                params,
                Some(public.as_raw()),
                Some(secret.as_raw())
            ));
            Ok(Some((public, secret)))
        }
    }

    /// Exports keys matching `pattern` (all keys when `None`) into a fresh
    /// buffer, positioned at the end of the written material.
    pub fn export(&mut self, pattern: Option<&str>) -> Result<Data<'static>> {
        let keydata = Data::new()?;
        return_err!(self.engine.export(self.ctx, pattern, keydata.as_raw()));
        Ok(keydata)
    }

    /// Merges the key material in `keydata` into the keyring.
    pub fn import(&mut self, keydata: &mut Data<'_>) -> Result<()> {
        return_err!(self.engine.import(self.ctx, keydata.as_raw()));
        Ok(())
    }

    /// Removes `key` from the keyring. The engine refuses to delete a key
    /// with secret material unless `allow_secret` is set.
    pub fn delete(&mut self, key: &Key, allow_secret: bool) -> Result<()> {
        let fpr = key
            .fingerprint()
            .ok_or_else(|| Error::from_code(error::GPG_ERR_INV_VALUE))?;
        return_err!(self.engine.delete(self.ctx, fpr, allow_secret));
        Ok(())
    }

    /// Decrypts `cipher` into a fresh plaintext buffer. A missing secret
    /// key or rejected passphrase surfaces as the engine's error.
    pub fn decrypt(&mut self, cipher: &mut Data<'_>) -> Result<Data<'static>> {
        let plain = Data::new()?;
        return_err!(self.engine.decrypt(self.ctx, cipher.as_raw(), plain.as_raw()));
        Ok(plain)
    }

    /// Verifies `sig`. For a detached signature pass the signed material
    /// as `signed_text` and no plaintext comes back; for an inline
    /// signature pass `None` and the recovered plaintext is returned.
    ///
    /// The operation only fails when verification cannot be carried out at
    /// all. The per-signature judgment, including bad signatures, is data:
    /// fetch it with [`verify_result`](Context::verify_result).
    pub fn verify(
        &mut self,
        sig: &mut Data<'_>,
        signed_text: Option<&mut Data<'_>>,
    ) -> Result<Option<Data<'static>>> {
        match signed_text {
            Some(signed) => {
                return_err!(self
                    .engine
                    .verify(self.ctx, sig.as_raw(), Some(signed.as_raw()), None));
                Ok(None)
            }
            None => {
                let plain = Data::new()?;
                return_err!(self
                    .engine
                    .verify(self.ctx, sig.as_raw(), None, Some(plain.as_raw())));
                Ok(Some(plain))
            }
        }
    }

    /// The judgment of the most recent verification on this context, or
    /// `None` when no verification has run.
    pub fn verify_result(&self) -> Option<VerificationResult> {
        self.engine
            .verify_result(self.ctx)
            .map(VerificationResult::from_raw)
    }

    /// Empties the ambient signer set.
    pub fn clear_signers(&mut self) {
        self.engine.signers_clear(self.ctx);
    }

    /// Adds `key` to the ambient signer set consulted by
    /// [`sign`](Context::sign).
    pub fn add_signer(&mut self, key: &Key) -> Result<()> {
        let fpr = key
            .fingerprint()
            .ok_or_else(|| Error::from_code(error::GPG_ERR_INV_VALUE))?;
        return_err!(self.engine.signers_add(self.ctx, fpr));
        Ok(())
    }

    /// Signs `plain` with the ambient signer set into a fresh buffer.
    /// Fails when the set is empty or a signer's secret key is missing.
    pub fn sign(&mut self, plain: &mut Data<'_>, mode: SignMode) -> Result<Data<'static>> {
        let sig = Data::new()?;
        return_err!(self
            .engine
            .sign(self.ctx, plain.as_raw(), sig.as_raw(), mode.raw()));
        Ok(sig)
    }

    /// Encrypts `plain` to `recipients` into a fresh ciphertext buffer.
    /// An unusable recipient key fails the whole operation.
    pub fn encrypt(
        &mut self,
        recipients: &[&Key],
        plain: &mut Data<'_>,
        flags: EncryptFlags,
    ) -> Result<Data<'static>> {
        let mut fprs = SmallVec::<[&str; 8]>::new();
        for key in recipients {
            fprs.push(
                key.fingerprint()
                    .ok_or_else(|| Error::from_code(error::GPG_ERR_INV_VALUE))?,
            );
        }
        let cipher = Data::new()?;
        return_err!(self.engine.encrypt(
            self.ctx,
            &fprs,
            flags.bits(),
            plain.as_raw(),
            cipher.as_raw()
        ));
        Ok(cipher)
    }
}

impl fmt::Debug for Context {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Context")
            .field("protocol", &self.protocol())
            .field("armor", &self.armor())
            .field("listing", &self.listing)
            .finish()
    }
}

/// Iterator over an open key listing.
///
/// Dropping the iterator mid-listing closes the cursor; exhausting it
/// leaves nothing to close.
#[derive(Debug)]
pub struct Keys<'ctx> {
    ctx: &'ctx mut Context,
}

impl Iterator for Keys<'_> {
    type Item = Result<Key>;

    fn next(&mut self) -> Option<Result<Key>> {
        match self.ctx.key_list_next() {
            Ok(key) => Some(Ok(key)),
            Err(err) if err.is_eof() => None,
            Err(err) => Some(Err(err)),
        }
    }
}

impl Drop for Keys<'_> {
    fn drop(&mut self) {
        if self.ctx.listing {
            let _ = self.ctx.key_list_end();
        }
    }
}
