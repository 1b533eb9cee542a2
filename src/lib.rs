//! A session layer over an external OpenPGP/CMS cryptographic engine.
//!
//! The engine performs the actual cryptography and owns the keyring; this
//! crate wraps its primitive call interface in safe session objects. A
//! [`Context`] holds per-session configuration and runs the operations,
//! [`Data`] buffers carry operands and results, and every raw engine
//! status is classified into [`Error`] at the boundary.
//!
//! An engine implementation is registered once per process:
//!
//! ```no_run
//! # use cryptme::{engine::Engine, Result};
//! # fn install(engine: impl Engine + 'static) -> Result<()> {
//! let token = cryptme::init(engine)?;
//! let mut ctx = cryptme::create_context()?;
//! for key in ctx.keys()? {
//!     println!("{:?}", key?.fingerprint());
//! }
//! # Ok(())
//! # }
//! ```

use std::fmt;
use std::sync::OnceLock;

#[macro_use]
mod utils;
mod context;
mod data;
pub mod engine;
pub mod error;
mod flags;
mod keys;
mod results;
mod traits;

pub use crate::context::{Context, Keys};
pub use crate::data::{Data, Encoding, Type, WrappedError};
pub use crate::engine::EngineInfo;
pub use crate::error::{Error, Result};
pub use crate::flags::{EncryptFlags, KeyListMode, SignatureSummary};
pub use crate::keys::{Key, KeyAlgorithm, Subkey, UserId, UserIdSignature, Validity};
pub use crate::results::{Signature, VerificationResult};
pub use crate::traits::{PassphraseProvider, ProgressHandler};

use crate::engine::Engine;

/// The protocol family an operation speaks.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
#[non_exhaustive]
pub enum Protocol {
    OpenPgp,
    Cms,
    Unknown,
}

impl Protocol {
    pub(crate) fn from_raw(raw: u32) -> Protocol {
        match raw {
            0 => Protocol::OpenPgp,
            1 => Protocol::Cms,
            _ => Protocol::Unknown,
        }
    }

    pub(crate) fn raw(self) -> u32 {
        match self {
            Protocol::OpenPgp => 0,
            Protocol::Cms => 1,
            Protocol::Unknown => 255,
        }
    }

    pub fn name(&self) -> &'static str {
        match *self {
            Protocol::OpenPgp => "OpenPGP",
            Protocol::Cms => "CMS",
            Protocol::Unknown => "Unknown",
        }
    }
}

impl fmt::Display for Protocol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// The form a signature takes.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum SignMode {
    /// Signature and content together in one blob.
    Normal,
    /// Signature alone; the signed material travels separately.
    Detached,
    /// Human-readable cleartext with an attached signature.
    Clear,
}

impl SignMode {
    pub(crate) fn raw(self) -> u32 {
        match self {
            SignMode::Normal => 0,
            SignMode::Detached => 1,
            SignMode::Clear => 2,
        }
    }
}

static ENGINE: OnceLock<Box<dyn Engine>> = OnceLock::new();

/// Registers `engine` as the process-wide engine and returns a [`Token`]
/// for global queries.
///
/// The first registration wins; later calls leave the installed engine in
/// place and still hand back a token. Until an engine is registered every
/// operation fails with a not-operational error.
pub fn init(engine: impl Engine + 'static) -> Result<Token> {
    let _ = ENGINE.get_or_init(|| Box::new(engine));
    Ok(Token(()))
}

pub(crate) fn installed_engine() -> Result<&'static dyn Engine> {
    ENGINE
        .get()
        .map(|engine| &**engine)
        .ok_or_else(|| Error::from_code(error::GPG_ERR_NOT_OPERATIONAL))
}

/// Proof that an engine has been registered.
#[derive(Debug, Copy, Clone)]
pub struct Token(());

impl Token {
    /// Version string reported by the installed engine.
    pub fn version(&self) -> &'static str {
        match installed_engine() {
            Ok(engine) => engine.version(),
            Err(_) => "",
        }
    }

    pub fn engine_info(&self) -> Result<Vec<EngineInfo>> {
        engine_info()
    }
}

/// Describes the engine's configured backends, one entry per protocol, in
/// the order the engine reports them. Needs no [`Context`].
pub fn engine_info() -> Result<Vec<EngineInfo>> {
    let engine = installed_engine()?;
    let mut raw = Vec::new();
    return_err!(engine.engine_info(&mut raw));
    Ok(raw.into_iter().map(EngineInfo::from_raw).collect())
}

/// Creates a [`Context`] with the engine's default configuration.
pub fn create_context() -> Result<Context> {
    Context::new()
}
