use std::fmt;
use std::time::SystemTime;

use crate::engine::{RawKey, RawKeySignature, RawSubkey, RawUserId};
use crate::utils;
use crate::{KeyListMode, Protocol};

/// How far a user id or key owner is trusted.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub enum Validity {
    Unknown,
    Undefined,
    Never,
    Marginal,
    Full,
    Ultimate,
}

impl Validity {
    pub(crate) fn from_raw(raw: u32) -> Validity {
        match raw {
            1 => Validity::Undefined,
            2 => Validity::Never,
            3 => Validity::Marginal,
            4 => Validity::Full,
            5 => Validity::Ultimate,
            _ => Validity::Unknown,
        }
    }
}

impl fmt::Display for Validity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self {
            Validity::Undefined => write!(f, "q"),
            Validity::Never => write!(f, "n"),
            Validity::Marginal => write!(f, "m"),
            Validity::Full => write!(f, "f"),
            Validity::Ultimate => write!(f, "u"),
            Validity::Unknown => write!(f, "?"),
        }
    }
}

/// Public-key algorithm of a (sub)key.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
#[non_exhaustive]
pub enum KeyAlgorithm {
    Rsa,
    RsaEncrypt,
    RsaSign,
    ElgamalEncrypt,
    Dsa,
    Ecc,
    Elgamal,
    Ecdsa,
    Ecdh,
    Eddsa,
    Other(u32),
}

impl KeyAlgorithm {
    pub(crate) fn from_raw(raw: u32) -> KeyAlgorithm {
        match raw {
            1 => KeyAlgorithm::Rsa,
            2 => KeyAlgorithm::RsaEncrypt,
            3 => KeyAlgorithm::RsaSign,
            16 => KeyAlgorithm::ElgamalEncrypt,
            17 => KeyAlgorithm::Dsa,
            18 => KeyAlgorithm::Ecc,
            20 => KeyAlgorithm::Elgamal,
            301 => KeyAlgorithm::Ecdsa,
            302 => KeyAlgorithm::Ecdh,
            303 => KeyAlgorithm::Eddsa,
            other => KeyAlgorithm::Other(other),
        }
    }

    pub fn name(&self) -> Option<&'static str> {
        match *self {
            KeyAlgorithm::Rsa => Some("RSA"),
            KeyAlgorithm::RsaEncrypt => Some("RSA-E"),
            KeyAlgorithm::RsaSign => Some("RSA-S"),
            KeyAlgorithm::ElgamalEncrypt => Some("ELG-E"),
            KeyAlgorithm::Dsa => Some("DSA"),
            KeyAlgorithm::Ecc => Some("ECC"),
            KeyAlgorithm::Elgamal => Some("ELG"),
            KeyAlgorithm::Ecdsa => Some("ECDSA"),
            KeyAlgorithm::Ecdh => Some("ECDH"),
            KeyAlgorithm::Eddsa => Some("EdDSA"),
            KeyAlgorithm::Other(_) => None,
        }
    }
}

impl fmt::Display for KeyAlgorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (self.name(), self) {
            (Some(name), _) => write!(f, "{name}"),
            (None, KeyAlgorithm::Other(raw)) => write!(f, "algorithm {raw}"),
            _ => unreachable!(),
        }
    }
}

/// A key from the engine's keyring, as delivered by a listing or lookup.
///
/// Keys are read-only snapshots: every attribute reflects the moment the
/// engine produced the record.
#[derive(Debug, Clone)]
pub struct Key {
    revoked: bool,
    expired: bool,
    disabled: bool,
    invalid: bool,
    can_encrypt: bool,
    can_sign: bool,
    can_certify: bool,
    can_authenticate: bool,
    secret: bool,
    protocol: Protocol,
    owner_trust: Validity,
    keylist_mode: KeyListMode,
    issuer_serial: Option<String>,
    issuer_name: Option<String>,
    chain_id: Option<String>,
    fpr: Option<String>,
    subkeys: Vec<Subkey>,
    uids: Vec<UserId>,
}

impl Key {
    pub(crate) fn from_raw(raw: RawKey) -> Key {
        Key {
            revoked: raw.revoked != 0,
            expired: raw.expired != 0,
            disabled: raw.disabled != 0,
            invalid: raw.invalid != 0,
            can_encrypt: raw.can_encrypt != 0,
            can_sign: raw.can_sign != 0,
            can_certify: raw.can_certify != 0,
            can_authenticate: raw.can_authenticate != 0,
            secret: raw.secret != 0,
            protocol: Protocol::from_raw(raw.protocol),
            owner_trust: Validity::from_raw(raw.owner_trust),
            keylist_mode: KeyListMode::from_bits_truncate(raw.keylist_mode),
            issuer_serial: utils::nonempty(raw.issuer_serial),
            issuer_name: utils::nonempty(raw.issuer_name),
            chain_id: utils::nonempty(raw.chain_id),
            fpr: utils::nonempty(raw.fpr),
            subkeys: raw.subkeys.into_iter().map(Subkey::from_raw).collect(),
            uids: raw.uids.into_iter().map(UserId::from_raw).collect(),
        }
    }

    #[inline]
    pub fn is_bad(&self) -> bool {
        self.revoked || self.expired || self.disabled || self.invalid
    }

    #[inline]
    pub fn is_revoked(&self) -> bool {
        self.revoked
    }

    #[inline]
    pub fn is_expired(&self) -> bool {
        self.expired
    }

    #[inline]
    pub fn is_disabled(&self) -> bool {
        self.disabled
    }

    #[inline]
    pub fn is_invalid(&self) -> bool {
        self.invalid
    }

    #[inline]
    pub fn can_encrypt(&self) -> bool {
        self.can_encrypt
    }

    #[inline]
    pub fn can_sign(&self) -> bool {
        self.can_sign
    }

    #[inline]
    pub fn can_certify(&self) -> bool {
        self.can_certify
    }

    #[inline]
    pub fn can_authenticate(&self) -> bool {
        self.can_authenticate
    }

    /// Returns `true` when secret material for this key is present.
    #[inline]
    pub fn has_secret(&self) -> bool {
        self.secret
    }

    #[inline]
    pub fn owner_trust(&self) -> Validity {
        self.owner_trust
    }

    #[inline]
    pub fn protocol(&self) -> Protocol {
        self.protocol
    }

    /// The listing mode that produced this key. Determines which optional
    /// detail (signatures, validity) is populated.
    #[inline]
    pub fn key_list_mode(&self) -> KeyListMode {
        self.keylist_mode
    }

    #[inline]
    pub fn issuer_serial(&self) -> Option<&str> {
        self.issuer_serial.as_deref()
    }

    #[inline]
    pub fn issuer_name(&self) -> Option<&str> {
        self.issuer_name.as_deref()
    }

    #[inline]
    pub fn chain_id(&self) -> Option<&str> {
        self.chain_id.as_deref()
    }

    #[inline]
    pub fn id(&self) -> Option<&str> {
        self.primary_key().map(|k| k.id())
    }

    /// The low 8 hex digits of the primary key id.
    #[inline]
    pub fn short_id(&self) -> Option<&str> {
        self.id().map(|s| {
            if s.len() >= 8 {
                &s[(s.len() - 8)..]
            } else {
                s
            }
        })
    }

    #[inline]
    pub fn fingerprint(&self) -> Option<&str> {
        self.fpr
            .as_deref()
            .or_else(|| self.primary_key().map(|k| k.fingerprint()))
    }

    #[inline]
    pub fn primary_key(&self) -> Option<&Subkey> {
        self.subkeys.first()
    }

    #[inline]
    pub fn primary_user_id(&self) -> Option<&UserId> {
        self.uids.first()
    }

    #[inline]
    pub fn subkeys(&self) -> &[Subkey] {
        &self.subkeys
    }

    #[inline]
    pub fn user_ids(&self) -> &[UserId] {
        &self.uids
    }
}

/// A single component key of a [`Key`].
///
/// The first subkey is the primary key; its fingerprint identifies the
/// whole key.
#[derive(Debug, Clone)]
pub struct Subkey {
    revoked: bool,
    expired: bool,
    disabled: bool,
    invalid: bool,
    can_encrypt: bool,
    can_sign: bool,
    can_certify: bool,
    can_authenticate: bool,
    secret: bool,
    algorithm: KeyAlgorithm,
    length: u32,
    keyid: String,
    fpr: String,
    timestamp: i64,
    expires: i64,
}

impl Subkey {
    pub(crate) fn from_raw(raw: RawSubkey) -> Subkey {
        Subkey {
            revoked: raw.revoked != 0,
            expired: raw.expired != 0,
            disabled: raw.disabled != 0,
            invalid: raw.invalid != 0,
            can_encrypt: raw.can_encrypt != 0,
            can_sign: raw.can_sign != 0,
            can_certify: raw.can_certify != 0,
            can_authenticate: raw.can_authenticate != 0,
            secret: raw.secret != 0,
            algorithm: KeyAlgorithm::from_raw(raw.pubkey_algo),
            length: raw.length,
            keyid: raw.keyid,
            fpr: raw.fpr,
            timestamp: raw.timestamp,
            expires: raw.expires,
        }
    }

    #[inline]
    pub fn id(&self) -> &str {
        &self.keyid
    }

    #[inline]
    pub fn fingerprint(&self) -> &str {
        &self.fpr
    }

    #[inline]
    pub fn algorithm(&self) -> KeyAlgorithm {
        self.algorithm
    }

    /// Key length in bits.
    #[inline]
    pub fn length(&self) -> usize {
        self.length as usize
    }

    #[inline]
    pub fn is_revoked(&self) -> bool {
        self.revoked
    }

    #[inline]
    pub fn is_expired(&self) -> bool {
        self.expired
    }

    #[inline]
    pub fn is_disabled(&self) -> bool {
        self.disabled
    }

    #[inline]
    pub fn is_invalid(&self) -> bool {
        self.invalid
    }

    #[inline]
    pub fn can_encrypt(&self) -> bool {
        self.can_encrypt
    }

    #[inline]
    pub fn can_sign(&self) -> bool {
        self.can_sign
    }

    #[inline]
    pub fn can_certify(&self) -> bool {
        self.can_certify
    }

    #[inline]
    pub fn can_authenticate(&self) -> bool {
        self.can_authenticate
    }

    #[inline]
    pub fn is_secret(&self) -> bool {
        self.secret
    }

    #[inline]
    pub fn creation_time(&self) -> Option<SystemTime> {
        utils::epoch_to_time(self.timestamp)
    }

    #[inline]
    pub fn expiration_time(&self) -> Option<SystemTime> {
        utils::epoch_to_time(self.expires)
    }

    #[inline]
    pub fn never_expires(&self) -> bool {
        self.expiration_time().is_none()
    }
}

/// A user id packet of a key.
#[derive(Debug, Clone)]
pub struct UserId {
    revoked: bool,
    invalid: bool,
    validity: Validity,
    uid: String,
    name: String,
    comment: String,
    email: String,
    signatures: Vec<UserIdSignature>,
}

impl UserId {
    pub(crate) fn from_raw(raw: RawUserId) -> UserId {
        UserId {
            revoked: raw.revoked != 0,
            invalid: raw.invalid != 0,
            validity: Validity::from_raw(raw.validity),
            uid: raw.uid,
            name: raw.name,
            comment: raw.comment,
            email: raw.email,
            signatures: raw
                .signatures
                .into_iter()
                .map(UserIdSignature::from_raw)
                .collect(),
        }
    }

    /// The full user id string, typically `Name (Comment) <email>`.
    #[inline]
    pub fn id(&self) -> &str {
        &self.uid
    }

    #[inline]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[inline]
    pub fn comment(&self) -> &str {
        &self.comment
    }

    #[inline]
    pub fn email(&self) -> &str {
        &self.email
    }

    #[inline]
    pub fn validity(&self) -> Validity {
        self.validity
    }

    #[inline]
    pub fn is_revoked(&self) -> bool {
        self.revoked
    }

    #[inline]
    pub fn is_invalid(&self) -> bool {
        self.invalid
    }

    /// Certification signatures on this user id. Empty unless the listing
    /// ran with [`KeyListMode::SIGS`].
    #[inline]
    pub fn signatures(&self) -> &[UserIdSignature] {
        &self.signatures
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.uid)
    }
}

/// A certification signature on a [`UserId`].
#[derive(Debug, Clone)]
pub struct UserIdSignature {
    revoked: bool,
    expired: bool,
    invalid: bool,
    exportable: bool,
    algorithm: KeyAlgorithm,
    keyid: String,
    timestamp: i64,
    expires: i64,
}

impl UserIdSignature {
    pub(crate) fn from_raw(raw: RawKeySignature) -> UserIdSignature {
        UserIdSignature {
            revoked: raw.revoked != 0,
            expired: raw.expired != 0,
            invalid: raw.invalid != 0,
            exportable: raw.exportable != 0,
            algorithm: KeyAlgorithm::from_raw(raw.pubkey_algo),
            keyid: raw.keyid,
            timestamp: raw.timestamp,
            expires: raw.expires,
        }
    }

    /// Id of the key that made the signature.
    #[inline]
    pub fn signer_key_id(&self) -> &str {
        &self.keyid
    }

    #[inline]
    pub fn algorithm(&self) -> KeyAlgorithm {
        self.algorithm
    }

    #[inline]
    pub fn is_revoked(&self) -> bool {
        self.revoked
    }

    #[inline]
    pub fn is_expired(&self) -> bool {
        self.expired
    }

    #[inline]
    pub fn is_invalid(&self) -> bool {
        self.invalid
    }

    #[inline]
    pub fn is_exportable(&self) -> bool {
        self.exportable
    }

    #[inline]
    pub fn creation_time(&self) -> Option<SystemTime> {
        utils::epoch_to_time(self.timestamp)
    }

    #[inline]
    pub fn expiration_time(&self) -> Option<SystemTime> {
        utils::epoch_to_time(self.expires)
    }
}

static_assertions::assert_impl_all!(Key: Send, Sync);
