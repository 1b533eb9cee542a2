use std::time::SystemTime;

use crate::engine::{RawSignature, RawVerifyResult};
use crate::error::Error;
use crate::keys::Validity;
use crate::utils;
use crate::SignatureSummary;

/// The outcome of a verification, one entry per signature encountered.
///
/// A bad or unverifiable signature is an entry in this result, not an
/// operation failure; inspect [`Signature::status`] per entry.
#[derive(Debug, Clone)]
pub struct VerificationResult {
    signatures: Vec<Signature>,
}

impl VerificationResult {
    pub(crate) fn from_raw(raw: RawVerifyResult) -> VerificationResult {
        VerificationResult {
            signatures: raw.signatures.into_iter().map(Signature::from_raw).collect(),
        }
    }

    #[inline]
    pub fn signatures(&self) -> &[Signature] {
        &self.signatures
    }
}

/// The engine's judgment on one signature.
#[derive(Debug, Clone)]
pub struct Signature {
    summary: SignatureSummary,
    fpr: String,
    status: Error,
    validity: Validity,
    timestamp: i64,
    exp_timestamp: i64,
}

impl Signature {
    pub(crate) fn from_raw(raw: RawSignature) -> Signature {
        Signature {
            summary: SignatureSummary::from_bits_truncate(raw.summary),
            fpr: raw.fpr,
            status: Error::new(raw.status),
            validity: Validity::from_raw(raw.validity),
            timestamp: raw.timestamp,
            exp_timestamp: raw.exp_timestamp,
        }
    }

    #[inline]
    pub fn summary(&self) -> SignatureSummary {
        self.summary
    }

    /// Fingerprint of the signing key.
    #[inline]
    pub fn fingerprint(&self) -> &str {
        &self.fpr
    }

    /// The detailed status of the signature. Code `0` means it verified
    /// cleanly.
    #[inline]
    pub fn status(&self) -> Error {
        self.status
    }

    #[inline]
    pub fn is_valid(&self) -> bool {
        self.status.raw() == 0 && !self.summary.contains(SignatureSummary::RED)
    }

    #[inline]
    pub fn validity(&self) -> Validity {
        self.validity
    }

    #[inline]
    pub fn creation_time(&self) -> Option<SystemTime> {
        utils::epoch_to_time(self.timestamp)
    }

    #[inline]
    pub fn expiration_time(&self) -> Option<SystemTime> {
        utils::epoch_to_time(self.exp_timestamp)
    }
}

static_assertions::assert_impl_all!(VerificationResult: Send, Sync);
