use bitflags::bitflags;

bitflags! {
    /// Controls which sources a key listing consults and how much detail
    /// each returned key carries.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct KeyListMode: u32 {
        const LOCAL = 1;
        const EXTERN = 2;
        const SIGS = 4;
        const SIG_NOTATIONS = 8;
        const WITH_SECRET = 16;
        const EPHEMERAL = 128;
        const VALIDATE = 256;
    }
}

bitflags! {
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct EncryptFlags: u32 {
        const ALWAYS_TRUST = 1;
        const NO_ENCRYPT_TO = 2;
        const PREPARE = 4;
        const EXPECT_SIGN = 8;
        const NO_COMPRESS = 16;
        const SYMMETRIC = 32;
        const THROW_KEYIDS = 64;
        const WRAP = 128;
        const WANT_ADDRESS = 256;
    }
}

bitflags! {
    /// Condensed verdict bits attached to a verified signature.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct SignatureSummary: u32 {
        const VALID = 0x0001;
        const GREEN = 0x0002;
        const RED = 0x0004;
        const KEY_REVOKED = 0x0010;
        const KEY_EXPIRED = 0x0020;
        const SIG_EXPIRED = 0x0040;
        const KEY_MISSING = 0x0080;
        const CRL_MISSING = 0x0100;
        const CRL_TOO_OLD = 0x0200;
        const BAD_POLICY = 0x0400;
        const SYS_ERROR = 0x0800;
    }
}
