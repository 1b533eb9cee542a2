//! Behavior before any engine registration. Nothing in this binary may
//! call `cryptme::init`.

use std::io::Cursor;

use cryptme::error::GPG_ERR_NOT_OPERATIONAL;
use cryptme::{Data, Error};

#[test]
fn everything_is_not_operational() {
    let err = cryptme::create_context().unwrap_err();
    assert_eq!(err.code(), GPG_ERR_NOT_OPERATIONAL);

    assert_eq!(
        cryptme::engine_info().unwrap_err().code(),
        GPG_ERR_NOT_OPERATIONAL
    );

    assert_eq!(Data::new().unwrap_err().code(), GPG_ERR_NOT_OPERATIONAL);
    assert_eq!(
        Data::from_bytes("x").unwrap_err().code(),
        GPG_ERR_NOT_OPERATIONAL
    );
}

#[test]
fn callback_sources_are_handed_back() {
    let cursor = Cursor::new(b"still mine".to_vec());
    let err = Data::from_reader(cursor).unwrap_err();
    assert_eq!(err.error().code(), GPG_ERR_NOT_OPERATIONAL);
    assert_eq!(err.into_inner().into_inner(), b"still mine");
}

#[test]
fn descriptions_fall_back_without_an_engine() {
    let err = Error::from_code(GPG_ERR_NOT_OPERATIONAL);
    assert_eq!(err.description(), "error code 176");
}
