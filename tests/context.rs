use cryptme::{Context, Error, KeyListMode, Protocol};

mod common;

#[test]
fn fresh_context_defaults() {
    let ctx = common::context();
    assert_eq!(ctx.protocol(), Protocol::OpenPgp);
    assert!(!ctx.armor());
    assert!(!ctx.text_mode());
    assert_eq!(ctx.key_list_mode(), KeyListMode::LOCAL);
}

#[test]
fn configuration_round_trips() {
    let mut ctx = common::context();
    ctx.set_protocol(Protocol::Cms).unwrap();
    assert_eq!(ctx.protocol(), Protocol::Cms);

    ctx.set_armor(true);
    assert!(ctx.armor());
    ctx.set_armor(false);
    assert!(!ctx.armor());

    ctx.set_text_mode(true);
    assert!(ctx.text_mode());

    ctx.set_key_list_mode(KeyListMode::LOCAL | KeyListMode::EXTERN)
        .unwrap();
    assert_eq!(
        ctx.key_list_mode(),
        KeyListMode::LOCAL | KeyListMode::EXTERN
    );
}

#[test]
fn from_protocol_preconfigures() {
    common::install();
    let ctx = Context::from_protocol(Protocol::Cms).unwrap();
    assert_eq!(ctx.protocol(), Protocol::Cms);
}

#[test]
fn contexts_are_independent() {
    let mut a = common::context();
    let b = common::context();
    a.set_armor(true);
    assert!(a.armor());
    assert!(!b.armor());
}

#[test]
fn engine_info_reports_backends() {
    common::install();
    let info = cryptme::engine_info().unwrap();
    assert_eq!(info.len(), 2);
    assert_eq!(info[0].protocol(), Protocol::OpenPgp);
    assert_eq!(info[1].protocol(), Protocol::Cms);
    assert_eq!(info[0].path(), Some("/usr/bin/gpg"));
    assert_eq!(info[0].version(), Some("2.4.0"));
    assert_eq!(info[1].required_version(), Some("2.0.4"));
    assert_eq!(info[1].home_dir(), None);
}

#[test]
fn token_queries() {
    let token = cryptme::init(common::install().clone()).unwrap();
    assert_eq!(token.version(), "1.0.0-test");
    assert_eq!(token.engine_info().unwrap().len(), 2);
}

#[test]
fn errors_render_through_the_engine() {
    common::install();
    let err = Error::from_code(cryptme::error::GPG_ERR_NO_SECKEY);
    assert_eq!(err.description(), "no secret key");
    assert_eq!(err.to_string(), "no secret key (error 17)");
    assert_eq!(err.source(), Some("engine"));
}
