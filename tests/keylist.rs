use cryptme::error::{GPG_ERR_CONFLICT, GPG_ERR_GENERAL, GPG_ERR_INV_VALUE};
use cryptme::{Error, Key, KeyListMode, Result};

mod common;

fn fingerprints(keys: Vec<Key>) -> Vec<String> {
    keys.iter()
        .map(|k| k.fingerprint().unwrap().to_owned())
        .collect()
}

#[test]
fn lists_whole_keyring() {
    let mut ctx = common::context();
    let keys: Result<Vec<Key>> = ctx.keys().unwrap().collect();
    let fprs = fingerprints(keys.unwrap());
    // Engine-reported order is preserved.
    assert_eq!(
        fprs,
        [common::ALPHA_FPR, common::BRAVO_FPR, common::CHARLIE_FPR]
    );
}

#[test]
fn secret_listing_filters() {
    let mut ctx = common::context();
    let keys: Result<Vec<Key>> = ctx.secret_keys().unwrap().collect();
    let keys = keys.unwrap();
    assert_eq!(keys.len(), 2);
    assert!(keys.iter().all(|k| k.has_secret()));
}

#[test]
fn pattern_restricts_matches() {
    let mut ctx = common::context();
    let keys: Result<Vec<Key>> = ctx.find_keys(Some("Alpha")).unwrap().collect();
    let keys = keys.unwrap();
    assert_eq!(keys.len(), 1);
    assert_eq!(keys[0].fingerprint(), Some(common::ALPHA_FPR));
    assert_eq!(keys[0].primary_user_id().unwrap().email(), "alpha@example.net");
}

#[test]
fn no_match_is_an_empty_listing() {
    let mut ctx = common::context();
    let mut keys = ctx.find_keys(Some("no such person")).unwrap();
    assert!(keys.next().is_none());
}

#[test]
fn exhaustion_closes_the_cursor() {
    let mut ctx = common::context();
    ctx.key_list_start(None, false).unwrap();
    loop {
        match ctx.key_list_next() {
            Ok(_) => continue,
            Err(err) => {
                assert!(err.is_eof());
                break;
            }
        }
    }
    // The cursor is already gone; closing again is a usage error.
    let err = ctx.key_list_end().unwrap_err();
    assert_eq!(err.code(), GPG_ERR_INV_VALUE);
    // And a new listing opens immediately.
    ctx.key_list_start(None, false).unwrap();
    assert!(ctx.key_list_next().is_ok());
}

#[test]
fn cursor_usage_errors() {
    let mut ctx = common::context();
    assert_eq!(ctx.key_list_next().unwrap_err().code(), GPG_ERR_INV_VALUE);
    assert_eq!(ctx.key_list_end().unwrap_err().code(), GPG_ERR_INV_VALUE);

    ctx.key_list_start(None, false).unwrap();
    let err = ctx.key_list_start(None, false).unwrap_err();
    assert_eq!(err.code(), GPG_ERR_CONFLICT);
    // The original listing is still usable after the rejected start.
    assert!(ctx.key_list_next().is_ok());
    drop(ctx);
}

/// The only test in this binary that closes listings explicitly, so the
/// engine's close counter deltas are exact.
#[test]
fn explicit_close_accounting() {
    let engine = common::install();
    let mut ctx = cryptme::create_context().unwrap();

    // Running to exhaustion needs no explicit close.
    let before = engine.end_call_count();
    let mut seen = 0;
    ctx.each_key(None, false, |_| {
        seen += 1;
        Ok(())
    })
    .unwrap();
    assert!(seen >= 3);
    assert_eq!(engine.end_call_count(), before);

    // An error from the callback terminates early and closes the cursor.
    let before = engine.end_call_count();
    let err = ctx
        .each_key(None, false, |_| Err(Error::from_code(GPG_ERR_GENERAL)))
        .unwrap_err();
    assert_eq!(err.code(), GPG_ERR_GENERAL);
    assert_eq!(engine.end_call_count(), before + 1);

    // Dropping an iterator mid-listing closes the cursor too.
    let before = engine.end_call_count();
    {
        let mut keys = ctx.keys().unwrap();
        keys.next().unwrap().unwrap();
    }
    assert_eq!(engine.end_call_count(), before + 1);

    // A fully drained iterator leaves nothing to close.
    let before = engine.end_call_count();
    for key in ctx.keys().unwrap() {
        key.unwrap();
    }
    assert_eq!(engine.end_call_count(), before);
}

#[test]
fn signatures_only_in_sigs_mode() {
    let mut ctx = common::context();
    let keys: Result<Vec<Key>> = ctx.find_keys(Some("Alpha")).unwrap().collect();
    let plain = keys.unwrap().remove(0);
    assert!(plain.primary_user_id().unwrap().signatures().is_empty());

    ctx.set_key_list_mode(KeyListMode::LOCAL | KeyListMode::SIGS)
        .unwrap();
    let keys: Result<Vec<Key>> = ctx.find_keys(Some("Alpha")).unwrap().collect();
    let detailed = keys.unwrap().remove(0);
    assert!(detailed.key_list_mode().contains(KeyListMode::SIGS));
    let sigs = detailed.primary_user_id().unwrap().signatures();
    assert_eq!(sigs.len(), 1);
    assert!(sigs[0].is_exportable());
}

#[test]
fn single_key_lookup() {
    let mut ctx = common::context();
    let key = ctx.find_key(common::ALPHA_FPR).unwrap();
    assert_eq!(key.fingerprint(), Some(common::ALPHA_FPR));
    assert_eq!(key.short_id(), Some(&common::ALPHA_FPR[32..]));
    assert!(key.can_sign());
    assert!(!key.is_bad());

    // Lookup by key id works as well.
    let by_id = ctx.find_key(&common::ALPHA_FPR[24..]).unwrap();
    assert_eq!(by_id.fingerprint(), Some(common::ALPHA_FPR));

    assert!(ctx.find_key("0000000000000000").unwrap_err().is_eof());
    // Bravo has no secret material.
    assert!(ctx
        .find_secret_key(common::BRAVO_FPR)
        .unwrap_err()
        .is_eof());
    assert!(ctx.find_secret_key(common::CHARLIE_FPR).is_ok());
}
