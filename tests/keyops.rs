use std::io::{Seek, SeekFrom};
use std::sync::{Arc, Mutex};

use cryptme::error::{GPG_ERR_CONFLICT, GPG_ERR_NO_DATA, GPG_ERR_NO_PUBKEY};
use cryptme::Data;

mod common;

#[test]
fn export_writes_key_blocks() {
    let mut ctx = common::context();
    let mut keydata = ctx.export(Some("Alpha")).unwrap();
    // The buffer comes back positioned after the written material.
    keydata.seek(SeekFrom::Start(0)).unwrap();
    let text = String::from_utf8(keydata.read_all().unwrap()).unwrap();
    assert!(text.contains(common::ALPHA_FPR));
    assert!(text.contains("Alpha Tester"));
    assert!(!text.contains(common::BRAVO_FPR));
}

#[test]
fn import_rejects_garbage() {
    let mut ctx = common::context();
    let mut garbage = Data::from_bytes("not key material at all").unwrap();
    let err = ctx.import(&mut garbage).unwrap_err();
    assert_eq!(err.code(), GPG_ERR_NO_DATA);
}

#[test]
fn generated_key_pair_lifecycle() {
    let mut ctx = common::context();
    let params = "Key-Type: RSA\nKey-Length: 2048\nName-Real: Dora Lifecycle\nName-Email: dora@example.net\n";

    let (mut public, mut secret) = ctx.generate_key(params, false).unwrap().unwrap();
    public.seek(SeekFrom::Start(0)).unwrap();
    let block = String::from_utf8(public.read_all().unwrap()).unwrap();
    let fpr = block
        .lines()
        .next()
        .and_then(|line| line.split(' ').nth(1))
        .unwrap()
        .to_owned();

    // Without storing, the keyring does not know the key yet.
    assert!(ctx.find_key(&fpr).unwrap_err().is_eof());

    public.seek(SeekFrom::Start(0)).unwrap();
    ctx.import(&mut public).unwrap();
    let imported = ctx.find_key(&fpr).unwrap();
    assert!(!imported.has_secret());
    assert_eq!(imported.primary_user_id().unwrap().email(), "dora@example.net");

    // Importing the secret half upgrades the entry.
    secret.seek(SeekFrom::Start(0)).unwrap();
    ctx.import(&mut secret).unwrap();
    let upgraded = ctx.find_secret_key(&fpr).unwrap();
    assert!(upgraded.has_secret());

    // Secret keys only go away when explicitly allowed.
    let err = ctx.delete(&upgraded, false).unwrap_err();
    assert_eq!(err.code(), GPG_ERR_CONFLICT);
    ctx.delete(&upgraded, true).unwrap();
    assert!(ctx.find_key(&fpr).unwrap_err().is_eof());

    // Gone means gone.
    let err = ctx.delete(&upgraded, true).unwrap_err();
    assert_eq!(err.code(), GPG_ERR_NO_PUBKEY);
}

#[test]
fn generated_key_can_go_straight_to_the_keyring() {
    let mut ctx = common::context();
    let params =
        "Key-Type: RSA\nName-Real: Edgar Stored\nName-Email: edgar@example.net\n";
    assert!(ctx.generate_key(params, true).unwrap().is_none());

    let key = ctx
        .find_keys(Some("edgar@example.net"))
        .unwrap()
        .next()
        .unwrap()
        .unwrap();
    assert!(key.has_secret());
    ctx.delete(&key, true).unwrap();
}

#[test]
fn progress_reports_during_generation() {
    let mut ctx = common::context();
    let seen: Arc<Mutex<Vec<(String, isize, isize)>>> = Arc::default();
    let sink = seen.clone();
    ctx.set_progress_handler(move |what: &str, _typ: isize, current: isize, total: isize| {
        sink.lock().unwrap().push((what.to_owned(), current, total));
    });

    let pair = ctx
        .generate_key("Name-Real: Probe\nName-Email: probe@example.net\n", false)
        .unwrap();
    drop(pair);

    let seen = seen.lock().unwrap();
    assert!(!seen.is_empty());
    assert!(seen.iter().all(|(what, _, total)| what == "genkey" && *total == 3));

    drop(seen);
    ctx.clear_progress_handler();
}

#[test]
fn roundtrip_through_exported_material() {
    let mut ctx = common::context();
    let mut keydata = ctx.export(Some("Bravo")).unwrap();
    keydata.seek(SeekFrom::Start(0)).unwrap();
    // Importing known keys is a harmless merge.
    ctx.import(&mut keydata).unwrap();
    assert!(ctx.find_key(common::BRAVO_FPR).is_ok());
}
