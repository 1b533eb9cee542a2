#![allow(dead_code)]

mod engine;

pub use self::engine::{
    TestEngine, ALPHA_FPR, BRAVO_FPR, CHARLIE_FPR, CHARLIE_PASSPHRASE,
};

use std::sync::OnceLock;

use cryptme::Context;

/// Installs the shared engine double for this test binary and returns a
/// handle to it. Safe to call from every test.
pub fn install() -> &'static TestEngine {
    static HANDLE: OnceLock<TestEngine> = OnceLock::new();
    let engine = HANDLE.get_or_init(TestEngine::with_fixtures);
    cryptme::init(engine.clone()).unwrap();
    engine
}

pub fn context() -> Context {
    install();
    cryptme::create_context().unwrap()
}
