#![doc(test(attr(deny(warnings))))]

//! Banking Core provides the account, ledger, and transfer-validation
//! primitives that power higher level banking frontends.

pub mod config;
pub mod core;
pub mod domain;
pub mod errors;
pub mod query;
pub mod storage;
pub mod store;
pub mod transfer;
pub mod utils;

use std::sync::Once;

static INIT_TRACING: Once = Once::new();

/// Initializes global tracing and emits a startup info log.
pub fn init() {
    INIT_TRACING.call_once(|| {
        utils::init_tracing();
        tracing::info!("Banking Core tracing initialized.");
    });
}
