// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Shared helpers for the Understory input demos.

/// Installs an `env_logger` logger defaulting to `info`.
///
/// `RUST_LOG` overrides the filter, e.g. `RUST_LOG=understory_timing=trace`
/// to watch every service pass.
pub fn init_logging() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .format_timestamp_millis()
        .init();
}
