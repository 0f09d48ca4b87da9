// Copyright 2025 Zurich Instruments AG
// SPDX-License-Identifier: Apache-2.0

use std::sync::{atomic::AtomicBool, atomic::Ordering};

#[doc(hidden)]
pub use log as _log;

#[macro_export]
macro_rules! info {
    ($msg:literal, $($arg:tt)+) => {
        pd_log::_log::info!(target: concat!("protocol_designer.rust::", module_path!()), $msg, $($arg)+);
    };
    ($msg:literal) => {
        pd_log::_log::info!(target: concat!("protocol_designer.rust::", module_path!()), $msg);
    };
}

#[macro_export]
macro_rules! warn {
    ($msg:literal, $($arg:tt)+) => {
        pd_log::_log::warn!(target: concat!("protocol_designer.rust::", module_path!()), $msg, $($arg)+);
    };
    ($msg:literal) => {
        pd_log::_log::warn!(target: concat!("protocol_designer.rust::", module_path!()), $msg);
    };
}

#[macro_export]
macro_rules! debug {
    ($msg:literal, $($arg:tt)+) => {
        pd_log::_log::debug!(target: concat!("protocol_designer.rust::", module_path!()), $msg, $($arg)+);
    };
    ($msg:literal) => {
        pd_log::_log::debug!(target: concat!("protocol_designer.rust::", module_path!()), $msg);
    };
}

/// Log a diagnostic message at info level if diagnostics logging is enabled.
#[macro_export]
macro_rules! diagnostic {
    ($msg:literal, $($arg:tt)+) => {
        if pd_log::is_diagnostics_enabled() {
             pd_log::_log::info!(target: concat!("protocol_designer.rust::", module_path!()), $msg, $($arg)+);
        }
    };
    ($msg:literal) => {
        if pd_log::is_diagnostics_enabled() {
            pd_log::_log::info!(target: concat!("protocol_designer.rust::", module_path!()), $msg);
        }
    };
}

static DIAGNOSTICS_ENABLED: AtomicBool = AtomicBool::new(false);

#[inline]
pub fn is_diagnostics_enabled() -> bool {
    DIAGNOSTICS_ENABLED.load(Ordering::Acquire)
}

/// Initialize the logging.
///
/// Only sets the diagnostics flag. Installing a `log` backend is left to the binary.
pub fn init_logging(with_diagnostics: bool) {
    DIAGNOSTICS_ENABLED.store(with_diagnostics, Ordering::Release);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_diagnostics_flag() {
        init_logging(true);
        assert!(is_diagnostics_enabled());
        init_logging(false);
        assert!(!is_diagnostics_enabled());
    }
}
