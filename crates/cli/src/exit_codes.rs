//! CLI Exit Code Registry
//!
//! Single source of truth for `megaverse` exit codes. Scripts rely on them.
//!
//! | Code | Meaning                                          |
//! |------|--------------------------------------------------|
//! | 0    | Success                                          |
//! | 1    | General error (unspecified)                      |
//! | 2    | Usage error (bad args)                           |
//! | 3    | Configuration error (unreadable file, no id)     |
//! | 10   | Goal fetch failed, nothing was mutated           |
//! | 11   | Run finished but one or more objects failed      |

use megaverse_config::ConfigError;
use megaverse_recon::ReconError;

/// Success - command completed without errors.
pub const EXIT_SUCCESS: u8 = 0;

/// General error - unspecified failure.
/// Avoid using this; prefer a specific error code.
pub const EXIT_ERROR: u8 = 1;

/// Usage error - bad arguments, missing required options.
pub const EXIT_USAGE: u8 = 2;

/// Config file unreadable or malformed, or no candidate id anywhere.
pub const EXIT_CONFIG: u8 = 3;

/// Goal endpoint unreachable or returned something other than a grid.
pub const EXIT_GOAL_FETCH: u8 = 10;

/// At least one object ended in `Failed`. Clear warnings do not count.
pub const EXIT_PARTIAL: u8 = 11;

pub fn config_exit_code(err: &ConfigError) -> u8 {
    match err {
        ConfigError::Io { .. } | ConfigError::Parse { .. } | ConfigError::MissingCandidate => {
            EXIT_CONFIG
        }
    }
}

pub fn recon_exit_code(err: &ReconError) -> u8 {
    if err.is_goal_failure() {
        EXIT_GOAL_FETCH
    } else {
        EXIT_ERROR
    }
}
