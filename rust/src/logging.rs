//! Verbosity-gated logging macros for the scheduling passes.
//!
//! Output goes through the `log` facade; the caller's logger decides where it
//! lands. The verbosity gate sits in front of the facade so a silent run never
//! formats a message:
//! - 0: SILENT (warnings are returned on the schedule, nothing logged)
//! - 1: SUMMARY (phase boundaries, project finish, warnings)
//! - 2: CONSTRAINTS (per-task dates and the links that drove them)
//! - 3: DEBUG (every individual link bound)

pub const VERBOSITY_SILENT: u8 = 0;
pub const VERBOSITY_SUMMARY: u8 = 1;
pub const VERBOSITY_CONSTRAINTS: u8 = 2;
pub const VERBOSITY_DEBUG: u8 = 3;

/// Log at SUMMARY level (verbosity >= 1).
///
/// Used for: phase completion, project finish, infeasibility.
#[macro_export]
macro_rules! log_summary {
    ($verbosity:expr, $($arg:tt)*) => {
        if $verbosity >= $crate::logging::VERBOSITY_SUMMARY {
            log::info!($($arg)*);
        }
    };
}

/// Log at CONSTRAINTS level (verbosity >= 2).
///
/// Used for: computed dates per task, driving links, dropped links.
#[macro_export]
macro_rules! log_constraints {
    ($verbosity:expr, $($arg:tt)*) => {
        if $verbosity >= $crate::logging::VERBOSITY_CONSTRAINTS {
            log::debug!($($arg)*);
        }
    };
}

/// Log at DEBUG level (verbosity >= 3).
#[macro_export]
macro_rules! log_debug {
    ($verbosity:expr, $($arg:tt)*) => {
        if $verbosity >= $crate::logging::VERBOSITY_DEBUG {
            log::trace!($($arg)*);
        }
    };
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_verbosity_levels_are_ordered() {
        assert!(VERBOSITY_SILENT < VERBOSITY_SUMMARY);
        assert!(VERBOSITY_SUMMARY < VERBOSITY_CONSTRAINTS);
        assert!(VERBOSITY_CONSTRAINTS < VERBOSITY_DEBUG);
    }

    #[test]
    fn test_log_macros_at_every_level() {
        let _ = env_logger::builder().is_test(true).try_init();
        for verbosity in VERBOSITY_SILENT..=VERBOSITY_DEBUG {
            log_summary!(verbosity, "summary {}", 1);
            log_constraints!(verbosity, "constraints {}", 2);
            log_debug!(verbosity, "debug {}", 3);
        }
    }
}
