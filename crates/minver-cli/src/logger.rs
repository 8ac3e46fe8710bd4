//! Logging setup for the `minver` binary.
//!
//! Log events go to stderr so that reports on stdout stay machine-readable.
//!
//! The filter is chosen in this order:
//! 1. `--verbose`: debug for the minver crates
//! 2. `--quiet`: errors only
//! 3. `RUST_LOG`
//! 4. warnings for the minver crates

use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

const MINVER_CRATES: &[&str] = &[
    "minver",
    "minver_graph",
    "minver_store",
    "minver_config",
    "minver_cli",
];

/// Build the filter for the given verbosity flags.
pub fn filter_for(verbose: bool, quiet: bool) -> EnvFilter {
    if verbose {
        EnvFilter::new(directives("debug"))
    } else if quiet {
        EnvFilter::new("error")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| default_filter())
    }
}

/// Filter used when no flag and no `RUST_LOG` is given.
fn default_filter() -> EnvFilter {
    EnvFilter::new(directives("warn"))
}

fn directives(level: &str) -> String {
    MINVER_CRATES
        .iter()
        .map(|krate| format!("{krate}={level}"))
        .collect::<Vec<_>>()
        .join(",")
}

/// Install the global subscriber. Call once, before any logging.
pub fn init_logger(verbose: bool, quiet: bool, no_color: bool) {
    let fmt_layer = fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_level(true)
        .with_ansi(!no_color)
        .compact();

    tracing_subscriber::registry()
        .with(filter_for(verbose, quiet))
        .with(fmt_layer)
        .init();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn verbose_enables_debug_for_every_crate() {
        let filter = filter_for(true, false).to_string();
        for krate in MINVER_CRATES {
            assert!(filter.contains(&format!("{krate}=debug")), "{filter}");
        }
    }

    #[test]
    fn default_is_warn_for_every_crate() {
        let filter = default_filter().to_string();
        for krate in MINVER_CRATES {
            assert!(filter.contains(&format!("{krate}=warn")), "{filter}");
        }
    }

    #[test]
    fn quiet_is_errors_only() {
        assert_eq!(filter_for(false, true).to_string(), "error");
    }
}
