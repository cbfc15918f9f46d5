//! Opt-in tracing setup for hosts embedding the curve pipeline.
//!
//! The pipeline emits `debug!`/`trace!` events from the geometry, label,
//! fill and raster stages under this crate's target. Nothing here runs
//! implicitly: hosts either call [`init_default_tracing`] (behind the
//! `telemetry` feature) or install their own subscriber.

/// Filter used when `RUST_LOG` is unset: pipeline recomputation events at
/// `debug`, everything else at `info`.
#[cfg(feature = "telemetry")]
const DEFAULT_FILTER: &str = "info,plotline=debug";

/// Installs a compact global subscriber honoring `RUST_LOG`, falling back
/// to [`DEFAULT_FILTER`].
///
/// Returns `false` when the `telemetry` feature is disabled or a global
/// subscriber is already installed, so embedding hosts always win.
#[must_use]
pub fn init_default_tracing() -> bool {
    #[cfg(feature = "telemetry")]
    {
        use tracing_subscriber::EnvFilter;

        let filter = EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));
        return tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_target(true)
            .compact()
            .try_init()
            .is_ok();
    }

    #[cfg(not(feature = "telemetry"))]
    {
        false
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn subscriber_is_installed_at_most_once() {
        let first = init_default_tracing();
        let second = init_default_tracing();
        // The second call must always yield to the already-installed
        // subscriber, whichever call won.
        assert!(!(first && second));
    }

    #[test]
    fn initialization_is_a_no_op_without_the_feature() {
        if !cfg!(feature = "telemetry") {
            assert!(!init_default_tracing());
        }
    }
}
