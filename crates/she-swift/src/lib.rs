//! Swift health checks.
//!
//! Each check wraps one external tool invocation and its output parser:
//! - [`recon`]: the seven `swift-recon` checks, one task per check;
//! - [`dispersion`]: the `swift-dispersion-report` summary.
#[cfg(feature = "recon")]
pub mod recon;

#[cfg(feature = "dispersion")]
pub mod dispersion;
