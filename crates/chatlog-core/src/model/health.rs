//! Engine health reporting
//!
//! Lets a host render a deterministic degraded-mode indicator instead of
//! inferring it from empty results.

use crate::errors::ExError;

/// Lifecycle of the store's engine
///
/// `Ready` and `Degraded` are terminal for the lifetime of a repository.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EngineState {
    Uninitialized,
    Initializing,
    Ready,
    Degraded,
}

/// Where a ready engine's contents came from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BootSource {
    /// No prior snapshot; schema created
    Fresh,
    /// Loaded from a valid snapshot
    Restored,
    /// Prior snapshot was unusable and discarded; schema created
    Recovered,
}

/// Point-in-time health report
#[derive(Debug, Clone)]
pub struct EngineHealth {
    pub state: EngineState,
    pub boot_source: Option<BootSource>,
    /// Degradation cause, or the parse failure of a discarded snapshot
    pub reason: Option<ExError>,
}

impl EngineHealth {
    pub fn uninitialized() -> Self {
        Self {
            state: EngineState::Uninitialized,
            boot_source: None,
            reason: None,
        }
    }

    pub fn initializing() -> Self {
        Self {
            state: EngineState::Initializing,
            boot_source: None,
            reason: None,
        }
    }

    pub fn ready(boot_source: BootSource, reason: Option<ExError>) -> Self {
        Self {
            state: EngineState::Ready,
            boot_source: Some(boot_source),
            reason,
        }
    }

    pub fn degraded(reason: ExError) -> Self {
        Self {
            state: EngineState::Degraded,
            boot_source: None,
            reason: Some(reason),
        }
    }

    pub fn is_ready(&self) -> bool {
        self.state == EngineState::Ready
    }

    pub fn is_degraded(&self) -> bool {
        self.state == EngineState::Degraded
    }
}
