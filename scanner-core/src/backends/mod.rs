pub mod airport;
pub mod mock;
pub mod system_profiler;
pub mod utils;

use crate::traits::{RawObservation, ScanSource, ScanTool};
use async_trait::async_trait;

/// Scan source adapter: runs the primary tool and degrades to the secondary
/// one when the primary is missing or fails.
///
/// Total failure yields an empty result plus an `error` log entry; nothing is
/// retried here, the polling cadence belongs to the caller.
#[derive(Debug)]
pub struct FallbackScanner<P, S> {
    primary: P,
    secondary: S,
}

impl<P: ScanTool, S: ScanTool> FallbackScanner<P, S> {
    pub fn new(primary: P, secondary: S) -> Self {
        Self { primary, secondary }
    }

    pub fn primary(&self) -> &P {
        &self.primary
    }

    pub fn secondary(&self) -> &S {
        &self.secondary
    }
}

#[async_trait]
impl<P: ScanTool, S: ScanTool> ScanSource for FallbackScanner<P, S> {
    fn name(&self) -> &str {
        if self.primary.is_available() {
            self.primary.name()
        } else {
            self.secondary.name()
        }
    }

    async fn scan(&self) -> Vec<RawObservation> {
        if self.primary.is_available() {
            match self.primary.run().await {
                Ok(observations) => return observations,
                Err(e) => {
                    tracing::warn!(
                        tool = self.primary.name(),
                        error = %e,
                        "Primary scan failed, falling back to {}",
                        self.secondary.name()
                    );
                }
            }
        }

        match self.secondary.run().await {
            Ok(observations) => {
                tracing::debug!(
                    tool = self.secondary.name(),
                    count = observations.len(),
                    "Fallback scan complete (current association only)"
                );
                observations
            }
            Err(e) => {
                tracing::error!(
                    primary = self.primary.name(),
                    secondary = self.secondary.name(),
                    error = %e,
                    "Error scanning networks: no scan tool succeeded"
                );
                Vec::new()
            }
        }
    }
}
