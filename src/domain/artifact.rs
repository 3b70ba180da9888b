//! Shared, immutable handle to a precomputed wide table.
//!
//! Readers clone the `Arc` they get from [`ArtifactHandle::table`] and keep
//! using it even if a reload swaps in a newer table underneath them.

use crate::domain::error::StratbenchError;
use crate::domain::portfolio::PortfolioPoint;
use crate::domain::precompute::WideTable;
use crate::ports::artifact_port::ArtifactSource;
use chrono::NaiveDate;
use std::sync::{Arc, RwLock};

pub struct ArtifactHandle {
    source: Box<dyn ArtifactSource>,
    table: RwLock<Arc<WideTable>>,
}

impl ArtifactHandle {
    pub fn open(source: Box<dyn ArtifactSource>) -> Result<Self, StratbenchError> {
        let table = source.read()?;
        tracing::info!(
            source = %source.describe(),
            rows = table.rows.len(),
            strategies = table.suffixes.len(),
            "loaded artifact"
        );
        Ok(Self {
            source,
            table: RwLock::new(Arc::new(table)),
        })
    }

    pub fn table(&self) -> Arc<WideTable> {
        match self.table.read() {
            Ok(guard) => Arc::clone(&guard),
            Err(poisoned) => Arc::clone(&poisoned.into_inner()),
        }
    }

    /// Re-reads the source. On failure the previous table stays in place.
    pub fn reload(&self) -> Result<Arc<WideTable>, StratbenchError> {
        let fresh = Arc::new(self.source.read()?);
        let mut guard = match self.table.write() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        *guard = Arc::clone(&fresh);
        tracing::info!(
            source = %self.source.describe(),
            rows = fresh.rows.len(),
            "reloaded artifact"
        );
        Ok(fresh)
    }

    pub fn strategies(&self) -> Vec<String> {
        self.table().suffixes.clone()
    }

    pub fn portfolio_curve(
        &self,
        suffix: &str,
        start: Option<NaiveDate>,
        end: Option<NaiveDate>,
    ) -> Result<Vec<PortfolioPoint>, StratbenchError> {
        self.table().portfolio_curve(suffix, start, end)
    }
}
