//! On-disk layout under the data directory:
//!
//! ```text
//! {DATA_DIR}/sources.json                  discovery output (read)
//! {DATA_DIR}/lunch-data/combined.json      canonical merged dataset
//! {DATA_DIR}/lunch-data/runs/{run_id}.json per-run outcome log
//! ```

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use lunchradar_common::types::{AcquisitionOutcome, DishRecord, Source};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::merge::CanonicalDataset;

pub fn data_dir() -> PathBuf {
    PathBuf::from(std::env::var("DATA_DIR").unwrap_or_else(|_| "data".to_string()))
}

/// The combined document consumed by the site generator. Field names are
/// part of the downstream contract.
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CombinedDocument {
    pub generated_at: DateTime<Utc>,
    pub total_dishes: usize,
    pub total_sources: usize,
    pub dishes: Vec<DishRecord>,
    pub sources: Vec<Source>,
}

pub struct Store {
    root: PathBuf,
}

impl Store {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn from_env() -> Self {
        Self::new(data_dir())
    }

    pub fn sources_path(&self) -> PathBuf {
        self.root.join("sources.json")
    }

    fn combined_path(&self) -> PathBuf {
        self.root.join("lunch-data").join("combined.json")
    }

    fn runs_dir(&self) -> PathBuf {
        self.root.join("lunch-data").join("runs")
    }

    /// Load the canonical dataset from the previous run. A missing file is
    /// a first run, not an error.
    pub fn load_dataset(&self) -> Result<CanonicalDataset> {
        let path = self.combined_path();
        if !path.exists() {
            return Ok(CanonicalDataset::new());
        }
        let raw = fs::read_to_string(&path)
            .with_context(|| format!("cannot read {}", path.display()))?;
        let doc: CombinedDocument = serde_json::from_str(&raw)
            .with_context(|| format!("malformed dataset at {}", path.display()))?;
        Ok(CanonicalDataset::from_records(doc.dishes))
    }

    pub fn save_dataset(
        &self,
        dataset: &CanonicalDataset,
        sources: &[Source],
    ) -> Result<PathBuf> {
        let doc = CombinedDocument {
            generated_at: Utc::now(),
            total_dishes: dataset.len(),
            total_sources: dataset.source_count(),
            dishes: dataset.sorted_dishes(),
            sources: sources.to_vec(),
        };
        let path = self.combined_path();
        write_pretty(&path, &doc)?;
        info!(
            dishes = doc.total_dishes,
            sources = doc.total_sources,
            path = %path.display(),
            "Saved combined dataset"
        );
        Ok(path)
    }

    /// Persist per-source outcomes for one run, keyed by source id, for
    /// later inspection of what each strategy cost and produced.
    pub fn save_outcomes(&self, run_id: &str, outcomes: &[AcquisitionOutcome]) -> Result<PathBuf> {
        let by_source: BTreeMap<&str, &AcquisitionOutcome> = outcomes
            .iter()
            .map(|o| (o.source_id.as_str(), o))
            .collect();
        let path = self.runs_dir().join(format!("{run_id}.json"));
        write_pretty(&path, &by_source)?;
        Ok(path)
    }
}

fn write_pretty<T: Serialize>(path: &Path, value: &T) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)
            .with_context(|| format!("cannot create {}", parent.display()))?;
    }
    let json = serde_json::to_string_pretty(value)?;
    fs::write(path, json).with_context(|| format!("cannot write {}", path.display()))?;
    Ok(())
}
