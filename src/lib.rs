//! iam-tagger — classify cloud IAM permissions and score their risk.
//!
//! Each action in a permission catalog (e.g. `s3:CreateBucket`) is split
//! into words and tagged DATA_PLANE, CONTROL_PLANE, MUTATING, READ and/or
//! SIDE_EFFECT by trigger words. Tags are combined with a per-service
//! criticality rating into a heuristic score.
//!
//! # Quick Start
//!
//! ```no_run
//! use iamtagger::{render_report, RunOptions, Tagger};
//! use iamtagger::output::OutputFormat;
//! use iamtagger::report::ReportKind;
//!
//! let tagger = Tagger::load(&RunOptions::default()).unwrap();
//! let report = tagger.report(ReportKind::Mutating).unwrap();
//! println!("{}", render_report(&report, OutputFormat::Console).unwrap());
//! ```

pub mod catalog;
pub mod config;
pub mod error;
pub mod output;
pub mod report;
pub mod scoring;
pub mod tags;

use std::path::{Path, PathBuf};

use catalog::{CatalogSource, JsonCatalogFile};
use config::Config;
use error::{Result, TaggerError};
use output::OutputFormat;
use report::{Report, ReportBuilder, ReportKind};
use scoring::criticality::write_default_score_file;
use scoring::{CriticalityStore, ScoringEngine};
use tags::PermissionIndex;

/// Options for a run.
#[derive(Debug, Clone, Default)]
pub struct RunOptions {
    /// Path to config file (defaults to `.iam-tagger.toml` in the working
    /// directory).
    pub config_path: Option<PathBuf>,
    /// Catalog path overriding the configured one.
    pub catalog_override: Option<PathBuf>,
}

/// A classified catalog plus the configuration it was built with.
#[derive(Debug, Clone)]
pub struct Tagger {
    config: Config,
    index: PermissionIndex,
}

impl Tagger {
    /// Load config and catalog from disk and classify every permission.
    pub fn load(options: &RunOptions) -> Result<Self> {
        let config_path = options
            .config_path
            .clone()
            .unwrap_or_else(|| PathBuf::from(config::CONFIG_FILE_NAME));
        let mut config = Config::load(&config_path)?;

        if let Some(catalog) = &options.catalog_override {
            config.catalog = catalog.clone();
        }

        let source = JsonCatalogFile::new(&config.catalog);
        Self::from_source(config, &source)
    }

    /// Classify a catalog from any source.
    pub fn from_source(config: Config, source: &dyn CatalogSource) -> Result<Self> {
        let catalog = source.load()?;
        let index = PermissionIndex::build(&catalog, &config.rule_set());
        tracing::info!(
            source = %source.describe(),
            permissions = index.len(),
            "catalog classified"
        );
        Ok(Self { config, index })
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn index(&self) -> &PermissionIndex {
        &self.index
    }

    /// Build the full matrix or the mutating subset.
    ///
    /// Scored reports need a score file; use [`Tagger::scored_report`].
    pub fn report(&self, kind: ReportKind) -> Result<Report> {
        ReportBuilder::new(&self.index)
            .build(kind, None)
            .ok_or_else(|| TaggerError::Config("scored reports need a service score file".into()))
    }

    /// Score every permission against the ratings in `score_file`.
    pub fn scored_report(&self, score_file: &Path) -> Result<Report> {
        let store = CriticalityStore::load(score_file)?;
        Ok(self.scored_report_with(store))
    }

    /// Score every permission against already-loaded ratings.
    pub fn scored_report_with(&self, store: CriticalityStore) -> Report {
        let engine =
            ScoringEngine::new(store).with_mutating_bonus(self.config.scoring.mutating_bonus);
        ReportBuilder::new(&self.index).scored(&engine)
    }

    /// Write every known service at UNDEFINED, sorted, to `output`.
    /// Returns the number of services written.
    pub fn create_service_score_file(&self, output: &Path) -> Result<usize> {
        write_default_score_file(output, self.index.services().iter().map(String::as_str))
    }
}

/// Render a report in the specified format.
pub fn render_report(report: &Report, format: OutputFormat) -> Result<String> {
    output::render(report, format)
}
