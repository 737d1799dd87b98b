//! The raw permission catalog: which services exist and which actions each
//! service exposes.
//!
//! The catalog is data owned by some other tool. A `CatalogSource` knows how
//! to fetch it and hands back a normalized [`Catalog`].

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{Result, TaggerError};

/// One provider entry as published in the catalog JSON.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServiceDescription {
    /// Service prefix used in permission strings (e.g. `s3`).
    #[serde(rename = "StringPrefix")]
    pub string_prefix: String,
    /// Raw action identifiers (e.g. `CreateBucket`).
    #[serde(rename = "Actions", default)]
    pub actions: Vec<String>,
}

/// Service prefix → actions, keyed and iterated in service-name order.
///
/// Providers sharing a prefix are merged; an action listed twice for the
/// same service is kept once, at its first position.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Catalog {
    services: BTreeMap<String, Vec<String>>,
}

impl Catalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a catalog from provider descriptions.
    pub fn from_descriptions<'a, I>(descriptions: I) -> Self
    where
        I: IntoIterator<Item = &'a ServiceDescription>,
    {
        let mut catalog = Self::new();
        for description in descriptions {
            catalog.add_service(&description.string_prefix, &description.actions);
        }
        catalog
    }

    /// Parse the provider-id → description JSON object.
    pub fn from_json_str(content: &str) -> serde_json::Result<Self> {
        let raw: BTreeMap<String, ServiceDescription> = serde_json::from_str(content)?;
        Ok(Self::from_descriptions(raw.values()))
    }

    /// Add (or extend) a service with actions.
    pub fn add_service<S: AsRef<str>>(&mut self, service: &str, actions: &[S]) {
        let entry = self.services.entry(service.to_string()).or_default();
        for action in actions {
            let action = action.as_ref();
            if !entry.iter().any(|a| a == action) {
                entry.push(action.to_string());
            }
        }
    }

    /// Sorted service names.
    pub fn service_names(&self) -> impl Iterator<Item = &str> {
        self.services.keys().map(String::as_str)
    }

    /// Services with their actions, in service-name order.
    pub fn services(&self) -> impl Iterator<Item = (&str, &[String])> {
        self.services
            .iter()
            .map(|(s, actions)| (s.as_str(), actions.as_slice()))
    }

    pub fn service_count(&self) -> usize {
        self.services.len()
    }

    pub fn permission_count(&self) -> usize {
        self.services.values().map(Vec::len).sum()
    }
}

/// Something that can supply the permission catalog.
pub trait CatalogSource {
    /// Human-readable origin, used in log lines.
    fn describe(&self) -> String;

    /// Fetch and normalize the catalog.
    fn load(&self) -> Result<Catalog>;
}

/// A catalog stored as a JSON file on disk.
#[derive(Debug, Clone)]
pub struct JsonCatalogFile {
    path: PathBuf,
}

impl JsonCatalogFile {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl CatalogSource for JsonCatalogFile {
    fn describe(&self) -> String {
        self.path.display().to_string()
    }

    fn load(&self) -> Result<Catalog> {
        let content =
            std::fs::read_to_string(&self.path).map_err(|source| TaggerError::CatalogRead {
                path: self.path.clone(),
                source,
            })?;
        let catalog =
            Catalog::from_json_str(&content).map_err(|e| TaggerError::CatalogParse {
                path: self.path.clone(),
                message: e.to_string(),
            })?;
        tracing::debug!(
            source = %self.describe(),
            services = catalog.service_count(),
            permissions = catalog.permission_count(),
            "catalog loaded"
        );
        Ok(catalog)
    }
}

impl CatalogSource for Catalog {
    fn describe(&self) -> String {
        "in-memory catalog".into()
    }

    fn load(&self) -> Result<Catalog> {
        Ok(self.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    const SAMPLE: &str = r#"{
        "Amazon S3": {
            "StringPrefix": "s3",
            "Actions": ["CreateBucket", "GetObject", "CreateBucket"]
        },
        "AWS Identity and Access Management": {
            "StringPrefix": "iam",
            "Actions": ["ListPolicies"]
        },
        "Amazon S3 Extra": {
            "StringPrefix": "s3",
            "Actions": ["PutObject"]
        }
    }"#;

    #[test]
    fn parses_and_merges_prefixes() {
        let catalog = Catalog::from_json_str(SAMPLE).unwrap();
        assert_eq!(catalog.service_names().collect::<Vec<_>>(), vec!["iam", "s3"]);
        let s3: Vec<&str> = catalog
            .services()
            .find(|(s, _)| *s == "s3")
            .map(|(_, a)| a.iter().map(String::as_str).collect())
            .unwrap();
        assert_eq!(s3, vec!["CreateBucket", "GetObject", "PutObject"]);
        assert_eq!(catalog.permission_count(), 4);
    }

    #[test]
    fn missing_actions_means_empty_service() {
        let catalog = Catalog::from_json_str(r#"{"x": {"StringPrefix": "empty"}}"#).unwrap();
        assert_eq!(catalog.service_count(), 1);
        assert_eq!(catalog.permission_count(), 0);
    }

    #[test]
    fn json_file_source_reports_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let source = JsonCatalogFile::new(dir.path().join("absent.json"));
        let err = source.load().unwrap_err();
        assert!(matches!(err, TaggerError::CatalogRead { .. }));
    }

    #[test]
    fn json_file_source_reports_bad_json() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("catalog.json");
        std::fs::write(&path, "[1, 2").unwrap();
        let err = JsonCatalogFile::new(&path).load().unwrap_err();
        assert!(matches!(err, TaggerError::CatalogParse { .. }));
    }
}
