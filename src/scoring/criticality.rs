//! Per-service criticality ratings stored as `service,LEVEL` lines.

use std::collections::BTreeMap;
use std::path::Path;

use super::CriticalityLevel;
use crate::error::{Result, TaggerError};

/// A score-file line that could not be used.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SkippedLine {
    /// 1-based line number.
    pub line_number: usize,
    pub content: String,
    pub reason: SkipReason,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SkipReason {
    /// Not exactly `service,LEVEL`.
    Malformed,
    /// Level token is not one of the known levels.
    UnknownLevel {
        level: String,
        suggestion: Option<CriticalityLevel>,
    },
}

impl std::fmt::Display for SkipReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Malformed => write!(f, "expected `service,LEVEL`"),
            Self::UnknownLevel {
                level,
                suggestion: Some(s),
            } => write!(f, "unknown level '{}' (did you mean {}?)", level, s),
            Self::UnknownLevel {
                level,
                suggestion: None,
            } => write!(f, "unknown level '{}'", level),
        }
    }
}

/// Service → criticality level, as loaded from a score file.
#[derive(Debug, Clone, Default)]
pub struct CriticalityStore {
    levels: BTreeMap<String, CriticalityLevel>,
    skipped: Vec<SkippedLine>,
}

impl CriticalityStore {
    /// Read a score file. An unreadable file is fatal; bad lines are not.
    pub fn load(path: &Path) -> Result<Self> {
        let content =
            std::fs::read_to_string(path).map_err(|source| TaggerError::ScoreFileRead {
                path: path.to_path_buf(),
                source,
            })?;
        let store = Self::parse(&content);
        tracing::debug!(
            path = %path.display(),
            services = store.len(),
            skipped = store.skipped.len(),
            "service scores loaded"
        );
        Ok(store)
    }

    /// Parse score-file content, skipping (and warning about) bad lines.
    pub fn parse(content: &str) -> Self {
        let mut store = Self::default();

        for (idx, raw) in content.lines().enumerate() {
            let line = raw.trim();
            if line.is_empty() {
                continue;
            }
            match parse_line(line) {
                Ok((service, level)) => {
                    store.levels.insert(service.to_string(), level);
                }
                Err(reason) => {
                    tracing::warn!(
                        line_number = idx + 1,
                        line = %line,
                        reason = %reason,
                        "ignoring malformed line"
                    );
                    store.skipped.push(SkippedLine {
                        line_number: idx + 1,
                        content: line.to_string(),
                        reason,
                    });
                }
            }
        }

        store
    }

    pub fn insert(&mut self, service: impl Into<String>, level: CriticalityLevel) {
        self.levels.insert(service.into(), level);
    }

    pub fn level(&self, service: &str) -> Option<CriticalityLevel> {
        self.levels.get(service).copied()
    }

    pub fn weight(&self, service: &str) -> Option<u32> {
        self.level(service).map(CriticalityLevel::weight)
    }

    /// Lines that were skipped while parsing.
    pub fn skipped(&self) -> &[SkippedLine] {
        &self.skipped
    }

    pub fn len(&self) -> usize {
        self.levels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.levels.is_empty()
    }
}

impl FromIterator<(String, CriticalityLevel)> for CriticalityStore {
    fn from_iter<I: IntoIterator<Item = (String, CriticalityLevel)>>(iter: I) -> Self {
        Self {
            levels: iter.into_iter().collect(),
            skipped: Vec::new(),
        }
    }
}

fn parse_line(line: &str) -> std::result::Result<(&str, CriticalityLevel), SkipReason> {
    let (service, level) = line.split_once(',').ok_or(SkipReason::Malformed)?;
    let service = service.trim();
    let level = level.trim();
    if service.is_empty() || level.is_empty() || level.contains(',') {
        return Err(SkipReason::Malformed);
    }
    let parsed = CriticalityLevel::parse(level).ok_or_else(|| SkipReason::UnknownLevel {
        level: level.to_string(),
        suggestion: CriticalityLevel::closest(level),
    })?;
    Ok((service, parsed))
}

/// Score-file content listing every service at the default level.
pub fn default_score_file<'a, I>(services: I) -> String
where
    I: IntoIterator<Item = &'a str>,
{
    let mut services: Vec<&str> = services.into_iter().collect();
    services.sort_unstable();
    services.dedup();
    services
        .into_iter()
        .map(|s| format!("{},{}\n", s, CriticalityLevel::default()))
        .collect()
}

/// Write [`default_score_file`] to `path`.
pub fn write_default_score_file<'a, I>(path: &Path, services: I) -> Result<usize>
where
    I: IntoIterator<Item = &'a str>,
{
    let content = default_score_file(services);
    std::fs::write(path, &content).map_err(|source| TaggerError::OutputWrite {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(content.lines().count())
}
