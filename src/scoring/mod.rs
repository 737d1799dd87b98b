//! Risk scoring: a per-service baseline plus tag-driven adjustments.
//!
//! This is a first-pass heuristic meant to be tuned, not a certified risk
//! model. The baseline comes from the service's [`CriticalityLevel`]; a
//! permission tagged MUTATING gets a fixed bonus on top.

pub mod criticality;

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize, Serializer};

use crate::tags::{Permission, Tag, TagSet};

pub use criticality::{CriticalityStore, SkipReason, SkippedLine};

/// Bonus added for MUTATING permissions unless configured otherwise.
pub const DEFAULT_MUTATING_BONUS: u32 = 5;

/// Coarse per-service risk tier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum CriticalityLevel {
    #[default]
    Undefined,
    Low,
    Medium,
    High,
}

impl CriticalityLevel {
    pub const ALL: [CriticalityLevel; 4] = [
        CriticalityLevel::Undefined,
        CriticalityLevel::Low,
        CriticalityLevel::Medium,
        CriticalityLevel::High,
    ];

    /// Baseline weight. UNDEFINED and MEDIUM both weigh 5.
    pub fn weight(self) -> u32 {
        match self {
            Self::Undefined => 5,
            Self::Low => 2,
            Self::Medium => 5,
            Self::High => 10,
        }
    }

    /// Exact, case-sensitive match on the score-file token.
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "UNDEFINED" => Some(Self::Undefined),
            "LOW" => Some(Self::Low),
            "MEDIUM" => Some(Self::Medium),
            "HIGH" => Some(Self::High),
            _ => None,
        }
    }

    /// Nearest known level within edit distance 2, for typo hints.
    pub fn closest(s: &str) -> Option<Self> {
        let upper = s.to_uppercase();
        Self::ALL
            .iter()
            .map(|l| (levenshtein::levenshtein(&upper, &l.to_string()), *l))
            .filter(|(d, _)| *d <= 2)
            .min_by_key(|(d, _)| *d)
            .map(|(_, l)| l)
    }
}

impl std::fmt::Display for CriticalityLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Undefined => write!(f, "UNDEFINED"),
            Self::Low => write!(f, "LOW"),
            Self::Medium => write!(f, "MEDIUM"),
            Self::High => write!(f, "HIGH"),
        }
    }
}

/// Final score of one permission.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Score {
    Value(u32),
    /// The service has no criticality rating.
    Unknown,
}

impl Score {
    pub fn value(self) -> Option<u32> {
        match self {
            Self::Value(v) => Some(v),
            Self::Unknown => None,
        }
    }
}

impl std::fmt::Display for Score {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Value(v) => write!(f, "{}", v),
            Self::Unknown => write!(f, "UNKNOWN"),
        }
    }
}

impl Serialize for Score {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Self::Value(v) => serializer.serialize_u32(*v),
            Self::Unknown => serializer.serialize_str("UNKNOWN"),
        }
    }
}

/// A permission with its score.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScoredPermission {
    pub service: String,
    pub action: String,
    pub tags: TagSet,
    pub score: Score,
}

/// Result of scoring a batch of permissions.
#[derive(Debug, Clone, Default)]
pub struct ScoredBatch {
    pub permissions: Vec<ScoredPermission>,
    /// Services without a rating, with how many permissions they cover.
    pub unscored_services: BTreeMap<String, usize>,
}

impl ScoredBatch {
    pub fn unknown_count(&self) -> usize {
        self.unscored_services.values().sum()
    }
}

/// Combines service criticality with tags into a score.
#[derive(Debug, Clone)]
pub struct ScoringEngine {
    criticality: CriticalityStore,
    mutating_bonus: u32,
}

impl ScoringEngine {
    pub fn new(criticality: CriticalityStore) -> Self {
        Self {
            criticality,
            mutating_bonus: DEFAULT_MUTATING_BONUS,
        }
    }

    pub fn with_mutating_bonus(mut self, bonus: u32) -> Self {
        self.mutating_bonus = bonus;
        self
    }

    pub fn criticality(&self) -> &CriticalityStore {
        &self.criticality
    }

    /// Score one permission. Depends only on the service rating and tags.
    pub fn score(&self, service: &str, tags: TagSet) -> Score {
        match self.criticality.weight(service) {
            Some(base) if tags.contains(Tag::Mutating) => Score::Value(base + self.mutating_bonus),
            Some(base) => Score::Value(base),
            None => Score::Unknown,
        }
    }

    /// Score every permission. Unrated services score UNKNOWN and are
    /// warned about once each; the rest of the batch is unaffected.
    pub fn score_all<'a, I>(&self, permissions: I) -> ScoredBatch
    where
        I: IntoIterator<Item = &'a Permission>,
    {
        let mut batch = ScoredBatch::default();

        for permission in permissions {
            let score = self.score(&permission.service, permission.tags);
            if score == Score::Unknown {
                *batch
                    .unscored_services
                    .entry(permission.service.clone())
                    .or_insert(0) += 1;
            }
            batch.permissions.push(ScoredPermission {
                service: permission.service.clone(),
                action: permission.action.clone(),
                tags: permission.tags,
                score,
            });
        }

        for (service, count) in &batch.unscored_services {
            tracing::warn!(
                service = %service,
                permissions = count,
                "found a service with no criticality score"
            );
        }

        batch
    }
}
