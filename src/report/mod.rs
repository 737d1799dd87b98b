//! Report rows handed to the output renderers.

use std::collections::BTreeMap;

use serde::ser::SerializeMap;
use serde::{Serialize, Serializer};

use crate::scoring::{Score, ScoredPermission, ScoringEngine};
use crate::tags::{Permission, PermissionIndex, Tag, TagSet};

/// Which rows a report contains.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ReportKind {
    /// Every permission.
    All,
    /// Permissions tagged MUTATING or SIDE_EFFECT.
    Mutating,
    /// Every permission with a trailing score.
    Scored,
}

impl ReportKind {
    /// Column headers: service, permission, one per tag, and `score` for
    /// scored reports.
    pub fn headers(self) -> Vec<String> {
        let mut headers = vec!["service".to_string(), "permission".to_string()];
        headers.extend(Tag::ALL.iter().map(|t| t.to_string()));
        if self == Self::Scored {
            headers.push("score".into());
        }
        headers
    }
}

/// One report line. The tag flags are always one per [`Tag`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReportRow {
    pub service: String,
    pub permission: String,
    pub tags: [bool; Tag::COUNT],
    pub score: Option<Score>,
}

impl ReportRow {
    pub fn new(service: &str, permission: &str, tags: TagSet) -> Self {
        Self {
            service: service.to_string(),
            permission: permission.to_string(),
            tags: tags.indicators(),
            score: None,
        }
    }

    pub fn has(&self, tag: Tag) -> bool {
        self.tags[tag as usize]
    }

    /// Cell text in header order. Flags render as `true`/`false`.
    pub fn cells(&self) -> Vec<String> {
        let mut cells = Vec::with_capacity(Tag::COUNT + 3);
        cells.push(self.service.clone());
        cells.push(self.permission.clone());
        cells.extend(self.tags.iter().map(|b| b.to_string()));
        if let Some(score) = self.score {
            cells.push(score.to_string());
        }
        cells
    }
}

impl From<&Permission> for ReportRow {
    fn from(p: &Permission) -> Self {
        Self::new(&p.service, &p.action, p.tags)
    }
}

impl From<&ScoredPermission> for ReportRow {
    fn from(p: &ScoredPermission) -> Self {
        Self {
            score: Some(p.score),
            ..Self::new(&p.service, &p.action, p.tags)
        }
    }
}

impl Serialize for ReportRow {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let len = 2 + Tag::COUNT + usize::from(self.score.is_some());
        let mut map = serializer.serialize_map(Some(len))?;
        map.serialize_entry("service", &self.service)?;
        map.serialize_entry("permission", &self.permission)?;
        for (tag, flag) in Tag::ALL.iter().zip(self.tags.iter()) {
            map.serialize_entry(tag, flag)?;
        }
        if let Some(score) = &self.score {
            map.serialize_entry("score", score)?;
        }
        map.end()
    }
}

/// A finished report.
#[derive(Debug, Clone)]
pub struct Report {
    pub kind: ReportKind,
    pub rows: Vec<ReportRow>,
    /// Services that had no criticality rating (scored reports only).
    pub unscored_services: BTreeMap<String, usize>,
}

impl Report {
    pub fn headers(&self) -> Vec<String> {
        self.kind.headers()
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

/// Builds reports from a classified permission index.
pub struct ReportBuilder<'a> {
    index: &'a PermissionIndex,
}

impl<'a> ReportBuilder<'a> {
    pub fn new(index: &'a PermissionIndex) -> Self {
        Self { index }
    }

    /// One row per permission.
    pub fn full(&self) -> Report {
        Report {
            kind: ReportKind::All,
            rows: self.index.permissions().iter().map(ReportRow::from).collect(),
            unscored_services: BTreeMap::new(),
        }
    }

    /// One row per permission tagged MUTATING or SIDE_EFFECT.
    pub fn mutating(&self) -> Report {
        let risky: TagSet = [Tag::Mutating, Tag::SideEffect].into_iter().collect();
        Report {
            kind: ReportKind::Mutating,
            rows: self
                .index
                .permissions()
                .iter()
                .filter(|p| p.tags.intersects(risky))
                .map(ReportRow::from)
                .collect(),
            unscored_services: BTreeMap::new(),
        }
    }

    /// Every permission, scored.
    pub fn scored(&self, engine: &ScoringEngine) -> Report {
        let batch = engine.score_all(self.index.permissions());
        Report {
            kind: ReportKind::Scored,
            rows: batch.permissions.iter().map(ReportRow::from).collect(),
            unscored_services: batch.unscored_services,
        }
    }

    pub fn build(&self, kind: ReportKind, engine: Option<&ScoringEngine>) -> Option<Report> {
        match (kind, engine) {
            (ReportKind::All, _) => Some(self.full()),
            (ReportKind::Mutating, _) => Some(self.mutating()),
            (ReportKind::Scored, Some(engine)) => Some(self.scored(engine)),
            (ReportKind::Scored, None) => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::Catalog;
    use crate::scoring::{CriticalityLevel, CriticalityStore};
    use crate::tags::TagRuleSet;
    use pretty_assertions::assert_eq;

    fn index() -> PermissionIndex {
        let mut catalog = Catalog::new();
        catalog.add_service(
            "s3",
            &["CreateBucket", "GetObject", "ListBuckets", "RestoreObject"],
        );
        catalog.add_service("ec2", &["StartInstances", "StartDeleteJob", "DescribeImages"]);
        PermissionIndex::build(&catalog, &TagRuleSet::builtin())
    }

    #[test]
    fn headers_per_kind() {
        assert_eq!(
            ReportKind::All.headers(),
            vec![
                "service",
                "permission",
                "DATA_PLANE",
                "CONTROL_PLANE",
                "MUTATING",
                "READ",
                "SIDE_EFFECT"
            ]
        );
        assert_eq!(ReportKind::Scored.headers().last().unwrap(), "score");
        assert_eq!(ReportKind::Mutating.headers(), ReportKind::All.headers());
    }

    #[test]
    fn full_matrix_has_every_permission() {
        let index = index();
        let report = ReportBuilder::new(&index).full();
        assert_eq!(report.len(), index.len());
        let create = &report.rows.iter().find(|r| r.permission == "CreateBucket").unwrap();
        assert_eq!(
            create.cells(),
            vec!["s3", "CreateBucket", "true", "false", "true", "false", "false"]
        );
    }

    #[test]
    fn mutating_filter_is_or_without_duplicates() {
        let index = index();
        let builder = ReportBuilder::new(&index);
        let report = builder.mutating();
        let names: Vec<&str> = report.rows.iter().map(|r| r.permission.as_str()).collect();
        // StartDeleteJob is both MUTATING and SIDE_EFFECT and appears once.
        assert_eq!(names, vec!["StartInstances", "StartDeleteJob", "CreateBucket"]);

        let full = builder.full();
        assert!(report.rows.iter().all(|r| full.rows.contains(r)));
    }

    #[test]
    fn scored_rows_carry_trailing_score() {
        let index = index();
        let store: CriticalityStore = [("s3".to_string(), CriticalityLevel::Medium)]
            .into_iter()
            .collect();
        let engine = ScoringEngine::new(store);
        let report = ReportBuilder::new(&index).scored(&engine);

        assert_eq!(report.len(), index.len());
        assert_eq!(report.unscored_services.get("ec2"), Some(&3));
        let create = report
            .rows
            .iter()
            .find(|r| r.permission == "CreateBucket")
            .unwrap();
        assert_eq!(create.cells().last().unwrap(), "10");
        let start = report
            .rows
            .iter()
            .find(|r| r.permission == "StartInstances")
            .unwrap();
        assert_eq!(start.score, Some(Score::Unknown));
        assert_eq!(start.cells().len(), report.headers().len());
    }

    #[test]
    fn scored_kind_needs_engine() {
        let index = index();
        assert!(ReportBuilder::new(&index)
            .build(ReportKind::Scored, None)
            .is_none());
    }

    #[test]
    fn rows_serialize_with_tag_keys() {
        let mut row = ReportRow::new(
            "s3",
            "PutObject",
            [Tag::Mutating, Tag::DataPlane].into_iter().collect(),
        );
        row.score = Some(Score::Value(15));
        let value = serde_json::to_value(&row).unwrap();
        assert_eq!(value["permission"], "PutObject");
        assert_eq!(value["MUTATING"], true);
        assert_eq!(value["READ"], false);
        assert_eq!(value["score"], 15);
    }
}
