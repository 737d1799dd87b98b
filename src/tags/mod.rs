//! Semantic tags for permissions and the trigger-word rules that assign them.

pub mod classifier;
pub mod tokenizer;

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

pub use classifier::{classify, Permission, PermissionIndex};
pub use tokenizer::tokenize;

/// A semantic label for a permission. Tags are not mutually exclusive.
///
/// The declaration order is the report column order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Tag {
    DataPlane,
    ControlPlane,
    Mutating,
    Read,
    SideEffect,
}

impl Tag {
    /// Every tag, in column order.
    pub const ALL: [Tag; 5] = [
        Tag::DataPlane,
        Tag::ControlPlane,
        Tag::Mutating,
        Tag::Read,
        Tag::SideEffect,
    ];

    pub const COUNT: usize = Self::ALL.len();

    fn bit(self) -> u8 {
        1 << (self as u8)
    }
}

impl std::fmt::Display for Tag {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::DataPlane => write!(f, "DATA_PLANE"),
            Self::ControlPlane => write!(f, "CONTROL_PLANE"),
            Self::Mutating => write!(f, "MUTATING"),
            Self::Read => write!(f, "READ"),
            Self::SideEffect => write!(f, "SIDE_EFFECT"),
        }
    }
}

/// Set of tags held by one permission, stored as a bit-set over [`Tag`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct TagSet(u8);

impl TagSet {
    pub fn new() -> Self {
        Self(0)
    }

    pub fn insert(&mut self, tag: Tag) {
        self.0 |= tag.bit();
    }

    pub fn contains(&self, tag: Tag) -> bool {
        self.0 & tag.bit() != 0
    }

    pub fn is_empty(&self) -> bool {
        self.0 == 0
    }

    pub fn len(&self) -> usize {
        self.0.count_ones() as usize
    }

    pub fn union(self, other: TagSet) -> TagSet {
        TagSet(self.0 | other.0)
    }

    /// True if any tag of `other` is also in `self`.
    pub fn intersects(&self, other: TagSet) -> bool {
        self.0 & other.0 != 0
    }

    /// Tags in column order.
    pub fn iter(&self) -> impl Iterator<Item = Tag> + '_ {
        Tag::ALL.into_iter().filter(move |t| self.contains(*t))
    }

    /// One membership flag per tag, in column order.
    pub fn indicators(&self) -> [bool; Tag::COUNT] {
        Tag::ALL.map(|t| self.contains(t))
    }
}

impl FromIterator<Tag> for TagSet {
    fn from_iter<I: IntoIterator<Item = Tag>>(iter: I) -> Self {
        let mut set = TagSet::new();
        for tag in iter {
            set.insert(tag);
        }
        set
    }
}

const DATA_PLANE_TRIGGERS: &[&str] = &["object", "objects", "bucket", "buckets"];

const CONTROL_PLANE_TRIGGERS: &[&str] = &[
    "policy",
    "policies",
    "attribute",
    "attributes",
    "permission",
    "permissions",
];

const MUTATING_TRIGGERS: &[&str] = &[
    "create", "delete", "modify", "add", "remove", "set", "update", "put",
];

const READ_TRIGGERS: &[&str] = &["get", "view", "list", "describe"];

const SIDE_EFFECT_TRIGGERS: &[&str] = &[
    "start", "stop", "export", "request", "resend", "cancel", "continue", "estimate", "execute",
    "preview",
];

/// Mapping from tag to the lowercase words that trigger it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TagRuleSet {
    triggers: BTreeMap<Tag, Vec<String>>,
}

impl TagRuleSet {
    /// The built-in trigger words.
    pub fn builtin() -> Self {
        let table: [(Tag, &[&str]); Tag::COUNT] = [
            (Tag::DataPlane, DATA_PLANE_TRIGGERS),
            (Tag::ControlPlane, CONTROL_PLANE_TRIGGERS),
            (Tag::Mutating, MUTATING_TRIGGERS),
            (Tag::Read, READ_TRIGGERS),
            (Tag::SideEffect, SIDE_EFFECT_TRIGGERS),
        ];
        let triggers = table
            .into_iter()
            .map(|(tag, words)| (tag, words.iter().map(|w| w.to_string()).collect()))
            .collect();
        Self { triggers }
    }

    /// Built-in rules plus extra trigger words, e.g. from config.
    ///
    /// Extra words are lowercased; words already present are not repeated.
    pub fn with_extra(mut self, extra: &BTreeMap<Tag, Vec<String>>) -> Self {
        for (tag, words) in extra {
            let entry = self.triggers.entry(*tag).or_default();
            for word in words {
                let word = word.trim().to_lowercase();
                if !word.is_empty() && !entry.contains(&word) {
                    entry.push(word);
                }
            }
        }
        self
    }

    /// Trigger words for one tag, in declaration order.
    pub fn triggers(&self, tag: Tag) -> &[String] {
        self.triggers.get(&tag).map(Vec::as_slice).unwrap_or(&[])
    }

    /// All (tag, trigger words) pairs in column order.
    pub fn iter(&self) -> impl Iterator<Item = (Tag, &[String])> {
        Tag::ALL.into_iter().map(move |t| (t, self.triggers(t)))
    }
}

impl Default for TagRuleSet {
    fn default() -> Self {
        Self::builtin()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tag_set_is_idempotent() {
        let mut set = TagSet::new();
        set.insert(Tag::Mutating);
        set.insert(Tag::Mutating);
        assert_eq!(set.len(), 1);
        assert!(set.contains(Tag::Mutating));
        assert!(!set.contains(Tag::Read));
    }

    #[test]
    fn indicators_follow_column_order() {
        let set: TagSet = [Tag::SideEffect, Tag::DataPlane].into_iter().collect();
        assert_eq!(set.indicators(), [true, false, false, false, true]);
        assert_eq!(
            set.iter().collect::<Vec<_>>(),
            vec![Tag::DataPlane, Tag::SideEffect]
        );
    }

    #[test]
    fn intersects_any_shared_tag() {
        let risky: TagSet = [Tag::Mutating, Tag::SideEffect].into_iter().collect();
        let read: TagSet = [Tag::Read].into_iter().collect();
        let start: TagSet = [Tag::SideEffect, Tag::Read].into_iter().collect();
        assert!(!read.intersects(risky));
        assert!(start.intersects(risky));
    }

    #[test]
    fn tag_names_render_screaming_snake() {
        let names: Vec<String> = Tag::ALL.iter().map(|t| t.to_string()).collect();
        assert_eq!(
            names,
            ["DATA_PLANE", "CONTROL_PLANE", "MUTATING", "READ", "SIDE_EFFECT"]
        );
        assert_eq!(
            serde_json::to_string(&Tag::SideEffect).unwrap(),
            "\"SIDE_EFFECT\""
        );
    }

    #[test]
    fn extra_triggers_merge_without_duplicates() {
        let mut extra = BTreeMap::new();
        extra.insert(Tag::Mutating, vec!["Attach".to_string(), "put".to_string()]);
        let rules = TagRuleSet::builtin().with_extra(&extra);
        let mutating = rules.triggers(Tag::Mutating);
        assert_eq!(mutating.iter().filter(|w| *w == "put").count(), 1);
        assert_eq!(mutating.last().map(String::as_str), Some("attach"));
    }
}
