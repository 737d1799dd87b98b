use super::{tokenize, Tag, TagRuleSet, TagSet};
use crate::catalog::Catalog;

/// Compute the tags for one action.
///
/// A tag applies when one of its trigger words is a whole word of the
/// tokenized action. When tokenization finds no words at all, the raw
/// action is matched by lowercase prefix instead.
pub fn classify(action: &str, rules: &TagRuleSet) -> TagSet {
    let words = tokenize(action);
    let mut tags = TagSet::new();

    if words.is_empty() {
        let lowered = action.to_lowercase();
        for (tag, triggers) in rules.iter() {
            if triggers.iter().any(|t| lowered.starts_with(t.as_str())) {
                tags.insert(tag);
            }
        }
        return tags;
    }

    for (tag, triggers) in rules.iter() {
        if triggers.iter().any(|t| words.contains(t)) {
            tags.insert(tag);
        }
    }
    tags
}

/// A (service, action) pair with its computed tags.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Permission {
    pub service: String,
    pub action: String,
    pub tags: TagSet,
}

impl Permission {
    pub fn has(&self, tag: Tag) -> bool {
        self.tags.contains(tag)
    }
}

/// Every permission in a catalog, classified once.
///
/// Built explicitly from a catalog and a rule set; read-only afterwards.
#[derive(Debug, Clone, Default)]
pub struct PermissionIndex {
    permissions: Vec<Permission>,
    services: Vec<String>,
}

impl PermissionIndex {
    pub fn build(catalog: &Catalog, rules: &TagRuleSet) -> Self {
        let mut permissions = Vec::with_capacity(catalog.permission_count());
        let mut services = Vec::with_capacity(catalog.service_count());

        for (service, actions) in catalog.services() {
            services.push(service.to_string());
            for action in actions {
                permissions.push(Permission {
                    service: service.to_string(),
                    action: action.clone(),
                    tags: classify(action, rules),
                });
            }
        }

        let untagged = permissions.iter().filter(|p| p.tags.is_empty()).count();
        tracing::debug!(
            services = services.len(),
            permissions = permissions.len(),
            untagged,
            "permission index built"
        );

        Self {
            permissions,
            services,
        }
    }

    /// Permissions grouped by service (service-name order), actions in
    /// catalog order.
    pub fn permissions(&self) -> &[Permission] {
        &self.permissions
    }

    /// Sorted service names, including services without actions.
    pub fn services(&self) -> &[String] {
        &self.services
    }

    pub fn get(&self, service: &str, action: &str) -> Option<&Permission> {
        self.permissions
            .iter()
            .find(|p| p.service == service && p.action == action)
    }

    pub fn len(&self) -> usize {
        self.permissions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.permissions.is_empty()
    }
}
