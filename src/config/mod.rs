use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::scoring::DEFAULT_MUTATING_BONUS;
use crate::tags::{Tag, TagRuleSet};

/// Default config file name, looked up in the working directory.
pub const CONFIG_FILE_NAME: &str = ".iam-tagger.toml";

/// Top-level configuration from `.iam-tagger.toml`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Path to the permission catalog JSON.
    #[serde(default = "default_catalog")]
    pub catalog: PathBuf,
    #[serde(default)]
    pub scoring: ScoringConfig,
    #[serde(default)]
    pub rules: RulesConfig,
}

fn default_catalog() -> PathBuf {
    PathBuf::from("permissions.json")
}

impl Default for Config {
    fn default() -> Self {
        Self {
            catalog: default_catalog(),
            scoring: ScoringConfig::default(),
            rules: RulesConfig::default(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScoringConfig {
    /// Added to the service baseline for MUTATING permissions.
    #[serde(default = "default_mutating_bonus")]
    pub mutating_bonus: u32,
}

fn default_mutating_bonus() -> u32 {
    DEFAULT_MUTATING_BONUS
}

impl Default for ScoringConfig {
    fn default() -> Self {
        Self {
            mutating_bonus: DEFAULT_MUTATING_BONUS,
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RulesConfig {
    /// Trigger words added to the built-in ones, per tag.
    #[serde(default)]
    pub extra_triggers: BTreeMap<Tag, Vec<String>>,
}

impl Config {
    /// Load config from a TOML file. Returns default if file doesn't exist.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let content = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&content)?;
        Ok(config)
    }

    /// The built-in rule set extended with configured trigger words.
    pub fn rule_set(&self) -> TagRuleSet {
        TagRuleSet::builtin().with_extra(&self.rules.extra_triggers)
    }

    /// Generate a starter config file.
    pub fn starter_toml() -> &'static str {
        r#"# iam-tagger configuration

# Permission catalog: a JSON object of
#   { "<provider>": { "StringPrefix": "s3", "Actions": ["CreateBucket", ...] } }
catalog = "permissions.json"

[scoring]
# Added to the service baseline when a permission is tagged MUTATING.
mutating_bonus = 5

# Extra trigger words per tag (DATA_PLANE, CONTROL_PLANE, MUTATING, READ,
# SIDE_EFFECT), matched against lowercase action words.
# [rules.extra_triggers]
# MUTATING = ["attach", "detach"]
"#
    }
}
