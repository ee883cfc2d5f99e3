//! Ruleset targeting and payload types.
//!
//! [`TargetArgs`] merges explicit call arguments with profile defaults into a
//! fully resolved [`RulesetScope`], which in turn builds the REST route for a
//! ruleset resource. [`RulesetParams`] is the flat field mapping GitHub
//! accepts for ruleset creation and update.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::config::{ConfigError, Profile};

/// Whether a ruleset lives on a repository or an organization.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RulesetType {
    Repo,
    Org,
}

/// Explicit targeting arguments for a ruleset operation.
///
/// Any field left `None` falls back to the profile: the owner falls back to
/// the profile's `org_name`, the repository to its `repo_name`, and the
/// organization to its `org_name`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TargetArgs {
    pub owner: Option<String>,
    pub repo_name: Option<String>,
    pub org_name: Option<String>,
}

impl TargetArgs {
    /// Target a repository explicitly.
    pub fn repo(owner: impl Into<String>, repo_name: impl Into<String>) -> Self {
        Self {
            owner: Some(owner.into()),
            repo_name: Some(repo_name.into()),
            ..Self::default()
        }
    }

    /// Target an organization explicitly.
    pub fn org(org_name: impl Into<String>) -> Self {
        Self {
            org_name: Some(org_name.into()),
            ..Self::default()
        }
    }

    /// Resolve these arguments against a profile into a concrete scope.
    ///
    /// Fails with [`ConfigError::UnresolvedScope`] when neither the arguments
    /// nor the profile supply enough to address the requested scope.
    pub fn resolve(
        &self,
        ruleset_type: RulesetType,
        profile: &Profile,
    ) -> Result<RulesetScope, ConfigError> {
        match ruleset_type {
            RulesetType::Repo => {
                let owner = self.owner.clone().or_else(|| profile.org_name.clone());
                let repo = self.repo_name.clone().or_else(|| profile.repo_name.clone());
                match (owner, repo) {
                    (Some(owner), Some(repo)) => Ok(RulesetScope::Repo { owner, repo }),
                    _ => Err(ConfigError::UnresolvedScope),
                }
            }
            RulesetType::Org => {
                let org = self.org_name.clone().or_else(|| profile.org_name.clone());
                match org {
                    Some(org) => Ok(RulesetScope::Org { org }),
                    None => Err(ConfigError::UnresolvedScope),
                }
            }
        }
    }
}

/// A fully resolved ruleset target.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RulesetScope {
    /// A repository-level ruleset, addressed by owner and repository name.
    Repo { owner: String, repo: String },
    /// An organization-level ruleset.
    Org { org: String },
}

impl RulesetScope {
    /// Build the REST route for this scope's ruleset collection, or for a
    /// single ruleset when `id` is given.
    #[must_use]
    pub fn route(&self, id: Option<u64>) -> String {
        let base = match self {
            RulesetScope::Repo { owner, repo } => format!("repos/{}/{}/rulesets", owner, repo),
            RulesetScope::Org { org } => format!("orgs/{}/rulesets", org),
        };
        match id {
            Some(id) => format!("{}/{}", base, id),
            None => base,
        }
    }
}

/// Flat mapping of GitHub ruleset fields (name, target, enforcement, rules,
/// conditions, ...).
///
/// Values pass through to the API untouched; GitHub enforces any nested
/// invariants server-side.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RulesetParams(pub Map<String, Value>);

impl RulesetParams {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style field insertion.
    #[must_use]
    pub fn with(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.0.insert(key.into(), value.into());
        self
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Compare desired fields against a live ruleset object.
    ///
    /// Returns the differing keys only: `old` holds the live values (`null`
    /// when the key is absent remotely), `new` holds the desired values.
    #[must_use]
    pub fn diff(&self, live: &Value) -> ParamDiff {
        let mut old = Map::new();
        let mut new = Map::new();

        for (key, desired) in &self.0 {
            let current = live.get(key);
            if current != Some(desired) {
                old.insert(key.clone(), current.cloned().unwrap_or(Value::Null));
                new.insert(key.clone(), desired.clone());
            }
        }

        ParamDiff { old, new }
    }
}

impl From<Map<String, Value>> for RulesetParams {
    fn from(map: Map<String, Value>) -> Self {
        Self(map)
    }
}

/// The differing keys between desired params and a live ruleset.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ParamDiff {
    /// Live values for the keys that differ.
    pub old: Map<String, Value>,
    /// Desired values for the keys that differ.
    pub new: Map<String, Value>,
}

impl ParamDiff {
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.new.is_empty()
    }
}
