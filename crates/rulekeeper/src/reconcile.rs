//! Idempotent present/absent reconciliation for rulesets.
//!
//! Given a desired configuration, [`ruleset_present`] and [`ruleset_absent`]
//! compare against live state and decide whether to create, update, delete,
//! or leave the remote ruleset alone. In dry-run mode a pending action is
//! reported instead of performed.
//!
//! Both functions always return a [`StateOutcome`]: query-layer failures are
//! absorbed into `result: Some(false)` with the query error's comment, never
//! propagated. Configuration errors (bad profile, unresolvable scope) happen
//! before a client exists, so they cannot reach this layer.

use serde::{Serialize, Serializer};
use serde_json::Value;

use crate::github::{QueryError, RulesetClient, RulesetParams, RulesetScope};

/// Before/after summary of an applied change.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Changes {
    pub old: Value,
    pub new: Value,
}

/// Outcome of one reconciliation call.
///
/// `result` is `Some(true)` on success (including no-ops), `Some(false)` on
/// failure, and `None` when a dry run found a pending action. `changes` is
/// `None` when nothing was (or would be) modified; it serializes as `{}` to
/// keep the conventional outcome shape.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StateOutcome {
    pub name: String,
    #[serde(serialize_with = "changes_or_empty_map")]
    pub changes: Option<Changes>,
    pub result: Option<bool>,
    pub comment: String,
}

fn changes_or_empty_map<S: Serializer>(
    changes: &Option<Changes>,
    serializer: S,
) -> Result<S::Ok, S::Error> {
    match changes {
        Some(changes) => changes.serialize(serializer),
        None => serde_json::Map::new().serialize(serializer),
    }
}

impl StateOutcome {
    fn no_op(name: &str, comment: impl Into<String>) -> Self {
        Self {
            name: name.to_string(),
            changes: None,
            result: Some(true),
            comment: comment.into(),
        }
    }

    fn pending(name: &str, comment: impl Into<String>) -> Self {
        Self {
            name: name.to_string(),
            changes: None,
            result: None,
            comment: comment.into(),
        }
    }

    fn applied(name: &str, comment: impl Into<String>, old: Value, new: Value) -> Self {
        Self {
            name: name.to_string(),
            changes: Some(Changes { old, new }),
            result: Some(true),
            comment: comment.into(),
        }
    }

    fn failed(name: &str, error: &QueryError) -> Self {
        Self {
            name: name.to_string(),
            changes: None,
            result: Some(false),
            comment: error.to_string(),
        }
    }
}

/// Find the id of the ruleset called `name` in a listing, if any.
fn find_ruleset_id(listed: Option<&[Value]>, name: &str) -> Option<u64> {
    listed?
        .iter()
        .find(|r| r.get("name").and_then(Value::as_str) == Some(name))
        .and_then(|r| r.get("id"))
        .and_then(Value::as_u64)
}

/// Ensure the named ruleset does not exist in scope.
#[tracing::instrument(skip(client, scope), fields(name = %name, dry_run = dry_run))]
pub async fn ruleset_absent(
    client: &RulesetClient,
    scope: &RulesetScope,
    name: &str,
    dry_run: bool,
) -> StateOutcome {
    let listed = match client.list(scope).await {
        Ok(listed) => listed,
        Err(e) => return StateOutcome::failed(name, &e),
    };

    let Some(id) = find_ruleset_id(listed.as_deref(), name) else {
        return StateOutcome::no_op(name, format!("Ruleset {} does not exist", name));
    };

    if dry_run {
        return StateOutcome::pending(name, format!("Ruleset {} will be deleted", name));
    }

    match client.delete(scope, id).await {
        Ok(_) => {
            tracing::debug!(id, "ruleset deleted");
            StateOutcome::applied(
                name,
                format!("Deleted ruleset {}", name),
                Value::String(format!("ruleset {} exists", name)),
                Value::String(format!("ruleset {} deleted", name)),
            )
        }
        Err(e) => StateOutcome::failed(name, &e),
    }
}

/// Ensure the named ruleset exists in scope with the desired fields.
///
/// When the ruleset already exists, only the fields that differ from live
/// state are sent in the update, and the change report covers exactly those
/// fields.
#[tracing::instrument(skip(client, scope, params), fields(name = %name, dry_run = dry_run))]
pub async fn ruleset_present(
    client: &RulesetClient,
    scope: &RulesetScope,
    name: &str,
    params: &RulesetParams,
    dry_run: bool,
) -> StateOutcome {
    let listed = match client.list(scope).await {
        Ok(listed) => listed,
        Err(e) => return StateOutcome::failed(name, &e),
    };

    let Some(id) = find_ruleset_id(listed.as_deref(), name) else {
        if dry_run {
            return StateOutcome::pending(name, "ruleset will be added");
        }

        // GitHub requires the name in the creation payload; fill it in when
        // the caller kept it out of the params.
        let mut payload = params.clone();
        if !payload.0.contains_key("name") {
            payload.0.insert("name".to_string(), Value::String(name.to_string()));
        }

        return match client.add(scope, &payload).await {
            Ok(_) => {
                tracing::debug!("ruleset created");
                StateOutcome::applied(
                    name,
                    "ruleset added",
                    Value::String("No existing ruleset found".to_string()),
                    Value::String("Ruleset created".to_string()),
                )
            }
            Err(e) => StateOutcome::failed(name, &e),
        };
    };

    let live = match client.get(scope, id).await {
        Ok(live) => live,
        Err(e) => return StateOutcome::failed(name, &e),
    };

    let diff = params.diff(&live);
    if diff.is_empty() {
        let mut outcome = StateOutcome::no_op(name, "ruleset present");
        if dry_run {
            outcome.result = None;
        }
        return outcome;
    }

    if dry_run {
        return StateOutcome::pending(name, "ruleset will be updated");
    }

    let update = RulesetParams::from(diff.new.clone());
    match client.update(scope, id, &update).await {
        Ok(_) => {
            tracing::debug!(id, changed = diff.new.len(), "ruleset updated");
            StateOutcome::applied(
                name,
                "ruleset updated",
                Value::Object(diff.old),
                Value::Object(diff.new),
            )
        }
        Err(e) => StateOutcome::failed(name, &e),
    }
}
