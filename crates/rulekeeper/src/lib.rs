//! Rulekeeper - GitHub repository ruleset management.
//!
//! This library provides a thin CRUD client for GitHub's repository and
//! organization ruleset endpoints, plus an idempotent present/absent
//! reconciler with dry-run support. Connection settings come from named
//! profiles; HTTP goes through a swappable transport so the whole stack is
//! testable without a network.
//!
//! # Example
//!
//! ```ignore
//! use std::sync::Arc;
//! use rulekeeper::{
//!     reconcile, ReqwestTransport, RulesetClient, RulesetParams, RulesetType, Settings,
//!     TargetArgs,
//! };
//!
//! let settings = Settings::load()?;
//! let profile = settings.profile("main")?;
//! let scope = TargetArgs::default().resolve(RulesetType::Repo, profile)?;
//!
//! let transport = Arc::new(ReqwestTransport::default());
//! let client = RulesetClient::for_profile(profile, transport);
//!
//! let params = RulesetParams::new()
//!     .with("target", "branch")
//!     .with("enforcement", "active");
//! let outcome = reconcile::ruleset_present(&client, &scope, "protect-main", &params, false).await;
//! assert_eq!(outcome.result, Some(true));
//! ```

pub mod config;
pub mod github;
pub mod http;
pub mod reconcile;

pub use config::{ConfigError, Profile, Settings};
pub use github::{
    Deleted, QueryError, RulesetClient, RulesetParams, RulesetScope, RulesetType, TargetArgs,
    UserKeys, user_pubkeys,
};
pub use http::{HttpError, HttpTransport, ReqwestTransport};
pub use reconcile::{Changes, StateOutcome, ruleset_absent, ruleset_present};
