//! GitHub ruleset API layer.
//!
//! # Module Structure
//!
//! - [`error`] - Query-layer error types
//! - [`types`] - Targeting (scope/route) and payload types
//! - [`client`] - The ruleset CRUD client
//! - [`users`] - Public-key lookup helper
//!
//! # Example
//!
//! ```ignore
//! use rulekeeper::github::{RulesetClient, RulesetType, TargetArgs};
//!
//! let scope = TargetArgs::repo("acme", "widgets").resolve(RulesetType::Repo, &profile)?;
//! let client = RulesetClient::for_profile(&profile, transport);
//! let rulesets = client.list(&scope).await?;
//! ```

mod client;
mod error;
mod types;
mod users;

pub use client::{API_ROOT, Deleted, RulesetClient};
pub use error::QueryError;
pub use types::{ParamDiff, RulesetParams, RulesetScope, RulesetType, TargetArgs};
pub use users::{UserKeys, user_pubkeys};
