#![deny(missing_docs)]
//! Build AWS access policy language documents and render them as JSON.
//!
//! A [`Policy`] owns an ordered list of [`Statement`]s. Each statement carries a [`Principal`],
//! an [`Effect`], an action, a resource and optional conditions. Values with a fixed set of legal
//! values are checked when they are assigned.

mod error;
mod policy;
mod principal;
mod statement;

pub mod condition;

pub use condition::{ConditionBlock, Operator, OperatorFamily};
pub use error::{AplError, Result};
pub use policy::{Policy, PolicyBuilder, DEFAULT_VERSION};
pub use principal::Principal;
pub use statement::{Effect, Statement, StatementKind};
