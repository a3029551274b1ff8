//! Parent-child context propagation
//!
//! Child resources are nested under a parent resource (enrollments under a
//! course). Each parent record yields one [`Context`], which scopes exactly
//! one child request sequence.
//!
//! # Overview
//!
//! - [`Context`] - ephemeral key-value mapping handed to a child stream
//! - [`ParentLink`] - static description of a child's parent
//! - [`ParentRouter`] - derives contexts from parent records

mod routers;
mod types;

pub use routers::ParentRouter;
pub use types::{Context, ParentLink};
