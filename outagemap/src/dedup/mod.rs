//! Report deduplication
//!
//! A picked point is classified against the current snapshot by
//! [`classify`], applied through the store by a [`Resolver`], and the
//! surrounding "pick location" mode is tracked by a [`SelectionSession`].

pub mod engine;
pub mod resolver;
pub mod session;

pub use engine::{Colocated, DedupAction, classify, colocated_reports};
pub use resolver::{Resolver, Selection, SelectionError, SelectionOutcome};
pub use session::SelectionSession;
