//! Knowledge graph core for a Markdown note collection.
//!
//! [`notes`] turns note bodies into links and tags, [`graph`] indexes them
//! into a node/edge graph, and [`sim`] lays that graph out with a
//! force-directed simulation running on its own worker thread.

pub mod graph;
pub mod layout;
pub mod notes;
pub mod sim;
