// Clippy allows for reasonable defaults
// These suppress warnings where the suggested change doesn't improve readability
#![allow(clippy::new_without_default)] // Default not always appropriate for stateful types
#![allow(clippy::derivable_impls)] // Explicit Default impls can be clearer
#![allow(clippy::needless_borrow)] // Explicit borrows can clarify ownership
#![allow(clippy::clone_on_copy)] // .clone() can be clearer than implicit copy
#![allow(clippy::collapsible_if)] // Separate ifs can be more readable
#![allow(clippy::redundant_closure)] // |x| f(x) can be clearer than f
#![allow(clippy::manual_strip)] // Manual prefix stripping can be clearer

// Module declarations
pub mod config;
pub mod events;
pub mod file_storage;
pub mod formatter;
pub mod models;
pub mod parsers;
pub mod refinement;
pub mod service;
pub mod session;
pub mod structure;
pub mod utils;
pub mod workflow;

// Re-export models for use by the binary and integration tests
pub use models::*;
pub use refinement::RefinementEngine;
pub use session::Session;
pub use structure::StructureEditor;
pub use workflow::GenerationWorkflow;
