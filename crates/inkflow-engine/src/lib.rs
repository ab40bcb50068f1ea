//! inkflow-engine: smart-assist engines for the Inkflow novel editor.
//!
//! This crate provides:
//! - `editing` - position-addressed block document with atomic transactions
//! - `assist::AutocompleteEngine` - live character-name completion at the caret
//! - `assist::ReorderEngine` - pointer-driven drag reordering of top-level blocks
//!
//! Both engines derive their state from the document and mutate it only
//! through whole transactions; rendering and input wiring belong to the shell.

pub mod assist;
pub mod editing;
