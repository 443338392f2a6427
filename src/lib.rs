//! Turns Hearts of Iron IV script files into typed records: technologies,
//! national focuses, bookmarks, technology folders and localisation, with
//! mod files layered over the base game.
//!
//! The pipeline runs raw text through the [parser] into a generic AST,
//! hands that AST to one of the [structures] extractors, and merges the
//! per-file records through [game_data::GameDataLoader]. Parsing is
//! deliberately permissive end to end: the script dialect is loosely
//! specified and externally versioned, so unknown constructs degrade to
//! diagnostics and fail-open defaults instead of failures.

/// A submodule that provides opaque types commonly used in the project.
pub mod types;

/// A submodule that handles script tokenization and parsing.
pub mod parser;

/// A submodule providing the typed domain records and the extractors that
/// build them from a parsed program.
pub mod structures;

/// A submodule that loads and merges mod and game data directories.
pub mod game_data;
