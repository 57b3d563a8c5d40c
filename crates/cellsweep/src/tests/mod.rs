//! Tests for the cellsweep command line
//!
//! Tests are organized by topic:
//! - `args` - argument parsing and submission context overrides
//! - `commands` - `plan`, `check` and `directives` against sweep files on disk
//! - `output` - job output formats and shell quoting
//! - `logging` - log file rotation
