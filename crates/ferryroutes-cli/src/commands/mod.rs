// CLI subcommand handlers. `main.rs` parses arguments and dispatches here.

pub mod import;
pub mod query;
