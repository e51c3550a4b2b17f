//! CLI commands module.

mod check;
mod run;

pub use check::CheckCommand;
pub use run::RunCommand;
