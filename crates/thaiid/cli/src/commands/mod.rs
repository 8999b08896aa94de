//! Subcommand implementations

mod latest;
mod list;
mod read;
mod run;

pub(crate) use latest::latest;
pub(crate) use list::list;
pub(crate) use read::read;
pub(crate) use run::run;
