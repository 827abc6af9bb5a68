//! Todo tracking with a grouped view engine, in-process reminders, and a
//! plain-text ledger of created tasks.

pub mod cli;
pub mod io;
pub mod model;
pub mod ops;
pub mod parse;
pub mod util;
