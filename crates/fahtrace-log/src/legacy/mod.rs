//! The v5/v6 console client dialect (`[hh:mm:ss]` bracket lines).

mod classify;
mod parse;

pub(crate) use classify::classify;
pub(crate) use parse::parse;
