//! The v7 daemon dialect (`hh:mm:ss:WUnn:FSnn:` prefixed lines).

mod classify;
mod parse;

pub(crate) use classify::classify;
pub(crate) use parse::parse;
