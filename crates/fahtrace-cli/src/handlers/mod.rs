pub mod aggregate;
pub mod parse;
pub mod scan;
