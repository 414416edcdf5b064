pub mod parsers;

pub use parsers::{get_extension, CoordinateMode, Extension, Parser, ParserProvider};
