pub mod ast;
mod ato_parser;
mod source_provider;

pub use ato_parser::parse_source;
pub use ato_parser::AtoParser;
pub use ato_parser::ParserError;
pub use ato_parser::ParserErrorKind;
pub use source_provider::normalize_path;
pub use source_provider::FileSystem;
pub use source_provider::InMemorySources;
pub use source_provider::SourceProvider;
pub use source_provider::SyntaxCache;
