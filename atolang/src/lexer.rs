mod logos_lexer;

use crate::core::{CompilerError, ErrorKind, Location, SourceSpan};
use std::fmt;
use std::path::Path;
use thiserror::Error;

pub use logos_lexer::LogosLexer;

/// Types of lexer errors
#[derive(Copy, Clone, Error, Debug, PartialEq, Eq)]
pub enum LexerErrorKind {
	/// Lexer couldn't match token to any regex
	#[error("Invalid token")]
	InvalidToken,

	/// String literal reaches the end of the line
	#[error("Unterminated string")]
	UnterminatedString,

	/// Dedent to a width that was never indented to
	#[error("Unindent does not match any outer indentation level")]
	InconsistentDedent,
}

impl LexerErrorKind {
	fn hint(&self) -> &'static str {
		match self {
			LexerErrorKind::InvalidToken => "this is neither a keyword, a name, a number nor a string",
			LexerErrorKind::UnterminatedString => "did you forget the closing quote?",
			LexerErrorKind::InconsistentDedent => "indent this line to match one of the enclosing blocks",
		}
	}
}

/// Lexer error
#[derive(Copy, Clone, Error, Debug, PartialEq, Eq)]
pub struct LexerError {
	pub range: SourceSpan,
	pub kind: LexerErrorKind,
}

impl fmt::Display for LexerError {
	fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
		write!(f, "{}", self.kind)
	}
}

impl LexerError {
	pub fn into_compiler_error(self, file: &Path) -> CompilerError {
		CompilerError::located(
			ErrorKind::SyntaxError,
			format!("{}, {}", self.kind, self.kind.hint()),
			Location::new(file, self.range),
		)
	}
}

/// All language keywords
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeywordKind {
	Component,
	From,
	Import,
	Interface,
	Module,
	New,
	Pin,
	Signal,
}

/// All language punctuators
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PunctuatorKind {
	Arrow,     // ->
	Asterisk,  // *
	Colon,     // :
	Comma,     // ,
	Dot,       // .
	Equals,    // =
	Minus,     // -
	Plus,      // +
	Semicolon, // ;
	Tilde,     // ~
}

/// Token type seen by the parser
///
/// Names, numbers and strings carry no payload, their text is sliced
/// from the source using the token range.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenKind {
	Name,
	Number,
	String,
	Bool(bool),
	Keyword(KeywordKind),
	Punctuator(PunctuatorKind),

	/// End of a logical line
	Newline,

	/// Start of an indented block
	Indent,

	/// End of an indented block
	Dedent,
}

impl fmt::Display for TokenKind {
	fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
		use PunctuatorKind::*;
		match self {
			TokenKind::Name => write!(f, "name"),
			TokenKind::Number => write!(f, "number"),
			TokenKind::String => write!(f, "string"),
			TokenKind::Bool(value) => write!(f, "`{}`", value),
			TokenKind::Keyword(kw) => write!(f, "`{}`", format!("{:?}", kw).to_lowercase()),
			TokenKind::Punctuator(p) => write!(
				f,
				"`{}`",
				match p {
					Arrow => "->",
					Asterisk => "*",
					Colon => ":",
					Comma => ",",
					Dot => ".",
					Equals => "=",
					Minus => "-",
					Plus => "+",
					Semicolon => ";",
					Tilde => "~",
				}
			),
			TokenKind::Newline => write!(f, "end of line"),
			TokenKind::Indent => write!(f, "indent"),
			TokenKind::Dedent => write!(f, "dedent"),
		}
	}
}

/// Token as produced by the lexer (token kind + source location)
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct Token {
	/// Type of the token
	pub kind: TokenKind,

	/// Source code location
	pub range: SourceSpan,
}

/// Abstract lexer
pub trait Lexer<'source> {
	/// Creates a lexer for provided source code
	fn new(source: &'source str) -> Self;

	/// Processes the text and returns a vector of tokens
	fn process(&mut self) -> Result<Vec<Token>, LexerError>;
}
