use super::ast::*;
use crate::core::{CompilerError, ErrorKind, Location, Reference, Segment, SourceSpan, Value};
use crate::lexer::{KeywordKind, Lexer, LexerErrorKind, LogosLexer, PunctuatorKind, Token, TokenKind};
use log::debug;
use std::path::Path;
use std::rc::Rc;
use thiserror::Error;

#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum ParserErrorKind {
	#[error("{0}")]
	Lexer(LexerErrorKind),

	#[error("Expected {expected}, found {found}")]
	UnexpectedToken { expected: String, found: TokenKind },

	#[error("Expected {expected}, found end of file")]
	UnexpectedEof { expected: String },

	#[error("Invalid numeric reference `{0}`")]
	InvalidReference(String),

	#[error("Invalid number `{0}`")]
	InvalidNumber(String),
}

#[derive(Clone, Debug, Error, PartialEq, Eq)]
#[error("{kind}")]
pub struct ParserError {
	pub kind: ParserErrorKind,
	pub range: SourceSpan,
}

impl ParserError {
	pub fn into_compiler_error(self, file: &Path) -> CompilerError {
		CompilerError::located(ErrorKind::SyntaxError, self.kind.to_string(), Location::new(file, self.range))
	}
}

type ParseResult<T> = Result<T, ParserError>;

/// Lexes and parses one source file
pub fn parse_source(source: &str) -> ParseResult<FileInput> {
	let tokens = LogosLexer::new(source).process().map_err(|err| ParserError {
		kind: ParserErrorKind::Lexer(err.kind),
		range: err.range,
	})?;
	debug!("Lexed {} tokens", tokens.len());
	AtoParser::new(source, tokens).parse_file()
}

/// Recursive descent parser over the token stream
///
/// Statements end with a newline or `;`. Block bodies are either
/// an indented suite or simple statements on the header line.
pub struct AtoParser<'source> {
	source: &'source str,
	tokens: Vec<Token>,
	pos: usize,
	last_end: usize,
}

impl<'source> AtoParser<'source> {
	pub fn new(source: &'source str, tokens: Vec<Token>) -> Self {
		Self {
			source,
			tokens,
			pos: 0,
			last_end: 0,
		}
	}

	pub fn parse_file(mut self) -> ParseResult<FileInput> {
		let mut statements = Vec::new();
		while let Some(token) = self.peek() {
			match token.kind {
				TokenKind::Newline => {
					self.bump();
				},
				_ => statements.extend(self.statement()?),
			}
		}
		Ok(FileInput {
			statements,
			location: SourceSpan::new_between(0, self.source.len()),
		})
	}

	fn peek(&self) -> Option<Token> {
		self.tokens.get(self.pos).copied()
	}

	fn peek_kind(&self) -> Option<TokenKind> {
		self.peek().map(|token| token.kind)
	}

	fn bump(&mut self) -> Option<Token> {
		let token = self.peek()?;
		self.pos += 1;
		self.last_end = token.range.end();
		Some(token)
	}

	fn text(&self, token: &Token) -> &'source str {
		&self.source[token.range.start()..token.range.end()]
	}

	fn unexpected(&self, expected: &str) -> ParserError {
		match self.peek() {
			Some(token) => ParserError {
				kind: ParserErrorKind::UnexpectedToken {
					expected: String::from(expected),
					found: token.kind,
				},
				range: token.range,
			},
			None => ParserError {
				kind: ParserErrorKind::UnexpectedEof {
					expected: String::from(expected),
				},
				range: SourceSpan::new(self.source.len(), 0),
			},
		}
	}

	fn expect(&mut self, kind: TokenKind, expected: &str) -> ParseResult<Token> {
		match self.peek() {
			Some(token) if token.kind == kind => {
				self.bump();
				Ok(token)
			},
			_ => Err(self.unexpected(expected)),
		}
	}

	fn eat(&mut self, kind: TokenKind) -> bool {
		if self.peek_kind() == Some(kind) {
			self.bump();
			true
		} else {
			false
		}
	}

	fn span_from(&self, start: usize) -> SourceSpan {
		SourceSpan::new_between(start, self.last_end)
	}

	/// A block definition or a line of simple statements
	fn statement(&mut self) -> ParseResult<Vec<Statement>> {
		match self.peek_kind() {
			Some(TokenKind::Keyword(KeywordKind::Module))
			| Some(TokenKind::Keyword(KeywordKind::Component))
			| Some(TokenKind::Keyword(KeywordKind::Interface)) => {
				Ok(vec![Statement::BlockDefinition(Rc::new(self.block_definition()?))])
			},
			Some(TokenKind::Indent) => Err(self.unexpected("a statement")),
			_ => self.simple_statements(),
		}
	}

	fn simple_statements(&mut self) -> ParseResult<Vec<Statement>> {
		let semicolon = TokenKind::Punctuator(PunctuatorKind::Semicolon);
		let mut statements = vec![self.simple_statement()?];
		while self.eat(semicolon) {
			if self.peek_kind() == Some(TokenKind::Newline) {
				break;
			}
			statements.push(self.simple_statement()?);
		}
		self.expect(TokenKind::Newline, "end of line")?;
		Ok(statements)
	}

	fn block_definition(&mut self) -> ParseResult<BlockDefinition> {
		let start = self.bump().ok_or_else(|| self.unexpected("a block definition"))?;
		let kind = match start.kind {
			TokenKind::Keyword(KeywordKind::Component) => BlockKind::Component,
			TokenKind::Keyword(KeywordKind::Interface) => BlockKind::Interface,
			_ => BlockKind::Module,
		};
		let name_token = self.expect(TokenKind::Name, "a block name")?;
		let name = String::from(self.text(&name_token));

		let super_ref = if self.eat(TokenKind::Keyword(KeywordKind::From)) {
			Some(self.name_reference()?)
		}
		else {
			None
		};

		self.expect(TokenKind::Punctuator(PunctuatorKind::Colon), "`:`")?;

		let body = if self.eat(TokenKind::Newline) {
			self.expect(TokenKind::Indent, "an indented block")?;
			let mut body = Vec::new();
			while !self.eat(TokenKind::Dedent) {
				if self.peek().is_none() {
					return Err(self.unexpected("end of block"));
				}
				body.extend(self.statement()?);
			}
			body
		}
		else {
			self.simple_statements()?
		};

		Ok(BlockDefinition {
			kind,
			name,
			super_ref,
			body,
			location: self.span_from(start.range.start()),
		})
	}

	fn simple_statement(&mut self) -> ParseResult<Statement> {
		let start = match self.peek() {
			Some(token) => token.range.start(),
			None => return Err(self.unexpected("a statement")),
		};

		match self.peek_kind() {
			Some(TokenKind::Keyword(KeywordKind::Import)) => self.import_statement().map(Statement::Import),
			Some(TokenKind::Keyword(KeywordKind::From)) => self.from_import_statement().map(Statement::Import),
			Some(TokenKind::Keyword(KeywordKind::Pin)) | Some(TokenKind::Keyword(KeywordKind::Signal)) => {
				let declaration = self.connectable()?;
				if self.peek_kind() == Some(TokenKind::Punctuator(PunctuatorKind::Tilde)) {
					return self.connect_statement(start, declaration);
				}
				Ok(match declaration {
					Connectable::Pin(pin) => Statement::PinDefinition(pin),
					Connectable::Signal(signal) => Statement::SignalDefinition(signal),
					Connectable::Reference(_) => unreachable!("declarations start with a keyword"),
				})
			},
			Some(TokenKind::Name) | Some(TokenKind::Number) => {
				let target = self.name_reference()?;
				match self.peek_kind() {
					Some(TokenKind::Punctuator(PunctuatorKind::Arrow)) => {
						self.bump();
						let new_type = self.name_reference()?;
						Ok(Statement::Retype(RetypeStatement {
							target,
							new_type,
							location: self.span_from(start),
						}))
					},
					Some(TokenKind::Punctuator(PunctuatorKind::Equals)) => {
						self.bump();
						let value = self.assignable()?;
						Ok(Statement::Assignment(AssignmentStatement {
							target,
							value,
							location: self.span_from(start),
						}))
					},
					Some(TokenKind::Punctuator(PunctuatorKind::Tilde)) => {
						self.connect_statement(start, Connectable::Reference(target))
					},
					_ => Err(self.unexpected("`->`, `=` or `~`")),
				}
			},
			_ => Err(self.unexpected("a statement")),
		}
	}

	fn import_statement(&mut self) -> ParseResult<ImportStatement> {
		let start = self.expect(TokenKind::Keyword(KeywordKind::Import), "`import`")?;
		let names = if self.eat(TokenKind::Punctuator(PunctuatorKind::Asterisk)) {
			ImportedNames::All
		}
		else {
			ImportedNames::Specific {
				names: self.name_reference_list()?,
			}
		};
		self.expect(TokenKind::Keyword(KeywordKind::From), "`from`")?;
		let from_path = self.string()?;
		Ok(ImportStatement {
			names,
			from_path,
			location: self.span_from(start.range.start()),
		})
	}

	fn from_import_statement(&mut self) -> ParseResult<ImportStatement> {
		let start = self.expect(TokenKind::Keyword(KeywordKind::From), "`from`")?;
		let from_path = self.string()?;
		self.expect(TokenKind::Keyword(KeywordKind::Import), "`import`")?;
		let names = if self.eat(TokenKind::Punctuator(PunctuatorKind::Asterisk)) {
			ImportedNames::All
		}
		else {
			ImportedNames::Specific {
				names: self.name_reference_list()?,
			}
		};
		Ok(ImportStatement {
			names,
			from_path,
			location: self.span_from(start.range.start()),
		})
	}

	fn name_reference_list(&mut self) -> ParseResult<Vec<NameReference>> {
		let mut names = vec![self.name_reference()?];
		while self.eat(TokenKind::Punctuator(PunctuatorKind::Comma)) {
			names.push(self.name_reference()?);
		}
		Ok(names)
	}

	fn connect_statement(&mut self, start: usize, source: Connectable) -> ParseResult<Statement> {
		self.expect(TokenKind::Punctuator(PunctuatorKind::Tilde), "`~`")?;
		let target = self.connectable()?;
		Ok(Statement::Connect(ConnectStatement {
			source,
			target,
			location: self.span_from(start),
		}))
	}

	fn connectable(&mut self) -> ParseResult<Connectable> {
		match self.peek_kind() {
			Some(TokenKind::Keyword(KeywordKind::Pin)) => {
				let start = self.bump().map(|t| t.range.start()).unwrap_or_default();
				let name = match self.peek() {
					Some(token) if token.kind == TokenKind::Name => PinName::Name(String::from(self.text(&token))),
					Some(token) if token.kind == TokenKind::Number => PinName::Number(String::from(self.text(&token))),
					_ => return Err(self.unexpected("a pin name or number")),
				};
				self.bump();
				Ok(Connectable::Pin(PinDefinition {
					name,
					location: self.span_from(start),
				}))
			},
			Some(TokenKind::Keyword(KeywordKind::Signal)) => {
				let start = self.bump().map(|t| t.range.start()).unwrap_or_default();
				let name_token = self.expect(TokenKind::Name, "a signal name")?;
				Ok(Connectable::Signal(SignalDefinition {
					name: String::from(self.text(&name_token)),
					location: self.span_from(start),
				}))
			},
			_ => self.name_reference().map(Connectable::Reference),
		}
	}

	fn assignable(&mut self) -> ParseResult<Assignable> {
		let start = match self.peek() {
			Some(token) => token.range.start(),
			None => return Err(self.unexpected("a value")),
		};
		match self.peek_kind() {
			Some(TokenKind::Keyword(KeywordKind::New)) => {
				self.bump();
				let class = self.name_reference()?;
				Ok(Assignable::New {
					class,
					location: self.span_from(start),
				})
			},
			Some(TokenKind::String) => {
				let value = Value::String(self.string()?);
				Ok(Assignable::Literal {
					value,
					location: self.span_from(start),
				})
			},
			Some(TokenKind::Bool(value)) => {
				self.bump();
				Ok(Assignable::Literal {
					value: Value::Bool(value),
					location: self.span_from(start),
				})
			},
			Some(TokenKind::Punctuator(PunctuatorKind::Minus))
			| Some(TokenKind::Punctuator(PunctuatorKind::Plus))
			| Some(TokenKind::Number) => {
				let value = self.number()?;
				Ok(Assignable::Literal {
					value,
					location: self.span_from(start),
				})
			},
			Some(TokenKind::Name) => self.name_reference().map(Assignable::Reference),
			_ => Err(self.unexpected("a value")),
		}
	}

	fn number(&mut self) -> ParseResult<Value> {
		let negative = match self.peek_kind() {
			Some(TokenKind::Punctuator(PunctuatorKind::Minus)) => {
				self.bump();
				true
			},
			Some(TokenKind::Punctuator(PunctuatorKind::Plus)) => {
				self.bump();
				false
			},
			_ => false,
		};
		let token = self.expect(TokenKind::Number, "a number")?;
		let text = self.text(&token);
		let signed = if negative { format!("-{}", text) } else { String::from(text) };

		let invalid = || ParserError {
			kind: ParserErrorKind::InvalidNumber(String::from(text)),
			range: token.range,
		};
		if text.contains(['.', 'e', 'E']) {
			let value = signed.parse::<f64>().map_err(|_| invalid())?;
			// integral values are kept as integers, `1.0` and `1e3` included
			if value.fract() == 0.0 && value.abs() < i64::MAX as f64 {
				Ok(Value::Int(value as i64))
			}
			else {
				Ok(Value::Float(value))
			}
		}
		else {
			signed.parse::<i64>().map(Value::Int).map_err(|_| invalid())
		}
	}

	fn string(&mut self) -> ParseResult<String> {
		let token = self.expect(TokenKind::String, "a string")?;
		Ok(unescape(self.text(&token)))
	}

	/// Dotted reference, numeric segments included (`r1.1`)
	fn name_reference(&mut self) -> ParseResult<NameReference> {
		let start = match self.peek() {
			Some(token) => token.range.start(),
			None => return Err(self.unexpected("a name")),
		};

		let mut segments = Vec::new();
		loop {
			match self.peek() {
				Some(token) if token.kind == TokenKind::Name => {
					self.bump();
					segments.push(Segment::Name(String::from(self.text(&token))));
				},
				Some(token) if token.kind == TokenKind::Number => {
					self.bump();
					// `1.2` is lexed as a single number
					let text = self.text(&token);
					for part in text.split('.') {
						let index = part.parse::<u64>().map_err(|_| ParserError {
							kind: ParserErrorKind::InvalidReference(String::from(text)),
							range: token.range,
						})?;
						segments.push(Segment::Index(index));
					}
				},
				_ => return Err(self.unexpected("a name")),
			}
			if !self.eat(TokenKind::Punctuator(PunctuatorKind::Dot)) {
				break;
			}
		}

		let reference = Reference::new(segments).map_err(|_| self.unexpected("a name"))?;
		Ok(NameReference {
			reference,
			location: self.span_from(start),
		})
	}
}

/// Strips the quotes and resolves common escapes
fn unescape(quoted: &str) -> String {
	let inner = &quoted[1..quoted.len() - 1];
	let mut result = String::with_capacity(inner.len());
	let mut chars = inner.chars();
	while let Some(c) = chars.next() {
		if c != '\\' {
			result.push(c);
			continue;
		}
		match chars.next() {
			Some('n') => result.push('\n'),
			Some('t') => result.push('\t'),
			Some(other @ ('\\' | '"' | '\'')) => result.push(other),
			Some(other) => {
				result.push('\\');
				result.push(other);
			},
			None => result.push('\\'),
		}
	}
	result
}
