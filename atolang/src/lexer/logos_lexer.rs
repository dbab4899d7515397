use super::{KeywordKind, Lexer, LexerError, LexerErrorKind, PunctuatorKind, SourceSpan, Token, TokenKind};
use logos::Logos;

const TAB_WIDTH: usize = 8;

/// Measures the indentation following a line break
fn measure_indent(lex: &mut logos::Lexer<RawToken>) -> usize {
	lex.slice()
		.chars()
		.skip_while(|c| *c != '\n')
		.skip(1)
		.fold(0, |col, c| match c {
			'\t' => (col / TAB_WIDTH + 1) * TAB_WIDTH,
			_ => col + 1,
		})
}

#[derive(Logos, Debug, Clone, Copy, PartialEq)]
#[logos(skip r"[ \t\r\f]+")]
#[logos(skip r"#[^\n]*")]
enum RawToken {
	#[regex(r"\n[ \t]*", measure_indent)]
	Newline(usize),

	#[token("true", |_| true)]
	#[token("True", |_| true)]
	#[token("false", |_| false)]
	#[token("False", |_| false)]
	Bool(bool),

	#[regex(r"[0-9]+(\.[0-9]+)*([eE][+-]?[0-9]+)?")]
	Number,

	#[regex(r#""([^"\\\n]|\\.)*""#)]
	#[regex(r"'([^'\\\n]|\\.)*'")]
	String,

	#[regex(r"[a-zA-Z_][a-zA-Z0-9_]*")]
	Name,

	#[token("component", |_| KeywordKind::Component)]
	#[token("from",      |_| KeywordKind::From)]
	#[token("import",    |_| KeywordKind::Import)]
	#[token("interface", |_| KeywordKind::Interface)]
	#[token("module",    |_| KeywordKind::Module)]
	#[token("new",       |_| KeywordKind::New)]
	#[token("pin",       |_| KeywordKind::Pin)]
	#[token("signal",    |_| KeywordKind::Signal)]
	Keyword(KeywordKind),

	#[token("->", |_| PunctuatorKind::Arrow)]
	#[token("*",  |_| PunctuatorKind::Asterisk)]
	#[token(":",  |_| PunctuatorKind::Colon)]
	#[token(",",  |_| PunctuatorKind::Comma)]
	#[token(".",  |_| PunctuatorKind::Dot)]
	#[token("=",  |_| PunctuatorKind::Equals)]
	#[token("-",  |_| PunctuatorKind::Minus)]
	#[token("+",  |_| PunctuatorKind::Plus)]
	#[token(";",  |_| PunctuatorKind::Semicolon)]
	#[token("~",  |_| PunctuatorKind::Tilde)]
	Punctuator(PunctuatorKind),
}

/// Logos-based lexer implementation
///
/// Line breaks are turned into `Newline` tokens, and changes of
/// indentation between logical lines into `Indent`/`Dedent` pairs.
/// Blank and comment-only lines do not affect indentation.
pub struct LogosLexer<'source> {
	lexer: logos::Lexer<'source, RawToken>,
}

impl<'source> LogosLexer<'source> {
	fn error_at(&self, range: SourceSpan) -> LexerError {
		let slice = self.lexer.slice();
		let kind = if slice.starts_with('"') || slice.starts_with('\'') {
			LexerErrorKind::UnterminatedString
		} else {
			LexerErrorKind::InvalidToken
		};
		LexerError { range, kind }
	}
}

/// Lexer implementation based on logos <3
impl<'source> Lexer<'source> for LogosLexer<'source> {
	fn new(source: &'source str) -> Self {
		LogosLexer {
			lexer: RawToken::lexer(source),
		}
	}

	fn process(&mut self) -> Result<Vec<Token>, LexerError> {
		let mut tokens = Vec::<Token>::new();
		let mut indents = vec![0usize];
		let mut pending_newline: Option<(usize, SourceSpan)> = None;

		while let Some(token_result) = self.lexer.next() {
			let range = SourceSpan::new_from_range(&self.lexer.span());
			let raw = token_result.map_err(|_| self.error_at(range))?;

			let kind = match raw {
				RawToken::Newline(width) => {
					// Only the last line break before a real token decides the indentation
					pending_newline = Some((width, SourceSpan::new(range.start(), 1)));
					continue;
				},
				RawToken::Bool(value) => TokenKind::Bool(value),
				RawToken::Number => TokenKind::Number,
				RawToken::String => TokenKind::String,
				RawToken::Name => TokenKind::Name,
				RawToken::Keyword(kw) => TokenKind::Keyword(kw),
				RawToken::Punctuator(p) => TokenKind::Punctuator(p),
			};

			if let Some((width, newline_range)) = pending_newline.take() {
				if !tokens.is_empty() {
					tokens.push(Token {
						kind: TokenKind::Newline,
						range: newline_range,
					});
				}

				let marker = SourceSpan::new(range.start(), 0);
				let current = indents.last().copied().unwrap_or(0);
				if width > current {
					indents.push(width);
					tokens.push(Token {
						kind: TokenKind::Indent,
						range: marker,
					});
				}
				while width < indents.last().copied().unwrap_or(0) {
					indents.pop();
					tokens.push(Token {
						kind: TokenKind::Dedent,
						range: marker,
					});
				}
				if indents.last().copied().unwrap_or(0) != width {
					return Err(LexerError {
						range: marker,
						kind: LexerErrorKind::InconsistentDedent,
					});
				}
			}

			tokens.push(Token { kind, range });
		}

		// Close the last line and every block still open
		let end = SourceSpan::new(self.lexer.source().len(), 0);
		if !tokens.is_empty() {
			tokens.push(Token {
				kind: TokenKind::Newline,
				range: end,
			});
		}
		while indents.len() > 1 {
			indents.pop();
			tokens.push(Token {
				kind: TokenKind::Dedent,
				range: end,
			});
		}

		Ok(tokens)
	}
}
