use atolang::lexer::{KeywordKind, Lexer, LexerErrorKind, LogosLexer, PunctuatorKind, TokenKind};

fn kinds(source: &str) -> Vec<TokenKind> {
	LogosLexer::new(source)
		.process()
		.expect("Tokens expected")
		.into_iter()
		.map(|token| token.kind)
		.collect()
}

#[test]
fn basic_lexer_test() {
	let source = "r1.value = \"4k7\" # comment";
	let tokens = LogosLexer::new(source).process().expect("Tokens expected");
	assert_eq!(tokens[0].kind, TokenKind::Name);
	assert_eq!(&source[tokens[0].range.start()..tokens[0].range.end()], "r1");
	assert_eq!(tokens[1].kind, TokenKind::Punctuator(PunctuatorKind::Dot));
	assert_eq!(tokens[3].kind, TokenKind::Punctuator(PunctuatorKind::Equals));
	assert_eq!(tokens[4].kind, TokenKind::String);
	assert_eq!(tokens.last().map(|token| token.kind), Some(TokenKind::Newline));
}

#[test]
fn nested_blocks_close_every_level() {
	let source = "module A:\n    module B:\n        pin p\n";
	let dedents = kinds(source).into_iter().filter(|kind| *kind == TokenKind::Dedent).count();
	assert_eq!(dedents, 2);
}

#[test]
fn blank_and_comment_lines_keep_indentation() {
	let source = "module A:\n    pin a\n\n    # note\n    pin b\n";
	assert_eq!(
		kinds(source),
		vec![
			TokenKind::Keyword(KeywordKind::Module),
			TokenKind::Name,
			TokenKind::Punctuator(PunctuatorKind::Colon),
			TokenKind::Newline,
			TokenKind::Indent,
			TokenKind::Keyword(KeywordKind::Pin),
			TokenKind::Name,
			TokenKind::Newline,
			TokenKind::Keyword(KeywordKind::Pin),
			TokenKind::Name,
			TokenKind::Newline,
			TokenKind::Dedent,
		]
	);
}

#[test]
fn unterminated_strings_are_reported() {
	let err = LogosLexer::new("x = \"oops\n").process().unwrap_err();
	assert_eq!(err.kind, LexerErrorKind::UnterminatedString);
	assert_eq!(err.range.start(), 4);
}
