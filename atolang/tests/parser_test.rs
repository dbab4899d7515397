use atolang::parser::ast::*;
use atolang::parser::{parse_source, ParserErrorKind};
use atolang::Value;
use rstest::rstest;

fn parse_pass(source: &str) -> FileInput {
	let result = parse_source(source);
	assert!(
		result.is_ok(),
		"\nsource: {:?} is not ok,\nactual result was {:?}\n",
		source,
		result
	);
	result.unwrap()
}

fn parse_fail(source: &str) -> ParserErrorKind {
	let result = parse_source(source);
	assert!(
		result.is_err(),
		"\nsource: {:?} was parsed succesfully, but it should not,\nresult was {:?}\n",
		source,
		result
	);
	result.unwrap_err().kind
}

fn block(statement: &Statement) -> &BlockDefinition {
	match statement {
		Statement::BlockDefinition(block) => block,
		other => panic!("expected a block, got {:?}", other),
	}
}

#[rstest]
#[case("module Top:\n    pin p1\n")]
#[case("component R from Resistor: value = \"10k\"\n")]
#[case("interface Power:\n    signal vcc; signal gnd\n")]
#[case("import Foo from \"a.ato\"\n")]
#[case("from \"lib/a.ato\" import Foo, Bar.Baz\n")]
#[case("import * from \"a.ato\"\n")]
#[case("x -> Y\n")]
#[case("r1 = new R\nr1.value = 4.7e3\n")]
#[case("vcc ~ r1.1\npin 3 ~ signal gnd\n")]
#[case("flag = True; other = false\n")]
#[case("")]
#[case("# only a comment\n\n")]
fn accepted_sources(#[case] source: &str) {
	parse_pass(source);
}

#[rstest]
#[case("module :\n")]
#[case("module A\n    pin p\n")]
#[case("import Foo \"a.ato\"\n")]
#[case("x = new\n")]
#[case("pin\n")]
#[case("a ~\n")]
#[case("x = \"unterminated\n")]
fn rejected_sources(#[case] source: &str) {
	parse_fail(source);
}

#[test]
fn nested_blocks_keep_their_bodies() {
	let file = parse_pass("module Outer:\n    component Inner:\n        pin 1\n    inner = new Inner\n");
	assert_eq!(file.statements.len(), 1);
	let outer = block(&file.statements[0]);
	assert_eq!(outer.kind, BlockKind::Module);
	assert!(outer.super_ref.is_none());
	assert_eq!(outer.body.len(), 2);
	let inner = block(&outer.body[0]);
	assert_eq!(inner.name, "Inner");
	assert_eq!(inner.kind, BlockKind::Component);
}

#[test]
fn superclass_is_recorded() {
	let file = parse_pass("component R from lib.Resistor:\n    value = \"10k\"\n");
	let r = block(&file.statements[0]);
	assert_eq!(r.super_ref.as_ref().map(|s| s.reference.to_string()), Some("lib.Resistor".into()));
}

#[test]
fn both_import_forms_name_the_file() {
	let file = parse_pass("import Foo from \"a.ato\"\nfrom \"b.ato\" import Bar, Baz\n");
	let imports: Vec<(&str, usize)> = file
		.statements
		.iter()
		.map(|statement| match statement {
			Statement::Import(ImportStatement {
				names: ImportedNames::Specific { names },
				from_path,
				..
			}) => (from_path.as_str(), names.len()),
			other => panic!("expected an import, got {:?}", other),
		})
		.collect();
	assert_eq!(imports, vec![("a.ato", 1), ("b.ato", 2)]);
}

#[test]
fn wildcard_imports_parse_as_all() {
	let file = parse_pass("import * from \"a.ato\"\n");
	assert!(matches!(
		&file.statements[0],
		Statement::Import(ImportStatement {
			names: ImportedNames::All,
			..
		})
	));
}

#[test]
fn literal_kinds() {
	let file = parse_pass("a = 10; b = 4.7; c = \"x\"; d = True; e = new R; f = g.h\n");
	let values: Vec<&Assignable> = file
		.statements
		.iter()
		.map(|statement| match statement {
			Statement::Assignment(assignment) => &assignment.value,
			other => panic!("expected an assignment, got {:?}", other),
		})
		.collect();
	assert!(matches!(values[0], Assignable::Literal { value: Value::Int(10), .. }));
	assert!(matches!(values[1], Assignable::Literal { value: Value::Float(_), .. }));
	assert!(matches!(values[2], Assignable::Literal { value: Value::String(s), .. } if s == "x"));
	assert!(matches!(values[3], Assignable::Literal { value: Value::Bool(true), .. }));
	assert!(matches!(values[4], Assignable::New { .. }));
	assert!(matches!(values[5], Assignable::Reference(_)));
}

#[test]
fn inline_declarations_in_connections() {
	let file = parse_pass("pin 1 ~ signal vcc\n");
	let Statement::Connect(connect) = &file.statements[0] else {
		panic!("expected a connection");
	};
	assert!(matches!(
		&connect.source,
		Connectable::Pin(PinDefinition { name: PinName::Number(n), .. }) if n == "1"
	));
	assert!(matches!(&connect.target, Connectable::Signal(SignalDefinition { name, .. }) if name == "vcc"));
}

#[test]
fn fractional_pin_names_survive_parsing() {
	let file = parse_pass("pin 1.5\n");
	assert!(matches!(
		&file.statements[0],
		Statement::PinDefinition(PinDefinition { name: PinName::Number(n), .. }) if n == "1.5"
	));
}

#[test]
fn retype_targets() {
	let file = parse_pass("r1.inner -> Special\n");
	let Statement::Retype(retype) = &file.statements[0] else {
		panic!("expected a retype");
	};
	assert_eq!(retype.target.reference.to_string(), "r1.inner");
	assert_eq!(retype.new_type.reference.to_string(), "Special");
}

#[test]
fn statement_spans_point_into_the_source() {
	let source = "module Top:\n    r1 = new R\n";
	let file = parse_pass(source);
	let top = block(&file.statements[0]);
	let span = top.body[0].get_location();
	assert_eq!(&source[span.start()..span.end()], "r1 = new R");
}

#[test]
fn lexer_failures_surface_as_parser_errors() {
	assert!(matches!(parse_fail("x = $\n"), ParserErrorKind::Lexer(_)));
}
