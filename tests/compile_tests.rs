extern crate atolang;
use atolang::analyzer::Category;
use atolang::instance_methods::*;
use atolang::{Address, Compiler, ErrorGroup, ErrorKind, Project, Value};
use rstest::*;
use std::path::{Path, PathBuf};
use subprocess::{CaptureData, Exec, Redirection};

fn fixture(path: &str) -> PathBuf {
	Path::new(env!("CARGO_MANIFEST_DIR")).join("tests").join(path)
}

fn block(path: &str, entry: &str) -> Address {
	Address::from_parts(fixture(path), entry.split('.'), Vec::<String>::new())
}

fn resolve_file(path: &Path) -> Result<Compiler, ErrorGroup> {
	let mut compiler = Compiler::with_file_system(Vec::new());
	compiler.resolve_file(path)?;
	Ok(compiler)
}

fn run_ato(args: &[&str]) -> CaptureData {
	Exec::cmd(env!("CARGO_BIN_EXE_ato"))
		.args(args)
		.stdout(Redirection::Pipe)
		.stderr(Redirection::Pipe)
		.capture()
		.expect("failed to spawn ato")
}

#[rstest]
fn test_resolve_success(#[files("tests/input/*.ato")] path: PathBuf) {
	let mut compiler = match resolve_file(&path) {
		Ok(compiler) => compiler,
		Err(group) => panic!("{} failed to resolve: {:?}", path.display(), group),
	};

	// every node is listed among its parent's children
	let file_def = compiler.get_definition(&Address::from_file(&path)).unwrap();
	for root in file_def.local_defs.values() {
		for descendant in all_descendants(&mut compiler, &root.address).unwrap() {
			if let Some(parent) = parent(&descendant) {
				assert!(children(&mut compiler, &parent).unwrap().contains(&descendant));
			}
		}
	}
}

#[rstest]
fn test_resolve_failure(#[files("tests/input_invalid/*.ato")] path: PathBuf) {
	assert!(resolve_file(&path).is_err(), "{} resolved but should not", path.display());
}

#[rstest]
#[case("unknown_reference.ato", ErrorKind::UnknownReference)]
#[case("wildcard_import.ato", ErrorKind::MalformedStatement)]
#[case("missing_import.ato", ErrorKind::ImportNotFound)]
#[case("unknown_child.ato", ErrorKind::StructuralError)]
#[case("cycle.ato", ErrorKind::InheritanceCycle)]
#[case("instantiation_cycle.ato", ErrorKind::InstantiationCycle)]
#[case("syntax_error.ato", ErrorKind::SyntaxError)]
#[case("fractional_pin.ato", ErrorKind::TypeError)]
#[case("reference_assignment.ato", ErrorKind::TypeError)]
#[case("name_collision.ato", ErrorKind::NameCollision)]
#[case("ambiguous.ato", ErrorKind::AmbiguousReference)]
fn test_failure_kind(#[case] file: &str, #[case] kind: ErrorKind) {
	let Err(group) = resolve_file(&fixture(&format!("input_invalid/{}", file))) else {
		panic!("{} resolved but should not", file);
	};
	assert!(group.contains_kind(kind), "{} reported {:?}", file, group);
	assert!(group.iter().all(|err| err.location.is_some()));
}

#[test]
fn divider_values() {
	let mut compiler = Compiler::with_file_system(Vec::new());
	let divider = block("input/resistor_divider.ato", "Divider");
	let top = data(&mut compiler, &divider.add_instance("r_top")).unwrap();
	let bottom = data(&mut compiler, &divider.add_instance("r_bottom")).unwrap();
	assert_eq!(top["value"], Value::from("10k"));
	assert_eq!(bottom["value"], Value::from("4k7"));
	assert_eq!(bottom["footprint"], Value::from("R0402"));
	assert_eq!(links(&mut compiler, &divider).unwrap().len(), 4);
}

#[test]
fn imported_parts() {
	let mut compiler = Compiler::with_file_system(Vec::new());
	let supply = block("input/imports.ato", "Supply");
	assert!(is_interface(&mut compiler, &supply.add_instance("power")).unwrap());
	let reg = supply.add_instance("reg");
	assert!(is_component(&mut compiler, &reg).unwrap());
	assert_eq!(data(&mut compiler, &reg).unwrap()["dropout"], Value::Float(0.3));
	assert_eq!(links(&mut compiler, &reg).unwrap().len(), 3);
	assert_eq!(
		category(&mut compiler, &reg.add_instance("1")).unwrap(),
		Some(Category::Pin)
	);
}

#[test]
fn retyped_channel() {
	let mut compiler = Compiler::with_file_system(Vec::new());
	let board = block("input/retypes.ato", "Board");
	let left = board.add_instances(["left", "driver"]);
	let right = board.add_instances(["right", "driver"]);
	assert_eq!(next_super(&mut compiler, &left).unwrap(), Some(block("input/retypes.ato", "Buffered")));
	assert_eq!(next_super(&mut compiler, &right).unwrap(), Some(block("input/retypes.ato", "Plain")));
	assert_eq!(data(&mut compiler, &left).unwrap()["enabled"], Value::Bool(false));
	let origin = override_location(&mut compiler, &left, "enabled").unwrap().unwrap();
	assert_eq!(origin.layer, board);
}

#[test]
fn project_default_build() {
	let project = Project::load(&fixture("project")).unwrap();
	let entry = project.build_entry("default").unwrap();
	assert_eq!(entry.entry(), ["Board"]);

	let mut compiler = Compiler::with_file_system(project.search_paths(&[]));
	let led = entry.add_instance("led");
	assert_eq!(data(&mut compiler, &led).unwrap()["color"], Value::from("red"));
}

#[test]
fn cli_prints_the_tree() {
	let entry = format!("{}:Divider", fixture("input/resistor_divider.ato").display());
	let output = run_ato(&[&entry]);
	assert!(output.success(), "{}", output.stderr_str());
	let stdout = output.stdout_str();
	assert!(stdout.starts_with("Divider (module)"));
	assert!(stdout.contains("value = \"4k7\""));
	assert!(stdout.contains("vin ~ r_top.1"));
}

#[test]
fn cli_prints_json() {
	let entry = format!("{}:Divider", fixture("input/resistor_divider.ato").display());
	let output = run_ato(&[&entry, "--json"]);
	assert!(output.success(), "{}", output.stderr_str());
	let json: serde_json::Value = serde_json::from_str(&output.stdout_str()).unwrap();
	let divider = &json[0];
	assert_eq!(divider["category"], "module");
	let bottom = divider["children"]
		.as_array()
		.unwrap()
		.iter()
		.find(|child| child["address"].as_str().unwrap().ends_with("::r_bottom"))
		.unwrap();
	assert_eq!(bottom["data"]["value"], "4k7");
	assert_eq!(divider["links"].as_array().unwrap().len(), 4);
}

#[test]
fn cli_uses_the_project_build() {
	let output = run_ato(&[fixture("project").to_str().unwrap()]);
	assert!(output.success(), "{}", output.stderr_str());
	assert!(output.stdout_str().starts_with("Board (module)"));
}

#[test]
fn cli_fails_on_errors() {
	let file = fixture("input_invalid/unknown_reference.ato");
	let output = run_ato(&[file.to_str().unwrap()]);
	assert!(!output.success());
	assert!(output.stderr_str().contains("DoesNotExist"));
}
