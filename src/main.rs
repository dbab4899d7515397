extern crate atolang;
use atolang::analyzer::{Instance, Link};
use atolang::project::DEFAULT_BUILD;
use atolang::{Address, Compiler, DiagnosticBuffer, ErrorGroup, Project, ProvidesCompilerDiagnostic, Value};
use clap::{command, Arg, ArgAction};
use indexmap::IndexMap;
use log::{info, warn};
use miette::Diagnostic;
use serde::Serialize;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::rc::Rc;
use thiserror::Error;

#[derive(Error, Diagnostic, Debug)]
pub enum PrettyIoError {
	#[error(transparent)]
	#[diagnostic(code(ato::io_error))]
	IoError(#[from] std::io::Error),

	#[error(transparent)]
	#[diagnostic(code(ato::json_error))]
	JsonError(#[from] serde_json::Error),
}

#[derive(Error, Diagnostic, Debug)]
#[error("No ato.yaml found above {}, cannot pick a build", .0.display())]
#[diagnostic(code(ato::project), help("Pass a file or an address such as `file.ato:Top` instead."))]
struct NoProjectError(PathBuf);

/// Printable view of a resolved instance
#[derive(Serialize)]
struct InstanceNode<'a> {
	address: &'a Address,
	category: Option<String>,
	data: IndexMap<String, Value>,
	links: &'a [Link],
	children: Vec<InstanceNode<'a>>,
}

impl<'a> InstanceNode<'a> {
	fn new(instance: &'a Instance) -> Self {
		Self {
			address: instance.address(),
			category: instance.category().map(|category| category.to_string()),
			data: instance.data(),
			links: instance.links(),
			children: instance.children().values().map(InstanceNode::new).collect(),
		}
	}

	fn print(&self, output: &mut dyn Write, depth: usize) -> io::Result<()> {
		let indent = "  ".repeat(depth);
		let category = self.category.as_deref().unwrap_or("?");
		writeln!(output, "{}{} ({})", indent, self.address.name(), category)?;
		for (key, value) in &self.data {
			writeln!(output, "{}  {} = {}", indent, key, value)?;
		}
		for link in self.links {
			writeln!(output, "{}  {} ~ {}", indent, instance_path(&link.source), instance_path(&link.target))?;
		}
		for child in &self.children {
			child.print(output, depth + 1)?;
		}
		Ok(())
	}
}

fn instance_path(address: &Address) -> String {
	address.instance().map(|path| path.join(".")).unwrap_or_default()
}

/// What the command line asked to resolve
enum Target {
	Block(Address),
	File(PathBuf),
}

fn init_logging(verbose: bool) {
	let level = if verbose { "debug" } else { "warn" };
	env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level)).init();
}

fn pick_target(entry: &str, build: Option<&String>, project: Option<&Project>) -> miette::Result<Target> {
	let path = Path::new(entry);
	if path.is_dir() {
		let project = project.ok_or_else(|| NoProjectError(path.to_path_buf()))?;
		let build = build.map(String::as_str).unwrap_or(DEFAULT_BUILD);
		return project
			.build_entry(build)
			.map(Target::Block)
			.map_err(|err| err.to_miette_report());
	}
	if build.is_some() {
		warn!("--build is only used when the entry is a project directory");
	}

	let address: Address = entry
		.parse()
		.map_err(|err: atolang::core::AddressError| miette::miette!("{}", err))?;
	if address.entry().is_empty() {
		Ok(Target::File(address.file_path().to_path_buf()))
	}
	else {
		Ok(Target::Block(address))
	}
}

/// Where to look for `ato.yaml` from
fn discovery_start(entry: &str) -> PathBuf {
	if Path::new(entry).exists() {
		return PathBuf::from(entry);
	}
	entry
		.parse::<Address>()
		.map(|address| address.file_path().to_path_buf())
		.unwrap_or_else(|_| PathBuf::from(entry))
}

fn resolve(compiler: &mut Compiler, target: &Target) -> Result<Vec<Rc<Instance>>, ErrorGroup> {
	match target {
		Target::Block(address) => Ok(vec![compiler.get_instance_tree(address)?]),
		Target::File(path) => compiler.resolve_file(path),
	}
}

fn main() -> miette::Result<()> {
	let matches = command!()
		.arg(
			Arg::new("entry")
				.help("Address (`file.ato:Block`), source file or project directory")
				.default_value("."),
		)
		.arg(
			Arg::new("include")
				.short('I')
				.long("include")
				.help("Additional import search directory")
				.action(ArgAction::Append),
		)
		.arg(
			Arg::new("build")
				.short('b')
				.long("build")
				.help("Build of ato.yaml to resolve when given a project directory"),
		)
		.arg(
			Arg::new("json")
				.long("json")
				.help("Print the resolved tree as JSON")
				.action(ArgAction::SetTrue),
		)
		.arg(
			Arg::new("verbose")
				.short('v')
				.long("verbose")
				.action(ArgAction::SetTrue),
		)
		.get_matches();

	init_logging(matches.get_flag("verbose"));

	let entry = matches
		.get_one::<String>("entry")
		.map(String::as_str)
		.unwrap_or(".");
	let includes: Vec<PathBuf> = matches
		.get_many::<String>("include")
		.map(|dirs| dirs.map(PathBuf::from).collect())
		.unwrap_or_default();

	let project = Project::discover(&discovery_start(entry)).map_err(|err| err.to_miette_report())?;
	let search_paths = match &project {
		Some(project) => {
			info!("Using project at {}", project.root().display());
			project.search_paths(&includes)
		},
		None => {
			warn!("No ato.yaml found, only the include directories are searched for imports");
			includes
		},
	};

	let target = pick_target(entry, matches.get_one::<String>("build"), project.as_ref())?;
	let mut compiler = Compiler::with_file_system(search_paths);
	let roots = match resolve(&mut compiler, &target) {
		Ok(roots) => roots,
		Err(group) => {
			let mut buffer = DiagnosticBuffer::new();
			buffer.push_group(&group);
			return buffer.print_diagnostics(|path| compiler.source(path).map(String::from));
		},
	};

	let nodes: Vec<InstanceNode> = roots.iter().map(|root| InstanceNode::new(root)).collect();
	let stdout = io::stdout();
	let mut output = stdout.lock();
	if matches.get_flag("json") {
		serde_json::to_writer_pretty(&mut output, &nodes).map_err(PrettyIoError::from)?;
		writeln!(output).map_err(PrettyIoError::from)?;
	}
	else {
		for node in &nodes {
			node.print(&mut output, 0).map_err(PrettyIoError::from)?;
		}
	}
	Ok(())
}
