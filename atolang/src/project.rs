//! Project configuration read from `ato.yaml`

use crate::core::{Address, AddressError, CompilerDiagnostic, CompilerDiagnosticBuilder, ProvidesCompilerDiagnostic};
use crate::parser::normalize_path;
use indexmap::IndexMap;
use log::{debug, warn};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use thiserror::Error;

pub const CONFIG_FILENAME: &str = "ato.yaml";
pub const ATO_DIR_NAME: &str = ".ato";
pub const MODULE_DIR_NAME: &str = "modules";
pub const DEFAULT_BUILD: &str = "default";

#[derive(Clone, Debug, Default, Deserialize, PartialEq, Eq)]
pub struct PathsConfig {
	#[serde(default)]
	pub src: Option<PathBuf>,
}

#[derive(Clone, Debug, Deserialize, PartialEq, Eq)]
pub struct BuildConfig {
	/// Address of the root block, relative to the project root
	pub entry: String,
}

/// Contents of `ato.yaml`, unknown keys are ignored
#[derive(Clone, Debug, Default, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "kebab-case")]
pub struct ProjectConfig {
	#[serde(default)]
	pub ato_version: Option<String>,
	#[serde(default)]
	pub paths: PathsConfig,
	#[serde(default)]
	pub builds: IndexMap<String, BuildConfig>,
}

impl ProjectConfig {
	pub fn from_yaml(text: &str) -> Result<Self, serde_yaml::Error> {
		serde_yaml::from_str(text)
	}
}

#[derive(Debug, Error)]
pub enum ProjectError {
	#[error("Failed to read {}", .path.display())]
	Io {
		path: PathBuf,
		#[source]
		source: std::io::Error,
	},

	#[error("Invalid project configuration in {}", .path.display())]
	Yaml {
		path: PathBuf,
		#[source]
		source: serde_yaml::Error,
	},

	#[error("No build named '{0}' in the project configuration")]
	UnknownBuild(String),

	#[error("Invalid entry address for build '{build}'")]
	InvalidEntry {
		build: String,
		#[source]
		source: AddressError,
	},
}

impl ProvidesCompilerDiagnostic for ProjectError {
	fn to_diagnostic(&self) -> CompilerDiagnostic {
		use ProjectError::*;
		let builder = CompilerDiagnosticBuilder::from_error(self).error_code("ato::project");
		let builder = match self {
			Io { source, .. } => builder.help(&source.to_string()),
			Yaml { source, .. } => builder.help(&source.to_string()),
			UnknownBuild(_) => builder.help("Builds are declared under the `builds` key of ato.yaml."),
			InvalidEntry { source, .. } => builder.help(&source.to_string()),
		};
		builder.build()
	}
}

/// A directory containing `ato.yaml` and the configuration read from it
#[derive(Clone, Debug)]
pub struct Project {
	root: PathBuf,
	config: ProjectConfig,
}

impl Project {
	/// Nearest directory at or above `start` that holds a config file
	pub fn find_root(start: &Path) -> Option<PathBuf> {
		let start = if start.is_file() {
			start.parent().unwrap_or(start)
		}
		else {
			start
		};
		start
			.ancestors()
			.find(|dir| dir.join(CONFIG_FILENAME).is_file())
			.map(Path::to_path_buf)
	}

	/// Reads the project rooted at `root`
	pub fn load(root: &Path) -> Result<Self, ProjectError> {
		let path = root.join(CONFIG_FILENAME);
		let text = std::fs::read_to_string(&path).map_err(|source| ProjectError::Io {
			path: path.clone(),
			source,
		})?;
		let config = ProjectConfig::from_yaml(&text).map_err(|source| ProjectError::Yaml { path, source })?;
		debug!("Loaded project at {}", root.display());
		Ok(Self::new(root, config))
	}

	/// Finds and reads the project containing `start`, if there is one
	pub fn discover(start: &Path) -> Result<Option<Self>, ProjectError> {
		match Self::find_root(start) {
			Some(root) => Self::load(&root).map(Some),
			None => Ok(None),
		}
	}

	pub fn new(root: &Path, config: ProjectConfig) -> Self {
		Self {
			root: normalize_path(root),
			config,
		}
	}

	pub fn root(&self) -> &Path {
		&self.root
	}

	pub fn config(&self) -> &ProjectConfig {
		&self.config
	}

	/// Source directory, the project root unless `paths.src` says otherwise
	pub fn src_dir(&self) -> PathBuf {
		match &self.config.paths.src {
			Some(src) => normalize_path(&self.root.join(src)),
			None => self.root.clone(),
		}
	}

	/// Where installed dependencies live
	pub fn module_dir(&self) -> PathBuf {
		self.root.join(ATO_DIR_NAME).join(MODULE_DIR_NAME)
	}

	/// Import search paths: sources, installed modules, then `extra`
	pub fn search_paths(&self, extra: &[PathBuf]) -> Vec<PathBuf> {
		let mut paths = vec![self.src_dir()];
		let module_dir = self.module_dir();
		if module_dir.is_dir() {
			paths.push(module_dir);
		}
		else {
			warn!("{} doesn't exist, installed modules won't be found", module_dir.display());
		}
		paths.extend(extra.iter().cloned());
		paths
	}

	/// Root block address of a named build
	pub fn build_entry(&self, build: &str) -> Result<Address, ProjectError> {
		let config = self
			.config
			.builds
			.get(build)
			.ok_or_else(|| ProjectError::UnknownBuild(build.to_string()))?;
		let entry: Address = config.entry.parse().map_err(|source| ProjectError::InvalidEntry {
			build: build.to_string(),
			source,
		})?;
		let file = normalize_path(&self.root.join(entry.file_path()));
		Ok(Address::from_parts(file, entry.entry().to_vec(), Vec::<String>::new()))
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use tempfile::TempDir;

	const CONFIG: &str = "\
ato-version: ^0.1.0
paths:
  src: elec/src
builds:
  default:
    entry: elec/src/top.ato:Top
  alt:
    entry: elec/src/alt.ato:Board.Inner
dependencies:
  - generics
";

	fn project_dir(config: &str) -> TempDir {
		let dir = tempfile::tempdir().unwrap();
		std::fs::write(dir.path().join(CONFIG_FILENAME), config).unwrap();
		dir
	}

	#[test]
	fn config_ignores_unknown_keys() {
		let config = ProjectConfig::from_yaml(CONFIG).unwrap();
		assert_eq!(config.ato_version.as_deref(), Some("^0.1.0"));
		assert_eq!(config.paths.src, Some(PathBuf::from("elec/src")));
		assert_eq!(config.builds.keys().collect::<Vec<_>>(), vec!["default", "alt"]);
	}

	#[test]
	fn empty_config_is_valid() {
		assert_eq!(ProjectConfig::from_yaml("{}").unwrap(), ProjectConfig::default());
	}

	#[test]
	fn root_is_found_from_nested_files() {
		let dir = project_dir(CONFIG);
		let nested = dir.path().join("elec/src");
		std::fs::create_dir_all(&nested).unwrap();
		std::fs::write(nested.join("top.ato"), "module Top: pin p\n").unwrap();
		assert_eq!(Project::find_root(&nested.join("top.ato")), Some(dir.path().to_path_buf()));
	}

	#[test]
	fn search_paths_follow_the_config() {
		let dir = project_dir(CONFIG);
		let project = Project::load(dir.path()).unwrap();
		let extra = PathBuf::from("/opt/ato");
		assert_eq!(
			project.search_paths(&[extra.clone()]),
			vec![project.root().join("elec/src"), extra.clone()]
		);

		std::fs::create_dir_all(dir.path().join(".ato/modules")).unwrap();
		assert_eq!(project.search_paths(&[])[1], project.module_dir());
	}

	#[test]
	fn builds_resolve_against_the_root() {
		let dir = project_dir(CONFIG);
		let project = Project::load(dir.path()).unwrap();
		let entry = project.build_entry("alt").unwrap();
		assert_eq!(entry.file_path(), project.root().join("elec/src/alt.ato"));
		assert_eq!(entry.entry(), ["Board", "Inner"]);
		assert!(matches!(project.build_entry("nope"), Err(ProjectError::UnknownBuild(_))));
	}

	#[test]
	fn broken_yaml_is_reported() {
		let dir = project_dir("builds: [");
		assert!(matches!(Project::load(dir.path()), Err(ProjectError::Yaml { .. })));
	}
}
