mod builtins;
mod definition_catalog;
mod instance;
mod instance_builder;
mod layer_builder;
mod lookup;
mod object_def;
mod replacements;
mod statement_results;

pub use builtins::Category;
pub use builtins::BUILTIN_FILE;
pub use definition_catalog::DefinitionCatalog;
pub use instance::Instance;
pub use instance::Link;
pub use instance::OverrideOrigin;
pub use instance_builder::InstanceBuilder;
pub use instance_builder::InstanceHandle;
pub use layer_builder::chain_addresses;
pub use layer_builder::LayerBuilder;
pub use layer_builder::ObjectLayer;
pub use lookup::lookup_in_closure;
pub use lookup::lookup_in_scope;
pub use lookup::Lookup;
pub use object_def::Closure;
pub use object_def::DefinitionSource;
pub use object_def::Import;
pub use object_def::ObjectDef;
pub use object_def::Replacement;
pub use object_def::Scope;
pub use replacements::PendingReplacement;
pub use replacements::ReplacementStack;
pub use statement_results::StatementResults;
