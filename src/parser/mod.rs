//! Parser module for TypeScript and JavaScript test files

pub mod ast_helpers;
pub mod ignore_directives;
pub mod node_kind;
pub mod scope;
pub mod typescript;

pub use ast_helpers::node_to_location;
pub use ignore_directives::IgnoreDirectives;
pub use node_kind::{NodeKind, Selector};
pub use scope::{find_declaration, get_variable_references, Declaration, DeclarationKind};
pub use typescript::TypeScriptParser;
