//! Resolve where an identifier's binding comes from.
//!
//! The lookup walks lexical scopes outward from the usage; the innermost
//! binding wins. Imports (ES specifiers, TS `import = require`, `require`
//! and `import()` initializers, destructured or not) resolve to their module.
//! Any other declaration is local code. Undeclared names are unresolved.

use super::imports::unwrap_initializer;
use crate::parser::ast_helpers::{
    call_arguments, call_callee, is_call_expression, is_identifier_named, property_key_name,
    string_value, text,
};
use crate::parser::scope::{find_declaration, DeclarationKind};
use tree_sitter::Node;

/// Module and names an identifier was imported under
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImportDetails {
    pub source: String,
    /// Exported name; `None` for default and namespace bindings
    pub imported: Option<String>,
    pub local: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Provenance {
    Imported(ImportDetails),
    /// Declared by ordinary local code. Callers stop searching.
    Local,
    /// No binding found, or an import shape that cannot be mapped
    Unresolved,
}

pub fn resolve_import_of(identifier: Node<'_>, source: &str) -> Provenance {
    let Some(declaration) = find_declaration(identifier, source) else {
        return Provenance::Unresolved;
    };
    let local = text(declaration.name, source).to_string();

    match declaration.kind {
        DeclarationKind::Import { statement } => {
            resolve_import_statement(statement, declaration.name, local, source)
        }
        DeclarationKind::Variable { declarator } => {
            resolve_variable(declarator, declaration.name, local, source)
        }
        _ => Provenance::Local,
    }
}

fn resolve_import_statement(
    statement: Node<'_>,
    binding: Node<'_>,
    local: String,
    source: &str,
) -> Provenance {
    let parent = binding.parent();
    let module_node = match parent {
        Some(p) if p.kind() == "import_require_clause" => p.child_by_field_name("source"),
        _ => statement.child_by_field_name("source"),
    };
    let Some(module) = module_node.and_then(|m| string_value(m, source)) else {
        return Provenance::Unresolved;
    };
    let imported = parent
        .filter(|p| p.kind() == "import_specifier")
        .and_then(|p| p.child_by_field_name("name"))
        .map(|name| {
            string_value(name, source)
                .unwrap_or_else(|| text(name, source))
                .to_string()
        });
    Provenance::Imported(ImportDetails {
        source: module.to_string(),
        imported,
        local,
    })
}

fn resolve_variable(declarator: Node<'_>, binding: Node<'_>, local: String, source: &str) -> Provenance {
    let Some(value) = declarator.child_by_field_name("value") else {
        return Provenance::Local;
    };
    let value = unwrap_initializer(value);
    let is_import_call = is_call_expression(value)
        && call_callee(value).is_some_and(|callee| {
            callee.kind() == "import" || is_identifier_named(callee, "require", source)
        });
    if !is_import_call {
        return Provenance::Local;
    }
    let Some(module) = call_arguments(value)
        .into_iter()
        .next()
        .and_then(|arg| string_value(arg, source))
    else {
        return Provenance::Unresolved;
    };
    let Some(pattern) = declarator.child_by_field_name("name") else {
        return Provenance::Unresolved;
    };

    let imported = if pattern.id() == binding.id() {
        None
    } else {
        // Only one level of destructuring maps to an export name
        let mut property = binding;
        if let Some(defaulted) = property
            .parent()
            .filter(|p| matches!(p.kind(), "assignment_pattern" | "object_assignment_pattern"))
        {
            property = defaulted;
        }
        if !matches!(
            property.kind(),
            "shorthand_property_identifier_pattern" | "object_assignment_pattern"
        ) {
            match property.parent() {
                Some(pair) => property = pair,
                None => return Provenance::Unresolved,
            }
        }
        let key = Some(property)
            .filter(|p| p.parent().is_some_and(|pp| pp.id() == pattern.id()))
            .and_then(|p| property_key_name(p, source));
        match key {
            Some(key) => Some(key.to_string()),
            None => return Provenance::Unresolved,
        }
    };

    Provenance::Imported(ImportDetails {
        source: module.to_string(),
        imported,
        local,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::test_support::{find_nth_identifier, parse};

    fn resolve(source: &str, name: &str, nth: usize) -> Provenance {
        let tree = parse(source);
        let node = find_nth_identifier(tree.root_node(), source, name, nth).unwrap();
        resolve_import_of(node, source)
    }

    fn imported(source: &str, imported: Option<&str>, local: &str) -> Provenance {
        Provenance::Imported(ImportDetails {
            source: source.to_string(),
            imported: imported.map(str::to_string),
            local: local.to_string(),
        })
    }

    #[test]
    fn es_specifiers() {
        assert_eq!(
            resolve("import { render as r } from '@testing-library/react';\nr();", "r", 1),
            imported("@testing-library/react", Some("render"), "r")
        );
        assert_eq!(
            resolve("import * as tl from 'tl';\ntl.render();", "tl", 1),
            imported("tl", None, "tl")
        );
        assert_eq!(
            resolve("import ue from 'ue';\nue.click();", "ue", 1),
            imported("ue", None, "ue")
        );
    }

    #[test]
    fn require_forms() {
        assert_eq!(
            resolve("const { render } = require('tl');\nrender();", "render", 1),
            imported("tl", Some("render"), "render")
        );
        assert_eq!(
            resolve("const { fireEvent: fe } = require('tl');\nfe.click();", "fe", 1),
            imported("tl", Some("fireEvent"), "fe")
        );
        assert_eq!(
            resolve("const tl = require(`tl`);\ntl.render();", "tl", 1),
            imported("tl", None, "tl")
        );
    }

    #[test]
    fn awaited_dynamic_import() {
        assert_eq!(
            resolve(
                "async function f() { const { screen } = await import('tl'); screen; }",
                "screen",
                1
            ),
            imported("tl", Some("screen"), "screen")
        );
    }

    #[test]
    fn local_and_unresolved() {
        assert_eq!(resolve("const render = () => {};\nrender();", "render", 1), Provenance::Local);
        assert_eq!(resolve("function f(render) { render(); }", "render", 1), Provenance::Local);
        assert_eq!(resolve("render();", "render", 0), Provenance::Unresolved);
        assert_eq!(
            resolve("const m = require(name);\nm.x();", "m", 1),
            Provenance::Unresolved
        );
        assert_eq!(
            resolve("const { a: { b } } = require('tl');\nb();", "b", 1),
            Provenance::Unresolved
        );
    }

    #[test]
    fn innermost_scope_wins_over_import() {
        let source = "import { render } from 'tl';\ntest('x', () => { const render = mount; render(); });";
        assert_eq!(resolve(source, "render", 2), Provenance::Local);
        assert_eq!(
            resolve("import { render } from 'tl';\nrender();", "render", 1),
            imported("tl", Some("render"), "render")
        );
    }
}
