//! Lexical scope lookups over the syntax tree.
//!
//! tree-sitter gives no scope analysis, so bindings are found by walking
//! outward from a usage through the enclosing scopes (program, blocks,
//! functions, loop heads, catch clauses) and scanning each one's declarations.
//! The innermost binding wins. `var` declarations are hoisted to the enclosing
//! function body or program.

use super::ast_helpers::{ancestors, named_children, text};
use super::node_kind::NodeKind;
use tree_sitter::Node;

/// What introduced a binding
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeclarationKind<'a> {
    /// ES import or TS `import x = require(...)`
    Import { statement: Node<'a> },
    /// `const` / `let` / `var` declarator, possibly destructuring
    Variable { declarator: Node<'a> },
    Parameter,
    Function,
    Class,
    /// `for (const x of xs)` head
    LoopVariable,
    CatchParameter,
}

/// A resolved binding: the identifier node that declares it and how
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Declaration<'a> {
    pub name: Node<'a>,
    pub kind: DeclarationKind<'a>,
}

/// Find the declaration `identifier` refers to. `None` for globals, member
/// properties and anything that is not a plain reference.
pub fn find_declaration<'a>(identifier: Node<'a>, source: &str) -> Option<Declaration<'a>> {
    if !matches!(identifier.kind(), "identifier" | "shorthand_property_identifier") {
        return None;
    }
    let name = text(identifier, source);
    ancestors(identifier).find_map(|scope| declaration_in_scope(scope, name, source))
}

/// Every later reference to the binding declared at `binding`, in source order
pub fn references_of<'a>(binding: Node<'a>, source: &str) -> Vec<Node<'a>> {
    let root = ancestors(binding)
        .find(|n| NodeKind::of(*n).is_function() || NodeKind::of(*n) == NodeKind::Program);
    let Some(root) = root else {
        return Vec::new();
    };
    let name = text(binding, source);
    let mut candidates = Vec::new();
    collect_named(root, name, source, &mut candidates);
    candidates
        .into_iter()
        .filter(|n| n.start_byte() >= binding.end_byte())
        .filter(|n| find_declaration(*n, source).is_some_and(|d| d.name.id() == binding.id()))
        .collect()
}

/// References to the first binding of a variable declarator
pub fn get_variable_references<'a>(declarator: Node<'a>, source: &str) -> Vec<Node<'a>> {
    if NodeKind::of(declarator) != NodeKind::VariableDeclarator {
        return Vec::new();
    }
    declarator
        .child_by_field_name("name")
        .and_then(|pattern| pattern_bindings(pattern).into_iter().next())
        .map(|binding| references_of(binding, source))
        .unwrap_or_default()
}

/// Identifier nodes bound by a declaration pattern, left to right
pub fn pattern_bindings(pattern: Node<'_>) -> Vec<Node<'_>> {
    let mut out = Vec::new();
    push_bindings(pattern, &mut out);
    out
}

fn push_bindings<'a>(pattern: Node<'a>, out: &mut Vec<Node<'a>>) {
    match pattern.kind() {
        "identifier" | "shorthand_property_identifier_pattern" => out.push(pattern),
        "pair_pattern" => {
            if let Some(value) = pattern.child_by_field_name("value") {
                push_bindings(value, out);
            }
        }
        "object_assignment_pattern" | "assignment_pattern" => {
            if let Some(left) = pattern.child_by_field_name("left") {
                push_bindings(left, out);
            }
        }
        "required_parameter" | "optional_parameter" => {
            if let Some(inner) = pattern.child_by_field_name("pattern") {
                push_bindings(inner, out);
            }
        }
        "object_pattern" | "array_pattern" | "rest_pattern" | "formal_parameters" => {
            for child in named_children(pattern) {
                push_bindings(child, out);
            }
        }
        _ => {}
    }
}

fn find_binding<'a>(pattern: Node<'a>, name: &str, source: &str) -> Option<Node<'a>> {
    pattern_bindings(pattern)
        .into_iter()
        .find(|b| text(*b, source) == name)
}

fn declaration_in_scope<'a>(scope: Node<'a>, name: &str, source: &str) -> Option<Declaration<'a>> {
    match scope.kind() {
        "program" => declaration_in_statements(scope, name, source)
            .or_else(|| hoisted_var(scope, name, source)),
        "statement_block" => {
            let found = declaration_in_statements(scope, name, source);
            let is_function_body = scope
                .parent()
                .is_some_and(|p| NodeKind::of(p).is_function());
            if found.is_none() && is_function_body {
                return hoisted_var(scope, name, source);
            }
            found
        }
        "switch_body" => named_children(scope)
            .into_iter()
            .find_map(|case| declaration_in_statements(case, name, source)),
        "for_statement" => scope
            .child_by_field_name("initializer")
            .and_then(|init| declaration_in_statement(init, name, source)),
        "for_in_statement" => scope
            .child_by_field_name("left")
            .and_then(|left| find_binding(left, name, source))
            .map(|binding| Declaration {
                name: binding,
                kind: DeclarationKind::LoopVariable,
            }),
        "catch_clause" => scope
            .child_by_field_name("parameter")
            .and_then(|param| find_binding(param, name, source))
            .map(|binding| Declaration {
                name: binding,
                kind: DeclarationKind::CatchParameter,
            }),
        _ if NodeKind::of(scope).is_function() => function_scope_binding(scope, name, source),
        "class" => scope
            .child_by_field_name("name")
            .filter(|n| text(*n, source) == name)
            .map(|binding| Declaration {
                name: binding,
                kind: DeclarationKind::Class,
            }),
        _ => None,
    }
}

fn function_scope_binding<'a>(function: Node<'a>, name: &str, source: &str) -> Option<Declaration<'a>> {
    let params = function
        .child_by_field_name("parameters")
        .or_else(|| function.child_by_field_name("parameter"));
    if let Some(binding) = params.and_then(|p| find_binding(p, name, source)) {
        return Some(Declaration {
            name: binding,
            kind: DeclarationKind::Parameter,
        });
    }
    // A named function expression sees its own name
    if NodeKind::of(function) == NodeKind::FunctionExpression {
        return function
            .child_by_field_name("name")
            .filter(|n| text(*n, source) == name)
            .map(|binding| Declaration {
                name: binding,
                kind: DeclarationKind::Function,
            });
    }
    None
}

fn declaration_in_statements<'a>(container: Node<'a>, name: &str, source: &str) -> Option<Declaration<'a>> {
    named_children(container)
        .into_iter()
        .find_map(|statement| declaration_in_statement(statement, name, source))
}

fn declaration_in_statement<'a>(statement: Node<'a>, name: &str, source: &str) -> Option<Declaration<'a>> {
    match statement.kind() {
        "lexical_declaration" | "variable_declaration" => variable_binding(statement, name, source),
        "function_declaration" | "generator_function_declaration" => statement
            .child_by_field_name("name")
            .filter(|n| text(*n, source) == name)
            .map(|binding| Declaration {
                name: binding,
                kind: DeclarationKind::Function,
            }),
        "class_declaration" => statement
            .child_by_field_name("name")
            .filter(|n| text(*n, source) == name)
            .map(|binding| Declaration {
                name: binding,
                kind: DeclarationKind::Class,
            }),
        "import_statement" => import_binding(statement, name, source).map(|binding| Declaration {
            name: binding,
            kind: DeclarationKind::Import { statement },
        }),
        "export_statement" => statement
            .child_by_field_name("declaration")
            .and_then(|decl| declaration_in_statement(decl, name, source)),
        _ => None,
    }
}

fn variable_binding<'a>(declaration: Node<'a>, name: &str, source: &str) -> Option<Declaration<'a>> {
    named_children(declaration)
        .into_iter()
        .filter(|d| d.kind() == "variable_declarator")
        .find_map(|declarator| {
            let pattern = declarator.child_by_field_name("name")?;
            find_binding(pattern, name, source).map(|binding| Declaration {
                name: binding,
                kind: DeclarationKind::Variable { declarator },
            })
        })
}

/// Local identifier an import statement binds under `name`
fn import_binding<'a>(statement: Node<'a>, name: &str, source: &str) -> Option<Node<'a>> {
    for child in named_children(statement) {
        match child.kind() {
            "import_clause" => {
                for part in named_children(child) {
                    let found = match part.kind() {
                        "identifier" => Some(part),
                        "namespace_import" => named_children(part)
                            .into_iter()
                            .find(|n| n.kind() == "identifier"),
                        "named_imports" => named_children(part)
                            .into_iter()
                            .filter(|s| s.kind() == "import_specifier")
                            .filter_map(|s| {
                                s.child_by_field_name("alias")
                                    .or_else(|| s.child_by_field_name("name"))
                            })
                            .find(|n| text(*n, source) == name),
                        _ => None,
                    };
                    if let Some(found) = found.filter(|n| text(*n, source) == name) {
                        return Some(found);
                    }
                }
            }
            "import_require_clause" => {
                let found = named_children(child)
                    .into_iter()
                    .find(|n| n.kind() == "identifier")
                    .filter(|n| text(*n, source) == name);
                if found.is_some() {
                    return found;
                }
            }
            _ => {}
        }
    }
    None
}

/// `var` declarations anywhere under `scope`, not entering nested functions
fn hoisted_var<'a>(scope: Node<'a>, name: &str, source: &str) -> Option<Declaration<'a>> {
    for child in named_children(scope) {
        if NodeKind::of(child).is_function() || child.kind() == "class_declaration" {
            continue;
        }
        if child.kind() == "variable_declaration" {
            if let Some(found) = variable_binding(child, name, source) {
                return Some(found);
            }
        }
        if let Some(found) = hoisted_var(child, name, source) {
            return Some(found);
        }
    }
    None
}

fn collect_named<'a>(node: Node<'a>, name: &str, source: &str, out: &mut Vec<Node<'a>>) {
    if matches!(node.kind(), "identifier" | "shorthand_property_identifier")
        && text(node, source) == name
    {
        out.push(node);
    }
    for child in named_children(node) {
        collect_named(child, name, source, out);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::test_support::{find_nth_identifier, parse};

    #[test]
    fn resolves_import_bindings() {
        let source = "import def, { a as b } from 'm';\nimport * as ns from 'n';\nb(); def(); ns.x();";
        let tree = parse(source);
        let root = tree.root_node();
        for name in ["b", "def", "ns"] {
            let usage = find_nth_identifier(root, source, name, 1).unwrap();
            let decl = find_declaration(usage, source).unwrap();
            assert!(matches!(decl.kind, DeclarationKind::Import { .. }), "{}", name);
            assert_eq!(text(decl.name, source), name);
        }
    }

    #[test]
    fn innermost_binding_wins() {
        let source = "import { render } from 'r';\nfunction f(render) { render(); }";
        let tree = parse(source);
        let usage = find_nth_identifier(tree.root_node(), source, "render", 2).unwrap();
        let decl = find_declaration(usage, source).unwrap();
        assert_eq!(decl.kind, DeclarationKind::Parameter);
    }

    #[test]
    fn destructured_variable() {
        let source = "const { screen: s, ...rest } = require('x');\ns.getByText('a'); rest;";
        let tree = parse(source);
        let usage = find_nth_identifier(tree.root_node(), source, "s", 1).unwrap();
        let decl = find_declaration(usage, source).unwrap();
        assert!(matches!(decl.kind, DeclarationKind::Variable { .. }));
        let rest = find_nth_identifier(tree.root_node(), source, "rest", 1).unwrap();
        assert!(find_declaration(rest, source).is_some());
    }

    #[test]
    fn var_is_hoisted_to_function_body() {
        let source = "function f() { if (x) { var y = 1; } return y; }";
        let tree = parse(source);
        let usage = find_nth_identifier(tree.root_node(), source, "y", 1).unwrap();
        let decl = find_declaration(usage, source).unwrap();
        assert!(matches!(decl.kind, DeclarationKind::Variable { .. }));
    }

    #[test]
    fn globals_and_properties_are_unresolved() {
        let source = "expect(a.b);";
        let tree = parse(source);
        let expect = find_nth_identifier(tree.root_node(), source, "expect", 0).unwrap();
        assert!(find_declaration(expect, source).is_none());
        let b = find_nth_identifier(tree.root_node(), source, "b", 0).unwrap();
        assert!(find_declaration(b, source).is_none());
    }

    #[test]
    fn variable_references_in_order() {
        let source = "const p = waitFor(x);\nfunction g(p) { p; }\np.then(); p.catch();";
        let tree = parse(source);
        let declarator =
            crate::parser::test_support::find_node(tree.root_node(), "variable_declarator").unwrap();
        let refs = get_variable_references(declarator, source);
        let rows: Vec<usize> = refs.iter().map(|r| r.start_position().row).collect();
        assert_eq!(rows, vec![2, 2]);
    }

    #[test]
    fn references_of_non_declarator_is_empty() {
        let source = "foo();";
        let tree = parse(source);
        assert!(get_variable_references(tree.root_node(), source).is_empty());
    }
}
