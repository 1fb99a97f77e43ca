//! Import records: one per `import`, `require(...)` or `import(...)` the
//! detection engine decides to keep.

use crate::parser::ast_helpers::{
    call_arguments, call_callee, identifier_name, inner_expression, is_await_expression,
    is_call_expression, is_identifier_named, named_children, property_key_name, string_value,
    text, unwrap_parens,
};
use tree_sitter::Node;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImportKind {
    EsDefault,
    EsNamed,
    EsNamespace,
    CommonJsDestructure,
    CommonJsNamespace,
    DynamicImport,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BindingKind {
    Default,
    Named,
    Namespace,
}

/// One `{local, imported}` pair. `imported` is `None` for default and
/// namespace bindings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImportBinding {
    pub local: String,
    pub imported: Option<String>,
    pub kind: BindingKind,
}

impl ImportBinding {
    fn named(local: &str, imported: &str) -> Self {
        Self {
            local: local.to_string(),
            imported: Some(imported.to_string()),
            kind: BindingKind::Named,
        }
    }

    fn unnamed(local: &str, kind: BindingKind) -> Self {
        Self {
            local: local.to_string(),
            imported: None,
            kind,
        }
    }

    /// Name as exported by the module, when the binding renames it
    pub fn original_name(&self) -> Option<&str> {
        self.imported
            .as_deref()
            .filter(|imported| *imported != self.local)
    }
}

#[derive(Debug, Clone)]
pub struct ImportRecord<'a> {
    /// Module string, e.g. `@testing-library/react`
    pub source: String,
    pub kind: ImportKind,
    pub specifiers: Vec<ImportBinding>,
    /// Import statement, or the `require`/`import` call
    pub node: Node<'a>,
    /// The module string literal
    pub source_node: Node<'a>,
}

impl<'a> ImportRecord<'a> {
    /// Build a record from an `import ... from '...'` statement or a TS
    /// `import x = require('...')`
    pub fn from_import_declaration(node: Node<'a>, source: &str) -> Option<Self> {
        let mut specifiers = Vec::new();
        let mut kind = ImportKind::EsDefault;
        let mut source_node = node.child_by_field_name("source");

        for child in named_children(node) {
            match child.kind() {
                "import_clause" => {
                    for part in named_children(child) {
                        match part.kind() {
                            "identifier" => specifiers
                                .push(ImportBinding::unnamed(text(part, source), BindingKind::Default)),
                            "namespace_import" => {
                                kind = ImportKind::EsNamespace;
                                if let Some(local) = named_children(part).into_iter().next() {
                                    specifiers.push(ImportBinding::unnamed(
                                        text(local, source),
                                        BindingKind::Namespace,
                                    ));
                                }
                            }
                            "named_imports" => {
                                if kind != ImportKind::EsNamespace {
                                    kind = ImportKind::EsNamed;
                                }
                                for specifier in named_children(part) {
                                    if specifier.kind() != "import_specifier" {
                                        continue;
                                    }
                                    let Some(name) = specifier.child_by_field_name("name") else {
                                        continue;
                                    };
                                    let imported = string_value(name, source)
                                        .unwrap_or_else(|| text(name, source));
                                    let local = specifier
                                        .child_by_field_name("alias")
                                        .map(|a| text(a, source))
                                        .unwrap_or(imported);
                                    specifiers.push(ImportBinding::named(local, imported));
                                }
                            }
                            _ => {}
                        }
                    }
                }
                "import_require_clause" => {
                    kind = ImportKind::CommonJsNamespace;
                    source_node = child.child_by_field_name("source");
                    if let Some(local) = named_children(child)
                        .into_iter()
                        .find(|n| n.kind() == "identifier")
                    {
                        specifiers.push(ImportBinding::unnamed(
                            text(local, source),
                            BindingKind::Namespace,
                        ));
                    }
                }
                _ => {}
            }
        }

        let source_node = source_node?;
        Some(Self {
            source: string_value(source_node, source)?.to_string(),
            kind,
            specifiers,
            node,
            source_node,
        })
    }

    /// Build a record from `require('...')` or `import('...')`; bindings come
    /// from the declarator the call initializes, if any.
    pub fn from_call(call: Node<'a>, source: &str) -> Option<Self> {
        let dynamic = match call_callee(call) {
            Some(callee) if callee.kind() == "import" => true,
            Some(callee) if is_identifier_named(callee, "require", source) => false,
            _ => return None,
        };
        let source_node = call_arguments(call).into_iter().next()?;
        let module = string_value(source_node, source)?;

        let (kind, specifiers) = match initialized_declarator(call) {
            Some(pattern) if pattern.kind() == "object_pattern" => {
                let kind = if dynamic {
                    ImportKind::DynamicImport
                } else {
                    ImportKind::CommonJsDestructure
                };
                (kind, destructured_bindings(pattern, source))
            }
            Some(pattern) => {
                let kind = if dynamic {
                    ImportKind::DynamicImport
                } else {
                    ImportKind::CommonJsNamespace
                };
                let bindings = identifier_name(pattern, source)
                    .map(|local| vec![ImportBinding::unnamed(local, BindingKind::Namespace)])
                    .unwrap_or_default();
                (kind, bindings)
            }
            None if dynamic => (ImportKind::DynamicImport, Vec::new()),
            None => (ImportKind::CommonJsNamespace, Vec::new()),
        };

        Some(Self {
            source: module.to_string(),
            kind,
            specifiers,
            node: call,
            source_node,
        })
    }

    /// True for `require(...)` and `import(...)` calls
    pub fn is_import_call(call: Node<'_>, source: &str) -> bool {
        is_call_expression(call)
            && call_callee(call).is_some_and(|callee| {
                callee.kind() == "import" || is_identifier_named(callee, "require", source)
            })
    }

    /// Named binding matching `name` by imported or local name
    pub fn find_named(&self, name: &str) -> Option<&ImportBinding> {
        self.specifiers.iter().find(|b| {
            b.kind == BindingKind::Named
                && (b.imported.as_deref() == Some(name) || b.local == name)
        })
    }

    /// Namespace bindings (`import * as x`, `const x = require(...)`)
    pub fn namespace_locals(&self) -> impl Iterator<Item = &str> {
        self.specifiers
            .iter()
            .filter(|b| b.kind == BindingKind::Namespace)
            .map(|b| b.local.as_str())
    }

    /// Default or namespace binding
    pub fn default_or_namespace(&self) -> Option<&ImportBinding> {
        self.specifiers
            .iter()
            .find(|b| matches!(b.kind, BindingKind::Default | BindingKind::Namespace))
    }
}

/// Pattern of the declarator whose value is `call`, looking through
/// parentheses and one `await`
fn initialized_declarator(call: Node<'_>) -> Option<Node<'_>> {
    let mut value = call;
    loop {
        let parent = value.parent()?;
        match parent.kind() {
            "parenthesized_expression" => value = parent,
            _ if is_await_expression(parent) => value = parent,
            "variable_declarator" => {
                let init = parent.child_by_field_name("value")?;
                if init.id() != value.id() {
                    return None;
                }
                return parent.child_by_field_name("name");
            }
            _ => return None,
        }
    }
}

fn destructured_bindings(pattern: Node<'_>, source: &str) -> Vec<ImportBinding> {
    let mut bindings = Vec::new();
    for property in named_children(pattern) {
        let Some(imported) = property_key_name(property, source) else {
            continue;
        };
        let local = match property.kind() {
            "pair_pattern" => property
                .child_by_field_name("value")
                .map(|v| match v.kind() {
                    "assignment_pattern" => v.child_by_field_name("left").unwrap_or(v),
                    _ => v,
                })
                .and_then(|v| identifier_name(v, source)),
            _ => Some(imported),
        };
        if let Some(local) = local {
            bindings.push(ImportBinding::named(local, imported));
        }
    }
    bindings
}

/// Value of a declarator with parentheses and `await` removed
pub(crate) fn unwrap_initializer(value: Node<'_>) -> Node<'_> {
    let mut value = unwrap_parens(value);
    while is_await_expression(value) {
        match inner_expression(value) {
            Some(inner) => value = unwrap_parens(inner),
            None => break,
        }
    }
    value
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::test_support::{find_node, parse};

    fn import_record(source: &str) -> ImportRecord<'_> {
        // leak the tree so the record can borrow it for the test's duration
        let tree = Box::leak(Box::new(parse(source)));
        let node = find_node(tree.root_node(), "import_statement").unwrap();
        ImportRecord::from_import_declaration(node, source).unwrap()
    }

    fn call_record(source: &str) -> ImportRecord<'_> {
        let tree = Box::leak(Box::new(parse(source)));
        let call = find_node(tree.root_node(), "call_expression").unwrap();
        ImportRecord::from_call(call, source).unwrap()
    }

    #[test]
    fn es_named_with_alias() {
        let record = import_record("import { render as r, screen } from '@testing-library/react';");
        assert_eq!(record.source, "@testing-library/react");
        assert_eq!(record.kind, ImportKind::EsNamed);
        assert_eq!(record.specifiers[0], ImportBinding::named("r", "render"));
        assert_eq!(record.specifiers[0].original_name(), Some("render"));
        assert_eq!(record.specifiers[1].original_name(), None);
        assert!(record.find_named("render").is_some());
        assert!(record.find_named("r").is_some());
    }

    #[test]
    fn es_namespace_and_default() {
        let record = import_record("import * as rtl from '@testing-library/react';");
        assert_eq!(record.kind, ImportKind::EsNamespace);
        assert_eq!(record.namespace_locals().collect::<Vec<_>>(), vec!["rtl"]);

        let record = import_record("import userEvent from '@testing-library/user-event';");
        assert_eq!(record.kind, ImportKind::EsDefault);
        assert_eq!(record.default_or_namespace().unwrap().local, "userEvent");
    }

    #[test]
    fn ts_import_require() {
        let record = import_record("import rtl = require('@testing-library/react');");
        assert_eq!(record.kind, ImportKind::CommonJsNamespace);
        assert_eq!(record.source, "@testing-library/react");
        assert_eq!(record.namespace_locals().collect::<Vec<_>>(), vec!["rtl"]);
    }

    #[test]
    fn require_destructure() {
        let record = call_record("const { render, fireEvent: fe } = require('@testing-library/react');");
        assert_eq!(record.kind, ImportKind::CommonJsDestructure);
        assert_eq!(
            record.specifiers,
            vec![
                ImportBinding::named("render", "render"),
                ImportBinding::named("fe", "fireEvent"),
            ]
        );
    }

    #[test]
    fn dynamic_import_with_template() {
        let record = call_record("async function f() { const rtl = await import(`@testing-library/react`); }");
        assert_eq!(record.kind, ImportKind::DynamicImport);
        assert_eq!(record.source, "@testing-library/react");
        assert_eq!(record.namespace_locals().collect::<Vec<_>>(), vec!["rtl"]);
    }

    #[test]
    fn non_literal_require_is_skipped() {
        let source = "const x = require(name);";
        let tree = parse(source);
        let call = find_node(tree.root_node(), "call_expression").unwrap();
        assert!(ImportRecord::is_import_call(call, source));
        assert!(ImportRecord::from_call(call, source).is_none());
    }
}
