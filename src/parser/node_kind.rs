//! Tagged view over tree-sitter node kinds.
//!
//! Rules and the detection engine never compare raw kind strings; they match
//! on [`NodeKind`] instead, and visitors are keyed by [`Selector`].

use tree_sitter::Node;

/// Node kinds the linter reasons about. Everything else is `Other`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NodeKind {
    Program,
    ImportDeclaration,
    ImportSpecifier,
    NamespaceImport,
    VariableDeclaration,
    VariableDeclarator,
    ObjectPattern,
    ArrayPattern,
    ExpressionStatement,
    ReturnStatement,
    BlockStatement,
    CallExpression,
    NewExpression,
    MemberExpression,
    SubscriptExpression,
    AwaitExpression,
    AssignmentExpression,
    SequenceExpression,
    ParenthesizedExpression,
    ArrowFunction,
    FunctionExpression,
    FunctionDeclaration,
    MethodDefinition,
    /// `identifier`, `property_identifier` and the shorthand property forms
    Identifier,
    StringLiteral,
    TemplateLiteral,
    RegexLiteral,
    NumberLiteral,
    ObjectExpression,
    Property,
    ArrayExpression,
    Arguments,
    JsxOpeningElement,
    JsxAttribute,
    Comment,
    Other,
}

impl NodeKind {
    pub fn of(node: Node<'_>) -> Self {
        match node.kind() {
            "program" => NodeKind::Program,
            "import_statement" => NodeKind::ImportDeclaration,
            "import_specifier" => NodeKind::ImportSpecifier,
            "namespace_import" => NodeKind::NamespaceImport,
            "lexical_declaration" | "variable_declaration" => NodeKind::VariableDeclaration,
            "variable_declarator" => NodeKind::VariableDeclarator,
            "object_pattern" => NodeKind::ObjectPattern,
            "array_pattern" => NodeKind::ArrayPattern,
            "expression_statement" => NodeKind::ExpressionStatement,
            "return_statement" => NodeKind::ReturnStatement,
            "statement_block" => NodeKind::BlockStatement,
            "call_expression" => NodeKind::CallExpression,
            "new_expression" => NodeKind::NewExpression,
            "member_expression" => NodeKind::MemberExpression,
            "subscript_expression" => NodeKind::SubscriptExpression,
            "await_expression" => NodeKind::AwaitExpression,
            "assignment_expression" => NodeKind::AssignmentExpression,
            "sequence_expression" => NodeKind::SequenceExpression,
            "parenthesized_expression" => NodeKind::ParenthesizedExpression,
            "arrow_function" => NodeKind::ArrowFunction,
            "function_expression" | "function" | "generator_function" => {
                NodeKind::FunctionExpression
            }
            "function_declaration" | "generator_function_declaration" => {
                NodeKind::FunctionDeclaration
            }
            "method_definition" => NodeKind::MethodDefinition,
            "identifier"
            | "property_identifier"
            | "shorthand_property_identifier"
            | "shorthand_property_identifier_pattern" => NodeKind::Identifier,
            "string" => NodeKind::StringLiteral,
            "template_string" => NodeKind::TemplateLiteral,
            "regex" => NodeKind::RegexLiteral,
            "number" => NodeKind::NumberLiteral,
            "object" => NodeKind::ObjectExpression,
            "pair" => NodeKind::Property,
            "array" => NodeKind::ArrayExpression,
            "arguments" => NodeKind::Arguments,
            "jsx_opening_element" | "jsx_self_closing_element" => NodeKind::JsxOpeningElement,
            "jsx_attribute" => NodeKind::JsxAttribute,
            "comment" => NodeKind::Comment,
            _ => NodeKind::Other,
        }
    }

    /// Arrow functions, function expressions and declarations, methods
    pub fn is_function(self) -> bool {
        matches!(
            self,
            NodeKind::ArrowFunction
                | NodeKind::FunctionExpression
                | NodeKind::FunctionDeclaration
                | NodeKind::MethodDefinition
        )
    }
}

/// Visitor key: entering or leaving a node of the given kind
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Selector {
    Enter(NodeKind),
    Exit(NodeKind),
}

impl Selector {
    pub fn kind(self) -> NodeKind {
        match self {
            Selector::Enter(kind) | Selector::Exit(kind) => kind,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::TypeScriptParser;

    fn first_of_kind<'a>(node: Node<'a>, kind: &str) -> Option<Node<'a>> {
        if node.kind() == kind {
            return Some(node);
        }
        let mut cursor = node.walk();
        let children: Vec<Node<'a>> = node.named_children(&mut cursor).collect();
        children.into_iter().find_map(|c| first_of_kind(c, kind))
    }

    #[test]
    fn maps_common_kinds() {
        let source = "import { a } from 'm';\nconst x = a.b(1);";
        let tree = TypeScriptParser::new().unwrap().parse(source).unwrap();
        let root = tree.root_node();
        assert_eq!(NodeKind::of(root), NodeKind::Program);
        let import = first_of_kind(root, "import_statement").unwrap();
        assert_eq!(NodeKind::of(import), NodeKind::ImportDeclaration);
        let call = first_of_kind(root, "call_expression").unwrap();
        assert_eq!(NodeKind::of(call), NodeKind::CallExpression);
        let prop = first_of_kind(root, "property_identifier").unwrap();
        assert_eq!(NodeKind::of(prop), NodeKind::Identifier);
    }

    #[test]
    fn selector_kind() {
        assert_eq!(
            Selector::Exit(NodeKind::Program).kind(),
            NodeKind::Program
        );
        assert!(NodeKind::ArrowFunction.is_function());
        assert!(!NodeKind::CallExpression.is_function());
    }
}
