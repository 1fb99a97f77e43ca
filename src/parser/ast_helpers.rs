//! Node-shape predicates and tree-walking helpers shared by the detection
//! engine and the rules.
//!
//! Predicates take `impl Into<Option<Node>>`, so `is_call_expression(node)` and
//! `is_call_expression(node.parent())` both work and a missing node is simply
//! `false`. Walkers follow parent links and return `None` at the root.

use super::node_kind::NodeKind;
use crate::Location;
use tree_sitter::Node;

macro_rules! kind_predicates {
    ($($(#[$doc:meta])* $name:ident => $($kind:ident)|+;)*) => {
        $(
            $(#[$doc])*
            pub fn $name<'a>(node: impl Into<Option<Node<'a>>>) -> bool {
                node.into()
                    .is_some_and(|n| matches!(NodeKind::of(n), $(NodeKind::$kind)|+))
            }
        )*
    };
}

kind_predicates! {
    is_call_expression => CallExpression;
    is_new_expression => NewExpression;
    is_member_expression => MemberExpression;
    /// Any identifier-like node: plain, property or shorthand
    is_identifier => Identifier;
    is_import_declaration => ImportDeclaration;
    is_import_specifier => ImportSpecifier;
    is_import_namespace_specifier => NamespaceImport;
    is_variable_declaration => VariableDeclaration;
    is_variable_declarator => VariableDeclarator;
    is_object_pattern => ObjectPattern;
    is_expression_statement => ExpressionStatement;
    is_return_statement => ReturnStatement;
    is_block_statement => BlockStatement;
    is_await_expression => AwaitExpression;
    is_assignment_expression => AssignmentExpression;
    is_sequence_expression => SequenceExpression;
    is_arrow_function => ArrowFunction;
    is_function_expression => FunctionExpression;
    is_function_declaration => FunctionDeclaration;
    is_function => ArrowFunction | FunctionExpression | FunctionDeclaration | MethodDefinition;
    is_string_literal => StringLiteral;
    is_template_literal => TemplateLiteral;
    is_regex_literal => RegexLiteral;
    is_literal => StringLiteral | TemplateLiteral | RegexLiteral | NumberLiteral;
    is_object_expression => ObjectExpression;
    is_property => Property;
    is_array_expression => ArrayExpression;
    is_jsx_attribute => JsxAttribute;
}

/// Source text of a node
pub fn text<'s>(node: Node<'_>, source: &'s str) -> &'s str {
    node.utf8_text(source.as_bytes()).unwrap_or("")
}

/// Name of an identifier-like node
pub fn identifier_name<'s>(node: Node<'_>, source: &'s str) -> Option<&'s str> {
    is_identifier(node).then(|| text(node, source))
}

/// True if `node` is an identifier-like node named `name`
pub fn is_identifier_named<'a>(node: impl Into<Option<Node<'a>>>, name: &str, source: &str) -> bool {
    node.into()
        .and_then(|n| identifier_name(n, source))
        .is_some_and(|n| n == name)
}

/// Named children, comments excluded
pub fn named_children<'a>(node: Node<'a>) -> Vec<Node<'a>> {
    let mut cursor = node.walk();
    let children = node
        .named_children(&mut cursor)
        .filter(|c| !c.is_extra())
        .collect();
    children
}

/// First named child that is not a comment
pub fn first_named_child<'a>(node: Node<'a>) -> Option<Node<'a>> {
    let mut cursor = node.walk();
    let first = node.named_children(&mut cursor).find(|c| !c.is_extra());
    first
}

/// Ancestors of `node`, nearest first
pub fn ancestors<'a>(node: Node<'a>) -> impl Iterator<Item = Node<'a>> {
    std::iter::successors(node.parent(), |n| n.parent())
}

/// Skip any wrapping parentheses
pub fn unwrap_parens(mut node: Node<'_>) -> Node<'_> {
    while NodeKind::of(node) == NodeKind::ParenthesizedExpression {
        match first_named_child(node) {
            Some(inner) => node = inner,
            None => break,
        }
    }
    node
}

pub fn call_callee<'a>(call: Node<'a>) -> Option<Node<'a>> {
    match NodeKind::of(call) {
        NodeKind::CallExpression => call.child_by_field_name("function"),
        NodeKind::NewExpression => call.child_by_field_name("constructor"),
        _ => None,
    }
}

/// Call arguments in order. Tagged templates have none.
pub fn call_arguments<'a>(call: Node<'a>) -> Vec<Node<'a>> {
    call.child_by_field_name("arguments")
        .filter(|args| NodeKind::of(*args) == NodeKind::Arguments)
        .map(named_children)
        .unwrap_or_default()
}

/// The call (or `new`) expression that takes `node` as an argument
pub fn call_of_argument<'a>(node: Node<'a>) -> Option<Node<'a>> {
    let args = node.parent().filter(|p| NodeKind::of(*p) == NodeKind::Arguments)?;
    args.parent()
        .filter(|c| is_call_expression(*c) || is_new_expression(*c))
}

/// True if `node` is the callee of its parent call
pub fn is_callee(node: Node<'_>) -> bool {
    node.parent()
        .filter(|p| is_call_expression(*p))
        .and_then(|p| p.child_by_field_name("function"))
        .is_some_and(|f| f.id() == node.id())
}

pub fn member_object<'a>(member: Node<'a>) -> Option<Node<'a>> {
    match NodeKind::of(member) {
        NodeKind::MemberExpression | NodeKind::SubscriptExpression => {
            member.child_by_field_name("object")
        }
        _ => None,
    }
}

pub fn member_property<'a>(member: Node<'a>) -> Option<Node<'a>> {
    if is_member_expression(member) {
        member.child_by_field_name("property")
    } else {
        None
    }
}

/// Name of a non-computed member property
pub fn member_property_name<'s>(member: Node<'_>, source: &'s str) -> Option<&'s str> {
    member_property(member).and_then(|p| identifier_name(p, source))
}

/// Expression of an expression statement, argument of await/return
pub fn inner_expression<'a>(node: Node<'a>) -> Option<Node<'a>> {
    match NodeKind::of(node) {
        NodeKind::ExpressionStatement | NodeKind::AwaitExpression | NodeKind::ReturnStatement => {
            first_named_child(node)
        }
        _ => None,
    }
}

pub fn function_body<'a>(function: Node<'a>) -> Option<Node<'a>> {
    if NodeKind::of(function).is_function() {
        function.child_by_field_name("body")
    } else {
        None
    }
}

pub fn is_async_function(function: Node<'_>) -> bool {
    let mut cursor = function.walk();
    let is_async = function.children(&mut cursor).any(|c| c.kind() == "async");
    is_async
}

/// Statements of a block, comments excluded
pub fn block_statements<'a>(block: Node<'a>) -> Vec<Node<'a>> {
    if is_block_statement(block) {
        named_children(block)
    } else {
        Vec::new()
    }
}

/// `variable_declarator` children of a declaration
pub fn declarators<'a>(declaration: Node<'a>) -> Vec<Node<'a>> {
    named_children(declaration)
        .into_iter()
        .filter(|n| is_variable_declarator(*n))
        .collect()
}

/// Value of a string literal, or of a template literal without substitutions
pub fn string_value<'s>(node: Node<'_>, source: &'s str) -> Option<&'s str> {
    let raw = text(node, source);
    match NodeKind::of(node) {
        NodeKind::StringLiteral => {}
        NodeKind::TemplateLiteral => {
            let mut cursor = node.walk();
            let has_substitution = node
                .named_children(&mut cursor)
                .any(|c| c.kind() == "template_substitution");
            if has_substitution {
                return None;
            }
        }
        _ => return None,
    }
    if raw.len() < 2 {
        return None;
    }
    raw.get(1..raw.len() - 1)
}

/// Flags of a regex literal (`gi` in `/x/gi`)
pub fn regex_flags<'s>(node: Node<'_>, source: &'s str) -> Option<&'s str> {
    if !is_regex_literal(node) {
        return None;
    }
    Some(
        node.child_by_field_name("flags")
            .map(|f| text(f, source))
            .unwrap_or(""),
    )
}

/// Key name of an object property (`pair`) or shorthand entry
pub fn property_key_name<'s>(property: Node<'_>, source: &'s str) -> Option<&'s str> {
    match property.kind() {
        "pair" | "pair_pattern" => {
            let key = property.child_by_field_name("key")?;
            match key.kind() {
                "property_identifier" | "identifier" => Some(text(key, source)),
                "string" => string_value(key, source),
                _ => None,
            }
        }
        "shorthand_property_identifier" | "shorthand_property_identifier_pattern" => {
            Some(text(property, source))
        }
        "object_assignment_pattern" => property
            .child_by_field_name("left")
            .map(|l| text(l, source)),
        _ => None,
    }
}

/// Value node of an object property or pattern entry (the node itself for shorthands)
pub fn property_value<'a>(property: Node<'a>) -> Option<Node<'a>> {
    match property.kind() {
        "pair" | "pair_pattern" => property.child_by_field_name("value"),
        "shorthand_property_identifier" | "shorthand_property_identifier_pattern" => Some(property),
        "object_assignment_pattern" => property.child_by_field_name("left"),
        _ => None,
    }
}

/// Root identifier of an identifier / member / call / expression-statement chain:
/// `fireEvent` for `fireEvent.click(el)`.
pub fn get_property_identifier<'a>(node: Node<'a>) -> Option<Node<'a>> {
    match NodeKind::of(node) {
        NodeKind::Identifier => Some(node),
        NodeKind::MemberExpression => get_property_identifier(member_object(node)?),
        NodeKind::CallExpression => get_property_identifier(call_callee(node)?),
        NodeKind::ExpressionStatement => get_property_identifier(inner_expression(node)?),
        _ => None,
    }
}

/// Deepest identifier a call resolves to: `click` for `fireEvent.click(el)`,
/// `findByText` for `await screen.findByText('x')`.
pub fn get_deepest_identifier<'a>(node: Node<'a>) -> Option<Node<'a>> {
    match NodeKind::of(node) {
        NodeKind::Identifier => Some(node),
        NodeKind::MemberExpression => member_property(node).filter(|p| is_identifier(*p)),
        NodeKind::CallExpression => get_deepest_identifier(call_callee(node)?),
        NodeKind::AwaitExpression => get_deepest_identifier(inner_expression(node)?),
        _ => None,
    }
}

/// Outermost member/call chain containing `node`
pub fn get_reference_node(node: Node<'_>) -> Node<'_> {
    let mut current = node;
    while let Some(parent) = current.parent() {
        if is_member_expression(parent) || is_call_expression(parent) {
            current = parent;
        } else {
            break;
        }
    }
    current
}

/// Nearest call expression at or above `node`. With `restrict_inner_scope`
/// the walk stops at function and block boundaries.
pub fn find_closest_call_expression(node: Node<'_>, restrict_inner_scope: bool) -> Option<Node<'_>> {
    let mut current = node;
    loop {
        if is_call_expression(current) {
            return Some(current);
        }
        let parent = current.parent()?;
        if restrict_inner_scope
            && (is_arrow_function(current)
                || is_function_expression(current)
                || is_block_statement(current))
        {
            return None;
        }
        current = parent;
    }
}

pub fn find_closest_variable_declarator(node: Node<'_>) -> Option<Node<'_>> {
    std::iter::once(node)
        .chain(ancestors(node))
        .find(|n| is_variable_declarator(*n))
}

/// Nearest arrow function, function expression or function declaration
pub fn find_closest_function(node: Node<'_>) -> Option<Node<'_>> {
    std::iter::once(node).chain(ancestors(node)).find(|n| {
        matches!(
            NodeKind::of(*n),
            NodeKind::ArrowFunction | NodeKind::FunctionExpression | NodeKind::FunctionDeclaration
        )
    })
}

/// Nearest call whose callee is the identifier `name`
pub fn find_closest_call_named<'a>(node: Node<'a>, name: &str, source: &str) -> Option<Node<'a>> {
    let mut current = node;
    loop {
        let parent = current.parent()?;
        if is_call_expression(current)
            && call_callee(current).is_some_and(|c| is_identifier_named(c, name, source))
        {
            return Some(current);
        }
        current = parent;
    }
}

/// Nearest enclosing statement whose parent is a block or the program
pub fn enclosing_statement(node: Node<'_>) -> Option<Node<'_>> {
    std::iter::once(node).chain(ancestors(node)).find(|n| {
        n.parent().is_some_and(|p| {
            matches!(NodeKind::of(p), NodeKind::BlockStatement | NodeKind::Program)
        })
    })
}

/// True for an arrow or function expression with an empty block body
pub fn is_empty_function(node: Node<'_>) -> bool {
    match NodeKind::of(node) {
        NodeKind::ArrowFunction | NodeKind::FunctionExpression => function_body(node)
            .filter(|b| is_block_statement(*b))
            .is_some_and(|b| block_statements(b).is_empty()),
        _ => false,
    }
}

/// Call expression carried by a statement: `foo()`, `await foo()`,
/// `x = foo()`, `return foo()`, `const x = foo()`.
pub fn get_statement_call_expression(statement: Node<'_>) -> Option<Node<'_>> {
    fn call_or_awaited_call(node: Node<'_>) -> Option<Node<'_>> {
        let node = unwrap_parens(node);
        if is_call_expression(node) {
            return Some(node);
        }
        if is_await_expression(node) {
            return inner_expression(node).filter(|n| is_call_expression(*n));
        }
        None
    }

    match NodeKind::of(statement) {
        NodeKind::ExpressionStatement => {
            let expression = inner_expression(statement)?;
            if is_assignment_expression(expression) {
                return call_or_awaited_call(expression.child_by_field_name("right")?);
            }
            call_or_awaited_call(expression)
        }
        NodeKind::ReturnStatement => {
            inner_expression(statement).filter(|n| is_call_expression(*n))
        }
        NodeKind::VariableDeclaration => declarators(statement)
            .into_iter()
            .filter_map(|d| d.child_by_field_name("value"))
            .find(|v| is_call_expression(*v)),
        _ => None,
    }
}

/// Expression returned by a function: the first top-level `return` of a
/// block body, or the expression body of an arrow.
pub fn get_function_return_expression(function: Node<'_>) -> Option<Node<'_>> {
    let body = function_body(function)?;
    if is_block_statement(body) {
        let ret = block_statements(body)
            .into_iter()
            .find(|s| is_return_statement(*s))?;
        return inner_expression(ret);
    }
    is_arrow_function(function).then_some(body)
}

/// Innermost function around `identifier` whose returned expression ends in
/// an identifier of the same name, i.e. a wrapper returning that call.
pub fn get_innermost_returning_function<'a>(identifier: Node<'a>, source: &str) -> Option<Node<'a>> {
    let function = ancestors(identifier).find(|n| NodeKind::of(*n).is_function())?;
    let returned = get_function_return_expression(function)?;
    let returned_identifier = get_deepest_identifier(returned)?;
    (text(returned_identifier, source) == text(identifier, source)).then_some(function)
}

/// Name a function is known by: its own name, or the variable, property or
/// assignment target it is bound to. Empty when anonymous.
pub fn get_function_name(function: Node<'_>, source: &str) -> String {
    if let Some(name) = function.child_by_field_name("name") {
        return text(name, source).to_string();
    }
    let Some(parent) = function.parent() else {
        return String::new();
    };
    let bound = match NodeKind::of(parent) {
        NodeKind::VariableDeclarator => parent
            .child_by_field_name("name")
            .filter(|n| is_identifier(*n)),
        NodeKind::Property => parent.child_by_field_name("key"),
        NodeKind::AssignmentExpression => parent
            .child_by_field_name("left")
            .filter(|n| is_identifier(*n)),
        _ => None,
    };
    bound
        .map(|n| text(n, source).to_string())
        .unwrap_or_default()
}

/// Name of the function that wraps and returns the call at `identifier`
pub fn get_wrapper_function_name(identifier: Node<'_>, source: &str) -> Option<String> {
    let function = get_innermost_returning_function(identifier, source)?;
    let name = get_function_name(function, source);
    (!name.is_empty()).then_some(name)
}

/// True when `node` sits somewhere inside a call expression
pub fn has_call_ancestor(node: Node<'_>) -> bool {
    ancestors(node).any(|n| is_call_expression(n))
}

pub fn has_then_property(node: Node<'_>, source: &str) -> bool {
    member_property_name(node, source) == Some("then")
}

/// `wait(...).then(...)` or `promise.then(...)`
pub fn has_chained_then(node: Node<'_>, source: &str) -> bool {
    let Some(parent) = node.parent() else {
        return false;
    };
    if is_call_expression(parent) {
        return parent
            .parent()
            .is_some_and(|grand| has_then_property(grand, source));
    }
    has_then_property(parent, source)
}

fn is_promise_combinator(call: Node<'_>, source: &str) -> bool {
    let Some(callee) = call_callee(call) else {
        return false;
    };
    is_member_expression(callee)
        && member_object(callee).is_some_and(|o| is_identifier_named(o, "Promise", source))
        && matches!(member_property_name(callee, source), Some("all" | "allSettled"))
}

/// Element of an array handed to `Promise.all` / `Promise.allSettled`
pub fn is_promises_array_resolved(node: Node<'_>, source: &str) -> bool {
    if find_closest_call_expression(node, true).is_none() {
        return false;
    }
    node.parent()
        .filter(|p| is_array_expression(*p))
        .and_then(call_of_argument)
        .is_some_and(|call| is_call_expression(call) && is_promise_combinator(call, source))
}

/// True when `node` sits inside `expect(...).resolves` / `.rejects`
pub fn has_closest_expect_resolves_rejects(node: Node<'_>, source: &str) -> bool {
    std::iter::once(node).chain(ancestors(node)).any(|n| {
        is_call_expression(n)
            && call_callee(n).is_some_and(|c| is_identifier_named(c, "expect", source))
            && n.parent()
                .filter(|p| is_member_expression(*p))
                .and_then(|p| member_property_name(p, source))
                .is_some_and(|m| m == "resolves" || m == "rejects")
    })
}

/// Whether the promise produced at `identifier` is awaited, returned, chained
/// with `.then`, asserted with `resolves`/`rejects` or collected by `Promise.all`.
pub fn is_promise_handled(identifier: Node<'_>, source: &str) -> bool {
    let closest_call = find_closest_call_expression(identifier, true);
    std::iter::once(identifier).chain(closest_call).any(|node| {
        let Some(parent) = node.parent() else {
            return false;
        };
        is_await_expression(parent)
            || is_arrow_function(parent)
            || is_return_statement(parent)
            || has_closest_expect_resolves_rejects(parent, source)
            || has_chained_then(node, source)
            || is_promises_array_resolved(node, source)
    })
}

/// Matcher of an `expect(x).matcher` / `expect(x).not.matcher` member
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AssertNodeInfo<'s> {
    pub matcher: &'s str,
    pub is_negated: bool,
}

pub fn get_assert_node_info<'s>(member: Node<'_>, source: &'s str) -> Option<AssertNodeInfo<'s>> {
    let property = member_property_name(member, source)?;
    if property != "not" {
        return Some(AssertNodeInfo {
            matcher: property,
            is_negated: false,
        });
    }
    let matcher = member
        .parent()
        .filter(|p| is_member_expression(*p))
        .and_then(|p| member_property_name(p, source))?;
    Some(AssertNodeInfo {
        matcher,
        is_negated: true,
    })
}

/// Leading whitespace of the line containing `byte`
pub fn line_indent(source: &str, byte: usize) -> &str {
    let line_start = source[..byte].rfind('\n').map(|i| i + 1).unwrap_or(0);
    let line = &source[line_start..];
    let indent_len = line.len() - line.trim_start_matches([' ', '\t']).len();
    &line[..indent_len.min(byte - line_start)]
}

/// Byte range covering `statement` and the whitespace separating it from the
/// previous sibling, so removing it leaves the surrounding layout intact
pub fn statement_removal_range(statement: Node<'_>) -> (usize, usize) {
    let start = statement
        .prev_sibling()
        .map(|p| p.end_byte())
        .unwrap_or_else(|| statement.start_byte());
    (start, statement.end_byte())
}

/// Convert a tree-sitter Node to Location.
pub fn node_to_location(node: Node) -> Location {
    Location::new(
        node.start_position().row + 1,
        node.start_position().column + 1,
    )
    .with_end(node.end_position().row + 1, node.end_position().column + 1)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::test_support::{find_node, find_node_with_text, find_nth_identifier, parse};

    #[test]
    fn predicates_accept_missing_nodes() {
        let tree = parse("foo();");
        let root = tree.root_node();
        assert!(!is_call_expression(root.parent()));
        assert!(!is_identifier(None));
        assert!(!is_member_expression(root));
    }

    #[test]
    fn deepest_and_root_identifiers() {
        let source = "fireEvent.click(el);";
        let tree = parse(source);
        let call = find_node(tree.root_node(), "call_expression").unwrap();
        let deepest = get_deepest_identifier(call).unwrap();
        assert_eq!(text(deepest, source), "click");
        let root = get_property_identifier(call).unwrap();
        assert_eq!(text(root, source), "fireEvent");
    }

    #[test]
    fn deepest_identifier_through_await() {
        let source = "async () => { await screen.findByText('x'); }";
        let tree = parse(source);
        let awaited = find_node(tree.root_node(), "await_expression").unwrap();
        let deepest = get_deepest_identifier(awaited).unwrap();
        assert_eq!(text(deepest, source), "findByText");
    }

    #[test]
    fn reference_node_stops_at_arguments() {
        let source = "expect(screen.getByText('x')).toBeInTheDocument();";
        let tree = parse(source);
        let query = find_nth_identifier(tree.root_node(), source, "getByText", 0).unwrap();
        let reference = get_reference_node(query);
        assert_eq!(text(reference, source), "screen.getByText('x')");
    }

    #[test]
    fn closest_call_restricted_to_scope() {
        let source = "waitFor(() => { a; });";
        let tree = parse(source);
        let a = find_nth_identifier(tree.root_node(), source, "a", 0).unwrap();
        assert!(find_closest_call_expression(a, true).is_none());
        let outer = find_closest_call_expression(a, false).unwrap();
        assert_eq!(text(call_callee(outer).unwrap(), source), "waitFor");
    }

    #[test]
    fn promise_handling_shapes() {
        let cases = [
            ("async () => { await findByText('a'); }", true),
            ("() => findByText('a')", true),
            ("function f() { return findByText('a'); }", true),
            ("findByText('a').then(() => {});", true),
            ("async () => { await expect(findByText('a')).resolves.toBeTruthy(); }", true),
            ("async () => { await Promise.all([findByText('a')]); }", true),
            ("() => { findByText('a'); }", false),
        ];
        for (source, expected) in cases {
            let tree = parse(source);
            let id = find_nth_identifier(tree.root_node(), source, "findByText", 0).unwrap();
            assert_eq!(is_promise_handled(id, source), expected, "{}", source);
        }
    }

    #[test]
    fn assert_info_handles_negation() {
        let source = "expect(a).not.toBeNull();";
        let tree = parse(source);
        let not_member =
            find_node_with_text(tree.root_node(), "member_expression", "expect(a).not", source)
                .unwrap();
        let info = get_assert_node_info(not_member, source).unwrap();
        assert_eq!(info.matcher, "toBeNull");
        assert!(info.is_negated);
    }

    #[test]
    fn string_values() {
        let source = "require('a'); require(`b`); require(`c${d}`);";
        let tree = parse(source);
        let strings: Vec<_> = {
            let mut out = Vec::new();
            collect(tree.root_node(), &mut out);
            out
        };
        let values: Vec<_> = strings.iter().map(|n| string_value(*n, source)).collect();
        assert_eq!(values, vec![Some("a"), Some("b"), None]);

        fn collect<'a>(node: Node<'a>, out: &mut Vec<Node<'a>>) {
            if matches!(node.kind(), "string" | "template_string") {
                out.push(node);
                return;
            }
            for child in named_children(node) {
                collect(child, out);
            }
        }
    }

    #[test]
    fn wrapper_function_name() {
        let source = "const clickIt = (el) => fireEvent.click(el);";
        let tree = parse(source);
        let click = find_nth_identifier(tree.root_node(), source, "click", 0).unwrap();
        let wrapper = get_innermost_returning_function(click, source).unwrap();
        assert_eq!(get_function_name(wrapper, source), "clickIt");
    }

    #[test]
    fn empty_function_detection() {
        let source = "act(() => {}); act(() => { /* nothing */ }); act(() => { x(); });";
        let tree = parse(source);
        let mut arrows = Vec::new();
        for stmt in named_children(tree.root_node()) {
            let call = inner_expression(stmt).unwrap();
            arrows.push(call_arguments(call)[0]);
        }
        let empties: Vec<bool> = arrows.into_iter().map(is_empty_function).collect();
        assert_eq!(empties, vec![true, true, false]);
    }

    #[test]
    fn indent_of_line() {
        let source = "a;\n    b;";
        assert_eq!(line_indent(source, source.find('b').unwrap()), "    ");
        assert_eq!(line_indent(source, 0), "");
    }
}
