//! TypeScript parser using tree-sitter

use anyhow::{Context, Result};
use std::path::Path;
use tree_sitter::{Language, Parser, Tree};

/// Parser for TypeScript and JavaScript files using tree-sitter
pub struct TypeScriptParser {
    parser: Parser,
}

impl TypeScriptParser {
    /// Create a new TypeScript parser
    pub fn new() -> Result<Self> {
        let mut parser = Parser::new();
        parser
            .set_language(&Self::language())
            .context("Failed to set TypeScript language")?;
        Ok(Self { parser })
    }

    /// Create a new TSX parser
    pub fn new_tsx() -> Result<Self> {
        let mut parser = Parser::new();
        parser
            .set_language(&Self::language_tsx())
            .context("Failed to set TSX language")?;
        Ok(Self { parser })
    }

    /// Create a parser based on file extension. Plain JavaScript goes through
    /// the TSX grammar so JSX in `.js` test files parses.
    pub fn for_file(path: &Path) -> Result<Self> {
        let ext = path.extension().and_then(|e| e.to_str()).unwrap_or("");

        match ext {
            "ts" | "mts" | "cts" => Self::new(),
            _ => Self::new_tsx(),
        }
    }

    /// Parse source code into a syntax tree
    pub fn parse(&mut self, source: &str) -> Result<Tree> {
        self.parser
            .parse(source, None)
            .context("Failed to parse TypeScript source")
    }

    /// Get the tree-sitter language for TypeScript
    pub fn language() -> Language {
        tree_sitter_typescript::LANGUAGE_TYPESCRIPT.into()
    }

    /// Get the tree-sitter language for TSX
    pub fn language_tsx() -> Language {
        tree_sitter_typescript::LANGUAGE_TSX.into()
    }
}
