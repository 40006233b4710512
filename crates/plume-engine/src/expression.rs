use crate::ast::{Expr, ParseError};
use crate::error::EvalError;
use crate::eval;
use crate::parser;
use crate::selection::SelectionSource;
use crate::variable::{Variable, VariableTable};

/// A named unit of user-authored formula text plus its compiled tree and
/// discovered variables.
///
/// Lifecycle: the host sets `text` (and optionally `name`), calls
/// [`Expression::parse`], pushes live values into the discovered variables
/// with [`Expression::set_variable`], then calls [`Expression::evaluate`].
/// Each parse replaces the tree and variable table atomically; a failed parse
/// leaves no partial state behind.
#[derive(Debug, Clone, Default)]
pub struct Expression {
    name: String,
    text: String,
    tree: Option<Expr>,
    variables: VariableTable,
    parse_error: Option<ParseError>,
}

impl Expression {
    #[must_use]
    pub fn new(name: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            text: text.into(),
            tree: None,
            variables: VariableTable::new(),
            parse_error: None,
        }
    }

    pub fn set_name(&mut self, name: impl Into<String>) {
        self.name = name.into();
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Replace the formula text. The compiled tree is untouched until the
    /// next [`Expression::parse`] call.
    pub fn set_text(&mut self, text: impl Into<String>) {
        self.text = text.into();
    }

    #[must_use]
    pub fn text(&self) -> &str {
        &self.text
    }

    /// Compile the current text, discovering and registering variables.
    ///
    /// On failure the previous tree and table are discarded in full and the
    /// error is retained for caret-style display.
    pub fn parse(&mut self, selection: &dyn SelectionSource) -> Result<(), ParseError> {
        self.tree = None;
        self.variables = VariableTable::new();
        self.parse_error = None;

        match parser::parse(&self.text, selection) {
            Ok((tree, variables)) => {
                self.tree = Some(tree);
                self.variables = variables;
                Ok(())
            }
            Err(err) => {
                self.parse_error = Some(err.clone());
                Err(err)
            }
        }
    }

    #[must_use]
    pub fn is_parsed(&self) -> bool {
        self.tree.is_some()
    }

    /// Message of the last parse failure, if the last parse failed.
    #[must_use]
    pub fn error_message(&self) -> Option<&str> {
        self.parse_error.as_ref().map(|e| e.message.as_str())
    }

    /// Character offset of the last parse failure, for caret display.
    #[must_use]
    pub fn error_position(&self) -> Option<usize> {
        self.parse_error.as_ref().map(ParseError::position)
    }

    #[must_use]
    pub fn variable_count(&self) -> usize {
        self.variables.len()
    }

    /// Discovered variable at `index`, in first-reference order.
    #[must_use]
    pub fn variable_at(&self, index: usize) -> Option<&Variable> {
        self.variables.get(index)
    }

    /// Set a discovered variable by name (case-insensitive). Names the
    /// formula never referenced are silently ignored.
    pub fn set_variable(&mut self, name: &str, value: f64) {
        self.variables.set(name, value);
    }

    #[must_use]
    pub fn variables(&self) -> &VariableTable {
        &self.variables
    }

    /// Compute the formula against the current variable values.
    pub fn evaluate(&self) -> Result<f64, EvalError> {
        let tree = self.tree.as_ref().ok_or(EvalError::NotParsed)?;
        eval::evaluate(tree, &self.variables)
    }
}
