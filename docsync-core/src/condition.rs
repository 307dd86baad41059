//! Translation of placeholder-based condition expressions into [`Filter`]s.
//!
//! A condition holds at most two clauses joined by `AND`. Each clause is either
//! a comparison (`#field OP :value`) or a range (`#field BETWEEN :lo AND :hi`).
//! Field placeholders start with `#`, value placeholders with `:`; both are
//! resolved through caller-supplied mappings before the value is coerced with
//! the field's declared [`AttributeType`](crate::attribute::AttributeType).
//!
//! # Example
//!
//! ```ignore
//! use std::collections::HashMap;
//! use docsync::{attribute::{AttributeTypes, AttributeType}, condition::translate};
//!
//! let fields = HashMap::from([("#age".to_string(), "age".to_string())]);
//! let params = HashMap::from([(":age".to_string(), "10".to_string())]);
//! let types = AttributeTypes::new().with("age", AttributeType::Number);
//!
//! let filter = translate("#age > :age", &fields, &params, &types)?;
//! ```

mod lexer;

use std::collections::HashMap;

use crate::{
    attribute::AttributeTypes,
    error::{DocSyncError, DocSyncResult},
    filter::{Condition, Filter},
};

use self::lexer::{Token, tokenize};

const MAX_CLAUSES: usize = 2;

/// Translates a condition expression in one call.
///
/// See [`ConditionTranslator::translate`].
pub fn translate(
    expression: &str,
    field_mapping: &HashMap<String, String>,
    param_mapping: &HashMap<String, String>,
    attribute_types: &AttributeTypes,
) -> DocSyncResult<Filter> {
    ConditionTranslator::new(field_mapping, param_mapping, attribute_types).translate(expression)
}

/// Condition translator bound to one set of placeholder mappings and attribute types.
#[derive(Debug, Clone, Copy)]
pub struct ConditionTranslator<'a> {
    field_mapping: &'a HashMap<String, String>,
    param_mapping: &'a HashMap<String, String>,
    attribute_types: &'a AttributeTypes,
}

impl<'a> ConditionTranslator<'a> {
    pub fn new(
        field_mapping: &'a HashMap<String, String>,
        param_mapping: &'a HashMap<String, String>,
        attribute_types: &'a AttributeTypes,
    ) -> Self {
        Self { field_mapping, param_mapping, attribute_types }
    }

    /// Parses `expression` into a filter.
    ///
    /// A blank expression yields an empty filter. When both clauses name the
    /// same field, the second clause wins.
    ///
    /// # Errors
    ///
    /// Returns [`DocSyncError::Validation`] for empty clauses, more than two
    /// clauses, missing or repeated operators, malformed `BETWEEN` clauses,
    /// unresolved placeholders, undeclared attributes and non-numeric numbers.
    pub fn translate(&self, expression: &str) -> DocSyncResult<Filter> {
        let tokens = tokenize(expression);
        let mut filter = Filter::new();

        for clause in split_clauses(&tokens, expression)? {
            let (field, condition) = self.translate_clause(clause)?;
            filter.insert(field, condition);
        }

        Ok(filter)
    }

    fn translate_clause(&self, clause: &[Token<'_>]) -> DocSyncResult<(String, Condition)> {
        if clause.contains(&Token::Between) {
            return self.translate_between(clause);
        }

        let operators = clause
            .iter()
            .filter(|token| matches!(token, Token::Op(_)))
            .count();

        match (operators, clause) {
            (0, _) => Err(DocSyncError::validation(format!(
                "Unrecognized comparison query operators: {}",
                render(clause)
            ))),
            (1, [left, Token::Op(op), right]) => {
                let field = self.resolve(left, clause)?.to_string();
                let value = self
                    .attribute_types
                    .typed_value(&field, self.resolve(right, clause)?)?;

                Ok((field, Condition::Compare { op: *op, value }))
            }
            _ => Err(DocSyncError::validation(format!(
                "Invalid compare expression: {}",
                render(clause)
            ))),
        }
    }

    fn translate_between(&self, clause: &[Token<'_>]) -> DocSyncResult<(String, Condition)> {
        let [left, Token::Between, low, Token::And, high] = clause else {
            return Err(DocSyncError::validation(format!(
                "Invalid between compare expression: {}",
                render(clause)
            )));
        };

        let field = self.resolve(left, clause)?.to_string();
        let low = self
            .attribute_types
            .typed_value(&field, self.resolve(low, clause)?)?;
        let high = self
            .attribute_types
            .typed_value(&field, self.resolve(high, clause)?)?;

        Ok((field, Condition::Between { low, high }))
    }

    fn resolve<'t>(&'t self, token: &Token<'t>, clause: &[Token<'_>]) -> DocSyncResult<&'t str> {
        match *token {
            Token::Field(placeholder) => self
                .field_mapping
                .get(placeholder)
                .map(String::as_str)
                .ok_or_else(|| {
                    DocSyncError::validation(format!("Unknown field placeholder: {placeholder}"))
                }),
            Token::Value(placeholder) => self
                .param_mapping
                .get(placeholder)
                .map(String::as_str)
                .ok_or_else(|| {
                    DocSyncError::validation(format!("Unknown value placeholder: {placeholder}"))
                }),
            Token::Word(text) => Ok(text),
            Token::Op(_) | Token::And | Token::Between => Err(DocSyncError::validation(format!(
                "Invalid compare expression: {}",
                render(clause)
            ))),
        }
    }
}

/// Splits the token stream on top-level `AND`s.
///
/// The `AND` that closes a `BETWEEN` range belongs to its clause.
fn split_clauses<'t, 'a>(
    tokens: &'t [Token<'a>],
    expression: &str,
) -> DocSyncResult<Vec<&'t [Token<'a>]>> {
    if tokens.is_empty() {
        return Ok(Vec::new());
    }

    let mut clauses = Vec::new();
    let mut start = 0;
    let mut open_between = false;

    for (idx, token) in tokens.iter().enumerate() {
        match token {
            Token::Between => open_between = true,
            Token::And if open_between => open_between = false,
            Token::And => {
                clauses.push(&tokens[start..idx]);
                start = idx + 1;
            }
            _ => {}
        }
    }
    clauses.push(&tokens[start..]);

    if clauses.iter().any(|clause| clause.is_empty()) {
        return Err(DocSyncError::validation(format!(
            "Query condition has an empty clause: {}",
            expression.trim()
        )));
    }
    if clauses.len() > MAX_CLAUSES {
        return Err(DocSyncError::validation(format!(
            "Query condition allows at most {MAX_CLAUSES} clauses: {}",
            expression.trim()
        )));
    }

    Ok(clauses)
}

fn render(clause: &[Token<'_>]) -> String {
    clause
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(" ")
}
