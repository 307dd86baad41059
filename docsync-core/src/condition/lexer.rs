use std::fmt;

use crate::filter::CompareOp;

/// A lexical unit of a condition expression.
///
/// Operators are read with maximal munch and keywords only match whole words,
/// so no token can be mistaken for part of another.
#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) enum Token<'a> {
    /// `#name`, resolved through the field mapping.
    Field(&'a str),
    /// `:name`, resolved through the parameter mapping.
    Value(&'a str),
    /// Bare text, taken literally.
    Word(&'a str),
    Op(CompareOp),
    And,
    Between,
}

impl fmt::Display for Token<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Token::Field(text) | Token::Value(text) | Token::Word(text) => f.write_str(text),
            Token::Op(op) => write!(f, "{op}"),
            Token::And => f.write_str("AND"),
            Token::Between => f.write_str("BETWEEN"),
        }
    }
}

fn is_operator_char(c: char) -> bool {
    matches!(c, '=' | '<' | '>')
}

fn is_boundary(c: char) -> bool {
    c.is_whitespace() || is_operator_char(c)
}

pub(crate) fn tokenize(input: &str) -> Vec<Token<'_>> {
    let mut tokens = Vec::new();
    let mut chars = input.char_indices().peekable();

    while let Some(&(start, c)) = chars.peek() {
        if c.is_whitespace() {
            chars.next();
            continue;
        }

        if is_operator_char(c) {
            chars.next();
            let followed_by_eq = matches!(chars.peek(), Some((_, '=')));
            let op = match c {
                '>' if followed_by_eq => CompareOp::Gte,
                '<' if followed_by_eq => CompareOp::Lte,
                '>' => CompareOp::Gt,
                '<' => CompareOp::Lt,
                _ => CompareOp::Eq,
            };
            if matches!(op, CompareOp::Gte | CompareOp::Lte) {
                chars.next();
            }
            tokens.push(Token::Op(op));
            continue;
        }

        let mut end = input.len();
        while let Some(&(idx, next)) = chars.peek() {
            if is_boundary(next) {
                end = idx;
                break;
            }
            chars.next();
        }

        let text = &input[start..end];
        tokens.push(match c {
            '#' => Token::Field(text),
            ':' => Token::Value(text),
            _ if text.eq_ignore_ascii_case("and") => Token::And,
            _ if text.eq_ignore_ascii_case("between") => Token::Between,
            _ => Token::Word(text),
        });
    }

    tokens
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reads_compound_operators_whole() {
        assert_eq!(
            tokenize("#a>=:a"),
            vec![Token::Field("#a"), Token::Op(CompareOp::Gte), Token::Value(":a")]
        );
        assert_eq!(
            tokenize("#a <= :a"),
            vec![Token::Field("#a"), Token::Op(CompareOp::Lte), Token::Value(":a")]
        );
        assert_eq!(
            tokenize("#a=>:a"),
            vec![
                Token::Field("#a"),
                Token::Op(CompareOp::Eq),
                Token::Op(CompareOp::Gt),
                Token::Value(":a"),
            ]
        );
    }

    #[test]
    fn keywords_are_case_insensitive_whole_words() {
        assert_eq!(
            tokenize("#brand between :lo aNd :hi"),
            vec![
                Token::Field("#brand"),
                Token::Between,
                Token::Value(":lo"),
                Token::And,
                Token::Value(":hi"),
            ]
        );
        assert_eq!(tokenize("android"), vec![Token::Word("android")]);
    }

    #[test]
    fn blank_input_has_no_tokens() {
        assert!(tokenize("   ").is_empty());
    }
}
