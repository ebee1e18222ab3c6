//! Recursive-descent parser and evaluator for filter predicates.
//!
//! Precedence, loosest first: OR, AND, NOT, comparison, primary. A
//! comparison is non-associative (`a == b == c` is rejected).
//!
//! Evaluation semantics over one row:
//! - unknown columns are schema errors;
//! - `null == null` is true, every ordering comparison involving null is
//!   false;
//! - ordering comparisons between unrelated types (string vs number) are
//!   type errors;
//! - string predicates treat a null subject as not matching.

use super::super::error::{PipelineError, PipelineResult};
use super::super::types::{FieldValue, Row};
use super::ast::{BinaryOperator, Expr};
use super::lexer::{tokenize, Token};
use std::cmp::Ordering;

/// Parse a filter expression into an [`Expr`] tree
pub fn parse_predicate(input: &str) -> PipelineResult<Expr> {
    let tokens = tokenize(input)?;
    if tokens.is_empty() {
        return Err(PipelineError::parse_error("empty filter expression", None));
    }
    let mut parser = Parser { tokens, pos: 0 };
    let expr = parser.parse_or()?;
    if parser.pos < parser.tokens.len() {
        return Err(PipelineError::parse_error(
            format!("unexpected trailing input: {:?}", parser.tokens[parser.pos]),
            None,
        ));
    }
    Ok(expr)
}

/// Evaluate a parsed predicate against one row.
///
/// The expression must come out boolean; anything else is a type error.
pub fn evaluate_predicate(expr: &Expr, row: &Row) -> PipelineResult<bool> {
    match evaluate(expr, row)? {
        FieldValue::Boolean(b) => Ok(b),
        other => Err(PipelineError::type_error(
            "boolean",
            other.type_name(),
            Some(other.to_string()),
        )),
    }
}

struct Parser {
    tokens: Vec<Token>,
    pos: usize,
}

impl Parser {
    fn peek(&self) -> Option<&Token> {
        self.tokens.get(self.pos)
    }

    fn advance(&mut self) -> Option<Token> {
        let token = self.tokens.get(self.pos).cloned();
        if token.is_some() {
            self.pos += 1;
        }
        token
    }

    fn expect(&mut self, expected: &Token) -> PipelineResult<()> {
        match self.advance() {
            Some(ref token) if token == expected => Ok(()),
            Some(token) => Err(PipelineError::parse_error(
                format!("expected {:?}, got {:?}", expected, token),
                None,
            )),
            None => Err(PipelineError::parse_error(
                format!("expected {:?}, got end of expression", expected),
                None,
            )),
        }
    }

    fn parse_or(&mut self) -> PipelineResult<Expr> {
        let mut left = self.parse_and()?;
        while self.peek() == Some(&Token::Or) {
            self.advance();
            let right = self.parse_and()?;
            left = Expr::BinaryOp {
                op: BinaryOperator::Or,
                left: Box::new(left),
                right: Box::new(right),
            };
        }
        Ok(left)
    }

    fn parse_and(&mut self) -> PipelineResult<Expr> {
        let mut left = self.parse_not()?;
        while self.peek() == Some(&Token::And) {
            self.advance();
            let right = self.parse_not()?;
            left = Expr::BinaryOp {
                op: BinaryOperator::And,
                left: Box::new(left),
                right: Box::new(right),
            };
        }
        Ok(left)
    }

    fn parse_not(&mut self) -> PipelineResult<Expr> {
        if self.peek() == Some(&Token::Not) {
            self.advance();
            let inner = self.parse_not()?;
            return Ok(Expr::Not(Box::new(inner)));
        }
        self.parse_comparison()
    }

    fn parse_comparison(&mut self) -> PipelineResult<Expr> {
        let left = self.parse_primary()?;

        let op = match self.peek() {
            Some(Token::Eq) => BinaryOperator::Eq,
            Some(Token::NotEq) => BinaryOperator::NotEq,
            Some(Token::Gt) => BinaryOperator::GreaterThan,
            Some(Token::Ge) => BinaryOperator::GreaterEq,
            Some(Token::Lt) => BinaryOperator::LessThan,
            Some(Token::Le) => BinaryOperator::LessEq,
            _ => return Ok(left),
        };
        self.advance();
        let right = self.parse_primary()?;

        Ok(Expr::BinaryOp {
            op,
            left: Box::new(left),
            right: Box::new(right),
        })
    }

    fn parse_primary(&mut self) -> PipelineResult<Expr> {
        match self.advance() {
            Some(Token::LeftParen) => {
                let inner = self.parse_or()?;
                self.expect(&Token::RightParen)?;
                Ok(inner)
            }
            Some(Token::Identifier(name)) => {
                if self.peek() == Some(&Token::LeftParen) {
                    self.advance();
                    let mut args = Vec::new();
                    if self.peek() != Some(&Token::RightParen) {
                        loop {
                            args.push(self.parse_or()?);
                            if self.peek() == Some(&Token::Comma) {
                                self.advance();
                            } else {
                                break;
                            }
                        }
                    }
                    self.expect(&Token::RightParen)?;
                    Ok(Expr::Function { name, args })
                } else {
                    Ok(Expr::Column(name))
                }
            }
            Some(Token::StringLit(s)) => Ok(Expr::Literal(FieldValue::String(s))),
            Some(Token::IntegerLit(i)) => Ok(Expr::Literal(FieldValue::Integer(i))),
            Some(Token::FloatLit(f)) => Ok(Expr::Literal(FieldValue::Float(f))),
            Some(Token::BooleanLit(b)) => Ok(Expr::Literal(FieldValue::Boolean(b))),
            Some(Token::NullLit) => Ok(Expr::Literal(FieldValue::Null)),
            Some(token) => Err(PipelineError::parse_error(
                format!("unexpected token {:?}", token),
                None,
            )),
            None => Err(PipelineError::parse_error(
                "unexpected end of expression",
                None,
            )),
        }
    }
}

fn evaluate(expr: &Expr, row: &Row) -> PipelineResult<FieldValue> {
    match expr {
        Expr::Literal(value) => Ok(value.clone()),
        Expr::Column(name) => row.get(name).cloned().ok_or_else(|| {
            PipelineError::schema_error("unknown column in filter", Some(name.clone()))
        }),
        Expr::Not(inner) => {
            let value = evaluate(inner, row)?;
            match value {
                FieldValue::Boolean(b) => Ok(FieldValue::Boolean(!b)),
                other => Err(PipelineError::type_error(
                    "boolean",
                    other.type_name(),
                    Some(other.to_string()),
                )),
            }
        }
        Expr::BinaryOp { op, left, right } => match op {
            BinaryOperator::And => {
                let lhs = evaluate_predicate(left, row)?;
                if !lhs {
                    return Ok(FieldValue::Boolean(false));
                }
                Ok(FieldValue::Boolean(evaluate_predicate(right, row)?))
            }
            BinaryOperator::Or => {
                let lhs = evaluate_predicate(left, row)?;
                if lhs {
                    return Ok(FieldValue::Boolean(true));
                }
                Ok(FieldValue::Boolean(evaluate_predicate(right, row)?))
            }
            _ => {
                let lhs = evaluate(left, row)?;
                let rhs = evaluate(right, row)?;
                compare_values(*op, &lhs, &rhs).map(FieldValue::Boolean)
            }
        },
        Expr::Function { name, args } => evaluate_function(name, args, row),
    }
}

fn compare_values(
    op: BinaryOperator,
    left: &FieldValue,
    right: &FieldValue,
) -> PipelineResult<bool> {
    match op {
        BinaryOperator::Eq => Ok(values_equal(left, right)),
        BinaryOperator::NotEq => Ok(!values_equal(left, right)),
        BinaryOperator::GreaterThan
        | BinaryOperator::GreaterEq
        | BinaryOperator::LessThan
        | BinaryOperator::LessEq => {
            // Ordering against null never matches; it is not an error.
            if left.is_null() || right.is_null() {
                return Ok(false);
            }
            let ordering = left.compare(right)?;
            Ok(match op {
                BinaryOperator::GreaterThan => ordering == Ordering::Greater,
                BinaryOperator::GreaterEq => ordering != Ordering::Less,
                BinaryOperator::LessThan => ordering == Ordering::Less,
                BinaryOperator::LessEq => ordering != Ordering::Greater,
                _ => unreachable!(),
            })
        }
        BinaryOperator::And | BinaryOperator::Or => unreachable!(),
    }
}

/// Loose equality: numeric variants compare by value, null equals null,
/// values of unrelated types are simply unequal.
fn values_equal(left: &FieldValue, right: &FieldValue) -> bool {
    use FieldValue::*;

    match (left, right) {
        (Null, Null) => true,
        (Integer(a), Float(b)) | (Float(b), Integer(a)) => (*a as f64) == *b,
        (a, b) => a == b,
    }
}

fn evaluate_function(name: &str, args: &[Expr], row: &Row) -> PipelineResult<FieldValue> {
    match name.to_ascii_lowercase().as_str() {
        "contains" => string_predicate(name, args, row, |s, needle| s.contains(needle)),
        "starts_with" => string_predicate(name, args, row, |s, prefix| s.starts_with(prefix)),
        "ends_with" => string_predicate(name, args, row, |s, suffix| s.ends_with(suffix)),
        _ => Err(PipelineError::parse_error(
            format!("unknown filter function '{}'", name),
            None,
        )),
    }
}

fn string_predicate(
    name: &str,
    args: &[Expr],
    row: &Row,
    test: impl Fn(&str, &str) -> bool,
) -> PipelineResult<FieldValue> {
    if args.len() != 2 {
        return Err(PipelineError::parse_error(
            format!("{}() takes exactly 2 arguments, got {}", name, args.len()),
            None,
        ));
    }

    let subject = evaluate(&args[0], row)?;
    let needle = evaluate(&args[1], row)?;

    let needle = match needle {
        FieldValue::String(s) => s,
        other => {
            return Err(PipelineError::type_error(
                "string",
                other.type_name(),
                Some(other.to_string()),
            ));
        }
    };

    match subject {
        FieldValue::String(s) => Ok(FieldValue::Boolean(test(&s, &needle))),
        FieldValue::Null => Ok(FieldValue::Boolean(false)),
        other => Err(PipelineError::type_error(
            "string",
            other.type_name(),
            Some(other.to_string()),
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(pairs: &[(&str, FieldValue)]) -> Row {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.clone()))
            .collect()
    }

    #[test]
    fn test_comparison_and_logic() {
        let expr = parse_predicate("clicks > 5 AND page == '/a'").unwrap();
        let r = row(&[
            ("clicks", FieldValue::Integer(10)),
            ("page", FieldValue::String("/a".to_string())),
        ]);
        assert!(evaluate_predicate(&expr, &r).unwrap());

        let r2 = row(&[
            ("clicks", FieldValue::Integer(3)),
            ("page", FieldValue::String("/a".to_string())),
        ]);
        assert!(!evaluate_predicate(&expr, &r2).unwrap());
    }

    #[test]
    fn test_precedence_or_binds_loosest() {
        // parsed as (a == 1) OR ((b == 2) AND (c == 3))
        let expr = parse_predicate("a == 1 or b == 2 and c == 3").unwrap();
        let r = row(&[
            ("a", FieldValue::Integer(1)),
            ("b", FieldValue::Integer(0)),
            ("c", FieldValue::Integer(0)),
        ]);
        assert!(evaluate_predicate(&expr, &r).unwrap());
    }

    #[test]
    fn test_contains() {
        let expr = parse_predicate("contains(page, 'blog')").unwrap();
        let r = row(&[("page", FieldValue::String("/blog/post".to_string()))]);
        assert!(evaluate_predicate(&expr, &r).unwrap());
    }

    #[test]
    fn test_contains_null_subject_is_false() {
        let expr = parse_predicate("contains(page, 'blog')").unwrap();
        let r = row(&[("page", FieldValue::Null)]);
        assert!(!evaluate_predicate(&expr, &r).unwrap());
    }

    #[test]
    fn test_unknown_column() {
        let expr = parse_predicate("missing == 1").unwrap();
        let r = row(&[("present", FieldValue::Integer(1))]);
        let err = evaluate_predicate(&expr, &r).unwrap_err();
        assert!(matches!(err, PipelineError::SchemaError { .. }));
    }

    #[test]
    fn test_null_equality_and_ordering() {
        let r = row(&[("v", FieldValue::Null)]);
        let eq = parse_predicate("v == null").unwrap();
        assert!(evaluate_predicate(&eq, &r).unwrap());
        let gt = parse_predicate("v > 0").unwrap();
        assert!(!evaluate_predicate(&gt, &r).unwrap());
    }

    #[test]
    fn test_ordering_type_mismatch_is_error() {
        let expr = parse_predicate("page > 5").unwrap();
        let r = row(&[("page", FieldValue::String("/a".to_string()))]);
        assert!(evaluate_predicate(&expr, &r).is_err());
    }

    #[test]
    fn test_numeric_equality_coercion() {
        let expr = parse_predicate("v == 2").unwrap();
        let r = row(&[("v", FieldValue::Float(2.0))]);
        assert!(evaluate_predicate(&expr, &r).unwrap());
    }

    #[test]
    fn test_non_boolean_result_rejected() {
        let expr = parse_predicate("clicks").unwrap();
        let r = row(&[("clicks", FieldValue::Integer(1))]);
        assert!(evaluate_predicate(&expr, &r).is_err());
    }

    #[test]
    fn test_trailing_tokens_rejected() {
        assert!(parse_predicate("a == 1 b").is_err());
    }
}
