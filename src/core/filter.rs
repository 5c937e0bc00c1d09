//! String-encoded boolean predicate trees
//!
//! The filter grammar is compact enough to travel in a query parameter:
//!
//! - Leaf: `field:comparator:value` (exactly three colon-delimited segments)
//! - Composite: `and(...)`, `or(...)`, `not(...)` over a comma-separated
//!   list of child filters, nested arbitrarily
//!
//! Values stay untyped strings at this layer; the storage adapter coerces
//! them against the target field's declared kind. Child lists are split on
//! top-level commas only, so nested composites keep their own commas.

use crate::core::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Leaf comparison operator
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Comparator {
    Eq,
    Ne,
    Gt,
    Ge,
    Lt,
    Le,
    Like,
    NotLike,
    In,
    NotIn,
    IsNull,
    IsNotNull,
}

impl Comparator {
    /// The wire name used inside filter strings
    pub fn as_str(&self) -> &'static str {
        match self {
            Comparator::Eq => "eq",
            Comparator::Ne => "ne",
            Comparator::Gt => "gt",
            Comparator::Ge => "ge",
            Comparator::Lt => "lt",
            Comparator::Le => "le",
            Comparator::Like => "like",
            Comparator::NotLike => "not_like",
            Comparator::In => "in",
            Comparator::NotIn => "not_in",
            Comparator::IsNull => "is_null",
            Comparator::IsNotNull => "is_not_null",
        }
    }
}

impl FromStr for Comparator {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "eq" => Ok(Comparator::Eq),
            "ne" => Ok(Comparator::Ne),
            "gt" => Ok(Comparator::Gt),
            "ge" => Ok(Comparator::Ge),
            "lt" => Ok(Comparator::Lt),
            "le" => Ok(Comparator::Le),
            "like" => Ok(Comparator::Like),
            "not_like" => Ok(Comparator::NotLike),
            "in" => Ok(Comparator::In),
            "not_in" => Ok(Comparator::NotIn),
            "is_null" => Ok(Comparator::IsNull),
            "is_not_null" => Ok(Comparator::IsNotNull),
            other => Err(Error::malformed_filter(format!(
                "unknown comparator `{other}`"
            ))),
        }
    }
}

impl fmt::Display for Comparator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Composite operator
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogicalOp {
    And,
    Or,
    Not,
}

impl LogicalOp {
    pub fn as_str(&self) -> &'static str {
        match self {
            LogicalOp::And => "and",
            LogicalOp::Or => "or",
            LogicalOp::Not => "not",
        }
    }
}

impl fmt::Display for LogicalOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A predicate tree over leaf comparisons and logical composites
#[derive(Debug, Clone, PartialEq)]
pub enum Filter {
    Leaf {
        field: String,
        comparator: Comparator,
        value: String,
    },
    Composite {
        op: LogicalOp,
        children: Vec<Filter>,
    },
}

impl Filter {
    /// Build a leaf comparison
    pub fn leaf(
        field: impl Into<String>,
        comparator: Comparator,
        value: impl Into<String>,
    ) -> Self {
        Filter::Leaf {
            field: field.into(),
            comparator,
            value: value.into(),
        }
    }

    /// Conjunction of child filters
    pub fn and(children: Vec<Filter>) -> Self {
        Filter::Composite {
            op: LogicalOp::And,
            children,
        }
    }

    /// Disjunction of child filters
    pub fn or(children: Vec<Filter>) -> Self {
        Filter::Composite {
            op: LogicalOp::Or,
            children,
        }
    }

    /// Negation of one child filter (`not` is strictly unary)
    pub fn not(child: Filter) -> Self {
        Filter::Composite {
            op: LogicalOp::Not,
            children: vec![child],
        }
    }

    /// Parse a filter string into a predicate tree
    pub fn parse(input: &str) -> Result<Filter> {
        if let Some(inner) = composite_body(input, "and(")? {
            return Ok(Filter::and(Self::parse_list(inner)?));
        }
        if let Some(inner) = composite_body(input, "or(")? {
            return Ok(Filter::or(Self::parse_list(inner)?));
        }
        if let Some(inner) = composite_body(input, "not(")? {
            let mut children = Self::parse_list(inner)?;
            if children.len() != 1 {
                return Err(Error::malformed_filter(format!(
                    "not(...) takes exactly one child, got {}",
                    children.len()
                )));
            }
            return Ok(Filter::not(children.remove(0)));
        }

        Self::parse_leaf(input)
    }

    fn parse_leaf(input: &str) -> Result<Filter> {
        let segments: Vec<&str> = input.split(':').collect();
        if segments.len() != 3 {
            return Err(Error::malformed_filter(format!(
                "leaf `{input}` must have exactly 3 colon-delimited segments, got {}",
                segments.len()
            )));
        }
        Ok(Filter::Leaf {
            field: segments[0].to_string(),
            comparator: segments[1].parse()?,
            value: segments[2].to_string(),
        })
    }

    /// Parse a comma-separated child list, splitting on top-level commas only
    fn parse_list(list: &str) -> Result<Vec<Filter>> {
        split_top_level(list)?
            .into_iter()
            .map(Self::parse)
            .collect()
    }

    /// Whether this node is a leaf
    pub fn is_leaf(&self) -> bool {
        matches!(self, Filter::Leaf { .. })
    }
}

/// Strip `prefix` and the trailing `)` when `input` opens that composite form
///
/// An opener without its closing parenthesis is malformed, never a leaf.
fn composite_body<'a>(input: &'a str, prefix: &str) -> Result<Option<&'a str>> {
    let Some(rest) = input.strip_prefix(prefix) else {
        return Ok(None);
    };
    rest.strip_suffix(')').map(Some).ok_or_else(|| {
        Error::malformed_filter(format!("missing closing `)` in `{input}`"))
    })
}

/// Split on commas at parenthesis depth zero
///
/// `a:eq:1,or(b:eq:2,c:eq:3)` splits into two segments; the nested composite
/// keeps its comma. Unbalanced parentheses fail the parse.
fn split_top_level(list: &str) -> Result<Vec<&str>> {
    let mut segments = Vec::new();
    let mut depth = 0usize;
    let mut start = 0usize;

    for (i, c) in list.char_indices() {
        match c {
            '(' => depth += 1,
            ')' => {
                depth = depth.checked_sub(1).ok_or_else(|| {
                    Error::malformed_filter(format!("unbalanced parentheses in `{list}`"))
                })?;
            }
            ',' if depth == 0 => {
                segments.push(&list[start..i]);
                start = i + 1;
            }
            _ => {}
        }
    }

    if depth != 0 {
        return Err(Error::malformed_filter(format!(
            "unbalanced parentheses in `{list}`"
        )));
    }

    segments.push(&list[start..]);
    Ok(segments)
}

impl fmt::Display for Filter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Filter::Leaf {
                field,
                comparator,
                value,
            } => write!(f, "{field}:{comparator}:{value}"),
            Filter::Composite { op, children } => {
                write!(f, "{op}(")?;
                for (i, child) in children.iter().enumerate() {
                    if i > 0 {
                        f.write_str(",")?;
                    }
                    write!(f, "{child}")?;
                }
                f.write_str(")")
            }
        }
    }
}

impl FromStr for Filter {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Filter::parse(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_leaf() {
        let filter = Filter::parse("name:eq:alice").unwrap();
        assert_eq!(
            filter,
            Filter::leaf("name", Comparator::Eq, "alice"),
        );
    }

    #[test]
    fn test_parse_leaf_all_comparators() {
        for (raw, comparator) in [
            ("eq", Comparator::Eq),
            ("ne", Comparator::Ne),
            ("gt", Comparator::Gt),
            ("ge", Comparator::Ge),
            ("lt", Comparator::Lt),
            ("le", Comparator::Le),
            ("like", Comparator::Like),
            ("not_like", Comparator::NotLike),
            ("in", Comparator::In),
            ("not_in", Comparator::NotIn),
            ("is_null", Comparator::IsNull),
            ("is_not_null", Comparator::IsNotNull),
        ] {
            let filter = Filter::parse(&format!("f:{raw}:v")).unwrap();
            assert_eq!(filter, Filter::leaf("f", comparator, "v"));
        }
    }

    #[test]
    fn test_parse_leaf_wrong_segment_count() {
        assert!(Filter::parse("name").is_err());
        assert!(Filter::parse("name:eq").is_err());
        assert!(Filter::parse("name:eq:a:b").is_err());
    }

    #[test]
    fn test_parse_leaf_unknown_comparator() {
        let err = Filter::parse("name:equals:alice").unwrap_err();
        assert!(err.to_string().contains("unknown comparator"));
    }

    #[test]
    fn test_parse_and_composite() {
        let filter = Filter::parse("and(a:eq:1,b:gt:2)").unwrap();
        assert_eq!(
            filter,
            Filter::and(vec![
                Filter::leaf("a", Comparator::Eq, "1"),
                Filter::leaf("b", Comparator::Gt, "2"),
            ])
        );
    }

    #[test]
    fn test_parse_nested_composites_keep_inner_commas() {
        let filter = Filter::parse("or(and(a:eq:1,b:gt:2),c:ne:3)").unwrap();
        assert_eq!(
            filter,
            Filter::or(vec![
                Filter::and(vec![
                    Filter::leaf("a", Comparator::Eq, "1"),
                    Filter::leaf("b", Comparator::Gt, "2"),
                ]),
                Filter::leaf("c", Comparator::Ne, "3"),
            ])
        );
    }

    #[test]
    fn test_parse_deeply_nested() {
        let raw = "and(or(a:eq:1,and(b:eq:2,c:eq:3)),not(d:like:%x%))";
        let filter = Filter::parse(raw).unwrap();
        assert_eq!(filter.to_string(), raw);
    }

    #[test]
    fn test_not_is_strictly_unary() {
        assert!(Filter::parse("not(a:eq:1)").is_ok());
        assert!(Filter::parse("not(a:eq:1,b:eq:2)").is_err());
        assert!(Filter::parse("not()").is_err());
    }

    #[test]
    fn test_unbalanced_parentheses_fail() {
        assert!(Filter::parse("and(a:eq:1").is_err());
        assert!(Filter::parse("and(a:eq:1))").is_err());
    }

    #[test]
    fn test_unterminated_composite_never_parses_as_leaf() {
        for raw in ["and(a:eq:1", "or(a:eq:1", "not(a:eq:1"] {
            let err = Filter::parse(raw).unwrap_err();
            assert!(err.to_string().contains("missing closing"), "{raw}");
        }
    }

    #[test]
    fn test_empty_list_entries_fail() {
        assert!(Filter::parse("and()").is_err());
        assert!(Filter::parse("and(a:eq:1,)").is_err());
    }

    #[test]
    fn test_display_roundtrip() {
        let raw = "or(and(a:eq:1,b:gt:2),not(c:in:x))";
        let parsed = Filter::parse(raw).unwrap();
        let rendered = parsed.to_string();
        assert_eq!(rendered, raw);
        assert_eq!(Filter::parse(&rendered).unwrap(), parsed);
    }

    #[test]
    fn test_leaf_value_keeps_commas_when_standalone() {
        let filter = Filter::parse("age:in:20,30,40").unwrap();
        assert_eq!(filter, Filter::leaf("age", Comparator::In, "20,30,40"));
    }

    #[test]
    fn test_from_str_impl() {
        let filter: Filter = "name:eq:alice".parse().unwrap();
        assert!(filter.is_leaf());
    }
}
