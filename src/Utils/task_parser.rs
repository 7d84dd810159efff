/// parse task documents with structure like " title1 key1: value1, value2 key2: value2 title2 key3:value3, value4" which has
/// titles and pairs key-vector of values. Every title is one render job (or the output settings), sections keep the order
/// they were written in, so the same title may appear more than once.
///
/// ```text
/// heatmap
///   expression: "exp(x*y + x**2)"
///   center: 0, 0
///   half_width: 1
/// ```
use crate::errors::{RenderError, RenderResult};
use crate::symbolic::symbolic_lambdify::EvaluableFunction;
use nom::{
    IResult, Parser,
    branch::alt,
    bytes::complete::{tag, take_while, take_while1},
    character::complete::{alpha1, alphanumeric1, char, multispace0, space0},
    combinator::{map, recognize},
    multi::{many0, many1, separated_list0},
    sequence::{delimited, pair, separated_pair, terminated},
};
use std::collections::HashMap;
use std::fmt::Display;

pub type SectionMap = HashMap<String, Vec<Value>>;

/// enum to represent different value types:
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    String(String),
    Float(f64),
    Integer(i64),
    Boolean(bool),
}

impl Value {
    // Helper functions to access different value types
    pub fn as_string(&self) -> Option<&String> {
        if let Value::String(s) = self {
            Some(s)
        } else {
            None
        }
    }

    /// integers are accepted wherever a float is
    pub fn as_float(&self) -> Option<f64> {
        match self {
            Value::Float(f) => Some(*f),
            Value::Integer(i) => Some(*i as f64),
            _ => None,
        }
    }

    /// A number, or text holding a constant formula such as `pi/4` or `sqrt(2)`
    /// that evaluates to a finite value.
    pub fn as_number(&self) -> Option<f64> {
        match self {
            Value::String(text) => EvaluableFunction::parse(text, &[])
                .and_then(|f| f.call(&[]))
                .ok()
                .filter(|v| v.is_finite()),
            other => other.as_float(),
        }
    }

    pub fn as_integer(&self) -> Option<i64> {
        if let Value::Integer(i) = self {
            Some(*i)
        } else {
            None
        }
    }

    pub fn as_boolean(&self) -> Option<bool> {
        if let Value::Boolean(b) = self {
            Some(*b)
        } else {
            None
        }
    }
    // Try to convert to string representation
    pub fn to_string_value(&self) -> String {
        match self {
            Value::String(s) => s.clone(),
            Value::Float(f) => f.to_string(),
            Value::Integer(i) => i.to_string(),
            Value::Boolean(b) => b.to_string(),
        }
    }
}

impl Display for Value {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Value::String(s) => write!(f, "{}", s),
            Value::Float(val) => write!(f, "{}", val),
            Value::Integer(val) => write!(f, "{}", val),
            Value::Boolean(val) => write!(f, "{}", val),
        }
    }
}

/// One titled block of key-value pairs.
#[derive(Debug, Clone, PartialEq)]
pub struct TaskSection {
    pub title: String,
    pub entries: SectionMap,
}

fn identifier(input: &str) -> IResult<&str, &str> {
    recognize(pair(
        alt((alpha1, tag("_"))),
        many0(alt((alphanumeric1, tag("_")))),
    ))
    .parse(input)
}

/// Parses a title (word characters without spaces)
fn parse_title(input: &str) -> IResult<&str, String> {
    let (input, result) = map(identifier, String::from).parse(input)?;
    Ok((input.trim(), result))
}

/// Parses a key (word characters without spaces)
fn parse_key(input: &str) -> IResult<&str, String> {
    map(identifier, String::from).parse(input)
}

/// Double-quoted text, kept verbatim; may hold spaces and commas.
fn parse_quoted(input: &str) -> IResult<&str, Value> {
    map(
        delimited(char('"'), take_while(|c: char| c != '"'), char('"')),
        |s: &str| Value::String(s.to_string()),
    )
    .parse(input)
}

fn parse_bare(input: &str) -> IResult<&str, Value> {
    // excluding commas, whitespace, newlines, semicolons and quotes
    let bare = take_while1(|c: char| !matches!(c, ',' | ' ' | '\t' | '\n' | '\r' | ';' | '"'));
    map(bare, |s: &str| {
        // Try parsing as different types in order
        if let Ok(val) = s.parse::<i64>() {
            Value::Integer(val)
        } else if let Ok(val) = s.parse::<f64>() {
            Value::Float(val)
        } else if let Ok(val) = s.parse::<bool>() {
            Value::Boolean(val)
        } else {
            Value::String(s.to_string())
        }
    })
    .parse(input)
}

fn parse_value(input: &str) -> IResult<&str, Value> {
    alt((parse_quoted, parse_bare)).parse(input)
}

fn parse_value_list(input: &str) -> IResult<&str, Vec<Value>> {
    let separator_coma = delimited(space0, tag(","), space0);
    separated_list0(separator_coma, parse_value).parse(input)
}

/// Parses a key-value pair where value is a list
fn parse_key_value_pair(input: &str) -> IResult<&str, (String, Vec<Value>)> {
    // the colon must sit on the key's line, so a title on the next line ends the section
    let colon_separator = delimited(space0, tag(":"), space0);
    let (input, result) =
        separated_pair(parse_key, colon_separator, parse_value_list).parse(input)?;
    Ok((input.trim(), result))
}

/// Parses a section with a title and multiple key-value pairs
fn parse_section(input: &str) -> IResult<&str, TaskSection> {
    let (input, _) = space0(input)?;
    let (input, title) = parse_title(input)?;
    let (input, _) = multispace0(input)?;
    // a section may be empty: every key has a default
    let (input, pairs) = many0(terminated(parse_key_value_pair, space0)).parse(input)?;
    // a repeated key overrides the earlier one
    let entries = pairs.into_iter().collect();
    Ok((input, TaskSection { title, entries }))
}

/// Filters out comment lines (starting with //, #, %, or ;) and blank lines
pub fn filter_comments(input: &str) -> String {
    input
        .lines()
        .filter(|line| {
            let trimmed = line.trim();
            !trimmed.starts_with("//")
                && !trimmed.starts_with('#')
                && !trimmed.starts_with('%')
                && !trimmed.starts_with(';')
                && !trimmed.is_empty()
        })
        .collect::<Vec<&str>>()
        .join("\n")
}

/// Parses the sections of an already comment-free document, in order.
pub fn parse_document(input: &str) -> IResult<&str, Vec<TaskSection>> {
    many1(delimited(space0, parse_section, multispace0)).parse(input)
}

/// Whole task text to sections; anything left unparsed is an error.
pub fn parse_task(text: &str) -> RenderResult<Vec<TaskSection>> {
    let filtered = filter_comments(text);
    if filtered.trim().is_empty() {
        return Err(RenderError::Task("task document has no sections".to_string()));
    }
    let (rest, sections) = parse_document(filtered.trim_start())
        .map_err(|e| RenderError::Task(format!("cannot parse task document: {}", e)))?;
    let rest = rest.trim();
    if !rest.is_empty() {
        let near: String = rest.chars().take(40).collect();
        return Err(RenderError::Task(format!("unexpected text near '{}'", near)));
    }
    Ok(sections)
}

/// Typed access to the entries of one section. Every getter names the key in its error.
impl TaskSection {
    /// Rejects keys outside `allowed`.
    pub fn check_keys(&self, allowed: &[&str]) -> RenderResult<()> {
        let mut keys: Vec<&String> = self.entries.keys().collect();
        keys.sort();
        for key in keys {
            if !allowed.contains(&key.as_str()) {
                return Err(RenderError::invalid(
                    key,
                    self.joined(key),
                    &format!("unknown key in section '{}'", self.title),
                ));
            }
        }
        Ok(())
    }

    fn joined(&self, key: &str) -> String {
        self.entries
            .get(key)
            .map(|values| {
                values
                    .iter()
                    .map(|v| v.to_string())
                    .collect::<Vec<_>>()
                    .join(", ")
            })
            .unwrap_or_default()
    }

    fn single(&self, key: &str) -> RenderResult<Option<&Value>> {
        match self.entries.get(key).map(|v| v.as_slice()) {
            None => Ok(None),
            Some([value]) => Ok(Some(value)),
            Some(_) => Err(RenderError::invalid(
                key,
                self.joined(key),
                "expected exactly one value",
            )),
        }
    }

    /// The value as text; numbers are written back the way they parse.
    pub fn text(&self, key: &str) -> RenderResult<Option<String>> {
        Ok(self.single(key)?.map(|v| v.to_string_value()))
    }

    /// A number; constant formulas are evaluated, quote them when they hold spaces.
    pub fn number(&self, key: &str) -> RenderResult<Option<f64>> {
        match self.single(key)? {
            None => Ok(None),
            Some(value) => value
                .as_number()
                .map(Some)
                .ok_or_else(|| RenderError::invalid(key, value, "expected a number")),
        }
    }

    pub fn count(&self, key: &str) -> RenderResult<Option<usize>> {
        match self.single(key)? {
            None => Ok(None),
            Some(value) => value
                .as_integer()
                .and_then(|i| usize::try_from(i).ok())
                .map(Some)
                .ok_or_else(|| RenderError::invalid(key, value, "expected a non-negative integer")),
        }
    }

    pub fn boolean(&self, key: &str) -> RenderResult<Option<bool>> {
        match self.single(key)? {
            None => Ok(None),
            Some(value) => value
                .as_boolean()
                .map(Some)
                .ok_or_else(|| RenderError::invalid(key, value, "expected true or false")),
        }
    }

    /// Two numbers, e.g. `center: 0.5, -1` or `center: pi/4, 0`.
    pub fn pair(&self, key: &str) -> RenderResult<Option<(f64, f64)>> {
        match self.entries.get(key).map(|v| v.as_slice()) {
            None => Ok(None),
            Some([a, b]) => match (a.as_number(), b.as_number()) {
                (Some(a), Some(b)) => Ok(Some((a, b))),
                _ => Err(RenderError::invalid(key, self.joined(key), "expected two numbers")),
            },
            Some(_) => Err(RenderError::invalid(key, self.joined(key), "expected two numbers")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_title() {
        let (remaining, title) = parse_title("heatmap\n expression: x").unwrap();
        assert_eq!(title, "heatmap");
        assert_eq!(remaining, "expression: x");

        let (remaining, title) = parse_title("my_task2 key: 1").unwrap();
        assert_eq!(title, "my_task2");
        assert_eq!(remaining, "key: 1");
    }

    #[test]
    fn test_parse_key() {
        let (remaining, key) = parse_key("half_width: 2").unwrap();
        assert_eq!(key, "half_width");
        assert_eq!(remaining, ": 2");
        assert!(parse_key("1abc: 2").is_err());
    }

    #[test]
    fn test_parse_value() {
        let (remaining, value) = parse_value("viridis, next").unwrap();
        assert_eq!(value, Value::String("viridis".to_string()));
        assert_eq!(remaining, ", next");

        let (_, value) = parse_value("-3\n").unwrap();
        assert_eq!(value, Value::Integer(-3));

        let (_, value) = parse_value("1e-3").unwrap();
        assert_eq!(value, Value::Float(0.001));

        let (_, value) = parse_value("false").unwrap();
        assert_eq!(value, Value::Boolean(false));

        let (_, value) = parse_value("x**2").unwrap();
        assert_eq!(value, Value::String("x**2".to_string()));
    }

    #[test]
    fn test_parse_quoted_value_keeps_spaces_and_commas() {
        let (remaining, value) = parse_value("\"exp(x*y + x**2), y\" rest").unwrap();
        assert_eq!(value, Value::String("exp(x*y + x**2), y".to_string()));
        assert_eq!(remaining, " rest");
        // quoted digits stay text
        let (_, value) = parse_value("\"12\"").unwrap();
        assert_eq!(value, Value::String("12".to_string()));
        assert!(parse_value("\"unterminated").is_err());
    }

    #[test]
    fn test_parse_value_list() {
        let (remaining, values) = parse_value_list("0.5 , -1,2\nnext: 1").unwrap();
        assert_eq!(
            values,
            vec![Value::Float(0.5), Value::Integer(-1), Value::Integer(2)]
        );
        assert_eq!(remaining, "\nnext: 1");

        let (_, values) = parse_value_list("\n").unwrap();
        assert!(values.is_empty());
    }

    #[test]
    fn test_parse_key_value_pair() {
        let (remaining, (key, values)) =
            parse_key_value_pair("center: 1, 2\n  step: 0.1").unwrap();
        assert_eq!(key, "center");
        assert_eq!(values, vec![Value::Integer(1), Value::Integer(2)]);
        assert_eq!(remaining, "step: 0.1");

        let (_, (key, values)) = parse_key_value_pair("expression : \"x + y\"").unwrap();
        assert_eq!(key, "expression");
        assert_eq!(values, vec![Value::String("x + y".to_string())]);
    }

    #[test]
    fn test_parse_section() {
        let input = "contour\n  expression: \"x**2 + y**2\"\n  step: 0.05\ntangent\n  x0: 1";
        let (remaining, section) = parse_section(input).unwrap();
        assert_eq!(section.title, "contour");
        assert_eq!(section.entries.len(), 2);
        assert_eq!(section.entries["step"], vec![Value::Float(0.05)]);
        assert_eq!(remaining, "tangent\n  x0: 1");
    }

    #[test]
    fn test_empty_section() {
        let (remaining, sections) = parse_document("heatmap\ncontour\n step: 1").unwrap();
        assert_eq!(remaining, "");
        assert_eq!(sections.len(), 2);
        assert!(sections[0].entries.is_empty());
        assert_eq!(sections[1].title, "contour");
    }

    #[test]
    fn test_filter_comments() {
        let text = "// header\nheatmap\n# note\n  % more\n\n; last\n  half_width: 2";
        assert_eq!(filter_comments(text), "heatmap\n  half_width: 2");
    }

    #[test]
    fn test_value_helpers() {
        assert_eq!(Value::Integer(3).as_float(), Some(3.0));
        assert_eq!(Value::Float(3.5).as_integer(), None);
        assert_eq!(Value::Boolean(true).as_boolean(), Some(true));
        assert_eq!(Value::String("a".to_string()).as_string().map(|s| s.as_str()), Some("a"));
        assert_eq!(Value::Float(2.0).to_string_value(), "2");
    }

    #[test]
    fn test_constant_formulas_are_numbers() {
        use approx::assert_relative_eq;
        let text = |s: &str| Value::String(s.to_string());
        assert_eq!(text("pi/4").as_number(), Some(std::f64::consts::FRAC_PI_4));
        assert_relative_eq!(text("sqrt(2)").as_number().unwrap(), 2.0f64.sqrt());
        assert_eq!(text("2 * pi").as_number(), Some(2.0 * std::f64::consts::PI));
        assert_eq!(Value::Integer(-1).as_number(), Some(-1.0));
        // free symbols, bad syntax and non-finite results are not numbers
        assert_eq!(text("x + 1").as_number(), None);
        assert_eq!(text("pi/").as_number(), None);
        assert_eq!(text("1/0").as_number(), None);
        assert_eq!(Value::Boolean(true).as_number(), None);
    }
}
