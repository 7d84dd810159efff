//! a module turns a String expression into a symbolic expression
//!# Example
//! ```
//! use RustedContours::symbolic::parse_expr::parse_expression_func;
//! let parsed_expression = parse_expression_func("exp(x*y + x**2)").unwrap();
//! println!(" parsed_expression {}", parsed_expression);
//! ```
//                  precedence ladder (loosest first)
//                |  sum      : product (('+'|'-') product)*      |
//                |  product  : unary   (('*'|'/') unary)*        |
//                |  unary    : ('+'|'-') unary | power           |
//                |  power    : atom (('**'|'^') unary)?          |
//                |  atom     : number | name(sum) | name | (sum) |
// power is right associative and binds tighter than unary minus: -x**2 = -(x**2)
use crate::errors::ExprError;
use crate::symbolic::symbolic_engine::Expr;
use nom::{
    IResult, Parser,
    branch::alt,
    bytes::complete::tag,
    character::complete::{alpha1, alphanumeric1, char, digit0, digit1, multispace0, one_of},
    combinator::{all_consuming, cut, map_res, not, opt, recognize},
    error::{Error as NomError, ErrorKind},
    multi::many0,
    sequence::{delimited, pair, preceded, terminated},
};
use std::f64::consts::{E, LN_10, PI};

/// strips whitespace around the wrapped parser
fn ws<'a, O, F>(inner: F) -> impl Parser<&'a str, Output = O, Error = NomError<&'a str>>
where
    F: Parser<&'a str, Output = O, Error = NomError<&'a str>>,
{
    delimited(multispace0, inner, multispace0)
}

/// `2`, `2.`, `0.5`, `.5`, `1e-3`, `2.5E+4`
fn parse_number(input: &str) -> IResult<&str, Expr> {
    let mantissa = alt((
        recognize((digit1, opt((char('.'), digit0)))),
        recognize((char('.'), digit1)),
    ));
    let exponent = opt((one_of("eE"), opt(one_of("+-")), digit1));
    let mut number = map_res(recognize((mantissa, exponent)), |s: &str| {
        s.parse::<f64>().map(Expr::Const)
    });
    number.parse(input)
}

/// identifiers follow the same rule as task titles: a letter or '_' then letters, digits, '_'
fn parse_identifier(input: &str) -> IResult<&str, &str> {
    recognize(pair(
        alt((alpha1, tag("_"))),
        many0(alt((alphanumeric1, tag("_")))),
    ))
    .parse(input)
}

fn build_function(name: &str, arg: Expr) -> Option<Expr> {
    let arg = Box::new(arg);
    let expr = match name {
        "exp" => Expr::Exp(arg),
        "log" | "ln" => Expr::Ln(arg),
        "log10" => Expr::Div(Box::new(Expr::Ln(arg)), Box::new(Expr::Const(LN_10))),
        "sqrt" => Expr::Pow(arg, Box::new(Expr::Const(0.5))),
        "abs" | "Abs" => Expr::Abs(arg),
        "sin" => Expr::sin(arg),
        "cos" => Expr::cos(arg),
        "tan" | "tg" => Expr::tg(arg),
        "cot" | "ctg" => Expr::ctg(arg),
        "asin" | "arcsin" => Expr::arcsin(arg),
        "acos" | "arccos" => Expr::arccos(arg),
        "atan" | "arctan" | "arctg" => Expr::arctg(arg),
        "acot" | "arccot" | "arcctg" => Expr::arcctg(arg),
        "heaviside" | "Heaviside" => Expr::Heaviside(arg),
        _ => return None,
    };
    Some(expr)
}

fn constant_or_variable(name: &str) -> Expr {
    match name {
        "pi" => Expr::Const(PI),
        "E" => Expr::Const(E),
        _ => Expr::Var(name.to_string()),
    }
}

/// Nested groups, calls, signs and powers beyond this are rejected, as are trees taller than this.
pub const MAX_NESTING: usize = 200;

/// a parsed subtree and its height
type Node = (Expr, usize);

fn too_deep(input: &str) -> nom::Err<NomError<&str>> {
    nom::Err::Failure(NomError::new(input, ErrorKind::TooLarge))
}

fn node(input: &str, expr: Expr, height: usize) -> Result<Node, nom::Err<NomError<&str>>> {
    if height > MAX_NESTING {
        Err(too_deep(input))
    } else {
        Ok((expr, height))
    }
}

fn parse_identifier_or_call<'a>(input: &'a str, depth: usize) -> IResult<&'a str, Node> {
    let (rest, name) = parse_identifier(input)?;
    let (after_name, _) = multispace0(rest)?;
    if let Some(args) = after_name.strip_prefix('(') {
        let (rest, (inner, height)) = cut(|i: &'a str| parse_sum(i, depth)).parse(args)?;
        let (rest, _) = cut(preceded(multispace0, char(')'))).parse(rest)?;
        return match build_function(name, inner) {
            // log10 adds two levels
            Some(expr) => Ok((rest, node(rest, expr, height + 2)?)),
            // unknown function names are fatal: point the error at the name
            None => Err(nom::Err::Failure(NomError::new(input, ErrorKind::Verify))),
        };
    }
    Ok((rest, (constant_or_variable(name), 1)))
}

fn parse_atom<'a>(input: &'a str, depth: usize) -> IResult<&'a str, Node> {
    let (input, _) = multispace0(input)?;
    if let Ok((rest, number)) = parse_number(input) {
        return Ok((rest, (number, 1)));
    }
    if let Some(inner) = input.strip_prefix('(') {
        let (rest, inner) = cut(|i: &'a str| parse_sum(i, depth)).parse(inner)?;
        let (rest, _) = cut(preceded(multispace0, char(')'))).parse(rest)?;
        return Ok((rest, inner));
    }
    parse_identifier_or_call(input, depth)
}

fn parse_power<'a>(input: &'a str, depth: usize) -> IResult<&'a str, Node> {
    let (input, (base, base_height)) = parse_atom(input, depth)?;
    let (input, exponent) = opt(preceded(
        ws(alt((tag("**"), tag("^")))),
        cut(|i: &'a str| parse_unary(i, depth)),
    ))
    .parse(input)?;
    match exponent {
        Some((exponent, exponent_height)) => {
            let pow = Expr::Pow(Box::new(base), Box::new(exponent));
            Ok((input, node(input, pow, base_height.max(exponent_height) + 1)?))
        }
        None => Ok((input, (base, base_height))),
    }
}

/// every recursive cycle of the grammar passes through here, so this is where depth is counted
fn parse_unary<'a>(input: &'a str, depth: usize) -> IResult<&'a str, Node> {
    if depth >= MAX_NESTING {
        return Err(too_deep(input));
    }
    let depth = depth + 1;
    let (input, _) = multispace0(input)?;
    if let Some(rest) = input.strip_prefix('-') {
        let (rest, (operand, height)) = cut(|i: &'a str| parse_unary(i, depth)).parse(rest)?;
        let negated = match operand {
            Expr::Const(value) => (Expr::Const(-value), height),
            other => node(rest, -other, height + 1)?,
        };
        return Ok((rest, negated));
    }
    if let Some(rest) = input.strip_prefix('+') {
        return cut(|i: &'a str| parse_unary(i, depth)).parse(rest);
    }
    parse_power(input, depth)
}

fn parse_product<'a>(input: &'a str, depth: usize) -> IResult<&'a str, Node> {
    let (input, first) = parse_unary(input, depth)?;
    let operator = ws(terminated(one_of("*/"), not(char('*'))));
    let (input, rest) =
        many0(pair(operator, cut(|i: &'a str| parse_unary(i, depth)))).parse(input)?;
    let mut acc = first;
    for (op, (rhs, rhs_height)) in rest {
        let (lhs, lhs_height) = acc;
        let expr = match op {
            '*' => Expr::Mul(Box::new(lhs), Box::new(rhs)),
            _ => Expr::Div(Box::new(lhs), Box::new(rhs)),
        };
        acc = node(input, expr, lhs_height.max(rhs_height) + 1)?;
    }
    Ok((input, acc))
}

fn parse_sum<'a>(input: &'a str, depth: usize) -> IResult<&'a str, Node> {
    let (input, first) = parse_product(input, depth)?;
    let (input, rest) =
        many0(pair(ws(one_of("+-")), cut(|i: &'a str| parse_product(i, depth)))).parse(input)?;
    let mut acc = first;
    for (op, (rhs, rhs_height)) in rest {
        let (lhs, lhs_height) = acc;
        let expr = match op {
            '+' => Expr::Add(Box::new(lhs), Box::new(rhs)),
            _ => Expr::Sub(Box::new(lhs), Box::new(rhs)),
        };
        acc = node(input, expr, lhs_height.max(rhs_height) + 1)?;
    }
    Ok((input, acc))
}

fn parse_formula(input: &str) -> IResult<&str, Node> {
    parse_sum(input, 0)
}

fn describe_failure(input: &str, err: &NomError<&str>) -> (usize, String) {
    let position = input.len() - err.input.len();
    let reason = match err.code {
        ErrorKind::TooLarge => "expression nested too deeply".to_string(),
        ErrorKind::Verify => {
            let name: String = err
                .input
                .chars()
                .take_while(|c| c.is_alphanumeric() || *c == '_')
                .collect();
            format!("unknown function '{}'", name)
        }
        _ if err.input.trim().is_empty() => {
            if input.matches('(').count() > input.matches(')').count() {
                "unexpected end of input, unbalanced '('".to_string()
            } else {
                "unexpected end of input".to_string()
            }
        }
        _ => format!("unexpected input '{}'", err.input.trim()),
    };
    (position, reason)
}

/// Parses a whole formula. Python (`x**2`) and caret (`x^2`) powers are both accepted.
pub fn parse_expression_func(input: &str) -> Result<Expr, ExprError> {
    if input.trim().is_empty() {
        return Err(ExprError::Parse {
            input: input.to_string(),
            position: 0,
            reason: "empty expression".to_string(),
        });
    }
    match all_consuming(ws(parse_formula)).parse(input) {
        Ok((_, (expr, _))) => Ok(expr),
        Err(nom::Err::Error(err)) | Err(nom::Err::Failure(err)) => {
            let (position, reason) = describe_failure(input, &err);
            Err(ExprError::Parse {
                input: input.to_string(),
                position,
                reason,
            })
        }
        Err(nom::Err::Incomplete(_)) => Err(ExprError::Parse {
            input: input.to_string(),
            position: input.len(),
            reason: "incomplete input".to_string(),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn var(name: &str) -> Box<Expr> {
        Box::new(Expr::Var(name.to_string()))
    }

    #[test]
    fn test_parse_exponential() {
        let expr = parse_expression_func("exp(x)").unwrap();
        assert_eq!(expr, Expr::Exp(var("x")));
    }

    #[test]
    fn test_parse_constant() {
        assert_eq!(parse_expression_func("42").unwrap(), Expr::Const(42.0));
        assert_eq!(parse_expression_func(".5").unwrap(), Expr::Const(0.5));
        assert_eq!(parse_expression_func("1e-3").unwrap(), Expr::Const(1e-3));
        assert_eq!(parse_expression_func("-2").unwrap(), Expr::Const(-2.0));
    }

    #[test]
    fn test_parse_variable() {
        let expr = parse_expression_func("x").unwrap();
        assert_eq!(expr, Expr::Var("x".to_string()));
    }

    #[test]
    fn test_parse_addition_and_subtraction() {
        assert_eq!(
            parse_expression_func("x + 2").unwrap(),
            Expr::Add(var("x"), Box::new(Expr::Const(2.0)))
        );
        assert_eq!(
            parse_expression_func("x - 2").unwrap(),
            Expr::Sub(var("x"), Box::new(Expr::Const(2.0)))
        );
    }

    #[test]
    fn test_parse_power_both_spellings() {
        let expected = Expr::Pow(var("x"), Box::new(Expr::Const(2.0)));
        assert_eq!(parse_expression_func("x^2").unwrap(), expected);
        assert_eq!(parse_expression_func("x**2").unwrap(), expected);
        assert_eq!(parse_expression_func("x ** 2").unwrap(), expected);
    }

    #[test]
    fn test_power_is_right_associative() {
        let expr = parse_expression_func("x**2**3").unwrap();
        assert_eq!(
            expr,
            Expr::Pow(
                var("x"),
                Box::new(Expr::Pow(
                    Box::new(Expr::Const(2.0)),
                    Box::new(Expr::Const(3.0))
                ))
            )
        );
    }

    #[test]
    fn test_unary_minus_binds_looser_than_power() {
        let expr = parse_expression_func("-x**2").unwrap();
        assert_eq!(
            expr,
            -Expr::Pow(var("x"), Box::new(Expr::Const(2.0)))
        );
        let expr = parse_expression_func("2**-1").unwrap();
        assert_eq!(
            expr,
            Expr::Pow(Box::new(Expr::Const(2.0)), Box::new(Expr::Const(-1.0)))
        );
    }

    #[test]
    fn test_parse_logarithm_aliases() {
        assert_eq!(parse_expression_func("log(x)").unwrap(), Expr::Ln(var("x")));
        assert_eq!(parse_expression_func("ln(x)").unwrap(), Expr::Ln(var("x")));
    }

    #[test]
    fn test_parse_expression_func_with_brackets() {
        let expr = parse_expression_func("(x + y) * z").unwrap();
        assert_eq!(
            expr,
            Expr::Mul(Box::new(Expr::Add(var("x"), var("y"))), var("z"))
        );
    }

    #[test]
    fn test_products_are_left_associative() {
        let expr = parse_expression_func("(x + y) * (z - 2) / exp(w)").unwrap();
        let x_plus_y = Box::new(Expr::Add(var("x"), var("y")));
        let z_minus_2 = Box::new(Expr::Sub(var("z"), Box::new(Expr::Const(2.0))));
        let expected = Expr::Div(
            Box::new(Expr::Mul(x_plus_y, z_minus_2)),
            Box::new(Expr::Exp(var("w"))),
        );
        assert_eq!(expr, expected);
    }

    #[test]
    fn test_multiple_addition() {
        let result = parse_expression_func("x^2 - x - 1").unwrap();
        let x = Expr::Var("x".to_string());
        let to_check = x.clone().pow(Expr::Const(2.0)) - x - Expr::Const(1.0);
        assert_eq!(result, to_check);
    }

    #[test]
    fn test_parse_trig_aliases() {
        assert_eq!(parse_expression_func("tan(x)").unwrap(), Expr::tg(var("x")));
        assert_eq!(parse_expression_func("tg(x)").unwrap(), Expr::tg(var("x")));
        assert_eq!(
            parse_expression_func("asin(x)").unwrap(),
            Expr::arcsin(var("x"))
        );
        assert_eq!(
            parse_expression_func("arctan(x)").unwrap(),
            Expr::arctg(var("x"))
        );
    }

    #[test]
    fn test_parse_nested_trig() {
        let expr = parse_expression_func("sin(cos(x))").unwrap();
        assert_eq!(expr, Expr::sin(Box::new(Expr::cos(var("x")))));
    }

    #[test]
    fn test_named_constants_are_not_variables() {
        assert_eq!(parse_expression_func("pi").unwrap(), Expr::Const(PI));
        assert_eq!(
            parse_expression_func("E**x").unwrap(),
            Expr::Pow(Box::new(Expr::Const(E)), var("x"))
        );
    }

    #[test]
    fn test_sqrt_and_log10_are_rewritten() {
        assert_eq!(
            parse_expression_func("sqrt(x)").unwrap(),
            Expr::Pow(var("x"), Box::new(Expr::Const(0.5)))
        );
        assert_eq!(
            parse_expression_func("log10(x)").unwrap(),
            Expr::Div(Box::new(Expr::Ln(var("x"))), Box::new(Expr::Const(LN_10)))
        );
    }

    #[test]
    fn test_unmatched_brackets() {
        let err = parse_expression_func("sin(x").unwrap_err();
        match err {
            ExprError::Parse {
                input,
                position,
                reason,
            } => {
                assert_eq!(input, "sin(x");
                assert_eq!(position, 5);
                assert!(reason.contains("unbalanced"));
            }
            other => panic!("unexpected error {:?}", other),
        }
        assert!(parse_expression_func("(x + y").is_err());
    }

    #[test]
    fn test_invalid_expressions() {
        for bad in ["(x +", "x +", "x * * y", "2x", "x)", "", "   ", "sin()", "x ** "] {
            assert!(
                matches!(parse_expression_func(bad), Err(ExprError::Parse { .. })),
                "{} should not parse",
                bad
            );
        }
    }

    fn assert_too_deep(text: &str) {
        match parse_expression_func(text) {
            Err(ExprError::Parse { reason, .. }) => {
                assert_eq!(reason, "expression nested too deeply")
            }
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn test_deep_nesting_is_an_error() {
        assert_too_deep(&format!("{}x{}", "(".repeat(5000), ")".repeat(5000)));
        assert_too_deep(&format!("{}x", "-".repeat(5000)));
        assert_too_deep(&format!("{}x{}", "sin(".repeat(1000), ")".repeat(1000)));
        assert_too_deep(&vec!["x"; 5000].join("**"));
        // a long flat sum still builds a tall tree
        assert_too_deep(&vec!["x"; 5000].join(" + "));
    }

    #[test]
    fn test_moderate_nesting_parses() {
        let text = format!("{}x{}", "(".repeat(100), ")".repeat(100));
        assert_eq!(parse_expression_func(&text).unwrap(), Expr::Var("x".to_string()));
        let text = format!("{}x", "-".repeat(100));
        let expected = (0..100).fold(Expr::Var("x".to_string()), |e, _| -e);
        assert_eq!(parse_expression_func(&text).unwrap(), expected);
        assert!(parse_expression_func(&vec!["x"; 150].join(" + ")).is_ok());
    }

    #[test]
    fn test_unknown_function() {
        let err = parse_expression_func("1 + foo(x)").unwrap_err();
        assert_eq!(
            err,
            ExprError::Parse {
                input: "1 + foo(x)".to_string(),
                position: 4,
                reason: "unknown function 'foo'".to_string(),
            }
        );
    }
}
