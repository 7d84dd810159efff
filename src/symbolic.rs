#![allow(non_camel_case_types)]
#![allow(non_snake_case)]
/// a module turns a String expression into a symbolic expression
///
///# Example
/// ```
/// use RustedContours::symbolic::symbolic_engine::Expr;
/// let input = "x^2.3* log(x+y+y^2.6)";
/// let parsed_expression = Expr::parse_expression(input).unwrap();
/// println!(" parsed_expression {}", parsed_expression);
/// ```
/// ________________________________________________________________________________________________________________________________
pub mod parse_expr;
///____________________________________________________________________________________________________________________________
/// # Symbolic engine
/// a module
/// 1) turns a String expression into a symbolic expression
/// 2) differentiates it analytically
/// 3) turns a symbolic expression into an evaluable function
///# Example#
/// ```
/// use RustedContours::symbolic::symbolic_engine::Expr;
/// let input = "exp(x)+log(y)";
/// // here you've got symbolic expression
/// let parsed_expression = Expr::parse_expression(input).unwrap();
/// // return vec of all arguments
/// let all = parsed_expression.all_arguments_are_variables();
/// assert_eq!(all, vec!["x", "y"]);
/// // differentiate with respect to x and y
/// let df_dx = parsed_expression.diff("x").simplify();
/// let df_dy = parsed_expression.diff("y").simplify();
/// println!("df_dx = {}, df_dy = {}", df_dx, df_dy);
/// // compile and evaluate
/// let f = parsed_expression.compile(&["x", "y"]).unwrap();
/// println!("f(0, 1) = {}", f.eval(&[0.0, 1.0]));
/// ```
pub mod symbolic_engine;
/// analytical derivatives, variable extraction and declared-variable checks
pub mod symbolic_engine_derivatives;
/// compiled `Lambda` trees and the `EvaluableFunction` used by every sampler
pub mod symbolic_lambdify;
/// constant folding and algebraic identities
pub mod symbolic_simplify;
/// linspace and finite-difference helpers
pub mod utils;
