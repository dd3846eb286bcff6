//! Prefix/infix/postfix operator evaluation (spec §4.1 "Operator infix",
//! "Prefix, postfix", §9 "Operator overloading"). Every operator first
//! tries trait-based dispatch (`operator_traits[op]`, then `(op)` on the
//! left/only operand's runtime type); built-in per-type rules take over
//! only when no such instance or default exists.

use std::cmp::Ordering;
use std::rc::Rc;

use crate::ast::Expr;
use crate::env::Env;
use crate::eval::Evaluator;
use crate::traits::{operator_method_name, Resolved};
use crate::value::error::{ErrorKind, RuntimeError, SourceLoc};
use crate::value::signals::Signal;
use crate::value::Value;

pub(super) fn eval_prefix(evaluator: &mut Evaluator, op: &str, expr: &Expr, env: &Env, loc: SourceLoc) -> Value {
	let value = evaluator.eval(expr, env);
	if value.is_control() {
		return value;
	}
	if let Some(result) = try_trait_dispatch(evaluator, op, &[value.clone()]) {
		return result;
	}
	builtin_prefix(evaluator, op, &value, loc)
}

pub(super) fn eval_infix(evaluator: &mut Evaluator, op: &str, left: &Expr, right: &Expr, env: &Env, loc: SourceLoc) -> Value {
	let left_val = evaluator.eval(left, env);
	if left_val.is_control() {
		return left_val;
	}
	let right_val = evaluator.eval(right, env);
	if right_val.is_control() {
		return right_val;
	}
	if let Some(result) = try_trait_dispatch(evaluator, op, &[left_val.clone(), right_val.clone()]) {
		return result;
	}
	builtin_infix(evaluator, op, &left_val, &right_val, loc)
}

pub(super) fn eval_postfix(evaluator: &mut Evaluator, op: &str, expr: &Expr, env: &Env, loc: SourceLoc) -> Value {
	let value = evaluator.eval(expr, env);
	if value.is_control() {
		return value;
	}
	if op == "?" {
		return eval_try(&value, loc);
	}
	if let Some(result) = try_trait_dispatch(evaluator, op, &[value.clone()]) {
		return result;
	}
	evaluator.error_at(ErrorKind::UnsupportedOperator, format!("unsupported postfix operator `{op}`"), loc)
}

/// Spec §4.3 "Operator dispatch": look up `operator_traits[op]`, then
/// resolve `(op)` on the first operand's runtime type (instance, then
/// default). `None` means no trait implementation applies, so the caller
/// should fall back to the built-in per-type table.
fn try_trait_dispatch(evaluator: &mut Evaluator, op: &str, args: &[Value]) -> Option<Value> {
	let receiver = args.first()?;
	let trait_name = evaluator.traits.trait_for_operator(op)?;
	let method_name = operator_method_name(op);
	match evaluator.traits.resolve(&trait_name, &method_name, receiver) {
		Resolved::Method { function, .. } => Some(evaluator.call_function(function, args.to_vec())),
		Resolved::NotImplemented => None,
	}
}

fn builtin_prefix(evaluator: &Evaluator, op: &str, value: &Value, loc: SourceLoc) -> Value {
	match (op, value) {
		("-", Value::Integer(n)) => Value::Integer(-n),
		("-", Value::Float(n)) => Value::Float(-n),
		("-", Value::BigInt(n)) => Value::BigInt(Rc::new(-(**n).clone())),
		("-", Value::Rational(n)) => Value::Rational(Rc::new(-(**n).clone())),
		("!", Value::Bool(b)) => Value::Bool(!b),
		("~", Value::Integer(n)) => Value::Integer(!n),
		("~", Value::Bits(b)) => {
			let bytes: Vec<u8> = b.bytes.iter().map(|byte| !byte).collect();
			Value::Bits(crate::value::bytes::Bits::new(b.len_bits, bytes))
		}
		_ => evaluator.error_at(
			ErrorKind::UnsupportedOperator,
			format!("operator `{op}` is not defined for type {}", crate::value::runtime_type_name(value)),
			loc,
		),
	}
}

fn builtin_infix(evaluator: &Evaluator, op: &str, left: &Value, right: &Value, loc: SourceLoc) -> Value {
	match op {
		"+" | "-" | "*" | "/" => numeric_binop(evaluator, op, left, right, loc),
		"==" => Value::Bool(values_equal(left, right)),
		"!=" => Value::Bool(!values_equal(left, right)),
		"<" | "<=" | ">" | ">=" => compare_op(evaluator, op, left, right, loc),
		"++" => concat(evaluator, left, right, loc),
		"::" => cons(evaluator, left, right, loc),
		_ => evaluator.error_at(ErrorKind::UnsupportedOperator, format!("unsupported operator `{op}`"), loc),
	}
}

fn numeric_binop(evaluator: &Evaluator, op: &str, left: &Value, right: &Value, loc: SourceLoc) -> Value {
	use crate::value::number::{BigInt, Rational};

	if op == "/" && is_zero(right) {
		return evaluator.error_at(ErrorKind::DivisionByZero, "division by zero", loc);
	}

	match (left, right) {
		(Value::Integer(a), Value::Integer(b)) => match op {
			"+" => Value::Integer(a.wrapping_add(*b)),
			"-" => Value::Integer(a.wrapping_sub(*b)),
			"*" => Value::Integer(a.wrapping_mul(*b)),
			"/" => Value::Integer(a / b),
			_ => unreachable!(),
		},
		(Value::Float(a), Value::Float(b)) => Value::Float(apply_f64(op, *a, *b)),
		(Value::Integer(a), Value::Float(b)) => Value::Float(apply_f64(op, *a as f64, *b)),
		(Value::Float(a), Value::Integer(b)) => Value::Float(apply_f64(op, *a, *b as f64)),
		(Value::BigInt(a), Value::BigInt(b)) => Value::BigInt(Rc::new(apply_bigint(op, a, b))),
		(Value::Integer(a), Value::BigInt(b)) => Value::BigInt(Rc::new(apply_bigint(op, &BigInt::from(*a), b))),
		(Value::BigInt(a), Value::Integer(b)) => Value::BigInt(Rc::new(apply_bigint(op, a, &BigInt::from(*b)))),
		(Value::Rational(a), Value::Rational(b)) => Value::Rational(Rc::new(apply_rational(op, a, b))),
		(Value::Integer(a), Value::Rational(b)) => Value::Rational(Rc::new(apply_rational(op, &Rational::from_integer(BigInt::from(*a)), b))),
		(Value::Rational(a), Value::Integer(b)) => Value::Rational(Rc::new(apply_rational(op, a, &Rational::from_integer(BigInt::from(*b))))),
		_ => evaluator.error_at(
			ErrorKind::TypeMismatch,
			format!("operator `{op}` is not defined between {} and {}", crate::value::runtime_type_name(left), crate::value::runtime_type_name(right)),
			loc,
		),
	}
}

fn is_zero(value: &Value) -> bool {
	use num::Zero;
	match value {
		Value::Integer(n) => *n == 0,
		Value::Float(n) => *n == 0.0,
		Value::BigInt(n) => n.is_zero(),
		Value::Rational(n) => n.is_zero(),
		_ => false,
	}
}

fn apply_f64(op: &str, a: f64, b: f64) -> f64 {
	match op {
		"+" => a + b,
		"-" => a - b,
		"*" => a * b,
		"/" => a / b,
		_ => unreachable!(),
	}
}

fn apply_bigint(op: &str, a: &crate::value::number::BigInt, b: &crate::value::number::BigInt) -> crate::value::number::BigInt {
	match op {
		"+" => a + b,
		"-" => a - b,
		"*" => a * b,
		"/" => a / b,
		_ => unreachable!(),
	}
}

fn apply_rational(op: &str, a: &crate::value::number::Rational, b: &crate::value::number::Rational) -> crate::value::number::Rational {
	match op {
		"+" => a + b,
		"-" => a - b,
		"*" => a * b,
		"/" => a / b,
		_ => unreachable!(),
	}
}

/// Structural equality for everything `Value`'s derived-by-hand `PartialEq`
/// already distinguishes by tag; spec §4.1 "Equality on unknown types is
/// defined structurally as equality of canonical print forms" only adds
/// anything for variants `PartialEq` treats as always-unequal (functions,
/// records across differing field order, etc.), so those fall back to
/// comparing `inspect_canonical`.
pub(super) fn values_equal(left: &Value, right: &Value) -> bool {
	if left == right {
		return true;
	}
	match (left, right) {
		(Value::Record(_), Value::Record(_)) | (Value::Map(_), Value::Map(_)) | (Value::Tuple(_), Value::Tuple(_)) | (Value::List(..), Value::List(..)) => {
			crate::inspect::inspect_canonical(left) == crate::inspect::inspect_canonical(right)
		}
		_ => false,
	}
}

fn compare_op(evaluator: &Evaluator, op: &str, left: &Value, right: &Value, loc: SourceLoc) -> Value {
	match compare_values(left, right) {
		Some(ordering) => {
			let result = match op {
				"<" => ordering == Ordering::Less,
				"<=" => ordering != Ordering::Greater,
				">" => ordering == Ordering::Greater,
				">=" => ordering != Ordering::Less,
				_ => unreachable!(),
			};
			Value::Bool(result)
		}
		None => evaluator.error_at(
			ErrorKind::TypeMismatch,
			format!("`{op}` is not defined between {} and {}", crate::value::runtime_type_name(left), crate::value::runtime_type_name(right)),
			loc,
		),
	}
}

fn compare_values(left: &Value, right: &Value) -> Option<Ordering> {
	match (left, right) {
		(Value::Integer(a), Value::Integer(b)) => Some(a.cmp(b)),
		(Value::Float(a), Value::Float(b)) => a.partial_cmp(b),
		(Value::Integer(a), Value::Float(b)) => (*a as f64).partial_cmp(b),
		(Value::Float(a), Value::Integer(b)) => a.partial_cmp(&(*b as f64)),
		(Value::Char(a), Value::Char(b)) => Some(a.cmp(b)),
		(Value::BigInt(a), Value::BigInt(b)) => Some(a.cmp(b)),
		(Value::Rational(a), Value::Rational(b)) => Some(a.cmp(b)),
		(Value::Bool(a), Value::Bool(b)) => Some(a.cmp(b)),
		(Value::List(a, _), Value::List(b, _)) => compare_seq(&a.to_vec(), &b.to_vec()),
		(Value::Tuple(a), Value::Tuple(b)) => compare_seq(a, b),
		_ => None,
	}
}

fn compare_seq(a: &[Value], b: &[Value]) -> Option<Ordering> {
	for (x, y) in a.iter().zip(b.iter()) {
		match compare_values(x, y) {
			Some(Ordering::Equal) => continue,
			other => return other,
		}
	}
	Some(a.len().cmp(&b.len()))
}

fn concat(evaluator: &Evaluator, left: &Value, right: &Value, loc: SourceLoc) -> Value {
	match (left, right) {
		(Value::List(a, ta), Value::List(b, tb)) => {
			let tag = if ta.as_deref() == Some(crate::value::CHAR_ELEM_TAG) && tb.as_deref() == Some(crate::value::CHAR_ELEM_TAG) {
				ta.clone()
			} else {
				None
			};
			Value::List(a.concat(b), tag)
		}
		(Value::Bytes(a), Value::Bytes(b)) => Value::Bytes(a.concat(b)),
		(Value::Bits(a), Value::Bits(b)) => Value::Bits(a.concat(b)),
		_ => evaluator.error_at(
			ErrorKind::TypeMismatch,
			format!("`++` is not defined between {} and {}", crate::value::runtime_type_name(left), crate::value::runtime_type_name(right)),
			loc,
		),
	}
}

fn cons(evaluator: &Evaluator, left: &Value, right: &Value, loc: SourceLoc) -> Value {
	match right {
		Value::List(list, tag) => Value::List(list.prepend(left.clone()), tag.clone()),
		_ => evaluator.error_at(ErrorKind::TypeMismatch, format!("`::` expects a List on the right, got {}", crate::value::runtime_type_name(right)), loc),
	}
}

fn is_success(data: &crate::value::data::DataInstance) -> bool {
	matches!(data.constructor.as_ref(), "Ok" | "Some")
}

fn is_failure(data: &crate::value::data::DataInstance) -> bool {
	matches!(data.constructor.as_ref(), "Fail" | "Zero")
}

/// Spec §4.1 "`?` try": `Ok x`/`Some x` unwrap to `x`; `Fail`/`Zero`
/// produce a `Return` signal carrying the original value so the
/// enclosing function short-circuits with it.
fn eval_try(value: &Value, loc: SourceLoc) -> Value {
	match value {
		Value::Data(data) if is_success(data) && data.fields.len() == 1 => data.fields[0].clone(),
		Value::Data(data) if is_failure(data) => Value::Signal(Rc::new(Signal::Return(value.clone()))),
		_ => RuntimeError::new(ErrorKind::UnsupportedOperator, format!("`?` expects an Option or Result, got {}", crate::value::runtime_type_name(value))).at(String::new(), loc).into(),
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::eval::Evaluator;
	use crate::traits::MethodTable;
	use crate::value::data::DataInstance;
	use crate::value::error::SourceLoc;
	use crate::value::function::{Function, Param};

	fn loc() -> SourceLoc {
		SourceLoc::default()
	}

	fn env() -> Env {
		Env::root()
	}

	#[test]
	fn addition_prefers_trait_instance_over_builtin() {
		let mut evaluator = Evaluator::new();
		let f = Rc::new(Function {
			name: Some(Rc::from("always_zero")),
			params: Rc::from(vec![Param { pattern: crate::ast::Pattern::Wildcard, annotated_type: None }, Param { pattern: crate::ast::Pattern::Wildcard, annotated_type: None }]),
			body: Rc::new(Expr::IntegerLit(0, loc())),
			return_type: None,
			env: env(),
			loc: loc(),
			file: Rc::from(""),
		});
		let mut methods = MethodTable::default();
		methods.insert(Rc::from(operator_method_name("+").as_str()), f);
		evaluator.traits.register_instance(Rc::from("Num"), Rc::from("Int"), methods);

		let result = eval_infix(&mut evaluator, "+", &Expr::IntegerLit(3, loc()), &Expr::IntegerLit(4, loc()), &env(), loc());
		assert_eq!(result, Value::Integer(0), "a registered instance method must win over the builtin fallback");
	}

	#[test]
	fn addition_falls_back_to_builtin_when_no_instance() {
		let mut evaluator = Evaluator::new();
		let result = eval_infix(&mut evaluator, "+", &Expr::IntegerLit(3, loc()), &Expr::IntegerLit(4, loc()), &env(), loc());
		assert_eq!(result, Value::Integer(7));
	}

	#[test]
	fn division_by_zero_is_an_error() {
		let mut evaluator = Evaluator::new();
		let result = eval_infix(&mut evaluator, "/", &Expr::IntegerLit(1, loc()), &Expr::IntegerLit(0, loc()), &env(), loc());
		assert!(result.is_error());
	}

	#[test]
	fn cons_prepends_onto_a_list() {
		let mut evaluator = Evaluator::new();
		let list_expr = Expr::ListLit { elements: vec![Expr::IntegerLit(2, loc())], elem_type: None, loc: loc() };
		let result = eval_infix(&mut evaluator, "::", &Expr::IntegerLit(1, loc()), &list_expr, &env(), loc());
		match result {
			Value::List(list, _) => assert_eq!(list.to_vec(), vec![Value::Integer(1), Value::Integer(2)]),
			other => panic!("expected a list, got {other:?}"),
		}
	}

	#[test]
	fn try_postfix_unwraps_ok_and_returns_on_fail() {
		let ok = Value::Data(Rc::new(DataInstance::new(Rc::from("Ok"), Rc::from("Result"), vec![Value::Integer(5)])));
		assert_eq!(eval_try(&ok, loc()), Value::Integer(5));

		let fail = Value::Data(Rc::new(DataInstance::new(Rc::from("Fail"), Rc::from("Result"), vec![Value::string("boom")])));
		match eval_try(&fail, loc()) {
			Value::Signal(sig) => assert!(matches!(&*sig, Signal::Return(_))),
			other => panic!("expected a Return signal, got {other:?}"),
		}
	}

	#[test]
	fn structural_equality_covers_records() {
		use crate::value::record::RecordInstance;
		let a = Value::Record(Rc::new(RecordInstance::from_fields(None, vec![(Rc::from("x"), Value::Integer(1))])));
		let b = Value::Record(Rc::new(RecordInstance::from_fields(None, vec![(Rc::from("x"), Value::Integer(1))])));
		assert!(values_equal(&a, &b));
	}
}
