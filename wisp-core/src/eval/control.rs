//! Block, loop and `for` evaluation (spec §4.1 "Control", §4.6 "Block
//! statements observe return/break/continue signals and stop iterating").

use crate::ast::{BlockStatement, ForExpression, Pattern};
use crate::env::Env;
use crate::eval::Evaluator;
use crate::value::error::{ErrorKind, SourceLoc};
use crate::value::signals::Signal;
use crate::value::Value;

/// Runs a block's statements in a fresh child scope, in order; the block's
/// value is its last statement's value (`Nil` if empty). Any control value
/// (an `Error`, or a `Break`/`Continue`/`Return`/`TailCall` signal) stops
/// the block immediately and is returned as-is, for the enclosing
/// loop/call/program to interpret.
pub(super) fn exec_block(evaluator: &mut Evaluator, block: &BlockStatement, env: &Env) -> Value {
	let scope = env.child();
	let mut result = Value::Nil;
	for stmt in &block.statements {
		result = evaluator.exec_stmt(stmt, &scope);
		if result.is_control() {
			return result;
		}
	}
	result
}

/// How a loop body's result should be interpreted (spec §4.1 "`break` and
/// `continue` are signals that escape the current loop").
enum BodyOutcome {
	/// Ordinary completion (or a consumed `continue`): keep looping.
	Next,
	/// `break`/`break e`: stop the loop with this value.
	Break(Value),
	/// An `Error`, `Return`, or cross-function `TailCall`: none of these
	/// belong to this loop, so they propagate to its caller unchanged.
	Stop(Value),
}

fn classify(result: Value) -> BodyOutcome {
	match &result {
		Value::Signal(sig) => match &**sig {
			Signal::Break(value) => BodyOutcome::Break(value.clone()),
			Signal::Continue => BodyOutcome::Next,
			Signal::Return(_) | Signal::TailCall { .. } => BodyOutcome::Stop(result),
		},
		Value::Error(_) => BodyOutcome::Stop(result),
		_ => BodyOutcome::Next,
	}
}

/// Runs one iteration's body and folds the result into the loop's control
/// flow; returns `Some(value)` when the whole loop should stop with
/// `value`, `None` to continue iterating.
fn run_body(evaluator: &mut Evaluator, body: &BlockStatement, env: &Env) -> Option<Value> {
	let result = exec_block(evaluator, body, env);
	match classify(result) {
		BodyOutcome::Next => None,
		BodyOutcome::Break(value) => Some(value),
		BodyOutcome::Stop(value) => Some(value),
	}
}

pub(super) fn eval_for(evaluator: &mut Evaluator, for_expr: &ForExpression, env: &Env) -> Value {
	match for_expr {
		ForExpression::Condition { condition, body, .. } => loop {
			let cond = evaluator.eval(condition, env);
			if cond.is_control() {
				return cond;
			}
			if !cond.truthy() {
				return Value::Nil;
			}
			if let Some(result) = run_body(evaluator, body, &env.child()) {
				return result;
			}
		},
		ForExpression::Iterator { binding, iterable, body, loc } => {
			let iterable_val = evaluator.eval(iterable, env);
			if iterable_val.is_control() {
				return iterable_val;
			}
			match evaluator.traits.resolve("Iter", "iter", &iterable_val) {
				crate::traits::Resolved::Method { function, .. } => {
					let stepper = evaluator.call_function(function, vec![iterable_val]);
					if stepper.is_control() {
						return stepper;
					}
					drive_stepper(evaluator, &stepper, binding, body, env, *loc)
				}
				crate::traits::Resolved::NotImplemented => drive_list(evaluator, &iterable_val, binding, body, env, *loc),
			}
		}
	}
}

fn drive_list(evaluator: &mut Evaluator, iterable: &Value, binding: &Pattern, body: &BlockStatement, env: &Env, loc: SourceLoc) -> Value {
	let items = match iterable {
		Value::List(list, _) => list.to_vec(),
		other => {
			return evaluator.error_at(
				ErrorKind::TypeMismatch,
				format!("cannot iterate a value of type {} (no Iter instance and not a List)", crate::value::runtime_type_name(other)),
				loc,
			);
		}
	};
	for item in items {
		let iter_env = env.child();
		if evaluator.bind(&iter_env, binding, &item).is_err() {
			return evaluator.error_at(ErrorKind::InvalidPattern, "for-loop binding pattern did not match", loc);
		}
		if let Some(result) = run_body(evaluator, body, &iter_env) {
			return result;
		}
	}
	Value::Nil
}

/// Repeatedly invokes the zero-argument `stepper` callable an `Iter`
/// instance returned, binding its `Some(value)` yield each pass and
/// stopping on `Zero` (spec §4.1: "drives the returned stepper which must
/// yield `Option(value)` per step... until `Zero`").
fn drive_stepper(evaluator: &mut Evaluator, stepper: &Value, binding: &Pattern, body: &BlockStatement, env: &Env, loc: SourceLoc) -> Value {
	loop {
		let step = evaluator.apply_function(stepper, &[]);
		if step.is_control() {
			return step;
		}
		let item = match &step {
			Value::Data(data) if data.constructor.as_ref() == "Some" && data.fields.len() == 1 => data.fields[0].clone(),
			Value::Data(data) if data.constructor.as_ref() == "Zero" => return Value::Nil,
			other => {
				return evaluator.error_at(ErrorKind::TypeMismatch, format!("Iter stepper must yield an Option, got {}", crate::value::runtime_type_name(other)), loc);
			}
		};
		let iter_env = env.child();
		if evaluator.bind(&iter_env, binding, &item).is_err() {
			return evaluator.error_at(ErrorKind::InvalidPattern, "for-loop binding pattern did not match", loc);
		}
		if let Some(result) = run_body(evaluator, body, &iter_env) {
			return result;
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::ast::{ConstantDeclaration, Expr, Stmt};
	use crate::eval::Evaluator;
	use crate::value::error::SourceLoc;

	fn loc() -> SourceLoc {
		SourceLoc::default()
	}

	fn block(statements: Vec<Stmt>) -> BlockStatement {
		BlockStatement { statements, loc: loc() }
	}

	#[test]
	fn block_value_is_its_last_statement() {
		let mut evaluator = Evaluator::new();
		let env = Env::root();
		let b = block(vec![Stmt::Expr(Expr::IntegerLit(1, loc())), Stmt::Expr(Expr::IntegerLit(2, loc()))]);
		assert_eq!(exec_block(&mut evaluator, &b, &env), Value::Integer(2));
	}

	#[test]
	fn block_stops_at_the_first_error() {
		let mut evaluator = Evaluator::new();
		let env = Env::root();
		let b = block(vec![
			Stmt::Expr(Expr::Identifier(std::rc::Rc::from("missing"), crate::ast::NodeId(0), loc())),
			Stmt::Expr(Expr::IntegerLit(2, loc())),
		]);
		let result = exec_block(&mut evaluator, &b, &env);
		assert!(result.is_error(), "an unresolved identifier must halt the block, not fall through to the next statement");
	}

	#[test]
	fn condition_for_loop_runs_until_false_and_respects_break() {
		let mut evaluator = Evaluator::new();
		let env = Env::root();
		env.set(std::rc::Rc::from("i"), Value::Integer(0));

		let condition = Expr::Infix {
			op: std::rc::Rc::from("<"),
			left: Box::new(Expr::Identifier(std::rc::Rc::from("i"), crate::ast::NodeId(0), loc())),
			right: Box::new(Expr::IntegerLit(3, loc())),
			loc: loc(),
		};
		let bump = Stmt::Expr(Expr::Assign(crate::ast::AssignExpression {
			id: crate::ast::NodeId(1),
			target: Box::new(Expr::Identifier(std::rc::Rc::from("i"), crate::ast::NodeId(2), loc())),
			value: Box::new(Expr::Infix {
				op: std::rc::Rc::from("+"),
				left: Box::new(Expr::Identifier(std::rc::Rc::from("i"), crate::ast::NodeId(3), loc())),
				right: Box::new(Expr::IntegerLit(1, loc())),
				loc: loc(),
			}),
			annotated_type: None,
			loc: loc(),
		}));
		let for_expr = ForExpression::Condition { condition: Box::new(condition), body: Box::new(block(vec![bump])), loc: loc() };

		let result = eval_for(&mut evaluator, &for_expr, &env);
		assert_eq!(result, Value::Nil);
		assert_eq!(env.get("i"), Some(Value::Integer(3)));
	}

	#[test]
	fn iterator_for_loop_falls_back_to_list_iteration() {
		let mut evaluator = Evaluator::new();
		let env = Env::root();
		let total = std::rc::Rc::from("total");
		env.set(std::rc::Rc::clone(&total), Value::Integer(0));

		let list_expr = Expr::ListLit { elements: vec![Expr::IntegerLit(1, loc()), Expr::IntegerLit(2, loc()), Expr::IntegerLit(3, loc())], elem_type: None, loc: loc() };
		let accumulate = Stmt::Expr(Expr::Assign(crate::ast::AssignExpression {
			id: crate::ast::NodeId(4),
			target: Box::new(Expr::Identifier(std::rc::Rc::clone(&total), crate::ast::NodeId(5), loc())),
			value: Box::new(Expr::Infix {
				op: std::rc::Rc::from("+"),
				left: Box::new(Expr::Identifier(std::rc::Rc::clone(&total), crate::ast::NodeId(6), loc())),
				right: Box::new(Expr::Identifier(std::rc::Rc::from("x"), crate::ast::NodeId(7), loc())),
				loc: loc(),
			}),
			annotated_type: None,
			loc: loc(),
		}));
		let for_expr = ForExpression::Iterator {
			binding: Pattern::Identifier(std::rc::Rc::from("x")),
			iterable: Box::new(list_expr),
			body: Box::new(block(vec![accumulate])),
			loc: loc(),
		};

		eval_for(&mut evaluator, &for_expr, &env);
		assert_eq!(env.get("total"), Some(Value::Integer(6)));
	}

	#[test]
	fn break_with_value_stops_the_loop_immediately() {
		let mut evaluator = Evaluator::new();
		let env = Env::root();
		let list_expr = Expr::ListLit { elements: vec![Expr::IntegerLit(1, loc()), Expr::IntegerLit(2, loc())], elem_type: None, loc: loc() };
		let break_stmt = Stmt::Break(crate::ast::BreakStatement { value: Some(Box::new(Expr::IntegerLit(99, loc()))), loc: loc() });
		let for_expr =
			ForExpression::Iterator { binding: Pattern::Wildcard, iterable: Box::new(list_expr), body: Box::new(block(vec![break_stmt])), loc: loc() };
		let result = eval_for(&mut evaluator, &for_expr, &env);
		assert_eq!(result, Value::Integer(99));
	}

	#[test]
	fn exported_const_decl_inside_a_block_is_local_to_its_scope() {
		let mut evaluator = Evaluator::new();
		let env = Env::root();
		let b = block(vec![Stmt::ConstDecl(ConstantDeclaration { name: Some(std::rc::Rc::from("y")), pattern: None, value: Expr::IntegerLit(5, loc()), exported: false, loc: loc() })]);
		exec_block(&mut evaluator, &b, &env);
		assert_eq!(env.get("y"), None, "a block's own declarations must not leak into the enclosing scope");
	}
}
