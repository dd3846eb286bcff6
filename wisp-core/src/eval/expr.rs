//! Expression evaluation (spec §4.1 "Expressions" through "Assignment") —
//! the single dispatch `eval` delegates to.

use std::rc::Rc;

use crate::ast::{
	AssignExpression, CallExpression, Expr, FunctionLit, IfExpression, IndexExpression, InterpPart, MatchExpression, MemberExpression,
	PatternAssignExpression, RecordLitField,
};
use crate::collections::{PersistentList, PersistentMap};
use crate::env::Env;
use crate::eval::{control, default_value, operators, Evaluator};
use crate::inspect::inspect_display;
use crate::value::bytes::{Bits, Bytes};
use crate::value::data::DataInstance;
use crate::value::error::{ErrorKind, SourceLoc};
use crate::value::function::{Function, Param};
use crate::value::record::RecordInstance;
use crate::value::signals::Signal;
use crate::value::{runtime_type_name, Value, CHAR_ELEM_TAG};

pub fn eval_expr(evaluator: &mut Evaluator, node: &Expr, env: &Env) -> Value {
	match node {
		Expr::Nil(_) => Value::Nil,
		Expr::BoolLit(b, _) => Value::Bool(*b),
		Expr::IntegerLit(n, _) => Value::Integer(*n),
		Expr::FloatLit(n, _) => Value::Float(*n),
		Expr::CharLit(c, _) => Value::Char(*c),
		Expr::StringLit(s, _) => Value::string(s.as_ref()),
		Expr::InterpolatedString(parts, _) => eval_interpolated(evaluator, parts, env),
		Expr::BytesLit { kind, raw, loc } => eval_bytes_lit(evaluator, *kind, raw, *loc),
		Expr::BitsLit { kind, raw, loc } => eval_bits_lit(evaluator, *kind, raw, *loc),
		Expr::ListLit { elements, elem_type, loc } => eval_list_lit(evaluator, elements, elem_type, *loc, env),
		Expr::TupleLit { elements, loc } => eval_tuple_lit(evaluator, elements, *loc, env),
		Expr::MapLit { entries, loc } => eval_map_lit(evaluator, entries, *loc, env),
		Expr::RecordLit { type_name, spread, fields, loc } => eval_record_lit(evaluator, type_name, spread, fields, *loc, env),
		Expr::Identifier(name, _, loc) => eval_identifier(evaluator, env, name, *loc),
		Expr::Member(m) => eval_member(evaluator, m, env),
		Expr::Index(i) => eval_index(evaluator, i, env),
		Expr::Call(c) => eval_call(evaluator, c, env),
		Expr::Prefix { op, expr, loc } => operators::eval_prefix(evaluator, op, expr, env, *loc),
		Expr::Infix { op, left, right, loc } => operators::eval_infix(evaluator, op, left, right, env, *loc),
		Expr::Postfix { op, expr, loc } => operators::eval_postfix(evaluator, op, expr, env, *loc),
		Expr::If(i) => eval_if(evaluator, i, env),
		Expr::Match(m) => eval_match(evaluator, m, env),
		Expr::For(f) => control::eval_for(evaluator, f, env),
		Expr::Assign(a) => eval_assign(evaluator, a, env),
		Expr::PatternAssign(p) => eval_pattern_assign(evaluator, p, env),
		Expr::Block(b) => control::exec_block(evaluator, b, env),
		Expr::FunctionLit(f) => eval_function_lit(evaluator, f, env),
	}
}

fn eval_interpolated(evaluator: &mut Evaluator, parts: &[InterpPart], env: &Env) -> Value {
	let mut out = String::new();
	for part in parts {
		match part {
			InterpPart::Literal(text) => out.push_str(text),
			InterpPart::Expr(expr) => {
				let value = evaluator.eval(expr, env);
				if value.is_control() {
					return value;
				}
				out.push_str(&inspect_display(&value));
			}
		}
	}
	Value::string(out)
}

fn eval_bytes_lit(_evaluator: &Evaluator, kind: crate::ast::BytesKind, raw: &str, loc: SourceLoc) -> Value {
	use crate::ast::BytesKind;
	let result = match kind {
		BytesKind::String => Ok(Bytes::from_utf8(raw)),
		BytesKind::Hex => Bytes::from_hex(raw),
		BytesKind::Bin => Bytes::from_binary(raw),
	};
	match result {
		Ok(bytes) => Value::Bytes(bytes),
		Err(err) => err.at(String::new(), loc).into(),
	}
}

fn eval_bits_lit(_evaluator: &Evaluator, kind: crate::ast::BitsKind, raw: &str, loc: SourceLoc) -> Value {
	use crate::ast::BitsKind;
	let result = match kind {
		BitsKind::Bin => Bits::from_binary(raw),
		BitsKind::Hex => Bits::from_hex(raw),
		BitsKind::Oct => Bits::from_octal(raw),
	};
	match result {
		Ok(bits) => Value::Bits(bits),
		Err(err) => err.at(String::new(), loc).into(),
	}
}

fn eval_list_lit(evaluator: &mut Evaluator, elements: &[Expr], elem_type: &Option<Rc<str>>, _loc: SourceLoc, env: &Env) -> Value {
	let mut items = Vec::with_capacity(elements.len());
	for e in elements {
		let v = evaluator.eval(e, env);
		if v.is_control() {
			return v;
		}
		items.push(v);
	}
	Value::List(PersistentList::from_iter(items), elem_type.clone())
}

fn eval_tuple_lit(evaluator: &mut Evaluator, elements: &[Expr], _loc: SourceLoc, env: &Env) -> Value {
	let mut items = Vec::with_capacity(elements.len());
	for e in elements {
		let v = evaluator.eval(e, env);
		if v.is_control() {
			return v;
		}
		items.push(v);
	}
	Value::Tuple(Rc::from(items))
}

fn eval_map_lit(evaluator: &mut Evaluator, entries: &[(Expr, Expr)], _loc: SourceLoc, env: &Env) -> Value {
	let mut map = PersistentMap::new();
	for (k, v) in entries {
		let key = evaluator.eval(k, env);
		if key.is_control() {
			return key;
		}
		let value = evaluator.eval(v, env);
		if value.is_control() {
			return value;
		}
		map = map.put(key, value);
	}
	Value::Map(map)
}

fn eval_record_lit(evaluator: &mut Evaluator, type_name: &Option<Rc<str>>, spread: &Option<Box<Expr>>, fields: &[RecordLitField], loc: SourceLoc, env: &Env) -> Value {
	let mut record = match spread {
		Some(spread_expr) => {
			let base = evaluator.eval(spread_expr, env);
			if base.is_control() {
				return base;
			}
			match base {
				Value::Record(base) => RecordInstance::spread_from(&base, type_name.clone()),
				other => return evaluator.error_at(ErrorKind::TypeMismatch, format!("record spread requires a record, got {}", runtime_type_name(&other)), loc),
			}
		}
		None => RecordInstance::new(type_name.clone()),
	};
	for field in fields {
		let value = evaluator.eval(&field.value, env);
		if value.is_control() {
			return value;
		}
		record.set(field.name.clone(), value);
	}
	Value::Record(Rc::new(record))
}

/// Identifiers resolve by consulting environment, then the global builtin
/// registry, then the trait-method registry (spec §4.1 "Expressions").
fn eval_identifier(evaluator: &Evaluator, env: &Env, name: &Rc<str>, loc: SourceLoc) -> Value {
	if let Some(value) = env.get(name) {
		return value;
	}
	if let Some(value) = evaluator.lookup_builtin(name) {
		return value;
	}
	if let Some((trait_name, arity)) = evaluator.traits.lookup_trait_method(name) {
		return Value::ClassMethod(Rc::new(crate::value::function::ClassMethod { trait_name, method_name: name.clone(), arity }));
	}
	evaluator.error_at(ErrorKind::IdentifierNotFound, format!("`{name}`"), loc)
}

fn eval_member(evaluator: &mut Evaluator, m: &MemberExpression, env: &Env) -> Value {
	let receiver = evaluator.eval(&m.object, env);
	if receiver.is_control() {
		return receiver;
	}
	if m.optional_chain {
		eval_optional_member(evaluator, receiver, &m.field, m.loc)
	} else {
		eval_plain_member(evaluator, receiver, &m.field, m.loc)
	}
}

fn eval_plain_member(evaluator: &Evaluator, receiver: Value, field: &Rc<str>, loc: SourceLoc) -> Value {
	if let Value::Record(record) = &receiver {
		if let Some(value) = record.get(field) {
			return value.clone();
		}
	}
	let type_name = runtime_type_name(&receiver);
	match evaluator.traits.extension_method(&type_name, field) {
		Some(function) => Value::BoundMethod(Rc::new(crate::value::function::BoundMethod { receiver: Box::new(receiver), method: function })),
		None => evaluator.error_at(ErrorKind::FieldNotFound, format!("no field or method `{field}` on {type_name}"), loc),
	}
}

/// `a?.b` (spec §4.1 "Member and index"): `Optional`-trait-driven
/// short-circuit, unwrap, field access, re-wrap.
fn eval_optional_member(evaluator: &mut Evaluator, receiver: Value, field: &Rc<str>, loc: SourceLoc) -> Value {
	let is_empty_fn = match evaluator.traits.resolve_or_error("Optional", "isEmpty", &receiver) {
		Ok((function, _)) => function,
		Err(err) => return err.into(),
	};
	let is_empty = evaluator.call_function(is_empty_fn, vec![receiver.clone()]);
	if is_empty.is_control() {
		return is_empty;
	}
	if is_empty.truthy() {
		return receiver;
	}

	let unwrap_fn = match evaluator.traits.resolve_or_error("Optional", "unwrap", &receiver) {
		Ok((function, _)) => function,
		Err(err) => return err.into(),
	};
	let inner = evaluator.call_function(unwrap_fn, vec![receiver.clone()]);
	if inner.is_control() {
		return inner;
	}

	let field_value = eval_plain_member(evaluator, inner, field, loc);
	if field_value.is_control() {
		return field_value;
	}

	let wrap_fn = match evaluator.traits.resolve_or_error("Optional", "wrap", &receiver) {
		Ok((function, _)) => function,
		Err(err) => return err.into(),
	};
	evaluator.call_function(wrap_fn, vec![field_value])
}

fn eval_index(evaluator: &mut Evaluator, node: &IndexExpression, env: &Env) -> Value {
	let object = evaluator.eval(&node.object, env);
	if object.is_control() {
		return object;
	}
	let index = evaluator.eval(&node.index, env);
	if index.is_control() {
		return index;
	}
	let loc = node.loc;
	match &object {
		Value::Map(map) => match map.get(&index) {
			Some(value) => some_value(value.clone()),
			None => zero_value(),
		},
		Value::List(list, _) => match &index {
			Value::Integer(i) => match list.get_signed(*i) {
				Some(value) => value.clone(),
				None => evaluator.error_at(ErrorKind::IndexOutOfBounds, format!("index {i} is out of bounds for a list of length {}", list.len()), loc),
			},
			other => evaluator.error_at(ErrorKind::TypeMismatch, format!("list index must be an Int, got {}", runtime_type_name(other)), loc),
		},
		Value::Tuple(items) => match &index {
			Value::Integer(i) => match crate::value::bytes::resolve_index(*i, items.len()).and_then(|idx| items.get(idx)) {
				Some(value) => value.clone(),
				None => evaluator.error_at(ErrorKind::IndexOutOfBounds, format!("index {i} is out of bounds for a tuple of length {}", items.len()), loc),
			},
			other => evaluator.error_at(ErrorKind::TypeMismatch, format!("tuple index must be an Int, got {}", runtime_type_name(other)), loc),
		},
		Value::Bytes(bytes) => match &index {
			Value::Integer(i) => match bytes.get(*i) {
				Some(byte) => some_value(Value::Integer(byte as i64)),
				None => zero_value(),
			},
			other => evaluator.error_at(ErrorKind::TypeMismatch, format!("bytes index must be an Int, got {}", runtime_type_name(other)), loc),
		},
		other => evaluator.error_at(ErrorKind::TypeMismatch, format!("cannot index a value of type {}", runtime_type_name(other)), loc),
	}
}

fn some_value(value: Value) -> Value {
	Value::Data(Rc::new(DataInstance::new(Rc::from("Some"), Rc::from("Option"), vec![value])))
}

fn zero_value() -> Value {
	Value::Data(Rc::new(DataInstance::new(Rc::from("Zero"), Rc::from("Option"), Vec::new())))
}

fn eval_call(evaluator: &mut Evaluator, call: &CallExpression, env: &Env) -> Value {
	if let Expr::Identifier(name, _, _) = call.callee.as_ref() {
		if name.as_ref() == "default" {
			if let [Expr::Identifier(type_name, _, _)] = call.args.as_slice() {
				return default_value::default_value(evaluator, type_name, call.loc);
			}
		}
	}

	let callee = evaluator.eval(&call.callee, env);
	if callee.is_control() {
		return callee;
	}
	let mut args = Vec::with_capacity(call.args.len());
	for a in &call.args {
		let v = evaluator.eval(a, env);
		if v.is_control() {
			return v;
		}
		args.push(v);
	}

	if call.is_tail_call {
		return Value::Signal(Rc::new(Signal::TailCall { callee, args: Rc::from(args), loc: call.loc }));
	}

	let result = evaluator.apply_function(&callee, &args);
	if let Value::Error(err) = &result {
		if !err.has_stack() {
			let mut err = (**err).clone();
			err.attach_stack_if_absent(evaluator.call_stack());
			return Value::Error(Rc::new(err));
		}
	}
	result
}

fn eval_if(evaluator: &mut Evaluator, node: &IfExpression, env: &Env) -> Value {
	let condition = evaluator.eval(&node.condition, env);
	if condition.is_control() {
		return condition;
	}
	if condition.truthy() {
		evaluator.eval(&node.then_branch, env)
	} else {
		match &node.else_branch {
			Some(else_branch) => evaluator.eval(else_branch, env),
			None => Value::Nil,
		}
	}
}

fn eval_match(evaluator: &mut Evaluator, node: &MatchExpression, env: &Env) -> Value {
	let scrutinee = evaluator.eval(&node.scrutinee, env);
	if scrutinee.is_control() {
		return scrutinee;
	}
	for arm in &node.arms {
		let Some(bindings) = evaluator.match_pattern(&arm.pattern, &scrutinee) else { continue };
		let arm_env = env.child();
		for (name, value) in bindings {
			arm_env.set(name, value);
		}
		if let Some(guard) = &arm.guard {
			let guard_result = evaluator.eval(guard, &arm_env);
			if guard_result.is_control() {
				return guard_result;
			}
			if !guard_result.truthy() {
				continue;
			}
		}
		return evaluator.eval(&arm.body, &arm_env);
	}
	evaluator.error_at(ErrorKind::NonExhaustiveMatch, "no match arm matched the value", node.loc)
}

fn eval_assign(evaluator: &mut Evaluator, node: &AssignExpression, env: &Env) -> Value {
	let value = evaluator.eval(&node.value, env);
	if value.is_control() {
		return value;
	}
	let value = match &node.annotated_type {
		Some(annotation) => propagate_annotation(annotation, value),
		None => value,
	};
	match node.target.as_ref() {
		Expr::Identifier(name, _, _) => {
			if !env.update(name, value.clone()) {
				env.set(name.clone(), value.clone());
			}
			value
		}
		_ => evaluator.error_at(ErrorKind::InvalidPattern, "assignment target must be an identifier", node.loc),
	}
}

/// Propagates an assignment's type annotation onto a freshly-produced,
/// not-yet-tagged list or record value (spec §4.1 "Assignment": "it may
/// propagate element type to a list literal and TypeName to a record
/// literal"). A no-op for any value that already carries its own tag —
/// the type checker stamps literal nodes directly, so this only matters
/// when the assigned value came from elsewhere (e.g. a bare call result).
fn propagate_annotation(annotation: &str, value: Value) -> Value {
	match value {
		Value::List(list, None) => match annotation.strip_prefix("List<").and_then(|rest| rest.strip_suffix('>')) {
			Some(elem) => Value::List(list, Some(Rc::from(elem.trim()))),
			None => Value::List(list, None),
		},
		Value::Record(record) if record.type_name.is_none() => {
			let mut record = (*record).clone();
			record.type_name = Some(Rc::from(annotation));
			Value::Record(Rc::new(record))
		}
		other => other,
	}
}

fn eval_pattern_assign(evaluator: &mut Evaluator, node: &PatternAssignExpression, env: &Env) -> Value {
	let value = evaluator.eval(&node.value, env);
	if value.is_control() {
		return value;
	}
	match evaluator.bind(env, &node.pattern, &value) {
		Ok(()) => value,
		Err(err) => err.into(),
	}
}

fn eval_function_lit(evaluator: &Evaluator, lit: &FunctionLit, env: &Env) -> Value {
	let params: Vec<Param> = lit.params.iter().map(|p| Param { pattern: p.pattern.clone(), annotated_type: p.annotated_type.clone() }).collect();
	Value::Function(Rc::new(Function {
		name: lit.name.clone(),
		params: Rc::from(params),
		body: Rc::new((*lit.body).clone()),
		return_type: lit.return_type.clone(),
		env: env.clone(),
		loc: lit.loc,
		file: evaluator.current_file_rc(),
	}))
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::ast::{BitsKind, BytesKind, CallExpression, MatchArm, NodeId, ParamDecl, Pattern};
	use crate::eval::Evaluator;

	fn loc() -> SourceLoc {
		SourceLoc::default()
	}

	#[test]
	fn record_literal_spread_then_explicit_fields_last_writer_wins() {
		let mut evaluator = Evaluator::new();
		let env = Env::root();
		let base = Expr::RecordLit {
			type_name: Some(Rc::from("Point")),
			spread: None,
			fields: vec![RecordLitField { name: Rc::from("x"), value: Expr::IntegerLit(1, loc()) }, RecordLitField { name: Rc::from("y"), value: Expr::IntegerLit(2, loc()) }],
			loc: loc(),
		};
		env.set(Rc::from("p"), eval_expr(&mut evaluator, &base, &env));

		let spread = Expr::RecordLit {
			type_name: None,
			spread: Some(Box::new(Expr::Identifier(Rc::from("p"), NodeId(0), loc()))),
			fields: vec![RecordLitField { name: Rc::from("x"), value: Expr::IntegerLit(99, loc()) }],
			loc: loc(),
		};
		match eval_expr(&mut evaluator, &spread, &env) {
			Value::Record(record) => {
				assert_eq!(record.type_name.as_deref(), Some("Point"));
				assert_eq!(record.get("x"), Some(&Value::Integer(99)));
				assert_eq!(record.get("y"), Some(&Value::Integer(2)));
			}
			other => panic!("expected a record, got {other:?}"),
		}
	}

	#[test]
	fn member_access_falls_back_to_extension_method() {
		let mut evaluator = Evaluator::new();
		let env = Env::root();
		let double = Rc::new(Function {
			name: Some(Rc::from("double")),
			params: Rc::from(vec![crate::value::function::Param { pattern: Pattern::Identifier(Rc::from("self")), annotated_type: None }]),
			body: Rc::new(Expr::Infix {
				op: Rc::from("+"),
				left: Box::new(Expr::Identifier(Rc::from("self"), NodeId(0), loc())),
				right: Box::new(Expr::Identifier(Rc::from("self"), NodeId(1), loc())),
				loc: loc(),
			}),
			return_type: None,
			env: env.clone(),
			loc: loc(),
			file: Rc::from(""),
		});
		evaluator.traits.register_extension(Rc::from("Int"), Rc::from("double"), double);

		let member = Expr::Member(MemberExpression { object: Box::new(Expr::IntegerLit(21, loc())), field: Rc::from("double"), optional_chain: false, loc: loc() });
		let bound = eval_expr(&mut evaluator, &member, &env);
		let result = evaluator.apply_function(&bound, &[]);
		assert_eq!(result, Value::Integer(42));
	}

	#[test]
	fn missing_field_with_no_extension_is_an_error() {
		let mut evaluator = Evaluator::new();
		let env = Env::root();
		let record = Expr::RecordLit { type_name: None, spread: None, fields: vec![], loc: loc() };
		let member = Expr::Member(MemberExpression { object: Box::new(record), field: Rc::from("missing"), optional_chain: false, loc: loc() });
		assert!(eval_expr(&mut evaluator, &member, &env).is_error());
	}

	#[test]
	fn list_index_is_negative_from_end_and_bare_value() {
		let mut evaluator = Evaluator::new();
		let env = Env::root();
		let list = Expr::ListLit { elements: vec![Expr::IntegerLit(10, loc()), Expr::IntegerLit(20, loc()), Expr::IntegerLit(30, loc())], elem_type: None, loc: loc() };
		let index = Expr::Index(IndexExpression { object: Box::new(list), index: Box::new(Expr::IntegerLit(-1, loc())), loc: loc() });
		assert_eq!(eval_expr(&mut evaluator, &index, &env), Value::Integer(30));
	}

	#[test]
	fn map_index_returns_an_option() {
		let mut evaluator = Evaluator::new();
		let env = Env::root();
		let map = Expr::MapLit { entries: vec![(Expr::StringLit(Rc::from("a"), loc()), Expr::IntegerLit(1, loc()))], loc: loc() };
		let hit = Expr::Index(IndexExpression { object: Box::new(map.clone()), index: Box::new(Expr::StringLit(Rc::from("a"), loc())), loc: loc() });
		assert_eq!(eval_expr(&mut evaluator, &hit, &env), some_value(Value::Integer(1)));

		let miss = Expr::Index(IndexExpression { object: Box::new(map), index: Box::new(Expr::StringLit(Rc::from("z"), loc())), loc: loc() });
		assert_eq!(eval_expr(&mut evaluator, &miss, &env), zero_value());
	}

	#[test]
	fn out_of_range_list_index_is_an_error() {
		let mut evaluator = Evaluator::new();
		let env = Env::root();
		let list = Expr::ListLit { elements: vec![Expr::IntegerLit(1, loc())], elem_type: None, loc: loc() };
		let index = Expr::Index(IndexExpression { object: Box::new(list), index: Box::new(Expr::IntegerLit(5, loc())), loc: loc() });
		assert!(eval_expr(&mut evaluator, &index, &env).is_error());
	}

	#[test]
	fn tail_call_node_produces_a_tail_call_signal() {
		let mut evaluator = Evaluator::new();
		let env = Env::root();
		env.set(Rc::from("f"), Value::Nil);
		let call = CallExpression { id: NodeId(0), callee: Box::new(Expr::Identifier(Rc::from("f"), NodeId(1), loc())), args: vec![Expr::IntegerLit(1, loc())], is_tail_call: true, loc: loc() };
		match eval_expr(&mut evaluator, &Expr::Call(call), &env) {
			Value::Signal(sig) => assert!(matches!(&*sig, Signal::TailCall { .. })),
			other => panic!("expected a tail-call signal, got {other:?}"),
		}
	}

	#[test]
	fn default_of_int_is_dispatched_without_evaluating_the_type_name_as_an_identifier() {
		let mut evaluator = Evaluator::new();
		let env = Env::root();
		let call = CallExpression {
			id: NodeId(0),
			callee: Box::new(Expr::Identifier(Rc::from("default"), NodeId(1), loc())),
			args: vec![Expr::Identifier(Rc::from("Int"), NodeId(2), loc())],
			is_tail_call: false,
			loc: loc(),
		};
		assert_eq!(eval_expr(&mut evaluator, &Expr::Call(call), &env), Value::Integer(0));
	}

	#[test]
	fn if_without_else_yields_nil() {
		let mut evaluator = Evaluator::new();
		let env = Env::root();
		let node = IfExpression { condition: Box::new(Expr::BoolLit(false, loc())), then_branch: Box::new(Expr::IntegerLit(1, loc())), else_branch: None, loc: loc() };
		assert_eq!(eval_expr(&mut evaluator, &Expr::If(node), &env), Value::Nil);
	}

	#[test]
	fn match_tries_arms_in_order_and_honors_guards() {
		let mut evaluator = Evaluator::new();
		let env = Env::root();
		let node = MatchExpression {
			scrutinee: Box::new(Expr::IntegerLit(4, loc())),
			arms: vec![
				MatchArm {
					pattern: Pattern::Identifier(Rc::from("n")),
					guard: Some(Expr::Infix {
						op: Rc::from("<"),
						left: Box::new(Expr::Identifier(Rc::from("n"), NodeId(0), loc())),
						right: Box::new(Expr::IntegerLit(0, loc())),
						loc: loc(),
					}),
					body: Expr::StringLit(Rc::from("negative"), loc()),
				},
				MatchArm { pattern: Pattern::Identifier(Rc::from("n")), guard: None, body: Expr::StringLit(Rc::from("anything"), loc()) },
			],
			loc: loc(),
		};
		let result = eval_expr(&mut evaluator, &Expr::Match(node), &env);
		assert_eq!(result, Value::string("anything"));
	}

	#[test]
	fn non_exhaustive_match_is_an_error() {
		let mut evaluator = Evaluator::new();
		let env = Env::root();
		let node = MatchExpression {
			scrutinee: Box::new(Expr::IntegerLit(1, loc())),
			arms: vec![MatchArm { pattern: Pattern::Literal(crate::ast::LiteralPattern::Integer(2)), guard: None, body: Expr::Nil(loc()) }],
			loc: loc(),
		};
		assert!(eval_expr(&mut evaluator, &Expr::Match(node), &env).is_error());
	}

	#[test]
	fn simple_assign_updates_an_existing_binding_rather_than_shadowing() {
		let mut evaluator = Evaluator::new();
		let env = Env::root();
		env.set(Rc::from("x"), Value::Integer(1));
		let child = env.child();
		let assign = AssignExpression { id: NodeId(0), target: Box::new(Expr::Identifier(Rc::from("x"), NodeId(1), loc())), value: Box::new(Expr::IntegerLit(2, loc())), annotated_type: None, loc: loc() };
		eval_expr(&mut evaluator, &Expr::Assign(assign), &child);
		assert_eq!(env.get("x"), Some(Value::Integer(2)));
		assert!(!child.has_local("x"), "update() must find the binding in the parent scope, not shadow it locally");
	}

	#[test]
	fn pattern_assign_destructures_into_the_current_scope() {
		let mut evaluator = Evaluator::new();
		let env = Env::root();
		let tuple = Expr::TupleLit { elements: vec![Expr::IntegerLit(1, loc()), Expr::IntegerLit(2, loc())], loc: loc() };
		let assign = PatternAssignExpression {
			pattern: Pattern::Tuple { elements: vec![Pattern::Identifier(Rc::from("a")), Pattern::Identifier(Rc::from("b"))], spread: None },
			value: Box::new(tuple),
			loc: loc(),
		};
		eval_expr(&mut evaluator, &Expr::PatternAssign(assign), &env);
		assert_eq!(env.get("a"), Some(Value::Integer(1)));
		assert_eq!(env.get("b"), Some(Value::Integer(2)));
	}

	#[test]
	fn function_literal_evaluates_to_a_callable_closure() {
		let mut evaluator = Evaluator::new();
		let env = Env::root();
		let lit = FunctionLit {
			name: None,
			params: vec![ParamDecl { pattern: Pattern::Identifier(Rc::from("x")), annotated_type: None }],
			body: Box::new(Expr::Infix { op: Rc::from("+"), left: Box::new(Expr::Identifier(Rc::from("x"), NodeId(0), loc())), right: Box::new(Expr::IntegerLit(1, loc())), loc: loc() }),
			return_type: None,
			loc: loc(),
		};
		let function = eval_expr(&mut evaluator, &Expr::FunctionLit(lit), &env);
		assert_eq!(evaluator.apply_function(&function, &[Value::Integer(9)]), Value::Integer(10));
	}

	#[test]
	fn bytes_and_bits_literals_decode_their_digits() {
		let mut evaluator = Evaluator::new();
		let env = Env::root();
		let bytes = Expr::BytesLit { kind: BytesKind::Hex, raw: Rc::from("2a"), loc: loc() };
		match eval_expr(&mut evaluator, &bytes, &env) {
			Value::Bytes(b) => assert_eq!(b.to_hex(), "2a"),
			other => panic!("expected bytes, got {other:?}"),
		}
		let bits = Expr::BitsLit { kind: BitsKind::Bin, raw: Rc::from("101"), loc: loc() };
		match eval_expr(&mut evaluator, &bits, &env) {
			Value::Bits(b) => assert_eq!(b.to_binary(), "101"),
			other => panic!("expected bits, got {other:?}"),
		}
	}

	#[test]
	fn interpolated_string_renders_nested_values_unquoted() {
		let mut evaluator = Evaluator::new();
		let env = Env::root();
		let parts = vec![InterpPart::Literal("n=".into()), InterpPart::Expr(Expr::IntegerLit(7, loc()))];
		assert_eq!(eval_expr(&mut evaluator, &Expr::InterpolatedString(parts, loc()), &env), Value::string("n=7"));
	}
}
