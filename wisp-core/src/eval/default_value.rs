//! `default(T)` (spec §4.1 "Calls", §4.1.1 "Default-value algorithm").
//!
//! Dispatched specially by `eval::expr::eval_call` rather than going
//! through the normal identifier/call path, to avoid the initialization
//! cycle a trait-based `mempty`-style lookup would otherwise create for
//! types that have no instance yet.

use crate::eval::Evaluator;
use crate::value::error::{ErrorKind, SourceLoc};
use crate::value::number::{bigint_zero, rational_zero};
use crate::value::Value;

pub fn default_value(evaluator: &Evaluator, type_name: &str, loc: SourceLoc) -> Value {
	let bare = type_name.split('<').next().unwrap_or(type_name).trim();
	match bare {
		"Int" => Value::Integer(0),
		"Float" => Value::Float(0.0),
		"Bool" => Value::Bool(false),
		"Char" => Value::Char('\0'),
		"BigInt" => Value::BigInt(std::rc::Rc::new(bigint_zero())),
		"Rational" => Value::Rational(std::rc::Rc::new(rational_zero())),
		"Nil" => Value::Nil,
		"List" => Value::List(crate::collections::PersistentList::new(), None),
		"String" => Value::string(""),
		"Map" => Value::Map(crate::collections::PersistentMap::new()),
		"Option" => zero_option(),
		_ => evaluator.error_at(ErrorKind::DefaultUnavailable, format!("no default value for type {bare}"), loc),
	}
}

fn zero_option() -> Value {
	use crate::value::data::DataInstance;
	Value::Data(std::rc::Rc::new(DataInstance::new(std::rc::Rc::from("Zero"), std::rc::Rc::from("Option"), Vec::new())))
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::eval::Evaluator;

	fn loc() -> SourceLoc {
		SourceLoc::default()
	}

	#[test]
	fn numeric_defaults_are_zero() {
		let evaluator = Evaluator::new();
		assert_eq!(default_value(&evaluator, "Int", loc()), Value::Integer(0));
		assert_eq!(default_value(&evaluator, "Float", loc()), Value::Float(0.0));
		assert_eq!(default_value(&evaluator, "Bool", loc()), Value::Bool(false));
	}

	#[test]
	fn parameterized_list_and_option_use_their_bare_name() {
		let evaluator = Evaluator::new();
		match default_value(&evaluator, "List<Int>", loc()) {
			Value::List(list, _) => assert!(list.is_empty()),
			other => panic!("expected empty list, got {other:?}"),
		}
		assert_eq!(default_value(&evaluator, "Option<Int>", loc()), zero_option());
	}

	#[test]
	fn unknown_type_is_an_error() {
		let evaluator = Evaluator::new();
		let result = default_value(&evaluator, "SqlDB", loc());
		assert!(result.is_error());
	}

	#[test]
	fn nil_default_is_the_nil_value() {
		let evaluator = Evaluator::new();
		assert_eq!(default_value(&evaluator, "Nil", loc()), Value::Nil);
	}
}
