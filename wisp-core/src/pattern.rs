//! Pattern matching (spec §4.2, component E).
//!
//! Matching is pure and total (spec §8 invariant 4): every call returns
//! either `Some(bindings)` with exactly the names the pattern introduces,
//! or `None` with no partial bindings leaked from a sub-pattern that
//! matched before a sibling failed.

use std::rc::Rc;

use fxhash::FxHashMap;

use crate::ast::{LiteralPattern, Pattern, StringPatternPart};
use crate::value::runtime_type_name;
use crate::value::Value;

pub type Bindings = FxHashMap<Rc<str>, Value>;

/// Resolves a type name one alias hop (spec §4.2 "after expanding a type
/// alias"); returns the name unchanged if it is not an alias. The type
/// checker's alias table is outside the core's scope, so callers with no
/// alias information on hand may pass the identity function.
pub type AliasResolver<'a> = &'a dyn Fn(&str) -> Rc<str>;

pub fn identity_resolver(name: &str) -> Rc<str> {
	Rc::from(name)
}

/// Match `value` against `pattern`, threading alias resolution for `Type`
/// patterns. Returns the bindings introduced on success.
pub fn match_pattern(pattern: &Pattern, value: &Value, resolve_alias: AliasResolver) -> Option<Bindings> {
	let mut bindings = Bindings::default();
	if match_into(pattern, value, resolve_alias, &mut bindings) {
		Some(bindings)
	} else {
		None
	}
}

fn match_into(pattern: &Pattern, value: &Value, resolve_alias: AliasResolver, bindings: &mut Bindings) -> bool {
	match pattern {
		Pattern::Wildcard => true,
		Pattern::Identifier(name) => {
			bindings.insert(name.clone(), value.clone());
			true
		}
		Pattern::Literal(lit) => match_literal(lit, value),
		Pattern::Constructor { name, fields } => match value {
			Value::Data(data) if data.constructor.as_ref() == name.as_ref() && data.fields.len() == fields.len() => {
				fields.iter().zip(data.fields.iter()).all(|(p, v)| match_into(p, v, resolve_alias, bindings))
			}
			_ => false,
		},
		Pattern::List { elements, spread } => match sequence_of(value) {
			Some(items) => match_sequence(elements, spread, &items, resolve_alias, bindings),
			None => false,
		},
		Pattern::Tuple { elements, spread } => match sequence_of(value) {
			Some(items) => match_sequence(elements, spread, &items, resolve_alias, bindings),
			None => false,
		},
		Pattern::Record { fields } => match value {
			Value::Record(record) => fields.iter().all(|(name, sub)| match record.get(name) {
				Some(v) => match_into(sub, v, resolve_alias, bindings),
				None => false,
			}),
			_ => false,
		},
		Pattern::Type { binding, type_names } => {
			// A `DataInstance`'s runtime type name is its declaring ADT
			// (`Option`), but a type pattern most often names its constructor
			// (`Some`); check both, after expanding each candidate name one
			// alias hop (spec §4.2).
			let matches = match value {
				Value::Data(data) => type_names.iter().any(|t| {
					let resolved = resolve_alias(t);
					data.constructor.as_ref() == resolved.as_ref() || data.type_name.as_ref() == resolved.as_ref()
				}),
				_ => {
					let actual = runtime_type_name(value);
					type_names.iter().any(|t| resolve_alias(t).as_ref() == actual.as_ref())
				}
			};
			if matches {
				if let Some(name) = binding {
					if name.as_ref() != "_" {
						bindings.insert(name.clone(), value.clone());
					}
				}
			}
			matches
		}
		Pattern::String { parts } => match value.as_rust_string() {
			Some(text) => match_string_template(parts, &text, bindings),
			None => false,
		},
	}
}

fn match_literal(lit: &LiteralPattern, value: &Value) -> bool {
	match (lit, value) {
		(LiteralPattern::Integer(n), Value::Integer(v)) => n == v,
		(LiteralPattern::Float(n), Value::Float(v)) => n == v,
		(LiteralPattern::Bool(n), Value::Bool(v)) => n == v,
		(LiteralPattern::Char(n), Value::Char(v)) => n == v,
		(LiteralPattern::Nil, Value::Nil) => true,
		(LiteralPattern::String(lit), _) => value.as_rust_string().as_deref() == Some(lit.as_ref()),
		_ => false,
	}
}

/// Both `List` and `Tuple` patterns may match either value shape (spec
/// §4.2: "When a value is a List but the pattern is a Tuple... matching
/// is also permitted with identical shape rules").
fn sequence_of(value: &Value) -> Option<Vec<Value>> {
	match value {
		Value::List(list, _) => Some(list.to_vec()),
		Value::Tuple(items) => Some(items.to_vec()),
		_ => None,
	}
}

fn match_sequence(
	elements: &[Pattern],
	spread: &Option<Box<Pattern>>,
	items: &[Value],
	resolve_alias: AliasResolver,
	bindings: &mut Bindings,
) -> bool {
	match spread {
		None => {
			if items.len() != elements.len() {
				return false;
			}
			elements.iter().zip(items.iter()).all(|(p, v)| match_into(p, v, resolve_alias, bindings))
		}
		Some(tail_pattern) => {
			if items.len() < elements.len() {
				return false;
			}
			if !elements.iter().zip(items.iter()).all(|(p, v)| match_into(p, v, resolve_alias, bindings)) {
				return false;
			}
			let rest = Value::List(crate::collections::PersistentList::from_iter(items[elements.len()..].iter().cloned()), None);
			match_into(tail_pattern, &rest, resolve_alias, bindings)
		}
	}
}

/// Match a `"/prefix/{name}"`-style template against the whole string
/// (spec §4.2). Literal segments must match verbatim; a capture consumes
/// up to the next literal segment, or the rest of the string if it is
/// the final part.
fn match_string_template(parts: &[StringPatternPart], text: &str, bindings: &mut Bindings) -> bool {
	let mut cursor = 0usize;
	for (i, part) in parts.iter().enumerate() {
		match part {
			StringPatternPart::Literal(lit) => {
				if !text[cursor..].starts_with(lit.as_str()) {
					return false;
				}
				cursor += lit.len();
			}
			StringPatternPart::Capture(name) => {
				let next_literal = parts[i + 1..].iter().find_map(|p| match p {
					StringPatternPart::Literal(lit) => Some(lit.as_str()),
					StringPatternPart::Capture(_) => None,
				});
				let captured_end = match next_literal {
					Some(lit) if !lit.is_empty() => match text[cursor..].find(lit) {
						Some(offset) => cursor + offset,
						None => return false,
					},
					_ => text.len(),
				};
				bindings.insert(name.clone(), Value::string(&text[cursor..captured_end]));
				cursor = captured_end;
			}
		}
	}
	cursor == text.len()
}
