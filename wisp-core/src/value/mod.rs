//! The tagged value universe the evaluator operates over (spec §3.1,
//! component A). Every runtime value is one variant of [`Value`]; sum
//! types in the source language (`Object` in spec §9 "DESIGN NOTES") are
//! not given a class hierarchy: one flat enum covers every runtime shape
//! rather than a trait object per kind.

pub mod bytes;
pub mod data;
pub mod error;
pub mod function;
pub mod number;
pub mod record;
pub mod signals;

use std::borrow::Cow;
use std::rc::Rc;

use crate::collections::{PersistentList, PersistentMap};
use crate::value::bytes::{Bits, Bytes};
use crate::value::data::{Constructor, DataInstance};
use crate::value::error::RuntimeError;
use crate::value::function::{BoundMethod, Builtin, ClassMethod, Function, PartialApplication, TypeObject};
use crate::value::number::{BigInt, Rational};
use crate::value::record::RecordInstance;
use crate::value::signals::Signal;

/// The element-type tag that marks a `List<Char>` as the language's
/// `String` (spec §3.1.i).
pub const CHAR_ELEM_TAG: &str = "Char";

#[derive(Debug, Clone)]
pub enum Value {
	Integer(i64),
	Float(f64),
	Bool(bool),
	Char(char),
	BigInt(Rc<BigInt>),
	Rational(Rc<Rational>),
	Nil,
	Bytes(Bytes),
	Bits(Bits),
	/// A persistent sequence plus its optional element-type tag (spec
	/// §3.1.i); `Some("Char")` means this list *is* a `String`.
	List(PersistentList, Option<Rc<str>>),
	Tuple(Rc<[Value]>),
	Map(PersistentMap),
	Record(Rc<RecordInstance>),
	Data(Rc<DataInstance>),
	Constructor(Rc<Constructor>),
	Function(Rc<Function>),
	Builtin(Rc<Builtin>),
	BoundMethod(Rc<BoundMethod>),
	ClassMethod(Rc<ClassMethod>),
	Partial(Rc<PartialApplication>),
	TypeObject(Rc<TypeObject>),
	Error(Rc<RuntimeError>),
	/// A non-value control token (spec §3.1 "Signals"). Never appears
	/// nested inside a constructed data structure.
	Signal(Rc<Signal>),
}

impl Value {
	pub fn string(s: impl AsRef<str>) -> Value {
		let list = PersistentList::from_iter(s.as_ref().chars().map(Value::Char));
		Value::List(list, Some(Rc::from(CHAR_ELEM_TAG)))
	}

	/// Convenience alias kept for call sites that read more naturally as
	/// "a literal string value" (used heavily in tests).
	pub fn from_str_literal(s: &str) -> Value {
		Value::string(s)
	}

	pub fn is_string(&self) -> bool {
		matches!(self, Value::List(_, Some(tag)) if tag.as_ref() == CHAR_ELEM_TAG)
	}

	/// Decode a `String` value (a `List<Char>`) back into a Rust `String`.
	/// Returns `None` if this isn't a char list.
	pub fn as_rust_string(&self) -> Option<String> {
		match self {
			Value::List(list, _) => {
				let mut out = String::with_capacity(list.len());
				for v in list.iter() {
					match v {
						Value::Char(c) => out.push(*c),
						_ => return None,
					}
				}
				Some(out)
			}
			_ => None,
		}
	}

	pub fn is_control(&self) -> bool {
		matches!(self, Value::Error(_) | Value::Signal(_))
	}

	pub fn is_error(&self) -> bool {
		matches!(self, Value::Error(_))
	}

	pub fn error(err: RuntimeError) -> Value {
		Value::Error(Rc::new(err))
	}

	pub fn truthy(&self) -> bool {
		match self {
			Value::Bool(b) => *b,
			Value::Nil => false,
			_ => true,
		}
	}
}

impl From<RuntimeError> for Value {
	fn from(err: RuntimeError) -> Self {
		Value::error(err)
	}
}

/// A single `runtime_type_name` operation used uniformly by pattern
/// matching, trait dispatch and error messages (spec §9 "Dynamic dispatch
/// on traits").
pub fn runtime_type_name(value: &Value) -> Cow<'static, str> {
	match value {
		Value::Integer(_) => Cow::Borrowed("Int"),
		Value::Float(_) => Cow::Borrowed("Float"),
		Value::Bool(_) => Cow::Borrowed("Bool"),
		Value::Char(_) => Cow::Borrowed("Char"),
		Value::BigInt(_) => Cow::Borrowed("BigInt"),
		Value::Rational(_) => Cow::Borrowed("Rational"),
		Value::Nil => Cow::Borrowed("Nil"),
		Value::Bytes(_) => Cow::Borrowed("Bytes"),
		Value::Bits(_) => Cow::Borrowed("Bits"),
		Value::List(_, tag) if tag.as_deref() == Some(CHAR_ELEM_TAG) => Cow::Borrowed("String"),
		Value::List(..) => Cow::Borrowed("List"),
		Value::Tuple(_) => Cow::Borrowed("Tuple"),
		Value::Map(_) => Cow::Borrowed("Map"),
		Value::Record(r) => match &r.type_name {
			Some(name) => Cow::Owned(name.to_string()),
			None => Cow::Borrowed("Record"),
		},
		Value::Data(d) => Cow::Owned(d.type_name.to_string()),
		Value::Constructor(c) => Cow::Owned(c.type_name.to_string()),
		Value::Function(_) => Cow::Borrowed("Function"),
		Value::Builtin(_) => Cow::Borrowed("Function"),
		Value::BoundMethod(_) => Cow::Borrowed("Function"),
		Value::ClassMethod(_) => Cow::Borrowed("Function"),
		Value::Partial(_) => Cow::Borrowed("Function"),
		Value::TypeObject(_) => Cow::Borrowed("Type"),
		Value::Error(_) => Cow::Borrowed("Error"),
		Value::Signal(s) => Cow::Borrowed(s.name()),
	}
}

impl PartialEq for Value {
	fn eq(&self, other: &Self) -> bool {
		use Value::*;
		match (self, other) {
			(Integer(a), Integer(b)) => a == b,
			(Float(a), Float(b)) => a == b,
			(Bool(a), Bool(b)) => a == b,
			(Char(a), Char(b)) => a == b,
			(BigInt(a), BigInt(b)) => a == b,
			(Rational(a), Rational(b)) => a == b,
			(Nil, Nil) => true,
			(Bytes(a), Bytes(b)) => a == b,
			(Bits(a), Bits(b)) => a == b,
			(List(a, ta), List(b, tb)) => ta == tb && a == b,
			(Tuple(a), Tuple(b)) => a == b,
			(Map(a), Map(b)) => a == b,
			(Record(a), Record(b)) => a == b,
			(Data(a), Data(b)) => a == b,
			(Constructor(a), Constructor(b)) => a == b,
			(Function(a), Function(b)) => a == b,
			(Builtin(a), Builtin(b)) => a == b,
			(BoundMethod(a), BoundMethod(b)) => a == b,
			(ClassMethod(a), ClassMethod(b)) => a == b,
			(Partial(a), Partial(b)) => a.callee == b.callee && a.bound_args == b.bound_args,
			(TypeObject(a), TypeObject(b)) => a == b,
			(Error(a), Error(b)) => a == b,
			_ => false,
		}
	}
}
