//! Canonical human-readable printing (spec §4.7, component K).
//!
//! Every value variant has one canonical *structured* form, used both for
//! nested display (inside a list/tuple/record) and as the byte input to
//! the map-key hash (spec §3.4, §8 invariant 1: stable across runs, which
//! holds because nothing here prints a pointer or process-local id).
//! `print`'s top-level rendering differs only in how `String`/`Char`
//! values are quoted (spec §4.7 "unquoted when printed by the top-level
//! `print`, quoted in structured contexts").

use std::fmt::Write;

use crate::value::{Value, CHAR_ELEM_TAG};

/// The form used by the top-level `print`/`println` builtins: text is
/// unquoted.
pub fn inspect_display(value: &Value) -> String {
	let mut out = String::new();
	write_value(value, true, &mut out);
	out
}

/// The form used inside containers, for JSON encoding, and as the
/// map-key hash input: text is quoted and escaped.
pub fn inspect_structured(value: &Value) -> String {
	let mut out = String::new();
	write_value(value, false, &mut out);
	out
}

/// Alias documenting the map-key-hashing use (spec §3.4); identical to
/// [`inspect_structured`].
pub fn inspect_canonical(value: &Value) -> String {
	inspect_structured(value)
}

fn write_value(value: &Value, top: bool, out: &mut String) {
	match value {
		Value::Integer(n) => {
			let _ = write!(out, "{n}");
		}
		Value::Float(n) => {
			let _ = write!(out, "{n}");
		}
		Value::Bool(b) => {
			let _ = write!(out, "{b}");
		}
		Value::Char(c) => {
			if top {
				out.push(*c);
			} else {
				let _ = write!(out, "'{}'", escape_char(*c));
			}
		}
		Value::BigInt(n) => {
			let _ = write!(out, "{n}");
		}
		Value::Rational(r) => {
			let _ = write!(out, "{}/{}", r.numer(), r.denom());
		}
		Value::Nil => out.push_str("nil"),
		Value::Bytes(b) => {
			let _ = write!(out, "@x\"{}\"", b.to_hex());
		}
		Value::Bits(b) => {
			let _ = write!(out, "#b\"{}\"", b.to_binary());
		}
		Value::List(list, tag) if tag.as_deref() == Some(CHAR_ELEM_TAG) => {
			let text: String = list.iter().map(|v| match v {
				Value::Char(c) => *c,
				_ => '\u{FFFD}',
			}).collect();
			if top {
				out.push_str(&text);
			} else {
				let _ = write!(out, "\"{}\"", escape_str(&text));
			}
		}
		Value::List(list, _) => {
			out.push('[');
			for (i, v) in list.iter().enumerate() {
				if i > 0 {
					out.push_str(", ");
				}
				write_value(v, false, out);
			}
			out.push(']');
		}
		Value::Tuple(items) => {
			out.push('(');
			for (i, v) in items.iter().enumerate() {
				if i > 0 {
					out.push_str(", ");
				}
				write_value(v, false, out);
			}
			out.push(')');
		}
		Value::Map(map) => {
			out.push('{');
			let mut entries: Vec<_> = map.iter().collect();
			entries.sort_by(|(a, _), (b, _)| inspect_structured(a).cmp(&inspect_structured(b)));
			for (i, (k, v)) in entries.into_iter().enumerate() {
				if i > 0 {
					out.push_str(", ");
				}
				write_value(k, false, out);
				out.push_str(": ");
				write_value(v, false, out);
			}
			out.push('}');
		}
		Value::Record(record) => {
			if let Some(name) = &record.type_name {
				out.push_str(name);
				out.push(' ');
			}
			out.push('{');
			for (i, (name, v)) in record.fields().iter().enumerate() {
				if i > 0 {
					out.push_str(", ");
				}
				let _ = write!(out, "{name}: ");
				write_value(v, false, out);
			}
			out.push('}');
		}
		Value::Data(data) => {
			if data.fields.is_empty() {
				out.push_str(&data.constructor);
				return;
			}
			let _ = write!(out, "{}(", data.constructor);
			for (i, v) in data.fields.iter().enumerate() {
				if i > 0 {
					out.push_str(", ");
				}
				write_value(v, false, out);
			}
			out.push(')');
		}
		Value::Constructor(ctor) => {
			let _ = write!(out, "<constructor {}/{}>", ctor.name, ctor.arity);
		}
		Value::Function(f) => {
			let _ = write!(out, "<function {}>", f.name.as_deref().unwrap_or("anonymous"));
		}
		Value::Builtin(b) => {
			let _ = write!(out, "<builtin {}>", b.name);
		}
		Value::BoundMethod(m) => {
			let _ = write!(out, "<bound method {}>", m.method.name.as_deref().unwrap_or("anonymous"));
		}
		Value::ClassMethod(m) => {
			let _ = write!(out, "<{}.{}>", m.trait_name, m.method_name);
		}
		Value::Partial(p) => {
			let _ = write!(out, "<partial application of {}>", inspect_structured(&p.callee));
		}
		Value::TypeObject(t) => {
			let _ = write!(out, "<type {}>", t.name);
		}
		Value::Error(e) => {
			let _ = write!(out, "<error {}: {}>", e.kind, e.message);
		}
		Value::Signal(s) => {
			let _ = write!(out, "<signal {}>", s.name());
		}
	}
}

fn escape_char(c: char) -> String {
	match c {
		'\'' => "\\'".into(),
		'\\' => "\\\\".into(),
		'\n' => "\\n".into(),
		'\t' => "\\t".into(),
		'\r' => "\\r".into(),
		_ => c.to_string(),
	}
}

fn escape_str(s: &str) -> String {
	let mut out = String::with_capacity(s.len());
	for c in s.chars() {
		match c {
			'"' => out.push_str("\\\""),
			'\\' => out.push_str("\\\\"),
			'\n' => out.push_str("\\n"),
			'\t' => out.push_str("\\t"),
			'\r' => out.push_str("\\r"),
			_ => out.push(c),
		}
	}
	out
}
