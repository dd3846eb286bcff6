use std::rc::Rc;

use crate::value::Value;

/// A named or anonymous record: an ordered set of `(field, value)` pairs,
/// plus an optional `TypeName` carried from a type annotation (spec §3.1).
///
/// Field order is insertion order, matching spec §4.1 "Record literals
/// evaluate... spread... then explicit fields last-writer-wins": the
/// evaluator builds this incrementally and later writes to an existing
/// field must not reorder it.
#[derive(Debug, Clone)]
pub struct RecordInstance {
	pub type_name: Option<Rc<str>>,
	fields: Vec<(Rc<str>, Value)>,
}

impl RecordInstance {
	pub fn new(type_name: Option<Rc<str>>) -> Self {
		RecordInstance { type_name, fields: Vec::new() }
	}

	pub fn from_fields(type_name: Option<Rc<str>>, fields: Vec<(Rc<str>, Value)>) -> Self {
		let mut record = RecordInstance::new(type_name);
		for (name, value) in fields {
			record.set(name, value);
		}
		record
	}

	/// Last-writer-wins: if `name` is already present, its value is
	/// replaced in place (position preserved); otherwise it is appended.
	pub fn set(&mut self, name: Rc<str>, value: Value) {
		if let Some(slot) = self.fields.iter_mut().find(|(n, _)| *n == name) {
			slot.1 = value;
		} else {
			self.fields.push((name, value));
		}
	}

	pub fn get(&self, name: &str) -> Option<&Value> {
		self.fields.iter().find(|(n, _)| n.as_ref() == name).map(|(_, v)| v)
	}

	pub fn has(&self, name: &str) -> bool {
		self.fields.iter().any(|(n, _)| n.as_ref() == name)
	}

	pub fn fields(&self) -> &[(Rc<str>, Value)] {
		&self.fields
	}

	/// Used by `{ ...base, field: value }` record-literal spread: a clone
	/// of `base` with `type_name` preserved unless the literal's own
	/// annotation overrides it (spec §4.1).
	pub fn spread_from(base: &RecordInstance, override_type_name: Option<Rc<str>>) -> Self {
		RecordInstance {
			type_name: override_type_name.or_else(|| base.type_name.clone()),
			fields: base.fields.clone(),
		}
	}
}

impl PartialEq for RecordInstance {
	fn eq(&self, other: &Self) -> bool {
		self.type_name == other.type_name && self.fields == other.fields
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn set_is_last_writer_wins_and_keeps_position() {
		let mut record = RecordInstance::new(None);
		record.set(Rc::from("a"), Value::Integer(1));
		record.set(Rc::from("b"), Value::Integer(2));
		record.set(Rc::from("a"), Value::Integer(99));
		let names: Vec<_> = record.fields().iter().map(|(n, _)| n.to_string()).collect();
		assert_eq!(names, vec!["a", "b"]);
		assert_eq!(record.get("a"), Some(&Value::Integer(99)));
	}

	#[test]
	fn spread_preserves_base_type_name_unless_overridden() {
		let base = RecordInstance::from_fields(Some(Rc::from("Point")), vec![(Rc::from("x"), Value::Integer(1))]);
		let spread = RecordInstance::spread_from(&base, None);
		assert_eq!(spread.type_name.as_deref(), Some("Point"));
		let overridden = RecordInstance::spread_from(&base, Some(Rc::from("Point3")));
		assert_eq!(overridden.type_name.as_deref(), Some("Point3"));
	}
}
