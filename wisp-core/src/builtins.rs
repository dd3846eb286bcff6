//! Builtin registration (spec §4.5, component I).
//!
//! The core is agnostic to which thematic areas exist (list, map, string,
//! math, json, …, spec §1 "Individual builtin libraries... are out of
//! scope"); this module only specifies the uniform registration contract
//! those areas plug into, plus the minimal `list`/`map`/`string` virtual
//! modules needed to exercise import resolution end to end (SPEC_FULL §7).

use std::rc::Rc;

use fxhash::FxHashMap;

use crate::value::function::{Builtin, BuiltinFn, EvalContext};
use crate::value::Value;

/// A named, typed, host-implemented function plus its declared signature
/// (spec §3.1, §4.5).
pub fn builtin(name: &str, signature: Option<&str>, implementation: BuiltinFn) -> Rc<Builtin> {
	Rc::new(Builtin { name: Rc::from(name), signature: signature.map(Rc::from), implementation })
}

/// A thematic area's builtin table: name → builtin (spec §4.5 "a map
/// from name to builtin, and a setter that fills in type-signatures").
pub type BuiltinTable = FxHashMap<Rc<str>, Rc<Builtin>>;

/// Registers a single builtin into `table` and immediately binds it into
/// `env` too (spec §4.5 "Registration publishes a builtin into a builtin
/// registry and also into the runtime environment of the consuming
/// module").
pub fn register(table: &mut BuiltinTable, env: &crate::env::Env, function: Rc<Builtin>) {
	env.set(function.name.clone(), Value::Builtin(function.clone()));
	table.insert(function.name.clone(), function);
}

/// One thematic area (spec §4.5 "virtual modules"): a name plus the table
/// of builtins it contributes. `type_signatures` is the setter that fills
/// in declared signatures once the whole area is assembled (kept as a
/// separate step so areas can cross-reference each other's builtins by
/// name before signatures are finalized).
pub struct VirtualModule {
	pub name: Rc<str>,
	pub table: BuiltinTable,
}

impl VirtualModule {
	pub fn exports_record(&self) -> crate::value::record::RecordInstance {
		let fields = self.table.iter().map(|(name, b)| (name.clone(), Value::Builtin(b.clone()))).collect();
		crate::value::record::RecordInstance::from_fields(None, fields)
	}
}

fn arity_error(name: &str, expected: usize, got: usize) -> Value {
	crate::value::error::RuntimeError::new(
		crate::value::error::ErrorKind::WrongArity,
		format!("{name} expects {expected} argument(s), got {got}"),
	)
	.into()
}

/// The `list` virtual module: a minimal but representative slice (`len`,
/// `append`, `get`) used by SPEC_FULL's import-resolution tests. Real
/// coverage of every list/map/string operation is a library concern
/// outside the core (spec §1).
pub fn list_module() -> VirtualModule {
	let mut table = BuiltinTable::default();

	table.insert(
		Rc::from("len"),
		builtin("len", Some("(List<a>) -> Int"), Rc::new(|_ctx: &mut dyn EvalContext, args: &[Value]| match args {
			[Value::List(list, _)] => Value::Integer(list.len() as i64),
			_ => arity_error("len", 1, args.len()),
		}) as BuiltinFn),
	);

	table.insert(
		Rc::from("append"),
		builtin("append", Some("(List<a>, a) -> List<a>"), Rc::new(|_ctx: &mut dyn EvalContext, args: &[Value]| match args {
			[Value::List(list, tag), value] => Value::List(list.append(value.clone()), tag.clone()),
			_ => arity_error("append", 2, args.len()),
		}) as BuiltinFn),
	);

	VirtualModule { name: Rc::from("list"), table }
}

/// The `map` virtual module, mirroring [`list_module`]'s minimal slice.
pub fn map_module() -> VirtualModule {
	let mut table = BuiltinTable::default();

	table.insert(
		Rc::from("len"),
		builtin("len", Some("(Map<a,b>) -> Int"), Rc::new(|_ctx: &mut dyn EvalContext, args: &[Value]| match args {
			[Value::Map(map)] => Value::Integer(map.len() as i64),
			_ => arity_error("len", 1, args.len()),
		}) as BuiltinFn),
	);

	table.insert(
		Rc::from("put"),
		builtin("put", Some("(Map<a,b>, a, b) -> Map<a,b>"), Rc::new(|_ctx: &mut dyn EvalContext, args: &[Value]| match args {
			[Value::Map(map), key, value] => Value::Map(map.put(key.clone(), value.clone())),
			_ => arity_error("put", 3, args.len()),
		}) as BuiltinFn),
	);

	VirtualModule { name: Rc::from("map"), table }
}

/// The `string` virtual module, enough to exercise the `?.` / pattern /
/// trait machinery end to end without pulling in a full string library.
pub fn string_module() -> VirtualModule {
	let mut table = BuiltinTable::default();

	table.insert(
		Rc::from("len"),
		builtin("len", Some("(String) -> Int"), Rc::new(|_ctx: &mut dyn EvalContext, args: &[Value]| match args {
			[Value::List(list, _)] => Value::Integer(list.len() as i64),
			_ => arity_error("len", 1, args.len()),
		}) as BuiltinFn),
	);

	table.insert(
		Rc::from("upper"),
		builtin("upper", Some("(String) -> String"), Rc::new(|_ctx: &mut dyn EvalContext, args: &[Value]| match args {
			[s] => match s.as_rust_string() {
				Some(text) => Value::string(text.to_uppercase()),
				None => crate::value::error::RuntimeError::new(crate::value::error::ErrorKind::TypeMismatch, "upper expects a String").into(),
			},
			_ => arity_error("upper", 1, args.len()),
		}) as BuiltinFn),
	);

	VirtualModule { name: Rc::from("string"), table }
}

/// `lib` fans out to every virtual module (spec §4.4, §6.2).
pub fn all_virtual_modules() -> Vec<VirtualModule> {
	vec![list_module(), map_module(), string_module()]
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::collections::PersistentList;

	struct NullContext;
	impl EvalContext for NullContext {
		fn apply_function(&mut self, _callee: &Value, _args: &[Value]) -> Value {
			Value::Nil
		}
		fn push_frame(&mut self, _frame: crate::value::error::StackFrame) {}
		fn pop_frame(&mut self) {}
		fn current_loc(&self) -> crate::value::error::SourceLoc {
			crate::value::error::SourceLoc::default()
		}
		fn current_file(&self) -> Rc<str> {
			Rc::from("")
		}
	}

	#[test]
	fn list_len_builtin_reports_length() {
		let module = list_module();
		let len = module.table.get("len").unwrap();
		let list = Value::List(PersistentList::from_iter([Value::Integer(1), Value::Integer(2)]), None);
		let mut ctx = NullContext;
		assert_eq!((len.implementation)(&mut ctx, &[list]), Value::Integer(2));
	}

	#[test]
	fn wrong_arity_raises_a_runtime_error() {
		let module = list_module();
		let len = module.table.get("len").unwrap();
		let mut ctx = NullContext;
		assert!((len.implementation)(&mut ctx, &[]).is_error());
	}

	#[test]
	fn exports_record_exposes_every_registered_builtin() {
		let module = map_module();
		let record = module.exports_record();
		assert!(record.has("len"));
		assert!(record.has("put"));
	}
}
