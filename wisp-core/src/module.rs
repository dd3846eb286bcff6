//! Module loader and binder (spec §4.4, §6.2, component H).
//!
//! This module owns the *data structures* cyclic-safe module loading and
//! import-form application need; the orchestration that drives statement
//! evaluation (`Evaluator::evaluate_module`/`evaluate_import`, spec §4.1)
//! lives in [`crate::eval`] and calls back into the helpers here, the same
//! separation a resolver's caching/path-search logic keeps from the loader
//! that drives it.

use std::cell::RefCell;
use std::path::{Path, PathBuf};
use std::rc::Rc;

use fxhash::FxHashMap;
use tracing::{debug, info};

use crate::ast::{ImportFlags, ImportStatement};
use crate::env::Env;
use crate::value::record::RecordInstance;
use crate::value::Value;

/// Where an import path resolves to (spec §6.2).
pub enum ImportTarget {
	/// A single source file, already parsed, at this path.
	Module(PathBuf),
	/// A directory of sub-modules, each with its own exports.
	PackageGroup(PathBuf),
	/// A built-in library by name (`list`, `map`, `string`, `http`, …);
	/// the distinguished name `"lib"` fans out to every virtual module.
	Virtual(Rc<str>),
}

/// Resolve a raw import path string relative to the importing module's
/// directory (spec §6.2): a leading `lib/` or a bare name with no path
/// separator that isn't a file on disk selects a virtual module;
/// otherwise a file or directory is looked up relative to `importer_dir`,
/// falling back to the configured search roots.
pub fn resolve_import_path(importer_dir: &Path, raw_path: &str, search_roots: &[PathBuf]) -> ImportTarget {
	if raw_path == "lib" {
		return ImportTarget::Virtual(Rc::from("lib"));
	}
	if let Some(name) = raw_path.strip_prefix("lib/") {
		return ImportTarget::Virtual(Rc::from(name));
	}

	let candidate = importer_dir.join(raw_path);
	if candidate.is_dir() {
		return ImportTarget::PackageGroup(candidate);
	}
	if candidate.is_file() || candidate.with_extension("wisp").is_file() {
		return ImportTarget::Module(candidate);
	}

	for root in search_roots {
		let candidate = root.join(raw_path);
		if candidate.is_dir() {
			return ImportTarget::PackageGroup(candidate);
		}
		if candidate.is_file() || candidate.with_extension("wisp").is_file() {
			return ImportTarget::Module(candidate);
		}
	}

	if !raw_path.contains(['/', '\\']) {
		return ImportTarget::Virtual(Rc::from(raw_path));
	}

	ImportTarget::Module(candidate)
}

/// The four import forms of spec §4.4, derived from an `ImportStatement`'s
/// flags.
pub enum ImportForm {
	All,
	Symbols(Vec<Rc<str>>),
	Exclude(Vec<Rc<str>>),
	/// Bind the whole module under a name: the explicit `as` alias, or
	/// the last path component.
	Alias(Rc<str>),
}

pub fn import_form(stmt: &ImportStatement, last_path_component: &str) -> ImportForm {
	if stmt.flags.contains(ImportFlags::ALL) {
		ImportForm::All
	} else if stmt.flags.contains(ImportFlags::EXCLUDE) {
		ImportForm::Exclude(stmt.symbols.clone())
	} else if stmt.flags.contains(ImportFlags::SYMBOLS) {
		ImportForm::Symbols(stmt.symbols.clone())
	} else {
		ImportForm::Alias(stmt.alias.clone().unwrap_or_else(|| Rc::from(last_path_component)))
	}
}

/// Copy bindings from a module's `exports` record into `target_env`
/// according to `form` (spec §4.4).
pub fn apply_import(form: &ImportForm, exports: &RecordInstance, target_env: &Env) {
	match form {
		ImportForm::All => {
			for (name, value) in exports.fields() {
				target_env.set(name.clone(), value.clone());
			}
		}
		ImportForm::Symbols(names) => {
			for name in names {
				if let Some(value) = exports.get(name) {
					target_env.set(name.clone(), value.clone());
				}
			}
		}
		ImportForm::Exclude(excluded) => {
			for (name, value) in exports.fields() {
				if !excluded.iter().any(|e| e.as_ref() == name.as_ref()) {
					target_env.set(name.clone(), value.clone());
				}
			}
		}
		ImportForm::Alias(alias) => {
			let record = RecordInstance::from_fields(None, exports.fields().to_vec());
			target_env.set(alias.clone(), Value::Record(Rc::new(record)));
		}
	}
}

/// The exports record of a module, pre-created empty and filled in place
/// (spec §4.4 "Pre-create an exports record... before evaluating any
/// statement. This makes cyclic imports terminate").
pub type ExportsHandle = Rc<RefCell<RecordInstance>>;

/// What a module's evaluation produced, kept across its lifetime so a
/// later importer sees newly-contributed trait instances (spec §4.4
/// "Diff the trait-instance table against the snapshot").
pub struct ModuleRecord {
	pub exports: ExportsHandle,
	pub contributed_instances: Vec<(Rc<str>, Rc<str>)>,
	pub evaluated: bool,
}

/// Cache of modules by resolved path (spec §4.4, §9 "arena + index" —
/// here a `RefCell<FxHashMap>` rather than a `Mutex`, since the evaluator
/// is single-threaded, spec §5).
#[derive(Default)]
pub struct ModuleCache {
	modules: RefCell<FxHashMap<PathBuf, ModuleRecord>>,
}

pub enum CacheLookup {
	/// Already evaluated (or currently being evaluated, for a cyclic
	/// import) — here is its exports handle.
	Cached(ExportsHandle),
	/// Freshly registered; the caller must now evaluate it and fill the
	/// handle in place.
	NeedsEvaluation(ExportsHandle),
}

impl ModuleCache {
	pub fn new() -> Self {
		ModuleCache::default()
	}

	/// Returns the cached record if `path` has been visited before
	/// (filled or still being filled, for a cycle); otherwise registers
	/// a fresh empty exports record immediately, before any statement of
	/// the module runs.
	pub fn get_or_register(&self, path: &Path) -> CacheLookup {
		let mut modules = self.modules.borrow_mut();
		if let Some(record) = modules.get(path) {
			debug!(path = %path.display(), "module cache hit");
			return CacheLookup::Cached(record.exports.clone());
		}
		info!(path = %path.display(), "module cache miss, registering placeholder");
		let exports = Rc::new(RefCell::new(RecordInstance::new(None)));
		modules.insert(path.to_path_buf(), ModuleRecord { exports: exports.clone(), contributed_instances: Vec::new(), evaluated: false });
		CacheLookup::NeedsEvaluation(exports)
	}

	pub fn mark_evaluated(&self, path: &Path, contributed_instances: Vec<(Rc<str>, Rc<str>)>) {
		if let Some(record) = self.modules.borrow_mut().get_mut(path) {
			record.evaluated = true;
			record.contributed_instances = contributed_instances;
		}
	}

	pub fn is_evaluated(&self, path: &Path) -> bool {
		self.modules.borrow().get(path).map(|r| r.evaluated).unwrap_or(false)
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn second_lookup_of_same_path_is_cached_and_shares_the_handle() {
		let cache = ModuleCache::new();
		let path = PathBuf::from("/modules/a.wisp");
		let first = match cache.get_or_register(&path) {
			CacheLookup::NeedsEvaluation(handle) => handle,
			CacheLookup::Cached(_) => panic!("first lookup must register a placeholder"),
		};
		first.borrow_mut().set(Rc::from("f"), Value::Integer(1));
		cache.mark_evaluated(&path, Vec::new());

		match cache.get_or_register(&path) {
			CacheLookup::Cached(handle) => assert_eq!(handle.borrow().get("f"), Some(&Value::Integer(1))),
			CacheLookup::NeedsEvaluation(_) => panic!("second lookup must hit the cache"),
		}
	}

	#[test]
	fn cyclic_lookup_before_evaluation_returns_the_same_placeholder_both_times() {
		let cache = ModuleCache::new();
		let path = PathBuf::from("/modules/a.wisp");
		let handle_a = match cache.get_or_register(&path) {
			CacheLookup::NeedsEvaluation(h) => h,
			CacheLookup::Cached(_) => unreachable!(),
		};
		// A second visitor arrives (e.g. A imports B imports A) before A
		// finishes evaluating: it must see the same not-yet-filled handle.
		let handle_b = match cache.get_or_register(&path) {
			CacheLookup::Cached(h) => h,
			CacheLookup::NeedsEvaluation(_) => panic!("a cyclic revisit must not re-register"),
		};
		assert!(Rc::ptr_eq(&handle_a, &handle_b));
	}

	#[test]
	fn import_all_copies_every_export() {
		let exports = RecordInstance::from_fields(None, vec![(Rc::from("f"), Value::Integer(1)), (Rc::from("g"), Value::Integer(2))]);
		let env = Env::root();
		apply_import(&ImportForm::All, &exports, &env);
		assert_eq!(env.get("f"), Some(Value::Integer(1)));
		assert_eq!(env.get("g"), Some(Value::Integer(2)));
	}

	#[test]
	fn import_exclude_skips_named_symbols() {
		let exports = RecordInstance::from_fields(None, vec![(Rc::from("f"), Value::Integer(1)), (Rc::from("g"), Value::Integer(2))]);
		let env = Env::root();
		apply_import(&ImportForm::Exclude(vec![Rc::from("g")]), &exports, &env);
		assert_eq!(env.get("f"), Some(Value::Integer(1)));
		assert_eq!(env.get("g"), None);
	}

	#[test]
	fn import_alias_binds_the_whole_module_as_a_record() {
		let exports = RecordInstance::from_fields(None, vec![(Rc::from("f"), Value::Integer(1))]);
		let env = Env::root();
		apply_import(&ImportForm::Alias(Rc::from("M")), &exports, &env);
		match env.get("M") {
			Some(Value::Record(record)) => assert_eq!(record.get("f"), Some(&Value::Integer(1))),
			other => panic!("expected a record binding, got {other:?}"),
		}
	}

	#[test]
	fn bare_lib_path_selects_the_fan_out_virtual_module() {
		match resolve_import_path(Path::new("/modules"), "lib", &[]) {
			ImportTarget::Virtual(name) => assert_eq!(name.as_ref(), "lib"),
			_ => panic!("expected a virtual module target"),
		}
	}
}
