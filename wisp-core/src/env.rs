use std::cell::RefCell;
use std::rc::Rc;

use fxhash::FxHashMap;

use crate::value::Value;

struct Scope {
	bindings: FxHashMap<Rc<str>, Value>,
	parent: Option<Env>,
}

/// A scoped symbol table with lexical enclosure (spec §3.2, component D).
///
/// `Env` is a cheap `Rc` handle; cloning it shares the same scope (used
/// when a closure captures its defining environment). A *new child
/// scope* is created with [`Env::child`].
#[derive(Clone)]
pub struct Env(Rc<RefCell<Scope>>);

impl Env {
	pub fn root() -> Self {
		Env(Rc::new(RefCell::new(Scope { bindings: FxHashMap::default(), parent: None })))
	}

	pub fn child(&self) -> Self {
		Env(Rc::new(RefCell::new(Scope { bindings: FxHashMap::default(), parent: Some(self.clone()) })))
	}

	/// Look up `name`, walking outward through enclosing scopes.
	pub fn get(&self, name: &str) -> Option<Value> {
		let scope = self.0.borrow();
		if let Some(v) = scope.bindings.get(name) {
			return Some(v.clone());
		}
		scope.parent.as_ref().and_then(|p| p.get(name))
	}

	/// Write to the local scope unconditionally, creating the binding if
	/// absent (spec §4.1 "Assignment": "Simple assignment writes to the
	/// innermost existing binding (if any) or creates one" is implemented
	/// by the evaluator calling [`Env::update`] first and falling back to
	/// this).
	pub fn set(&self, name: Rc<str>, value: Value) {
		self.0.borrow_mut().bindings.insert(name, value);
	}

	/// Write to the nearest enclosing scope that already binds `name`.
	/// Returns `false` if no such scope exists.
	pub fn update(&self, name: &str, value: Value) -> bool {
		let mut scope = self.0.borrow_mut();
		if scope.bindings.contains_key(name) {
			scope.bindings.insert(Rc::from(name), value);
			return true;
		}
		match &scope.parent {
			Some(parent) => {
				let parent = parent.clone();
				drop(scope);
				parent.update(name, value)
			}
			None => false,
		}
	}

	pub fn has_local(&self, name: &str) -> bool {
		self.0.borrow().bindings.contains_key(name)
	}

	/// All names bound directly in this scope (not enclosing ones) —
	/// used to build a module's export record (spec §4.4).
	pub fn local_names(&self) -> Vec<Rc<str>> {
		self.0.borrow().bindings.keys().cloned().collect()
	}

	pub fn local_entries(&self) -> Vec<(Rc<str>, Value)> {
		self.0.borrow().bindings.iter().map(|(k, v)| (k.clone(), v.clone())).collect()
	}

	/// Whether `self` and `other` are handles to the very same scope
	/// (used by `Function`'s `PartialEq`, which compares closures by
	/// identity of body + captured scope rather than deep environment
	/// equality — environments may be cyclic through mutual recursion).
	pub fn same_scope(&self, other: &Env) -> bool {
		Rc::ptr_eq(&self.0, &other.0)
	}
}
