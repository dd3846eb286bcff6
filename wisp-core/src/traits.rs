//! Trait/instance resolver (spec §4.3, component G).
//!
//! Dispatch is keyed on a single `runtime_type_name` per spec §9 "Dynamic
//! dispatch on traits": there is no class hierarchy, just `(trait, type)`
//! lookups plus a default-method fallback: a `(trait, type) -> MethodTable`
//! registry, the same shape as a linker's per-symbol override table.

use std::rc::Rc;

use fxhash::FxHashMap;

use crate::value::error::{ErrorKind, RuntimeError};
use crate::value::function::Function;
use crate::value::{runtime_type_name, Value};

/// The synthetic method name under which operator implementations are
/// stored (spec §4.3: "Method names include operator methods under the
/// synthetic spelling `"(op)"`").
pub fn operator_method_name(op: &str) -> String {
	format!("({op})")
}

pub type MethodTable = FxHashMap<Rc<str>, Rc<Function>>;

/// Context threaded through nullary-method resolution so methods like
/// `mempty`/`pure`, whose return type carries the type parameter, can be
/// disambiguated without it appearing in any argument (spec §4.3).
#[derive(Debug, Clone, Default)]
pub struct ContainerContext {
	pub container_type: Option<Rc<str>>,
}

/// State maintained by the resolver (spec §4.3).
#[derive(Default)]
pub struct TraitRegistry {
	instances: FxHashMap<(Rc<str>, Rc<str>), MethodTable>,
	defaults: FxHashMap<(Rc<str>, Rc<str>), Rc<Function>>,
	operator_traits: FxHashMap<Rc<str>, Rc<str>>,
	extensions: FxHashMap<Rc<str>, MethodTable>,
	/// Reverse index from a bare method name to the trait that declares it
	/// (spec §4.1 "Identifiers resolve by consulting environment, then the
	/// global builtin registry, then the trait-method registry").
	trait_methods: FxHashMap<Rc<str>, (Rc<str>, usize)>,
}

/// The outcome of resolving `(trait, type, method)` to a callable body.
pub enum Resolved {
	/// An instance or default method; `receiver_first` marks default
	/// bodies, which thread `v` as their own first argument (spec §4.3
	/// step 2).
	Method { function: Rc<Function>, receiver_first: bool },
	NotImplemented,
}

impl TraitRegistry {
	pub fn new() -> Self {
		TraitRegistry::default()
	}

	pub fn register_instance(&mut self, trait_name: Rc<str>, type_name: Rc<str>, methods: MethodTable) {
		self.instances.entry((trait_name, type_name)).or_default().extend(methods);
	}

	pub fn register_default(&mut self, trait_name: Rc<str>, method_name: Rc<str>, function: Rc<Function>) {
		self.defaults.insert((trait_name, method_name), function);
	}

	pub fn register_operator_trait(&mut self, op: impl Into<Rc<str>>, trait_name: impl Into<Rc<str>>) {
		self.operator_traits.insert(op.into(), trait_name.into());
	}

	pub fn register_extension(&mut self, type_name: Rc<str>, method_name: Rc<str>, function: Rc<Function>) {
		self.extensions.entry(type_name).or_default().insert(method_name, function);
	}

	/// Declares that `method_name` (with `arity`, not counting the
	/// receiver) belongs to `trait_name`, populated while evaluating a
	/// `TraitDeclaration`'s method signatures.
	pub fn register_trait_method(&mut self, method_name: Rc<str>, trait_name: Rc<str>, arity: usize) {
		self.trait_methods.insert(method_name, (trait_name, arity));
	}

	pub fn lookup_trait_method(&self, method_name: &str) -> Option<(Rc<str>, usize)> {
		self.trait_methods.get(method_name).cloned()
	}

	pub fn trait_for_operator(&self, op: &str) -> Option<Rc<str>> {
		self.operator_traits.get(op).cloned()
	}

	pub fn extension_method(&self, type_name: &str, method_name: &str) -> Option<Rc<Function>> {
		self.extensions.get(type_name).and_then(|table| table.get(method_name)).cloned()
	}

	/// Every method registered for `(trait, type)`, used by `evaluate_module`
	/// to diff the instance table and find newly-added implementations
	/// (spec §4.4).
	pub fn instance_methods(&self, trait_name: &str, type_name: &str) -> Option<&MethodTable> {
		self.instances.get(&(Rc::from(trait_name), Rc::from(type_name)))
	}

	pub fn instance_keys(&self) -> Vec<(Rc<str>, Rc<str>)> {
		self.instances.keys().cloned().collect()
	}

	/// Resolution algorithm of spec §4.3: instance first, then default
	/// (threading `v` as the first argument), else a `TraitNotImplemented`
	/// error.
	pub fn resolve(&self, trait_name: &str, method_name: &str, value: &Value) -> Resolved {
		let type_name = runtime_type_name(value);
		if let Some(table) = self.instances.get(&(Rc::from(trait_name), Rc::from(type_name.as_ref()))) {
			if let Some(function) = table.get(method_name) {
				return Resolved::Method { function: function.clone(), receiver_first: false };
			}
		}
		if let Some(function) = self.defaults.get(&(Rc::from(trait_name), Rc::from(method_name))) {
			return Resolved::Method { function: function.clone(), receiver_first: true };
		}
		Resolved::NotImplemented
	}

	pub fn resolve_or_error(&self, trait_name: &str, method_name: &str, value: &Value) -> Result<(Rc<Function>, bool), RuntimeError> {
		match self.resolve(trait_name, method_name, value) {
			Resolved::Method { function, receiver_first } => Ok((function, receiver_first)),
			Resolved::NotImplemented => {
				let type_name = runtime_type_name(value);
				Err(RuntimeError::new(ErrorKind::TraitNotImplemented, format!("type {type_name} does not implement {trait_name}")))
			}
		}
	}

	/// Resolve a nullary method (e.g. `mempty`, `pure`) whose own
	/// arguments carry no type information, using the container context
	/// set by operator dispatch or an enclosing annotation (spec §4.3).
	pub fn resolve_nullary(&self, trait_name: &str, method_name: &str, ctx: &ContainerContext) -> Option<Rc<Function>> {
		let type_name = ctx.container_type.as_ref()?;
		self.instances.get(&(Rc::from(trait_name), type_name.clone())).and_then(|t| t.get(method_name)).cloned()
	}
}
