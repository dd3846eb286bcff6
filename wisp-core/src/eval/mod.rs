//! The evaluator (spec §4.1, component F): walks statements/expressions,
//! drives calls, operators, control flow and tail calls. This is the
//! largest component (spec §2: ~22% of the implementation budget) so its
//! methods are split across sibling files, one `impl Evaluator` block per
//! concern, all on the one type defined here.

mod control;
mod default_value;
mod expr;
mod operators;

use std::path::{Path, PathBuf};
use std::rc::Rc;

use tracing::{instrument, trace};

use crate::ast::{
	ConstantDeclaration, ExtensionFunctionStatement, FunctionDecl, InstanceDeclaration, Program, Stmt, TraitDeclaration, TypeDeclaration,
};
use crate::builtins::{self, BuiltinTable, VirtualModule};
use crate::config::EngineConfig;
use crate::env::Env;
use crate::module::{self, CacheLookup, ImportTarget, ModuleCache};
use crate::pattern::{self, Bindings};
use crate::traits::{ContainerContext, TraitRegistry};
use crate::value::data::{Constructor, DataInstance};
use crate::value::error::{ErrorKind, RuntimeError, SourceLoc, StackFrame};
use crate::value::function::{BoundMethod, BuiltinFn, EvalContext, Function, Param, PartialApplication, TypeObject};
use crate::value::record::RecordInstance;
use crate::value::signals::Signal;
use crate::value::Value;

pub use crate::eval::default_value::default_value;

/// Parsed source plus the directory it was resolved from — the shape
/// `evaluate_module` consumes (spec §4.4: "it holds its files (already
/// parsed)... and a set of exported identifier names").
pub struct ModuleSource {
	pub path: PathBuf,
	pub program: Program,
}

pub struct Evaluator {
	pub traits: TraitRegistry,
	pub module_cache: ModuleCache,
	config: EngineConfig,
	builtins: BuiltinTable,
	root_env: Env,
	call_stack: Vec<StackFrame>,
	container_context: ContainerContext,
	type_aliases: fxhash::FxHashMap<Rc<str>, Rc<str>>,
	current_file: Rc<str>,
	current_loc: SourceLoc,
}

impl Evaluator {
	pub fn new() -> Self {
		Evaluator::with_config(EngineConfig::default())
	}

	pub fn with_config(config: EngineConfig) -> Self {
		let mut traits = TraitRegistry::new();
		EngineConfig::default_operator_traits(&mut traits);

		let root_env = Env::root();
		install_builtin_types(&root_env);
		install_io_builtins(&root_env, config.output.clone());

		// Virtual modules (`list`, `map`, `string`, ...) are bound only on
		// explicit `import` (spec §4.4, §6.2); `builtins` here is the
		// separate always-resolvable registry spec §4.1's identifier
		// fallback chain consults after the environment, empty until a
		// future builtin area registers into it directly.
		let builtins = BuiltinTable::default();

		Evaluator {
			traits,
			module_cache: ModuleCache::new(),
			config,
			builtins,
			root_env,
			call_stack: Vec::new(),
			container_context: ContainerContext::default(),
			type_aliases: fxhash::FxHashMap::default(),
			current_file: Rc::from(""),
			current_loc: SourceLoc::default(),
		}
	}

	fn resolve_alias(&self, name: &str) -> Rc<str> {
		self.type_aliases.get(name).cloned().unwrap_or_else(|| Rc::from(name))
	}

	fn alias_resolver(&self) -> impl Fn(&str) -> Rc<str> + '_ {
		move |name| self.resolve_alias(name)
	}

	fn match_pattern(&self, pattern: &crate::ast::Pattern, value: &Value) -> Option<Bindings> {
		pattern::match_pattern(pattern, value, &self.alias_resolver())
	}

	fn bind(&self, env: &Env, pattern: &crate::ast::Pattern, value: &Value) -> Result<(), RuntimeError> {
		match self.match_pattern(pattern, value) {
			Some(bindings) => {
				for (name, v) in bindings {
					env.set(name, v);
				}
				Ok(())
			}
			None => Err(RuntimeError::new(ErrorKind::InvalidPattern, "pattern did not match value")),
		}
	}

	/// Builds an error value stamped with the current module file and a
	/// source location, the shape every `eval::` submodule raises errors
	/// through (spec §7 "kind, message, line/column").
	fn error_at(&self, kind: ErrorKind, message: impl Into<String>, loc: SourceLoc) -> Value {
		RuntimeError::new(kind, message).at(self.current_file.to_string(), loc).into()
	}

	fn lookup_builtin(&self, name: &str) -> Option<Value> {
		self.builtins.get(name).map(|b| Value::Builtin(b.clone()))
	}

	/// The current call stack, newest frame last (spec §4.6): exposed for
	/// `eval::expr`'s call-boundary error handler to attach a trace.
	pub(super) fn call_stack(&self) -> &[StackFrame] {
		&self.call_stack
	}

	pub(super) fn current_file_rc(&self) -> Rc<str> {
		self.current_file.clone()
	}

	// ----- Public contract (spec §4.1) -----------------------------------

	#[instrument(level = "trace", skip_all)]
	pub fn eval(&mut self, node: &crate::ast::Expr, env: &Env) -> Value {
		trace!("eval");
		expr::eval_expr(self, node, env)
	}

	pub fn exec_stmt(&mut self, stmt: &Stmt, env: &Env) -> Value {
		match stmt {
			Stmt::Expr(e) => self.eval(e, env),
			Stmt::Block(block) => control::exec_block(self, block, env),
			Stmt::ConstDecl(decl) => self.exec_const_decl(decl, env),
			Stmt::TypeDecl(decl) => self.exec_type_decl(decl, env),
			Stmt::TraitDecl(decl) => self.exec_trait_decl(decl, env),
			Stmt::InstanceDecl(decl) => self.exec_instance_decl(decl, env),
			Stmt::ExtensionFn(decl) => self.exec_extension_fn(decl, env),
			Stmt::Break(b) => {
				let value = match &b.value {
					Some(e) => self.eval(e, env),
					None => Value::Nil,
				};
				if value.is_control() {
					return value;
				}
				Value::Signal(Rc::new(Signal::Break(value)))
			}
			Stmt::Continue(_) => Value::Signal(Rc::new(Signal::Continue)),
			Stmt::Import(stmt) => self.exec_import(stmt, env),
		}
	}

	fn exec_const_decl(&mut self, decl: &ConstantDeclaration, env: &Env) -> Value {
		let value = self.eval(&decl.value, env);
		if value.is_control() {
			return value;
		}
		match &decl.pattern {
			Some(pattern) => {
				if let Err(err) = self.bind(env, pattern, &value) {
					return err.into();
				}
			}
			None => {
				if let Some(name) = &decl.name {
					env.set(name.clone(), value.clone());
				}
			}
		}
		value
	}

	fn exec_type_decl(&mut self, decl: &TypeDeclaration, env: &Env) -> Value {
		if let Some(target) = &decl.alias_target {
			self.type_aliases.insert(decl.name.clone(), target.clone());
			return Value::Nil;
		}
		env.set(decl.name.clone(), Value::TypeObject(Rc::new(TypeObject { name: decl.name.clone() })));
		for ctor in &decl.constructors {
			let value = if ctor.arity == 0 {
				Value::Data(Rc::new(DataInstance::new(ctor.name.clone(), decl.name.clone(), Vec::new())))
			} else {
				Value::Constructor(Rc::new(Constructor { name: ctor.name.clone(), type_name: decl.name.clone(), arity: ctor.arity }))
			};
			env.set(ctor.name.clone(), value);
		}
		Value::Nil
	}

	fn exec_trait_decl(&mut self, decl: &TraitDeclaration, env: &Env) -> Value {
		for method in &decl.methods {
			let name: Rc<str> = if method.is_operator { Rc::from(crate::traits::operator_method_name(&method.name).as_str()) } else { method.name.clone() };
			self.traits.register_trait_method(name, decl.name.clone(), method.arity);
		}
		for default_fn in &decl.defaults {
			let function = self.make_function(default_fn, env);
			let method_name: Rc<str> = default_fn.name.clone();
			self.traits.register_default(decl.name.clone(), method_name, function);
		}
		Value::Nil
	}

	fn exec_instance_decl(&mut self, decl: &InstanceDeclaration, env: &Env) -> Value {
		let mut methods = crate::traits::MethodTable::default();
		for method_fn in &decl.methods {
			let function = self.make_function(method_fn, env);
			methods.insert(method_fn.name.clone(), function);
		}
		self.traits.register_instance(decl.trait_name.clone(), decl.target_type.clone(), methods);
		Value::Nil
	}

	fn exec_extension_fn(&mut self, decl: &ExtensionFunctionStatement, env: &Env) -> Value {
		let function = self.make_function(&decl.function, env);
		self.traits.register_extension(decl.receiver_type.clone(), decl.function.name.clone(), function);
		Value::Nil
	}

	fn make_function(&self, decl: &FunctionDecl, env: &Env) -> Rc<Function> {
		let params: Vec<Param> = decl.params.iter().map(|p| Param { pattern: p.pattern.clone(), annotated_type: p.annotated_type.clone() }).collect();
		Rc::new(Function {
			name: Some(decl.name.clone()),
			params: Rc::from(params),
			body: Rc::new(decl.body.clone()),
			return_type: decl.return_type.clone(),
			env: env.clone(),
			loc: decl.loc,
			file: self.current_file.clone(),
		})
	}

	// ----- Calls & tail calls (spec §4.1 "Calls", §9 "Tail calls") -------

	pub fn apply_function(&mut self, callee: &Value, args: &[Value]) -> Value {
		match callee {
			Value::Function(f) => self.call_function(f.clone(), args.to_vec()),
			Value::Builtin(b) => {
				let implementation = b.implementation.clone();
				implementation(self, args)
			}
			Value::BoundMethod(bound) => {
				let mut full_args = Vec::with_capacity(args.len() + 1);
				full_args.push((*bound.receiver).clone());
				full_args.extend_from_slice(args);
				self.call_function(bound.method.clone(), full_args)
			}
			Value::ClassMethod(class_method) => self.apply_class_method(class_method, args),
			Value::Partial(partial) => {
				let mut full_args = partial.bound_args.to_vec();
				full_args.extend_from_slice(args);
				self.apply_function(&partial.callee, &full_args)
			}
			Value::Constructor(ctor) => {
				if args.len() == ctor.arity {
					Value::Data(Rc::new(DataInstance::new(ctor.name.clone(), ctor.type_name.clone(), args.to_vec())))
				} else if args.len() < ctor.arity {
					Value::Partial(Rc::new(PartialApplication { callee: Box::new(callee.clone()), bound_args: Rc::from(args.to_vec()) }))
				} else {
					RuntimeError::new(ErrorKind::WrongArity, format!("{} expects {} argument(s), got {}", ctor.name, ctor.arity, args.len())).into()
				}
			}
			Value::Error(_) => callee.clone(),
			other => RuntimeError::new(ErrorKind::Uncallable, format!("value of type {} is not callable", crate::value::runtime_type_name(other))).into(),
		}
	}

	fn apply_class_method(&mut self, class_method: &crate::value::function::ClassMethod, args: &[Value]) -> Value {
		let Some(receiver) = args.first() else {
			return RuntimeError::new(ErrorKind::WrongArity, format!("{} expects at least 1 argument, got 0", class_method.method_name)).into();
		};
		let (function, receiver_first) = match self.traits.resolve_or_error(&class_method.trait_name, &class_method.method_name, receiver) {
			Ok(pair) => pair,
			Err(err) => return err.into(),
		};
		let call_args = if receiver_first { args.to_vec() } else { args[1..].to_vec() };
		self.call_function(function, call_args)
	}

	/// The tail-call loop (spec §9 "Tail calls"): a function application
	/// owns the `TailCall` token. If the body ends with one whose callee
	/// is this very function, parameters are rebound and the loop
	/// continues without growing the Rust call stack; otherwise the call
	/// is simply re-applied (which may itself recurse through this
	/// function, for cross-function tail calls — at normal Rust stack
	/// cost, matching spec §9's "otherwise it re-applies").
	fn call_function(&mut self, mut f: Rc<Function>, mut args: Vec<Value>) -> Value {
		loop {
			if f.params.len() != args.len() {
				return RuntimeError::new(ErrorKind::WrongArity, format!("{} expects {} argument(s), got {}", f.name.as_deref().unwrap_or("<anonymous>"), f.params.len(), args.len())).into();
			}
			let call_env = f.env.child();
			for (param, value) in f.params.iter().zip(args.iter()) {
				if let Err(err) = self.bind(&call_env, &param.pattern, value) {
					return err.into();
				}
			}

			self.push_frame(StackFrame { function: f.name.as_deref().unwrap_or("<anonymous>").to_string(), file: f.file.to_string(), line: f.loc.line, column: f.loc.column });
			let result = self.eval(&f.body, &call_env);

			if let Value::Error(err) = &result {
				if !err.has_stack() {
					let mut err = (**err).clone();
					err.attach_stack_if_absent(&self.call_stack);
					self.pop_frame();
					return Value::Error(Rc::new(err));
				}
			}
			self.pop_frame();

			match result {
				Value::Signal(sig) => match &*sig {
					Signal::TailCall { callee, args: next_args, .. } => match callee {
						Value::Function(next_f) if Rc::ptr_eq(next_f, &f) => {
							f = next_f.clone();
							args = next_args.to_vec();
							continue;
						}
						_ => return self.apply_function(callee, next_args),
					},
					Signal::Return(value) => return value.clone(),
					Signal::Break(_) | Signal::Continue => return Value::Signal(sig.clone()),
				},
				other => return other,
			}
		}
	}

	pub fn container_context(&self) -> &ContainerContext {
		&self.container_context
	}

	pub fn set_container_context(&mut self, type_name: Option<Rc<str>>) {
		self.container_context = ContainerContext { container_type: type_name };
	}

	// ----- Modules (spec §4.4, component H) ------------------------------

	#[instrument(level = "info", skip(self, load_source))]
	pub fn evaluate_module(&mut self, path: &Path, load_source: impl FnOnce(&Path) -> Result<ModuleSource, RuntimeError>) -> module::ExportsHandle {
		match self.module_cache.get_or_register(path) {
			CacheLookup::Cached(exports) => exports,
			CacheLookup::NeedsEvaluation(exports) => {
				let source = match load_source(path) {
					Ok(source) => source,
					Err(err) => {
						exports.borrow_mut().set(Rc::from("__error"), err.into());
						self.module_cache.mark_evaluated(path, Vec::new());
						return exports;
					}
				};

				let previous_file = std::mem::replace(&mut self.current_file, Rc::from(source.path.to_string_lossy().as_ref()));
				let snapshot = self.traits.instance_keys();
				let module_env = self.root_env.child();

				let mut halted_on_error = None;
				for stmt in &source.program.statements {
					let result = self.exec_stmt(stmt, &module_env);
					if result.is_error() {
						halted_on_error = Some(result);
						break;
					}
				}

				let export_names = export_set(&source.program);
				let mut record = RecordInstance::new(None);
				for name in export_names {
					if let Some(value) = module_env.get(&name) {
						record.set(name, value);
					}
				}
				if let Some(err) = halted_on_error {
					record.set(Rc::from("__error"), err);
				}
				*exports.borrow_mut() = record;

				let after = self.traits.instance_keys();
				let contributed: Vec<_> = after.into_iter().filter(|k| !snapshot.contains(k)).collect();
				self.module_cache.mark_evaluated(path, contributed);
				self.current_file = previous_file;
				exports
			}
		}
	}

	/// Applies one `import` statement (spec §4.4, §6.2). `importer_dir` is
	/// the directory of the module containing the import; `load_source`
	/// parses a file at a resolved path into a [`ModuleSource`].
	pub fn evaluate_import(
		&mut self,
		stmt: &crate::ast::ImportStatement,
		importer_dir: &Path,
		target_env: &Env,
		load_source: impl Fn(&Path) -> Result<ModuleSource, RuntimeError> + Clone,
	) -> Value {
		let last_component = stmt.path.rsplit(['/', '\\']).next().unwrap_or(&stmt.path);
		let form = module::import_form(stmt, last_component);

		match module::resolve_import_path(importer_dir, &stmt.path, &self.config.module_search_roots) {
			ImportTarget::Module(path) => {
				let exports = self.evaluate_module(&path, load_source.clone());
				let exports = exports.borrow();
				if let Some(err) = exports.get("__error") {
					return err.clone();
				}
				module::apply_import(&form, &exports, target_env);
				Value::Nil
			}
			ImportTarget::PackageGroup(dir) => {
				let Ok(entries) = std::fs::read_dir(&dir) else {
					return RuntimeError::new(ErrorKind::ImportError, format!("cannot read package group {}", dir.display())).into();
				};
				for entry in entries.flatten() {
					let path = entry.path();
					if path.extension().is_some_and(|ext| ext == "wisp") {
						let exports = self.evaluate_module(&path, load_source.clone());
						let exports = exports.borrow();
						module::apply_import(&form, &exports, target_env);
					}
				}
				Value::Nil
			}
			ImportTarget::Virtual(name) => {
				let modules: Vec<VirtualModule> = if name.as_ref() == "lib" {
					builtins::all_virtual_modules()
				} else {
					builtins::all_virtual_modules().into_iter().filter(|m| m.name.as_ref() == name.as_ref()).collect()
				};
				if modules.is_empty() {
					return RuntimeError::new(ErrorKind::ImportError, format!("no such virtual module `{name}`")).into();
				}
				for module in modules {
					module::apply_import(&form, &module.exports_record(), target_env);
				}
				Value::Nil
			}
		}
	}

	fn exec_import(&mut self, stmt: &crate::ast::ImportStatement, env: &Env) -> Value {
		let importer_dir = Path::new(self.current_file.as_ref()).parent().map(Path::to_path_buf).unwrap_or_default();
		self.evaluate_import(stmt, &importer_dir, env, |_path| {
			Err(RuntimeError::new(ErrorKind::ImportError, "source loading is outside the core; wire a real loader via evaluate_import"))
		})
	}
}

impl Default for Evaluator {
	fn default() -> Self {
		Evaluator::new()
	}
}

impl EvalContext for Evaluator {
	fn apply_function(&mut self, callee: &Value, args: &[Value]) -> Value {
		Evaluator::apply_function(self, callee, args)
	}

	fn push_frame(&mut self, frame: StackFrame) {
		self.current_loc = SourceLoc { line: frame.line, column: frame.column };
		self.call_stack.push(frame);
	}

	fn pop_frame(&mut self) {
		self.call_stack.pop();
	}

	fn current_loc(&self) -> SourceLoc {
		self.current_loc
	}

	fn current_file(&self) -> Rc<str> {
		self.current_file.clone()
	}
}

/// Names a module's evaluation contributes to its export record (spec
/// §4.4): explicitly-exported constants/patterns, plus every type name
/// and constructor a `TypeDeclaration` introduces — ADTs have no private
/// constructors in this language, so they are always visible to an
/// importer (an Open Question spec.md leaves implicit; resolved here and
/// recorded in DESIGN.md).
fn export_set(program: &Program) -> Vec<Rc<str>> {
	let mut names = Vec::new();
	for stmt in &program.statements {
		match stmt {
			Stmt::ConstDecl(decl) if decl.exported => {
				if let Some(name) = &decl.name {
					names.push(name.clone());
				} else if let Some(pattern) = &decl.pattern {
					collect_pattern_names(pattern, &mut names);
				}
			}
			Stmt::TypeDecl(decl) => {
				names.push(decl.name.clone());
				for ctor in &decl.constructors {
					names.push(ctor.name.clone());
				}
			}
			_ => {}
		}
	}
	names
}

fn collect_pattern_names(pattern: &crate::ast::Pattern, out: &mut Vec<Rc<str>>) {
	use crate::ast::Pattern::*;
	match pattern {
		Identifier(name) => out.push(name.clone()),
		Constructor { fields, .. } => fields.iter().for_each(|p| collect_pattern_names(p, out)),
		List { elements, spread } | Tuple { elements, spread } => {
			elements.iter().for_each(|p| collect_pattern_names(p, out));
			if let Some(spread) = spread {
				collect_pattern_names(spread, out);
			}
		}
		Record { fields } => fields.iter().for_each(|(_, p)| collect_pattern_names(p, out)),
		Type { binding: Some(name), .. } if name.as_ref() != "_" => out.push(name.clone()),
		_ => {}
	}
}

/// Registers the built-in types of spec §6.4 into a fresh root
/// environment: primitive `TypeObject`s, and the `Option`/`Result`/`Json`
/// constructors every module sees without an import.
fn install_builtin_types(env: &Env) {
	let type_names = ["Int", "Float", "Bool", "Char", "BigInt", "Rational", "List", "String", "Map", "Option", "Result", "Json", "Type"];
	for name in type_names {
		env.set(Rc::from(name), Value::TypeObject(Rc::new(TypeObject { name: Rc::from(name) })));
	}
	// `Nil` is the value, not the type object (spec §3.1.iv): the single
	// inhabitant takes the identifier over a reified type.
	env.set(Rc::from("Nil"), Value::Nil);

	env.set(Rc::from("Some"), Value::Constructor(Rc::new(Constructor { name: Rc::from("Some"), type_name: Rc::from("Option"), arity: 1 })));
	env.set(Rc::from("Zero"), Value::Data(Rc::new(DataInstance::new(Rc::from("Zero"), Rc::from("Option"), Vec::new()))));
	env.set(Rc::from("Ok"), Value::Constructor(Rc::new(Constructor { name: Rc::from("Ok"), type_name: Rc::from("Result"), arity: 1 })));
	env.set(Rc::from("Fail"), Value::Constructor(Rc::new(Constructor { name: Rc::from("Fail"), type_name: Rc::from("Result"), arity: 1 })));

	env.set(Rc::from("JNull"), Value::Data(Rc::new(DataInstance::new(Rc::from("JNull"), Rc::from("Json"), Vec::new()))));
	for name in ["JBool", "JNum", "JStr", "JArr", "JObj"] {
		env.set(Rc::from(name), Value::Constructor(Rc::new(Constructor { name: Rc::from(name), type_name: Rc::from("Json"), arity: 1 })));
	}
}

/// `print`/`println` (spec §8 scenario 1, SPEC_FULL §4): bound straight
/// into the root environment rather than a virtual module, since neither
/// needs an `import` to be reachable. Both write the display form of
/// their argument (spec §4.7: unquoted text) to the configured
/// [`crate::config::OutputSink`]; `println` appends a trailing newline.
fn install_io_builtins(env: &Env, output: Rc<dyn crate::config::OutputSink>) {
	let write_out = output.clone();
	env.set(
		Rc::from("print"),
		Value::Builtin(builtins::builtin(
			"print",
			Some("(a) -> Nil"),
			Rc::new(move |_ctx: &mut dyn EvalContext, args: &[Value]| match args {
				[value] => {
					write_out.write_str(&crate::inspect::inspect_display(value));
					Value::Nil
				}
				_ => RuntimeError::new(ErrorKind::WrongArity, format!("print expects 1 argument(s), got {}", args.len())).into(),
			}) as BuiltinFn,
		)),
	);

	env.set(
		Rc::from("println"),
		Value::Builtin(builtins::builtin(
			"println",
			Some("(a) -> Nil"),
			Rc::new(move |_ctx: &mut dyn EvalContext, args: &[Value]| match args {
				[value] => {
					output.write_str(&crate::inspect::inspect_display(value));
					output.write_str("\n");
					Value::Nil
				}
				_ => RuntimeError::new(ErrorKind::WrongArity, format!("println expects 1 argument(s), got {}", args.len())).into(),
			}) as BuiltinFn,
		)),
	);
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::ast::*;
	use crate::value::error::SourceLoc;

	fn loc() -> SourceLoc {
		SourceLoc::default()
	}

	#[test]
	fn literal_expression_evaluates_to_its_value() {
		let mut evaluator = Evaluator::new();
		let env = Env::root();
		let result = evaluator.eval(&Expr::IntegerLit(42, loc()), &env);
		assert_eq!(result, Value::Integer(42));
	}

	#[test]
	fn option_constructors_are_available_without_import() {
		let evaluator = Evaluator::new();
		assert_eq!(evaluator.root_env.get("Zero"), Some(Value::Data(Rc::new(DataInstance::new(Rc::from("Zero"), Rc::from("Option"), Vec::new())))));
		match evaluator.root_env.get("Some") {
			Some(Value::Constructor(ctor)) => assert_eq!(ctor.arity, 1),
			_ => panic!("expected Some to be a unary constructor"),
		}
	}

	#[test]
	fn print_writes_the_display_form_to_the_configured_sink() {
		let sink = Rc::new(crate::config::BufferSink::new());
		let mut evaluator = Evaluator::with_config(crate::config::EngineConfig::with_output(sink.clone()));
		let env = evaluator.root_env.child();
		let print_fn = env.get("print").expect("print is bound without an import");
		let list = Value::List(crate::collections::PersistentList::from_iter([Value::Integer(1), Value::Integer(2)]), None);
		evaluator.apply_function(&print_fn, &[list]);
		assert_eq!(sink.contents(), "[1, 2]");
	}

	#[test]
	fn println_appends_a_trailing_newline() {
		let sink = Rc::new(crate::config::BufferSink::new());
		let mut evaluator = Evaluator::with_config(crate::config::EngineConfig::with_output(sink.clone()));
		let env = evaluator.root_env.child();
		let println_fn = env.get("println").expect("println is bound without an import");
		evaluator.apply_function(&println_fn, &[Value::Integer(42)]);
		assert_eq!(sink.contents(), "42\n");
	}

	#[test]
	fn calling_a_function_binds_parameters_and_evaluates_its_body() {
		let mut evaluator = Evaluator::new();
		let env = evaluator.root_env.child();
		let f = Rc::new(Function {
			name: Some(Rc::from("inc")),
			params: Rc::from(vec![Param { pattern: Pattern::Identifier(Rc::from("x")), annotated_type: None }]),
			body: Rc::new(Expr::Infix { op: Rc::from("+"), left: Box::new(Expr::Identifier(Rc::from("x"), NodeId(0), loc())), right: Box::new(Expr::IntegerLit(1, loc())), loc: loc() }),
			return_type: None,
			env: env.clone(),
			loc: loc(),
			file: Rc::from(""),
		});
		let result = evaluator.apply_function(&Value::Function(f), &[Value::Integer(41)]);
		assert_eq!(result, Value::Integer(42));
	}

	#[test]
	fn wrong_arity_call_is_an_error() {
		let mut evaluator = Evaluator::new();
		let f = Rc::new(Function {
			name: Some(Rc::from("f")),
			params: Rc::from(vec![Param { pattern: Pattern::Identifier(Rc::from("x")), annotated_type: None }]),
			body: Rc::new(Expr::Nil(loc())),
			return_type: None,
			env: Env::root(),
			loc: loc(),
			file: Rc::from(""),
		});
		let result = evaluator.apply_function(&Value::Function(f), &[]);
		assert!(result.is_error());
	}
}
