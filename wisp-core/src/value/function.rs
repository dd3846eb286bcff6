use std::fmt::{Debug, Formatter};
use std::rc::Rc;

use crate::ast::{Expr, Pattern};
use crate::env::Env;
use crate::value::error::{SourceLoc, StackFrame};
use crate::value::Value;

/// The narrow surface a `Builtin`'s implementation needs from the
/// evaluator, kept as a trait object so a builtin never needs the evaluator's
/// private state, only the ability to call back into user code (for
/// combinators like `List.map`) and to push a stack frame of its own.
pub trait EvalContext {
	fn apply_function(&mut self, callee: &Value, args: &[Value]) -> Value;
	fn push_frame(&mut self, frame: StackFrame);
	fn pop_frame(&mut self);
	fn current_loc(&self) -> SourceLoc;
	fn current_file(&self) -> Rc<str>;
}

pub type BuiltinFn = Rc<dyn Fn(&mut dyn EvalContext, &[Value]) -> Value>;

/// A host-implemented function: name, declared type signature, and the
/// callable implementation (spec §3.1, §4.5).
#[derive(Clone)]
pub struct Builtin {
	pub name: Rc<str>,
	pub signature: Option<Rc<str>>,
	pub implementation: BuiltinFn,
}

impl Debug for Builtin {
	fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
		f.debug_struct("Builtin").field("name", &self.name).field("signature", &self.signature).finish()
	}
}

impl PartialEq for Builtin {
	fn eq(&self, other: &Self) -> bool {
		self.name == other.name && Rc::ptr_eq(&self.implementation, &other.implementation)
	}
}
impl Eq for Builtin {}

/// A formal parameter: patterns are permitted so destructuring
/// parameters (`fn f (a, b) = ...`) work the same as a `let` binding.
#[derive(Debug, Clone)]
pub struct Param {
	pub pattern: Pattern,
	pub annotated_type: Option<Rc<str>>,
}

/// A user-defined closure (spec §3.1).
#[derive(Clone)]
pub struct Function {
	pub name: Option<Rc<str>>,
	pub params: Rc<[Param]>,
	pub body: Rc<Expr>,
	pub return_type: Option<Rc<str>>,
	pub env: Env,
	pub loc: SourceLoc,
	pub file: Rc<str>,
}

impl Debug for Function {
	fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
		f.debug_struct("Function")
			.field("name", &self.name)
			.field("arity", &self.params.len())
			.field("loc", &self.loc)
			.finish_non_exhaustive()
	}
}

impl PartialEq for Function {
	fn eq(&self, other: &Self) -> bool {
		Rc::ptr_eq(&self.body, &other.body) && self.env.same_scope(&other.env)
	}
}
impl Eq for Function {}

/// `(receiver, Function)`, produced by extension-method member access
/// (spec §3.1, §4.1 "Member and index").
#[derive(Debug, Clone, PartialEq)]
pub struct BoundMethod {
	pub receiver: Box<Value>,
	pub method: Rc<Function>,
}

/// A reference to a trait method by name, resolved per call against the
/// runtime type of whatever argument the dispatcher lands on (spec §3.1,
/// §4.3). Used when a trait method is referenced as a first-class value,
/// e.g. passed to `List.map(toString)`.
#[derive(Debug, Clone, Eq, PartialEq, Hash)]
pub struct ClassMethod {
	pub trait_name: Rc<str>,
	pub method_name: Rc<str>,
	pub arity: usize,
}

/// A callable with some leading arguments already bound (spec §3.1).
#[derive(Debug, Clone, PartialEq)]
pub struct PartialApplication {
	pub callee: Box<Value>,
	pub bound_args: Rc<[Value]>,
}

/// A reified type value, backing the language's first-class `Type` kind
/// (spec §3.1).
#[derive(Debug, Clone, Eq, PartialEq, Hash)]
pub struct TypeObject {
	pub name: Rc<str>,
}
