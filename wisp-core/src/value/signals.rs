use crate::value::error::SourceLoc;
use crate::value::Value;
use std::rc::Rc;

/// Non-value control tokens threaded upward by the evaluator (spec §3.1).
///
/// These never appear inside a constructed data structure (a `List` can't
/// hold a `Signal`); they only ever occupy the "current expression result"
/// slot while the evaluator works through a block or function body.
#[derive(Debug, Clone)]
pub enum Signal {
	/// Early return via the `?` postfix (spec §4.1 "Prefix, postfix"):
	/// carries the original `Result`/`Option` value being short-circuited.
	Return(Value),
	/// `break` / `break e`; `Nil` when no value was given.
	Break(Value),
	/// `continue`.
	Continue,
	/// A call in tail position (spec §4.1 "Calls", §9 "Tail calls").
	TailCall {
		callee: Value,
		args: Rc<[Value]>,
		loc: SourceLoc,
	},
}

impl Signal {
	pub fn name(&self) -> &'static str {
		match self {
			Signal::Return(_) => "return",
			Signal::Break(_) => "break",
			Signal::Continue => "continue",
			Signal::TailCall { .. } => "tail-call",
		}
	}
}
