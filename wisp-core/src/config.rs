//! Evaluator configuration (spec §4.3 "operator-to-trait map... process-wide
//! immutable configuration", §4.4 path resolution roots). Not a component
//! of its own in spec.md §2, the ambient knobs a complete embedding needs
//! around the specified core: a `default()` convenience constructor plus
//! an explicit builder for callers who need more control over output and
//! search roots.

use std::cell::RefCell;
use std::io::Write;
use std::path::PathBuf;
use std::rc::Rc;

use crate::traits::TraitRegistry;

/// Where `print`/`println` write. Defaults to stdout; swappable to an
/// in-memory buffer for embedding or tests.
pub trait OutputSink {
	fn write_str(&self, text: &str);
}

pub struct StdoutSink;

impl OutputSink for StdoutSink {
	fn write_str(&self, text: &str) {
		print!("{text}");
		let _ = std::io::stdout().flush();
	}
}

/// Captures everything written to it, for tests that assert on program
/// output without touching real stdout.
#[derive(Default)]
pub struct BufferSink {
	buffer: RefCell<String>,
}

impl BufferSink {
	pub fn new() -> Self {
		BufferSink::default()
	}

	pub fn contents(&self) -> String {
		self.buffer.borrow().clone()
	}
}

impl OutputSink for BufferSink {
	fn write_str(&self, text: &str) {
		self.buffer.borrow_mut().push_str(text);
	}
}

/// Engine-wide configuration: module search roots and the operator-to-trait
/// map (spec §4.3, §4.4, §6.2). Constructing an `Evaluator` always starts
/// from one of these.
pub struct EngineConfig {
	pub module_search_roots: Vec<PathBuf>,
	pub output: Rc<dyn OutputSink>,
}

impl EngineConfig {
	/// Seeds the standard operator-to-trait map (spec §4.3, §9 "Operator
	/// overloading"). Callers may register further operators before
	/// constructing an `Evaluator`.
	pub fn default_operator_traits(registry: &mut TraitRegistry) {
		let standard: &[(&str, &str)] = &[
			("+", "Num"),
			("-", "Num"),
			("*", "Num"),
			("/", "Num"),
			("==", "Eq"),
			("!=", "Eq"),
			("<", "Ord"),
			("<=", "Ord"),
			(">", "Ord"),
			(">=", "Ord"),
			("++", "Semigroup"),
			("::", "Cons"),
			("!", "Not"),
			("~", "Complement"),
			("?.", "Optional"),
		];
		for (op, trait_name) in standard {
			registry.register_operator_trait(*op, *trait_name);
		}
	}
}

impl Default for EngineConfig {
	fn default() -> Self {
		EngineConfig { module_search_roots: Vec::new(), output: Rc::new(StdoutSink) }
	}
}

impl EngineConfig {
	pub fn with_output(output: Rc<dyn OutputSink>) -> Self {
		EngineConfig { module_search_roots: Vec::new(), output }
	}

	pub fn with_search_roots(mut self, roots: impl IntoIterator<Item = PathBuf>) -> Self {
		self.module_search_roots.extend(roots);
		self
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn default_operator_traits_cover_arithmetic_and_equality() {
		let mut registry = TraitRegistry::new();
		EngineConfig::default_operator_traits(&mut registry);
		assert_eq!(registry.trait_for_operator("+").as_deref(), Some("Num"));
		assert_eq!(registry.trait_for_operator("==").as_deref(), Some("Eq"));
		assert_eq!(registry.trait_for_operator("++").as_deref(), Some("Semigroup"));
	}

	#[test]
	fn buffer_sink_captures_output_without_touching_stdout() {
		let sink = BufferSink::new();
		sink.write_str("hello ");
		sink.write_str("world");
		assert_eq!(sink.contents(), "hello world");
	}
}
