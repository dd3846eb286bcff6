//! Ad-hoc driver used while developing the evaluator (SPEC_FULL §0): hand-
//! builds the AST for a tiny module (the counterpart of a `.wisp` source
//! file, since lexing/parsing are out of scope, spec §1) and evaluates it
//! through the public `Evaluator` contract directly against hand-picked
//! inputs rather than a CLI frontend.

use std::path::Path;
use std::rc::Rc;
use std::time::SystemTime;

use anyhow::Context as _;
use wisp_core::ast::{CallExpression, ConstantDeclaration, Expr, NodeId, Program, Stmt};
use wisp_core::value::error::SourceLoc;
use wisp_core::value::Value;
use wisp_core::{EngineConfig, Evaluator, ModuleSource};

fn loc() -> SourceLoc {
	SourceLoc::default()
}

fn ident(name: &str) -> Expr {
	Expr::Identifier(Rc::from(name), NodeId(0), loc())
}

fn call(callee: Expr, args: Vec<Expr>) -> Expr {
	Expr::Call(CallExpression { id: NodeId(0), callee: Box::new(callee), args, is_tail_call: false, loc: loc() })
}

fn const_decl(name: &str, value: Expr, exported: bool) -> Stmt {
	Stmt::ConstDecl(ConstantDeclaration { name: Some(Rc::from(name)), pattern: None, value, exported, loc: loc() })
}

/// The module `import "list" (append) ; let xs = [] ; export let xs2 =
/// append(append(xs, 1), 2) ; print(xs2)` (spec §8 end-to-end scenario 1;
/// the surface sugar `xs.append(1).append(2)` is a parser concern out of
/// scope here, so the free-function form of the same virtual-module
/// builtin stands in for it).
fn demo_program() -> Program {
	Program {
		statements: vec![
			Stmt::Import(wisp_core::ast::ImportStatement {
				path: "list".into(),
				alias: None,
				flags: wisp_core::ast::ImportFlags::SYMBOLS,
				symbols: vec![Rc::from("append")],
				loc: loc(),
			}),
			const_decl("xs", Expr::ListLit { elements: Vec::new(), elem_type: Some(Rc::from("Int")), loc: loc() }, false),
			const_decl("xs1", call(ident("append"), vec![ident("xs"), Expr::IntegerLit(1, loc())]), false),
			const_decl("xs2", call(ident("append"), vec![ident("xs1"), Expr::IntegerLit(2, loc())]), true),
			Stmt::Expr(call(ident("print"), vec![ident("xs2")])),
		],
	}
}

fn main() -> anyhow::Result<()> {
	tracing_subscriber::fmt::init();

	let start = SystemTime::now();
	let mut evaluator = Evaluator::with_config(EngineConfig::default());

	let module_path = Path::new("./demo/main.wisp");
	let exports = evaluator.evaluate_module(module_path, |path| {
		Ok(ModuleSource { path: path.to_path_buf(), program: demo_program() })
	});

	let exports = exports.borrow();
	if let Some(Value::Error(err)) = exports.get("__error") {
		anyhow::bail!("module evaluation failed: {err}");
	}

	let record = Value::Record(Rc::new(exports.clone()));
	println!("exports: {}", wisp_core::inspect::inspect_structured(&record));

	tracing::info!(elapsed = ?start.elapsed().context("system clock went backwards")?, "module evaluated");
	Ok(())
}
