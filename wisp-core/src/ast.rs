//! The tree handed to the evaluator (spec §6.1). Lexing, parsing and type
//! inference are out of scope (spec §1); this module defines the node
//! shapes the core must be able to *consume*: a plain data description of
//! an already-parsed tree, produced by something upstream and never built
//! by this crate itself.
use std::rc::Rc;

use bitflags::bitflags;
use wisp_derive::FromRepr;

use crate::value::error::SourceLoc;

/// Stable identifier for an AST node, used to key the `TypeMap` the type
/// checker hands the evaluator (spec §6.1 "reads precomputed type
/// annotations... from a TypeMap").
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash, Ord, PartialOrd)]
pub struct NodeId(pub u32);

bitflags! {
	/// Flags on an `ImportStatement` (spec §6.1).
	#[derive(Debug, Copy, Clone, Eq, PartialEq)]
	pub struct ImportFlags: u8 {
		const ALL     = 0b001;
		const SYMBOLS = 0b010;
		const EXCLUDE = 0b100;
	}
}

#[derive(Debug, Clone)]
pub struct Program {
	pub statements: Vec<Stmt>,
}

#[derive(Debug, Clone)]
pub enum Stmt {
	Import(ImportStatement),
	Block(BlockStatement),
	TypeDecl(TypeDeclaration),
	TraitDecl(TraitDeclaration),
	InstanceDecl(InstanceDeclaration),
	ConstDecl(ConstantDeclaration),
	ExtensionFn(ExtensionFunctionStatement),
	Break(BreakStatement),
	Continue(ContinueStatement),
	Expr(Expr),
}

#[derive(Debug, Clone)]
pub struct ImportStatement {
	pub path: String,
	pub alias: Option<Rc<str>>,
	pub flags: ImportFlags,
	pub symbols: Vec<Rc<str>>,
	pub loc: SourceLoc,
}

#[derive(Debug, Clone)]
pub struct BlockStatement {
	pub statements: Vec<Stmt>,
	pub loc: SourceLoc,
}

#[derive(Debug, Clone)]
pub struct ConstructorDecl {
	pub name: Rc<str>,
	pub arity: usize,
}

#[derive(Debug, Clone)]
pub struct TypeDeclaration {
	pub name: Rc<str>,
	pub constructors: Vec<ConstructorDecl>,
	/// `Some` when this declaration is a type alias (`type X = Y`) rather
	/// than an ADT with its own constructors.
	pub alias_target: Option<Rc<str>>,
	pub loc: SourceLoc,
}

#[derive(Debug, Clone)]
pub struct MethodSignature {
	pub name: Rc<str>,
	pub arity: usize,
	/// Operators declared in the trait carry the synthetic spelling
	/// `"(op)"` (spec §4.3) as their `name`; this flag records that the
	/// surface syntax used an operator symbol, kept only for diagnostics.
	pub is_operator: bool,
}

#[derive(Debug, Clone)]
pub struct FunctionDecl {
	pub name: Rc<str>,
	pub params: Vec<ParamDecl>,
	pub body: Expr,
	pub return_type: Option<Rc<str>>,
	pub loc: SourceLoc,
}

#[derive(Debug, Clone)]
pub struct ParamDecl {
	pub pattern: Pattern,
	pub annotated_type: Option<Rc<str>>,
}

#[derive(Debug, Clone)]
pub struct TraitDeclaration {
	pub name: Rc<str>,
	pub methods: Vec<MethodSignature>,
	pub defaults: Vec<FunctionDecl>,
	pub loc: SourceLoc,
}

#[derive(Debug, Clone)]
pub struct InstanceDeclaration {
	pub trait_name: Rc<str>,
	pub target_type: Rc<str>,
	pub methods: Vec<FunctionDecl>,
	pub loc: SourceLoc,
}

#[derive(Debug, Clone)]
pub struct ConstantDeclaration {
	pub name: Option<Rc<str>>,
	pub pattern: Option<Pattern>,
	pub value: Expr,
	pub exported: bool,
	pub loc: SourceLoc,
}

#[derive(Debug, Clone)]
pub struct ExtensionFunctionStatement {
	pub receiver_type: Rc<str>,
	pub function: FunctionDecl,
	pub loc: SourceLoc,
}

#[derive(Debug, Clone)]
pub struct BreakStatement {
	pub value: Option<Box<Expr>>,
	pub loc: SourceLoc,
}

#[derive(Debug, Clone)]
pub struct ContinueStatement {
	pub loc: SourceLoc,
}

#[derive(Debug, Copy, Clone, Eq, PartialEq, FromRepr)]
#[repr(u8)]
pub enum BytesKind {
	String = 0,
	Hex = 1,
	Bin = 2,
}

#[derive(Debug, Copy, Clone, Eq, PartialEq, FromRepr)]
#[repr(u8)]
pub enum BitsKind {
	Bin = 0,
	Hex = 1,
	Oct = 2,
}

#[derive(Debug, Clone)]
pub enum InterpPart {
	Literal(String),
	Expr(Expr),
}

#[derive(Debug, Clone)]
pub struct MemberExpression {
	pub object: Box<Expr>,
	pub field: Rc<str>,
	pub optional_chain: bool,
	pub loc: SourceLoc,
}

#[derive(Debug, Clone)]
pub struct IndexExpression {
	pub object: Box<Expr>,
	pub index: Box<Expr>,
	pub loc: SourceLoc,
}

#[derive(Debug, Clone)]
pub struct CallExpression {
	pub id: NodeId,
	pub callee: Box<Expr>,
	pub args: Vec<Expr>,
	pub is_tail_call: bool,
	pub loc: SourceLoc,
}

#[derive(Debug, Clone)]
pub struct IfExpression {
	pub condition: Box<Expr>,
	pub then_branch: Box<Expr>,
	pub else_branch: Option<Box<Expr>>,
	pub loc: SourceLoc,
}

#[derive(Debug, Clone)]
pub struct MatchArm {
	pub pattern: Pattern,
	pub guard: Option<Expr>,
	pub body: Expr,
}

#[derive(Debug, Clone)]
pub struct MatchExpression {
	pub scrutinee: Box<Expr>,
	pub arms: Vec<MatchArm>,
	pub loc: SourceLoc,
}

#[derive(Debug, Clone)]
pub enum ForExpression {
	Condition { condition: Box<Expr>, body: Box<BlockStatement>, loc: SourceLoc },
	Iterator { binding: Pattern, iterable: Box<Expr>, body: Box<BlockStatement>, loc: SourceLoc },
}

impl ForExpression {
	pub fn loc(&self) -> SourceLoc {
		match self {
			ForExpression::Condition { loc, .. } => *loc,
			ForExpression::Iterator { loc, .. } => *loc,
		}
	}
}

#[derive(Debug, Clone)]
pub struct AssignExpression {
	pub id: NodeId,
	pub target: Box<Expr>,
	pub value: Box<Expr>,
	pub annotated_type: Option<Rc<str>>,
	pub loc: SourceLoc,
}

#[derive(Debug, Clone)]
pub struct PatternAssignExpression {
	pub pattern: Pattern,
	pub value: Box<Expr>,
	pub loc: SourceLoc,
}

#[derive(Debug, Clone)]
pub struct RecordLitField {
	pub name: Rc<str>,
	pub value: Expr,
}

/// A function value expression — the desugared form of both a lambda and
/// a top-level `fn name(...) = ...` declaration (the latter is sugar for
/// `const name = <FunctionLit>`, spec §4.1's "Identifiers resolve by
/// consulting environment" assumes functions reach the environment the
/// same way any other value does).
#[derive(Debug, Clone)]
pub struct FunctionLit {
	pub name: Option<Rc<str>>,
	pub params: Vec<ParamDecl>,
	pub body: Box<Expr>,
	pub return_type: Option<Rc<str>>,
	pub loc: SourceLoc,
}

#[derive(Debug, Clone)]
pub enum Expr {
	Nil(SourceLoc),
	BoolLit(bool, SourceLoc),
	IntegerLit(i64, SourceLoc),
	FloatLit(f64, SourceLoc),
	CharLit(char, SourceLoc),
	StringLit(Rc<str>, SourceLoc),
	InterpolatedString(Vec<InterpPart>, SourceLoc),
	BytesLit { kind: BytesKind, raw: Rc<str>, loc: SourceLoc },
	BitsLit { kind: BitsKind, raw: Rc<str>, loc: SourceLoc },
	ListLit { elements: Vec<Expr>, elem_type: Option<Rc<str>>, loc: SourceLoc },
	TupleLit { elements: Vec<Expr>, loc: SourceLoc },
	MapLit { entries: Vec<(Expr, Expr)>, loc: SourceLoc },
	RecordLit { type_name: Option<Rc<str>>, spread: Option<Box<Expr>>, fields: Vec<RecordLitField>, loc: SourceLoc },
	Identifier(Rc<str>, NodeId, SourceLoc),
	Member(MemberExpression),
	Index(IndexExpression),
	Call(CallExpression),
	Prefix { op: Rc<str>, expr: Box<Expr>, loc: SourceLoc },
	Infix { op: Rc<str>, left: Box<Expr>, right: Box<Expr>, loc: SourceLoc },
	Postfix { op: Rc<str>, expr: Box<Expr>, loc: SourceLoc },
	If(IfExpression),
	Match(MatchExpression),
	For(Box<ForExpression>),
	Assign(AssignExpression),
	PatternAssign(PatternAssignExpression),
	Block(BlockStatement),
	FunctionLit(FunctionLit),
}

impl Expr {
	pub fn loc(&self) -> SourceLoc {
		match self {
			Expr::Nil(loc)
			| Expr::BoolLit(_, loc)
			| Expr::IntegerLit(_, loc)
			| Expr::FloatLit(_, loc)
			| Expr::CharLit(_, loc)
			| Expr::StringLit(_, loc)
			| Expr::InterpolatedString(_, loc)
			| Expr::Identifier(_, _, loc) => *loc,
			Expr::BytesLit { loc, .. }
			| Expr::BitsLit { loc, .. }
			| Expr::ListLit { loc, .. }
			| Expr::TupleLit { loc, .. }
			| Expr::MapLit { loc, .. }
			| Expr::RecordLit { loc, .. }
			| Expr::Prefix { loc, .. }
			| Expr::Infix { loc, .. }
			| Expr::Postfix { loc, .. } => *loc,
			Expr::Member(m) => m.loc,
			Expr::Index(i) => i.loc,
			Expr::Call(c) => c.loc,
			Expr::If(i) => i.loc,
			Expr::Match(m) => m.loc,
			Expr::For(f) => f.loc(),
			Expr::Assign(a) => a.loc,
			Expr::PatternAssign(p) => p.loc,
			Expr::Block(b) => b.loc,
			Expr::FunctionLit(f) => f.loc,
		}
	}
}

/// The pattern vocabulary of spec §4.2.
#[derive(Debug, Clone)]
pub enum Pattern {
	Wildcard,
	Identifier(Rc<str>),
	Literal(LiteralPattern),
	Constructor { name: Rc<str>, fields: Vec<Pattern> },
	List { elements: Vec<Pattern>, spread: Option<Box<Pattern>> },
	Tuple { elements: Vec<Pattern>, spread: Option<Box<Pattern>> },
	Record { fields: Vec<(Rc<str>, Pattern)> },
	/// `n: T`; `T` may be a union (`A | B`), matched if any member
	/// matches (spec §4.2).
	Type { binding: Option<Rc<str>>, type_names: Vec<Rc<str>> },
	String { parts: Vec<StringPatternPart> },
}

#[derive(Debug, Clone)]
pub enum LiteralPattern {
	Integer(i64),
	Float(f64),
	Bool(bool),
	Char(char),
	String(Rc<str>),
	Nil,
}

#[derive(Debug, Clone)]
pub enum StringPatternPart {
	Literal(String),
	Capture(Rc<str>),
}
