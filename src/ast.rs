//! Syntax-tree node model and factory.
//!
//! Every polymorphic node family is a closed enum whose variant determines
//! its payload, so a node can never carry the wrong payload for its kind.
//! The factory methods on [`Arena`] are the only way nodes come into being:
//! each allocates exactly one node, and the only failure path is the arena's
//! own [`OutOfMemory`], propagated with `?`. Misusing an operator argument
//! (say, a binary operator passed to the unary constructor) is a parser bug
//! and is rejected by assertion.
//!
//! Identifiers are always [`Symbol`] handles, never string copies, so
//! identity comparison stays an integer compare.

use crate::{
    arena::{
        Arena, BlockItemRange, DeclId, DeclRange, DecltId, DesignatorRange, EnumeratorRange,
        ExprId, ExprRange, ExternalId, InitDecltRange, InitElemRange, InitId, OutOfMemory,
        ParamRange, SpecRange, StmtId, StructDeclRange, StructDecltRange, SymbolRange,
        TypeNameId,
    },
    intern::Symbol,
    token::{Affix, StringPayload},
};

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct IntegerConstant {
    pub value: u64,
    pub affix: Affix,
}

#[derive(Copy, Clone, Debug, PartialEq)]
pub struct FloatingConstant {
    pub value: f64,
    pub affix: Affix,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct CharacterConstant {
    pub value: u32,
    pub wide: bool,
}

/// Operator codes shared by the postfix, unary, binary and assignment
/// expression families. Each constructor asserts its operand comes from the
/// right band.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Operator {
    // postfix
    PostIncrement,
    PostDecrement,
    // unary
    PreIncrement,
    PreDecrement,
    AddressOf,
    Deref,
    Plus,
    Minus,
    BitNot,
    Not,
    Sizeof,
    SizeofType,
    // binary
    Multiply,
    Divide,
    Modulo,
    Add,
    Subtract,
    ShiftLeft,
    ShiftRight,
    Less,
    Greater,
    LessEqual,
    GreaterEqual,
    Equal,
    NotEqual,
    BitAnd,
    BitXor,
    BitOr,
    And,
    Or,
    // assignment
    Assign,
    MultiplyAssign,
    DivideAssign,
    ModuloAssign,
    AddAssign,
    SubtractAssign,
    ShiftLeftAssign,
    ShiftRightAssign,
    BitAndAssign,
    BitXorAssign,
    BitOrAssign,
}

impl Operator {
    pub fn is_postfix(self) -> bool {
        matches!(self, Operator::PostIncrement | Operator::PostDecrement)
    }

    pub fn is_unary(self) -> bool {
        use Operator::*;
        matches!(
            self,
            PreIncrement | PreDecrement | AddressOf | Deref | Plus | Minus | BitNot | Not
                | Sizeof | SizeofType
        )
    }

    pub fn is_binary(self) -> bool {
        use Operator::*;
        matches!(
            self,
            Multiply | Divide | Modulo | Add | Subtract | ShiftLeft | ShiftRight | Less
                | Greater | LessEqual | GreaterEqual | Equal | NotEqual | BitAnd | BitXor
                | BitOr | And | Or
        )
    }

    pub fn is_assignment(self) -> bool {
        use Operator::*;
        matches!(
            self,
            Assign | MultiplyAssign | DivideAssign | ModuloAssign | AddAssign | SubtractAssign
                | ShiftLeftAssign | ShiftRightAssign | BitAndAssign | BitXorAssign
                | BitOrAssign
        )
    }
}

#[derive(Clone, Debug, PartialEq)]
pub enum Expr {
    Identifier(Symbol),
    Integer(IntegerConstant),
    Floating(FloatingConstant),
    Enumeration(Symbol),
    Character(CharacterConstant),
    StringLit(StringPayload),
    Index { base: ExprId, index: ExprId },
    Call { base: ExprId, args: ExprRange },
    Field { base: ExprId, field: Symbol },
    Arrow { base: ExprId, field: Symbol },
    Postfix { op: Operator, base: ExprId },
    CompoundLiteral { type_name: TypeNameId, inits: InitElemRange },
    Unary { op: Operator, operand: ExprId },
    UnaryType { op: Operator, type_name: TypeNameId },
    Binary { op: Operator, lhs: ExprId, rhs: ExprId },
    Ternary { cond: ExprId, then: ExprId, other: ExprId },
    Comma(ExprRange),
}

/// `const`/`restrict`/`volatile` flags on a pointer or array declarator.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct Qualifiers {
    pub is_const: bool,
    pub restrict: bool,
    pub volatile: bool,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Declarator {
    Identifier(Symbol),
    Pointer {
        base: DecltId,
        quals: Qualifiers,
    },
    Array {
        base: DecltId,
        quals: Qualifiers,
        bound: Option<ExprId>,
    },
    /// The `[static n]` form: the array is promised to hold at least `bound`
    /// elements.
    ArrayLeast {
        base: DecltId,
        quals: Qualifiers,
        bound: ExprId,
    },
    Function {
        base: DecltId,
        params: ParamRange,
        variadic: bool,
    },
    /// Old-style (K&R) function declarator with a bare identifier list.
    FunctionOldStyle {
        base: DecltId,
        idents: SymbolRange,
    },
}

/// One entry of a declaration-specifier or specifier-qualifier list.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum DeclSpec {
    // storage classes
    Typedef,
    Extern,
    Static,
    Auto,
    Register,
    // type specifiers
    Void,
    Char,
    Short,
    Int,
    Long,
    Float,
    Double,
    Signed,
    Unsigned,
    Bool,
    Complex,
    Imaginary,
    /// `struct tag`, `struct tag { ... }` or `struct { ... }`; at least one
    /// of the two fields is present.
    Struct {
        tag: Option<Symbol>,
        members: Option<StructDeclRange>,
    },
    Union {
        tag: Option<Symbol>,
        members: Option<StructDeclRange>,
    },
    Enum {
        tag: Option<Symbol>,
        enumerators: Option<EnumeratorRange>,
    },
    TypedefName(Symbol),
    // qualifiers
    Const,
    Restrict,
    Volatile,
    // function specifier
    Inline,
}

impl DeclSpec {
    pub fn is_storage_class(self) -> bool {
        use DeclSpec::*;
        matches!(self, Typedef | Extern | Static | Auto | Register)
    }

    pub fn is_type_specifier(self) -> bool {
        use DeclSpec::*;
        matches!(
            self,
            Void | Char | Short | Int | Long | Float | Double | Signed | Unsigned | Bool
                | Complex | Imaginary | Struct { .. } | Union { .. } | Enum { .. }
                | TypedefName(_)
        )
    }

    pub fn is_qualifier(self) -> bool {
        matches!(self, DeclSpec::Const | DeclSpec::Restrict | DeclSpec::Volatile)
    }
}

/// One member declaration inside a struct or union body.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct StructDeclaration {
    pub specquals: SpecRange,
    pub declarators: StructDecltRange,
}

/// A struct member declarator, possibly a bit-field.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct StructDeclarator {
    pub declt: Option<DecltId>,
    pub bits: Option<ExprId>,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct Enumerator {
    pub name: Symbol,
    pub value: Option<ExprId>,
}

/// A type name (`sizeof (T)`, compound literals, casts): a
/// specifier-qualifier list plus an optional abstract declarator.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct TypeName {
    pub specquals: SpecRange,
    pub declt: Option<DecltId>,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct ParameterDeclaration {
    pub specs: SpecRange,
    pub declt: Option<DecltId>,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Initializer {
    Expr(ExprId),
    List(InitElemRange),
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct InitializerElem {
    pub designators: DesignatorRange,
    pub init: InitId,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Designator {
    Index(ExprId),
    Field(Symbol),
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct Declaration {
    pub specs: SpecRange,
    pub inits: InitDecltRange,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct InitDeclarator {
    pub declt: DecltId,
    pub init: Option<InitId>,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Stmt {
    Label { name: Symbol, stmt: StmtId },
    Case { expr: ExprId, stmt: StmtId },
    Default { stmt: StmtId },
    Compound(BlockItemRange),
    /// An expression statement; `None` is the empty statement `;`.
    Expr(Option<ExprId>),
    If { cond: ExprId, then_stmt: StmtId, else_stmt: Option<StmtId> },
    Switch { cond: ExprId, body: StmtId },
    While { cond: ExprId, body: StmtId },
    DoWhile { cond: ExprId, body: StmtId },
    For {
        init: Option<ForInit>,
        cond: Option<ExprId>,
        step: Option<ExprId>,
        body: StmtId,
    },
    Goto(Symbol),
    Continue,
    Break,
    Return(Option<ExprId>),
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum ForInit {
    Expr(ExprId),
    Decl(DeclId),
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum BlockItem {
    Decl(DeclId),
    Stmt(StmtId),
}

/// A top-level item of a translation unit.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum ExternalDecl {
    FunctionDef {
        specs: SpecRange,
        declt: DecltId,
        /// K&R parameter declarations between declarator and body.
        kr_decls: DeclRange,
        body: StmtId,
    },
    Decl(DeclId),
}

// Factory layer: one method per node shape. Variant and payload are set
// atomically by construction.
impl Arena {
    pub fn expr_identifier(&mut self, ident: Symbol) -> Result<ExprId, OutOfMemory> {
        self.alloc_expr(Expr::Identifier(ident))
    }

    pub fn expr_integer(&mut self, cst: IntegerConstant) -> Result<ExprId, OutOfMemory> {
        self.alloc_expr(Expr::Integer(cst))
    }

    pub fn expr_floating(&mut self, cst: FloatingConstant) -> Result<ExprId, OutOfMemory> {
        self.alloc_expr(Expr::Floating(cst))
    }

    pub fn expr_enumeration(&mut self, ident: Symbol) -> Result<ExprId, OutOfMemory> {
        self.alloc_expr(Expr::Enumeration(ident))
    }

    pub fn expr_character(&mut self, cst: CharacterConstant) -> Result<ExprId, OutOfMemory> {
        self.alloc_expr(Expr::Character(cst))
    }

    pub fn expr_string_literal(&mut self, lit: StringPayload) -> Result<ExprId, OutOfMemory> {
        self.alloc_expr(Expr::StringLit(lit))
    }

    pub fn expr_index(&mut self, base: ExprId, index: ExprId) -> Result<ExprId, OutOfMemory> {
        self.alloc_expr(Expr::Index { base, index })
    }

    pub fn expr_call(&mut self, base: ExprId, args: &[ExprId]) -> Result<ExprId, OutOfMemory> {
        let args = self.alloc_expr_list(args.iter().copied())?;
        self.alloc_expr(Expr::Call { base, args })
    }

    pub fn expr_field(&mut self, base: ExprId, field: Symbol) -> Result<ExprId, OutOfMemory> {
        self.alloc_expr(Expr::Field { base, field })
    }

    pub fn expr_arrow(&mut self, base: ExprId, field: Symbol) -> Result<ExprId, OutOfMemory> {
        self.alloc_expr(Expr::Arrow { base, field })
    }

    pub fn expr_postfix(&mut self, base: ExprId, op: Operator) -> Result<ExprId, OutOfMemory> {
        assert!(op.is_postfix());
        self.alloc_expr(Expr::Postfix { op, base })
    }

    pub fn expr_compound_literal(
        &mut self,
        type_name: TypeNameId,
        inits: InitElemRange,
    ) -> Result<ExprId, OutOfMemory> {
        self.alloc_expr(Expr::CompoundLiteral { type_name, inits })
    }

    pub fn expr_unary(&mut self, operand: ExprId, op: Operator) -> Result<ExprId, OutOfMemory> {
        assert!(op.is_unary() && op != Operator::SizeofType);
        self.alloc_expr(Expr::Unary { op, operand })
    }

    pub fn expr_unary_type(
        &mut self,
        type_name: TypeNameId,
        op: Operator,
    ) -> Result<ExprId, OutOfMemory> {
        assert_eq!(op, Operator::SizeofType);
        self.alloc_expr(Expr::UnaryType { op, type_name })
    }

    pub fn expr_binary(
        &mut self,
        lhs: ExprId,
        rhs: ExprId,
        op: Operator,
    ) -> Result<ExprId, OutOfMemory> {
        assert!(op.is_binary() || op.is_assignment());
        self.alloc_expr(Expr::Binary { op, lhs, rhs })
    }

    pub fn expr_ternary(
        &mut self,
        cond: ExprId,
        then: ExprId,
        other: ExprId,
    ) -> Result<ExprId, OutOfMemory> {
        self.alloc_expr(Expr::Ternary { cond, then, other })
    }

    pub fn expr_comma(&mut self, exprs: &[ExprId]) -> Result<ExprId, OutOfMemory> {
        let exprs = self.alloc_expr_list(exprs.iter().copied())?;
        self.alloc_expr(Expr::Comma(exprs))
    }

    pub fn declt_identifier(&mut self, ident: Symbol) -> Result<DecltId, OutOfMemory> {
        self.alloc_declt(Declarator::Identifier(ident))
    }

    pub fn declt_pointer(
        &mut self,
        base: DecltId,
        quals: Qualifiers,
    ) -> Result<DecltId, OutOfMemory> {
        self.alloc_declt(Declarator::Pointer { base, quals })
    }

    pub fn declt_array(
        &mut self,
        base: DecltId,
        quals: Qualifiers,
        bound: Option<ExprId>,
    ) -> Result<DecltId, OutOfMemory> {
        self.alloc_declt(Declarator::Array { base, quals, bound })
    }

    pub fn declt_array_least(
        &mut self,
        base: DecltId,
        quals: Qualifiers,
        bound: ExprId,
    ) -> Result<DecltId, OutOfMemory> {
        self.alloc_declt(Declarator::ArrayLeast { base, quals, bound })
    }

    pub fn declt_function(
        &mut self,
        base: DecltId,
        params: ParamRange,
    ) -> Result<DecltId, OutOfMemory> {
        self.alloc_declt(Declarator::Function { base, params, variadic: false })
    }

    pub fn declt_function_variadic(
        &mut self,
        base: DecltId,
        params: ParamRange,
    ) -> Result<DecltId, OutOfMemory> {
        self.alloc_declt(Declarator::Function { base, params, variadic: true })
    }

    pub fn declt_function_old_style(
        &mut self,
        base: DecltId,
        idents: &[Symbol],
    ) -> Result<DecltId, OutOfMemory> {
        let idents = self.alloc_symbols(idents.iter().copied())?;
        self.alloc_declt(Declarator::FunctionOldStyle { base, idents })
    }

    pub fn declaration(
        &mut self,
        specs: SpecRange,
        inits: InitDecltRange,
    ) -> Result<DeclId, OutOfMemory> {
        self.alloc_decl(Declaration { specs, inits })
    }

    pub fn type_name(
        &mut self,
        specquals: SpecRange,
        declt: Option<DecltId>,
    ) -> Result<TypeNameId, OutOfMemory> {
        self.alloc_type_name(TypeName { specquals, declt })
    }

    pub fn init_expr(&mut self, expr: ExprId) -> Result<InitId, OutOfMemory> {
        self.alloc_init(Initializer::Expr(expr))
    }

    pub fn init_list(&mut self, elems: InitElemRange) -> Result<InitId, OutOfMemory> {
        self.alloc_init(Initializer::List(elems))
    }

    pub fn stmt_label(&mut self, name: Symbol, stmt: StmtId) -> Result<StmtId, OutOfMemory> {
        self.alloc_stmt(Stmt::Label { name, stmt })
    }

    pub fn stmt_case(&mut self, expr: ExprId, stmt: StmtId) -> Result<StmtId, OutOfMemory> {
        self.alloc_stmt(Stmt::Case { expr, stmt })
    }

    pub fn stmt_default(&mut self, stmt: StmtId) -> Result<StmtId, OutOfMemory> {
        self.alloc_stmt(Stmt::Default { stmt })
    }

    pub fn stmt_compound(&mut self, items: BlockItemRange) -> Result<StmtId, OutOfMemory> {
        self.alloc_stmt(Stmt::Compound(items))
    }

    pub fn stmt_expression(&mut self, expr: Option<ExprId>) -> Result<StmtId, OutOfMemory> {
        self.alloc_stmt(Stmt::Expr(expr))
    }

    pub fn stmt_if(
        &mut self,
        cond: ExprId,
        then_stmt: StmtId,
        else_stmt: Option<StmtId>,
    ) -> Result<StmtId, OutOfMemory> {
        self.alloc_stmt(Stmt::If { cond, then_stmt, else_stmt })
    }

    pub fn stmt_switch(&mut self, cond: ExprId, body: StmtId) -> Result<StmtId, OutOfMemory> {
        self.alloc_stmt(Stmt::Switch { cond, body })
    }

    pub fn stmt_while(&mut self, cond: ExprId, body: StmtId) -> Result<StmtId, OutOfMemory> {
        self.alloc_stmt(Stmt::While { cond, body })
    }

    pub fn stmt_do_while(&mut self, cond: ExprId, body: StmtId) -> Result<StmtId, OutOfMemory> {
        self.alloc_stmt(Stmt::DoWhile { cond, body })
    }

    pub fn stmt_for_expr(
        &mut self,
        init: Option<ExprId>,
        cond: Option<ExprId>,
        step: Option<ExprId>,
        body: StmtId,
    ) -> Result<StmtId, OutOfMemory> {
        self.alloc_stmt(Stmt::For { init: init.map(ForInit::Expr), cond, step, body })
    }

    pub fn stmt_for_decl(
        &mut self,
        init: DeclId,
        cond: Option<ExprId>,
        step: Option<ExprId>,
        body: StmtId,
    ) -> Result<StmtId, OutOfMemory> {
        self.alloc_stmt(Stmt::For { init: Some(ForInit::Decl(init)), cond, step, body })
    }

    pub fn stmt_goto(&mut self, label: Symbol) -> Result<StmtId, OutOfMemory> {
        self.alloc_stmt(Stmt::Goto(label))
    }

    pub fn stmt_continue(&mut self) -> Result<StmtId, OutOfMemory> {
        self.alloc_stmt(Stmt::Continue)
    }

    pub fn stmt_break(&mut self) -> Result<StmtId, OutOfMemory> {
        self.alloc_stmt(Stmt::Break)
    }

    pub fn stmt_return(&mut self, expr: Option<ExprId>) -> Result<StmtId, OutOfMemory> {
        self.alloc_stmt(Stmt::Return(expr))
    }

    pub fn external_function(
        &mut self,
        specs: SpecRange,
        declt: DecltId,
        kr_decls: DeclRange,
        body: StmtId,
    ) -> Result<ExternalId, OutOfMemory> {
        self.alloc_external(ExternalDecl::FunctionDef { specs, declt, kr_decls, body })
    }

    pub fn external_declaration(&mut self, decl: DeclId) -> Result<ExternalId, OutOfMemory> {
        self.alloc_external(ExternalDecl::Decl(decl))
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::intern::Interner;

    // Builds `if (x < 2) return x + 1;` and checks every node landed with
    // the right variant.
    #[test]
    fn builds_a_small_tree() {
        let mut idents = Interner::new();
        let x = idents.intern("x");

        let mut arena = Arena::new();
        let lhs = arena.expr_identifier(x).unwrap();
        let two = arena
            .expr_integer(IntegerConstant { value: 2, affix: Affix::None })
            .unwrap();
        let cond = arena.expr_binary(lhs, two, Operator::Less).unwrap();

        let x2 = arena.expr_identifier(x).unwrap();
        let one = arena
            .expr_integer(IntegerConstant { value: 1, affix: Affix::None })
            .unwrap();
        let sum = arena.expr_binary(x2, one, Operator::Add).unwrap();
        let ret = arena.stmt_return(Some(sum)).unwrap();
        let stmt = arena.stmt_if(cond, ret, None).unwrap();

        assert_eq!(
            arena.stmt(stmt),
            &Stmt::If { cond, then_stmt: ret, else_stmt: None }
        );
        assert_eq!(arena.expr(cond), &Expr::Binary { op: Operator::Less, lhs, rhs: two });
        assert_eq!(arena.expr(lhs), &Expr::Identifier(x));
        let bytes = arena.finish();
        assert!(bytes > 0);
    }

    #[test]
    fn call_arguments_resolve_through_their_range() {
        let mut idents = Interner::new();
        let f = idents.intern("f");

        let mut arena = Arena::new();
        let callee = arena.expr_identifier(f).unwrap();
        let a = arena
            .expr_integer(IntegerConstant { value: 1, affix: Affix::None })
            .unwrap();
        let b = arena
            .expr_integer(IntegerConstant { value: 2, affix: Affix::None })
            .unwrap();
        let call = arena.expr_call(callee, &[a, b]).unwrap();

        let Expr::Call { base, args } = *arena.expr(call) else {
            panic!("expected a call expression");
        };
        assert_eq!(base, callee);
        assert_eq!(arena.expr_list(args), &[a, b]);
    }

    #[test]
    fn declarators_nest_through_base_ids() {
        let mut idents = Interner::new();
        let name = idents.intern("buf");

        let mut arena = Arena::new();
        let inner = arena.declt_identifier(name).unwrap();
        let ptr = arena
            .declt_pointer(inner, Qualifiers { is_const: true, ..Qualifiers::default() })
            .unwrap();
        let bound = arena
            .expr_integer(IntegerConstant { value: 8, affix: Affix::None })
            .unwrap();
        let arr = arena
            .declt_array_least(ptr, Qualifiers::default(), bound)
            .unwrap();

        let Declarator::ArrayLeast { base, bound: b, .. } = *arena.declt(arr) else {
            panic!("expected a [static n] array declarator");
        };
        assert_eq!(base, ptr);
        assert_eq!(b, bound);
        let Declarator::Pointer { base, quals } = *arena.declt(ptr) else {
            panic!("expected a pointer declarator");
        };
        assert_eq!(base, inner);
        assert!(quals.is_const);
    }

    #[test]
    fn external_declarations_form_a_translation_unit() {
        let mut idents = Interner::new();
        let main = idents.intern("main");

        let mut arena = Arena::new();
        let specs = arena.alloc_specs([DeclSpec::Int]).unwrap();
        let name = arena.declt_identifier(main).unwrap();
        let declt = arena.declt_function(name, crate::arena::ParamRange::EMPTY).unwrap();
        let zero = arena
            .expr_integer(IntegerConstant { value: 0, affix: Affix::None })
            .unwrap();
        let ret = arena.stmt_return(Some(zero)).unwrap();
        let items = arena.alloc_block_items([BlockItem::Stmt(ret)]).unwrap();
        let body = arena.stmt_compound(items).unwrap();
        let def = arena
            .external_function(specs, declt, crate::arena::DeclRange::EMPTY, body)
            .unwrap();

        let ExternalDecl::FunctionDef { body: b, .. } = *arena.external(def) else {
            panic!("expected a function definition");
        };
        assert_eq!(b, body);
        assert_eq!(arena.specs(specs), &[DeclSpec::Int]);
    }

    #[test]
    fn type_names_resolve_through_factory_and_getter() {
        let mut arena = Arena::new();
        let specquals = arena
            .alloc_specs([DeclSpec::Const, DeclSpec::Unsigned])
            .unwrap();
        let id = arena.type_name(specquals, None).unwrap();
        assert_eq!(arena.get_type_name(id), &TypeName { specquals, declt: None });
    }

    #[test]
    #[should_panic(expected = "assertion failed")]
    fn unary_factory_rejects_binary_operators() {
        let mut arena = Arena::new();
        let one = arena
            .expr_integer(IntegerConstant { value: 1, affix: Affix::None })
            .unwrap();
        let _ = arena.expr_unary(one, Operator::Add);
    }

    #[test]
    fn spec_classification_bands_are_disjoint() {
        for spec in [DeclSpec::Typedef, DeclSpec::Static] {
            assert!(spec.is_storage_class());
            assert!(!spec.is_type_specifier());
            assert!(!spec.is_qualifier());
        }
        for spec in [DeclSpec::Int, DeclSpec::Bool, DeclSpec::Struct { tag: None, members: None }] {
            assert!(spec.is_type_specifier());
            assert!(!spec.is_storage_class());
        }
        assert!(DeclSpec::Restrict.is_qualifier());
        assert!(!DeclSpec::Inline.is_storage_class());
    }
}
