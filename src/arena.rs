//! Monotonic typed-ID arena backing the syntax tree.
//!
//! Each node family lives in its own contiguous store; children are referred
//! to by typed IDs, and variable-length payloads (argument lists, block
//! items, specifier lists) by flattened ranges. Nothing is ever freed
//! individually: the whole tree dies when the arena does, and
//! [`Arena::finish`] reports the total bytes it accumulated.
//!
//! Exhaustion surfaces as [`OutOfMemory`] at the allocation boundary; the
//! driver maps it to abandoning the translation unit.

use std::fmt;

use crate::{
    ast::{
        BlockItem, DeclSpec, Declaration, Declarator, Designator, Enumerator, Expr,
        ExternalDecl, InitDeclarator, Initializer, InitializerElem, ParameterDeclaration, Stmt,
        StructDeclaration, StructDeclarator, TypeName,
    },
    intern::Symbol,
};

/// Allocation failed; the tree built so far must be discarded.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct OutOfMemory {
    /// Bytes the arena had accumulated when the allocation failed.
    pub bytes: usize,
}

impl fmt::Display for OutOfMemory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "syntax tree arena exhausted after {} bytes", self.bytes)
    }
}

impl std::error::Error for OutOfMemory {}

macro_rules! id_types {
    ($($(#[$meta:meta])* $name:ident),* $(,)?) => {$(
        $(#[$meta])*
        #[derive(Copy, Clone, PartialEq, Eq, Hash)]
        pub struct $name(u32);

        impl $name {
            pub(crate) fn new(index: usize) -> $name {
                $name(index as u32)
            }

            pub(crate) fn index(self) -> usize {
                self.0 as usize
            }
        }

        impl fmt::Debug for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, concat!(stringify!($name), "({})"), self.0)
            }
        }
    )*};
}

id_types! {
    /// Handle to an [`Expr`] in the arena.
    ExprId,
    /// Handle to a [`Declarator`].
    DecltId,
    /// Handle to a [`Declaration`].
    DeclId,
    /// Handle to a [`Stmt`].
    StmtId,
    /// Handle to a [`TypeName`].
    TypeNameId,
    /// Handle to an [`Initializer`].
    InitId,
    /// Handle to an [`ExternalDecl`].
    ExternalId,
}

macro_rules! range_types {
    ($($(#[$meta:meta])* $name:ident),* $(,)?) => {$(
        $(#[$meta])*
        #[derive(Copy, Clone, PartialEq, Eq, Hash)]
        pub struct $name {
            start: u32,
            len: u32,
        }

        impl $name {
            pub(crate) fn new(start: usize, len: usize) -> $name {
                $name { start: start as u32, len: len as u32 }
            }

            pub const EMPTY: $name = $name { start: 0, len: 0 };

            pub fn len(self) -> usize {
                self.len as usize
            }

            pub fn is_empty(self) -> bool {
                self.len == 0
            }

            fn bounds(self) -> std::ops::Range<usize> {
                self.start as usize..(self.start + self.len) as usize
            }
        }

        impl fmt::Debug for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(
                    f,
                    concat!(stringify!($name), "({}..{})"),
                    self.start,
                    self.start + self.len
                )
            }
        }
    )*};
}

range_types! {
    /// A flattened expression list (call arguments, comma lists).
    ExprRange,
    /// Items of a compound statement.
    BlockItemRange,
    /// Elements of a brace initializer.
    InitElemRange,
    /// Designators prefixing one initializer element.
    DesignatorRange,
    /// A declaration-specifier (or specifier-qualifier) list.
    SpecRange,
    /// Member declarations of a struct or union body.
    StructDeclRange,
    /// Declarators within one struct member declaration.
    StructDecltRange,
    /// Enumerators of an enum body.
    EnumeratorRange,
    /// Parameters of a function declarator.
    ParamRange,
    /// (declarator, optional initializer) pairs of one declaration.
    InitDecltRange,
    /// A bare identifier list (old-style function declarator).
    SymbolRange,
    /// K&R parameter declarations of a function definition.
    DeclRange,
}

/// The per-translation-unit node arena. See the module docs.
#[derive(Default)]
pub struct Arena {
    exprs: Vec<Expr>,
    expr_lists: Vec<ExprId>,
    declts: Vec<Declarator>,
    decls: Vec<Declaration>,
    stmts: Vec<Stmt>,
    block_items: Vec<BlockItem>,
    type_names: Vec<TypeName>,
    inits: Vec<Initializer>,
    init_elems: Vec<InitializerElem>,
    designators: Vec<Designator>,
    specs: Vec<DeclSpec>,
    struct_decls: Vec<StructDeclaration>,
    struct_declts: Vec<StructDeclarator>,
    enumerators: Vec<Enumerator>,
    params: Vec<ParameterDeclaration>,
    init_declts: Vec<InitDeclarator>,
    symbols: Vec<Symbol>,
    decl_lists: Vec<DeclId>,
    externals: Vec<ExternalDecl>,
    bytes: usize,
}

fn push<T>(store: &mut Vec<T>, bytes: &mut usize, value: T) -> Result<usize, OutOfMemory> {
    store.try_reserve(1).map_err(|_| OutOfMemory { bytes: *bytes })?;
    let index = store.len();
    store.push(value);
    *bytes += std::mem::size_of::<T>();
    Ok(index)
}

fn extend<T>(
    store: &mut Vec<T>,
    bytes: &mut usize,
    values: impl IntoIterator<Item = T>,
) -> Result<(usize, usize), OutOfMemory> {
    let start = store.len();
    for value in values {
        push(store, bytes, value)?;
    }
    Ok((start, store.len() - start))
}

macro_rules! accessors {
    ($($alloc:ident / $get:ident: $store:ident, $id:ident, $node:ty);* $(;)?) => {$(
        pub fn $alloc(&mut self, node: $node) -> Result<$id, OutOfMemory> {
            push(&mut self.$store, &mut self.bytes, node).map($id::new)
        }

        #[track_caller]
        pub fn $get(&self, id: $id) -> &$node {
            &self.$store[id.index()]
        }
    )*};
}

macro_rules! list_accessors {
    ($($alloc:ident / $get:ident: $store:ident, $range:ident, $elem:ty);* $(;)?) => {$(
        pub fn $alloc(
            &mut self,
            values: impl IntoIterator<Item = $elem>,
        ) -> Result<$range, OutOfMemory> {
            extend(&mut self.$store, &mut self.bytes, values)
                .map(|(start, len)| $range::new(start, len))
        }

        #[track_caller]
        pub fn $get(&self, range: $range) -> &[$elem] {
            &self.$store[range.bounds()]
        }
    )*};
}

impl Arena {
    pub fn new() -> Arena {
        Arena::default()
    }

    accessors! {
        alloc_expr / expr: exprs, ExprId, Expr;
        alloc_declt / declt: declts, DecltId, Declarator;
        alloc_decl / decl: decls, DeclId, Declaration;
        alloc_stmt / stmt: stmts, StmtId, Stmt;
        alloc_type_name / get_type_name: type_names, TypeNameId, TypeName;
        alloc_init / init: inits, InitId, Initializer;
        alloc_external / external: externals, ExternalId, ExternalDecl;
    }

    list_accessors! {
        alloc_expr_list / expr_list: expr_lists, ExprRange, ExprId;
        alloc_block_items / block_items: block_items, BlockItemRange, BlockItem;
        alloc_init_elems / init_elems: init_elems, InitElemRange, InitializerElem;
        alloc_designators / designators: designators, DesignatorRange, Designator;
        alloc_specs / specs: specs, SpecRange, DeclSpec;
        alloc_struct_decls / struct_decls: struct_decls, StructDeclRange, StructDeclaration;
        alloc_struct_declts / struct_declts: struct_declts, StructDecltRange, StructDeclarator;
        alloc_enumerators / enumerators: enumerators, EnumeratorRange, Enumerator;
        alloc_params / params: params, ParamRange, ParameterDeclaration;
        alloc_init_declts / init_declts: init_declts, InitDecltRange, InitDeclarator;
        alloc_symbols / symbols: symbols, SymbolRange, Symbol;
        alloc_decl_list / decl_list: decl_lists, DeclRange, DeclId;
    }

    /// Bytes accumulated so far across all stores.
    pub fn bytes_used(&self) -> usize {
        self.bytes
    }

    /// Tears the arena (and every node in it) down, reporting the total
    /// bytes it accumulated over its lifetime.
    pub fn finish(self) -> usize {
        self.bytes
    }
}

impl fmt::Debug for Arena {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Arena")
            .field("exprs", &self.exprs.len())
            .field("declts", &self.declts.len())
            .field("decls", &self.decls.len())
            .field("stmts", &self.stmts.len())
            .field("externals", &self.externals.len())
            .field("bytes", &self.bytes)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn byte_accounting_is_monotonic() {
        let mut arena = Arena::new();
        assert_eq!(arena.bytes_used(), 0);

        let mut last = 0;
        for i in 0..10 {
            arena
                .alloc_expr(Expr::Integer(crate::ast::IntegerConstant {
                    value: i,
                    affix: crate::token::Affix::None,
                }))
                .unwrap();
            assert!(arena.bytes_used() > last);
            last = arena.bytes_used();
        }
        assert_eq!(arena.finish(), last);
    }

    #[test]
    fn ids_resolve_to_their_nodes() {
        let mut arena = Arena::new();
        let a = arena.alloc_stmt(Stmt::Break).unwrap();
        let b = arena.alloc_stmt(Stmt::Continue).unwrap();
        assert_ne!(a, b);
        assert_eq!(arena.stmt(a), &Stmt::Break);
        assert_eq!(arena.stmt(b), &Stmt::Continue);
    }

    #[test]
    fn ranges_stay_valid_across_later_allocations() {
        let mut arena = Arena::new();
        let x = arena.alloc_stmt(Stmt::Break).unwrap();
        let range = arena
            .alloc_block_items([BlockItem::Stmt(x)])
            .unwrap();
        for _ in 0..100 {
            arena
                .alloc_block_items([BlockItem::Stmt(x), BlockItem::Stmt(x)])
                .unwrap();
        }
        assert_eq!(arena.block_items(range), &[BlockItem::Stmt(x)]);
        assert_eq!(range.len(), 1);
        assert!(!range.is_empty());
    }

    #[test]
    fn empty_ranges_resolve_to_empty_slices() {
        let arena = Arena::new();
        assert_eq!(arena.expr_list(ExprRange::EMPTY), &[]);
        assert!(SpecRange::EMPTY.is_empty());
    }
}
