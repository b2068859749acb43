//! Lexical front end for a C99-flavored compiler: text normalization,
//! tokenization, and the allocation/identity substrate (string interner,
//! node arena, AST factory) a parser builds on.

/// UTF-8 validation, decoding, and encoding for wide and universal
/// characters.
pub mod utf8;

/// Identifier interning into identity-comparable `Symbol` handles.
pub mod intern;

/// The preprocessing text-normalization passes: trigraphs, line splicing,
/// comment removal.
pub mod pre;

/// The pull-based lexer, mapping normalized source bytes into tokens.
pub mod lexer;

pub mod token;

/// Typed-ID arena owning every syntax-tree node of a translation unit.
pub mod arena;

/// Syntax-tree node model and the factory methods that build it.
pub mod ast;
