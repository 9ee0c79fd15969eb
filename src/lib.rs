/*!
This crate is a whole-program compiler for SyC, a small subset of C, emitting
x86-64 assembly in GNU AT&T syntax. The pipeline is a strict chain of stages,
each one consuming the previous stage's output:

1. **Lexing** - [lex](lexer::lex) scans the source text into a sequence of
   [SpannedToken](lexer::SpannedToken)s terminated by an end-of-file sentinel.
   Unclosed literals and bytes which cannot begin a token produce a
   [LexError](lexer::LexError) with the offending position attached.
2. **Parsing** - [parse](parser::parse) consumes the tokens by recursive
   descent with precedence climbing and produces a [Program](ast::Program).
   The first grammar violation raises a [ParseError](parser::ParseError)
   carrying the source line.
3. **IR generation** - [emit_ir](ir::emit_ir) walks the tree in source order
   and lowers it to three-address code: an [IrModule](ir::IrModule) holding
   one [IrFunction](ir::IrFunction) per definition plus the global-variable
   table. Unsupported constructs (assignment to a non-identifier, pointer
   unaries) raise a [SemanticError](ir::SemanticError).
4. **Optimization** - [optimize](optimizer::optimize) runs constant folding,
   constant propagation and dead-code elimination over each function until a
   fixed point is reached.
5. **Emission** - [generate](codegen::generate) renders each function as a
   stack-frame based block of assembly, with every value spilled to an
   8-byte slot. There is no register allocation.

Every module except [ast] is hidden behind a feature flag of the same name,
so any prefix of the pipeline can be reused as a library (e.g. for lexing or
parsing SyC on its own). All features are enabled by default.

## Command-line usage

```shell
syc <input> [-o <output>] [-ir] [-tokens]
```

`-o` selects the output file (default `a.s`), `-ir` dumps the textual IR
after generation, `-tokens` dumps the lexer output. The driver exits 0 on
success and 1 on the first compilation error.
*/

#![deny(unused_must_use)]
#![warn(clippy::pedantic)]
#![allow(clippy::wildcard_imports)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::must_use_candidate)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::cast_sign_loss)]
#![allow(clippy::cast_possible_wrap)]
#![allow(clippy::cast_possible_truncation)]
#![allow(clippy::return_self_not_must_use)]

pub mod ast;
#[cfg(feature = "codegen")]
pub mod codegen;
#[cfg(feature = "ir")]
pub mod ir;
#[cfg(feature = "lexer")]
pub mod lexer;
#[cfg(feature = "optimizer")]
pub mod optimizer;
#[cfg(feature = "parser")]
pub mod parser;
