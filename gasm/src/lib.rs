//! Assembler for the [gvm](../gvm/index.html) virtual machine.
//!
//! The main function provided by this crate is [`assemble`](fn.assemble.html),
//! which accepts a program written in the machine's assembly language and
//! outputs the flat binary image the CPU executes.
//!
//! Parsing is implemented using [pest]; the [`Error`](type.Error.html) type
//! is an alias of `pest::error::Error`, so every diagnostic carries the span
//! of the offending token and pretty-prints with its source line.
//!
//! # Assembly language
//!
//! A program is a free-form stream of whitespace-separated tokens; any run
//! of whitespace (including newlines) separates tokens and there is no
//! comment syntax.
//!
//! ## Statements
//!
//!  Form                | Meaning
//! ---------------------|---------------------------------------------------
//! `<mnemonic> [ops]`   | emit one instruction
//! `<label> <stmt>`     | bind `<label>` to the current offset, then `<stmt>`
//! `<label> byte <n>`   | place `<n>` inline as a single byte
//! `<label> word <n>`   | place `<n>` inline as four little-endian bytes
//!
//! A label starts with an ASCII letter and is anything that is neither a
//! mnemonic nor a register; a trailing `:` is accepted at binding sites.
//!
//! ## Mnemonics
//!
//!  Mnemonic | Operands | Effect
//! ----------|----------|--------------------------------------------------
//! `add`     | 2        | dst = L + R
//! `sub`     | 2        | dst = L - R
//! `mul`     | 2        | dst = L * R
//! `div`     | 2        | dst = L / R
//! `mov`     | 2        | dst = L
//! `cmp`     | 2        | sets the `equ` and `greater` flags
//! `jump`    | 1        | IP = target
//! `jg`      | 1        | IP = target, if `greater` is set
//! `je`      | 1        | IP = target, if `equ` is set
//! `halt`    | 0        | stops the CPU
//!
//! ## Operands
//!
//!  Form     | Kind      | Example
//! ----------|-----------|----------
//! `gN`      | register  | `g7`
//! number    | memory    | `0x40`
//! label     | memory    | `table`
//! `$number` | immediate | `$1`
//! `$label`  | immediate | `$loop`
//!
//! Numbers are decimal or `0x`-prefixed lowercase hexadecimal. A bare label
//! is a memory operand whose address is the label's offset; `$label` is an
//! immediate carrying that offset itself, which is the form branch targets
//! normally use. The second operand of a two-operand instruction names the
//! destination and must not be an immediate; memory-to-memory operand pairs
//! are not encodable.
//!
//! Label references may appear before the label is bound; a fix-up pass
//! patches them once the whole source has been read, and assembly fails if
//! any reference is left unresolved.
//!
//! [pest]: https://docs.rs/pest/

mod encode;
mod numbers;
mod parser;

#[cfg(test)]
mod test;

use pest::iterators::Pair;
use pest::{Parser, Span};

pub use parser::{GasmParser, Rule};

pub type Error = pest::error::Error<Rule>;

pub type Result<T> = std::result::Result<T, Error>;

/// Assembles `input` into a flat binary image.
///
/// On success the returned bytes hold the first instruction at offset 0 and
/// every label reference patched. On failure no image is returned; the
/// error identifies the offending token.
pub fn assemble(input: &str) -> Result<Vec<u8>> {
    encode::process_program(parse(input)?)
}

fn new_parser_error(span: Span, message: String) -> Error {
    Error::new_from_span(pest::error::ErrorVariant::CustomError { message }, span)
}

fn parse(input: &str) -> Result<Pair<Rule>> {
    Ok(GasmParser::parse(Rule::program, input)?.next().unwrap())
}
