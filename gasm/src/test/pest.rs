#![allow(clippy::cognitive_complexity)]

use crate::{GasmParser, Rule};
use ::pest::*;

#[test]
fn numbers() {
    parses_to! {
        parser: GasmParser,
        input: "4492",
        rule: Rule::number,
        tokens: [ number(0, 4, [ dec_number(0, 4) ]) ]
    };
    parses_to! {
        parser: GasmParser,
        input: "0x2a",
        rule: Rule::number,
        tokens: [ number(0, 4, [ hex_number(0, 4) ]) ]
    };
}

#[test]
fn hexadecimal_is_lowercase_only() {
    assert!(GasmParser::parse(Rule::number, "0xFF").is_err());
    assert!(GasmParser::parse(Rule::number, "0x").is_err());
}

#[test]
fn registers() {
    parses_to! {
        parser: GasmParser,
        input: "g0",
        rule: Rule::register,
        tokens: [ register(0, 2) ]
    };
    parses_to! {
        parser: GasmParser,
        input: "g15",
        rule: Rule::register,
        tokens: [ register(0, 3) ]
    };
    assert!(GasmParser::parse(Rule::register, "g16").is_err());
    assert!(GasmParser::parse(Rule::register, "gg").is_err());
}

#[test]
fn non_register_tokens_fall_through_to_labels() {
    parses_to! {
        parser: GasmParser,
        input: "g16",
        rule: Rule::operand,
        tokens: [ operand(0, 3, [ label_name(0, 3) ]) ]
    };
    parses_to! {
        parser: GasmParser,
        input: "addx",
        rule: Rule::label_name,
        tokens: [ label_name(0, 4) ]
    };
    assert!(GasmParser::parse(Rule::label_name, "add").is_err());
    assert!(GasmParser::parse(Rule::label_name, "halt").is_err());
    assert!(GasmParser::parse(Rule::label_name, "g7").is_err());
    assert!(GasmParser::parse(Rule::label_name, "7up").is_err());
}

#[test]
fn immediates() {
    parses_to! {
        parser: GasmParser,
        input: "$42",
        rule: Rule::immediate,
        tokens: [ immediate(0, 3, [ number(1, 3, [ dec_number(1, 3) ]) ]) ]
    };
    parses_to! {
        parser: GasmParser,
        input: "$loop",
        rule: Rule::immediate,
        tokens: [ immediate(0, 5, [ label_name(1, 5) ]) ]
    };
    assert!(GasmParser::parse(Rule::immediate, "$ 5").is_err());
}

#[test]
fn labels_bind_with_optional_colon() {
    parses_to! {
        parser: GasmParser,
        input: "end:",
        rule: Rule::label,
        tokens: [ label(0, 4, [ label_name(0, 3) ]) ]
    };
    parses_to! {
        parser: GasmParser,
        input: "end",
        rule: Rule::label,
        tokens: [ label(0, 3, [ label_name(0, 3) ]) ]
    };
}

#[test]
fn instructions() {
    parses_to! {
        parser: GasmParser,
        input: "mov $5 g0",
        rule: Rule::instruction_two,
        tokens: [ instruction_two(0, 9, [
            mnemonic_two(0, 3),
            operand(4, 6, [ immediate(4, 6, [ number(5, 6, [ dec_number(5, 6) ]) ]) ]),
            operand(7, 9, [ register(7, 9) ])
        ]) ]
    };
    parses_to! {
        parser: GasmParser,
        input: "jump $start",
        rule: Rule::instruction_one,
        tokens: [ instruction_one(0, 11, [
            mnemonic_one(0, 4),
            operand(5, 11, [ immediate(5, 11, [ label_name(6, 11) ]) ])
        ]) ]
    };
}

#[test]
fn labeled_definition() {
    parses_to! {
        parser: GasmParser,
        input: "x byte 42",
        rule: Rule::labeled_statement,
        tokens: [ labeled_statement(0, 9, [
            label(0, 1, [ label_name(0, 1) ]),
            definition(2, 9, [
                def_size(2, 6),
                number(7, 9, [ dec_number(7, 9) ])
            ])
        ]) ]
    };
}

#[test]
fn program_structure() {
    parses_to! {
        parser: GasmParser,
        input: "halt",
        rule: Rule::program,
        tokens: [ program(0, 4, [
            statement(0, 4, [
                instruction(0, 4, [ instruction_zero(0, 4, [ mnemonic_zero(0, 4) ]) ])
            ]),
            EOI(4, 4)
        ]) ]
    };
    assert!(GasmParser::parse(Rule::program, "mov $5 halt").is_err());
}
