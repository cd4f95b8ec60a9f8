use crate::*;
use gvm::{
    constants, encode_binary, encode_nullary, encode_unary, general_register_code, AddressingMode,
    Cpu, Memory, Opcode, StubIo, Word,
};

mod pest;

fn g(index: Word) -> Word {
    general_register_code(index)
}

fn image(parts: &[Vec<u8>]) -> Vec<u8> {
    parts.iter().flatten().copied().collect()
}

fn run(source: &str) -> (Cpu, Memory) {
    let program = assemble(source).unwrap();
    let mut cpu = Cpu::new(Box::new(StubIo));
    let mut mem = Memory::new(constants::MEM_WORDS);
    cpu.load_code(&mut mem, 0, &program).unwrap();
    cpu.run(&mut mem).unwrap();
    (cpu, mem)
}

#[test]
fn empty_source_is_an_empty_image() {
    assert_eq!(assemble("").unwrap(), Vec::<u8>::new());
    assert_eq!(assemble(" \n\t  \n").unwrap(), Vec::<u8>::new());
}

#[test]
fn halt_is_a_single_byte() {
    assert_eq!(assemble("halt").unwrap(), [0x04]);
}

#[test]
fn two_operand_encoding_matrix() {
    let mnemonics = [
        ("add", Opcode::ADD),
        ("sub", Opcode::SUB),
        ("mov", Opcode::MOV),
        ("cmp", Opcode::CMP),
        ("mul", Opcode::MUL),
        ("div", Opcode::DIV),
    ];
    let operands = [
        ("g1 g2", AddressingMode::RegisterRegister, g(1), g(2)),
        ("g1 8", AddressingMode::RegisterMemory, g(1), 8),
        ("8 g1", AddressingMode::MemoryRegister, 8, g(1)),
        ("$7 g1", AddressingMode::ImmediateRegister, 7, g(1)),
        ("$7 8", AddressingMode::ImmediateMemory, 7, 8),
    ];

    for (mnemonic, opcode) in &mnemonics {
        for (forms, mode, op1, op2) in &operands {
            let source = format!("{} {}", mnemonic, forms);
            assert_eq!(
                assemble(&source).unwrap(),
                encode_binary(*opcode, *mode, *op1, *op2),
                "source: {}",
                source
            );
        }
    }
}

#[test]
fn branch_encoding_matrix() {
    let mnemonics = [
        ("jump", Opcode::JUMP),
        ("jg", Opcode::JG),
        ("je", Opcode::JE),
    ];
    let operands = [
        ("g3", AddressingMode::Register, g(3)),
        ("16", AddressingMode::Memory, 16),
        ("$16", AddressingMode::Immediate, 16),
    ];

    for (mnemonic, opcode) in &mnemonics {
        for (form, mode, op1) in &operands {
            let source = format!("{} {}", mnemonic, form);
            assert_eq!(
                assemble(&source).unwrap(),
                encode_unary(*opcode, *mode, *op1),
                "source: {}",
                source
            );
        }
    }
}

#[test]
fn hexadecimal_operands() {
    assert_eq!(
        assemble("mov $0xff g0").unwrap(),
        encode_binary(Opcode::MOV, AddressingMode::ImmediateRegister, 255, g(0))
    );
    assert_eq!(
        assemble("jump 0x10").unwrap(),
        encode_unary(Opcode::JUMP, AddressingMode::Memory, 16)
    );
}

#[test]
fn definitions_place_literal_bytes_inline() {
    assert_eq!(
        assemble("x byte 42 y word 0xdeadbeef halt").unwrap(),
        [42, 0xef, 0xbe, 0xad, 0xde, 0x04]
    );
}

#[test]
fn definition_value_is_truncated_to_its_size() {
    assert_eq!(assemble("x byte 0x1ff halt").unwrap(), [0xff, 0x04]);
}

#[test]
fn forward_reference_is_patched_to_the_label_offset() {
    let expected = image(&[
        encode_unary(Opcode::JUMP, AddressingMode::Immediate, 16),
        encode_binary(Opcode::MOV, AddressingMode::ImmediateRegister, 1, g(0)),
        encode_nullary(Opcode::HALT),
    ]);

    let emitted = assemble("jump $end mov $1 g0 end: halt").unwrap();
    assert_eq!(emitted, expected);
    assert_eq!(&emitted[2..6], [16, 0, 0, 0]);
}

#[test]
fn backward_reference_resolves_immediately() {
    assert_eq!(
        assemble("start: mov $1 g0 jump $start").unwrap(),
        image(&[
            encode_binary(Opcode::MOV, AddressingMode::ImmediateRegister, 1, g(0)),
            encode_unary(Opcode::JUMP, AddressingMode::Immediate, 0),
        ])
    );
}

#[test]
fn immediate_label_carries_the_same_offset_as_a_bare_label() {
    // a bare label is a memory operand at the label's offset, `$label` is
    // an immediate holding that offset; the emitted value is identical
    assert_eq!(
        assemble("mov target g0 mov $target g1 target: halt").unwrap(),
        image(&[
            encode_binary(Opcode::MOV, AddressingMode::MemoryRegister, 20, g(0)),
            encode_binary(Opcode::MOV, AddressingMode::ImmediateRegister, 20, g(1)),
            encode_nullary(Opcode::HALT),
        ])
    );
}

#[test]
fn second_operand_label_patches_its_own_slot() {
    let emitted = assemble("mov $7 spot spot: word 0").unwrap();
    assert_eq!(
        emitted,
        image(&[
            encode_binary(Opcode::MOV, AddressingMode::ImmediateMemory, 7, 10),
            vec![0, 0, 0, 0],
        ])
    );
    assert_eq!(&emitted[6..10], [10, 0, 0, 0]);
}

#[test]
fn memory_to_memory_is_rejected() {
    let err = assemble("add 4 8").unwrap_err();
    assert!(format!("{}", err).contains("memory-to-memory"));

    // label operands are memory operands too
    assert!(assemble("x byte 1 y byte 2 mov x y halt").is_err());
}

#[test]
fn immediate_second_operand_is_rejected() {
    let err = assemble("mov g0 $5").unwrap_err();
    assert!(format!("{}", err).contains("immediate"));

    // an immediate label in second position is no better
    assert!(assemble("mov g1 $x x: halt").is_err());
}

#[test]
fn unresolved_symbol_fails_the_whole_assembly() {
    let err = assemble("jump $nowhere halt").unwrap_err();
    assert!(format!("{}", err).contains("unresolved symbol"));
}

#[test]
fn duplicate_labels_are_rejected() {
    let err = assemble("x byte 1 x byte 2 halt").unwrap_err();
    assert!(format!("{}", err).contains("duplicate label"));
}

#[test]
fn register_out_of_range_is_a_label() {
    // g16 does not name a register, so it falls through to the label rule
    let err = assemble("mov $1 g16 halt").unwrap_err();
    assert!(format!("{}", err).contains("unresolved symbol"));

    assert_eq!(
        assemble("g16: byte 7 mov g16 g0 halt").unwrap(),
        image(&[
            vec![7],
            encode_binary(Opcode::MOV, AddressingMode::MemoryRegister, 0, g(0)),
            encode_nullary(Opcode::HALT),
        ])
    );
}

#[test]
fn mnemonics_are_case_sensitive() {
    assert!(assemble("HALT").is_err());
    assert!(assemble("Mov $5 g0 halt").is_err());
}

#[test]
fn malformed_statements_are_rejected() {
    assert!(assemble("mov").is_err());
    assert!(assemble("mov g0").is_err());
    assert!(assemble("mov g0 g1 g2").is_err());
    assert!(assemble("x").is_err());
    assert!(assemble("42").is_err());
    assert!(assemble("x word").is_err());
    assert!(assemble("x word y").is_err());
    assert!(assemble("mov $5 halt").is_err());
}

#[test]
fn number_overflow_is_reported_at_the_token() {
    assert!(assemble("mov $4294967296 g0").is_err());
    assert!(assemble("x word 0x1ffffffff halt").is_err());
}

#[test]
fn assemble_and_run_counting_loop() {
    let source = "mov $0 g0
mov $1 g1
mov $5 g2
loop: add g1 g0
cmp g0 g2
je $end
jump $loop
end: halt";

    let (cpu, _) = run(source);
    assert!(cpu.flags().halt);
    assert_eq!(cpu.registers().general(0), 5);
}

#[test]
fn assemble_and_run_store_to_data_label() {
    let (_, mem) = run("mov $7 spot halt spot: word 0");

    // `spot` sits at offset 11; the stored word straddles two aligned words
    assert_eq!(mem.read(8), Ok(0x0704_0000));
    assert_eq!(mem.read(12), Ok(0));
}

#[test]
fn assemble_and_run_branch_over_skipped_code() {
    let source = "mov $10 g0 mov $1 g1 cmp g0 g1 jg $end mov $99 g0 end: halt";

    let (cpu, _) = run(source);
    assert_eq!(cpu.registers().general(0), 10);
    assert!(cpu.flags().greater);
}
