use crate::numbers::process_number;
use crate::{new_parser_error, Result, Rule};
use byteorder::ByteOrder;
use gvm::{
    constants, encode_binary, encode_nullary, encode_unary, general_register_code, AddressingMode,
    Endian, Opcode, OperandKind, Word,
};
use matches::debug_assert_matches;
use pest::iterators::Pair;
use pest::Span;
use std::collections::HashMap;

type LabelMap<'i> = HashMap<&'i str, Word>;

/// An operand slot awaiting the offset of a label, to be filled by the
/// fix-up pass.
struct Patch<'i> {
    span: Span<'i>,
    offset: Word,
}

enum OperandValue<'i> {
    Literal(Word),
    Label(Span<'i>),
}

struct Operand<'i> {
    kind: OperandKind,
    value: OperandValue<'i>,
    span: Span<'i>,
}

pub(crate) fn process_program(pair: Pair<Rule>) -> Result<Vec<u8>> {
    debug_assert_matches!(pair.as_rule(), Rule::program);

    let mut builder = ImageBuilder::default();
    for statement in pair.into_inner() {
        if statement.as_rule() == Rule::EOI {
            break;
        }
        builder.process_statement(statement)?;
    }
    builder.finish()
}

#[derive(Default)]
struct ImageBuilder<'i> {
    bytes: Vec<u8>,
    labels: LabelMap<'i>,
    unresolved: Vec<Patch<'i>>,
}

impl<'i> ImageBuilder<'i> {
    fn offset(&self) -> Word {
        self.bytes.len() as Word
    }

    fn process_statement(&mut self, pair: Pair<'i, Rule>) -> Result<()> {
        debug_assert_matches!(pair.as_rule(), Rule::statement);
        let inner = pair.into_inner().next().unwrap();
        match inner.as_rule() {
            Rule::instruction => self.process_instruction(inner),
            Rule::labeled_statement => self.process_labeled_statement(inner),
            _ => unreachable!(),
        }
    }

    fn process_labeled_statement(&mut self, pair: Pair<'i, Rule>) -> Result<()> {
        let mut pairs = pair.into_inner();
        self.bind_label(pairs.next().unwrap())?;

        let body = pairs.next().unwrap();
        match body.as_rule() {
            Rule::definition => self.process_definition(body),
            Rule::instruction => self.process_instruction(body),
            _ => unreachable!(),
        }
    }

    fn bind_label(&mut self, pair: Pair<'i, Rule>) -> Result<()> {
        debug_assert_matches!(pair.as_rule(), Rule::label);
        let span = pair.into_inner().next().unwrap().as_span();
        let name = span.as_str();
        let offset = self.offset();
        if self.labels.insert(name, offset).is_some() {
            return Err(new_parser_error(span, format!("duplicate label `{}`", name)));
        }
        Ok(())
    }

    fn process_definition(&mut self, pair: Pair<'i, Rule>) -> Result<()> {
        debug_assert_matches!(pair.as_rule(), Rule::definition);
        let mut pairs = pair.into_inner();
        let size = pairs.next().unwrap();
        let value = process_number(pairs.next().unwrap())?;

        // the value is truncated to the definition size
        match size.as_str() {
            "byte" => self.bytes.push(value as u8),
            "word" => {
                let mut buf = [0u8; constants::WORD_BYTES as usize];
                Endian::write_u32(&mut buf, value);
                self.bytes.extend_from_slice(&buf);
            }
            _ => unreachable!(),
        }
        Ok(())
    }

    fn process_instruction(&mut self, pair: Pair<'i, Rule>) -> Result<()> {
        debug_assert_matches!(pair.as_rule(), Rule::instruction);
        let inner = pair.into_inner().next().unwrap();
        let rule = inner.as_rule();
        let span = inner.as_span();
        let mut pairs = inner.into_inner();

        let opcode = process_mnemonic(&pairs.next().unwrap())?;

        match rule {
            Rule::instruction_two => {
                let first = process_operand(pairs.next().unwrap())?;
                let second = process_operand(pairs.next().unwrap())?;
                self.emit_binary(opcode, first, second, span)
            }
            Rule::instruction_one => {
                let operand = process_operand(pairs.next().unwrap())?;
                self.emit_unary(opcode, operand);
                Ok(())
            }
            Rule::instruction_zero => {
                self.bytes.extend(encode_nullary(opcode));
                Ok(())
            }
            _ => unreachable!(),
        }
    }

    fn emit_unary(&mut self, opcode: Opcode, operand: Operand<'i>) {
        let mode = AddressingMode::single(operand.kind);
        let base = self.offset();
        let op1 =
            self.operand_word(operand, base + constants::OPCODE_BYTES + constants::MODE_BYTES);
        self.bytes.extend(encode_unary(opcode, mode, op1));
    }

    fn emit_binary(
        &mut self,
        opcode: Opcode,
        first: Operand<'i>,
        second: Operand<'i>,
        span: Span<'i>,
    ) -> Result<()> {
        let mode = match AddressingMode::pair(first.kind, second.kind) {
            Some(mode) => mode,
            None if second.kind == OperandKind::Immediate => {
                return Err(new_parser_error(
                    second.span,
                    "second operand cannot be an immediate value".to_owned(),
                ));
            }
            None => {
                return Err(new_parser_error(
                    span,
                    "memory-to-memory operands cannot be encoded".to_owned(),
                ));
            }
        };

        let base = self.offset();
        let op1 = self.operand_word(first, base + constants::OPCODE_BYTES + constants::MODE_BYTES);
        let op2 = self.operand_word(
            second,
            base + constants::OPCODE_BYTES + constants::MODE_BYTES + constants::OPERAND_BYTES,
        );
        self.bytes.extend(encode_binary(opcode, mode, op1, op2));
        Ok(())
    }

    /// Returns the operand's literal value, or a zero placeholder after
    /// recording the slot to be patched by the fix-up pass.
    fn operand_word(&mut self, operand: Operand<'i>, slot: Word) -> Word {
        match operand.value {
            OperandValue::Literal(value) => value,
            OperandValue::Label(span) => {
                self.unresolved.push(Patch { span, offset: slot });
                0
            }
        }
    }

    /// Fix-up pass: overwrite every recorded operand slot with the offset
    /// its label resolved to.
    fn finish(mut self) -> Result<Vec<u8>> {
        for patch in &self.unresolved {
            let name = patch.span.as_str();
            let address = *self.labels.get(name).ok_or_else(|| {
                new_parser_error(patch.span.clone(), format!("unresolved symbol `{}`", name))
            })?;
            let start = patch.offset as usize;
            let end = start + constants::WORD_BYTES as usize;
            Endian::write_u32(&mut self.bytes[start..end], address);
        }
        Ok(self.bytes)
    }
}

fn process_mnemonic(pair: &Pair<Rule>) -> Result<Opcode> {
    pair.as_str()
        .parse()
        .map_err(|err| new_parser_error(pair.as_span(), format!("{}", err)))
}

fn process_operand(pair: Pair<Rule>) -> Result<Operand> {
    debug_assert_matches!(pair.as_rule(), Rule::operand);
    let span = pair.as_span();
    let inner = pair.into_inner().next().unwrap();

    match inner.as_rule() {
        Rule::register => Ok(Operand {
            kind: OperandKind::Register,
            value: OperandValue::Literal(register_code(&inner)),
            span,
        }),
        Rule::memory => Ok(Operand {
            kind: OperandKind::Memory,
            value: OperandValue::Literal(process_number(inner.into_inner().next().unwrap())?),
            span,
        }),
        Rule::label_name => Ok(Operand {
            kind: OperandKind::Memory,
            value: OperandValue::Label(inner.as_span()),
            span,
        }),
        Rule::immediate => {
            let inner = inner.into_inner().next().unwrap();
            let value = match inner.as_rule() {
                Rule::number => OperandValue::Literal(process_number(inner)?),
                Rule::label_name => OperandValue::Label(inner.as_span()),
                _ => unreachable!(),
            };
            Ok(Operand {
                kind: OperandKind::Immediate,
                value,
                span,
            })
        }
        _ => unreachable!(),
    }
}

fn register_code(pair: &Pair<Rule>) -> Word {
    // the grammar only admits g0..g15
    let index: Word = pair.as_str()[1..].parse().unwrap();
    general_register_code(index)
}
