use super::{Cpu, CpuError};
use crate::instruction::AddressingMode;
use crate::memory::Memory;
use crate::{constants, Word};
use num::FromPrimitive;

const OP1_OFFSET: Word = constants::OPCODE_BYTES + constants::MODE_BYTES;
const OP2_OFFSET: Word = OP1_OFFSET + constants::OPERAND_BYTES;

/// Where a resolved two-operand instruction stores its result.
enum Target {
    Register(Word),
    Memory(Word),
}

fn fetch_mode(cpu: &Cpu, mem: &Memory) -> Result<AddressingMode, CpuError> {
    let byte = cpu.read_byte(mem, cpu.registers.ip.data + constants::OPCODE_BYTES)?;
    AddressingMode::from_u8(byte).ok_or(CpuError::InvalidMode(byte))
}

fn register(cpu: &Cpu, code: Word) -> Result<Word, CpuError> {
    cpu.registers
        .read(code)
        .ok_or(CpuError::UnknownRegister(code))
}

fn pair_operands(cpu: &Cpu, mem: &Memory) -> Result<(AddressingMode, Word, Word), CpuError> {
    let ip = cpu.registers.ip.data;
    let mode = fetch_mode(cpu, mem)?;
    let op1 = cpu.read_word(mem, ip + OP1_OFFSET)?;
    let op2 = cpu.read_word(mem, ip + OP2_OFFSET)?;
    Ok((mode, op1, op2))
}

/// Resolves the effective (L, R) values of a two-operand instruction. The
/// destination is always op2's location.
fn resolve_pair(
    cpu: &Cpu,
    mem: &Memory,
    mode: AddressingMode,
    op1: Word,
    op2: Word,
) -> Result<(Word, Word, Target), CpuError> {
    Ok(match mode {
        AddressingMode::RegisterRegister => (
            register(cpu, op1)?,
            register(cpu, op2)?,
            Target::Register(op2),
        ),
        AddressingMode::RegisterMemory => (
            register(cpu, op1)?,
            cpu.read_word(mem, op2)?,
            Target::Memory(op2),
        ),
        AddressingMode::MemoryRegister => (
            cpu.read_word(mem, op1)?,
            register(cpu, op2)?,
            Target::Register(op2),
        ),
        AddressingMode::ImmediateMemory => (op1, cpu.read_word(mem, op2)?, Target::Memory(op2)),
        AddressingMode::ImmediateRegister => (op1, register(cpu, op2)?, Target::Register(op2)),
        other => return Err(CpuError::InvalidMode(other as u8)),
    })
}

fn store(cpu: &mut Cpu, mem: &mut Memory, target: Target, value: Word) -> Result<(), CpuError> {
    match target {
        Target::Register(code) => {
            if cpu.registers.write(code, value) {
                Ok(())
            } else {
                Err(CpuError::UnknownRegister(code))
            }
        }
        Target::Memory(address) => Ok(cpu.write_word(mem, address, value)?),
    }
}

fn advance(cpu: &mut Cpu, bytes: Word) {
    cpu.registers.ip.data = cpu.registers.ip.data.wrapping_add(bytes);
}

/// Shared executor for the two-operand data instructions: resolves the
/// (L, R) pair, applies `op` and writes the result to op2's location.
pub(super) fn transform<F>(cpu: &mut Cpu, mem: &mut Memory, op: F) -> Result<(), CpuError>
where
    F: Fn(Word, Word) -> Result<Word, CpuError>,
{
    let (mode, op1, op2) = pair_operands(cpu, mem)?;
    let (left, right, target) = resolve_pair(cpu, mem, mode, op1, op2)?;
    let value = op(left, right)?;
    store(cpu, mem, target, value)?;
    advance(cpu, constants::BINARY_INSTR_BYTES);
    Ok(())
}

pub(super) fn compare(cpu: &mut Cpu, mem: &Memory) -> Result<(), CpuError> {
    let (mode, op1, op2) = pair_operands(cpu, mem)?;
    let (left, right, _) = resolve_pair(cpu, mem, mode, op1, op2)?;
    cpu.flags.equ = left == right;
    cpu.flags.greater = left > right;
    advance(cpu, constants::BINARY_INSTR_BYTES);
    Ok(())
}

/// Branch executor. A not-taken branch advances past the instruction
/// without decoding its operand.
pub(super) fn branch_if(cpu: &mut Cpu, mem: &Memory, taken: bool) -> Result<(), CpuError> {
    if !taken {
        advance(cpu, constants::UNARY_INSTR_BYTES);
        return Ok(());
    }

    let mode = fetch_mode(cpu, mem)?;
    let op1 = cpu.read_word(mem, cpu.registers.ip.data + OP1_OFFSET)?;

    let target = match mode {
        AddressingMode::Register => register(cpu, op1)?,
        AddressingMode::Memory => cpu.read_word(mem, op1)?,
        AddressingMode::Immediate => op1,
        other => return Err(CpuError::InvalidMode(other as u8)),
    };

    cpu.registers.ip.data = target;
    Ok(())
}
