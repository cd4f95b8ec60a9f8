use crate::instruction::Opcode;
use crate::io::Io;
use crate::memory::{Memory, MemoryError};
use crate::{constants, instruction, Endian, Word};
use byteorder::ByteOrder;
use num::FromPrimitive;
use std::error::Error as StdError;
use std::fmt;

mod exec;

/// Error raised while executing a single instruction.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum CpuError {
    /// The byte fetched at IP does not name an instruction.
    UnknownOpcode(u8),
    /// The mode byte is undefined, or not usable by the instruction.
    InvalidMode(u8),
    /// No register slot carries the requested code.
    UnknownRegister(Word),
    /// Division with a zero divisor.
    DivisionByZero,
    /// The underlying memory rejected an access.
    Memory(MemoryError),
}

impl fmt::Display for CpuError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match *self {
            CpuError::UnknownOpcode(opcode) => write!(f, "unknown opcode 0x{:02x}", opcode),
            CpuError::InvalidMode(mode) => write!(f, "invalid addressing mode 0x{:02x}", mode),
            CpuError::UnknownRegister(code) => write!(f, "unknown register code 0x{:02x}", code),
            CpuError::DivisionByZero => f.write_str("division by zero"),
            CpuError::Memory(err) => write!(f, "memory access failed: {}", err),
        }
    }
}

impl StdError for CpuError {
    fn source(&self) -> Option<&(dyn StdError + 'static)> {
        match self {
            CpuError::Memory(err) => Some(err),
            _ => None,
        }
    }
}

impl From<MemoryError> for CpuError {
    fn from(err: MemoryError) -> CpuError {
        CpuError::Memory(err)
    }
}

/// CPU condition and control flags. All start cleared.
#[derive(Clone, Copy, Default, Debug, Eq, PartialEq)]
pub struct Flags {
    /// Set by HALT; no further instructions are fetched.
    pub halt: bool,
    /// Set when a step fails; the failing instruction has no further effect.
    pub error: bool,
    /// The operands of the last compare were equal.
    pub equ: bool,
    /// The left operand of the last compare was strictly greater (unsigned).
    pub greater: bool,
}

#[derive(Clone, Copy)]
struct Register {
    code: Word,
    data: Word,
}

/// The register file: IP, SP and sixteen general purpose registers.
///
/// General purpose registers are located by their encoding code, never by
/// their textual name or position. IP and SP are named fields and not
/// reachable through the code lookup.
pub struct RegisterFile {
    ip: Register,
    sp: Register,
    general: [Register; constants::GP_REGISTER_COUNT],
}

impl RegisterFile {
    fn new() -> RegisterFile {
        let mut general = [Register { code: 0, data: 0 }; constants::GP_REGISTER_COUNT];
        for (index, register) in general.iter_mut().enumerate() {
            register.code = instruction::general_register_code(index as Word);
        }
        debug_assert!(unique_codes(&general));

        RegisterFile {
            ip: Register {
                code: constants::IP_CODE,
                data: 0,
            },
            sp: Register {
                code: constants::SP_CODE,
                data: 0,
            },
            general,
        }
    }

    pub fn ip(&self) -> Word {
        self.ip.data
    }

    pub fn sp(&self) -> Word {
        self.sp.data
    }

    /// Returns the value of `gN` for index `N`.
    pub fn general(&self, index: usize) -> Word {
        self.general[index].data
    }

    fn read(&self, code: Word) -> Option<Word> {
        self.general.iter().find(|r| r.code == code).map(|r| r.data)
    }

    fn write(&mut self, code: Word, value: Word) -> bool {
        match self.general.iter_mut().find(|r| r.code == code) {
            Some(register) => {
                register.data = value;
                true
            }
            None => false,
        }
    }
}

fn unique_codes(registers: &[Register]) -> bool {
    registers
        .iter()
        .enumerate()
        .all(|(i, a)| registers[i + 1..].iter().all(|b| a.code != b.code))
}

/// The processor. Owns its flags, its register file and a handle to the
/// attached peripheral; the memory it executes against is passed into each
/// operation, so the host keeps access to it between steps.
pub struct Cpu {
    flags: Flags,
    registers: RegisterFile,
    io: Box<dyn Io>,
}

impl Cpu {
    pub fn new(io: Box<dyn Io>) -> Cpu {
        Cpu {
            flags: Flags::default(),
            registers: RegisterFile::new(),
            io,
        }
    }

    pub fn flags(&self) -> Flags {
        self.flags
    }

    pub fn registers(&self) -> &RegisterFile {
        &self.registers
    }

    pub fn io(&mut self) -> &mut dyn Io {
        &mut *self.io
    }

    /// Copies an assembled image into memory at `address`, byte by byte
    /// through the unaligned access path. The caller keeps ownership of the
    /// image.
    pub fn load_code(
        &mut self,
        mem: &mut Memory,
        address: Word,
        code: &[u8],
    ) -> Result<(), CpuError> {
        for (offset, byte) in code.iter().enumerate() {
            self.write_byte(mem, address + offset as Word, *byte)?;
        }
        Ok(())
    }

    /// Fetches and executes the instruction at IP.
    ///
    /// On failure the `error` flag is set and the failing instruction has no
    /// further effect; `halt` is left alone either way.
    pub fn step(&mut self, mem: &mut Memory) -> Result<(), CpuError> {
        let result = self.dispatch(mem);
        if result.is_err() {
            self.flags.error = true;
        }
        result
    }

    /// Executes instructions until `halt` is set.
    ///
    /// A step failure is returned immediately and leaves `halt` as-is; with
    /// `halt` already set the call returns at once without touching any
    /// state.
    pub fn run(&mut self, mem: &mut Memory) -> Result<(), CpuError> {
        while !self.flags.halt {
            self.step(mem)?;
        }
        Ok(())
    }

    fn dispatch(&mut self, mem: &mut Memory) -> Result<(), CpuError> {
        let word = self.read_word(mem, self.registers.ip.data)?;
        let fetched = (word & 0xff) as u8;
        let opcode = Opcode::from_u8(fetched).ok_or(CpuError::UnknownOpcode(fetched))?;

        match opcode {
            Opcode::ADD => exec::transform(self, mem, |l, r| Ok(l.wrapping_add(r))),
            Opcode::SUB => exec::transform(self, mem, |l, r| Ok(l.wrapping_sub(r))),
            Opcode::MUL => exec::transform(self, mem, |l, r| Ok(l.wrapping_mul(r))),
            Opcode::DIV => exec::transform(self, mem, |l, r| {
                l.checked_div(r).ok_or(CpuError::DivisionByZero)
            }),
            Opcode::MOV => exec::transform(self, mem, |l, _| Ok(l)),
            Opcode::CMP => exec::compare(self, mem),
            Opcode::JUMP => exec::branch_if(self, mem, true),
            Opcode::JG => {
                let taken = self.flags.greater;
                exec::branch_if(self, mem, taken)
            }
            Opcode::JE => {
                let taken = self.flags.equ;
                exec::branch_if(self, mem, taken)
            }
            Opcode::HALT => {
                self.flags.halt = true;
                Ok(())
            }
        }
    }

    // Byte-addressable view over the word-granular store. Aligned accesses
    // delegate to the memory; unaligned words are spliced from (or written
    // across) the two adjacent aligned words, and byte accesses compose
    // over the word accesses.

    pub(crate) fn read_word(&self, mem: &Memory, address: Word) -> Result<Word, MemoryError> {
        let shift = (address % constants::WORD_BYTES) as usize;
        if shift == 0 {
            return mem.read(address);
        }

        let base = address - shift as Word;
        let low = word_bytes(mem.read(base)?);
        let high = word_bytes(mem.read(base + constants::WORD_BYTES)?);

        let mut spliced = [0u8; constants::WORD_BYTES as usize];
        let split = spliced.len() - shift;
        spliced[..split].copy_from_slice(&low[shift..]);
        spliced[split..].copy_from_slice(&high[..shift]);

        Ok(Endian::read_u32(&spliced))
    }

    pub(crate) fn write_word(
        &self,
        mem: &mut Memory,
        address: Word,
        value: Word,
    ) -> Result<(), MemoryError> {
        let shift = (address % constants::WORD_BYTES) as usize;
        if shift == 0 {
            return mem.write(address, value);
        }

        let base = address - shift as Word;
        let mut low = word_bytes(mem.read(base)?);
        let mut high = word_bytes(mem.read(base + constants::WORD_BYTES)?);
        let bytes = word_bytes(value);

        let split = bytes.len() - shift;
        low[shift..].copy_from_slice(&bytes[..split]);
        high[..shift].copy_from_slice(&bytes[split..]);

        mem.write(base, Endian::read_u32(&low))?;
        mem.write(base + constants::WORD_BYTES, Endian::read_u32(&high))
    }

    pub(crate) fn read_byte(&self, mem: &Memory, address: Word) -> Result<u8, MemoryError> {
        Ok(word_bytes(self.read_word(mem, address)?)[0])
    }

    pub(crate) fn write_byte(
        &self,
        mem: &mut Memory,
        address: Word,
        value: u8,
    ) -> Result<(), MemoryError> {
        let mut bytes = word_bytes(self.read_word(mem, address)?);
        bytes[0] = value;
        self.write_word(mem, address, Endian::read_u32(&bytes))
    }
}

fn word_bytes(value: Word) -> [u8; constants::WORD_BYTES as usize] {
    let mut bytes = [0u8; constants::WORD_BYTES as usize];
    Endian::write_u32(&mut bytes, value);
    bytes
}

impl fmt::Display for Cpu {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        writeln!(f, "Flags:")?;
        writeln!(f, "\tHALT   : 0x{:02x}", self.flags.halt as u8)?;
        writeln!(f, "\tERROR  : 0x{:02x}", self.flags.error as u8)?;
        writeln!(f, "\tEQU    : 0x{:02x}", self.flags.equ as u8)?;
        writeln!(f, "\tGREATER: 0x{:02x}", self.flags.greater as u8)?;
        writeln!(f, "Registers:")?;
        writeln!(f, "\tIP: 0x{:08x}", self.registers.ip.data)?;
        for (index, register) in self.registers.general.iter().enumerate() {
            writeln!(f, "\tg{}: 0x{:08x}", index, register.data)?;
        }
        Ok(())
    }
}
