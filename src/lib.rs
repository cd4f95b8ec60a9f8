//! Core of the gvm virtual machine: the word-granular [`Memory`], the
//! [`Cpu`] with its byte-addressable access layer, the [`Io`] peripheral
//! contract and the instruction model shared with the
//! [gasm](../gasm/index.html) assembler.

pub mod constants;

mod cpu;
mod instruction;
mod io;
mod memory;


pub use crate::cpu::{Cpu, CpuError, Flags, RegisterFile};
pub use crate::instruction::{
    encode_binary, encode_nullary, encode_unary, general_register_code, AddressingMode, Opcode,
    OperandKind, ParseOpcodeError,
};
pub use crate::io::{Io, IoError, StubIo};
pub use crate::memory::{Memory, MemoryError};

pub type Endian = byteorder::LittleEndian;
pub type Word = u32;
