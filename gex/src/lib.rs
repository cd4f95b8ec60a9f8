//! Interactive runner for the [gvm](../gvm/index.html) machine: assembles a
//! source file, loads the image at address 0 and drives the CPU from a
//! small monitor shell.

mod shell;

use gvm::{Cpu, CpuError, Memory, StubIo, Word};
use std::fs::File;
use std::io::prelude::*;
use std::io::BufReader;
use std::path::{Path, PathBuf};

#[derive(Debug)]
pub enum Error {
    Asm(gasm::Error),
    Cpu(CpuError),
    Io(std::io::Error, PathBuf),
    Terminal(std::io::Error),
}

impl std::fmt::Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Error::Asm(err) => {
                writeln!(f, "Assembling input failed:")?;
                write!(f, "{}", err)
            }
            Error::Cpu(err) => write!(f, "Loading the image failed: {}", err),
            Error::Io(err, path) => {
                write!(f, "Reading file \"{}\" failed: {}", path.display(), err)
            }
            Error::Terminal(err) => write!(f, "Terminal I/O failed: {}", err),
        }
    }
}

/// Assembles the file at `source`, loads it into a fresh machine with
/// `mem_words` words of memory and hands the terminal to the shell.
pub fn launch(source: &str, mem_words: Word) -> Result<(), Error> {
    let path = Path::new(source);

    let file = File::open(path).map_err(|err| Error::Io(err, path.to_owned()))?;
    let mut input = String::new();
    BufReader::new(file)
        .read_to_string(&mut input)
        .map_err(|err| Error::Io(err, path.to_owned()))?;

    let image = gasm::assemble(&input).map_err(|err| {
        Error::Asm(match path.to_str() {
            Some(path_str) => err.with_path(path_str),
            None => err,
        })
    })?;

    let mut cpu = Cpu::new(Box::new(StubIo));
    let mut mem = Memory::new(mem_words);
    cpu.load_code(&mut mem, 0, &image).map_err(Error::Cpu)?;

    println!("+---------------------------+");
    println!("| Welcome to the gvm shell! |");
    println!("+---------------------------+");

    let stdin = std::io::stdin();
    let stdout = std::io::stdout();
    shell::Shell::new(cpu, mem)
        .run(stdin.lock(), stdout.lock())
        .map_err(Error::Terminal)
}
