use gvm::{constants, Cpu, Memory, Word};
use std::io::{BufRead, Write};

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub(crate) enum Command {
    Dump,
    Read,
    Write,
    Next,
    Run,
    Quit,
    Help,
}

/// Commands are matched exactly; the shell is case-sensitive.
pub(crate) fn parse_command(token: &str) -> Option<Command> {
    match token {
        "dump" => Some(Command::Dump),
        "read" => Some(Command::Read),
        "write" => Some(Command::Write),
        "next" => Some(Command::Next),
        "run" => Some(Command::Run),
        "quit" => Some(Command::Quit),
        "help" => Some(Command::Help),
        _ => None,
    }
}

/// The interactive monitor. Generic over its input and output so whole
/// sessions can be scripted.
pub(crate) struct Shell {
    cpu: Cpu,
    mem: Memory,
}

impl Shell {
    pub fn new(cpu: Cpu, mem: Memory) -> Shell {
        Shell { cpu, mem }
    }

    pub fn run<R: BufRead, W: Write>(
        &mut self,
        mut input: R,
        mut output: W,
    ) -> std::io::Result<()> {
        loop {
            let line = match prompt_line(&mut input, &mut output, "Enter command: ")? {
                Some(line) => line,
                // end of input closes the shell
                None => return Ok(()),
            };

            let token = line.trim();
            if token.is_empty() {
                continue;
            }

            match parse_command(token) {
                Some(Command::Dump) => self.dump(&mut input, &mut output)?,
                Some(Command::Read) => self.read(&mut input, &mut output)?,
                Some(Command::Write) => self.write(&mut input, &mut output)?,
                Some(Command::Next) => self.next(&mut output)?,
                Some(Command::Run) => self.run_cpu(&mut output)?,
                Some(Command::Help) => help(&mut output)?,
                Some(Command::Quit) => {
                    writeln!(output, "Bye.")?;
                    return Ok(());
                }
                None => writeln!(output, "Invalid command, use help")?,
            }
        }
    }

    fn dump<R: BufRead, W: Write>(&mut self, input: &mut R, output: &mut W) -> std::io::Result<()> {
        let address = match prompt_dec(input, output, "Enter address (dec): ")? {
            Some(value) => value,
            None => return Ok(()),
        };
        let count = match prompt_dec(input, output, "Enter size (dec): ")? {
            Some(value) => value,
            None => return Ok(()),
        };

        writeln!(output, "---------------- Memory ----------------")?;
        match self.mem.dump(address, count) {
            Ok(text) => write!(output, "{}", text)?,
            Err(err) => writeln!(output, "Unable to dump memory: {}", err)?,
        }
        self.dump_cpu(output)
    }

    fn read<R: BufRead, W: Write>(&mut self, input: &mut R, output: &mut W) -> std::io::Result<()> {
        let address = match prompt_dec(input, output, "Enter address (dec): ")? {
            Some(value) => value,
            None => return Ok(()),
        };

        match self.mem.read(address) {
            Ok(value) => writeln!(output, "Memory value at 0x{:08x}: 0x{:08x}", address, value),
            Err(err) => writeln!(output, "Unable to read memory: {}", err),
        }
    }

    fn write<R: BufRead, W: Write>(
        &mut self,
        input: &mut R,
        output: &mut W,
    ) -> std::io::Result<()> {
        let address = match prompt_dec(input, output, "Enter address (dec): ")? {
            Some(value) => value,
            None => return Ok(()),
        };
        let value = match prompt_hex(input, output, "Enter value (hex): ")? {
            Some(value) => value,
            None => return Ok(()),
        };

        match self.mem.write(address, value) {
            Ok(()) => writeln!(output, "0x{:08x} ---> [{:#x}]", value, address),
            Err(err) => writeln!(output, "Unable to write memory: {}", err),
        }
    }

    fn next<W: Write>(&mut self, output: &mut W) -> std::io::Result<()> {
        write!(
            output,
            "Executing CPU command at [0x{:08x}]...",
            self.cpu.registers().ip()
        )?;
        match self.cpu.step(&mut self.mem) {
            Ok(()) => writeln!(output, "OK")?,
            Err(err) => writeln!(output, "ERROR: {}", err)?,
        }

        let count = (self.mem.length() / constants::WORD_BYTES).min(40);
        writeln!(output, "---------------- Memory ----------------")?;
        if let Ok(text) = self.mem.dump(0, count) {
            write!(output, "{}", text)?;
        }
        self.dump_cpu(output)
    }

    fn run_cpu<W: Write>(&mut self, output: &mut W) -> std::io::Result<()> {
        writeln!(
            output,
            "Running CPU at [0x{:08x}]...",
            self.cpu.registers().ip()
        )?;
        match self.cpu.run(&mut self.mem) {
            Ok(()) => {
                writeln!(output, "DONE")?;
                writeln!(output, "IP: [0x{:08x}]", self.cpu.registers().ip())
            }
            Err(err) => writeln!(output, "ERROR: {}", err),
        }
    }

    fn dump_cpu<W: Write>(&self, output: &mut W) -> std::io::Result<()> {
        writeln!(output, "----------------  CPU   ----------------")?;
        write!(output, "{}", self.cpu)
    }
}

fn help<W: Write>(output: &mut W) -> std::io::Result<()> {
    writeln!(output, "Available commands:")?;
    writeln!(output, "\tdump  - Make a dump of memory")?;
    writeln!(output, "\tread  - Read some portion of memory")?;
    writeln!(output, "\twrite - Write some value to memory")?;
    writeln!(output, "\tnext  - Execute next CPU instruction")?;
    writeln!(output, "\trun   - Execute program in memory")?;
    writeln!(output, "\tquit  - Quit the shell")?;
    writeln!(output, "\thelp  - This menu")
}

fn prompt_line<R: BufRead, W: Write>(
    input: &mut R,
    output: &mut W,
    prompt: &str,
) -> std::io::Result<Option<String>> {
    write!(output, "{}", prompt)?;
    output.flush()?;

    let mut line = String::new();
    if input.read_line(&mut line)? == 0 {
        return Ok(None);
    }
    Ok(Some(line))
}

fn prompt_dec<R: BufRead, W: Write>(
    input: &mut R,
    output: &mut W,
    prompt: &str,
) -> std::io::Result<Option<Word>> {
    let line = match prompt_line(input, output, prompt)? {
        Some(line) => line,
        None => return Ok(None),
    };

    match line.trim().parse() {
        Ok(value) => Ok(Some(value)),
        Err(err) => {
            writeln!(output, "Not a decimal number: {}", err)?;
            Ok(None)
        }
    }
}

fn prompt_hex<R: BufRead, W: Write>(
    input: &mut R,
    output: &mut W,
    prompt: &str,
) -> std::io::Result<Option<Word>> {
    let line = match prompt_line(input, output, prompt)? {
        Some(line) => line,
        None => return Ok(None),
    };

    match Word::from_str_radix(line.trim().trim_start_matches("0x"), 16) {
        Ok(value) => Ok(Some(value)),
        Err(err) => {
            writeln!(output, "Not a hexadecimal number: {}", err)?;
            Ok(None)
        }
    }
}
