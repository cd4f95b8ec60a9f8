#[macro_use]
extern crate clap;

use clap::Arg;
use std::process;

fn main() {
    let matches = app_from_crate!()
        .arg(
            Arg::with_name("ASSEMBLY")
                .help("Sets the assembly source file to run")
                .default_value("code.text")
                .index(1),
        )
        .arg(
            Arg::with_name("memory")
                .short("m")
                .long("memory")
                .takes_value(true)
                .value_name("MEMORY")
                .default_value("1024")
                .help("Sets the size of the memory in words"),
        )
        .get_matches();

    let mem_words = match value_t!(matches.value_of("memory"), u32) {
        Ok(value) => value,
        Err(err) => err.exit(),
    };

    let source = matches.value_of("ASSEMBLY").unwrap();

    if let Err(err) = gex::launch(source, mem_words) {
        eprintln!("{}", err);
        process::exit(1);
    }
}
