use std::{env, process};

use rocks_lang::rocks;

const USAGE: &str = "Usage: rocks [script]";

fn main() {
    let args: Vec<String> = env::args().collect();

    match args.len() {
        n if n > 2 => {
            println!("{USAGE}");
            process::exit(64);
        },
        2 => match args[1].as_str() {
            "--version" => println!("rocks {}", env!("CARGO_PKG_VERSION")),
            "-h" | "--help" => println!("{USAGE}"),
            path => rocks::new().run_file(path),
        },
        _ => rocks::new().run_prompt(),
    };
}
