/*
mesofunge – a Funge-98/109 interpreter
Copyright © 2021 Thomas Jollans
Copyright © 2026 Mira Solheim

This program is free software: you can redistribute it and/or modify
it under the terms of the GNU Affero General Public License as
published by the Free Software Foundation, either version 3 of the
License, or (at your option) any later version.

This program is distributed in the hope that it will be useful,
but WITHOUT ANY WARRANTY; without even the implied warranty of
MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE. See the
GNU Affero General Public License for more details.

You should have received a copy of the GNU Affero General Public License
along with this program. If not, see <https://www.gnu.org/licenses/>.
*/

mod app;

use std::fs::File;
use std::io::Read;

use clap::{App, AppSettings, Arg};

use mesofunge::{origin, IOMode, Interpreter, LanguageStandard, ProgramResult};

use app::env::CmdLineEnv;

fn main() {
    let arg_matches = App::new(env!("CARGO_PKG_NAME"))
        .about("A Funge-98/109 interpreter")
        .setting(AppSettings::DisableVersion)
        .arg(
            Arg::with_name("version")
                .short("v")
                .long("version")
                .help("Print version and exit"),
        )
        .arg(
            Arg::with_name("sandbox")
                .short("b")
                .long("sandbox")
                .help("Sandbox mode: disable file I/O, process execution, and file-opening fingerprints"),
        )
        .arg(
            Arg::with_name("strict")
                .short("S")
                .long("strict")
                .help("Strictly standard: disable non-standard fingerprints"),
        )
        .arg(
            Arg::with_name("cellsize")
                .short("s")
                .long("cell-size")
                .help("Cell width in bits (32 or 64)")
                .takes_value(true)
                .possible_values(&["32", "64"])
                .default_value("32"),
        )
        .arg(
            Arg::with_name("standard")
                .short("f")
                .long("standard")
                .help("Funge standard to interpret as (93, 98, or 109)")
                .takes_value(true)
                .possible_values(&["93", "98", "109"])
                .default_value("98"),
        )
        .arg(
            Arg::with_name("warn")
                .short("w")
                .long("warn")
                .help("Enable warnings on ambiguous constructs"),
        )
        .arg(
            Arg::with_name("trace")
                .short("t")
                .long("trace")
                .help("Trace level, 0 (silent) through 9 (verbose)")
                .takes_value(true)
                .default_value("0"),
        )
        .arg(
            Arg::with_name("PROGRAM")
                .help("Funge source file to execute")
                .required_unless("version"),
        )
        .arg(
            Arg::with_name("ARGS")
                .help("Arguments to pass to the program")
                .multiple(true),
        )
        .get_matches();

    if arg_matches.is_present("version") {
        println!("{} {}", env!("CARGO_PKG_NAME"), env!("CARGO_PKG_VERSION"));
        std::process::exit(0);
    }

    let filename = arg_matches.value_of("PROGRAM").unwrap();

    let mut src = Vec::<u8>::new();
    if filename == "-" {
        std::io::stdin().read_to_end(&mut src)
    } else {
        File::open(filename).and_then(|mut f| f.read_to_end(&mut src))
    }
    .unwrap_or_else(|err| {
        eprintln!("error reading {}: {}", filename, err);
        std::process::exit(1);
    });

    let standard = match arg_matches.value_of("standard").unwrap() {
        "93" => LanguageStandard::Befunge93,
        "109" => LanguageStandard::Funge109,
        _ => LanguageStandard::Funge98,
    };

    let mut argv = vec![filename.to_owned()];
    argv.extend(arg_matches.values_of_lossy("ARGS").unwrap_or_default());

    let mut env = CmdLineEnv::new(
        IOMode::Binary,
        arg_matches.is_present("warn"),
        arg_matches.is_present("sandbox"),
        arg_matches.is_present("strict"),
        arg_matches
            .value_of("trace")
            .and_then(|v| v.parse().ok())
            .unwrap_or(0),
        argv,
    );

    let result = if arg_matches.value_of("cellsize") == Some("64") {
        run::<i64>(standard, &src, &mut env)
    } else {
        run::<i32>(standard, &src, &mut env)
    };

    std::process::exit(match result {
        ProgramResult::Done(code) => code,
        ProgramResult::Panic => 1,
    });
}

/// Load `src` into a fresh interpreter over cell type `T` and run it to
/// completion against `env`.
fn run<T>(standard: LanguageStandard, src: &[u8], env: &mut CmdLineEnv) -> ProgramResult
where
    T: mesofunge::FungeValue,
{
    let mut interpreter: Interpreter<T> = Interpreter::new(standard);
    interpreter.space.load(origin(), src, true);
    interpreter.spawn_initial_ip();
    interpreter.run(env)
}
