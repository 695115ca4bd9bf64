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

use std::fs::File;
use std::io::{stderr, stdin, stdout, Error, ErrorKind, Read, Result, Stdin, Stdout, Write};
use std::process::Command;

use crate::interpreter::fingerprints::{all_fingerprints, safe_fingerprints};
use crate::interpreter::{ExecMode, IOMode, InterpreterEnv};

/// The environment a standalone command-line run provides: real stdio, the
/// real filesystem and process table (unless `-b` sandboxes them away), and
/// the process's own argv/envp.
pub struct CmdLineEnv {
    io_mode: IOMode,
    warnings: bool,
    sandbox: bool,
    strict: bool,
    trace_level: u8,
    stdout: Stdout,
    stdin: Stdin,
    argv: Vec<String>,
    allowed_fingerprints: Vec<i32>,
}

impl CmdLineEnv {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        io_mode: IOMode,
        warnings: bool,
        sandbox: bool,
        strict: bool,
        trace_level: u8,
        argv: Vec<String>,
    ) -> Self {
        Self {
            io_mode,
            warnings,
            sandbox,
            strict,
            trace_level,
            stdout: stdout(),
            stdin: stdin(),
            argv,
            allowed_fingerprints: if sandbox { safe_fingerprints() } else { all_fingerprints() },
        }
    }
}

impl InterpreterEnv for CmdLineEnv {
    fn get_iomode(&self) -> IOMode {
        self.io_mode
    }
    fn is_io_buffered(&self) -> bool {
        true
    }
    fn output_writer(&mut self) -> &mut dyn Write {
        &mut self.stdout
    }
    fn input_reader(&mut self) -> &mut dyn Read {
        &mut self.stdin
    }
    fn warn(&mut self, msg: &str) {
        if self.warnings {
            writeln!(stderr(), "{}", msg).ok();
        }
    }
    fn have_file_input(&self) -> bool {
        !self.sandbox
    }
    fn have_file_output(&self) -> bool {
        !self.sandbox
    }
    fn have_execute(&self) -> ExecMode {
        if self.sandbox {
            ExecMode::Disabled
        } else {
            ExecMode::System
        }
    }
    fn read_file(&mut self, filename: &str) -> Result<Vec<u8>> {
        if self.sandbox {
            Err(Error::from(ErrorKind::PermissionDenied))
        } else {
            let mut buf = Vec::new();
            File::open(filename).and_then(|mut f| f.read_to_end(&mut buf))?;
            Ok(buf)
        }
    }
    fn write_file(&mut self, filename: &str, content: &[u8]) -> Result<()> {
        if self.sandbox {
            Err(Error::from(ErrorKind::PermissionDenied))
        } else {
            File::create(filename).and_then(|mut f| f.write_all(content))
        }
    }
    fn execute_command(&mut self, command: &str) -> i32 {
        if self.sandbox {
            -1
        } else if cfg!(unix) {
            Command::new("sh")
                .arg("-c")
                .arg(command)
                .status()
                .ok()
                .and_then(|s| s.code())
                .unwrap_or(-1)
        } else if cfg!(windows) {
            Command::new("CMD")
                .arg("/C")
                .arg(command)
                .status()
                .ok()
                .and_then(|s| s.code())
                .unwrap_or(-1)
        } else {
            eprintln!("WARNING: Attempted to execute command, but I don't know how on this system!");
            -1
        }
    }
    fn env_vars(&mut self) -> Vec<(String, String)> {
        if self.sandbox {
            Vec::new()
        } else {
            std::env::vars_os()
                .into_iter()
                .filter_map(|(k, v)| Some((k.into_string().ok()?, v.into_string().ok()?)))
                .collect()
        }
    }
    fn argv(&mut self) -> Vec<String> {
        self.argv.clone()
    }
    fn is_fingerprint_enabled(&self, fpr: i32) -> bool {
        // `-S` is documented (spec.md §6) to disable only *non-standard*
        // fingerprints; every fingerprint this build knows about (the
        // catseye-library set in `fingerprints::all_fingerprints`) is a
        // standard one, so strict mode doesn't narrow `allowed_fingerprints`
        // any further than `-b` already has.
        self.allowed_fingerprints.iter().any(|f| *f == fpr)
    }
    fn trace(&mut self, ip_id: i32, description: &str) {
        if self.trace_level > 0 {
            writeln!(stderr(), "[ip {}] {}", ip_id, description).ok();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sandbox_denies_file_and_process_access() {
        let mut env = CmdLineEnv::new(IOMode::Text, false, true, false, 0, Vec::new());
        assert!(!env.have_file_input());
        assert!(!env.have_file_output());
        assert_eq!(env.have_execute(), ExecMode::Disabled);
        assert!(env.read_file("/etc/hostname").is_err());
        assert!(env.env_vars().is_empty());
    }

    #[test]
    fn strict_mode_still_allows_standard_fingerprints() {
        let strict = CmdLineEnv::new(IOMode::Text, false, false, true, 0, Vec::new());
        for fpr in all_fingerprints() {
            assert!(strict.is_fingerprint_enabled(fpr));
        }
    }
}
