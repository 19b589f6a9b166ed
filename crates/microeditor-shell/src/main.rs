//! Entry point of the `microeditor-shell` binary.

use std::io;
use std::process::ExitCode;

fn main() -> ExitCode {
    let mut stdout = io::stdout().lock();
    let mut stderr = io::stderr().lock();
    microeditor_shell::run(std::env::args_os(), &mut stdout, &mut stderr)
}
