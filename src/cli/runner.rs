//! Runner driving one credential-helper invocation

use crate::cli::args::Args;
use crate::logging::Logger;
use crate::protocol::{self, Action, CredentialHelper};
use std::ffi::OsString;
use std::io::{Read, Write};

pub struct Runner<H> {
    helper: H,
    output: Logger,
}

impl<H: CredentialHelper> Runner<H> {
    pub fn new(helper: H, output: Logger) -> Self {
        Self { helper, output }
    }

    /// Run the action named in `args` and return the process exit code.
    ///
    /// Everything the container engine reads, results and errors alike, is
    /// written to `out`.
    pub async fn run<I, T, R, W>(&self, args: I, input: &mut R, out: &mut W) -> i32
    where
        I: IntoIterator<Item = T>,
        T: Into<OsString> + Clone,
        R: Read,
        W: Write,
    {
        let Some(args) = Args::try_parse_args(args) else {
            return fail(out, &protocol::usage());
        };

        self.output.section(&format!("{} {}", protocol::PROGRAM_NAME, args.action));

        let action = match args.action.parse::<Action>() {
            Ok(action) => action,
            Err(e) => {
                self.output.verbose(&e.to_string());
                return fail(out, &format!("{}\n{}", e, protocol::usage()));
            }
        };

        match protocol::handle_command(&self.helper, action, input, out).await {
            Ok(()) => {
                self.output.verbose(&format!(
                    "{} completed in {}",
                    args.action,
                    self.output.format_duration(self.output.elapsed())
                ));
                0
            }
            Err(e) if e.is_validation() => {
                self.output.verbose(&format!("Rejected registry reference: {}", e));
                fail(out, &e.to_string())
            }
            Err(e) => {
                self.output.error(&e.to_string());
                fail(out, &e.to_string())
            }
        }
    }
}

/// Report `message` to the container engine and return the failure exit code
fn fail<W: Write>(out: &mut W, message: &str) -> i32 {
    let _ = writeln!(out, "{}", message);
    let _ = out.flush();
    1
}
