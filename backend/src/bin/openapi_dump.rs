//! Print the OpenAPI document as pretty JSON on stdout.

use std::io::{self, Write};
use std::process::ExitCode;

use backend::ApiDoc;
use utoipa::OpenApi;

fn main() -> ExitCode {
    let json = match ApiDoc::openapi().to_pretty_json() {
        Ok(json) => json,
        Err(err) => {
            write_line(
                &mut io::stderr(),
                &format!("failed to serialise OpenAPI document: {err}"),
            );
            return ExitCode::FAILURE;
        }
    };
    match writeln!(io::stdout().lock(), "{json}") {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            write_line(
                &mut io::stderr(),
                &format!("failed to write OpenAPI document: {err}"),
            );
            ExitCode::FAILURE
        }
    }
}

/// Best-effort diagnostic output; a closed stream is ignored.
fn write_line(out: &mut impl Write, line: &str) {
    if let Err(err) = writeln!(out, "{line}") {
        drop(err);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct ClosedStream;

    impl Write for ClosedStream {
        fn write(&mut self, _buf: &[u8]) -> io::Result<usize> {
            Err(io::Error::from(io::ErrorKind::BrokenPipe))
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    #[test]
    fn write_line_appends_a_newline() {
        let mut out = Vec::new();
        write_line(&mut out, "failed");
        assert_eq!(out, b"failed\n");
    }

    #[test]
    fn write_line_ignores_closed_streams() {
        write_line(&mut ClosedStream, "failed");
    }
}
