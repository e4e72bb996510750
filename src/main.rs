use std::process::ExitCode;

fn main() -> ExitCode {
    match seqlabel::run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("Error: {}", err);
            ExitCode::FAILURE
        }
    }
}
