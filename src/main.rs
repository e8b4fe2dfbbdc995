use std::process::ExitCode;

fn main() -> ExitCode {
    match carequeue::run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!(error = %e, "CareQueue exited with an error");
            eprintln!("carequeue: {e}");
            ExitCode::FAILURE
        }
    }
}
