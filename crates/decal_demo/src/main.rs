use std::process::ExitCode;

mod app;

fn main() -> ExitCode {
    match app::bootstrap::build_demo() {
        Ok(wiring) => app::loop_runner::run(wiring),
        Err(err) => {
            tracing::error!(error = %err, "startup_failed");
            ExitCode::FAILURE
        }
    }
}
