use std::process::ExitCode;

#[tokio::main]
async fn main() -> ExitCode {
    residency_cli::run().await
}
