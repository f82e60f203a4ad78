use sslcheckdomain::cli::{EXIT_FAILURE, start};
use std::process;

#[tokio::main]
async fn main() {
    match start().await {
        Ok(code) => process::exit(code),
        Err(e) => {
            eprintln!("Error: {e:#}");
            process::exit(EXIT_FAILURE);
        }
    }
}
