//! Binary entrypoint for the `nds` command.

#[tokio::main]
async fn main() {
    let code = nds_cli::run().await;
    if code != 0 {
        std::process::exit(code);
    }
}
