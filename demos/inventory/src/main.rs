use std::process::ExitCode;

use inventory_demo::InventorySuites;

#[tokio::main]
async fn main() -> ExitCode {
    stagehand_cli::launch(&InventorySuites).await
}
