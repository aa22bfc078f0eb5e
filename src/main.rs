//! Ownership Desk entry point

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    ownership_desk_lib::run().await
}
