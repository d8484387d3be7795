use clap::Parser;
use write_bench::config::Args;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    write_bench::run(Args::parse()).await
}
