#[path = "story-eval/app/mod.rs"]
mod app;
#[path = "story-eval/args.rs"]
mod args;
#[path = "story-eval/logging.rs"]
mod logging;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    app::run().await
}
