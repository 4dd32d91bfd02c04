mod api;
mod app;
mod capture;
mod commands;
mod config;
mod logging;
mod media;
mod ui;

#[tokio::main]
async fn main() -> Result<(), anyhow::Error> {
    app::run().await
}
