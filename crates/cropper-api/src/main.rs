use anyhow::Context;
use cropper_api::setup;
use cropper_core::Config;
use cropper_infra::init_telemetry;

// Use mimalloc as the global allocator for better performance and lower fragmentation,
// especially when running on musl-based systems inside containers.
#[global_allocator]
static GLOBAL: mimalloc::MiMalloc = mimalloc::MiMalloc;

#[tokio::main]
async fn main() -> Result<(), anyhow::Error> {
    let config = Config::from_env().context("Failed to load configuration")?;

    init_telemetry(config.log_format(), config.environment())
        .map_err(|e| anyhow::anyhow!("Failed to initialize telemetry: {}", e))?;

    // Storage, crop pipeline, cleanup service and routes
    let (state, router) = setup::initialize_app(config.clone()).await?;

    let cleanup = state.cleanup.clone().start();

    let served = setup::server::start_server(&config, router).await;

    cleanup.shutdown().await;

    served
}
