use rand::Rng;
use replicated_store::replication::{ResourceCheck, ResourceKind};
use replicated_store::{ServiceConfig, StorageService, StoreError};
use tracing_subscriber::EnvFilter;

const SAMPLE_OBJECTS: usize = 32;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let args: Vec<String> = std::env::args().collect();
    if args.iter().any(|arg| arg == "--help" || arg == "-h") {
        eprintln!(
            "Usage: {} [--workers <n>] [--nodes <n>] [--replication <n>]",
            args[0]
        );
        eprintln!("Example: {} --workers 4 --nodes 5 --replication 3", args[0]);
        return Ok(());
    }

    let config = ServiceConfig::from_args(args)?;
    let service = StorageService::start(config)?;

    // 1. Write a batch of objects:
    let uploads = (0..SAMPLE_OBJECTS)
        .map(|i| service.upload_object(format!("object-{}", i), format!("payload #{}", i)))
        .collect::<Result<Vec<_>, StoreError>>()?;

    for upload in uploads {
        match upload.wait().await {
            Ok(report) if !report.is_fully_replicated() => {
                tracing::warn!(
                    "{} stored with {}/{} copies",
                    report.id,
                    report.replication.copies(),
                    report.replication.requested_factor
                );
            }
            Ok(_) => {}
            Err(e) => tracing::error!("Upload failed: {}", e),
        }
    }

    if service.metadata().is_empty() {
        tracing::warn!("No objects were indexed; skipping the read phase");
        service.shutdown().await;
        return Ok(());
    }

    // 2. Simulate a CPU spike on one random node and run a health pass:
    let node_count = service.registry().len();
    let hot_node = rand::thread_rng().gen_range(0..node_count);
    service.register_check(ResourceCheck::new(ResourceKind::Cpu, 0.9, move |node| {
        if node == hot_node {
            0.95
        } else {
            rand::thread_rng().gen_range(0.05..0.6)
        }
    }));

    let health = service.check_health();
    tracing::info!(
        "Health pass: healthy={:?} unhealthy={:?}",
        health.healthy,
        health.unhealthy
    );

    // 3. Read everything back, rerouting around the unhealthy node:
    let mut served = 0;
    for i in 0..SAMPLE_OBJECTS {
        match service.download_object(format!("object-{}", i))?.wait().await {
            Ok(_) => served += 1,
            Err(e) => tracing::warn!("Download of object-{} failed: {}", i, e),
        }
    }
    tracing::info!("Served {}/{} objects", served, SAMPLE_OBJECTS);

    let missing = service.download_object("object-missing")?.wait().await;
    tracing::info!("Lookup of unknown id: {:?}", missing.err());

    // 4. Report and stop:
    tracing::info!("Stats: {}", serde_json::to_string(&service.stats())?);
    service.shutdown().await;

    Ok(())
}
