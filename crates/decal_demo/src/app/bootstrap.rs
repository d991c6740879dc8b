use decal_engine::{DecalSystem, TileGrid};
use tracing::info;
use tracing_subscriber::EnvFilter;

use super::config::load_demo_config;
use super::{DemoConfig, DemoError, Scenario, SnapshotSurface};

pub(crate) struct DemoWiring {
    pub(crate) config: DemoConfig,
    pub(crate) system: DecalSystem,
    pub(crate) scenario: Scenario,
    pub(crate) surface: SnapshotSurface,
}

pub(crate) fn build_demo() -> Result<DemoWiring, DemoError> {
    init_tracing();
    info!("=== Decal Demo Startup ===");

    let config = load_demo_config()?;
    let system = DecalSystem::new(config.engine.clone())?;
    let scenario = Scenario::from_config(&config)?;
    info!(
        grid_width = scenario.grid().width(),
        grid_height = scenario.grid().height(),
        frames = config.frames,
        agents = config.agent_count,
        pixels_per_unit = config.engine.pixels_per_unit,
        "demo_configured"
    );

    Ok(DemoWiring {
        config,
        system,
        scenario,
        surface: SnapshotSurface::default(),
    })
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_thread_names(true)
        .compact()
        .init();
}
