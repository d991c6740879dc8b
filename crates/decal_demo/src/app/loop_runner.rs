use std::process::ExitCode;

use tracing::{error, info};

use super::bootstrap::DemoWiring;
use super::{DemoError, RunSummary};

pub(crate) fn run(wiring: DemoWiring) -> ExitCode {
    match run_demo(wiring) {
        Ok(summary) => {
            info!(
                frames = summary.frames,
                stamps = summary.stamps,
                lines = summary.lines,
                "demo_finished"
            );
            ExitCode::SUCCESS
        }
        Err(err) => {
            error!(error = %err, "demo_failed");
            ExitCode::FAILURE
        }
    }
}

fn run_demo(mut wiring: DemoWiring) -> Result<RunSummary, DemoError> {
    let summary = wiring
        .scenario
        .run(&mut wiring.system, &mut wiring.surface)?;

    if let Some(path) = &wiring.config.snapshot_path {
        wiring.surface.write_png(path)?;
    }
    let (width, height) = wiring.surface.dimensions();
    info!(
        uploads = wiring.surface.uploads(),
        width,
        height,
        "viewport_uploads"
    );
    wiring.system.dispose_buffers()?;
    Ok(summary)
}

#[cfg(test)]
mod tests {
    use decal_engine::{DecalConfig, DecalSystem};

    use super::*;
    use crate::app::{DemoConfig, Scenario, SnapshotSurface};

    fn make_wiring(snapshot: Option<std::path::PathBuf>) -> DemoWiring {
        let config = DemoConfig {
            engine: DecalConfig {
                pixels_per_unit: 6,
                ..DecalConfig::default()
            },
            grid_width: 10,
            grid_height: 6,
            frames: 8,
            snapshot_path: snapshot,
            ..DemoConfig::default()
        };
        DemoWiring {
            system: DecalSystem::new(config.engine.clone()).expect("system"),
            scenario: Scenario::from_config(&config).expect("scenario"),
            surface: SnapshotSurface::default(),
            config,
        }
    }

    #[test]
    fn run_writes_snapshot_and_disposes() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("snap.png");
        let summary = run_demo(make_wiring(Some(path.clone()))).expect("run");
        assert_eq!(summary.frames, 8);
        assert!(path.is_file());
    }

    #[test]
    fn run_without_snapshot_path_skips_the_file() {
        let summary = run_demo(make_wiring(None)).expect("run");
        assert_eq!(summary.frames, 8);
    }
}
