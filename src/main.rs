use std::path::PathBuf;
use std::process::ExitCode;

use roam::{ViewerConfig, ViewerError, geometry};

fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    match start() {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            log::error!("{}", e);
            ExitCode::FAILURE
        }
    }
}

fn start() -> Result<(), ViewerError> {
    let explicit = std::env::args_os().nth(1).map(PathBuf::from);
    let (config, source) = ViewerConfig::discover(explicit.as_deref())?;
    match &source {
        Some(path) => log::info!("loaded config from {}", path.display()),
        None => log::info!("no config file found, using defaults"),
    }

    let models_dir = &config.scene.models_dir;
    if !models_dir.is_dir() {
        return Err(ViewerError::MissingModelsDir(models_dir.clone()));
    }

    let meshes = geometry::find_mesh_files(models_dir)?;
    log::info!("found {} mesh files in {}", meshes.len(), models_dir.display());
    for path in &meshes {
        log::debug!("  {}", path.display());
    }

    roam::run(config)
}
