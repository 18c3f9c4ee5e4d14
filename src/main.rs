use std::process::ExitCode;

use clap::Parser;
use log::{error, info, warn};

use whitted::cli::Args;
use whitted::description::SceneDescription;
use whitted::render::Tracer;

fn run(args: &Args) -> whitted::Result<()> {
    let mut description = SceneDescription::load(&args.scene)?;
    args.apply(&mut description.render)?;

    if let Some(threads) = args.threads {
        if let Err(err) = rayon::ThreadPoolBuilder::new().num_threads(threads).build_global() {
            warn!(target: "app", "Couldn't configure {} worker threads: {}", threads, err);
        }
    }

    let scene = description.build_scene()?;
    let settings = &description.render;
    let tracer = Tracer::new(
        settings.width,
        settings.height,
        settings.max_bounces,
        settings.shadows,
        description.background()?,
    );

    info!(target: "app", "Using {} worker threads", rayon::current_num_threads());
    tracer.render(&scene, &description.camera(), Some(args.output.as_path()))?;
    Ok(())
}

fn main() -> ExitCode {
    let args = Args::parse();

    env_logger::Builder::from_default_env()
        .filter_level(args.log_level.into())
        .target(env_logger::Target::Stdout)
        .init();

    match run(&args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            let mut message = err.to_string();
            let mut source = std::error::Error::source(&err);
            while let Some(cause) = source {
                message.push_str(&format!(": {cause}"));
                source = cause.source();
            }
            error!(target: "app", "{}", message);
            ExitCode::FAILURE
        }
    }
}
