//! Runs the gesture pipeline against a simulated camera and a scripted pair of hands.
//!
//! Usage: `swirl [--frames N] [--fps N] [--overlay PATH]`
//!
//! The published controls are fed into the swirl shader uniforms and the HUD is logged once per
//! second. With `--overlay`, the skeleton of the last processed frame is written to `PATH` as SVG.

use std::{
    fs,
    path::PathBuf,
    thread,
    time::{Duration, Instant},
};

use anyhow::{bail, Context};
use swirl::{
    driver::{Driver, Status},
    overlay::{SkeletonOverlay, SvgCanvas},
    pipeline::Pipeline,
    render::{bloom_intensity, Hud, SwirlUniforms},
    sim::{Choreography, SimCamera},
    video::FrameSourceOptions,
};

/// Simulated time it takes to load the landmark model.
const MODEL_LOAD_TIME: Duration = Duration::from_millis(500);

struct Args {
    frames: u64,
    fps: u32,
    overlay: Option<PathBuf>,
}

fn parse_args() -> anyhow::Result<Args> {
    let mut args = Args {
        frames: 300,
        fps: 30,
        overlay: None,
    };
    let mut iter = std::env::args().skip(1);
    while let Some(arg) = iter.next() {
        let mut value = || {
            iter.next()
                .with_context(|| format!("missing value for `{arg}`"))
        };
        match &*arg {
            "--frames" => args.frames = value()?.parse().context("invalid frame count")?,
            "--fps" => args.fps = value()?.parse().context("invalid frame rate")?,
            "--overlay" => args.overlay = Some(value()?.into()),
            _ => bail!("unknown argument `{arg}`"),
        }
    }
    if args.fps == 0 {
        bail!("frame rate must be positive");
    }
    Ok(args)
}

fn main() -> anyhow::Result<()> {
    swirl::init_logger!();

    let args = parse_args()?;
    let options = FrameSourceOptions::default().fps(args.fps);
    let camera = SimCamera::new(options).with_frame_limit(args.frames);

    let mut driver = Driver::spawn(Pipeline::default(), camera, || {
        thread::sleep(MODEL_LOAD_TIME);
        Ok(Choreography::default())
    })?;
    log::info!(
        "{}",
        Hud {
            status: driver.status(),
            controls: driver.controls(),
        }
    );

    let overlay = SkeletonOverlay::new(options.get_resolution());
    let mut canvas = SvgCanvas::new(options.get_resolution());
    let mut uniforms = SwirlUniforms::new();
    let mut last_frame = Instant::now();
    let mut last_hud = Instant::now();

    driver.run(options.frame_interval(), |update| {
        let delta = last_frame.elapsed().as_secs_f32();
        last_frame = Instant::now();
        uniforms.update(&update.controls, delta);

        if args.overlay.is_some() {
            overlay.draw(&mut canvas, &update.detection);
        }

        if last_hud.elapsed() >= Duration::from_secs(1) {
            last_hud = Instant::now();
            let hud = Hud {
                status: Status::Ready,
                controls: update.controls,
            };
            log::info!("{hud}");
            log::debug!(
                "uniforms: time={:.2} scale={:.2} roughness={:.2} intensity={:.2} bloom={:.1}",
                uniforms.time(),
                uniforms.scale(),
                uniforms.roughness(),
                uniforms.intensity(),
                bloom_intensity(&update.controls),
            );
        }
    });

    if driver.status() == Status::Disabled {
        log::warn!("hand tracking was disabled, controls stayed at their defaults");
    }
    log::info!("final controls: {:?}", driver.controls());

    if let Some(path) = &args.overlay {
        fs::write(path, canvas.to_svg())
            .with_context(|| format!("failed to write overlay to '{}'", path.display()))?;
        log::info!("wrote overlay to '{}'", path.display());
    }

    Ok(())
}
