//! Renders the random spheres scene to `random_spheres.png`.
//!
//! Set `EMBER_CONFIG` to a JSON file to override the render settings, e.g.
//! `{ "samples_per_pixel": 64, "max_depth": 8 }`.

use anyhow::Context;
use ember_renderer::{scenes, RenderConfig, Renderer, Xorshift};
use log::info;
use rand::SeedableRng;
use std::sync::Arc;
use std::time::Duration;

const WIDTH: u32 = 800;
const HEIGHT: u32 = 450;

fn load_config() -> anyhow::Result<RenderConfig> {
    match std::env::var_os("EMBER_CONFIG") {
        Some(path) => {
            let text = std::fs::read_to_string(&path)
                .with_context(|| format!("reading {}", path.to_string_lossy()))?;
            serde_json::from_str(&text).context("parsing render config")
        }
        None => Ok(RenderConfig {
            samples_per_pixel: 32,
            max_depth: 8,
            ..Default::default()
        }),
    }
}

fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let config = load_config()?;
    let mut rng = Xorshift::seed_from_u64(config.seed);
    let scene = Arc::new(scenes::random_spheres(WIDTH, HEIGHT, &mut rng));

    let mut renderer = Renderer::with_config(WIDTH, HEIGHT, config)?;
    let started = renderer.begin_render(scene)?;

    let mut reported = 0;
    while !renderer.finish() {
        std::thread::sleep(Duration::from_millis(100));
        let percent = (renderer.progress() * 100.0) as u32;
        if percent >= reported + 10 {
            info!("{percent}% done");
            reported = percent / 10 * 10;
        }
    }
    info!("Rendered in {:.2?}", started.elapsed());

    renderer
        .write_to_file("random_spheres.png")
        .context("saving random_spheres.png")?;
    Ok(())
}
