use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use vertex_normal_bake::{bake_meshes, load_meshes, write_corner_colors, BakeConfig, Strategy};

#[derive(Parser)]
#[command(author, version, about = "Bake sharpness-aware normals into per-corner vertex colors", long_about = None)]
struct Args {
    /// Model to bake (.obj, .gltf or .glb)
    input: PathBuf,

    /// How corner normals are combined: average, vertex-normals, cross or angle-weight
    #[arg(long, default_value = "angle-weight")]
    strategy: String,

    /// Write length 1 for every vertex, ignoring the other length options
    #[arg(long)]
    force_unit_length: bool,

    /// Upper bound on the encoded normal length
    #[arg(long, default_value_t = 2.0)]
    length_limit: f32,

    /// Rescale lengths so the longest becomes 1
    #[arg(long, default_value_t = true, action = clap::ArgAction::Set)]
    normalize_to_max: bool,

    /// Cross strategy only: keep fused normals at unit length
    #[arg(long)]
    cross_normalize_distance: bool,

    /// Output file for the RGBA f32 colors, defaults to <input>.normal_colors.bin
    #[arg(short, long)]
    output: Option<PathBuf>,
}

impl Args {
    fn config(&self) -> Result<BakeConfig> {
        let strategy = match self.strategy.parse::<Strategy>()? {
            Strategy::Cross { .. } => Strategy::Cross {
                normalize_distance: self.cross_normalize_distance,
            },
            strategy => strategy,
        };
        if self.cross_normalize_distance && !matches!(strategy, Strategy::Cross { .. }) {
            log::warn!("--cross-normalize-distance has no effect with the {} strategy", strategy);
        }

        let config = BakeConfig {
            strategy,
            force_unit_length: self.force_unit_length,
            length_limit: self.length_limit,
            normalize_to_max: self.normalize_to_max,
        };
        config.validate()?;
        Ok(config)
    }

    fn output_path(&self) -> PathBuf {
        self.output
            .clone()
            .unwrap_or_else(|| self.input.with_extension("normal_colors.bin"))
    }
}

fn main() -> Result<()> {
    env_logger::init();
    run(&Args::parse())
}

/// Bakes every mesh in the input. Any failed mesh makes the run fail, after
/// the colors of the others have been written.
fn run(args: &Args) -> Result<()> {
    let config = args.config()?;

    let meshes = load_meshes(&args.input)
        .with_context(|| format!("Failed to load {}", args.input.display()))?;
    if meshes.is_empty() {
        log::warn!("No meshes found in {}", args.input.display());
    }

    let output_path = args.output_path();
    let mut writer = BufWriter::new(
        File::create(&output_path)
            .with_context(|| format!("Failed to create {}", output_path.display()))?,
    );

    // failures are already logged per mesh
    let mut failed = 0;
    for result in bake_meshes(&meshes, &config) {
        match result {
            Ok(result) => write_corner_colors(&mut writer, &result.colors)?,
            Err(_) => failed += 1,
        }
    }
    writer.flush()?;

    log::info!(
        "Wrote colors for {} of {} meshes to {}",
        meshes.len() - failed,
        meshes.len(),
        output_path.display()
    );

    if failed > 0 {
        return Err(anyhow::anyhow!("{} of {} meshes failed to bake", failed, meshes.len()));
    }
    Ok(())
}
