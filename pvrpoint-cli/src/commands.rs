// CLI command handlers
use anyhow::{Context, Result};
use log::info;
use pvrpoint_core::config::{HardwareProfile, PipelineConfig};
use pvrpoint_core::params::{ParamBuffers, SoftParamBuffers};
use pvrpoint_core::point::dispatch::{LIGHT_VOLUME, NO_VOLUME, SHADOW};
use pvrpoint_core::point::isp::{IspProfile, NativeFloat, PackedFixed};
use pvrpoint_core::point::pipeline::{DrawInput, DrawReport, PointPipeline};
use pvrpoint_core::point::{PointContext, Vertex};
use pvrpoint_core::texture::FixedTextureSize;
use serde::Deserialize;
use std::fs;
use std::path::PathBuf;

/// Input of `pvrpoint render`.
#[derive(Debug, Deserialize)]
pub struct Scene {
    #[serde(default)]
    pub context: PointContext,
    pub vertices: Vec<Vertex>,
    #[serde(default)]
    pub indices: Option<Vec<u16>>,
    /// Number of points to draw; defaults to every vertex or index.
    #[serde(default)]
    pub count: Option<usize>,
    /// Edge length of every texture the scene references.
    #[serde(default = "default_texture_size")]
    pub texture_size: u32,
}

fn default_texture_size() -> u32 {
    256
}

pub struct RenderOptions {
    pub scene: PathBuf,
    pub config: Option<PathBuf>,
    pub profile: Option<HardwareProfile>,
    pub isp_words: usize,
    pub tsp_words: usize,
    pub segment_words: usize,
    pub dump: bool,
}

pub fn render(opts: &RenderOptions) -> Result<()> {
    let mut config = match &opts.config {
        Some(path) => PipelineConfig::load(path)?,
        None => PipelineConfig::default(),
    };
    if let Some(profile) = opts.profile {
        config.profile = profile;
    }

    let content = fs::read_to_string(&opts.scene)
        .with_context(|| format!("Failed to read scene: {}", opts.scene.display()))?;
    let scene: Scene = serde_json::from_str(&content).context("Failed to parse scene")?;
    info!(
        "Scene {}: {} vertices, {} indices",
        opts.scene.display(),
        scene.vertices.len(),
        scene.indices.as_ref().map_or(0, Vec::len)
    );

    let mut buffers = SoftParamBuffers::new(opts.isp_words, opts.tsp_words).with_segment_words(opts.segment_words);

    let report = match config.profile {
        HardwareProfile::NativeFloat => draw::<NativeFloat>(config, &scene, &mut buffers)?,
        HardwareProfile::PackedFixed => draw::<PackedFixed>(config, &scene, &mut buffers)?,
    };

    println!("{}", serde_json::to_string_pretty(&report)?);

    if opts.dump {
        dump_words("ISP", buffers.isp().words());
        dump_words("TSP", buffers.tsp().words());
        println!("Region objects:");
        for object in buffers.region_objects() {
            println!(
                "  0x{:08X} @ {:#06x} ({} planes)",
                object.region, object.address, object.planes
            );
        }
    }

    Ok(())
}

fn draw<P: IspProfile>(config: PipelineConfig, scene: &Scene, buffers: &mut SoftParamBuffers) -> Result<DrawReport> {
    let mut pipeline = PointPipeline::<P>::new(config)?;

    let mut input = match &scene.indices {
        Some(indices) => DrawInput::indexed(&scene.vertices, indices),
        None => DrawInput::direct(&scene.vertices),
    };
    if let Some(count) = scene.count {
        input = input.with_count(count);
    }

    let report = pipeline
        .draw_points(&scene.context, &input, buffers, &FixedTextureSize(scene.texture_size))
        .with_context(|| format!("Point draw failed ({})", P::NAME))?;
    Ok(report)
}

fn dump_words(name: &str, words: &[u32]) {
    println!("{} ({} words):", name, words.len());
    for (i, line) in words.chunks(4).enumerate() {
        let hex: Vec<String> = line.iter().map(|w| format!("{:08X}", w)).collect();
        println!("  {:06x}: {}", i * 4, hex.join(" "));
    }
}

pub fn print_tables() {
    const ROWS: [&str; 4] = ["flat", "flat+tex", "highlight", "highlight+tex"];

    for (name, table) in [("no volume", &NO_VOLUME), ("shadow", &SHADOW), ("light volume", &LIGHT_VOLUME)] {
        println!("{}:", name);
        for (row, entry) in ROWS.iter().zip(table.iter()) {
            let processor = entry
                .processor
                .map_or_else(|| "-".to_string(), |p| format!("{:?}", p));
            println!(
                "  {:<14} {:<20} {:<14} {:>2} words  control {:#07x}",
                row,
                processor,
                format!("{:?}", entry.packer),
                entry.record_words,
                entry.control_word
            );
        }
    }
}
