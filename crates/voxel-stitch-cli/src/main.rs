use std::fs;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use anyhow::Context;
use clap::{ArgAction, Parser, Subcommand};
use globset::{Glob, GlobSet, GlobSetBuilder};
use indicatif::{ProgressBar, ProgressStyle};
use serde::Deserialize;
use tokio::sync::mpsc::UnboundedReceiver;
use tracing::{error, info, warn};
use voxel_stitch_core::prelude::*;
use voxel_stitch_core::{is_directory_pack, texture_name, to_json_array, to_json_hash};
use walkdir::WalkDir;

#[derive(Parser, Debug)]
#[command(
    name = "voxel-stitch",
    about = "Stitch block textures from resource packs into a tile atlas",
    version,
    author
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
    /// Show progress bars (disable with --no-progress or --quiet)
    #[arg(long, default_value_t = true, action=ArgAction::Set, global=true, help_heading = "Logging/UX")]
    progress: bool,
    /// Increase verbosity (-v, -vv)
    #[arg(short, long, action=ArgAction::Count, global=true, help_heading = "Logging/UX")]
    verbose: u8,
    /// Quiet mode (overrides verbose)
    #[arg(
        short,
        long,
        default_value_t = false,
        global = true,
        help_heading = "Logging/UX"
    )]
    quiet: bool,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Stitch textures into an atlas (PNG + JSON layout)
    Stitch(StitchArgs),
    /// List the block texture names a directory pack provides
    Names(NamesArgs),
}

#[derive(Parser, Debug, Clone)]
struct StitchArgs {
    // Input/Output
    /// Block registry file (YAML or JSON list of blocks with a `texture` property)
    #[arg(short, long, help_heading = "Input/Output")]
    registry: Option<PathBuf>,
    /// Extra texture names, stitched after the registry's (repeatable)
    #[arg(short, long = "texture", help_heading = "Input/Output")]
    textures: Vec<String>,
    /// Resource pack directory or .zip, highest priority first (repeatable)
    #[arg(short, long = "pack", help_heading = "Input/Output")]
    packs: Vec<PathBuf>,
    /// Output directory
    #[arg(short, long, default_value = "out", help_heading = "Input/Output")]
    out_dir: PathBuf,
    /// Atlas base name (files will be name.png/.json)
    #[arg(short, long, default_value = "atlas", help_heading = "Input/Output")]
    name: String,
    /// YAML config file path (values there override the flags below)
    #[arg(long, help_heading = "Input/Output")]
    config: Option<PathBuf>,

    // Layout
    /// Atlas edge in pixels
    #[arg(long, default_value_t = 256, help_heading = "Layout")]
    atlas_size: u32,
    /// Tile edge in pixels (must divide atlas size)
    #[arg(long, default_value_t = 16, help_heading = "Layout")]
    tile_size: u32,
    /// Fill value for every channel of unused slots
    #[arg(long, default_value_t = 80, help_heading = "Layout")]
    background: u8,

    // Loading
    /// Completion: settled (failures count) | loaded_only (every texture must load)
    #[arg(long, default_value = "settled", help_heading = "Loading")]
    completion: String,
    /// Per-texture load timeout (ms)
    #[arg(long, help_heading = "Loading")]
    fetch_timeout_ms: Option<u64>,
    /// Fail when any texture could not be loaded
    #[arg(long, default_value_t = false, help_heading = "Loading")]
    strict: bool,

    // Export
    /// Metadata format: json-hash | json-array
    #[arg(long, default_value = "json-hash", value_parser = ["json-hash", "json-array"], help_heading = "Export")]
    metadata: String,
    /// Print the merged configuration (after CLI/YAML) and exit
    #[arg(long, default_value_t = false, help_heading = "Export")]
    print_config: bool,
    /// Output format for --print-config: json|yaml
    #[arg(long, default_value = "json", value_parser = ["json", "yaml"], help_heading = "Export")]
    print_config_format: String,
    /// Dry run: stitch and report but do not write files
    #[arg(long, default_value_t = false, help_heading = "Export")]
    dry_run: bool,
}

#[derive(Parser, Debug, Clone)]
struct NamesArgs {
    /// Directory pack to scan
    pack: PathBuf,
    /// Include patterns (glob) matched against texture names
    #[arg(long)]
    include: Vec<String>,
    /// Exclude patterns (glob) matched against texture names
    #[arg(long)]
    exclude: Vec<String>,
    /// Print a ready-to-edit registry (one block per texture) as YAML
    #[arg(long, default_value_t = false)]
    registry: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing_with_level(cli.quiet, cli.verbose);
    match &cli.command {
        Commands::Stitch(args) => run_stitch(args, cli.progress && !cli.quiet).await,
        Commands::Names(args) => run_names(args),
    }
}

async fn run_stitch(cli: &StitchArgs, show_progress: bool) -> anyhow::Result<()> {
    let completion: CompletionPolicy = cli
        .completion
        .parse()
        .map_err(|_| anyhow::anyhow!("unknown completion policy: {}", cli.completion))?;
    let base = StitchConfig {
        atlas_size: cli.atlas_size,
        tile_size: cli.tile_size,
        image_packs: cli.packs.clone(),
        completion,
        fetch_timeout_ms: cli.fetch_timeout_ms,
        background: [cli.background; 4],
    };

    // Config file sets options en bloc on top of the flags
    let cfg = if let Some(path) = &cli.config {
        let file = fs::read_to_string(path)
            .with_context(|| format!("read config {}", path.display()))?;
        let y: YamlConfig = serde_yaml::from_str(&file)?;
        y.into_stitch_config(base)?
    } else {
        base
    };
    cfg.validate()?;

    if cli.print_config {
        match cli.print_config_format.as_str() {
            "yaml" => println!("{}", serde_yaml::to_string(&cfg)?),
            _ => println!("{}", serde_json::to_string_pretty(&cfg)?),
        }
        return Ok(());
    }

    let names = gather_names(cli)?;
    if names.is_empty() {
        anyhow::bail!("nothing to stitch: pass --registry and/or --texture");
    }
    if cfg.image_packs.is_empty() {
        warn!("no resource packs given; every texture will fail to load");
    }
    info!(
        count = names.len(),
        capacity = cfg.capacity(),
        packs = cfg.image_packs.len(),
        "collected texture names"
    );

    let source = PackImageSource::new(cfg.image_packs.clone());
    let mut builder = AtlasBuilder::new(cfg, source)?;
    let progress = if show_progress {
        let rx = builder.subscribe();
        let total = names.len();
        Some(tokio::spawn(track_progress(rx, total)))
    } else {
        None
    };

    let start = Instant::now();
    let result = builder.stitch(names).await;
    let report = match result {
        Ok(report) => {
            if let Some(handle) = progress {
                let _ = handle.await;
            }
            report
        }
        Err(e) => {
            if let Some(handle) = progress {
                handle.abort();
            }
            return Err(anyhow::Error::new(e)
                .context("stitch failed; increase --atlas-size or reduce the texture set"));
        }
    };

    for failed in &report.failed {
        error!(name = %failed.name, col = failed.slot.col, row = failed.slot.row, error = %failed.error, "texture missing from atlas");
    }
    info!(
        loaded = report.loaded,
        failed = report.failed.len(),
        complete = report.complete,
        time = %fmt_dur(start.elapsed()),
        remaining_slots = builder.remaining_slots(),
        "stitch done"
    );

    let layout = builder.layout();
    let meta = match cli.metadata.as_str() {
        "json-array" => to_json_array(&layout),
        _ => to_json_hash(&layout),
    };

    if cli.dry_run {
        println!(
            "textures={} loaded={} failed={} occupancy={:.2}%",
            report.requested,
            report.loaded,
            report.failed.len(),
            layout.occupancy() * 100.0
        );
    } else {
        fs::create_dir_all(&cli.out_dir)
            .with_context(|| format!("create out_dir {}", cli.out_dir.display()))?;
        let png_path = cli.out_dir.join(format!("{}.png", cli.name));
        builder
            .atlas()
            .to_rgba_image()
            .save(&png_path)
            .with_context(|| format!("write {}", png_path.display()))?;
        info!(?png_path, "wrote atlas");
        let json_path = cli.out_dir.join(format!("{}.json", cli.name));
        fs::write(&json_path, serde_json::to_string_pretty(&meta)?)
            .with_context(|| format!("write {}", json_path.display()))?;
        info!(?json_path, tiles = layout.tiles.len(), "layout written");
    }

    if cli.strict && !report.failed.is_empty() {
        anyhow::bail!(
            "{} texture(s) failed to load: {}",
            report.failed.len(),
            report.failed_names().join(", ")
        );
    }
    Ok(())
}

fn gather_names(cli: &StitchArgs) -> anyhow::Result<Vec<String>> {
    let mut names = Vec::new();
    if let Some(path) = &cli.registry {
        let registry = load_registry(path)?;
        info!(blocks = registry.len(), ?path, "loaded registry");
        let values = registry.list_texture_property_values("texture");
        names.extend(flatten_texture_names(&values));
    }
    names.extend(cli.textures.iter().cloned());
    Ok(names)
}

fn load_registry(path: &Path) -> anyhow::Result<BlockRegistry> {
    let text =
        fs::read_to_string(path).with_context(|| format!("read registry {}", path.display()))?;
    let is_json = path
        .extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case("json"));
    let registry = if is_json {
        serde_json::from_str(&text)?
    } else {
        serde_yaml::from_str(&text)?
    };
    Ok(registry)
}

/// Drives a progress bar until every requested texture has settled.
async fn track_progress(mut rx: UnboundedReceiver<StitchEvent>, total: usize) {
    let bar = ProgressBar::new(total as u64);
    if let Ok(style) = ProgressStyle::with_template(
        "{spinner:.green} stitching {pos}/{len} [{elapsed_precise}] {wide_msg}",
    ) {
        bar.set_style(style);
    }
    let mut settled = 0;
    while settled < total {
        let Some(event) = rx.recv().await else {
            break;
        };
        match event {
            StitchEvent::Added { name, .. } => {
                bar.set_message(name);
                settled += 1;
                bar.inc(1);
            }
            StitchEvent::LoadFailed { name, .. } => {
                bar.set_message(format!("{name} (failed)"));
                settled += 1;
                bar.inc(1);
            }
            StitchEvent::AllAdded { .. } => {}
        }
    }
    bar.finish_and_clear();
}

fn run_names(args: &NamesArgs) -> anyhow::Result<()> {
    if !is_directory_pack(&args.pack) {
        anyhow::bail!("{} has no assets/ folder", args.pack.display());
    }
    let include = build_globset(&args.include)?;
    let exclude = build_globset(&args.exclude)?;
    let mut names = Vec::new();
    for entry in WalkDir::new(&args.pack).into_iter().filter_map(|e| e.ok()) {
        if !entry.file_type().is_file() {
            continue;
        }
        let Ok(rel) = entry.path().strip_prefix(&args.pack) else {
            continue;
        };
        let rel = rel.to_string_lossy().replace('\\', "/");
        let Some(name) = texture_name(&rel) else {
            continue;
        };
        if should_skip(&name, include.as_ref(), exclude.as_ref()) {
            continue;
        }
        names.push(name);
    }
    names.sort();
    info!(count = names.len(), pack = ?args.pack, "textures found");

    if args.registry {
        let mut registry = BlockRegistry::new();
        for name in &names {
            registry.register(name.clone(), TextureProperty::Single(name.clone()));
        }
        print!("{}", serde_yaml::to_string(&registry)?);
    } else {
        for name in &names {
            println!("{name}");
        }
    }
    Ok(())
}

fn build_globset(patterns: &[String]) -> anyhow::Result<Option<GlobSet>> {
    if patterns.is_empty() {
        return Ok(None);
    }
    let mut b = GlobSetBuilder::new();
    for pat in patterns {
        b.add(Glob::new(pat)?);
    }
    Ok(Some(b.build()?))
}

fn should_skip(name: &str, include: Option<&GlobSet>, exclude: Option<&GlobSet>) -> bool {
    if let Some(ex) = exclude {
        if ex.is_match(name) {
            return true;
        }
    }
    if let Some(inc) = include {
        if !inc.is_match(name) {
            return true;
        }
    }
    false
}

fn fmt_dur(d: Duration) -> String {
    let ms = d.as_secs_f64() * 1000.0;
    if ms >= 1.0 {
        format!("{:.1}ms", ms)
    } else {
        format!("{}us", d.as_micros())
    }
}

fn init_tracing_with_level(quiet: bool, verbose: u8) {
    let level = if quiet {
        "error".to_string()
    } else {
        match verbose {
            0 => "info".into(),
            1 => "debug".into(),
            _ => "trace".into(),
        }
    };
    let _ = tracing_subscriber::fmt()
        .with_env_filter(level)
        .with_target(false)
        .try_init();
}

#[derive(Debug, Deserialize)]
struct YamlConfig {
    atlas_size: Option<u32>,
    tile_size: Option<u32>,
    image_packs: Option<Vec<PathBuf>>,
    completion: Option<String>,
    fetch_timeout_ms: Option<u64>,
    background: Option<[u8; 4]>,
}

impl YamlConfig {
    fn into_stitch_config(self, mut base: StitchConfig) -> anyhow::Result<StitchConfig> {
        if let Some(v) = self.atlas_size {
            base.atlas_size = v;
        }
        if let Some(v) = self.tile_size {
            base.tile_size = v;
        }
        if let Some(v) = self.image_packs {
            base.image_packs = v;
        }
        if let Some(v) = self.completion {
            base.completion = v
                .parse()
                .map_err(|_| anyhow::anyhow!("unknown completion policy: {}", v))?;
        }
        if let Some(v) = self.fetch_timeout_ms {
            base.fetch_timeout_ms = Some(v);
        }
        if let Some(v) = self.background {
            base.background = v;
        }
        Ok(base)
    }
}
