use std::collections::hash_map::DefaultHasher;
use std::ffi::OsString;
use std::fs;
use std::hash::{Hash, Hasher};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use std::time::UNIX_EPOCH;

use anyhow::{Context, anyhow};
use atlas_packer_core::config::{
    PartitionStrategy, PlacementHeuristic, PlacementOrder, SortOrder, SplitHeuristic,
};
use atlas_packer_core::{InputImage, PackerConfig, pack_images, to_json, to_xml, write_binary};
use clap::{ArgAction, Parser};
use image::{DynamicImage, ImageReader};
use serde::Deserialize;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;
use walkdir::WalkDir;

const ATLAS_SIZES: [u32; 5] = [4096, 2048, 1024, 512, 256];

#[derive(Parser, Debug)]
#[command(
    name = "atlas-packer",
    about = "Pack directories of PNG images into square texture atlases",
    version,
    author
)]
struct Cli {
    /// Output path prefix: pages go to <OUTPUT><i>.png, metadata to <OUTPUT>.bin/.xml/.json
    #[arg(help_heading = "Input/Output")]
    output: PathBuf,
    /// Comma-separated input directories (read non-recursively for *.png)
    #[arg(value_delimiter = ',', required = true, help_heading = "Input/Output")]
    inputs: Vec<PathBuf>,
    /// YAML config file; its values override the flags below
    #[arg(long, help_heading = "Input/Output")]
    config: Option<PathBuf>,

    /// Default settings: same as -x -p -t -u
    #[arg(short = 'd', long = "default", help_heading = "Export")]
    defaults: bool,
    /// Save the atlas description as <OUTPUT>.xml
    #[arg(short = 'x', long, help_heading = "Export")]
    xml: bool,
    /// Save the atlas description as <OUTPUT>.bin
    #[arg(short = 'b', long, help_heading = "Export")]
    binary: bool,
    /// Save the atlas description as <OUTPUT>.json
    #[arg(short = 'j', long, help_heading = "Export")]
    json: bool,

    /// Premultiply color channels by alpha
    #[arg(short = 'p', long, help_heading = "Image Processing")]
    premultiply: bool,
    /// Trim transparent borders
    #[arg(short = 't', long, help_heading = "Image Processing")]
    trim: bool,
    /// Trim alpha threshold (0..=255)
    #[arg(long, default_value_t = 0, help_heading = "Image Processing")]
    trim_threshold: u8,
    /// Store identical images once
    #[arg(short = 'u', long, help_heading = "Image Processing")]
    unique: bool,
    /// Allow rotating images 90° clockwise
    #[arg(short = 'r', long, help_heading = "Image Processing")]
    rotate: bool,

    /// Max atlas size, clamped down to 4096, 2048, 1024, 512 or 256 (-s2048 / --size2048)
    #[arg(short = 's', long, default_value_t = 4096, help_heading = "Layout")]
    size: u32,
    /// Padding between images, 0 to 16 (-p2 / --pad2)
    #[arg(long, default_value_t = 1, value_parser = clap::value_parser!(u32).range(0..=16), help_heading = "Layout")]
    pad: u32,
    /// Keep every atlas at the full size instead of shrinking it
    #[arg(long, default_value_t = false, help_heading = "Layout")]
    force_max_dimensions: bool,
    /// Sort order: area_desc|max_side_desc|height_desc|width_desc|name_asc|none
    #[arg(long, default_value = "area_desc", help_heading = "Layout")]
    sort_order: String,

    /// Free-space strategy: maxrects | guillotine
    #[arg(long, default_value = "maxrects", help_heading = "Algorithms")]
    strategy: String,
    /// Placement heuristic: baf|bssf|blsf|waf|wssf|wlsf
    #[arg(long, default_value = "bssf", help_heading = "Algorithms")]
    heuristic: String,
    /// Guillotine split: slas|llas|minas|maxas|sas|las
    #[arg(long, default_value = "slas", help_heading = "Algorithms")]
    split: String,
    /// Merge adjacent guillotine free rectangles after each placement
    #[arg(long, default_value_t = true, action = ArgAction::Set, help_heading = "Algorithms")]
    merge: bool,
    /// Best-fit search over all pending images per placement instead of one at a time
    #[arg(long, default_value_t = false, help_heading = "Algorithms")]
    global: bool,
    /// Preprocess images in parallel (requires feature `parallel`)
    #[arg(long, default_value_t = false, help_heading = "Algorithms")]
    parallel: bool,

    /// Increase verbosity (-v, -vv)
    #[arg(short, long, action = ArgAction::Count, help_heading = "Logging/UX")]
    verbose: u8,
    /// Repack even if the inputs did not change
    #[arg(short = 'f', long, help_heading = "Logging/UX")]
    force: bool,
}

fn main() -> anyhow::Result<()> {
    let args = rewrite_glued_args(std::env::args_os());
    let cli = Cli::parse_from(args.iter().cloned());
    init_tracing_with_level(cli.verbose);
    run(&cli, args.get(1..).unwrap_or_default())
}

/// Splits glued numeric forms into `--flag=value`: `--size2048`, `--pad2`, `-p2`.
/// `-s2048` is understood by clap as is.
fn rewrite_glued_args(args: impl IntoIterator<Item = OsString>) -> Vec<OsString> {
    args.into_iter()
        .map(|arg| {
            let Some(s) = arg.to_str() else {
                return arg;
            };
            let glued = |prefix: &str| {
                s.strip_prefix(prefix)
                    .filter(|rest| !rest.is_empty() && rest.bytes().all(|b| b.is_ascii_digit()))
            };
            if let Some(n) = glued("--size") {
                format!("--size={n}").into()
            } else if let Some(n) = glued("--pad") {
                format!("--pad={n}").into()
            } else if let Some(n) = glued("-p") {
                format!("--pad={n}").into()
            } else {
                arg
            }
        })
        .collect()
}

/// Largest supported atlas size not above `requested` (256 at minimum).
fn clamp_atlas_size(requested: u32) -> u32 {
    ATLAS_SIZES
        .iter()
        .copied()
        .find(|&s| s <= requested)
        .unwrap_or(256)
}

fn run(cli: &Cli, raw_args: &[OsString]) -> anyhow::Result<()> {
    let mut cfg = build_config(cli)?;
    if let Some(path) = &cli.config {
        let file =
            fs::read_to_string(path).with_context(|| format!("read config {}", path.display()))?;
        let y: YamlConfig = serde_yaml::from_str(&file)
            .with_context(|| format!("parse config {}", path.display()))?;
        cfg = y.into_packer_config(cfg)?;
    }
    cfg.validate()?;

    let paths = gather_paths(&cli.inputs)?;
    let hash_path = with_suffix(&cli.output, ".hash");
    let new_hash = compute_repack_hash(raw_args, &cli.inputs, &paths)?;
    if !cli.force && read_hash(&hash_path) == Some(new_hash) {
        info!(hash = new_hash, "inputs unchanged, skipping (use --force to repack)");
        return Ok(());
    }

    if let Some(parent) = cli.output.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)
            .with_context(|| format!("create output dir {}", parent.display()))?;
    }

    let inputs = load_images_with_progress(&paths, cli.verbose > 0)?;
    info!(count = inputs.len(), "loaded input images");

    let out = pack_images(inputs, cfg)?;
    for (i, page) in out.pages.iter().enumerate() {
        let png_path = with_suffix(&cli.output, &format!("{i}.png"));
        page.rgba
            .save(&png_path)
            .with_context(|| format!("write {}", png_path.display()))?;
        info!(?png_path, width = page.atlas.width, height = page.atlas.height, "wrote page");
    }

    let atlases = out.atlases();
    let wants_xml = cli.xml || cli.defaults;
    if cli.binary {
        let bin_path = with_suffix(&cli.output, ".bin");
        let file = fs::File::create(&bin_path)
            .with_context(|| format!("create {}", bin_path.display()))?;
        let mut w = BufWriter::new(file);
        write_binary(&mut w, &atlases).with_context(|| format!("write {}", bin_path.display()))?;
        w.flush()
            .with_context(|| format!("write {}", bin_path.display()))?;
        info!(?bin_path, "atlas written");
    }
    if wants_xml {
        let xml_path = with_suffix(&cli.output, ".xml");
        fs::write(&xml_path, to_xml(&atlases))
            .with_context(|| format!("write {}", xml_path.display()))?;
        info!(?xml_path, "atlas written");
    }
    if cli.json {
        let json_path = with_suffix(&cli.output, ".json");
        fs::write(&json_path, to_json(&atlases)?)
            .with_context(|| format!("write {}", json_path.display()))?;
        info!(?json_path, "atlas written");
    }

    fs::write(&hash_path, new_hash.to_string())
        .with_context(|| format!("write {}", hash_path.display()))?;
    info!("{}", out.stats().summary());
    Ok(())
}

fn build_config(cli: &Cli) -> anyhow::Result<PackerConfig> {
    let size = clamp_atlas_size(cli.size);
    let name = cli
        .output
        .file_name()
        .and_then(|s| s.to_str())
        .unwrap_or("atlas")
        .to_string();
    Ok(PackerConfig::builder()
        .name(name)
        .with_max_dimensions(size, size)
        .padding(cli.pad)
        .allow_rotation(cli.rotate)
        .unique(cli.unique || cli.defaults)
        .trim(cli.trim || cli.defaults)
        .trim_threshold(cli.trim_threshold)
        .premultiply(cli.premultiply || cli.defaults)
        .force_max_dimensions(cli.force_max_dimensions)
        .strategy(parse_strategy(&cli.strategy)?)
        .heuristic(parse_heuristic(&cli.heuristic)?)
        .split(parse_split(&cli.split)?)
        .merge(cli.merge)
        .order(if cli.global {
            PlacementOrder::GlobalBestFit
        } else {
            PlacementOrder::Sequential
        })
        .sort_order(parse_sort_order(&cli.sort_order)?)
        .parallel(cli.parallel)
        .build())
}

/// `path` with `suffix` appended to its last component (`out/atlas` + `.bin`).
fn with_suffix(path: &Path, suffix: &str) -> PathBuf {
    let mut s = path.as_os_str().to_owned();
    s.push(suffix);
    PathBuf::from(s)
}

/// PNG files directly inside each input directory, in file-name order.
fn gather_paths(inputs: &[PathBuf]) -> anyhow::Result<Vec<PathBuf>> {
    let mut out = Vec::new();
    for dir in inputs {
        if !dir.is_dir() {
            anyhow::bail!("input directory {} does not exist", dir.display());
        }
        for entry in WalkDir::new(dir)
            .min_depth(1)
            .max_depth(1)
            .sort_by_file_name()
        {
            let entry = entry.with_context(|| format!("read {}", dir.display()))?;
            if entry.file_type().is_file() && is_png(entry.path()) {
                out.push(entry.into_path());
            }
        }
    }
    Ok(out)
}

fn is_png(p: &Path) -> bool {
    p.extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case("png"))
}

/// Hash of the arguments, the resolved input directories and the input
/// listing (name, size, modification time).
fn compute_repack_hash(
    raw_args: &[OsString],
    inputs: &[PathBuf],
    paths: &[PathBuf],
) -> anyhow::Result<u64> {
    let mut hasher = DefaultHasher::new();
    raw_args.hash(&mut hasher);
    for dir in inputs {
        let resolved = dir
            .canonicalize()
            .with_context(|| format!("resolve {}", dir.display()))?;
        resolved.hash(&mut hasher);
    }
    for p in paths {
        let meta = fs::metadata(p).with_context(|| format!("stat {}", p.display()))?;
        p.file_name().hash(&mut hasher);
        meta.len().hash(&mut hasher);
        meta.modified()
            .ok()
            .and_then(|t| t.duration_since(UNIX_EPOCH).ok())
            .map(|d| d.as_nanos())
            .hash(&mut hasher);
    }
    Ok(hasher.finish())
}

fn read_hash(path: &Path) -> Option<u64> {
    fs::read_to_string(path).ok()?.trim().parse().ok()
}

fn load_images_with_progress(paths: &[PathBuf], progress: bool) -> anyhow::Result<Vec<InputImage>> {
    use indicatif::{ProgressBar, ProgressStyle};
    let bar = if progress {
        let b = ProgressBar::new(paths.len() as u64);
        b.set_style(
            ProgressStyle::with_template(
                "{spinner:.green} loading {pos}/{len} [{elapsed_precise}] {wide_msg}",
            )
            .unwrap_or_else(|_| ProgressStyle::default_bar()),
        );
        Some(b)
    } else {
        None
    };
    let mut list = Vec::with_capacity(paths.len());
    for p in paths {
        let key = p
            .file_name()
            .and_then(|s| s.to_str())
            .unwrap_or_default()
            .to_string();
        if let Some(b) = &bar {
            b.set_message(key.clone());
        }
        match load_image(p) {
            Ok(image) => list.push(InputImage { key, image }),
            Err(e) => {
                error!(?p, error = %e, "skip image");
            }
        }
        if let Some(b) = &bar {
            b.inc(1);
        }
    }
    if let Some(b) = &bar {
        b.finish_and_clear();
    }
    Ok(list)
}

fn load_image(p: &Path) -> anyhow::Result<DynamicImage> {
    let img = ImageReader::open(p)?.with_guessed_format()?.decode()?;
    Ok(img)
}

fn init_tracing_with_level(verbose: u8) {
    let level = match verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .try_init();
}

#[derive(Debug, Deserialize, Default)]
#[serde(deny_unknown_fields)]
struct YamlConfig {
    size: Option<u32>,
    padding: Option<u32>,
    rotate: Option<bool>,
    unique: Option<bool>,
    trim: Option<bool>,
    trim_threshold: Option<u8>,
    premultiply: Option<bool>,
    force_max_dimensions: Option<bool>,
    strategy: Option<String>,
    heuristic: Option<String>,
    split: Option<String>,
    merge: Option<bool>,
    global: Option<bool>,
    sort_order: Option<String>,
    parallel: Option<bool>,
}

impl YamlConfig {
    fn into_packer_config(self, mut cfg: PackerConfig) -> anyhow::Result<PackerConfig> {
        if let Some(v) = self.size {
            let size = clamp_atlas_size(v);
            cfg.max_width = size;
            cfg.max_height = size;
        }
        if let Some(v) = self.padding {
            if v > 16 {
                anyhow::bail!("padding must be between 0 and 16, got {v}");
            }
            cfg.padding = v;
        }
        if let Some(v) = self.rotate {
            cfg.allow_rotation = v;
        }
        if let Some(v) = self.unique {
            cfg.unique = v;
        }
        if let Some(v) = self.trim {
            cfg.trim = v;
        }
        if let Some(v) = self.trim_threshold {
            cfg.trim_threshold = v;
        }
        if let Some(v) = self.premultiply {
            cfg.premultiply = v;
        }
        if let Some(v) = self.force_max_dimensions {
            cfg.force_max_dimensions = v;
        }
        if let Some(v) = self.strategy {
            cfg.strategy = parse_strategy(&v)?;
        }
        if let Some(v) = self.heuristic {
            cfg.heuristic = parse_heuristic(&v)?;
        }
        if let Some(v) = self.split {
            cfg.split = parse_split(&v)?;
        }
        if let Some(v) = self.merge {
            cfg.merge = v;
        }
        if let Some(v) = self.global {
            cfg.order = if v {
                PlacementOrder::GlobalBestFit
            } else {
                PlacementOrder::Sequential
            };
        }
        if let Some(v) = self.sort_order {
            cfg.sort_order = parse_sort_order(&v)?;
        }
        if let Some(v) = self.parallel {
            cfg.parallel = v;
        }
        Ok(cfg)
    }
}

fn parse_strategy(s: &str) -> anyhow::Result<PartitionStrategy> {
    s.parse()
        .map_err(|_| anyhow!("unknown strategy: {s} (expected maxrects or guillotine)"))
}

fn parse_heuristic(s: &str) -> anyhow::Result<PlacementHeuristic> {
    s.parse()
        .map_err(|_| anyhow!("unknown heuristic: {s} (expected baf|bssf|blsf|waf|wssf|wlsf)"))
}

fn parse_split(s: &str) -> anyhow::Result<SplitHeuristic> {
    s.parse()
        .map_err(|_| anyhow!("unknown split: {s} (expected slas|llas|minas|maxas|sas|las)"))
}

fn parse_sort_order(s: &str) -> anyhow::Result<SortOrder> {
    s.parse().map_err(|_| anyhow!("unknown sort order: {s}"))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn os(args: &[&str]) -> Vec<OsString> {
        args.iter().map(OsString::from).collect()
    }

    fn parse(args: &[&str]) -> Cli {
        Cli::try_parse_from(rewrite_glued_args(os(args))).expect("parse")
    }

    #[test]
    fn glued_numbers_are_split() {
        let out = rewrite_glued_args(os(&[
            "atlas-packer",
            "--size2048",
            "--pad3",
            "-p2",
            "-p",
            "-s512",
        ]));
        assert_eq!(
            out,
            os(&["atlas-packer", "--size=2048", "--pad=3", "--pad=2", "-p", "-s512"])
        );
    }

    #[test]
    fn atlas_size_is_clamped_down() {
        assert_eq!(clamp_atlas_size(5000), 4096);
        assert_eq!(clamp_atlas_size(4096), 4096);
        assert_eq!(clamp_atlas_size(3000), 2048);
        assert_eq!(clamp_atlas_size(1024), 1024);
        assert_eq!(clamp_atlas_size(600), 512);
        assert_eq!(clamp_atlas_size(100), 256);
    }

    #[test]
    fn short_flags_and_glued_values() {
        let cli = parse(&[
            "atlas-packer",
            "out/atlas",
            "a,b",
            "-p",
            "-t",
            "-s1024",
            "-p4",
            "-vv",
        ]);
        assert_eq!(cli.output, PathBuf::from("out/atlas"));
        assert_eq!(cli.inputs, vec![PathBuf::from("a"), PathBuf::from("b")]);
        assert!(cli.premultiply);
        assert!(cli.trim);
        assert_eq!(cli.size, 1024);
        assert_eq!(cli.pad, 4);
        assert_eq!(cli.verbose, 2);
    }

    #[test]
    fn default_flag_enables_xml_premultiply_trim_unique() {
        let cli = parse(&["atlas-packer", "out", "in", "-d"]);
        let cfg = build_config(&cli).unwrap();
        assert!(cfg.premultiply && cfg.trim && cfg.unique);
        assert!(!cfg.allow_rotation);
        assert_eq!(cfg.max_width, 4096);
        assert_eq!(cfg.padding, 1);
        assert_eq!(cfg.name, "out");
    }

    #[test]
    fn pad_out_of_range_is_rejected() {
        let args = rewrite_glued_args(os(&["atlas-packer", "out", "in", "--pad17"]));
        assert!(Cli::try_parse_from(args).is_err());
    }

    #[test]
    fn yaml_overlay_overrides_flags() {
        let cli = parse(&["atlas-packer", "out", "in", "--strategy", "maxrects"]);
        let base = build_config(&cli).unwrap();
        let y: YamlConfig =
            serde_yaml::from_str("strategy: guillotine\nsize: 1000\nglobal: true\n").unwrap();
        let cfg = y.into_packer_config(base).unwrap();
        assert_eq!(cfg.strategy, PartitionStrategy::Guillotine);
        assert_eq!(cfg.max_width, 512);
        assert_eq!(cfg.order, PlacementOrder::GlobalBestFit);
    }

    #[test]
    fn suffix_is_appended_to_file_name() {
        assert_eq!(
            with_suffix(Path::new("out/atlas"), "0.png"),
            PathBuf::from("out/atlas0.png")
        );
    }
}
