use std::{
    fs::File,
    io::{BufReader, BufWriter, Write as _},
    path::{Path, PathBuf},
};

use anyhow::Context as _;
use clap::{Parser, Subcommand, ValueEnum};

#[derive(Parser, Debug)]
#[command(name = "swarmlight", version)]
struct Cli {
    /// Log debug events to stderr.
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Bake layered colors into compressed keyframe curves.
    Bake(BakeArgs),
    /// Export baked curves as color-transfer JSON.
    Transfer(TransferArgs),
}

#[derive(Parser, Debug)]
struct BakeArgs {
    /// Input scene (or job) JSON.
    #[arg(long = "in")]
    in_path: PathBuf,

    /// Output scene JSON with baked `color` curves.
    #[arg(long)]
    out: PathBuf,

    /// First frame to bake (inclusive).
    #[arg(long, allow_negative_numbers = true)]
    start: Option<i64>,

    /// Last frame to bake (inclusive).
    #[arg(long, allow_negative_numbers = true)]
    end: Option<i64>,

    /// Maximum per-segment error; 0 keeps every frame.
    #[arg(long)]
    tolerance: Option<f64>,

    /// Quantize composite samples before compression.
    #[arg(long, value_enum)]
    quantize: Option<QuantizeChoice>,

    /// Override rayon worker threads.
    #[arg(long)]
    threads: Option<usize>,

    /// Bake objects on the calling thread only.
    #[arg(long, default_value_t = false)]
    sequential: bool,

    /// Keep existing keys outside the baked range instead of replacing whole curves.
    #[arg(long, default_value_t = false)]
    range_overwrite: bool,
}

#[derive(Parser, Debug)]
struct TransferArgs {
    /// Baked scene JSON.
    #[arg(long = "in")]
    in_path: PathBuf,

    /// Output color-transfer JSON.
    #[arg(long)]
    out: PathBuf,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum QuantizeChoice {
    None,
    Rgb8,
    Rgb8Truncate,
}

impl From<QuantizeChoice> for swarmlight::Quantize {
    fn from(value: QuantizeChoice) -> Self {
        match value {
            QuantizeChoice::None => Self::None,
            QuantizeChoice::Rgb8 => Self::Rgb8,
            QuantizeChoice::Rgb8Truncate => Self::Rgb8Truncate,
        }
    }
}

/// Scene document plus optional bake settings, as read from `--in`.
#[derive(serde::Serialize, serde::Deserialize)]
struct JobDoc {
    #[serde(flatten)]
    scene: swarmlight::Scene,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    bake: Option<BakeSection>,
}

#[derive(Default, serde::Serialize, serde::Deserialize)]
struct BakeSection {
    #[serde(default)]
    frame_range: Option<swarmlight::FrameRange>,
    #[serde(default)]
    opts: swarmlight::BakeOpts,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);
    match cli.cmd {
        Command::Bake(args) => cmd_bake(args),
        Command::Transfer(args) => cmd_transfer(args),
    }
}

fn init_tracing(verbose: bool) {
    let level = if verbose {
        tracing::Level::DEBUG
    } else {
        tracing::Level::INFO
    };
    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .init();
}

fn read_job(path: &Path) -> anyhow::Result<JobDoc> {
    let f = File::open(path).with_context(|| format!("open scene '{}'", path.display()))?;
    let job: JobDoc = serde_json::from_reader(BufReader::new(f))
        .with_context(|| format!("parse scene JSON '{}'", path.display()))?;
    Ok(job)
}

fn create_parent_dir(path: &Path) -> anyhow::Result<()> {
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("create output dir '{}'", parent.display()))?;
    }
    Ok(())
}

fn cmd_bake(args: BakeArgs) -> anyhow::Result<()> {
    let mut job = read_job(&args.in_path)?;
    let section = job.bake.take().unwrap_or_default();

    let mut opts = section.opts;
    if let Some(t) = args.tolerance {
        opts.tolerance = t;
    }
    if let Some(q) = args.quantize {
        opts.quantize = q.into();
    }
    if args.threads.is_some() {
        opts.threads = args.threads;
    }
    if args.sequential {
        opts.parallel = false;
    }
    if args.range_overwrite {
        opts.write_mode = swarmlight::WriteMode::RangeOverwrite;
    }

    let file_range = section.frame_range;
    let start = args.start.or(file_range.map(|r| r.start.0));
    let end = args.end.or(file_range.map(|r| r.end.0));
    let (Some(start), Some(end)) = (start, end) else {
        anyhow::bail!("frame range required: pass --start/--end or set bake.frame_range");
    };
    let range =
        swarmlight::FrameRange::new(swarmlight::FrameIndex(start), swarmlight::FrameIndex(end))?;

    let session = swarmlight::BakeSession::new(job.scene.layers.clone(), range, opts.clone())?;
    let cancel = swarmlight::CancelFlag::new();
    let progress = |e: swarmlight::ProgressEvent| {
        tracing::debug!(stage = ?e.stage, completed = e.completed, total = e.total, "progress");
    };

    // Sources are read from a copy; baked curves land in `job.scene`.
    let store = job.scene.clone();
    let report = session.run(&store, &mut job.scene, &progress, &cancel)?;

    for failure in &report.failures {
        eprintln!(
            "failed {} ({:?}): {}",
            failure.object, failure.stage, failure.reason
        );
    }
    let s = report.stats;
    eprintln!(
        "baked {}/{} objects, {} samples -> {} keys",
        s.objects_baked, s.objects_total, s.samples_in, s.keys_out
    );

    job.bake = Some(BakeSection {
        frame_range: Some(range),
        opts,
    });
    create_parent_dir(&args.out)?;
    let f = File::create(&args.out)
        .with_context(|| format!("create output '{}'", args.out.display()))?;
    let mut w = BufWriter::new(f);
    serde_json::to_writer_pretty(&mut w, &job)
        .with_context(|| format!("write scene JSON '{}'", args.out.display()))?;
    w.flush()
        .with_context(|| format!("flush scene JSON '{}'", args.out.display()))?;

    eprintln!("wrote {}", args.out.display());
    Ok(())
}

fn cmd_transfer(args: TransferArgs) -> anyhow::Result<()> {
    let scene = read_job(&args.in_path)?.scene;
    let baked = scene.baked();
    if baked.is_empty() {
        tracing::warn!("scene has no baked color curves; run `swarmlight bake` first");
    }

    let transfer = swarmlight::color_transfer(&baked);
    create_parent_dir(&args.out)?;
    transfer.write_path(&args.out)?;

    eprintln!("wrote {}", args.out.display());
    Ok(())
}
