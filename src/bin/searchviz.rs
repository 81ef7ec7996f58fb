use std::{
    fs::File,
    io::BufWriter,
    path::{Path, PathBuf},
};

use anyhow::Context as _;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

/// Array values accepted in session files.
type Value = i64;

#[derive(Parser, Debug)]
#[command(name = "searchviz", version)]
struct Cli {
    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Generate the step trace of a session and print its fingerprint.
    Trace(TraceArgs),
    /// Validate a session file without generating anything.
    Check(CheckArgs),
    /// Render a session as storyboard frames and/or an MP4 (requires `ffmpeg` on PATH).
    Render(RenderArgs),
    /// Extract every frame of a video as JPEG files (requires `ffmpeg`/`ffprobe`).
    Frames(FramesArgs),
    /// List the clips in a folder in merge order.
    Clips(ClipsArgs),
    /// Merge ranges of clips into new videos (requires `ffmpeg` on PATH).
    Merge(MergeArgs),
}

#[derive(Parser, Debug)]
struct TraceArgs {
    /// Input session JSON.
    #[arg(long = "in")]
    in_path: PathBuf,

    /// Write the full trace as JSON.
    #[arg(long)]
    out: Option<PathBuf>,

    /// Write one `{step, marks}` JSON object per line.
    #[arg(long)]
    jsonl: Option<PathBuf>,
}

#[derive(Parser, Debug)]
struct CheckArgs {
    /// Input session JSON.
    #[arg(long = "in")]
    in_path: PathBuf,
}

#[derive(Parser, Debug)]
struct RenderArgs {
    /// Input session JSON.
    #[arg(long = "in")]
    in_path: PathBuf,

    /// Output MP4 path.
    #[arg(long)]
    out: Option<PathBuf>,

    /// Storyboard style JSON; defaults are used for missing fields.
    #[arg(long)]
    style: Option<PathBuf>,

    /// Also write one PNG per step into this folder.
    #[arg(long)]
    frames_dir: Option<PathBuf>,

    /// Fail instead of replacing an existing output file.
    #[arg(long)]
    no_overwrite: bool,
}

#[derive(Parser, Debug)]
struct FramesArgs {
    /// Input video.
    #[arg(long)]
    video: PathBuf,

    /// Output folder for the JPEG frames.
    #[arg(long)]
    out: PathBuf,
}

#[derive(Parser, Debug)]
struct ClipsArgs {
    /// Folder searched recursively for `.mp4` files.
    #[arg(long)]
    dir: PathBuf,
}

#[derive(Parser, Debug)]
struct MergeArgs {
    /// Folder searched recursively for `.mp4` files.
    #[arg(long)]
    dir: PathBuf,

    /// Merge plan JSON.
    #[arg(long)]
    plan: Option<PathBuf>,

    /// Extra group as `OUTPUT=START-END` (inclusive, repeatable).
    #[arg(long = "group")]
    groups: Vec<String>,
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    match cli.cmd {
        Command::Trace(args) => cmd_trace(args),
        Command::Check(args) => cmd_check(args),
        Command::Render(args) => cmd_render(args),
        Command::Frames(args) => cmd_frames(args),
        Command::Clips(args) => cmd_clips(args),
        Command::Merge(args) => cmd_merge(args),
    }
}

fn read_json<T: serde::de::DeserializeOwned>(path: &Path) -> anyhow::Result<T> {
    let bytes = std::fs::read(path).with_context(|| format!("read '{}'", path.display()))?;
    serde_json::from_slice(&bytes).with_context(|| format!("parse json '{}'", path.display()))
}

fn load_trace(path: &Path) -> anyhow::Result<searchviz::Trace<Value>> {
    let spec: searchviz::SessionSpec<Value> = read_json(path)?;
    searchviz::generate_session(&spec).with_context(|| format!("session '{}'", path.display()))
}

fn create_file(path: &Path) -> anyhow::Result<BufWriter<File>> {
    searchviz::ensure_parent_dir(path)?;
    let f = File::create(path).with_context(|| format!("create '{}'", path.display()))?;
    Ok(BufWriter::new(f))
}

fn cmd_trace(args: TraceArgs) -> anyhow::Result<()> {
    let trace = load_trace(&args.in_path)?;

    if let Some(out) = &args.out {
        let w = create_file(out)?;
        serde_json::to_writer_pretty(w, &trace)
            .with_context(|| format!("write trace '{}'", out.display()))?;
        eprintln!("wrote {}", out.display());
    }
    if let Some(path) = &args.jsonl {
        let mut sink = searchviz::JsonLinesSink::new(create_file(path)?);
        searchviz::drive(&trace, &mut sink)?;
        eprintln!("wrote {} ({} steps)", path.display(), sink.lines_written());
    }

    let outcome = match trace.found_index() {
        Some(i) => format!("found at {i}"),
        None => "not found".to_string(),
    };
    println!(
        "{} steps, {} probes, {outcome}",
        trace.steps.len(),
        trace.probe_count()
    );
    println!("fingerprint {}", searchviz::fingerprint_trace(&trace)?);
    Ok(())
}

fn cmd_check(args: CheckArgs) -> anyhow::Result<()> {
    let spec: searchviz::SessionSpec<Value> = read_json(&args.in_path)?;
    spec.validate()?;
    searchviz::check_preconditions(&spec.array, spec.variant)?;
    println!("ok: {} search over {} values", spec.variant, spec.array.len());
    Ok(())
}

fn cmd_render(args: RenderArgs) -> anyhow::Result<()> {
    if args.out.is_none() && args.frames_dir.is_none() {
        anyhow::bail!("nothing to do: pass --out and/or --frames-dir");
    }
    let trace = load_trace(&args.in_path)?;
    let style = match &args.style {
        Some(path) => read_json(path)?,
        None => searchviz::StoryboardStyle::default(),
    };

    if let Some(dir) = &args.frames_dir {
        let board = searchviz::Storyboard::for_trace(style.clone(), &trace)?;
        let mut collector = searchviz::FrameCollector::new(board);
        searchviz::drive(&trace, &mut collector)?;
        let frames = collector.into_frames();
        for (i, frame) in frames.iter().enumerate() {
            searchviz::write_png(frame, &dir.join(format!("step_{i:03}.png")))?;
        }
        eprintln!("wrote {} frames to {}", frames.len(), dir.display());
    }

    if let Some(out) = &args.out {
        let opts = searchviz::RenderToMp4Opts {
            style,
            overwrite: !args.no_overwrite,
        };
        let stats = searchviz::render_trace_to_mp4(&trace, out.clone(), opts)?;
        eprintln!(
            "wrote {} ({} steps, {} frames)",
            out.display(),
            stats.steps,
            stats.frames
        );
    }
    Ok(())
}

fn cmd_frames(args: FramesArgs) -> anyhow::Result<()> {
    let stats = searchviz::extract_frames(&args.video, &args.out)?;
    eprintln!(
        "wrote {} frames to {}",
        stats.frames_written,
        stats.out_dir.display()
    );
    Ok(())
}

fn cmd_clips(args: ClipsArgs) -> anyhow::Result<()> {
    let clips = searchviz::list_clips(&args.dir)?;
    for (i, clip) in clips.iter().enumerate() {
        println!("{i}: {}", clip.path.display());
    }
    Ok(())
}

fn cmd_merge(args: MergeArgs) -> anyhow::Result<()> {
    let mut plan = match &args.plan {
        Some(path) => read_json(path)?,
        None => searchviz::MergePlan {
            groups: Vec::new(),
            overwrite: true,
        },
    };
    for g in &args.groups {
        plan.groups.push(searchviz::parse_group(g)?);
    }

    let outputs = searchviz::run_merge_plan(&args.dir, &plan)?;
    for out in outputs {
        eprintln!("wrote {}", out.display());
    }
    Ok(())
}
