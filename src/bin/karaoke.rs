use std::path::PathBuf;

use anyhow::Context as _;
use clap::{Args, Parser, Subcommand};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "karaoke", version, about = "Render scrolling karaoke lyric videos")]
struct Cli {
    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Render a single preview frame as a PNG.
    Frame(FrameArgs),
    /// Render the full MP4 with the song audio (requires `ffmpeg` and `ffprobe` on PATH).
    Render(RenderArgs),
    /// Print timing statistics for a lyrics source.
    Inspect(InspectArgs),
}

#[derive(Args, Debug)]
#[group(required = true, multiple = false)]
struct LyricsSource {
    /// Timing JSON (`{"words": [{"word", "start_time", "index"}]}`).
    #[arg(long)]
    timing: Option<PathBuf>,

    /// Plain lyrics text, one lyric line per text line, all words untimed.
    #[arg(long)]
    lyrics: Option<PathBuf>,
}

impl LyricsSource {
    fn load(&self) -> anyhow::Result<karaoke::TimingStore> {
        if let Some(path) = &self.timing {
            return Ok(karaoke::TimingStore::from_path(path)?);
        }
        let path = self
            .lyrics
            .as_ref()
            .context("either --timing or --lyrics is required")?;
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("read lyrics '{}'", path.display()))?;
        Ok(karaoke::TimingStore::from_lyrics_text(&text))
    }
}

#[derive(Args, Debug)]
struct StyleArgs {
    /// Looping background video or still image.
    #[arg(long)]
    background: Option<PathBuf>,

    /// Font file tried before the built-in list (repeatable).
    #[arg(long = "font")]
    fonts: Vec<PathBuf>,

    /// Output frames per second.
    #[arg(long, default_value_t = 30)]
    fps: u32,
}

impl StyleArgs {
    fn session_opts(&self) -> anyhow::Result<karaoke::RenderSessionOpts> {
        let mut font_candidates: Vec<karaoke::FontCandidate> = self
            .fonts
            .iter()
            .map(karaoke::FontCandidate::new)
            .collect();
        font_candidates.extend(karaoke::default_font_candidates());
        Ok(karaoke::RenderSessionOpts {
            fps: karaoke::Fps::new(self.fps, 1)?,
            background: self.background.clone(),
            font_candidates,
            ..karaoke::RenderSessionOpts::default()
        })
    }
}

#[derive(Parser, Debug)]
struct FrameArgs {
    #[command(flatten)]
    source: LyricsSource,

    #[command(flatten)]
    style: StyleArgs,

    /// Playback time in seconds.
    #[arg(long, default_value_t = 0.0)]
    time: f64,

    /// Preview width in pixels.
    #[arg(long, default_value_t = 1280)]
    width: u32,

    /// Preview height in pixels.
    #[arg(long, default_value_t = 720)]
    height: u32,

    /// Output PNG path.
    #[arg(long)]
    out: PathBuf,
}

#[derive(Parser, Debug)]
struct RenderArgs {
    #[command(flatten)]
    source: LyricsSource,

    #[command(flatten)]
    style: StyleArgs,

    /// Song audio, muxed into the output and defining its length.
    #[arg(long)]
    audio: PathBuf,

    /// Output MP4 path.
    #[arg(long)]
    out: PathBuf,

    /// Output resolution preset.
    #[arg(long, value_enum, default_value_t = karaoke::Resolution::P1080)]
    resolution: karaoke::Resolution,

    /// Refuse to replace an existing output file.
    #[arg(long, default_value_t = false)]
    no_overwrite: bool,

    /// Enable frame-level parallelism.
    #[arg(long, default_value_t = false)]
    parallel: bool,

    /// Override rayon worker threads (parallel mode only).
    #[arg(long)]
    threads: Option<usize>,

    /// Render chunk size (parallel mode only).
    #[arg(long, default_value_t = 64)]
    chunk_size: usize,

    /// x264 preset.
    #[arg(long, default_value = "medium")]
    preset: String,

    /// Encoder threads.
    #[arg(long, default_value_t = 4)]
    encoder_threads: u32,
}

#[derive(Parser, Debug)]
struct InspectArgs {
    #[command(flatten)]
    source: LyricsSource,
}

fn main() -> anyhow::Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    match cli.cmd {
        Command::Frame(args) => cmd_frame(args),
        Command::Render(args) => cmd_render(args),
        Command::Inspect(args) => cmd_inspect(args),
    }
}

fn cmd_frame(args: FrameArgs) -> anyhow::Result<()> {
    let store = args.source.load()?;
    let opts = args.style.session_opts()?;
    let frame =
        karaoke::render_preview_frame(&store, args.time, args.width, args.height, &opts)?;

    karaoke::encode::ffmpeg::ensure_parent_dir(&args.out)?;
    image::save_buffer_with_format(
        &args.out,
        &frame.data,
        frame.width,
        frame.height,
        image::ColorType::Rgb8,
        image::ImageFormat::Png,
    )
    .with_context(|| format!("write png '{}'", args.out.display()))?;

    eprintln!("wrote {}", args.out.display());
    Ok(())
}

fn cmd_render(args: RenderArgs) -> anyhow::Result<()> {
    let store = args.source.load()?;
    let mut opts = args.style.session_opts()?;
    opts.parallel = args.parallel;
    opts.threads = args.threads;
    opts.chunk_size = args.chunk_size;

    let audio = karaoke::AudioTrack::probe(&args.audio)?;
    let mut sess = karaoke::RenderSession::new(store, args.resolution.canvas(), opts)?;

    let mut sink_opts = karaoke::FfmpegSinkOpts::new(&args.out);
    sink_opts.overwrite = !args.no_overwrite;
    sink_opts.preset = args.preset.clone();
    sink_opts.threads = args.encoder_threads;

    let mut last_pct = None;
    let mut control = karaoke::RenderControl::new().with_progress(|p| {
        let pct = (p.fraction * 100.0).floor() as u32;
        if last_pct != Some(pct) {
            last_pct = Some(pct);
            eprint!("\rrendering {pct:>3}% ({}/{})", p.frame + 1, p.total_frames);
        }
    });
    let outcome = sess.render(&audio, sink_opts, &mut control)?;
    eprintln!();

    match outcome {
        karaoke::RenderOutcome::Completed(stats) => {
            eprintln!(
                "wrote {} ({} frames, {:.2}s)",
                args.out.display(),
                stats.frames_rendered,
                stats.duration_secs
            );
        }
        karaoke::RenderOutcome::Cancelled { frames_rendered } => {
            eprintln!("cancelled after {frames_rendered} frames");
        }
    }
    Ok(())
}

fn cmd_inspect(args: InspectArgs) -> anyhow::Result<()> {
    let store = args.source.load()?;
    let index = karaoke::TimingIndex::build(&store);

    println!(
        "words: {} ({} timed, complete: {})",
        store.total_words(),
        store.timed_count(),
        store.is_complete()
    );
    match (index.first_word_time, index.last_word_time) {
        (Some(first), Some(last)) => println!("sung: {first:.2}s .. {last:.2}s"),
        _ => println!("sung: untimed"),
    }
    for gap in &index.gaps {
        println!(
            "gap: {:.2}s .. {:.2}s ({:.2}s)",
            gap.start,
            gap.end,
            gap.duration()
        );
    }
    Ok(())
}
