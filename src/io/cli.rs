//! Command-line interface over frame directories and pattern tables
//!
//! A video is a directory of grayscale PNG frames. Every subcommand validates
//! its structural parameters before writing any output.

use crate::algorithm::selection::{SelectionLimits, SelectionStrategy, select};
use crate::algorithm::sketch::{SketchConfig, SketchMatcher};
use crate::analysis::binarize::{Threshold, binarize};
use crate::analysis::catalog::PatternCatalog;
use crate::analysis::counting::PatternCounter;
use crate::analysis::velocity::add_velocity;
use crate::io::clips::{ClipConfig, ClipWindow, clip_ids, pair_clip_ids, split_clip};
use crate::io::configuration::{
    DEFAULT_ADAPTIVE_BLOCK, DEFAULT_ADAPTIVE_C, DEFAULT_CLIP_EXTRA, DEFAULT_CLIP_PADDING,
    DEFAULT_ESTIMATOR_P, DEFAULT_RENDER_SCALE, DEFAULT_SEED, DEFAULT_SKETCH_LENGTH,
    DEFAULT_SPACE_FILTER, DEFAULT_TIME_FILTER, GIF_FRAME_DELAY_MS, SKETCH_SUFFIX,
};
use crate::io::error::{PatternError, Result, invalid_source};
use crate::io::image::save_pattern_png;
use crate::io::progress::ProgressManager;
use crate::io::table::{
    export_catalog, export_pattern_values, import_estimated, import_measured,
    import_pattern_values,
};
use crate::io::video::{FrameReader, FrameWriter, load_frame, save_gif};
use crate::math::codec::{PatternCode, WindowShape};
use clap::{Args, Parser, Subcommand, ValueEnum};
use ndarray::Array2;
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "motionpattern")]
#[command(
    author,
    version,
    about = "Catalog, select and sketch spatiotemporal binary motion patterns"
)]
/// Command-line arguments for the pattern tools
pub struct Cli {
    /// Operation to run
    #[command(subcommand)]
    pub command: Command,

    /// Suppress progress output and informational logs
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Increase log detail (repeat for more)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,
}

impl Cli {
    /// Check if progress should be displayed
    pub const fn should_show_progress(&self) -> bool {
        !self.quiet
    }

    /// Default log directive when `RUST_LOG` is unset
    pub const fn log_level(&self) -> &'static str {
        match (self.quiet, self.verbose) {
            (true, _) => "warn",
            (false, 0) => "info",
            (false, 1) => "debug",
            (false, _) => "trace",
        }
    }

    /// Install the global log subscriber, writing to stderr
    pub fn init_tracing(&self) {
        let filter =
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(self.log_level()));
        let _ = tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_target(false)
            .with_writer(std::io::stderr)
            .try_init();
    }
}

/// Spatiotemporal window geometry
#[derive(Args, Clone, Copy, Debug)]
pub struct WindowArgs {
    /// Temporal depth `T` in frames
    #[arg(short = 't', long, default_value_t = DEFAULT_TIME_FILTER)]
    pub time_filter: usize,

    /// Spatial side `S` in pixels
    #[arg(short = 's', long, default_value_t = DEFAULT_SPACE_FILTER)]
    pub space_filter: usize,
}

impl WindowArgs {
    /// Validated window shape
    ///
    /// # Errors
    ///
    /// Returns `Configuration` or `WindowTooLarge` for an unusable geometry.
    pub fn shape(&self) -> Result<WindowShape> {
        WindowShape::new(self.time_filter, self.space_filter)
    }
}

/// Layout of a pattern table
#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum TableKind {
    /// `Pattern;p` rows with measured probabilities
    Measured,
    /// Top-k sketch rows with level statistics and a parameter header
    Estimated,
}

/// Available subcommands
#[derive(Subcommand)]
pub enum Command {
    /// Count pattern occurrences in binarized videos and write a measured table
    Count {
        /// Frame directories to count
        #[arg(value_name = "VIDEO", required = true)]
        videos: Vec<PathBuf>,

        /// Output table
        #[arg(short, long)]
        output: PathBuf,

        /// Window geometry
        #[command(flatten)]
        window: WindowArgs,

        /// Leading frames to skip in each video
        #[arg(long, default_value_t = 0)]
        skip_frames: usize,

        /// Maximum frames counted per video
        #[arg(long)]
        max_frames: Option<usize>,
    },

    /// Select a pattern subset from a table and write its pattern values
    Select {
        /// Input table
        #[arg(value_name = "TABLE")]
        table: PathBuf,

        /// Table layout
        #[arg(long, value_enum, default_value_t = TableKind::Measured)]
        kind: TableKind,

        /// Estimator parameter for estimated tables
        #[arg(short, long, default_value_t = DEFAULT_ESTIMATOR_P)]
        p: f64,

        /// Window geometry the table was built for
        #[command(flatten)]
        window: WindowArgs,

        /// Selection strategy
        #[arg(long, value_enum, default_value_t = SelectionStrategy::Heuristic)]
        strategy: SelectionStrategy,

        /// Bandwidth ceiling, the largest retained probability mass
        #[arg(short = 'W', long)]
        max_bandwidth: f64,

        /// Count ceiling, the largest number of retained patterns
        #[arg(short = 'N', long)]
        max_count: usize,

        /// Output list of selected pattern values
        #[arg(short, long)]
        output: PathBuf,

        /// Also write the full catalog with its selection mask
        #[arg(long)]
        catalog: Option<PathBuf>,

        /// Compute the velocity of every pattern before writing the catalog
        #[arg(long)]
        velocity: bool,
    },

    /// Keep only the tiles of a binarized video whose pattern is listed
    Sketch {
        /// Binarized frame directory
        #[arg(value_name = "VIDEO")]
        input: PathBuf,

        /// Pattern value list, as written by `select`
        #[arg(long)]
        patterns: PathBuf,

        /// Output frame directory, defaults to `<VIDEO>_sketch`
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Window geometry
        #[command(flatten)]
        window: WindowArgs,

        /// Maximum input frames consumed
        #[arg(long)]
        max_frames: Option<usize>,

        /// Also write an animated GIF preview
        #[arg(long)]
        gif: Option<PathBuf>,
    },

    /// Threshold grayscale frames into 0/255 frames
    Binarize {
        /// Grayscale frame directory
        #[arg(value_name = "VIDEO")]
        input: PathBuf,

        /// Output frame directory
        #[arg(short, long)]
        output: PathBuf,

        /// Use a local mean threshold instead of the frame median
        #[arg(long)]
        adaptive: bool,

        /// Odd neighbourhood side for the adaptive threshold
        #[arg(long, default_value_t = DEFAULT_ADAPTIVE_BLOCK)]
        block: usize,

        /// Constant subtracted from the adaptive local mean
        #[arg(long, allow_negative_numbers = true, default_value_t = DEFAULT_ADAPTIVE_C)]
        c: i32,

        /// Leading frames to skip
        #[arg(long, default_value_t = 0)]
        skip_frames: usize,

        /// Maximum frames converted
        #[arg(long)]
        max_frames: Option<usize>,
    },

    /// Cut paired digitalized and sketch clips out of matching videos
    Split {
        /// Directory of binarized videos
        #[arg(value_name = "BINARIZED")]
        binarized_dir: PathBuf,

        /// Directory of sketch videos
        #[arg(value_name = "SKETCHES")]
        sketch_dir: PathBuf,

        /// Output directory, receives `digitalized/<id>` and `sketch/<id>`
        #[arg(short, long)]
        output: PathBuf,

        /// Name prefix of binarized videos
        #[arg(long, default_value = "")]
        binarized_prefix: String,

        /// Name prefix of sketch videos
        #[arg(long, default_value = "")]
        sketch_prefix: String,

        /// Frames in each sketch clip
        #[arg(long, default_value_t = DEFAULT_SKETCH_LENGTH)]
        sketch_length: usize,

        /// Frames added on each side of the digitalized clip
        #[arg(long, default_value_t = DEFAULT_CLIP_EXTRA)]
        extra: usize,

        /// Neutral frames before and after each clip
        #[arg(long, default_value_t = DEFAULT_CLIP_PADDING)]
        padding: usize,

        /// Random seed for reproducible windows
        #[arg(long, default_value_t = DEFAULT_SEED)]
        seed: u64,
    },

    /// Draw pattern codes as PNG images
    Render {
        /// Pattern codes to draw
        #[arg(value_name = "CODE", required = true)]
        codes: Vec<PatternCode>,

        /// Window geometry
        #[command(flatten)]
        window: WindowArgs,

        /// Pixels per pattern cell
        #[arg(long, default_value_t = DEFAULT_RENDER_SCALE)]
        scale: u32,

        /// Output directory, receives `pattern_<code>.png`
        #[arg(short, long)]
        output: PathBuf,
    },
}

// Yields frames until the first read error, which is stored in `failure`
fn frames_until_error<'a, I>(
    frames: I,
    failure: &'a mut Option<PatternError>,
) -> impl Iterator<Item = Array2<u8>> + 'a
where
    I: Iterator<Item = Result<Array2<u8>>> + 'a,
{
    frames.map_while(move |frame| match frame {
        Ok(frame) => Some(frame),
        Err(error) => {
            *failure = Some(error);
            None
        }
    })
}

fn check_read(failure: Option<PatternError>) -> Result<()> {
    failure.map_or(Ok(()), Err)
}

fn display_name(path: &Path) -> String {
    path.file_name()
        .unwrap_or_default()
        .to_string_lossy()
        .to_string()
}

/// Runs subcommands with progress tracking
pub struct CommandRunner {
    cli: Cli,
    progress_manager: Option<ProgressManager>,
}

impl CommandRunner {
    /// Create a runner for the parsed arguments
    pub fn new(cli: Cli) -> Self {
        let progress_manager = cli.should_show_progress().then(ProgressManager::new);

        Self {
            cli,
            progress_manager,
        }
    }

    /// Run the selected subcommand
    ///
    /// # Errors
    ///
    /// Returns the first configuration, data or I/O error encountered.
    pub fn run(&mut self) -> Result<()> {
        let result = match &self.cli.command {
            Command::Count {
                videos,
                output,
                window,
                skip_frames,
                max_frames,
            } => {
                let shape = window.shape()?;
                Self::count(
                    &mut self.progress_manager,
                    videos,
                    output,
                    shape,
                    *skip_frames,
                    *max_frames,
                )
            }
            Command::Select {
                table,
                kind,
                p,
                window,
                strategy,
                max_bandwidth,
                max_count,
                output,
                catalog,
                velocity,
            } => {
                let shape = window.shape()?;
                let limits = SelectionLimits::new(*max_bandwidth, *max_count)?.with_shape(shape);
                let mut patterns = match kind {
                    TableKind::Measured => import_measured(table, shape)?,
                    TableKind::Estimated => import_estimated(table, *p, Some(shape))?,
                };
                Self::select(
                    &mut patterns,
                    *strategy,
                    &limits,
                    output,
                    catalog.as_deref(),
                    *velocity,
                )
            }
            Command::Sketch {
                input,
                patterns,
                output,
                window,
                max_frames,
                gif,
            } => {
                let config = SketchConfig::new(window.shape()?).with_max_frames(*max_frames);
                let output = output
                    .clone()
                    .unwrap_or_else(|| Self::sketch_output_path(input));
                Self::sketch(
                    &mut self.progress_manager,
                    input,
                    patterns,
                    &output,
                    config,
                    gif.as_deref(),
                )
            }
            Command::Binarize {
                input,
                output,
                adaptive,
                block,
                c,
                skip_frames,
                max_frames,
            } => {
                let threshold = if *adaptive {
                    Threshold::Adaptive {
                        block: *block,
                        c: *c,
                    }
                } else {
                    Threshold::Median
                };
                threshold.validate()?;
                Self::binarize(
                    &mut self.progress_manager,
                    input,
                    output,
                    threshold,
                    *skip_frames,
                    *max_frames,
                )
            }
            Command::Split {
                binarized_dir,
                sketch_dir,
                output,
                binarized_prefix,
                sketch_prefix,
                sketch_length,
                extra,
                padding,
                seed,
            } => {
                let config = ClipConfig {
                    sketch_length: *sketch_length,
                    extra: *extra,
                    padding: *padding,
                    seed: *seed,
                };
                config.validate()?;
                Self::split(
                    &mut self.progress_manager,
                    binarized_dir,
                    sketch_dir,
                    output,
                    (binarized_prefix.as_str(), sketch_prefix.as_str()),
                    &config,
                )
            }
            Command::Render {
                codes,
                window,
                scale,
                output,
            } => {
                let shape = window.shape()?;
                for &code in codes {
                    let path = output.join(format!("pattern_{code}.png"));
                    save_pattern_png(code, shape, *scale, &path)?;
                    tracing::info!(code, path = %path.display(), "pattern rendered");
                }
                Ok(())
            }
        };

        if let Some(ref pm) = self.progress_manager {
            pm.finish();
        }

        result
    }

    fn count(
        progress: &mut Option<ProgressManager>,
        videos: &[PathBuf],
        output: &Path,
        shape: WindowShape,
        skip_frames: usize,
        max_frames: Option<usize>,
    ) -> Result<()> {
        if let Some(pm) = progress.as_mut() {
            pm.initialize(videos.len());
        }

        let mut counter = PatternCounter::new(shape);
        for (index, video) in videos.iter().enumerate() {
            let reader = FrameReader::open(video)?;
            let expected = reader
                .frame_count()
                .saturating_sub(skip_frames)
                .min(max_frames.unwrap_or(usize::MAX));
            if let Some(pm) = progress.as_mut() {
                pm.start_video(index, &display_name(video), expected);
            }

            let mut failure = None;
            let mut done: usize = 0;
            let frames = frames_until_error(reader, &mut failure).inspect(|_| {
                done += 1;
                if let Some(pm) = progress.as_mut() {
                    pm.update_frames(index, done.saturating_sub(skip_frames));
                }
            });
            let tally = counter.observe_video(frames, skip_frames, max_frames)?;
            check_read(failure)?;

            if let Some(pm) = progress.as_mut() {
                pm.complete_video(index);
            }
            tracing::debug!(
                video = %video.display(),
                skipped = tally.frames_skipped,
                processed = tally.frames_processed,
                "video counted"
            );
        }

        let windows = counter.total();
        let catalog = counter.into_catalog()?;
        export_catalog(&catalog, output)?;

        tracing::info!(
            windows,
            patterns = catalog.len(),
            output = %output.display(),
            "pattern table written"
        );
        Ok(())
    }

    // Allow print for the selection report
    #[allow(clippy::print_stdout)]
    fn select(
        catalog: &mut PatternCatalog,
        strategy: SelectionStrategy,
        limits: &SelectionLimits,
        output: &Path,
        catalog_output: Option<&Path>,
        velocity: bool,
    ) -> Result<()> {
        if velocity {
            add_velocity(catalog, true)?;
        }

        let outcome = select(catalog, strategy, limits)?;

        export_pattern_values(catalog, true, output)?;
        if let Some(path) = catalog_output {
            export_catalog(catalog, path)?;
        }

        println!("strategy: {strategy}");
        println!("{}", catalog.summary(false));
        println!("{}", catalog.summary(true));
        println!("skipped patterns: {}", outcome.skipped);
        Ok(())
    }

    // Allow print for the sketch report
    #[allow(clippy::print_stdout)]
    fn sketch(
        progress: &mut Option<ProgressManager>,
        input: &Path,
        patterns: &Path,
        output: &Path,
        config: SketchConfig,
        gif: Option<&Path>,
    ) -> Result<()> {
        let allowed = import_pattern_values(patterns)?;
        let max_code = config.shape.max_code();
        let unusable = allowed.iter().filter(|&&code| code > max_code).count();
        if unusable > 0 {
            tracing::warn!(
                unusable,
                "pattern values do not fit the window and can never match"
            );
        }
        let matcher = SketchMatcher::new(config, allowed)?;

        let reader = FrameReader::open(input)?.with_max_frames(config.max_frames);
        if let Some(pm) = progress.as_mut() {
            pm.initialize(1);
            pm.start_video(0, &display_name(input), reader.frame_count());
        }

        let mut writer = FrameWriter::create(output)?;
        let mut preview = Vec::new();
        let mut failure = None;
        let stats = matcher.process_stream(frames_until_error(reader, &mut failure), |frame| {
            writer.write(&frame)?;
            if let Some(pm) = progress.as_mut() {
                pm.update_frames(0, writer.written());
            }
            if gif.is_some() {
                preview.push(frame);
            }
            Ok(())
        })?;
        check_read(failure)?;

        if let Some(path) = gif {
            save_gif(&preview, path, GIF_FRAME_DELAY_MS)?;
        }
        if let Some(pm) = progress.as_mut() {
            pm.complete_video(0);
        }

        tracing::info!(
            frames = writer.written(),
            output = %output.display(),
            "sketch written"
        );
        println!("{stats}");
        Ok(())
    }

    fn binarize(
        progress: &mut Option<ProgressManager>,
        input: &Path,
        output: &Path,
        threshold: Threshold,
        skip_frames: usize,
        max_frames: Option<usize>,
    ) -> Result<()> {
        let reader = FrameReader::open(input)?;
        let expected = reader
            .frame_count()
            .saturating_sub(skip_frames)
            .min(max_frames.unwrap_or(usize::MAX));

        if let Some(path) = reader.paths().first() {
            let first = load_frame(path)?;
            let (height, width) = first.dim();
            if height > width {
                tracing::warn!(
                    video = %input.display(),
                    height,
                    width,
                    "portrait video rejected"
                );
                return Err(invalid_source(&format!(
                    "{}: portrait frames ({height}x{width}) are not supported",
                    input.display()
                )));
            }
        }

        if let Some(pm) = progress.as_mut() {
            pm.initialize(1);
            pm.start_video(0, &display_name(input), expected);
        }

        let mut writer = FrameWriter::create(output)?;
        let frames = reader
            .skip(skip_frames)
            .take(max_frames.unwrap_or(usize::MAX));
        for frame in frames {
            writer.write(&binarize(&frame?, threshold)?)?;
            if let Some(pm) = progress.as_mut() {
                pm.update_frames(0, writer.written());
            }
        }

        if let Some(pm) = progress.as_mut() {
            pm.complete_video(0);
        }
        tracing::info!(
            frames = writer.written(),
            output = %output.display(),
            "binarized video written"
        );
        Ok(())
    }

    fn split(
        progress: &mut Option<ProgressManager>,
        binarized_dir: &Path,
        sketch_dir: &Path,
        output: &Path,
        (binarized_prefix, sketch_prefix): (&str, &str),
        config: &ClipConfig,
    ) -> Result<()> {
        let ids = pair_clip_ids(
            clip_ids(binarized_dir, binarized_prefix)?,
            clip_ids(sketch_dir, sketch_prefix)?,
        )?;
        if ids.is_empty() {
            return Err(invalid_source(&format!(
                "no video named '{binarized_prefix}<id>' in {}",
                binarized_dir.display()
            )));
        }

        if let Some(pm) = progress.as_mut() {
            pm.initialize(ids.len());
        }

        let mut rng = config.rng();
        for (index, id) in ids.iter().enumerate() {
            let binarized =
                FrameReader::open(&binarized_dir.join(format!("{binarized_prefix}{id}")))?
                    .read_all()?;
            let sketch =
                FrameReader::open(&sketch_dir.join(format!("{sketch_prefix}{id}")))?.read_all()?;

            let frame_count = binarized.len().min(sketch.len());
            if let Some(pm) = progress.as_mut() {
                pm.start_video(index, id, frame_count);
            }

            let window = ClipWindow::choose(frame_count, config, &mut rng)?;
            let clip = split_clip(&binarized, &sketch, &window, config.padding)?;

            let mut digitalized_writer = FrameWriter::create(&output.join("digitalized").join(id))?;
            for frame in &clip.digitalized {
                digitalized_writer.write(frame)?;
            }
            let mut sketch_writer = FrameWriter::create(&output.join("sketch").join(id))?;
            for frame in &clip.sketch {
                sketch_writer.write(frame)?;
            }

            if let Some(pm) = progress.as_mut() {
                pm.complete_video(index);
            }
            tracing::info!(id = %id, start = window.sketch_start, "clip pair written");
        }

        Ok(())
    }

    /// Default sketch output directory for a video directory
    pub fn sketch_output_path(input: &Path) -> PathBuf {
        let name = format!("{}{SKETCH_SUFFIX}", display_name(input));

        if let Some(parent) = input.parent() {
            parent.join(name)
        } else {
            PathBuf::from(name)
        }
    }
}
