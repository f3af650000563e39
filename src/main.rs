//! Weldpath CLI
//!
//! Generates deposition toolpaths as G-code and inspects existing programs.

use std::io::{self, Write};
use std::path::{Path, PathBuf};

use anyhow::{bail, Context};
use clap::{Parser, Subcommand, ValueEnum};
use tracing::{debug, info};
use weldpath::{
    assemble, init_logging, parse_file, play, AxisSwapRule, BuildConfig, CoordinateTable,
    FrameRecorder, GcodeEncoder, ParseMode, PatternType, RenderQuality, RenderSettings,
    TextFrameSink, ToolpathStats, BUILD_DATE, VERSION,
};

#[derive(Debug, Clone, Copy, ValueEnum)]
enum SwapRuleArg {
    /// Every layer uses the base axes
    Never,
    /// Alternate axes on every layer (cross-hatch)
    EveryLayer,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum ParseOutput {
    /// Line, point and distance summary
    Summary,
    /// Coordinate table as JSON
    Json,
    /// One `line_index,x,y,z` row per point
    Csv,
}

#[derive(Parser)]
#[command(name = "weldpath")]
#[command(version, about = "Deposition toolpaths for layer-by-layer additive manufacturing", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Generate a G-code program from a build config and/or flags
    Generate {
        /// Build config file (.json or .toml); flags override its values
        #[arg(long)]
        config: Option<PathBuf>,

        /// Infill pattern (zigzag or raster)
        #[arg(long)]
        pattern: Option<PatternType>,

        /// Distance between adjacent weld lines (mm)
        #[arg(long)]
        beam_width: Option<f64>,

        /// Edge of the square region (mm)
        #[arg(long)]
        side_length: Option<f64>,

        /// Number of layers
        #[arg(long)]
        layers: Option<u32>,

        /// Z added per layer (mm)
        #[arg(long)]
        z_increment: Option<f64>,

        /// Axis swap rule between layers
        #[arg(long, value_enum)]
        swap_rule: Option<SwapRuleArg>,

        /// Swap axes after every block of N layers (overrides --swap-rule)
        #[arg(long)]
        swap_every: Option<u32>,

        /// Output G-code file
        #[arg(short, long)]
        output: PathBuf,
    },

    /// Parse a G-code program and print its coordinate table
    Parse {
        /// G-code file to read
        file: PathBuf,

        /// Reject motion commands without all three axes
        #[arg(long)]
        strict: bool,

        /// Output format
        #[arg(long, value_enum, default_value = "summary")]
        format: ParseOutput,
    },

    /// Print the frame plan a renderer would receive for a G-code program
    Frames {
        /// G-code file to read
        file: PathBuf,

        /// Build config file whose `[render]` section supplies the defaults
        #[arg(long)]
        config: Option<PathBuf>,

        /// Frames per second (overrides the config)
        #[arg(long)]
        fps: Option<f64>,

        /// Render quality: draft, standard or high (overrides the config)
        #[arg(long)]
        quality: Option<RenderQuality>,

        /// Print every frame instead of a summary
        #[arg(long)]
        list: bool,
    },

    /// Write the default build config to a file
    InitConfig {
        /// Destination (.json or .toml)
        file: PathBuf,

        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },
}

fn main() -> anyhow::Result<()> {
    init_logging()?;
    debug!("weldpath {} (built {})", VERSION, BUILD_DATE);

    let cli = Cli::parse();
    match cli.command {
        Command::Generate {
            config,
            pattern,
            beam_width,
            side_length,
            layers,
            z_increment,
            swap_rule,
            swap_every,
            output,
        } => {
            let mut build_config = match &config {
                Some(path) => BuildConfig::load_from_file(path)
                    .with_context(|| format!("Failed to load config {}", path.display()))?,
                None => BuildConfig::default(),
            };
            if let Some(pattern) = pattern {
                build_config.layer.pattern = pattern;
            }
            if let Some(beam_width) = beam_width {
                build_config.layer.beam_width = beam_width;
            }
            if let Some(side_length) = side_length {
                build_config.layer.side_length = side_length;
            }
            if let Some(layers) = layers {
                build_config.build.layer_count = layers;
            }
            if let Some(z_increment) = z_increment {
                build_config.build.z_increment = z_increment;
            }
            if let Some(rule) = swap_rule {
                build_config.build.swap_rule = match rule {
                    SwapRuleArg::Never => AxisSwapRule::Never,
                    SwapRuleArg::EveryLayer => AxisSwapRule::EveryLayer,
                };
            }
            if let Some(n) = swap_every {
                build_config.build.swap_rule = AxisSwapRule::EveryN { n };
            }
            generate(&build_config, &output)
        }
        Command::Parse {
            file,
            strict,
            format,
        } => {
            let mode = if strict {
                ParseMode::Strict
            } else {
                ParseMode::Lenient
            };
            let table = parse_file(&file, mode)
                .with_context(|| format!("Failed to parse {}", file.display()))?;
            print_table(&table, format)
        }
        Command::Frames {
            file,
            config,
            fps,
            quality,
            list,
        } => {
            let mut settings = match &config {
                Some(path) => BuildConfig::load_from_file(path)
                    .with_context(|| format!("Failed to load config {}", path.display()))?
                    .render_settings(),
                None => RenderSettings::default(),
            };
            if let Some(fps) = fps {
                settings.frame_rate = fps;
            }
            if let Some(quality) = quality {
                settings.quality = quality;
            }

            let table = parse_file(&file, ParseMode::Lenient)
                .with_context(|| format!("Failed to parse {}", file.display()))?;
            if list {
                let stdout = io::stdout();
                let mut sink = TextFrameSink::new(stdout.lock());
                play(&table, &mut sink, &settings)?;
            } else {
                let mut recorder = FrameRecorder::new();
                let summary = play(&table, &mut recorder, &settings)?;
                println!(
                    "{} frame(s), {:.2}s at {} fps ({} quality)",
                    summary.frames, summary.duration, settings.frame_rate, settings.quality
                );
            }
            Ok(())
        }
        Command::InitConfig { file, force } => {
            if file.exists() && !force {
                bail!(
                    "{} already exists (use --force to overwrite)",
                    file.display()
                );
            }
            BuildConfig::default()
                .save_to_file(&file)
                .with_context(|| format!("Failed to write config {}", file.display()))?;
            println!("Wrote default build config to {}", file.display());
            Ok(())
        }
    }
}

fn generate(config: &BuildConfig, output: &Path) -> anyhow::Result<()> {
    config.validate().context("Invalid build configuration")?;

    let plan = config.to_plan()?;
    let build = assemble(&plan, config.build.start_line_index)?;

    let mut options = config.to_encoder_options()?;
    options.header.insert(
        0,
        format!(
            "weldpath {} {} beam={} side={} layers={}",
            VERSION,
            plan.base.pattern,
            plan.base.beam_width,
            plan.base.side_length,
            plan.layer_count
        ),
    );
    GcodeEncoder::with_options(options)
        .write_file(output, &build.table)
        .with_context(|| format!("Failed to write {}", output.display()))?;

    let stats = ToolpathStats::from_table(&build.table);
    info!(
        "Generated {} weld line(s) in {} layer(s), deposition {:.3} mm, travel {:.3} mm",
        stats.line_count,
        build.layers.len(),
        stats.deposition_length,
        stats.travel_length
    );
    println!(
        "Wrote {} weld line(s) (indices {}..={}) to {}",
        stats.line_count,
        config.build.start_line_index + 1,
        build.last_line_index,
        output.display()
    );
    Ok(())
}

fn print_table(table: &CoordinateTable, format: ParseOutput) -> anyhow::Result<()> {
    let stdout = io::stdout();
    let mut out = stdout.lock();
    match format {
        ParseOutput::Summary => {
            let stats = ToolpathStats::from_table(table);
            writeln!(out, "weld lines:        {}", stats.line_count)?;
            writeln!(out, "points:            {}", stats.point_count)?;
            writeln!(out, "degenerate lines:  {}", stats.degenerate_lines)?;
            writeln!(out, "deposition length: {:.3}", stats.deposition_length)?;
            writeln!(out, "travel length:     {:.3}", stats.travel_length)?;
            if let Some(bounds) = stats.bounds {
                writeln!(
                    out,
                    "bounds:            ({:.3}, {:.3}, {:.3}) .. ({:.3}, {:.3}, {:.3})",
                    bounds.min.x, bounds.min.y, bounds.min.z, bounds.max.x, bounds.max.y, bounds.max.z
                )?;
            }
        }
        ParseOutput::Json => {
            serde_json::to_writer_pretty(&mut out, table)?;
            writeln!(out)?;
        }
        ParseOutput::Csv => {
            writeln!(out, "line_index,x,y,z")?;
            for row in table {
                writeln!(
                    out,
                    "{},{},{},{}",
                    row.line_index, row.point.x, row.point.y, row.point.z
                )?;
            }
        }
    }
    Ok(())
}
