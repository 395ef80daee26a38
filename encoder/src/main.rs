use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use indicatif::ParallelProgressIterator;
use log::info;
use rayon::iter::{IntoParallelIterator, ParallelIterator};
use scr_ani::{
    DirSink, Encoder, MemorySink, Params, Screen, Shape, Sink, Source, Stats, WritePolicy,
};
use std::path::PathBuf;

/// Encodes a directory of frames into a ZX Spectrum screen animation.
#[derive(Parser, Debug)]
#[command(name = "scr-ani", version, arg_required_else_help = true)]
struct Args {
    /// Directory with the frames (`.scr` dumps or 256x192 images), sorted by
    /// file name.
    input: PathBuf,

    /// Where the pages are written to.
    #[arg(short, long, default_value = ".")]
    dir: PathBuf,

    /// Page name prefix; defaults to the input directory's name.
    #[arg(short, long)]
    name: Option<String>,

    #[arg(short, long, value_enum, default_value_t = Ani::Xor)]
    ani: Ani,

    /// Also write every encoded frame as a `.scr` dump.
    #[arg(long)]
    scr: bool,

    /// Colour attribute filling the `.scr` dumps.
    #[arg(
        short = 'c',
        long,
        default_value_t = 0x38,
        value_parser = clap::value_parser!(u8).range(0..=127)
    )]
    attr: u8,

    /// Number of unchanged bytes a run may step over.
    #[arg(long, default_value_t = 2, value_parser = clap::value_parser!(u8).range(0..=7))]
    holes: u8,

    /// Drop runs too short to pay off and retry them on later frames.
    #[arg(long)]
    lossy: bool,

    /// Scan every n-th pixel line per frame.
    #[arg(long, default_value_t = 1, value_parser = clap::value_parser!(u8).range(1..=2))]
    scanline: u8,

    /// Number of frames to skip after every taken one.
    #[arg(short, long, default_value_t = 0)]
    skip: usize,

    /// Don't append the transition back to the first frame.
    #[arg(long)]
    no_loop: bool,

    /// Try every hole tolerance with both shapes and keep the smallest
    /// stream.
    #[arg(long)]
    search: bool,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
enum Ani {
    Xor,
    Direct,
    LinearXor,
    LinearDirect,
}

impl Ani {
    fn shape(self) -> Shape {
        match self {
            Ani::Xor | Ani::Direct => Shape::Vertical,
            Ani::LinearXor | Ani::LinearDirect => Shape::Linear,
        }
    }

    fn write_policy(self) -> WritePolicy {
        match self {
            Ani::Xor | Ani::LinearXor => WritePolicy::Xor,
            Ani::Direct | Ani::LinearDirect => WritePolicy::Direct,
        }
    }
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .format_timestamp(None)
        .format_target(false)
        .init();

    let args = Args::parse();

    let name = match &args.name {
        Some(name) => name.clone(),
        None => args
            .input
            .canonicalize()
            .ok()
            .and_then(|path| path.file_name().map(|name| name.to_string_lossy().into_owned()))
            .unwrap_or_else(|| "ani".into()),
    };

    let source = Source::from_dir(&args.input).context("Couldn't load frames")?;
    let screens: Vec<_> = source.screens().step_by(args.skip + 1).collect();

    info!("loaded {} frames, encoding {}", source.len(), screens.len());

    let mut sink = DirSink::new(&args.dir)?;

    if args.scr {
        for (idx, screen) in screens.iter().enumerate() {
            sink.persist(&format!("{}{:03}.scr", name, idx), &screen.to_scr(args.attr))?;
        }

        info!("exported {} screens", screens.len());
    }

    let (params, stats) = if args.search {
        let params_sets = prepare_params_sets(&args)?;
        let results = perform_encodings(&screens, &name, params_sets);

        let (params, stats, pages) = results
            .into_iter()
            .min_by_key(|(_, stats, _)| stats.bytes)
            .context("No parameters to search through")?;

        pages.replay(&mut sink)?;

        (params, stats)
    } else {
        let params = prepare_params(&args, args.holes, args.ani.shape())?;
        let (stats, _) = perform_encoding(&screens, &name, &params, &mut sink);

        (params, stats)
    };

    info!("{:#?}", params);
    info!("{:#?}", stats);
    info!(
        "encoded {} frames into {} bytes over {} page(s)",
        stats.frames, stats.bytes, stats.pages
    );

    Ok(())
}

fn prepare_params(args: &Args, holes: u8, shape: Shape) -> Result<Params> {
    Ok(Params::new(holes, shape, args.ani.write_policy())?
        .with_lossy(args.lossy)
        .with_scan_stride(args.scanline)?
        .with_loop(!args.no_loop))
}

fn prepare_params_sets(args: &Args) -> Result<Vec<Params>> {
    let mut params_sets = Vec::new();

    for holes in 0..=7 {
        for &shape in &[Shape::Vertical, Shape::Linear] {
            params_sets.push(prepare_params(args, holes, shape)?);
        }
    }

    Ok(params_sets)
}

fn perform_encodings(
    screens: &[&Screen],
    name: &str,
    params_sets: Vec<Params>,
) -> Vec<(Params, Stats, MemorySink)> {
    let len = params_sets.len();

    params_sets
        .into_par_iter()
        .progress_count(len as u64)
        .map(|params| {
            let (stats, sink) = perform_encoding(screens, name, &params, MemorySink::default());

            (params, stats, sink)
        })
        .collect()
}

fn perform_encoding<S: Sink>(
    screens: &[&Screen],
    name: &str,
    params: &Params,
    sink: S,
) -> (Stats, S) {
    let mut encoder = Encoder::new(params, name, sink);

    for screen in screens {
        encoder.add(screen);
    }

    encoder.finish()
}
