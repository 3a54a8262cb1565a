use anyhow::{Context, Result};
use burn::prelude::*;
use clap::{Parser, ValueEnum};
use tracing_subscriber::EnvFilter;
use unet_blocks::{AsppConfig, CbamConfig, DecoderConfig, DecoderV2Config, EncoderConfig, Mode};
use unet_blocks_demos::backend::{demo_device, DemoBackend, BACKEND_NAME};

#[derive(Clone, Copy, Debug, ValueEnum)]
enum DecoderKind {
    /// Upsample, then crop to the skip tensor
    Crop,
    /// Concatenate the skip tensor, then upsample
    Concat,
}

/// Assemble a small U-Net from the blocks and trace a dummy batch through it.
#[derive(Parser, Debug)]
#[command(name = "summary")]
struct Args {
    /// Input channels
    #[arg(long, default_value_t = 2)]
    channels: usize,

    /// Input height
    #[arg(long, default_value_t = 64)]
    height: usize,

    /// Input width
    #[arg(long, default_value_t = 48)]
    width: usize,

    /// Batch size
    #[arg(long, default_value_t = 1)]
    batch: usize,

    /// Channels of the first encoder, doubled at each level
    #[arg(long, default_value_t = 16)]
    base_channels: usize,

    /// Number of encoder/decoder levels
    #[arg(long, default_value_t = 3)]
    depth: usize,

    /// Decoder ordering
    #[arg(long, value_enum, default_value_t = DecoderKind::Crop)]
    decoder: DecoderKind,

    /// Print the module tree of every block
    #[arg(long)]
    print_modules: bool,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let args = Args::parse();
    anyhow::ensure!(args.depth > 0, "depth must be at least 1");
    let device = demo_device();
    tracing::info!(backend = BACKEND_NAME, ?args, "building U-Net");

    let widths: Vec<usize> = std::iter::once(args.channels)
        .chain((0..args.depth).map(|level| args.base_channels << level))
        .collect();
    let deepest = widths[args.depth];

    let encoders = widths
        .windows(2)
        .map(|pair| {
            EncoderConfig::new(pair[0], pair[1])
                .with_stride(2)
                .init::<DemoBackend>(&device)
        })
        .collect::<Result<Vec<_>, _>>()?;
    let aspp = AsppConfig::new(deepest).init::<DemoBackend>(&device)?;
    let cbam = CbamConfig::new(deepest)
        .with_ratio(deepest.min(16))
        .init::<DemoBackend>(&device)?;

    let input = Tensor::<DemoBackend, 4>::random(
        [args.batch, args.channels, args.height, args.width],
        burn::tensor::Distribution::Normal(0.0, 1.0),
        &device,
    );

    let mut skips = Vec::with_capacity(args.depth);
    let mut h = input;
    for (level, encoder) in encoders.iter().enumerate() {
        let (out, skip) = encoder.forward(h, Mode::Inference);
        tracing::info!(level, skip = ?skip.dims(), out = ?out.dims(), "encoder");
        if args.print_modules {
            println!("{encoder}");
        }
        skips.push(skip);
        h = out;
    }

    let h = aspp.forward(h, Mode::Inference);
    tracing::info!(shape = ?h.dims(), params = aspp.num_params(), "aspp");
    let mut h = cbam.forward(h);
    tracing::info!(shape = ?h.dims(), params = cbam.num_params(), "cbam");
    if args.print_modules {
        println!("{aspp}\n{cbam}");
    }

    // Decoder levels run from the deepest back to the input resolution.
    for level in (0..args.depth).rev() {
        let [_, nin, _, _] = h.dims();
        let nout = widths[level].max(args.base_channels / 2);
        h = match args.decoder {
            DecoderKind::Crop => {
                let decoder = DecoderConfig::new(nin, nout).init::<DemoBackend>(&device)?;
                decoder
                    .forward(h, Some(&skips[level]), Mode::Inference)
                    .with_context(|| format!("decoder level {level}"))?
            }
            DecoderKind::Concat => {
                // The deepest level has no skip at its own resolution.
                let skip = (level + 1 < args.depth).then(|| &skips[level + 1]);
                let skip_channels = skip.map_or(0, |s| s.dims()[1]);
                let decoder = DecoderV2Config::new(nin + skip_channels, nout)
                    .init::<DemoBackend>(&device)?;
                decoder
                    .forward(h, skip, Mode::Inference)
                    .with_context(|| format!("decoder v2 level {level}"))?
            }
        };
        tracing::info!(level, shape = ?h.dims(), nin, "decoder");
    }

    println!(
        "[{}, {}, {}, {}] -> {:?} on {BACKEND_NAME}",
        args.batch,
        args.channels,
        args.height,
        args.width,
        h.dims()
    );

    Ok(())
}
