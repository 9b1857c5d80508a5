use clap::{Parser, Subcommand};
use cropper::aspect::{AspectMode, ContentAspect};
use cropper::config::{self, EditorConfig};
use cropper::grid::CellPolicy;
use cropper::imaging::{
    EffectKind, ImageBackend, ImagingError, RustBackend, is_supported_input,
};
use cropper::layout::{BannerRatios, LayoutRequest, solve};
use cropper::output;
use cropper::session::Session;
use cropper::types::{Side, Size, SourceRect};
use std::path::PathBuf;
use std::time::Instant;
use tracing_subscriber::EnvFilter;

fn version_string() -> &'static str {
    let on_tag = env!("CROPPER_ON_RELEASE_TAG");
    if on_tag == "true" {
        env!("CARGO_PKG_VERSION")
    } else {
        let hash = env!("CROPPER_GIT_HASH");
        if hash.is_empty() {
            "dev@unknown"
        } else {
            // Called exactly once at startup
            Box::leak(format!("dev@{hash}").into_boxed_str())
        }
    }
}

#[derive(Parser)]
#[command(name = "cropper")]
#[command(about = "Crop, frame and collage images with a faithful preview")]
#[command(long_about = "\
Crop, frame and collage images with a faithful preview

Every command drives the same editing session an interactive shell would:
the container size fixes the on-screen layout, and saves reproduce it at
source resolution.

  cropper crop photo.jpg --rect 100,100,900,700 --aspect 4:3
  cropper crop photo.jpg --effect blur --strength 20 --banner top
  cropper collage a.jpg b.jpg c.jpg --columns 2 --policy fit
  cropper layout --container 800x600 --banner top=0.25 --aspect 1:1

Outputs are written next to the first input as <stem>_cropped<ext> or
<stem>_collage<ext>, numbered _1, _2, ... instead of overwriting.

Run 'cropper gen-config' to generate a documented config.toml.")]
#[command(version = version_string())]
struct Cli {
    /// Editor config file (missing file = stock defaults)
    #[arg(long, default_value = "cropper.toml", global = true)]
    config: PathBuf,

    /// Log state transitions to stderr
    #[arg(long, short, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

/// On-screen framing shared by commands that render.
#[derive(clap::Args, Clone)]
struct ViewArgs {
    /// Container the layout is solved in, WIDTHxHEIGHT
    #[arg(long, default_value = "1200x800", value_parser = parse_size)]
    container: Size,

    /// Aspect mode: free, 1:1, 4:3, 3:4, 16:9, 9:16, fit
    #[arg(long)]
    aspect: Option<AspectMode>,

    /// Enable a banner on a side (repeatable)
    #[arg(long = "banner")]
    banners: Vec<Side>,

    /// Fill a banner with an image, SIDE=PATH (repeatable)
    #[arg(long = "banner-image", value_parser = parse_side_path)]
    banner_images: Vec<(Side, PathBuf)>,

    /// No gap between banners and content
    #[arg(long)]
    no_banner_gap: bool,
}

#[derive(clap::Args)]
struct CropArgs {
    image: PathBuf,

    /// Crop rectangle in source pixels, X0,Y0,X1,Y1
    #[arg(long, value_parser = parse_rect)]
    rect: Option<SourceRect>,

    /// Effect outside the crop: none, blur, pixelate
    #[arg(long)]
    effect: Option<EffectKind>,

    /// Effect strength (0-50)
    #[arg(long)]
    strength: Option<u32>,

    /// Keep the effect out of the saved file
    #[arg(long)]
    preview_only: bool,

    #[command(flatten)]
    view: ViewArgs,
}

#[derive(clap::Args)]
struct CollageArgs {
    #[arg(required = true, num_args = 2..)]
    images: Vec<PathBuf>,

    #[arg(long)]
    columns: Option<usize>,

    /// Gap between cells, in display pixels
    #[arg(long)]
    gap: Option<u32>,

    /// Cell policy: uniform or fit
    #[arg(long)]
    policy: Option<CellPolicy>,

    /// Background colour, #rgb or #rrggbb
    #[arg(long)]
    background: Option<String>,

    #[command(flatten)]
    view: ViewArgs,
}

#[derive(clap::Args)]
struct LayoutArgs {
    /// Container, WIDTHxHEIGHT
    #[arg(long, default_value = "800x600", value_parser = parse_size)]
    container: Size,

    /// Banner with its ratio, SIDE=RATIO (repeatable)
    #[arg(long = "banner", value_parser = parse_side_ratio)]
    banners: Vec<(Side, f64)>,

    /// Content aspect mode
    #[arg(long, default_value = "free")]
    aspect: AspectMode,

    /// Natural content ratio used by the fit mode
    #[arg(long, default_value_t = 1.0)]
    ratio: f64,

    #[arg(long, default_value_t = 0)]
    gap: u32,

    #[arg(long)]
    no_banner_gap: bool,

    /// Print JSON instead of text
    #[arg(long)]
    json: bool,
}

#[derive(Subcommand)]
enum Command {
    /// Crop one image and save it next to the source
    Crop(CropArgs),
    /// Assemble several images into one collage
    Collage(CollageArgs),
    /// Solve a banner/content layout and print the regions
    Layout(LayoutArgs),
    /// Print a stock config.toml with all options documented
    GenConfig,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match cli.command {
        Command::Crop(args) => {
            let config = config::load_config(&cli.config)?;
            ensure_supported(std::slice::from_ref(&args.image))?;
            let backend = RustBackend::new();
            let mut session = new_session(config, &args.view);
            session.load_image(&backend, &args.image)?;
            apply_view(&mut session, &backend, &args.view)?;
            if let Some(rect) = args.rect {
                session.set_crop(rect)?;
            }
            let now = Instant::now();
            if let Some(kind) = args.effect {
                session.set_effect_kind(kind, now);
            }
            if let Some(strength) = args.strength {
                session.set_effect_strength(strength, now);
            }
            session.set_effect_for_save(!args.preview_only);

            let dimensions = session
                .image()
                .map(|img| (img.width(), img.height()))
                .unwrap_or_default();
            let saved = session.save(&backend, now)?;
            output::print_crop_result(
                &args.image,
                dimensions,
                session.crop_rect().as_ref(),
                session.effect(),
                saved.as_deref(),
            );
        }
        Command::Collage(args) => {
            let config = config::load_config(&cli.config)?;
            ensure_supported(&args.images)?;
            let backend = RustBackend::new();
            let mut session = new_session(config, &args.view);
            session.load_images(&backend, &args.images)?;
            apply_view(&mut session, &backend, &args.view)?;
            if let Some(columns) = args.columns {
                session.set_columns(columns);
            }
            if let Some(gap) = args.gap {
                session.set_grid_gap(gap);
            }
            if let Some(policy) = args.policy {
                session.set_cell_policy(policy);
            }
            if let Some(hex) = &args.background {
                let color = config::parse_hex_color(hex)
                    .ok_or_else(|| format!("invalid background colour '{hex}'"))?;
                session.set_background(color);
            }
            let saved = session.save(&backend, Instant::now())?;
            if let Some(grid) = session.grid() {
                output::print_collage_result(grid, saved.as_deref());
            }
        }
        Command::Layout(args) => {
            let mut ratios = BannerRatios::none();
            for (side, ratio) in &args.banners {
                ratios.set(*side, Some(*ratio));
            }
            let request = LayoutRequest::new(
                args.container.width,
                args.container.height,
                ContentAspect::for_mode(args.aspect, args.ratio),
            )
            .with_banners(ratios)
            .with_gap(args.gap, !args.no_banner_gap);
            let layout = solve(&request);
            if args.json {
                println!("{}", serde_json::to_string_pretty(&layout)?);
            } else {
                output::print_layout(&layout, args.container);
            }
        }
        Command::GenConfig => {
            print!("{}", config::stock_config_toml());
        }
    }

    Ok(())
}

/// `RUST_LOG` decides unless `--verbose` asks for everything.
fn init_tracing(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn new_session(config: EditorConfig, view: &ViewArgs) -> Session {
    let mut session = Session::new(config);
    session.set_container(view.container.width, view.container.height);
    session
}

fn apply_view(
    session: &mut Session,
    backend: &dyn ImageBackend,
    view: &ViewArgs,
) -> Result<(), Box<dyn std::error::Error>> {
    if let Some(mode) = view.aspect {
        session.select_aspect(mode);
    }
    for side in &view.banners {
        let on = session.banners().is_some_and(|b| b.slot(*side).is_enabled());
        if !on {
            session.toggle_banner(*side);
        }
    }
    for (side, path) in &view.banner_images {
        ensure_supported(std::slice::from_ref(path))?;
        session.set_banner_image(backend, *side, path)?;
        let on = session.banners().is_some_and(|b| b.slot(*side).is_enabled());
        if !on {
            session.toggle_banner(*side);
        }
    }
    if view.no_banner_gap {
        session.toggle_banner_gap();
    }
    Ok(())
}

/// Reject inputs without a compiled-in decoder before anything is loaded.
fn ensure_supported(paths: &[PathBuf]) -> Result<(), ImagingError> {
    match paths.iter().find(|p| !is_supported_input(p)) {
        Some(path) => Err(ImagingError::UnsupportedFormat(path.display().to_string())),
        None => Ok(()),
    }
}

fn parse_size(s: &str) -> Result<Size, String> {
    let (w, h) = s
        .split_once(['x', 'X'])
        .ok_or_else(|| format!("expected WIDTHxHEIGHT, got '{s}'"))?;
    let w: f64 = w.trim().parse().map_err(|_| format!("bad width in '{s}'"))?;
    let h: f64 = h.trim().parse().map_err(|_| format!("bad height in '{s}'"))?;
    Ok(Size::new(w, h))
}

fn parse_rect(s: &str) -> Result<SourceRect, String> {
    let values = s
        .split(',')
        .map(|v| v.trim().parse::<f64>())
        .collect::<Result<Vec<_>, _>>()
        .map_err(|_| format!("expected X0,Y0,X1,Y1, got '{s}'"))?;
    match values.as_slice() {
        [x0, y0, x1, y1] => Ok(SourceRect::new(*x0, *y0, *x1, *y1)),
        _ => Err(format!("expected four numbers, got '{s}'")),
    }
}

fn parse_side_ratio(s: &str) -> Result<(Side, f64), String> {
    let (side, ratio) = match s.split_once('=') {
        Some((side, ratio)) => (
            side,
            ratio
                .trim()
                .parse::<f64>()
                .map_err(|_| format!("bad ratio in '{s}'"))?,
        ),
        None => (s, cropper::banner::DEFAULT_BANNER_RATIO),
    };
    Ok((side.trim().parse()?, ratio))
}

fn parse_side_path(s: &str) -> Result<(Side, PathBuf), String> {
    let (side, path) = s
        .split_once('=')
        .ok_or_else(|| format!("expected SIDE=PATH, got '{s}'"))?;
    Ok((side.trim().parse()?, PathBuf::from(path)))
}
