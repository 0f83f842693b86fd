use std::path::PathBuf;

use clap::Parser;

use bitbybit_site::recolor::effects::{convert, Effect};
use bitbybit_site::theme::Theme;

/// Convert an image to the Bit by Bit site theme.
#[derive(Parser, Debug)]
#[command(version, about)]
struct Args {
    /// Path to input image
    input: PathBuf,

    /// Path to output image
    #[arg(short, long, default_value = "theme_output.png")]
    output: PathBuf,

    /// Dark (black to blue) or light (blue to beige)
    #[arg(short, long, value_enum, default_value_t = Theme::Dark)]
    mode: Theme,

    /// Filled duotone, edges only, or shaded edges
    #[arg(short, long, value_enum, default_value_t = Effect::Standard)]
    effect: Effect,

    /// Invert luminosity before processing (light artwork to dark)
    #[arg(short, long)]
    invert: bool,
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let args = Args::parse();

    log::info!("Loading image: {}", args.input.display());
    let img = match image::open(&args.input) {
        Ok(img) => img,
        Err(e) => {
            log::error!("Error opening {}: {}", args.input.display(), e);
            std::process::exit(1);
        }
    };

    let palette = args.mode.palette();
    log::info!(
        "Applying {} theme ({} to {}) with {:?} effect",
        args.mode,
        palette.dark_point.to_hex(),
        palette.light_point.to_hex(),
        args.effect
    );
    let result = convert(&img, args.mode, args.effect, args.invert);

    if let Err(e) = result.save(&args.output) {
        log::error!("Failed to save {}: {}", args.output.display(), e);
        std::process::exit(1);
    }
    log::info!("Saved to {}", args.output.display());
}
