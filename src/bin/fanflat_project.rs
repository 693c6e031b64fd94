use std::error::Error;
use std::path::PathBuf;
use std::time::Duration;

use clap::Parser;
use indicatif::{ProgressBar, ProgressStyle};

use fanflat::config::read_config_file;
use fanflat::io::{read_image, write_sinogram};
use fanflat::utils::{group_digits, timing::Progress};
use fanflat::{FanFlatLineProjector, Image};

// ----------------------------------- CLI -----------------------------------
#[derive(clap::Parser, Debug, Clone)]
#[clap(name = "fanflat_project", about = "Forward-project an image with a fan-flat line kernel")]
pub struct Cli {

    /// TOML file describing the projection geometry and the pixel grid
    pub config: PathBuf,

    /// Raw f32 image to project. An image of ones if absent.
    #[clap(short, long)]
    pub image: Option<PathBuf>,

    /// Where to write the sinogram, as raw f32, one row per projection
    #[clap(short, long, default_value = "sinogram.raw")]
    pub output: PathBuf,

    /// Maximum number of rayon threads
    #[clap(short = 'j', long)]
    pub threads: Option<usize>,
}

fn main() -> Result<(), Box<dyn Error>> {
    env_logger::init();
    let Cli { config, image, output, threads } = Cli::parse();
    let mut progress = Progress::new();

    progress.start(&format!("Reading config {}", config.display()))?;
    let settings = read_config_file(&config)?;
    let projection = settings.projection_geometry()?;
    let volume = settings.volume_geometry()?;
    progress.done();

    let image = match image {
        Some(path) => {
            progress.start(&format!("Reading image {}", path.display()))?;
            let image = read_image(&path, volume)?;
            progress.done();
            image
        }
        None => Image::ones(volume),
    };

    let projector = FanFlatLineProjector::new(&projection, &volume)?;
    let n_rays = projection.n_projections() * projection.n_detectors();
    println!("Projecting {} pixels along {} rays", group_digits(volume.n_pixels()), group_digits(n_rays));

    let mut pool = rayon::ThreadPoolBuilder::new();
    if let Some(n) = threads { pool = pool.num_threads(n) }
    let pool = pool.build()?;

    let spinner = ProgressBar::new_spinner().with_message("Forward projection");
    spinner.set_style(ProgressStyle::default_spinner().template("{spinner} {msg} [{elapsed_precise}]")?);
    spinner.enable_steady_tick(Duration::from_millis(100));
    let sinogram = pool.install(|| projector.forward_project(&image))?;
    spinner.finish_and_clear();
    progress.done_with_message("Forward projection");

    progress.start(&format!("Writing {}x{} sinogram to {}",
                            sinogram.n_projections(), sinogram.n_detectors(), output.display()))?;
    write_sinogram(&sinogram, &output)?;
    progress.done();
    Ok(())
}
