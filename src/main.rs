use bitbybit_site::config::SiteConfig;
use bitbybit_site::thumbs::{CacheBuilder, HttpFetcher};

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let config = match SiteConfig::load_default() {
        Ok(config) => config,
        Err(e) => {
            log::error!("{}", e);
            std::process::exit(1);
        }
    };
    let thumbnails = &config.thumbnails;

    log::info!("Resource thumbnail cache builder");
    let result = HttpFetcher::new(thumbnails).and_then(|fetcher| {
        let mut builder = CacheBuilder::open(thumbnails, &fetcher)?;
        builder.run()
    });

    match result {
        Ok(summary) => {
            log::info!(
                "Downloaded {}, skipped {}, failed {}",
                summary.downloaded,
                summary.skipped,
                summary.failed
            );
            log::info!("Cached: {}/{} resources", summary.cached_total, summary.found);
            log::info!("Manifest: {}", thumbnails.manifest_path().display());
            log::info!("JS data: {}", thumbnails.script_path.display());
        }
        Err(e) => {
            log::error!("{}", e);
            std::process::exit(1);
        }
    }
}
