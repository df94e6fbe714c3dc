use corkboard::cache::Cache;
use corkboard::fetch::FeedFetcher;
use corkboard::schedule::Schedule;
use corkboard::settings::Settings;

#[tokio::main]
async fn main() {
    env_logger::init();

    let settings = match Settings::from_env() {
        Ok(settings) => settings,
        Err(err) => {
            eprintln!("{}", err);
            std::process::exit(1);
        }
    };

    let fetcher = FeedFetcher::new(
        reqwest::Client::new(),
        settings.feed_url.clone(),
        settings.fallback_urls.clone(),
    )
    .with_retry_policy(settings.max_retries, settings.retry_delay);

    let cache_file = Cache::default_file_for(&settings.cache_dir, &settings.feed_url);
    let mut schedule = Schedule::new(fetcher, Cache::load(&cache_file))
        .with_ttl(settings.cache_ttl)
        .with_horizon_days(Some(settings.horizon_days));

    match schedule.refresh(false).await {
        Ok(snapshot) => corkboard::utils::print_snapshot(&snapshot),
        Err(err) => {
            eprintln!("Could not load the feed: {}", err);
            std::process::exit(1);
        }
    }
}
