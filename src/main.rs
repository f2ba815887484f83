use std::{path::PathBuf, process::ExitCode, time::Duration};

use clap::Parser;
use imdbscraper::{config, pipeline, Config};
use tracing::{error, info};
use tracing_subscriber::{fmt, EnvFilter};

#[derive(Parser)]
#[command(
    author,
    version,
    about = "Scrape the IMDb Top 250 TV Shows list into a cleaned CSV"
)]
struct Args {
    /// WebDriver server to open the browser session on.
    #[arg(long, default_value = config::DEFAULT_WEBDRIVER_URL)]
    webdriver: String,
    /// Display label of the sort option to apply.
    #[arg(long, default_value = config::DEFAULT_SORT_LABEL)]
    sort_by: String,
    /// Directory for the CSV and any failure screenshot.
    #[arg(long, default_value = config::OUTPUT_DIR)]
    output_dir: PathBuf,
    /// Upper bound on each element-visibility wait.
    #[arg(long, default_value_t = config::DEFAULT_WAIT_TIMEOUT.as_secs())]
    timeout_secs: u64,
    /// Skip column rules that match nothing instead of failing.
    #[arg(long)]
    lenient_columns: bool,
}

impl Args {
    fn into_config(self) -> Config {
        let cfg = Config {
            webdriver_url: self.webdriver,
            sort_label: self.sort_by,
            output_dir: self.output_dir,
            wait_timeout: Duration::from_secs(self.timeout_secs),
            ..Config::default()
        };
        if self.lenient_columns {
            cfg.lenient_columns()
        } else {
            cfg
        }
    }
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    // ─── 1) init logging ─────────────────────────────────────────────
    let env = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    fmt::Subscriber::builder()
        .with_env_filter(env)
        .with_span_events(fmt::format::FmtSpan::CLOSE)
        .init();
    info!("startup");

    std::panic::set_hook(Box::new(|info| {
        eprintln!("panic: {:?}", info);
    }));

    // ─── 2) run: navigate → extract → parse → clean ──────────────────
    let config = Args::parse().into_config();
    match pipeline::run(&config).await {
        Ok(path) => {
            info!(path = %path.display(), "all done");
            ExitCode::SUCCESS
        }
        Err(e) => {
            error!("{:#}", e);
            eprintln!("error: {:#}", e);
            ExitCode::FAILURE
        }
    }
}
