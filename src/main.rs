mod config;
mod driver;
mod error;
mod export;
mod harvest;
mod insight;
mod pipeline;
mod review;

use std::process::ExitCode;
use std::time::Instant;

use anyhow::Context;
use clap::error::ErrorKind;
use clap::Parser;
use reqwest::Url;
use tracing::info;

use driver::ChromeSession;
use insight::OpenAiAnalyzer;

#[derive(Parser, Debug)]
#[command(
    name = "review_scraper",
    about = "Scrape every review from a paginated page and export JSON, CSV and Markdown"
)]
struct Cli {
    /// Page that lists the reviews
    #[arg(short, long)]
    url: String,

    /// API key for the analysis service; enables the insight report
    #[arg(long = "apiKey")]
    api_key: Option<String>,
}

/// Accept only absolute http(s) URLs.
fn parse_url(raw: &str) -> Result<Url, String> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err("--url must not be empty".to_string());
    }
    let url = Url::parse(trimmed).map_err(|e| format!("invalid --url {:?}: {}", raw, e))?;
    match url.scheme() {
        "http" | "https" if url.has_host() => Ok(url),
        _ => Err(format!("invalid --url {:?}: expected an http(s) address", raw)),
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .init();

    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(e) if matches!(e.kind(), ErrorKind::DisplayHelp | ErrorKind::DisplayVersion) => {
            e.exit()
        }
        Err(e) => {
            eprintln!("{}", e);
            return ExitCode::from(1);
        }
    };
    let url = match parse_url(&cli.url) {
        Ok(url) => url,
        Err(msg) => {
            eprintln!("error: {}", msg);
            return ExitCode::from(1);
        }
    };

    match run(url, cli.api_key).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {:#}", e);
            ExitCode::from(1)
        }
    }
}

async fn run(url: Url, api_key: Option<String>) -> anyhow::Result<()> {
    let t0 = Instant::now();
    let settings = config::load()?;
    info!(settings = ?settings, "Configuration loaded");

    let session = ChromeSession::launch(&settings.browser)
        .await
        .context("Failed to start browser")?;
    let result = pipeline::run(session.page(), url.as_str(), &settings).await;
    session.shutdown().await;
    let summary = result?;

    let analyzer = api_key.map(|key| OpenAiAnalyzer::new(&key, &settings.insight.base_url));
    pipeline::finish(&summary, analyzer, &settings, t0, &mut std::io::stdout()).await
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_http_urls() {
        assert!(parse_url("https://example.com/app/reviews").is_ok());
        assert!(parse_url("http://localhost:8080").is_ok());
    }

    #[test]
    fn rejects_empty_and_malformed_urls() {
        assert!(parse_url("").is_err());
        assert!(parse_url("   ").is_err());
        assert!(parse_url("not a url").is_err());
        assert!(parse_url("mailto:someone@example.com").is_err());
    }

    #[test]
    fn cli_flags() {
        let cli = Cli::try_parse_from(["review_scraper", "-u", "https://x.io", "--apiKey", "k"])
            .unwrap();
        assert_eq!(cli.url, "https://x.io");
        assert_eq!(cli.api_key.as_deref(), Some("k"));
        assert!(Cli::try_parse_from(["review_scraper"]).is_err());
    }
}
