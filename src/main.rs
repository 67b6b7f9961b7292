use std::path::PathBuf;

use audit_event_scraping::{
    collector::Collector, config::ScanConfig, fetcher::DocsClient,
    parser::RecommendationHeuristic, scan::scan,
};
use clap::Parser;
use log::{info, LevelFilter};

#[derive(Parser)]
/// Scrapes the Windows security auditing event pages into a spreadsheet.
struct Opts {
    /// TOML file with scan settings; flags override it.
    #[arg(long)]
    config_path: Option<PathBuf>,
    #[arg(long)]
    start_id: Option<u32>,
    #[arg(long)]
    end_id: Option<u32>,
    /// `.csv`/`.tsv` write delimited text, anything else an Excel workbook.
    #[arg(short, long)]
    output_path: Option<PathBuf>,
    #[arg(long)]
    base_url: Option<String>,
    #[arg(long)]
    recommendation_threshold: Option<usize>,
    /// Skip certificate validation when downloading pages.
    #[arg(long)]
    accept_invalid_certs: bool,
    /// Print every saved event before exporting.
    #[arg(long)]
    list: bool,
}

impl Opts {
    fn config(&self) -> anyhow::Result<ScanConfig> {
        let mut config = match &self.config_path {
            Some(path) => ScanConfig::load(path)?,
            None => ScanConfig::default(),
        };
        if let Some(start_id) = self.start_id {
            config.start_id = start_id;
        }
        if let Some(end_id) = self.end_id {
            config.end_id = end_id;
        }
        if let Some(output_path) = &self.output_path {
            config.output_path = output_path.clone();
        }
        if let Some(base_url) = &self.base_url {
            config.base_url = base_url.clone();
        }
        if let Some(threshold) = self.recommendation_threshold {
            config.recommendation_threshold = threshold;
        }
        config.accept_invalid_certs |= self.accept_invalid_certs;
        Ok(config)
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    pretty_env_logger::formatted_builder()
        .filter_level(LevelFilter::Info)
        .parse_default_env()
        .init();

    let opts = Opts::parse();
    let config = opts.config()?;
    let ids = config.id_range()?;
    let client = DocsClient::new(&config)?;
    let heuristic = RecommendationHeuristic::new(config.recommendation_threshold);

    let mut collector = Collector::new();
    let summary = scan(
        &client,
        ids,
        &heuristic,
        &mut collector,
        config.progress_interval,
    )
    .await;
    info!("Finished: {summary}");

    if opts.list {
        for record in collector.sorted() {
            println!("{record}");
        }
    }

    collector.export(&config.output_path)?;
    println!(
        "Saved {} events to file {}.",
        collector.count(),
        config.output_path.display()
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use std::path::Path;

    use audit_event_scraping::config::{ScanConfig, DEFAULT_BASE_URL};
    use clap::Parser;

    use super::Opts;

    fn config_of(args: &[&str]) -> anyhow::Result<ScanConfig> {
        Opts::try_parse_from(["audit-event-scraping"].iter().chain(args))?.config()
    }

    fn write_config(dir: &Path, content: &str) -> String {
        let path = dir.join("scan.toml");
        fs_err::write(&path, content).unwrap();
        path.to_str().unwrap().to_owned()
    }

    #[test]
    fn test_no_arguments_gives_defaults() {
        let config = config_of(&[]).unwrap();
        assert_eq!(config.start_id, 1000);
        assert_eq!(config.end_id, 6424);
        assert_eq!(config.output_path, Path::new("windows-security-events.xlsx"));
        assert_eq!(config.base_url, DEFAULT_BASE_URL);
        assert_eq!(config.recommendation_threshold, 700);
        assert!(!config.accept_invalid_certs);
    }

    #[test]
    fn test_flags_override_config_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_config(
            dir.path(),
            r#"
start_id = 4600
end_id = 4700
output_path = "from-file.csv"
base_url = "https://example.com/file"
recommendation_threshold = 500
progress_interval = 7
"#,
        );
        let config = config_of(&[
            "--config-path",
            &path,
            "--end-id",
            "4650",
            "-o",
            "from-flag.xlsx",
            "--base-url",
            "https://example.com/flag",
            "--recommendation-threshold",
            "650",
            "--accept-invalid-certs",
        ])
        .unwrap();
        assert_eq!(config.start_id, 4600);
        assert_eq!(config.end_id, 4650);
        assert_eq!(config.output_path, Path::new("from-flag.xlsx"));
        assert_eq!(config.base_url, "https://example.com/flag");
        assert_eq!(config.recommendation_threshold, 650);
        assert!(config.accept_invalid_certs);
        assert_eq!(config.progress_interval, 7);
    }

    #[test]
    fn test_config_file_overrides_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_config(dir.path(), "start_id = 4600\naccept_invalid_certs = true\n");
        let config = config_of(&["--config-path", &path]).unwrap();
        assert_eq!(config.start_id, 4600);
        assert_eq!(config.end_id, 6424);
        // Absent flag does not switch certificate validation back on.
        assert!(config.accept_invalid_certs);
    }

    #[test]
    fn test_invalid_input_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("missing.toml");
        assert!(config_of(&["--config-path", missing.to_str().unwrap()]).is_err());
        assert!(config_of(&["--start-id", "abc"]).is_err());
        let config = config_of(&["--start-id", "5000", "--end-id", "4000"]).unwrap();
        assert!(config.id_range().is_err());
    }
}
