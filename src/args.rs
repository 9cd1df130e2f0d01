use clap::Parser;

#[derive(Parser, Debug)]
#[command(name = "shopcrawl")]
#[command(about = "Extracts shop product catalogs into a document store")]
#[command(version)]
pub struct Args {
    /// Path to the run configuration JSON (shops, selectors, runner settings)
    pub config: String,

    /// Number of shops processed in parallel (overrides the config file)
    #[arg(short, long)]
    pub concurrency: Option<usize>,

    /// WebDriver server URL (overrides the config file and WEBDRIVER_URL)
    #[arg(long)]
    pub webdriver_url: Option<String>,

    /// Directory the document store writes to (overrides the config file)
    #[arg(short, long)]
    pub output_dir: Option<String>,
}
