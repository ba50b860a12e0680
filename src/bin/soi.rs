use anyhow::{anyhow, Result};
use soi_extract::{extract_filing, load_document, ExtractorConfig, FileDate};
use std::path::PathBuf;
use structopt::StructOpt;

#[derive(StructOpt, Debug)]
#[structopt(
    name = "soi-extract",
    about = "Extract Schedule of Investments tables from a 10-Q filing"
)]
struct Opt {
    /// Filing to parse (HTML or plain text)
    #[structopt(parse(from_os_str))]
    input: PathBuf,

    /// Source URL written on the first output line
    #[structopt(long, default_value = "")]
    url: String,

    /// Filing date written on the FILE DATE line
    #[structopt(long, default_value = "")]
    filed: String,

    /// Print JSON instead of CSV
    #[structopt(long)]
    json: bool,
}

fn main() -> Result<()> {
    dotenv::dotenv().ok();
    env_logger::init();
    let opt = Opt::from_args();

    if !opt.input.exists() {
        return Err(anyhow!("Input file does not exist: {:?}", opt.input));
    }

    let config = ExtractorConfig::from_env()?;
    let content = load_document(&opt.input)?;
    let url = if opt.url.is_empty() {
        opt.input.display().to_string()
    } else {
        opt.url.clone()
    };

    let filing = extract_filing(&url, FileDate::from(opt.filed.as_str()), &content, &config)?;
    log::info!(
        "Extracted {} schedule(s) from {}",
        filing.schedules().len(),
        opt.input.display()
    );

    if opt.json {
        println!("{}", serde_json::to_string_pretty(&filing)?);
    } else {
        println!("{}", filing.to_csv());
    }
    Ok(())
}
