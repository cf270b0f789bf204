use std::io::Write;
use std::{
    env,
    fs::{self, OpenOptions},
};

use anyhow::Context;
use hanpath::{
    config::Config,
    export::{export_path, ModulePage},
    logging,
    store::FileStore,
    LearningPathEngine, Level,
};

const BOLD: &str = "\x1b[1m";
const RESET: &str = "\x1b[0m";
const DEFAULT_OUTPUT_DIR: &str = "output/path";

struct ExportConfig {
    level: Level,
    output_dir: String,
}

fn parse_config(mut args: impl Iterator<Item = String>) -> anyhow::Result<ExportConfig> {
    let level = args
        .next()
        .context("level is required: Beginner, Intermediate or Advanced")?
        .parse()?;
    let output_dir = args.next().unwrap_or(DEFAULT_OUTPUT_DIR.to_string());

    Ok(ExportConfig { level, output_dir })
}

fn main() -> anyhow::Result<()> {
    let config = Config::from_env();
    logging::init_tracing(&config.log_level);

    let export = match parse_config(env::args().skip(1)) {
        Ok(export) => export,
        Err(e) => {
            eprintln!("Usage: export_path <level> [output_dir]");
            return Err(e);
        }
    };

    let store = FileStore::open(&config.data_dir).context("failed to open data directory")?;
    let mut engine = LearningPathEngine::new(store).context("failed to load learning paths")?;
    engine
        .select_level(export.level)
        .context(format!("failed to load the {} path", export.level))?;

    let pages = export_path(export.level, engine.modules(), engine.cursor())
        .context("failed to render path")?;

    create_output_dir(&export.output_dir).context("failed to create output directory")?;
    for page in &pages {
        if let Err(e) = write_page(page, &export.output_dir) {
            eprintln!("Error writing page {}: {}", page.slug, e);
            return Err(e);
        }
    }

    println!(
        "exported {BOLD}{}{RESET} modules to {BOLD}{}{RESET}",
        pages.len(),
        &export.output_dir
    );
    Ok(())
}

fn write_page(page: &ModulePage, output_dir: &str) -> anyhow::Result<()> {
    let mut file = OpenOptions::new()
        .create_new(true)
        .write(true)
        .open(format!("{}/{}.md", output_dir, page.slug))
        .context(format!("failed to open file for {}", page.slug))?;

    write!(file, "{}", page.body).context("failed to write page")?;
    Ok(())
}

fn create_output_dir(output_dir: &str) -> anyhow::Result<()> {
    if fs::metadata(output_dir).is_ok() {
        fs::remove_dir_all(output_dir)?;
    }

    fs::create_dir_all(output_dir)?;
    Ok(())
}
