mod app;
mod data;
mod util;

use std::path::PathBuf;

use clap::Parser;

#[derive(Debug, Parser)]
#[command(author, version, about)]
struct Args {
    /// Knowledge-graph dataset (JSON). Omit to explore the built-in sample corpus.
    #[arg(long)]
    dataset: Option<PathBuf>,
}

fn main() -> eframe::Result<()> {
    env_logger::init();

    let args = Args::parse();
    let source = match args.dataset {
        Some(path) => data::DatasetSource::File(path),
        None => data::DatasetSource::Sample,
    };

    let options = eframe::NativeOptions {
        viewport: eframe::egui::ViewportBuilder::default().with_inner_size([1440.0, 920.0]),
        ..Default::default()
    };

    eframe::run_native(
        "entity-atlas",
        options,
        Box::new(move |_cc| Ok(Box::new(app::AtlasApp::new(source.clone())))),
    )
}
