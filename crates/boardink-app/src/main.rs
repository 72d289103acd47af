//! Main application entry point (native).

use boardink_app::{App, AppConfig, AppError, CliArgs};
use clap::Parser;
use std::process::ExitCode;

fn main() -> ExitCode {
    env_logger::init();
    log::info!("Starting Boardink");

    let args = CliArgs::parse();
    match run(args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            log::error!("{e}");
            eprintln!("boardink: {e}");
            ExitCode::FAILURE
        }
    }
}

fn run(args: CliArgs) -> Result<(), AppError> {
    let config = AppConfig::from_env()?;
    let summary = App::run(config, args)?;
    if let Some((dir, image)) = &summary.export {
        println!(
            "exported {}x{} image to {}",
            image.width,
            image.height,
            dir.join(&image.filename).display()
        );
    }
    println!(
        "board {}: {} strokes, {} arrows, {} texts",
        summary.board_id, summary.strokes, summary.arrows, summary.texts
    );
    Ok(())
}
