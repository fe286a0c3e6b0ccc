use log::{error, info};

mod encode;
mod logging;
mod pdf;
mod picker;
mod pipeline;
mod piper;
mod playback;
mod prompts;
mod settings;
mod text;
mod voices;

fn main() {
    if let Err(err) = logging::init() {
        eprintln!("Failed to initialise logging: {err}");
    }
    info!("starting pdf2audio");

    if let Err(err) = pipeline::run() {
        error!("run aborted: {err:#}");
        eprintln!("{err:#}");
        std::process::exit(1);
    }
}
