mod app;
mod assets;
mod audio;
mod backdrop;
mod config;
mod debug;
mod input;
mod render;
mod sprite;
mod viewport;

fn main() {
    env_logger::init();
    log::info!("space.exe starting up");

    if let Err(e) = app::run() {
        log::error!("Fatal error: {e}");
        std::process::exit(1);
    }
}
