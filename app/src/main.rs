use std::process::ExitCode;

use voxtile_app::{App, AppArgs, WanderHandler};

fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    voxtile_core::init();
    voxtile_graphics::init();
    voxtile_app::init();

    let args = AppArgs::parse();
    match App::new(WanderHandler::new(), args) {
        Ok(mut app) => {
            app.run();
            ExitCode::SUCCESS
        }
        Err(e) => {
            log::error!("{e}");
            ExitCode::FAILURE
        }
    }
}
