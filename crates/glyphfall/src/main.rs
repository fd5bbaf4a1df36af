mod app;
mod logging;

use glyphfall_config::Config;
use tracing::info;

use crate::app::App;

fn main() -> color_eyre::Result<()> {
    color_eyre::install()?;
    let log_path = logging::init();
    let config = Config::load()?;
    info!(
        log = ?log_path,
        config = ?Config::config_path(),
        font = %config.font,
        "starting glyphfall"
    );

    let terminal = ratatui::init();
    let result = App::new(config)
        .on_mount(|animator| info!(columns = animator.rain().columns(), "animation mounted"))
        .on_unmount(|animator| info!(frames = animator.frames(), "animation unmounted"))
        .run(terminal);
    ratatui::restore();
    result
}
