//! `serve` subcommand — run the command server on stdin/stdout.

use blinkchain_lib::dispatch;
use blinkchain_lib::driver::{HeadlessDriver, StripDriver};
use blinkchain_lib::session::Session;

use super::{Config, Result};

pub(super) fn cmd_serve(config: &Config) -> Result<()> {
    let wiring = config.wiring()?;

    let mut driver = HeadlessDriver::new(&wiring);
    driver.init()?;
    log::info!(
        "strip driver ready: dma {}, channel 0 {} LEDs, channel 1 {} LEDs",
        wiring.dma_channel,
        wiring.channels[0].count,
        wiring.channels[1].count
    );

    let mut session = Session::with_canvas_limit(driver, config.max_canvas_cells);
    let stdin = std::io::stdin();
    let stdout = std::io::stdout();
    let result = dispatch::serve(
        &mut session,
        stdin.lock(),
        stdout.lock(),
        config.serve_options(),
    );

    let mut driver = session.into_driver();
    driver.finalize();

    let stats = result?;
    log::info!(
        "session closed: {} commands, {} errors, {} frames rendered",
        stats.commands,
        stats.errors,
        driver.frames()
    );
    Ok(())
}
