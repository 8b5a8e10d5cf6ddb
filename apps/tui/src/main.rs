use clap::Parser;
use color_eyre::Result;
use geosafe_core::Viewport;
use geosafe_tui::cli::CliArgs;
use geosafe_tui::config::init_app_config;
use geosafe_tui::logging::{init_logging, LogTarget};
use geosafe_tui::{event, terminal, App, GeoSafeClient};
use tracing::info;

#[tokio::main]
async fn main() -> Result<()> {
    color_eyre::install()?;

    let args = CliArgs::parse();
    let config = init_app_config(&args)?;

    let headless = args.wants_headless(atty::is(atty::Stream::Stderr));
    let target = if headless {
        LogTarget::Stderr
    } else {
        LogTarget::File(&config.log_file)
    };
    init_logging(target, config.debug)?;

    let client = GeoSafeClient::new(config.api.clone())?;

    if headless {
        return event::run_headless(&client, args.json).await;
    }

    let mut app = App::new(client, Viewport::new(config.center, config.zoom));
    app.start_load();

    let mut terminal = terminal::setup()?;
    let result = event::run(&mut terminal, &mut app).await;
    terminal::cleanup(true, true);

    // The map was drawn on stderr; stdout only carries the last click.
    if let Some(click) = &app.session.last_click {
        info!("{}", click.log_line());
        println!("{}", click.copy_text());
    }

    result
}
