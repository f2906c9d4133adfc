use anyhow::Result;
use clap::Parser;
use crossterm::event::{self, DisableMouseCapture, EnableMouseCapture, Event, KeyEventKind};
use crossterm::execute;
use ratatui::DefaultTerminal;
use std::time::Instant;
use weather_dash::app::App;
use weather_dash::config::Args;
use weather_dash::data::{self, DisasterTable};
use weather_dash::map::MapRenderer;
use weather_dash::{logging, ui};

fn main() -> Result<()> {
    let args = Args::parse();
    logging::init(args.log_file.as_deref())?;

    // Load everything before touching the terminal so errors print normally
    let app = build_app(&args)?;

    // Initialize terminal
    let mut terminal = ratatui::init();
    terminal.clear()?;

    // Enable mouse capture
    execute!(std::io::stdout(), EnableMouseCapture)?;

    let result = run(&mut terminal, app);

    // Disable mouse capture and restore terminal
    let _ = execute!(std::io::stdout(), DisableMouseCapture);
    ratatui::restore();

    result
}

fn build_app(args: &Args) -> Result<App> {
    let settings = args.settings()?;
    let table = DisasterTable::load(&args.data_dir, args.years()?)?;
    if table.is_empty() {
        tracing::warn!(dir = %args.data_dir.display(), "no disaster rows loaded");
    }
    let thresholds = data::load_threshold_counts(&args.data_dir.join("above_threshold_counts.csv"))?;

    let mut map_renderer = MapRenderer::new();
    if args.geo_dir.exists() {
        if let Err(e) = data::geo::load_coastlines(&mut map_renderer, &args.geo_dir) {
            tracing::warn!("coastlines unavailable: {e:#}");
        }
    }
    // Fall back to simple world if no data loaded
    if !map_renderer.has_data() {
        data::geo::generate_simple_world(&mut map_renderer);
    }

    tracing::info!(
        rows = table.records().len(),
        thresholds = thresholds.is_some(),
        "dashboard data loaded"
    );
    Ok(App::new(settings, table, thresholds, map_renderer))
}

fn run(terminal: &mut DefaultTerminal, mut app: App) -> Result<()> {
    let size = terminal.size()?;
    app.resize(size.width, size.height);

    loop {
        terminal.draw(|frame| ui::render(frame, &app))?;

        // Wake up for input or the next timer, whichever is first
        if event::poll(app.poll_timeout(Instant::now()))? {
            match event::read()? {
                // Only handle key press events (not release)
                Event::Key(key) if key.kind == KeyEventKind::Press => app.handle_key(key.code),
                Event::Mouse(mouse) => app.handle_mouse(mouse),
                Event::Resize(width, height) => app.resize(width, height),
                _ => {}
            }
        }

        app.poll_timers(Instant::now());

        if app.should_quit {
            break;
        }
    }

    Ok(())
}
