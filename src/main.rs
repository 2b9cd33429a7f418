mod app;
mod config;
mod farm;
mod page;
mod theme;
mod ui;

use anyhow::Result;
use clap::Parser;
use crossterm::{
    event::{self, DisableMouseCapture, EnableMouseCapture, Event, KeyCode, KeyEventKind},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{backend::CrosstermBackend, Terminal};
use std::io;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use app::{App, Popup};
use page::hearts::{heart_strip, HEART_ALT};

#[derive(Parser, Debug)]
#[command(name = "farmdeck")]
#[command(author = "Sean Fournier")]
#[command(version = "0.1.0")]
#[command(about = "A terminal action deck and hearts bar for Terminal Farm")]
struct Args {
    /// Print the hearts bar for a health value and exit
    #[arg(long, value_name = "VALUE", allow_negative_numbers = true)]
    hearts: Option<f64>,

    /// With --hearts, print the slots as JSON
    #[arg(short, long, requires = "hearts")]
    json: bool,

    /// Starting health for the TUI (overrides config)
    #[arg(long, value_name = "VALUE", allow_negative_numbers = true)]
    health: Option<f64>,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer().with_writer(io::stderr))
        .with(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let args = Args::parse();

    // Handle CLI-only commands
    if let Some(value) = args.hearts {
        return print_hearts(value, args.json).await;
    }

    // Run TUI
    run_tui(args.health).await
}

async fn print_hearts(value: f64, json: bool) -> Result<()> {
    let config = config::AppConfig::read().await;
    let strip = heart_strip(value);

    if json {
        let slots: Vec<serde_json::Value> = strip
            .iter()
            .enumerate()
            .map(|(index, variant)| {
                serde_json::json!({
                    "index": index,
                    "variant": variant,
                    "src": variant.src(&config.asset_dir),
                    "alt": HEART_ALT,
                })
            })
            .collect();

        let output = serde_json::json!({
            "value": value,
            "slots": slots,
        });
        println!("{}", serde_json::to_string(&output)?);
    } else {
        let line: Vec<&str> = strip.iter().map(|v| v.glyph()).collect();
        println!("{}", line.join(" "));
    }
    Ok(())
}

async fn run_tui(health: Option<f64>) -> Result<()> {
    // Build app state before touching the terminal so init errors print cleanly
    let mut app = App::new(health).await?;

    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    // Main loop
    let result = run_app(&mut terminal, &mut app).await;

    // Restore terminal
    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture
    )?;
    terminal.show_cursor()?;

    result
}

async fn run_app(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    app: &mut App,
) -> Result<()> {
    loop {
        terminal.draw(|f| ui::draw(f, app))?;

        if event::poll(std::time::Duration::from_millis(100))? {
            if let Event::Key(key) = event::read()? {
                if key.kind == KeyEventKind::Press {
                    match key.code {
                        KeyCode::Char('q') if app.popup == Popup::None => return Ok(()),
                        KeyCode::Char('c') if key.modifiers.contains(event::KeyModifiers::CONTROL) => {
                            return Ok(())
                        }
                        _ => {
                            // Handle key and catch any errors to prevent crashes
                            if let Err(e) = app.handle_key(key) {
                                tracing::debug!("Key handling failed: {}", e);
                                app.status_message = Some(format!("Error: {}", e));
                                app.status_message_time = Some(std::time::Instant::now());
                            }
                        }
                    }
                }
            }
        }

        // Periodic refresh
        app.tick();
    }
}
