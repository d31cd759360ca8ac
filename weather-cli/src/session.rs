//! Interactive session: a search box and map clicks driven from a prompt.

use anyhow::Result;
use inquire::{InquireError, Text};
use weather_core::{Coordinate, CoordinateController, Locator, TileLayer, map::MAX_ZOOM};

use crate::render;

const HELP: &str = "search <place> | click <lat,lon> | zoom <0-19> | refresh | quit";

#[derive(Debug, Clone, PartialEq)]
enum SessionCommand {
    Search(String),
    Click(Coordinate),
    Zoom(u8),
    Refresh,
    Quit,
}

fn parse_command(line: &str) -> Result<SessionCommand, String> {
    let line = line.trim();
    let (verb, rest) = line.split_once(char::is_whitespace).unwrap_or((line, ""));
    let rest = rest.trim();

    match verb.to_lowercase().as_str() {
        "search" | "s" if !rest.is_empty() => Ok(SessionCommand::Search(rest.to_string())),
        "search" | "s" => Err("usage: search <place>".to_string()),
        "click" | "c" => rest
            .parse()
            .map(SessionCommand::Click)
            .map_err(|e| format!("usage: click <lat,lon> ({e})")),
        "zoom" | "z" => match rest.parse::<u8>() {
            Ok(zoom) if zoom <= MAX_ZOOM => Ok(SessionCommand::Zoom(zoom)),
            _ => Err(format!("usage: zoom <0-{MAX_ZOOM}>")),
        },
        "refresh" | "r" => Ok(SessionCommand::Refresh),
        "quit" | "q" | "exit" => Ok(SessionCommand::Quit),
        _ => Err(format!("unknown command '{verb}'. {HELP}")),
    }
}

pub async fn run(
    controller: &CoordinateController,
    locator: &dyn Locator,
    tiles: &TileLayer,
) -> Result<()> {
    controller.mount(locator).await;
    show(controller, tiles)?;

    loop {
        let line = match Text::new(">").with_help_message(HELP).prompt() {
            Ok(line) => line,
            Err(InquireError::OperationCanceled | InquireError::OperationInterrupted) => break,
            Err(e) => return Err(e.into()),
        };

        match parse_command(&line) {
            Ok(SessionCommand::Search(query)) => {
                controller.search(&query).await;
            }
            Ok(SessionCommand::Click(at)) => {
                controller.map_click(at).await;
            }
            Ok(SessionCommand::Zoom(zoom)) => controller.set_zoom(zoom),
            Ok(SessionCommand::Refresh) => {
                controller.refresh().await;
            }
            Ok(SessionCommand::Quit) => break,
            Err(usage) => {
                eprintln!("{usage}");
                continue;
            }
        }

        show(controller, tiles)?;
    }

    Ok(())
}

fn show(controller: &CoordinateController, tiles: &TileLayer) -> Result<()> {
    let mut stdout = std::io::stdout().lock();
    render::panel(&controller.snapshot(), tiles, &mut stdout)?;
    Ok(())
}
