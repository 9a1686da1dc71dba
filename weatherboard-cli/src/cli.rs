use anyhow::Context;
use clap::{Parser, Subcommand};
use inquire::{InquireError, Password, PasswordDisplayMode, Select, Text};
use std::{fmt, io};
use tracing::debug;

use weatherboard_core::{
    Config, Coordinates, Dashboard, Event, FixedLocator, IpLocator, Locator, NoLocator,
    OpenWeatherClient,
};

use crate::render::TerminalRenderer;

type TerminalDashboard = Dashboard<OpenWeatherClient, TerminalRenderer<io::Stdout>, Box<dyn Locator>>;

/// Top-level CLI struct.
#[derive(Debug, Parser)]
#[command(name = "weatherboard", version, about = "Terminal weather dashboard")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Store the OpenWeather API key and dashboard defaults.
    Configure,

    /// Show current weather and the 5-day forecast once.
    Show {
        /// City name; defaults to the configured city.
        city: Option<String>,

        /// Latitude of the place to show.
        #[arg(long, requires = "lon", allow_negative_numbers = true, conflicts_with = "city")]
        lat: Option<f64>,

        /// Longitude of the place to show.
        #[arg(long, requires = "lat", allow_negative_numbers = true)]
        lon: Option<f64>,

        /// Use the approximate location of this machine.
        #[arg(long, conflicts_with_all = ["city", "lat"])]
        here: bool,
    },

    /// Interactive dashboard with search, location and quick picks.
    Dashboard,
}

impl Cli {
    pub async fn run(self) -> anyhow::Result<()> {
        match self.command {
            Command::Configure => configure(),
            Command::Show {
                city,
                lat,
                lon,
                here,
            } => {
                let config = Config::load()?;
                let coords = lat.zip(lon).map(|(lat, lon)| Coordinates { lat, lon });

                let locator: Box<dyn Locator> = match coords {
                    Some(c) => Box::new(FixedLocator(c)),
                    None if here => Box::new(ip_locator(&config)?),
                    None => Box::new(NoLocator),
                };
                let mut dashboard = open_dashboard(&config, locator)?;

                match (city, coords.is_some() || here) {
                    (_, true) => dashboard.handle(Event::Geolocate).await,
                    (Some(city), false) => dashboard.handle(Event::Search(city)).await,
                    (None, false) => dashboard.start().await,
                }
                Ok(())
            }
            Command::Dashboard => {
                let config = Config::load()?;
                let locator: Box<dyn Locator> = Box::new(ip_locator(&config)?);
                let mut dashboard = open_dashboard(&config, locator)?;
                interactive(&mut dashboard, &config.quick_picks).await
            }
        }
    }
}

fn open_dashboard(config: &Config, locator: Box<dyn Locator>) -> anyhow::Result<TerminalDashboard> {
    let client = OpenWeatherClient::from_config(config)?;
    let renderer = TerminalRenderer::new(io::stdout());
    Ok(Dashboard::new(client, renderer, locator, config.default_city.clone()))
}

fn ip_locator(config: &Config) -> anyhow::Result<IpLocator> {
    IpLocator::new(config.endpoints.ip_locate.clone()).context("Failed to create IP locator")
}

fn configure() -> anyhow::Result<()> {
    let mut config = Config::load()?;

    let api_key = Password::new("OpenWeather API key:")
        .without_confirmation()
        .with_display_mode(PasswordDisplayMode::Masked)
        .prompt()?;
    config.set_api_key(api_key);

    let city = Text::new("Default city:")
        .with_default(&config.default_city)
        .prompt()?;
    config.default_city = city;

    let lang = Text::new("Language code for condition descriptions:")
        .with_default(&config.lang)
        .prompt()?;
    config.lang = lang;

    config.save()?;
    println!("Saved configuration to {}", Config::config_file_path()?.display());
    Ok(())
}

#[derive(Debug, Clone, PartialEq)]
enum MenuItem {
    Search,
    MyLocation,
    City(String),
    Refresh,
    Quit,
}

impl fmt::Display for MenuItem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MenuItem::Search => f.write_str("Search for a city"),
            MenuItem::MyLocation => f.write_str("My location"),
            MenuItem::City(name) => write!(f, "{name}"),
            MenuItem::Refresh => f.write_str("Refresh"),
            MenuItem::Quit => f.write_str("Quit"),
        }
    }
}

fn menu(quick_picks: &[String]) -> Vec<MenuItem> {
    let mut items = vec![MenuItem::Search, MenuItem::MyLocation];
    items.extend(quick_picks.iter().cloned().map(MenuItem::City));
    items.push(MenuItem::Refresh);
    items.push(MenuItem::Quit);
    items
}

fn cancelled(e: &InquireError) -> bool {
    matches!(
        e,
        InquireError::OperationCanceled | InquireError::OperationInterrupted
    )
}

async fn interactive(dashboard: &mut TerminalDashboard, quick_picks: &[String]) -> anyhow::Result<()> {
    dashboard.start().await;

    loop {
        if dashboard.renderer().pending_error().is_some() {
            match Text::new("Press Enter to dismiss").prompt_skippable() {
                Err(e) if cancelled(&e) => break,
                Err(e) => return Err(e.into()),
                Ok(_) => dashboard.handle(Event::DismissError).await,
            }
        }

        let choice = match Select::new("What next?", menu(quick_picks)).prompt() {
            Ok(choice) => choice,
            Err(e) if cancelled(&e) => break,
            Err(e) => return Err(e.into()),
        };
        debug!(%choice, "menu");

        let event = match choice {
            MenuItem::Search => {
                let initial = dashboard.renderer().query().to_string();
                match Text::new("City:").with_initial_value(&initial).prompt() {
                    Ok(text) => Event::Search(text),
                    Err(e) if cancelled(&e) => continue,
                    Err(e) => return Err(e.into()),
                }
            }
            MenuItem::MyLocation => Event::Geolocate,
            MenuItem::City(name) => Event::QuickPick(name),
            MenuItem::Refresh => Event::Refresh,
            MenuItem::Quit => break,
        };
        dashboard.handle(event).await;
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn show_accepts_negative_coordinates() {
        let cli = Cli::try_parse_from(["weatherboard", "show", "--lat", "-33.87", "--lon", "151.21"])
            .unwrap();
        match cli.command {
            Command::Show { lat, lon, city, here } => {
                assert_eq!(lat, Some(-33.87));
                assert_eq!(lon, Some(151.21));
                assert_eq!(city, None);
                assert!(!here);
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn lat_requires_lon() {
        assert!(Cli::try_parse_from(["weatherboard", "show", "--lat", "10"]).is_err());
    }

    #[test]
    fn here_conflicts_with_city() {
        assert!(Cli::try_parse_from(["weatherboard", "show", "Oslo", "--here"]).is_err());
    }

    #[test]
    fn menu_lists_quick_picks_between_location_and_refresh() {
        let items = menu(&["Oslo".to_string(), "Kazan".to_string()]);
        assert_eq!(
            items,
            vec![
                MenuItem::Search,
                MenuItem::MyLocation,
                MenuItem::City("Oslo".into()),
                MenuItem::City("Kazan".into()),
                MenuItem::Refresh,
                MenuItem::Quit,
            ]
        );
        assert_eq!(items[2].to_string(), "Oslo");
    }
}
