use clap::Parser;
use client::auth::{Identity, JwtTokenProvider, TokenProvider};
use client::camera::parse_zoom;
use client::error::ClientError;
use client::input;
use client::network::{GameEvent, GameTarget, WsConnector};
use client::rendering::Renderer;
use client::session::{Session, SessionConfig};
use log::{error, info, warn};
use macroquad::prelude::*;
use shared::{CANVAS_HEIGHT, CANVAS_WIDTH};
use std::time::Duration;
use tokio::runtime::{Handle, Runtime};

#[derive(Parser, Debug, Clone)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Game server id handed out by the lobby
    #[arg(long)]
    server_id: String,

    /// Game id handed out by the lobby
    #[arg(long)]
    game_id: String,

    /// Base WebSocket endpoint of the game servers
    #[arg(long, env = "GAME_ENDPOINT", default_value = "wss://rso-2.janvasiljevic.com")]
    endpoint: String,

    /// OIDC id token identifying the player
    #[arg(long, env = "GAME_ID_TOKEN")]
    token: Option<String>,

    /// Display name, overriding the token's preferred_username claim
    #[arg(short = 'n', long)]
    name: Option<String>,

    /// Window width
    #[arg(short = 'w', long, default_value_t = CANVAS_WIDTH, value_parser = clap::value_parser!(u16).range(1..))]
    width: u16,

    /// Window height (no short flag to avoid conflict with --help)
    #[arg(long, default_value_t = CANVAS_HEIGHT, value_parser = clap::value_parser!(u16).range(1..))]
    height: u16,

    /// Camera zoom factor
    #[arg(short = 'z', long, default_value = "1.0", value_parser = parse_zoom)]
    zoom: f32,
}

fn window_conf(args: &Args) -> Conf {
    Conf {
        window_title: "Blob Arena".to_owned(),
        window_width: i32::from(args.width),
        window_height: i32::from(args.height),
        window_resizable: false,
        ..Default::default()
    }
}

fn main() -> Result<(), ClientError> {
    env_logger::init();

    if std::env::var("RUST_LOG").is_err() {
        eprintln!("Set RUST_LOG=info for detailed logging");
    }

    let args = Args::parse();

    let runtime = Runtime::new()?;
    let handle = runtime.handle().clone();

    info!("Starting client...");
    info!("Controls: WASD or arrow keys to move, R to reconnect, Esc to leave");

    macroquad::Window::from_config(window_conf(&args), run(args, handle));

    runtime.shutdown_timeout(Duration::from_millis(500));
    Ok(())
}

fn resolve_identity(args: &Args) -> Identity {
    let provider = args
        .token
        .as_deref()
        .and_then(|token| match JwtTokenProvider::new(token) {
            Ok(provider) => Some(provider),
            Err(e) => {
                warn!("Ignoring unusable token: {}", e);
                None
            }
        });

    Identity::resolve(
        provider.as_ref().map(|p| p as &dyn TokenProvider),
        args.name.clone(),
    )
}

async fn run(args: Args, handle: Handle) {
    prevent_quit();

    let identity = resolve_identity(&args);
    info!("Playing as {}", identity.player_name);

    let connector = WsConnector::new(handle, args.endpoint.clone());
    let mut session = Session::new(
        connector,
        SessionConfig {
            player_name: identity.player_name,
            token: identity.token,
            width: f32::from(args.width),
            height: f32::from(args.height),
            zoom: args.zoom,
        },
    );
    let events = session.event_sender();
    let renderer = Renderer::new(args.width, args.height);

    if let Err(e) = session.connect(GameTarget::new(args.server_id, args.game_id)) {
        error!("Failed to connect: {}", e);
    }

    loop {
        if is_quit_requested() || is_key_pressed(KeyCode::Escape) {
            break;
        }

        if is_key_pressed(KeyCode::R) {
            if let Err(e) = session.reconnect() {
                error!("Failed to reconnect: {}", e);
            }
        }

        for key in input::poll_keyboard() {
            // Cannot fail while the session holds the receiver
            let _ = events.send(GameEvent::Key(key));
        }

        match session.tick() {
            Some(frame) => renderer.render(&frame),
            None => break,
        }

        next_frame().await;
    }

    session.shutdown();
    info!("Left the game");
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(extra: &[&str]) -> Result<Args, clap::Error> {
        let base = ["client", "--server-id", "s1", "--game-id", "g1"];
        Args::try_parse_from(base.iter().chain(extra).copied())
    }

    #[test]
    fn test_defaults_match_canvas() {
        let args = parse(&[]).unwrap();
        assert_eq!(args.width, CANVAS_WIDTH);
        assert_eq!(args.height, CANVAS_HEIGHT);
        assert_eq!(args.zoom, 1.0);
    }

    #[test]
    fn test_rejects_unusable_zoom() {
        assert!(parse(&["--zoom", "0"]).is_err());
        assert!(parse(&["--zoom=-1"]).is_err());
        assert_eq!(parse(&["-z", "2"]).unwrap().zoom, 2.0);
    }

    #[test]
    fn test_rejects_out_of_range_window() {
        assert!(parse(&["--width", "0"]).is_err());
        assert!(parse(&["--width", "70000"]).is_err());
        assert_eq!(parse(&["--height", "1024"]).unwrap().height, 1024);
    }
}
