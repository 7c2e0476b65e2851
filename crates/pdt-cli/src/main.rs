//! `pdt` runs a sample page and the inspector in one process and drives
//! the panel from the command line.
//!
//! Set `RUST_LOG=debug` to watch messages cross the three contexts.

mod demo;
mod render;
mod session;

use anyhow::{Result, bail};
use clap::{Parser, Subcommand};
use pdt_core::{Point, SceneNode};
use pdt_page::DetectorConfig;
use pdt_relay::RelayConfig;
use serde_json::Value;
use session::{Session, SessionOptions};
use std::sync::PoisonError;
use std::time::Duration;

/// Inspect a live vector scene through the devtools protocol
#[derive(Parser)]
#[command(
    name = "pdt",
    version = env!("CARGO_PKG_VERSION"),
    about = env!("CARGO_PKG_DESCRIPTION"),
    long_about = None
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// How long the relay waits for the page to answer a command
    #[arg(long, global = true, default_value_t = 5000)]
    timeout_ms: u64,

    /// Interval between scene detection polls
    #[arg(
        long,
        global = true,
        default_value_t = 1000,
        value_parser = clap::value_parser!(u64).range(1..=3_600_000)
    )]
    poll_ms: u64,

    /// Detection polls before giving up
    #[arg(
        long,
        global = true,
        default_value_t = 10,
        value_parser = clap::value_parser!(u32).range(1..=10_000)
    )]
    max_tries: u32,

    /// Do not publish a scene (the page has nothing to detect)
    #[arg(long, global = true)]
    no_scene: bool,

    /// Print raw JSON instead of text
    #[arg(long, global = true)]
    json: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the scene tree
    Tree,
    /// Select a node and print it
    Select {
        #[arg(value_name = "NODE_ID")]
        node_id: String,
    },
    /// Toggle a node's visibility and print the resulting tree
    Toggle {
        #[arg(value_name = "NODE_ID")]
        node_id: String,
    },
    /// Write a property (VALUE is JSON; anything else is sent as a string)
    Set {
        #[arg(value_name = "NODE_ID")]
        node_id: String,
        property: String,
        value: String,
    },
    /// Select the topmost item at a canvas point
    Hit { x: f64, y: f64 },
    /// List the scene scopes the page registered
    Scopes,
}

impl Cli {
    fn options(&self) -> SessionOptions {
        SessionOptions {
            detector: DetectorConfig {
                max_tries: self.max_tries,
                poll_interval: Duration::from_millis(self.poll_ms),
            },
            relay: RelayConfig {
                request_timeout: Duration::from_millis(self.timeout_ms),
            },
            scene: (!self.no_scene).then(demo::scene),
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    env_logger::init();
    let cli = Cli::parse();

    let mut session = Session::open(cli.options()).await;
    if !session.connected() {
        bail!("{}", session.store.state().connection_status);
    }

    match cli.command {
        Commands::Tree => {}
        Commands::Select { ref node_id } => session.store.select_node(node_id).await,
        Commands::Toggle { ref node_id } => session.store.toggle_node_visibility(node_id).await,
        Commands::Set {
            ref node_id,
            ref property,
            ref value,
        } => {
            let value = serde_json::from_str(value).unwrap_or_else(|_| Value::String(value.clone()));
            session
                .store
                .update_node_property(node_id, property, value)
                .await;
        }
        Commands::Hit { x, y } => {
            let hit = session.scene.as_ref().and_then(|scene| {
                scene
                    .lock()
                    .unwrap_or_else(PoisonError::into_inner)
                    .hit_test(Point::new(x, y))
            });
            match hit {
                Some(path) => session.store.select_node(&path.to_string()).await,
                None => println!("nothing at ({x}, {y})"),
            }
        }
        Commands::Scopes => {}
    }

    if let Some(notice) = session.store.dismiss_notice() {
        bail!(notice);
    }

    match cli.command {
        Commands::Tree | Commands::Toggle { .. } => {
            print_tree(session.store.state().scene_tree.as_ref(), cli.json)?
        }
        Commands::Select { .. } | Commands::Set { .. } | Commands::Hit { .. } => {
            if let Some(node) = &session.store.state().selected_node {
                print_node(node, cli.json)?;
            }
        }
        Commands::Scopes => {
            let context = session.close().await?;
            for scope in context.registry().list_scopes() {
                let marker = if scope.is_active { "*" } else { " " };
                match scope.canvas {
                    Some(canvas) => println!(
                        "{marker} {} ({}x{})",
                        scope.id, canvas.width, canvas.height
                    ),
                    None => println!("{marker} {}", scope.id),
                }
            }
        }
    }
    Ok(())
}

fn print_tree(tree: Option<&SceneNode>, json: bool) -> Result<()> {
    let Some(tree) = tree else {
        bail!("no scene tree");
    };
    if json {
        println!("{}", serde_json::to_string_pretty(tree)?);
    } else {
        print!("{}", render::tree(tree));
    }
    Ok(())
}

fn print_node(node: &SceneNode, json: bool) -> Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(node)?);
    } else {
        print!("{}", render::node(node));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn poll_flags_are_bounded() {
        assert!(Cli::try_parse_from(["pdt", "--poll-ms", "0", "tree"]).is_err());
        assert!(Cli::try_parse_from(["pdt", "--max-tries", "4294967295", "tree"]).is_err());

        let cli = Cli::try_parse_from(["pdt", "tree", "--poll-ms", "5"]).unwrap();
        assert_eq!(cli.options().detector.poll_interval, Duration::from_millis(5));
    }
}
