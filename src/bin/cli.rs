//! Agassi CLI Client
//!
//! Command-line interface for interacting with an Agassi server.

use agassi::network::Client;
use agassi::{Coach, Player, Review, Score, Skills};
use clap::{Parser, Subcommand};
use serde::Serialize;

/// Agassi CLI
#[derive(Parser, Debug)]
#[command(name = "agassi-cli")]
#[command(about = "CLI for the Agassi player registry")]
struct Args {
    /// Server address
    #[arg(short, long, default_value = "127.0.0.1:8080")]
    server: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Register a player
    CreatePlayer {
        /// Player name
        name: String,

        /// Player id (assigned by the server when omitted)
        #[arg(long, default_value = "")]
        id: String,
    },

    /// Register a coach
    CreateCoach {
        /// Coach name
        name: String,

        /// Coach id (assigned by the server when omitted)
        #[arg(long, default_value = "")]
        id: String,
    },

    /// List all players
    ListPlayers,

    /// List all coaches
    ListCoaches,

    /// Show one player
    GetPlayer { id: String },

    /// Show one coach
    GetCoach { id: String },

    /// Add a review to a player
    AddReview {
        /// Reviewed player id
        player_id: String,

        /// Id of the reviewing coach
        #[arg(long)]
        author: Option<String>,

        #[arg(long)]
        total: Option<f32>,

        #[arg(long)]
        forehand: Option<f32>,

        #[arg(long)]
        backhand: Option<f32>,

        /// Comment attached to the total score
        #[arg(long, default_value = "")]
        comment: String,
    },

    /// List a player's reviews
    ListReviews { player_id: String },

    /// Ping the server
    Ping,
}

fn main() {
    let args = Args::parse();

    if let Err(e) = run(args) {
        eprintln!("error: {}", e);
        std::process::exit(1);
    }
}

fn run(args: Args) -> agassi::Result<()> {
    let mut client = Client::connect(&args.server)?;

    match args.command {
        Commands::CreatePlayer { name, id } => {
            println!("{}", client.create_player(&Player::new(id, name))?);
        }
        Commands::CreateCoach { name, id } => {
            println!("{}", client.create_coach(&Coach::new(id, name))?);
        }
        Commands::ListPlayers => print_json(&client.list_players()?),
        Commands::ListCoaches => print_json(&client.list_coaches()?),
        Commands::GetPlayer { id } => match client.get_player(&id)? {
            Some(player) => print_json(&player),
            None => println!("player {} not found", id),
        },
        Commands::GetCoach { id } => match client.get_coach(&id)? {
            Some(coach) => print_json(&coach),
            None => println!("coach {} not found", id),
        },
        Commands::AddReview {
            player_id,
            author,
            total,
            forehand,
            backhand,
            comment,
        } => {
            let author = match author {
                Some(coach_id) => Some(client.get_coach(&coach_id)?.ok_or_else(|| {
                    agassi::AgassiError::NotFound {
                        bucket: "coaches",
                        key: coach_id.clone(),
                    }
                })?),
                None => None,
            };
            let review = Review {
                author,
                skills: Some(Skills {
                    total: total.map(|s| Score::new(s, comment)),
                    forehand: forehand.map(|s| Score::new(s, "")),
                    backhand: backhand.map(|s| Score::new(s, "")),
                }),
            };
            client.add_review(&player_id, &review)?;
            println!("OK");
        }
        Commands::ListReviews { player_id } => print_json(&client.list_reviews(&player_id)?),
        Commands::Ping => {
            client.ping()?;
            println!("PONG");
        }
    }

    Ok(())
}

fn print_json<T: Serialize + ?Sized>(value: &T) {
    match serde_json::to_string_pretty(value) {
        Ok(text) => println!("{}", text),
        Err(e) => eprintln!("error: can't render response: {}", e),
    }
}
