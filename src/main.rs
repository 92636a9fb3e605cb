use anyhow::{Context, Result, bail};
use clap::{Parser, Subcommand};
use spaced_review::config::{Config, DEFAULT_CONFIG_PATH};
use spaced_review::export::json::{export_cards_to_path, import_flashcard_set};
use spaced_review::review::{self, CardSnapshot, ReviewRequest};
use spaced_review::{CardId, CardStore};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "flashcards", about = "Spaced repetition flashcard reviews", version)]
struct Cli {
    /// Config file
    #[arg(long, global = true, default_value = DEFAULT_CONFIG_PATH)]
    config: PathBuf,

    /// SQLite database (overrides config and FLASHCARDS_DB)
    #[arg(long, global = true)]
    database: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Import flashcard set files ({ articleSlug, cards: [{ front, back }] })
    Import {
        #[arg(required = true)]
        files: Vec<PathBuf>,
    },

    /// Add a single card
    Add {
        article: String,
        front: String,
        back: String,
    },

    /// List cards due now
    Due {
        #[arg(long)]
        json: bool,
    },

    /// Rate a card: 0-2 forgot, 3 hard, 4 good, 5 easy
    Review { card_id: CardId, quality: i64 },

    /// Show one card with its review state
    Show { card_id: CardId },

    /// Export all cards with review state to a JSON file
    Export { path: PathBuf },

    /// Move the store clock forward one day
    AdvanceDay,

    /// Delete a card
    Delete { card_id: CardId },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let mut config = Config::load(&cli.config)
        .with_context(|| format!("loading {}", cli.config.display()))?;
    if let Some(database) = cli.database {
        config.database_path = database;
    }

    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(&config.log_level))
        .init();

    let mut store = CardStore::open(&config.database_path)
        .with_context(|| format!("opening {}", config.database_path.display()))?;

    match cli.command {
        Command::Import { files } => {
            for file in files {
                let set = import_flashcard_set(&file)
                    .with_context(|| format!("reading {}", file.display()))?;
                let inserted = store.import_set(&set)?;
                println!(
                    "{}: {} new cards ({} in file)",
                    set.article_slug,
                    inserted,
                    set.cards.len()
                );
            }
        }
        Command::Add {
            article,
            front,
            back,
        } => {
            let id = store.add_card(&article, &front, &back)?;
            println!("Card {} in '{}'", id, article);
        }
        Command::Due { json } => {
            let due = review::due_cards(&store)?;
            if json {
                println!("{}", serde_json::to_string_pretty(&due)?);
            } else if due.is_empty() {
                println!("Nothing due.");
            } else {
                for card in &due {
                    print_card(card);
                }
                println!("{} cards due", due.len());
            }
        }
        Command::Review { card_id, quality } => {
            let request = ReviewRequest { card_id, quality };
            let response = review::submit_review(&mut store, &request)?;
            println!("{}", serde_json::to_string_pretty(&response)?);
        }
        Command::Show { card_id } => match store.get_card(card_id)? {
            Some(card) => print_card(&CardSnapshot::from(card)),
            None => bail!("Card not found: {}", card_id),
        },
        Command::Export { path } => {
            let cards: Vec<CardSnapshot> = store
                .all_cards()?
                .into_iter()
                .map(CardSnapshot::from)
                .collect();
            export_cards_to_path(&cards, &path)?;
            println!("Exported {} cards to {}", cards.len(), path.display());
        }
        Command::AdvanceDay => {
            let now = store.advance_day()?;
            println!(
                "Store date is now {} ({} cards due)",
                now.format("%Y-%m-%d"),
                store.due_count(now)?
            );
        }
        Command::Delete { card_id } => {
            if !store.delete_card(card_id)? {
                bail!("Card not found: {}", card_id);
            }
            println!("Deleted card {}", card_id);
        }
    }

    Ok(())
}

fn print_card(card: &CardSnapshot) {
    println!("[{}] {} ({:?})", card.id, card.article_slug, card.phase());
    println!("  Q: {}", card.front);
    println!("  A: {}", card.back);
    println!(
        "  interval {} days, ease {:.2}, reviews {}, next {}",
        card.interval_days,
        card.ease_factor,
        card.review_count,
        card.next_review_at.format("%Y-%m-%d %H:%M UTC")
    );
}
