//! # Economy Simulator
//!
//! Bootstraps an economy and runs search, craft and sell rounds for a set
//! of players with a seeded RNG and a manual clock.
//!
//! Usage: `economy_sim [--config <file>] [--players N] [--rounds N] [--seed N]`

use std::process::ExitCode;
use std::sync::Arc;

use alloy_primitives::Address;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use sich_economy::{
    Economy, EconomyConfig, EconomyError, EconomyResult, ManualClock, RngEntropy,
};
use sich_shared::{derive_contract_address, ItemKind, ResourceId, RESOURCE_TYPE_COUNT};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Parsed command line.
struct Options {
    config: Option<String>,
    players: u64,
    rounds: u64,
    seed: u64,
}

impl Options {
    fn parse(args: &[String]) -> Result<Self, String> {
        let value_of = |flag: &str| {
            args.iter()
                .position(|a| a == flag)
                .map(|i| args.get(i + 1).ok_or_else(|| format!("{flag} needs a value")))
                .transpose()
        };
        let number_of = |flag: &str, default: u64| -> Result<u64, String> {
            value_of(flag)?.map_or(Ok(default), |raw| {
                raw.parse().map_err(|_| format!("{flag}: not a number: {raw}"))
            })
        };

        Ok(Self {
            config: value_of("--config")?.cloned(),
            players: number_of("--players", 4)?,
            rounds: number_of("--rounds", 10)?,
            seed: number_of("--seed", 42)?,
        })
    }
}

/// Per-run counters.
#[derive(Default)]
struct Tally {
    searches: u64,
    cooling: u64,
    crafted: [u64; 4],
    sold: u64,
}

fn main() -> ExitCode {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .with(tracing_subscriber::fmt::layer().without_time())
        .init();

    println!("╔══════════════════════════════════════════════════════════════════╗");
    println!("║         SICH ECONOMY SIMULATOR                                   ║");
    println!("║         SEARCH · CRAFT · SELL                                    ║");
    println!("╚══════════════════════════════════════════════════════════════════╝");
    println!();

    let args: Vec<String> = std::env::args().collect();
    if args.iter().any(|a| a == "--help" || a == "-h") {
        println!("Usage: economy_sim [--config <file>] [--players N] [--rounds N] [--seed N]");
        return ExitCode::SUCCESS;
    }
    let options = match Options::parse(&args) {
        Ok(options) => options,
        Err(message) => {
            eprintln!("Error: {message}");
            return ExitCode::FAILURE;
        }
    };

    match run(&options) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {e}");
            ExitCode::FAILURE
        }
    }
}

fn run(options: &Options) -> EconomyResult<()> {
    let config = match &options.config {
        Some(path) => EconomyConfig::load(path)?,
        None => EconomyConfig::with_admin(Address::repeat_byte(0xAD)),
    };

    let clock = Arc::new(ManualClock::new(0));
    let entropy = RngEntropy::new(ChaCha8Rng::seed_from_u64(options.seed));
    let economy = Economy::bootstrap(&config, clock.clone(), Box::new(entropy))?;

    let players: Vec<Address> = (0..options.players)
        .map(|i| derive_contract_address(config.admin, 1_000 + i))
        .collect();

    println!("Players: {}   Rounds: {}   Seed: {}", options.players, options.rounds, options.seed);
    println!("Cooldown: {}s", config.search_cooldown_secs);
    println!();

    let mut tally = Tally::default();
    for _ in 0..options.rounds {
        for &player in &players {
            play_turn(&economy, player, &mut tally)?;
        }
        clock.advance(config.search_cooldown_secs.max(1));
    }

    print_summary(&economy, &players, &tally);
    Ok(())
}

/// One turn: search, craft the first affordable item, sell it.
fn play_turn(economy: &Economy, player: Address, tally: &mut Tally) -> EconomyResult<()> {
    match economy.search(player) {
        Ok(_) => tally.searches += 1,
        Err(EconomyError::CooldownActive { .. }) => tally.cooling += 1,
        Err(e) => return Err(e),
    }

    for kind in ItemKind::ALL.into_iter().rev() {
        match economy.craft(player, kind) {
            Ok(receipt) => {
                tally.crafted[kind.index()] += 1;
                economy.sell(player, kind, receipt.token_id)?;
                tally.sold += 1;
                break;
            }
            Err(EconomyError::InsufficientResources { .. }) => {}
            Err(e) => return Err(e),
        }
    }
    Ok(())
}

fn print_summary(economy: &Economy, players: &[Address], tally: &Tally) {
    println!("┌─ ACTIVITY ───────────────────────────────────────────────────────┐");
    println!("│ Searches:           {}", tally.searches);
    println!("│ Cooling rejections: {}", tally.cooling);
    for kind in ItemKind::ALL {
        println!("│ Crafted {:<19} {}", format!("{kind}:"), tally.crafted[kind.index()]);
    }
    println!("│ Sold:               {}", tally.sold);
    println!("└──────────────────────────────────────────────────────────────────┘");
    println!();

    println!("┌─ PLAYERS ────────────────────────────────────────────────────────┐");
    for &player in players {
        let balances: Vec<String> = (0..RESOURCE_TYPE_COUNT)
            .map(ResourceId::new)
            .map(|r| format!("{}={}", r.name(), economy.resource_balance(player, r)))
            .collect();
        println!("│ {player}");
        println!("│   {}", balances.join(" "));
        println!("│   reward: {}", economy.reward_balance(player));
    }
    println!("└──────────────────────────────────────────────────────────────────┘");
    println!();

    println!("┌─ SUPPLY ─────────────────────────────────────────────────────────┐");
    {
        let resources = economy.resources().lock();
        for resource in (0..RESOURCE_TYPE_COUNT).map(ResourceId::new) {
            println!("│ {:<20} {}", resource.name(), resources.total_supply(resource));
        }
    }
    for kind in ItemKind::ALL {
        let registry = economy.item(kind).lock();
        println!(
            "│ {:<20} live {}  minted {}",
            kind.name(),
            registry.total_supply(),
            registry.last_minted_token_id()
        );
    }
    let rewards = economy.rewards().lock();
    println!("│ {:<20} {}", rewards.symbol(), rewards.total_supply());
    drop(rewards);
    println!("└──────────────────────────────────────────────────────────────────┘");
    println!();
    println!("Events emitted: {}", economy.drain_events().len());
}
