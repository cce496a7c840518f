//! Interactive shell for the achievement tracker.
//!
//! Stands in for the original tool's GUI: lists the catalog, shows one
//! record, toggles planned/completed flags, prints the stats overview,
//! and saves. The engine never sees any of this; it is driven purely
//! through the library API.

use std::io::{self, BufRead, Write};
use std::path::PathBuf;
use std::process;

use tracing_subscriber::EnvFilter;

use trophy::{
    AchievementRecord, CatalogPaths, Grouping, Reclassify, ToggleOutcome, TrackerContext,
};

const ROMAN_TIERS: &[&str] = &["I", "II", "III", "IV", "V", "VI", "VII", "VIII", "IX", "X"];

const USAGE: &str = "\
trophy - achievement progress tracker

Usage: trophy [--catalog-dir DIR]

Options:
  --catalog-dir DIR  Load the definitions documents from DIR instead of
                     the platform data directory
  -v, --version      Print version
  -h, --help         Print this help";

fn main() -> io::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(io::stderr)
        .init();

    let args: Vec<String> = std::env::args().collect();
    let mut catalog_dir: Option<PathBuf> = None;
    if args.len() > 1 {
        match args[1].as_str() {
            "--catalog-dir" if args.len() > 2 => {
                catalog_dir = Some(PathBuf::from(&args[2]));
            }
            "--version" | "-v" => {
                println!("trophy {}", env!("CARGO_PKG_VERSION"));
                process::exit(0);
            }
            "--help" | "-h" => {
                println!("{USAGE}");
                process::exit(0);
            }
            other => {
                eprintln!("unknown argument: {other}\n\n{USAGE}");
                process::exit(2);
            }
        }
    }

    let paths = match catalog_dir {
        Some(dir) => CatalogPaths::in_dir(&dir),
        None => CatalogPaths::default_paths()?,
    };

    let mut ctx = match TrackerContext::load(paths) {
        Ok(ctx) => ctx,
        Err(err) => {
            eprintln!("failed to load achievement catalog: {err}");
            process::exit(1);
        }
    };

    println!(
        "Loaded {} achievements. Type `help` for commands.",
        ctx.store.len()
    );
    run_shell(&mut ctx)
}

fn run_shell(ctx: &mut TrackerContext) -> io::Result<()> {
    let stdin = io::stdin();
    let mut lines = stdin.lock().lines();
    loop {
        print!("> ");
        io::stdout().flush()?;
        let Some(line) = lines.next() else {
            break;
        };
        let line = line?;
        let words: Vec<&str> = line.split_whitespace().collect();
        match words.as_slice() {
            &[] => {}
            &["help"] => print_help(),
            &["quit"] | &["exit"] | &["q"] => break,
            &["list"] => list_records(ctx, None),
            &["list", "active"] => list_records(ctx, Some(Grouping::Active)),
            &["list", "completed"] => list_records(ctx, Some(Grouping::Completed)),
            &["show", index] => show_record(ctx, index),
            &["stats"] => print_stats(ctx),
            &["save"] => match ctx.save() {
                Ok(0) => println!("Nothing to save."),
                Ok(n) => println!("Saved {n} record(s)."),
                Err(err) => println!("Save failed, changes kept in memory: {err}"),
            },
            &["done", index] => toggle(ctx, index, None, Action::Completed, true),
            &["done", index, tier] => toggle(ctx, index, Some(tier), Action::Completed, true),
            &["undo", index] => toggle(ctx, index, None, Action::Completed, false),
            &["undo", index, tier] => toggle(ctx, index, Some(tier), Action::Completed, false),
            &["plan", index] => toggle(ctx, index, None, Action::Planned, true),
            &["plan", index, tier] => toggle(ctx, index, Some(tier), Action::Planned, true),
            &["unplan", index] => toggle(ctx, index, None, Action::Planned, false),
            &["unplan", index, tier] => toggle(ctx, index, Some(tier), Action::Planned, false),
            _ => println!("Unknown command; type `help`."),
        }
    }
    if !ctx.store.dirty_indices().is_empty() {
        println!("Note: unsaved changes were discarded.");
    }
    Ok(())
}

fn print_help() {
    println!(
        "\
Commands:
  list [active|completed]   List achievements
  show N                    Show one achievement in full
  done N [TIER]             Mark completed (TIER like II for leveled)
  undo N [TIER]             Unmark completed
  plan N [TIER]             Mark planned
  unplan N [TIER]           Unmark planned
  stats                     Progress overview
  save                      Write changes back to the catalog
  quit                      Exit (unsaved changes are discarded)"
    );
}

enum Action {
    Completed,
    Planned,
}

fn parse_index(ctx: &TrackerContext, word: &str) -> Option<usize> {
    let n: usize = word.parse().ok()?;
    let index = n.checked_sub(1)?;
    if index < ctx.store.len() {
        Some(index)
    } else {
        None
    }
}

/// Accepts a roman numeral ("II") or a 1-based number.
fn parse_tier(word: &str) -> Option<usize> {
    if let Some(i) = ROMAN_TIERS.iter().position(|r| r.eq_ignore_ascii_case(word)) {
        return Some(i);
    }
    word.parse::<usize>().ok()?.checked_sub(1)
}

fn toggle(ctx: &mut TrackerContext, index: &str, tier: Option<&str>, action: Action, on: bool) {
    let Some(index) = parse_index(ctx, index) else {
        println!("No achievement with that number; see `list`.");
        return;
    };
    let tier = match tier {
        Some(word) => match parse_tier(word) {
            Some(t) => Some(t),
            None => {
                println!("Tiers look like II or 2.");
                return;
            }
        },
        // Leveled families default to their currently displayed tier.
        None => match ctx.store.get(index) {
            Some(AchievementRecord::Leveled(f)) => Some(f.active_tier()),
            _ => None,
        },
    };
    let result = match action {
        Action::Completed => ctx.toggle_completed(index, tier, on),
        Action::Planned => ctx.toggle_planned(index, tier, on),
    };
    match result {
        Ok(outcome) => report_outcome(ctx, index, &outcome),
        Err(err) => println!("{err}"),
    }
}

fn report_outcome(ctx: &TrackerContext, index: usize, outcome: &ToggleOutcome) {
    if !outcome.changed {
        println!("Already in that state.");
        return;
    }
    let title = ctx.store.get(index).map(|r| r.title()).unwrap_or("?");
    match outcome.reclassify {
        Reclassify::ToCompleted => println!("{title} moved to the completed list."),
        Reclassify::ToActive => println!("{title} moved back to the active list."),
        Reclassify::None => {
            if let Some(tier) = outcome.active_tier {
                let label = ROMAN_TIERS.get(tier).copied().unwrap_or("?");
                println!("{title}: now showing tier {label}.");
            } else {
                println!("{title} updated.");
            }
        }
    }
}

fn list_records(ctx: &TrackerContext, grouping: Option<Grouping>) {
    for (i, record) in ctx.store.records().iter().enumerate() {
        if let Some(wanted) = grouping {
            if record.grouping() != wanted {
                continue;
            }
        }
        let mark = match record.grouping() {
            Grouping::Completed => 'x',
            Grouping::Active => ' ',
        };
        match record {
            AchievementRecord::Leveled(f) => {
                let tier = f.active_tier();
                let label = &f.levels[tier].rom_num;
                println!(
                    "{:>3}. [{mark}] {} {label} ({}) - {}",
                    i + 1,
                    f.title,
                    f.category,
                    f.level_description(tier)
                );
            }
            AchievementRecord::List(a) => {
                println!(
                    "{:>3}. [{mark}] {} ({}) - {}",
                    i + 1,
                    a.title,
                    a.category,
                    a.description
                );
            }
        }
    }
}

fn show_record(ctx: &TrackerContext, index: &str) {
    let Some(index) = parse_index(ctx, index) else {
        println!("No achievement with that number; see `list`.");
        return;
    };
    let Some(record) = ctx.store.get(index) else {
        return;
    };
    match record {
        AchievementRecord::Leveled(f) => {
            println!("{} ({})", f.title, f.category);
            for (i, level) in f.levels.iter().enumerate() {
                let mark = if level.completed {
                    'x'
                } else if level.planned {
                    '*'
                } else {
                    ' '
                };
                let reward = ctx
                    .rewards
                    .label(&level.reward)
                    .unwrap_or(level.reward.as_str());
                println!(
                    "  [{mark}] {:<4} {} ({} pts, {} x {reward})",
                    level.rom_num,
                    f.level_description(i),
                    level.points,
                    level.reward_amount
                );
            }
            if !f.info.is_empty() {
                println!("  {}", f.info);
            }
        }
        AchievementRecord::List(a) => {
            let mark = if a.completed {
                'x'
            } else if a.planned {
                '*'
            } else {
                ' '
            };
            let reward = ctx.rewards.label(&a.reward).unwrap_or(a.reward.as_str());
            println!("[{mark}] {} ({})", a.title, a.category);
            println!("  {}", a.description);
            for task in &a.task_list {
                println!("  - {task}");
            }
            println!("  {} pts, {} x {reward}", a.points, a.reward_amount);
            if !a.info.is_empty() {
                println!("  {}", a.info);
            }
        }
    }
}

fn print_stats(ctx: &TrackerContext) {
    let overview = ctx.overview();
    println!(
        "{:<20} {:>12} {:>12} {:>12}",
        "", "completed", "planned", "possible"
    );
    let mut rows = vec![&overview.overall];
    rows.extend(overview.categories.iter());
    for row in rows {
        println!(
            "{:<20} {:>8} ach {:>8} ach {:>8} ach",
            row.label,
            row.completed_achievements,
            row.planned_achievements,
            row.possible_achievements
        );
        println!(
            "{:<20} {:>8} pts {:>8} pts {:>8} pts",
            "", row.completed_points, row.planned_points, row.possible_points
        );
    }
    println!();
    for reward in &overview.rewards {
        let label = ctx
            .rewards
            .label(&reward.currency)
            .unwrap_or(reward.currency.as_str());
        println!(
            "{:<24} {:>10} earned {:>10} planned {:>10} possible",
            label, reward.completed, reward.planned, reward.possible
        );
    }
}
