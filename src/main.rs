use std::path::PathBuf;
use std::time::Duration;

use anyhow::{bail, Context, Result};
use bevy::app::ScheduleRunnerPlugin;
use bevy::prelude::*;

use battle_core::balance::{self, BalanceConfig};
use battle_core::battle_log::LogEntry;
use battle_core::engine::{BattleConfig, BattleFinished, BattleFrame, BattlePlugin};
use battle_core::logging::{self, TracingConfig};

struct Args {
    config_path: Option<PathBuf>,
    balance_battles: Option<u64>,
    verbose: bool,
}

fn parse_args() -> Result<Args> {
    parse_args_from(std::env::args().skip(1))
}

fn parse_args_from<I, S>(raw: I) -> Result<Args>
where
    I: IntoIterator<Item = S>,
    S: Into<String>,
{
    let mut args = Args {
        config_path: None,
        balance_battles: None,
        verbose: false,
    };
    let mut iter = raw.into_iter().map(Into::<String>::into);
    while let Some(arg) = iter.next() {
        match arg.as_str() {
            "--balance" => {
                let count = iter.next().context("--balance needs a battle count")?;
                args.balance_battles = Some(
                    count
                        .parse()
                        .with_context(|| format!("invalid battle count `{count}`"))?,
                );
            }
            "--verbose" => args.verbose = true,
            flag if flag.starts_with("--") => bail!("unknown flag `{flag}`"),
            path => args.config_path = Some(PathBuf::from(path)),
        }
    }
    Ok(args)
}

fn main() -> Result<()> {
    let args = parse_args()?;
    if args.verbose {
        logging::init_tracing(&TracingConfig::verbose());
    } else {
        logging::init_tracing_default();
    }

    let config = match &args.config_path {
        Some(path) => BattleConfig::from_path(path)
            .with_context(|| format!("loading battle config {}", path.display()))?,
        None => BattleConfig::default(),
    };

    if let Some(battles) = args.balance_battles {
        let report = balance::run_balance(&BalanceConfig {
            battles,
            battle: config,
            ..Default::default()
        })
        .context("balance run failed")?;
        println!("{}", report.to_json());
        return Ok(());
    }

    App::new()
        .add_plugins(
            MinimalPlugins.set(ScheduleRunnerPlugin::run_loop(Duration::from_secs_f64(
                1.0 / 60.0,
            ))),
        )
        .add_plugins(BattlePlugin::new(config))
        .add_systems(Update, (print_log_system, exit_on_finish_system))
        .run();

    Ok(())
}

/// Echo each new battle log line once
fn print_log_system(frame: Res<BattleFrame>, mut last_seen: Local<u64>) {
    let Some(snapshot) = &frame.0 else {
        return;
    };
    for message in fresh_messages(&snapshot.log, &mut last_seen) {
        tracing::info!("{}", message);
    }
}

/// Messages newer than `last_seen`, advancing it past them
fn fresh_messages<'a>(log: &'a [LogEntry], last_seen: &mut u64) -> Vec<&'a str> {
    let seen = *last_seen;
    let fresh: Vec<&LogEntry> = log.iter().filter(|e| e.id > seen).collect();
    if let Some(newest) = fresh.iter().map(|e| e.id).max() {
        *last_seen = newest;
    }
    fresh.into_iter().map(|e| e.message.as_str()).collect()
}

fn exit_on_finish_system(mut finished: EventReader<BattleFinished>, mut exit: EventWriter<AppExit>) {
    for event in finished.read() {
        tracing::info!(winner = %event.winner, "battle over");
        exit.send(AppExit::Success);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(id: u64, message: &str) -> LogEntry {
        LogEntry {
            id,
            message: message.to_string(),
            created_ms: 0.0,
        }
    }

    #[test]
    fn test_each_log_line_echoed_once() {
        let mut last_seen = 0;
        let log = vec![entry(1, "FIGHT"), entry(2, "first blood")];
        assert_eq!(fresh_messages(&log, &mut last_seen), vec!["FIGHT", "first blood"]);
        assert_eq!(last_seen, 2);
        assert!(fresh_messages(&log, &mut last_seen).is_empty());

        let log = vec![entry(2, "first blood"), entry(3, "crit")];
        assert_eq!(fresh_messages(&log, &mut last_seen), vec!["crit"]);
        assert_eq!(last_seen, 3);
    }

    #[test]
    fn test_verbose_flag_is_known() {
        assert!(matches!(
            parse_args_from(["--verbose", "battle.json"]),
            Ok(Args { verbose: true, .. })
        ));
        assert!(parse_args_from(["--loud"]).is_err());
    }
}
