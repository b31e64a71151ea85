//! Feed and realtime command handlers

use crate::args::{NearbyArgs, WatchArgs};
use crate::commands::FeedCommands;
use crate::context::OutageMapCliContext;
use crate::output::*;
use chrono::Utc;
use colored::Colorize;
use outagemap::geo::Coordinates;
use tokio::sync::mpsc;

pub async fn handle_feed_command(
    cmd: FeedCommands,
    ctx: &OutageMapCliContext,
    output_format: &str,
) -> outagemap::Result<()> {
    match cmd {
        FeedCommands::Status => {
            let statuses = ctx.service.service_status(Utc::now()).await?;
            if is_json(output_format) {
                print_json(&statuses);
            } else {
                print_status(&statuses);
            }
        }

        FeedCommands::Nearby(args) => {
            let nearby = ctx
                .service
                .nearby_reports(origin(&args), Utc::now())
                .await?;
            if is_json(output_format) {
                print_json(&nearby);
            } else {
                print_nearby(&nearby);
            }
        }
    }

    Ok(())
}

fn origin(args: &NearbyArgs) -> Option<Coordinates> {
    match (args.lat, args.lng) {
        (Some(lat), Some(lng)) => Some(Coordinates::new(lat, lng)),
        _ => None,
    }
}

/// Print every snapshot until Ctrl-C or `--count` snapshots
pub async fn handle_watch_command(
    args: WatchArgs,
    ctx: &OutageMapCliContext,
    output_format: &str,
) -> outagemap::Result<()> {
    let (tx, mut rx) = mpsc::unbounded_channel();
    let subscription = ctx.service.subscribe(move |reports| {
        let _ = tx.send(reports);
    });

    if !is_json(output_format) {
        println!("{}", format_info("Watching reports. Press Ctrl-C to stop."));
    }

    let mut seen = 0usize;
    loop {
        tokio::select! {
            snapshot = rx.recv() => {
                let Some(reports) = snapshot else { break };
                seen += 1;
                if is_json(output_format) {
                    println!("{}", serde_json::to_string(&reports).unwrap_or_else(|_| "[]".to_string()));
                } else {
                    println!(
                        "{}",
                        format!("── {} ──", Utc::now().format("%H:%M:%S")).color(CliColors::muted())
                    );
                    print_report_list(&reports);
                }
                if args.count.is_some_and(|max| seen >= max) {
                    break;
                }
            }
            _ = tokio::signal::ctrl_c() => break,
        }
    }

    subscription.unsubscribe();
    Ok(())
}
