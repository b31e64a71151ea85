//! Report and location picking command handlers

use crate::args::*;
use crate::commands::ReportCommands;
use crate::context::OutageMapCliContext;
use crate::output::*;
use crate::utils::*;
use outagemap::dedup::{Selection, SelectionOutcome};
use outagemap::geo::Coordinates;
use outagemap::models::{NewReport, Report, ReportDraft};
use serde::Serialize;

use super::spinner;

/// What `pick` did
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "result", rename_all = "snake_case")]
pub enum PickResult {
    /// Dry run: the classification only
    Planned { selection: Selection },

    /// An existing report was confirmed or merged into
    Resolved { outcome: SelectionOutcome },

    /// Nothing matched and a new report was created
    Created { report: Report },
}

pub async fn handle_report_command(
    cmd: ReportCommands,
    ctx: &OutageMapCliContext,
    output_format: &str,
) -> outagemap::Result<()> {
    match cmd {
        ReportCommands::Create(args) => {
            let report = create_report(ctx, args, output_format).await?;
            if is_json(output_format) {
                print_json(&report);
            } else {
                println!("{}", format_success("Report created"));
                print_report(&report);
            }
        }

        ReportCommands::Get(args) => {
            let id = resolve_report_id(ctx, &args.id).await?;
            let report = ctx.service.get_report(&id).await?;
            if is_json(output_format) {
                print_json(&report);
            } else {
                print_report(&report);
            }
        }

        ReportCommands::List(args) => {
            let reports = list_reports(ctx, &args).await?;
            if is_json(output_format) {
                print_json(&reports);
            } else {
                print_report_list(&reports);
            }
        }

        ReportCommands::Confirm(args) => {
            let outcome = confirm_report(ctx, &args.id).await?;
            if is_json(output_format) {
                print_json(&outcome);
            } else {
                print_outcome(&outcome);
            }
        }
    }

    Ok(())
}

pub async fn handle_pick_command(
    args: PickArgs,
    ctx: &OutageMapCliContext,
    output_format: &str,
) -> outagemap::Result<()> {
    let result = pick(ctx, &args, output_format).await?;

    if is_json(output_format) {
        print_json(&result);
        return Ok(());
    }

    match &result {
        PickResult::Planned { selection } => print_selection(selection),
        PickResult::Resolved { outcome } => print_outcome(outcome),
        PickResult::Created { report } => {
            println!("{}", format_success("No matching report nearby; created a new one"));
            print_report(report);
        }
    }
    Ok(())
}

pub async fn create_report(
    ctx: &OutageMapCliContext,
    args: CreateReportArgs,
    output_format: &str,
) -> outagemap::Result<Report> {
    let identity = ctx.require_identity()?;
    let service_type = parse_service_type(&args.service_type)?;

    let new_report = NewReport {
        service_type,
        provider: args.provider.trim().to_string(),
        title: args.title,
        description: args.description,
        location: Coordinates::new(args.lat, args.lng),
        location_name: args.location_name,
        user_id: identity.id.clone(),
        user_name: None,
    };

    let progress = spinner("Creating report...", output_format);
    let result = ctx.service.create_report(identity, new_report).await;
    if let Some(pb) = progress {
        pb.finish_and_clear();
    }
    result
}

pub async fn list_reports(
    ctx: &OutageMapCliContext,
    args: &ListReportsArgs,
) -> outagemap::Result<Vec<Report>> {
    let service_type = args
        .service_type
        .as_deref()
        .map(parse_service_type)
        .transpose()?;

    let reports = ctx.service.list_reports().await?;
    Ok(reports
        .into_iter()
        .filter(|r| service_type.is_none_or(|s| r.service_type == s))
        .filter(|r| {
            args.provider
                .as_deref()
                .is_none_or(|p| r.provider.to_lowercase().contains(&p.to_lowercase()))
        })
        .take(args.limit)
        .collect())
}

/// Confirm a report; anonymous confirmations go through this device's guard
pub async fn confirm_report(
    ctx: &OutageMapCliContext,
    id: &str,
) -> outagemap::Result<SelectionOutcome> {
    let id = resolve_report_id(ctx, id).await?;
    ctx.service
        .confirm_report(&id, ctx.identity.as_ref(), ctx.anonymous_guard())
        .await
}

/// Classify the picked point and apply the result
pub async fn pick(
    ctx: &OutageMapCliContext,
    args: &PickArgs,
    output_format: &str,
) -> outagemap::Result<PickResult> {
    let draft = ReportDraft::new(parse_service_type(&args.service_type)?, args.provider.clone());
    let point = Coordinates::new(args.lat, args.lng);

    let selection = ctx.service.classify(point, &draft).await?;
    tracing::debug!(action = selection.action.name(), "Point classified");
    if args.dry_run {
        return Ok(PickResult::Planned { selection });
    }

    let outcome = ctx
        .service
        .resolve(&selection, ctx.identity.as_ref(), ctx.anonymous_guard())
        .await?;

    let create_at = match outcome {
        SelectionOutcome::ReadyToCreate { point } => point,
        SelectionOutcome::ReportVanished { point } if args.create_if_vanished => point,
        outcome => return Ok(PickResult::Resolved { outcome }),
    };

    let identity = ctx.require_identity()?;
    let progress = spinner("Creating report...", output_format);
    let result = ctx
        .service
        .create_from_draft(
            identity,
            &draft,
            create_at,
            args.title.clone(),
            args.description.clone(),
        )
        .await;
    if let Some(pb) = progress {
        pb.finish_and_clear();
    }

    Ok(PickResult::Created { report: result? })
}
