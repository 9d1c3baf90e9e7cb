//! Ticket command handlers.

use std::sync::Arc;

use tabled::Tabled;
use tokio::sync::broadcast::error::RecvError;

use domainboard_core::csv;
use domainboard_core::query;
use domainboard_core::{
    Command as CoreCommand, Controller, PageSpec, QueryView, SellTicketRequest, Ticket,
    TicketColumn, TicketStatus,
};

use crate::cli::{GlobalOpts, OutputFormat, TicketsArgs, TicketsCommand};
use crate::config::{self, Config};
use crate::error::CliError;
use crate::output;
use crate::session::Session;

use super::util;

// ── Table row ───────────────────────────────────────────────────────

#[derive(Tabled)]
struct TicketRow {
    #[tabled(rename = "ID")]
    id: String,
    #[tabled(rename = "Customer")]
    customer: String,
    #[tabled(rename = "Domains")]
    domains: String,
    #[tabled(rename = "Requested")]
    requested: String,
    #[tabled(rename = "Status")]
    status: String,
    #[tabled(rename = "Price")]
    price: String,
}

fn paint_status(status: TicketStatus, color: bool) -> String {
    use owo_colors::OwoColorize;

    let label = status.to_string();
    if !color {
        return label;
    }
    match status {
        TicketStatus::New => label.yellow().bold().to_string(),
        TicketStatus::Read => label.cyan().to_string(),
        TicketStatus::Sold => label.green().to_string(),
        TicketStatus::Cancelled => label.red().to_string(),
    }
}

fn price(t: &Ticket) -> String {
    t.price.map_or_else(|| "-".into(), |p| format!("{p:.2}"))
}

impl TicketRow {
    fn new(t: &Ticket, color: bool) -> Self {
        Self {
            id: t.id.to_string(),
            customer: t.customer_id.clone(),
            domains: t.request_domains.join(", "),
            requested: util::when(t.request_time),
            status: paint_status(t.status, color),
            price: price(t),
        }
    }
}

fn detail(t: &Ticket, color: bool) -> String {
    let mut lines = vec![
        format!("ID:        {}", t.id),
        format!("Customer:  {}", t.customer_id),
        format!("Status:    {}", paint_status(t.status, color)),
        format!("Requested: {}", util::when(t.request_time)),
        format!("Price:     {}", price(t)),
        "Domains:".to_owned(),
    ];
    lines.extend(t.request_domains.iter().map(|d| format!("  - {d}")));
    if !t.note.is_empty() {
        lines.push(format!("Note:      {}", t.note));
    }
    lines.push(format!("Created:   {}", util::when(t.created_at)));
    lines.push(format!("Updated:   {}", util::when(t.updated_at)));
    lines.join("\n")
}

fn print_tickets(tickets: &[Ticket], global: &GlobalOpts) -> Result<(), CliError> {
    let color = output::should_color(&global.color);
    let out = output::render_list(
        &global.output,
        tickets,
        |t| TicketRow::new(t, color),
        |t| t.id.to_string(),
        csv::export_tickets,
    )?;
    output::print_output(&out, global.quiet);
    Ok(())
}

fn print_ticket(ticket: &Ticket, global: &GlobalOpts) -> Result<(), CliError> {
    let color = output::should_color(&global.color);
    let out = output::render_single(
        &global.output,
        ticket,
        |t| detail(t, color),
        |t| t.id.to_string(),
    )?;
    output::print_output(&out, global.quiet);
    Ok(())
}

fn done(global: &GlobalOpts, message: &str) {
    if !global.quiet {
        eprintln!("✓ {message}");
    }
}

/// Pair each requested name with whether it was among those sold.
///
/// An empty `sold` list sends no breakdown at all.
fn sold_breakdown(requested: &[String], sold: &[String]) -> Vec<(String, bool)> {
    if sold.is_empty() {
        return Vec::new();
    }
    requested
        .iter()
        .map(|r| {
            let was_sold = sold.iter().any(|s| s.eq_ignore_ascii_case(r));
            (r.clone(), was_sold)
        })
        .collect()
}

// ── Handler ─────────────────────────────────────────────────────────

pub async fn handle(args: TicketsArgs, global: &GlobalOpts, cfg: &Config) -> Result<(), CliError> {
    let live = matches!(args.command, TicketsCommand::Watch);
    let session = Session::open(global, cfg, live).await?;
    let result = run(args.command, session.controller(), global, cfg).await;
    session.finish(result).await
}

async fn run(
    cmd: TicketsCommand,
    controller: &Controller,
    global: &GlobalOpts,
    cfg: &Config,
) -> Result<(), CliError> {
    match cmd {
        TicketsCommand::List { filters, page } => {
            let filter = util::ticket_filter(&filters)?;
            let sort = util::sort_spec::<TicketColumn>(filters.sort.as_deref(), filters.order)?;
            let page = PageSpec::new(page.page, config::page_size(page.page_size, cfg));

            let view = QueryView::with_state(
                controller.store().tickets_owned(),
                filter,
                sort,
                page,
            );
            print_tickets(view.visible(), global)?;

            if matches!(global.output, OutputFormat::Table) && !global.quiet {
                eprintln!(
                    "{}",
                    util::footer(view.page().bounds(view.total()), view.total(), "tickets")
                );
            }
            Ok(())
        }

        TicketsCommand::Get { ticket } => {
            let found = controller.ticket(&ticket)?;
            print_ticket(&found, global)?;
            if found.is_new() {
                controller
                    .execute(CoreCommand::MarkTicketRead {
                        id: found.id.clone(),
                    })
                    .await?;
            }
            Ok(())
        }

        TicketsCommand::Read { ticket } => {
            let found = controller.ticket(&ticket)?;
            controller
                .execute(CoreCommand::MarkTicketRead {
                    id: found.id.clone(),
                })
                .await?;
            done(global, &format!("Ticket {} marked read", found.id));
            Ok(())
        }

        TicketsCommand::Sold {
            ticket,
            price,
            domains,
            note,
        } => {
            let found = controller.ticket(&ticket)?;
            let request = SellTicketRequest {
                price,
                sold_domains: sold_breakdown(&found.request_domains, &domains),
                note,
            };
            controller
                .execute(CoreCommand::SellTicket {
                    id: found.id.clone(),
                    request,
                })
                .await?;
            done(global, &format!("Ticket {} sold for {price:.2}", found.id));
            Ok(())
        }

        TicketsCommand::Cancel { ticket, note } => {
            let found = controller.ticket(&ticket)?;
            controller
                .execute(CoreCommand::CancelTicket {
                    id: found.id.clone(),
                    note,
                })
                .await?;
            done(global, &format!("Ticket {} cancelled", found.id));
            Ok(())
        }

        TicketsCommand::Note { ticket, text } => {
            let found = controller.ticket(&ticket)?;
            controller
                .execute(CoreCommand::UpdateTicketNote {
                    id: found.id.clone(),
                    note: text,
                })
                .await?;
            done(global, &format!("Note saved on ticket {}", found.id));
            Ok(())
        }

        TicketsCommand::Delete { ticket } => {
            let found = controller.ticket(&ticket)?;
            if !util::confirm(&format!("Delete ticket {}?", found.id), global.yes)? {
                return Ok(());
            }
            controller
                .execute(CoreCommand::DeleteTicket {
                    id: found.id.clone(),
                })
                .await?;
            done(global, &format!("Deleted ticket {}", found.id));
            Ok(())
        }

        TicketsCommand::Export { filters, file } => {
            let filter = util::ticket_filter(&filters)?;
            let sort = util::sort_spec::<TicketColumn>(filters.sort.as_deref(), filters.order)?;
            let rows = query::filtered(&controller.store().tickets_owned(), &filter, &sort);
            output::write_or_print(&csv::export_tickets(&rows), file.as_deref(), global.quiet)
        }

        TicketsCommand::Count => {
            let count = controller.new_ticket_count();
            match global.output {
                OutputFormat::Json | OutputFormat::JsonCompact | OutputFormat::Yaml => {
                    let value = serde_json::json!({ "count": count });
                    let out = output::render_single(
                        &global.output,
                        &value,
                        |_| String::new(),
                        |_| count.to_string(),
                    )?;
                    output::print_output(&out, global.quiet);
                }
                _ => output::print_output(&count.to_string(), global.quiet),
            }
            Ok(())
        }

        TicketsCommand::Watch => watch(controller, global).await,
    }
}

/// Print each pushed ticket until Ctrl-C.
async fn watch(controller: &Controller, global: &GlobalOpts) -> Result<(), CliError> {
    let mut tickets = controller.new_tickets();
    let color = output::should_color(&global.color);
    if !global.quiet {
        eprintln!(
            "Watching for new tickets ({} unread). Press Ctrl-C to stop.",
            controller.new_ticket_count()
        );
    }

    loop {
        tokio::select! {
            _ = tokio::signal::ctrl_c() => break,
            received = tickets.recv() => match received {
                Ok(ticket) => print_pushed(&ticket, global, color)?,
                Err(RecvError::Lagged(skipped)) => {
                    tracing::warn!(skipped, "watcher fell behind, some tickets were not shown");
                }
                Err(RecvError::Closed) => break,
            },
        }
    }
    Ok(())
}

fn print_pushed(ticket: &Arc<Ticket>, global: &GlobalOpts, color: bool) -> Result<(), CliError> {
    let out = match global.output {
        OutputFormat::Table => format!(
            "{}  {}  {}  {}",
            util::when(ticket.request_time.or(ticket.created_at)),
            paint_status(ticket.status, color),
            ticket.customer_id,
            ticket.request_domains.join(", ")
        ),
        // One record per line so the stream stays parseable.
        _ => output::render_single(
            &OutputFormat::JsonCompact,
            ticket.as_ref(),
            |_| String::new(),
            |t| t.id.to_string(),
        )?,
    };
    output::print_output(&out, global.quiet);
    Ok(())
}
