//! Domain listing command handlers.

use std::path::Path;

use tabled::Tabled;

use domainboard_core::csv;
use domainboard_core::query;
use domainboard_core::{
    BulkAction, Category, Command as CoreCommand, CommandResult, Controller, CreateDomainsReport,
    Domain, DomainColumn, DomainName, ImportOutcome, PageSpec, PanelType, QueryView,
    SharedAccess, normalize_domain_name, same_panel,
};

use crate::cli::{
    BulkActionArg, DomainFieldArgs, DomainsArgs, DomainsCommand, GlobalOpts, OutputFormat,
};
use crate::config::{self, Config};
use crate::error::CliError;
use crate::output;
use crate::session::Session;

use super::util;

// ── Table row ───────────────────────────────────────────────────────

#[derive(Tabled)]
struct DomainRow {
    #[tabled(rename = "ID")]
    id: String,
    #[tabled(rename = "Domain")]
    name: String,
    #[tabled(rename = "Country")]
    country: String,
    #[tabled(rename = "Category")]
    category: String,
    #[tabled(rename = "DA")]
    da: i64,
    #[tabled(rename = "PA")]
    pa: i64,
    #[tabled(rename = "SS")]
    ss: i64,
    #[tabled(rename = "Price")]
    price: String,
    #[tabled(rename = "Status")]
    status: String,
    #[tabled(rename = "Channel")]
    channel: String,
}

impl DomainRow {
    fn new(d: &Domain, color: bool) -> Self {
        Self {
            id: d.id.to_string(),
            name: d.domain_name.to_string(),
            country: d.country.clone(),
            category: d.category.to_string(),
            da: d.da,
            pa: d.pa,
            ss: d.ss,
            price: format!("{:.2}", d.price),
            status: output::paint_flag(d.availability_label(), d.status, color),
            channel: output::paint_flag(d.channel_label(), d.ischannel, color),
        }
    }
}

fn masked(secret: &str) -> &str {
    if secret.is_empty() { "-" } else { "****" }
}

fn or_dash(s: &str) -> &str {
    if s.is_empty() { "-" } else { s }
}

fn detail(d: &Domain, color: bool) -> String {
    [
        format!("ID:               {}", d.id),
        format!("Domain:           {}", d.domain_name),
        format!("Country:          {}", or_dash(&d.country)),
        format!("Category:         {}", or_dash(d.category.as_str())),
        format!("Panel Type:       {}", d.panel_type),
        format!("DA / PA / SS:     {} / {} / {}", d.da, d.pa, d.ss),
        format!("Backlinks:        {}", d.backlink),
        format!("Price:            {:.2}", d.price),
        format!(
            "Status:           {}",
            output::paint_flag(d.availability_label(), d.status, color)
        ),
        format!(
            "Channel:          {}",
            output::paint_flag(d.channel_label(), d.ischannel, color)
        ),
        format!("Posted At:        {}", util::when(d.post_date_time)),
        format!("Shell Link:       {}", or_dash(&d.good_link)),
        format!("Panel Link:       {}", or_dash(&d.panel_link)),
        format!("Panel Username:   {}", or_dash(&d.panel_username)),
        format!("Panel Password:   {}", masked(&d.panel_password)),
        format!("Hosting Link:     {}", or_dash(&d.hosting_link)),
        format!("Hosting Username: {}", or_dash(&d.hosting_username)),
        format!("Hosting Password: {}", masked(&d.hosting_password)),
        format!("Created:          {}", util::when(d.created_at)),
        format!("Updated:          {}", util::when(d.updated_at)),
    ]
    .join("\n")
}

fn print_domains(domains: &[Domain], global: &GlobalOpts) -> Result<(), CliError> {
    let color = output::should_color(&global.color);
    let out = output::render_list(
        &global.output,
        domains,
        |d| DomainRow::new(d, color),
        |d| d.domain_name.to_string(),
        csv::export_domains,
    )?;
    output::print_output(&out, global.quiet);
    Ok(())
}

fn print_domain(domain: &Domain, global: &GlobalOpts) -> Result<(), CliError> {
    let color = output::should_color(&global.color);
    let out = output::render_single(
        &global.output,
        domain,
        |d| detail(d, color),
        |d| d.domain_name.to_string(),
    )?;
    output::print_output(&out, global.quiet);
    Ok(())
}

fn done(global: &GlobalOpts, message: &str) {
    if !global.quiet {
        eprintln!("✓ {message}");
    }
}

// ── Field editing ───────────────────────────────────────────────────

fn invalid(field: &str, reason: &str) -> CliError {
    CliError::Validation {
        field: field.into(),
        reason: reason.into(),
    }
}

fn check_metric(field: &str, value: Option<i64>) -> Result<(), CliError> {
    match value {
        Some(v) if !(0..=100).contains(&v) => Err(invalid(field, "must be between 0 and 100")),
        _ => Ok(()),
    }
}

fn check_fields(fields: &DomainFieldArgs) -> Result<(), CliError> {
    if let Some(price) = fields.price {
        if !price.is_finite() || price < 0.0 {
            return Err(invalid("price", "must be a non-negative number"));
        }
    }
    check_metric("da", fields.da)?;
    check_metric("pa", fields.pa)?;
    check_metric("ss", fields.ss)
}

/// Overlay the listing fields given on the command line.
fn apply_fields(d: &mut Domain, f: &DomainFieldArgs, with_access: bool) {
    let set = |target: &mut String, value: Option<&str>| {
        if let Some(v) = value {
            v.clone_into(target);
        }
    };

    set(&mut d.country, f.country.as_deref());
    if let Some(ref c) = f.category {
        d.category = c.parse::<Category>().unwrap_or_default();
    }
    if let Some(ref p) = f.panel_type {
        d.panel_type = p.parse::<PanelType>().unwrap_or_default();
    }
    if let Some(price) = f.price {
        d.price = price;
    }
    if let Some(v) = f.da {
        d.da = v;
    }
    if let Some(v) = f.pa {
        d.pa = v;
    }
    if let Some(v) = f.ss {
        d.ss = v;
    }
    if let Some(v) = f.backlink {
        d.backlink = v;
    }
    set(&mut d.good_link, f.good_link.as_deref());

    if with_access {
        set(&mut d.panel_link, f.panel_link.as_deref());
        set(&mut d.panel_username, f.panel_username.as_deref());
        set(&mut d.panel_password, f.panel_password.as_deref());
        set(&mut d.hosting_link, f.hosting_link.as_deref());
        set(&mut d.hosting_username, f.hosting_username.as_deref());
        set(&mut d.hosting_password, f.hosting_password.as_deref());
    }
}

fn shared_access(f: &DomainFieldArgs) -> SharedAccess {
    let take = |v: Option<&String>| v.cloned().unwrap_or_default();
    SharedAccess {
        panel_link: take(f.panel_link.as_ref()),
        panel_username: take(f.panel_username.as_ref()),
        panel_password: take(f.panel_password.as_ref()),
        hosting_link: take(f.hosting_link.as_ref()),
        hosting_username: take(f.hosting_username.as_ref()),
        hosting_password: take(f.hosting_password.as_ref()),
    }
}

/// Build the new listings, refusing anything the form would refuse.
fn new_domains(names: &[String], fields: &DomainFieldArgs) -> Result<Vec<Domain>, CliError> {
    check_fields(fields)?;
    if fields.country.as_deref().is_none_or(|c| c.trim().is_empty()) {
        return Err(invalid("country", "required"));
    }
    if fields.category.as_deref().is_none_or(|c| c.trim().is_empty()) {
        return Err(invalid("category", "required"));
    }
    if fields.price.is_none() {
        return Err(invalid("price", "required"));
    }

    let single = names.len() == 1;
    let mut domains = Vec::with_capacity(names.len());
    for raw in names {
        let name = normalize_domain_name(raw);
        if name.is_empty() {
            return Err(invalid("name", &format!("'{raw}' is not a domain name")));
        }
        let mut domain = Domain {
            domain_name: DomainName::new(name),
            status: true,
            ..Domain::default()
        };
        apply_fields(&mut domain, fields, single);
        domains.push(domain);
    }
    Ok(domains)
}

// ── Import ──────────────────────────────────────────────────────────

/// Validate a CSV locally, without contacting the API.
fn preview_import(file: &Path, global: &GlobalOpts) -> Result<(), CliError> {
    let text = util::read_text(file)?;
    let preview = csv::parse_import(&text);

    if !preview.missing_columns.is_empty() {
        return Err(invalid(
            "columns",
            &format!("missing {}", preview.missing_columns.join(", ")),
        ));
    }

    let domains: Vec<Domain> = preview.rows.iter().map(|r| r.domain.clone()).collect();
    print_domains(&domains, global)?;

    for e in &preview.errors {
        eprintln!("  row {}: {}", e.row, e.error);
    }
    if !global.quiet {
        eprintln!(
            "{} row(s) valid, {} invalid",
            preview.rows.len(),
            preview.errors.len()
        );
    }

    if preview.is_clean() {
        Ok(())
    } else {
        Err(CliError::InvalidImport {
            count: preview.errors.len(),
        })
    }
}

fn import_summary(outcome: &ImportOutcome) -> String {
    use std::fmt::Write;

    let s = &outcome.summary;
    let mut out = format!(
        "Rows: {}  Added: {}  Duplicates: {}  Errors: {}",
        s.total_rows, s.successful, s.duplicates, s.errors
    );
    for dup in &outcome.details.duplicates {
        let _ = write!(out, "\n  row {}: {} already exists", dup.row, dup.domain_name);
    }
    for err in &outcome.details.errors {
        let _ = write!(out, "\n  row {}: {}", err.row, err.error);
    }
    out
}

fn created_summary(report: &CreateDomainsReport) -> String {
    use std::fmt::Write;

    let mut out = format!(
        "Created {} domain(s), {} error(s)",
        report.created.len(),
        report.errors.len()
    );
    for err in &report.errors {
        let _ = write!(out, "\n  {err}");
    }
    out
}

// ── Handler ─────────────────────────────────────────────────────────

pub async fn handle(args: DomainsArgs, global: &GlobalOpts, cfg: &Config) -> Result<(), CliError> {
    match args.command {
        DomainsCommand::Template { file } => {
            output::write_or_print(&csv::import_template(), file.as_deref(), global.quiet)
        }

        DomainsCommand::Import {
            file,
            dry_run: true,
        } => preview_import(&file, global),

        // Read name lists before connecting so a bad path fails fast.
        DomainsCommand::Bulk {
            action,
            file: Some(file),
            ..
        } => {
            let names = util::read_names(&file)?;
            with_session(global, cfg, |c| bulk(c, action, names, global)).await
        }

        cmd => {
            let session = Session::open(global, cfg, false).await?;
            let result = run(cmd, session.controller(), global, cfg).await;
            session.finish(result).await
        }
    }
}

async fn with_session<F, Fut>(global: &GlobalOpts, cfg: &Config, f: F) -> Result<(), CliError>
where
    F: FnOnce(Controller) -> Fut,
    Fut: Future<Output = Result<(), CliError>>,
{
    let session = Session::open(global, cfg, false).await?;
    let result = f(session.controller().clone()).await;
    session.finish(result).await
}

#[allow(clippy::too_many_lines)]
async fn run(
    cmd: DomainsCommand,
    controller: &Controller,
    global: &GlobalOpts,
    cfg: &Config,
) -> Result<(), CliError> {
    match cmd {
        DomainsCommand::List { filters, page } => {
            let filter = util::domain_filter(&filters)?;
            let sort = util::sort_spec::<DomainColumn>(filters.sort.as_deref(), filters.order)?;
            let page = PageSpec::new(page.page, config::page_size(page.page_size, cfg));

            let view = QueryView::with_state(
                controller.store().domains_owned(),
                filter,
                sort,
                page,
            );
            print_domains(view.visible(), global)?;

            if matches!(global.output, OutputFormat::Table) && !global.quiet {
                eprintln!(
                    "{}",
                    util::footer(view.page().bounds(view.total()), view.total(), "domains")
                );
            }
            Ok(())
        }

        DomainsCommand::Get { domain } => print_domain(&*controller.domain(&domain)?, global),

        DomainsCommand::SamePanel { domain } => {
            let source = controller.domain(&domain)?;
            let all = controller.store().domains_owned();
            let matches: Vec<Domain> = same_panel(&source, &all)?.into_iter().cloned().collect();
            if matches.is_empty() && !global.quiet {
                eprintln!("No other domains share the panel of {}", source.domain_name);
                return Ok(());
            }
            print_domains(&matches, global)
        }

        DomainsCommand::Export { filters, file } => {
            let filter = util::domain_filter(&filters)?;
            let sort = util::sort_spec::<DomainColumn>(filters.sort.as_deref(), filters.order)?;
            let rows = query::filtered(&controller.store().domains_owned(), &filter, &sort);
            output::write_or_print(&csv::export_domains(&rows), file.as_deref(), global.quiet)
        }

        DomainsCommand::Import { file, .. } => {
            let result = controller
                .execute(CoreCommand::ImportDomains { path: file })
                .await?;
            if let CommandResult::Imported(outcome) = result {
                let out = output::render_single(&global.output, &outcome, import_summary, |o| {
                    o.summary.successful.to_string()
                })?;
                output::print_output(&out, global.quiet);
            }
            Ok(())
        }

        DomainsCommand::Create { names, fields } => {
            let mut domains = new_domains(&names, &fields)?;
            let cmd = if domains.len() == 1 {
                CoreCommand::CreateDomain {
                    domain: domains.remove(0),
                }
            } else {
                CoreCommand::CreateDomains {
                    domains,
                    access: shared_access(&fields),
                }
            };

            match controller.execute(cmd).await? {
                CommandResult::Domain(d) => print_domain(&d, global),
                CommandResult::Created(report) => {
                    print_domains(&report.created, global)?;
                    if !global.quiet {
                        eprintln!("{}", created_summary(&report));
                    }
                    Ok(())
                }
                _ => Ok(()),
            }
        }

        DomainsCommand::Update {
            domain,
            name,
            fields,
        } => {
            check_fields(&fields)?;
            let current = controller.domain(&domain)?;
            let mut updated = (*current).clone();
            if let Some(name) = name {
                let name = normalize_domain_name(&name);
                if name.is_empty() {
                    return Err(invalid("name", "cannot be empty"));
                }
                updated.domain_name = DomainName::new(name);
            }
            apply_fields(&mut updated, &fields, true);

            let result = controller
                .execute(CoreCommand::UpdateDomain {
                    id: current.id.clone(),
                    domain: updated,
                })
                .await?;
            if let CommandResult::Domain(d) = result {
                print_domain(&d, global)?;
            }
            Ok(())
        }

        DomainsCommand::Delete { domain } => {
            let target = controller.domain(&domain)?;
            if !util::confirm(&format!("Delete {}?", target.domain_name), global.yes)? {
                return Ok(());
            }
            controller
                .execute(CoreCommand::DeleteDomain {
                    id: target.id.clone(),
                })
                .await?;
            done(global, &format!("Deleted {}", target.domain_name));
            Ok(())
        }

        DomainsCommand::Sold { domain } => set_available(controller, &domain, false, global).await,
        DomainsCommand::Available { domain } => {
            set_available(controller, &domain, true, global).await
        }
        DomainsCommand::Post { domain } => set_posted(controller, &domain, true, global).await,
        DomainsCommand::Unpost { domain } => set_posted(controller, &domain, false, global).await,

        DomainsCommand::Bulk { action, names, .. } => {
            let names = names
                .iter()
                .map(|n| normalize_domain_name(n))
                .filter(|n| !n.is_empty())
                .collect();
            bulk(controller.clone(), action, names, global).await
        }

        DomainsCommand::Template { .. } => Ok(()),
    }
}

async fn set_available(
    controller: &Controller,
    key: &str,
    available: bool,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    let target = controller.domain(key)?;
    controller
        .execute(CoreCommand::SetDomainAvailable {
            id: target.id.clone(),
            available,
        })
        .await?;
    let label = if available { "available" } else { "sold" };
    done(global, &format!("{} marked {label}", target.domain_name));
    Ok(())
}

async fn set_posted(
    controller: &Controller,
    key: &str,
    posted: bool,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    let target = controller.domain(key)?;
    controller
        .execute(CoreCommand::SetDomainPosted {
            id: target.id.clone(),
            posted,
        })
        .await?;
    let label = if posted {
        "posted to the channel"
    } else {
        "removed from the channel"
    };
    done(global, &format!("{} {label}", target.domain_name));
    Ok(())
}

async fn bulk(
    controller: Controller,
    action: BulkActionArg,
    names: Vec<String>,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    let action = match action {
        BulkActionArg::MarkSold => BulkAction::MarkSold,
        BulkActionArg::MarkAvailable => BulkAction::MarkAvailable,
        BulkActionArg::PostToChannel => BulkAction::PostToChannel,
        BulkActionArg::RemoveFromChannel => BulkAction::RemoveFromChannel,
    };
    let result = controller
        .execute(CoreCommand::BulkAction { action, names })
        .await?;
    if let CommandResult::Bulk(r) = result {
        let out = output::render_single(
            &global.output,
            &r,
            |r| format!("{} succeeded, {} failed", r.successful, r.failed),
            |r| r.successful.to_string(),
        )?;
        output::print_output(&out, global.quiet);
    }
    Ok(())
}
