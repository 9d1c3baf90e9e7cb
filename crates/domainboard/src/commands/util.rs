//! Shared helpers for command handlers.

use std::path::Path;
use std::str::FromStr;

use chrono::NaiveDate;

use domainboard_core::{
    Category, DateRange, DomainFilter, NumericRange, SortOrder, SortSpec, TicketFilter,
    TicketStatus, lookup::search_terms,
};

use crate::cli::{
    AvailabilityArg, ChannelArg, DomainFilterArgs, OrderArg, TicketFilterArgs, TicketStatusArg,
};
use crate::error::CliError;

fn invalid(field: &str, reason: impl Into<String>) -> CliError {
    CliError::Validation {
        field: field.into(),
        reason: reason.into(),
    }
}

/// Parse `MIN:MAX` into an inclusive metric range.
pub fn parse_range(field: &str, raw: &str) -> Result<NumericRange, CliError> {
    let (min, max) = raw
        .split_once(':')
        .ok_or_else(|| invalid(field, format!("expected MIN:MAX, got '{raw}'")))?;
    let parse = |s: &str| {
        s.trim()
            .parse::<i64>()
            .map_err(|_| invalid(field, format!("'{s}' is not a whole number")))
    };
    Ok(NumericRange::new(parse(min)?, parse(max)?))
}

/// Parse `YYYY-MM-DD..YYYY-MM-DD` into a date window.
pub fn parse_window(field: &str, raw: &str) -> Result<DateRange, CliError> {
    let (start, end) = raw
        .split_once("..")
        .ok_or_else(|| invalid(field, format!("expected FROM..TO, got '{raw}'")))?;
    let parse = |s: &str| {
        NaiveDate::parse_from_str(s.trim(), "%Y-%m-%d")
            .map_err(|_| invalid(field, format!("'{s}' is not a YYYY-MM-DD date")))
    };
    Ok(DateRange::new(parse(start)?, parse(end)?))
}

fn optional<T>(
    field: &str,
    raw: Option<&str>,
    parse: impl Fn(&str, &str) -> Result<T, CliError>,
) -> Result<Option<T>, CliError> {
    raw.map(|r| parse(field, r)).transpose()
}

/// Sort column and direction; no column keeps the default newest-first order.
pub fn sort_spec<C>(column: Option<&str>, order: OrderArg) -> Result<SortSpec<C>, CliError>
where
    C: FromStr + Copy,
{
    let order = match order {
        OrderArg::Asc => SortOrder::Ascend,
        OrderArg::Desc => SortOrder::Descend,
    };
    match column {
        None => Ok(SortSpec {
            column: None,
            order,
        }),
        Some(raw) => {
            let column = raw
                .parse::<C>()
                .map_err(|_| invalid("sort", format!("unknown column '{raw}'")))?;
            Ok(SortSpec::new(column, order))
        }
    }
}

pub fn domain_filter(args: &DomainFilterArgs) -> Result<DomainFilter, CliError> {
    let range = |field: &str, raw: Option<&String>| -> Result<NumericRange, CliError> {
        Ok(optional(field, raw.map(String::as_str), parse_range)?.unwrap_or_default())
    };

    Ok(DomainFilter {
        domain_name: args.name.clone().unwrap_or_default(),
        countries: args.country.clone(),
        categories: args
            .category
            .iter()
            .map(|c| c.parse::<Category>().unwrap_or_default())
            .collect(),
        da_range: range("da", args.da.as_ref())?,
        pa_range: range("pa", args.pa.as_ref())?,
        ss_range: range("ss", args.ss.as_ref())?,
        status: args.status.map(|s| matches!(s, AvailabilityArg::Available)),
        ischannel: args.channel.map(|c| matches!(c, ChannelArg::Posted)),
        date_range: optional("created", args.created.as_deref(), parse_window)?,
        post_date_range: optional("posted", args.posted.as_deref(), parse_window)?,
    })
}

pub fn ticket_filter(args: &TicketFilterArgs) -> Result<TicketFilter, CliError> {
    Ok(TicketFilter {
        customer_id: args.customer.clone().unwrap_or_default(),
        status: args.status.map(|s| match s {
            TicketStatusArg::New => TicketStatus::New,
            TicketStatusArg::Read => TicketStatus::Read,
            TicketStatusArg::Sold => TicketStatus::Sold,
            TicketStatusArg::Cancelled => TicketStatus::Cancelled,
        }),
        domains: args.domain.clone(),
        date_range: optional("requested", args.requested.as_deref(), parse_window)?,
    })
}

/// `"11-20 of 42 domains"`, or a no-match note.
pub fn footer(bounds: Option<(usize, usize)>, total: usize, noun: &str) -> String {
    match bounds {
        Some((first, last)) => format!("{first}-{last} of {total} {noun}"),
        None if total == 0 => format!("No {noun} match"),
        None => format!("Page out of range ({total} {noun})"),
    }
}

/// Names from a file ("-" reads stdin), normalized, one per line.
pub fn read_names(path: &Path) -> Result<Vec<String>, CliError> {
    Ok(search_terms(&read_text(path)?))
}

pub fn read_text(path: &Path) -> Result<String, CliError> {
    if path.as_os_str() == "-" {
        return Ok(std::io::read_to_string(std::io::stdin())?);
    }
    Ok(std::fs::read_to_string(path)?)
}

/// Prompt for confirmation, auto-approving if `--yes` was passed.
pub fn confirm(message: &str, yes_flag: bool) -> Result<bool, CliError> {
    if yes_flag {
        return Ok(true);
    }
    if !std::io::IsTerminal::is_terminal(&std::io::stdin()) {
        return Err(CliError::NonInteractiveRequiresYes {
            action: message.into(),
        });
    }
    let confirmed = dialoguer::Confirm::new()
        .with_prompt(message)
        .default(false)
        .interact()
        .map_err(|e| CliError::Io(std::io::Error::other(e)))?;
    Ok(confirmed)
}

/// Render an optional timestamp for detail views.
pub fn when(at: Option<chrono::DateTime<chrono::Utc>>) -> String {
    at.map_or_else(|| "-".into(), |t| t.format("%Y-%m-%d %H:%M").to_string())
}
