//! `search`: bulk lookup of a name list against the listings.

use indicatif::{ProgressBar, ProgressStyle};
use tabled::Tabled;

use domainboard_core::csv;
use domainboard_core::{SearchReport, SearchRow, bulk_search_chunked};

use crate::cli::{GlobalOpts, SearchArgs};
use crate::config::Config;
use crate::error::CliError;
use crate::output;
use crate::session::Session;

use super::util;

#[derive(Tabled)]
struct SearchLine {
    #[tabled(rename = "Input")]
    input: String,
    #[tabled(rename = "Found")]
    found: String,
    #[tabled(rename = "Country")]
    country: String,
    #[tabled(rename = "DA")]
    da: String,
    #[tabled(rename = "Price")]
    price: String,
    #[tabled(rename = "Status")]
    status: String,
}

impl SearchLine {
    fn new(row: &SearchRow, color: bool) -> Self {
        let found = output::paint_flag(if row.found { "yes" } else { "no" }, row.found, color);
        match row.domain {
            Some(ref d) => Self {
                input: row.input.clone(),
                found,
                country: d.country.clone(),
                da: d.da.to_string(),
                price: format!("{:.2}", d.price),
                status: d.availability_label().into(),
            },
            None => Self {
                input: row.input.clone(),
                found,
                country: String::new(),
                da: String::new(),
                price: String::new(),
                status: String::new(),
            },
        }
    }
}

fn progress_bar(quiet: bool) -> ProgressBar {
    if quiet {
        return ProgressBar::hidden();
    }
    let bar = ProgressBar::new(0);
    if let Ok(style) = ProgressStyle::with_template("{spinner} searching [{bar:30}] {pos}/{len}") {
        bar.set_style(style.progress_chars("=> "));
    }
    bar
}

fn summary(report: &SearchReport) -> String {
    format!(
        "Searched {}: {} found, {} not found",
        report.total, report.found, report.not_found
    )
}

pub async fn handle(args: SearchArgs, global: &GlobalOpts, cfg: &Config) -> Result<(), CliError> {
    // Read the list before connecting so a bad path fails fast.
    let input = util::read_text(&args.file)?;

    let session = Session::open(global, cfg, false).await?;
    let all = session.controller().store().domains_owned();
    session.finish(Ok(())).await?;

    let bar = progress_bar(global.quiet);
    let report = bulk_search_chunked(&input, &all, |done, total| {
        bar.set_length(u64::try_from(total).unwrap_or(u64::MAX));
        bar.set_position(u64::try_from(done).unwrap_or(u64::MAX));
    })
    .await;
    bar.finish_and_clear();

    let color = output::should_color(&global.color);
    let out = output::render_list(
        &global.output,
        &report.rows,
        |r| SearchLine::new(r, color),
        |r| r.input.clone(),
        csv::export_search_results,
    )?;
    output::print_output(&out, global.quiet);

    if !global.quiet {
        eprintln!("{}", summary(&report));
    }

    if let Some(path) = args.export {
        output::write_or_print(
            &csv::export_search_results(&report.rows),
            Some(&path),
            global.quiet,
        )?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use domainboard_core::{Domain, DomainName, bulk_search};

    #[test]
    fn summary_counts_both_buckets() {
        let all = vec![Domain {
            domain_name: DomainName::new("a.com"),
            ..Domain::default()
        }];
        let report = bulk_search("A.com\nb.com\n\n", &all);
        assert_eq!(summary(&report), "Searched 2: 1 found, 1 not found");

        let line = SearchLine::new(&report.rows[1], false);
        assert_eq!(line.found, "no");
        assert!(line.country.is_empty());
    }
}
