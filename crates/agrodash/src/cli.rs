//! Terminal rendering of analytics reports
//!
//! Every report renders either as pretty JSON (same shape as the library
//! serializes) or as comfy-table tables, one per section.

use agrodash_core::models::{
    FarmReport, FarmerReport, FarmsPerFarmer, GlobalReport, Metrics, MonthCount, OfficerIdentity,
    OfficerPerformance, OfficerReport, ReportSections, Section, SectionFailure, TypeCount,
};
use agrodash_core::LoadReport;
use comfy_table::{Cell, Color, ContentArrangement, Row, Table};
use serde::Serialize;

/// Output format selected by `--format`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Json,
    Table,
}

impl OutputFormat {
    pub fn parse(s: &str) -> Self {
        match s {
            "json" => OutputFormat::Json,
            _ => OutputFormat::Table,
        }
    }
}

// ============================================================================
// Table helpers
// ============================================================================

fn new_table(headers: &[&str], no_color: bool) -> Table {
    let mut table = Table::new();
    table.set_content_arrangement(ContentArrangement::Dynamic);

    // Apply colors only if enabled
    if no_color {
        table.set_header(headers.to_vec());
    } else {
        table.set_header(
            headers
                .iter()
                .map(|h| Cell::new(h).fg(Color::Cyan))
                .collect::<Vec<_>>(),
        );
    }
    table
}

fn heading(title: &str) -> String {
    format!("\n{}\n{}", title, "=".repeat(title.chars().count()))
}

const MONTHS: [&str; 12] = [
    "Jan", "Feb", "Mar", "Apr", "May", "Jun", "Jul", "Aug", "Sep", "Oct", "Nov", "Dec",
];

fn month_name(month: u32) -> &'static str {
    MONTHS
        .get(month.saturating_sub(1) as usize)
        .copied()
        .unwrap_or("?")
}

/// Render a section, or a one-line notice when it failed
fn render_section<T>(
    title: &str,
    section: &Section<T>,
    render: impl FnOnce(&T) -> String,
) -> String {
    match section {
        Section::Ready(value) => format!("{}\n{}", heading(title), render(value)),
        Section::Failed { failed } => format!("{}\n(unavailable: {})", heading(title), failed.reason),
    }
}

fn metrics_table(metrics: &Metrics, no_color: bool) -> String {
    let mut table = new_table(&["Entity", "Total"], no_color);
    for (kind, count) in metrics.entries() {
        table.add_row(Row::from(vec![kind.to_string(), count.to_string()]));
    }
    table.to_string()
}

fn type_counts_table(counts: &[TypeCount], no_color: bool) -> String {
    if counts.is_empty() {
        return "No records.".to_string();
    }
    let mut table = new_table(&["Type", "Count"], no_color);
    for group in counts {
        let label = group.category.as_deref().unwrap_or("(none)");
        table.add_row(Row::from(vec![label.to_string(), group.value.to_string()]));
    }
    table.to_string()
}

fn months_table(months: &[MonthCount], no_color: bool) -> String {
    if months.is_empty() {
        return "No records.".to_string();
    }
    let mut table = new_table(&["Month", "Count"], no_color);
    for bucket in months {
        table.add_row(Row::from(vec![
            month_name(bucket.month).to_string(),
            bucket.value.to_string(),
        ]));
    }
    table.to_string()
}

fn officer_performance_table(rows: &[OfficerPerformance], no_color: bool) -> String {
    if rows.is_empty() {
        return "No officers.".to_string();
    }
    let mut table = new_table(
        &["ID", "Name", "Email", "Farmers", "Farms", "Crops", "Livestock", "Allied"],
        no_color,
    );
    for row in rows {
        table.add_row(Row::from(vec![
            row.officer.id.to_string(),
            row.officer.name.clone(),
            row.officer.email.clone(),
            row.farmers.to_string(),
            row.farms.to_string(),
            row.crops.to_string(),
            row.livestock.to_string(),
            row.allied.to_string(),
        ]));
    }
    table.to_string()
}

fn farms_per_farmer_table(rows: &[FarmsPerFarmer], no_color: bool) -> String {
    if rows.is_empty() {
        return "No farms.".to_string();
    }
    let mut table = new_table(&["Farmer", "ID", "Farms"], no_color);
    for row in rows {
        table.add_row(Row::from(vec![
            row.farmer.clone(),
            row.farmer_id.to_string(),
            row.farms.to_string(),
        ]));
    }
    table.to_string()
}

fn failures_footer(failures: &[&SectionFailure]) -> Option<String> {
    if failures.is_empty() {
        return None;
    }
    let mut lines = vec![heading("Incomplete report")];
    for failure in failures {
        lines.push(format!(
            "  ! {} ({}): {}",
            failure.section, failure.scope, failure.reason
        ));
    }
    Some(lines.join("\n"))
}

fn to_json<T: Serialize>(report: &T) -> String {
    serde_json::to_string_pretty(report).unwrap_or_else(|_| "{}".to_string())
}

fn join_blocks(blocks: Vec<String>, failures: &[&SectionFailure]) -> String {
    let mut output = blocks;
    output.extend(failures_footer(failures));
    output.join("\n")
}

/// Count of items in a list section, "?" when it failed
fn section_len<T>(section: &Section<Vec<T>>) -> String {
    section
        .ready()
        .map(|items| items.len().to_string())
        .unwrap_or_else(|| "?".to_string())
}

// ============================================================================
// Report formatters
// ============================================================================

pub fn format_global_report(report: &GlobalReport, format: OutputFormat, no_color: bool) -> String {
    if format == OutputFormat::Json {
        return to_json(report);
    }

    let a = &report.analytics;
    let blocks = vec![
        render_section("Totals", &report.metrics, |m| metrics_table(m, no_color)),
        render_section("Officer performance", &a.officer_performance, |rows| {
            officer_performance_table(rows, no_color)
        }),
        render_section("Crop types", &a.crop_types, |c| type_counts_table(c, no_color)),
        render_section("Livestock types", &a.livestock_types, |c| {
            type_counts_table(c, no_color)
        }),
        render_section("Agro-allied types", &a.allied_types, |c| {
            type_counts_table(c, no_color)
        }),
        render_section("Crops per month", &a.monthly_crops, |m| months_table(m, no_color)),
        render_section("Livestock per month", &a.monthly_livestock, |m| {
            months_table(m, no_color)
        }),
        render_section("Agro-allied per month", &a.monthly_allied, |m| {
            months_table(m, no_color)
        }),
    ];

    join_blocks(blocks, &report.failures())
}

pub fn format_officer_report(
    report: &OfficerReport,
    format: OutputFormat,
    no_color: bool,
) -> String {
    if format == OutputFormat::Json {
        return to_json(report);
    }

    let identity = OfficerIdentity::from(&report.officer);
    let a = &report.analytics;
    let mut header = vec![
        format!("Officer:   {} ({})", identity.name, identity.id),
        format!("Username:  {}", identity.username),
        format!("Email:     {}", identity.email),
    ];
    if let Some(lga) = &report.officer.lga {
        header.push(format!("LGA:       {}", lga));
    }
    header.push(format!(
        "Records:   {} farmers, {} farms, {} crops, {} livestock, {} agro-allied",
        section_len(&report.farmers),
        section_len(&report.farms),
        section_len(&report.crops),
        section_len(&report.livestock),
        section_len(&report.agro_allieds),
    ));

    let blocks = vec![
        header.join("\n"),
        render_section("Totals", &report.metrics, |m| metrics_table(m, no_color)),
        render_section("Farms per farmer", &a.farms_per_farmer, |rows| {
            farms_per_farmer_table(rows, no_color)
        }),
        render_section("Crop types", &a.crop_types, |c| type_counts_table(c, no_color)),
        render_section("Livestock types", &a.livestock_types, |c| {
            type_counts_table(c, no_color)
        }),
        render_section("Agro-allied types", &a.allied_types, |c| {
            type_counts_table(c, no_color)
        }),
        render_section("Crops per month", &a.monthly_crops, |m| months_table(m, no_color)),
        render_section("Livestock per month", &a.monthly_livestock, |m| {
            months_table(m, no_color)
        }),
    ];

    join_blocks(blocks, &report.failures())
}

pub fn format_farmer_report(report: &FarmerReport, format: OutputFormat, no_color: bool) -> String {
    if format == OutputFormat::Json {
        return to_json(report);
    }

    let farmer = &report.farmer;
    let a = &report.analytics;
    let header = [
        format!("Farmer:       {} ({})", farmer.name, farmer.id),
        format!("National ID:  {}", farmer.national_id),
        format!("Officer:      {}", farmer.officer_id),
        format!(
            "Household:    {}",
            farmer
                .house_hold
                .map(|n| n.to_string())
                .unwrap_or_else(|| "-".to_string())
        ),
    ];

    let blocks = vec![
        header.join("\n"),
        render_section("Farms", &report.farms, |farms| {
            if farms.is_empty() {
                return "No farms.".to_string();
            }
            let mut table = new_table(&["ID", "Name", "Location", "Size (ha)"], no_color);
            for farm in farms {
                table.add_row(Row::from(vec![
                    farm.id.to_string(),
                    farm.name.clone(),
                    farm.location.clone(),
                    farm.size.map(|s| format!("{:.1}", s)).unwrap_or_else(|| "-".to_string()),
                ]));
            }
            table.to_string()
        }),
        render_section("Totals", &report.metrics, |m| metrics_table(m, no_color)),
        render_section("Crop types", &a.crop_types, |c| type_counts_table(c, no_color)),
        render_section("Livestock types", &a.livestock_types, |c| {
            type_counts_table(c, no_color)
        }),
        render_section("Agro-allied types", &a.allied_types, |c| {
            type_counts_table(c, no_color)
        }),
        render_section("Crops per month", &a.monthly_crops, |m| months_table(m, no_color)),
        render_section("Livestock per month", &a.monthly_livestock, |m| {
            months_table(m, no_color)
        }),
    ];

    join_blocks(blocks, &report.failures())
}

pub fn format_farm_report(report: &FarmReport, format: OutputFormat, no_color: bool) -> String {
    if format == OutputFormat::Json {
        return to_json(report);
    }

    let farm = &report.farm;
    let a = &report.analytics;
    let owner = match &report.farmer {
        Section::Ready(Some(farmer)) => format!("{} ({})", farmer.name, farmer.id),
        Section::Ready(None) => format!("unknown ({})", farm.farmer_id),
        Section::Failed { .. } => farm.farmer_id.to_string(),
    };
    let officer = match &report.officer {
        Section::Ready(Some(officer)) => format!("{} ({})", officer.name, officer.id),
        Section::Ready(None) => format!("unknown ({})", farm.officer_id),
        Section::Failed { .. } => farm.officer_id.to_string(),
    };
    let header = [
        format!("Farm:      {} ({})", farm.name, farm.id),
        format!("Location:  {}", farm.location),
        format!("Soil:      {}", farm.soil_type.as_deref().unwrap_or("-")),
        format!("Farmer:    {}", owner),
        format!("Officer:   {}", officer),
    ];

    let blocks = vec![
        header.join("\n"),
        render_section("Totals", &report.metrics, |m| metrics_table(m, no_color)),
        render_section("Crop types", &a.crop_types, |c| type_counts_table(c, no_color)),
        render_section("Livestock types", &a.livestock_types, |c| {
            type_counts_table(c, no_color)
        }),
        render_section("Agro-allied types", &a.allied_types, |c| {
            type_counts_table(c, no_color)
        }),
    ];

    join_blocks(blocks, &report.failures())
}

/// Summary of a snapshot load, one line per problem
pub fn format_load_report(report: &LoadReport) -> String {
    let (warnings, errors, fatal) = report.error_count();
    let mut lines = vec![format!(
        "Loaded {} records ({} rejected): {} warnings, {} errors, {} fatal",
        report.records_loaded, report.records_rejected, warnings, errors, fatal
    )];
    for error in &report.errors {
        lines.push(format!(
            "  [{:?}] {}: {}",
            error.severity, error.source, error.message
        ));
        if let Some(suggestion) = &error.suggestion {
            lines.push(format!("      hint: {}", suggestion));
        }
    }
    lines.join("\n")
}

// ============================================================================
// Tests
// ============================================================================
