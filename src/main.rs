// Entry point and high-level CLI flow.
//
// All four source documents are loaded up front; after the load barrier every
// menu option recomputes its view in full from the raw data plus the current
// filter selections, prints a preview and writes the exports.
use std::io::{self, Write};

use anyhow::Result;
use clap::{Parser, ValueEnum};
use serde::Serialize;
use tracing_subscriber::EnvFilter;

use atlas_report::filter::{HighlightCriteria, NumOp, Selection, StationSelection};
use atlas_report::loader::{self, DataSources, LoadReport};
use atlas_report::metrics::{self, Verdict};
use atlas_report::output;
use atlas_report::present::{self, CategoryField, StatCard};
use atlas_report::region;
use atlas_report::series;
use atlas_report::state::AppState;
use atlas_report::util;

#[derive(Parser, Debug)]
#[command(name = "atlas_report", about = "Partner logistics dashboard and report generator")]
struct Args {
    /// Scorecard JSON document (path or http(s) URL).
    #[arg(long, default_value = "data/scorecard.json")]
    scorecard: String,

    /// Partner map JSON document.
    #[arg(long, default_value = "data/map_data.json")]
    map_data: String,

    /// Cluster polygons GeoJSON.
    #[arg(long, default_value = "data/clusters.geojson")]
    clusters: String,

    /// Delivery-station jurisdiction GeoJSON.
    #[arg(long, default_value = "data/jurisdictions.geojson")]
    jurisdictions: String,

    /// Directory for CSV/JSON exports.
    #[arg(long, default_value = "out")]
    out_dir: String,

    /// Generate a single report and exit instead of running the menu.
    #[arg(long, value_enum)]
    report: Option<Report>,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum Report {
    Performance,
    Expansion,
    Routes,
    Scorecard,
    Podiums,
    Trend,
    Markers,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();
    let args = Args::parse();

    let sources = DataSources {
        scorecard: args.scorecard.clone(),
        map: args.map_data.clone(),
        clusters: args.clusters.clone(),
        jurisdictions: args.jurisdictions.clone(),
    };
    let (scorecard, mut map, load_report) = loader::load_all(&sources).await?;
    region::associate_regions(&mut map.partners, &map.regions);
    print_load_report(&load_report);

    let mut state = AppState::new(scorecard, map);

    if let Some(report) = args.report {
        run_report(&state, report, &args.out_dir);
        return Ok(());
    }

    loop {
        println!("Select a view:");
        println!("[1] Set map filters");
        println!("[2] Set scorecard filters");
        println!("[3] Performance report");
        println!("[4] Expansion report");
        println!("[5] Routes report");
        println!("[6] Scorecard overview");
        println!("[7] Origin podiums");
        println!("[8] Trend projection");
        println!("[9] Search partner");
        println!("[10] Highlight stores");
        println!("[11] Map markers");
        println!("[12] Plan route");
        println!("[13] Reset filters");
        println!("[0] Exit\n");
        match read_choice().as_str() {
            "1" => handle_map_filters(&mut state),
            "2" => handle_scorecard_filters(&mut state),
            "3" => handle_performance(&state, &args.out_dir),
            "4" => handle_expansion(&state, &args.out_dir),
            "5" => handle_routes(&state, &args.out_dir),
            "6" => handle_scorecard(&state, &args.out_dir),
            "7" => handle_podiums(&state),
            "8" => handle_trend(&state, &args.out_dir),
            "9" => handle_search(&state),
            "10" => handle_highlight(&state),
            "11" => handle_markers(&state, &args.out_dir),
            "12" => handle_route(&state, &args.out_dir),
            "13" => {
                state.reset_filters();
                println!("All filters reset.\n");
            }
            "0" => {
                println!("Exiting the program.");
                break;
            }
            _ => println!("Invalid choice. Please enter 0-13.\n"),
        }
    }
    Ok(())
}

fn run_report(state: &AppState, report: Report, out_dir: &str) {
    match report {
        Report::Performance => handle_performance(state, out_dir),
        Report::Expansion => handle_expansion(state, out_dir),
        Report::Routes => handle_routes(state, out_dir),
        Report::Scorecard => handle_scorecard(state, out_dir),
        Report::Podiums => handle_podiums(state),
        Report::Trend => handle_trend(state, out_dir),
        Report::Markers => render_markers(state, out_dir, CategoryField::Status),
    }
}

fn print_load_report(report: &LoadReport) {
    println!(
        "Processing datasets... ({} partners, {} contact rows, {} daily rows)",
        util::format_int(report.partners),
        util::format_int(report.contacts),
        util::format_int(report.daily_days)
    );
    println!(
        "Loaded {} cluster polygons and {} jurisdiction outlines.",
        util::format_int(report.regions),
        util::format_int(report.jurisdictions)
    );
    if report.skipped_features > 0 {
        println!(
            "Note: {} polygon features skipped due to missing geometry or properties.",
            util::format_int(report.skipped_features)
        );
    }
    println!();
}

/// Read a single line of input after printing the common "Enter choice:"
/// prompt.
fn read_choice() -> String {
    prompt("Enter choice: ")
}

fn prompt(label: &str) -> String {
    print!("{label}");
    let _ = io::stdout().flush();
    let mut buf = String::new();
    io::stdin().read_line(&mut buf).ok();
    buf.trim().to_string()
}

fn handle_map_filters(state: &mut AppState) {
    println!("Known stations: {}", state.station_choices().join(", "));
    println!("Known initiatives: {}", state.initiative_choices().join(", "));
    state.map_filters.status = Selection::parse(&prompt("Status (or 'all'): "));
    state.map_filters.stations =
        StationSelection::parse(&prompt("Delivery stations (comma-separated, or 'all'): "));
    state.map_filters.initiative = Selection::parse(&prompt("Initiative (or 'all'): "));
    state.map_filters.jurisdiction = Selection::parse(&prompt("Jurisdiction type (or 'all'): "));
    println!(
        "Map filters updated; {} partners in view.\n",
        state.filtered_partners().len()
    );
}

fn handle_scorecard_filters(state: &mut AppState) {
    println!("Known owners: {}", state.owner_choices().join(", "));
    println!("Known origins: {}", state.origin_choices().join(", "));
    state.scorecard_filters.owner = Selection::parse(&prompt("Owner (or 'all'): "));
    state.scorecard_filters.origin = Selection::parse(&prompt("Origin (or 'all'): "));
    println!(
        "Scorecard filters updated; {} contact rows in view.\n",
        state.filtered_contacts().len()
    );
}

fn handle_performance(state: &AppState, out_dir: &str) {
    let partners = state.filtered_partners();
    if partners.is_empty() {
        println!("No partners match the current filters.\n");
        return;
    }
    println!("Performance Report (filtered partners)\n");
    let stats = metrics::performance_stats(&partners);
    let goals = metrics::performance_goals(&stats, state.period_days());
    print_cards(&present::performance_cards(&stats, &goals));
    let rows = present::performance_rows(&partners);
    output::preview_table(&rows, 10);
    export_csv(out_dir, "performance_report.csv", &rows);
}

fn handle_expansion(state: &AppState, out_dir: &str) {
    let partners = state.filtered_partners();
    let regions = state.visible_regions();
    if regions.is_empty() {
        println!("No regions match the current filters.\n");
        return;
    }
    println!("Expansion Report (regions in view)\n");
    let stats = metrics::region_stats(&partners, &regions);
    print_cards(&present::expansion_cards(&metrics::expansion_totals(
        &partners, &regions,
    )));
    let rows = present::expansion_rows(&stats);
    output::preview_table(&rows, 10);
    export_csv(out_dir, "expansion_report.csv", &rows);
    export_json(
        out_dir,
        "region_overlays.json",
        &present::region_overlays(&stats, &regions),
    );
}

fn handle_routes(state: &AppState, out_dir: &str) {
    let partners = state.filtered_partners();
    let routes = metrics::route_stats(&partners);
    if routes.is_empty() {
        println!("No supply runs match the current filters.\n");
        return;
    }
    println!("Routes Report (supply runs in view)\n");
    print_cards(&present::route_cards(&metrics::route_summary(
        &partners, &routes,
    )));
    let rows = present::route_rows(&routes);
    output::preview_table(&rows, 10);
    export_csv(out_dir, "routes_report.csv", &rows);
}

fn handle_scorecard(state: &AppState, out_dir: &str) {
    println!("Scorecard Overview\n");
    print_cards(&present::kpi_cards(&metrics::general_kpis(
        &state.scorecard.attainment,
    )));

    let goal_rows = vec![
        present::goal_progress("Contacts", &state.scorecard.attainment.contacts),
        present::goal_progress("Registrations", &state.scorecard.attainment.registrations),
    ];
    output::preview_table(&goal_rows, goal_rows.len());

    // The best-origin panel always ranks the full summary; only the per-owner
    // cards and the detail table honor the filters.
    if let Some(best) = present::best_origin_card(&state.scorecard.summary) {
        println!(
            "Best origin: {} ({} rate, {} registrations / {} contacts)\n",
            best.origin, best.rate, best.registrations, best.contacts
        );
    }

    // Best-origin derivation inside the cards always scans the full summary,
    // so an active origin filter cannot echo itself back.
    let owner_rows =
        present::owner_cards(&state.filtered_owner_summaries(), &state.scorecard.summary);
    let contacts = state.filtered_contacts();
    output::preview_table(&owner_rows, 10);

    if contacts.is_empty() {
        println!("No contact rows match the current filters.\n");
        return;
    }
    let headers = present::detail_headers(&contacts);
    let rows = present::detail_rows(&contacts);
    output::preview_rows(&headers, &rows, 5);
    match output::export_path(out_dir, "scorecard_detail.csv")
        .and_then(|p| output::write_csv_rows(&p, &headers, &rows))
    {
        Ok(()) => println!("(Full table exported to {out_dir}/scorecard_detail.csv)\n"),
        Err(e) => eprintln!("Write error: {e}"),
    }
}

fn handle_podiums(state: &AppState) {
    let podiums = present::origin_podiums(&state.scorecard.summary);
    if podiums.is_empty() {
        println!("No contact rows available.\n");
        return;
    }
    for (origin, entries) in &podiums {
        println!("Origin: {origin}");
        output::preview_table(entries, entries.len());
    }
}

fn handle_trend(state: &AppState, out_dir: &str) {
    let daily = &state.scorecard.daily;
    if daily.is_empty() {
        println!("No daily history available.\n");
        return;
    }
    let today = chrono::Local::now().date_naive();
    let horizon = series::days_left_in_month(today) as usize;
    let projection = series::project(daily, horizon);
    println!(
        "Trend projection: {} historical days, {} projected days.",
        projection.history_len, horizon
    );
    println!(
        "Month-end estimate: {} contacts, {} registrations (targets {} / {}).\n",
        util::format_number(projection.contacts.last().copied().unwrap_or(0.0), 0),
        util::format_number(projection.registrations.last().copied().unwrap_or(0.0), 0),
        util::format_number(projection.contact_target.last().copied().unwrap_or(0.0), 0),
        util::format_number(
            projection.registration_target.last().copied().unwrap_or(0.0),
            0
        ),
    );
    let datasets = present::temporal_chart(&projection);
    export_json(
        out_dir,
        "trend_chart.json",
        &serde_json::json!({
            "labels": projection.labels,
            "history_len": projection.history_len,
            "datasets": datasets,
        }),
    );
}

fn handle_search(state: &AppState) {
    let term = prompt("Store id or name: ");
    let Some(p) = atlas_report::filter::find_partner(&state.map.partners, &term) else {
        println!("No partner matches '{term}'.\n");
        return;
    };
    println!(
        "{} ({}) - {} / {} / region {}",
        p.name,
        p.store_id,
        p.status,
        p.delivery_station,
        p.region.as_deref().unwrap_or(region::UNASSIGNED_REGION)
    );
    println!(
        "ADV {:.0} (station active mean {:.0}), eligible packages {:.0}, overlaps {:.0}",
        p.adv,
        metrics::station_adv_mean(&state.map.partners, &p.delivery_station),
        p.eligible_packages,
        p.overlapping_count
    );
    if p.overlaps.is_empty() {
        println!("No overlapping stores recorded.\n");
        return;
    }
    let rows = metrics::comparison_rows(p);
    let mut headers = vec!["Metric".to_string(), p.store_id.clone()];
    headers.extend(rows[0].overlaps.iter().map(|c| c.store_id.clone()));
    let cells: Vec<Vec<String>> = rows
        .iter()
        .map(|r| {
            let mut row = vec![
                r.metric.to_string(),
                r.primary
                    .map(|v| format!("{v:.1}"))
                    .unwrap_or_else(|| present::NOT_AVAILABLE.to_string()),
            ];
            row.extend(
                r.overlaps
                    .iter()
                    .map(|c| format!("{:.1} ({})", c.value, verdict_label(c.verdict))),
            );
            row
        })
        .collect();
    output::preview_rows(&headers, &cells, cells.len());
}

fn verdict_label(v: Verdict) -> &'static str {
    match v {
        Verdict::Better => "better",
        Verdict::Worse => "worse",
        Verdict::Even => "even",
    }
}

fn handle_highlight(state: &AppState) {
    println!("Thresholds are entered as 'op value' (op: gt, lt, eq); blank skips a test.");
    let (eligible_op, eligible_val) = parse_criterion(&prompt("Eligible packages: "));
    let (adv_op, adv_val) = parse_criterion(&prompt("ADV: "));
    let (overlapping_op, overlapping_val) = parse_criterion(&prompt("Overlap count: "));
    let status = Selection::parse(&prompt("Status (or 'all'): "));
    let criteria = HighlightCriteria {
        eligible_op,
        eligible_val,
        adv_op,
        adv_val,
        overlapping_op,
        overlapping_val,
        status,
    };
    let partners = state.filtered_partners();
    let matches = atlas_report::filter::highlight_partners(&partners, &criteria);
    if matches.is_empty() {
        println!("No stores match the highlight criteria.\n");
        return;
    }
    println!("{} stores highlighted:", matches.len());
    let headers: Vec<String> = ["Store ID", "Name", "Status", "Eligible", "ADV", "Overlaps"]
        .iter()
        .map(|s| s.to_string())
        .collect();
    let rows: Vec<Vec<String>> = matches
        .iter()
        .map(|p| {
            vec![
                p.store_id.clone(),
                p.name.clone(),
                p.status.clone(),
                format!("{:.0}", p.eligible_packages),
                format!("{:.0}", p.adv),
                format!("{:.0}", p.overlapping_count),
            ]
        })
        .collect();
    output::preview_rows(&headers, &rows, 15);
}

/// Parse "op value" ("gt 100", "lt 5", "eq 0"); a bare number means `gt`.
fn parse_criterion(input: &str) -> (NumOp, f64) {
    let mut parts = input.split_whitespace();
    match (parts.next(), parts.next()) {
        (Some(op), Some(v)) => (NumOp::parse(op), v.parse().unwrap_or(0.0)),
        (Some(v), None) => (NumOp::Gt, v.parse().unwrap_or(0.0)),
        _ => (NumOp::Gt, 0.0),
    }
}

fn handle_route(state: &AppState, out_dir: &str) {
    let from = prompt("From store id: ");
    let to = prompt("To store id: ");
    let Some(from_p) = atlas_report::filter::partner_by_id(&state.map.partners, &from) else {
        println!("No partner matches store id '{from}'.\n");
        return;
    };
    let Some(to_p) = atlas_report::filter::partner_by_id(&state.map.partners, &to) else {
        println!("No partner matches store id '{to}'.\n");
        return;
    };
    if from_p.store_id.eq_ignore_ascii_case(&to_p.store_id) {
        println!("Route endpoints must be two different stores.\n");
        return;
    }
    let endpoints = present::route_endpoints(from_p, to_p);
    println!(
        "Route: {} ({:.4}, {:.4}) -> {} ({:.4}, {:.4})",
        endpoints.from.name,
        endpoints.from.lat,
        endpoints.from.lon,
        endpoints.to.name,
        endpoints.to.lat,
        endpoints.to.lon
    );
    export_json(out_dir, "route_endpoints.json", &endpoints);
}

fn handle_markers(state: &AppState, out_dir: &str) {
    println!("Color markers by: [1] Status [2] Delivery station [3] Initiative [4] Jurisdiction");
    let field = match read_choice().as_str() {
        "2" => CategoryField::Station,
        "3" => CategoryField::Initiative,
        "4" => CategoryField::Jurisdiction,
        _ => CategoryField::Status,
    };
    render_markers(state, out_dir, field);
}

fn render_markers(state: &AppState, out_dir: &str, field: CategoryField) {
    let partners = state.filtered_partners();
    if partners.is_empty() {
        println!("No partners match the current filters.\n");
        return;
    }
    let markers = present::marker_descriptors(&partners, field);
    println!("{} markers in view.", markers.len());
    export_json(out_dir, "markers.json", &markers);
    export_json(
        out_dir,
        "jurisdiction_overlays.json",
        &present::jurisdiction_overlays(&state.visible_jurisdictions()),
    );
}

fn print_cards(cards: &[StatCard]) {
    for c in cards {
        let mark = match c.met {
            Some(true) => " [goal met]",
            Some(false) => " [below goal]",
            None => "",
        };
        println!("  {}: {}{}", c.title, c.value, mark);
    }
    println!();
}

fn export_csv<T: Serialize>(out_dir: &str, file: &str, rows: &[T]) {
    match output::export_path(out_dir, file).and_then(|p| output::write_csv(&p, rows)) {
        Ok(()) => println!("(Full table exported to {out_dir}/{file})\n"),
        Err(e) => eprintln!("Write error: {e}"),
    }
}

fn export_json<T: Serialize>(out_dir: &str, file: &str, value: &T) {
    match output::export_path(out_dir, file).and_then(|p| output::write_json(&p, value)) {
        Ok(()) => println!("(Exported to {out_dir}/{file})\n"),
        Err(e) => eprintln!("Write error: {e}"),
    }
}
