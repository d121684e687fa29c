mod config;
mod error;
mod loader;
mod prepare;
mod views;

use anyhow::Result;
use clap::Parser;
use log::{debug, info, warn};
use std::cell::RefCell;
use std::collections::HashMap;
use std::path::PathBuf;
use std::rc::Rc;
use std::thread;
use std::time::{Duration, Instant};
use viz_engine::{
    DashboardSession, DayMetric, FilterRule, RowId, RowStore, ViewId, Weekday,
};

use crate::config::AppConfig;
use crate::views::{HexMapView, ScatterView, TrendView};

#[derive(Debug, Parser)]
#[command(about = "Drives the linked restaurant dashboards over a cleaned business export")]
struct Args {
    /// Path to the cleaned business CSV.
    #[arg(long, default_value = "data/cleaned_business.csv")]
    data: PathBuf,

    /// Optional TOML configuration file.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Start with the density overlay enabled.
    #[arg(long)]
    density: bool,
}

fn main() -> Result<()> {
    // Initialize logger - defaults to RUST_LOG if set, otherwise INFO
    let _ = env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .try_init();

    let args = Args::parse();
    let config = match &args.config {
        Some(path) => AppConfig::load_from_file(path)?,
        None => AppConfig::default(),
    };

    info!("Dashboard starting...");
    let rows = match loader::read_rows_from_path(&args.data) {
        Ok(rows) => rows,
        Err(e) => {
            warn!("Failed to read {}: {e}", args.data.display());
            warn!("Using built-in sample data instead.");
            sample_rows()
        }
    };
    let mut store = RowStore::load(rows)?;
    prepare::derive_columns(&mut store, &config.categories_of_interest)?;
    info!("Loaded {} businesses open at least one day a week", store.len());

    let scatter = ScatterView::shared("scatter");
    let map = HexMapView::shared("hex-map");
    let trend = TrendView::shared("trend", &store, prepare::CATEGORY_COLUMN);

    let mut session = DashboardSession::new(store, &config.engine);
    let scatter_id = session.attach_view(scatter.clone());
    let map_id = session.attach_view(map.clone());
    session.attach_view(trend.clone());
    session.set_density_host(scatter_id);

    // Initial widget state: every category of interest plus "Other", the
    // configured rating groups, all weekdays, sliders at zero.
    let mut categories = config.categories_of_interest.clone();
    categories.push(prepare::OTHER_CATEGORY.to_string());
    session.set_filter(
        "category",
        FilterRule::one_of(prepare::CATEGORY_COLUMN, categories),
    );
    session.set_filter(
        "rating_group",
        FilterRule::one_of(
            prepare::RATING_GROUP_COLUMN,
            config.active_rating_groups.clone(),
        ),
    );
    session.set_filter("weekday", FilterRule::open_on(Weekday::ALL));
    session.set_density_groups(config.active_rating_groups.clone());
    session.set_density_days(Weekday::ALL.to_vec());
    session.set_density_enabled(args.density || config.density_on_start);

    run_script(&mut session, &scatter, &map, scatter_id, map_id);
    print_summary(&session, &scatter, &map, &trend);
    Ok(())
}

/// Scripted stand-in for live widget events: a burst of slider changes,
/// a lasso selection on the scatter answered from the map, and a manual
/// refresh.
fn run_script(
    session: &mut DashboardSession,
    scatter: &Rc<RefCell<ScatterView>>,
    map: &Rc<RefCell<HexMapView>>,
    scatter_id: ViewId,
    map_id: ViewId,
) {
    info!("Simulating a burst of duration-slider changes");
    for min in [2.0, 4.0, 6.0] {
        session.set_filter(
            "min_duration",
            FilterRule::AnyDayAtLeast {
                metric: DayMetric::Duration,
                min,
            },
        );
    }
    pump_until_settled(session);

    info!("Linking a scatter selection to the map");
    let picked: Vec<RowId> = session
        .store()
        .rows()
        .iter()
        .take(5)
        .map(|row| row.id())
        .collect();
    scatter.borrow_mut().select(picked);
    session.selection_changed(scatter_id);
    debug!("map now highlights {} rows", map.borrow().selected().len());

    let answer: Vec<RowId> = map.borrow().selected().iter().take(2).copied().collect();
    map.borrow_mut().select(answer);
    session.selection_changed(map_id);

    info!("Manual refresh");
    session.force_recompute();
}

/// Pumps the event loop until the pending debounced recompute has fired.
fn pump_until_settled(session: &mut DashboardSession) {
    while let Some(deadline) = session.next_deadline() {
        let now = Instant::now();
        if deadline > now {
            thread::sleep((deadline - now).min(Duration::from_millis(50)));
        }
        session.tick();
    }
}

fn print_summary(
    session: &DashboardSession,
    scatter: &Rc<RefCell<ScatterView>>,
    map: &Rc<RefCell<HexMapView>>,
    trend: &Rc<RefCell<TrendView>>,
) {
    info!("Visible points on scatter: {}", scatter.borrow().visible_count());
    info!("Visible businesses on map: {}", map.borrow().visible_count());
    info!("Canonical selection: {} rows", session.selection().len());
    info!("Density overlays drawn: {}", session.overlay_count());
    for group in scatter.borrow().overlay_groups() {
        info!("  overlay group: {group}");
    }

    let store = session.store();
    let mask = session.filters().combined_mask(store);
    let mut counts: HashMap<&str, usize> = HashMap::new();
    for (row, &visible) in store.rows().iter().zip(&mask) {
        if visible {
            let category = row.text(prepare::CATEGORY_COLUMN).unwrap_or("Other");
            *counts.entry(category).or_insert(0) += 1;
        }
    }
    let mut sorted: Vec<_> = counts.into_iter().collect();
    sorted.sort_unstable_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(b.0)));

    info!("Visible businesses by category:");
    for (i, (category, count)) in sorted.iter().take(10).enumerate() {
        info!("{}. {}: {}", i + 1, category, count);
    }

    let trend = trend.borrow();
    for (category, by_year) in trend.series() {
        debug!("trend {category}: {} years of data", by_year.len());
    }
}

/// Small built-in dataset for running without a CSV export at hand.
fn sample_rows() -> Vec<viz_engine::Row> {
    use viz_engine::Row;

    let specs: [(&str, f64, &str, f64, f64, &str, &str); 12] = [
        ("s01", 1.5, "Chinese, Restaurants", 39.952, -75.165, "11:00-21:00", "11:00-21:00"),
        ("s02", 1.5, "Chinese, Noodles", 39.948, -75.159, "10:30-20:30", "Closed"),
        ("s03", 2.0, "Italian, Pizza", 39.957, -75.172, "12:00-22:00", "12:00-23:00"),
        ("s04", 2.5, "Polish, Pierogi", 39.940, -75.150, "09:00-17:00", "09:00-17:00"),
        ("s05", 3.0, "Japanese, Sushi Bars", 39.951, -75.168, "11:30-22:00", "11:30-22:00"),
        ("s06", 3.5, "Scandinavian, Bakeries", 39.962, -75.180, "07:00-15:00", "07:00-13:00"),
        ("s07", 4.0, "Italian, Wine Bars", 39.945, -75.162, "16:00-23:30", "16:00-00:30"),
        ("s08", 4.5, "Japanese, Ramen", 39.955, -75.158, "11:00-21:30", "11:00-21:30"),
        ("s09", 4.5, "Chinese, Dim Sum", 39.953, -75.166, "09:30-21:00", "09:30-22:00"),
        ("s10", 5.0, "Burgers, Bars", 39.949, -75.171, "17:00-02:00", "17:00-03:00"),
        ("s11", 5.0, "Italian, Cafes", 39.958, -75.163, "08:00-18:00", "Closed"),
        ("s12", 4.0, "Thai, Restaurants", 39.944, -75.155, "11:00-21:00", "11:00-21:00"),
    ];

    specs
        .into_iter()
        .enumerate()
        .map(|(i, (id, stars, categories, lat, lon, weekday_hours, sunday_hours))| {
            let mut row = Row::new(RowId(i as u64))
                .with_cell("business_id", id)
                .with_cell("stars", stars)
                .with_cell("categories", categories)
                .with_cell("latitude", lat)
                .with_cell("longitude", lon);
            for day in Weekday::ALL {
                let hours = if day == Weekday::Sunday {
                    sunday_hours
                } else {
                    weekday_hours
                };
                row = row.with_cell(&day.hours_column(), hours);
            }
            row
        })
        .collect()
}
