use std::fs::{self, File};
use std::io::{self, Read, Write};
use std::panic;
use std::path::{Path, PathBuf};
use std::time::Instant;

use anyhow::{anyhow, bail, Context, Result};
use chrono::{DateTime, TimeZone, Utc};
use clap::{ArgAction, Parser, Subcommand, ValueEnum, ValueHint};
use drtrack::{
    compute_track, list_anchor_methods, AnchorMethod, Column, GeoPoint, SensorTable, Series,
    TrackOutcome, TrackParams, TrackRow, Value, VerifiedPositions,
};
use plotters::prelude::*;
use plotters_backend::DrawingBackend;
use serde::{Deserialize, Deserializer, Serialize};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(author, version, about = "Dead-reckoning track reconstruction CLI", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Reconstruct a track from a sensor CSV
    Track(TrackArgs),
    /// Print the anchor selection methods as JSON
    Methods,
}

#[derive(Parser, Debug)]
struct TrackArgs {
    /// Sensor CSV (`-` for stdin)
    #[arg(value_hint = ValueHint::FilePath)]
    input: PathBuf,

    /// Output CSV path (`-` for stdout)
    #[arg(short, long, default_value = "track.csv", value_hint = ValueHint::FilePath)]
    output: PathBuf,

    /// Track parameters as JSON; flags below override individual fields
    #[arg(long, value_hint = ValueHint::FilePath)]
    params: Option<PathBuf>,

    /// Known longitude (track start, or track end with --incoming)
    #[arg(long, allow_hyphen_values = true)]
    start_lon: Option<f64>,

    /// Known latitude (track start, or track end with --incoming)
    #[arg(long, allow_hyphen_values = true)]
    start_lat: Option<f64>,

    /// The known coordinate is the end of the track
    #[arg(long, action = ArgAction::SetTrue)]
    incoming: bool,

    /// Cap on scaled speed
    #[arg(long)]
    max_speed: Option<f64>,

    /// Sphere radius in meters
    #[arg(long)]
    earth_radius: Option<f64>,

    /// Constant current speed (overrides the CSV column)
    #[arg(long)]
    current_speed: Option<f64>,

    /// Constant current heading in degrees (overrides the CSV column)
    #[arg(long)]
    current_heading: Option<f64>,

    /// Constant speed multiplier (overrides the CSV column)
    #[arg(long)]
    multiplier: Option<f64>,

    /// Constant speed intercept (overrides the CSV column)
    #[arg(long, allow_hyphen_values = true)]
    intercept: Option<f64>,

    /// Anchor selection method for verified position correction
    #[arg(long, value_enum)]
    method: Option<MethodOpt>,

    /// Time threshold in seconds (interval count for `divide`)
    #[arg(long)]
    thresh_t: Option<f64>,

    /// Distance threshold in meters
    #[arg(long)]
    thresh_d: Option<f64>,

    /// Scoring window in seconds for `corr-fac`
    #[arg(long)]
    span: Option<f64>,

    /// Include the heading factor when scoring `corr-fac` windows
    #[arg(long, action = ArgAction::SetTrue)]
    dist_head_corr: bool,

    /// Leave the tail past the last anchor unconstrained
    #[arg(long, action = ArgAction::SetTrue)]
    unbound: bool,

    /// Drop verified positions recorded while stationary
    #[arg(long, action = ArgAction::SetTrue)]
    vp_me: bool,

    /// Verified position stride for distance gates and VP distances
    #[arg(long)]
    dist_step: Option<usize>,

    /// Write outcome summary JSON
    #[arg(long, value_hint = ValueHint::FilePath)]
    summary: Option<PathBuf>,

    /// Output PNG figure path (defaults next to CSV)
    #[arg(long, value_hint = ValueHint::FilePath)]
    png: Option<PathBuf>,

    /// Output SVG figure path
    #[arg(long, value_hint = ValueHint::FilePath)]
    svg: Option<PathBuf>,

    /// Disable plot generation
    #[arg(long, action = ArgAction::SetTrue)]
    no_plot: bool,

    /// Plot every n-th row
    #[arg(long, default_value_t = 1)]
    plot_sampling: usize,

    /// Verbose logging
    #[arg(short, long, action = ArgAction::SetTrue)]
    verbose: bool,

    /// Log stage timings
    #[arg(long, action = ArgAction::SetTrue)]
    profile: bool,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum MethodOpt {
    All,
    Divide,
    TimeDist,
    CumDist,
    CorrFac,
}

impl MethodOpt {
    fn id(self) -> &'static str {
        match self {
            MethodOpt::All => "vpc.all.v1",
            MethodOpt::Divide => "vpc.divide.v1",
            MethodOpt::TimeDist => "vpc.time_dist.v1",
            MethodOpt::CumDist => "vpc.cum_dist.v1",
            MethodOpt::CorrFac => "vpc.time_dist_corr_fac.v1",
        }
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let default_level = match &cli.command {
        Command::Track(args) if args.verbose => "debug",
        _ => "info",
    };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .try_init();

    match cli.command {
        Command::Track(args) => handle_track(args),
        Command::Methods => handle_methods(),
    }
}

fn handle_methods() -> Result<()> {
    let stdout = io::stdout();
    let mut handle = stdout.lock();
    serde_json::to_writer_pretty(&mut handle, &list_anchor_methods())?;
    writeln!(handle)?;
    Ok(())
}

fn handle_track(args: TrackArgs) -> Result<()> {
    let params = build_params(&args)?;

    let t_parse = Instant::now();
    let text = if args.input.as_os_str() == "-" {
        let mut buf = String::new();
        io::stdin()
            .read_to_string(&mut buf)
            .context("failed to read sensor CSV from stdin")?;
        buf
    } else {
        fs::read_to_string(&args.input)
            .with_context(|| format!("failed to read {}", args.input.display()))?
    };
    let mut table = parse_sensor_csv(text.as_bytes())
        .with_context(|| format!("failed to parse {}", args.input.display()))?;
    apply_series_overrides(&mut table, &args);
    if args.profile {
        info!(
            "Parse stage: {:.1} ms ({} rows)",
            t_parse.elapsed().as_secs_f64() * 1000.0,
            table.len()
        );
    }

    let t_compute = Instant::now();
    let outcome = compute_track(&table, &params)?;
    if args.profile {
        info!(
            "Compute stage: {:.1} ms",
            t_compute.elapsed().as_secs_f64() * 1000.0
        );
    }
    info!(
        "Track computed: {} rows, {} anchors, {:.1} m integrated",
        outcome.summary.rows, outcome.summary.anchors, outcome.summary.total_radial_2d_m
    );

    if args.output.as_os_str() == "-" {
        write_track_stdout(&outcome)?;
    } else {
        let t_csv = Instant::now();
        write_track_csv(&outcome, &args.output)?;
        if args.profile {
            info!(
                "CSV stage: {:.1} ms",
                t_csv.elapsed().as_secs_f64() * 1000.0
            );
        }
        info!("Wrote track CSV: {}", args.output.display());
    }

    if let Some(path) = args.summary.as_ref() {
        write_summary(&outcome, &params, path)?;
        info!("Wrote summary: {}", path.display());
    }

    if !args.no_plot {
        let sampling = args.plot_sampling.max(1);
        let png_path = args.png.clone().or_else(|| {
            (args.output.as_os_str() != "-").then(|| args.output.with_extension("png"))
        });
        if let Some(path) = png_path.as_ref() {
            let t_plot = Instant::now();
            match render_track_guard(&outcome, path, ChartKind::Png, sampling) {
                Ok(()) => info!("Wrote plot: {}", path.display()),
                Err(err) => warn!("Skipping PNG render ({}): {}", path.display(), err),
            }
            if args.profile {
                info!(
                    "Plot stage: {:.1} ms",
                    t_plot.elapsed().as_secs_f64() * 1000.0
                );
            }
        }
        if let Some(path) = args.svg.as_ref() {
            match render_track_guard(&outcome, path, ChartKind::Svg, sampling) {
                Ok(()) => info!("Wrote plot: {}", path.display()),
                Err(err) => warn!("Skipping SVG render ({}): {}", path.display(), err),
            }
        }
    }

    Ok(())
}

fn build_params(args: &TrackArgs) -> Result<TrackParams> {
    let mut params = match args.params.as_ref() {
        Some(path) => load_params(path)?,
        None => TrackParams::default(),
    };
    if let Some(lon) = args.start_lon {
        params.start.lon = lon;
    }
    if let Some(lat) = args.start_lat {
        params.start.lat = lat;
    }
    if args.incoming {
        params.outgoing = false;
    }
    if args.max_speed.is_some() {
        params.max_speed = args.max_speed;
    }
    if let Some(radius) = args.earth_radius {
        params.earth_radius_m = radius;
    }
    if args.unbound {
        params.vpc.bound = false;
    }
    if args.vp_me {
        params.vpc.vp_me = true;
    }
    if let Some(step) = args.dist_step {
        params.vpc.dist_step = step;
    }

    let method = match args.method {
        Some(opt) => Some(
            AnchorMethod::default_for_id(opt.id())
                .ok_or_else(|| anyhow!("unknown anchor method {}", opt.id()))?,
        ),
        None => params.vpc.method.take(),
    };
    params.vpc.method = method
        .map(|m| override_thresholds(m, args))
        .transpose()?;
    Ok(params)
}

fn load_params(path: &Path) -> Result<TrackParams> {
    let text = fs::read_to_string(path)
        .with_context(|| format!("failed to read params {}", path.display()))?;
    serde_json::from_str(&text).with_context(|| format!("{} is not valid params JSON", path.display()))
}

fn override_thresholds(method: AnchorMethod, args: &TrackArgs) -> Result<AnchorMethod> {
    let pick = |flag: Option<f64>, current: f64| flag.unwrap_or(current);
    Ok(match method {
        AnchorMethod::All => AnchorMethod::All,
        AnchorMethod::Divide { thresh_t } => {
            let thresh_t = match args.thresh_t {
                Some(t) if t >= 0.0 && t.fract() == 0.0 => t as usize,
                Some(t) => bail!("divide expects a whole interval count, got {}", t),
                None => thresh_t,
            };
            AnchorMethod::Divide { thresh_t }
        }
        AnchorMethod::TimeDist { thresh_t, thresh_d } => AnchorMethod::TimeDist {
            thresh_t: pick(args.thresh_t, thresh_t),
            thresh_d: pick(args.thresh_d, thresh_d),
        },
        AnchorMethod::CumDist { thresh_t, thresh_d } => AnchorMethod::CumDist {
            thresh_t: pick(args.thresh_t, thresh_t),
            thresh_d: pick(args.thresh_d, thresh_d),
        },
        AnchorMethod::TimeDistCorrFac {
            thresh_t,
            thresh_d,
            span,
            dist_head_corr,
        } => AnchorMethod::TimeDistCorrFac {
            thresh_t: pick(args.thresh_t, thresh_t),
            thresh_d: pick(args.thresh_d, thresh_d),
            span: pick(args.span, span),
            dist_head_corr: dist_head_corr || args.dist_head_corr,
        },
    })
}

fn apply_series_overrides(table: &mut SensorTable, args: &TrackArgs) {
    if let Some(v) = args.current_speed {
        table.current_speed = Some(Series::Scalar(v));
    }
    if let Some(v) = args.current_heading {
        table.current_heading = Some(Series::Scalar(v));
    }
    if let Some(v) = args.multiplier {
        table.multiplier = Series::Scalar(v);
    }
    if let Some(v) = args.intercept {
        table.intercept = Series::Scalar(v);
    }
}

/// One CSV row. Empty, `nan` and `null` cells are gaps.
#[derive(Debug, Deserialize)]
struct SensorRecord {
    timestamp: String,
    #[serde(default, deserialize_with = "de_opt_f64")]
    heading: Option<f64>,
    #[serde(default, deserialize_with = "de_opt_f64")]
    speed: Option<f64>,
    #[serde(default, deserialize_with = "de_opt_f64")]
    elevation: Option<f64>,
    #[serde(default, deserialize_with = "de_opt_f64")]
    pitch: Option<f64>,
    #[serde(default, deserialize_with = "de_opt_f64")]
    current_speed: Option<f64>,
    #[serde(default, deserialize_with = "de_opt_f64")]
    current_heading: Option<f64>,
    #[serde(default, deserialize_with = "de_opt_f64")]
    multiplier: Option<f64>,
    #[serde(default, deserialize_with = "de_opt_f64")]
    intercept: Option<f64>,
    #[serde(default, deserialize_with = "de_opt_f64")]
    marked_event: Option<f64>,
    #[serde(default, deserialize_with = "de_opt_f64")]
    vp_lon: Option<f64>,
    #[serde(default, deserialize_with = "de_opt_f64")]
    vp_lat: Option<f64>,
}

fn de_opt_f64<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    let opt = Option::<String>::deserialize(deserializer)?;
    match opt {
        None => Ok(None),
        Some(s) => {
            let t = s.trim();
            if t.is_empty() || t.eq_ignore_ascii_case("nan") || t.eq_ignore_ascii_case("null") {
                return Ok(None);
            }
            t.parse::<f64>().map(Some).map_err(serde::de::Error::custom)
        }
    }
}

/// RFC 3339 text or seconds since the Unix epoch.
fn parse_timestamp(raw: &str) -> Result<DateTime<Utc>> {
    let raw = raw.trim();
    if let Ok(ts) = DateTime::parse_from_rfc3339(raw) {
        return Ok(ts.with_timezone(&Utc));
    }
    let secs: f64 = raw
        .parse()
        .map_err(|_| anyhow!("timestamp '{}' is neither RFC 3339 nor epoch seconds", raw))?;
    if !secs.is_finite() {
        bail!("timestamp '{}' is not finite", raw);
    }
    let whole = secs.floor();
    let nanos = (((secs - whole) * 1e9).round() as u32).min(999_999_999);
    Utc.timestamp_opt(whole as i64, nanos)
        .single()
        .ok_or_else(|| anyhow!("timestamp '{}' is out of range", raw))
}

fn parse_sensor_csv<R: Read>(reader: R) -> Result<SensorTable> {
    let mut rdr = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(reader);
    let headers = rdr.headers()?.clone();
    let has = |name: &str| headers.iter().any(|h| h == name);
    for required in ["timestamp", "heading", "speed"] {
        if !has(required) {
            bail!("missing required column '{}'", required);
        }
    }

    let records: Vec<SensorRecord> = rdr
        .deserialize()
        .enumerate()
        .map(|(i, r)| r.with_context(|| format!("bad CSV record at data row {}", i)))
        .collect::<Result<_>>()?;
    if records.is_empty() {
        bail!("sensor CSV has no data rows");
    }

    let dense = |name: &str, get: fn(&SensorRecord) -> Option<f64>| -> Result<Vec<f64>> {
        records
            .iter()
            .enumerate()
            .map(|(i, r)| get(r).ok_or_else(|| anyhow!("column '{}' has a gap at data row {}", name, i)))
            .collect()
    };
    let sparse = |get: fn(&SensorRecord) -> Option<f64>| -> Vec<Option<f64>> {
        records.iter().map(get).collect()
    };

    let timestamps = records
        .iter()
        .enumerate()
        .map(|(i, r)| parse_timestamp(&r.timestamp).with_context(|| format!("data row {}", i)))
        .collect::<Result<Vec<_>>>()?;
    let mut table = SensorTable::new(
        timestamps,
        dense("heading", |r| r.heading)?,
        dense("speed", |r| r.speed)?,
    );
    if has("elevation") {
        table.elevation = Some(dense("elevation", |r| r.elevation)?);
    }
    if has("pitch") {
        table.pitch = Some(dense("pitch", |r| r.pitch)?);
    }
    if has("marked_event") {
        table.marked_event = Some(dense("marked_event", |r| r.marked_event)?);
    }
    if has("current_speed") {
        table.current_speed = Some(Series::PerRow(sparse(|r| r.current_speed)));
    }
    if has("current_heading") {
        table.current_heading = Some(Series::PerRow(sparse(|r| r.current_heading)));
    }
    if has("multiplier") {
        table.multiplier = Series::PerRow(sparse(|r| r.multiplier));
    }
    if has("intercept") {
        table.intercept = Series::PerRow(sparse(|r| r.intercept));
    }
    if has("vp_lon") || has("vp_lat") {
        table.verified = Some(VerifiedPositions {
            lon: sparse(|r| r.vp_lon),
            lat: sparse(|r| r.vp_lat),
        });
    }
    Ok(table)
}

fn write_track_stdout(outcome: &TrackOutcome) -> Result<()> {
    let stdout = io::stdout();
    let handle = stdout.lock();
    let mut writer = csv::Writer::from_writer(handle);
    write_track_rows(outcome, &mut writer)
}

fn write_track_csv(outcome: &TrackOutcome, path: &Path) -> Result<()> {
    let file =
        File::create(path).with_context(|| format!("failed to create {}", path.display()))?;
    let mut writer = csv::Writer::from_writer(file);
    write_track_rows(outcome, &mut writer)
}

fn write_track_rows<W: Write>(outcome: &TrackOutcome, writer: &mut csv::Writer<W>) -> Result<()> {
    let columns = outcome.table.columns();
    writer.write_record(columns.iter().map(|c| c.name()))?;
    for row in &outcome.table.rows {
        writer.write_record(columns.iter().map(|&c| format_cell(row, c)))?;
    }
    writer.flush()?;
    Ok(())
}

fn decimals(column: Column) -> usize {
    match column {
        Column::DrLon | Column::DrLat | Column::VpcLon | Column::VpcLat | Column::VpLon | Column::VpLat => 8,
        Column::DistCorrFactor | Column::HeadCorrFactorDeg => 6,
        _ => 3,
    }
}

fn format_cell(row: &TrackRow, column: Column) -> String {
    match row.value(column) {
        Value::Count(v) => v.to_string(),
        Value::Float(v) => format!("{:.*}", decimals(column), v),
        Value::Flag(v) => String::from(if v { "1" } else { "0" }),
        Value::Time(t) => t.to_rfc3339(),
        Value::Missing => String::new(),
    }
}

#[derive(Serialize)]
struct SummaryFile<'a> {
    params: &'a TrackParams,
    params_hash: &'a str,
    columns: Vec<&'static str>,
    summary: &'a drtrack::TrackSummary,
    warnings: Vec<String>,
}

fn write_summary(outcome: &TrackOutcome, params: &TrackParams, path: &Path) -> Result<()> {
    let doc = SummaryFile {
        params,
        params_hash: &outcome.params_hash,
        columns: outcome.table.columns().iter().map(|c| c.name()).collect(),
        summary: &outcome.summary,
        warnings: outcome.warnings.iter().map(|w| w.to_string()).collect(),
    };
    let file =
        File::create(path).with_context(|| format!("failed to create {}", path.display()))?;
    serde_json::to_writer_pretty(file, &doc)
        .with_context(|| format!("failed to write {}", path.display()))?;
    Ok(())
}

enum ChartKind {
    Png,
    Svg,
}

struct TrackLines {
    dr: Vec<(f64, f64)>,
    corrected: Vec<(f64, f64)>,
    verified: Vec<(f64, f64)>,
    anchors: Vec<(f64, f64)>,
}

impl TrackLines {
    fn collect(outcome: &TrackOutcome, sampling: usize) -> Self {
        let xy = |p: GeoPoint| (p.lon, p.lat);
        let rows = &outcome.table.rows;
        let sampled = || rows.iter().step_by(sampling);
        Self {
            dr: sampled().map(|r| xy(r.dr_position())).collect(),
            corrected: sampled().filter_map(|r| r.vpc_position()).map(xy).collect(),
            verified: sampled().filter_map(|r| r.vp_position()).map(xy).collect(),
            anchors: rows
                .iter()
                .filter(|r| r.vp_used == Some(true))
                .filter_map(|r| r.vp_position())
                .map(xy)
                .collect(),
        }
    }

    /// Bounding box over every series with a small margin.
    fn bounds(&self) -> (std::ops::Range<f64>, std::ops::Range<f64>) {
        let all = self
            .dr
            .iter()
            .chain(&self.corrected)
            .chain(&self.verified);
        let (mut x0, mut x1, mut y0, mut y1) = (f64::MAX, f64::MIN, f64::MAX, f64::MIN);
        for &(x, y) in all {
            x0 = x0.min(x);
            x1 = x1.max(x);
            y0 = y0.min(y);
            y1 = y1.max(y);
        }
        let pad_x = ((x1 - x0) * 0.05).max(1e-6);
        let pad_y = ((y1 - y0) * 0.05).max(1e-6);
        ((x0 - pad_x)..(x1 + pad_x), (y0 - pad_y)..(y1 + pad_y))
    }
}

fn render_track_guard(
    outcome: &TrackOutcome,
    path: &Path,
    kind: ChartKind,
    sampling: usize,
) -> Result<(), String> {
    let render = || -> Result<(), String> {
        render_track_chart(outcome, path, kind, sampling).map_err(|e| format!("plotting error: {}", e))
    };

    panic::catch_unwind(panic::AssertUnwindSafe(render))
        .map_err(|_| "plotting backend panicked".to_string())?
}

fn render_track_chart(outcome: &TrackOutcome, path: &Path, kind: ChartKind, sampling: usize) -> Result<()> {
    if outcome.table.is_empty() {
        return Ok(());
    }
    let lines = TrackLines::collect(outcome, sampling);
    match kind {
        ChartKind::Png => {
            let root = BitMapBackend::new(path, (1100, 900)).into_drawing_area();
            draw_track(root, &lines)
        }
        ChartKind::Svg => {
            let root = SVGBackend::new(path, (1100, 900)).into_drawing_area();
            draw_track(root, &lines)
        }
    }
}

fn draw_track<DB>(area: DrawingArea<DB, plotters::coord::Shift>, lines: &TrackLines) -> Result<()>
where
    DB: DrawingBackend,
    DB::ErrorType: 'static,
{
    area.fill(&WHITE)?;
    let (x_range, y_range) = lines.bounds();
    let mut chart = ChartBuilder::on(&area)
        .margin(25)
        .caption("Track", ("sans-serif", 24))
        .set_label_area_size(LabelAreaPosition::Left, 80)
        .set_label_area_size(LabelAreaPosition::Bottom, 50)
        .build_cartesian_2d(x_range, y_range)?;

    chart
        .configure_mesh()
        .x_desc("Longitude")
        .y_desc("Latitude")
        .x_label_formatter(&|v| format!("{:.4}", v))
        .y_label_formatter(&|v| format!("{:.4}", v))
        .draw()?;

    let dr_color = RGBColor(50, 50, 50);
    chart
        .draw_series(LineSeries::new(lines.dr.iter().copied(), &dr_color))?
        .label("Dead reckoning")
        .legend(move |(x, y)| PathElement::new(vec![(x, y), (x + 30, y)], dr_color));

    if !lines.corrected.is_empty() {
        let vpc_color = RGBColor(200, 0, 100);
        let style = ShapeStyle {
            color: vpc_color.to_rgba(),
            filled: false,
            stroke_width: 2,
        };
        chart
            .draw_series(LineSeries::new(lines.corrected.iter().copied(), style))?
            .label("Corrected")
            .legend(move |(x, y)| PathElement::new(vec![(x, y), (x + 30, y)], vpc_color));
    }

    if !lines.verified.is_empty() {
        let vp_color = RGBColor(30, 144, 255);
        chart
            .draw_series(
                lines
                    .verified
                    .iter()
                    .map(|&p| Circle::new(p, 2, vp_color.mix(0.6).filled())),
            )?
            .label("Verified")
            .legend(move |(x, y)| Circle::new((x + 15, y), 3, vp_color.filled()));
    }

    if !lines.anchors.is_empty() {
        let anchor_color = RGBColor(34, 139, 34);
        chart
            .draw_series(
                lines
                    .anchors
                    .iter()
                    .map(|&p| Cross::new(p, 5, anchor_color.stroke_width(2))),
            )?
            .label("Anchors")
            .legend(move |(x, y)| Cross::new((x + 15, y), 4, anchor_color));
    }

    chart
        .configure_series_labels()
        .background_style(&WHITE.mix(0.7))
        .border_style(&BLACK.mix(0.3))
        .position(SeriesLabelPosition::UpperLeft)
        .draw()?;

    area.present()?;
    Ok(())
}
