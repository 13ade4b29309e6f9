mod output;
mod provenance;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use isochrone::oracle::FixedPause;
use isochrone::provider::{AccessType, Credentials, GoogleMaps, ReqwestClient};
use isochrone::{IsochroneCfg, IsochroneRequest, Location};
use std::path::PathBuf;
use std::time::Duration;
use tracing_subscriber::fmt::SubscriberBuilder;

#[derive(Parser)]
#[command(name = "isochrone")]
#[command(about = "Drive-time isochrones from the Google Maps Distance Matrix")]
struct Cmd {
    #[command(subcommand)]
    action: Action,
}

#[derive(Subcommand)]
enum Action {
    /// Compute one contour and write it with a provenance sidecar
    Run {
        /// Street address or "lat,lng"
        #[arg(long)]
        origin: String,
        /// Travel-time budget in minutes
        #[arg(long)]
        minutes: f64,
        #[arg(long, default_value_t = isochrone::engine::DEFAULT_SPOKES)]
        spokes: usize,
        #[arg(long, default_value_t = isochrone::engine::DEFAULT_TOLERANCE_MINUTES)]
        tolerance: f64,
        #[arg(long, default_value_t = isochrone::engine::DEFAULT_MAX_ROUNDS)]
        max_rounds: usize,
        #[arg(long, default_value_t = isochrone::engine::DEFAULT_MIN_SPEED_MPH)]
        min_speed: f64,
        #[arg(long, default_value_t = isochrone::engine::DEFAULT_MAX_SPEED_MPH)]
        max_speed: f64,
        /// personal (api key) or business (client id + signature)
        #[arg(long, default_value = "personal")]
        access: AccessType,
        /// Directory holding google_maps.cfg
        #[arg(long, default_value = "config")]
        config_dir: PathBuf,
        /// Delay between successive geocode calls
        #[arg(long, default_value_t = 100)]
        pause_ms: u64,
        #[arg(long, default_value_t = isochrone::provider::DEFAULT_TIMEOUT_SECS)]
        timeout_secs: u64,
        /// Output file: .csv, .json or .geojson
        #[arg(long)]
        out: PathBuf,
    },
    /// Print a small provenance JSON block
    Report,
}

fn main() -> Result<()> {
    SubscriberBuilder::default().with_target(false).init();
    let cmd = Cmd::parse();
    match cmd.action {
        Action::Run {
            origin,
            minutes,
            spokes,
            tolerance,
            max_rounds,
            min_speed,
            max_speed,
            access,
            config_dir,
            pause_ms,
            timeout_secs,
            out,
        } => {
            let cfg = IsochroneCfg::new(minutes)
                .with_spokes(spokes)
                .with_tolerance(tolerance)
                .with_max_rounds(max_rounds)
                .with_speeds(min_speed, max_speed);
            let params = provenance::RunParams::new(&origin, &access.to_string(), &cfg, pause_ms);
            run(params, cfg, access, config_dir, timeout_secs, out)
        }
        Action::Report => report(),
    }
}

fn run(
    params: provenance::RunParams,
    cfg: IsochroneCfg,
    access: AccessType,
    config_dir: PathBuf,
    timeout_secs: u64,
    out: PathBuf,
) -> Result<()> {
    tracing::info!(
        origin = %params.origin,
        minutes = cfg.target_minutes,
        spokes = cfg.spokes,
        %access,
        out = %out.display(),
        "run"
    );
    // Validate the output path before spending any provider quota.
    output::Format::from_path(&out)?;

    let origin: Location = params
        .origin
        .parse()
        .with_context(|| format!("parsing origin {:?}", params.origin))?;
    let credentials = Credentials::load_from_dir(&config_dir, access)
        .with_context(|| format!("loading credentials from {}", config_dir.display()))?;
    let maps = GoogleMaps::new(ReqwestClient::with_timeout(timeout_secs)?, credentials)?;
    let pause = FixedPause(Duration::from_millis(params.pause_ms));

    let iso = IsochroneRequest::new(origin, cfg).solve(&maps, &maps, &pause)?;
    tracing::info!(rounds = iso.rounds, vertices = iso.points.len(), "converged");

    let format = output::write_contour(&out, &iso)?;
    let payload = provenance::Payload::new(&params)?.with_result(&iso);
    let sidecar = provenance::write_sidecar(&out, payload)?;
    tracing::info!(?format, sidecar = %sidecar.display(), "wrote contour");
    Ok(())
}

fn report() -> Result<()> {
    let obj = serde_json::json!({
        "code_rev": provenance::current_git_rev(),
        "version": isochrone::VERSION,
        "params": {},
        "outputs": []
    });
    println!("{}", serde_json::to_string_pretty(&obj)?);
    Ok(())
}
