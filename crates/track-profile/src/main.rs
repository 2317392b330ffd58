use track_profile::{Settings, logging, pipeline};

fn main() -> anyhow::Result<()> {
    logging::setup_logging();

    let settings = Settings::from_cli();
    let report = pipeline::run(&settings)?;

    let summary = &report.summary;
    tracing::info!(
        "{} samples, {:.3} km, max {:.1} km/h, mean {:.1} km/h, ascent {:.0} m",
        summary.samples,
        summary.total_distance_m / 1000.0,
        summary.max_speed_kmh,
        summary.mean_speed_kmh,
        summary.total_ascent_m
    );

    if !report.is_success() {
        anyhow::bail!("some artifacts could not be produced");
    }
    Ok(())
}
