use std::time::Instant;

use log::info;

use route_opt_core::{
    OptimizerOptions, Result, RouteInput, RouteOptimizer, TourMetrics, logging, output,
};

fn main() -> Result<()> {
    let now = Instant::now();
    let options = OptimizerOptions::from_args()?;
    logging::init_logger(&options)?;
    info!("options: {options}");

    let input = RouteInput::from_options(&options)?;
    let points = input.points();

    let optimizer = RouteOptimizer::new(options.optimizer_config());
    let plan = optimizer.optimize(&points)?;

    let mut writer = output::open_writer(options.output_path())?;
    output::write_route(&mut writer, &input.stops, &plan)?;

    if let Some(path) = options.candidates_output_path() {
        let mut writer = output::open_writer(Some(path))?;
        output::write_candidates(&mut writer, &input.stops, &plan)?;
    }

    let ordered: Vec<_> = plan.ordered(&points).into_iter().copied().collect();
    let metrics = TourMetrics::from_points(&ordered, plan.shape, options.outlier_factor);

    info!(
        "output: n={} length_km={:.2} baseline_km={:.2} savings_km={:.2} savings_pct={:.1} outliers={} time={:.2}s",
        plan.order.len(),
        plan.length_km,
        plan.baseline_km,
        plan.savings_km(),
        plan.savings_percent(),
        metrics.outliers,
        now.elapsed().as_secs_f32()
    );

    Ok(())
}
