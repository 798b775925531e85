//! Seismic Response Example - headless scenarios

use anyhow::Result;
use seismic_response::prelude::*;

fn print_summary(name: &str, driver: &AnimationDriver, summary: &RunSummary) {
    let calc = driver.calculated_values();
    println!("--- {} ---", name);
    println!(
        "  Input: M{:.1}, {:.0} km, {} soil (Vs30 {:.0} m/s), {}",
        summary.params.magnitude,
        summary.params.distance_km,
        summary.params.soil_type,
        summary.params.soil_type.vs30(),
        summary.params.mode
    );
    println!(
        "  Building: {} / {} code / {} reinforcement, AI damping {}",
        summary.params.material,
        summary.params.building_code,
        summary.params.reinforcement,
        if summary.params.ai_support { "ON" } else { "OFF" }
    );
    println!(
        "  PGA (display): {} g, natural period {:.2} s, damping {:.3}",
        calc.pga_display(summary.params.mode),
        calc.natural_period,
        calc.effective_damping
    );
    println!("  Frames: {} over {:.1} s", summary.frames, summary.simulated_time);
    println!("  Peak PGA:          {:>8.3} g", summary.peak_pga);
    println!("  Peak displacement: {:>8.2} cm", summary.peak_roof_displacement);
    if !driver.history().is_empty() {
        println!(
            "  Peak building response in record: {:>8.2} cm",
            driver.history().peak_displacement()
        );
    }
    println!("  Max drift:         {:>8.3} %", summary.max_drift_ratio * 100.0);
    println!("  Min health:        {:>8.1} %", summary.min_health_percent);
    if summary.soft_story_detected {
        println!("  Soft story detected");
    }
    match (summary.collapse_trigger, summary.collapse_time) {
        (Some(trigger), Some(t)) => println!("  COLLAPSE: {} at {:.2} s", trigger, t),
        _ if summary.collapsed => println!("  COLLAPSE"),
        _ => println!("  Building survived"),
    }
    println!();
}

fn run(name: &str, params: SimulationParameters, config: &SimulationConfig) -> Result<RunSummary> {
    params.validate()?;
    let mut driver = AnimationDriver::new(params, config.clone());
    let summary = driver.run_to_completion(config.frame_dt);
    print_summary(name, &driver, &summary);
    Ok(summary)
}

fn main() -> Result<()> {
    env_logger::init();

    println!("=== Seismic Response Example ===\n");

    let config = SimulationConfig::from_env();
    println!(
        "Building: {} floors x {:.0} cm, {:.0} s record, {} samples\n",
        config.num_floors, config.story_height_cm, config.total_duration, config.sample_count
    );

    // Distant small event on rock
    run(
        "Weak distant event",
        SimulationParameters::new()
            .with_magnitude(4.0)
            .with_distance(300.0)
            .with_soil(SoilType::Rock)
            .with_mode(SimulationMode::Realistic),
        &config,
    )?;

    // Near-field great earthquake against a poorly built wooden frame
    run(
        "Near-field great earthquake",
        SimulationParameters::new()
            .with_magnitude(9.0)
            .with_distance(5.0)
            .with_soil(SoilType::VerySoft)
            .with_material(StructuralMaterial::Wood)
            .with_code(BuildingCode::Legacy)
            .with_reinforcement(Reinforcement::Minimal)
            .with_mode(SimulationMode::Realistic),
        &config,
    )?;

    // Same moderate event with and without active damping
    let moderate = SimulationParameters::new()
        .with_magnitude(6.8)
        .with_distance(25.0)
        .with_soil(SoilType::Soft)
        .with_material(StructuralMaterial::Steel)
        .with_mode(SimulationMode::Realistic);
    let without = run("Moderate event, AI damping off", moderate, &config)?;
    let with = run(
        "Moderate event, AI damping on",
        moderate.with_ai_support(true),
        &config,
    )?;
    if without.peak_roof_displacement > 0.0 {
        println!(
            "AI damping displacement ratio: {:.2}",
            with.peak_roof_displacement / without.peak_roof_displacement
        );
    }

    println!("\n=== Example Complete ===");
    Ok(())
}
