//! Rotor Stress Example - Surface Magnet Rotor Sleeve Sizing

use rotor_stress::prelude::*;

fn print_summary(solution: &StackSolution) {
    println!(
        "{:<10} {:>10} {:>10} {:>12} {:>12} {:>12} {:>12}",
        "Layer", "r_i [mm]", "r_o [mm]", "min σr", "max σr", "min σt", "max σt"
    );
    for (idx, field) in solution.fields().iter().enumerate() {
        let Some(s) = solution.layer_summary(idx) else {
            continue;
        };
        println!(
            "{:<10} {:>10.3} {:>10.3} {:>12.3} {:>12.3} {:>12.3} {:>12.3}",
            field.layer.name,
            field.layer.r_i * 1e3,
            field.layer.r_o * 1e3,
            s.min_radial / 1e6,
            s.max_radial / 1e6,
            s.min_tangential / 1e6,
            s.max_tangential / 1e6
        );
    }
    println!("(stresses in MPa)\n");
}

fn print_design(design: &SleeveDesign) {
    println!("--- {} ---", design.policy);
    println!("  Sleeve thickness:  {:.4} mm", design.thickness * 1e3);
    println!("  Interference:      {:.4} mm", design.interference * 1e3);
    println!("  Evaluations:       {}", design.evaluations);
    println!("  Converged:         {}", design.converged);
    let m = design.margins;
    println!("  Margins [MPa]:");
    println!("    sleeve radial      {:>10.3}", m.sleeve_radial / 1e6);
    println!("    sleeve tangential  {:>10.3}", m.sleeve_tangential / 1e6);
    println!("    magnet radial      {:>10.3}", m.magnet_radial / 1e6);
    println!("    magnet tangential  {:>10.3}", m.magnet_tangential / 1e6);
    println!();
    print_summary(&design.solution);
}

fn main() -> anyhow::Result<()> {
    env_logger::init();

    println!("=== Rotor Stress Example: Surface Magnet Rotor ===\n");

    // Rotor geometry (in meters)
    let r_shaft = 5e-3;
    let magnet_depth = 3e-3;
    let r_rotor = 125e-3;

    let inner = Stack::from_thicknesses(&[
        ("Shaft", r_shaft, Material::structural_steel()),
        ("Core", r_rotor - magnet_depth - r_shaft, Material::electrical_steel()),
        ("Magnets", magnet_depth, Material::ndfeb()),
    ])?;

    // 10 000 rpm, 10 K above assembly temperature
    let op = OperatingPoint::from_rpm(10_000.0, 10.0)?;

    println!("Bare rotor at {:.0} rpm:", op.rpm());
    let bare = StackSolver::default().solve(&inner, &op)?;
    print_summary(&bare);

    let limits = StressLimits::new(-100e6, 1300e6, 0.0, 80e6)?;
    let problem = SleeveProblem::new(inner, Material::carbon_fiber_sleeve(), limits, op);
    let sizer = SleeveSizer::new(problem, SizerOptions::default())?;

    let policies: [&dyn SearchPolicy; 2] = [&ConstrainedMinimization, &StagedSearch];
    for policy in policies {
        match sizer.size(policy) {
            Ok(design) => print_design(&design),
            Err(e) if e.is_infeasible() => println!("{}: {e}\n", policy.name()),
            Err(e) => return Err(e.into()),
        }
    }

    println!("=== Example Complete ===");
    Ok(())
}
