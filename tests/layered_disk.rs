use approx::assert_relative_eq;
use rotor_stress::prelude::*;

fn rotor_core() -> Stack {
    Stack::from_thicknesses(&[
        ("Shaft", 5e-3, Material::structural_steel()),
        ("Core", 117e-3, Material::electrical_steel()),
        ("Magnets", 3e-3, Material::ndfeb()),
    ])
    .unwrap()
}

#[test]
fn test_split_disk_matches_solid_disk() {
    let steel = Material::structural_steel();
    let solid = Stack::from_thicknesses(&[("Disk", 0.1, steel)]).unwrap();
    let split = Stack::from_thicknesses(&[
        ("Inner", 0.03, steel),
        ("Middle", 0.05, steel),
        ("Outer", 0.02, steel),
    ])
    .unwrap();

    let op = OperatingPoint::from_rpm(8_000.0, 25.0).unwrap();
    let solver = StackSolver::default();
    let a = solver.solve(&solid, &op).unwrap();
    let b = solver.solve(&split, &op).unwrap();

    let scale = a.radial_at(0.0).unwrap();
    for r in [0.0, 0.01, 0.03, 0.045, 0.08, 0.099] {
        assert_relative_eq!(
            a.radial_at(r).unwrap(),
            b.radial_at(r).unwrap(),
            epsilon = 1e-6 * scale
        );
        assert_relative_eq!(
            a.tangential_at(r).unwrap(),
            b.tangential_at(r).unwrap(),
            epsilon = 1e-6 * scale
        );
    }
}

#[test]
fn test_stress_scales_with_speed_squared() {
    let stack = rotor_core();
    let solver = StackSolver::default();
    let slow = solver
        .solve(&stack, &OperatingPoint::from_rpm(5_000.0, 0.0).unwrap())
        .unwrap();
    let fast = solver
        .solve(&stack, &OperatingPoint::from_rpm(10_000.0, 0.0).unwrap())
        .unwrap();

    for r in [0.0, 0.004, 0.06, 0.123] {
        assert_relative_eq!(
            fast.tangential_at(r).unwrap(),
            4.0 * slow.tangential_at(r).unwrap(),
            max_relative = 1e-8
        );
    }
}

#[test]
fn test_free_surface_and_interface_continuity() {
    let stack = rotor_core();
    let op = OperatingPoint::from_rpm(10_000.0, 10.0).unwrap();
    let solution = StackSolver::default().solve(&stack, &op).unwrap();

    let peak = solution
        .fields()
        .iter()
        .map(|f| f.summary(32).peak_magnitude(StressComponent::Tangential))
        .fold(0.0_f64, f64::max);
    assert!(peak > 1e6);

    let outer = solution.field(2).unwrap();
    assert!(outer.radial(stack.outer_radius()).abs() < 1e-7 * peak);

    let residuals = solution.interface_residuals();
    assert_eq!(residuals.len(), 2);
    for res in residuals {
        assert!(res.radial_jump.abs() < 1e-7 * peak, "{res:?}");
        assert!(res.displacement_jump.abs() < 1e-12, "{res:?}");
    }
}

#[test]
fn test_thicker_sleeve_relieves_magnet_radial_tension() {
    let limits = StressLimits::new(-100e6, 1300e6, 0.0, 80e6).unwrap();
    let problem = SleeveProblem::new(
        rotor_core(),
        Material::carbon_fiber_sleeve(),
        limits,
        OperatingPoint::from_rpm(10_000.0, 10.0).unwrap(),
    );
    let solver = StackSolver::default();

    let peaks: Vec<f64> = [1e-4, 3e-4, 1e-3, 3e-3, 1e-2]
        .into_iter()
        .map(|d| {
            let stack = problem.stack_for(d, -3e-4).unwrap();
            let solution = solver.solve(&stack, &problem.operating).unwrap();
            solution.layer_summary(2).unwrap().max_radial
        })
        .collect();

    for pair in peaks.windows(2) {
        assert!(pair[1] < pair[0], "{peaks:?}");
    }
    // Thin sleeves leave the magnets pulled off the core, thick ones press them on
    assert!(peaks[0] > 0.0);
    assert!(peaks[4] < 0.0);
}

#[test]
fn test_layer_limits_are_reported() {
    let magnets = Layer::new("Magnets", 0.122, 0.003, Material::ndfeb())
        .unwrap()
        .with_max_tangential_stress(1e6);
    let stack = Stack::from_thicknesses(&[
        ("Shaft", 5e-3, Material::structural_steel()),
        ("Core", 117e-3, Material::electrical_steel()),
    ])
    .unwrap()
    .with_outer_layer(magnets)
    .unwrap();

    let op = OperatingPoint::from_rpm(10_000.0, 0.0).unwrap();
    let solution = StackSolver::default().solve(&stack, &op).unwrap();

    let violations = solution.check_layer_limits();
    assert_eq!(violations.len(), 1);
    let v = &violations[0];
    assert_eq!(v.index, 2);
    assert_eq!(v.layer, "Magnets");
    assert_eq!(v.component, StressComponent::Tangential);
    assert!(v.peak > v.limit);

    let relaxed = StackSolver::default()
        .solve(&rotor_core(), &op)
        .unwrap()
        .check_layer_limits();
    assert!(relaxed.is_empty());
}

#[test]
fn test_degenerate_inputs_are_rejected() {
    assert!(matches!(
        Material::isotropic(7850.0, -1.0, 0.3, 1e-5),
        Err(RotorError::InputDomain(_))
    ));
    assert!(matches!(
        Material::isotropic(7850.0, 200e9, 0.5, 1e-5),
        Err(RotorError::InputDomain(_))
    ));
    assert!(matches!(
        Layer::new("Bad", 0.0, -1e-3, Material::structural_steel()),
        Err(RotorError::InputDomain(_))
    ));
    assert!(matches!(Stack::new(Vec::new()), Err(RotorError::SingularSystem(_))));

    let gap = vec![
        Layer::new("Shaft", 0.0, 0.01, Material::structural_steel()).unwrap(),
        Layer::new("Ring", 0.011, 0.01, Material::structural_steel()).unwrap(),
    ];
    assert!(matches!(Stack::new(gap), Err(RotorError::SingularSystem(_))));
}

#[test]
fn test_deserialized_stack_is_validated() {
    let ring = Layer::new("Ring", 0.01, 0.04, Material::structural_steel()).unwrap();
    let json = serde_json::to_string(&vec![ring]).unwrap();

    // A bored single layer has no solid core to fix B = 0 on
    assert!(serde_json::from_str::<Stack>(&json).is_err());
    let layers: Vec<Layer> = serde_json::from_str(&json).unwrap();
    assert!(matches!(Stack::try_from(layers), Err(RotorError::SingularSystem(_))));

    assert!(serde_json::from_str::<Stack>("[]").is_err());
    assert!(matches!(
        Stack::try_from(Vec::<Layer>::new()),
        Err(RotorError::SingularSystem(_))
    ));

    let valid = serde_json::to_string(&rotor_core()).unwrap();
    let stack: Stack = serde_json::from_str(&valid).unwrap();
    let (k, _) = StackSolver::default()
        .assemble(&stack, &OperatingPoint::at_rest())
        .unwrap();
    assert_eq!(k.shape(), (5, 5));
}

#[test]
fn test_non_finite_interference_is_input_error() {
    let sleeve = Layer::new("Sleeve", 0.125, 1e-3, Material::carbon_fiber_sleeve())
        .unwrap()
        .with_interference(f64::NAN);
    assert!(matches!(
        rotor_core().with_outer_layer(sleeve),
        Err(RotorError::InputDomain(_))
    ));
}
