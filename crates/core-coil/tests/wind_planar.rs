//! Planar stack-up winds.

use core_coil::Winder;
use core_config::Settings;
use core_model::bobbin::{Bobbin, BobbinProcessedDescription, ColumnShape, WindingWindow};
use core_model::coil::{
    Coil, CoilFunctionalDescription, ElectricalType, IsolationSide, WiringTechnology,
};
use core_model::Wire;

const STACK_UP: [usize; 16] = [0, 1, 1, 0, 1, 1, 0, 0, 1, 1, 0, 0, 0, 1, 1, 1];

fn planar_bobbin() -> Bobbin {
    Bobbin::new(BobbinProcessedDescription {
        column_shape: ColumnShape::Rectangular,
        column_width: 5.0e-3,
        column_depth: 10.0e-3,
        column_thickness: 0.0,
        wall_thickness: 0.0,
        winding_windows: vec![WindingWindow::rectangular(14.7e-3, 5.0e-3, [12.35e-3, 0.0])],
        coordinates: Some([0.0, 0.0]),
    })
}

fn planar_coil() -> Coil {
    Coil::new(
        planar_bobbin(),
        vec![
            CoilFunctionalDescription::new(
                "Primary",
                14,
                1,
                IsolationSide::Primary,
                Wire::planar("Planar 70um", 70.0e-6),
            ),
            CoilFunctionalDescription::new(
                "Secondary",
                9,
                1,
                IsolationSide::Secondary,
                Wire::planar("Planar 70um", 70.0e-6),
            ),
        ],
    )
}

#[test]
fn sixteen_layer_stack_up_winds() {
    let mut winder = Winder::new(planar_coil())
        .unwrap()
        .with_settings(Settings::default());
    assert!(winder
        .wind_planar(
            STACK_UP.to_vec(),
            Some(100.0e-6),
            Some(200.0e-6),
            Some(20.0e-6),
            200.0e-6,
        )
        .unwrap());

    let coil = winder.coil();
    assert_eq!(coil.sections_by_type(ElectricalType::Conduction).len(), 16);
    assert_eq!(coil.sections_by_type(ElectricalType::Insulation).len(), 15);
    assert_eq!(coil.turns().len(), 14 + 9);

    // The group is printed and the stack walks strictly downward.
    let group = &coil.groups()[0];
    assert_eq!(group.group_type, WiringTechnology::Printed);
    let ys: Vec<f64> = coil.sections().iter().map(|s| s.coordinates[1]).collect();
    for pair in ys.windows(2) {
        assert!(pair[0] > pair[1], "stack does not walk downward: {ys:?}");
    }
}

#[test]
fn thicker_insulation_spreads_the_stack() {
    let spread_for = |insulation: f64| {
        let mut winder = Winder::new(planar_coil())
            .unwrap()
            .with_settings(Settings::default());
        assert!(winder
            .wind_planar(
                STACK_UP.to_vec(),
                Some(100.0e-6),
                Some(200.0e-6),
                Some(insulation),
                200.0e-6,
            )
            .unwrap());
        let ys: Vec<f64> = winder
            .coil()
            .turns()
            .iter()
            .map(|t| t.coordinates[1])
            .collect();
        ys.iter().cloned().fold(f64::MIN, f64::max)
            - ys.iter().cloned().fold(f64::MAX, f64::min)
    };
    // Growing the dielectric monotonically grows the copper spread, the
    // geometric driver behind rising leakage inductance.
    let mut previous = 0.0;
    for step in 1..=10 {
        let spread = spread_for(20.0e-6 * step as f64);
        assert!(
            spread > previous,
            "spread did not grow at {} um",
            20 * step
        );
        previous = spread;
    }
}

#[test]
fn planar_layer_cap_fails_the_wind() {
    let mut settings = Settings::default();
    settings.coil.maximum_layers_planar = 8;
    let mut winder = Winder::new(planar_coil()).unwrap().with_settings(settings);
    assert!(!winder
        .wind_planar(STACK_UP.to_vec(), Some(100.0e-6), None, Some(20.0e-6), 200.0e-6)
        .unwrap());
    assert!(winder.coil().turns_description.is_none());
}

#[test]
fn stack_up_validation() {
    let mut winder = Winder::new(planar_coil())
        .unwrap()
        .with_settings(Settings::default());
    assert!(winder.wind_planar(vec![], None, None, None, 0.0).is_err());
    assert!(winder
        .wind_planar(vec![0, 7], None, None, None, 0.0)
        .is_err());
}

#[test]
fn turn_counts_split_across_stack_sections() {
    let mut winder = Winder::new(planar_coil())
        .unwrap()
        .with_settings(Settings::default());
    assert!(winder
        .wind_planar(
            STACK_UP.to_vec(),
            Some(100.0e-6),
            Some(200.0e-6),
            Some(20.0e-6),
            200.0e-6,
        )
        .unwrap());
    let coil = winder.coil();
    // Primary: 14 turns over 7 copper layers, 2 per section.
    for section in coil.sections_by_winding("Primary") {
        assert_eq!(coil.turns_by_section(&section.name).len(), 2);
    }
    // Secondary: 9 turns over 9 copper layers.
    for section in coil.sections_by_winding("Secondary") {
        assert_eq!(coil.turns_by_section(&section.name).len(), 1);
    }
}
