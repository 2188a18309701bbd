//! Toroidal winds: polar sections, outer-side additional coordinates and
//! their invariants.

use core_coil::Winder;
use core_config::Settings;
use core_model::bobbin::Bobbin;
use core_model::coil::{Coil, CoilFunctionalDescription, ElectricalType, IsolationSide};
use core_model::core::Core;
use core_model::{CoordinateSystem, Wire, WindingOrientation};

fn t48_coil() -> Coil {
    let core = Core::toroidal("T 48/28/16", 48.0e-3, 28.0e-3, 16.0e-3);
    let bobbin = Bobbin::simple_bobbin(&core).unwrap();
    Coil::new(
        bobbin,
        vec![
            CoilFunctionalDescription::new(
                "Primary",
                10,
                1,
                IsolationSide::Primary,
                Wire::round("Round 1.00 - Grade 1", 1.0e-3, 1.062e-3),
            ),
            CoilFunctionalDescription::new(
                "Secondary",
                200,
                1,
                IsolationSide::Secondary,
                Wire::round("Round 0.80 - Grade 1", 0.8e-3, 0.861e-3),
            ),
        ],
    )
}

fn contiguous_winder() -> Winder {
    let mut winder = Winder::new(t48_coil())
        .unwrap()
        .with_settings(Settings::default());
    winder.set_winding_orientation(WindingOrientation::Contiguous);
    winder
}

const PROPORTIONS: [f64; 2] = [16.185 / 238.6, 222.42 / 238.6];

#[test]
fn toroidal_wind_places_every_turn() {
    let mut winder = contiguous_winder();
    assert!(winder.wind(PROPORTIONS.to_vec(), vec![0, 1], 1).unwrap());
    let coil = winder.coil();
    assert_eq!(coil.turns().len(), 210);
    for turn in coil.turns() {
        assert_eq!(turn.coordinate_system, Some(CoordinateSystem::Polar));
        assert!(turn.length > 0.0);
    }
}

#[test]
fn every_conduction_turn_gets_an_outer_coordinate() {
    let mut winder = contiguous_winder();
    assert!(winder.wind(PROPORTIONS.to_vec(), vec![0, 1], 1).unwrap());
    let column_width = winder.bobbin().column_width();
    for turn in winder.coil().turns() {
        let additional = turn
            .additional_coordinates
            .as_ref()
            .unwrap_or_else(|| panic!("turn {} has no outer coordinate", turn.name));
        assert_eq!(additional.len(), 1);
        let outer = additional[0];
        // The cartesian projection lands outside the core column.
        let projected = core_geometry::polar_to_cartesian(outer);
        let distance = projected[0].hypot(projected[1]);
        assert!(
            distance > column_width,
            "turn {} outer side sits inside the core: {distance}",
            turn.name
        );
        // And outside the winding window itself.
        let window_radius = winder
            .bobbin()
            .winding_window()
            .unwrap()
            .radial_height
            .unwrap();
        assert!(outer[0] > window_radius);
    }
}

#[test]
fn outer_coordinates_do_not_collide() {
    let mut winder = contiguous_winder();
    assert!(winder.wind(PROPORTIONS.to_vec(), vec![0, 1], 1).unwrap());
    let turns = winder.coil().turns();
    for (i, a) in turns.iter().enumerate() {
        let pa = a.additional_coordinates.as_ref().unwrap()[0];
        let wire_a = a.dimensions.unwrap()[1];
        for b in &turns[i + 1..] {
            let pb = b.additional_coordinates.as_ref().unwrap()[0];
            let wire = wire_a.min(b.dimensions.unwrap()[1]);
            let distance = core_geometry::polar_distance(pa, pb);
            assert!(
                distance >= wire - 1e-9,
                "outer collision between {} and {}: {distance}",
                a.name,
                b.name
            );
        }
    }
}

#[test]
fn inner_turns_stay_inside_the_window() {
    let mut winder = contiguous_winder();
    assert!(winder.wind(PROPORTIONS.to_vec(), vec![0, 1], 1).unwrap());
    let window_radius = winder
        .bobbin()
        .winding_window()
        .unwrap()
        .radial_height
        .unwrap();
    for turn in winder.coil().turns() {
        assert!(turn.coordinates[0] > 0.0);
        assert!(
            turn.coordinates[0] <= window_radius + 1e-9,
            "turn {} outside the window: {}",
            turn.name,
            turn.coordinates[0]
        );
    }
}

#[test]
fn polar_sections_cover_the_angular_window() {
    let mut winder = contiguous_winder();
    assert!(winder.wind(PROPORTIONS.to_vec(), vec![0, 1], 1).unwrap());
    let coil = winder.coil();
    let conduction = coil.sections_by_type(ElectricalType::Conduction);
    assert_eq!(conduction.len(), 2);
    for section in &conduction {
        assert_eq!(section.coordinate_system, Some(CoordinateSystem::Polar));
        assert!(section.dimensions[1] > 0.0);
        assert!(section.filling_factor.unwrap() <= 1.0 + 1e-6);
    }
    // The secondary carries ~93% of the angular span.
    let secondary = coil.section_by_name("Secondary section 0").unwrap();
    assert!(secondary.dimensions[1] > 250.0);
}

#[test]
fn toroidal_lengths_wrap_the_ring() {
    let mut winder = contiguous_winder();
    assert!(winder.wind(PROPORTIONS.to_vec(), vec![0, 1], 1).unwrap());
    // A wound turn must at least wrap the core cross-section perimeter:
    // 2·(ring thickness) + 2·(core height) with the T 48/28/16 numbers.
    let minimum = 2.0 * 10.0e-3 + 2.0 * 16.0e-3;
    for turn in winder.coil().turns() {
        assert!(
            turn.length > minimum,
            "turn {} length {} shorter than the bare ring",
            turn.name,
            turn.length
        );
    }
}

#[test]
fn overlapping_toroidal_sections_stack_radially() {
    let mut winder = Winder::new(t48_coil())
        .unwrap()
        .with_settings(Settings::default());
    // Default orientation is overlapping: radial stacking, centre angle 180.
    assert!(winder.wind(PROPORTIONS.to_vec(), vec![0, 1], 1).unwrap());
    let coil = winder.coil();
    let primary = coil.section_by_name("Primary section 0").unwrap();
    let secondary = coil.section_by_name("Secondary section 0").unwrap();
    // Full angular span for both, stacked at different radii.
    assert!(primary.coordinates[0] > secondary.coordinates[0]);
}
