//! End-to-end winds over rectangular windows: turn counts, proportion
//! conservation, containment, alignment and compaction idempotence.

use core_coil::Winder;
use core_config::Settings;
use core_model::bobbin::Bobbin;
use core_model::coil::{Coil, CoilFunctionalDescription, ElectricalType, IsolationSide};
use core_model::core::{Core, CoreShapeFamily};
use core_model::{CoilAlignment, Wire};

fn e_core() -> Core {
    Core::two_column(
        "E 42/33/20",
        CoreShapeFamily::E,
        7.0e-3,
        29.5e-3,
        12.2e-3,
        20.0e-3,
    )
}

fn litz_25x005() -> Wire {
    let strand = Wire::round("Round 0.05 - Grade 1", 0.05e-3, 0.06e-3);
    Wire::litz("Litz 25x0.05", strand, 25, 0.391e-3)
}

fn two_equal_windings() -> Coil {
    let bobbin = Bobbin::simple_bobbin(&e_core()).unwrap();
    Coil::new(
        bobbin,
        vec![
            CoilFunctionalDescription::new("Primary", 69, 1, IsolationSide::Primary, litz_25x005()),
            CoilFunctionalDescription::new("Secondary", 69, 1, IsolationSide::Secondary, litz_25x005()),
        ],
    )
}

fn settings() -> Settings {
    Settings::default()
}

#[test]
fn two_equal_windings_wind_and_fit() {
    let mut winder = Winder::new(two_equal_windings())
        .unwrap()
        .with_settings(settings());
    assert!(winder.wind(vec![0.5, 0.5], vec![0, 1], 1).unwrap());
    assert!(winder.are_sections_and_layers_fitting());

    let coil = winder.coil();
    // One conduction section per winding plus the insulation between them.
    assert_eq!(coil.sections_by_type(ElectricalType::Conduction).len(), 2);
    assert_eq!(coil.sections_by_type(ElectricalType::Insulation).len(), 1);
    // 69 + 69 physical turns.
    assert_eq!(coil.turns().len(), 138);
    for turn in coil.turns() {
        assert!(turn.length > 0.0, "turn {} has non-positive length", turn.name);
    }
}

#[test]
fn proportion_conservation_per_parallel() {
    let bobbin = Bobbin::simple_bobbin(&e_core()).unwrap();
    let coil = Coil::new(
        bobbin,
        vec![
            CoilFunctionalDescription::new(
                "Primary",
                24,
                2,
                IsolationSide::Primary,
                Wire::round("Round 0.50 - Grade 1", 0.5e-3, 0.544e-3),
            ),
            CoilFunctionalDescription::new(
                "Secondary",
                6,
                4,
                IsolationSide::Secondary,
                Wire::round("Round 0.80 - Grade 1", 0.8e-3, 0.861e-3),
            ),
        ],
    );
    let mut winder = Winder::new(coil).unwrap().with_settings(settings());
    assert!(winder.wind(vec![0.5, 0.5], vec![0, 1], 2).unwrap());

    let coil = winder.coil();
    for (winding, parallels) in [("Primary", 2usize), ("Secondary", 4usize)] {
        // Section proportions reconstruct 1 per parallel.
        let mut section_sums = vec![0.0f64; parallels];
        for section in coil.sections_by_winding(winding) {
            let partial = &section.partial_windings[0];
            for (sum, value) in section_sums.iter_mut().zip(&partial.parallels_proportion) {
                *sum += value;
            }
            // Layer proportions reconstruct the section's slice.
            let mut layer_sums = vec![0.0f64; parallels];
            for layer in coil.layers_by_section(&section.name) {
                if layer.layer_type != ElectricalType::Conduction {
                    continue;
                }
                for (sum, value) in layer_sums
                    .iter_mut()
                    .zip(&layer.partial_windings[0].parallels_proportion)
                {
                    *sum += value;
                }
            }
            for (layer_sum, section_value) in
                layer_sums.iter().zip(&partial.parallels_proportion)
            {
                assert!(
                    (layer_sum - section_value).abs() < 1e-9,
                    "{winding}/{}: layer sum {layer_sum} vs section {section_value}",
                    section.name
                );
            }
        }
        for sum in section_sums {
            assert!((sum - 1.0).abs() < 1e-9, "{winding}: proportion sum {sum}");
        }
    }

    // Turn counts per section match the rounded proportion slices.
    for section in coil.sections_by_type(ElectricalType::Conduction) {
        let expected = coil.number_turns_in_section(section);
        let actual = coil.turns_by_section(&section.name).len() as u64;
        assert_eq!(actual, expected, "section {}", section.name);
    }
}

#[test]
fn turns_stay_inside_the_window() {
    let mut winder = Winder::new(two_equal_windings())
        .unwrap()
        .with_settings(settings());
    assert!(winder.wind(vec![0.5, 0.5], vec![0, 1], 1).unwrap());
    let window = winder.bobbin().winding_window().unwrap().clone();
    let centre = window.centre();
    let half_width = window.width.unwrap() / 2.0;
    let half_height = window.height.unwrap() / 2.0;
    for turn in winder.coil().turns() {
        assert!(
            (turn.coordinates[0] - centre[0]).abs() <= half_width + 1e-9,
            "turn {} drifts out horizontally",
            turn.name
        );
        assert!(
            (turn.coordinates[1] - centre[1]).abs() <= half_height + 1e-9,
            "turn {} drifts out vertically",
            turn.name
        );
    }
}

#[test]
fn no_turn_bbox_overlap_within_a_layer() {
    let mut winder = Winder::new(two_equal_windings())
        .unwrap()
        .with_settings(settings());
    assert!(winder.wind(vec![0.5, 0.5], vec![0, 1], 1).unwrap());
    let coil = winder.coil();
    for layer in coil.layers_by_type(ElectricalType::Conduction) {
        let turns = coil.turns_by_layer(&layer.name);
        for (i, a) in turns.iter().enumerate() {
            for b in &turns[i + 1..] {
                let da = a.dimensions.unwrap();
                let db = b.dimensions.unwrap();
                let dx = (a.coordinates[0] - b.coordinates[0]).abs();
                let dy = (a.coordinates[1] - b.coordinates[1]).abs();
                let overlap = dx < (da[0] + db[0]) / 2.0 - 1e-9
                    && dy < (da[1] + db[1]) / 2.0 - 1e-9;
                assert!(!overlap, "{} overlaps {}", a.name, b.name);
            }
        }
    }
}

#[test]
fn delimit_and_compact_is_idempotent() {
    let mut winder = Winder::new(two_equal_windings())
        .unwrap()
        .with_settings(settings());
    assert!(winder.wind(vec![0.5, 0.5], vec![0, 1], 1).unwrap());
    let first = winder.coil().clone();
    assert!(winder.delimit_and_compact().unwrap());
    let second = winder.coil().clone();
    // wind() already compacted once, so another pass changes nothing.
    let close = |a: f64, b: f64| (a - b).abs() < 1e-9;
    for (s1, s2) in first.sections().iter().zip(second.sections()) {
        assert!(close(s1.coordinates[0], s2.coordinates[0]), "{}", s1.name);
        assert!(close(s1.coordinates[1], s2.coordinates[1]), "{}", s1.name);
        assert!(close(s1.dimensions[0], s2.dimensions[0]), "{}", s1.name);
        assert!(close(s1.dimensions[1], s2.dimensions[1]), "{}", s1.name);
    }
    for (t1, t2) in first.turns().iter().zip(second.turns()) {
        assert!(close(t1.coordinates[0], t2.coordinates[0]), "{}", t1.name);
        assert!(close(t1.coordinates[1], t2.coordinates[1]), "{}", t1.name);
    }
}

#[test]
fn unbalanced_turns_ratio_winds() {
    let bobbin = Bobbin::simple_bobbin(&e_core()).unwrap();
    let coil = Coil::new(
        bobbin,
        vec![
            CoilFunctionalDescription::new(
                "Primary",
                64,
                1,
                IsolationSide::Primary,
                litz_25x005(),
            ),
            CoilFunctionalDescription::new(
                "Secondary",
                20,
                1,
                IsolationSide::Secondary,
                Wire::round("Round 0.80 - Grade 1", 0.8e-3, 0.861e-3),
            ),
        ],
    );
    let mut winder = Winder::new(coil).unwrap().with_settings(settings());
    let proportions = winder.proportion_per_winding_based_on_wires().unwrap();
    assert!(winder.wind(proportions, vec![0, 1], 1).unwrap());
    assert_eq!(winder.coil().turns().len(), 84);
}

#[test]
fn margins_shrink_the_usable_band() {
    let mut winder = Winder::new(two_equal_windings())
        .unwrap()
        .with_settings(settings());
    assert!(winder.wind(vec![0.5, 0.5], vec![0, 1], 1).unwrap());
    let unmargined_extent = {
        let coil = winder.coil();
        let turns = coil.turns_by_section("Primary section 0");
        let ys: Vec<f64> = turns.iter().map(|t| t.coordinates[1]).collect();
        ys.iter().cloned().fold(f64::MIN, f64::max) - ys.iter().cloned().fold(f64::MAX, f64::min)
    };

    assert!(winder
        .add_margin_to_section_by_index(0, [3.0e-3, 3.0e-3])
        .unwrap());
    let coil = winder.coil();
    let section = coil.section_by_name("Primary section 0").unwrap();
    assert_eq!(section.margin.unwrap(), [3.0e-3, 3.0e-3]);
    let turns = coil.turns_by_section("Primary section 0");
    let ys: Vec<f64> = turns.iter().map(|t| t.coordinates[1]).collect();
    let margined_extent =
        ys.iter().cloned().fold(f64::MIN, f64::max) - ys.iter().cloned().fold(f64::MAX, f64::min);
    assert!(margined_extent <= unmargined_extent + 1e-9);
}

#[test]
fn spread_alignment_spaces_turns_evenly() {
    let bobbin = Bobbin::simple_bobbin(&e_core()).unwrap();
    let coil = Coil::new(
        bobbin,
        vec![CoilFunctionalDescription::new(
            "Primary",
            8,
            1,
            IsolationSide::Primary,
            Wire::round("Round 1.00 - Grade 1", 1.0e-3, 1.062e-3),
        )],
    );
    let mut winder = Winder::new(coil).unwrap().with_settings(settings());
    winder.set_turns_alignment(CoilAlignment::Spread, None);
    assert!(winder.wind(vec![1.0], vec![0], 1).unwrap());
    let turns = winder.coil().turns().to_vec();
    assert_eq!(turns.len(), 8);
    let mut ys: Vec<f64> = turns.iter().map(|t| t.coordinates[1]).collect();
    ys.sort_by(f64::total_cmp);
    let gaps: Vec<f64> = ys.windows(2).map(|w| w[1] - w[0]).collect();
    for gap in &gaps {
        assert!((gap - gaps[0]).abs() < 1e-9, "uneven spread: {gaps:?}");
    }
    // Spread spacing exceeds the wire footprint when the window has slack.
    assert!(gaps[0] > 1.062e-3);
}

#[test]
fn wind_even_if_not_fit_places_overflowing_turns() {
    // 400 turns of 1 mm wire cannot fit the window.
    let bobbin = Bobbin::simple_bobbin(&e_core()).unwrap();
    let coil = Coil::new(
        bobbin,
        vec![CoilFunctionalDescription::new(
            "Primary",
            400,
            1,
            IsolationSide::Primary,
            Wire::round("Round 1.00 - Grade 1", 1.0e-3, 1.062e-3),
        )],
    );
    let mut strict = Settings::default();
    strict.coil.try_rewind = false;
    let mut winder = Winder::new(coil.clone()).unwrap().with_settings(strict);
    assert!(!winder.wind(vec![1.0], vec![0], 1).unwrap());
    assert!(winder.coil().turns_description.is_none());

    let mut permissive = Settings::default();
    permissive.coil.wind_even_if_not_fit = true;
    permissive.coil.try_rewind = false;
    permissive.coil.delimit_and_compact = false;
    let mut winder = Winder::new(coil).unwrap().with_settings(permissive);
    // Reported as not fitting, but the turns are there to inspect.
    assert!(!winder.wind(vec![1.0], vec![0], 1).unwrap());
    assert!(!winder.are_sections_and_layers_fitting());
    assert_eq!(winder.coil().turns().len(), 400);
}

#[test]
fn fast_wind_skips_compaction_but_places_turns() {
    let mut winder = Winder::new(two_equal_windings())
        .unwrap()
        .with_settings(settings());
    assert!(winder.fast_wind().unwrap());
    assert_eq!(winder.coil().turns().len(), 138);
}
