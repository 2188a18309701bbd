use criterion::{Criterion, criterion_group, criterion_main};
use std::hint::black_box;

use core_coil::Winder;
use core_config::Settings;
use core_model::bobbin::Bobbin;
use core_model::coil::{Coil, CoilFunctionalDescription, IsolationSide};
use core_model::core::{Core, CoreShapeFamily};
use core_model::Wire;

fn two_winding_coil() -> Coil {
    let core = Core::two_column(
        "E 42/33/20",
        CoreShapeFamily::E,
        7.0e-3,
        29.5e-3,
        12.2e-3,
        20.0e-3,
    );
    let bobbin = Bobbin::simple_bobbin(&core).unwrap();
    let strand = Wire::round("Round 0.05 - Grade 1", 0.05e-3, 0.06e-3);
    let litz = Wire::litz("Litz 25x0.05", strand, 25, 0.391e-3);
    Coil::new(
        bobbin,
        vec![
            CoilFunctionalDescription::new("Primary", 69, 1, IsolationSide::Primary, litz.clone()),
            CoilFunctionalDescription::new("Secondary", 69, 1, IsolationSide::Secondary, litz),
        ],
    )
}

fn bench_wind(c: &mut Criterion) {
    c.bench_function("wind_two_windings_138_turns", |b| {
        b.iter(|| {
            let mut winder = Winder::new(two_winding_coil())
                .unwrap()
                .with_settings(Settings::default());
            black_box(winder.wind(vec![0.5, 0.5], vec![0, 1], 1).unwrap())
        })
    });
}

criterion_group!(benches, bench_wind);
criterion_main!(benches);
