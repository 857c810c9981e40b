use demsim::export::{self, RawRecord, Snapshot};
use scenario::Scenario;

fn two_particle_sim() -> dem::Simulation {
    let scenario: Scenario = r#"{
        "settings": { "delta_t": 1e-3 },
        "gravity": { "kind": "constant", "acceleration": [0.0, 0.0, 0.0] },
        "particles": [
            { "position": [0.1, 0.2, 0.3], "velocity": [3.0, 4.0, 0.0], "diameter": 0.05 },
            { "position": [-0.2, 0.0, 0.0], "diameter": 0.02 }
        ]
    }"#
    .parse()
    .unwrap();
    scenario.into_sim().unwrap()
}

#[test]
fn snapshot_lists_every_particle() {
    let mut sim = two_particle_sim();
    sim.run(3).unwrap();
    let snapshot = Snapshot::capture(&sim);

    assert_eq!(snapshot.step, 3);
    assert_eq!(snapshot.particles.len(), 2);
    assert_eq!(snapshot.particles[1].id, 1);
    assert!((snapshot.particles[0].speed - 5.0).abs() < 1e-2);
    assert!((snapshot.kinetic_energy - sim.kinetic_energy()).abs() < 1e-15);

    let mut buffer = Vec::new();
    snapshot.write_json(&mut buffer).unwrap();
    let parsed: Snapshot = serde_json::from_slice(&buffer).unwrap();
    assert_eq!(parsed, snapshot);
}

#[test]
fn raw_export_is_four_floats_per_particle() {
    let sim = two_particle_sim();
    let mut buffer = Vec::new();
    export::write_raw(&sim, &mut buffer).unwrap();
    assert_eq!(buffer.len(), 2 * 4 * std::mem::size_of::<f32>());

    let floats: Vec<f32> = buffer
        .chunks_exact(4)
        .map(|bytes| f32::from_ne_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]))
        .collect();
    assert_eq!(&floats[..4], &[0.1, 0.2, 0.3, 5.0]);
    assert_eq!(floats[7], 0.0);

    let records = export::raw_records(&sim);
    assert_eq!(
        records[1],
        RawRecord {
            position: [-0.2, 0.0, 0.0],
            speed: 0.0
        }
    );
}
