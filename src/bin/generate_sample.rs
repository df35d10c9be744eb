//! Write deterministic sample data for local development: a battery CSV
//! covering every registry column plus matching projection files.

use anyhow::{Context, Result};

use battimpact::registry::{
    FeatureRegistry, BATTERY_PROPERTIES, ECONOMIC, ENVIRONMENTAL_IMPACT, SOCIOECONOMIC_IMPACT,
    STRUCTURAL_ENCODING,
};

/// Minimal deterministic PRNG (xoshiro256**)
struct SimpleRng {
    state: [u64; 4],
}

impl SimpleRng {
    fn new(seed: u64) -> Self {
        let mut s = [0u64; 4];
        let mut x = seed;
        for slot in &mut s {
            x = x.wrapping_mul(6364136223846793005).wrapping_add(1);
            *slot = x;
        }
        SimpleRng { state: s }
    }

    fn next_u64(&mut self) -> u64 {
        let result = (self.state[1].wrapping_mul(5))
            .rotate_left(7)
            .wrapping_mul(9);
        let t = self.state[1] << 17;
        self.state[2] ^= self.state[0];
        self.state[3] ^= self.state[1];
        self.state[1] ^= self.state[2];
        self.state[0] ^= self.state[3];
        self.state[2] ^= t;
        self.state[3] = self.state[3].rotate_left(45);
        result
    }

    fn next_f64(&mut self) -> f64 {
        (self.next_u64() >> 11) as f64 / (1u64 << 53) as f64
    }

    fn next_usize(&mut self, bound: usize) -> usize {
        (self.next_u64() % bound as u64) as usize
    }

    /// Box-Muller transform for normal distribution
    fn gauss(&mut self, mean: f64, std_dev: f64) -> f64 {
        let u1 = self.next_f64().max(1e-15);
        let u2 = self.next_f64();
        let z = (-2.0 * u1.ln()).sqrt() * (2.0 * std::f64::consts::PI * u2).cos();
        mean + std_dev * z
    }
}

const N_BATTERIES: usize = 200;
const IONS: [&str; 6] = ["Li", "Na", "Mg", "K", "Ca", "Zn"];

fn write_batteries(registry: &FeatureRegistry, rng: &mut SimpleRng) -> Result<()> {
    let structural = registry.columns_for(STRUCTURAL_ENCODING)?;
    let impact_columns: Vec<&String> = registry
        .columns_for(ENVIRONMENTAL_IMPACT)?
        .iter()
        .chain(registry.columns_for(SOCIOECONOMIC_IMPACT)?)
        .chain(registry.columns_for(ECONOMIC)?)
        .collect();

    let mut header: Vec<&str> = vec!["battery_id", "working_ion"];
    header.extend(structural.iter().map(String::as_str));
    header.extend([
        "average_voltage",
        "capacity_grav",
        "energy_grav",
        "max_delta_volume",
    ]);
    header.extend(impact_columns.iter().map(|c| c.as_str()));

    let path = "sample_batteries.csv";
    let mut writer = csv::Writer::from_path(path).context("creating battery CSV")?;
    writer.write_record(&header)?;

    for i in 0..N_BATTERIES {
        let ion = IONS[rng.next_usize(IONS.len())];
        let mut row: Vec<String> = vec![format!("mp-{}_{ion}", 1000 + i), ion.to_string()];

        for col in structural {
            // The working ion is always present in the discharge formula;
            // sprinkle in a few other elements.
            let count = if col.starts_with(ion) && col.as_bytes().get(ion.len()) == Some(&b'_') {
                1 + rng.next_usize(2)
            } else if rng.next_f64() < 0.04 {
                1 + rng.next_usize(3)
            } else {
                0
            };
            row.push(count.to_string());
        }

        row.push(format!("{:.4}", rng.gauss(3.0, 0.8)));
        row.push(format!("{:.2}", rng.gauss(150.0, 40.0).abs()));
        // A few negative energies so the load-time filter has work to do.
        row.push(format!("{:.2}", rng.gauss(450.0, 220.0)));
        row.push(format!("{:.4}", rng.next_f64() * 0.2));

        for _ in &impact_columns {
            row.push(format!("{:.4}", rng.gauss(0.5, 0.25)));
        }
        writer.write_record(&row)?;
    }
    writer.flush()?;
    println!("Wrote {N_BATTERIES} batteries to {path}");
    Ok(())
}

fn write_projection(registry: &FeatureRegistry, rng: &mut SimpleRng) -> Result<()> {
    let subsets = [STRUCTURAL_ENCODING, BATTERY_PROPERTIES];
    let targets = registry.targets_for([STRUCTURAL_ENCODING])?;

    let coords_path = "sample_tsne_results.csv";
    let mut writer = csv::Writer::from_path(coords_path).context("creating coordinate CSV")?;
    let mut header: Vec<String> = Vec::new();
    for subset in subsets {
        header.push(format!("{subset}_x"));
        header.push(format!("{subset}_y"));
    }
    header.extend(targets.iter().cloned());
    writer.write_record(&header)?;

    for _ in 0..N_BATTERIES {
        let mut row = Vec::with_capacity(header.len());
        for _ in 0..subsets.len() * 2 {
            row.push(format!("{:.5}", rng.gauss(0.0, 12.0)));
        }
        for _ in targets {
            row.push(format!("{:.4}", rng.gauss(3.0, 1.0)));
        }
        writer.write_record(&row)?;
    }
    writer.flush()?;

    let evals_path = "sample_tsne_evaluations.csv";
    let mut writer = csv::Writer::from_path(evals_path).context("creating evaluation CSV")?;
    writer.write_record(["method", "trustworthiness", "continuity", "kl_divergence"])?;
    for subset in subsets {
        writer.write_record([
            subset.to_string(),
            format!("{:.4}", 0.85 + rng.next_f64() * 0.1),
            format!("{:.4}", 0.85 + rng.next_f64() * 0.1),
            format!("{:.4}", 0.8 + rng.next_f64()),
        ])?;
    }
    writer.flush()?;

    println!("Wrote projection data to {coords_path} and {evals_path}");
    Ok(())
}

fn main() -> Result<()> {
    env_logger::init();

    let registry = FeatureRegistry::builtin();
    let mut rng = SimpleRng::new(42);

    write_batteries(&registry, &mut rng)?;
    write_projection(&registry, &mut rng)?;
    Ok(())
}
