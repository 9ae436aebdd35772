use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result};
use arrow::array::{ArrayRef, Float64Array, StringArray};
use arrow::datatypes::{DataType, Field, Schema};
use arrow::record_batch::RecordBatch;
use parquet::arrow::ArrowWriter;

use astro_panda::analysis::columns::{DISTANCE, EMITTED, GALAXY, OBSERVED, VELOCITY, Z};
use astro_panda::data::{writer, CellValue, Column, Table};
use astro_panda::physics::constants::{C_KM_S, H0};

/// Rest wavelength of H-alpha, nm.
const H_ALPHA_NM: f64 = 656.28;
const GALAXIES: usize = 40;
/// Scatter of the peculiar velocities around the Hubble flow, km/s.
const PECULIAR_SIGMA: f64 = 250.0;

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

    fn uniform(&mut self, lo: f64, hi: f64) -> f64 {
        lo + (hi - lo) * self.next_f64()
    }

    /// Box-Muller transform for normal distribution
    fn gauss(&mut self, mean: f64, std_dev: f64) -> f64 {
        let u1 = self.next_f64().max(1e-15);
        let u2 = self.next_f64();
        let z = (-2.0 * u1.ln()).sqrt() * (2.0 * std::f64::consts::PI * u2).cos();
        mean + std_dev * z
    }
}

struct Galaxy {
    name: String,
    velocity: f64,
    distance: f64,
    observed: f64,
    z: f64,
}

fn generate_galaxies(rng: &mut SimpleRng) -> Vec<Galaxy> {
    (0..GALAXIES)
        .map(|i| {
            let distance = rng.uniform(5.0, 400.0);
            let velocity = H0 * distance + rng.gauss(0.0, PECULIAR_SIGMA);
            let z = velocity / C_KM_S;
            Galaxy {
                name: format!("NGC {}", 1000 + i * 37),
                velocity: round_to(velocity, 1),
                distance: round_to(distance, 2),
                observed: round_to(H_ALPHA_NM * (1.0 + z), 3),
                z: round_to(z, 6),
            }
        })
        .collect()
}

fn round_to(v: f64, decimals: i32) -> f64 {
    let scale = 10f64.powi(decimals);
    (v * scale).round() / scale
}

/// A few well known near-Earth asteroids (a in AU, angles in degrees).
fn neo_table() -> Result<Table> {
    let rows: [(&str, [f64; 6]); 3] = [
        ("433 Eros", [1.458, 0.2227, 10.83, 304.3, 178.9, 110.8]),
        ("1036 Ganymed", [2.665, 0.5336, 26.68, 215.5, 132.4, 190.2]),
        ("99942 Apophis", [0.9224, 0.1914, 3.34, 203.9, 126.6, 142.4]),
    ];
    let mut columns = vec![Column::derived(
        "targetname",
        rows.iter().map(|(n, _)| CellValue::String(n.to_string())).collect(),
    )];
    for (i, name) in ["a", "e", "incl", "Omega", "w", "M"].iter().enumerate() {
        columns.push(Column::derived(
            *name,
            rows.iter().map(|(_, el)| CellValue::Float(el[i])).collect(),
        ));
    }
    Table::from_columns(columns).context("building NEO table")
}

fn galaxy_table(galaxies: &[Galaxy]) -> Result<Table> {
    let floats = |f: fn(&Galaxy) -> f64| -> Vec<CellValue> {
        galaxies.iter().map(|g| CellValue::Float(f(g))).collect()
    };
    Table::from_columns(vec![
        Column::derived(
            GALAXY,
            galaxies.iter().map(|g| CellValue::String(g.name.clone())).collect(),
        ),
        Column::derived(VELOCITY, floats(|g| g.velocity)),
        Column::derived(DISTANCE, floats(|g| g.distance)),
        Column::derived(OBSERVED, floats(|g| g.observed)),
        Column::derived(EMITTED, floats(|_| H_ALPHA_NM)),
        Column::derived(Z, floats(|g| g.z)),
    ])
    .context("building galaxy table")
}

fn write_parquet(galaxies: &[Galaxy], path: &Path) -> Result<()> {
    let schema = Arc::new(Schema::new(vec![
        Field::new(GALAXY, DataType::Utf8, false),
        Field::new(VELOCITY, DataType::Float64, false),
        Field::new(DISTANCE, DataType::Float64, false),
        Field::new(OBSERVED, DataType::Float64, false),
        Field::new(EMITTED, DataType::Float64, false),
        Field::new(Z, DataType::Float64, false),
    ]));
    let floats = |f: fn(&Galaxy) -> f64| -> ArrayRef {
        Arc::new(Float64Array::from(galaxies.iter().map(f).collect::<Vec<_>>()))
    };
    let batch = RecordBatch::try_new(
        schema.clone(),
        vec![
            Arc::new(StringArray::from(
                galaxies.iter().map(|g| g.name.as_str()).collect::<Vec<_>>(),
            )),
            floats(|g| g.velocity),
            floats(|g| g.distance),
            floats(|g| g.observed),
            floats(|_| H_ALPHA_NM),
            floats(|g| g.z),
        ],
    )
    .context("Failed to create RecordBatch")?;

    let file = std::fs::File::create(path)
        .with_context(|| format!("Failed to create {}", path.display()))?;
    let mut writer = ArrowWriter::try_new(file, schema, None).context("Failed to create writer")?;
    writer.write(&batch).context("Failed to write batch")?;
    writer.close().context("Failed to close writer")?;
    Ok(())
}

fn main() -> Result<()> {
    env_logger::init();

    let out_dir = std::env::args()
        .nth(1)
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from("data"));
    std::fs::create_dir_all(&out_dir)
        .with_context(|| format!("Failed to create {}", out_dir.display()))?;

    let mut rng = SimpleRng::new(42);
    let galaxies = generate_galaxies(&mut rng);

    let csv_path = out_dir.join("galaxias_ejemplo.csv");
    writer::save_csv(&galaxy_table(&galaxies)?, &csv_path)?;

    let parquet_path = out_dir.join("galaxias_ejemplo.parquet");
    write_parquet(&galaxies, &parquet_path)?;

    let neo_path = out_dir.join("neo_ejemplo.csv");
    writer::save_csv(&neo_table()?, &neo_path)?;

    println!(
        "Wrote {} galaxies to {} and {}, NEO elements to {}",
        galaxies.len(),
        csv_path.display(),
        parquet_path.display(),
        neo_path.display()
    );
    Ok(())
}
