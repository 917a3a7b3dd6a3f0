use std::sync::Arc;

use anyhow::{Context, Result};
use arrow::array::{Date32Array, Float64Array, StringArray};
use arrow::datatypes::{DataType, Field, Schema};
use arrow::record_batch::RecordBatch;
use chrono::{Duration, NaiveDate};
use parquet::arrow::ArrowWriter;

const DAYS: i64 = 180;
const CSV_PATH: &str = "aqi_data_180_days.csv";
const PARQUET_PATH: &str = "aqi_data_180_days.parquet";

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

    /// Box-Muller transform for normal distribution
    fn gauss(&mut self, mean: f64, std_dev: f64) -> f64 {
        let u1 = self.next_f64().max(1e-15);
        let u2 = self.next_f64();
        let z = (-2.0 * u1.ln()).sqrt() * (2.0 * std::f64::consts::PI * u2).cos();
        mean + std_dev * z
    }
}

/// Linear interpolation inside concentration breakpoints → sub-index.
fn sub_index(c: f64, breakpoints: &[(f64, f64, f64, f64)]) -> f64 {
    for &(c_lo, c_hi, i_lo, i_hi) in breakpoints {
        if c <= c_hi {
            return i_lo + (i_hi - i_lo) * (c - c_lo) / (c_hi - c_lo);
        }
    }
    500.0
}

const PM25_BREAKPOINTS: [(f64, f64, f64, f64); 6] = [
    (0.0, 30.0, 0.0, 50.0),
    (30.0, 60.0, 50.0, 100.0),
    (60.0, 90.0, 100.0, 200.0),
    (90.0, 120.0, 200.0, 300.0),
    (120.0, 250.0, 300.0, 400.0),
    (250.0, 380.0, 400.0, 500.0),
];

const PM10_BREAKPOINTS: [(f64, f64, f64, f64); 6] = [
    (0.0, 50.0, 0.0, 50.0),
    (50.0, 100.0, 50.0, 100.0),
    (100.0, 250.0, 100.0, 200.0),
    (250.0, 350.0, 200.0, 300.0),
    (350.0, 430.0, 300.0, 400.0),
    (430.0, 600.0, 400.0, 500.0),
];

struct Row {
    date: NaiveDate,
    city: &'static str,
    readings: [f64; 6],
    aqi: f64,
}

fn round1(v: f64) -> f64 {
    (v * 10.0).round() / 10.0
}

fn main() -> Result<()> {
    let mut rng = SimpleRng::new(42);
    let start = NaiveDate::from_ymd_opt(2024, 1, 1).context("start date")?;

    // city, baseline PM2_5, PM10, NO2, SO2, O3, CO
    let cities: [(&str, [f64; 6]); 5] = [
        ("Delhi", [110.0, 210.0, 55.0, 14.0, 38.0, 1.6]),
        ("Mumbai", [48.0, 95.0, 35.0, 10.0, 30.0, 0.9]),
        ("Kolkata", [70.0, 130.0, 42.0, 12.0, 33.0, 1.1]),
        ("Bengaluru", [35.0, 70.0, 28.0, 6.0, 27.0, 0.7]),
        ("Chennai", [32.0, 65.0, 24.0, 8.0, 29.0, 0.6]),
    ];

    let mut rows = Vec::new();
    for day in 0..DAYS {
        let date = start + Duration::days(day);
        // winter smog fading into spring and monsoon
        let season = 1.0 + 0.45 * (-(day as f64) / 60.0).exp();
        for &(city, base) in &cities {
            let episode = 1.0 + rng.gauss(0.0, 0.15);
            let mut readings = [0.0; 6];
            for (k, b) in base.iter().enumerate() {
                let v = b * season * episode * (1.0 + rng.gauss(0.0, 0.08));
                readings[k] = round1(v.max(0.1));
            }
            let aqi = sub_index(readings[0], &PM25_BREAKPOINTS)
                .max(sub_index(readings[1], &PM10_BREAKPOINTS))
                .round();
            rows.push(Row {
                date,
                city,
                readings,
                aqi,
            });
        }
    }

    // ---- CSV ----
    let mut writer = csv::Writer::from_path(CSV_PATH).context("creating CSV")?;
    writer.write_record(["date", "city", "AQI", "PM2_5", "PM10", "NO2", "SO2", "O3", "CO"])?;
    for r in &rows {
        let mut record = vec![r.date.to_string(), r.city.to_string(), r.aqi.to_string()];
        record.extend(r.readings.iter().map(|v| v.to_string()));
        writer.write_record(&record)?;
    }
    writer.flush()?;

    // ---- Parquet ----
    let epoch = NaiveDate::from_ymd_opt(1970, 1, 1).context("epoch")?;
    let mut fields = vec![
        Field::new("date", DataType::Date32, false),
        Field::new("city", DataType::Utf8, false),
        Field::new("AQI", DataType::Float64, false),
    ];
    for name in ["PM2_5", "PM10", "NO2", "SO2", "O3", "CO"] {
        fields.push(Field::new(name, DataType::Float64, false));
    }
    let schema = Arc::new(Schema::new(fields));

    let mut columns: Vec<arrow::array::ArrayRef> = vec![
        Arc::new(Date32Array::from(
            rows.iter()
                .map(|r| (r.date - epoch).num_days() as i32)
                .collect::<Vec<_>>(),
        )),
        Arc::new(StringArray::from(rows.iter().map(|r| r.city).collect::<Vec<_>>())),
        Arc::new(Float64Array::from(rows.iter().map(|r| r.aqi).collect::<Vec<_>>())),
    ];
    for k in 0..6 {
        columns.push(Arc::new(Float64Array::from(
            rows.iter().map(|r| r.readings[k]).collect::<Vec<_>>(),
        )));
    }

    let batch = RecordBatch::try_new(schema.clone(), columns).context("building record batch")?;
    let file = std::fs::File::create(PARQUET_PATH).context("creating parquet file")?;
    let mut writer = ArrowWriter::try_new(file, schema, None).context("creating parquet writer")?;
    writer.write(&batch)?;
    writer.close()?;

    println!(
        "Wrote {} rows ({} cities × {DAYS} days) to {CSV_PATH} and {PARQUET_PATH}",
        rows.len(),
        cities.len()
    );
    Ok(())
}
