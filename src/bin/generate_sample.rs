use std::sync::Arc;

use anyhow::{Context, Result};
use arrow::array::{Float64Array, Int64Array, StringArray};
use arrow::datatypes::{DataType, Field, Schema};
use arrow::record_batch::RecordBatch;
use parquet::arrow::ArrowWriter;

const N_LISTINGS: usize = 600;

/// Neighbourhood and its typical nightly price for an entire home.
const NEIGHBOURHOODS: [(&str, f64); 12] = [
    ("Allston", 120.0),
    ("Back Bay", 320.0),
    ("Beacon Hill", 290.0),
    ("Charlestown", 250.0),
    ("Dorchester", 140.0),
    ("Downtown", 340.0),
    ("East Boston", 150.0),
    ("Fenway", 240.0),
    ("Jamaica Plain", 170.0),
    ("Roxbury", 130.0),
    ("South Boston", 230.0),
    ("South End", 260.0),
];

/// Room type, price multiplier, share of listings.
const ROOM_TYPES: [(&str, f64, f64); 4] = [
    ("Entire home/apt", 1.0, 0.60),
    ("Private room", 0.45, 0.33),
    ("Hotel room", 0.9, 0.04),
    ("Shared room", 0.25, 0.03),
];

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

    fn pick<T: Copy>(&mut self, items: &[T]) -> T {
        items[(self.next_u64() % items.len() as u64) as usize]
    }
}

/// `1234.5` → `"$1,234.50"`, the way listing exports format prices.
fn currency(v: f64) -> String {
    let cents = (v * 100.0).round() as u64;
    let digits = (cents / 100).to_string();
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }
    format!("${grouped}.{:02}", cents % 100)
}

struct Row {
    id: i64,
    neighbourhood: &'static str,
    price: String,
    room_type: &'static str,
    reviews: i64,
    score: Option<f64>,
}

fn generate(rng: &mut SimpleRng) -> Vec<Row> {
    (0..N_LISTINGS)
        .map(|i| {
            let (neighbourhood, base) = rng.pick(&NEIGHBOURHOODS);

            let roll = rng.next_f64();
            let mut acc = 0.0;
            let (room_type, multiplier, _) = ROOM_TYPES
                .iter()
                .copied()
                .find(|&(_, _, share)| {
                    acc += share;
                    roll < acc
                })
                .unwrap_or(ROOM_TYPES[0]);

            let price = (base * multiplier * rng.gauss(0.0, 0.35).exp()).max(10.0);
            let reviews = rng.gauss(2.5, 1.4).exp().floor() as i64 - 1;
            let reviews = reviews.max(0);
            // Listings without reviews have no score.
            let score = (reviews > 0)
                .then(|| (rng.gauss(4.7, 0.3).clamp(1.0, 5.0) * 100.0).round() / 100.0);

            Row {
                id: 10_000 + i as i64,
                neighbourhood,
                price: currency(price),
                room_type,
                reviews,
                score,
            }
        })
        .collect()
}

fn write_csv(rows: &[Row], path: &str) -> Result<()> {
    let mut writer = csv::Writer::from_path(path).with_context(|| format!("creating {path}"))?;
    writer.write_record([
        "id",
        "neighbourhood_cleansed",
        "price",
        "room_type",
        "number_of_reviews",
        "review_scores_rating",
    ])?;
    for row in rows {
        writer.write_record([
            row.id.to_string(),
            row.neighbourhood.to_string(),
            row.price.clone(),
            row.room_type.to_string(),
            row.reviews.to_string(),
            row.score.map(|s| s.to_string()).unwrap_or_default(),
        ])?;
    }
    writer.flush().with_context(|| format!("writing {path}"))?;
    Ok(())
}

fn write_parquet(rows: &[Row], path: &str) -> Result<()> {
    let schema = Arc::new(Schema::new(vec![
        Field::new("id", DataType::Int64, false),
        Field::new("neighbourhood_cleansed", DataType::Utf8, false),
        Field::new("price", DataType::Utf8, false),
        Field::new("room_type", DataType::Utf8, false),
        Field::new("number_of_reviews", DataType::Int64, false),
        Field::new("review_scores_rating", DataType::Float64, true),
    ]));

    let batch = RecordBatch::try_new(
        schema.clone(),
        vec![
            Arc::new(Int64Array::from_iter_values(rows.iter().map(|r| r.id))),
            Arc::new(StringArray::from_iter_values(rows.iter().map(|r| r.neighbourhood))),
            Arc::new(StringArray::from_iter_values(rows.iter().map(|r| r.price.as_str()))),
            Arc::new(StringArray::from_iter_values(rows.iter().map(|r| r.room_type))),
            Arc::new(Int64Array::from_iter_values(rows.iter().map(|r| r.reviews))),
            Arc::new(rows.iter().map(|r| r.score).collect::<Float64Array>()),
        ],
    )
    .context("building record batch")?;

    let file = std::fs::File::create(path).with_context(|| format!("creating {path}"))?;
    let mut writer = ArrowWriter::try_new(file, schema, None).context("creating parquet writer")?;
    writer.write(&batch).context("writing parquet batch")?;
    writer.close().context("closing parquet writer")?;
    Ok(())
}

fn main() -> Result<()> {
    let mut rng = SimpleRng::new(42);
    let rows = generate(&mut rng);

    write_csv(&rows, "listings.csv")?;
    write_parquet(&rows, "listings.parquet")?;

    println!("Wrote {} listings to listings.csv and listings.parquet", rows.len());
    Ok(())
}
