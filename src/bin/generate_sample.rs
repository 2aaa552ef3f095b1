//! Write a synthetic `Cars.csv` for trying out the dashboard without the
//! real dataset.  Deterministic: same seed, same file.

use anyhow::{Context, Result};

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

    fn pick<'a, T>(&mut self, options: &'a [T]) -> &'a T {
        &options[(self.next_u64() % options.len() as u64) as usize]
    }
}

fn main() -> Result<()> {
    let mut rng = SimpleRng::new(42);

    let companies = ["Maruti", "Honda", "Hyundai", "Toyota", "BMW", "Mercedes"];
    let fuel_types = ["Petrol", "Diesel", "CNG"];
    let transmissions = ["Manual", "Automatic"];
    // Rough price multiplier per company, premium brands higher.
    let base_price = [300_000.0, 450_000.0, 400_000.0, 600_000.0, 2_000_000.0, 2_400_000.0];

    let output_path = "Cars.csv";
    let mut writer = csv::Writer::from_path(output_path).context("creating output file")?;
    writer.write_record([
        "Company_Name",
        "Price",
        "Kilometers_Driven",
        "Year",
        "Fuel_Type",
        "Transmission",
        "Power",
        "Latitude",
        "Longitude",
    ])?;

    let mut rows = 0usize;
    for _ in 0..300 {
        let company_idx = (rng.next_u64() % companies.len() as u64) as usize;
        let year = 2008 + (rng.next_u64() % 16) as i64;
        let age = (2024 - year) as f64;

        let km = (8_000.0 + rng.next_f64() * 12_000.0) * age;
        let price = base_price[company_idx] * (1.0 - 0.06 * age) * (0.8 + rng.next_f64() * 0.4);
        let power = 60.0 + rng.next_f64() * 180.0;
        // Scatter around Mumbai.
        let lat = 19.0 + rng.next_f64() * 0.5;
        let lon = 72.8 + rng.next_f64() * 0.5;

        // A slice of messy raw cells so the cleaning pass has work to do:
        // grouped digits, stray text, and blanks.
        let price_cell = match rng.next_u64() % 10 {
            0 => group_digits(price as i64),
            1 => "Ask Dealer".to_string(),
            _ => format!("{:.0}", price.max(50_000.0)),
        };
        let power_cell = if rng.next_u64() % 12 == 0 {
            String::new()
        } else {
            format!("{power:.1}")
        };

        let record = [
            companies[company_idx].to_string(),
            price_cell,
            format!("{km:.0}"),
            year.to_string(),
            rng.pick(&fuel_types).to_string(),
            rng.pick(&transmissions).to_string(),
            power_cell,
            format!("{lat:.4}"),
            format!("{lon:.4}"),
        ];
        writer.write_record(&record)?;
        rows += 1;

        // Occasionally duplicate the row verbatim so deduplication shows.
        if rng.next_u64() % 25 == 0 {
            writer.write_record(&record)?;
            rows += 1;
        }
    }

    writer.flush()?;
    println!("Wrote {rows} listings to {output_path}");
    Ok(())
}

/// Indian-style digit grouping ("12,50,000"), as seen in scraped listings.
fn group_digits(n: i64) -> String {
    let digits = n.to_string();
    if digits.len() <= 3 {
        return digits;
    }
    let (head, tail) = digits.split_at(digits.len() - 3);
    let mut grouped = String::new();
    let head_bytes = head.as_bytes();
    for (i, b) in head_bytes.iter().enumerate() {
        if i > 0 && (head_bytes.len() - i) % 2 == 0 {
            grouped.push(',');
        }
        grouped.push(*b as char);
    }
    grouped.push(',');
    grouped.push_str(tail);
    grouped
}
