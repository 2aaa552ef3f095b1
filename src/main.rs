use rusty_wheels::analysis::insights::{metrics, summarize};
use rusty_wheels::data::loader::DatasetRepository;

fn main() -> anyhow::Result<()> {
    env_logger::init();

    let path = std::env::args()
        .nth(1)
        .unwrap_or_else(|| "Cars.csv".to_string());

    let mut repo = DatasetRepository::new(&path);
    let dataset = repo.load_cleaned()?;

    let insights = summarize(dataset)?;
    println!("{}", serde_json::to_string_pretty(&insights)?);
    println!("{}", serde_json::to_string_pretty(&metrics(dataset))?);

    Ok(())
}
