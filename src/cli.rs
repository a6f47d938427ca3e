use anyhow::{Context, Result};
use clap::Parser;
use std::path::PathBuf;
use tracing::info;

use crate::booli::{ListingSource, SearchParams};
use crate::query::{ResultSet, Value, F, Q};

/// Search Booli listings and filter, sort or group the results locally
#[derive(Debug, Parser)]
#[command(name = "booli-query", version)]
pub struct Cli {
    /// Area to search, e.g. "stockholm"
    pub area: String,

    /// Extra API parameter as key=value, repeatable
    #[arg(long = "param", value_parser = parse_key_value)]
    pub params: Vec<(String, Value)>,

    /// Keep listings matching field[__operator]=value, repeatable
    #[arg(long = "filter", value_parser = parse_key_value)]
    pub filters: Vec<(String, Value)>,

    /// Drop listings matching field[__operator]=value, repeatable
    #[arg(long = "exclude", value_parser = parse_key_value)]
    pub excludes: Vec<(String, Value)>,

    /// Sort key, prefix with '-' for descending, repeatable
    #[arg(long = "order-by", allow_hyphen_values = true)]
    pub order_by: Vec<String>,

    /// Print listing counts per value of this field
    #[arg(long)]
    pub group_by: Option<String>,

    /// Maximum number of listings to print
    #[arg(long)]
    pub limit: Option<usize>,

    /// Read a saved search response instead of calling the API
    #[arg(long)]
    pub input: Option<PathBuf>,
}

/// Parse a command-line value: integer, then float, then text.
/// Comma-separated input becomes a list, as `in` and `range` expect.
pub fn parse_value(raw: &str) -> Value {
    if raw.contains(',') {
        return Value::List(raw.split(',').map(parse_scalar).collect());
    }
    parse_scalar(raw)
}

fn parse_scalar(raw: &str) -> Value {
    let raw = raw.trim();
    if let Ok(i) = raw.parse::<i64>() {
        Value::Int(i)
    } else if let Ok(f) = raw.parse::<f64>() {
        Value::Float(f)
    } else {
        Value::from(raw)
    }
}

fn parse_key_value(s: &str) -> Result<(String, Value), String> {
    let (key, value) = s
        .split_once('=')
        .ok_or_else(|| format!("expected key=value, got '{}'", s))?;
    Ok((key.to_string(), parse_value(value)))
}

/// Fetch, query and render the search as pretty JSON
pub async fn run(cli: &Cli, source: &dyn ListingSource) -> Result<String> {
    let params: SearchParams = cli.params.iter().cloned().collect();
    let listings = source.search(&cli.area, &params).await?;

    let to_lookups = |pairs: &[(String, Value)]| {
        Q::from_lookups(pairs.iter().map(|(k, v)| (k.as_str(), F::from(v.clone()))))
    };

    let mut result = listings
        .filter(&to_lookups(&cli.filters)?)
        .context("Invalid --filter")?;
    if !cli.excludes.is_empty() {
        result = result
            .exclude(&to_lookups(&cli.excludes)?)
            .context("Invalid --exclude")?;
    }
    if !cli.order_by.is_empty() {
        result = result
            .order_by(cli.order_by.iter().map(String::as_str))
            .context("Invalid --order-by")?;
    }

    info!(
        "{} of {} listings left after local query",
        result.len(),
        listings.len()
    );

    if let Some(field) = &cli.group_by {
        // stable sort keeps the --order-by order inside each group
        let counts = result
            .order_by([field.as_str()])
            .and_then(|sorted| sorted.group_by_count(field))
            .context("Invalid --group-by")?;
        return serde_json::to_string_pretty(&counts).context("Failed to render groups");
    }

    let mut records = result.into_vec();
    if let Some(limit) = cli.limit {
        records.truncate(limit);
    }
    let output = match listings.total_count() {
        Some(total) => ResultSet::with_total_count(records, total),
        None => ResultSet::new(records),
    };
    serde_json::to_string_pretty(&output).context("Failed to render listings")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Listing;
    use async_trait::async_trait;
    use serde_json::json;

    struct FixedSource;

    #[async_trait]
    impl ListingSource for FixedSource {
        async fn search(&self, area: &str, params: &SearchParams) -> Result<ResultSet<Listing>> {
            assert_eq!(area, "stockholm");
            assert_eq!(params.get("minRooms"), Some(&Value::Int(2)));

            let listing = |id: i64, price: i64, city: &str| {
                Listing::from_booli_json(json!({
                    "booliId": id,
                    "created": "2012-05-01 08:00:00",
                    "priceForSale": price,
                    "location": { "address": { "city": city } }
                }))
                .unwrap()
            };
            Ok(ResultSet::with_total_count(
                vec![
                    listing(1, 100, "A"),
                    listing(2, 200, "B"),
                    listing(3, 150, "A"),
                ],
                40,
            ))
        }
    }

    fn cli(args: &[&str]) -> Cli {
        let mut argv = vec!["booli-query", "stockholm", "--param", "minRooms=2"];
        argv.extend_from_slice(args);
        Cli::try_parse_from(argv).unwrap()
    }

    #[test]
    fn test_parse_value() {
        assert_eq!(parse_value("42"), Value::Int(42));
        assert_eq!(parse_value("2.5"), Value::Float(2.5));
        assert_eq!(parse_value("Vasastan"), Value::from("Vasastan"));
        assert_eq!(parse_value("10,20"), Value::from((10, 20)));
    }

    #[test]
    fn test_parse_arguments() {
        let cli = cli(&["--filter", "price__range=100,150", "--order-by", "-price"]);
        assert_eq!(cli.filters[0].0, "price__range");
        assert_eq!(cli.order_by, vec!["-price"]);
        assert!(Cli::try_parse_from(["booli-query", "x", "--filter", "novalue"]).is_err());
    }

    #[tokio::test]
    async fn test_run_filter_and_order() {
        let args = cli(&["--filter", "city=A", "--order-by", "-price"]);
        let output: serde_json::Value =
            serde_json::from_str(&run(&args, &FixedSource).await.unwrap()).unwrap();

        let ids: Vec<i64> = output["records"]
            .as_array()
            .unwrap()
            .iter()
            .map(|l| l["id"].as_i64().unwrap())
            .collect();
        assert_eq!(ids, vec![3, 1]);
        assert_eq!(output["total_count"], 40);
    }

    #[tokio::test]
    async fn test_run_group_by() {
        let args = cli(&["--exclude", "price__gt=150", "--group-by", "city"]);
        let output = run(&args, &FixedSource).await.unwrap();
        let groups: serde_json::Value = serde_json::from_str(&output).unwrap();
        assert_eq!(groups, json!([["A", 2]]));
    }

    #[tokio::test]
    async fn test_run_rejects_unknown_operator() {
        let args = cli(&["--filter", "price__between=1,2"]);
        let err = run(&args, &FixedSource).await.unwrap_err();
        assert!(format!("{:#}", err).contains("between"));
    }
}
