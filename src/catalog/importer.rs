use std::io::Read;
use std::path::Path;

use anyhow::Context;
use rust_decimal::{Decimal, RoundingStrategy};
use sqlx::SqlitePool;
use tracing::{debug, info};

use crate::catalog::repo::{self, Lebensmittel};

/// Reads the bundled catalog CSV and replaces the entire persisted catalog
/// with its contents. Runs on every application start.
///
/// Failure to open the file fails the whole operation; the caller treats
/// that as fatal to catalog browsing for this session.
pub async fn import_catalog(db: &SqlitePool, path: &Path) -> anyhow::Result<usize> {
    let file = std::fs::File::open(path)
        .with_context(|| format!("open catalog file {}", path.display()))?;
    let items = parse_catalog(file);
    repo::replace_all(db, &items).await?;
    info!(count = items.len(), "catalog imported");
    Ok(items.len())
}

/// Parses catalog rows. Columns are
/// `[index, gruppe, produkt, kalorien, fett, eiweiss, kohlenhydrate, glyk_index]`,
/// comma-separated and double-quote-quoted, one header row. Rows with fewer
/// than 8 columns are dropped without a count.
pub fn parse_catalog<R: Read>(input: R) -> Vec<Lebensmittel> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .quote(b'"')
        .from_reader(input);

    let mut items = Vec::new();
    for record in reader.records() {
        let record = match record {
            Ok(r) => r,
            Err(e) => {
                debug!(error = %e, "unreadable catalog row skipped");
                continue;
            }
        };
        if record.len() < 8 {
            continue;
        }
        items.push(Lebensmittel {
            id: 0,
            gruppe: record[1].trim().to_string(),
            produkt: record[2].trim().to_string(),
            kalorien: normalize_nutrient(&record[3]),
            fett: normalize_nutrient(&record[4]),
            eiweiss: normalize_nutrient(&record[5]),
            kohlenhydrate: normalize_nutrient(&record[6]),
            glyk_index: record[7].parse::<i64>().unwrap_or(0),
        });
    }
    items
}

/// Decimal comma becomes a decimal point; unparseable input becomes `0.0`;
/// the result is rounded half-up to exactly one fractional digit and
/// rendered as plain decimal text.
fn normalize_nutrient(raw: &str) -> String {
    let value = raw
        .replace(',', ".")
        .parse::<Decimal>()
        .unwrap_or(Decimal::ZERO)
        .round_dp_with_strategy(1, RoundingStrategy::MidpointAwayFromZero);
    format!("{value:.1}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalize_replaces_comma_and_rounds_half_up() {
        assert_eq!(normalize_nutrient("0,2"), "0.2");
        assert_eq!(normalize_nutrient("2,45"), "2.5");
        assert_eq!(normalize_nutrient("2.44"), "2.4");
        assert_eq!(normalize_nutrient("52"), "52.0");
        assert_eq!(normalize_nutrient("88,7"), "88.7");
    }

    #[test]
    fn normalize_substitutes_zero_on_parse_failure() {
        assert_eq!(normalize_nutrient(""), "0.0");
        assert_eq!(normalize_nutrient("n/a"), "0.0");
        assert_eq!(normalize_nutrient("1,2,3"), "0.0");
    }

    #[test]
    fn header_is_skipped_and_short_rows_are_dropped() {
        let csv = "index,gruppe,produkt,kalorien,fett,eiweiss,kohlenhydrate,glyk_index\n\
                   1,Obst,Apfel,\"52\",\"0,2\",\"0,3\",\"11,4\",38\n\
                   2,Obst,Birne,57\n";
        let items = parse_catalog(csv.as_bytes());
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].produkt, "Apfel");
    }

    #[test]
    fn single_data_row_yields_one_item() {
        let csv = "index,gruppe,produkt,kalorien,fett,eiweiss,kohlenhydrate,glyk_index\n\
                   1,Obst,Apfel,\"52,5\",\"0,2\",\"0,3\",\"11,4\",38\n";
        let items = parse_catalog(csv.as_bytes());
        assert_eq!(items.len(), 1);
        let apfel = &items[0];
        assert_eq!(apfel.gruppe, "Obst");
        assert_eq!(apfel.produkt, "Apfel");
        assert_eq!(apfel.kalorien, "52.5");
        assert_eq!(apfel.fett, "0.2");
        assert_eq!(apfel.glyk_index, 38);
    }

    #[test]
    fn gruppe_and_produkt_are_trimmed_but_not_validated() {
        let csv = "h1,h2,h3,h4,h5,h6,h7,h8\n\
                   1, Obst ,  ,52,1,1,1,zehn\n";
        let items = parse_catalog(csv.as_bytes());
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].gruppe, "Obst");
        assert_eq!(items[0].produkt, "");
        assert_eq!(items[0].glyk_index, 0);
    }

    #[test]
    fn parsing_twice_yields_the_same_records() {
        let csv = "index,gruppe,produkt,kalorien,fett,eiweiss,kohlenhydrate,glyk_index\n\
                   1,Obst,Apfel,\"52\",\"0,2\",\"0,3\",\"11,4\",38\n\
                   2,Gemüse,Tomate,\"18\",\"0,2\",\"0,9\",\"3,9\",30\n";
        let first = parse_catalog(csv.as_bytes());
        let second = parse_catalog(csv.as_bytes());
        assert_eq!(first, second);
        assert_eq!(first.len(), 2);
    }
}
