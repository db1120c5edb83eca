use serde::{Deserialize, Serialize};
use tracing::warn;

/// One plan line item. Nutrient fields are strings by deliberate convention:
/// they carry the catalog's decimal-formatted text verbatim so a saved plan
/// displays exactly what was selected, independent of later catalog changes.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PlanItem {
    pub produkt: String,
    pub menge: f64,
    pub kcal: String,
    pub fett: String,
    pub eiweiss: String,
    pub kh: String,
    pub glyk_index: String,
}

/// Summed display row over a plan's line items.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct PlanTotals {
    pub menge: f64,
    pub kcal: String,
    pub fett: String,
    pub eiweiss: String,
    pub kh: String,
}

pub fn render_payload(items: &[PlanItem]) -> anyhow::Result<String> {
    Ok(serde_json::to_string(items)?)
}

/// Parses a stored payload; malformed JSON yields an empty list rather than
/// an error.
pub fn parse_payload(json: &str) -> Vec<PlanItem> {
    match serde_json::from_str(json) {
        Ok(items) => items,
        Err(e) => {
            warn!(error = %e, "unparseable plan payload");
            Vec::new()
        }
    }
}

fn parse_or_zero(text: &str) -> f64 {
    text.parse::<f64>().unwrap_or(0.0)
}

pub fn totals(items: &[PlanItem]) -> PlanTotals {
    let menge = items.iter().map(|i| i.menge).sum();
    let kcal: f64 = items.iter().map(|i| parse_or_zero(&i.kcal)).sum();
    let fett: f64 = items.iter().map(|i| parse_or_zero(&i.fett)).sum();
    let eiweiss: f64 = items.iter().map(|i| parse_or_zero(&i.eiweiss)).sum();
    let kh: f64 = items.iter().map(|i| parse_or_zero(&i.kh)).sum();
    PlanTotals {
        menge,
        kcal: format!("{kcal:.1}"),
        fett: format!("{fett:.1}"),
        eiweiss: format!("{eiweiss:.1}"),
        kh: format!("{kh:.1}"),
    }
}

/// The seven weekday tags a plan can be filed under.
pub const WEEKDAYS: [&str; 7] = [
    "Montag",
    "Dienstag",
    "Mittwoch",
    "Donnerstag",
    "Freitag",
    "Samstag",
    "Sonntag",
];

pub fn is_weekday(tag: &str) -> bool {
    WEEKDAYS.contains(&tag)
}

/// Sort key for weekday tags; unknown tags sort last.
pub fn weekday_order(tag: &str) -> u8 {
    match tag.to_lowercase().as_str() {
        "montag" => 1,
        "dienstag" => 2,
        "mittwoch" => 3,
        "donnerstag" => 4,
        "freitag" => 5,
        "samstag" => 6,
        "sonntag" => 7,
        _ => 99,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn apfel(menge: f64) -> PlanItem {
        PlanItem {
            produkt: "Apfel".into(),
            menge,
            kcal: "52.0".into(),
            fett: "0.2".into(),
            eiweiss: "0.3".into(),
            kh: "11.4".into(),
            glyk_index: "38".into(),
        }
    }

    #[test]
    fn payload_round_trips() {
        let items = vec![apfel(150.0), apfel(80.5)];
        let json = render_payload(&items).unwrap();
        let parsed = parse_payload(&json);
        assert_eq!(parsed, items);
    }

    #[test]
    fn malformed_payload_parses_to_empty_list() {
        assert!(parse_payload("not json").is_empty());
        assert!(parse_payload(r#"{"produkt":"Apfel"}"#).is_empty());
    }

    #[test]
    fn totals_sum_and_reformat_to_one_decimal() {
        let mut banane = apfel(100.0);
        banane.produkt = "Banane".into();
        banane.kcal = "88.7".into();
        banane.fett = "0.3".into();
        let sum = totals(&[apfel(150.0), banane]);
        assert_eq!(sum.menge, 250.0);
        assert_eq!(sum.kcal, "140.7");
        assert_eq!(sum.fett, "0.5");
    }

    #[test]
    fn totals_treat_unparseable_nutrients_as_zero() {
        let mut broken = apfel(50.0);
        broken.kcal = "viel".into();
        let sum = totals(&[broken]);
        assert_eq!(sum.kcal, "0.0");
    }

    #[test]
    fn weekday_order_covers_all_seven_days() {
        let orders: Vec<u8> = WEEKDAYS.iter().map(|d| weekday_order(d)).collect();
        assert_eq!(orders, vec![1, 2, 3, 4, 5, 6, 7]);
        assert_eq!(weekday_order("MONTAG"), 1);
        assert_eq!(weekday_order("Feiertag"), 99);
    }
}
