//! Shared property search core: the raw-input normalizer and the
//! predicate evaluator. Every surface that narrows a property list goes
//! through these two, so the SQL translation and any in-memory
//! re-filtering cannot drift apart.

use serde::Deserialize;

use crate::models::{DealType, Property};

/// Floor of the open-ended search bucket. The search forms offer
/// 1, 2, 3, 4 and "5+" for both bedrooms and bathrooms.
pub const OPEN_ENDED_FLOOR: i16 = 5;

/// Raw filter parameters exactly as they arrive on the query string.
/// Everything is an optional string; parsing happens in
/// [`Filter::from_raw`].
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct RawFilter {
    #[serde(rename = "type")]
    pub deal_type: Option<String>,
    #[serde(alias = "neighborhood")]
    pub location: Option<String>,
    pub bedrooms: Option<String>,
    pub bathrooms: Option<String>,
    #[serde(rename = "minPrice")]
    pub min_price: Option<String>,
    #[serde(rename = "maxPrice")]
    pub max_price: Option<String>,
}

/// A bedroom or bathroom constraint: either an exact count or the
/// open-ended "N+" bucket.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CountFilter {
    Exactly(i16),
    AtLeast(i16),
}

impl CountFilter {
    /// Parses a raw count value. The leading numeric token is extracted
    /// first, so `"5+"`, `"5+ Quartos"` and `"3 Quartos"` all parse;
    /// a `+` immediately after the token marks the open-ended bucket.
    pub fn parse(input: &str) -> Option<Self> {
        let input = input.trim();
        let digits: &str = {
            let end = input
                .char_indices()
                .find(|(_, c)| !c.is_ascii_digit())
                .map(|(i, _)| i)
                .unwrap_or(input.len());
            &input[..end]
        };
        if digits.is_empty() {
            return None;
        }
        let count: i16 = digits.parse().ok()?;
        if input[digits.len()..].starts_with('+') {
            Some(CountFilter::AtLeast(count))
        } else {
            Some(CountFilter::Exactly(count))
        }
    }

    pub fn matches(&self, count: i16) -> bool {
        match *self {
            CountFilter::Exactly(expected) => count == expected,
            CountFilter::AtLeast(floor) => count >= floor,
        }
    }
}

/// Canonical, strongly typed filter. Unpopulated fields impose no
/// constraint. When both price bounds are present, `min_price <=
/// max_price` holds.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Filter {
    pub deal_type: Option<DealType>,
    pub location_substring: Option<String>,
    pub bedrooms: Option<CountFilter>,
    pub bathrooms: Option<CountFilter>,
    pub min_price: Option<i64>,
    pub max_price: Option<i64>,
}

impl Filter {
    /// Normalizes raw query-string input. Never fails: malformed or
    /// blank fields are dropped rather than reported, so callers always
    /// get a best-effort filter. An inverted price range is swapped.
    pub fn from_raw(raw: &RawFilter) -> Self {
        let deal_type = raw.deal_type.as_deref().and_then(DealType::parse);

        let location_substring = raw
            .location
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_string);

        let bedrooms = raw.bedrooms.as_deref().and_then(CountFilter::parse);
        let bathrooms = raw.bathrooms.as_deref().and_then(CountFilter::parse);

        let min_price = raw.min_price.as_deref().and_then(parse_price);
        let max_price = raw.max_price.as_deref().and_then(parse_price);
        let (min_price, max_price) = match (min_price, max_price) {
            (Some(min), Some(max)) if min > max => (Some(max), Some(min)),
            other => other,
        };

        Filter {
            deal_type,
            location_substring,
            bedrooms,
            bathrooms,
            min_price,
            max_price,
        }
    }

    pub fn is_empty(&self) -> bool {
        *self == Filter::default()
    }

    /// Whether a single record satisfies every populated constraint.
    pub fn matches(&self, property: &Property) -> bool {
        if let Some(deal_type) = self.deal_type {
            if property.deal_type != deal_type {
                return false;
            }
        }
        if let Some(fragment) = &self.location_substring {
            if !property
                .location
                .to_lowercase()
                .contains(&fragment.to_lowercase())
            {
                return false;
            }
        }
        if let Some(bedrooms) = self.bedrooms {
            if !bedrooms.matches(property.bedrooms) {
                return false;
            }
        }
        if let Some(bathrooms) = self.bathrooms {
            if !bathrooms.matches(property.bathrooms) {
                return false;
            }
        }
        if let Some(min) = self.min_price {
            if property.price < min {
                return false;
            }
        }
        if let Some(max) = self.max_price {
            if property.price > max {
                return false;
            }
        }
        true
    }

    /// Keeps the records satisfying every populated constraint,
    /// preserving their relative order.
    pub fn evaluate(&self, properties: Vec<Property>) -> Vec<Property> {
        properties.into_iter().filter(|p| self.matches(p)).collect()
    }
}

// Same leading-token rule as the count fields, without the bucket
// marker. `"900000"` and `"900000 BRL"` both parse; `""` and `"abc"`
// do not.
fn parse_price(input: &str) -> Option<i64> {
    let input = input.trim();
    let end = input
        .char_indices()
        .find(|(_, c)| !c.is_ascii_digit())
        .map(|(i, _)| i)
        .unwrap_or(input.len());
    if end == 0 {
        return None;
    }
    input[..end].parse().ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDateTime;
    use uuid::Uuid;

    fn property(
        location: &str,
        deal_type: DealType,
        bedrooms: i16,
        bathrooms: i16,
        price: i64,
    ) -> Property {
        Property {
            id: Uuid::new_v4(),
            title: format!("Imóvel em {}", location),
            location: location.to_string(),
            neighborhood: "Ipiranga".to_string(),
            price,
            bedrooms,
            bathrooms,
            area: 70.0,
            suites: None,
            parking_spaces: None,
            property_tax_annual: None,
            code: 1,
            description: "test".to_string(),
            deal_type,
            images: vec![],
            latitude: None,
            longitude: None,
            condo_fee: None,
            pets_allowed: false,
            furnished: false,
            created_at: NaiveDateTime::default(),
        }
    }

    fn fixtures() -> Vec<Property> {
        vec![
            property("Rua A, Ipiranga", DealType::Sale, 2, 1, 300_000),
            property("Rua B, Vila Mariana", DealType::Rent, 5, 4, 900_000),
        ]
    }

    fn raw(
        deal_type: Option<&str>,
        location: Option<&str>,
        bedrooms: Option<&str>,
        bathrooms: Option<&str>,
        min_price: Option<&str>,
        max_price: Option<&str>,
    ) -> RawFilter {
        RawFilter {
            deal_type: deal_type.map(String::from),
            location: location.map(String::from),
            bedrooms: bedrooms.map(String::from),
            bathrooms: bathrooms.map(String::from),
            min_price: min_price.map(String::from),
            max_price: max_price.map(String::from),
        }
    }

    #[test]
    fn count_filter_parses_exact_and_open_ended() {
        assert_eq!(CountFilter::parse("3"), Some(CountFilter::Exactly(3)));
        assert_eq!(CountFilter::parse("5+"), Some(CountFilter::AtLeast(5)));
        assert_eq!(
            CountFilter::parse("5+ Quartos"),
            Some(CountFilter::AtLeast(5))
        );
        assert_eq!(
            CountFilter::parse("3 Quartos"),
            Some(CountFilter::Exactly(3))
        );
        assert_eq!(CountFilter::parse(" 2 "), Some(CountFilter::Exactly(2)));
        assert_eq!(CountFilter::parse("Quartos"), None);
        assert_eq!(CountFilter::parse(""), None);
        assert_eq!(CountFilter::parse("+"), None);
    }

    #[test]
    fn open_ended_bucket_is_inclusive_at_the_floor() {
        let bucket = CountFilter::AtLeast(OPEN_ENDED_FLOOR);
        assert!(bucket.matches(5));
        assert!(bucket.matches(7));
        assert!(!bucket.matches(4));
    }

    #[test]
    fn normalizer_drops_malformed_fields() {
        let filter = Filter::from_raw(&raw(
            Some("permuta"),
            Some("   "),
            Some("muitos"),
            None,
            Some("abc"),
            Some(""),
        ));
        assert!(filter.is_empty());
    }

    #[test]
    fn normalizer_maps_portuguese_deal_types() {
        let filter = Filter::from_raw(&raw(Some("Venda"), None, None, None, None, None));
        assert_eq!(filter.deal_type, Some(DealType::Sale));
        let filter = Filter::from_raw(&raw(Some("locação"), None, None, None, None, None));
        assert_eq!(filter.deal_type, Some(DealType::Rent));
    }

    #[test]
    fn normalizer_extracts_bucket_from_labelled_input() {
        let filter = Filter::from_raw(&raw(None, None, Some("5+ Quartos"), None, None, None));
        assert_eq!(filter.bedrooms, Some(CountFilter::AtLeast(5)));
        assert_eq!(filter.bathrooms, None);
    }

    #[test]
    fn normalizer_swaps_inverted_price_range() {
        let filter = Filter::from_raw(&raw(
            None,
            None,
            None,
            None,
            Some("900000"),
            Some("300000"),
        ));
        assert_eq!(filter.min_price, Some(300_000));
        assert_eq!(filter.max_price, Some(900_000));
    }

    #[test]
    fn normalizer_is_deterministic() {
        let input = raw(
            Some("rent"),
            Some("ipiranga"),
            Some("5+"),
            Some("2"),
            Some("1000"),
            Some("2000"),
        );
        assert_eq!(Filter::from_raw(&input), Filter::from_raw(&input));
    }

    #[test]
    fn empty_filter_matches_everything() {
        let all = fixtures();
        assert_eq!(Filter::default().evaluate(all.clone()), all);
    }

    #[test]
    fn deal_type_narrows_to_sales() {
        let result = Filter {
            deal_type: Some(DealType::Sale),
            ..Filter::default()
        }
        .evaluate(fixtures());
        assert_eq!(result.len(), 1);
        assert_eq!(result[0].location, "Rua A, Ipiranga");
    }

    #[test]
    fn bedroom_floor_keeps_only_large_listings() {
        let result = Filter {
            bedrooms: Some(CountFilter::AtLeast(5)),
            ..Filter::default()
        }
        .evaluate(fixtures());
        assert_eq!(result.len(), 1);
        assert_eq!(result[0].bedrooms, 5);
    }

    #[test]
    fn location_match_is_case_insensitive() {
        let result = Filter {
            location_substring: Some("mariana".to_string()),
            ..Filter::default()
        }
        .evaluate(fixtures());
        assert_eq!(result.len(), 1);
        assert_eq!(result[0].location, "Rua B, Vila Mariana");

        let result = Filter {
            location_substring: Some("ipiranga".to_string()),
            ..Filter::default()
        }
        .evaluate(vec![property(
            "Rua X, Alto do IPIRANGA",
            DealType::Sale,
            1,
            1,
            100_000,
        )]);
        assert_eq!(result.len(), 1);
    }

    #[test]
    fn price_range_narrows_and_is_inclusive() {
        let result = Filter {
            min_price: Some(400_000),
            max_price: Some(1_000_000),
            ..Filter::default()
        }
        .evaluate(fixtures());
        assert_eq!(result.len(), 1);
        assert_eq!(result[0].price, 900_000);

        let exact = Filter {
            min_price: Some(500_000),
            max_price: Some(500_000),
            ..Filter::default()
        };
        let listing = property("Rua C", DealType::Sale, 1, 1, 500_000);
        assert!(exact.matches(&listing));
    }

    #[test]
    fn missing_optional_record_fields_never_panic() {
        // Records always carry bedrooms/bathrooms in this schema; the
        // closest analogue is the zero count, which must simply fail a
        // positive constraint rather than blow up.
        let listing = property("Rua D", DealType::Sale, 0, 0, 0);
        let filter = Filter {
            bathrooms: Some(CountFilter::Exactly(2)),
            ..Filter::default()
        };
        assert!(!filter.matches(&listing));
    }
}
