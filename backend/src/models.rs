use std::io::Write;

use chrono::{NaiveDateTime, Utc};
use diesel::deserialize::{self, FromSql, FromSqlRow};
use diesel::expression::AsExpression;
use diesel::pg::{Pg, PgValue};
use diesel::prelude::*;
use diesel::serialize::{self, IsNull, Output, ToSql};
use diesel::sql_types::Text;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::schema::{properties, visits};

/// Fixed set of neighborhoods served by the agency, canonical spelling.
pub const NEIGHBORHOODS: [&str; 7] = [
    "Ipiranga",
    "Sacomã",
    "Cambuci",
    "Vila Mariana",
    "Saúde",
    "Alto do Ipiranga",
    "São Caetano",
];

// Unaccented spellings accepted on input, index-aligned with NEIGHBORHOODS.
const NEIGHBORHOODS_ASCII: [&str; 7] = [
    "Ipiranga",
    "Sacoma",
    "Cambuci",
    "Vila Mariana",
    "Saude",
    "Alto do Ipiranga",
    "Sao Caetano",
];

/// Maps a submitted neighborhood to its canonical spelling, accepting
/// case differences and missing accents.
pub fn canonical_neighborhood(input: &str) -> Option<&'static str> {
    let input = input.trim();
    NEIGHBORHOODS
        .iter()
        .zip(NEIGHBORHOODS_ASCII.iter())
        .find(|(canonical, ascii)| {
            canonical.to_lowercase() == input.to_lowercase() || ascii.eq_ignore_ascii_case(input)
        })
        .map(|(canonical, _)| *canonical)
}

/// Whether a listing is for sale or for rent. Stored as text in the
/// `deal_type` column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, AsExpression, FromSqlRow)]
#[diesel(sql_type = Text)]
pub enum DealType {
    Sale,
    Rent,
}

impl DealType {
    /// Accepts the canonical names and the Portuguese vocabulary used by
    /// the listing forms, case-insensitively.
    pub fn parse(input: &str) -> Option<Self> {
        match input.trim().to_lowercase().as_str() {
            "sale" | "venda" => Some(DealType::Sale),
            "rent" | "locação" | "locacao" => Some(DealType::Rent),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            DealType::Sale => "Sale",
            DealType::Rent => "Rent",
        }
    }
}

impl ToSql<Text, Pg> for DealType {
    fn to_sql<'b>(&'b self, out: &mut Output<'b, '_, Pg>) -> serialize::Result {
        out.write_all(self.as_str().as_bytes())?;
        Ok(IsNull::No)
    }
}

impl FromSql<Text, Pg> for DealType {
    fn from_sql(bytes: PgValue<'_>) -> deserialize::Result<Self> {
        let value = std::str::from_utf8(bytes.as_bytes())?;
        DealType::parse(value).ok_or_else(|| format!("Unrecognized deal type: {}", value).into())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Queryable, Insertable)]
#[diesel(table_name = properties)]
#[serde(rename_all = "camelCase")]
pub struct Property {
    pub id: Uuid,
    pub title: String,
    pub location: String,
    pub neighborhood: String,
    pub price: i64,
    pub bedrooms: i16,
    pub bathrooms: i16,
    pub area: f64,
    pub suites: Option<i16>,
    pub parking_spaces: Option<i16>,
    pub property_tax_annual: Option<i64>,
    pub code: i32,
    pub description: String,
    pub deal_type: DealType,
    pub images: Vec<String>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub condo_fee: Option<i64>,
    pub pets_allowed: bool,
    pub furnished: bool,
    pub created_at: NaiveDateTime,
}

impl Property {
    /// Image URLs with blank placeholder slots removed. The listing form
    /// submits a fixed-size image array, so stored records may carry
    /// empty strings.
    pub fn display_images(&self) -> Vec<&str> {
        self.images
            .iter()
            .map(String::as_str)
            .filter(|url| !url.trim().is_empty())
            .collect()
    }
}

/// Incoming payload for `POST /api/properties`. Field aliases accept the
/// legacy form names (`codigo`, `vagas`, `iptu`, `saleOrRent`, ...).
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewPropertyRequest {
    pub title: String,
    pub location: String,
    pub neighborhood: String,
    pub price: i64,
    pub bedrooms: i16,
    pub bathrooms: i16,
    pub area: f64,
    pub suites: Option<i16>,
    #[serde(alias = "vagas")]
    pub parking_spaces: Option<i16>,
    #[serde(alias = "iptu")]
    pub property_tax_annual: Option<i64>,
    #[serde(alias = "codigo")]
    pub code: i32,
    pub description: String,
    #[serde(alias = "saleOrRent")]
    pub deal_type: String,
    pub images: Vec<String>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    #[serde(alias = "condominio")]
    pub condo_fee: Option<i64>,
    #[serde(alias = "aceitaPet", default)]
    pub pets_allowed: bool,
    #[serde(alias = "mobilia", default)]
    pub furnished: bool,
}

impl NewPropertyRequest {
    /// Validates the payload and builds the record to insert, assigning
    /// the id and creation timestamp.
    pub fn into_record(self) -> Result<Property, String> {
        if self.title.trim().is_empty() {
            return Err("Title is required".to_string());
        }
        if self.location.trim().is_empty() {
            return Err("Location is required".to_string());
        }
        if self.description.trim().is_empty() {
            return Err("Description is required".to_string());
        }
        let neighborhood = canonical_neighborhood(&self.neighborhood)
            .ok_or_else(|| format!("Unknown neighborhood: {}", self.neighborhood))?;
        let deal_type = DealType::parse(&self.deal_type)
            .ok_or_else(|| format!("Unknown deal type: {}", self.deal_type))?;
        if self.price < 0 {
            return Err("Price must not be negative".to_string());
        }
        if self.bedrooms < 0 || self.bathrooms < 0 {
            return Err("Bedroom and bathroom counts must not be negative".to_string());
        }
        if self.area <= 0.0 {
            return Err("Area must be positive".to_string());
        }

        Ok(Property {
            id: Uuid::new_v4(),
            title: self.title,
            location: self.location,
            neighborhood: neighborhood.to_string(),
            price: self.price,
            bedrooms: self.bedrooms,
            bathrooms: self.bathrooms,
            area: self.area,
            suites: self.suites,
            parking_spaces: self.parking_spaces,
            property_tax_annual: self.property_tax_annual,
            code: self.code,
            description: self.description,
            deal_type,
            images: self.images,
            latitude: self.latitude,
            longitude: self.longitude,
            condo_fee: self.condo_fee,
            pets_allowed: self.pets_allowed,
            furnished: self.furnished,
            created_at: Utc::now().naive_utc(),
        })
    }
}

/// A stored "schedule a visit" lead.
#[derive(Debug, Clone, PartialEq, Serialize, Queryable, Insertable)]
#[diesel(table_name = visits)]
#[serde(rename_all = "camelCase")]
pub struct VisitRequest {
    pub id: Uuid,
    pub property_id: String,
    pub property_title: String,
    pub name: String,
    pub email: String,
    pub phone: String,
    pub visit_date: String,
    pub visit_time: String,
    pub created_at: NaiveDateTime,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewVisitRequest {
    pub property_id: String,
    pub property_title: String,
    pub name: String,
    pub email: String,
    pub phone: String,
    #[serde(alias = "date")]
    pub visit_date: String,
    #[serde(alias = "time")]
    pub visit_time: String,
}

impl NewVisitRequest {
    pub fn into_record(self) -> Result<VisitRequest, String> {
        if self.name.trim().is_empty() {
            return Err("Name is required".to_string());
        }
        if self.email.trim().is_empty() {
            return Err("Email is required".to_string());
        }
        if self.phone.trim().is_empty() {
            return Err("Phone is required".to_string());
        }

        Ok(VisitRequest {
            id: Uuid::new_v4(),
            property_id: self.property_id,
            property_title: self.property_title,
            name: self.name,
            email: self.email,
            phone: self.phone,
            visit_date: self.visit_date,
            visit_time: self.visit_time,
            created_at: Utc::now().naive_utc(),
        })
    }
}
