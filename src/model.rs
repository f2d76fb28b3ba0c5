use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Currencies selectable for foreign clients. Domestic billing is always INR.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum ForeignCurrency {
    Usd,
    Eur,
    Gbp,
    Jpy,
    Cad,
    Aud,
}

impl ForeignCurrency {
    pub const ALL: [ForeignCurrency; 6] = [
        ForeignCurrency::Usd,
        ForeignCurrency::Eur,
        ForeignCurrency::Gbp,
        ForeignCurrency::Jpy,
        ForeignCurrency::Cad,
        ForeignCurrency::Aud,
    ];

    pub fn code(&self) -> &'static str {
        match self {
            ForeignCurrency::Usd => "USD",
            ForeignCurrency::Eur => "EUR",
            ForeignCurrency::Gbp => "GBP",
            ForeignCurrency::Jpy => "JPY",
            ForeignCurrency::Cad => "CAD",
            ForeignCurrency::Aud => "AUD",
        }
    }
}

impl std::fmt::Display for ForeignCurrency {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.code())
    }
}

/// Tax jurisdiction of a client. The variant decides which tax identifier the
/// client carries, its billing currency, and which bank routing code appears
/// on its invoices. A client can never hold both a GSTIN and a VAT id.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Jurisdiction {
    Domestic {
        gst_id: String,
    },
    Foreign {
        country: String,
        vat_id: String,
        currency: ForeignCurrency,
    },
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Client {
    pub id: u64,
    pub name: String,
    pub address: String,
    #[serde(flatten)]
    pub jurisdiction: Jurisdiction,
}

impl Client {
    pub fn currency_code(&self) -> &str {
        match &self.jurisdiction {
            Jurisdiction::Domestic { .. } => "INR",
            Jurisdiction::Foreign { currency, .. } => currency.code(),
        }
    }

    pub fn country(&self) -> &str {
        match &self.jurisdiction {
            Jurisdiction::Domestic { .. } => "India",
            Jurisdiction::Foreign { country, .. } => country,
        }
    }

    /// Label shown in listings.
    pub fn kind(&self) -> &'static str {
        match &self.jurisdiction {
            Jurisdiction::Domestic { .. } => "Domestic",
            Jurisdiction::Foreign { .. } => "Foreign",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ItemCategory {
    #[default]
    Service,
    Reimbursement,
}

/// A single billable entry. Immutable once attached to an invoice.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LineItem {
    pub description: String,
    pub rate: Decimal,
    #[serde(default = "default_quantity")]
    pub quantity: Decimal,
    #[serde(default)]
    pub category: ItemCategory,
}

fn default_quantity() -> Decimal {
    Decimal::ONE
}

impl LineItem {
    pub fn line_total(&self) -> Decimal {
        self.rate * self.quantity
    }
}

/// A persisted invoice. `client_name` is a snapshot taken at creation time
/// and does not track later client renames.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Invoice {
    pub id: String,
    pub client_id: u64,
    pub client_name: String,
    pub date: NaiveDate,
    #[serde(default)]
    pub services: Vec<LineItem>,
    #[serde(default)]
    pub reimbursements: Vec<LineItem>,
    pub total: Decimal,
}

impl Invoice {
    pub fn all_items(&self) -> impl Iterator<Item = &LineItem> {
        self.services.iter().chain(self.reimbursements.iter())
    }
}

/// The biller's own identity and bank details, persisted as the config
/// collection. Loaded once at startup and passed by reference wherever it is
/// needed.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OrgProfile {
    pub name: String,
    pub pan: String,
    pub address: String,
    pub bank_name: String,
    pub branch: String,
    pub branch_address: String,
    pub account_name: String,
    pub account_number: String,
    pub ifsc: String,
    pub swift_bic: String,
}

impl Default for OrgProfile {
    fn default() -> Self {
        OrgProfile {
            name: "Your Name".into(),
            pan: "AAAAA0000A".into(),
            address: "Street Address\nCity, State".into(),
            bank_name: "Bank Name".into(),
            branch: "Branch".into(),
            branch_address: "Branch Address".into(),
            account_name: "Your Name".into(),
            account_number: "000000000000".into(),
            ifsc: "AAAA0000000".into(),
            swift_bic: "AAAABBCC".into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn decimal(s: &str) -> Decimal {
        s.parse().unwrap()
    }

    #[test]
    fn line_total_is_rate_times_quantity() {
        let item = LineItem {
            description: "Design".into(),
            rate: decimal("100"),
            quantity: decimal("5"),
            category: ItemCategory::Service,
        };
        assert_eq!(item.line_total(), decimal("500"));
    }

    #[test]
    fn domestic_client_uses_local_currency_and_country() {
        let client = Client {
            id: 1,
            name: "Desi Co".into(),
            address: "Mumbai".into(),
            jurisdiction: Jurisdiction::Domestic {
                gst_id: "27AAAAA0000A1Z5".into(),
            },
        };
        assert_eq!(client.currency_code(), "INR");
        assert_eq!(client.country(), "India");
        assert_eq!(client.kind(), "Domestic");
    }

    #[test]
    fn foreign_client_reports_selected_currency() {
        let client = Client {
            id: 2,
            name: "Acme".into(),
            address: "1 Main St".into(),
            jurisdiction: Jurisdiction::Foreign {
                country: "USA".into(),
                vat_id: "VAT123".into(),
                currency: ForeignCurrency::Usd,
            },
        };
        assert_eq!(client.currency_code(), "USD");
        assert_eq!(client.country(), "USA");
        assert_eq!(client.kind(), "Foreign");
    }

    #[test]
    fn client_json_round_trip_preserves_jurisdiction() {
        let client = Client {
            id: 7,
            name: "Acme".into(),
            address: "1 Main St".into(),
            jurisdiction: Jurisdiction::Foreign {
                country: "USA".into(),
                vat_id: "VAT123".into(),
                currency: ForeignCurrency::Eur,
            },
        };
        let json = serde_json::to_string(&client).unwrap();
        assert!(json.contains(r#""type":"Foreign""#));
        let back: Client = serde_json::from_str(&json).unwrap();
        assert_eq!(back.jurisdiction, client.jurisdiction);
    }

    #[test]
    fn domestic_json_carries_gst_id_only() {
        let client = Client {
            id: 3,
            name: "Desi Co".into(),
            address: "Mumbai".into(),
            jurisdiction: Jurisdiction::Domestic {
                gst_id: "GST42".into(),
            },
        };
        let json = serde_json::to_string(&client).unwrap();
        assert!(json.contains("gst_id"));
        assert!(!json.contains("vat_id"));
    }

    #[test]
    fn stored_client_record_parses() {
        let json = indoc::indoc! {r#"
            {
              "id": 5,
              "name": "Acme",
              "address": "1 Main St",
              "type": "Foreign",
              "country": "USA",
              "vat_id": "VAT123",
              "currency": "USD"
            }
        "#};
        let client: Client = serde_json::from_str(json).unwrap();
        assert_eq!(client.id, 5);
        assert_eq!(client.currency_code(), "USD");
        assert_eq!(
            client.jurisdiction,
            Jurisdiction::Foreign {
                country: "USA".into(),
                vat_id: "VAT123".into(),
                currency: ForeignCurrency::Usd,
            }
        );
    }

    #[test]
    fn line_item_quantity_defaults_to_one() {
        let item: LineItem =
            serde_json::from_str(r#"{"description":"Travel","rate":"250"}"#).unwrap();
        assert_eq!(item.quantity, Decimal::ONE);
        assert_eq!(item.category, ItemCategory::Service);
    }

    #[test]
    fn profile_tolerates_missing_keys() {
        let profile: OrgProfile = serde_json::from_str(r#"{"name":"Jane"}"#).unwrap();
        assert_eq!(profile.name, "Jane");
        assert_eq!(profile.pan, OrgProfile::default().pan);
    }
}
