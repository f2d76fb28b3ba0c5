use chrono::NaiveDate;
use regex::Regex;
use rust_decimal::Decimal;

use crate::error::ValidationError;
use crate::model::{Client, Invoice, ItemCategory, LineItem};

/// Grand total over a combined item sequence. Exact decimal arithmetic; the
/// sum is never rounded, only its presentation is.
pub fn compute_total<'a, I>(items: I) -> Decimal
where
    I: IntoIterator<Item = &'a LineItem>,
{
    items
        .into_iter()
        .fold(Decimal::ZERO, |acc, item| acc + item.line_total())
}

/// Splits a combined entry sequence into (services, reimbursements),
/// preserving insertion order within each category.
pub fn partition(items: Vec<LineItem>) -> (Vec<LineItem>, Vec<LineItem>) {
    items
        .into_iter()
        .partition(|item| item.category == ItemCategory::Service)
}

/// Next client id: a plain monotonic counter over the loaded collection.
pub fn next_client_id(clients: &[Client]) -> u64 {
    clients.iter().map(|c| c.id).max().unwrap_or(0) + 1
}

/// Next invoice id for `date`, formatted `INV-YYYYMMDD-NN`. The sequence
/// number is derived from the ids already in the ledger, so two invoices
/// created on the same day can never collide.
pub fn next_invoice_id(existing: &[Invoice], date: NaiveDate) -> String {
    let date_token = date.format("%Y%m%d").to_string();
    let re = Regex::new(r"^INV-(\d{8})-(\d+)$").unwrap();

    let mut next = 1u32;
    for invoice in existing {
        if let Some(caps) = re.captures(&invoice.id) {
            if caps[1] == date_token {
                if let Ok(seq) = caps[2].parse::<u32>() {
                    if seq >= next {
                        next = seq + 1;
                    }
                }
            }
        }
    }
    format!("INV-{date_token}-{next:02}")
}

/// Builds a new invoice from a completed entry session. The client name is
/// snapshotted; the invoice never holds a live client reference.
pub fn create_invoice(
    client: &Client,
    services: Vec<LineItem>,
    reimbursements: Vec<LineItem>,
    existing: &[Invoice],
    date: NaiveDate,
) -> Result<Invoice, ValidationError> {
    if services.is_empty() && reimbursements.is_empty() {
        return Err(ValidationError::EmptyInvoice);
    }
    if services
        .iter()
        .chain(reimbursements.iter())
        .any(|item| item.rate < Decimal::ZERO || item.quantity < Decimal::ZERO)
    {
        return Err(ValidationError::NegativeAmount);
    }

    let total = compute_total(services.iter().chain(reimbursements.iter()));
    Ok(Invoice {
        id: next_invoice_id(existing, date),
        client_id: client.id,
        client_name: client.name.clone(),
        date,
        services,
        reimbursements,
        total,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Jurisdiction;

    fn decimal(s: &str) -> Decimal {
        s.parse().unwrap()
    }

    fn item(desc: &str, rate: &str, qty: &str, category: ItemCategory) -> LineItem {
        LineItem {
            description: desc.into(),
            rate: decimal(rate),
            quantity: decimal(qty),
            category,
        }
    }

    fn acme() -> Client {
        Client {
            id: 42,
            name: "Acme".into(),
            address: "1 Main St".into(),
            jurisdiction: Jurisdiction::Foreign {
                country: "USA".into(),
                vat_id: "VAT123".into(),
                currency: crate::model::ForeignCurrency::Usd,
            },
        }
    }

    fn date(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    #[test]
    fn total_is_sum_of_rate_times_quantity() {
        let items = vec![
            item("Design", "100", "5", ItemCategory::Service),
            item("Travel", "250", "1", ItemCategory::Reimbursement),
        ];
        assert_eq!(compute_total(&items), decimal("750"));
    }

    #[test]
    fn total_is_exact_for_fractional_rates() {
        // 0.1 * 3 would drift under binary floats
        let items = vec![
            item("A", "0.1", "3", ItemCategory::Service),
            item("B", "0.2", "3", ItemCategory::Service),
        ];
        assert_eq!(compute_total(&items), decimal("0.9"));
    }

    #[test]
    fn total_is_independent_of_traversal_order() {
        let mut items = vec![
            item("A", "19.99", "2", ItemCategory::Service),
            item("B", "7.25", "4.5", ItemCategory::Service),
            item("C", "120", "1", ItemCategory::Reimbursement),
        ];
        let forward = compute_total(&items);
        items.reverse();
        assert_eq!(compute_total(&items), forward);
    }

    #[test]
    fn total_of_empty_sequence_is_zero() {
        assert_eq!(compute_total(&[]), Decimal::ZERO);
    }

    #[test]
    fn partition_preserves_insertion_order() {
        let items = vec![
            item("S1", "1", "1", ItemCategory::Service),
            item("R1", "1", "1", ItemCategory::Reimbursement),
            item("S2", "1", "1", ItemCategory::Service),
            item("R2", "1", "1", ItemCategory::Reimbursement),
        ];
        let (services, reimbursements) = partition(items);
        let names: Vec<_> = services.iter().map(|i| i.description.as_str()).collect();
        assert_eq!(names, ["S1", "S2"]);
        let names: Vec<_> = reimbursements
            .iter()
            .map(|i| i.description.as_str())
            .collect();
        assert_eq!(names, ["R1", "R2"]);
    }

    #[test]
    fn empty_invoice_is_rejected() {
        let result = create_invoice(&acme(), vec![], vec![], &[], date("2026-08-06"));
        assert_eq!(result.unwrap_err(), ValidationError::EmptyInvoice);
    }

    #[test]
    fn negative_rate_is_rejected() {
        let services = vec![item("Design", "-5", "1", ItemCategory::Service)];
        let result = create_invoice(&acme(), services, vec![], &[], date("2026-08-06"));
        assert_eq!(result.unwrap_err(), ValidationError::NegativeAmount);
    }

    #[test]
    fn created_invoice_snapshots_client_and_totals() {
        let services = vec![item("Design", "100", "5", ItemCategory::Service)];
        let reimbursements = vec![item("Travel", "250", "1", ItemCategory::Reimbursement)];
        let invoice =
            create_invoice(&acme(), services, reimbursements, &[], date("2026-08-06")).unwrap();

        assert_eq!(invoice.id, "INV-20260806-01");
        assert_eq!(invoice.client_id, 42);
        assert_eq!(invoice.client_name, "Acme");
        assert_eq!(invoice.total, decimal("750"));
    }

    #[test]
    fn invoice_ids_increment_within_a_day() {
        let first = create_invoice(
            &acme(),
            vec![item("Design", "100", "1", ItemCategory::Service)],
            vec![],
            &[],
            date("2026-08-06"),
        )
        .unwrap();
        let second = create_invoice(
            &acme(),
            vec![item("Review", "50", "1", ItemCategory::Service)],
            vec![],
            std::slice::from_ref(&first),
            date("2026-08-06"),
        )
        .unwrap();

        assert_eq!(first.id, "INV-20260806-01");
        assert_eq!(second.id, "INV-20260806-02");
    }

    #[test]
    fn invoice_sequence_restarts_on_a_new_date() {
        let existing = vec![
            create_invoice(
                &acme(),
                vec![item("Design", "100", "1", ItemCategory::Service)],
                vec![],
                &[],
                date("2026-08-06"),
            )
            .unwrap(),
        ];
        let id = next_invoice_id(&existing, date("2026-08-07"));
        assert_eq!(id, "INV-20260807-01");
    }

    #[test]
    fn invoice_sequence_skips_past_the_max_seen() {
        let mut invoice = create_invoice(
            &acme(),
            vec![item("Design", "100", "1", ItemCategory::Service)],
            vec![],
            &[],
            date("2026-08-06"),
        )
        .unwrap();
        invoice.id = "INV-20260806-07".into();
        let id = next_invoice_id(std::slice::from_ref(&invoice), date("2026-08-06"));
        assert_eq!(id, "INV-20260806-08");
    }

    #[test]
    fn foreign_ids_in_the_ledger_are_ignored() {
        let mut invoice = create_invoice(
            &acme(),
            vec![item("Design", "100", "1", ItemCategory::Service)],
            vec![],
            &[],
            date("2026-08-06"),
        )
        .unwrap();
        invoice.id = "LEGACY-001".into();
        let id = next_invoice_id(std::slice::from_ref(&invoice), date("2026-08-06"));
        assert_eq!(id, "INV-20260806-01");
    }

    #[test]
    fn client_ids_are_monotonic() {
        assert_eq!(next_client_id(&[]), 1);
        let clients = vec![acme()];
        assert_eq!(next_client_id(&clients), 43);
    }
}
