use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;

use rust_decimal::Decimal;
use serde::Serialize;
use slug::slugify;
use tera::{Context, Tera};

use crate::error::RenderError;
use crate::ledger::compute_total;
use crate::model::{Client, Invoice, ItemCategory, Jurisdiction, LineItem, OrgProfile};

// Embed the template at compile time to ensure availability
const INVOICE_TEMPLATE: &str = include_str!("../templates/invoice.tera");
const TEMPLATE_NAME: &str = "invoice.tera";

/// Presentation rounding happens here and nowhere else.
pub fn money(value: Decimal) -> String {
    format!("{:.2}", value.round_dp(2))
}

#[derive(Serialize)]
struct SenderBlock {
    name: String,
    address_lines: Vec<String>,
    pan: String,
}

#[derive(Serialize)]
struct RecipientBlock {
    name: String,
    address_lines: Vec<String>,
    country: String,
    tax_label: &'static str,
    tax_value: String,
}

#[derive(Serialize)]
struct MetaBlock {
    id: String,
    date: String,
    currency: String,
}

#[derive(Serialize)]
struct ItemRow {
    description: String,
    quantity: String,
    amount: String,
}

#[derive(Serialize)]
struct BankBlock {
    beneficiary: String,
    bank_name: String,
    account_number: String,
    routing_label: &'static str,
    routing_value: String,
    branch_address: String,
}

#[derive(Serialize)]
struct DocumentContext {
    sender: SenderBlock,
    client: RecipientBlock,
    invoice: MetaBlock,
    services: Vec<ItemRow>,
    reimbursements: Vec<ItemRow>,
    total: String,
    bank: BankBlock,
}

fn or_na(value: &str) -> String {
    if value.trim().is_empty() {
        "N/A".into()
    } else {
        value.to_string()
    }
}

fn address_lines(address: &str) -> Vec<String> {
    address.lines().map(str::to_string).collect()
}

fn item_row(item: &LineItem) -> ItemRow {
    match item.category {
        ItemCategory::Service => ItemRow {
            description: format!(
                "{} ({} hrs @ {})",
                item.description,
                item.quantity.normalize(),
                item.rate.normalize()
            ),
            quantity: item.quantity.normalize().to_string(),
            amount: money(item.line_total()),
        },
        // Reimbursements are always quantity 1; the column shows a dash
        ItemCategory::Reimbursement => ItemRow {
            description: item.description.clone(),
            quantity: "-".into(),
            amount: money(item.line_total()),
        },
    }
}

fn document_context(
    client: &Client,
    invoice: &Invoice,
    profile: &OrgProfile,
) -> Result<DocumentContext, RenderError> {
    if profile.name.trim().is_empty() {
        return Err(RenderError::MissingField("organization name"));
    }
    if client.name.trim().is_empty() {
        return Err(RenderError::MissingField("client name"));
    }
    if client.country().trim().is_empty() {
        return Err(RenderError::MissingField("country"));
    }

    let (tax_label, tax_value, routing_label, routing_value) = match &client.jurisdiction {
        Jurisdiction::Domestic { gst_id } => ("GSTIN", or_na(gst_id), "IFSC", profile.ifsc.clone()),
        Jurisdiction::Foreign { vat_id, .. } => (
            "VAT ID",
            or_na(vat_id),
            "SWIFT/BIC",
            profile.swift_bic.clone(),
        ),
    };

    let total = compute_total(invoice.all_items());

    Ok(DocumentContext {
        sender: SenderBlock {
            name: profile.name.clone(),
            address_lines: address_lines(&profile.address),
            pan: or_na(&profile.pan),
        },
        client: RecipientBlock {
            name: client.name.clone(),
            address_lines: address_lines(&client.address),
            country: client.country().to_string(),
            tax_label,
            tax_value,
        },
        invoice: MetaBlock {
            id: invoice.id.clone(),
            date: invoice.date.format("%Y-%m-%d").to_string(),
            currency: client.currency_code().to_string(),
        },
        services: invoice.services.iter().map(item_row).collect(),
        reimbursements: invoice.reimbursements.iter().map(item_row).collect(),
        total: format!("{} {}", client.currency_code(), money(total)),
        bank: BankBlock {
            beneficiary: profile.account_name.clone(),
            bank_name: profile.bank_name.clone(),
            account_number: profile.account_number.clone(),
            routing_label,
            routing_value,
            branch_address: profile.branch_address.clone(),
        },
    })
}

/// Escapes a value for embedding in a Typst string literal, so user-entered
/// descriptions cannot break the markup.
fn typ_filter(
    value: &tera::Value,
    _args: &HashMap<String, tera::Value>,
) -> tera::Result<tera::Value> {
    let s = tera::try_get_value!("typ", "value", String, value);
    Ok(tera::Value::String(
        s.replace('\\', "\\\\").replace('"', "\\\""),
    ))
}

/// Renders `{Client, Invoice, OrgProfile}` into Typst markup. Page breaks are
/// the surface's own overflow behavior; this component only emits rows. The
/// item-table header is emitted once per table, never repeated across pages.
pub struct Renderer {
    tera: Tera,
}

impl Renderer {
    pub fn new() -> Result<Self, RenderError> {
        let mut tera = Tera::default();
        tera.register_filter("typ", typ_filter);
        tera.add_raw_template(TEMPLATE_NAME, INVOICE_TEMPLATE)?;
        Ok(Renderer { tera })
    }

    /// Deterministic: identical inputs produce byte-identical markup.
    pub fn render_markup(
        &self,
        client: &Client,
        invoice: &Invoice,
        profile: &OrgProfile,
    ) -> Result<String, RenderError> {
        let context = document_context(client, invoice, profile)?;
        let context = Context::from_serialize(&context).map_err(RenderError::Template)?;
        Ok(self.tera.render(TEMPLATE_NAME, &context)?)
    }
}

pub struct Artifact {
    pub typ_path: PathBuf,
    pub pdf_path: PathBuf,
}

/// Artifact basename derived from the client name snapshot and invoice id,
/// whitespace and punctuation normalized by slugification.
pub fn artifact_basename(client_name: &str, invoice_id: &str) -> String {
    format!("{}_{}", slugify(client_name), invoice_id)
}

/// Writes the markup next to its compiled PDF under `out_dir`, creating the
/// directory on first use.
pub fn write_artifact(
    out_dir: &Path,
    basename: &str,
    markup: &str,
) -> Result<Artifact, RenderError> {
    if Command::new("typst").arg("--version").output().is_err() {
        return Err(RenderError::CompilerMissing);
    }

    fs::create_dir_all(out_dir)?;
    let typ_path = out_dir.join(format!("{basename}.typ"));
    let pdf_path = out_dir.join(format!("{basename}.pdf"));
    fs::write(&typ_path, markup)?;

    let status = Command::new("typst")
        .arg("compile")
        .arg(&typ_path)
        .arg(&pdf_path)
        .status()?;
    if !status.success() {
        return Err(RenderError::CompileFailed(typ_path.display().to_string()));
    }
    Ok(Artifact { typ_path, pdf_path })
}
