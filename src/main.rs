mod error;
mod ledger;
mod model;
mod render;
mod store;
mod ui;

use std::fs;
use std::path::PathBuf;

use chrono::Local;
use clap::{Parser, Subcommand};
use directories::{BaseDirs, ProjectDirs};
use inquire::{Confirm, DateSelect, Select, Text};
use rust_decimal::Decimal;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::error::{AppError, StorageError};
use crate::ledger::{create_invoice, next_client_id, partition};
use crate::model::{
    Client, ForeignCurrency, Invoice, ItemCategory, Jurisdiction, LineItem, OrgProfile,
};
use crate::render::{Renderer, artifact_basename, write_artifact};
use crate::store::{CLIENTS_FILE, CONFIG_FILE, INVOICES_FILE, Store};

const INVOICE_DIR: &str = "invoices";

// ==========================================
// CLI
// ==========================================

#[derive(Debug, Serialize, Deserialize)]
struct AppSettings {
    data_root: String,
}

impl Default for AppSettings {
    fn default() -> Self {
        AppSettings {
            data_root: ".".into(),
        }
    }
}

#[derive(Parser)]
#[command(name = "invoice-ledger", about = "Terminal invoicing ledger", version)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Register a new client
    AddClient,
    /// Display the client database
    ListClients,
    /// Modify a client record
    UpdateClient,
    /// Remove a client record
    DeleteClient,
    /// Run an invoice entry session
    CreateInvoice {
        /// Client name hint (substring match)
        client: Option<String>,
    },
    /// Display invoice history
    ListInvoices {
        /// Filter by client name (substring match)
        client: Option<String>,
    },
    /// Show a stored invoice record
    ViewInvoice { id: String },
    /// Remove an invoice record
    DeleteInvoice { id: String },
    /// Re-render the invoice artifact
    GeneratePdf { id: String },
    /// Show the organization profile
    Config,
    /// Edit the organization profile
    UpdateConfig,
}

struct App {
    store: Store,
    out_dir: PathBuf,
    renderer: Renderer,
    clients: Vec<Client>,
    invoices: Vec<Invoice>,
    profile: OrgProfile,
}

fn main() {
    let cli = Cli::parse();

    let settings = load_or_init_settings();
    let root = PathBuf::from(expand_home_dir(&settings.data_root));
    if let Err(e) = fs::create_dir_all(&root) {
        ui::error(&format!("failed to create data directory: {e}"));
        std::process::exit(1);
    }

    let renderer = match Renderer::new() {
        Ok(renderer) => renderer,
        Err(e) => {
            ui::error(&e.to_string());
            std::process::exit(1);
        }
    };

    let store = Store::new(root.clone());
    let clients = load_or_warn(&store, CLIENTS_FILE);
    let invoices = load_or_warn(&store, INVOICES_FILE);
    let profile = load_or_warn(&store, CONFIG_FILE);

    let mut app = App {
        store,
        out_dir: root.join(INVOICE_DIR),
        renderer,
        clients,
        invoices,
        profile,
    };

    match cli.command {
        Some(command) => {
            if let Err(e) = dispatch(&mut app, command) {
                ui::error(&e.to_string());
                std::process::exit(1);
            }
        }
        None => shell(&mut app),
    }
}

fn load_or_warn<T: DeserializeOwned + Default>(store: &Store, name: &str) -> T {
    match store.load(name) {
        Ok(value) => value,
        Err(e) => {
            ui::warn(&format!("{e}; continuing with defaults"));
            T::default()
        }
    }
}

// ==========================================
// Interactive shell
// ==========================================

fn shell(app: &mut App) {
    ui::banner();
    ui::help();

    loop {
        let line = match Text::new("ledger >").prompt() {
            Ok(line) => line,
            Err(
                inquire::InquireError::OperationCanceled
                | inquire::InquireError::OperationInterrupted,
            ) => {
                println!("Use 'exit' to quit.");
                continue;
            }
            // stdin is gone; nothing left to read
            Err(_) => return,
        };
        let mut parts = line.split_whitespace();
        let Some(command) = parts.next() else { continue };
        let args: Vec<&str> = parts.collect();

        let outcome = match command {
            "exit" => {
                println!("Shutting down.");
                return;
            }
            "clear" => {
                ui::banner();
                Ok(())
            }
            "help" => {
                ui::help();
                Ok(())
            }
            "add-client" => dispatch(app, Commands::AddClient),
            "list-clients" => dispatch(app, Commands::ListClients),
            "update-client" => dispatch(app, Commands::UpdateClient),
            "delete-client" => dispatch(app, Commands::DeleteClient),
            "create-invoice" => dispatch(
                app,
                Commands::CreateInvoice {
                    client: join_args(&args),
                },
            ),
            "list-invoices" => dispatch(
                app,
                Commands::ListInvoices {
                    client: join_args(&args),
                },
            ),
            "view-invoice" => with_id_arg(&args, "view-invoice", |id| {
                dispatch(app, Commands::ViewInvoice { id })
            }),
            "delete-invoice" => with_id_arg(&args, "delete-invoice", |id| {
                dispatch(app, Commands::DeleteInvoice { id })
            }),
            "generate-pdf" => with_id_arg(&args, "generate-pdf", |id| {
                dispatch(app, Commands::GeneratePdf { id })
            }),
            "config" => dispatch(app, Commands::Config),
            "update-config" => dispatch(app, Commands::UpdateConfig),
            _ => {
                ui::error(&format!("unknown command: {command}"));
                Ok(())
            }
        };

        // All failures surface here; only 'exit' ends the process.
        if let Err(e) = outcome {
            ui::error(&e.to_string());
        }
    }
}

fn join_args(args: &[&str]) -> Option<String> {
    if args.is_empty() {
        None
    } else {
        Some(args.join(" "))
    }
}

fn with_id_arg<F>(args: &[&str], command: &str, run: F) -> Result<(), AppError>
where
    F: FnOnce(String) -> Result<(), AppError>,
{
    match args.first() {
        Some(id) => run(id.to_string()),
        None => {
            ui::error(&format!("usage: {command} <INV_ID>"));
            Ok(())
        }
    }
}

fn dispatch(app: &mut App, command: Commands) -> Result<(), AppError> {
    match command {
        Commands::AddClient => add_client(app),
        Commands::ListClients => {
            ui::client_table(&app.clients);
            Ok(())
        }
        Commands::UpdateClient => update_client(app),
        Commands::DeleteClient => delete_client(app),
        Commands::CreateInvoice { client } => create_invoice_session(app, client.as_deref()),
        Commands::ListInvoices { client } => {
            list_invoices(app, client.as_deref());
            Ok(())
        }
        Commands::ViewInvoice { id } => view_invoice(app, &id),
        Commands::DeleteInvoice { id } => delete_invoice(app, &id),
        Commands::GeneratePdf { id } => generate_pdf(app, &id),
        Commands::Config => {
            ui::profile_table(&app.profile);
            Ok(())
        }
        Commands::UpdateConfig => update_config(app),
    }
}

// ==========================================
// Client commands
// ==========================================

fn add_client(app: &mut App) -> Result<(), AppError> {
    println!("\n--- New Client ---");
    let name = prompt_required("Company Name:")?;
    let address = prompt_required("Address:")?;

    let kind = Select::new(
        "Client Type:",
        vec!["Domestic (India)", "Foreign (International)"],
    )
    .prompt()?;

    let jurisdiction = if kind.starts_with("Domestic") {
        Jurisdiction::Domestic {
            gst_id: prompt_required("GSTIN/PAN:")?,
        }
    } else {
        let country = prompt_required("Country:")?;
        let vat_id = Text::new("VAT ID:").prompt()?;
        let currency = Select::new("Currency:", ForeignCurrency::ALL.to_vec()).prompt()?;
        Jurisdiction::Foreign {
            country,
            vat_id,
            currency,
        }
    };

    let client = Client {
        id: next_client_id(&app.clients),
        name: name.clone(),
        address,
        jurisdiction,
    };
    app.clients.push(client);
    app.store.save(CLIENTS_FILE, &app.clients)?;
    ui::success(&format!("Client '{name}' added."));
    Ok(())
}

fn update_client(app: &mut App) -> Result<(), AppError> {
    if app.clients.is_empty() {
        ui::error("no clients found");
        return Ok(());
    }
    let id = prompt_client_id(app)?;
    let Some(client) = app.clients.iter_mut().find(|c| c.id == id) else {
        return Err(AppError::ClientNotFound(id.to_string()));
    };

    println!("Updating: {}", client.name);
    if Confirm::new("Update name?").with_default(false).prompt()? {
        let name = Text::new("New name:").with_default(&client.name).prompt()?;
        client.name = name;
    }
    if Confirm::new("Update address?")
        .with_default(false)
        .prompt()?
    {
        let address = Text::new("New address:")
            .with_default(&client.address)
            .prompt()?;
        client.address = address;
    }

    // The prompt follows the client's current jurisdiction tag.
    match &mut client.jurisdiction {
        Jurisdiction::Domestic { gst_id } => {
            if Confirm::new("Update GSTIN?").with_default(false).prompt()? {
                let value = Text::new("New GSTIN:").with_default(gst_id).prompt()?;
                *gst_id = value;
            }
        }
        Jurisdiction::Foreign { vat_id, .. } => {
            if Confirm::new("Update VAT ID?").with_default(false).prompt()? {
                let value = Text::new("New VAT ID:").with_default(vat_id).prompt()?;
                *vat_id = value;
            }
        }
    }

    app.store.save(CLIENTS_FILE, &app.clients)?;
    ui::success("Client updated.");
    Ok(())
}

fn delete_client(app: &mut App) -> Result<(), AppError> {
    if app.clients.is_empty() {
        ui::error("no clients found");
        return Ok(());
    }
    let id = prompt_client_id(app)?;
    let Some(idx) = app.clients.iter().position(|c| c.id == id) else {
        return Err(AppError::ClientNotFound(id.to_string()));
    };

    let name = app.clients[idx].name.clone();
    if Confirm::new(&format!("Delete {name}?"))
        .with_default(false)
        .prompt()?
    {
        // Invoices are deliberately left in place; re-rendering them will
        // report a dangling reference.
        app.clients.remove(idx);
        app.store.save(CLIENTS_FILE, &app.clients)?;
        ui::success("Client deleted.");
    }
    Ok(())
}

fn prompt_client_id(app: &App) -> Result<u64, AppError> {
    ui::client_table(&app.clients);
    loop {
        let raw = Text::new("Client ID:").prompt()?;
        match raw.trim().parse::<u64>() {
            Ok(id) => return Ok(id),
            Err(_) => ui::error("enter a numeric id"),
        }
    }
}

// ==========================================
// Invoice commands
// ==========================================

fn create_invoice_session(app: &mut App, hint: Option<&str>) -> Result<(), AppError> {
    if app.clients.is_empty() {
        ui::error("no clients found; add a client first");
        return Ok(());
    }

    let idx = resolve_client_index(app, hint)?;
    let client = app.clients[idx].clone();
    let currency = client.currency_code().to_string();

    println!("\n--- New invoice for {} ---", client.name);

    let mut entries: Vec<LineItem> = Vec::new();
    loop {
        println!("\n--- Add Service ---");
        let desc = Text::new("Description (or 'done'):").prompt()?;
        let desc = desc.trim().to_string();
        if desc.is_empty() || desc.eq_ignore_ascii_case("done") {
            break;
        }
        let hourly = Confirm::new("Is this hourly?").with_default(true).prompt()?;
        let rate = prompt_decimal(&format!("Rate ({currency}):"), None)?;
        let quantity = prompt_decimal(if hourly { "Hours:" } else { "Quantity:" }, Some("1"))?;
        entries.push(LineItem {
            description: desc,
            rate,
            quantity,
            category: ItemCategory::Service,
        });
    }

    if Confirm::new("Add reimbursements?")
        .with_default(false)
        .prompt()?
    {
        loop {
            println!("\n--- Add Expense ---");
            let desc = Text::new("Description (or 'done'):").prompt()?;
            let desc = desc.trim().to_string();
            if desc.is_empty() || desc.eq_ignore_ascii_case("done") {
                break;
            }
            let rate = prompt_decimal(&format!("Amount ({currency}):"), None)?;
            entries.push(LineItem {
                description: desc,
                rate,
                quantity: Decimal::ONE,
                category: ItemCategory::Reimbursement,
            });
        }
    }

    let date = DateSelect::new("Invoice Date:")
        .with_default(Local::now().date_naive())
        .prompt()?;

    let (services, reimbursements) = partition(entries);
    let invoice = create_invoice(&client, services, reimbursements, &app.invoices, date)?;

    app.invoices.push(invoice.clone());
    app.store.save(INVOICES_FILE, &app.invoices)?;
    ui::success(&format!("Invoice {} saved.", invoice.id));

    // Rendering is decoupled from persistence: if this fails, the stored
    // invoice is retained and generate-pdf can retry later.
    render_artifact(app, &client, &invoice)
}

fn resolve_client_index(app: &App, hint: Option<&str>) -> Result<usize, AppError> {
    if let Some(hint) = hint {
        let needle = hint.to_lowercase();
        if let Some(idx) = app
            .clients
            .iter()
            .position(|c| c.name.to_lowercase().contains(&needle))
        {
            return Ok(idx);
        }
        ui::info(&format!("no client matching '{hint}'"));
    }
    let id = prompt_client_id(app)?;
    app.clients
        .iter()
        .position(|c| c.id == id)
        .ok_or_else(|| AppError::ClientNotFound(id.to_string()))
}

fn list_invoices(app: &App, filter: Option<&str>) {
    let needle = filter.map(str::to_lowercase);
    let rows: Vec<&Invoice> = app
        .invoices
        .iter()
        .filter(|inv| match &needle {
            Some(n) => inv.client_name.to_lowercase().contains(n),
            None => true,
        })
        .collect();
    ui::invoice_table(rows);
}

fn view_invoice(app: &App, id: &str) -> Result<(), AppError> {
    let invoice = app
        .invoices
        .iter()
        .find(|i| i.id == id)
        .ok_or_else(|| AppError::InvoiceNotFound(id.to_string()))?;
    let json = serde_json::to_string_pretty(invoice).map_err(|source| StorageError::Encode {
        name: invoice.id.clone(),
        source,
    })?;
    println!("--- INVOICE {} ---", invoice.id);
    println!("{json}");
    Ok(())
}

fn delete_invoice(app: &mut App, id: &str) -> Result<(), AppError> {
    let Some(idx) = app.invoices.iter().position(|i| i.id == id) else {
        return Err(AppError::InvoiceNotFound(id.to_string()));
    };
    if Confirm::new(&format!("Delete invoice {id}?"))
        .with_default(false)
        .prompt()?
    {
        app.invoices.remove(idx);
        app.store.save(INVOICES_FILE, &app.invoices)?;
        ui::success("Invoice deleted.");
    }
    Ok(())
}

fn generate_pdf(app: &App, id: &str) -> Result<(), AppError> {
    let invoice = app
        .invoices
        .iter()
        .find(|i| i.id == id)
        .ok_or_else(|| AppError::InvoiceNotFound(id.to_string()))?;
    let client = app
        .clients
        .iter()
        .find(|c| c.id == invoice.client_id)
        .ok_or(AppError::DanglingClient {
            invoice_id: invoice.id.clone(),
            client_id: invoice.client_id,
        })?;
    render_artifact(app, client, invoice)
}

fn render_artifact(app: &App, client: &Client, invoice: &Invoice) -> Result<(), AppError> {
    let markup = app.renderer.render_markup(client, invoice, &app.profile)?;
    let basename = artifact_basename(&invoice.client_name, &invoice.id);
    let artifact = write_artifact(&app.out_dir, &basename, &markup)?;
    ui::info(&format!("Markup written: {}", artifact.typ_path.display()));
    ui::success(&format!(
        "Artifact generated: {}",
        artifact.pdf_path.display()
    ));
    Ok(())
}

// ==========================================
// Config commands
// ==========================================

fn update_config(app: &mut App) -> Result<(), AppError> {
    println!("Update configuration (Enter keeps the current value)");
    let p = &app.profile;
    let profile = OrgProfile {
        name: prompt_with_default("Name:", &p.name)?,
        pan: prompt_with_default("PAN:", &p.pan)?,
        address: prompt_with_default("Address:", &p.address)?,
        bank_name: prompt_with_default("Bank Name:", &p.bank_name)?,
        branch: prompt_with_default("Branch:", &p.branch)?,
        branch_address: prompt_with_default("Branch Address:", &p.branch_address)?,
        account_name: prompt_with_default("Account Name:", &p.account_name)?,
        account_number: prompt_with_default("Account Number:", &p.account_number)?,
        ifsc: prompt_with_default("IFSC:", &p.ifsc)?,
        swift_bic: prompt_with_default("SWIFT/BIC:", &p.swift_bic)?,
    };
    app.profile = profile;
    app.store.save(CONFIG_FILE, &app.profile)?;
    ui::success("Configuration updated.");
    Ok(())
}

// ==========================================
// Prompt helpers & settings
// ==========================================

fn prompt_required(msg: &str) -> Result<String, AppError> {
    loop {
        let value = Text::new(msg).prompt()?;
        let value = value.trim().to_string();
        if !value.is_empty() {
            return Ok(value);
        }
        ui::error("a value is required");
    }
}

fn prompt_with_default(msg: &str, default: &str) -> Result<String, AppError> {
    Ok(Text::new(msg).with_default(default).prompt()?)
}

fn prompt_decimal(msg: &str, default: Option<&str>) -> Result<Decimal, AppError> {
    loop {
        let mut prompt = Text::new(msg);
        if let Some(value) = default {
            prompt = prompt.with_default(value);
        }
        let raw = prompt.prompt()?;
        match raw.trim().parse::<Decimal>() {
            Ok(value) if value >= Decimal::ZERO => return Ok(value),
            _ => ui::error("enter a non-negative number"),
        }
    }
}

fn settings_path() -> PathBuf {
    if let Some(proj_dirs) = ProjectDirs::from("com", "invoice-ledger", "app") {
        let config_dir = proj_dirs.config_dir();
        if !config_dir.exists() {
            fs::create_dir_all(config_dir).ok();
        }
        return config_dir.join("settings.toml");
    }
    PathBuf::from("settings.toml")
}

fn load_or_init_settings() -> AppSettings {
    let path = settings_path();
    if path.exists() {
        match fs::read_to_string(&path)
            .ok()
            .and_then(|content| toml::from_str(&content).ok())
        {
            Some(settings) => return settings,
            None => {
                ui::warn("settings.toml is unreadable; using defaults");
                return AppSettings::default();
            }
        }
    }
    let settings = AppSettings::default();
    if let Ok(serialized) = toml::to_string_pretty(&settings) {
        fs::write(&path, serialized).ok();
    }
    settings
}

fn expand_home_dir(path: &str) -> String {
    if path.starts_with('~') {
        if let Some(base_dirs) = BaseDirs::new() {
            let home = base_dirs.home_dir().to_string_lossy();
            return path.replacen('~', &home, 1);
        }
    }
    path.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use tempfile::TempDir;

    fn test_app(clients: Vec<Client>, invoices: Vec<Invoice>) -> (App, TempDir) {
        let dir = tempfile::tempdir().unwrap();
        let app = App {
            store: Store::new(dir.path().to_path_buf()),
            out_dir: dir.path().join(INVOICE_DIR),
            renderer: Renderer::new().unwrap(),
            clients,
            invoices,
            profile: OrgProfile::default(),
        };
        (app, dir)
    }

    fn orphan_invoice() -> Invoice {
        Invoice {
            id: "INV-20260806-01".into(),
            client_id: 99,
            client_name: "Ghost Co".into(),
            date: NaiveDate::from_ymd_opt(2026, 8, 6).unwrap(),
            services: vec![LineItem {
                description: "Design".into(),
                rate: "100".parse().unwrap(),
                quantity: "5".parse().unwrap(),
                category: ItemCategory::Service,
            }],
            reimbursements: vec![],
            total: "500".parse().unwrap(),
        }
    }

    #[test]
    fn generate_pdf_for_deleted_client_reports_dangling_reference() {
        let (app, _dir) = test_app(vec![], vec![orphan_invoice()]);
        let result = generate_pdf(&app, "INV-20260806-01");
        assert!(matches!(
            result,
            Err(AppError::DanglingClient { client_id: 99, .. })
        ));
    }

    #[test]
    fn orphaned_invoice_is_still_viewable() {
        let (app, _dir) = test_app(vec![], vec![orphan_invoice()]);
        assert!(view_invoice(&app, "INV-20260806-01").is_ok());
    }

    #[test]
    fn unknown_invoice_id_is_reported() {
        let (app, _dir) = test_app(vec![], vec![]);
        let result = generate_pdf(&app, "INV-00000000-00");
        assert!(matches!(result, Err(AppError::InvoiceNotFound(_))));
    }

    #[test]
    fn shell_args_join_into_a_single_hint() {
        assert_eq!(join_args(&[]), None);
        assert_eq!(join_args(&["Acme", "Corp"]), Some("Acme Corp".into()));
    }
}
