use comfy_table::{Attribute, Cell, Color, Table};

use crate::model::{Client, Invoice, OrgProfile};
use crate::render::money;

pub fn banner() {
    clear_screen();
    println!("==============================================");
    println!("   INVOICE LEDGER :: terminal billing desk");
    println!("==============================================");
}

pub fn clear_screen() {
    // ANSI: clear and home the cursor
    print!("\x1B[2J\x1B[1;1H");
}

pub fn success(msg: &str) {
    println!(">> SUCCESS: {msg}");
}

pub fn error(msg: &str) {
    eprintln!(">> ERROR: {msg}");
}

pub fn warn(msg: &str) {
    eprintln!(">> WARN: {msg}");
}

pub fn info(msg: &str) {
    println!(">> INFO: {msg}");
}

pub fn client_table(clients: &[Client]) {
    let mut table = Table::new();
    table.set_header(vec![
        Cell::new("ID").add_attribute(Attribute::Bold),
        Cell::new("Name").add_attribute(Attribute::Bold),
        Cell::new("Type").add_attribute(Attribute::Bold),
        Cell::new("Currency").add_attribute(Attribute::Bold),
    ]);
    for client in clients {
        table.add_row(vec![
            Cell::new(client.id),
            Cell::new(&client.name).fg(Color::Green),
            Cell::new(client.kind()),
            Cell::new(client.currency_code()).fg(Color::Yellow),
        ]);
    }
    println!("{table}");
}

pub fn invoice_table<'a, I>(invoices: I)
where
    I: IntoIterator<Item = &'a Invoice>,
{
    let mut table = Table::new();
    table.set_header(vec![
        Cell::new("INV #").add_attribute(Attribute::Bold),
        Cell::new("Date").add_attribute(Attribute::Bold),
        Cell::new("Client").add_attribute(Attribute::Bold),
        Cell::new("Total").add_attribute(Attribute::Bold),
    ]);
    for invoice in invoices {
        table.add_row(vec![
            Cell::new(&invoice.id),
            Cell::new(invoice.date.format("%Y-%m-%d")),
            Cell::new(&invoice.client_name).fg(Color::Green),
            Cell::new(money(invoice.total))
                .fg(Color::Yellow)
                .add_attribute(Attribute::Bold),
        ]);
    }
    println!("{table}");
}

pub fn profile_table(profile: &OrgProfile) {
    let mut table = Table::new();
    table.set_header(vec![
        Cell::new("Key").add_attribute(Attribute::Bold),
        Cell::new("Value").add_attribute(Attribute::Bold),
    ]);
    let rows = [
        ("Name", &profile.name),
        ("PAN", &profile.pan),
        ("Address", &profile.address),
        ("Bank Name", &profile.bank_name),
        ("Branch", &profile.branch),
        ("Branch Address", &profile.branch_address),
        ("Account Name", &profile.account_name),
        ("Account Number", &profile.account_number),
        ("IFSC", &profile.ifsc),
        ("SWIFT/BIC", &profile.swift_bic),
    ];
    for (key, value) in rows {
        table.add_row(vec![Cell::new(key).fg(Color::Cyan), Cell::new(value)]);
    }
    println!("{table}");
}

pub fn help() {
    let mut table = Table::new();
    table.set_header(vec![
        Cell::new("COMMAND").add_attribute(Attribute::Bold),
        Cell::new("PARAMETERS").add_attribute(Attribute::Bold),
        Cell::new("FUNCTION").add_attribute(Attribute::Bold),
    ]);
    let rows = [
        ("add-client", "", "Register a new client"),
        ("list-clients", "", "Display the client database"),
        ("update-client", "", "Modify a client record"),
        ("delete-client", "", "Remove a client record"),
        ("create-invoice", "[CLIENT]", "Run an invoice entry session"),
        ("list-invoices", "[CLIENT]", "Display invoice history"),
        ("view-invoice", "<INV_ID>", "Show a stored invoice record"),
        ("delete-invoice", "<INV_ID>", "Remove an invoice record"),
        ("generate-pdf", "<INV_ID>", "Re-render the invoice artifact"),
        ("config", "", "Show organization profile"),
        ("update-config", "", "Edit organization profile"),
        ("help", "", "Show this reference"),
        ("clear", "", "Clear the screen"),
        ("exit", "", "Quit"),
    ];
    for (cmd, params, function) in rows {
        table.add_row(vec![
            Cell::new(cmd).fg(Color::Cyan),
            Cell::new(params).fg(Color::Yellow),
            Cell::new(function),
        ]);
    }
    println!("{table}");
}
