//! CLI command implementations

use anyhow::{Context as _, Result, bail};
use chrono::{DateTime, Local, Utc};
use colored::{ColoredString, Colorize};
use std::path::{Path, PathBuf};
use tabled::settings::Style;
use tabled::{Table, Tabled};
use tkt_core::query::{self, AdminQuery};
use tkt_core::{
    AssigneeFilter, Config, DisplayConfig, FileBackend, NewTicket, Status, StatusFilter, Ticket,
    TicketPatch, TicketStore, backup_file_name, normalize_fee,
};

/// Resolved config and paths shared by every command
pub struct Context {
    config: Config,
    config_path: PathBuf,
    data_path: PathBuf,
    json: bool,
}

impl Context {
    pub fn new(config_path: Option<PathBuf>, data: Option<PathBuf>, json: bool) -> Result<Self> {
        let config_path = config_path.unwrap_or_else(Config::default_path);
        let config = Config::load(&config_path)?;
        let data_path = data.unwrap_or_else(|| config.data_path());

        if !config.display.colors {
            colored::control::set_override(false);
        }

        Ok(Self {
            config,
            config_path,
            data_path,
            json,
        })
    }

    fn store(&self) -> Result<TicketStore<FileBackend>> {
        tracing::debug!(path = %self.data_path.display(), "opening ticket store");
        let backend = FileBackend::new(&self.data_path);
        TicketStore::open(backend, &self.config).with_context(|| {
            format!("Failed to open ticket store at {}", self.data_path.display())
        })
    }

    fn display(&self) -> &DisplayConfig {
        &self.config.display
    }
}

pub fn create(ctx: &Context, form: NewTicket) -> Result<()> {
    if form.name.trim().is_empty() {
        bail!("Customer name is required");
    }
    if form.phone.trim().is_empty() {
        bail!("Customer phone is required");
    }

    let mut store = ctx.store()?;
    let ticket = form.into_ticket();
    store.add(ticket.clone())?;

    if ctx.json {
        println!("{}", serde_json::to_string(&ticket)?);
    } else {
        println!("{} Created ticket: {}", "✓".green(), ticket.id.cyan());
        println!("  Customer: {} ({})", ticket.name, ticket.phone);
        if !ticket.images.is_empty() {
            println!("  Images:   {}", ticket.images.len());
        }
    }

    Ok(())
}

pub fn list(ctx: &Context, status: &str, technician: &str) -> Result<()> {
    let status: StatusFilter = status.parse()?;
    let assignee = AssigneeFilter::parse(technician);

    let store = ctx.store()?;
    let tickets = store.get_all()?;
    let view = query::technician_view(&tickets, status, &assignee);

    if ctx.json {
        println!("{}", serde_json::to_string(&view)?);
    } else if view.is_empty() {
        println!("No tickets found");
    } else {
        let display = ctx.display();
        for ticket in view {
            println!(
                "{} [{}] {} - {}",
                ticket.id.cyan(),
                status_label(ticket.status),
                ticket.name.bold(),
                ticket.phone
            );
            println!(
                "    Address: {}  Technician: {}  Created: {}",
                or_dash(&ticket.address),
                or_dash(&ticket.assigned_to),
                format_time(Some(ticket.created_at), &display.date_format)
            );
            if !ticket.description.is_empty() {
                println!("    {}", ticket.description.dimmed());
            }
        }
    }

    Ok(())
}

#[derive(Tabled)]
struct AdminRow {
    #[tabled(rename = "ID")]
    id: String,
    #[tabled(rename = "Customer")]
    name: String,
    #[tabled(rename = "Phone")]
    phone: String,
    #[tabled(rename = "Address")]
    address: String,
    #[tabled(rename = "Status")]
    status: String,
    #[tabled(rename = "Technician")]
    technician: String,
    #[tabled(rename = "Created")]
    created: String,
    #[tabled(rename = "Completed")]
    completed: String,
    #[tabled(rename = "Fee")]
    fee: String,
}

impl AdminRow {
    fn new(ticket: &Ticket, display: &DisplayConfig) -> Self {
        Self {
            id: ticket.id.clone(),
            name: ticket.name.clone(),
            phone: ticket.phone.clone(),
            address: or_dash(&ticket.address).to_string(),
            status: ticket.status.to_string(),
            technician: or_dash(&ticket.assigned_to).to_string(),
            created: format_time(Some(ticket.created_at), &display.date_format),
            completed: format_time(ticket.completed_at, &display.date_format),
            fee: format_fee(ticket.fee, display),
        }
    }
}

pub fn admin(
    ctx: &Context,
    search: String,
    status: &str,
    technician: &str,
    from: Option<String>,
    to: Option<String>,
) -> Result<()> {
    let admin_query = AdminQuery {
        search,
        status: status.parse()?,
        assignee: AssigneeFilter::parse(technician),
        from: from.as_deref().map(query::parse_date).transpose()?,
        to: to.as_deref().map(query::parse_date).transpose()?,
    };

    let store = ctx.store()?;
    let tickets = store.get_all()?;
    let view = query::admin_view(&tickets, &admin_query, &Local);

    if ctx.json {
        println!("{}", serde_json::to_string(&view)?);
    } else if view.is_empty() {
        println!("No tickets found");
    } else {
        let rows: Vec<_> = view
            .iter()
            .map(|ticket| AdminRow::new(ticket, ctx.display()))
            .collect();
        println!("{}", Table::new(rows).with(Style::rounded()));
        println!("{} ticket(s)", view.len());
    }

    Ok(())
}

pub fn stats(ctx: &Context) -> Result<()> {
    let store = ctx.store()?;
    let tickets = store.get_all()?;
    let stats = query::compute_statistics(&tickets);

    if ctx.json {
        println!("{}", serde_json::to_string(&stats)?);
    } else {
        println!("{}", "Ticket statistics".bold());
        println!("  Total:       {}", stats.total);
        println!("  Waiting:     {}", stats.waiting_count);
        println!("  In Progress: {}", stats.in_progress_count);
        println!("  Completed:   {}", stats.completed_count);
        println!(
            "  Revenue:     {}",
            format_fee(stats.total_revenue, ctx.display()).green()
        );
    }

    Ok(())
}

pub fn show(ctx: &Context, id: &str) -> Result<()> {
    let store = ctx.store()?;
    let ticket = store
        .get(id)?
        .ok_or_else(|| anyhow::anyhow!("Ticket not found: {}", id))?;

    if ctx.json {
        println!("{}", serde_json::to_string_pretty(&ticket)?);
        return Ok(());
    }

    let display = ctx.display();
    println!("{} {}", ticket.id.cyan().bold(), status_label(ticket.status));
    println!();
    println!("Customer:    {}", ticket.name);
    println!("Phone:       {}", ticket.phone);
    println!("Address:     {}", or_dash(&ticket.address));
    println!("Created:     {}", format_time(Some(ticket.created_at), &display.date_format));
    println!("Started:     {}", format_time(ticket.in_progress_at, &display.date_format));
    println!("Completed:   {}", format_time(ticket.completed_at, &display.date_format));
    println!("Technician:  {}", or_dash(&ticket.assigned_to));
    println!("Fee:         {}", format_fee(ticket.fee, display));

    if !ticket.description.is_empty() {
        println!();
        println!("{}", "Description:".bold());
        println!("{}", ticket.description);
    }
    if !ticket.root_cause.is_empty() {
        println!();
        println!("{}", "Root cause:".bold());
        println!("{}", ticket.root_cause);
    }
    if !ticket.actions_taken.is_empty() {
        println!();
        println!("{}", "Actions taken:".bold());
        println!("{}", ticket.actions_taken);
    }
    if !ticket.images.is_empty() {
        println!();
        println!("{}", "Images:".bold());
        for image in &ticket.images {
            println!("  {}", truncate(image, 72));
        }
    }

    Ok(())
}

/// Arguments of `tkt update`
pub struct UpdateArgs {
    pub assign: Option<String>,
    pub status: Option<String>,
    pub root_cause: Option<String>,
    pub actions: Option<String>,
    pub fee: Option<String>,
    pub images: Vec<String>,
}

pub fn update(ctx: &Context, id: &str, args: UpdateArgs) -> Result<()> {
    if let Some(ref name) = args.assign {
        let name = name.trim();
        if !name.is_empty() && !ctx.config.is_technician(name) {
            bail!(
                "Unknown technician: {} (configured: {})",
                name,
                ctx.config.technicians.join(", ")
            );
        }
    }

    let patch = TicketPatch {
        assigned_to: args.assign,
        status: args.status.as_deref().map(str::parse::<Status>).transpose()?,
        root_cause: args.root_cause,
        actions_taken: args.actions,
        fee: args.fee.as_deref().map(normalize_fee),
        append_images: args.images,
    };
    if patch.is_empty() {
        bail!("Nothing to update");
    }

    let mut store = ctx.store()?;
    let ticket = store.update(id, &patch)?;

    if ctx.json {
        println!("{}", serde_json::to_string(&ticket)?);
    } else {
        println!(
            "{} Updated {} [{}]",
            "✓".green(),
            ticket.id,
            status_label(ticket.status)
        );
    }

    Ok(())
}

pub fn delete(ctx: &Context, id: &str, yes: bool) -> Result<()> {
    let mut store = ctx.store()?;

    if !yes {
        let label = match store.get(id)? {
            Some(ticket) => ticket.to_string(),
            None => id.to_string(),
        };
        if !confirm(&format!("Delete {}? This cannot be undone.", label))? {
            println!("Aborted");
            return Ok(());
        }
    }

    let removed = store.remove(id)?;

    if ctx.json {
        println!(r#"{{"removed": {}}}"#, removed);
    } else if removed == 0 {
        println!("No ticket with ID {}", id);
    } else {
        println!("{} Deleted {}", "✓".green(), id);
    }

    Ok(())
}

pub fn export(ctx: &Context, output: Option<PathBuf>) -> Result<()> {
    let store = ctx.store()?;
    let backup = store.export_snapshot()?;
    let path =
        output.unwrap_or_else(|| PathBuf::from(backup_file_name(Local::now().date_naive())));

    std::fs::write(&path, backup)
        .with_context(|| format!("Failed to write {}", path.display()))?;

    if ctx.json {
        println!("{}", serde_json::json!({ "path": path }));
    } else {
        println!("{} Exported to {}", "✓".green(), path.display());
    }

    Ok(())
}

pub fn import(ctx: &Context, path: &Path, yes: bool) -> Result<()> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;

    if !yes
        && !confirm(&format!(
            "{}",
            "Importing replaces ALL current tickets.".red()
        ))?
    {
        println!("Aborted");
        return Ok(());
    }

    let mut store = ctx.store()?;
    store.import_snapshot(&text)?;
    let info = store.storage_info()?;

    if ctx.json {
        println!("{}", serde_json::to_string(&info)?);
    } else {
        println!(
            "{} Imported {} tickets from {}",
            "✓".green(),
            info.ticket_count,
            path.display()
        );
    }

    Ok(())
}

pub fn clear(ctx: &Context, yes: bool) -> Result<()> {
    if !yes {
        if !confirm(&format!(
            "{}",
            "This deletes ALL tickets and cannot be undone.".red()
        ))? {
            println!("Aborted");
            return Ok(());
        }
        if !confirm("Last chance: delete everything?")? {
            println!("Aborted");
            return Ok(());
        }
    }

    let mut store = ctx.store()?;
    store.clear()?;
    println!("{}", clear_report(ctx.json));
    Ok(())
}

pub fn info(ctx: &Context) -> Result<()> {
    let store = ctx.store()?;
    let info = store.storage_info()?;
    let backend = store.backend();
    let corrupt = backend.corrupt_path();
    let set_aside = corrupt.exists().then_some(corrupt);

    if ctx.json {
        println!(
            "{}",
            serde_json::json!({
                "location": backend.path(),
                "set_aside": set_aside,
                "version": info.version,
                "ticket_count": info.ticket_count,
                "size_bytes": info.size_bytes,
            })
        );
    } else {
        println!("Data file:      {}", backend.path().display());
        println!("Schema version: {}", info.version);
        println!("Tickets:        {}", info.ticket_count);
        println!("Size:           {}", info.human_size());
        if let Some(path) = set_aside {
            println!(
                "{} Unreadable data was set aside in {}",
                "!".yellow(),
                path.display()
            );
        }
    }

    Ok(())
}

pub fn technicians(ctx: &Context) -> Result<()> {
    let names = &ctx.config.technicians;

    if ctx.json {
        println!("{}", serde_json::to_string(names)?);
    } else if names.is_empty() {
        println!("No technicians configured (any name is accepted)");
    } else {
        for name in names {
            println!("{}", name);
        }
    }

    Ok(())
}

/// Show current configuration
pub fn config_show(ctx: &Context) -> Result<()> {
    let config = &ctx.config;

    if ctx.json {
        println!("{}", serde_json::to_string_pretty(config)?);
    } else {
        println!("{}", "Current configuration:".bold());
        println!();
        println!("data_file = \"{}\"", ctx.data_path.display());
        println!("seed_demo_data = {}", config.seed_demo_data);
        println!("technicians = {:?}", config.technicians);
        println!();
        println!("[display]");
        println!("colors = {}", config.display.colors);
        println!("date_format = \"{}\"", config.display.date_format);
        println!("currency_suffix = \"{}\"", config.display.currency_suffix);
        println!(
            "thousands_separator = \"{}\"",
            config.display.thousands_separator
        );
    }

    Ok(())
}

pub fn config_path(ctx: &Context) -> Result<()> {
    println!("{}", ctx.config_path.display());
    Ok(())
}

/// Reset configuration to defaults
pub fn config_reset(ctx: &Context) -> Result<()> {
    if let Some(parent) = ctx.config_path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::write(&ctx.config_path, Config::default_with_comments())?;

    println!(
        "{} Configuration reset to defaults ({})",
        "✓".green(),
        ctx.config_path.display()
    );
    Ok(())
}

fn confirm(prompt: &str) -> Result<bool> {
    print!("{} [y/N] ", prompt);
    std::io::Write::flush(&mut std::io::stdout())?;

    let mut input = String::new();
    std::io::stdin().read_line(&mut input)?;
    Ok(input.trim().eq_ignore_ascii_case("y"))
}

fn clear_report(json: bool) -> String {
    if json {
        serde_json::json!({ "cleared": true }).to_string()
    } else {
        format!("{} All tickets deleted", "✓".green())
    }
}

fn status_label(status: Status) -> ColoredString {
    let label = status.to_string();
    match status {
        Status::Waiting => label.yellow(),
        Status::InProgress => label.blue(),
        Status::Completed => label.green(),
    }
}

fn or_dash(text: &str) -> &str {
    if text.is_empty() { "-" } else { text }
}

fn format_time(ts: Option<DateTime<Utc>>, format: &str) -> String {
    ts.map(|t| t.with_timezone(&Local).format(format).to_string())
        .unwrap_or_else(|| "-".to_string())
}

/// Group digits in threes and append the currency suffix
fn format_fee(amount: u64, display: &DisplayConfig) -> String {
    let digits = amount.to_string();
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push_str(&display.thousands_separator);
        }
        grouped.push(c);
    }
    format!("{}{}", grouped, display.currency_suffix)
}

fn truncate(text: &str, max: usize) -> String {
    if text.chars().count() <= max {
        text.to_string()
    } else {
        let head: String = text.chars().take(max.saturating_sub(3)).collect();
        format!("{}...", head)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_fee() {
        let display = DisplayConfig::default();
        assert_eq!(format_fee(0, &display), "0đ");
        assert_eq!(format_fee(999, &display), "999đ");
        assert_eq!(format_fee(1000, &display), "1.000đ");
        assert_eq!(format_fee(450000, &display), "450.000đ");
        assert_eq!(format_fee(1234567, &display), "1.234.567đ");

        let plain = DisplayConfig {
            thousands_separator: ",".into(),
            currency_suffix: String::new(),
            ..DisplayConfig::default()
        };
        assert_eq!(format_fee(150000, &plain), "150,000");
    }

    #[test]
    fn test_format_time_unset() {
        assert_eq!(format_time(None, "%Y"), "-");
    }

    #[test]
    fn test_clear_report() {
        let value: serde_json::Value = serde_json::from_str(&clear_report(true)).unwrap();
        assert_eq!(value["cleared"], true);
        assert!(clear_report(false).contains("All tickets deleted"));
    }

    #[test]
    fn test_or_dash() {
        assert_eq!(or_dash(""), "-");
        assert_eq!(or_dash("Quang"), "Quang");
    }

    #[test]
    fn test_truncate() {
        assert_eq!(truncate("short", 10), "short");
        assert_eq!(truncate("data:image/png;base64,AAAAAAAA", 12), "data:imag...");
    }
}
