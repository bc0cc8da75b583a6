//! Interactive session: the event source standing in for the GUI.
//!
//! Every line is either a scanned code or a command. Control flow per
//! operation: edit-guard acquisition → store mutation → flush (local save,
//! then reconciliation when a sheet is connected) → guard release. Errors
//! are reported and the loop continues; nothing here is fatal.

use std::path::PathBuf;

use contracts::domain::a001_product::{looks_like_barcode, Product, ProductDto};
use tokio::io::{AsyncBufReadExt, BufReader};

use crate::domain::a001_product::{local_file, report, ProductStore};
use crate::domain::a002_sheet_connection::SheetSession;
use crate::shared::config::{resolve_path, Config};
use crate::shared::sheets::{GoogleSheetsClient, SheetsApi};
use crate::system::EditGuard;
use crate::usecases::u501_import_from_sheet::import_from_sheet;
use crate::usecases::u502_sync_stock::sync_stock;
use crate::usecases::u503_export_to_sheet::export_to_sheet;

pub struct App {
    config: Config,
    store: ProductStore,
    session: SheetSession,
    client: Option<GoogleSheetsClient>,
    guard: EditGuard,
    selected: Option<String>,
}

enum Flow {
    Continue,
    Quit,
}

impl App {
    /// Build the session and populate the store: from the sheet when a
    /// connection can be established, from the local file otherwise.
    pub async fn bootstrap(config: Config) -> Self {
        let mut session = SheetSession::bootstrap(&config);
        let mut store = ProductStore::new();
        let mut client = None;

        if session.has_credentials() && session.spreadsheet_id().is_some() {
            match session.build_client() {
                Ok(candidate) => match import_from_sheet(&candidate, &mut store).await {
                    Ok(summary) => {
                        tracing::info!("Loaded from sheet: {}", summary);
                        session.mark_connected();
                        client = Some(candidate);
                    }
                    Err(e) => {
                        tracing::warn!("Could not load from the sheet: {}", e);
                        store.clear();
                        if let Err(e) = session.disconnect_sheet() {
                            tracing::warn!("Could not drop the cached sheet: {}", e);
                        }
                    }
                },
                Err(e) => tracing::warn!("Could not build sheets client: {}", e),
            }
        }

        let mut app = Self {
            config,
            store,
            session,
            client,
            guard: EditGuard::new(),
            selected: None,
        };

        if app.client.is_some() {
            // Mirror the fresh sheet contents to the fallback file
            app.save_local();
        } else {
            match local_file::load(&app.data_file()) {
                Ok(store) => app.store = store,
                Err(e) => {
                    tracing::error!("Could not read the local data file: {}", e);
                    println!("Could not read the local data file; starting empty: {e}");
                }
            }
        }
        app
    }

    pub async fn run(&mut self) -> anyhow::Result<()> {
        println!("Stock control | {}", self.session.status().as_str());
        println!("{} products loaded. Type 'help' for commands.", self.store.len());

        let mut lines = BufReader::new(tokio::io::stdin()).lines();
        while let Some(line) = lines.next_line().await? {
            match self.handle_line(line.trim()).await {
                Flow::Continue => {}
                Flow::Quit => break,
            }
        }
        Ok(())
    }

    async fn handle_line(&mut self, line: &str) -> Flow {
        if line.is_empty() {
            return Flow::Continue;
        }

        let (command, rest) = match line.split_once(char::is_whitespace) {
            Some((head, tail)) => (head, tail.trim()),
            None => (line, ""),
        };

        match command {
            "quit" | "exit" => return Flow::Quit,
            "help" => self.print_help(),
            "status" => self.print_status(),
            "list" => self.print_list(),
            "report" => println!("{}", report::build_report(&self.store)),
            "new" => self.create_product(rest).await,
            "creds" => self.load_credentials(rest),
            "connect" => self.connect_sheet(rest).await,
            "disconnect" => self.disconnect_sheet(),
            "forget-creds" => self.clear_credentials(),
            "test" => self.test_connection().await,
            "import" => self.import().await,
            "sync" => self.sync().await,
            "export" => self.export().await,
            _ if command.starts_with('+') || command.starts_with('-') => {
                self.adjust_stock(command).await
            }
            _ => self.scan(line),
        }
        Flow::Continue
    }

    // ------------------------------------------------------------------
    // Scanning and stock changes
    // ------------------------------------------------------------------

    fn scan(&mut self, code: &str) {
        match self.store.get(code) {
            Some(product) => {
                println!("{}", render_product(product));
                self.selected = Some(code.to_string());
            }
            None => {
                self.selected = None;
                if looks_like_barcode(code) {
                    println!("Product not found: {code}. Add it with 'new {code} <min> <cost> <name>'");
                } else {
                    println!("Unknown command or product code: {code}");
                }
            }
        }
    }

    /// Handle "+", "-", "+N", "-N" for the selected product
    async fn adjust_stock(&mut self, command: &str) {
        let Some(code) = self.selected.clone() else {
            println!("Scan a product first");
            return;
        };
        let quantity: u32 = match &command[1..] {
            "" => 1,
            digits => match digits.parse() {
                Ok(q) if q > 0 => q,
                _ => {
                    println!("Quantity must be a positive number: {command}");
                    return;
                }
            },
        };

        let Some(prior) = self.store.get(&code).map(|p| p.stock) else {
            println!("Product {code} is gone from the store");
            return;
        };
        if let Err(e) = self.guard.begin(&code, prior) {
            tracing::warn!("{}", e);
            println!("{e}");
            return;
        }

        let result = if command.starts_with('+') {
            self.store.add_units(&code, quantity)
        } else {
            self.store.remove_units(&code, quantity)
        };

        match result {
            Ok(new_stock) => {
                println!("{code}: stock {prior} -> {new_stock}");
                self.flush().await;
                self.guard.finish();
                self.selected = None;
            }
            Err(e) => {
                self.guard.abort();
                println!("{e}");
            }
        }
    }

    async fn create_product(&mut self, rest: &str) {
        let mut parts = rest.split_whitespace();
        let (Some(code), Some(min), Some(cost)) = (parts.next(), parts.next(), parts.next())
        else {
            println!("Usage: new <code> <min_stock> <unit_cost> <name...>");
            return;
        };
        let Ok(minimum_stock) = min.parse::<u32>() else {
            println!("Minimum stock must be a number: {min}");
            return;
        };
        let display_name = parts.collect::<Vec<_>>().join(" ");

        let dto = ProductDto {
            code: code.to_string(),
            display_name,
            minimum_stock,
            unit_cost: cost.to_string(),
        };
        match self.store.create(dto) {
            Ok(()) => {
                println!("Added {code} with zero stock");
                self.flush().await;
            }
            Err(e) => println!("{e}"),
        }
    }

    // ------------------------------------------------------------------
    // Persistence and reconciliation
    // ------------------------------------------------------------------

    fn data_file(&self) -> PathBuf {
        resolve_path(&self.config.storage.data_file)
    }

    fn save_local(&self) {
        if let Err(e) = local_file::save(&self.data_file(), &self.store) {
            tracing::error!("Could not save the local data file: {}", e);
            println!("Could not save the local data file: {e}");
        }
    }

    /// Flush after every mutation: local file always, sheet when connected
    async fn flush(&mut self) {
        self.save_local();
        if let Some(client) = &self.client {
            match sync_stock(client, &self.store).await {
                Ok(summary) => println!("Sheet: {summary}"),
                Err(e) => {
                    tracing::error!("Sync failed: {}", e);
                    println!("Sync failed, the sheet was not updated: {e}");
                }
            }
        }
    }

    async fn import(&mut self) {
        let Some(client) = &self.client else {
            println!("No sheet connected");
            return;
        };
        match import_from_sheet(client, &mut self.store).await {
            Ok(summary) => {
                println!("Imported from sheet: {summary}");
                self.selected = None;
                self.save_local();
            }
            Err(e) => println!("Import failed: {e}"),
        }
    }

    async fn sync(&mut self) {
        let Some(client) = &self.client else {
            println!("No sheet connected");
            return;
        };
        match sync_stock(client, &self.store).await {
            Ok(summary) => println!("Sheet: {summary}"),
            Err(e) => println!("Sync failed: {e}"),
        }
    }

    async fn export(&mut self) {
        let Some(client) = &self.client else {
            println!("No sheet connected");
            return;
        };
        match export_to_sheet(client, &self.store).await {
            Ok(count) => println!("Rebuilt the sheet with {count} products"),
            Err(e) => println!("Export failed: {e}"),
        }
    }

    // ------------------------------------------------------------------
    // Connection management
    // ------------------------------------------------------------------

    fn load_credentials(&mut self, path: &str) {
        if path.is_empty() {
            println!("Usage: creds <path-to-service-account.json>");
            return;
        }
        match self.session.load_credentials_from(std::path::Path::new(path)) {
            Ok(()) => println!("Credentials stored; now 'connect <sheet id or URL>'"),
            Err(e) => println!("{e:#}"),
        }
    }

    async fn connect_sheet(&mut self, arg: &str) {
        if arg.is_empty() {
            println!("Usage: connect <spreadsheet id or URL>");
            return;
        }
        let sheet_id = match self.session.connect_sheet(arg) {
            Ok(id) => id,
            Err(e) => {
                println!("{e:#}");
                return;
            }
        };
        let candidate = match self.session.build_client() {
            Ok(client) => client,
            Err(e) => {
                println!("{e}");
                return;
            }
        };
        // Opening means proving we can read it
        match candidate.get_all_values().await {
            Ok(_) => {
                self.session.mark_connected();
                self.client = Some(candidate);
                println!("Connected to {sheet_id}; 'import' loads its products");
            }
            Err(e) => {
                println!("Could not open the sheet: {e}");
                if let Err(e) = self.session.disconnect_sheet() {
                    tracing::warn!("Could not drop the cached sheet: {}", e);
                }
            }
        }
    }

    fn disconnect_sheet(&mut self) {
        self.client = None;
        match self.session.disconnect_sheet() {
            Ok(()) => println!("Disconnected; {}", self.session.status().as_str()),
            Err(e) => println!("{e:#}"),
        }
    }

    fn clear_credentials(&mut self) {
        self.client = None;
        match self.session.clear_credentials() {
            Ok(()) => println!("Credentials forgotten; {}", self.session.status().as_str()),
            Err(e) => println!("{e:#}"),
        }
    }

    async fn test_connection(&mut self) {
        let Some(client) = &self.client else {
            println!("No sheet connected");
            return;
        };
        let result = self.session.test_connection(client).await;
        if result.success {
            println!("{} ({} ms)", result.message, result.duration_ms);
        } else {
            println!(
                "{}: {} ({} ms)",
                result.message,
                result.details.unwrap_or_default(),
                result.duration_ms
            );
        }
    }

    // ------------------------------------------------------------------
    // Display
    // ------------------------------------------------------------------

    fn print_status(&self) {
        println!(
            "{} | {} products | {}",
            self.session.status().as_str(),
            self.store.len(),
            match self.session.spreadsheet_id() {
                Some(id) => format!("sheet {id}"),
                None => "no sheet".to_string(),
            }
        );
    }

    fn print_list(&self) {
        if self.store.is_empty() {
            println!("No products");
            return;
        }
        for product in self.store.iter() {
            println!(
                "{:<15} {:<30} stock {:>5}  min {:>4}  {}",
                product.code,
                product.display_name,
                product.stock,
                product.minimum_stock,
                product.unit_cost
            );
        }
    }

    fn print_help(&self) {
        println!("Commands:");
        println!("  <code>              look up a product by its barcode");
        println!("  + / -, +N / -N      change stock of the last scanned product");
        println!("  new <code> <min> <cost> <name...>   add a product");
        println!("  list | report | status");
        println!("  creds <path> | connect <id|url> | disconnect | forget-creds | test");
        println!("  import | sync | export");
        println!("  quit");
    }
}

fn render_product(product: &Product) -> String {
    let stock_note = if product.is_low_stock() {
        " (below minimum)"
    } else {
        ""
    };
    format!(
        "{} - {}\n  stock: {}{}  minimum: {}  cost: {}  updated: {}",
        product.code,
        product.display_name,
        product.stock,
        stock_note,
        product.minimum_stock,
        product.unit_cost,
        product.metadata.updated_at.format("%Y-%m-%d %H:%M"),
    )
}
