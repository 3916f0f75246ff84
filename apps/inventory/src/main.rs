use std::{
    io::{self, BufRead, Write},
    path::PathBuf,
    sync::Arc,
};

use anyhow::Result;
use clap::{Parser, Subcommand};
use client_core::{
    build_controller, load_client_settings, AlwaysConfirm, Backend, ConfirmationPrompt,
    DeleteOutcome, DisplayState, NotificationEvent, NotificationKind, ProductForm,
    ProductListController,
};
use shared::domain::{AmountKind, Product, ProductId};
use tokio::sync::broadcast;
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(about = "Manage the product inventory")]
struct Cli {
    /// TOML file with client settings (defaults to ./inventory.toml if present).
    #[arg(long)]
    config: Option<PathBuf>,
    #[arg(long)]
    backend: Option<Backend>,
    #[arg(long)]
    api_url: Option<String>,
    #[arg(long)]
    database_url: Option<String>,
    #[arg(long)]
    amount_kind: Option<AmountKind>,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    List,
    Show {
        id: i64,
    },
    Add {
        #[arg(long)]
        name: String,
        #[arg(long)]
        amount: String,
        #[arg(long)]
        description: Option<String>,
        #[arg(long)]
        image: Option<String>,
    },
    Edit {
        id: i64,
        #[arg(long)]
        name: Option<String>,
        #[arg(long)]
        amount: Option<String>,
        #[arg(long)]
        description: Option<String>,
        #[arg(long)]
        image: Option<String>,
    },
    Delete {
        id: i64,
        /// Skip the confirmation prompt.
        #[arg(long)]
        yes: bool,
    },
}

struct StdinConfirm;

impl ConfirmationPrompt for StdinConfirm {
    fn confirm(&self, message: &str) -> bool {
        print!("{message} [y/N] ");
        if io::stdout().flush().is_err() {
            return false;
        }
        let mut answer = String::new();
        if io::stdin().lock().read_line(&mut answer).is_err() {
            return false;
        }
        matches!(answer.trim().to_ascii_lowercase().as_str(), "y" | "yes")
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(io::stderr)
        .init();
    let cli = Cli::parse();

    let mut settings = load_client_settings(cli.config.as_deref())?;
    if let Some(backend) = cli.backend {
        settings.backend = backend;
    }
    if let Some(api_url) = cli.api_url {
        settings.api_url = api_url;
    }
    if let Some(database_url) = cli.database_url {
        settings.local_database_url = database_url;
    }
    if let Some(kind) = cli.amount_kind {
        settings.amount_kind = kind;
    }

    debug!(
        backend = %settings.backend,
        amount_kind = settings.amount_kind.label(),
        "client settings resolved"
    );

    let confirm: Arc<dyn ConfirmationPrompt> = match &cli.command {
        Command::Delete { yes: true, .. } => Arc::new(AlwaysConfirm),
        _ => Arc::new(StdinConfirm),
    };
    let controller = build_controller(&settings, confirm).await?;
    let mut flashes = controller.notifier().subscribe();

    let outcome = run(&controller, cli.command).await;
    print_flashes(&mut flashes);
    outcome
}

async fn run(controller: &ProductListController, command: Command) -> Result<()> {
    let kind = controller.amount_kind();
    match command {
        Command::List => {
            // the error panel is rendered below
            let _ = controller.refresh().await;
        }
        Command::Show { id } => {
            let product = controller.read(ProductId(id)).await?;
            print!("{}", render_product(&product));
            return Ok(());
        }
        Command::Add {
            name,
            amount,
            description,
            image,
        } => {
            let form = ProductForm::new(name, amount)
                .with_descricao(description.unwrap_or_default())
                .with_imagem(image.unwrap_or_default());
            let product = controller.create(&form).await?;
            println!("created product id={}", product.id);
        }
        Command::Edit {
            id,
            name,
            amount,
            description,
            image,
        } => {
            let (mode, mut form) = controller.start_edit(ProductId(id)).await?;
            println!("{} #{id}", mode.form_title());
            if let Some(name) = name {
                form.nome = name;
            }
            if let Some(amount) = amount {
                form.amount = amount;
            }
            if let Some(description) = description {
                form.descricao = description;
            }
            if let Some(image) = image {
                form.imagem = image;
            }
            let submission = controller.submit(mode, form).await;
            let product = submission.result?;
            println!("updated product id={}", product.id);
        }
        Command::Delete { id, .. } => match controller.delete(ProductId(id)).await? {
            DeleteOutcome::Deleted => println!("deleted product id={id}"),
            DeleteOutcome::Cancelled => {
                info!(product_id = id, "delete cancelled at prompt");
                println!("delete cancelled");
                return Ok(());
            }
        },
    }

    print!("{}", render_display(&controller.display(), kind));
    Ok(())
}

fn print_flashes(flashes: &mut broadcast::Receiver<NotificationEvent>) {
    while let Ok(event) = flashes.try_recv() {
        if let NotificationEvent::Shown(notification) = event {
            let tag = match notification.kind {
                NotificationKind::Success => "ok",
                NotificationKind::Error => "error",
            };
            eprintln!("[{tag}] {}", notification.message);
        }
    }
}

fn render_display(state: &DisplayState, kind: AmountKind) -> String {
    match state {
        DisplayState::Loading => "Loading products...\n".to_string(),
        DisplayState::Empty => "No products found. Add your first product above!\n".to_string(),
        DisplayState::Error => "Error loading products. Make sure the server is running.\n".to_string(),
        DisplayState::Populated(products) => render_table(products, kind),
    }
}

fn render_table(products: &[Product], kind: AmountKind) -> String {
    let name_width = products
        .iter()
        .map(|p| p.nome.chars().count())
        .max()
        .unwrap_or(0)
        .max("Name".len());

    let mut out = format!(
        "{:>4}  {:<name_width$}  {:>10}  Description\n",
        "ID",
        "Name",
        kind.label()
    );
    for product in products {
        out.push_str(&format!(
            "{:>4}  {:<name_width$}  {:>10}  {}\n",
            product.id.0,
            product.nome,
            product.amount.to_string(),
            product.descricao.as_deref().unwrap_or("-")
        ));
    }
    out
}

fn render_product(product: &Product) -> String {
    let mut out = format!(
        "id: {}\nname: {}\n{}: {}\n",
        product.id,
        product.nome,
        product.amount.kind().label().to_ascii_lowercase(),
        product.amount
    );
    if let Some(descricao) = &product.descricao {
        out.push_str(&format!("description: {descricao}\n"));
    }
    if let Some(imagem) = &product.imagem {
        out.push_str(&format!("image: {imagem}\n"));
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use shared::domain::Amount;

    fn widget() -> Product {
        Product {
            id: ProductId(1),
            nome: "Widget".into(),
            amount: Amount::Quantity { quantidade: 5 },
            descricao: Some("blue".into()),
            imagem: None,
        }
    }

    #[test]
    fn table_lists_one_row_per_product() {
        let out = render_display(&DisplayState::Populated(vec![widget()]), AmountKind::Quantity);
        let lines: Vec<&str> = out.lines().collect();
        assert_eq!(lines.len(), 2);
        assert!(lines[0].contains("Quantity"));
        assert!(lines[1].contains("Widget"));
        assert!(lines[1].contains("blue"));
    }

    #[test]
    fn empty_and_error_states_have_their_own_text() {
        assert!(render_display(&DisplayState::Empty, AmountKind::Quantity).starts_with("No products"));
        assert!(render_display(&DisplayState::Error, AmountKind::Price).starts_with("Error loading"));
    }

    #[test]
    fn product_details_skip_absent_fields() {
        let out = render_product(&widget());
        assert!(out.contains("quantity: 5"));
        assert!(!out.contains("image:"));
    }

    #[test]
    fn cli_parses_global_flags_and_delete_confirmation() {
        let cli = Cli::try_parse_from([
            "inventory",
            "--backend",
            "local",
            "--amount-kind",
            "price",
            "delete",
            "3",
            "--yes",
        ])
        .expect("parse");
        assert_eq!(cli.backend, Some(Backend::Local));
        assert_eq!(cli.amount_kind, Some(AmountKind::Price));
        assert!(matches!(cli.command, Command::Delete { id: 3, yes: true }));
    }
}
