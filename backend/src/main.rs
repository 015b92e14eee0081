//! Planillas CLI - normalize ledger exports and transfer analysis sheets
//!
//! # Main Commands
//!
//! ```bash
//! planillas serve                                  # Start HTTP server (port 5000)
//! planillas normalize mayor.xlsx                   # Write procesado_<ts>_mayor.xlsx
//! planillas transfer origen.xlsx destino.xlsx -p … # Copy Analisis sheet into BD6
//! ```
//!
//! # Helper Commands
//!
//! ```bash
//! planillas sheets origen.xlsx                     # List Analisis* sheets
//! planillas change-password --current … --new … --confirm …
//! planillas hash <password>                        # Print the SHA-256 digest
//! ```

use clap::{Parser, Subcommand};
use planillas::{
    analysis_sheets, change_password, hash_password, normalize, run_transfer,
    transfer::choose_sheet, AppConfig, PasswordChange, TransferRequest,
};
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "planillas")]
#[command(about = "Normalize accounting workbooks and transfer analysis sheets", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Start HTTP server
    Serve {
        /// Port to listen on (default: PLANILLAS_PORT or 5000)
        #[arg(short, long)]
        port: Option<u16>,
    },

    /// Normalize the active sheet of a workbook into a new file
    Normalize {
        /// Input workbook (.xls, .xlsx, .xlsm)
        input: PathBuf,
    },

    /// Copy an Analisis sheet into the BD6 sheet of another workbook
    Transfer {
        /// Source workbook holding the Analisis sheets
        origen: PathBuf,

        /// Destination workbook with a BD6 sheet (modified in place)
        destino: PathBuf,

        /// Analisis sheet to copy (default: the first one)
        #[arg(short, long)]
        sheet: Option<String>,

        /// Transfer password
        #[arg(short, long)]
        password: String,
    },

    /// List the Analisis sheets of a workbook
    Sheets {
        /// Workbook to inspect
        input: PathBuf,
    },

    /// Change the stored password
    ChangePassword {
        #[arg(long)]
        current: String,
        #[arg(long)]
        new: String,
        #[arg(long)]
        confirm: String,
    },

    /// Print the SHA-256 digest of a password
    Hash {
        password: String,
    },
}

#[tokio::main]
async fn main() {
    // Load .env file (if present)
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let config = AppConfig::from_env();

    let result = match cli.command {
        Commands::Serve { port } => cmd_serve(config, port).await,

        Commands::Normalize { input } => cmd_normalize(&input),

        Commands::Transfer {
            origen,
            destino,
            sheet,
            password,
        } => cmd_transfer(&config, &origen, &destino, sheet.as_deref(), &password),

        Commands::Sheets { input } => cmd_sheets(&input),

        Commands::ChangePassword {
            current,
            new,
            confirm,
        } => cmd_change_password(&config, PasswordChange { current, new, confirm }),

        Commands::Hash { password } => {
            println!("{}", hash_password(&password));
            Ok(())
        }
    };

    if let Err(e) = result {
        eprintln!("❌ Error: {}", e);
        std::process::exit(1);
    }
}

async fn cmd_serve(
    mut config: AppConfig,
    port: Option<u16>,
) -> Result<(), Box<dyn std::error::Error>> {
    if let Some(port) = port {
        config.port = port;
    }
    planillas::server::start_server(config).await
}

fn cmd_normalize(input: &Path) -> Result<(), Box<dyn std::error::Error>> {
    eprintln!("📄 Processing: {}", input.display());

    let report = normalize::normalize_file(input)?;

    eprintln!("   Boundary rows: {}", report.sheet.boundary_rows);
    eprintln!("   Dated rows:    {}", report.sheet.dated_rows);
    eprintln!("   Discarded:     {}", report.sheet.discarded_rows);
    eprintln!("\n✨ Done!");
    println!("{}", report.output_path.display());
    Ok(())
}

fn cmd_transfer(
    config: &AppConfig,
    origen: &Path,
    destino: &Path,
    sheet: Option<&str>,
    password: &str,
) -> Result<(), Box<dyn std::error::Error>> {
    let sheets = analysis_sheets(origen)?;
    let sheet = choose_sheet(&sheets, sheet).ok_or("no analysis sheet")?;

    eprintln!("📄 {} [{}] → {} [BD6]", origen.display(), sheet, destino.display());

    let request = TransferRequest {
        source: origen,
        destination: destino,
        sheet: &sheet,
        password: Some(password),
    };
    let outcome = run_transfer(&config.password_store(), &request);

    if !outcome.success {
        return Err(outcome.message.into());
    }

    eprintln!("✅ {}", outcome.message);
    if let Some(summary) = outcome.summary {
        eprintln!("   Rows transferred: {}", summary.rows_transferred);
        eprintln!("   Columns:          {}", summary.columns.join(", "));
        eprintln!("   Backup:           {}", summary.backup_path.display());
    }
    Ok(())
}

fn cmd_sheets(input: &Path) -> Result<(), Box<dyn std::error::Error>> {
    for name in analysis_sheets(input)? {
        println!("{}", name);
    }
    Ok(())
}

fn cmd_change_password(
    config: &AppConfig,
    request: PasswordChange,
) -> Result<(), Box<dyn std::error::Error>> {
    change_password(&config.password_store(), &request)?;
    eprintln!("✅ Contraseña cambiada correctamente");
    Ok(())
}
