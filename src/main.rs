use anyhow::Result;
use clap::{Parser, Subcommand};
use dialoguer::{Confirm, Input, Password};
use hederair::flows::{LoginFlow, RegisterFlow, RegistrationForm, WalletSignIn};
use hederair::wallet::{ClientEnv, LoggingLinkOpener, NullPairingSdk, PairingPhase};
use hederair::{AppContext, Config};
use std::sync::Arc;

#[derive(Parser)]
#[command(name = "hederair", version, about = "HederaAir authentication client")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Sign in with email and password
    Login {
        /// Email address (prompted when omitted)
        #[arg(long)]
        email: Option<String>,
    },
    /// Create a new account
    Register,
    /// Wallet pairing operations
    Wallet {
        #[command(subcommand)]
        command: WalletCommands,
    },
    /// Show the current session
    Status,
    /// Clear the stored session
    Logout,
}

#[derive(Subcommand)]
enum WalletCommands {
    /// Pair a wallet and sign in with it
    Connect,
    /// End the active pairing
    Disconnect,
    /// Show pairing state
    Status,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "hederair=info".into()),
        )
        .init();

    let cli = Cli::parse();
    let config = Config::load()?;
    let ctx = AppContext::build(
        config,
        Arc::new(NullPairingSdk::new()),
        Arc::new(LoggingLinkOpener),
    )?;

    match cli.command {
        Commands::Login { email } => login(&ctx, email).await,
        Commands::Register => register(&ctx).await,
        Commands::Wallet { command } => match command {
            WalletCommands::Connect => wallet_connect(&ctx).await,
            WalletCommands::Disconnect => {
                ctx.wallet.disconnect().await;
                println!("Wallet disconnected.");
                Ok(())
            }
            WalletCommands::Status => {
                wallet_status(&ctx);
                Ok(())
            }
        },
        Commands::Status => {
            status(&ctx);
            Ok(())
        }
        Commands::Logout => {
            ctx.session.logout();
            println!("Signed out.");
            Ok(())
        }
    }
}

async fn login(ctx: &AppContext, email: Option<String>) -> Result<()> {
    let email = match email {
        Some(e) => e,
        None => Input::new().with_prompt("Email").interact_text()?,
    };
    let password = Password::new().with_prompt("Password").interact()?;

    let flow = LoginFlow::new(Arc::clone(&ctx.api), Arc::clone(&ctx.session));
    match flow.submit(&email, &password).await {
        Ok(dest) => {
            println!("Signed in. Next: {}", dest.route());
            Ok(())
        }
        Err(e) => {
            eprintln!("{e}");
            std::process::exit(1);
        }
    }
}

async fn register(ctx: &AppContext) -> Result<()> {
    let form = RegistrationForm {
        username: Input::new().with_prompt("Username").interact_text()?,
        email: Input::new().with_prompt("Email").interact_text()?,
        password: Password::new().with_prompt("Password").interact()?,
        confirm_password: Password::new().with_prompt("Confirm password").interact()?,
        accepted_terms: Confirm::new()
            .with_prompt("Accept the terms of service?")
            .interact()?,
    };

    let flow = RegisterFlow::new(Arc::clone(&ctx.api), Arc::clone(&ctx.session));
    match flow.submit(&form).await {
        Ok(dest) => {
            println!("Account created. Next: {}", dest.route());
            Ok(())
        }
        Err(e) => {
            eprintln!("{e}");
            std::process::exit(1);
        }
    }
}

async fn wallet_connect(ctx: &AppContext) -> Result<()> {
    let flow = LoginFlow::new(Arc::clone(&ctx.api), Arc::clone(&ctx.session));
    let env = ClientEnv::native();
    match flow.sign_in_with_wallet(&ctx.wallet, &env).await {
        Ok(WalletSignIn::Completed(dest)) => {
            println!("Signed in with wallet. Next: {}", dest.route());
            Ok(())
        }
        Ok(WalletSignIn::PairingStarted) => {
            println!("Pairing started; approve the request in your wallet.");
            Ok(())
        }
        Ok(WalletSignIn::StoreRedirect(url)) => {
            println!("No wallet available. Install one: {url}");
            Ok(())
        }
        Err(e) => {
            eprintln!("{e}");
            std::process::exit(1);
        }
    }
}

fn wallet_status(ctx: &AppContext) {
    let state = ctx.wallet.state();
    match state.phase {
        PairingPhase::Paired => {
            println!(
                "Paired with account {}",
                state.account_id.as_deref().unwrap_or("<unknown>")
            );
        }
        PairingPhase::Connecting => println!("Pairing in progress."),
        PairingPhase::Disconnected => println!("Wallet disconnected."),
        PairingPhase::Idle => println!("No wallet paired."),
    }
}

fn status(ctx: &AppContext) {
    if !ctx.session.is_authenticated() {
        println!("Not signed in.");
        return;
    }
    println!("Signed in.");
    if let Some(user) = ctx.session.user() {
        println!("Profile: {user}");
    }
}
