use std::{error::Error, io::Write};

use clap::{Args, Parser, Subcommand};
use crossterm::{
    cursor,
    event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers},
    execute,
    style::Print,
    terminal::{self, ClearType},
};
use engine::{Engine, EngineError, MoneyCents, NewUser};
use migration::MigratorTrait;
use sea_orm::{Database, DatabaseConnection};

#[derive(Parser, Debug)]
#[command(name = "chipin_admin")]
#[command(about = "Admin utilities for Chipin (bootstrap users and groups)")]
struct Cli {
    /// Database connection string (also read from `DATABASE_URL`).
    #[arg(long, env = "DATABASE_URL", default_value = "sqlite:./chipin.db?mode=rwc")]
    database_url: String,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    User(User),
    Group(Group),
}

#[derive(Args, Debug)]
struct User {
    #[command(subcommand)]
    command: UserCommand,
}

#[derive(Subcommand, Debug)]
enum UserCommand {
    /// Create a user and its profile. The password is read from the terminal.
    Create(UserCreateArgs),
}

#[derive(Args, Debug)]
struct UserCreateArgs {
    #[arg(long)]
    username: String,
    #[arg(long, default_value = "")]
    first_name: String,
    #[arg(long, default_value = "")]
    surname: String,
    /// Defaults to the username.
    #[arg(long)]
    nickname: Option<String>,
    /// Decimal amount, e.g. `150.00`.
    #[arg(long, value_parser = parse_money)]
    max_spend: Option<MoneyCents>,
}

#[derive(Args, Debug)]
struct Group {
    #[command(subcommand)]
    command: GroupCommand,
}

#[derive(Subcommand, Debug)]
enum GroupCommand {
    Create(GroupCreateArgs),
}

#[derive(Args, Debug)]
struct GroupCreateArgs {
    /// Username of the group admin.
    #[arg(long)]
    admin: String,
    #[arg(long)]
    name: String,
}

fn parse_money(raw: &str) -> Result<MoneyCents, String> {
    raw.parse::<MoneyCents>().map_err(|err| err.to_string())
}

struct RawModeGuard;

impl RawModeGuard {
    fn enter() -> Result<Self, Box<dyn Error + Send + Sync>> {
        terminal::enable_raw_mode()?;
        Ok(Self)
    }
}

impl Drop for RawModeGuard {
    fn drop(&mut self) {
        let _ = terminal::disable_raw_mode();
    }
}

fn print_line(out: &mut impl Write, line: &str) -> std::io::Result<()> {
    execute!(
        out,
        cursor::MoveToColumn(0),
        terminal::Clear(ClearType::CurrentLine),
        Print(line),
        Print("\r\n")
    )
}

/// Reads a line without echoing it; each typed character shows as `*`.
fn read_secret(prompt: &str) -> Result<String, Box<dyn Error + Send + Sync>> {
    let _raw = RawModeGuard::enter()?;
    let mut out = std::io::stderr();
    execute!(
        out,
        cursor::MoveToColumn(0),
        terminal::Clear(ClearType::CurrentLine),
        Print(prompt)
    )?;

    let mut secret = String::new();
    loop {
        let Event::Key(KeyEvent {
            code,
            modifiers,
            kind: KeyEventKind::Press,
            ..
        }) = event::read()?
        else {
            continue;
        };

        match code {
            KeyCode::Enter => break,
            KeyCode::Esc => {
                execute!(out, Print("\r\n"))?;
                return Err("aborted".into());
            }
            KeyCode::Char('c') if modifiers.contains(KeyModifiers::CONTROL) => {
                execute!(out, Print("\r\n"))?;
                return Err("interrupted".into());
            }
            KeyCode::Backspace if secret.pop().is_some() => {
                execute!(out, cursor::MoveLeft(1), Print(" "), cursor::MoveLeft(1))?;
            }
            KeyCode::Char(ch) if !modifiers.contains(KeyModifiers::CONTROL) => {
                secret.push(ch);
                execute!(out, Print("*"))?;
            }
            _ => {}
        }
        out.flush()?;
    }
    execute!(out, Print("\r\n"))?;
    Ok(secret)
}

fn ask_password() -> Result<String, Box<dyn Error + Send + Sync>> {
    const ATTEMPTS: usize = 3;

    let mut out = std::io::stderr();
    for _ in 0..ATTEMPTS {
        let password = read_secret("Password: ")?;
        if password.is_empty() {
            print_line(&mut out, "Password must not be empty.")?;
            continue;
        }
        if read_secret("Confirm password: ")? == password {
            return Ok(password);
        }
        print_line(&mut out, "Passwords do not match. Try again.")?;
    }
    Err("too many attempts".into())
}

async fn connect_db(database_url: &str) -> Result<DatabaseConnection, Box<dyn Error + Send + Sync>> {
    let db = Database::connect(database_url).await?;
    migration::Migrator::up(&db, None).await?;
    Ok(db)
}

/// Known failures exit with a message; anything else bubbles up.
fn exit_on(err: EngineError) -> Box<dyn Error + Send + Sync> {
    match err {
        EngineError::ExistingKey(what) => {
            eprintln!("{what} already exists");
            std::process::exit(1);
        }
        EngineError::KeyNotFound(what) => {
            eprintln!("not found: {what}");
            std::process::exit(1);
        }
        err @ (EngineError::InvalidName(_) | EngineError::InvalidAmount(_)) => {
            eprintln!("{err}");
            std::process::exit(2);
        }
        other => other.into(),
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error + Send + Sync>> {
    let cli = Cli::parse();

    let db = connect_db(&cli.database_url).await?;
    let engine = Engine::builder().database(db).build().await?;

    match cli.command {
        Command::User(User {
            command: UserCommand::Create(args),
        }) => {
            let password = ask_password()?;

            let mut new_user =
                NewUser::new(&args.username, password).names(args.first_name, args.surname);
            if let Some(nickname) = args.nickname {
                new_user = new_user.nickname(nickname);
            }
            if let Some(max_spend) = args.max_spend {
                new_user = new_user.max_spend(max_spend);
            }

            let profile = engine
                .create_user_with_profile(new_user)
                .await
                .map_err(exit_on)?;
            println!(
                "created user: {} (nickname {}, max spend {})",
                args.username,
                profile.nickname,
                MoneyCents::new(profile.max_spend)
            );
        }
        Command::Group(Group {
            command: GroupCommand::Create(args),
        }) => {
            let group = engine
                .new_group(&args.name, &args.admin)
                .await
                .map_err(exit_on)?;
            println!("created group: {} ({})", group.name, group.id);
        }
    }

    Ok(())
}
