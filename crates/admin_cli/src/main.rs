use std::{error::Error, io::Write};

use api_types::user::UserNew;
use clap::{Args, Parser, Subcommand};
use crossterm::{
    cursor,
    event::{self, Event, KeyCode, KeyEvent, KeyModifiers},
    execute,
    style::Print,
    terminal,
    terminal::ClearType,
};
use engine::{Engine, EngineError, PASSWORD_MIN};
use migration::{DEFAULT_DATABASE_URL, MigratorTrait};
use sea_orm::{Database, DatabaseConnection};

#[derive(Parser, Debug)]
#[command(name = "atrium_admin")]
#[command(about = "Admin utilities for Atrium (migrations, seeding, bootstrap users)")]
struct Cli {
    /// Database connection string (also read from `DATABASE_URL`).
    #[arg(long, env = "DATABASE_URL", default_value = DEFAULT_DATABASE_URL)]
    database_url: String,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Apply pending migrations.
    Migrate,
    /// Insert the default expense categories that are missing.
    SeedCategories,
    User(User),
}

#[derive(Args, Debug)]
struct User {
    #[command(subcommand)]
    command: UserCommand,
}

#[derive(Subcommand, Debug)]
enum UserCommand {
    Create(UserCreateArgs),
}

#[derive(Args, Debug)]
struct UserCreateArgs {
    #[arg(long)]
    email: String,
    #[arg(long)]
    username: String,
    #[arg(long)]
    full_name: Option<String>,
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

fn prompt_password(prompt: &str) -> Result<String, Box<dyn Error + Send + Sync>> {
    let _raw = RawModeGuard::enter()?;

    let mut out = std::io::stderr();
    execute!(
        out,
        cursor::MoveToColumn(0),
        terminal::Clear(ClearType::CurrentLine),
        Print(prompt)
    )?;
    out.flush()?;

    let mut buf = String::new();
    loop {
        let Event::Key(KeyEvent {
            code, modifiers, ..
        }) = event::read()?
        else {
            continue;
        };

        match code {
            KeyCode::Enter => {
                execute!(out, Print("\r\n"))?;
                out.flush()?;
                break;
            }
            KeyCode::Backspace => {
                if buf.pop().is_some() {
                    execute!(out, cursor::MoveLeft(1), Print(" "), cursor::MoveLeft(1))?;
                    out.flush()?;
                }
            }
            KeyCode::Char('c') if modifiers.contains(KeyModifiers::CONTROL) => {
                execute!(out, Print("\r\n"))?;
                out.flush()?;
                return Err("interrupted".into());
            }
            KeyCode::Char(ch) if !modifiers.contains(KeyModifiers::CONTROL) => {
                buf.push(ch);
                execute!(out, Print("*"))?;
                out.flush()?;
            }
            _ => {}
        }
    }

    Ok(buf)
}

fn prompt_password_twice() -> Result<String, Box<dyn Error + Send + Sync>> {
    let mut out = std::io::stderr();
    for _ in 0..3 {
        let password = prompt_password("Password: ")?;
        if password.chars().count() < PASSWORD_MIN {
            execute!(
                out,
                cursor::MoveToColumn(0),
                terminal::Clear(ClearType::CurrentLine),
                Print(format!(
                    "Password must be at least {PASSWORD_MIN} characters.\r\n"
                ))
            )?;
            continue;
        }

        let confirm = prompt_password("Confirm password: ")?;
        if password == confirm {
            return Ok(password);
        }

        execute!(
            out,
            cursor::MoveToColumn(0),
            terminal::Clear(ClearType::CurrentLine),
            Print("Passwords do not match. Try again.\r\n")
        )?;
    }

    Err("too many attempts".into())
}

async fn connect_db(
    database_url: &str,
) -> Result<DatabaseConnection, Box<dyn Error + Send + Sync>> {
    let db = Database::connect(database_url).await?;
    migration::Migrator::up(&db, None).await?;
    Ok(db)
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error + Send + Sync>> {
    let cli = Cli::parse();

    let db = connect_db(&cli.database_url).await?;
    let engine = Engine::builder().database(db).build().await?;

    match cli.command {
        Command::Migrate => {
            println!("migrations applied: {}", cli.database_url);
        }
        Command::SeedCategories => {
            let inserted = engine.seed_default_categories().await?;
            println!("inserted {inserted} categories");
        }
        Command::User(User {
            command: UserCommand::Create(args),
        }) => {
            let password = prompt_password_twice()?;
            let input = UserNew {
                email: args.email,
                username: args.username,
                full_name: args.full_name,
                password,
            };

            match engine.create_user(input).await {
                Ok(user) => println!("created user: {} ({})", user.username, user.id),
                Err(EngineError::Conflict { message, .. }) => {
                    eprintln!("{message}");
                    std::process::exit(1);
                }
                Err(EngineError::Validation(errors)) => {
                    for violation in errors.violations() {
                        eprintln!("{}: {}", violation.field, violation.rule);
                    }
                    std::process::exit(2);
                }
                Err(err) => return Err(err.into()),
            }
        }
    }

    engine.close().await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use clap::CommandFactory;

    use super::*;

    #[test]
    fn cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn explicit_database_url_wins() {
        let cli = Cli::try_parse_from([
            "atrium_admin",
            "--database-url",
            "sqlite::memory:",
            "user",
            "create",
            "--email",
            "root@example.com",
            "--username",
            "root",
        ])
        .unwrap();
        assert_eq!(cli.database_url, "sqlite::memory:");
        assert!(matches!(
            cli.command,
            Command::User(User {
                command: UserCommand::Create(_)
            })
        ));
    }

    #[test]
    fn database_url_default_is_shared_with_migrations() {
        let command = Cli::command();
        let arg = command
            .get_arguments()
            .find(|arg| arg.get_id() == "database_url")
            .unwrap();
        let defaults: Vec<_> = arg
            .get_default_values()
            .iter()
            .map(|value| value.to_str().unwrap())
            .collect();
        assert_eq!(defaults, [DEFAULT_DATABASE_URL]);
    }
}
