// console/command_handler.rs

use crate::analyzer::filter::Criteria;
use crate::auth::AuthenticatedUser;
use crate::console::views::{self, OptionKind, Party};
use crate::console::{Dashboard, Reply};
use crate::model::{AuthError, LoadError};
use tracing::{info, warn};

pub const HELP: &str = "📋 Available commands:
/login <username> <password> — sign in
/logout — sign out
/overview — certification counts for all products
/explore [category=..] [region=..] [campus=..] [cert=..] [search=..] — product explorer
/distributor <name> — products, suppliers and campuses of a distributor
/supplier <name> — products, distributors and campuses of a supplier
/stats — certification distribution chart
/options <categories|regions|campuses|certifications|distributors|suppliers> — selectable values
/export — save the last table as CSV
/glossary — certification codes
/status — session and dataset status
/help — this list
/quit — exit";

#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    Help,
    Glossary,
    Login { username: String, password: String },
    Logout,
    Status,
    Overview,
    Explore(Criteria),
    Distributor(String),
    Supplier(String),
    Stats,
    Options(OptionKind),
    Export,
    Quit,
}

/// Splits on whitespace; double quotes group words and are removed.
pub fn tokenize(line: &str) -> Vec<String> {
    let mut tokens = Vec::new();
    let mut current = String::new();
    let mut in_quotes = false;
    let mut has_token = false;

    for c in line.chars() {
        match c {
            '"' => {
                in_quotes = !in_quotes;
                has_token = true;
            }
            c if c.is_whitespace() && !in_quotes => {
                if has_token {
                    tokens.push(std::mem::take(&mut current));
                    has_token = false;
                }
            }
            c => {
                current.push(c);
                has_token = true;
            }
        }
    }
    if has_token {
        tokens.push(current);
    }
    tokens
}

fn parse_criteria(args: &[String]) -> Result<Criteria, String> {
    let mut criteria = Criteria::all();
    for arg in args {
        let (key, value) = arg
            .split_once('=')
            .ok_or_else(|| format!("Expected key=value, got '{arg}'"))?;
        let value = value.to_string();
        match key.trim().to_lowercase().as_str() {
            "category" | "cat" => criteria.category = Some(value),
            "region" => criteria.region = Some(value),
            "campus" => criteria.campus = Some(value),
            "cert" | "certification" | "standard" => criteria.certification = Some(value),
            "search" | "q" => criteria.search_text = Some(value),
            other => return Err(format!("Unknown filter '{other}'")),
        }
    }
    Ok(criteria)
}

pub fn parse_command(line: &str) -> Result<Command, String> {
    let tokens = tokenize(line);
    let Some((head, args)) = tokens.split_first() else {
        return Err("Type /help for the command list.".into());
    };
    let rest = args.join(" ");

    match head.to_lowercase().as_str() {
        "/help" | "/start" => Ok(Command::Help),
        "/glossary" => Ok(Command::Glossary),
        "/login" => match args {
            [username, password] => Ok(Command::Login {
                username: username.clone(),
                password: password.clone(),
            }),
            _ => Err("Usage: /login <username> <password>".into()),
        },
        "/logout" => Ok(Command::Logout),
        "/status" => Ok(Command::Status),
        "/overview" => Ok(Command::Overview),
        "/explore" => parse_criteria(args).map(Command::Explore),
        "/distributor" if !rest.is_empty() => Ok(Command::Distributor(rest)),
        "/distributor" => Err("Usage: /distributor <name>".into()),
        "/supplier" if !rest.is_empty() => Ok(Command::Supplier(rest)),
        "/supplier" => Err("Usage: /supplier <name>".into()),
        "/stats" => Ok(Command::Stats),
        "/options" => OptionKind::parse(&rest)
            .map(Command::Options)
            .ok_or_else(|| "Usage: /options <categories|regions|campuses|certifications|distributors|suppliers>".into()),
        "/export" => Ok(Command::Export),
        "/quit" | "/exit" => Ok(Command::Quit),
        other => Err(format!("Unknown command '{other}'. Type /help for the command list.")),
    }
}

fn welcome(user: &AuthenticatedUser) -> String {
    match &user.email {
        Some(email) => format!("✅ Welcome, {} <{}>!", user.display_name, email),
        None => format!("✅ Welcome, {}!", user.display_name),
    }
}

fn login_prompt(e: &AuthError) -> String {
    format!("🔒 {e}. Use /login <username> <password>.")
}

fn load_error_message(e: &LoadError) -> String {
    match e {
        LoadError::Fetch(_) | LoadError::Parse(_) => format!(
            "⚠️ {e}\nNo data loaded. Check the CSV link or permissions."
        ),
        LoadError::Schema(_) => format!("❌ {e}\nData views are unavailable until the sheet is fixed."),
    }
}

/// Handles one command line and produces the reply text.
pub async fn handle_command(line: &str, dashboard: &mut Dashboard) -> Reply {
    let command = match parse_command(line) {
        Ok(c) => c,
        Err(usage) => return Reply::text(usage),
    };
    info!("Handling command: {:?}", redact(&command));

    match command {
        Command::Help => Reply::text(HELP),
        Command::Quit => Reply::quit("👋 Bye."),
        Command::Glossary => Reply::text(views::glossary(&dashboard.registry).text),
        Command::Login { username, password } => {
            let now = dashboard.clock.now();
            match dashboard.session.login(&dashboard.credentials, &username, &password, now) {
                Ok(user) => Reply::text(welcome(user)),
                Err(AuthError::Store(e)) => Reply::text(format!("❌ Login unavailable: {e}")),
                Err(e) => Reply::text(format!("❌ {e}")),
            }
        }
        Command::Logout => match dashboard.session.logout() {
            Some(_) => {
                dashboard.last_export = None;
                Reply::text("Logged out.")
            }
            None => Reply::text("You were not logged in."),
        },
        Command::Status => Reply::text(dashboard.status_text()),
        Command::Export => export_last(dashboard),
        data_command => data_view(data_command, dashboard).await,
    }
}

fn redact(command: &Command) -> Command {
    match command {
        Command::Login { username, .. } => Command::Login {
            username: username.clone(),
            password: "***".into(),
        },
        other => other.clone(),
    }
}

async fn data_view(command: Command, dashboard: &mut Dashboard) -> Reply {
    if !dashboard.session.is_authenticated() {
        return Reply::text(login_prompt(&AuthError::NotLoggedIn));
    }
    let now = dashboard.clock.now();
    let dataset = match dashboard.cache.get_or_refresh(now).await {
        Ok(ds) => ds,
        Err(e) => return Reply::text(load_error_message(&e)),
    };

    let registry = &dashboard.registry;
    let page = match command {
        Command::Overview => views::overview(&dataset, registry),
        Command::Explore(criteria) => views::explorer(&dataset, registry, &criteria, dashboard.search_threshold),
        Command::Distributor(name) => views::party(&dataset, registry, Party::Distributor, &name),
        Command::Supplier(name) => views::party(&dataset, registry, Party::Supplier, &name),
        Command::Stats => views::stats(&dataset, registry),
        Command::Options(kind) => views::options(&dataset, registry, kind),
        other => {
            warn!("Command {:?} routed to data view", other);
            return Reply::text("Type /help for the command list.");
        }
    };

    if page.export.is_some() {
        dashboard.last_export = page.export;
    }
    Reply::text(page.text)
}

fn export_last(dashboard: &Dashboard) -> Reply {
    if let Err(e) = dashboard.session.require() {
        return Reply::text(login_prompt(&e));
    }
    let Some(file) = &dashboard.last_export else {
        return Reply::text("Nothing to export yet. Open /explore, /distributor, /supplier or /stats first.");
    };
    match file.write_to(&dashboard.export_dir) {
        Ok(path) => Reply::text(format!("📥 Saved {}", path.display())),
        Err(e) => {
            warn!("Export failed: {}", e);
            Reply::text(format!("❌ Export failed: {e}"))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tokenizer_handles_quotes() {
        assert_eq!(
            tokenize(r#"/explore category="Meat & Poultry" cert=OG"#),
            vec!["/explore", "category=Meat & Poultry", "cert=OG"]
        );
        assert_eq!(tokenize(r#"/explore search="""#), vec!["/explore", "search="]);
        assert!(tokenize("   ").is_empty());
    }

    #[test]
    fn parses_explore_filters() {
        let cmd = parse_command(r#"/explore cat=Produce region=NorCal search="apple juice""#).unwrap();
        assert_eq!(
            cmd,
            Command::Explore(Criteria::all().category("Produce").region("NorCal").search("apple juice"))
        );
        assert!(parse_command("/explore color=red").is_err());
        assert!(parse_command("/explore Produce").is_err());
    }

    #[test]
    fn parses_names_with_spaces() {
        assert_eq!(
            parse_command("/distributor Sysco Foods").unwrap(),
            Command::Distributor("Sysco Foods".into())
        );
        assert_eq!(
            parse_command(r#"/supplier "Ben & Jerry's""#).unwrap(),
            Command::Supplier("Ben & Jerry's".into())
        );
        assert!(parse_command("/distributor").is_err());
    }

    #[test]
    fn parses_login_and_misc() {
        assert_eq!(
            parse_command("/login analyst pw").unwrap(),
            Command::Login {
                username: "analyst".into(),
                password: "pw".into()
            }
        );
        assert!(parse_command("/login analyst").is_err());
        assert_eq!(parse_command("/OPTIONS regions").unwrap(), Command::Options(OptionKind::Regions));
        assert!(parse_command("/options colors").is_err());
        assert!(parse_command("hello").is_err());
        assert!(parse_command("").is_err());
    }

    #[test]
    fn welcome_shows_email_when_known() {
        let mut user = AuthenticatedUser {
            username: "analyst".into(),
            display_name: "Ana Lyst".into(),
            email: Some("analyst@example.edu".into()),
            session_id: "0".into(),
            since: chrono::Utc::now(),
        };
        assert_eq!(welcome(&user), "✅ Welcome, Ana Lyst <analyst@example.edu>!");
        user.email = None;
        assert_eq!(welcome(&user), "✅ Welcome, Ana Lyst!");
    }

    #[test]
    fn login_is_redacted_in_logs() {
        let cmd = Command::Login {
            username: "a".into(),
            password: "secret".into(),
        };
        assert!(!format!("{:?}", redact(&cmd)).contains("secret"));
    }
}
