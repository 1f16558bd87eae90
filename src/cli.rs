//! Command-line front-end.
//!
//! Every command validates its input before touching the network and prints
//! its result as pretty JSON on stdout. Logs go to stderr.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use clap::{Parser, Subcommand};
use serde::Serialize;
use serde_json::json;
use tracing::{debug, info};

use crate::config::{config_schema, load_config, ConfigV1};
use crate::error::{ClientError, Result};
use crate::models::{CardFilters, CardId, CardLinkType, LinkId, LinkPayload};
use crate::navigation::{RouteGuard, TracingNavigator};
use crate::session::{create_token_storage, SessionHandle};
use crate::startup::App;
use crate::utils::logger::init_logging;
use crate::validation::{CardForm, SignInForm, SignupForm, ValidationErrors};

#[derive(Parser)]
#[command(
    name = "insignia",
    version,
    about = "Manage Insignia digital business cards from the terminal"
)]
pub struct Cli {
    /// Path to the YAML configuration file.
    #[arg(long, short, global = true, default_value = "./config.yaml")]
    pub config: PathBuf,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand)]
pub enum Command {
    #[command(flatten)]
    Backend(BackendCommand),
    /// Decide whether navigating to a path is allowed.
    Guard { path: String },
    /// Print the configuration JSON schema.
    Schema,
}

/// Commands that talk to the backend and therefore need a base URL.
#[derive(Subcommand)]
pub enum BackendCommand {
    /// Sign in and persist the access token.
    Login {
        #[arg(long)]
        email: String,
        #[arg(long, env = "INSIGNIA_PASSWORD", hide_env_values = true)]
        password: String,
    },
    /// Create an account and sign in.
    Signup {
        #[arg(long)]
        name: String,
        #[arg(long)]
        email: String,
        #[arg(long, env = "INSIGNIA_PASSWORD", hide_env_values = true)]
        password: String,
        #[arg(long, env = "INSIGNIA_PASSWORD", hide_env_values = true)]
        confirm_password: String,
    },
    /// Forget the stored token.
    Logout,
    /// Show the signed-in user's profile.
    Whoami,
    #[command(subcommand)]
    Cards(CardsCommand),
    #[command(subcommand)]
    Links(LinksCommand),
}

#[derive(Subcommand)]
pub enum CardsCommand {
    /// List the signed-in user's cards.
    List {
        #[arg(long)]
        search: Option<String>,
    },
    Show { id: CardId },
    /// Create a card from a card editor JSON document.
    Create {
        file: PathBuf,
        /// Slug to publish under; derived from the name when omitted.
        #[arg(long)]
        slug: Option<String>,
    },
    Delete { id: CardId },
    /// Fetch a published card without authentication.
    Public { slug: String },
}

#[derive(Subcommand)]
pub enum LinksCommand {
    Add {
        card: CardId,
        #[arg(long = "type")]
        link_type: String,
        #[arg(long)]
        value: String,
        #[arg(long)]
        label: Option<String>,
    },
    Remove { card: CardId, link: LinkId },
    /// Reorder a card's links; ids are given in their new order.
    Reorder {
        card: CardId,
        #[arg(required = true, num_args = 1..)]
        ids: Vec<LinkId>,
    },
}

/// Runs `command`. Configuration is loaded from `config_path` and logging is
/// started for every command except `schema`, which needs neither.
pub async fn execute(config_path: &Path, command: Command) -> Result<()> {
    match command {
        Command::Schema => print_raw(&config_schema()?),
        Command::Guard { path } => guard(&prepare(config_path)?, &path),
        Command::Backend(command) => {
            let app = App::from_config(prepare(config_path)?, Arc::new(TracingNavigator))?;
            run(&app, command).await
        }
    }
}

fn prepare(config_path: &Path) -> Result<ConfigV1> {
    let config = load_config(config_path).map_err(|e| {
        ClientError::Configuration(format!("could not load {}: {}", config_path.display(), e))
    })?;
    init_logging(&config.logging).map_err(|e| ClientError::Configuration(e.to_string()))?;
    Ok(config)
}

fn guard(config: &ConfigV1, path: &str) -> Result<()> {
    let storage = create_token_storage(&config.session, config.environment);
    let session = SessionHandle::hydrate(storage)?;
    let decision = RouteGuard::new(&config.routes).check(path, &session);
    print_json(&json!({ "path": path, "outcome": decision }))
}

async fn run(app: &App, command: BackendCommand) -> Result<()> {
    match command {
        BackendCommand::Login { email, password } => {
            let payload = SignInForm { email, password }.validate()?;
            let auth = app.store.login(&payload).await?;
            info!("Signed in as {}", auth.user.display_name());
            print_json(&auth.user)
        }
        BackendCommand::Signup {
            name,
            email,
            password,
            confirm_password,
        } => {
            let payload = SignupForm {
                name,
                email,
                password,
                confirm_password,
            }
            .validate()?;
            let auth = app.store.signup(&payload).await?;
            info!("Account created for {}", auth.user.email);
            print_json(&auth.user)
        }
        BackendCommand::Logout => {
            app.store.logout().await?;
            print_json(&json!({ "authenticated": false }))
        }
        BackendCommand::Whoami => match app.store.fetch_profile().await? {
            Some(profile) => print_json(&profile),
            None => print_json(&json!({ "authenticated": false })),
        },
        BackendCommand::Cards(command) => run_cards(app, command).await,
        BackendCommand::Links(command) => run_links(app, command).await,
    }
}

async fn run_cards(app: &App, command: CardsCommand) -> Result<()> {
    match command {
        CardsCommand::List { search } => {
            let filters = search.map(CardFilters::search).unwrap_or_default();
            print_json(&app.cards.list_my_cards(&filters).await?)
        }
        CardsCommand::Show { id } => print_json(&app.cards.get_my_card(id).await?),
        CardsCommand::Create { file, slug } => {
            let form = read_card_form(&file)?;
            let draft = form.validate()?;
            let slug = slug.unwrap_or_else(|| crate::validation::suggest_slug(&draft.display_name));

            let mut card = app.cards.create_card(&draft.card_payload(slug)).await?;
            debug!(card_id = card.id, "card created, saving links and appearance");
            let links = draft.link_payloads();
            if !links.is_empty() {
                card.links = app.links.replace_links(card.id, &links).await?;
            }
            card.appearance = Some(
                app.appearance
                    .update_card_appearance(card.id, &draft.appearance())
                    .await?,
            );
            print_json(&card)
        }
        CardsCommand::Delete { id } => {
            app.cards.delete_card(id).await?;
            print_json(&json!({ "deleted": id }))
        }
        CardsCommand::Public { slug } => print_json(&app.cards.get_public_card(&slug).await?),
    }
}

async fn run_links(app: &App, command: LinksCommand) -> Result<()> {
    match command {
        LinksCommand::Add {
            card,
            link_type,
            value,
            label,
        } => {
            let link_type = parse_link_type(&link_type)?;
            let mut payload = LinkPayload::new(link_type, value.trim());
            payload.label = label.filter(|l| !l.trim().is_empty());
            print_json(&app.links.add_link(card, &payload).await?)
        }
        LinksCommand::Remove { card, link } => {
            app.links.remove_link(card, link).await?;
            print_json(&json!({ "removed": link }))
        }
        LinksCommand::Reorder { card, ids } => {
            print_json(&app.links.reorder_links(card, &ids).await?)
        }
    }
}

fn parse_link_type(raw: &str) -> Result<CardLinkType> {
    raw.parse::<CardLinkType>().map_err(|_| {
        let mut errors = ValidationErrors::default();
        errors.push("type", "Unsupported link type");
        ClientError::Validation(errors)
    })
}

fn read_card_form(path: &Path) -> Result<CardForm> {
    let raw = std::fs::read_to_string(path).map_err(|e| {
        ClientError::InvalidRequest(format!("could not read {}: {}", path.display(), e))
    })?;
    Ok(serde_json::from_str(&raw)?)
}

fn print_json<T: Serialize + ?Sized>(value: &T) -> Result<()> {
    print_raw(&serde_json::to_string_pretty(value)?)
}

fn print_raw(text: &str) -> Result<()> {
    println!("{}", text);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn parses_reorder_ids_in_order() {
        let cli = Cli::try_parse_from(["insignia", "links", "reorder", "7", "3", "1", "2"]).unwrap();
        match cli.command {
            Command::Backend(BackendCommand::Links(LinksCommand::Reorder { card, ids })) => {
                assert_eq!(card, 7);
                assert_eq!(ids, vec![3, 1, 2]);
            }
            _ => panic!("expected links reorder"),
        }
    }

    #[test]
    fn reorder_requires_at_least_one_id() {
        assert!(Cli::try_parse_from(["insignia", "links", "reorder", "7"]).is_err());
    }

    #[test]
    fn config_flag_defaults_to_local_file() {
        let cli = Cli::try_parse_from(["insignia", "logout"]).unwrap();
        assert_eq!(cli.config, PathBuf::from("./config.yaml"));
    }

    #[test]
    fn unknown_link_type_is_a_validation_error() {
        let err = parse_link_type("myspace").unwrap_err();
        match err {
            ClientError::Validation(errors) => {
                assert_eq!(errors.messages_for("type").collect::<Vec<_>>(), ["Unsupported link type"]);
            }
            other => panic!("unexpected error {:?}", other),
        }
    }

    #[test]
    fn link_type_parsing_ignores_case() {
        assert_eq!(parse_link_type("LinkedIn").unwrap(), CardLinkType::Linkedin);
    }

    #[test]
    fn reads_card_form_from_json() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("card.json");
        std::fs::write(
            &path,
            r#"{
                "basic": {"name": "Ada Lovelace"},
                "links": [{"id": "tmp-1", "type": "phone", "value": "+44 20 7946 0000"}],
                "customization": {"template": "classic"}
            }"#,
        )
        .unwrap();
        let form = read_card_form(&path).unwrap();
        assert_eq!(form.basic.name, "Ada Lovelace");
        assert_eq!(form.links.len(), 1);
    }

    #[test]
    fn missing_card_form_is_invalid_request() {
        let err = read_card_form(Path::new("/nonexistent/card.json")).unwrap_err();
        assert!(matches!(err, ClientError::InvalidRequest(_)));
    }

    #[test]
    fn backend_commands_parse_at_top_level() {
        let cli = Cli::try_parse_from(["insignia", "login", "--email", "a@b.co", "--password", "x"]).unwrap();
        assert!(matches!(
            cli.command,
            Command::Backend(BackendCommand::Login { ref email, .. }) if email == "a@b.co"
        ));

        let cli = Cli::try_parse_from(["insignia", "guard", "/dashboard"]).unwrap();
        assert!(matches!(cli.command, Command::Guard { ref path } if path == "/dashboard"));
    }

    #[tokio::test]
    async fn schema_needs_no_configuration_file() {
        let missing = Path::new("/nonexistent/insignia/config.yaml");
        execute(missing, Command::Schema).await.unwrap();
    }
}
