use std::{
    io::{self, BufRead, Write},
    sync::Arc,
};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use dotenv::dotenv;
use tracing::info;
use tracing_subscriber::EnvFilter;

use taleweaver::{
    api::HttpTaleApi,
    auth::{
        handler::AccountController,
        session::{IdentityProvider, Session},
        Credentials, Identity, RegisterRequest,
    },
    config::settings::Settings,
    nav::{nav_links, NavAction, Navigator, Route},
    notify::TracingNotifier,
    tales::{
        collection::{TaleCollection, VisibilityFilter},
        feed::{FeedFilters, PublicFeed},
        generator::GenerationController,
        ChildAge, Draft, GenerationRequest, Mood, Tale, TaleId,
    },
    AppContext, TaleError,
};

/// taleweaver - create and share AI-generated children's stories
#[derive(Parser, Debug)]
#[command(name = "taleweaver")]
#[command(version, about, long_about = None)]
struct Cli {
    /// API base URL (overrides TALEWEAVER_API_URL)
    #[arg(long)]
    api_url: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Create an account and sign in
    Signup {
        #[arg(long)]
        name: String,
        #[arg(long)]
        email: String,
        #[arg(long)]
        password: String,
    },

    /// Sign in and print the token to export as TALEWEAVER_TOKEN
    Signin {
        #[arg(long)]
        email: String,
        #[arg(long)]
        password: String,
    },

    /// Generate a tale, review it and optionally save it
    Create {
        /// Main topic or theme
        #[arg(long)]
        topic: String,
        /// Child's age range (3-4, 5-8, 9-12)
        #[arg(long, default_value = "5-8")]
        age: ChildAge,
        /// Story setting
        #[arg(long, default_value = "")]
        setting: String,
        /// Main characters
        #[arg(long, default_value = "")]
        characters: String,
        /// happy, adventurous, educational or calming
        #[arg(long, default_value = "happy")]
        mood: Mood,
        /// Share the tale with the community
        #[arg(long)]
        public: bool,
        /// Save without asking
        #[arg(long)]
        save: bool,
    },

    /// List your tales
    #[command(alias = "dashboard")]
    Mine {
        /// all, public or private
        #[arg(long, default_value = "all")]
        filter: VisibilityFilter,
    },

    /// Switch one of your tales between public and private
    Toggle { id: TaleId },

    /// Delete one of your tales
    Delete {
        id: TaleId,
        /// Skip the confirmation prompt
        #[arg(short, long)]
        yes: bool,
    },

    /// Browse public tales
    Explore {
        #[arg(long, default_value = "")]
        search: String,
        #[arg(long, default_value = "")]
        topic: String,
        #[arg(long)]
        age: Option<ChildAge>,
    },

    /// Like or unlike a public tale
    Like { id: TaleId },

    /// Forget the saved session
    Signout,

    /// Show the navigation available to the current session
    Nav {
        /// Page to highlight, e.g. /dashboard
        #[arg(long, default_value = "/", value_parser = parse_route)]
        at: Route,
    },
}

fn parse_route(path: &str) -> Result<Route, String> {
    Route::from_path(path).ok_or_else(|| {
        let known: Vec<_> = Route::ALL.iter().map(|route| route.path()).collect();
        format!("unknown page {path:?}, expected one of {}", known.join(", "))
    })
}

/// Turns redirects into hints about the command to run next.
struct CliNavigator;

impl Navigator for CliNavigator {
    fn navigate(&self, route: Route) {
        let hint = match route {
            Route::Home | Route::Explore => "taleweaver explore",
            Route::Create => "taleweaver create --topic <topic>",
            Route::Dashboard => "taleweaver mine",
            Route::SignIn => "taleweaver signin --email <email> --password <password>",
            Route::SignUp => "taleweaver signup --name <name> --email <email> --password <password>",
        };
        info!("next: {hint}");
    }
}

fn ask(prompt: &str) -> bool {
    print!("{prompt} [y/N] ");
    if io::stdout().flush().is_err() {
        return false;
    }
    let mut answer = String::new();
    if io::stdin().lock().read_line(&mut answer).is_err() {
        return false;
    }
    matches!(answer.trim().to_lowercase().as_str(), "y" | "yes")
}

fn print_draft(draft: &Draft) {
    println!("\n{}\n", draft.title);
    for paragraph in draft.paragraphs() {
        println!("{paragraph}\n");
    }
}

fn print_tale_card(tale: &Tale, excerpt_len: usize) {
    println!(
        "[{}] {} ({}, {}, {})",
        tale.id,
        tale.title,
        if tale.is_public { "public" } else { "private" },
        tale.child_age,
        tale.created_on()
    );
    println!("    {}", tale.excerpt(excerpt_len));
}

async fn run(command: Commands, ctx: AppContext, session: Arc<Session>) -> Result<(), TaleError> {
    match command {
        Commands::Signup {
            name,
            email,
            password,
        } => {
            let accounts = AccountController::new(ctx, session);
            let identity = accounts
                .register(RegisterRequest {
                    name,
                    email,
                    confirm_password: password.clone(),
                    password,
                })
                .await?;
            println!("export TALEWEAVER_TOKEN={}", identity.token);
        }
        Commands::Signin { email, password } => {
            let accounts = AccountController::new(ctx, session);
            let identity = accounts.sign_in(Credentials { email, password }).await?;
            println!("export TALEWEAVER_TOKEN={}", identity.token);
        }
        Commands::Create {
            topic,
            age,
            setting,
            characters,
            mood,
            public,
            save,
        } => {
            let generator = GenerationController::new(ctx);
            let request = GenerationRequest {
                child_age: Some(age),
                topic,
                setting,
                characters,
                mood,
                is_public: public,
            };

            let draft = generator.submit(request).await?;
            print_draft(&draft);

            if save || ask("Save this tale to your collection?") {
                if let Some(tale) = generator.save().await? {
                    println!("saved as {}", tale.id);
                }
            } else {
                generator.discard()?;
            }
        }
        Commands::Mine { filter } => {
            let collection = TaleCollection::new(ctx);
            collection.load().await?;
            collection.set_filter(filter);

            let counts = collection.counts();
            println!(
                "All Tales ({})  Public ({})  Private ({})",
                counts.all, counts.public, counts.private
            );
            if let Some(message) = collection.empty_message() {
                println!("{message}");
            }
            for tale in collection.visible() {
                print_tale_card(&tale, 150);
            }
        }
        Commands::Toggle { id } => {
            let collection = TaleCollection::new(ctx);
            collection.load().await?;
            collection.toggle_visibility(&id).await?;
        }
        Commands::Delete { id, yes } => {
            let collection = TaleCollection::new(ctx);
            collection.load().await?;
            let confirm = |prompt: &str| yes || ask(prompt);
            collection.delete(&id, &confirm).await?;
        }
        Commands::Explore { search, topic, age } => {
            let feed = PublicFeed::new(ctx);
            feed.load().await?;
            feed.apply_filters(FeedFilters { search, topic, age });

            let tales = feed.visible();
            if tales.is_empty() {
                println!("No tales found. Try adjusting your search or filters to find more stories");
            }
            for tale in tales {
                print_tale_card(&tale, 200);
                println!(
                    "    {} | {} {}",
                    tale.byline(),
                    if tale.is_liked { "♥" } else { "♡" },
                    tale.likes
                );
            }
        }
        Commands::Like { id } => {
            let feed = PublicFeed::new(ctx);
            feed.load().await?;
            let status = feed.like(&id).await?;
            println!("{} likes", status.likes);
        }
        Commands::Signout => {
            AccountController::new(ctx, session).sign_out();
            println!("unset TALEWEAVER_TOKEN");
        }
        Commands::Nav { at } => {
            for link in nav_links(session.is_authenticated()) {
                match link.action {
                    NavAction::Go(route) => {
                        let marker = if route.is_active(at.path()) { "*" } else { " " };
                        println!("{marker} {:<10} {}", link.label, route);
                    }
                    NavAction::SignOut => println!("  {:<10} taleweaver signout", link.label),
                }
            }
        }
    }

    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_target(false)
        .init();

    let cli = Cli::parse();

    let mut settings = Settings::new()?;
    if let Some(api_url) = cli.api_url.as_deref() {
        settings = settings.with_api_url(api_url).context("invalid --api-url")?;
    }

    let api = HttpTaleApi::new(&settings).context("failed to build HTTP client")?;
    let session = Arc::new(match settings.token.clone() {
        Some(token) => Session::with_identity(Identity::from_token(token)),
        None => Session::new(),
    });

    info!("using TaleWeaver API at {}", settings.api_url);

    let ctx = AppContext::new(
        Arc::new(api),
        session.clone(),
        Arc::new(TracingNotifier),
        Arc::new(CliNavigator),
    );

    match run(cli.command, ctx, session).await {
        Ok(()) => Ok(()),
        Err(e) if e.is_silent() => Ok(()),
        Err(e) => Err(e.into()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn nav_page_is_parsed_as_a_route() {
        let cli = Cli::try_parse_from(["taleweaver", "nav", "--at", "/dashboard"]).unwrap();
        assert!(matches!(
            cli.command,
            Commands::Nav {
                at: Route::Dashboard
            }
        ));

        let cli = Cli::try_parse_from(["taleweaver", "nav"]).unwrap();
        assert!(matches!(cli.command, Commands::Nav { at: Route::Home }));

        assert!(Cli::try_parse_from(["taleweaver", "nav", "--at", "/nowhere"]).is_err());
    }

    #[test]
    fn signout_is_a_command() {
        let cli = Cli::try_parse_from(["taleweaver", "signout"]).unwrap();
        assert!(matches!(cli.command, Commands::Signout));
    }
}
