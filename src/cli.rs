use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};
use clap_complete::Shell;

use crate::types::Id;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    #[default]
    Table,
    Json,
    Compact,
}

#[derive(Parser)]
#[command(name = "catalog")]
#[command(about = "Admin console for the portfolio catalog API", version)]
#[command(after_help = "EXAMPLES:
    catalog login -u admin                    Log in and store tokens
    catalog projects                          List projects by priority
    catalog project view 3                    Show a project with its relations
    catalog project create -t \"Blog\" --new-technology Rust
    catalog project delete 3                  Delete a project (asks first)")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Output format (table, json, compact)
    #[arg(long, short = 'o', global = true, value_enum, default_value = "table")]
    pub format: OutputFormat,

    /// Output as JSON (alias for --format json)
    #[arg(long, global = true, hide = true)]
    pub json: bool,

    /// Suppress success messages
    #[arg(long, short, global = true)]
    pub quiet: bool,

    /// Show debug logs and detailed error information
    #[arg(long, short, global = true)]
    pub verbose: bool,
}

impl Cli {
    /// Get the effective output format, considering --json flag
    pub fn output_format(&self) -> OutputFormat {
        if self.json {
            OutputFormat::Json
        } else {
            self.format
        }
    }
}

#[derive(Subcommand)]
pub enum Commands {
    /// Log in with username and password
    #[command(after_help = "EXAMPLES:
    catalog login -u admin
    CATALOG_PASSWORD=secret catalog login -u admin")]
    Login(LoginArgs),
    /// Forget stored tokens
    Logout,
    /// Manage projects
    #[command(
        alias = "p",
        after_help = "EXAMPLES:
    catalog project list
    catalog project view 3
    catalog project create -t \"Blog\" --technology 1 --new-technology Rust
    catalog project edit 3 --remove-screenshot 12 --upload ./home.png
    catalog project delete 3 --yes"
    )]
    Project {
        #[command(subcommand)]
        action: ProjectCommands,
    },
    /// List projects (alias for 'project list')
    Projects,
    /// List technologies
    #[command(alias = "t")]
    Technologies,
    /// List categories
    #[command(alias = "c")]
    Categories,
    /// List screenshots
    Screenshots,
    /// Generate shell completions
    #[command(after_help = "EXAMPLES:
    catalog completions bash > ~/.bash_completion.d/catalog
    catalog completions zsh > ~/.zfunc/_catalog")]
    Completions {
        /// Shell to generate completions for
        shell: Shell,
    },
    /// Initialize configuration file interactively
    Init,
}

#[derive(Subcommand)]
pub enum ProjectCommands {
    /// List projects ordered by priority
    List,
    /// Show a project with its technologies, categories and screenshots
    View {
        /// Project ID
        id: Id,
    },
    /// Create a new project
    Create(ProjectCreateArgs),
    /// Edit an existing project
    Edit(ProjectEditArgs),
    /// Delete a project
    Delete {
        /// Project ID
        id: Id,

        /// Skip the confirmation prompt
        #[arg(long, short)]
        yes: bool,
    },
}

#[derive(Args)]
pub struct LoginArgs {
    /// Username
    #[arg(long, short, env = "CATALOG_USERNAME")]
    pub username: Option<String>,

    /// Password (prompted for when omitted)
    #[arg(long, short, env = "CATALOG_PASSWORD", hide_env_values = true)]
    pub password: Option<String>,
}

#[derive(Args)]
pub struct ProjectCreateArgs {
    /// Project title
    #[arg(long, short)]
    pub title: String,

    /// Project description
    #[arg(long, short)]
    pub description: Option<String>,

    /// Live preview URL
    #[arg(long)]
    pub live_preview: Option<String>,

    /// Source code URL
    #[arg(long)]
    pub source_code: Option<String>,

    /// Priority order (lower is shown first)
    #[arg(long)]
    pub priority_order: Option<i64>,

    /// Existing technology ID (repeatable)
    #[arg(long = "technology")]
    pub technologies: Vec<Id>,

    /// Technology to create by name (repeatable)
    #[arg(long = "new-technology")]
    pub new_technologies: Vec<String>,

    /// Category ID (repeatable)
    #[arg(long = "category")]
    pub categories: Vec<Id>,

    /// Image file to upload as a screenshot (repeatable)
    #[arg(long = "screenshot")]
    pub screenshots: Vec<PathBuf>,
}

#[derive(Args)]
pub struct ProjectEditArgs {
    /// Project ID
    pub id: Id,

    /// New title
    #[arg(long, short)]
    pub title: Option<String>,

    /// New description
    #[arg(long, short)]
    pub description: Option<String>,

    /// New live preview URL
    #[arg(long)]
    pub live_preview: Option<String>,

    /// New source code URL
    #[arg(long)]
    pub source_code: Option<String>,

    /// New priority order
    #[arg(long)]
    pub priority_order: Option<i64>,

    /// Associate an existing technology (repeatable)
    #[arg(long)]
    pub add_technology: Vec<Id>,

    /// Drop a technology association (repeatable)
    #[arg(long)]
    pub remove_technology: Vec<Id>,

    /// Create a technology by name and associate it (repeatable)
    #[arg(long = "new-technology")]
    pub new_technologies: Vec<String>,

    /// Associate a category (repeatable)
    #[arg(long)]
    pub add_category: Vec<Id>,

    /// Drop a category association (repeatable)
    #[arg(long)]
    pub remove_category: Vec<Id>,

    /// Upload an image as a new screenshot (repeatable)
    #[arg(long)]
    pub upload: Vec<PathBuf>,

    /// Delete a screenshot from the project (repeatable)
    #[arg(long)]
    pub remove_screenshot: Vec<Id>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn command_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn json_flag_overrides_format() {
        let cli = Cli::parse_from(["catalog", "--json", "projects"]);
        assert_eq!(cli.output_format(), OutputFormat::Json);
    }

    #[test]
    fn parses_repeated_associations() {
        let cli = Cli::parse_from([
            "catalog",
            "project",
            "create",
            "-t",
            "Blog",
            "--technology",
            "1",
            "--technology",
            "abc",
            "--new-technology",
            "Go",
            "--new-technology",
            "Rust",
        ]);

        let Commands::Project {
            action: ProjectCommands::Create(args),
        } = cli.command
        else {
            panic!("expected project create");
        };
        assert_eq!(args.technologies, vec![Id::Int(1), Id::from("abc")]);
        assert_eq!(args.new_technologies, vec!["Go", "Rust"]);
    }

    #[test]
    fn parses_edit_flags() {
        let cli = Cli::parse_from([
            "catalog",
            "project",
            "edit",
            "7",
            "--remove-screenshot",
            "2",
            "--upload",
            "home.png",
        ]);

        let Commands::Project {
            action: ProjectCommands::Edit(args),
        } = cli.command
        else {
            panic!("expected project edit");
        };
        assert_eq!(args.id, Id::Int(7));
        assert_eq!(args.remove_screenshot, vec![Id::Int(2)]);
        assert_eq!(args.upload, vec![PathBuf::from("home.png")]);
    }
}
