use clap::{Args as ClapArgs, Parser, Subcommand};
use std::path::PathBuf;

use crate::app::Action;
use crate::export::ExportFormat;
use crate::model::{ModelId, OutputKind, ProfileField};

#[derive(Parser, Debug)]
#[command(
    name = "mobius_prime",
    version,
    about = "AI marketing teammate: personas, playbooks and content calendars from a business profile"
)]
pub struct Args {
    /// TOML config file (defaults to <config dir>/mobius_prime/config.toml when present)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Gemini API key; held in memory only
    #[arg(long, env = "GEMINI_API_KEY", hide_env_values = true, global = true)]
    pub api_key: Option<String>,

    #[arg(long, value_enum, global = true)]
    pub model: Option<ModelId>,

    /// Overrides where history is stored
    #[arg(long, global = true)]
    pub data_dir: Option<PathBuf>,

    #[arg(long, default_value_t = false, global = true)]
    pub debug: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Generate personas, a playbook or a content calendar
    Generate(GenerateArgs),
    /// Chat with MobiusPrime about your strategy
    Chat(ChatArgs),
    /// Browse saved generations
    History {
        #[command(subcommand)]
        action: HistoryCommand,
    },
    /// Write a saved generation to a .txt or .md file
    Export(ExportArgs),
}

#[derive(ClapArgs, Debug, Default)]
pub struct GenerateArgs {
    #[arg(long)]
    pub business_name: Option<String>,
    #[arg(long)]
    pub industry: Option<String>,
    #[arg(long)]
    pub products: Option<String>,
    #[arg(long)]
    pub target_audience: Option<String>,
    #[arg(long)]
    pub pain_points: Option<String>,
    #[arg(long)]
    pub goals: Option<String>,
    #[arg(long)]
    pub competitors: Option<String>,
    #[arg(long)]
    pub usp: Option<String>,
    #[arg(long)]
    pub marketing_details: Option<String>,

    #[arg(long, value_enum)]
    pub output: Option<OutputKind>,

    /// Let the AI answer these fields (repeatable)
    #[arg(long, value_enum)]
    pub infer: Vec<ProfileField>,

    /// Fill the form on stdin
    #[arg(long, default_value_t = false)]
    pub interactive: bool,

    /// Also write the result to a file
    #[arg(long, value_enum)]
    pub export: Option<ExportFormat>,

    #[arg(long)]
    pub export_dir: Option<PathBuf>,
}

impl GenerateArgs {
    fn field_values(&self) -> [(ProfileField, &Option<String>); 9] {
        [
            (ProfileField::BusinessName, &self.business_name),
            (ProfileField::Industry, &self.industry),
            (ProfileField::Products, &self.products),
            (ProfileField::TargetAudience, &self.target_audience),
            (ProfileField::PainPoints, &self.pain_points),
            (ProfileField::Goals, &self.goals),
            (ProfileField::Competitors, &self.competitors),
            (ProfileField::Usp, &self.usp),
            (ProfileField::MarketingDetails, &self.marketing_details),
        ]
    }

    /// Form edits implied by the flags; `--infer` wins over a value.
    pub fn profile_actions(&self) -> Vec<Action> {
        let mut actions: Vec<Action> = self
            .field_values()
            .into_iter()
            .filter_map(|(f, v)| v.as_ref().map(|v| Action::SetField(f, v.clone())))
            .collect();
        actions.extend(self.infer.iter().map(|f| Action::UseAiToAnswer(*f)));
        if let Some(kind) = self.output {
            actions.push(Action::SelectOutput(kind));
        }
        actions
    }
}

#[derive(ClapArgs, Debug)]
pub struct ChatArgs {
    /// Send one message and exit instead of starting a conversation
    #[arg(long)]
    pub message: Option<String>,
}

#[derive(Subcommand, Debug)]
pub enum HistoryCommand {
    List,
    Show { id: String },
    /// Delete every saved generation
    Clear {
        #[arg(long, default_value_t = false)]
        yes: bool,
    },
}

#[derive(ClapArgs, Debug)]
pub struct ExportArgs {
    pub id: String,
    #[arg(long, value_enum, default_value_t = ExportFormat::Md)]
    pub format: ExportFormat,
    #[arg(long)]
    pub dir: Option<PathBuf>,
}
