use clap::{Args, Subcommand};
use serde_json::{json, Value};
use std::sync::Arc;

use invest_ideas_core::catalog::{CatalogService, IdeaPatch, JsonFileStore};

use crate::input;

#[derive(Args)]
pub struct StoreArgs {
    /// Catalogue file
    #[arg(
        long,
        env = "INVEST_IDEAS_STORE",
        default_value = "data/investments.json"
    )]
    pub store: String,
}

impl StoreArgs {
    fn service(&self) -> CatalogService<JsonFileStore> {
        CatalogService::new(Arc::new(JsonFileStore::new(&self.store)))
    }
}

#[derive(Subcommand)]
pub enum IdeasCommand {
    /// List categories and their ideas
    List(StoreArgs),
    /// Show one idea
    Show {
        /// Idea id
        idea: String,

        /// Restrict the lookup to this category
        #[arg(long)]
        category: Option<String>,

        #[command(flatten)]
        store: StoreArgs,
    },
    /// Overwrite fields of an idea; unspecified fields are kept
    Update(UpdateArgs),
    /// Replace the catalogue file with the built-in seed
    Reset(StoreArgs),
}

#[derive(Args)]
pub struct UpdateArgs {
    /// Category id
    pub category: String,

    /// Idea id
    pub idea: String,

    #[arg(long)]
    pub title: Option<String>,

    #[arg(long)]
    pub description: Option<String>,

    /// Display text for the investment, e.g. "€300.000"
    #[arg(long)]
    pub investment: Option<String>,

    /// Display text for the return, e.g. "3-5% (net)"
    #[arg(long)]
    pub annual_return: Option<String>,

    /// JSON or YAML patch file (overrides individual flags)
    #[arg(long)]
    pub input: Option<String>,

    #[command(flatten)]
    pub store: StoreArgs,
}

pub fn run_ideas(command: IdeasCommand) -> Result<Value, Box<dyn std::error::Error>> {
    match command {
        IdeasCommand::List(store) => {
            let categories = store.service().list_categories()?;
            let rows: Vec<Value> = categories
                .iter()
                .flat_map(|c| {
                    c.ideas.iter().map(move |i| {
                        json!({
                            "category": c.id,
                            "id": i.id,
                            "title": i.title,
                            "investment": i.investment,
                            "annual_return": i.annual_return,
                            "calculator": i.calculator,
                        })
                    })
                })
                .collect();
            Ok(Value::Array(rows))
        }
        IdeasCommand::Show {
            idea,
            category,
            store,
        } => {
            let service = store.service();
            let found = match category {
                Some(category) => service.find_idea(&category, &idea)?,
                None => service.locate_idea(&idea)?,
            };
            Ok(serde_json::to_value(found)?)
        }
        IdeasCommand::Update(args) => run_update(args),
        IdeasCommand::Reset(store) => {
            let seed = store.service().reset_to_seed()?;
            Ok(json!({
                "store": store.store,
                "categories": seed.len(),
                "ideas": seed.iter().map(|c| c.ideas.len()).sum::<usize>(),
            }))
        }
    }
}

fn run_update(args: UpdateArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let patch = match args.input.as_deref() {
        Some(path) => input::file::read_document::<IdeaPatch>(path)?,
        None => IdeaPatch {
            title: args.title,
            description: args.description,
            investment: args.investment,
            annual_return: args.annual_return,
            ..Default::default()
        },
    };
    if patch.is_empty() {
        return Err("nothing to update: pass at least one field or --input".into());
    }

    let updated = args
        .store
        .service()
        .update_idea(&args.category, &args.idea, patch)?;
    Ok(serde_json::to_value(updated)?)
}
