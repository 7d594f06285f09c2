use std::path::Path;

use anyhow::{Context, Result};
use serde::Serialize;
use tracing::info_span;

use pmatch_cli::workflow::{
    PersistOutcome, ReviewAction, StatusFilter, apply_decision, compute_matches, explain_pair,
    load_registries, persist_matches, review, search,
};
use pmatch_core::MatchEngine;
use pmatch_model::{MatchKey, MatchOptions};
use pmatch_store::{CsvDecisionStore, DecisionStore};

use crate::cli::{MatchArgs, OutputFormatArg, ReviewArgs, SearchArgs};
use crate::summary::{print_explanation, print_matches, print_missing};

pub fn run_match(data_dir: &Path, options: MatchOptions, args: &MatchArgs) -> Result<()> {
    let span = info_span!("match", data_dir = %data_dir.display());
    let _guard = span.enter();

    // A registry failure returns here, before the store is opened.
    let matches = compute_matches(data_dir, options)?;
    emit(matches.as_slice(), args.format, print_matches)?;

    if args.persist {
        let mut store = CsvDecisionStore::in_dir(data_dir);
        match persist_matches(&mut store, &matches, args.replace)? {
            PersistOutcome::Written { added } => {
                eprintln!("Saved {added} pending match(es) to {}", store.path().display());
            }
            PersistOutcome::StoreNotEmpty { undecided } => {
                eprintln!(
                    "{} already holds decisions; nothing saved, {undecided} match(es) \
                     have no decision (use --replace to start over)",
                    store.path().display()
                );
            }
        }
    }
    Ok(())
}

pub fn run_search(data_dir: &Path, options: MatchOptions, args: &SearchArgs) -> Result<()> {
    let registries = load_registries(data_dir)?;
    let engine = MatchEngine::new(&registries, options).context("configure matcher")?;
    let results = search(&engine, &args.query);
    emit(results.as_slice(), args.format, print_matches)
}

pub fn run_review(data_dir: &Path, options: MatchOptions, args: &ReviewArgs) -> Result<()> {
    let registries = load_registries(data_dir)?;
    let store = CsvDecisionStore::in_dir(data_dir);
    let list = review(&store, &registries, &options, StatusFilter::from(args.status))?;
    emit(list.matches.as_slice(), args.format, print_matches)?;
    print_missing(&list.missing);
    Ok(())
}

pub fn run_decision(data_dir: &Path, key: &MatchKey, action: ReviewAction) -> Result<()> {
    let mut store = CsvDecisionStore::in_dir(data_dir);
    apply_decision(&mut store, key, action)?;
    let verb = match action {
        ReviewAction::Approve => "Approved",
        ReviewAction::Deny => "Denied",
        ReviewAction::Reset => "Reset",
    };
    println!("{verb} {key}");
    Ok(())
}

pub fn run_clear(data_dir: &Path) -> Result<()> {
    let mut store = CsvDecisionStore::in_dir(data_dir);
    store.clear().context("clear decision store")?;
    println!("Cleared {}", store.path().display());
    Ok(())
}

pub fn run_explain(data_dir: &Path, options: MatchOptions, key: &MatchKey) -> Result<()> {
    let registries = load_registries(data_dir)?;
    let engine = MatchEngine::new(&registries, options).context("configure matcher")?;
    let (internal, external, explanation) = explain_pair(&engine, key)?;
    print_explanation(external, internal, &explanation);
    Ok(())
}

fn emit<T: Serialize + ?Sized>(
    value: &T,
    format: OutputFormatArg,
    print_table: impl FnOnce(&T),
) -> Result<()> {
    match format {
        OutputFormatArg::Table => print_table(value),
        OutputFormatArg::Json => {
            let json = serde_json::to_string_pretty(value).context("encode json output")?;
            println!("{json}");
        }
    }
    Ok(())
}
