use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};
use tracing::{info, info_span, warn};

use churn_features::build_features;
use churn_ingest::{read_table, write_scored_csv};
use churn_map::{apply_mapping, coerce_bool_token, validate_and_coerce};
use churn_model::{Field, FieldMapping, RawTable, REQUIRED_FIELDS};
use churn_score::{ScoreOutcome, Scorer, TrainOptions, TrainReport, fit};

use crate::cli::{ScoreArgs, TrainArgs};
use crate::summary::{apply_table_style, header_cell};

pub struct ScoreRun {
    pub outcome: ScoreOutcome,
    /// Path the scored CSV was written to, when requested.
    pub written: Option<PathBuf>,
}

pub struct TrainRun {
    pub report: TrainReport,
    pub model_path: PathBuf,
}

pub fn run_score(args: &ScoreArgs) -> Result<ScoreRun> {
    let span = info_span!("score", upload = %args.upload.display());
    let _guard = span.enter();

    let table = read_table(&args.upload)
        .with_context(|| format!("read upload {}", args.upload.display()))?;
    let mapping = load_mapping(args.mapping.as_deref(), &table)?;
    let scorer = Scorer::from_path(&args.model)?;
    let outcome = scorer.score(&table, &mapping)?;

    let written = match &args.output {
        Some(path) => {
            write_scored_csv(path, &outcome.accounts)
                .with_context(|| format!("write scored table {}", path.display()))?;
            Some(path.clone())
        }
        None => None,
    };
    Ok(ScoreRun { outcome, written })
}

pub fn run_train(args: &TrainArgs) -> Result<TrainRun> {
    let span = info_span!("train", upload = %args.upload.display());
    let _guard = span.enter();

    let table = read_table(&args.upload)
        .with_context(|| format!("read upload {}", args.upload.display()))?;
    let mapping = load_mapping(args.mapping.as_deref(), &table)?;
    let mapped = apply_mapping(&table, &mapping);
    let schema = validate_and_coerce(&mapped, &REQUIRED_FIELDS);
    if !schema.missing_required.is_empty() {
        bail!(
            "missing required fields after mapping: {}",
            schema.missing_required.join(", ")
        );
    }
    for warning in &schema.warnings {
        warn!("{warning}");
    }
    if mapped.column_index(&args.label).is_none() {
        bail!(
            "label column '{}' not found in the upload; pass --label",
            args.label
        );
    }

    let labels: Vec<i64> = schema
        .rows
        .iter()
        .map(|row| row.extra(&args.label).map(coerce_bool_token).unwrap_or(0))
        .collect();
    let features = build_features(&schema.rows);

    let options = TrainOptions {
        learning_rate: args.learning_rate,
        epochs: args.epochs,
        ..TrainOptions::default()
    };
    let (artifact, report) = fit(&features, &labels, &options)?;
    artifact.save(&args.model_out)?;
    info!(path = %args.model_out.display(), "trained model written");
    Ok(TrainRun {
        report,
        model_path: args.model_out.clone(),
    })
}

pub fn run_fields() {
    let mut table = comfy_table::Table::new();
    table.set_header(vec![
        header_cell("Field"),
        header_cell("Label"),
        header_cell("Required"),
    ]);
    apply_table_style(&mut table);
    for field in Field::all() {
        table.add_row(vec![
            field.wire_name().to_string(),
            field.label().to_string(),
            if field.is_required() { "yes" } else { "" }.to_string(),
        ]);
    }
    println!("{table}");
}

fn load_mapping(path: Option<&Path>, table: &RawTable) -> Result<FieldMapping> {
    match path {
        Some(path) => {
            let contents = std::fs::read_to_string(path)
                .with_context(|| format!("read mapping {}", path.display()))?;
            let mapping: FieldMapping = serde_json::from_str(&contents)
                .with_context(|| format!("parse mapping {}", path.display()))?;
            for (field, column) in mapping.mapped_entries() {
                if table.column_index(column).is_none() {
                    warn!(field = %field, column, "mapped column absent from upload");
                }
            }
            Ok(mapping)
        }
        None => {
            let guessed = FieldMapping::guess(table);
            let matched: Vec<&str> = guessed
                .mapped_entries()
                .map(|(field, _)| field.wire_name())
                .collect();
            info!(fields = matched.len(), "guessed mapping from column names");
            if guessed.user_column(Field::AccountId).is_none() {
                bail!(
                    "could not guess a mapping for 'account_id'; pass --mapping with an explicit mapping file"
                );
            }
            Ok(guessed)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn guessed_mapping_requires_an_account_id_match() {
        let table = RawTable::new(vec!["cust".to_string(), "tier".to_string()]);
        assert!(load_mapping(None, &table).is_err());

        let canonical = RawTable::new(vec!["Account_ID".to_string()]);
        let mapping = load_mapping(None, &canonical).unwrap();
        assert_eq!(mapping.user_column(Field::AccountId), Some("Account_ID"));
    }

    #[test]
    fn mapping_file_round_trips_through_json() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("mapping.json");
        std::fs::write(&path, r#"{"account_id": "cust", "plan_tier": "tier"}"#).unwrap();
        let table = RawTable::new(vec!["cust".to_string(), "tier".to_string()]);
        let mapping = load_mapping(Some(&path), &table).unwrap();
        assert_eq!(mapping.user_column(Field::AccountId), Some("cust"));
        assert_eq!(mapping.user_column(Field::PlanTier), Some("tier"));
    }
}
