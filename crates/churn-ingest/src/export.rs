//! CSV export of scored results.

use std::path::Path;

use churn_model::{ScoredAccount, format_numeric};
use tracing::info;

use crate::error::{IngestError, Result};

/// Write scored accounts as CSV.
///
/// Context columns (plan tier, industry, company size, seats, ARR) are only
/// emitted when at least one account carries them, mirroring the scoring
/// projection: absent input columns never materialize as empty output
/// columns. Drivers and actions are comma-joined into single cells.
pub fn write_scored_csv(path: &Path, accounts: &[ScoredAccount]) -> Result<()> {
    let mut writer = csv::Writer::from_path(path).map_err(|source| IngestError::Write {
        path: path.to_path_buf(),
        source,
    })?;

    let has_plan_tier = accounts.iter().any(|account| account.plan_tier.is_some());
    let has_industry = accounts.iter().any(|account| account.industry.is_some());
    let has_company_size = accounts.iter().any(|account| account.company_size.is_some());
    let has_seats = accounts.iter().any(|account| account.seats_current.is_some());
    let has_arr = accounts.iter().any(|account| account.arr_current.is_some());

    let mut header = vec!["account_id"];
    if has_plan_tier {
        header.push("plan_tier");
    }
    if has_industry {
        header.push("industry");
    }
    if has_company_size {
        header.push("company_size");
    }
    if has_seats {
        header.push("seats_current");
    }
    if has_arr {
        header.push("arr_current");
    }
    header.extend([
        "churn_probability",
        "risk_score",
        "risk_tier",
        "churn_timeline",
        "top_drivers",
        "recommended_actions",
    ]);
    writer
        .write_record(&header)
        .map_err(|source| IngestError::Write {
            path: path.to_path_buf(),
            source,
        })?;

    for account in accounts {
        let mut row: Vec<String> = vec![account.account_id.clone()];
        if has_plan_tier {
            row.push(account.plan_tier.clone().unwrap_or_default());
        }
        if has_industry {
            row.push(account.industry.clone().unwrap_or_default());
        }
        if has_company_size {
            row.push(account.company_size.clone().unwrap_or_default());
        }
        if has_seats {
            row.push(account.seats_current.map(format_numeric).unwrap_or_default());
        }
        if has_arr {
            row.push(account.arr_current.map(format_numeric).unwrap_or_default());
        }
        row.push(format!("{:.4}", account.churn_probability));
        row.push(account.risk_score.to_string());
        row.push(account.risk_tier.as_str().to_string());
        row.push(account.churn_timeline.as_str().to_string());
        row.push(account.top_drivers.join(", "));
        row.push(account.recommended_actions.join(", "));
        writer
            .write_record(&row)
            .map_err(|source| IngestError::Write {
                path: path.to_path_buf(),
                source,
            })?;
    }

    writer.flush().map_err(|source| IngestError::FileAccess {
        path: path.to_path_buf(),
        source,
    })?;
    info!(accounts = accounts.len(), path = %path.display(), "wrote scored table");
    Ok(())
}
