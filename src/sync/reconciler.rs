//! Push/pull reconciliation between the ads table and the spreadsheet.
//!
//! Push is a full overwrite of the sheet from the database; any manual sheet
//! edits since the last pull are discarded. Pull walks the sheet row by row,
//! upserting by identifier, with one transaction per row: a failed row is
//! skipped and recorded, not fatal, so a crash mid-pull leaves earlier rows
//! committed and later rows unprocessed. There is no cross-invocation lock;
//! concurrent push and pull against the same sheet area race.

use metrics::counter;
use sea_orm::DatabaseConnection;
use serde::Serialize;
use thiserror::Error;
use tracing::{info, instrument, warn};
use utoipa::ToSchema;

use crate::error::RepositoryError;
use crate::models::ad::generate_ad_id;
use crate::repositories::{AdRepository, TenantRepository};
use crate::sheets::{SheetsClient, SheetsError, ValueRange};
use crate::sync::schema;

/// Errors fatal to a whole push or pull operation.
///
/// Per-row problems during pull (unknown tenant, malformed data) are not
/// errors; they surface as [`RowSkip`] records in the outcome.
#[derive(Debug, Error)]
pub enum SyncError {
    #[error(transparent)]
    Sheets(#[from] SheetsError),
    #[error("sheet is empty or missing data")]
    EmptySheet,
    #[error(transparent)]
    Repository(#[from] RepositoryError),
}

/// Result of a push operation.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct PushOutcome {
    /// Number of ad rows written (the header row is not counted).
    pub rows_written: usize,
    /// Header columns written, in order.
    pub headers: Vec<String>,
}

/// One pull row that was skipped, and why.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct RowSkip {
    /// 1-based sheet row number (row 1 is the header).
    pub row: usize,
    /// Human-readable reason.
    pub reason: String,
}

/// Result of a pull operation.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct PullOutcome {
    /// Rows that created a new ad.
    pub created: usize,
    /// Rows that updated an existing ad.
    pub updated: usize,
    /// Rows skipped, with reasons.
    pub skipped: Vec<RowSkip>,
    /// Column letters that received id write-backs (empty when the sheet has
    /// no `id` column or no ads were created).
    pub write_back_columns: Vec<String>,
}

/// Reconciler between the relational store and one spreadsheet range.
pub struct Reconciler<'a> {
    db: &'a DatabaseConnection,
    sheets: &'a SheetsClient,
    range: &'a str,
}

impl<'a> Reconciler<'a> {
    pub fn new(db: &'a DatabaseConnection, sheets: &'a SheetsClient, range: &'a str) -> Self {
        Self { db, sheets, range }
    }

    /// DB → sheet. Loads every ad (any tenant, any status) with its tenant
    /// domain and ordered gallery, flattens to rows, clears the sheet's data
    /// region, and writes header + rows from the first cell. The database is
    /// never mutated.
    #[instrument(skip(self))]
    pub async fn push(&self) -> Result<PushOutcome, SyncError> {
        let ads = AdRepository::new(self.db).list_with_images().await?;
        let domains = TenantRepository::new(self.db).id_to_domain_map().await?;

        let headers = schema::header_row();
        let mut values = Vec::with_capacity(ads.len() + 1);
        values.push(headers.clone());
        for (ad, images) in &ads {
            let domain = domains.get(&ad.tenant_id).map(String::as_str).unwrap_or("");
            values.push(schema::flatten_ad(ad, domain, images));
        }

        self.sheets.clear(self.range).await?;
        self.sheets
            .update(&format!("{}!A1", self.sheet_name()), &values)
            .await?;

        let rows_written = ads.len();
        counter!("sync_push_rows_written").increment(rows_written as u64);
        info!(rows_written, "Pushed ads to sheet");

        Ok(PushOutcome {
            rows_written,
            headers,
        })
    }

    /// Sheet → DB. Row 1 is the header; every later row is upserted by
    /// identifier, one transaction per row, then newly generated ids are
    /// batch-written back into the sheet's `id` column.
    #[instrument(skip(self))]
    pub async fn pull(&self) -> Result<PullOutcome, SyncError> {
        let rows = self.sheets.get_values(self.range).await?;
        if rows.len() < 2 {
            return Err(SyncError::EmptySheet);
        }

        let header = &rows[0];
        let id_column = header.iter().position(|name| name == "id");

        let tenants = TenantRepository::new(self.db).domain_map().await?;
        let ads = AdRepository::new(self.db);

        let mut outcome = PullOutcome {
            created: 0,
            updated: 0,
            skipped: Vec::new(),
            write_back_columns: Vec::new(),
        };
        let mut new_ids: Vec<(usize, String)> = Vec::new();

        for (index, cells) in rows[1..].iter().enumerate() {
            // Sheet rows are 1-based and row 1 is the header.
            let row_number = index + 2;
            let parsed = schema::parse_row(header, cells);

            if parsed.fields.business_name.is_empty() || parsed.tenant_domain.is_empty() {
                outcome.skipped.push(RowSkip {
                    row: row_number,
                    reason: "missing businessName or tenantDomain".to_string(),
                });
                continue;
            }

            let Some(&tenant_id) = tenants.get(&parsed.tenant_domain) else {
                warn!(
                    row = row_number,
                    business_name = %parsed.fields.business_name,
                    tenant_domain = %parsed.tenant_domain,
                    "Skipping row: unknown tenant domain"
                );
                outcome.skipped.push(RowSkip {
                    row: row_number,
                    reason: format!("unknown tenant domain '{}'", parsed.tenant_domain),
                });
                continue;
            };

            // Real generated ids are long; short or blank cells mean the row
            // was hand-entered in the sheet and needs a create.
            if parsed.id_cell.len() > 10 {
                let id = parsed.id_cell.clone();
                match ads
                    .update_with_images(&id, tenant_id, parsed.fields, &parsed.image_urls)
                    .await
                {
                    Ok(_) => outcome.updated += 1,
                    Err(err) => {
                        warn!(row = row_number, ad_id = %id, %err, "Skipping row: update failed");
                        outcome.skipped.push(RowSkip {
                            row: row_number,
                            reason: format!("update of ad {} failed: {}", id, err),
                        });
                    }
                }
            } else {
                let mut fields = parsed.fields;
                if fields.slug.is_empty() {
                    fields.slug = schema::generate_slug(&fields.business_name);
                }

                let id = generate_ad_id();
                match ads
                    .create_with_images(id.clone(), tenant_id, fields, &parsed.image_urls)
                    .await
                {
                    Ok(_) => {
                        outcome.created += 1;
                        new_ids.push((row_number, id));
                    }
                    Err(err) => {
                        warn!(row = row_number, %err, "Skipping row: create failed");
                        outcome.skipped.push(RowSkip {
                            row: row_number,
                            reason: format!("create failed: {}", err),
                        });
                    }
                }
            }
        }

        // Write generated ids back into the sheet so the next pull updates
        // instead of duplicating. Skipped when the sheet has no id column.
        if let Some(column_index) = id_column
            && !new_ids.is_empty()
        {
            let letter = schema::column_letter(column_index);
            let sheet_name = self.sheet_name();
            let data: Vec<ValueRange> = new_ids
                .iter()
                .map(|(row_number, id)| ValueRange {
                    range: format!("{}!{}{}", sheet_name, letter, row_number),
                    values: vec![vec![id.clone()]],
                })
                .collect();

            self.sheets.batch_update(&data).await?;
            outcome.write_back_columns.push(letter);
        }

        counter!("sync_pull_rows_created").increment(outcome.created as u64);
        counter!("sync_pull_rows_updated").increment(outcome.updated as u64);
        counter!("sync_pull_rows_skipped").increment(outcome.skipped.len() as u64);
        info!(
            created = outcome.created,
            updated = outcome.updated,
            skipped = outcome.skipped.len(),
            "Pull complete"
        );

        Ok(outcome)
    }

    /// The tab name of the configured range (`Sheet1!A2:Z` → `Sheet1`).
    fn sheet_name(&self) -> &str {
        self.range.split('!').next().unwrap_or(self.range)
    }
}
