use serde::Deserialize;
use std::collections::BTreeMap;
use std::fmt;

use crate::lenient;

/// ImportOperation reports whether IMPORT created the table or updated an existing one
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ImportOperation {
    Created,
    Updated,
    #[default]
    Other,
}

impl ImportOperation {
    /// Match the service's `importOperation` value, ignoring case
    pub fn from_wire(value: &str) -> Self {
        let value = value.trim();
        if value.eq_ignore_ascii_case("created") {
            ImportOperation::Created
        } else if value.eq_ignore_ascii_case("updated") {
            ImportOperation::Updated
        } else {
            ImportOperation::Other
        }
    }
}

impl fmt::Display for ImportOperation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ImportOperation::Created => "created",
            ImportOperation::Updated => "updated",
            ImportOperation::Other => "other",
        };
        f.write_str(name)
    }
}

/// ImportResult summarizes a completed IMPORT call
#[derive(Debug, Clone, Deserialize)]
#[serde(from = "RawImportResult")]
pub struct ImportResult {
    import_type: String,
    total_column_count: u64,
    selected_column_count: u64,
    total_row_count: u64,
    success_row_count: u64,
    warning_row_count: u64,
    import_operation: ImportOperation,
    import_errors: serde_json::Value,
    column_details: BTreeMap<String, String>,
}

#[derive(Deserialize)]
struct RawImportResult {
    #[serde(rename = "importSummary")]
    summary: RawImportSummary,
    #[serde(rename = "importErrors", default)]
    import_errors: serde_json::Value,
    #[serde(rename = "columnDetails", default)]
    column_details: BTreeMap<String, serde_json::Value>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawImportSummary {
    #[serde(default, deserialize_with = "lenient::text")]
    import_type: String,
    #[serde(default, deserialize_with = "lenient::count")]
    total_column_count: u64,
    #[serde(default, deserialize_with = "lenient::count")]
    selected_column_count: u64,
    #[serde(default, deserialize_with = "lenient::count")]
    total_row_count: u64,
    #[serde(default, deserialize_with = "lenient::count")]
    success_row_count: u64,
    #[serde(default, deserialize_with = "lenient::count")]
    warnings: u64,
    #[serde(default, deserialize_with = "lenient::text")]
    import_operation: String,
}

impl From<RawImportResult> for ImportResult {
    fn from(raw: RawImportResult) -> Self {
        Self {
            import_type: raw.summary.import_type,
            total_column_count: raw.summary.total_column_count,
            selected_column_count: raw.summary.selected_column_count,
            total_row_count: raw.summary.total_row_count,
            success_row_count: raw.summary.success_row_count,
            warning_row_count: raw.summary.warnings,
            import_operation: ImportOperation::from_wire(&raw.summary.import_operation),
            import_errors: raw.import_errors,
            column_details: raw
                .column_details
                .into_iter()
                .map(|(column, data_type)| (column, lenient::value_as_string(&data_type)))
                .collect(),
        }
    }
}

impl ImportResult {
    pub fn import_type(&self) -> &str {
        &self.import_type
    }

    pub fn total_column_count(&self) -> u64 {
        self.total_column_count
    }

    pub fn selected_column_count(&self) -> u64 {
        self.selected_column_count
    }

    pub fn total_row_count(&self) -> u64 {
        self.total_row_count
    }

    pub fn success_row_count(&self) -> u64 {
        self.success_row_count
    }

    /// Rows imported with warnings
    pub fn warning_row_count(&self) -> u64 {
        self.warning_row_count
    }

    pub fn import_operation(&self) -> ImportOperation {
        self.import_operation
    }

    /// First 100 import errors, as reported by the service
    pub fn import_errors(&self) -> &serde_json::Value {
        &self.import_errors
    }

    /// Imported columns mapped to their data type
    pub fn column_details(&self) -> &BTreeMap<String, String> {
        &self.column_details
    }

    pub fn column_data_type(&self, column: &str) -> Option<&str> {
        self.column_details.get(column).map(String::as_str)
    }
}

impl fmt::Display for ImportResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Import result: importtype {} totalcolumncount {} selectedcolumncount {} \
             totalrowcount {} successrowcount {} rowwithwarningcount {} importoperation {}",
            self.import_type,
            self.total_column_count,
            self.selected_column_count,
            self.total_row_count,
            self.success_row_count,
            self.warning_row_count,
            self.import_operation
        )
    }
}

/// PlanInfo describes the account plan and its usage
#[derive(Debug, Clone, Deserialize)]
#[serde(from = "RawPlanInfo")]
pub struct PlanInfo {
    plan: String,
    addons: String,
    billing_date: String,
    rows_allowed: u64,
    rows_used: u64,
    trial_availed: bool,
    trial_plan: Option<String>,
    trial_status: Option<bool>,
    trial_end_date: Option<String>,
}

#[derive(Deserialize)]
struct RawPlanInfo {
    #[serde(default, deserialize_with = "lenient::text")]
    plan: String,
    #[serde(rename = "addon", default, deserialize_with = "lenient::text")]
    addons: String,
    #[serde(rename = "billingDate", default, deserialize_with = "lenient::text")]
    billing_date: String,
    #[serde(rename = "rowsAllowed", default, deserialize_with = "lenient::count")]
    rows_allowed: u64,
    #[serde(rename = "rowsUsed", default, deserialize_with = "lenient::count")]
    rows_used: u64,
    #[serde(rename = "TrialAvailed", default, deserialize_with = "lenient::unless_false")]
    trial_availed: bool,
    #[serde(rename = "TrialPlan", default)]
    trial_plan: serde_json::Value,
    #[serde(rename = "TrialStatus", default)]
    trial_status: serde_json::Value,
    #[serde(rename = "TrialEndDate", default)]
    trial_end_date: serde_json::Value,
}

impl From<RawPlanInfo> for PlanInfo {
    fn from(raw: RawPlanInfo) -> Self {
        // Trial keys are only meaningful (and only present) once a trial was taken
        let (trial_plan, trial_status, trial_end_date) = if raw.trial_availed {
            (
                Some(lenient::value_as_string(&raw.trial_plan)),
                Some(lenient::value_as_bool(&raw.trial_status).unwrap_or(false)),
                Some(lenient::value_as_string(&raw.trial_end_date)),
            )
        } else {
            (None, None, None)
        };

        Self {
            plan: raw.plan,
            addons: raw.addons,
            billing_date: raw.billing_date,
            rows_allowed: raw.rows_allowed,
            rows_used: raw.rows_used,
            trial_availed: raw.trial_availed,
            trial_plan,
            trial_status,
            trial_end_date,
        }
    }
}

impl PlanInfo {
    pub fn plan(&self) -> &str {
        &self.plan
    }

    pub fn addons(&self) -> &str {
        &self.addons
    }

    pub fn billing_date(&self) -> &str {
        &self.billing_date
    }

    pub fn rows_allowed(&self) -> u64 {
        self.rows_allowed
    }

    pub fn rows_used(&self) -> u64 {
        self.rows_used
    }

    pub fn is_trial_availed(&self) -> bool {
        self.trial_availed
    }

    pub fn trial_plan(&self) -> Option<&str> {
        self.trial_plan.as_deref()
    }

    pub fn trial_status(&self) -> Option<bool> {
        self.trial_status
    }

    pub fn trial_end_date(&self) -> Option<&str> {
        self.trial_end_date.as_deref()
    }
}
