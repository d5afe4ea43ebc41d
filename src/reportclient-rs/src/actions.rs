//! One method per API action.
//!
//! Every method takes the resource URI it acts on (see
//! [`ReportClient::user_uri`], [`ReportClient::db_uri`],
//! [`ReportClient::table_uri`]) and an optional map of extra parameters the
//! service accepts. Explicit arguments are applied on top of that map.

use serde::Deserialize;
use serde_json::{Map, Value};
use std::path::Path;

use crate::client::{FileUpload, ReportClient};
use crate::{Action, ClientError, Result};
use reportclient_core::{
    keys, ActionRequest, ExportFormat, ImportErrorPolicy, ImportResult, ImportType,
    LookupErrorPolicy, Params, PlanInfo, ShareInfo,
};

#[derive(Deserialize)]
struct AddedRow {
    column_order: Vec<String>,
    rows: Vec<Vec<Value>>,
}

fn flag(value: bool) -> &'static str {
    if value {
        "true"
    } else {
        "false"
    }
}

fn import_request(
    import_type: ImportType,
    auto_identify: bool,
    on_error: ImportErrorPolicy,
    config: Option<&Params>,
) -> ActionRequest {
    ActionRequest::new(Action::Import, config)
        .param(keys::IMPORT_TYPE, import_type.as_str())
        .param(keys::AUTO_IDENTIFY, flag(auto_identify))
        .param(keys::ON_IMPORT_ERROR, on_error.as_str())
        .param_default(keys::CREATE_TABLE, "false")
        .strip_empty()
}

impl ReportClient {
    // ---- Data ----

    /// Add a single row; returns the stored row as column name → value
    pub async fn add_row(
        &self,
        table_uri: &str,
        columns: &Params,
        config: Option<&Params>,
    ) -> Result<Map<String, Value>> {
        let request = ActionRequest::new(Action::AddRow, config).params_from(columns);
        let added: AddedRow = self.fetch_json(table_uri, request, &[]).await?;

        let row = added.rows.into_iter().next().unwrap_or_default();
        Ok(added.column_order.into_iter().zip(row).collect())
    }

    /// Delete the rows matching `criteria` (all rows when `None`)
    pub async fn delete_data(
        &self,
        table_uri: &str,
        criteria: Option<&str>,
        config: Option<&Params>,
    ) -> Result<()> {
        let request =
            ActionRequest::new(Action::Delete, config).param_opt(keys::CRITERIA, criteria);
        self.fetch_unit(table_uri, request).await
    }

    /// Set `columns` on the rows matching `criteria`
    pub async fn update_data(
        &self,
        table_uri: &str,
        columns: &Params,
        criteria: Option<&str>,
        config: Option<&Params>,
    ) -> Result<()> {
        let request = ActionRequest::new(Action::Update, config)
            .params_from(columns)
            .param_opt(keys::CRITERIA, criteria);
        self.fetch_unit(table_uri, request).await
    }

    /// Import a CSV or JSON file
    pub async fn import_data(
        &self,
        table_uri: &str,
        import_type: ImportType,
        file: impl AsRef<Path>,
        auto_identify: bool,
        on_error: ImportErrorPolicy,
        config: Option<&Params>,
    ) -> Result<ImportResult> {
        let path = file.as_ref();
        let data = tokio::fs::read(path)
            .await
            .map_err(|e| ClientError::Transport {
                message: format!("{}: {}", path.display(), e),
                action: Action::Import,
                status: None,
            })?;
        let file_name = path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| "import".to_string());

        let request = import_request(import_type, auto_identify, on_error, config);
        let upload = FileUpload { file_name, data };
        self.upload_json(table_uri, request, upload, &[]).await
    }

    /// Import CSV or JSON content passed inline; empty content is still sent
    pub async fn import_data_as_string(
        &self,
        table_uri: &str,
        import_type: ImportType,
        import_data: &str,
        auto_identify: bool,
        on_error: ImportErrorPolicy,
        config: Option<&Params>,
    ) -> Result<ImportResult> {
        let request = import_request(import_type, auto_identify, on_error, config)
            .param(keys::IMPORT_DATA, import_data);
        self.fetch_json(table_uri, request, &[]).await
    }

    /// Export a view; the payload is returned exactly as received
    pub async fn export_data(
        &self,
        table_uri: &str,
        format: ExportFormat,
        criteria: Option<&str>,
        config: Option<&Params>,
    ) -> Result<Vec<u8>> {
        let request = ActionRequest::new(Action::Export, config)
            .output_format(format.as_str())
            .param_opt(keys::CRITERIA, criteria);
        self.fetch_raw(table_uri, request).await
    }

    /// Export the result of an SQL SELECT query
    pub async fn export_data_using_sql(
        &self,
        uri: &str,
        format: ExportFormat,
        sql_query: &str,
        config: Option<&Params>,
    ) -> Result<Vec<u8>> {
        let request = ActionRequest::new(Action::Export, config)
            .output_format(format.as_str())
            .param(keys::SQL_QUERY, sql_query);
        self.fetch_raw(uri, request).await
    }

    // ---- Databases ----

    /// Copy a database; returns the id of the new database
    pub async fn copy_database(
        &self,
        db_uri: &str,
        db_key: &str,
        new_db_name: &str,
        config: Option<&Params>,
    ) -> Result<String> {
        let request = ActionRequest::new(Action::CopyDatabase, config)
            .param(keys::DATABASE_NAME, new_db_name)
            .param(keys::COPY_DB_KEY, db_key);
        self.fetch_text(db_uri, request, "dbid").await
    }

    pub async fn delete_database(
        &self,
        user_uri: &str,
        db_name: &str,
        config: Option<&Params>,
    ) -> Result<()> {
        let request =
            ActionRequest::new(Action::DeleteDatabase, config).param(keys::DATABASE_NAME, db_name);
        self.fetch_unit(user_uri, request).await
    }

    /// Make a database available under a white-labelled domain
    pub async fn enable_domain_db(
        &self,
        user_uri: &str,
        db_name: &str,
        domain_name: &str,
        config: Option<&Params>,
    ) -> Result<Value> {
        let request = ActionRequest::new(Action::EnableDomainDb, config)
            .param(keys::DOMAIN_DB_NAME, db_name)
            .param(keys::DOMAIN_NAME, domain_name);
        self.fetch_json(user_uri, request, &[]).await
    }

    pub async fn disable_domain_db(
        &self,
        user_uri: &str,
        db_name: &str,
        domain_name: &str,
        config: Option<&Params>,
    ) -> Result<Value> {
        let request = ActionRequest::new(Action::DisableDomainDb, config)
            .param(keys::DOMAIN_DB_NAME, db_name)
            .param(keys::DOMAIN_NAME, domain_name);
        self.fetch_json(user_uri, request, &[]).await
    }

    /// Create a table from a JSON table design
    pub async fn create_table(
        &self,
        db_uri: &str,
        table_design: &str,
        config: Option<&Params>,
    ) -> Result<()> {
        let request =
            ActionRequest::new(Action::CreateTable, config).param(keys::TABLE_DESIGN, table_design);
        self.fetch_unit(db_uri, request).await
    }

    /// Generate reports for a table or column (`source` is TABLE or COLUMN)
    pub async fn auto_gen_reports(
        &self,
        table_uri: &str,
        source: &str,
        config: Option<&Params>,
    ) -> Result<Value> {
        let request = ActionRequest::new(Action::AutoGenReports, config).param(keys::SOURCE, source);
        self.fetch_json(table_uri, request, &[]).await
    }

    /// Create views for this table modelled on the views of `ref_view`
    pub async fn create_similar_views(
        &self,
        table_uri: &str,
        ref_view: &str,
        folder_name: &str,
        copy_custom_formula: bool,
        copy_agg_formula: bool,
        config: Option<&Params>,
    ) -> Result<Value> {
        let request = ActionRequest::new(Action::CreateSimilarViews, config)
            .param(keys::REF_VIEW, ref_view)
            .param(keys::FOLDER_NAME, folder_name)
            .param(keys::COPY_CUSTOM_FORMULA, flag(copy_custom_formula))
            .param(keys::COPY_AGG_FORMULA, flag(copy_agg_formula));
        self.fetch_json(table_uri, request, &[]).await
    }

    pub async fn rename_view(
        &self,
        db_uri: &str,
        view_name: &str,
        new_view_name: &str,
        new_view_desc: Option<&str>,
        config: Option<&Params>,
    ) -> Result<()> {
        let request = ActionRequest::new(Action::RenameView, config)
            .param(keys::VIEW_NAME, view_name)
            .param(keys::NEW_VIEW_NAME, new_view_name)
            .param_opt(keys::NEW_VIEW_DESC, new_view_desc);
        self.fetch_unit(db_uri, request).await
    }

    /// Copy views into another database identified by `db_name` and its copy key
    pub async fn copy_reports(
        &self,
        db_uri: &str,
        views: &[&str],
        db_name: &str,
        db_key: &str,
        config: Option<&Params>,
    ) -> Result<()> {
        let request = ActionRequest::new(Action::CopyReports, config)
            .param(keys::VIEW_TO_COPY, views.join(","))
            .param(keys::DATABASE_NAME, db_name)
            .param(keys::COPY_DB_KEY, db_key);
        self.fetch_unit(db_uri, request).await
    }

    pub async fn copy_formula(
        &self,
        table_uri: &str,
        formulas: &[&str],
        db_name: &str,
        db_key: &str,
        config: Option<&Params>,
    ) -> Result<()> {
        let request = ActionRequest::new(Action::CopyFormula, config)
            .param(keys::FORMULA_TO_COPY, formulas.join(","))
            .param(keys::DATABASE_NAME, db_name)
            .param(keys::COPY_DB_KEY, db_key);
        self.fetch_unit(table_uri, request).await
    }

    // ---- Columns ----

    pub async fn add_column(
        &self,
        table_uri: &str,
        column_name: &str,
        data_type: &str,
        config: Option<&Params>,
    ) -> Result<()> {
        let request = ActionRequest::new(Action::AddColumn, config)
            .param(keys::COLUMN_NAME, column_name)
            .param(keys::DATA_TYPE, data_type);
        self.fetch_unit(table_uri, request).await
    }

    pub async fn delete_column(
        &self,
        table_uri: &str,
        column_name: &str,
        config: Option<&Params>,
    ) -> Result<()> {
        let request =
            ActionRequest::new(Action::DeleteColumn, config).param(keys::COLUMN_NAME, column_name);
        self.fetch_unit(table_uri, request).await
    }

    pub async fn rename_column(
        &self,
        table_uri: &str,
        old_column_name: &str,
        new_column_name: &str,
        config: Option<&Params>,
    ) -> Result<()> {
        let request = ActionRequest::new(Action::RenameColumn, config)
            .param(keys::OLD_COLUMN_NAME, old_column_name)
            .param(keys::NEW_COLUMN_NAME, new_column_name);
        self.fetch_unit(table_uri, request).await
    }

    /// Hide columns; names travel as repeated `ZOHO_COLUMNNAME` URL parameters
    pub async fn hide_column(
        &self,
        table_uri: &str,
        column_names: &[&str],
        config: Option<&Params>,
    ) -> Result<Value> {
        let request = ActionRequest::new(Action::HideColumn, config)
            .url_list(keys::COLUMN_NAME, column_names.iter().copied());
        self.fetch_json(table_uri, request, &[]).await
    }

    pub async fn show_column(
        &self,
        table_uri: &str,
        column_names: &[&str],
        config: Option<&Params>,
    ) -> Result<Value> {
        let request = ActionRequest::new(Action::ShowColumn, config)
            .url_list(keys::COLUMN_NAME, column_names.iter().copied());
        self.fetch_json(table_uri, request, &[]).await
    }

    /// Turn `column_name` into a lookup of `referred_table.referred_column`
    pub async fn add_lookup(
        &self,
        table_uri: &str,
        column_name: &str,
        referred_table: &str,
        referred_column: &str,
        on_error: LookupErrorPolicy,
        config: Option<&Params>,
    ) -> Result<()> {
        let request = ActionRequest::new(Action::AddLookup, config)
            .param(keys::COLUMN_NAME, column_name)
            .param(keys::REFERRED_TABLE, referred_table)
            .param(keys::REFERRED_COLUMN, referred_column)
            .param(keys::IF_ERROR_ON_CONVERSION, on_error.as_str());
        self.fetch_unit(table_uri, request).await
    }

    pub async fn remove_lookup(
        &self,
        table_uri: &str,
        column_name: &str,
        config: Option<&Params>,
    ) -> Result<()> {
        let request =
            ActionRequest::new(Action::RemoveLookup, config).param(keys::COLUMN_NAME, column_name);
        self.fetch_unit(table_uri, request).await
    }

    // ---- Metadata ----

    /// Catalog metadata; `metadata` is e.g. ZOHO_CATALOG_LIST or ZOHO_DATATYPES
    pub async fn get_database_metadata(
        &self,
        user_uri: &str,
        metadata: &str,
        config: Option<&Params>,
    ) -> Result<Value> {
        let request =
            ActionRequest::new(Action::DatabaseMetadata, config).param(keys::METADATA, metadata);
        self.fetch_json(user_uri, request, &[]).await
    }

    pub async fn get_database_name(
        &self,
        user_uri: &str,
        db_id: &str,
        config: Option<&Params>,
    ) -> Result<String> {
        let request = ActionRequest::new(Action::GetDatabaseName, config).param(keys::DB_ID, db_id);
        self.fetch_text(user_uri, request, "dbname").await
    }

    pub async fn is_db_exist(
        &self,
        user_uri: &str,
        db_name: &str,
        config: Option<&Params>,
    ) -> Result<bool> {
        let request = ActionRequest::new(Action::IsDbExist, config).param(keys::DB_NAME, db_name);
        self.fetch_flag(user_uri, request, "isdbexist").await
    }

    /// Key needed to copy this database or its reports
    pub async fn get_copy_db_key(&self, db_uri: &str, config: Option<&Params>) -> Result<String> {
        let request = ActionRequest::new(Action::GetCopyDbKey, config);
        self.fetch_text(db_uri, request, "copydbkey").await
    }

    pub async fn get_view_name(
        &self,
        user_uri: &str,
        obj_id: &str,
        config: Option<&Params>,
    ) -> Result<String> {
        let request = ActionRequest::new(Action::GetViewName, config).param(keys::OBJ_ID, obj_id);
        self.fetch_text(user_uri, request, "viewname").await
    }

    /// View id and database id of a view
    pub async fn get_info(&self, table_uri: &str, config: Option<&Params>) -> Result<Value> {
        let request = ActionRequest::new(Action::GetInfo, config);
        self.fetch_json(table_uri, request, &[]).await
    }

    // ---- Sharing ----

    pub async fn share_view(
        &self,
        db_uri: &str,
        emails: &[&str],
        views: &[&str],
        criteria: Option<&str>,
        config: Option<&Params>,
    ) -> Result<()> {
        let request = ActionRequest::new(Action::Share, config)
            .param(keys::EMAILS, emails.join(","))
            .param(keys::VIEWS, views.join(","))
            .param_opt(keys::CRITERIA, criteria);
        self.fetch_unit(db_uri, request).await
    }

    pub async fn remove_share(
        &self,
        db_uri: &str,
        emails: &[&str],
        config: Option<&Params>,
    ) -> Result<()> {
        let request =
            ActionRequest::new(Action::RemoveShare, config).param(keys::EMAILS, emails.join(","));
        self.fetch_unit(db_uri, request).await
    }

    pub async fn add_db_owner(
        &self,
        db_uri: &str,
        emails: &[&str],
        config: Option<&Params>,
    ) -> Result<()> {
        let request =
            ActionRequest::new(Action::AddDbOwner, config).param(keys::EMAILS, emails.join(","));
        self.fetch_unit(db_uri, request).await
    }

    pub async fn remove_db_owner(
        &self,
        db_uri: &str,
        emails: &[&str],
        config: Option<&Params>,
    ) -> Result<()> {
        let request =
            ActionRequest::new(Action::RemoveDbOwner, config).param(keys::EMAILS, emails.join(","));
        self.fetch_unit(db_uri, request).await
    }

    pub async fn get_share_info(&self, db_uri: &str, config: Option<&Params>) -> Result<ShareInfo> {
        let request = ActionRequest::new(Action::GetShareInfo, config);
        self.fetch_json(db_uri, request, &[]).await
    }

    pub async fn get_view_url(&self, table_uri: &str, config: Option<&Params>) -> Result<String> {
        let request = ActionRequest::new(Action::GetViewUrl, config);
        self.fetch_text(table_uri, request, "viewurl").await
    }

    /// Embeddable URL of a view, optionally restricted by `criteria`
    pub async fn get_embed_url(
        &self,
        table_uri: &str,
        criteria: Option<&str>,
        config: Option<&Params>,
    ) -> Result<String> {
        let request =
            ActionRequest::new(Action::GetEmbedUrl, config).param_opt(keys::CRITERIA, criteria);
        self.fetch_text(table_uri, request, "embedUrl").await
    }

    // ---- Users ----

    pub async fn get_users(&self, user_uri: &str, config: Option<&Params>) -> Result<Value> {
        let request = ActionRequest::new(Action::GetUsers, config);
        self.fetch_json(user_uri, request, &[]).await
    }

    pub async fn add_user(
        &self,
        user_uri: &str,
        emails: &[&str],
        config: Option<&Params>,
    ) -> Result<()> {
        let request =
            ActionRequest::new(Action::AddUser, config).param(keys::EMAILS, emails.join(","));
        self.fetch_unit(user_uri, request).await
    }

    pub async fn remove_user(
        &self,
        user_uri: &str,
        emails: &[&str],
        config: Option<&Params>,
    ) -> Result<()> {
        let request =
            ActionRequest::new(Action::RemoveUser, config).param(keys::EMAILS, emails.join(","));
        self.fetch_unit(user_uri, request).await
    }

    pub async fn activate_user(
        &self,
        user_uri: &str,
        emails: &[&str],
        config: Option<&Params>,
    ) -> Result<()> {
        let request =
            ActionRequest::new(Action::ActivateUser, config).param(keys::EMAILS, emails.join(","));
        self.fetch_unit(user_uri, request).await
    }

    pub async fn deactivate_user(
        &self,
        user_uri: &str,
        emails: &[&str],
        config: Option<&Params>,
    ) -> Result<()> {
        let request = ActionRequest::new(Action::DeactivateUser, config)
            .param(keys::EMAILS, emails.join(","));
        self.fetch_unit(user_uri, request).await
    }

    /// Plan and usage details of the account
    pub async fn get_plan_info(&self, user_uri: &str, config: Option<&Params>) -> Result<PlanInfo> {
        let request = ActionRequest::new(Action::GetUserPlanDetails, config);
        self.fetch_json(user_uri, request, &[]).await
    }
}
