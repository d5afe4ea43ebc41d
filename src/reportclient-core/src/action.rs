use std::fmt;

/// Action names understood by the reporting API (`ZOHO_ACTION`)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Action {
    AddRow,
    Delete,
    Update,
    Import,
    Export,
    CopyDatabase,
    DeleteDatabase,
    EnableDomainDb,
    DisableDomainDb,
    CreateTable,
    AutoGenReports,
    CreateSimilarViews,
    RenameView,
    CopyReports,
    CopyFormula,
    AddColumn,
    DeleteColumn,
    RenameColumn,
    HideColumn,
    ShowColumn,
    AddLookup,
    RemoveLookup,
    DatabaseMetadata,
    GetDatabaseName,
    IsDbExist,
    GetCopyDbKey,
    GetViewName,
    GetInfo,
    Share,
    RemoveShare,
    AddDbOwner,
    RemoveDbOwner,
    GetShareInfo,
    GetViewUrl,
    GetEmbedUrl,
    GetUsers,
    AddUser,
    RemoveUser,
    ActivateUser,
    DeactivateUser,
    GetUserPlanDetails,
}

impl Action {
    /// Wire name sent as `ZOHO_ACTION`
    pub fn as_str(&self) -> &'static str {
        match self {
            Action::AddRow => "ADDROW",
            Action::Delete => "DELETE",
            Action::Update => "UPDATE",
            Action::Import => "IMPORT",
            Action::Export => "EXPORT",
            Action::CopyDatabase => "COPYDATABASE",
            Action::DeleteDatabase => "DELETEDATABASE",
            Action::EnableDomainDb => "ENABLEDOMAINDB",
            Action::DisableDomainDb => "DISABLEDOMAINDB",
            Action::CreateTable => "CREATETABLE",
            Action::AutoGenReports => "AUTOGENREPORTS",
            Action::CreateSimilarViews => "CREATESIMILARVIEWS",
            Action::RenameView => "RENAMEVIEW",
            Action::CopyReports => "COPYREPORTS",
            Action::CopyFormula => "COPYFORMULA",
            Action::AddColumn => "ADDCOLUMN",
            Action::DeleteColumn => "DELETECOLUMN",
            Action::RenameColumn => "RENAMECOLUMN",
            Action::HideColumn => "HIDECOLUMN",
            Action::ShowColumn => "SHOWCOLUMN",
            Action::AddLookup => "ADDLOOKUP",
            Action::RemoveLookup => "REMOVELOOKUP",
            Action::DatabaseMetadata => "DATABASEMETADATA",
            Action::GetDatabaseName => "GETDATABASENAME",
            Action::IsDbExist => "ISDBEXIST",
            Action::GetCopyDbKey => "GETCOPYDBKEY",
            Action::GetViewName => "GETVIEWNAME",
            Action::GetInfo => "GETINFO",
            Action::Share => "SHARE",
            Action::RemoveShare => "REMOVESHARE",
            Action::AddDbOwner => "ADDDBOWNER",
            Action::RemoveDbOwner => "REMOVEDBOWNER",
            Action::GetShareInfo => "GETSHAREINFO",
            Action::GetViewUrl => "GETVIEWURL",
            Action::GetEmbedUrl => "GETEMBEDURL",
            Action::GetUsers => "GETUSERS",
            Action::AddUser => "ADDUSER",
            Action::RemoveUser => "REMOVEUSER",
            Action::ActivateUser => "ACTIVATEUSER",
            Action::DeactivateUser => "DEACTIVATEUSER",
            Action::GetUserPlanDetails => "GETUSERPLANDETAILS",
        }
    }

    /// IMPORT keeps empty-valued parameters since one of them carries file content
    pub fn keeps_empty_params(&self) -> bool {
        matches!(self, Action::Import)
    }

    /// EXPORT responses are handed back verbatim instead of being JSON-decoded
    pub fn returns_raw_body(&self) -> bool {
        matches!(self, Action::Export)
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Output format for EXPORT (`ZOHO_OUTPUT_FORMAT`)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ExportFormat {
    #[default]
    Csv,
    Json,
    Xml,
    Html,
    Pdf,
    Image,
}

impl ExportFormat {
    pub fn as_str(&self) -> &'static str {
        match self {
            ExportFormat::Csv => "CSV",
            ExportFormat::Json => "JSON",
            ExportFormat::Xml => "XML",
            ExportFormat::Html => "HTML",
            ExportFormat::Pdf => "PDF",
            ExportFormat::Image => "IMAGE",
        }
    }
}

impl std::str::FromStr for ExportFormat {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> anyhow::Result<Self> {
        match s.to_ascii_uppercase().as_str() {
            "CSV" => Ok(ExportFormat::Csv),
            "JSON" => Ok(ExportFormat::Json),
            "XML" => Ok(ExportFormat::Xml),
            "HTML" => Ok(ExportFormat::Html),
            "PDF" => Ok(ExportFormat::Pdf),
            "IMAGE" => Ok(ExportFormat::Image),
            other => anyhow::bail!("Unknown export format: {}", other),
        }
    }
}

/// How imported rows combine with existing data (`ZOHO_IMPORT_TYPE`)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImportType {
    Append,
    TruncateAdd,
    UpdateAdd,
}

impl ImportType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ImportType::Append => "APPEND",
            ImportType::TruncateAdd => "TRUNCATEADD",
            ImportType::UpdateAdd => "UPDATEADD",
        }
    }
}

impl std::str::FromStr for ImportType {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> anyhow::Result<Self> {
        match s.to_ascii_uppercase().as_str() {
            "APPEND" => Ok(ImportType::Append),
            "TRUNCATEADD" => Ok(ImportType::TruncateAdd),
            "UPDATEADD" => Ok(ImportType::UpdateAdd),
            other => anyhow::bail!("Unknown import type: {}", other),
        }
    }
}

/// Behaviour on a row that fails to import (`ZOHO_ON_IMPORT_ERROR`)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ImportErrorPolicy {
    #[default]
    Abort,
    SkipRow,
    SetColumnEmpty,
}

impl ImportErrorPolicy {
    pub fn as_str(&self) -> &'static str {
        match self {
            ImportErrorPolicy::Abort => "ABORT",
            ImportErrorPolicy::SkipRow => "SKIPROW",
            ImportErrorPolicy::SetColumnEmpty => "SETCOLUMNEMPTY",
        }
    }
}

/// Behaviour when a lookup value cannot be converted (`ZOHO_IFERRORONCONVERSION`)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LookupErrorPolicy {
    #[default]
    Abort,
    SetAsEmpty,
}

impl LookupErrorPolicy {
    pub fn as_str(&self) -> &'static str {
        match self {
            LookupErrorPolicy::Abort => "ABORT",
            LookupErrorPolicy::SetAsEmpty => "SETASEMPTY",
        }
    }
}
