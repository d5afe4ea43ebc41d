//! Sharing details returned by GETSHAREINFO.
//!
//! The response carries four differently shaped sections (per user, per
//! group, public link, private link), each listing `perminfo` records per
//! view. They are flattened here into principal → permissions maps.

use serde::Deserialize;
use std::collections::BTreeMap;

use crate::lenient;

/// Permissions of one principal on one view
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PermissionInfo {
    view_name: String,
    shared_by: String,
    filter_criteria: Option<String>,
    permissions: BTreeMap<String, bool>,
}

impl PermissionInfo {
    pub fn view_name(&self) -> &str {
        &self.view_name
    }

    /// E-mail of the user who shared the view
    pub fn shared_by(&self) -> &str {
        &self.shared_by
    }

    pub fn filter_criteria(&self) -> Option<&str> {
        self.filter_criteria.as_deref()
    }

    /// Raw flag lookup; absent flags read as not granted
    pub fn has_permission(&self, name: &str) -> bool {
        self.permissions.get(name).copied().unwrap_or(false)
    }

    pub fn permissions(&self) -> &BTreeMap<String, bool> {
        &self.permissions
    }

    pub fn has_read_permission(&self) -> bool {
        self.has_permission("read")
    }

    pub fn has_export_permission(&self) -> bool {
        self.has_permission("export")
    }

    /// View underlying data
    pub fn has_vud_permission(&self) -> bool {
        self.has_permission("vud")
    }

    pub fn has_add_row_permission(&self) -> bool {
        self.has_permission("addrow")
    }

    pub fn has_update_row_permission(&self) -> bool {
        self.has_permission("updaterow")
    }

    pub fn has_delete_row_permission(&self) -> bool {
        self.has_permission("deleterow")
    }

    pub fn has_delete_all_rows_permission(&self) -> bool {
        self.has_permission("deleteallrows")
    }

    pub fn has_append_import_permission(&self) -> bool {
        self.has_permission("appendimport")
    }

    pub fn has_update_import_permission(&self) -> bool {
        self.has_permission("updateimport")
    }

    pub fn has_truncate_import_permission(&self) -> bool {
        self.has_permission("truncateimport")
    }

    pub fn has_delete_update_add_import_permission(&self) -> bool {
        self.has_permission("deleteupdateaddimport")
    }

    pub fn has_share_permission(&self) -> bool {
        self.has_permission("share")
    }
}

/// A group the database is shared with
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GroupDetails {
    pub name: String,
    pub description: String,
    pub members: Vec<String>,
}

pub type PermissionMap = BTreeMap<String, Vec<PermissionInfo>>;

/// ShareInfo lists who a database is shared with and how
#[derive(Debug, Clone, Deserialize)]
#[serde(from = "RawShareInfo")]
pub struct ShareInfo {
    shared_user_permissions: PermissionMap,
    group_permissions: PermissionMap,
    public_permissions: PermissionMap,
    private_link_permissions: PermissionMap,
    group_members: Vec<GroupDetails>,
    database_owners: Vec<String>,
}

impl ShareInfo {
    /// E-mails the database is shared with
    pub fn shared_users(&self) -> Vec<&str> {
        self.shared_user_permissions.keys().map(String::as_str).collect()
    }

    pub fn shared_user_permissions(&self) -> &PermissionMap {
        &self.shared_user_permissions
    }

    pub fn group_permissions(&self) -> &PermissionMap {
        &self.group_permissions
    }

    pub fn public_permissions(&self) -> &PermissionMap {
        &self.public_permissions
    }

    pub fn private_link_permissions(&self) -> &PermissionMap {
        &self.private_link_permissions
    }

    pub fn group_members(&self) -> &[GroupDetails] {
        &self.group_members
    }

    pub fn database_owners(&self) -> &[String] {
        &self.database_owners
    }
}

#[derive(Deserialize)]
struct RawShareInfo {
    #[serde(rename = "usershareinfo", default)]
    users: Vec<RawShareEntry>,
    #[serde(rename = "groupshareinfo", default)]
    groups: Vec<RawShareEntry>,
    #[serde(rename = "publicshareinfo", default)]
    public_link: RawLinkInfo,
    #[serde(rename = "privatelinkshareinfo", default)]
    private_link: RawLinkInfo,
    #[serde(rename = "dbownershareinfo", default)]
    owners: RawOwnerInfo,
}

#[derive(Deserialize)]
struct RawShareEntry {
    #[serde(rename = "shareinfo")]
    info: RawPrincipal,
}

#[derive(Deserialize)]
struct RawPrincipal {
    #[serde(default)]
    email: Option<String>,
    #[serde(rename = "groupName", default)]
    group_name: Option<String>,
    #[serde(default, deserialize_with = "lenient::text")]
    desc: String,
    #[serde(rename = "groupmembers", default)]
    group_members: Vec<String>,
    #[serde(default)]
    permissions: Vec<RawPermissionEntry>,
}

#[derive(Deserialize, Default)]
struct RawLinkInfo {
    #[serde(default)]
    email: Option<String>,
    #[serde(default)]
    permissions: Vec<RawPermissionEntry>,
}

#[derive(Deserialize, Default)]
struct RawOwnerInfo {
    #[serde(rename = "dbowners", default)]
    owners: Vec<String>,
}

#[derive(Deserialize)]
struct RawPermissionEntry {
    #[serde(rename = "perminfo")]
    info: RawPermission,
}

#[derive(Deserialize)]
struct RawPermission {
    #[serde(rename = "viewname", default, deserialize_with = "lenient::text")]
    view_name: String,
    #[serde(rename = "sharedby", default, deserialize_with = "lenient::text")]
    shared_by: String,
    #[serde(default, deserialize_with = "lenient::text_opt")]
    criteria: Option<String>,
    #[serde(default)]
    permission: BTreeMap<String, serde_json::Value>,
}

impl From<RawPermission> for PermissionInfo {
    fn from(raw: RawPermission) -> Self {
        Self {
            view_name: raw.view_name,
            shared_by: raw.shared_by,
            filter_criteria: raw.criteria.filter(|c| !c.is_empty()),
            permissions: raw
                .permission
                .into_iter()
                .map(|(name, value)| {
                    let granted = lenient::value_as_bool(&value).unwrap_or(false);
                    (name, granted)
                })
                .collect(),
        }
    }
}

fn collect_permissions(entries: Vec<RawPermissionEntry>) -> Vec<PermissionInfo> {
    entries.into_iter().map(|e| e.info.into()).collect()
}

fn add_principal(map: &mut PermissionMap, principal: String, entries: Vec<RawPermissionEntry>) {
    map.entry(principal)
        .or_default()
        .extend(collect_permissions(entries));
}

fn link_permissions(link: RawLinkInfo) -> PermissionMap {
    let mut map = PermissionMap::new();
    // A link section without an e-mail means the link is not shared
    if let Some(email) = link.email {
        add_principal(&mut map, email, link.permissions);
    }
    map
}

impl From<RawShareInfo> for ShareInfo {
    fn from(raw: RawShareInfo) -> Self {
        let mut shared_user_permissions = PermissionMap::new();
        for entry in raw.users {
            let email = entry.info.email.unwrap_or_default();
            add_principal(&mut shared_user_permissions, email, entry.info.permissions);
        }

        let mut group_permissions = PermissionMap::new();
        let mut group_members = Vec::with_capacity(raw.groups.len());
        for entry in raw.groups {
            let info = entry.info;
            let name = info.group_name.unwrap_or_default();
            group_members.push(GroupDetails {
                name: name.clone(),
                description: info.desc,
                members: info.group_members,
            });
            add_principal(&mut group_permissions, name, info.permissions);
        }

        Self {
            shared_user_permissions,
            group_permissions,
            public_permissions: link_permissions(raw.public_link),
            private_link_permissions: link_permissions(raw.private_link),
            group_members,
            database_owners: raw.owners.owners,
        }
    }
}
