use serde::{Deserialize, Serialize};
use tabled::Tabled;

use super::{Entity, or_dash, yes_no};
use crate::query::{FilterDef, FilterKind, ListSchema, Sort};

pub const ROLES: &[&str] = &["ROLE_USER", "ROLE_ADMIN"];

/// URL values of the verification filter and what the endpoint expects.
pub const VERIFIED_OPTIONS: &[&str] = &["verified", "not-verified"];
const VERIFIED_WIRE: &[(&str, &str)] = &[("verified", "1"), ("not-verified", "0")];

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserDto {
    pub id: i64,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub surname: String,
    pub email: String,
    #[serde(default)]
    pub roles: Vec<String>,
    #[serde(default)]
    pub is_verified: bool,
    #[serde(default)]
    pub verified_at: Option<String>,
}

impl UserDto {
    pub fn full_name(&self) -> String {
        format!("{} {}", self.name, self.surname).trim().to_string()
    }
}

#[derive(Tabled)]
pub struct UserRow {
    #[tabled(rename = "ID")]
    id: i64,
    #[tabled(rename = "Name")]
    name: String,
    #[tabled(rename = "Email")]
    email: String,
    #[tabled(rename = "Roles")]
    roles: String,
    #[tabled(rename = "Verified")]
    verified: &'static str,
    #[tabled(rename = "Verified at")]
    verified_at: String,
}

impl Entity for UserDto {
    const PATH: &'static str = "users";
    type Row = UserRow;

    fn list_schema() -> ListSchema {
        ListSchema::new()
            .filter(
                FilterDef::new("verified", FilterKind::Enum(VERIFIED_OPTIONS))
                    .with_wire_key("isVerified")
                    .with_wire_values(VERIFIED_WIRE),
            )
            .filter(FilterDef::new("role", FilterKind::Enum(ROLES)))
            .sortable(&["createdAt", "verifiedAt"])
            .default_sort(Sort::desc("createdAt"))
    }

    fn id(&self) -> i64 {
        self.id
    }

    fn row(&self) -> UserRow {
        UserRow {
            id: self.id,
            name: or_dash(Some(&self.full_name())),
            email: self.email.clone(),
            roles: self.roles.join(", "),
            verified: yes_no(self.is_verified),
            verified_at: or_dash(self.verified_at.as_deref()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::query::{FilterValue, Query, SortDirection, decode, encode, request_params};

    #[test]
    fn test_default_sort_is_newest_first_and_not_encoded() {
        let schema = UserDto::list_schema();
        let query = schema.default_query();
        assert_eq!(query.sort, Some(Sort::desc("createdAt")));
        assert_eq!(encode(&query, &schema), "");

        let query = query.with_sort(Sort::asc("createdAt"));
        assert_eq!(encode(&query, &schema), "sortDir=asc");
        assert_eq!(schema.default_direction(), SortDirection::Desc);
    }

    #[test]
    fn test_wire_params() {
        let schema = UserDto::list_schema();
        let query = Query::default()
            .with_search(" ann ")
            .with_filter("verified", FilterValue::Enum("not-verified".into()))
            .with_filter("role", FilterValue::Enum("ROLE_ADMIN".into()))
            .with_sort(Sort::desc("createdAt"));
        let params = request_params(&query, &schema, 10);
        assert_eq!(params.get("search"), Some("ann"));
        assert_eq!(params.get("isVerified"), Some("0"));
        assert_eq!(params.get("role"), Some("ROLE_ADMIN"));
        assert_eq!(params.get("sortDir"), Some("desc"));
    }

    #[test]
    fn test_verified_filter_reads_console_urls() {
        let schema = UserDto::list_schema();
        let query = decode("?verified=not-verified&page=2", &schema);
        assert_eq!(
            query.filter("verified"),
            Some(&FilterValue::Enum("not-verified".into()))
        );
        assert_eq!(encode(&query, &schema), "page=2&verified=not-verified");

        let params = request_params(&query, &schema, 10);
        assert_eq!(params.get("isVerified"), Some("0"));
        assert_eq!(params.get("verified"), None);

        let query = decode("verified=Verified", &schema);
        assert_eq!(request_params(&query, &schema, 10).get("isVerified"), Some("1"));

        // Booleans were never written by the console.
        assert_eq!(decode("verified=true", &schema).filter("verified"), None);
    }

    #[test]
    fn test_row_joins_name_parts() {
        let user: UserDto = serde_json::from_str(
            r#"{"id": 1, "name": "Ann", "surname": "", "email": "ann@example.com", "roles": ["ROLE_ADMIN"]}"#,
        )
        .unwrap();
        let row = user.row();
        assert_eq!(row.name, "Ann");
        assert_eq!(row.verified_at, "-");
    }
}
