use serde::{Deserialize, Serialize};
use tabled::Tabled;

use super::{Editable, Entity, check_description, check_title, or_dash, yes_no};
use crate::error::Result;
use crate::form::{FieldErrors, FieldValue, FormModel, rules, unknown_field};
use crate::query::{FilterDef, FilterKind, ListSchema, Sort};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CategoryDto {
    pub id: i64,
    pub title: String,
    #[serde(default)]
    pub slug: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub is_active: bool,
    #[serde(default)]
    pub section_id: Option<i64>,
    #[serde(default)]
    pub created_at: Option<String>,
    #[serde(default)]
    pub updated_at: Option<String>,
    #[serde(default)]
    pub products_count: u32,
}

#[derive(Tabled)]
pub struct CategoryRow {
    #[tabled(rename = "ID")]
    id: i64,
    #[tabled(rename = "Title")]
    title: String,
    #[tabled(rename = "Section")]
    section: String,
    #[tabled(rename = "Active")]
    active: &'static str,
    #[tabled(rename = "Products")]
    products: u32,
}

impl Entity for CategoryDto {
    const PATH: &'static str = "categories";
    type Row = CategoryRow;

    fn list_schema() -> ListSchema {
        ListSchema::new()
            .filter(FilterDef::new("sectionId", FilterKind::Integer))
            .sortable(&["title", "createdAt"])
            .default_sort(Sort::asc("title"))
    }

    fn id(&self) -> i64 {
        self.id
    }

    fn row(&self) -> CategoryRow {
        CategoryRow {
            id: self.id,
            title: self.title.clone(),
            section: or_dash(self.section_id.map(|id| format!("#{id}")).as_deref()),
            active: yes_no(self.is_active),
            products: self.products_count,
        }
    }
}

impl Editable for CategoryDto {
    type Form = CategoryForm;
}

#[derive(Debug, Clone, PartialEq)]
pub struct CategoryForm {
    pub title: String,
    pub description: String,
    pub section_id: Option<i64>,
    pub is_active: bool,
}

impl Default for CategoryForm {
    fn default() -> Self {
        Self {
            title: String::new(),
            description: String::new(),
            section_id: None,
            is_active: true,
        }
    }
}

impl From<&CategoryDto> for CategoryForm {
    fn from(dto: &CategoryDto) -> Self {
        Self {
            title: dto.title.clone(),
            description: dto.description.clone().unwrap_or_default(),
            section_id: dto.section_id,
            is_active: dto.is_active,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CategoryPayload {
    pub title: String,
    pub section_id: Option<i64>,
    pub description: Option<String>,
    pub is_active: bool,
}

impl FormModel for CategoryForm {
    type Payload = CategoryPayload;
    const FIELDS: &'static [&'static str] = &["title", "description", "sectionId", "isActive"];

    fn set_field(&mut self, field: &str, value: FieldValue) -> Result<()> {
        match field {
            "title" => self.title = value.into_text(field)?,
            "description" => self.description = value.into_text(field)?,
            "sectionId" => self.section_id = value.into_id(field)?,
            "isActive" => self.is_active = value.into_bool(field)?,
            _ => return Err(unknown_field(field)),
        }
        Ok(())
    }

    fn validate(&self) -> FieldErrors {
        let mut errors = FieldErrors::new();
        check_title(&mut errors, &self.title);
        check_description(&mut errors, &self.description);
        if self.section_id.is_none() {
            errors.push("sectionId", "Section is required.");
        }
        errors
    }

    fn to_payload(&self) -> CategoryPayload {
        CategoryPayload {
            title: self.title.trim().to_string(),
            section_id: self.section_id,
            description: rules::non_blank(&self.description),
            is_active: self.is_active,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::query::{FilterValue, decode};

    #[test]
    fn test_section_is_required() {
        let mut form = CategoryForm {
            title: "Chairs".into(),
            ..CategoryForm::default()
        };
        assert_eq!(form.validate().first("sectionId"), Some("Section is required."));

        form.set_field("sectionId", "2".into()).unwrap();
        assert!(form.validate().is_empty());
        assert_eq!(form.to_payload().section_id, Some(2));

        form.set_field("sectionId", "".into()).unwrap();
        assert_eq!(form.section_id, None);
    }

    #[test]
    fn test_section_filter_decodes_from_url() {
        let schema = CategoryDto::list_schema();
        let query = decode("?sectionId=4&sectionId=9", &schema);
        assert_eq!(query.filter("sectionId"), Some(&FilterValue::Integer(4)));

        let query = decode("sectionId=four", &schema);
        assert_eq!(query.filter("sectionId"), None);
    }

    #[test]
    fn test_row_shows_section_reference() {
        let dto: CategoryDto = serde_json::from_str(
            r#"{"id": 8, "title": "Lamps", "sectionId": 2, "isActive": false, "productsCount": 3}"#,
        )
        .unwrap();
        let row = dto.row();
        assert_eq!(row.section, "#2");
        assert_eq!(row.active, "no");
    }
}
