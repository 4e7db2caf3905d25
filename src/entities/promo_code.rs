//! Promo codes.
//!
//! A code applies to everything or to one section, category or product. The
//! form keeps a target id for each scope so switching scope back and forth
//! does not lose a selection; the payload only sends the one that matches.
//!
//! Start and expiry are edited as local `YYYY-MM-DDTHH:MM` strings.

use jiff::Timestamp;
use jiff::civil::DateTime;
use jiff::tz::TimeZone;
use serde::{Deserialize, Serialize};
use tabled::Tabled;

use super::{Editable, Entity, check_description, de_decimal, or_dash, yes_no};
use crate::error::{Result, VitrineError};
use crate::form::rules::{self, Number};
use crate::form::{FieldErrors, FieldValue, FormModel, unknown_field};
use crate::query::{FilterDef, FilterKind, ListSchema};

pub const CODE_MIN_CHARS: usize = 2;
pub const CODE_MAX_CHARS: usize = 64;
pub const DATETIME_FORMAT: &str = "%Y-%m-%dT%H:%M";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PromoScope {
    #[default]
    All,
    Section,
    Category,
    Product,
}

enum_display_fromstr!(
    PromoScope,
    |s| VitrineError::InvalidFieldValue {
        field: "scopeType".to_string(),
        reason: format!("unknown scope '{s}', expected all, section, category or product"),
    },
    {
        All => "all",
        Section => "section",
        Category => "category",
        Product => "product",
    }
);

impl PromoScope {
    pub const NAMES: &'static [&'static str] = &["all", "section", "category", "product"];
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PromoTarget {
    pub id: i64,
    pub title: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PromoCodeDto {
    pub id: i64,
    pub code: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub scope_type: PromoScope,
    #[serde(default, deserialize_with = "de_decimal")]
    pub discount_percent: Option<String>,
    #[serde(default)]
    pub is_active: bool,
    #[serde(default)]
    pub starts_at: Option<String>,
    #[serde(default)]
    pub expires_at: Option<String>,
    #[serde(default)]
    pub section: Option<PromoTarget>,
    #[serde(default)]
    pub category: Option<PromoTarget>,
    #[serde(default)]
    pub product: Option<PromoTarget>,
}

impl PromoCodeDto {
    /// "All products", "Section: Garden", ...
    pub fn scope_label(&self) -> String {
        let (name, target) = match self.scope_type {
            PromoScope::All => return "All products".to_string(),
            PromoScope::Section => ("Section", &self.section),
            PromoScope::Category => ("Category", &self.category),
            PromoScope::Product => ("Product", &self.product),
        };
        match target {
            Some(target) => format!("{name}: {}", target.title),
            None => name.to_string(),
        }
    }
}

#[derive(Tabled)]
pub struct PromoCodeRow {
    #[tabled(rename = "ID")]
    id: i64,
    #[tabled(rename = "Code")]
    code: String,
    #[tabled(rename = "Scope")]
    scope: String,
    #[tabled(rename = "Discount %")]
    discount: String,
    #[tabled(rename = "Active")]
    active: &'static str,
    #[tabled(rename = "Starts")]
    starts: String,
    #[tabled(rename = "Expires")]
    expires: String,
}

impl Entity for PromoCodeDto {
    const PATH: &'static str = "promocodes";
    type Row = PromoCodeRow;

    fn list_schema() -> ListSchema {
        ListSchema::new()
            .filter(
                FilterDef::new("scope", FilterKind::Enum(PromoScope::NAMES))
                    .with_wire_key("scopeType"),
            )
            .filter(FilterDef::new("active", FilterKind::Bool).with_wire_key("isActive"))
            .filter(FilterDef::new("expired", FilterKind::Bool).with_wire_key("isExpired"))
            .sortable(&["code", "discountPercent", "expiresAt"])
    }

    fn id(&self) -> i64 {
        self.id
    }

    fn row(&self) -> PromoCodeRow {
        PromoCodeRow {
            id: self.id,
            code: self.code.clone(),
            scope: self.scope_label(),
            discount: or_dash(self.discount_percent.as_deref()),
            active: yes_no(self.is_active),
            starts: or_dash(to_local_input(self.starts_at.as_deref()).as_deref()),
            expires: or_dash(to_local_input(self.expires_at.as_deref()).as_deref()),
        }
    }
}

impl Editable for PromoCodeDto {
    type Form = PromoCodeForm;
}

/// API timestamp to the local `YYYY-MM-DDTHH:MM` the form edits. `None` for
/// missing or unreadable values.
pub fn to_local_input(value: Option<&str>) -> Option<String> {
    let value = value?.trim();
    let datetime = match value.parse::<Timestamp>() {
        Ok(ts) => ts.to_zoned(TimeZone::system()).datetime(),
        Err(_) => value.parse::<DateTime>().ok()?,
    };
    Some(datetime.strftime(DATETIME_FORMAT).to_string())
}

fn parse_input(value: &str) -> Option<DateTime> {
    DateTime::strptime(DATETIME_FORMAT, value.trim()).ok()
}

#[derive(Debug, Clone, PartialEq)]
pub struct PromoCodeForm {
    pub code: String,
    pub description: String,
    pub scope_type: Option<PromoScope>,
    pub discount_percent: String,
    pub section_id: Option<i64>,
    pub category_id: Option<i64>,
    pub product_id: Option<i64>,
    pub starts_at: String,
    pub expires_at: String,
    pub is_active: bool,
}

impl Default for PromoCodeForm {
    fn default() -> Self {
        Self {
            code: String::new(),
            description: String::new(),
            scope_type: Some(PromoScope::All),
            discount_percent: String::new(),
            section_id: None,
            category_id: None,
            product_id: None,
            starts_at: String::new(),
            expires_at: String::new(),
            is_active: true,
        }
    }
}

impl From<&PromoCodeDto> for PromoCodeForm {
    fn from(dto: &PromoCodeDto) -> Self {
        Self {
            code: dto.code.clone(),
            description: dto.description.clone().unwrap_or_default(),
            scope_type: Some(dto.scope_type),
            discount_percent: dto.discount_percent.clone().unwrap_or_default(),
            section_id: dto.section.as_ref().map(|t| t.id),
            category_id: dto.category.as_ref().map(|t| t.id),
            product_id: dto.product.as_ref().map(|t| t.id),
            starts_at: to_local_input(dto.starts_at.as_deref()).unwrap_or_default(),
            expires_at: to_local_input(dto.expires_at.as_deref()).unwrap_or_default(),
            is_active: dto.is_active,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PromoCodePayload {
    pub code: String,
    pub description: Option<String>,
    pub scope_type: Option<PromoScope>,
    pub discount_percent: f64,
    pub section_id: Option<i64>,
    pub category_id: Option<i64>,
    pub product_id: Option<i64>,
    pub is_active: bool,
    pub starts_at: Option<String>,
    pub expires_at: Option<String>,
}

impl PromoCodeForm {
    fn check_dates(&self, errors: &mut FieldErrors) {
        let mut parsed = [None, None];
        for (slot, (field, label, raw)) in parsed.iter_mut().zip([
            ("startsAt", "Starts at", &self.starts_at),
            ("expiresAt", "Expires at", &self.expires_at),
        ]) {
            if rules::is_blank(raw) {
                continue;
            }
            *slot = parse_input(raw);
            if slot.is_none() {
                errors.push(
                    field,
                    format!("{label} must be a date and time (YYYY-MM-DDTHH:MM)."),
                );
            }
        }

        if let [Some(start), Some(end)] = parsed
            && end < start
        {
            errors.push("expiresAt", "Expires at must be after or equal to Starts at.");
        }
    }
}

impl FormModel for PromoCodeForm {
    type Payload = PromoCodePayload;
    const FIELDS: &'static [&'static str] = &[
        "code",
        "description",
        "scopeType",
        "discountPercent",
        "sectionId",
        "categoryId",
        "productId",
        "startsAt",
        "expiresAt",
        "isActive",
    ];

    fn set_field(&mut self, field: &str, value: FieldValue) -> Result<()> {
        match field {
            "code" => self.code = value.into_text(field)?,
            "description" => self.description = value.into_text(field)?,
            "scopeType" => {
                let raw = value.into_text(field)?;
                self.scope_type = if rules::is_blank(&raw) {
                    None
                } else {
                    Some(raw.parse()?)
                };
            }
            "discountPercent" => self.discount_percent = value.into_text(field)?,
            "sectionId" => self.section_id = value.into_id(field)?,
            "categoryId" => self.category_id = value.into_id(field)?,
            "productId" => self.product_id = value.into_id(field)?,
            "startsAt" => self.starts_at = value.into_text(field)?,
            "expiresAt" => self.expires_at = value.into_text(field)?,
            "isActive" => self.is_active = value.into_bool(field)?,
            _ => return Err(unknown_field(field)),
        }
        Ok(())
    }

    fn validate(&self) -> FieldErrors {
        let mut errors = FieldErrors::new();

        let code = self.code.trim();
        if code.is_empty() {
            errors.push("code", "Code is required.");
        } else if rules::char_len(code) < CODE_MIN_CHARS {
            errors.push(
                "code",
                format!("Code must be at least {CODE_MIN_CHARS} characters long."),
            );
        } else if rules::char_len(code) > CODE_MAX_CHARS {
            errors.push(
                "code",
                format!("Code must not be longer than {CODE_MAX_CHARS} characters."),
            );
        }

        check_description(&mut errors, &self.description);

        match rules::number(&self.discount_percent) {
            Number::Missing => errors.push("discountPercent", "Discount percent is required."),
            Number::Invalid => errors.push("discountPercent", "Discount percent must be a number."),
            Number::Value(percent) if !(0.0..=100.0).contains(&percent) => {
                errors.push("discountPercent", "Discount percent must be between 0 and 100.");
            }
            Number::Value(_) => {}
        }

        let missing_target = match self.scope_type {
            None => Some("Scope type is required."),
            Some(PromoScope::All) => None,
            Some(PromoScope::Section) => self
                .section_id
                .is_none()
                .then_some("Section is required for this scope."),
            Some(PromoScope::Category) => self
                .category_id
                .is_none()
                .then_some("Category is required for this scope."),
            Some(PromoScope::Product) => self
                .product_id
                .is_none()
                .then_some("Product is required for this scope."),
        };
        if let Some(message) = missing_target {
            errors.push("scopeType", message);
        }

        self.check_dates(&mut errors);
        errors
    }

    fn to_payload(&self) -> PromoCodePayload {
        let scope = self.scope_type;
        let keep = |wanted: PromoScope, id: Option<i64>| if scope == Some(wanted) { id } else { None };

        PromoCodePayload {
            code: self.code.trim().to_string(),
            description: rules::non_blank(&self.description),
            scope_type: scope,
            discount_percent: rules::parse_decimal(&self.discount_percent).unwrap_or_default(),
            section_id: keep(PromoScope::Section, self.section_id),
            category_id: keep(PromoScope::Category, self.category_id),
            product_id: keep(PromoScope::Product, self.product_id),
            is_active: self.is_active,
            starts_at: rules::non_blank(&self.starts_at),
            expires_at: rules::non_blank(&self.expires_at),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn spring() -> PromoCodeForm {
        PromoCodeForm {
            code: "SPRING".into(),
            discount_percent: "15".into(),
            ..PromoCodeForm::default()
        }
    }

    #[test]
    fn test_valid_code() {
        assert!(spring().validate().is_empty());
    }

    #[test]
    fn test_code_length() {
        let mut form = spring();
        form.code = "A".into();
        assert_eq!(
            form.validate().first("code"),
            Some("Code must be at least 2 characters long.")
        );
        form.code = "X".repeat(65);
        assert_eq!(
            form.validate().first("code"),
            Some("Code must not be longer than 64 characters.")
        );
    }

    #[test]
    fn test_discount_range() {
        let mut form = spring();
        form.discount_percent = "100,5".into();
        assert_eq!(
            form.validate().first("discountPercent"),
            Some("Discount percent must be between 0 and 100.")
        );
        form.discount_percent = "100".into();
        assert!(form.validate().is_empty());
    }

    #[test]
    fn test_scope_needs_its_target() {
        let mut form = spring();
        form.set_field("scopeType", "category".into()).unwrap();
        assert_eq!(
            form.validate().first("scopeType"),
            Some("Category is required for this scope.")
        );
        form.set_field("categoryId", FieldValue::from(7_i64)).unwrap();
        assert!(form.validate().is_empty());

        form.set_field("scopeType", "".into()).unwrap();
        assert_eq!(form.validate().first("scopeType"), Some("Scope type is required."));
        assert!(form.set_field("scopeType", "brand".into()).is_err());
    }

    #[test]
    fn test_payload_clears_targets_outside_scope() {
        let mut form = spring();
        form.scope_type = Some(PromoScope::Product);
        form.section_id = Some(1);
        form.category_id = Some(2);
        form.product_id = Some(3);
        form.starts_at = "2025-03-01T09:00".into();

        assert_eq!(
            serde_json::to_value(form.to_payload()).unwrap(),
            json!({
                "code": "SPRING",
                "description": null,
                "scopeType": "product",
                "discountPercent": 15.0,
                "sectionId": null,
                "categoryId": null,
                "productId": 3,
                "isActive": true,
                "startsAt": "2025-03-01T09:00",
                "expiresAt": null
            })
        );
    }

    #[test]
    fn test_expiry_not_before_start() {
        let mut form = spring();
        form.starts_at = "2025-03-10T12:00".into();
        form.expires_at = "2025-03-10T11:59".into();
        assert_eq!(
            form.validate().first("expiresAt"),
            Some("Expires at must be after or equal to Starts at.")
        );

        form.expires_at = "2025-03-10T12:00".into();
        assert!(form.validate().is_empty());

        form.starts_at = "next tuesday".into();
        assert_eq!(
            form.validate().first("startsAt"),
            Some("Starts at must be a date and time (YYYY-MM-DDTHH:MM).")
        );
    }

    #[test]
    fn test_local_input_from_plain_datetime() {
        assert_eq!(
            to_local_input(Some("2025-06-01T08:30:00")).as_deref(),
            Some("2025-06-01T08:30")
        );
        assert_eq!(to_local_input(Some("garbage")), None);
        assert_eq!(to_local_input(None), None);
    }

    #[test]
    fn test_dto_scope_label_and_form() {
        let dto: PromoCodeDto = serde_json::from_value(json!({
            "id": 5,
            "code": "GARDEN10",
            "scopeType": "section",
            "discountPercent": "10.00",
            "isActive": true,
            "section": {"id": 2, "title": "Garden"},
            "category": null,
            "product": null
        }))
        .unwrap();
        assert_eq!(dto.scope_label(), "Section: Garden");

        let form = PromoCodeForm::from(&dto);
        assert_eq!(form.section_id, Some(2));
        assert_eq!(form.discount_percent, "10.00");
        assert!(form.validate().is_empty());
    }

    #[test]
    fn test_scope_filter_accepts_known_scopes_only() {
        let schema = PromoCodeDto::list_schema();
        let query = crate::query::decode("scope=Category&expired=1", &schema);
        assert_eq!(
            query.filter("scope"),
            Some(&crate::query::FilterValue::Enum("category".into()))
        );
        assert_eq!(
            query.filter("expired"),
            Some(&crate::query::FilterValue::Bool(true))
        );
        assert_eq!(crate::query::decode("scope=brand", &schema).filter("scope"), None);
    }
}
