//! `vitrine show|create|update|delete`.
//!
//! Create and update go through the same [`ValidatedFormController`] a
//! dialog uses: each `--set` is typed into its field and blurred, then the
//! form is submitted. Client-side errors stop the request; backend
//! validation errors come back redistributed onto the fields.

use std::sync::Arc;
use std::time::Instant;

use owo_colors::OwoColorize;
use serde_json::json;
use tabled::Table;
use tabled::settings::Style;

use super::{CommandOutput, api_client};
use crate::api::{EntityEndpoint, RestClient, RestResource};
use crate::cli::OutputOptions;
use crate::config::Config;
use crate::context::ConsoleContext;
use crate::entities::{
    CategoryDto, Editable, Entity, ProductDto, PromoCodeDto, Resource, SectionDto, UserDto,
};
use crate::error::{Result, VitrineError};
use crate::form::{
    FieldErrors, FormMode, GLOBAL_KEY, Rejection, SubmitResult, ValidatedFormController,
};

/// Dispatch `$call::<Dto>(args)` on an editable resource; users are rejected.
macro_rules! with_editable {
    ($resource:expr, $call:ident($($arg:expr),*)) => {
        match $resource {
            Resource::Sections => $call::<SectionDto>($($arg),*).await,
            Resource::Categories => $call::<CategoryDto>($($arg),*).await,
            Resource::Products => $call::<ProductDto>($($arg),*).await,
            Resource::PromoCodes => $call::<PromoCodeDto>($($arg),*).await,
            Resource::Users => Err(VitrineError::ReadOnlyResource(Resource::Users.to_string())),
        }
    };
}

struct Session {
    ctx: ConsoleContext,
    client: Arc<RestClient>,
}

impl Session {
    fn open() -> Result<Self> {
        let config = Config::load()?;
        Ok(Self {
            ctx: ConsoleContext::from_config(&config),
            client: api_client(&config)?,
        })
    }

    fn endpoint<T: Entity>(&self) -> RestResource<T> {
        self.client.resource::<T>(T::PATH)
    }
}

pub async fn cmd_show(resource: Resource, id: i64, output: OutputOptions) -> Result<()> {
    let session = Session::open()?;
    match resource {
        Resource::Sections => show::<SectionDto>(&session, id, output).await,
        Resource::Categories => show::<CategoryDto>(&session, id, output).await,
        Resource::Products => show::<ProductDto>(&session, id, output).await,
        Resource::PromoCodes => show::<PromoCodeDto>(&session, id, output).await,
        Resource::Users => show::<UserDto>(&session, id, output).await,
    }
}

pub async fn cmd_create(
    resource: Resource,
    fields: &[(String, String)],
    output: OutputOptions,
) -> Result<()> {
    ensure_editable(resource)?;
    let session = Session::open()?;
    with_editable!(resource, save(&session, None, fields, output))
}

pub async fn cmd_update(
    resource: Resource,
    id: i64,
    fields: &[(String, String)],
    output: OutputOptions,
) -> Result<()> {
    ensure_editable(resource)?;
    let session = Session::open()?;
    with_editable!(resource, save(&session, Some(id), fields, output))
}

pub async fn cmd_delete(resource: Resource, id: i64, output: OutputOptions) -> Result<()> {
    ensure_editable(resource)?;
    let session = Session::open()?;
    with_editable!(resource, delete(&session, id, output))
}

fn ensure_editable(resource: Resource) -> Result<()> {
    if resource.is_editable() {
        Ok(())
    } else {
        Err(VitrineError::ReadOnlyResource(resource.to_string()))
    }
}

async fn show<T: Entity>(session: &Session, id: i64, output: OutputOptions) -> Result<()> {
    // Reads need no payload type; `()` picks one.
    let entity = EntityEndpoint::<()>::fetch(&session.endpoint::<T>(), id).await?;
    let mut table = Table::new([entity.row()]);
    table.with(Style::rounded());

    CommandOutput::new(serde_json::to_value(&entity)?)
        .with_text(table.to_string())
        .print(output)
}

async fn save<T: Editable>(
    session: &Session,
    id: Option<i64>,
    fields: &[(String, String)],
    output: OutputOptions,
) -> Result<()> {
    let endpoint = session.endpoint::<T>();
    let (mode, initial) = match id {
        Some(id) => {
            let current = EntityEndpoint::<()>::fetch(&endpoint, id).await?;
            (FormMode::Edit(id), T::Form::from(&current))
        }
        None => (FormMode::Create, T::Form::default()),
    };

    let mut form = ValidatedFormController::<T::Form>::new(&session.ctx);
    form.open(mode, initial);
    let now = Instant::now();
    for (field, value) in fields {
        form.set_field_value(field, value.as_str(), now)?;
        form.blur_field(field)?;
    }

    match form.submit_to(&endpoint).await {
        SubmitResult::Saved(entity) => {
            form.close();
            let verb = if id.is_some() { "Updated" } else { "Created" };
            let text = format!("{} {} #{}", verb.green(), T::PATH, entity.id());
            CommandOutput::new(json!({"saved": true, "entity": entity}))
                .with_text(text)
                .print(output)
        }
        SubmitResult::Rejected(Rejection::Unchanged) => CommandOutput::new(json!({"saved": false}))
            .with_text("No changes to save.".dimmed().to_string())
            .print(output),
        _ => {
            let errors = form.errors().cloned().unwrap_or_default();
            if output.json {
                super::print_json(&json!({"saved": false, "errors": errors}))?;
            }
            Err(VitrineError::NotSaved {
                resource: T::PATH.to_string(),
                details: format_errors(&errors),
            })
        }
    }
}

async fn delete<T: Editable>(session: &Session, id: i64, output: OutputOptions) -> Result<()> {
    EntityEndpoint::<()>::delete(&session.endpoint::<T>(), id).await?;
    CommandOutput::new(json!({"deleted": true, "resource": T::PATH, "id": id}))
        .with_text(format!("{} {} #{id}", "Deleted".red(), T::PATH))
        .print(output)
}

/// One `field: message` line per message, global messages first.
fn format_errors(errors: &FieldErrors) -> String {
    let mut lines: Vec<String> = errors
        .global()
        .unwrap_or_default()
        .iter()
        .map(|message| format!("  {message}"))
        .collect();
    for (field, messages) in errors.iter().filter(|(field, _)| *field != GLOBAL_KEY) {
        lines.extend(messages.iter().map(|message| format!("  {field}: {message}")));
    }
    lines.join("\n")
}
