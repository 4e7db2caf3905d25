//! `vitrine list`: one page of a resource list.
//!
//! The options are fed to a [`ListQueryController`] as if a user had made
//! them on the list page, in order: filters, sort, search, page. Each change
//! supersedes the load issued by the previous one, so only the last request
//! is sent.

use std::sync::Arc;
use std::time::Instant;

use owo_colors::OwoColorize;
use serde_json::json;
use tabled::Table;
use tabled::settings::Style;
use tracing::debug;

use super::url::display_query;
use super::{CommandOutput, api_client};
use crate::api::{ListEndpoint, RestClient};
use crate::cli::OutputOptions;
use crate::config::Config;
use crate::context::ConsoleContext;
use crate::entities::{
    CategoryDto, Entity, ProductDto, PromoCodeDto, Resource, SectionDto, UserDto,
};
use crate::error::Result;
use crate::list::{ListQueryController, LoadRequest, MemoryLocation};
use crate::query::SortSpec;

#[derive(Debug, Clone, Default)]
pub struct ListOptions {
    pub search: Option<String>,
    pub filters: Vec<(String, String)>,
    pub sort: Option<SortSpec>,
    pub page: Option<u32>,
    pub url: Option<String>,
}

pub async fn cmd_list(resource: Resource, options: ListOptions, output: OutputOptions) -> Result<()> {
    let config = Config::load()?;
    let ctx = ConsoleContext::from_config(&config);
    let client = api_client(&config)?;

    match resource {
        Resource::Sections => list_page::<SectionDto>(&ctx, &client, options, output).await,
        Resource::Categories => list_page::<CategoryDto>(&ctx, &client, options, output).await,
        Resource::Products => list_page::<ProductDto>(&ctx, &client, options, output).await,
        Resource::PromoCodes => list_page::<PromoCodeDto>(&ctx, &client, options, output).await,
        Resource::Users => list_page::<UserDto>(&ctx, &client, options, output).await,
    }
}

async fn list_page<T: Entity>(
    ctx: &ConsoleContext,
    client: &Arc<RestClient>,
    options: ListOptions,
    output: OutputOptions,
) -> Result<()> {
    let endpoint = client.resource::<T>(T::PATH);
    let location = MemoryLocation::new(options.url.as_deref().unwrap_or_default());
    let (mut controller, first) =
        ListQueryController::<T, _>::mount(ctx, T::list_schema(), location);

    let latest = apply_options(&mut controller, &options)?;
    let mut request = Some(latest.unwrap_or(first));

    while let Some(next) = request.take() {
        debug!(token = %next.token, "loading list page");
        let outcome = endpoint.list(&next.params).await;
        let (completion, follow_up) = controller.complete(next.token, outcome);
        debug!(?completion, "list page finished");
        request = follow_up;
    }

    if let Some(failure) = controller.error() {
        return Err(failure.clone().into());
    }

    let query_string = controller.query_string();
    let json_output = json!({
        "resource": T::PATH,
        "query": controller.query(),
        "url": query_string,
        "page": controller.query().page,
        "page_count": controller.page_count(),
        "total": controller.total(),
        "items": controller.items(),
    });

    let mut text = String::new();
    if controller.items().is_empty() {
        text.push_str(&format!("{}\n", "No rows.".dimmed()));
    } else {
        let mut table = Table::new(controller.items().iter().map(T::row));
        table.with(Style::rounded());
        text.push_str(&format!("{table}\n"));
    }
    text.push_str(&format!(
        "Page {} of {} ({} total)  {}",
        controller.query().page,
        controller.page_count(),
        controller.total(),
        display_query(&query_string).cyan()
    ));

    controller.unmount();
    CommandOutput::new(json_output).with_text(text).print(output)
}

/// Replay the CLI options as list-page interactions. Returns the load issued
/// by the last change, if any changed the query.
fn apply_options<T>(
    controller: &mut ListQueryController<T, MemoryLocation>,
    options: &ListOptions,
) -> Result<Option<LoadRequest>> {
    let mut latest = None;

    for (key, value) in &options.filters {
        latest = controller.set_filter_str(key, value)?.or(latest);
    }
    if let Some(spec) = &options.sort {
        let sort = spec.resolve(controller.schema().default_direction());
        latest = controller.set_sort(&sort.field, sort.direction)?.or(latest);
    }
    if let Some(search) = &options.search {
        controller.set_search_text(search, Instant::now());
        latest = controller.submit_search().or(latest);
    }
    if let Some(page) = options.page {
        latest = controller.set_page(page).or(latest);
    }
    Ok(latest)
}
