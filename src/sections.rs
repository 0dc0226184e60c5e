//! Dynamic sections: repeatable groups such as work experience or
//! education entries. New entries appear when "Add" is pressed; entries
//! prefilled from a parsed resume may already be on the page.
//!
//! A section is announced by a heading whose id ends in `-section`. The
//! group it heads is the `role="group"` element labelled by that id, and
//! every entry added to the group is itself a group labelled by a
//! `<Section>-<n>-panel` heading.

use std::time::Instant;

use tracing::{debug, error, info, warn};

use crate::config::{ExtractOptions, Timeouts};
use crate::dom::{self, attr_selector, FormPage};
use crate::error::{Error, Result};
use crate::extract::{classify, Placement};
use crate::field::FieldDescriptor;
use crate::resolve::non_empty_attribute;

/// A section heading resolved to the group it controls.
pub(crate) struct Section<N> {
    header_id: String,
    title: String,
    group: N,
}

/// What pressing "Add" produced.
enum Materialized<N> {
    /// A new instance panel; extraction is scoped to it.
    Instance(N),
    /// A section without instance panels whose fields sit directly in the
    /// group. Containers from index `first_new` on were added by the click.
    Flat { first_new: usize },
}

/// Materialize and extract every dynamic section on the page.
///
/// Entries already rendered are read first. Each section is then topped up
/// to as many instances as `options` asks for (one by default). A section
/// that cannot be resolved, or whose add control never yields new fields,
/// is skipped with a warning.
pub async fn extract_section_fields<P: FormPage>(
    page: &P,
    options: &ExtractOptions,
) -> Vec<FieldDescriptor> {
    let sections = discover_sections(page).await;
    section_fields(page, &sections, options, true).await
}

/// Every section heading on the page resolved to its group, in document
/// order.
pub(crate) async fn discover_sections<P: FormPage>(page: &P) -> Vec<Section<P::Node>> {
    let headers = match page.query_all(None, dom::SECTION_HEADER).await {
        Ok(headers) => headers,
        Err(e) => {
            error!("could not list section headers: {e}");
            return Vec::new();
        }
    };

    let mut sections = Vec::new();
    for header in &headers {
        match resolve_section(page, header).await {
            Ok(Some(section)) => sections.push(section),
            Ok(None) => {}
            Err(e) => warn!("skipping unresolvable section: {e}"),
        }
    }
    sections
}

/// Field containers inside a section group. These belong to the section,
/// not to the top level of the page.
pub(crate) async fn owned_containers<P: FormPage>(
    page: &P,
    sections: &[Section<P::Node>],
) -> Vec<P::Node> {
    let mut owned = Vec::new();
    for section in sections {
        match page.query_all(Some(&section.group), dom::FORM_FIELD).await {
            Ok(containers) => owned.extend(containers),
            Err(e) => warn!(section = %section.title, "could not list section fields: {e}"),
        }
    }
    owned
}

/// Fields of `sections`: rendered entries always, plus added ones when
/// `add` is set.
pub(crate) async fn section_fields<P: FormPage>(
    page: &P,
    sections: &[Section<P::Node>],
    options: &ExtractOptions,
    add: bool,
) -> Vec<FieldDescriptor> {
    let mut fields = Vec::new();
    for section in sections {
        info!(section = %section.title, "processing section");

        let rendered = match rendered_instances(page, section, options).await {
            Ok(rendered) => rendered,
            Err(e) => {
                warn!(section = %section.title, "section skipped: {e}");
                continue;
            }
        };
        let present = rendered.len();
        if present > 0 {
            debug!(section = %section.title, present, "entries already rendered");
        }
        fields.extend(rendered.into_iter().flatten());
        if !add {
            continue;
        }

        let wanted = options.instances_for(&section.title);
        for ordinal in present + 1..=wanted {
            match add_instance(page, section, ordinal, options).await {
                Ok(Some(instance_fields)) => {
                    info!(
                        section = %section.title,
                        instance = ordinal,
                        count = instance_fields.len(),
                        "extracted section fields"
                    );
                    fields.extend(instance_fields);
                }
                Ok(None) => break,
                Err(e) => {
                    warn!(section = %section.title, instance = ordinal, "section skipped: {e}");
                    break;
                }
            }
        }
    }
    fields
}

async fn resolve_section<P: FormPage>(page: &P, header: &P::Node) -> Result<Option<Section<P::Node>>> {
    let Some(header_id) = non_empty_attribute(page, header, "id").await? else {
        return Ok(None);
    };
    let title = match page.inner_text(header).await?.trim() {
        "" => header_id.trim_end_matches("-section").to_string(),
        title => title.to_string(),
    };

    let selector = format!(
        r#"[role="group"]{}"#,
        attr_selector("aria-labelledby", &header_id)
    );
    let Some(group) = page.query_first(None, &selector).await? else {
        return Err(Error::ElementNotFound(format!(
            "group for section heading {header_id}"
        )));
    };

    Ok(Some(Section {
        header_id,
        title,
        group,
    }))
}

/// Fields of the entries already on the page, one list per entry. A flat
/// section with fields counts as a single entry.
async fn rendered_instances<P: FormPage>(
    page: &P,
    section: &Section<P::Node>,
    options: &ExtractOptions,
) -> Result<Vec<Vec<FieldDescriptor>>> {
    let panels = page.query_all(Some(&section.group), dom::SECTION_INSTANCE).await?;
    if panels.is_empty() {
        let containers = page.query_all(Some(&section.group), dom::FORM_FIELD).await?;
        if containers.is_empty() {
            return Ok(Vec::new());
        }
        let prefix = flat_prefix(section, 1);
        return Ok(vec![extract_scoped(page, section, &containers, &prefix, options).await]);
    }

    let mut instances = Vec::with_capacity(panels.len());
    for panel in &panels {
        let prefix = panel_prefix(page, panel).await?;
        let containers = page.query_all(Some(panel), dom::FORM_FIELD).await?;
        instances.push(extract_scoped(page, section, &containers, &prefix, options).await);
    }
    Ok(instances)
}

/// Press the section's add control once and extract the instance it
/// creates. `Ok(None)` when the section offers no add control.
async fn add_instance<P: FormPage>(
    page: &P,
    section: &Section<P::Node>,
    ordinal: usize,
    options: &ExtractOptions,
) -> Result<Option<Vec<FieldDescriptor>>> {
    let Some(add) = page.query_first(Some(&section.group), dom::ADD_BUTTON).await? else {
        debug!(section = %section.title, "no add control");
        return Ok(None);
    };
    let panels_before = page.count(Some(&section.group), dom::SECTION_INSTANCE).await?;
    let fields_before = page.count(Some(&section.group), dom::FORM_FIELD).await?;

    page.click(&add).await?;
    tokio::time::sleep(options.timeouts.animation_wait).await;

    let materialized = await_new_instance(
        page,
        &section.group,
        panels_before,
        fields_before,
        &options.timeouts,
    )
    .await?;
    let (containers, prefix) = match materialized {
        Materialized::Instance(node) => (
            page.query_all(Some(&node), dom::FORM_FIELD).await?,
            panel_prefix(page, &node).await?,
        ),
        Materialized::Flat { first_new } => {
            let mut containers = page.query_all(Some(&section.group), dom::FORM_FIELD).await?;
            let first_new = first_new.min(containers.len());
            (containers.split_off(first_new), flat_prefix(section, ordinal))
        }
    };
    Ok(Some(extract_scoped(page, section, &containers, &prefix, options).await))
}

async fn extract_scoped<P: FormPage>(
    page: &P,
    section: &Section<P::Node>,
    containers: &[P::Node],
    prefix: &str,
    options: &ExtractOptions,
) -> Vec<FieldDescriptor> {
    let mut fields = Vec::new();
    for (index, container) in containers.iter().enumerate() {
        let placement = Placement {
            section_name: &section.title,
            id_prefix: prefix,
            ordinal: index,
        };
        match classify(page, container, &placement, &options.timeouts).await {
            Ok(Some(field)) => fields.push(field),
            Ok(None) => debug!(section = %section.title, index, "container has no known control"),
            Err(e) => error!(section = %section.title, index, "field extraction failed: {e}"),
        }
    }
    fields
}

fn flat_prefix<N>(section: &Section<N>, ordinal: usize) -> String {
    format!("{}-{ordinal}/", section.header_id)
}

async fn panel_prefix<P: FormPage>(page: &P, panel: &P::Node) -> Result<String> {
    let panel = page.attribute(panel, "aria-labelledby").await?.unwrap_or_default();
    Ok(format!("{panel}/"))
}

/// Poll until the group holds one more instance panel than before the
/// click, with at least one field container in it, or, for a flat section,
/// more field containers than before.
async fn await_new_instance<P: FormPage>(
    page: &P,
    group: &P::Node,
    panels_before: usize,
    fields_before: usize,
    timeouts: &Timeouts,
) -> Result<Materialized<P::Node>> {
    let start = Instant::now();
    loop {
        let mut instances = page.query_all(Some(group), dom::SECTION_INSTANCE).await?;
        if instances.len() > panels_before {
            let node = instances.swap_remove(panels_before);
            if page.count(Some(&node), dom::FORM_FIELD).await? > 0 {
                return Ok(Materialized::Instance(node));
            }
        } else if instances.is_empty()
            && page.count(Some(group), dom::FORM_FIELD).await? > fields_before
        {
            return Ok(Materialized::Flat {
                first_new: fields_before,
            });
        }

        if start.elapsed() >= timeouts.section_wait {
            return Err(Error::Timeout("fields of the added section entry".into()));
        }
        tokio::time::sleep(timeouts.poll_interval).await;
    }
}
