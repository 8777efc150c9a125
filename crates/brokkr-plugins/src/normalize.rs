//! Spec normalization
//!
//! Converts the three accepted input shapes (bare locator, table with a
//! `src` field, positional entry) into one canonical spec + metadata pair
//! and inserts it into the registry. Every entry is normalized through a
//! single exhaustive match, so new input shapes cannot appear without a
//! compile error here.

use brokkr_core::types::{
    LazyTrigger, PluginMetadata, PluginRecord, PluginSpec, PositionalField, SpecFields, SpecInput,
    TriggerKind,
};
use brokkr_core::{Error, Result};
use tracing::debug;

use crate::registry::PluginRegistry;

/// Network prefix applied to "owner/name" short locators
pub const SOURCE_PREFIX: &str = "https://github.com/";

const ARCHIVE_SUFFIX: &str = ".git";
const ECOSYSTEM_PREFIX: &str = "brokkr-";

fn default_priority() -> i32 {
    50
}

/// Qualify a locator into its absolute form
///
/// Short "owner/name" locators get the fixed network prefix; anything
/// already carrying a scheme separator passes through unchanged.
pub fn qualify_locator(locator: &str) -> String {
    if locator.contains("://") {
        locator.to_string()
    } else {
        format!("{}{}", SOURCE_PREFIX, locator.trim_matches('/'))
    }
}

/// Derive a plugin id from a locator
///
/// Takes the final path segment, then strips the trailing archive suffix
/// and the redundant ecosystem prefix.
pub fn derive_id(locator: &str) -> String {
    let segment = locator
        .trim_end_matches('/')
        .rsplit('/')
        .next()
        .unwrap_or(locator);
    let segment = segment.strip_suffix(ARCHIVE_SUFFIX).unwrap_or(segment);
    let segment = segment.strip_prefix(ECOSYSTEM_PREFIX).unwrap_or(segment);
    segment.to_string()
}

/// Reduce a dependency entry to a plugin id
///
/// Dependency lists accept ids and raw locators; locator-shaped entries
/// go through the same id derivation as plugin sources.
pub(crate) fn dependency_id(entry: &str) -> String {
    if entry.contains("://") || entry.contains('/') {
        derive_id(&qualify_locator(entry))
    } else {
        entry.to_string()
    }
}

/// Normalize one input entry into a canonical spec + metadata pair
pub fn normalize_entry(input: &SpecInput) -> Result<(PluginSpec, PluginMetadata)> {
    let fields = match input {
        SpecInput::Locator(locator) => SpecFields {
            src: Some(locator.clone()),
            ..SpecFields::default()
        },
        SpecInput::Table(fields) => fields.clone(),
        SpecInput::Positional(elements) => positional_fields(elements)?,
    };

    let locator = fields
        .src
        .as_deref()
        .ok_or_else(|| Error::spec("entry has no source locator"))?;
    let source = qualify_locator(locator);

    let id = match &fields.name {
        Some(name) => name.clone(),
        None => derive_id(&source),
    };
    if id.is_empty() {
        return Err(Error::spec(format!(
            "cannot derive a plugin id from locator '{}'",
            locator
        )));
    }

    let spec = PluginSpec {
        id,
        source,
        version: fields.version.clone(),
        priority: fields.priority.unwrap_or_else(default_priority),
    };

    let triggers = collect_triggers(&fields);
    let metadata = PluginMetadata {
        dependencies: fields.dependencies.clone(),
        enabled: fields.enabled,
        // Declaring any trigger implies deferred activation
        lazy: fields.lazy || !triggers.is_empty(),
        triggers,
        build: fields.build.clone(),
        setup: fields.setup.clone(),
        configure: fields.configure.clone(),
        keymaps: fields.keymaps.clone(),
    };

    Ok((spec, metadata))
}

/// Normalize one entry and insert it into the registry
///
/// Returns the id the record was registered under. Duplicate ids replace
/// the prior record silently (last write wins).
pub fn add_to_registry(registry: &mut PluginRegistry, input: &SpecInput) -> Result<String> {
    let (spec, metadata) = normalize_entry(input)?;
    let id = spec.id.clone();
    debug!("Normalized '{}' from {}", id, spec.source);
    registry.insert(PluginRecord::new(spec, metadata));
    Ok(id)
}

/// Fold a positional entry into a field table
fn positional_fields(elements: &[PositionalField]) -> Result<SpecFields> {
    let mut locator: Option<&str> = None;
    let mut fields: Option<SpecFields> = None;

    for element in elements {
        match element {
            PositionalField::Locator(entry) => {
                if locator.is_some() {
                    return Err(Error::spec(format!(
                        "unexpected second positional locator '{}'",
                        entry
                    )));
                }
                locator = Some(entry);
            }
            PositionalField::Fields(table) => {
                if fields.is_some() {
                    return Err(Error::spec("unexpected second positional field table"));
                }
                fields = Some(table.clone());
            }
        }
    }

    let locator = locator.ok_or_else(|| Error::spec("positional entry has no locator"))?;
    let mut fields = fields.unwrap_or_default();
    if fields.src.is_none() {
        fields.src = Some(locator.to_string());
    }
    Ok(fields)
}

/// Merge explicit trigger declarations with the flat convenience fields
fn collect_triggers(fields: &SpecFields) -> Vec<LazyTrigger> {
    let mut triggers = fields.triggers.clone();
    for event in &fields.events {
        triggers.push(LazyTrigger::new(TriggerKind::Event(event.clone())));
    }
    for command in &fields.commands {
        triggers.push(LazyTrigger::new(TriggerKind::Command(command.clone())));
    }
    for filetype in &fields.filetypes {
        triggers.push(LazyTrigger::new(TriggerKind::Filetype(filetype.clone())));
    }
    for keys in &fields.keys {
        triggers.push(LazyTrigger::new(TriggerKind::Keys(keys.clone())));
    }
    if fields.ready {
        triggers.push(LazyTrigger::new(TriggerKind::Ready));
    }
    triggers
}
