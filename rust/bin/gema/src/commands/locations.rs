//! Technical location commands: browse, filter, create, edit, delete,
//! export.

use std::path::Path;

use anyhow::Result;
use gema_core::hierarchy::filter::{LevelFilter, level_options, prune};
use gema_core::hierarchy::tree::{check_consistency, descendant_count, group_by_module, node_count};
use gema_core::{CodeSegments, CreateRequest, Level, LocationNode, LocationUpdate, ParentLink};

use crate::commands::{Output, print_result, require_session};

/// One optional flag per level, root first.
#[derive(clap::Args, Debug, Clone, Default)]
pub struct SegmentArgs {
    #[arg(long)]
    pub modulo: Option<String>,
    #[arg(long)]
    pub planta: Option<String>,
    #[arg(long)]
    pub espacio: Option<String>,
    #[arg(long)]
    pub tipo: Option<String>,
    #[arg(long)]
    pub subtipo: Option<String>,
    #[arg(long)]
    pub numero: Option<String>,
    #[arg(long)]
    pub pieza: Option<String>,
}

fn flag(s: &Option<String>) -> &str {
    s.as_deref().unwrap_or_default()
}

impl SegmentArgs {
    fn values(&self) -> [(Level, &str); 7] {
        [
            (Level::Modulo, flag(&self.modulo)),
            (Level::Planta, flag(&self.planta)),
            (Level::Espacio, flag(&self.espacio)),
            (Level::Tipo, flag(&self.tipo)),
            (Level::Subtipo, flag(&self.subtipo)),
            (Level::Numero, flag(&self.numero)),
            (Level::Pieza, flag(&self.pieza)),
        ]
    }

    pub fn segments(&self) -> CodeSegments {
        self.values()
            .into_iter()
            .fold(CodeSegments::default(), |s, (level, value)| s.with(level, value))
    }

    /// Filter with every given level selected, root first.
    pub fn filter(&self) -> LevelFilter {
        let mut filter = LevelFilter::new();
        for (level, value) in self.values() {
            if !value.is_empty() {
                filter.select(level, value);
            }
        }
        filter
    }
}

/// Locations grouped by module, with per-module counts.
pub async fn list(output: Output, client_config_path: &Path) -> Result<()> {
    let service = require_session(client_config_path)?;
    let flat = service.flat_locations().await?;
    if output.json(&flat)? {
        return Ok(());
    }

    if flat.is_empty() {
        println!("No technical locations.");
        return Ok(());
    }
    for group in group_by_module(&flat) {
        println!("{} ({})", group.module, group.count());
        for loc in &group.locations {
            println!("  {:6} {:32} {}", loc.id, loc.code, loc.description);
        }
    }
    Ok(())
}

fn print_tree(nodes: &[LocationNode], depth: usize) {
    for node in nodes {
        let loc = &node.location;
        let below = descendant_count(node);
        let suffix = if below > 0 { format!(" [{below}]") } else { String::new() };
        println!(
            "{:indent$}{} {}  (id {}){}",
            "",
            loc.code,
            loc.description,
            loc.id,
            suffix,
            indent = depth * 2
        );
        print_tree(&node.children, depth + 1);
    }
}

/// The location tree, pruned to the locations matching the level filter
/// and their ancestors.
pub async fn tree(filter: &SegmentArgs, check: bool, output: Output, client_config_path: &Path) -> Result<()> {
    let service = require_session(client_config_path)?;
    let nodes = service.locations().await?;
    let filter = filter.filter();
    let shown = prune(&nodes, &filter);

    if output.json(&shown)? {
        return Ok(());
    }
    print_tree(&shown, 0);
    if !filter.is_empty() {
        println!("{} of {} locations match.", node_count(&shown), node_count(&nodes));
    }

    if check {
        let problems = check_consistency(&nodes);
        if problems.is_empty() {
            println!("Tree is consistent.");
        }
        for p in problems {
            println!("warning: {}: {}", p.code, p.message);
        }
    }
    Ok(())
}

/// Values available at `level` given the values chosen above it.
pub async fn options(level: Level, upstream: &SegmentArgs, output: Output, client_config_path: &Path) -> Result<()> {
    let service = require_session(client_config_path)?;
    let flat = service.flat_locations().await?;
    let values = level_options(&flat, level, &upstream.filter());
    if output.json(&values)? {
        return Ok(());
    }
    if values.is_empty() {
        println!("No values for level {}.", level);
    }
    for v in values {
        println!("{v}");
    }
    Ok(())
}

pub struct CreateArgs {
    pub segments: SegmentArgs,
    pub description: String,
    pub equipment: bool,
    pub virtual_parents: Vec<i64>,
}

pub async fn create(args: CreateArgs, output: Output, client_config_path: &Path) -> Result<()> {
    if !args.equipment && !args.virtual_parents.is_empty() {
        anyhow::bail!("--virtual-parent requires --equipment.");
    }
    let service = require_session(client_config_path)?;
    let request = CreateRequest {
        segments: args.segments.segments(),
        description: args.description,
        equipment: args.equipment,
        virtual_parents: args.virtual_parents,
    };
    let created = service.create_location(&request).await?;
    if output.json(&created)? {
        return Ok(());
    }
    println!("Location {} created.", request.segments.code());
    Ok(())
}

pub struct EditArgs {
    pub id: i64,
    pub description: Option<String>,
    pub abbreviation: Option<String>,
    pub parent: Option<i64>,
    pub virtual_parents: Vec<i64>,
}

impl EditArgs {
    fn update(self) -> LocationUpdate {
        let mut parents: Vec<ParentLink> = self.parent.into_iter().map(ParentLink::physical).collect();
        parents.extend(self.virtual_parents.into_iter().map(ParentLink::virtual_link));
        LocationUpdate {
            description: self.description,
            abbreviation: self.abbreviation,
            parents: (!parents.is_empty()).then_some(parents),
        }
    }
}

pub async fn edit(args: EditArgs, output: Output, client_config_path: &Path) -> Result<()> {
    let service = require_session(client_config_path)?;
    let id = args.id;
    let updated = service.update_location(id, &args.update()).await?;
    if output.json(&updated)? {
        return Ok(());
    }
    println!("Location {} updated.", id);
    Ok(())
}

pub async fn delete(id: i64, client_config_path: &Path) -> Result<()> {
    let service = require_session(client_config_path)?;
    let deleted = service.delete_location(id).await?;
    println!("Location {} deleted.", id);
    print_result(&deleted)
}

/// Locations depending on `id`, optionally only at one level.
pub async fn branches(id: i64, level: Option<Level>, output: Output, client_config_path: &Path) -> Result<()> {
    let service = require_session(client_config_path)?;
    let nodes = service
        .location_branches(id, level.map(Level::number))
        .await?;
    if output.json(&nodes)? {
        return Ok(());
    }
    if nodes.is_empty() {
        println!("No dependent locations.");
    }
    print_tree(&nodes, 0);
    Ok(())
}

pub async fn parents(id: i64, output: Output, client_config_path: &Path) -> Result<()> {
    let service = require_session(client_config_path)?;
    let parents = service.location_parents(id).await?;
    if output.json(&parents)? {
        return Ok(());
    }
    if parents.is_empty() {
        println!("Location {} has no parents.", id);
        return Ok(());
    }
    println!("{:6} {:32} {:10} {}", "ID", "CODE", "LINK", "DESCRIPTION");
    for p in &parents {
        let link = if p.physical { "physical" } else { "virtual" };
        println!("{:6} {:32} {:10} {}", p.location.id, p.location.code, link, p.location.description);
    }
    Ok(())
}

/// Download the spreadsheet export into `out_dir`.
pub async fn export(out_dir: &Path, client_config_path: &Path) -> Result<()> {
    let service = require_session(client_config_path)?;
    let download = service.export_locations().await?;
    let path = download.save_to(out_dir)?;
    println!("Saved {} ({} bytes).", path.display(), download.bytes.len());
    Ok(())
}
