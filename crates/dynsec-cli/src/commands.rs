//! Handlers for the file commands: `check`, `fmt` and `show`.

use dynsec_acl::{Entity, EntityStore};
use dynsec_core::{DynsecConfig, Error, Result};
use dynsec_yaml::LoadReport;
use serde::Serialize;
use std::io::Write as _;
use std::path::Path;

/// Load `path` into a store sized and configured by `config`.
pub fn load_store(path: &Path, config: &DynsecConfig) -> Result<(EntityStore, LoadReport)> {
    let mut store = EntityStore::with_limits(config.limits);
    let report = dynsec_yaml::load_file(&mut store, path, &config.load)?;
    log::info!(
        "Loaded {} ({} group records, {:?} mode)",
        path.display(),
        report.groups,
        config.load.mode
    );
    Ok((store, report))
}

// ============================================================================
// check
// ============================================================================

/// Load a file and verify every link is mirrored.
pub fn cmd_check(path: &Path, config: &DynsecConfig) -> Result<()> {
    let (store, _) = load_store(path, config)?;
    store.check_links()?;
    println!("{}: {}", path.display(), summary(&store));
    Ok(())
}

/// One-line entity count summary.
pub fn summary(store: &EntityStore) -> String {
    format!(
        "ok ({} groups, {} roles, {} clients)",
        store.group_count(),
        store.role_count(),
        store.client_count()
    )
}

// ============================================================================
// fmt
// ============================================================================

/// Load a file and write it back in canonical form.
///
/// Without `output` the result goes to stdout.
pub fn cmd_fmt(path: &Path, output: Option<&Path>, config: &DynsecConfig) -> Result<()> {
    let (store, _) = load_store(path, config)?;
    let text = dynsec_yaml::save_string(&store)?;
    match output {
        Some(target) => {
            write_atomically(target, &text)?;
            log::info!("Wrote {}", target.display());
        }
        None => print!("{text}"),
    }
    Ok(())
}

/// Replace `target` with `contents` so readers never see a partial file.
pub fn write_atomically(target: &Path, contents: &str) -> Result<()> {
    let dir = target
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .unwrap_or_else(|| Path::new("."));
    let mut tmp = tempfile::NamedTempFile::new_in(dir).map_err(|e| Error::io_with_path(e, dir))?;
    tmp.write_all(contents.as_bytes())
        .map_err(|e| Error::io_with_path(e, tmp.path()))?;
    tmp.persist(target)
        .map_err(|e| Error::io_with_path(e.error, target))?;
    Ok(())
}

// ============================================================================
// show
// ============================================================================

/// A group member as listed by `show`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct MemberView {
    /// Role or client name.
    pub name: String,
    /// Link priority.
    pub priority: i64,
}

/// A group as listed by `show`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct GroupView {
    /// Group name.
    pub name: String,
    /// Display name.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub text_name: Option<String>,
    /// Description.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub text_description: Option<String>,
    /// Whether this is the anonymous group.
    pub anonymous: bool,
    /// Roles in list order.
    pub roles: Vec<MemberView>,
    /// Clients in list order.
    pub clients: Vec<MemberView>,
}

/// Build the `show` listing in store order.
pub fn group_views(store: &EntityStore) -> Vec<GroupView> {
    let anonymous = store.anonymous_group();
    store
        .groups()
        .map(|(id, group)| GroupView {
            name: group.name().to_string(),
            text_name: group.text_name().map(str::to_string),
            text_description: group.text_description().map(str::to_string),
            anonymous: anonymous == Some(id),
            roles: group
                .rolelist()
                .iter()
                .filter_map(|a| {
                    store.role(a.target).map(|r| MemberView {
                        name: r.name().to_string(),
                        priority: a.priority,
                    })
                })
                .collect(),
            clients: group
                .clientlist()
                .iter()
                .filter_map(|a| {
                    store.client(a.target).map(|c| MemberView {
                        name: c.name().to_string(),
                        priority: a.priority,
                    })
                })
                .collect(),
        })
        .collect()
}

/// Render the listing as indented text.
pub fn render_text(views: &[GroupView]) -> String {
    let mut out = String::new();
    for view in views {
        out.push_str(&view.name);
        if let Some(text_name) = &view.text_name {
            out.push_str(&format!(" ({text_name})"));
        }
        if view.anonymous {
            out.push_str(" [anonymous]");
        }
        out.push('\n');
        for role in &view.roles {
            out.push_str(&format!("  role   {} (priority {})\n", role.name, role.priority));
        }
        for client in &view.clients {
            out.push_str(&format!("  client {} (priority {})\n", client.name, client.priority));
        }
    }
    out
}

/// List groups with their roles and clients.
pub fn cmd_show(path: &Path, json: bool, config: &DynsecConfig) -> Result<()> {
    let (store, _) = load_store(path, config)?;
    let views = group_views(&store);
    if json {
        let text = serde_json::to_string_pretty(&views)
            .map_err(|e| Error::emit(format!("Failed to render JSON: {e}")))?;
        println!("{text}");
    } else {
        print!("{}", render_text(&views));
    }
    Ok(())
}

// ============================================================================
// Tests
// ============================================================================
