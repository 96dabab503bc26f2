use anyhow::{Context, Result};
use std::path::Path;

/// Written in place of a header file when none is configured
pub const DEFAULT_HTML_HEADER: &str = "<link rel=\"stylesheet\" href=\"icalaggregator.css\"/>\n";

/// Wrap the schedule grid in the configured header and footer files.
pub fn wrap_html(grid: &str, header: Option<&Path>, footer: Option<&Path>) -> Result<String> {
    let mut html = match header {
        Some(path) => read_fragment(path)?,
        None => DEFAULT_HTML_HEADER.to_string(),
    };
    html.push_str(grid);
    if let Some(path) = footer {
        html.push_str(&read_fragment(path)?);
    }
    Ok(html)
}

/// Write an output file, creating its directory if needed.
pub fn write_output(path: &Path, contents: &str) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create directory {}", parent.display()))?;
    }

    std::fs::write(path, contents)
        .with_context(|| format!("Failed to write {}", path.display()))
}

fn read_fragment(path: &Path) -> Result<String> {
    std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read HTML fragment at {}", path.display()))
}
