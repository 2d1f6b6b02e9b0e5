//! `paperwatch render` - write the stored catalog as Markdown

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use chrono::Utc;
use clap::Args;

use paperwatch_catalog::{Catalog, CatalogStore, RenderOptions, render_markdown};

use super::Status;
use crate::config::Config;

#[derive(Args, Debug)]
pub struct RenderArgs {
    /// Output file (default: [render] markdown)
    #[arg(short, long)]
    pub output: Option<PathBuf>,
}

/// Render `catalog` and write it to `path`, creating parent directories.
pub fn write_markdown(catalog: &Catalog, options: &RenderOptions, path: &Path) -> Result<()> {
    let markdown = render_markdown(catalog, options, Utc::now().date_naive());
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("failed to create {}", parent.display()))?;
    }
    std::fs::write(path, markdown).with_context(|| format!("failed to write {}", path.display()))?;
    log::info!(
        "rendered {} entries to {}",
        catalog.total_entries(),
        path.display()
    );
    Ok(())
}

/// Write the main document and, when `[render] gitpage` is set, the page copy.
///
/// Returns the paths written.
pub fn write_documents(catalog: &Catalog, options: &RenderOptions) -> Result<Vec<PathBuf>> {
    let mut written = Vec::new();
    for opts in std::iter::once(options.clone()).chain(options.for_gitpage()) {
        let path = PathBuf::from(&opts.markdown);
        write_markdown(catalog, &opts, &path)?;
        written.push(path);
    }
    Ok(written)
}

pub fn run(args: RenderArgs, config: &Config) -> Result<Status> {
    let catalog = CatalogStore::new(&config.data_dir).load()?;
    let written = match args.output {
        Some(path) => {
            write_markdown(&catalog, &config.render, &path)?;
            vec![path]
        }
        None => write_documents(&catalog, &config.render)?,
    };
    for path in written {
        eprintln!("Wrote {}", path.display());
    }
    Ok(Status::Success)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn writes_into_new_directory() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("docs/index.md");
        write_markdown(&Catalog::new(), &RenderOptions::default(), &path).unwrap();
        let text = std::fs::read_to_string(&path).unwrap();
        assert!(text.starts_with("## Updated on "));
    }

    #[test]
    fn writes_gitpage_alongside_readme() {
        let dir = tempfile::tempdir().unwrap();
        let readme = dir.path().join("README.md");
        let page = dir.path().join("docs/index.md");
        let options = RenderOptions {
            markdown: readme.display().to_string(),
            gitpage: Some(page.display().to_string()),
            ..RenderOptions::default()
        };
        let written = write_documents(&Catalog::new(), &options).unwrap();
        assert_eq!(written, vec![readme.clone(), page.clone()]);

        let readme_text = std::fs::read_to_string(&readme).unwrap();
        assert!(readme_text.starts_with("## Updated on "));
        let page_text = std::fs::read_to_string(&page).unwrap();
        assert!(page_text.starts_with("---\nlayout: default\n---\n"));
    }

    #[test]
    fn without_gitpage_only_readme() {
        let dir = tempfile::tempdir().unwrap();
        let options = RenderOptions {
            markdown: dir.path().join("README.md").display().to_string(),
            ..RenderOptions::default()
        };
        assert_eq!(write_documents(&Catalog::new(), &options).unwrap().len(), 1);
    }
}
