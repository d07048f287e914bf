//! Filesystem tools: read, recursive listing, and string-replace editing

use async_trait::async_trait;
use praktor_provider::object_schema;
use serde::Deserialize;
use serde_json::Value;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use tracing::debug;

use super::{parse_args, ToolError, ToolTrait};

fn not_found_as(path: &str, err: std::io::Error) -> ToolError {
    if err.kind() == ErrorKind::NotFound {
        ToolError::FileNotFound(path.to_string())
    } else {
        ToolError::Io(err)
    }
}

/// Reads a whole file as text
pub struct ReadFileTool {
    root: PathBuf,
}

impl ReadFileTool {
    pub fn new(root: PathBuf) -> Self {
        Self { root }
    }
}

#[derive(Deserialize)]
struct ReadFileArgs {
    path: String,
}

#[async_trait]
impl ToolTrait for ReadFileTool {
    fn name(&self) -> &str {
        "read_file"
    }
    fn description(&self) -> &str {
        "Read the contents of a given relative file path. Use this when you want to see \
         what's inside a file. Do not use this with directory names."
    }
    fn parameters(&self) -> Value {
        object_schema(vec![(
            "path",
            "The relative path of a file in the working directory.",
            true,
        )])
    }
    async fn execute(&self, arguments: &str) -> Result<String, ToolError> {
        let args: ReadFileArgs = parse_args(arguments)?;
        let path = self.root.join(&args.path);

        debug!("Reading file: {:?}", path);
        let meta = tokio::fs::metadata(&path)
            .await
            .map_err(|e| not_found_as(&args.path, e))?;
        if meta.is_dir() {
            return Err(ToolError::IsDirectory(args.path));
        }
        Ok(tokio::fs::read_to_string(&path).await?)
    }
}

/// Recursive directory listing, returned as a JSON array of relative paths
pub struct ListFilesTool {
    root: PathBuf,
}

impl ListFilesTool {
    pub fn new(root: PathBuf) -> Self {
        Self { root }
    }
}

#[derive(Deserialize, Default)]
struct ListFilesArgs {
    #[serde(default)]
    path: Option<String>,
}

/// Sorted `(name, is_dir, path)` children of `dir`
async fn sorted_children(dir: &Path) -> Result<Vec<(String, bool, PathBuf)>, ToolError> {
    let mut reader = tokio::fs::read_dir(dir).await?;
    let mut children = Vec::new();
    while let Some(entry) = reader.next_entry().await? {
        let name = entry.file_name().to_string_lossy().to_string();
        let is_dir = entry.file_type().await?.is_dir();
        children.push((name, is_dir, entry.path()));
    }
    children.sort_by(|a, b| a.0.cmp(&b.0));
    Ok(children)
}

/// Depth-first, pre-order walk below `base`, children in lexical order.
/// The base itself is not part of the output.
async fn walk(base: &Path) -> Result<Vec<String>, ToolError> {
    let mut listing = Vec::new();
    let mut stack: Vec<(String, bool, PathBuf)> = Vec::new();

    for child in sorted_children(base).await?.into_iter().rev() {
        stack.push(child);
    }

    while let Some((rel, is_dir, abs)) = stack.pop() {
        if !is_dir {
            listing.push(rel);
            continue;
        }
        listing.push(format!("{}/", rel));
        for (name, child_is_dir, child_abs) in sorted_children(&abs).await?.into_iter().rev() {
            stack.push((format!("{}/{}", rel, name), child_is_dir, child_abs));
        }
    }

    Ok(listing)
}

#[async_trait]
impl ToolTrait for ListFilesTool {
    fn name(&self) -> &str {
        "list_files"
    }
    fn description(&self) -> &str {
        "List files and directories at a given path. If no path is provided, lists files \
         in the current directory."
    }
    fn parameters(&self) -> Value {
        object_schema(vec![(
            "path",
            "Optional relative path to list files from. Defaults to current directory if not provided.",
            false,
        )])
    }
    async fn execute(&self, arguments: &str) -> Result<String, ToolError> {
        // Unusable arguments fall back to the working directory
        let args: ListFilesArgs = parse_args(arguments).unwrap_or_default();
        let relative = args
            .path
            .filter(|p| !p.trim().is_empty())
            .unwrap_or_else(|| ".".to_string());
        let dir = self.root.join(&relative);

        debug!("Listing files under {:?}", dir);
        let meta = tokio::fs::metadata(&dir)
            .await
            .map_err(|e| not_found_as(&relative, e))?;
        if !meta.is_dir() {
            return Err(ToolError::Validation(format!("{} is not a directory", relative)));
        }

        let listing = walk(&dir).await?;
        serde_json::to_string(&listing).map_err(|e| ToolError::Io(std::io::Error::other(e)))
    }
}

/// Literal find-and-replace editing, also used to create new files
pub struct EditFileTool {
    root: PathBuf,
}

impl EditFileTool {
    pub fn new(root: PathBuf) -> Self {
        Self { root }
    }
}

#[derive(Deserialize)]
struct EditFileArgs {
    #[serde(default)]
    path: String,
    #[serde(default)]
    old_str: String,
    #[serde(default)]
    new_str: String,
}

impl EditFileTool {
    async fn create(&self, path: &Path, shown: &str, content: &str) -> Result<String, ToolError> {
        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        tokio::fs::write(path, content).await?;
        Ok(format!("Successfully created file {}", shown))
    }
}

#[async_trait]
impl ToolTrait for EditFileTool {
    fn name(&self) -> &str {
        "edit_file"
    }
    fn description(&self) -> &str {
        "Make edits to a text file.\n\n\
         Replaces 'old_str' with 'new_str' in the given file. 'old_str' and 'new_str' MUST \
         be different from each other.\n\n\
         If the file specified with path doesn't exist, it will be created.\n"
    }
    fn parameters(&self) -> Value {
        object_schema(vec![
            ("path", "The path to the file", true),
            (
                "old_str",
                "Text to search for - must match exactly and must only have one match exactly",
                true,
            ),
            ("new_str", "Text to replace old_str with", true),
        ])
    }
    async fn execute(&self, arguments: &str) -> Result<String, ToolError> {
        let args: EditFileArgs = parse_args(arguments)?;
        if args.path.is_empty() {
            return Err(ToolError::Validation("path must not be empty".to_string()));
        }
        if args.old_str == args.new_str {
            return Err(ToolError::Validation(
                "old_str and new_str must differ".to_string(),
            ));
        }

        let path = self.root.join(&args.path);
        debug!("Editing file: {:?}", path);

        let original = match tokio::fs::read_to_string(&path).await {
            Ok(content) => content,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                if args.old_str.is_empty() {
                    return self.create(&path, &args.path, &args.new_str).await;
                }
                return Err(ToolError::FileNotFound(args.path));
            }
            Err(e) => return Err(ToolError::Io(e)),
        };

        let updated = original.replace(&args.old_str, &args.new_str);
        if updated == original && !args.old_str.is_empty() {
            return Err(ToolError::OldStrNotFound);
        }

        tokio::fs::write(&path, updated).await?;
        Ok("OK".to_string())
    }
}
