use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{anyhow, bail, Context, Result};
use clap::{Args, Parser, Subcommand, ValueEnum};
use docshelf_browser::DocumentBrowser;
use docshelf_folders::{
    build_folder_tree, FolderDraft, FolderNode, FolderPath, FolderRecord, ViewMode,
};
use docshelf_records::{
    sort_documents, DocumentDraft, DocumentFilter, DocumentId, DocumentRecord, Identity,
    ModuleKind, ModuleScope, OrderBy, OrderDirection, ProjectId, ProjectRef,
};
use docshelf_store::{DocumentStore, FolderStore, JsonVault};
use walkdir::WalkDir;

#[derive(Parser)]
#[command(
    name = "docshelf",
    about = "Folder and document management for the DocShelf suite",
    version
)]
struct Cli {
    /// Vault directory holding the JSON store files.
    #[arg(long, global = true, value_name = "PATH", default_value = ".docshelf")]
    vault: PathBuf,
    /// Business module scope (projects, proposals, procurement, materials,
    /// bom, hr, documents).
    #[arg(long, global = true, default_value = "documents")]
    module: String,
    /// Restrict the scope to one project id.
    #[arg(long, global = true, value_name = "ID")]
    project: Option<String>,
    /// Acting user id recorded on every mutation.
    #[arg(long, global = true, default_value = "cli")]
    user: String,
    /// Acting user display name; defaults to the user id.
    #[arg(long, global = true, value_name = "NAME")]
    user_name: Option<String>,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Create, rename, delete, and print folders.
    #[command(subcommand)]
    Folder(FolderCommand),
    /// Import, list, and move documents.
    #[command(subcommand)]
    Doc(DocCommand),
    /// Print the mutation activity log.
    Activity,
}

#[derive(Subcommand)]
enum FolderCommand {
    /// Print the folder hierarchy.
    Tree(TreeArgs),
    /// Create a folder.
    Create(CreateFolderArgs),
    /// Rename the folder at the given path.
    Rename { path: String, new_name: String },
    /// Delete the (empty) folder at the given path.
    Delete { path: String },
}

#[derive(Args)]
struct TreeArgs {
    /// Grouping mode for the hierarchy.
    #[arg(long, value_enum, default_value_t = ViewArg::Entity)]
    view: ViewArg,
}

#[derive(Args)]
struct CreateFolderArgs {
    name: String,
    /// Parent folder path; omitted means top level.
    #[arg(long, value_name = "PATH")]
    parent: Option<String>,
    /// Entity grouping key as "kind:label", e.g. "vendors:Acme Pte Ltd".
    #[arg(long, value_name = "KIND:LABEL")]
    entity: Option<String>,
    /// Project display name; pairs with the global --project id.
    #[arg(long, value_name = "NAME")]
    project_name: Option<String>,
}

#[derive(Subcommand)]
enum DocCommand {
    /// Register files (or whole directories) as documents.
    Import(ImportArgs),
    /// List documents, optionally filtered.
    List(ListArgs),
    /// Move documents to a folder.
    Move(MoveArgs),
}

#[derive(Args)]
struct ImportArgs {
    /// Files or directories to import.
    #[arg(required = true)]
    inputs: Vec<PathBuf>,
    /// Folder path to file the documents under.
    #[arg(long, value_name = "PATH")]
    folder: Option<String>,
    /// Title override; only sensible for a single file.
    #[arg(long)]
    title: Option<String>,
    /// Description attached to each imported document.
    #[arg(long)]
    description: Option<String>,
    /// Comma-separated tags attached to each imported document.
    #[arg(long, value_delimiter = ',')]
    tags: Vec<String>,
}

#[derive(Args)]
struct ListArgs {
    /// Filter text matched against name, title, description, and tags.
    #[arg(long)]
    query: Option<String>,
    /// Interpret --query as a regular expression.
    #[arg(long)]
    regex: bool,
    /// Show every version instead of only the newest per file name.
    #[arg(long)]
    all_versions: bool,
    /// Select a folder for the breadcrumb header.
    #[arg(long, value_name = "PATH")]
    folder: Option<String>,
    /// Grouping mode used for the breadcrumb header.
    #[arg(long, value_enum, default_value_t = ViewArg::Entity)]
    view: ViewArg,
    /// Sort key for the listing.
    #[arg(long, value_enum, default_value_t = OrderArg::Uploaded)]
    order_by: OrderArg,
    /// Sort ascending instead of the default descending.
    #[arg(long)]
    ascending: bool,
}

#[derive(Args)]
struct MoveArgs {
    /// Document ids to move.
    #[arg(required = true)]
    ids: Vec<String>,
    /// Target folder path.
    #[arg(long, value_name = "PATH")]
    to: String,
}

#[derive(Clone, Copy, ValueEnum)]
enum ViewArg {
    Entity,
    Project,
}

impl From<ViewArg> for ViewMode {
    fn from(value: ViewArg) -> Self {
        match value {
            ViewArg::Entity => ViewMode::Entity,
            ViewArg::Project => ViewMode::Project,
        }
    }
}

#[derive(Clone, Copy, ValueEnum)]
enum OrderArg {
    Uploaded,
    Name,
    Size,
}

impl From<OrderArg> for OrderBy {
    fn from(value: OrderArg) -> Self {
        match value {
            OrderArg::Uploaded => OrderBy::UploadedAt,
            OrderArg::Name => OrderBy::FileName,
            OrderArg::Size => OrderBy::Size,
        }
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    let module = ModuleKind::parse_slug(&cli.module).ok_or_else(|| {
        anyhow!(
            "unknown module {:?}; expected one of projects, proposals, procurement, materials, bom, hr, documents",
            cli.module
        )
    })?;
    let mut scope = ModuleScope::new(module);
    scope.project_id = cli.project.clone().map(ProjectId::from_string);
    let identity = Identity::new(
        cli.user.clone(),
        cli.user_name.clone().unwrap_or_else(|| cli.user.clone()),
    );
    let vault = JsonVault::new(&cli.vault);
    let vault_dir = cli.vault.clone();
    let project_id = cli.project.clone();

    match cli.command {
        Commands::Folder(command) => run_folder(command, &vault, &scope, &identity, project_id),
        Commands::Doc(command) => run_doc(command, &vault, &scope, &identity, &vault_dir),
        Commands::Activity => run_activity(&vault),
    }
}

fn run_folder(
    command: FolderCommand,
    vault: &JsonVault,
    scope: &ModuleScope,
    identity: &Identity,
    project_id: Option<String>,
) -> Result<()> {
    match command {
        FolderCommand::Tree(args) => {
            let records = vault.load_folders(scope)?;
            let tree = build_folder_tree(&records, args.view.into());
            if tree.is_empty() {
                println!("(no folders)");
            } else {
                print_tree(&tree, 0);
            }
            Ok(())
        }
        FolderCommand::Create(args) => {
            let mut draft = FolderDraft::new(args.name);
            if let Some(parent) = args.parent.as_deref() {
                draft = draft.under(FolderPath::parse(parent)?);
            }
            if let Some(entity) = args.entity.as_deref() {
                let (kind, label) = entity
                    .split_once(':')
                    .ok_or_else(|| anyhow!("--entity expects \"kind:label\", got {entity:?}"))?;
                draft = draft.for_entity(docshelf_folders::EntityRef::new(kind, label));
            }
            if let Some(project_name) = args.project_name.as_deref() {
                let id = project_id
                    .clone()
                    .ok_or_else(|| anyhow!("--project-name requires the global --project id"))?;
                draft = draft.for_project(ProjectRef::new(ProjectId::from_string(id), project_name));
            }
            let record = vault.create_folder(scope, draft, identity)?;
            println!("Created folder {}", record.path);
            Ok(())
        }
        FolderCommand::Rename { path, new_name } => {
            let record = resolve_folder(vault, scope, &path)?;
            vault.rename_folder(&record.id, &new_name, identity)?;
            println!("Renamed folder {} to {}", record.path, new_name);
            Ok(())
        }
        FolderCommand::Delete { path } => {
            let record = resolve_folder(vault, scope, &path)?;
            vault.delete_folder(&record.id, identity)?;
            println!("Deleted folder {}", record.path);
            Ok(())
        }
    }
}

fn run_doc(
    command: DocCommand,
    vault: &JsonVault,
    scope: &ModuleScope,
    identity: &Identity,
    vault_dir: &Path,
) -> Result<()> {
    match command {
        DocCommand::Import(args) => {
            let mut files = Vec::new();
            for input in &args.inputs {
                collect_files(input, &mut files)
                    .with_context(|| format!("reading {}", input.display()))?;
            }
            if files.is_empty() {
                bail!("no files to import");
            }
            if args.title.is_some() && files.len() > 1 {
                bail!("--title cannot apply to more than one file");
            }
            for file in files {
                let name = file
                    .file_name()
                    .and_then(|name| name.to_str())
                    .ok_or_else(|| anyhow!("unusable file name: {}", file.display()))?;
                let size = fs::metadata(&file)
                    .with_context(|| format!("reading metadata of {}", file.display()))?
                    .len();
                let mut draft = DocumentDraft::new(name, guess_mime(&file), size)
                    .with_tags(args.tags.clone());
                if let Some(title) = args.title.as_deref() {
                    draft = draft.with_title(title);
                }
                if let Some(description) = args.description.as_deref() {
                    draft = draft.with_description(description);
                }
                if let Some(folder) = args.folder.as_deref() {
                    draft = draft.with_folder(folder);
                }
                let record = vault.add_document(scope, draft, identity)?;
                println!(
                    "Imported {} v{} ({})",
                    record.file_name, record.version, record.id
                );
            }
            Ok(())
        }
        DocCommand::List(args) => {
            let mut browser = DocumentBrowser::new(
                JsonVault::new(vault_dir),
                JsonVault::new(vault_dir),
                scope.clone(),
            );
            browser.set_only_latest(!args.all_versions);
            browser.init();
            if let Some(error) = browser.error() {
                bail!("{error}");
            }
            if let Some(folder) = args.folder.as_deref() {
                browser.select_folder(Some(FolderPath::parse(folder)?));
            }
            if let Some(query) = args.query.as_deref() {
                if args.regex {
                    browser.set_filter(DocumentFilter::regex(query))?;
                } else {
                    browser.set_filter_query(query);
                }
            }
            browser.set_view_mode(args.view.into());

            let trail: Vec<String> = browser
                .breadcrumbs()
                .into_iter()
                .map(|segment| segment.label)
                .collect();
            println!("{}", trail.join(" > "));

            let mut rows: Vec<DocumentRecord> = browser
                .filtered_documents()
                .into_iter()
                .cloned()
                .collect();
            let direction = if args.ascending {
                OrderDirection::Ascending
            } else {
                OrderDirection::Descending
            };
            sort_documents(&mut rows, args.order_by.into(), direction);
            if rows.is_empty() {
                println!("(no documents)");
            }
            for row in rows {
                let folder = row.folder_path.as_deref().unwrap_or("-");
                println!(
                    "{}  v{}  {:>8}  {}  [{}]  {}",
                    row.id,
                    row.version,
                    row.size_bytes,
                    row.file_name,
                    row.tags.join(", "),
                    folder
                );
            }
            Ok(())
        }
        DocCommand::Move(args) => {
            let target = FolderPath::parse(&args.to)?;
            let ids: Vec<DocumentId> = args
                .ids
                .iter()
                .map(|id| DocumentId::from_string(id.clone()))
                .collect();
            vault.move_documents(&ids, &target, identity)?;
            println!("Moved {} document(s) to {}", ids.len(), target);
            Ok(())
        }
    }
}

fn run_activity(vault: &JsonVault) -> Result<()> {
    let log = vault.activity()?;
    if log.is_empty() {
        println!("(no activity)");
    }
    for entry in log {
        println!(
            "{}  {}  {}  {}",
            entry.at_unix, entry.action, entry.actor.user_name, entry.detail
        );
    }
    Ok(())
}

fn resolve_folder(vault: &JsonVault, scope: &ModuleScope, path: &str) -> Result<FolderRecord> {
    let wanted = FolderPath::parse(path)?;
    vault
        .load_folders(scope)?
        .into_iter()
        .find(|record| record.path == wanted)
        .ok_or_else(|| anyhow!("no folder at {wanted}"))
}

fn collect_files(input: &Path, files: &mut Vec<PathBuf>) -> Result<()> {
    if input.is_dir() {
        for entry in WalkDir::new(input).sort_by_file_name() {
            let entry = entry?;
            if entry.file_type().is_file() {
                files.push(entry.path().to_path_buf());
            }
        }
    } else if input.is_file() {
        files.push(input.to_path_buf());
    } else {
        bail!("{} is neither a file nor a directory", input.display());
    }
    Ok(())
}

fn guess_mime(path: &Path) -> &'static str {
    match path
        .extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| ext.to_ascii_lowercase())
        .as_deref()
    {
        Some("pdf") => "application/pdf",
        Some("png") => "image/png",
        Some("jpg") | Some("jpeg") => "image/jpeg",
        Some("txt") => "text/plain",
        Some("md") => "text/markdown",
        Some("csv") => "text/csv",
        Some("json") => "application/json",
        Some("doc") | Some("docx") => "application/msword",
        Some("xls") | Some("xlsx") => "application/vnd.ms-excel",
        _ => "application/octet-stream",
    }
}

fn print_tree(nodes: &[FolderNode], depth: usize) {
    for node in nodes {
        println!("{}{}", "  ".repeat(depth), node.name);
        print_tree(&node.children, depth + 1);
    }
}
