use std::io::{self, Read};

use uuid::Uuid;

use super::commands::{CategoryAction, DocAction, LinkAction, ListArgs, NoteAction, TagAction};
use crate::entity::{
    display_url, ensure_protocol, extract_domain, format_file_size, Category, CategoryDraft,
    CategoryPatch, CollectionKind, Document, DocumentPatch, Entity, Favorite, Link, LinkDraft,
    LinkPatch, Note, NoteDraft, NotePatch, Resource, Tag, TagDraft, TagPatch,
};
use crate::error::{LinkNestError, Result};
use crate::repository::{DocumentImport, Repository, Snapshot, Stored};
use crate::search::{Filter, Searchable, SortOrder, TagMatch};

// ============================================================================
// Links
// ============================================================================

pub async fn handle_link(repo: &Repository, action: LinkAction) -> Result<()> {
    match action {
        LinkAction::Add {
            url,
            title,
            description,
            category,
            no_category,
            tags,
            favorite,
            json,
        } => {
            let url: String = url.split_whitespace().collect();
            if url.is_empty() {
                return Err(LinkNestError::InvalidInput("URL is required".to_string()));
            }
            let url = ensure_protocol(&url);
            let title = non_blank(title).unwrap_or_else(|| extract_domain(&url));

            let snapshot = repo.snapshot().await;
            let mut draft = LinkDraft::new(url, title);
            draft.description = non_blank(description);
            draft.category = pick_category(&snapshot, category.as_deref(), no_category)?;
            draft.tags = resolve_tags(&snapshot, &tags)?;
            draft.is_favorite = favorite;

            let link = repo.add::<Link>(draft).await;
            if json {
                println!("{}", serde_json::to_string_pretty(&link)?);
            } else {
                println!("Created link ({}) - {}", short_id(link.id), link.title);
            }
        }
        LinkAction::List(args) => list_items::<Link>(repo, &args, TagMatch::Any, print_link).await?,
        LinkAction::Get { id, json } => {
            let snapshot = repo.snapshot().await;
            let link = find::<Link>(&snapshot, &id)?;
            if json {
                println!("{}", serde_json::to_string_pretty(link)?);
            } else {
                println!("Link ({})", link.id);
                println!("Title: {}", link.title);
                println!("URL: {}", link.url);
                println!("Domain: {}", extract_domain(&link.url));
                if let Some(ref description) = link.description {
                    println!("Description: {}", description);
                }
                print_details(&snapshot, link.category, &link.tags, link.is_favorite);
                println!("Created: {}", link.created_at.format("%Y-%m-%d %H:%M"));
                println!("Updated: {}", link.updated_at.format("%Y-%m-%d %H:%M"));
            }
        }
        LinkAction::Update {
            id,
            url,
            title,
            description,
            category,
            no_category,
            tags,
            clear_tags,
            json,
        } => {
            let snapshot = repo.snapshot().await;
            let id = resolve_id::<Link>(&snapshot, &id)?;
            let patch = LinkPatch {
                url: url.map(|u| ensure_protocol(u.trim())),
                title: non_blank(title),
                description: description.map(|d| non_blank(Some(d))),
                category: category_patch(&snapshot, category.as_deref(), no_category)?,
                tags: tags_patch(&snapshot, &tags, clear_tags)?,
                is_favorite: None,
            };

            let link = repo
                .update::<Link>(id, patch)
                .await
                .ok_or_else(|| LinkNestError::EntityNotFound(id.to_string()))?;
            if json {
                println!("{}", serde_json::to_string_pretty(&link)?);
            } else {
                println!("Updated link ({}) - {}", short_id(link.id), link.title);
            }
        }
        LinkAction::Delete { id } => delete_item::<Link>(repo, &id).await?,
        LinkAction::Favorite { id, json } => toggle_item::<Link>(repo, &id, json).await?,
    }
    Ok(())
}

// ============================================================================
// Notes
// ============================================================================

pub async fn handle_note(repo: &Repository, action: NoteAction) -> Result<()> {
    match action {
        NoteAction::Add {
            title,
            content,
            stdin,
            category,
            no_category,
            tags,
            favorite,
            json,
        } => {
            let title = non_blank(Some(title))
                .ok_or_else(|| LinkNestError::InvalidInput("Title is required".to_string()))?;
            let content = if stdin { Some(read_stdin()?) } else { content };

            let snapshot = repo.snapshot().await;
            let mut draft = NoteDraft::new(title, content.unwrap_or_default().trim());
            draft.category = pick_category(&snapshot, category.as_deref(), no_category)?;
            draft.tags = resolve_tags(&snapshot, &tags)?;
            draft.is_favorite = favorite;

            let note = repo.add::<Note>(draft).await;
            if json {
                println!("{}", serde_json::to_string_pretty(&note)?);
            } else {
                println!("Created note ({}) - {}", short_id(note.id), note.title);
            }
        }
        NoteAction::List(args) => list_items::<Note>(repo, &args, TagMatch::All, print_note).await?,
        NoteAction::Get { id, json } => {
            let snapshot = repo.snapshot().await;
            let note = find::<Note>(&snapshot, &id)?;
            if json {
                println!("{}", serde_json::to_string_pretty(note)?);
            } else {
                println!("Note ({})", note.id);
                println!("Title: {}", note.title);
                print_details(&snapshot, note.category, &note.tags, note.is_favorite);
                println!("Created: {}", note.created_at.format("%Y-%m-%d %H:%M"));
                println!("Updated: {}", note.updated_at.format("%Y-%m-%d %H:%M"));
                if !note.content.is_empty() {
                    println!("\n{}", note.content);
                }
            }
        }
        NoteAction::Update {
            id,
            title,
            content,
            stdin,
            category,
            no_category,
            tags,
            clear_tags,
            json,
        } => {
            let content = if stdin { Some(read_stdin()?) } else { content };

            let snapshot = repo.snapshot().await;
            let id = resolve_id::<Note>(&snapshot, &id)?;
            let patch = NotePatch {
                title: non_blank(title),
                content: content.map(|c| c.trim().to_string()),
                category: category_patch(&snapshot, category.as_deref(), no_category)?,
                tags: tags_patch(&snapshot, &tags, clear_tags)?,
                is_favorite: None,
            };

            let note = repo
                .update::<Note>(id, patch)
                .await
                .ok_or_else(|| LinkNestError::EntityNotFound(id.to_string()))?;
            if json {
                println!("{}", serde_json::to_string_pretty(&note)?);
            } else {
                println!("Updated note ({}) - {}", short_id(note.id), note.title);
            }
        }
        NoteAction::Delete { id } => delete_item::<Note>(repo, &id).await?,
        NoteAction::Favorite { id, json } => toggle_item::<Note>(repo, &id, json).await?,
    }
    Ok(())
}

// ============================================================================
// Documents
// ============================================================================

pub async fn handle_doc(repo: &Repository, action: DocAction) -> Result<()> {
    match action {
        DocAction::Import {
            path,
            name,
            mime_type,
            category,
            tags,
            favorite,
            json,
        } => {
            let snapshot = repo.snapshot().await;
            let mut import = DocumentImport::new(path);
            import.name = non_blank(name);
            import.mime_type = non_blank(mime_type);
            import.category = match category.as_deref() {
                Some(raw) => Some(resolve_category(&snapshot, raw)?),
                None => None,
            };
            import.tags = resolve_tags(&snapshot, &tags)?;
            import.is_favorite = favorite;

            let doc = repo.import_document(import).await?;
            if json {
                println!("{}", serde_json::to_string_pretty(&doc)?);
            } else {
                println!(
                    "Imported document ({}) - {} [{}, {}]",
                    short_id(doc.id),
                    doc.name,
                    doc.doc_type,
                    format_file_size(doc.size)
                );
            }
        }
        DocAction::List(args) => {
            list_items::<Document>(repo, &args, TagMatch::All, print_document).await?
        }
        DocAction::Get { id, json } => {
            let snapshot = repo.snapshot().await;
            let doc = find::<Document>(&snapshot, &id)?;
            if json {
                println!("{}", serde_json::to_string_pretty(doc)?);
            } else {
                println!("Document ({})", doc.id);
                println!("Name: {}", doc.name);
                println!("Type: {}", doc.doc_type);
                if let Some(ref mime) = doc.mime_type {
                    println!("MIME type: {}", mime);
                }
                println!("Size: {}", format_file_size(doc.size));
                println!("File: {}", doc.uri);
                print_details(&snapshot, doc.category, &doc.tags, doc.is_favorite);
                println!("Created: {}", doc.created_at.format("%Y-%m-%d %H:%M"));
            }
        }
        DocAction::Update {
            id,
            name,
            category,
            no_category,
            tags,
            clear_tags,
            json,
        } => {
            let snapshot = repo.snapshot().await;
            let id = resolve_id::<Document>(&snapshot, &id)?;
            let patch = DocumentPatch {
                name: non_blank(name),
                category: category_patch(&snapshot, category.as_deref(), no_category)?,
                tags: tags_patch(&snapshot, &tags, clear_tags)?,
                ..DocumentPatch::default()
            };

            let doc = repo
                .update::<Document>(id, patch)
                .await
                .ok_or_else(|| LinkNestError::EntityNotFound(id.to_string()))?;
            if json {
                println!("{}", serde_json::to_string_pretty(&doc)?);
            } else {
                println!("Updated document ({}) - {}", short_id(doc.id), doc.name);
            }
        }
        DocAction::Delete { id } => delete_item::<Document>(repo, &id).await?,
        DocAction::Favorite { id, json } => toggle_item::<Document>(repo, &id, json).await?,
    }
    Ok(())
}

// ============================================================================
// Categories and tags
// ============================================================================

pub async fn handle_category(repo: &Repository, action: CategoryAction) -> Result<()> {
    match action {
        CategoryAction::Add {
            name,
            color,
            icon,
            json,
        } => {
            let name = non_blank(Some(name))
                .ok_or_else(|| LinkNestError::InvalidInput("Category name is required".to_string()))?;
            validate_color(&color)?;
            let snapshot = repo.snapshot().await;
            if snapshot.category_name_taken(&name, None) {
                return Err(LinkNestError::InvalidInput(format!(
                    "A category named '{}' already exists",
                    name
                )));
            }

            let category = repo.add::<Category>(CategoryDraft::new(name, color, icon)).await;
            if json {
                println!("{}", serde_json::to_string_pretty(&category)?);
            } else {
                println!("Created category ({}) - {}", short_id(category.id), category.name);
            }
        }
        CategoryAction::List { json } => {
            let snapshot = repo.snapshot().await;
            if json {
                println!("{}", serde_json::to_string_pretty(&snapshot.categories)?);
            } else if snapshot.categories.is_empty() {
                println!("No categories found.");
            } else {
                println!("Categories:\n");
                for c in &snapshot.categories {
                    println!(
                        "  ({}) {} {} [{}] - {} items",
                        short_id(c.id),
                        c.color,
                        c.name,
                        c.icon,
                        snapshot.category_usage(c.id)
                    );
                }
            }
        }
        CategoryAction::Update {
            category,
            name,
            color,
            icon,
            json,
        } => {
            let snapshot = repo.snapshot().await;
            let id = resolve_category(&snapshot, &category)?;
            let name = non_blank(name);
            if let Some(ref name) = name {
                if snapshot.category_name_taken(name, Some(id)) {
                    return Err(LinkNestError::InvalidInput(format!(
                        "A category named '{}' already exists",
                        name
                    )));
                }
            }
            if let Some(ref color) = color {
                validate_color(color)?;
            }

            let updated = repo
                .update::<Category>(id, CategoryPatch { name, color, icon })
                .await
                .ok_or_else(|| LinkNestError::EntityNotFound(id.to_string()))?;
            if json {
                println!("{}", serde_json::to_string_pretty(&updated)?);
            } else {
                println!("Updated category ({}) - {}", short_id(updated.id), updated.name);
            }
        }
        CategoryAction::Delete { category } => {
            let snapshot = repo.snapshot().await;
            let id = resolve_category(&snapshot, &category)?;
            let usage = snapshot.category_usage(id);
            if !repo.delete::<Category>(id).await {
                return Err(LinkNestError::EntityNotFound(category));
            }
            println!("Deleted category ({}); {} items still reference it", short_id(id), usage);
        }
    }
    Ok(())
}

pub async fn handle_tag(repo: &Repository, action: TagAction) -> Result<()> {
    match action {
        TagAction::Add { name, color, json } => {
            let name = non_blank(Some(name))
                .ok_or_else(|| LinkNestError::InvalidInput("Tag name is required".to_string()))?;
            let color = color.unwrap_or_else(random_color);
            validate_color(&color)?;
            let snapshot = repo.snapshot().await;
            if snapshot.tag_name_taken(&name, None) {
                return Err(LinkNestError::InvalidInput(format!(
                    "A tag named '{}' already exists",
                    name
                )));
            }

            let tag = repo.add::<Tag>(TagDraft::new(name, color)).await;
            if json {
                println!("{}", serde_json::to_string_pretty(&tag)?);
            } else {
                println!("Created tag ({}) - {}", short_id(tag.id), tag.name);
            }
        }
        TagAction::List { json } => {
            let snapshot = repo.snapshot().await;
            if json {
                println!("{}", serde_json::to_string_pretty(&snapshot.tags)?);
            } else if snapshot.tags.is_empty() {
                println!("No tags found.");
            } else {
                println!("Tags:\n");
                for t in &snapshot.tags {
                    println!(
                        "  ({}) {} {} - {} items",
                        short_id(t.id),
                        t.color,
                        t.name,
                        snapshot.tag_usage(t.id)
                    );
                }
            }
        }
        TagAction::Update {
            tag,
            name,
            color,
            json,
        } => {
            let snapshot = repo.snapshot().await;
            let id = resolve_tag(&snapshot, &tag)?;
            let name = non_blank(name);
            if let Some(ref name) = name {
                if snapshot.tag_name_taken(name, Some(id)) {
                    return Err(LinkNestError::InvalidInput(format!(
                        "A tag named '{}' already exists",
                        name
                    )));
                }
            }
            if let Some(ref color) = color {
                validate_color(color)?;
            }

            let updated = repo
                .update::<Tag>(id, TagPatch { name, color })
                .await
                .ok_or_else(|| LinkNestError::EntityNotFound(id.to_string()))?;
            if json {
                println!("{}", serde_json::to_string_pretty(&updated)?);
            } else {
                println!("Updated tag ({}) - {}", short_id(updated.id), updated.name);
            }
        }
        TagAction::Delete { tag } => {
            let snapshot = repo.snapshot().await;
            let id = resolve_tag(&snapshot, &tag)?;
            let usage = snapshot.tag_usage(id);
            if !repo.delete::<Tag>(id).await {
                return Err(LinkNestError::EntityNotFound(tag));
            }
            println!("Deleted tag ({}); {} items still reference it", short_id(id), usage);
        }
    }
    Ok(())
}

// ============================================================================
// Cross-collection views
// ============================================================================

pub async fn handle_recent(repo: &Repository, limit: usize, json: bool) -> Result<()> {
    let snapshot = repo.snapshot().await;
    print_resources(&snapshot, &snapshot.recent(limit), json, "No items yet.")
}

pub async fn handle_favorites(repo: &Repository, limit: usize, json: bool) -> Result<()> {
    let snapshot = repo.snapshot().await;
    print_resources(&snapshot, &snapshot.favorites(limit), json, "No favorites yet.")
}

pub async fn handle_search(repo: &Repository, query: String, json: bool) -> Result<()> {
    let snapshot = repo.snapshot().await;
    let results = snapshot.search(&query);
    if !json && results.is_empty() {
        println!("No results found for '{}'.", query);
        return Ok(());
    }
    if !json {
        println!("Search results for '{}':\n", query);
    }
    print_resources(&snapshot, &results, json, "")
}

pub async fn handle_reset(repo: &Repository, yes: bool) -> Result<()> {
    if !yes {
        return Err(LinkNestError::InvalidInput(
            "Reset deletes every link, note, and document. Use --yes to confirm".to_string(),
        ));
    }

    repo.reset_all().await?;
    let snapshot = repo.snapshot().await;
    println!(
        "Reset complete. Restored {} categories and {} tags.",
        snapshot.categories.len(),
        snapshot.tags.len()
    );
    Ok(())
}

// ============================================================================
// Shared helpers
// ============================================================================

async fn list_items<E>(
    repo: &Repository,
    args: &ListArgs,
    default_match: TagMatch,
    print: fn(&E, &Snapshot),
) -> Result<()>
where
    E: Stored + Searchable,
{
    let snapshot = repo.snapshot().await;
    let (filter, order) = build_filter(&snapshot, args, default_match)?;
    let items = filter.apply(E::collection(&snapshot), order);

    if args.json {
        println!("{}", serde_json::to_string_pretty(&items)?);
    } else if items.is_empty() {
        println!("No {} found.", E::KIND);
    } else {
        println!("{} ({}):\n", heading(E::KIND), items.len());
        for item in &items {
            print(item, &snapshot);
        }
    }
    Ok(())
}

async fn delete_item<E: Stored>(repo: &Repository, raw: &str) -> Result<()> {
    let snapshot = repo.snapshot().await;
    let id = resolve_id::<E>(&snapshot, raw)?;
    if !repo.delete::<E>(id).await {
        return Err(LinkNestError::EntityNotFound(raw.to_string()));
    }
    println!("Deleted {} ({})", singular(E::KIND), short_id(id));
    Ok(())
}

async fn toggle_item<E: Stored + Favorite>(repo: &Repository, raw: &str, json: bool) -> Result<()> {
    let snapshot = repo.snapshot().await;
    let id = resolve_id::<E>(&snapshot, raw)?;
    let record = repo
        .toggle_favorite::<E>(id)
        .await
        .ok_or_else(|| LinkNestError::EntityNotFound(raw.to_string()))?;

    if json {
        println!("{}", serde_json::to_string_pretty(&record)?);
    } else if record.is_favorite() {
        println!("Added {} ({}) to favorites", singular(E::KIND), short_id(id));
    } else {
        println!("Removed {} ({}) from favorites", singular(E::KIND), short_id(id));
    }
    Ok(())
}

fn build_filter(snapshot: &Snapshot, args: &ListArgs, default_match: TagMatch) -> Result<(Filter, SortOrder)> {
    let order: SortOrder = args.sort.parse().map_err(LinkNestError::InvalidInput)?;
    let tag_match = match args.tag_match.as_deref() {
        Some(raw) => raw.parse().map_err(LinkNestError::InvalidInput)?,
        None => default_match,
    };
    let category = match args.category.as_deref() {
        Some(raw) => Some(resolve_category(snapshot, raw)?),
        None => None,
    };

    let filter = Filter {
        text: args.query.clone(),
        category,
        tags: resolve_tags(snapshot, &args.tags)?,
        tag_match,
        favorites_only: args.favorites,
        ..Filter::default()
    };
    Ok((filter, order))
}

/// Find a record by full UUID or unique id prefix.
fn resolve_id<E: Stored>(snapshot: &Snapshot, raw: &str) -> Result<Uuid> {
    let raw = raw.trim();
    if raw.is_empty() {
        return Err(LinkNestError::InvalidInput("An id is required".to_string()));
    }
    if let Ok(id) = Uuid::parse_str(raw) {
        return match snapshot.get::<E>(id) {
            Some(_) => Ok(id),
            None => Err(LinkNestError::EntityNotFound(raw.to_string())),
        };
    }

    let prefix = raw.to_lowercase();
    let mut matches = E::collection(snapshot)
        .iter()
        .map(Entity::id)
        .filter(|id| id.to_string().starts_with(&prefix));
    match (matches.next(), matches.next()) {
        (Some(id), None) => Ok(id),
        (None, _) => Err(LinkNestError::EntityNotFound(raw.to_string())),
        (Some(_), Some(_)) => Err(LinkNestError::InvalidInput(format!(
            "'{}' matches more than one {}",
            raw,
            singular(E::KIND)
        ))),
    }
}

fn find<'a, E: Stored>(snapshot: &'a Snapshot, raw: &str) -> Result<&'a E> {
    let id = resolve_id::<E>(snapshot, raw)?;
    snapshot
        .get::<E>(id)
        .ok_or_else(|| LinkNestError::EntityNotFound(raw.to_string()))
}

/// Category by name (case-insensitive) or id prefix.
fn resolve_category(snapshot: &Snapshot, raw: &str) -> Result<Uuid> {
    match snapshot.category_by_name(raw) {
        Some(category) => Ok(category.id),
        None => resolve_id::<Category>(snapshot, raw),
    }
}

/// Tag by name (case-insensitive) or id prefix.
fn resolve_tag(snapshot: &Snapshot, raw: &str) -> Result<Uuid> {
    match snapshot.tag_by_name(raw) {
        Some(tag) => Ok(tag.id),
        None => resolve_id::<Tag>(snapshot, raw),
    }
}

fn resolve_tags(snapshot: &Snapshot, raws: &[String]) -> Result<Vec<Uuid>> {
    let mut ids = Vec::with_capacity(raws.len());
    for raw in raws {
        let id = resolve_tag(snapshot, raw)?;
        if !ids.contains(&id) {
            ids.push(id);
        }
    }
    Ok(ids)
}

/// Category for a new link or note: the one asked for, none, or the first.
fn pick_category(snapshot: &Snapshot, raw: Option<&str>, none: bool) -> Result<Option<Uuid>> {
    if none {
        return Ok(None);
    }
    match raw {
        Some(raw) => Ok(Some(resolve_category(snapshot, raw)?)),
        None => Ok(snapshot.categories.first().map(|c| c.id)),
    }
}

fn category_patch(snapshot: &Snapshot, raw: Option<&str>, clear: bool) -> Result<Option<Option<Uuid>>> {
    if clear {
        return Ok(Some(None));
    }
    match raw {
        Some(raw) => Ok(Some(Some(resolve_category(snapshot, raw)?))),
        None => Ok(None),
    }
}

fn tags_patch(snapshot: &Snapshot, raws: &[String], clear: bool) -> Result<Option<Vec<Uuid>>> {
    if clear {
        return Ok(Some(Vec::new()));
    }
    if raws.is_empty() {
        return Ok(None);
    }
    Ok(Some(resolve_tags(snapshot, raws)?))
}

fn validate_color(color: &str) -> Result<()> {
    let hex = color.strip_prefix('#').unwrap_or_default();
    if matches!(hex.len(), 3 | 6) && hex.chars().all(|c| c.is_ascii_hexdigit()) {
        Ok(())
    } else {
        Err(LinkNestError::InvalidInput(format!(
            "Color must look like #RRGGBB, got '{}'",
            color
        )))
    }
}

fn random_color() -> String {
    let bytes = Uuid::new_v4();
    let bytes = bytes.as_bytes();
    format!("#{:02X}{:02X}{:02X}", bytes[0], bytes[1], bytes[2])
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn read_stdin() -> Result<String> {
    let mut content = String::new();
    io::stdin().read_to_string(&mut content)?;
    Ok(content)
}

fn short_id(id: Uuid) -> String {
    id.to_string()[..8].to_string()
}

fn singular(kind: CollectionKind) -> &'static str {
    match kind {
        CollectionKind::Links => "link",
        CollectionKind::Categories => "category",
        CollectionKind::Tags => "tag",
        CollectionKind::Notes => "note",
        CollectionKind::Documents => "document",
    }
}

fn heading(kind: CollectionKind) -> &'static str {
    match kind {
        CollectionKind::Links => "Links",
        CollectionKind::Categories => "Categories",
        CollectionKind::Tags => "Tags",
        CollectionKind::Notes => "Notes",
        CollectionKind::Documents => "Documents",
    }
}

// ============================================================================
// Rendering
// ============================================================================

fn favorite_marker(is_favorite: bool) -> &'static str {
    if is_favorite {
        "* "
    } else {
        ""
    }
}

fn print_link(link: &Link, snapshot: &Snapshot) {
    println!(
        "  ({}) {}{}",
        short_id(link.id),
        favorite_marker(link.is_favorite),
        link.title
    );
    println!("      {}", display_url(&link.url));
    print_refs(snapshot, link.category, &link.tags);
}

fn print_note(note: &Note, snapshot: &Snapshot) {
    println!(
        "  ({}) {}{}",
        short_id(note.id),
        favorite_marker(note.is_favorite),
        note.title
    );
    if let Some(first_line) = note.content.lines().find(|l| !l.trim().is_empty()) {
        let preview: String = first_line.chars().take(72).collect();
        println!("      {}", preview);
    }
    print_refs(snapshot, note.category, &note.tags);
}

fn print_document(doc: &Document, snapshot: &Snapshot) {
    println!(
        "  ({}) {}{} [{}, {}]",
        short_id(doc.id),
        favorite_marker(doc.is_favorite),
        doc.name,
        doc.doc_type,
        format_file_size(doc.size)
    );
    print_refs(snapshot, doc.category, &doc.tags);
}

fn print_refs(snapshot: &Snapshot, category: Option<Uuid>, tags: &[Uuid]) {
    let mut parts = Vec::new();
    if let Some(category) = snapshot.category(category) {
        parts.push(format!("category: {}", category.name));
    }
    let tag_names: Vec<&str> = snapshot.tags_for(tags).iter().map(|t| t.name.as_str()).collect();
    if !tag_names.is_empty() {
        parts.push(format!("tags: {}", tag_names.join(", ")));
    }
    if !parts.is_empty() {
        println!("      {}", parts.join(" | "));
    }
}

fn print_details(snapshot: &Snapshot, category: Option<Uuid>, tags: &[Uuid], is_favorite: bool) {
    match snapshot.category(category) {
        Some(category) => println!("Category: {}", category.name),
        None => println!("Category: (none)"),
    }
    let tag_names: Vec<&str> = snapshot.tags_for(tags).iter().map(|t| t.name.as_str()).collect();
    if !tag_names.is_empty() {
        println!("Tags: {}", tag_names.join(", "));
    }
    if is_favorite {
        println!("Favorite: yes");
    }
}

fn print_resources(snapshot: &Snapshot, items: &[Resource], json: bool, empty: &str) -> Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(items)?);
        return Ok(());
    }
    if items.is_empty() {
        println!("{}", empty);
        return Ok(());
    }
    for item in items {
        println!(
            "  [{}] ({}) {}{}",
            item.kind(),
            short_id(item.id()),
            favorite_marker(item.is_favorite()),
            item.title()
        );
        print_refs(snapshot, item.category(), item.tags());
    }
    Ok(())
}
