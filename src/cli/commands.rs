use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(name = "linknest")]
#[command(version, about = "Save links, notes, and documents locally")]
#[command(propagate_version = true)]
pub struct Cli {
    /// Data directory (overrides LINKNEST_DATA_DIR and the platform default)
    #[arg(long, global = true, value_name = "DIR")]
    pub data_dir: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Manage saved links
    Link(LinkCommand),

    /// Manage notes
    Note(NoteCommand),

    /// Manage imported documents
    Doc(DocCommand),

    /// Manage categories
    Category(CategoryCommand),

    /// Manage tags
    Tag(TagCommand),

    /// Show recently updated links, notes, and documents
    Recent {
        /// Maximum number of items
        #[arg(long, short = 'n', default_value_t = 10)]
        limit: usize,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Show favorite links, notes, and documents
    Favorites {
        /// Maximum number of items
        #[arg(long, short = 'n', default_value_t = 20)]
        limit: usize,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Search everything ("type:note tag:reference is:favorite rust")
    Search {
        /// Search text with optional type:/category:/tag:/is:/sort: terms
        query: String,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Delete all items and restore the default categories and tags
    Reset {
        /// Confirm the reset
        #[arg(long)]
        yes: bool,
    },
}

/// Filter and sort flags shared by the list commands.
#[derive(Args, Debug, Clone, Default)]
pub struct ListArgs {
    /// Only items whose text contains this (case-insensitive)
    #[arg(long, short = 'q')]
    pub query: Option<String>,

    /// Only items in this category (name or id prefix)
    #[arg(long, short = 'c')]
    pub category: Option<String>,

    /// Only items with this tag (name or id prefix, can be specified multiple times)
    #[arg(long = "tag", short = 't')]
    pub tags: Vec<String>,

    /// How several --tag filters combine: any or all (links default to
    /// any, notes and documents to all)
    #[arg(long = "match", value_name = "MODE")]
    pub tag_match: Option<String>,

    /// Only favorites
    #[arg(long)]
    pub favorites: bool,

    /// Sort order (newest, oldest, alphabetical, favorites)
    #[arg(long, short = 's', default_value = "newest")]
    pub sort: String,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

#[derive(Args, Debug)]
pub struct LinkCommand {
    #[command(subcommand)]
    pub action: LinkAction,
}

#[derive(Subcommand, Debug)]
pub enum LinkAction {
    /// Save a link
    Add {
        /// URL (https:// is added when no scheme is given)
        url: String,

        /// Title (defaults to the domain)
        #[arg(long)]
        title: Option<String>,

        /// Description
        #[arg(long, short = 'd')]
        description: Option<String>,

        /// Category (name or id prefix; defaults to the first category)
        #[arg(long, short = 'c', conflicts_with = "no_category")]
        category: Option<String>,

        /// Save without a category
        #[arg(long)]
        no_category: bool,

        /// Tags (name or id prefix, can be specified multiple times)
        #[arg(long = "tag", short = 't')]
        tags: Vec<String>,

        /// Mark as favorite
        #[arg(long)]
        favorite: bool,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// List links
    List(ListArgs),

    /// Show one link
    Get {
        /// Link id (full UUID or unique prefix)
        id: String,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Change fields of a link
    Update {
        /// Link id (full UUID or unique prefix)
        id: String,

        #[arg(long)]
        url: Option<String>,

        #[arg(long)]
        title: Option<String>,

        #[arg(long, short = 'd')]
        description: Option<String>,

        /// New category (name or id prefix)
        #[arg(long, short = 'c', conflicts_with = "no_category")]
        category: Option<String>,

        /// Remove the category
        #[arg(long)]
        no_category: bool,

        /// Replace the tags (can be specified multiple times)
        #[arg(long = "tag", short = 't')]
        tags: Vec<String>,

        /// Remove all tags
        #[arg(long, conflicts_with = "tags")]
        clear_tags: bool,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Delete a link
    Delete {
        /// Link id (full UUID or unique prefix)
        id: String,
    },

    /// Toggle the favorite flag
    Favorite {
        /// Link id (full UUID or unique prefix)
        id: String,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
}

#[derive(Args, Debug)]
pub struct NoteCommand {
    #[command(subcommand)]
    pub action: NoteAction,
}

#[derive(Subcommand, Debug)]
pub enum NoteAction {
    /// Write a note
    Add {
        /// Note title
        title: String,

        /// Note content
        #[arg(long, conflicts_with = "stdin")]
        content: Option<String>,

        /// Read content from stdin
        #[arg(long)]
        stdin: bool,

        /// Category (name or id prefix; defaults to the first category)
        #[arg(long, short = 'c', conflicts_with = "no_category")]
        category: Option<String>,

        /// Save without a category
        #[arg(long)]
        no_category: bool,

        /// Tags (name or id prefix, can be specified multiple times)
        #[arg(long = "tag", short = 't')]
        tags: Vec<String>,

        /// Mark as favorite
        #[arg(long)]
        favorite: bool,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// List notes
    List(ListArgs),

    /// Show one note
    Get {
        /// Note id (full UUID or unique prefix)
        id: String,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Change fields of a note
    Update {
        /// Note id (full UUID or unique prefix)
        id: String,

        #[arg(long)]
        title: Option<String>,

        #[arg(long, conflicts_with = "stdin")]
        content: Option<String>,

        /// Read new content from stdin
        #[arg(long)]
        stdin: bool,

        /// New category (name or id prefix)
        #[arg(long, short = 'c', conflicts_with = "no_category")]
        category: Option<String>,

        /// Remove the category
        #[arg(long)]
        no_category: bool,

        /// Replace the tags (can be specified multiple times)
        #[arg(long = "tag", short = 't')]
        tags: Vec<String>,

        /// Remove all tags
        #[arg(long, conflicts_with = "tags")]
        clear_tags: bool,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Delete a note
    Delete {
        /// Note id (full UUID or unique prefix)
        id: String,
    },

    /// Toggle the favorite flag
    Favorite {
        /// Note id (full UUID or unique prefix)
        id: String,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
}

#[derive(Args, Debug)]
pub struct DocCommand {
    #[command(subcommand)]
    pub action: DocAction,
}

#[derive(Subcommand, Debug)]
pub enum DocAction {
    /// Copy a file into the document directory
    Import {
        /// File to import
        path: PathBuf,

        /// Display name (defaults to the file name)
        #[arg(long)]
        name: Option<String>,

        /// MIME type, used to derive the display type
        #[arg(long)]
        mime_type: Option<String>,

        /// Category (name or id prefix)
        #[arg(long, short = 'c')]
        category: Option<String>,

        /// Tags (name or id prefix, can be specified multiple times)
        #[arg(long = "tag", short = 't')]
        tags: Vec<String>,

        /// Mark as favorite
        #[arg(long)]
        favorite: bool,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// List documents
    List(ListArgs),

    /// Show one document
    Get {
        /// Document id (full UUID or unique prefix)
        id: String,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Change fields of a document
    Update {
        /// Document id (full UUID or unique prefix)
        id: String,

        #[arg(long)]
        name: Option<String>,

        /// New category (name or id prefix)
        #[arg(long, short = 'c', conflicts_with = "no_category")]
        category: Option<String>,

        /// Remove the category
        #[arg(long)]
        no_category: bool,

        /// Replace the tags (can be specified multiple times)
        #[arg(long = "tag", short = 't')]
        tags: Vec<String>,

        /// Remove all tags
        #[arg(long, conflicts_with = "tags")]
        clear_tags: bool,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Delete a document and its stored file
    Delete {
        /// Document id (full UUID or unique prefix)
        id: String,
    },

    /// Toggle the favorite flag
    Favorite {
        /// Document id (full UUID or unique prefix)
        id: String,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
}

#[derive(Args, Debug)]
pub struct CategoryCommand {
    #[command(subcommand)]
    pub action: CategoryAction,
}

#[derive(Subcommand, Debug)]
pub enum CategoryAction {
    /// Create a category
    Add {
        /// Category name (must be unique, ignoring case)
        name: String,

        /// Color as #RRGGBB
        #[arg(long, default_value = "#6200ee")]
        color: String,

        /// Icon name
        #[arg(long, default_value = "folder")]
        icon: String,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// List categories with usage counts
    List {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Rename or recolor a category
    Update {
        /// Category name or id prefix
        category: String,

        #[arg(long)]
        name: Option<String>,

        #[arg(long)]
        color: Option<String>,

        #[arg(long)]
        icon: Option<String>,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Delete a category (items keep a dangling reference)
    Delete {
        /// Category name or id prefix
        category: String,
    },
}

#[derive(Args, Debug)]
pub struct TagCommand {
    #[command(subcommand)]
    pub action: TagAction,
}

#[derive(Subcommand, Debug)]
pub enum TagAction {
    /// Create a tag
    Add {
        /// Tag name (must be unique, ignoring case)
        name: String,

        /// Color as #RRGGBB (random when omitted)
        #[arg(long)]
        color: Option<String>,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// List tags with usage counts
    List {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Rename or recolor a tag
    Update {
        /// Tag name or id prefix
        tag: String,

        #[arg(long)]
        name: Option<String>,

        #[arg(long)]
        color: Option<String>,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Delete a tag (items keep a dangling reference)
    Delete {
        /// Tag name or id prefix
        tag: String,
    },
}
