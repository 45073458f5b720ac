mod commands;
mod handlers;

pub use commands::{
    CategoryAction, CategoryCommand, Cli, Commands, DocAction, DocCommand, LinkAction, LinkCommand,
    ListArgs, NoteAction, NoteCommand, TagAction, TagCommand,
};
pub use handlers::{
    handle_category, handle_doc, handle_favorites, handle_link, handle_note, handle_recent,
    handle_reset, handle_search, handle_tag,
};
