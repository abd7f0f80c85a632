//! Changelog rendering and writing.

pub mod render;
pub mod writer;

pub use render::{CommitGroup, RenderOptions, render_changelog, render_package_section, summarize};
pub use writer::{
    CHANGELOG_FILE_NAME, CHANGELOG_HEADER, ChangelogWrite, has_version, prepend_section,
    write_changelog_file,
};
