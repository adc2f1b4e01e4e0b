//! Terminal renderer for a [`ViewState`].

use std::io::{self, Write};

use bucketview_core::ViewState;
use bucketview_core::navigator::HOME_LABEL;
use bucketview_core::view::{RowKind, TableRow};

const NAME_WIDTH: usize = 48;
const DATE_WIDTH: usize = 20;

/// ANSI escape sequences for one theme.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Palette {
    accent: &'static str,
    folder: &'static str,
    muted: &'static str,
    error: &'static str,
    reset: &'static str,
}

impl Palette {
    /// Light terminal theme.
    pub const LIGHT: Self = Self {
        accent: "\x1b[34m",
        folder: "\x1b[1;34m",
        muted: "\x1b[90m",
        error: "\x1b[1;31m",
        reset: "\x1b[0m",
    };

    /// Dark terminal theme.
    pub const DARK: Self = Self {
        accent: "\x1b[96m",
        folder: "\x1b[1;93m",
        muted: "\x1b[37m",
        error: "\x1b[1;91m",
        reset: "\x1b[0m",
    };

    /// No escapes at all, for pipes and tests.
    pub const PLAIN: Self = Self {
        accent: "",
        folder: "",
        muted: "",
        error: "",
        reset: "",
    };

    /// Palette for the persisted theme flag.
    pub fn for_theme(dark_mode: bool) -> Self {
        if dark_mode { Self::DARK } else { Self::LIGHT }
    }
}

/// Draw one frame.
pub fn render<W: Write>(out: &mut W, view: &ViewState, palette: Palette) -> io::Result<()> {
    render_breadcrumb(out, view, palette)?;

    if view.loading {
        writeln!(out, "{}Loading...{}", palette.muted, palette.reset)?;
    }
    if let Some(error) = &view.error {
        writeln!(out, "{}{error}{}", palette.error, palette.reset)?;
    }

    writeln!(
        out,
        "{}{:>4}  {:<NAME_WIDTH$} {:<DATE_WIDTH$} {:>12}{}",
        palette.muted, "#", "Name", "Last modified", "Size", palette.reset
    )?;

    let mut shown = 0;
    for (index, row) in view.visible_rows().enumerate() {
        render_row(out, index + 1, row, palette)?;
        shown += 1;
    }
    if shown == 0 {
        let note = if view.rows.is_empty() { "(empty)" } else { "(no matches)" };
        writeln!(out, "{}      {note}{}", palette.muted, palette.reset)?;
    }

    render_pagination(out, view, palette)?;

    if !view.filter.is_empty() {
        writeln!(
            out,
            "{}filter \"{}\": {shown} of {} rows shown{}",
            palette.muted,
            view.filter,
            view.rows.len(),
            palette.reset
        )?;
    }
    Ok(())
}

fn render_breadcrumb<W: Write>(out: &mut W, view: &ViewState, palette: Palette) -> io::Result<()> {
    write!(out, "{}[0] {HOME_LABEL}{}", palette.accent, palette.reset)?;
    for (index, crumb) in view.breadcrumb.iter().enumerate() {
        if crumb.is_navigable() {
            write!(
                out,
                " / {}[{}] {}{}",
                palette.accent,
                index + 1,
                crumb.label,
                palette.reset
            )?;
        } else {
            write!(out, " / {}", crumb.label)?;
        }
    }
    writeln!(out, "    {}{}{}", palette.muted, view.home_url, palette.reset)
}

fn render_row<W: Write>(out: &mut W, number: usize, row: &TableRow, palette: Palette) -> io::Result<()> {
    let (marker, color) = match row.kind {
        RowKind::Folder => ("/", palette.folder),
        RowKind::Bucket => ("@", palette.folder),
        RowKind::File => ("", ""),
    };
    let name = truncate(&format!("{}{marker}", row.name), NAME_WIDTH);
    writeln!(
        out,
        "{number:>4}  {color}{name:<NAME_WIDTH$}{} {:<DATE_WIDTH$} {:>12}",
        palette.reset,
        row.modified_text(),
        row.size_text()
    )
}

fn render_pagination<W: Write>(out: &mut W, view: &ViewState, palette: Palette) -> io::Result<()> {
    let prev = if view.has_previous { "< prev" } else { "      " };
    let next = if view.has_next { "next >" } else { "      " };
    writeln!(
        out,
        "{}{prev}{}  Page {} of {}  {}{next}{}",
        palette.accent,
        palette.reset,
        view.page.current_page,
        view.page.total_pages,
        palette.accent,
        palette.reset
    )
}

fn truncate(text: &str, width: usize) -> String {
    if text.chars().count() <= width {
        return text.to_owned();
    }
    let mut short: String = text.chars().take(width.saturating_sub(3)).collect();
    short.push_str("...");
    short
}
