#[derive(Clone, Copy)]
pub enum Width {
    Fixed(usize),
    Auto,
    ExpandWithMin(usize),
}
#[derive(Clone, Copy)]
pub enum Align {
    Left,
    Center,
    Right,
}
#[derive(Clone, Copy)]
pub enum Truncate {
    Left,  //  Remove left-most characters
    Right, //  Remove right-most characters
}
#[derive(Clone, Copy)]
pub enum ColumnFooter {
    Show,
    Hide,
}

pub struct Column<'a, TRow, TCol> {
    align: Align,
    truncate: Truncate,
    width: Width,
    footer: ColumnFooter,
    title: Option<String>,
    data: TCol,
    get_content: &'a dyn Fn(&TRow, &TCol) -> String,
    show_indent: bool,

    min_width: usize,
    computed_width: usize,
}
impl<'a, TRow, TCol> Column<'a, TRow, TCol> {
    pub fn new(
        data: TCol,
        get_content: &'a dyn Fn(&TRow, &TCol) -> String,
    ) -> Self {
        Self {
            align: Align::Left,
            truncate: Truncate::Right,
            width: Width::Auto,
            footer: ColumnFooter::Show,
            title: None,
            computed_width: 0,
            min_width: 0,
            show_indent: false,
            data,
            get_content,
        }
    }

    // Whether this column should show the indentation
    pub fn show_indent(mut self) -> Self {
        self.show_indent = true;
        self
    }

    pub fn with_title(mut self, title: &str) -> Self {
        self.title = Some(title.to_string());
        self
    }

    pub fn with_footer(mut self, footer: ColumnFooter) -> Self {
        self.footer = footer;
        self
    }

    pub fn with_align(mut self, align: Align) -> Self {
        self.align = align;
        self
    }

    pub fn with_truncate(mut self, truncate: Truncate) -> Self {
        self.truncate = truncate;
        self
    }

    pub fn with_width(mut self, width: Width) -> Self {
        self.width = width;
        self
    }

    fn content(&self, row: &TRow) -> String {
        (self.get_content)(row, &self.data)
    }

    fn title_width(&self) -> usize {
        self.title.as_ref().map_or(0, |t| t.chars().count())
    }
}

enum RowData {
    Separator,
    Cells { indent: usize, cells: Vec<String> },
    Headers,
}

#[derive(Clone)]
pub struct Settings {
    pub colsep: String,
    pub indent_size: usize,
}
impl Default for Settings {
    fn default() -> Self {
        Settings {
            colsep: "│".to_string(),
            indent_size: 1,
        }
    }
}

pub struct Table<'a, TRow, TCol> {
    columns: Vec<Column<'a, TRow, TCol>>,
    rows: Vec<RowData>,
    title: Option<String>,
    settings: Settings,
}
impl<'a, TRow, TCol> Table<'a, TRow, TCol> {
    pub fn new(
        columns: Vec<Column<'a, TRow, TCol>>,
        settings: &Settings,
    ) -> Self {
        Self {
            rows: Vec::new(),
            columns,
            title: None,
            settings: settings.clone(),
        }
    }

    pub fn with_title(mut self, title: &str) -> Self {
        self.title = Some(title.to_string());
        self
    }

    pub fn with_col_headers(mut self) -> Self {
        self.rows.push(RowData::Headers);
        self.rows.push(RowData::Separator);
        self
    }

    pub fn add_row(&mut self, row: &TRow, indent: usize) {
        let cells = self.columns.iter().map(|col| col.content(row)).collect();
        self.rows.push(RowData::Cells { indent, cells });
    }

    pub fn add_footer(&mut self, total: &TRow) {
        let cells = self
            .columns
            .iter()
            .map(|col| match col.footer {
                ColumnFooter::Hide => String::new(),
                ColumnFooter::Show => col.content(total),
            })
            .collect();
        self.rows.push(RowData::Separator);
        self.rows.push(RowData::Cells { indent: 0, cells });
    }

    /// The width needed by a column to display all its cells, and the width
    /// it needs at the very least (i.e. the indentation plus `col_min`)
    fn natural_width(&self, colidx: usize, col_min: usize) -> (usize, usize) {
        let indent_size = self.settings.indent_size;
        let Some(col) = self.columns.get(colidx) else {
            return (0, 0);
        };
        let mut ideal = 0;
        let mut min = 0;
        for row in &self.rows {
            match row {
                RowData::Separator => {}
                RowData::Headers => ideal = ideal.max(col.title_width()),
                RowData::Cells { indent, cells } => {
                    let idt = if col.show_indent { indent * indent_size } else { 0 };
                    let len = cells.get(colidx).map_or(0, |c| c.chars().count());
                    ideal = ideal.max(idt + len);
                    min = min.max(idt + col_min);
                }
            }
        }
        (ideal, min)
    }

    /// Compute the size allocated for each column.
    /// max_width should not include the space for column separators.
    fn compute_widths(&mut self, max_width: usize) {
        let mut expandable_count: usize = 0;
        let mut expandable_width: usize = 0;
        let mut expandable_min: usize = 0;
        let mut fixed_width: usize = 0; // minimal requested width

        for colidx in 0..self.columns.len() {
            let Some(width) = self.columns.get(colidx).map(|c| c.width) else {
                continue;
            };
            let (computed, min) = match width {
                Width::Fixed(w) => (w, w),
                Width::Auto => {
                    let (ideal, _) = self.natural_width(colidx, 0);
                    (ideal, ideal)
                }
                Width::ExpandWithMin(col_min) => {
                    let (ideal, min) = self.natural_width(colidx, col_min);
                    expandable_width += ideal;
                    expandable_min += min;
                    expandable_count += 1;
                    (ideal, min)
                }
            };
            fixed_width += min;
            if let Some(col) = self.columns.get_mut(colidx) {
                col.computed_width = computed;
                col.min_width = min;
            }
        }

        // Expandable columns were counted with their minimal width in
        // fixed_width, only shrink them when the ideal does not fit.
        let all_ideal = fixed_width - expandable_min + expandable_width;
        if all_ideal <= max_width || expandable_count == 0 {
            return;
        }

        // When the screen is too narrow, rows will span several lines
        let extra_width = max_width.saturating_sub(fixed_width);
        let adjust = extra_width / expandable_count;
        for col in &mut self.columns {
            if let Width::ExpandWithMin(_) = col.width {
                col.computed_width =
                    col.computed_width.min(col.min_width + adjust);
            }
        }
    }

    pub fn to_string(&mut self, max_width: usize) -> String {
        let seps = self.columns.len().saturating_sub(1)
            * self.settings.colsep.chars().count();
        self.compute_widths(max_width.saturating_sub(seps));
        let mut result = String::new();

        if let Some(title) = &self.title {
            push_sep(&mut result, max_width);
            result.push('\n');
            push_align(&mut result, title, max_width, Align::Center, 0);
            result.push('\n');
            push_sep(&mut result, max_width);
            result.push('\n');
        }

        for row in &self.rows {
            for (colidx, col) in self.columns.iter().enumerate() {
                if colidx > 0 {
                    result.push_str(&self.settings.colsep);
                }
                match row {
                    RowData::Separator => {
                        push_sep(&mut result, col.computed_width);
                    }
                    RowData::Headers => {
                        let title = col.title.as_deref().unwrap_or_default();
                        push_align(
                            &mut result,
                            truncate(title, col.truncate, col.computed_width),
                            col.computed_width,
                            Align::Center,
                            0,
                        );
                    }
                    RowData::Cells { indent, cells } => {
                        let idt = if col.show_indent {
                            indent * self.settings.indent_size
                        } else {
                            0
                        };
                        let width = col.computed_width.saturating_sub(idt);
                        let cell = cells.get(colidx).map_or("", String::as_str);
                        push_align(
                            &mut result,
                            truncate(cell, col.truncate, width),
                            width,
                            col.align,
                            idt,
                        );
                    }
                }
            }
            result.push('\n');
        }

        result
    }
}

fn trunc_keep_last(s: &str, max_width: usize) -> &str {
    if max_width == 0 {
        return "";
    }
    s.char_indices()
        .rev()
        .nth(max_width - 1)
        .and_then(|(i, _)| s.get(i..))
        .unwrap_or(s)
}
fn trunc_keep_first(s: &str, max_width: usize) -> &str {
    s.char_indices()
        .nth(max_width)
        .and_then(|(i, _)| s.get(..i))
        .unwrap_or(s)
}
fn push_sep(into: &mut String, width: usize) {
    into.push_str(&"─".repeat(width));
}
fn push_align(
    into: &mut String,
    value: &str,
    width: usize,
    align: Align,
    indent_chars: usize,
) {
    into.push_str(&" ".repeat(indent_chars));
    match align {
        Align::Left => into.push_str(&format!("{value:<width$}")),
        Align::Center => into.push_str(&format!("{value:^width$}")),
        Align::Right => into.push_str(&format!("{value:>width$}")),
    }
}

/// Truncate the string if necessary
fn truncate(val: &str, truncate: Truncate, width: usize) -> &str {
    if val.chars().count() <= width {
        val
    } else {
        match truncate {
            Truncate::Right => trunc_keep_first(val, width),
            Truncate::Left => trunc_keep_last(val, width),
        }
    }
}
