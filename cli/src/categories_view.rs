use crate::global_settings::GlobalSettings;
use crate::tables::{Column, Table, Width};
use itertools::Itertools;
use tally_lib::categories::{CategoryId, CategoryTree};

pub fn categories_view(
    categories: &CategoryTree,
    settings: &GlobalSettings,
    width: usize,
) -> String {
    let name_image = |id: &CategoryId, _: &()| {
        categories.get(*id).map(|c| c.name.clone()).unwrap_or_default()
    };
    let diff_image = |id: &CategoryId, _: &()| {
        if categories.is_diff(*id) { "diff" } else { "" }.to_string()
    };
    let rules_image = |id: &CategoryId, _: &()| {
        categories
            .get(*id)
            .map(|c| {
                c.descriptions
                    .iter()
                    .map(|d| format!("{d}*"))
                    .chain(c.counterparts.iter().map(|cp| format!("={cp}")))
                    .join(", ")
            })
            .unwrap_or_default()
    };
    let columns = vec![
        Column::new((), &name_image)
            .show_indent()
            .with_title("Category")
            .with_width(Width::ExpandWithMin(8)),
        Column::new((), &diff_image).with_title("Diff"),
        Column::new((), &rules_image)
            .with_title("Matches")
            .with_width(Width::ExpandWithMin(10)),
    ];
    let mut table = Table::new(columns, &settings.table).with_col_headers();
    for id in categories.iter_preorder() {
        table.add_row(&id, categories.depth(id));
    }
    table.to_string(width)
}
