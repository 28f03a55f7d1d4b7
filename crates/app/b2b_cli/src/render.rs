//! Plain-text tables for the list commands.

use b2b_core::models::{Cart, Customer, LineItem, Quote, Wishlist, format_timestamp};

pub trait TableRow {
    const HEADERS: &'static [&'static str];

    fn cells(&self) -> Vec<String>;
}

fn id(id: Option<i64>) -> String {
    id.map(|id| id.to_string()).unwrap_or_else(|| "-".into())
}

fn or_dash(value: Option<&str>) -> String {
    value
        .filter(|v| !v.is_empty())
        .map(str::to_string)
        .unwrap_or_else(|| "-".into())
}

fn item_count(items: Option<&Vec<LineItem>>) -> String {
    items.map_or(0, Vec::len).to_string()
}

impl TableRow for Customer {
    const HEADERS: &'static [&'static str] =
        &["ID", "Name", "Email", "Customer #", "Created", "Updated"];

    fn cells(&self) -> Vec<String> {
        vec![
            id(self.id),
            format!("{} {}", self.first_name, self.last_name),
            self.email.clone(),
            or_dash(self.customer_number.as_deref()),
            format_timestamp(self.created_at.as_deref()),
            format_timestamp(self.updated_at.as_deref()),
        ]
    }
}

impl TableRow for Cart {
    const HEADERS: &'static [&'static str] =
        &["ID", "Name", "Location", "Items", "Created", "Updated"];

    fn cells(&self) -> Vec<String> {
        vec![
            id(self.id),
            self.name.clone(),
            or_dash(self.location.as_ref().map(|l| l.name.as_str())),
            item_count(self.items.as_ref()),
            format_timestamp(self.created_at.as_deref()),
            format_timestamp(self.updated_at.as_deref()),
        ]
    }
}

impl TableRow for Quote {
    const HEADERS: &'static [&'static str] =
        &["ID", "Identifier", "Customer", "Location", "Items", "PO #"];

    fn cells(&self) -> Vec<String> {
        vec![
            id(self.id),
            or_dash(self.identifier.as_deref()),
            self.customer
                .as_ref()
                .map(|c| c.full_name())
                .unwrap_or_else(|| "-".into()),
            or_dash(self.location.as_ref().map(|l| l.name.as_str())),
            item_count(self.items.as_ref()),
            or_dash(self.po_number.as_deref()),
        ]
    }
}

impl TableRow for Wishlist {
    const HEADERS: &'static [&'static str] =
        &["ID", "Name", "Customer", "Items", "Created", "Updated"];

    fn cells(&self) -> Vec<String> {
        vec![
            id(self.id),
            self.name.clone(),
            self.customer
                .as_ref()
                .map(|c| c.full_name())
                .unwrap_or_else(|| "-".into()),
            item_count(self.items.as_ref()),
            format_timestamp(self.created_at.as_deref()),
            format_timestamp(self.updated_at.as_deref()),
        ]
    }
}

fn line<'a>(values: impl Iterator<Item = &'a str>, widths: &[usize]) -> String {
    values
        .zip(widths)
        .map(|(value, &width)| format!("{value:<width$}"))
        .collect::<Vec<_>>()
        .join("  ")
        .trim_end()
        .to_string()
}

/// Left-aligned columns separated by two spaces.
pub fn table<T: TableRow>(rows: &[T]) -> String {
    let cells: Vec<Vec<String>> = rows.iter().map(TableRow::cells).collect();
    let mut widths: Vec<usize> = T::HEADERS.iter().map(|h| h.chars().count()).collect();
    for row in &cells {
        for (width, cell) in widths.iter_mut().zip(row) {
            *width = (*width).max(cell.chars().count());
        }
    }

    let mut out = Vec::with_capacity(cells.len() + 1);
    out.push(line(T::HEADERS.iter().copied(), &widths));
    for row in &cells {
        out.push(line(row.iter().map(String::as_str), &widths));
    }
    out.join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn columns_line_up() {
        let carts = vec![
            Cart {
                id: Some(1),
                name: "Spring".into(),
                customer: None,
                location: None,
                created_at: None,
                updated_at: None,
                items: None,
            },
            Cart {
                id: Some(1234),
                name: "A much longer name".into(),
                customer: None,
                location: None,
                created_at: None,
                updated_at: None,
                items: Some(Vec::new()),
            },
        ];
        let out = table(&carts);
        let lines: Vec<&str> = out.lines().collect();
        assert_eq!(lines.len(), 3);
        assert!(lines[0].starts_with("ID    Name                "));
        assert!(lines[1].starts_with("1     Spring              -"));
        assert!(lines[2].starts_with("1234  A much longer name  -"));
    }
}
