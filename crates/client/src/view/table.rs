//! Student Table and Pagination

use std::cmp::Ordering;
use storage::Student;
use uuid::Uuid;

/// Sortable column
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortColumn {
    Name,
    Email,
    Age,
}

/// Sort direction
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortDirection {
    Asc,
    Desc,
}

/// Display-only ordering of the fetched page
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SortState {
    pub column: SortColumn,
    pub direction: SortDirection,
}

impl SortState {
    /// Clicking a column: same column flips direction, a new column
    /// starts ascending
    pub fn toggle(current: Option<SortState>, column: SortColumn) -> SortState {
        match current {
            Some(state) if state.column == column => SortState {
                column,
                direction: match state.direction {
                    SortDirection::Asc => SortDirection::Desc,
                    SortDirection::Desc => SortDirection::Asc,
                },
            },
            _ => SortState {
                column,
                direction: SortDirection::Asc,
            },
        }
    }

    fn compare(&self, a: &Student, b: &Student) -> Ordering {
        let ordering = match self.column {
            SortColumn::Name => a.name.to_lowercase().cmp(&b.name.to_lowercase()),
            SortColumn::Email => a.email.cmp(&b.email),
            SortColumn::Age => a.age.cmp(&b.age),
        };
        match self.direction {
            SortDirection::Asc => ordering,
            SortDirection::Desc => ordering.reverse(),
        }
    }
}

/// One rendered table row
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableRow {
    /// 1-based position across pages
    pub index: u64,
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub age: u32,
    pub parents_email: String,
}

/// Build rows for one page, applying an optional display sort
pub fn table_rows(
    students: &[Student],
    page: u64,
    limit: u64,
    sort: Option<SortState>,
) -> Vec<TableRow> {
    let mut ordered: Vec<&Student> = students.iter().collect();
    if let Some(sort) = sort {
        ordered.sort_by(|a, b| sort.compare(a, b));
    }

    let offset = page.saturating_sub(1).saturating_mul(limit);
    ordered
        .into_iter()
        .zip(1u64..)
        .map(|(student, position)| TableRow {
            index: offset + position,
            id: student.id,
            name: student.name.clone(),
            email: student.email.clone(),
            age: student.age,
            parents_email: student.parents_email.clone(),
        })
        .collect()
}

/// Page number button
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageButton {
    pub number: u64,
    pub active: bool,
}

/// Previous/next plus one button per page
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PaginationControl {
    pub current: u64,
    pub total_pages: u64,
    pub buttons: Vec<PageButton>,
    pub previous_enabled: bool,
    pub next_enabled: bool,
    pub summary: String,
}

impl PaginationControl {
    /// `None` when there is nothing to paginate
    pub fn new(current: u64, total: u64, limit: u64, shown: usize) -> Option<Self> {
        let total_pages = total.div_ceil(limit.max(1));
        if total_pages == 0 {
            return None;
        }

        Some(Self {
            current,
            total_pages,
            buttons: (1..=total_pages)
                .map(|number| PageButton {
                    number,
                    active: number == current,
                })
                .collect(),
            previous_enabled: current > 1,
            next_enabled: current < total_pages,
            summary: format!("Showing {shown} of {total} members"),
        })
    }
}
