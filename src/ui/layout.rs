//! Hit-test rectangles recorded during rendering.

/// Rectangle in terminal cells as `(x, y, width, height)`.
pub type CellRect = (u16, u16, u16, u16);

/// What a pointer position maps to.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Hit {
    /// The text input.
    Input,
    /// A column header, by column key.
    Header(String),
    /// A presented row, by index into the presented rows.
    Row(usize),
    /// Inside the dropdown frame but on no actionable cell.
    Dropdown,
    /// Outside the control.
    Outside,
}

/// Rectangles of the last rendered frame.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct UiLayout {
    /// Input box including its border.
    pub input_rect: Option<CellRect>,
    /// Dropdown frame including its border; `None` while closed.
    pub dropdown_rect: Option<CellRect>,
    /// Header cells as `(column key, rect)`.
    pub header_cells: Vec<(String, CellRect)>,
    /// Area occupied by body rows.
    pub rows_rect: Option<CellRect>,
    /// Index of the first visible presented row.
    pub row_offset: usize,
    /// Number of presented rows.
    pub row_count: usize,
}

/// Whether `(x, y)` falls inside `rect`.
#[must_use]
pub const fn contains(rect: CellRect, x: u16, y: u16) -> bool {
    let (rx, ry, rw, rh) = rect;
    x >= rx && x < rx.saturating_add(rw) && y >= ry && y < ry.saturating_add(rh)
}

impl UiLayout {
    /// Forget all rectangles, e.g. before a redraw.
    pub fn reset(&mut self) {
        *self = Self::default();
    }

    /// What: Map a pointer position to a control region.
    ///
    /// Inputs:
    /// - `x`, `y`: Pointer position in terminal cells
    ///
    /// Output:
    /// - The most specific `Hit` for the position.
    ///
    /// Details:
    /// - Body lines past the last presented row count as `Dropdown`, not as a row.
    #[must_use]
    pub fn hit_test(&self, x: u16, y: u16) -> Hit {
        if self.input_rect.is_some_and(|r| contains(r, x, y)) {
            return Hit::Input;
        }
        if let Some((key, _)) = self.header_cells.iter().find(|(_, r)| contains(*r, x, y)) {
            return Hit::Header(key.clone());
        }
        if let Some(rect) = self.rows_rect
            && contains(rect, x, y)
        {
            let index = self.row_offset + usize::from(y - rect.1);
            if index < self.row_count {
                return Hit::Row(index);
            }
            return Hit::Dropdown;
        }
        if self.dropdown_rect.is_some_and(|r| contains(r, x, y)) {
            return Hit::Dropdown;
        }
        Hit::Outside
    }
}
