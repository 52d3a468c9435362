//! Column rule shared by cursor placement and the line painter.
//!
//! Every byte occupies one column except tab, which advances to the next
//! multiple of `TAB_STOP`. All column decisions go through `advance`; if the
//! painter and the cursor ever disagree the visual cursor drifts.

pub const TAB_STOP: usize = 2;

/// Column following `byte` when it is drawn starting at `column`.
#[inline]
pub fn advance(column: usize, byte: u8) -> usize {
    if byte == b'\t' {
        (column / TAB_STOP + 1) * TAB_STOP
    } else {
        column + 1
    }
}

/// Screen column of `offset` within `bytes` when the line starts at `origin`.
pub fn column_of(bytes: &[u8], offset: usize, origin: usize) -> usize {
    bytes[..offset.min(bytes.len())]
        .iter()
        .fold(origin, |col, &b| advance(col, b))
}

/// Expand `bytes` into display cells for columns `origin..limit`.
///
/// Tabs become runs of blanks, cells past the content are blank, and the
/// result always holds exactly `limit - origin` cells so a repaint overwrites
/// whatever a longer line left behind.
pub fn expand_row(bytes: &[u8], origin: usize, limit: usize) -> Vec<u8> {
    let mut cells = Vec::with_capacity(limit.saturating_sub(origin));
    let mut col = origin;
    for &b in bytes {
        if col >= limit {
            break;
        }
        let next = advance(col, b);
        if b == b'\t' {
            while col < next && col < limit {
                cells.push(b' ');
                col += 1;
            }
        } else {
            cells.push(b);
            col = next;
        }
    }
    while col < limit {
        cells.push(b' ');
        col += 1;
    }
    cells
}
